use std::fmt;

/// The four initialization phases, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecyclePhase {
    Env,
    Container,
    Bundles,
    Dispatcher,
}

impl LifecyclePhase {
    pub const ORDERED: [LifecyclePhase; 4] = [
        LifecyclePhase::Env,
        LifecyclePhase::Container,
        LifecyclePhase::Bundles,
        LifecyclePhase::Dispatcher,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LifecyclePhase::Env => "env",
            LifecyclePhase::Container => "container",
            LifecyclePhase::Bundles => "bundles",
            LifecyclePhase::Dispatcher => "dispatcher",
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the sequencer currently is. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    NotStarted,
    EnvInit,
    ContainerInit,
    BundlesInit,
    DispatcherInit,
    Ready,
    Failed(LifecyclePhase),
}

impl LifecycleState {
    /// State entered while `phase` is running.
    pub fn running(phase: LifecyclePhase) -> Self {
        match phase {
            LifecyclePhase::Env => LifecycleState::EnvInit,
            LifecyclePhase::Container => LifecycleState::ContainerInit,
            LifecyclePhase::Bundles => LifecycleState::BundlesInit,
            LifecyclePhase::Dispatcher => LifecycleState::DispatcherInit,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::Ready | LifecycleState::Failed(_))
    }
}
