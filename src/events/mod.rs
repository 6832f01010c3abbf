//! Lifecycle events and the synchronous dispatcher that delivers them.

pub mod dispatcher;

pub use dispatcher::{EventDispatcher, EventDispatcherConfigurator, EventSubscriber, Listener};

use crate::lifecycle::LifecyclePhase;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseStage {
    Before,
    After,
}

/// Event published around every lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppEvent {
    pub phase: LifecyclePhase,
    pub stage: PhaseStage,
}

impl AppEvent {
    pub fn before(phase: LifecyclePhase) -> Self {
        Self {
            phase,
            stage: PhaseStage::Before,
        }
    }

    pub fn after(phase: LifecyclePhase) -> Self {
        Self {
            phase,
            stage: PhaseStage::After,
        }
    }

    /// Stable event name, e.g. `app.before_init_env`.
    pub fn name(&self) -> &'static str {
        match (self.stage, self.phase) {
            (PhaseStage::Before, LifecyclePhase::Env) => "app.before_init_env",
            (PhaseStage::After, LifecyclePhase::Env) => "app.after_init_env",
            (PhaseStage::Before, LifecyclePhase::Container) => "app.before_init_container",
            (PhaseStage::After, LifecyclePhase::Container) => "app.after_init_container",
            (PhaseStage::Before, LifecyclePhase::Bundles) => "app.before_init_bundles",
            (PhaseStage::After, LifecyclePhase::Bundles) => "app.after_init_bundles",
            (PhaseStage::Before, LifecyclePhase::Dispatcher) => "app.before_init_dispatcher",
            (PhaseStage::After, LifecyclePhase::Dispatcher) => "app.after_init_dispatcher",
        }
    }
}

impl fmt::Display for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Receives lifecycle events. Delivery is synchronous: `publish` returns
/// after every subscriber has run.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &AppEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(AppEvent::before(LifecyclePhase::Env).name(), "app.before_init_env");
        assert_eq!(
            AppEvent::after(LifecyclePhase::Dispatcher).to_string(),
            "app.after_init_dispatcher"
        );
    }

    #[test]
    fn test_event_names_are_unique() {
        let mut names: Vec<&str> = LifecyclePhase::ORDERED
            .iter()
            .flat_map(|p| [AppEvent::before(*p).name(), AppEvent::after(*p).name()])
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 8);
    }
}
