use super::{LifecycleError, LifecyclePhase, LifecycleState};
use crate::errors::AppResult;
use crate::events::{AppEvent, EventPublisher};
use crate::logging::OperationTimer;
use tracing::{error, info};

/// The work done in each phase.
pub trait PhaseActions {
    fn init_env(&mut self) -> AppResult<()>;

    fn init_container(&mut self) -> AppResult<()>;

    fn init_bundles(&mut self) -> AppResult<()>;

    fn init_dispatcher(&mut self) -> AppResult<()>;

    fn run_phase(&mut self, phase: LifecyclePhase) -> AppResult<()> {
        match phase {
            LifecyclePhase::Env => self.init_env(),
            LifecyclePhase::Container => self.init_container(),
            LifecyclePhase::Bundles => self.init_bundles(),
            LifecyclePhase::Dispatcher => self.init_dispatcher(),
        }
    }
}

/// Runs the four phases once, publishing `Before`/`After` around each.
///
/// The first failing phase stops the run; its `After` event is not published
/// and later phases never start.
#[derive(Debug)]
pub struct LifecycleSequencer {
    state: LifecycleState,
}

impl LifecycleSequencer {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::NotStarted,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_started(&self) -> bool {
        self.state != LifecycleState::NotStarted
    }

    pub fn run(
        &mut self,
        actions: &mut dyn PhaseActions,
        publisher: &dyn EventPublisher,
    ) -> Result<(), LifecycleError> {
        if self.is_started() {
            return Err(LifecycleError::AlreadyStarted(self.state));
        }

        for phase in LifecyclePhase::ORDERED {
            self.state = LifecycleState::running(phase);
            publisher.publish(&AppEvent::before(phase));

            let timer = OperationTimer::new(phase.as_str());
            if let Err(e) = actions.run_phase(phase) {
                error!(phase = %phase, error = %e, "lifecycle phase failed");
                self.state = LifecycleState::Failed(phase);
                return Err(LifecycleError::Phase {
                    phase,
                    source: Box::new(e),
                });
            }
            timer.finish();

            publisher.publish(&AppEvent::after(phase));
        }

        self.state = LifecycleState::Ready;
        info!("application ready");
        Ok(())
    }
}

impl Default for LifecycleSequencer {
    fn default() -> Self {
        Self::new()
    }
}
