//! Ordered lifecycle: ENV → CONTAINER → BUNDLES → DISPATCHER.

pub mod phase;
pub mod sequencer;

pub use phase::{LifecyclePhase, LifecycleState};
pub use sequencer::{LifecycleSequencer, PhaseActions};

use crate::errors::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Phase '{phase}' failed: {source}")]
    Phase {
        phase: LifecyclePhase,
        #[source]
        source: Box<AppError>,
    },
    #[error("Lifecycle already started (state: {0:?})")]
    AlreadyStarted(LifecycleState),
}

impl LifecycleError {
    /// The phase that failed, if any.
    pub fn phase(&self) -> Option<LifecyclePhase> {
        match self {
            LifecycleError::Phase { phase, .. } => Some(*phase),
            LifecycleError::AlreadyStarted(_) => None,
        }
    }
}
