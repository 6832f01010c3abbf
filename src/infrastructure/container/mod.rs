//! Service container

pub mod service;

pub use service::{ContainerError, ContainerRef, ServiceContainer, ServiceFactory};

/// How long a resolved instance lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceLifetime {
    /// Created once, then shared for the rest of the process
    Singleton,
    /// New instance per resolve
    Transient,
}
