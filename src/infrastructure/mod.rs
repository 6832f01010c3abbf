//! Infrastructure layer
//!
//! - Service container
//! - Container configurator handed to kernels and bundles

pub mod configurator;
pub mod container;

pub use configurator::ContainerConfigurator;
pub use container::{ContainerError, ContainerRef, ServiceContainer, ServiceLifetime};
