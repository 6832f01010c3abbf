//! Bundles: named configuration units and the loader that applies them.
//!
//! - `registry` keeps the ordered list of bundle names
//! - `catalog` maps a name to the `Bundle` implementation
//! - `strategy` holds the named loader strategies
//! - `loader` routes each bundle to its strategy and applies it

pub mod catalog;
pub mod loader;
pub mod registry;
pub mod strategy;

pub use catalog::BundleCatalog;
pub use loader::{BundleLoader, LoadOrigin, LoadPlan, LoadStep};
pub use registry::{BundleEntry, BundleKey, BundleRegistry};
pub use strategy::{ContainerStrategy, EventsStrategy, FnStrategy, LoadContext, LoaderDefinitions, LoaderStrategy};

use crate::events::EventDispatcherConfigurator;
use crate::infrastructure::{ContainerConfigurator, ContainerError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BundleError {
    /// A bundle (or an app profile) names a strategy nobody registered.
    #[error("Loader '{loader}' referenced by {referenced_by} is not registered")]
    LoaderNotRegistered { loader: String, referenced_by: String },
    #[error("Bundle '{0}' is not in the catalog")]
    UnknownBundle(String),
    #[error("Bundle '{bundle}' failed: {reason}")]
    Failed { bundle: String, reason: String },
    #[error(transparent)]
    Container(#[from] ContainerError),
}

/// A configuration module contributing bindings and listeners.
pub trait Bundle: Send + Sync {
    fn name(&self) -> &str;

    /// Called by the `container` strategy.
    fn register(&self, _container: &ContainerConfigurator) -> Result<(), BundleError> {
        Ok(())
    }

    /// Called by the `events` strategy.
    fn subscribe(&self, _events: &EventDispatcherConfigurator) -> Result<(), BundleError> {
        Ok(())
    }
}
