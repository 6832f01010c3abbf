pub mod app;
pub mod bundle;
pub mod cli;
pub mod config;
pub mod environment;
pub mod errors;
pub mod events;
pub mod infrastructure;
pub mod lifecycle;
pub mod logging;

// Re-export commonly used items for convenience
pub use app::{AppReport, Application, ApplicationBuilder, Kernel, NamedKernel};
pub use bundle::{Bundle, BundleCatalog, BundleError, BundleLoader, BundleRegistry, LoaderStrategy};
pub use config::AppConfig;
pub use errors::{AppError, AppResult};
pub use events::{AppEvent, EventDispatcher, EventPublisher};
pub use lifecycle::{LifecycleError, LifecyclePhase, LifecycleState};
