//! Command-line front end of the `appkernel` binary.

pub mod commands;
pub mod handlers;

pub use commands::{KernelArgs, KernelCommand, TargetArgs};
pub use handlers::{handle_check, handle_plan, DeclaredBundle};

/// Application name used when neither `--app` nor `app_name` is set.
pub const DEFAULT_APP_NAME: &str = "app";
