use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// appkernel main command line arguments
#[derive(Parser, Debug)]
#[clap(
    name = "appkernel",
    version,
    about = "Inspect and check application bootstrap configuration",
    long_about = "Resolves bundles to loader strategies and runs the env, container, bundles and dispatcher phases against a kernel.toml."
)]
pub struct KernelArgs {
    #[command(subcommand)]
    pub command: KernelCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum KernelCommand {
    /// Print which loader strategy each bundle resolves to
    Plan(TargetArgs),
    /// Run the full lifecycle and report the outcome
    Check(TargetArgs),
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetArgs {
    /// Config file (default: $APPKERNEL_CONFIG, then ./kernel.toml)
    #[clap(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Application name, overriding `app_name` from the config
    #[clap(long, value_name = "NAME")]
    pub app: Option<String>,
}

impl KernelCommand {
    pub fn target(&self) -> &TargetArgs {
        match self {
            KernelCommand::Plan(target) | KernelCommand::Check(target) => target,
        }
    }
}
