use anyhow::Context;
use appkernel::cli::handlers::resolve_app_name;
use appkernel::cli::{handle_check, handle_plan, KernelArgs, KernelCommand};
use appkernel::config::ConfigLoader;
use appkernel::environment::ProcessEnv;
use appkernel::logging::{init_logging, LoggingConfig};
use clap::Parser;
use std::io::Write;

fn main() -> anyhow::Result<()> {
    let args = KernelArgs::parse();
    let target = args.command.target();

    let config = ConfigLoader::new()
        .load(target.config.as_deref(), &ProcessEnv)
        .context("failed to load kernel configuration")?;
    let (logging, unresolved) = LoggingConfig::bootstrap(&ProcessEnv, &config)?;
    init_logging(&logging)?;
    if let Some(e) = unresolved {
        tracing::warn!(error = %e, "mode not resolved, using the default logging preset");
    }

    let app_name = resolve_app_name(target, &config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.command {
        KernelCommand::Plan(_) => {
            handle_plan(config, &app_name, &mut out)?;
        }
        KernelCommand::Check(_) => {
            handle_check(config, &app_name, ProcessEnv, &mut out)?;
        }
    }
    out.flush()?;
    Ok(())
}
