use super::commands::TargetArgs;
use super::DEFAULT_APP_NAME;
use crate::app::{AppReport, Application, NamedKernel};
use crate::bundle::{Bundle, BundleCatalog, BundleKey, LoadOrigin, LoadPlan, LoadStep};
use crate::config::AppConfig;
use crate::environment::EnvSource;
use anyhow::Context;
use std::collections::BTreeSet;
use std::io::Write;

/// Placeholder for a bundle that is declared in the config but whose code is
/// not linked into the binary.
#[derive(Debug, Clone)]
pub struct DeclaredBundle {
    name: String,
}

impl DeclaredBundle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Bundle for DeclaredBundle {
    fn name(&self) -> &str {
        &self.name
    }
}

/// `--app`, then `app_name`, then [`DEFAULT_APP_NAME`].
pub fn resolve_app_name(target: &TargetArgs, config: &AppConfig) -> String {
    target
        .app
        .clone()
        .or_else(|| config.app_name.clone())
        .unwrap_or_else(|| DEFAULT_APP_NAME.to_string())
}

fn declared_catalog(config: &AppConfig) -> BundleCatalog {
    let names: BTreeSet<&str> = config
        .bundles
        .iter()
        .map(|b| b.name.as_str())
        .chain(config.imports.iter().map(String::as_str))
        .collect();
    let mut catalog = BundleCatalog::new();
    for name in names {
        catalog.insert(std::sync::Arc::new(DeclaredBundle::new(name)));
    }
    catalog
}

fn origin_label(origin: &LoadOrigin) -> String {
    match origin {
        LoadOrigin::Registry(BundleKey::Index(i)) => format!("#{i}"),
        LoadOrigin::Registry(BundleKey::Named(key)) => key.clone(),
        LoadOrigin::Import => "import".to_string(),
    }
}

fn write_steps(out: &mut dyn Write, steps: &[LoadStep]) -> std::io::Result<()> {
    for step in steps {
        writeln!(
            out,
            "  {:<10} {:<24} -> {}",
            origin_label(&step.origin),
            step.bundle,
            step.loader
        )?;
    }
    Ok(())
}

pub fn write_plan(out: &mut dyn Write, plan: &LoadPlan) -> std::io::Result<()> {
    writeln!(out, "app: {}", plan.app_name)?;
    if plan.steps.is_empty() {
        writeln!(out, "  (no bundles)")?;
    }
    write_steps(out, &plan.steps)?;
    if !plan.skipped.is_empty() {
        writeln!(out, "skipped for this app:")?;
        write_steps(out, &plan.skipped)?;
    }
    Ok(())
}

/// Print the resolution plan without running any phase.
pub fn handle_plan(config: AppConfig, app_name: &str, out: &mut dyn Write) -> anyhow::Result<LoadPlan> {
    let app = Application::builder(NamedKernel::new(app_name))
        .config(config)
        .build();
    let plan = app
        .plan()
        .with_context(|| format!("cannot resolve bundles for app '{app_name}'"))?;
    write_plan(out, &plan)?;
    Ok(plan)
}

/// Run the whole lifecycle with declared bundles standing in for real ones.
pub fn handle_check(
    config: AppConfig,
    app_name: &str,
    env: impl EnvSource + 'static,
    out: &mut dyn Write,
) -> anyhow::Result<AppReport> {
    let catalog = declared_catalog(&config);
    let mut app = Application::builder(NamedKernel::new(app_name))
        .config(config)
        .catalog(catalog)
        .env(env)
        .build();

    app.init()
        .with_context(|| format!("app '{app_name}' failed to start"))?;

    let report = app.report();
    writeln!(
        out,
        "app '{}' {:?} (mode {})",
        report.app_name,
        report.state,
        report.mode.as_deref().unwrap_or("-")
    )?;
    if let Some(plan) = &report.plan {
        writeln!(
            out,
            "{} bundle(s) applied, {} skipped, {} event(s) published",
            plan.steps.len(),
            plan.skipped.len(),
            app.dispatcher().events_published()
        )?;
    }
    Ok(report)
}
