//! Tests that read the real process environment.

use appkernel::config::{ConfigLoader, CONFIG_PATH_ENV};
use appkernel::environment::{ProcessEnv, APP_DEBUG_KEY, APP_MODE_KEY};
use appkernel::{Application, LifecyclePhase, LifecycleState, NamedKernel};
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"
app_name = "console"

[[bundle]]
name = "core"

[profiles.staging]
debug = false
log_level = "warn"
"#;

struct EnvGuard(&'static [&'static str]);

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in self.0 {
            std::env::remove_var(key);
        }
    }
}

fn guard() -> EnvGuard {
    let guard = EnvGuard(&[APP_MODE_KEY, APP_DEBUG_KEY, CONFIG_PATH_ENV]);
    for key in guard.0 {
        std::env::remove_var(key);
    }
    guard
}

#[test]
#[serial]
fn test_config_path_from_environment() {
    let _guard = guard();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("elsewhere.toml");
    fs::write(&path, CONFIG).unwrap();
    std::env::set_var(CONFIG_PATH_ENV, &path);

    let config = ConfigLoader::with_base_path(dir.path().to_path_buf())
        .load(None, &ProcessEnv)
        .unwrap();
    assert_eq!(config.app_name.as_deref(), Some("console"));
    assert_eq!(config.bundles.len(), 1);
}

#[test]
#[serial]
fn test_missing_config_from_environment_is_an_error() {
    let _guard = guard();
    let dir = TempDir::new().unwrap();
    std::env::set_var(CONFIG_PATH_ENV, dir.path().join("absent.toml"));

    assert!(ConfigLoader::with_base_path(dir.path().to_path_buf())
        .load(None, &ProcessEnv)
        .is_err());
}

#[test]
#[serial]
fn test_env_phase_reads_process_environment() {
    let _guard = guard();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("kernel.toml"), CONFIG).unwrap();
    let config = ConfigLoader::with_base_path(dir.path().to_path_buf())
        .load(None, &ProcessEnv)
        .unwrap();
    std::env::set_var(APP_MODE_KEY, "staging");
    std::env::set_var(APP_DEBUG_KEY, "1");

    let mut app = Application::builder(NamedKernel::new("console"))
        .config(config)
        .env(ProcessEnv)
        .build();
    // `core` is not in the catalog, so the run stops at the bundles phase.
    let err = app.init().unwrap_err();
    assert_eq!(err.phase(), Some(LifecyclePhase::Bundles));

    let env = app.environment().unwrap();
    assert_eq!(env.mode, "staging");
    assert!(env.debug);
    assert_eq!(env.log_level.as_deref(), Some("warn"));
}

#[test]
#[serial]
fn test_unset_mode_without_default_fails() {
    let _guard = guard();
    let mut app = Application::builder(NamedKernel::new("web")).env(ProcessEnv).build();

    assert!(app.init().is_err());
    assert_eq!(app.state(), LifecycleState::Failed(LifecyclePhase::Env));
}
