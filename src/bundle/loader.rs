//! Routes each bundle to a loader strategy and applies it.
//!
//! Routing is explicit: `LoaderConfig::routes` names the strategy for a
//! bundle, anything else goes to `LoaderConfig::default_loader`. The whole
//! list is planned before anything is applied, so a misrouted bundle fails
//! the load without leaving earlier bundles half bound.

use super::registry::{BundleKey, BundleRegistry};
use super::strategy::{LoadContext, LoaderDefinitions, LoaderStrategy};
use super::BundleError;
use crate::config::LoaderConfig;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOrigin {
    Registry(BundleKey),
    Import,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadStep {
    pub bundle: String,
    pub loader: String,
    pub origin: LoadOrigin,
}

/// Ordered steps for one application, plus the bundles its profile skips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadPlan {
    pub app_name: String,
    pub steps: Vec<LoadStep>,
    pub skipped: Vec<LoadStep>,
}

pub struct BundleLoader {
    config: LoaderConfig,
    strategies: HashMap<String, Arc<dyn LoaderStrategy>>,
}

impl BundleLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            strategies: HashMap::new(),
        }
    }

    /// Register every definition, in order.
    pub fn configure(&mut self, definitions: &LoaderDefinitions) {
        for (name, strategy) in definitions.iter() {
            self.register_loader(name, strategy.clone());
        }
    }

    /// Associate `name` with `strategy`. An existing strategy of the same name
    /// is replaced; returns `true` in that case.
    pub fn register_loader(&mut self, name: impl Into<String>, strategy: Arc<dyn LoaderStrategy>) -> bool {
        let name = name.into();
        let replaced = self.strategies.insert(name.clone(), strategy).is_some();
        if replaced {
            warn!(loader = %name, "loader strategy replaced");
        } else {
            debug!(loader = %name, "loader strategy registered");
        }
        replaced
    }

    pub fn has_loader(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    pub fn loader_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Strategies enabled for `app_name`; `None` means all of them.
    fn enabled_for(&self, app_name: &str) -> Result<Option<BTreeSet<&str>>, BundleError> {
        let Some(names) = self.config.apps.get(app_name) else {
            return Ok(None);
        };
        for name in names {
            if !self.has_loader(name) {
                return Err(BundleError::LoaderNotRegistered {
                    loader: name.clone(),
                    referenced_by: format!("app '{app_name}'"),
                });
            }
        }
        Ok(Some(names.iter().map(String::as_str).collect()))
    }

    /// Resolve every bundle, then every import, to its strategy.
    pub fn plan(&self, app_name: &str, registry: &BundleRegistry) -> Result<LoadPlan, BundleError> {
        let enabled = self.enabled_for(app_name)?;
        let sources = registry
            .bundles()
            .iter()
            .map(|entry| (entry.name.as_str(), LoadOrigin::Registry(entry.key.clone())))
            .chain(registry.import().iter().map(|name| (name.as_str(), LoadOrigin::Import)));

        let mut plan = LoadPlan {
            app_name: app_name.to_string(),
            ..LoadPlan::default()
        };
        for (bundle, origin) in sources {
            let loader = self.config.route(bundle);
            if !self.has_loader(loader) {
                return Err(BundleError::LoaderNotRegistered {
                    loader: loader.to_string(),
                    referenced_by: format!("bundle '{bundle}'"),
                });
            }
            let step = LoadStep {
                bundle: bundle.to_string(),
                loader: loader.to_string(),
                origin,
            };
            match &enabled {
                Some(set) if !set.contains(loader) => plan.skipped.push(step),
                _ => plan.steps.push(step),
            }
        }
        Ok(plan)
    }

    /// Plan and apply all bundles for `app_name`.
    pub fn load_main_config(
        &self,
        app_name: &str,
        registry: &BundleRegistry,
        ctx: &LoadContext<'_>,
    ) -> Result<LoadPlan, BundleError> {
        let plan = self.plan(app_name, registry)?;
        for step in &plan.skipped {
            debug!(bundle = %step.bundle, loader = %step.loader, app = app_name, "bundle skipped for app");
        }
        for step in &plan.steps {
            let strategy = self
                .strategies
                .get(&step.loader)
                .ok_or_else(|| BundleError::LoaderNotRegistered {
                    loader: step.loader.clone(),
                    referenced_by: format!("bundle '{}'", step.bundle),
                })?;
            debug!(bundle = %step.bundle, loader = %step.loader, "applying bundle");
            strategy.load(&step.bundle, ctx).inspect_err(|e| {
                tracing::error!(bundle = %step.bundle, loader = %step.loader, error = %e, "bundle failed");
            })?;
        }
        info!(
            app = app_name,
            applied = plan.steps.len(),
            skipped = plan.skipped.len(),
            "bundles loaded"
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{BundleCatalog, BundleEntry, FnStrategy};
    use crate::infrastructure::{ContainerConfigurator, ServiceContainer};
    use parking_lot::Mutex;

    type Calls = Arc<Mutex<Vec<String>>>;

    fn recording(tag: &'static str, calls: &Calls) -> Arc<dyn LoaderStrategy> {
        let calls = calls.clone();
        Arc::new(FnStrategy::new(move |bundle: &str, _ctx: &LoadContext<'_>| {
            calls.lock().push(format!("{tag}:{bundle}"));
            Ok(())
        }))
    }

    fn run(loader: &BundleLoader, app: &str, registry: &BundleRegistry) -> Result<LoadPlan, BundleError> {
        let container = ContainerConfigurator::new(ServiceContainer::new());
        let catalog = BundleCatalog::new();
        let ctx = LoadContext {
            app_name: app,
            container: &container,
            catalog: &catalog,
        };
        loader.load_main_config(app, registry, &ctx)
    }

    #[test]
    fn test_bundles_applied_in_order_then_imports() {
        let calls = Calls::default();
        let mut loader = BundleLoader::new(LoaderConfig::default());
        loader.register_loader("container", recording("c", &calls));

        let mut registry = BundleRegistry::new();
        registry.add_bundles(["a", "b"]);
        registry.set_imports(["extra"]);

        let plan = run(&loader, "web", &registry).unwrap();
        assert_eq!(*calls.lock(), vec!["c:a", "c:b", "c:extra"]);
        assert_eq!(plan.steps[2].origin, LoadOrigin::Import);
        assert_eq!(plan.steps[0].origin, LoadOrigin::Registry(BundleKey::Index(0)));
    }

    #[test]
    fn test_empty_registry_resolves_nothing() {
        let calls = Calls::default();
        let mut loader = BundleLoader::new(LoaderConfig::default());
        loader.register_loader("container", recording("c", &calls));

        let plan = run(&loader, "web", &BundleRegistry::new()).unwrap();
        assert!(plan.steps.is_empty());
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn test_unregistered_route_binds_nothing() {
        let calls = Calls::default();
        let mut config = LoaderConfig::default();
        config.routes.insert("b".to_string(), "missing".to_string());
        let mut loader = BundleLoader::new(config);
        loader.register_loader("container", recording("c", &calls));

        let mut registry = BundleRegistry::new();
        registry.add_bundles(["a", "b"]);

        let err = run(&loader, "web", &registry).unwrap_err();
        assert!(matches!(err, BundleError::LoaderNotRegistered { ref loader, .. } if loader == "missing"));
        assert!(calls.lock().is_empty());
    }

    #[test]
    fn test_reregistering_overwrites() {
        let calls = Calls::default();
        let mut loader = BundleLoader::new(LoaderConfig::default());
        assert!(!loader.register_loader("container", recording("s1", &calls)));
        assert!(loader.register_loader("container", recording("s2", &calls)));

        let mut registry = BundleRegistry::new();
        registry.add_bundles(["a"]);
        run(&loader, "web", &registry).unwrap();
        assert_eq!(*calls.lock(), vec!["s2:a"]);
    }

    #[test]
    fn test_app_profile_skips_disabled_loaders() {
        let calls = Calls::default();
        let mut config = LoaderConfig::default();
        config.routes.insert("audit".to_string(), "events".to_string());
        config.apps.insert("console".to_string(), vec!["container".to_string()]);
        let mut loader = BundleLoader::new(config);
        loader.register_loader("container", recording("c", &calls));
        loader.register_loader("events", recording("e", &calls));

        let mut registry = BundleRegistry::new();
        registry.add_bundles([BundleEntry::positional("core"), BundleEntry::positional("audit")]);

        let plan = run(&loader, "console", &registry).unwrap();
        assert_eq!(*calls.lock(), vec!["c:core"]);
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].bundle, "audit");

        calls.lock().clear();
        run(&loader, "web", &registry).unwrap();
        assert_eq!(*calls.lock(), vec!["c:core", "e:audit"]);
    }

    #[test]
    fn test_app_profile_naming_unknown_loader() {
        let mut config = LoaderConfig::default();
        config.apps.insert("console".to_string(), vec!["cli".to_string()]);
        let loader = BundleLoader::new(config);

        let err = loader.plan("console", &BundleRegistry::new()).unwrap_err();
        assert!(matches!(err, BundleError::LoaderNotRegistered { ref referenced_by, .. } if referenced_by == "app 'console'"));
    }

    #[test]
    fn test_strategy_failure_propagates() {
        let mut loader = BundleLoader::new(LoaderConfig::default());
        loader.register_loader(
            "container",
            Arc::new(FnStrategy::new(|bundle: &str, _ctx: &LoadContext<'_>| {
                Err(BundleError::Failed {
                    bundle: bundle.to_string(),
                    reason: "boom".to_string(),
                })
            })),
        );
        let mut registry = BundleRegistry::new();
        registry.add_bundles(["a"]);

        assert!(matches!(run(&loader, "web", &registry), Err(BundleError::Failed { .. })));
    }

    #[test]
    fn test_configure_from_definitions() {
        let mut loader = BundleLoader::new(LoaderConfig::default());
        loader.configure(&LoaderDefinitions::builtin());
        assert_eq!(loader.loader_names(), vec!["container", "events"]);
    }
}
