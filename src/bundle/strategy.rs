//! Loader strategies: named procedures that turn a bundle into bindings.

use super::{BundleCatalog, BundleError};
use crate::events::EventDispatcherConfigurator;
use crate::infrastructure::ContainerConfigurator;
use std::sync::Arc;

pub const CONTAINER_LOADER: &str = "container";
pub const EVENTS_LOADER: &str = "events";

/// What a strategy gets to work with.
pub struct LoadContext<'a> {
    pub app_name: &'a str,
    pub container: &'a ContainerConfigurator,
    pub catalog: &'a BundleCatalog,
}

impl LoadContext<'_> {
    fn bundle(&self, name: &str) -> Result<&Arc<dyn super::Bundle>, BundleError> {
        self.catalog
            .get(name)
            .ok_or_else(|| BundleError::UnknownBundle(name.to_string()))
    }
}

pub trait LoaderStrategy: Send + Sync {
    fn load(&self, bundle: &str, ctx: &LoadContext<'_>) -> Result<(), BundleError>;
}

/// Applies `Bundle::register` against the container.
#[derive(Debug, Default)]
pub struct ContainerStrategy;

impl LoaderStrategy for ContainerStrategy {
    fn load(&self, bundle: &str, ctx: &LoadContext<'_>) -> Result<(), BundleError> {
        ctx.bundle(bundle)?.register(ctx.container)
    }
}

/// Applies `Bundle::subscribe` against the dispatcher configurator bound in
/// the container.
#[derive(Debug, Default)]
pub struct EventsStrategy;

impl LoaderStrategy for EventsStrategy {
    fn load(&self, bundle: &str, ctx: &LoadContext<'_>) -> Result<(), BundleError> {
        let target = ctx.bundle(bundle)?;
        let events = ctx.container.container().resolve::<EventDispatcherConfigurator>()?;
        target.subscribe(&events)
    }
}

/// Closure-backed strategy.
pub struct FnStrategy<F> {
    load_fn: F,
}

impl<F> FnStrategy<F>
where
    F: Fn(&str, &LoadContext<'_>) -> Result<(), BundleError> + Send + Sync,
{
    pub fn new(load_fn: F) -> Self {
        Self { load_fn }
    }
}

impl<F> LoaderStrategy for FnStrategy<F>
where
    F: Fn(&str, &LoadContext<'_>) -> Result<(), BundleError> + Send + Sync,
{
    fn load(&self, bundle: &str, ctx: &LoadContext<'_>) -> Result<(), BundleError> {
        (self.load_fn)(bundle, ctx)
    }
}

/// Static name → strategy table, read once when the loader is configured.
#[derive(Clone, Default)]
pub struct LoaderDefinitions {
    entries: Vec<(String, Arc<dyn LoaderStrategy>)>,
}

impl LoaderDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `container` and `events` strategies.
    pub fn builtin() -> Self {
        Self::new()
            .with(CONTAINER_LOADER, ContainerStrategy)
            .with(EVENTS_LOADER, EventsStrategy)
    }

    pub fn with(mut self, name: impl Into<String>, strategy: impl LoaderStrategy + 'static) -> Self {
        self.entries.push((name.into(), Arc::new(strategy)));
        self
    }

    pub fn push(&mut self, name: impl Into<String>, strategy: Arc<dyn LoaderStrategy>) {
        self.entries.push((name.into(), strategy));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn LoaderStrategy>)> {
        self.entries.iter().map(|(name, strategy)| (name.as_str(), strategy))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::Bundle;
    use crate::events::EventDispatcher;
    use crate::infrastructure::ServiceContainer;

    struct Greeter;

    impl Bundle for Greeter {
        fn name(&self) -> &str {
            "greeter"
        }

        fn register(&self, container: &ContainerConfigurator) -> Result<(), BundleError> {
            container.instance(String::from("hi"))?;
            Ok(())
        }

        fn subscribe(&self, events: &EventDispatcherConfigurator) -> Result<(), BundleError> {
            events.add_global_listener(|_| {});
            Ok(())
        }
    }

    fn context_parts() -> (ContainerConfigurator, BundleCatalog) {
        (
            ContainerConfigurator::new(ServiceContainer::new()),
            BundleCatalog::new().with(Greeter),
        )
    }

    #[test]
    fn test_container_strategy_registers_bindings() {
        let (container, catalog) = context_parts();
        let ctx = LoadContext {
            app_name: "web",
            container: &container,
            catalog: &catalog,
        };
        ContainerStrategy.load("greeter", &ctx).unwrap();
        assert_eq!(container.container().resolve::<String>().unwrap().as_str(), "hi");
    }

    #[test]
    fn test_unknown_bundle() {
        let (container, catalog) = context_parts();
        let ctx = LoadContext {
            app_name: "web",
            container: &container,
            catalog: &catalog,
        };
        let result = ContainerStrategy.load("ghost", &ctx);
        assert!(matches!(result, Err(BundleError::UnknownBundle(name)) if name == "ghost"));
    }

    #[test]
    fn test_events_strategy_needs_dispatcher_binding() {
        let (container, catalog) = context_parts();
        let ctx = LoadContext {
            app_name: "web",
            container: &container,
            catalog: &catalog,
        };
        assert!(matches!(
            EventsStrategy.load("greeter", &ctx),
            Err(BundleError::Container(_))
        ));

        let dispatcher = Arc::new(EventDispatcher::new());
        container
            .instance(EventDispatcherConfigurator::new(dispatcher.clone()))
            .unwrap();
        EventsStrategy.load("greeter", &ctx).unwrap();
        assert_eq!(dispatcher.listener_count(), 1);
    }

    #[test]
    fn test_builtin_definitions() {
        let definitions = LoaderDefinitions::builtin();
        let names: Vec<&str> = definitions.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec![CONTAINER_LOADER, EVENTS_LOADER]);
    }
}
