// Application kernel: owns the collaborators and runs the lifecycle.

use crate::bundle::{
    BundleCatalog, BundleEntry, BundleLoader, BundleRegistry, LoadContext, LoadPlan, LoaderDefinitions,
    LoaderStrategy,
};
use crate::config::AppConfig;
use crate::environment::{EnvSource, Environment, ProcessEnv};
use crate::errors::AppResult;
use crate::events::{EventDispatcher, EventDispatcherConfigurator};
use crate::infrastructure::{ContainerConfigurator, ServiceContainer};
use crate::lifecycle::{LifecycleError, LifecycleSequencer, LifecycleState, PhaseActions};
use std::sync::Arc;
use tracing::{debug, info};

/// The application-specific part of the kernel.
pub trait Kernel: Send + Sync {
    /// Application identity, e.g. `web` or `console`. Selects the loader
    /// profile used for bundles.
    fn app_name(&self) -> &str;

    /// Extra bindings, registered after the core ones.
    fn configure_container(&self, _container: &ContainerConfigurator) -> AppResult<()> {
        Ok(())
    }

    /// Listeners registered once bundles are loaded.
    fn configure_dispatcher(&self, _events: &EventDispatcherConfigurator) -> AppResult<()> {
        Ok(())
    }
}

/// Kernel with a name and no hooks.
#[derive(Debug, Clone)]
pub struct NamedKernel {
    name: String,
}

impl NamedKernel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Kernel for NamedKernel {
    fn app_name(&self) -> &str {
        &self.name
    }
}

/// Snapshot of where the application is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppReport {
    pub app_name: String,
    pub state: LifecycleState,
    pub mode: Option<String>,
    pub plan: Option<LoadPlan>,
}

pub struct Application {
    sequencer: LifecycleSequencer,
    dispatcher: Arc<EventDispatcher>,
    core: AppCore,
}

struct AppCore {
    kernel: Box<dyn Kernel>,
    config: Arc<AppConfig>,
    env_source: Box<dyn EnvSource>,
    container: ServiceContainer,
    dispatcher: Arc<EventDispatcher>,
    registry: BundleRegistry,
    loader: BundleLoader,
    catalog: BundleCatalog,
    environment: Option<Environment>,
    plan: Option<LoadPlan>,
}

impl Application {
    pub fn builder(kernel: impl Kernel + 'static) -> ApplicationBuilder {
        ApplicationBuilder::new(Box::new(kernel))
    }

    /// Run ENV, CONTAINER, BUNDLES and DISPATCHER. Only once.
    pub fn init(&mut self) -> Result<(), LifecycleError> {
        info!(app = self.core.kernel.app_name(), "initializing application");
        self.sequencer.run(&mut self.core, self.dispatcher.as_ref())
    }

    fn ensure_not_started(&self) -> Result<(), LifecycleError> {
        if self.sequencer.is_started() {
            return Err(LifecycleError::AlreadyStarted(self.sequencer.state()));
        }
        Ok(())
    }

    pub fn set_bundles<I, E>(&mut self, bundles: I) -> Result<(), LifecycleError>
    where
        I: IntoIterator<Item = E>,
        E: Into<BundleEntry>,
    {
        self.ensure_not_started()?;
        self.core.registry.set_bundles(bundles);
        Ok(())
    }

    pub fn add_bundles<I, E>(&mut self, bundles: I) -> Result<(), LifecycleError>
    where
        I: IntoIterator<Item = E>,
        E: Into<BundleEntry>,
    {
        self.ensure_not_started()?;
        self.core.registry.add_bundles(bundles);
        Ok(())
    }

    pub fn set_imports<I, S>(&mut self, imports: I) -> Result<(), LifecycleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_not_started()?;
        self.core.registry.set_imports(imports);
        Ok(())
    }

    /// See [`BundleLoader::register_loader`].
    pub fn register_loader(
        &mut self,
        name: impl Into<String>,
        strategy: Arc<dyn LoaderStrategy>,
    ) -> Result<bool, LifecycleError> {
        self.ensure_not_started()?;
        Ok(self.core.loader.register_loader(name, strategy))
    }

    pub fn bundles(&self) -> &[BundleEntry] {
        self.core.registry.bundles()
    }

    pub fn import(&self) -> &[String] {
        self.core.registry.import()
    }

    pub fn app_name(&self) -> &str {
        self.core.kernel.app_name()
    }

    /// Bundle resolution for the current registry, without applying it.
    pub fn plan(&self) -> Result<LoadPlan, crate::bundle::BundleError> {
        self.core.loader.plan(self.app_name(), &self.core.registry)
    }

    pub fn state(&self) -> LifecycleState {
        self.sequencer.state()
    }

    pub fn report(&self) -> AppReport {
        AppReport {
            app_name: self.app_name().to_string(),
            state: self.state(),
            mode: self.core.environment.as_ref().map(|e| e.mode.clone()),
            plan: self.core.plan.clone(),
        }
    }

    pub fn environment(&self) -> Option<&Environment> {
        self.core.environment.as_ref()
    }

    /// What the bundles phase applied, once it has run.
    pub fn load_plan(&self) -> Option<&LoadPlan> {
        self.core.plan.as_ref()
    }

    pub fn container(&self) -> &ServiceContainer {
        &self.core.container
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    pub fn config(&self) -> &Arc<AppConfig> {
        &self.core.config
    }
}

impl PhaseActions for AppCore {
    fn init_env(&mut self) -> AppResult<()> {
        let environment = Environment::resolve(self.env_source.as_ref(), &self.config)?;
        info!(mode = %environment.mode, debug = environment.debug, "environment resolved");
        self.environment = Some(environment);
        Ok(())
    }

    /// Core bindings first, then the kernel's own.
    fn init_container(&mut self) -> AppResult<()> {
        let configurator = ContainerConfigurator::new(self.container.clone());
        if !configurator.register_self()? {
            debug!("container was already configured");
        }
        configurator.shared(self.config.clone())?;
        if let Some(environment) = &self.environment {
            configurator.instance(environment.clone())?;
        }
        configurator.shared(self.dispatcher.clone())?;
        configurator.instance(EventDispatcherConfigurator::new(self.dispatcher.clone()))?;

        self.kernel.configure_container(&configurator)
    }

    fn init_bundles(&mut self) -> AppResult<()> {
        let configurator = ContainerConfigurator::new(self.container.clone());
        let app_name = self.kernel.app_name();
        let ctx = LoadContext {
            app_name,
            container: &configurator,
            catalog: &self.catalog,
        };
        let plan = self.loader.load_main_config(app_name, &self.registry, &ctx)?;
        self.plan = Some(plan);
        Ok(())
    }

    fn init_dispatcher(&mut self) -> AppResult<()> {
        let events = self.container.resolve::<EventDispatcherConfigurator>()?;
        self.kernel.configure_dispatcher(&events)
    }
}

/// Assembles an [`Application`]. Everything is optional except the kernel.
pub struct ApplicationBuilder {
    kernel: Box<dyn Kernel>,
    config: AppConfig,
    env_source: Option<Box<dyn EnvSource>>,
    container: Option<ServiceContainer>,
    dispatcher: Option<Arc<EventDispatcher>>,
    catalog: BundleCatalog,
    definitions: LoaderDefinitions,
}

impl ApplicationBuilder {
    fn new(kernel: Box<dyn Kernel>) -> Self {
        Self {
            kernel,
            config: AppConfig::default(),
            env_source: None,
            container: None,
            dispatcher: None,
            catalog: BundleCatalog::new(),
            definitions: LoaderDefinitions::builtin(),
        }
    }

    /// Bundles, imports and loader routing come from here.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn env(mut self, source: impl EnvSource + 'static) -> Self {
        self.env_source = Some(Box::new(source));
        self
    }

    pub fn container(mut self, container: ServiceContainer) -> Self {
        self.container = Some(container);
        self
    }

    pub fn dispatcher(mut self, dispatcher: Arc<EventDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn catalog(mut self, catalog: BundleCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replaces the built-in `container` and `events` strategies.
    pub fn loaders(mut self, definitions: LoaderDefinitions) -> Self {
        self.definitions = definitions;
        self
    }

    pub fn build(self) -> Application {
        let mut registry = BundleRegistry::new();
        registry.set_bundles(self.config.bundle_entries());
        registry.set_imports(self.config.imports.iter().cloned());

        let mut loader = BundleLoader::new(self.config.loaders.clone());
        loader.configure(&self.definitions);

        let dispatcher = self.dispatcher.unwrap_or_default();
        Application {
            sequencer: LifecycleSequencer::new(),
            dispatcher: dispatcher.clone(),
            core: AppCore {
                kernel: self.kernel,
                config: Arc::new(self.config),
                env_source: self.env_source.unwrap_or_else(|| Box::new(ProcessEnv)),
                container: self.container.unwrap_or_default(),
                dispatcher,
                registry,
                loader,
                catalog: self.catalog,
                environment: None,
                plan: None,
            },
        }
    }
}
