use super::container::{ContainerError, ContainerRef, ServiceContainer, ServiceLifetime};
use super::container::service::FactoryError;
use std::sync::Arc;

/// Registration surface over a [`ServiceContainer`], handed to kernels and
/// bundles while the container and bundles phases run.
#[derive(Clone)]
pub struct ContainerConfigurator {
    container: ServiceContainer,
}

impl ContainerConfigurator {
    pub fn new(container: ServiceContainer) -> Self {
        Self { container }
    }

    pub fn container(&self) -> &ServiceContainer {
        &self.container
    }

    pub fn singleton<T, F>(&self, factory: F) -> Result<(), ContainerError>
    where
        F: Fn(&ServiceContainer) -> T + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.container.register_singleton(factory)
    }

    pub fn transient<T, F>(&self, factory: F) -> Result<(), ContainerError>
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.container.register_transient(factory)
    }

    /// Bind a factory that may fail, e.g. one that resolves other services.
    pub fn bind<T, F>(&self, lifetime: ServiceLifetime, factory: F) -> Result<(), ContainerError>
    where
        F: Fn(&ServiceContainer) -> Result<T, FactoryError> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.container.register(lifetime, factory)
    }

    pub fn instance<T: Send + Sync + 'static>(&self, value: T) -> Result<(), ContainerError> {
        self.container.register_instance(Arc::new(value))
    }

    pub fn shared<T: Send + Sync + 'static>(&self, value: Arc<T>) -> Result<(), ContainerError> {
        self.container.register_instance(value)
    }

    /// Bind the container into itself as a frozen [`ContainerRef`].
    ///
    /// Returns `false` when it was already bound, so running the container
    /// phase against an already configured container is a no-op here.
    pub fn register_self(&self) -> Result<bool, ContainerError> {
        if self.container.is_registered::<ContainerRef>() {
            tracing::debug!("container self-binding already present");
            return Ok(false);
        }
        self.container
            .register_instance(Arc::new(self.container.downgrade()))?;
        self.container.freeze::<ContainerRef>();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_self_is_idempotent() {
        let configurator = ContainerConfigurator::new(ServiceContainer::new());
        assert!(configurator.register_self().unwrap());
        assert!(!configurator.register_self().unwrap());

        let handle = configurator.container().resolve::<ContainerRef>().unwrap();
        assert!(handle.upgrade().is_some());
    }

    #[test]
    fn test_self_binding_is_read_only_elsewhere() {
        let container = ServiceContainer::new();
        let configurator = ContainerConfigurator::new(container.clone());
        configurator.register_self().unwrap();

        let result = configurator.shared(Arc::new(container.downgrade()));
        assert!(matches!(result, Err(ContainerError::ReadOnly { .. })));
    }

    #[test]
    fn test_instance_and_transient() {
        let configurator = ContainerConfigurator::new(ServiceContainer::new());
        configurator.instance(String::from("hello")).unwrap();
        configurator.transient(|| 5_u32).unwrap();

        let container = configurator.container();
        assert_eq!(container.resolve::<String>().unwrap().as_str(), "hello");
        assert_eq!(*container.resolve::<u32>().unwrap(), 5);
    }
}
