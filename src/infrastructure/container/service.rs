//! Type-keyed service container
//!
//! - Factories are keyed by `TypeId`, one binding per type
//! - Singletons are created on first resolve and cached
//! - A frozen binding rejects re-registration with `ContainerError::ReadOnly`
//! - Resolution runs on the calling thread; cycles are reported, not followed.
//!   The chain being resolved is tracked per thread, so concurrent resolves
//!   of the same type do not see each other

use super::ServiceLifetime;
use dashmap::{DashMap, DashSet};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::sync::{Arc, Weak};
use thiserror::Error;

pub type ErasedService = Arc<dyn Any + Send + Sync>;
pub type FactoryError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Service not registered: {type_name}")]
    ServiceNotRegistered { type_name: &'static str },
    #[error("Type cast failed: expected {expected}")]
    TypeCastFailed { expected: &'static str },
    #[error("Service creation failed for {type_name}: {reason}")]
    CreationFailed {
        type_name: &'static str,
        reason: String,
    },
    #[error("Binding for {type_name} is read-only")]
    ReadOnly { type_name: &'static str },
    #[error("Circular dependency: {}", chain.join(" -> "))]
    CircularDependency { chain: Vec<&'static str> },
}

/// Produces instances for one binding.
pub trait ServiceFactory: Send + Sync {
    fn create(&self, container: &ServiceContainer) -> Result<ErasedService, ContainerError>;

    fn lifetime(&self) -> ServiceLifetime;

    fn service_type_name(&self) -> &'static str;
}

struct FnServiceFactory<F, T> {
    factory_fn: F,
    lifetime: ServiceLifetime,
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<F, T> ServiceFactory for FnServiceFactory<F, T>
where
    F: Fn(&ServiceContainer) -> Result<T, FactoryError> + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    fn create(&self, container: &ServiceContainer) -> Result<ErasedService, ContainerError> {
        let service = (self.factory_fn)(container).map_err(|e| match e.downcast::<ContainerError>() {
            Ok(inner) => *inner,
            Err(other) => ContainerError::CreationFailed {
                type_name: std::any::type_name::<T>(),
                reason: other.to_string(),
            },
        })?;
        Ok(Arc::new(service))
    }

    fn lifetime(&self) -> ServiceLifetime {
        self.lifetime
    }

    fn service_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

struct InstanceFactory<T> {
    instance: Arc<T>,
}

impl<T: Send + Sync + 'static> ServiceFactory for InstanceFactory<T> {
    fn create(&self, _container: &ServiceContainer) -> Result<ErasedService, ContainerError> {
        let erased: ErasedService = self.instance.clone();
        Ok(erased)
    }

    fn lifetime(&self) -> ServiceLifetime {
        ServiceLifetime::Singleton
    }

    fn service_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

struct Inner {
    factories: DashMap<TypeId, Arc<dyn ServiceFactory>>,
    singletons: DashMap<TypeId, ErasedService>,
    frozen: DashSet<TypeId>,
}

/// Service container. Clones share the same bindings.
#[derive(Clone)]
pub struct ServiceContainer {
    inner: Arc<Inner>,
}

/// Non-owning handle to a container, used when the container is bound into itself.
#[derive(Clone)]
pub struct ContainerRef(Weak<Inner>);

impl ContainerRef {
    pub fn upgrade(&self) -> Option<ServiceContainer> {
        self.0.upgrade().map(|inner| ServiceContainer { inner })
    }
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                factories: DashMap::new(),
                singletons: DashMap::new(),
                frozen: DashSet::new(),
            }),
        }
    }

    /// Register a factory for `T` with the given lifetime.
    ///
    /// Replaces an existing binding and drops its cached singleton, unless the
    /// binding was frozen.
    pub fn register<T, F>(&self, lifetime: ServiceLifetime, factory: F) -> Result<(), ContainerError>
    where
        F: Fn(&ServiceContainer) -> Result<T, FactoryError> + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let factory = FnServiceFactory::<F, T> {
            factory_fn: factory,
            lifetime,
            _phantom: std::marker::PhantomData,
        };
        self.insert_factory(TypeId::of::<T>(), Arc::new(factory))
    }

    pub fn register_singleton<T, F>(&self, factory: F) -> Result<(), ContainerError>
    where
        F: Fn(&ServiceContainer) -> T + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.register(ServiceLifetime::Singleton, move |container| Ok(factory(container)))
    }

    pub fn register_transient<T, F>(&self, factory: F) -> Result<(), ContainerError>
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.register(ServiceLifetime::Transient, move |_| Ok(factory()))
    }

    /// Bind an already built instance.
    pub fn register_instance<T: Send + Sync + 'static>(&self, instance: Arc<T>) -> Result<(), ContainerError> {
        self.insert_factory(TypeId::of::<T>(), Arc::new(InstanceFactory { instance }))
    }

    fn insert_factory(&self, type_id: TypeId, factory: Arc<dyn ServiceFactory>) -> Result<(), ContainerError> {
        if self.inner.frozen.contains(&type_id) {
            return Err(ContainerError::ReadOnly {
                type_name: factory.service_type_name(),
            });
        }
        tracing::trace!(service = factory.service_type_name(), lifetime = ?factory.lifetime(), "binding registered");
        self.inner.singletons.remove(&type_id);
        self.inner.factories.insert(type_id, factory);
        Ok(())
    }

    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ContainerError> {
        let type_id = TypeId::of::<T>();
        let type_name = std::any::type_name::<T>();

        let cached = self.inner.singletons.get(&type_id).map(|entry| entry.value().clone());
        if let Some(service) = cached {
            return downcast::<T>(service);
        }

        // Clone the factory out so no map guard is held while it runs.
        let factory = self
            .inner
            .factories
            .get(&type_id)
            .map(|entry| entry.value().clone())
            .ok_or(ContainerError::ServiceNotRegistered { type_name })?;

        let service = {
            let _guard = ResolveGuard::enter(self.id(), type_id, type_name)?;
            factory.create(self)?
        };

        if factory.lifetime() == ServiceLifetime::Singleton {
            let shared = self
                .inner
                .singletons
                .entry(type_id)
                .or_insert(service)
                .value()
                .clone();
            return downcast::<T>(shared);
        }
        downcast::<T>(service)
    }

    fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    /// Make the binding for `T` read-only.
    pub fn freeze<T: 'static>(&self) {
        self.inner.frozen.insert(TypeId::of::<T>());
    }

    pub fn is_frozen<T: 'static>(&self) -> bool {
        self.inner.frozen.contains(&TypeId::of::<T>())
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.inner.factories.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.inner.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.factories.is_empty()
    }

    pub fn downgrade(&self) -> ContainerRef {
        ContainerRef(Arc::downgrade(&self.inner))
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    /// Bindings being resolved on this thread, outermost first, tagged with
    /// the owning container.
    static RESOLVING: RefCell<Vec<(usize, TypeId, &'static str)>> = const { RefCell::new(Vec::new()) };
}

/// Marks one binding as being resolved on this thread until dropped, so a
/// failing or panicking factory does not leave a stale entry behind.
struct ResolveGuard;

impl ResolveGuard {
    fn enter(container: usize, type_id: TypeId, type_name: &'static str) -> Result<Self, ContainerError> {
        RESOLVING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.iter().any(|(owner, id, _)| *owner == container && *id == type_id) {
                let mut chain: Vec<&'static str> = stack
                    .iter()
                    .filter(|(owner, _, _)| *owner == container)
                    .map(|(_, _, name)| *name)
                    .collect();
                chain.push(type_name);
                return Err(ContainerError::CircularDependency { chain });
            }
            stack.push((container, type_id, type_name));
            Ok(ResolveGuard)
        })
    }
}

impl Drop for ResolveGuard {
    fn drop(&mut self) {
        RESOLVING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

fn downcast<T: Send + Sync + 'static>(service: ErasedService) -> Result<Arc<T>, ContainerError> {
    service.downcast::<T>().map_err(|_| ContainerError::TypeCastFailed {
        expected: std::any::type_name::<T>(),
    })
}
