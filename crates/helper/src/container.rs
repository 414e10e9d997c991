// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Named service bindings.
//!
//! The container maps service names to either a factory (with a `shared`
//! flag) or an already-resolved instance. Test helpers that swap a service
//! out take a [`BindingSnapshot`] first and hand it back to
//! [`Container::restore`] afterwards, which reinstates both the binding and
//! the resolved instance exactly as they were.

use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, Weak};
use thiserror::Error;

/// Name of the event dispatcher service
pub const EVENTS: &str = "events";

/// Name of the outbound HTTP client service
pub const HTTP_CLIENT: &str = "http.client";

/// A resolved service
pub type Service = Arc<dyn Any + Send + Sync>;

/// Builds a service on demand
pub type Factory = Arc<dyn Fn(&Container) -> Service + Send + Sync>;

/// Errors raised while resolving services
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("No binding registered for '{0}'")]
    Unbound(String),

    #[error("Service '{name}' is not a {expected}")]
    TypeMismatch { name: String, expected: &'static str },
}

/// A registered factory and whether its product is shared
#[derive(Clone)]
pub struct Binding {
    pub concrete: Factory,
    pub shared: bool,
}

impl Binding {
    /// Same factory (by identity) and same sharing flag
    pub fn same_as(&self, other: &Binding) -> bool {
        Arc::ptr_eq(&self.concrete, &other.concrete) && self.shared == other.shared
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}

/// Saved registration of one service name
#[derive(Clone)]
pub struct BindingSnapshot {
    binding: Option<Binding>,
    instance: Option<Service>,
}

impl BindingSnapshot {
    /// Whether the service had already been resolved as a shared instance
    pub fn was_resolved(&self) -> bool {
        self.instance.is_some()
    }

    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    pub fn instance(&self) -> Option<&Service> {
        self.instance.as_ref()
    }

    /// Whether `other` holds the same factory and the same instance
    pub fn same_as(&self, other: &BindingSnapshot) -> bool {
        let bindings = match (&self.binding, &other.binding) {
            (Some(a), Some(b)) => a.same_as(b),
            (None, None) => true,
            _ => false,
        };
        let instances = match (&self.instance, &other.instance) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        bindings && instances
    }
}

impl std::fmt::Debug for BindingSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingSnapshot")
            .field("binding", &self.binding)
            .field("resolved", &self.was_resolved())
            .finish()
    }
}

#[derive(Default)]
struct ContainerState {
    bindings: HashMap<String, Binding>,
    instances: HashMap<String, Service>,
}

/// Service registry; clones share state
#[derive(Clone, Default)]
pub struct Container {
    state: Arc<RwLock<ContainerState>>,
}

impl Container {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container with a shared in-memory event dispatcher bound
    pub fn with_events() -> Self {
        let container = Self::new();
        container.singleton(EVENTS, |_| {
            let dispatcher: Arc<dyn crate::events::Dispatcher> =
                Arc::new(crate::events::EventDispatcher::new());
            Arc::new(dispatcher) as Service
        });
        container
    }

    /// The process-wide container
    pub fn global() -> &'static Container {
        static GLOBAL: OnceLock<Container> = OnceLock::new();
        GLOBAL.get_or_init(Container::with_events)
    }

    /// Register a factory
    pub fn bind<F>(&self, name: &str, factory: F, shared: bool)
    where
        F: Fn(&Container) -> Service + Send + Sync + 'static,
    {
        self.bind_factory(name, Arc::new(factory), shared);
    }

    /// Register an existing factory handle
    pub fn bind_factory(&self, name: &str, concrete: Factory, shared: bool) {
        let mut state = self.state.write();
        state.instances.remove(name);
        state
            .bindings
            .insert(name.to_string(), Binding { concrete, shared });
    }

    /// Register a shared factory
    pub fn singleton<F>(&self, name: &str, factory: F)
    where
        F: Fn(&Container) -> Service + Send + Sync + 'static,
    {
        self.bind(name, factory, true);
    }

    /// Install a resolved instance, leaving any binding in place
    pub fn instance(&self, name: &str, service: Service) {
        self.state.write().instances.insert(name.to_string(), service);
    }

    /// Current binding for `name`
    pub fn binding(&self, name: &str) -> Option<Binding> {
        self.state.read().bindings.get(name).cloned()
    }

    /// Whether `name` currently has a resolved instance
    pub fn resolved(&self, name: &str) -> bool {
        self.state.read().instances.contains_key(name)
    }

    /// Whether `name` is bound or resolved
    pub fn has(&self, name: &str) -> bool {
        let state = self.state.read();
        state.bindings.contains_key(name) || state.instances.contains_key(name)
    }

    /// Resolve `name`, caching the product of shared bindings
    pub fn make(&self, name: &str) -> Result<Service, ContainerError> {
        let binding = {
            let state = self.state.read();
            if let Some(instance) = state.instances.get(name) {
                return Ok(Arc::clone(instance));
            }
            state.bindings.get(name).cloned()
        };

        let binding = binding.ok_or_else(|| ContainerError::Unbound(name.to_string()))?;
        // The factory may resolve other services; no lock is held here.
        let service = (binding.concrete)(self);
        if binding.shared {
            self.state
                .write()
                .instances
                .insert(name.to_string(), Arc::clone(&service));
        }
        Ok(service)
    }

    /// Resolve `name` and downcast it to `T`
    pub fn make_as<T>(&self, name: &str) -> Result<T, ContainerError>
    where
        T: Any + Send + Sync + Clone,
    {
        let service = self.make(name)?;
        service
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| ContainerError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Remove both the binding and any resolved instance
    pub fn forget(&self, name: &str) {
        let mut state = self.state.write();
        state.bindings.remove(name);
        state.instances.remove(name);
    }

    /// Capture the registration of `name`
    pub fn snapshot(&self, name: &str) -> BindingSnapshot {
        let state = self.state.read();
        BindingSnapshot {
            binding: state.bindings.get(name).cloned(),
            instance: state.instances.get(name).cloned(),
        }
    }

    /// Reinstate a registration captured by [`Container::snapshot`]
    pub fn restore(&self, name: &str, snapshot: BindingSnapshot) {
        let mut state = self.state.write();
        state.bindings.remove(name);
        state.instances.remove(name);
        if let Some(binding) = snapshot.binding {
            state.bindings.insert(name.to_string(), binding);
        }
        if let Some(instance) = snapshot.instance {
            state.instances.insert(name.to_string(), instance);
        }
    }

    /// Resolve the active event dispatcher
    pub fn events(&self) -> Result<Arc<dyn crate::events::Dispatcher>, ContainerError> {
        self.make_as::<Arc<dyn crate::events::Dispatcher>>(EVENTS)
    }

    /// Install `dispatcher` as the resolved event dispatcher
    pub fn set_events(&self, dispatcher: Arc<dyn crate::events::Dispatcher>) {
        self.instance(EVENTS, Arc::new(dispatcher));
    }

    /// A handle that does not keep the container alive
    pub fn downgrade(&self) -> WeakContainer {
        WeakContainer {
            state: Arc::downgrade(&self.state),
        }
    }
}

/// Non-owning [`Container`] handle, for services that refer back to the
/// container they are bound in
#[derive(Clone, Default)]
pub struct WeakContainer {
    state: Weak<RwLock<ContainerState>>,
}

impl WeakContainer {
    /// The container, if any clone of it is still alive
    pub fn upgrade(&self) -> Option<Container> {
        self.state.upgrade().map(|state| Container { state })
    }
}

impl std::fmt::Debug for WeakContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakContainer")
            .field("alive", &(self.state.strong_count() > 0))
            .finish()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        let mut bound: Vec<&String> = state.bindings.keys().collect();
        bound.sort();
        let mut resolved: Vec<&String> = state.instances.keys().collect();
        resolved.sort();
        f.debug_struct("Container")
            .field("bindings", &bound)
            .field("resolved", &resolved)
            .finish()
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
