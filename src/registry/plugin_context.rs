// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

use crate::observability::messages::{registry::PluginContextStopped, StructuredLog};
use crate::registry::service_registry::ServiceKey;
use crate::registry::ServiceRegistry;
use crate::traits::ServiceTracker;

#[derive(Clone, Copy, PartialEq, Eq)]
enum RegistrationKind {
    Service,
    Tracker,
}

struct Registration {
    kind: RegistrationKind,
    key: ServiceKey,
    name: String,
    undo: Box<dyn FnOnce(&ServiceRegistry) + Send>,
}

/// A component's handle on the registry it was started with.
///
/// The context only holds a weak reference: the session owns the registry,
/// the component owns its context, and neither keeps the other alive. Every
/// service and tracker registered through the context is remembered and
/// released by [`stop`](Self::stop), which also runs when the context is
/// dropped, so a stopped component cannot leak registrations.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use valvechain::registry::{PluginContext, ServiceRegistry};
///
/// let registry = Arc::new(ServiceRegistry::new());
/// let context = PluginContext::new("browser", &registry);
///
/// context.register_service(Arc::new(String::from("browse service")), "service.browse");
/// assert_eq!(registry.len(), 1);
///
/// context.stop();
/// assert!(registry.is_empty());
/// ```
pub struct PluginContext {
    plugin: String,
    registry: Weak<ServiceRegistry>,
    registrations: Mutex<Vec<Registration>>,
}

impl PluginContext {
    pub fn new(plugin: impl Into<String>, registry: &Arc<ServiceRegistry>) -> Self {
        Self {
            plugin: plugin.into(),
            registry: Arc::downgrade(registry),
            registrations: Mutex::new(Vec::new()),
        }
    }

    /// Identifier of the owning component, used in diagnostics
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// The registry, if the session that owns it is still alive
    pub fn registry(&self) -> Option<Arc<ServiceRegistry>> {
        self.registry.upgrade()
    }

    /// Register a service and remember it for release on [`stop`](Self::stop).
    ///
    /// Returns false if the registry is gone or already holds this service
    /// under `name`.
    pub fn register_service<T>(&self, service: Arc<T>, name: &str) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let Some(registry) = self.registry() else {
            return false;
        };
        let key = ServiceKey::of(&service);
        if !registry.register_service(Arc::clone(&service), name) {
            return false;
        }

        let owned_name = name.to_string();
        self.registrations.lock().push(Registration {
            kind: RegistrationKind::Service,
            key,
            name: name.to_string(),
            undo: Box::new(move |registry: &ServiceRegistry| {
                registry.unregister_service(&service, &owned_name);
            }),
        });
        true
    }

    /// Unregister a service early. Unknown services are ignored.
    pub fn unregister_service<T>(&self, service: &Arc<T>, name: &str) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.forget(RegistrationKind::Service, ServiceKey::of(service), name);
        self.registry()
            .map(|registry| registry.unregister_service(service, name))
            .unwrap_or(false)
    }

    /// Register a tracker and remember it for release on [`stop`](Self::stop).
    pub fn register_tracker<T>(&self, tracker: Arc<dyn ServiceTracker<T>>, name: &str) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let Some(registry) = self.registry() else {
            return false;
        };
        let key = ServiceKey::of(&tracker);
        if !registry.register_tracker(Arc::clone(&tracker), name) {
            return false;
        }

        let owned_name = name.to_string();
        self.registrations.lock().push(Registration {
            kind: RegistrationKind::Tracker,
            key,
            name: name.to_string(),
            undo: Box::new(move |registry: &ServiceRegistry| {
                registry.unregister_tracker(&tracker, &owned_name);
            }),
        });
        true
    }

    pub fn unregister_tracker<T>(&self, tracker: &Arc<dyn ServiceTracker<T>>, name: &str) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.forget(RegistrationKind::Tracker, ServiceKey::of(tracker), name);
        self.registry()
            .map(|registry| registry.unregister_tracker(tracker, name))
            .unwrap_or(false)
    }

    pub fn get_service<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.registry()?.get_service(name)
    }

    pub fn get_services<T>(&self, name: &str) -> Vec<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.registry()
            .map(|registry| registry.get_services(name))
            .unwrap_or_default()
    }

    /// Number of registrations this context still owns
    pub fn registration_count(&self) -> usize {
        self.registrations.lock().len()
    }

    /// Release everything registered through this context, newest first.
    ///
    /// Safe to call more than once; later calls find nothing to release.
    pub fn stop(&self) {
        let registrations = std::mem::take(&mut *self.registrations.lock());
        if registrations.is_empty() {
            return;
        }

        let released = registrations.len();
        let registry = self.registry();
        if let Some(registry) = &registry {
            for registration in registrations.into_iter().rev() {
                (registration.undo)(registry.as_ref());
            }
        }

        PluginContextStopped {
            plugin: &self.plugin,
            released,
            registry_alive: registry.is_some(),
        }
        .log();
    }

    fn forget(&self, kind: RegistrationKind, key: ServiceKey, name: &str) {
        self.registrations
            .lock()
            .retain(|r| !(r.kind == kind && r.key == key && r.name == name));
    }
}

impl Drop for PluginContext {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginContext")
            .field("plugin", &self.plugin)
            .field("registrations", &self.registration_count())
            .field("registry_alive", &(self.registry.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait EditorService: Send + Sync {
        fn id(&self) -> u32;
    }

    struct Editor(u32);

    impl EditorService for Editor {
        fn id(&self) -> u32 {
            self.0
        }
    }

    struct CountingTracker(Mutex<i32>);

    impl ServiceTracker<dyn EditorService> for CountingTracker {
        fn add_service(&self, _service: &Arc<dyn EditorService>, _name: &str) {
            *self.0.lock() += 1;
        }

        fn remove_service(&self, _service: &Arc<dyn EditorService>, _name: &str) {
            *self.0.lock() -= 1;
        }
    }

    #[test]
    fn test_stop_releases_only_own_registrations() {
        let registry = Arc::new(ServiceRegistry::new());
        let first = PluginContext::new("first", &registry);
        let second = PluginContext::new("second", &registry);

        let a: Arc<dyn EditorService> = Arc::new(Editor(1));
        let b: Arc<dyn EditorService> = Arc::new(Editor(2));
        first.register_service(Arc::clone(&a), "editor.id");
        second.register_service(Arc::clone(&b), "editor.id");
        first.register_service(Arc::new(Editor(3)) as Arc<dyn EditorService>, "editor.other");

        first.stop();

        let remaining = registry.get_services::<dyn EditorService>("editor.id");
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id(), 2);
        assert!(registry.get_service::<dyn EditorService>("editor.other").is_none());
        assert_eq!(first.registration_count(), 0);
        assert_eq!(second.registration_count(), 1);
    }

    #[test]
    fn test_drop_stops_context() {
        let registry = Arc::new(ServiceRegistry::new());
        {
            let context = PluginContext::new("scoped", &registry);
            context.register_service(Arc::new(Editor(1)) as Arc<dyn EditorService>, "editor.id");
            assert_eq!(registry.len(), 1);
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_stop_twice_is_harmless() {
        let registry = Arc::new(ServiceRegistry::new());
        let context = PluginContext::new("twice", &registry);
        context.register_service(Arc::new(1u8), "n");
        context.stop();
        context.stop();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_explicit_unregister_is_forgotten() {
        let registry = Arc::new(ServiceRegistry::new());
        let context = PluginContext::new("early", &registry);
        let svc: Arc<dyn EditorService> = Arc::new(Editor(1));

        assert!(context.register_service(Arc::clone(&svc), "editor.id"));
        assert!(!context.register_service(Arc::clone(&svc), "editor.id"));
        assert_eq!(context.registration_count(), 1);

        assert!(context.unregister_service(&svc, "editor.id"));
        assert_eq!(context.registration_count(), 0);
        assert!(!context.unregister_service(&svc, "editor.id"));
    }

    #[test]
    fn test_stop_unregisters_trackers() {
        let registry = Arc::new(ServiceRegistry::new());
        let counter = Arc::new(CountingTracker(Mutex::new(0)));
        let tracker: Arc<dyn ServiceTracker<dyn EditorService>> = counter.clone();

        let watcher = PluginContext::new("watcher", &registry);
        assert!(watcher.register_tracker(tracker, "editor.id"));

        let provider = PluginContext::new("provider", &registry);
        provider.register_service(Arc::new(Editor(1)) as Arc<dyn EditorService>, "editor.id");
        assert_eq!(*counter.0.lock(), 1);

        watcher.stop();
        provider.stop();
        // the watcher no longer observes the removal
        assert_eq!(*counter.0.lock(), 1);
    }

    #[test]
    fn test_context_outliving_registry() {
        let registry = Arc::new(ServiceRegistry::new());
        let context = PluginContext::new("orphan", &registry);
        context.register_service(Arc::new(5u16), "n");
        assert_eq!(context.get_service::<u16>("n").as_deref(), Some(&5));

        drop(registry);

        assert!(context.registry().is_none());
        assert!(context.get_service::<u16>("n").is_none());
        assert!(context.get_services::<u16>("n").is_empty());
        assert!(!context.register_service(Arc::new(6u16), "n"));
        context.stop();
        assert_eq!(context.registration_count(), 0);
    }
}
