// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::{ReentrantMutex, RwLock};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::observability::messages::{registry::*, StructuredLog};
use crate::traits::ServiceTracker;

/// Identity of a registration: the allocation behind the `Arc` plus the type
/// it was registered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ServiceKey {
    addr: usize,
    type_id: TypeId,
}

impl ServiceKey {
    pub(crate) fn of<T: ?Sized + 'static>(service: &Arc<T>) -> Self {
        Self {
            addr: Arc::as_ptr(service) as *const () as usize,
            type_id: TypeId::of::<T>(),
        }
    }
}

#[derive(Clone)]
struct ServiceEntry {
    key: ServiceKey,
    type_name: &'static str,
    // an `Arc<T>`, so unsized `T` survives the round trip through `Any`
    handle: Arc<dyn Any + Send + Sync>,
}

impl ServiceEntry {
    fn new<T: ?Sized + Send + Sync + 'static>(service: Arc<T>) -> Self {
        Self {
            key: ServiceKey::of(&service),
            type_name: std::any::type_name::<T>(),
            handle: Arc::new(service),
        }
    }

    fn downcast<T: ?Sized + 'static>(&self) -> Option<&Arc<T>> {
        self.handle.downcast_ref::<Arc<T>>()
    }
}

#[derive(Clone, Copy)]
enum TrackerEvent {
    Added,
    Removed,
}

trait ErasedTracker: Send + Sync {
    fn notify(&self, event: TrackerEvent, entry: &ServiceEntry, name: &str);
}

struct TypedTracker<T: ?Sized> {
    tracker: Arc<dyn ServiceTracker<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> ErasedTracker for TypedTracker<T> {
    fn notify(&self, event: TrackerEvent, entry: &ServiceEntry, name: &str) {
        let Some(service) = entry.downcast::<T>() else {
            return;
        };
        match event {
            TrackerEvent::Added => self.tracker.add_service(service, name),
            TrackerEvent::Removed => self.tracker.remove_service(service, name),
        }
    }
}

#[derive(Clone)]
struct TrackerEntry {
    key: ServiceKey,
    tracker: Arc<dyn ErasedTracker>,
}

#[derive(Default)]
struct RegistryState {
    services: HashMap<String, Vec<ServiceEntry>>,
    trackers: HashMap<String, Vec<TrackerEntry>>,
}

/// Session-scoped directory of services published under logical names.
///
/// Components register capabilities while they start and unregister them
/// when they stop; other components look collaborators up by name and
/// expected type without any compile-time coupling. One name may carry many
/// providers, kept in registration order.
///
/// The registry is a passive store: it never unregisters anything on its
/// own. [`PluginContext`](crate::registry::PluginContext) pairs registrations
/// with a component's lifetime.
///
/// All reads and writes go through one lock, so a lookup never observes a
/// half-applied registration. Tracker callbacks run after that lock is
/// released, so a tracker may call back into the registry.
///
/// Each mutation and the tracker notifications it causes run under a
/// reentrant dispatch guard, so trackers see add/remove events in the order
/// the mutations were applied. A tracker that blocks waiting on another
/// thread's registry mutation will deadlock.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use valvechain::registry::ServiceRegistry;
///
/// trait DialogService: Send + Sync {
///     fn title(&self) -> String;
/// }
///
/// struct Confirm;
/// impl DialogService for Confirm {
///     fn title(&self) -> String { "confirm".into() }
/// }
///
/// let registry = ServiceRegistry::new();
/// let dialog: Arc<dyn DialogService> = Arc::new(Confirm);
/// registry.register_service(Arc::clone(&dialog), "dialog.id");
///
/// let found = registry.get_service::<dyn DialogService>("dialog.id").unwrap();
/// assert_eq!(found.title(), "confirm");
///
/// registry.unregister_service(&dialog, "dialog.id");
/// assert!(registry.get_service::<dyn DialogService>("dialog.id").is_none());
/// ```
#[derive(Default)]
pub struct ServiceRegistry {
    state: RwLock<RegistryState>,
    // held across "mutate, then notify"; reentrant for trackers that mutate
    dispatch: ReentrantMutex<()>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `service` under `name`.
    ///
    /// Registering the same `Arc` (same allocation, same type) twice under
    /// one name is ignored. Returns whether the service was added.
    pub fn register_service<T>(&self, service: Arc<T>, name: &str) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let entry = ServiceEntry::new(service);
        let _dispatch = self.dispatch.lock();

        let (provider_count, trackers) = {
            let mut state = self.state.write();
            let entries = state.services.entry(name.to_string()).or_default();
            if entries.iter().any(|e| e.key == entry.key) {
                DuplicateRegistrationIgnored {
                    name,
                    service_type: entry.type_name,
                }
                .log();
                return false;
            }
            entries.push(entry.clone());
            let provider_count = entries.len();
            (provider_count, state.trackers.get(name).cloned().unwrap_or_default())
        };

        ServiceRegistered {
            name,
            service_type: entry.type_name,
            provider_count,
        }
        .log();

        for tracker in &trackers {
            tracker.tracker.notify(TrackerEvent::Added, &entry, name);
        }
        true
    }

    /// Withdraw `service` from `name`.
    ///
    /// Withdrawing a service that is not registered there is a no-op.
    /// Returns whether anything was removed.
    pub fn unregister_service<T>(&self, service: &Arc<T>, name: &str) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = ServiceKey::of(service);
        let _dispatch = self.dispatch.lock();

        let (entry, provider_count, trackers) = {
            let mut state = self.state.write();
            let Some(entries) = state.services.get_mut(name) else {
                return false;
            };
            let Some(position) = entries.iter().position(|e| e.key == key) else {
                return false;
            };
            let entry = entries.remove(position);
            let provider_count = entries.len();
            if entries.is_empty() {
                state.services.remove(name);
            }
            (entry, provider_count, state.trackers.get(name).cloned().unwrap_or_default())
        };

        ServiceUnregistered {
            name,
            service_type: entry.type_name,
            provider_count,
        }
        .log();

        for tracker in &trackers {
            tracker.tracker.notify(TrackerEvent::Removed, &entry, name);
        }
        true
    }

    /// The most recently registered service of type `T` under `name`.
    ///
    /// Absence is a normal outcome: the providing component may not have
    /// started yet.
    pub fn get_service<T>(&self, name: &str) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let state = self.state.read();
        state
            .services
            .get(name)?
            .iter()
            .rev()
            .find_map(|e| e.downcast::<T>().cloned())
    }

    /// Every service of type `T` under `name`, in registration order.
    pub fn get_services<T>(&self, name: &str) -> Vec<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let state = self.state.read();
        state
            .services
            .get(name)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|e| e.downcast::<T>().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Start observing services of type `T` under `name`.
    ///
    /// The tracker is immediately told about matching services already
    /// registered, then about every later registration and removal.
    /// Registering the same tracker twice is ignored. Returns whether the
    /// tracker was added.
    pub fn register_tracker<T>(&self, tracker: Arc<dyn ServiceTracker<T>>, name: &str) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = ServiceKey::of(&tracker);
        let typed: Arc<dyn ErasedTracker> = Arc::new(TypedTracker { tracker });
        let _dispatch = self.dispatch.lock();

        let existing = {
            let mut state = self.state.write();
            let trackers = state.trackers.entry(name.to_string()).or_default();
            if trackers.iter().any(|t| t.key == key) {
                return false;
            }
            trackers.push(TrackerEntry {
                key,
                tracker: Arc::clone(&typed),
            });
            state.services.get(name).cloned().unwrap_or_default()
        };

        let replayed: Vec<&ServiceEntry> =
            existing.iter().filter(|e| e.downcast::<T>().is_some()).collect();
        TrackerRegistered {
            name,
            service_type: std::any::type_name::<T>(),
            replayed: replayed.len(),
        }
        .log();

        for entry in replayed {
            typed.notify(TrackerEvent::Added, entry, name);
        }
        true
    }

    /// Stop notifying `tracker` about `name`. Unknown trackers are ignored.
    pub fn unregister_tracker<T>(&self, tracker: &Arc<dyn ServiceTracker<T>>, name: &str) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = ServiceKey::of(tracker);
        let _dispatch = self.dispatch.lock();
        let mut state = self.state.write();
        let Some(trackers) = state.trackers.get_mut(name) else {
            return false;
        };
        let before = trackers.len();
        trackers.retain(|t| t.key != key);
        let removed = trackers.len() != before;
        if trackers.is_empty() {
            state.trackers.remove(name);
        }
        removed
    }

    /// Names that currently carry at least one service, sorted
    pub fn service_names(&self) -> Vec<String> {
        let state = self.state.read();
        let mut names: Vec<String> = state.services.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Total number of registrations across all names
    pub fn len(&self) -> usize {
        self.state.read().services.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().services.is_empty()
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        let mut services: Vec<(&String, usize)> =
            state.services.iter().map(|(k, v)| (k, v.len())).collect();
        services.sort_unstable();
        f.debug_struct("ServiceRegistry")
            .field("services", &services)
            .field("tracked_names", &state.trackers.len())
            .finish()
    }
}
