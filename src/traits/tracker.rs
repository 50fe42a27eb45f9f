use std::sync::Arc;

/// Observer notified when services of type `T` come and go under a name.
///
/// Trackers registered on a name are first replayed every matching service
/// already registered there, then receive each later change. Callbacks run
/// outside the registry lock, so a tracker may look services up or register
/// its own.
pub trait ServiceTracker<T: ?Sized>: Send + Sync {
    fn add_service(&self, service: &Arc<T>, name: &str);

    fn remove_service(&self, service: &Arc<T>, name: &str);
}
