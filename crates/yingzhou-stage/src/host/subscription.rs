use std::rc::Rc;

use super::{HostEvents, ListenerId};

/// Owned registration with a host event source.
///
/// Dropping the subscription deregisters the listener, so every exit path
/// releases it.
pub struct Subscription {
    host: Rc<dyn HostEvents>,
    id: Option<ListenerId>,
    label: &'static str,
}

impl Subscription {
    pub fn new(host: Rc<dyn HostEvents>, id: ListenerId, label: &'static str) -> Self {
        Self {
            host,
            id: Some(id),
            label,
        }
    }

    pub fn id(&self) -> Option<ListenerId> {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }

    /// Deregisters now. Later calls (and the eventual drop) are no-ops.
    pub fn release(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if !self.host.remove_listener(id) {
            log::warn!("{} listener {id:?} was already gone from the host", self.label);
        } else {
            log::trace!("{} listener {id:?} removed", self.label);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ListenerRegistry;

    #[test]
    fn drop_deregisters() {
        let registry = Rc::new(ListenerRegistry::new());
        let id = registry.add_frame_listener(Box::new(|_| {}));
        let sub = Subscription::new(registry.clone(), id, "frame");
        assert_eq!(registry.frame_listener_count(), 1);

        drop(sub);
        assert_eq!(registry.frame_listener_count(), 0);
    }

    #[test]
    fn release_is_idempotent() {
        let registry = Rc::new(ListenerRegistry::new());
        let id = registry.add_resize_listener(Box::new(|_| {}));
        let mut sub = Subscription::new(registry.clone(), id, "resize");

        sub.release();
        assert!(!sub.is_active());
        sub.release();
        drop(sub);
        assert_eq!(registry.resize_listener_count(), 0);
    }
}
