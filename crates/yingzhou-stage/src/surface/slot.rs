use tokio::sync::watch;

/// Holds the drawable surface while the host has it mounted.
///
/// The slot is filled by the host once its drawable element exists and
/// emptied when the element goes away. An empty slot is a normal transient
/// state: engine creation simply waits on [`SurfaceSlot::ready`].
///
/// `S` is a cheap handle (e.g. `Arc<Window>`); readers receive clones.
pub struct SurfaceSlot<S> {
    tx: watch::Sender<Option<S>>,
}

impl<S: Clone> SurfaceSlot<S> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Publishes a mounted surface, waking any pending `ready()` callers.
    ///
    /// Binding over an existing surface replaces it; the previous handle is
    /// returned.
    pub fn bind(&self, surface: S) -> Option<S> {
        let previous = self.tx.send_replace(Some(surface));
        if previous.is_some() {
            log::warn!("surface rebound while a previous surface was still bound");
        }
        previous
    }

    /// Empties the slot and returns the surface that was bound, if any.
    pub fn unbind(&self) -> Option<S> {
        self.tx.send_replace(None)
    }

    pub fn is_bound(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn current(&self) -> Option<S> {
        self.tx.borrow().clone()
    }

    /// Resolves with the surface once the slot is non-empty.
    ///
    /// Returns immediately if a surface is already bound.
    pub async fn ready(&self) -> S {
        let mut rx = self.tx.subscribe();
        loop {
            if let Some(surface) = rx.borrow_and_update().as_ref() {
                return surface.clone();
            }
            // `self` keeps the sender alive, so the channel cannot close here.
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl<S: Clone> Default for SurfaceSlot<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn starts_empty() {
        let slot = SurfaceSlot::<u32>::new();
        assert!(!slot.is_bound());
        assert_eq!(slot.current(), None);
    }

    #[test]
    fn bind_then_unbind() {
        let slot = SurfaceSlot::new();
        assert_eq!(slot.bind(7u32), None);
        assert!(slot.is_bound());
        assert_eq!(slot.current(), Some(7));
        assert_eq!(slot.unbind(), Some(7));
        assert!(!slot.is_bound());
        assert_eq!(slot.unbind(), None);
    }

    #[test]
    fn rebinding_returns_previous() {
        let slot = SurfaceSlot::new();
        slot.bind(1u32);
        assert_eq!(slot.bind(2), Some(1));
        assert_eq!(slot.current(), Some(2));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn ready_resolves_immediately_when_bound() {
        let slot = SurfaceSlot::new();
        slot.bind(3u32);
        assert_eq!(slot.ready().await, 3);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn ready_waits_for_binding() {
        let slot = Rc::new(SurfaceSlot::<u32>::new());
        let local = tokio::task::LocalSet::new();

        local
            .run_until(async {
                let waiter = tokio::task::spawn_local({
                    let slot = Rc::clone(&slot);
                    async move { slot.ready().await }
                });

                tokio::task::yield_now().await;
                assert!(!waiter.is_finished());

                slot.bind(11);
                assert_eq!(waiter.await.unwrap(), 11);
            })
            .await;
    }
}
