use std::rc::Rc;

use tokio::sync::watch;

/// Per-mount-cycle cancellation flag.
///
/// Setting it does not interrupt engine creation; the mount checks it once
/// creation resolves. Only the wait for a surface is cut short.
#[derive(Clone)]
pub(crate) struct CancelToken {
    tx: Rc<watch::Sender<bool>>,
}

impl CancelToken {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Rc::new(tx) }
    }

    pub(crate) fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `cancel()` has been called.
    pub(crate) async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // Unreachable while `self` holds the sender.
            std::future::pending::<()>().await;
        }
    }
}
