//! Cooperative shutdown coordination (spec §4.8 "the driver accepts a
//! cancellation token"), generalized from a broadcast-based signal into a
//! single-flag `watch` channel — this driver has one cancellation point
//! (between batches/issues), not many independent subscribers draining
//! in parallel, so the fuller broadcast+drain-confirmation machinery
//! would be unused ceremony here.

use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx, rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    /// Resolves once `cancel()` has been called; used in `tokio::select!`
    /// alongside in-flight work so a worker can bail between network
    /// calls at the latest (spec §5).
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow() {
            return;
        }
        let _ = rx.changed().await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_cancelled());
        signal.cancel();
        signal.cancelled().await;
        assert!(signal.is_cancelled());
    }
}
