use crate::{Error, Result};
use log::debug;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

/// Process-wide Ctrl+C notification.
///
/// Installed once at startup. Every blocking wait in the crate races against
/// it so that an interrupt ends the whole run instead of a single step.
#[derive(Debug, Clone)]
pub struct Interrupt {
    rx: watch::Receiver<bool>,
}

/// Fires an [`Interrupt`] created with [`Interrupt::manual`].
#[derive(Debug)]
pub struct InterruptTrigger {
    tx: watch::Sender<bool>,
}

impl InterruptTrigger {
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }
}

impl Interrupt {
    /// Listen for Ctrl+C. Must be called from inside the tokio runtime.
    ///
    /// On unix the SIGINT handler is registered before this returns, so a
    /// signal arriving right after startup is never lost.
    pub fn install() -> Self {
        let (tx, rx) = watch::channel(false);

        #[cfg(unix)]
        let listener = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt());

        tokio::spawn(async move {
            #[cfg(unix)]
            let received = match listener {
                Ok(mut signal) => signal.recv().await.is_some(),
                Err(e) => {
                    debug!("Unable to listen for SIGINT: {}", e);
                    false
                }
            };

            #[cfg(not(unix))]
            let received = match tokio::signal::ctrl_c().await {
                Ok(()) => true,
                Err(e) => {
                    debug!("Unable to listen for Ctrl+C: {}", e);
                    false
                }
            };

            if received {
                debug!("Interrupt received");
                let _ = tx.send(true);
            }
        });
        Self { rx }
    }

    /// A handle that fires only through the returned trigger.
    pub fn manual() -> (InterruptTrigger, Self) {
        let (tx, rx) = watch::channel(false);
        (InterruptTrigger { tx }, Self { rx })
    }

    /// A handle that never fires.
    pub fn never() -> Self {
        let (_, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the interrupt has fired; pends forever otherwise.
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        let fired = rx.wait_for(|fired| *fired).await.is_ok();
        if !fired {
            // sender is gone without firing
            std::future::pending::<()>().await;
        }
    }

    /// Wait up to `grace` for the interrupt to arrive.
    pub async fn arrives_within(&self, grace: Duration) -> bool {
        tokio::time::timeout(grace, self.triggered()).await.is_ok()
    }

    /// Run `fut` to completion unless the interrupt fires first.
    pub async fn guard<F: Future>(&self, fut: F) -> Result<F::Output> {
        tokio::select! {
            biased;
            _ = self.triggered() => Err(Error::Interrupted),
            output = fut => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_guard_passes_output_through() {
        let interrupt = Interrupt::never();
        let value = interrupt.guard(async { 7 }).await.unwrap();
        assert_eq!(value, 7);
        assert!(!interrupt.is_triggered());
    }

    #[tokio::test]
    async fn test_guard_aborts_pending_wait() {
        let (trigger, interrupt) = Interrupt::manual();
        trigger.trigger();
        let result = interrupt.guard(std::future::pending::<()>()).await;
        assert!(matches!(result, Err(Error::Interrupted)));
        assert!(interrupt.is_triggered());
    }

    #[tokio::test]
    async fn test_clones_observe_the_same_signal() {
        let (trigger, interrupt) = Interrupt::manual();
        let clone = interrupt.clone();
        assert!(!clone.arrives_within(Duration::from_millis(10)).await);
        trigger.trigger();
        assert!(clone.arrives_within(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn test_never_does_not_fire() {
        let interrupt = Interrupt::never();
        assert!(!interrupt.arrives_within(Duration::from_millis(20)).await);
    }
}
