//! Session termination signal
//!
//! Process signals and end-of-input both funnel into one [`Termination`]
//! handle, so the collector never needs to know what ended the session.
//! Triggering is idempotent: the first reason sticks and later triggers are
//! ignored.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Why the session was asked to end
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminationReason {
    /// SIGINT / ctrl-c
    Interrupt,
    /// SIGTERM
    Terminate,
    /// SIGHUP
    Hangup,
    /// The notification source ran out of input
    EndOfInput,
    /// The session finished and is stopping its collaborators
    Shutdown,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TerminationReason::Interrupt => "interrupt",
            TerminationReason::Terminate => "terminate",
            TerminationReason::Hangup => "hangup",
            TerminationReason::EndOfInput => "end of input",
            TerminationReason::Shutdown => "shutdown",
        };
        f.write_str(s)
    }
}

/// Cloneable handle to a once-only termination flag
#[derive(Clone, Debug)]
pub struct Termination {
    tx: Arc<watch::Sender<Option<TerminationReason>>>,
}

impl Default for Termination {
    fn default() -> Self {
        Self::new()
    }
}

impl Termination {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Request termination
    ///
    /// Returns `true` if this call ended the session, `false` if it had
    /// already been triggered.
    pub fn trigger(&self, reason: TerminationReason) -> bool {
        let first = self.tx.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(reason);
                true
            } else {
                false
            }
        });
        if first {
            info!(%reason, "Termination requested");
        } else {
            debug!(%reason, "Termination::trigger: already triggered, ignoring");
        }
        first
    }

    pub fn is_triggered(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// The reason recorded by the first trigger, if any
    pub fn reason(&self) -> Option<TerminationReason> {
        *self.tx.borrow()
    }

    /// Wait until termination has been triggered
    ///
    /// Resolves immediately if it already has been.
    pub async fn triggered(&self) -> TerminationReason {
        let mut rx = self.tx.subscribe();
        match rx.wait_for(|r| r.is_some()).await {
            Ok(reason) => (*reason).unwrap_or(TerminationReason::Shutdown),
            // The sender lives as long as `self`, so this is unreachable in practice
            Err(_) => TerminationReason::Shutdown,
        }
    }
}

/// Spawn a task that triggers `termination` on SIGINT, SIGTERM or SIGHUP
///
/// On non-Unix platforms only ctrl-c is observed.
pub fn spawn_signal_listener(termination: Termination) -> eyre::Result<JoinHandle<()>> {
    debug!("spawn_signal_listener: setting up signal handlers");

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sighup = signal(SignalKind::hangup())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        Ok(tokio::spawn(async move {
            let reason = tokio::select! {
                _ = sigint.recv() => {
                    debug!("spawn_signal_listener: SIGINT received");
                    TerminationReason::Interrupt
                }
                _ = sigterm.recv() => {
                    debug!("spawn_signal_listener: SIGTERM received");
                    TerminationReason::Terminate
                }
                _ = sighup.recv() => {
                    debug!("spawn_signal_listener: SIGHUP received");
                    TerminationReason::Hangup
                }
                _ = termination.triggered() => {
                    debug!("spawn_signal_listener: session already ending, exiting");
                    return;
                }
            };
            termination.trigger(reason);
        }))
    }

    #[cfg(not(unix))]
    {
        Ok(tokio::spawn(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if result.is_ok() {
                        debug!("spawn_signal_listener: ctrl_c received");
                        termination.trigger(TerminationReason::Interrupt);
                    }
                }
                _ = termination.triggered() => {
                    debug!("spawn_signal_listener: session already ending, exiting");
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_is_not_triggered() {
        let termination = Termination::new();
        assert!(!termination.is_triggered());
        assert_eq!(termination.reason(), None);
    }

    #[test]
    fn test_first_reason_wins() {
        let termination = Termination::new();
        assert!(termination.trigger(TerminationReason::EndOfInput));
        assert!(!termination.trigger(TerminationReason::Interrupt));
        assert!(!termination.trigger(TerminationReason::Shutdown));
        assert_eq!(termination.reason(), Some(TerminationReason::EndOfInput));
    }

    #[test]
    fn test_clones_share_state() {
        let termination = Termination::new();
        let other = termination.clone();
        other.trigger(TerminationReason::Hangup);
        assert!(termination.is_triggered());
        assert_eq!(termination.reason(), Some(TerminationReason::Hangup));
    }

    #[tokio::test]
    async fn test_triggered_resolves_immediately_when_already_triggered() {
        let termination = Termination::new();
        termination.trigger(TerminationReason::Terminate);

        let reason = tokio::time::timeout(Duration::from_secs(1), termination.triggered())
            .await
            .expect("should resolve immediately");
        assert_eq!(reason, TerminationReason::Terminate);
    }

    #[tokio::test]
    async fn test_triggered_wakes_waiter() {
        let termination = Termination::new();
        let waiter = termination.clone();
        let handle = tokio::spawn(async move { waiter.triggered().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        termination.trigger(TerminationReason::Interrupt);

        let reason = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("waiter should wake")
            .expect("task should not panic");
        assert_eq!(reason, TerminationReason::Interrupt);
    }

    #[tokio::test]
    async fn test_signal_listener_exits_when_session_ends() {
        let termination = Termination::new();
        let handle = spawn_signal_listener(termination.clone()).unwrap();

        termination.trigger(TerminationReason::Shutdown);

        let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(result.is_ok(), "Signal listener should exit once terminated");
        assert_eq!(termination.reason(), Some(TerminationReason::Shutdown));
    }
}
