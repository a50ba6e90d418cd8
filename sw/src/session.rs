//! Session wiring: source thread + collector + shutdown

use std::io::Write;

use tokio::sync::mpsc;
use tracing::debug;

use crate::collector::Collector;
use crate::event::EventLog;
use crate::source::{NotificationSource, spawn_source};
use crate::termination::{Termination, TerminationReason};

/// Run one recording session to completion
///
/// Once the collector is done the source is told to stop through
/// `termination`, even if it was the source that ended the session. The
/// source thread is left detached: it may still be blocked in a read, and it
/// goes away with the process.
pub async fn run_session<S, W>(source: S, termination: Termination, status: W) -> EventLog
where
    S: NotificationSource,
    W: Write,
{
    debug!("run_session: called");
    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let _source_thread = spawn_source(source, tick_tx, termination.clone());

    let log = Collector::new(status).run(tick_rx, termination.clone()).await;

    termination.trigger(TerminationReason::Shutdown);
    debug!(events = log.len(), "run_session: complete");
    log
}
