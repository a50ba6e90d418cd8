//! Event collector - the session wait loop
//!
//! The collector is the only writer of the [`EventLog`]. It records `start`,
//! then waits on whichever of {next tick, termination} is ready first, and
//! records `end` once termination wins. Ticks already queued when termination
//! fires are recorded first: the select is biased towards the tick channel.
//!
//! The tick channel is unbounded and every tick writes one prompt. A source
//! that floods ticks (`yes "" | sw`) therefore grows the queue and the status
//! output without limit; the session still ends once the source stops
//! sending and triggers termination.

use std::fmt;
use std::io::Write;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::event::{EventLabel, EventLog};
use crate::source::Tick;
use crate::termination::Termination;

/// Usage banner written to the status channel when a session starts
pub const BANNER: &str = "# Record: <enter>, Exit: <ctrl+d> or <ctrl+c>";

/// Runs one session, writing human-facing progress to `status`
///
/// `status` must not be the report destination; in the binary it is stderr.
pub struct Collector<W: Write> {
    status: W,
    log: EventLog,
}

impl<W: Write> Collector<W> {
    pub fn new(status: W) -> Self {
        debug!("Collector::new: called");
        Self {
            status,
            log: EventLog::new(),
        }
    }

    /// Run the wait loop until `termination` fires and return the finished log
    ///
    /// A closed tick channel is not termination by itself; the loop keeps
    /// waiting on `termination`.
    pub async fn run(mut self, mut ticks: mpsc::UnboundedReceiver<Tick>, termination: Termination) -> EventLog {
        debug!("Collector::run: called");
        self.status_line(format_args!("{BANNER}\n"));

        self.record(EventLabel::Start);
        self.prompt();

        let mut ticks_open = true;
        loop {
            tokio::select! {
                biased;

                tick = ticks.recv(), if ticks_open => match tick {
                    Some(Tick) => {
                        self.record(EventLabel::Tick);
                        self.prompt();
                    }
                    None => {
                        debug!("Collector::run: tick channel closed, waiting for termination");
                        ticks_open = false;
                    }
                },

                reason = termination.triggered() => {
                    debug!(%reason, "Collector::run: termination received");
                    break;
                }
            }
        }

        self.record(EventLabel::End);
        // Leave the terminal on a fresh line after the last prompt
        self.status_line(format_args!("\n"));

        info!(
            events = self.log.len(),
            ticks = self.log.tick_count(),
            "Session finished"
        );
        self.log
    }

    fn record(&mut self, label: EventLabel) {
        let seq = self.log.record(label);
        debug!(seq, %label, "Collector::record: event appended");
    }

    fn prompt(&mut self) {
        let next = self.log.next_seq();
        self.status_line(format_args!("# Waiting for [{next}]> "));
    }

    fn status_line(&mut self, args: fmt::Arguments<'_>) {
        let result = self.status.write_fmt(args).and_then(|_| self.status.flush());
        if let Err(e) = result {
            warn!(error = %e, "Collector: failed to write status message");
        }
    }
}
