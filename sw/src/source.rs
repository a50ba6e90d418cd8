//! Notification sources - where operator ticks come from
//!
//! A source runs on its own OS thread and pushes [`Tick`]s into an unbounded
//! channel. When it runs out of input it triggers [`TerminationReason::EndOfInput`]
//! so the collector sees the same signal it would get from ctrl-c.

use std::io::{self, BufRead, BufReader, Stdin};
use std::thread::JoinHandle;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::termination::{Termination, TerminationReason};

/// Operator marked an occurrence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick;

pub type TickSender = mpsc::UnboundedSender<Tick>;

/// Producer of operator ticks
pub trait NotificationSource: Send + 'static {
    /// Block delivering ticks until input ends or `termination` fires
    ///
    /// Implementations must not send after observing termination, and must
    /// translate their own end of input into a termination trigger.
    fn listen(self, ticks: TickSender, termination: Termination);
}

/// Treats every line read from `R` as one tick
///
/// Line content is ignored. A line that is not valid UTF-8 is skipped.
pub struct LineSource<R> {
    reader: R,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl LineSource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(io::stdin()))
    }
}

impl<R: BufRead + Send + 'static> NotificationSource for LineSource<R> {
    fn listen(self, ticks: TickSender, termination: Termination) {
        debug!("LineSource::listen: started");
        for line in self.reader.lines() {
            if termination.is_triggered() {
                debug!("LineSource::listen: termination observed, stopping");
                return;
            }
            match line {
                Ok(_) => {
                    if ticks.send(Tick).is_err() {
                        debug!("LineSource::listen: tick receiver gone, stopping");
                        return;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    warn!(error = %e, "LineSource: skipping undecodable line");
                }
                Err(e) => {
                    warn!(error = %e, "LineSource: read failed, treating as end of input");
                    break;
                }
            }
        }
        debug!("LineSource::listen: end of input");
        termination.trigger(TerminationReason::EndOfInput);
    }
}

/// Run `source` on a dedicated thread
///
/// Blocking reads of interactive input must not tie up the async runtime, so
/// sources never run as tokio tasks.
pub fn spawn_source<S: NotificationSource>(source: S, ticks: TickSender, termination: Termination) -> JoinHandle<()> {
    debug!("spawn_source: called");
    std::thread::spawn(move || {
        source.listen(ticks, termination);
        debug!("spawn_source: source thread exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn drain(rx: &mut mpsc::UnboundedReceiver<Tick>) -> usize {
        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }

    #[test]
    fn test_each_line_is_a_tick() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let termination = Termination::new();

        LineSource::new(Cursor::new("\n\nsome text\n")).listen(tx, termination.clone());

        assert_eq!(drain(&mut rx), 3);
        assert_eq!(termination.reason(), Some(TerminationReason::EndOfInput));
    }

    #[test]
    fn test_empty_input_ends_immediately() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let termination = Termination::new();

        LineSource::new(Cursor::new("")).listen(tx, termination.clone());

        assert_eq!(drain(&mut rx), 0);
        assert_eq!(termination.reason(), Some(TerminationReason::EndOfInput));
    }

    #[test]
    fn test_last_line_without_newline_counts() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let termination = Termination::new();

        LineSource::new(Cursor::new("a\nb")).listen(tx, termination);

        assert_eq!(drain(&mut rx), 2);
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let termination = Termination::new();
        let input: &[u8] = b"\n\xff\xfe\n\n";

        LineSource::new(Cursor::new(input)).listen(tx, termination.clone());

        assert_eq!(drain(&mut rx), 2);
        assert!(termination.is_triggered());
    }

    #[test]
    fn test_no_ticks_after_termination() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let termination = Termination::new();
        termination.trigger(TerminationReason::Interrupt);

        LineSource::new(Cursor::new("\n\n\n")).listen(tx, termination.clone());

        assert_eq!(drain(&mut rx), 0);
        // Stopping an already-terminated source is a no-op
        assert_eq!(termination.reason(), Some(TerminationReason::Interrupt));
    }

    #[test]
    fn test_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let termination = Termination::new();

        LineSource::new(Cursor::new("\n\n")).listen(tx, termination.clone());

        assert!(!termination.is_triggered());
    }

    #[test]
    fn test_spawn_source_runs_on_thread() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let termination = Termination::new();

        let handle = spawn_source(LineSource::new(Cursor::new("\n\n")), tx, termination.clone());
        handle.join().expect("source thread should not panic");

        assert_eq!(drain(&mut rx), 2);
        assert!(termination.is_triggered());
    }
}
