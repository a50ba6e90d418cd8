//! Stopwatch - record timestamps of manually marked events
//!
//! An operator presses enter whenever something happens. Each press is
//! recorded with its wall-clock time, and when the session ends (ctrl-d,
//! ctrl-c, SIGTERM or SIGHUP) the events are written out as CSV.
//!
//! # Architecture
//!
//! ```text
//!   stdin thread ──Tick──▶ ┌───────────┐
//!                          │ Collector │──▶ EventLog ──▶ report::emit ──▶ stdout / file
//!   signals ──Termination─▶└───────────┘
//!                               │
//!                               └──▶ status messages (stderr)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use stopwatch::{Destination, LineSource, Termination, report, run_session};
//!
//! let termination = Termination::new();
//! let log = run_session(LineSource::stdin(), termination, std::io::stderr()).await;
//! report::emit(&log, "trial A", &Destination::Stdout)?;
//! ```

pub mod cli;
pub mod collector;
pub mod config;
pub mod event;
pub mod report;
pub mod session;
pub mod source;
pub mod termination;

pub use collector::Collector;
pub use config::{Config, LoadedConfig, Settings};
pub use event::{Event, EventLabel, EventLog};
pub use report::{Destination, ReportError};
pub use session::run_session;
pub use source::{LineSource, NotificationSource, Tick, TickSender};
pub use termination::{Termination, TerminationReason, spawn_signal_listener};
