//! CSV report of a finished event log
//!
//! Output layout:
//!
//! ```text
//! # <comment>                                   (only if a comment is set)
//! seq,ts,what
//! 0,2024-05-01T12:00:00.123456789+02:00,start
//! 1,2024-05-01T12:00:01.500000000+02:00,tick
//! 2,2024-05-01T12:00:03.000000000+02:00,end
//! ```

use std::convert::Infallible;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

use chrono::SecondsFormat;
use thiserror::Error;
use tracing::{debug, info};

use crate::event::{Event, EventLog};

/// Value meaning "write to stdout" when given as an output path
pub const STDOUT_SENTINEL: &str = "-";

/// Errors that can occur while writing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("could not create file {}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Where the report goes
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Destination {
    #[default]
    Stdout,
    /// Created, or truncated if it already exists
    File(PathBuf),
}

impl Destination {
    /// `""` and `"-"` select stdout; anything else is a file path
    pub fn parse(value: &str) -> Self {
        if value.is_empty() || value == STDOUT_SENTINEL {
            Destination::Stdout
        } else {
            Destination::File(PathBuf::from(value))
        }
    }
}

impl FromStr for Destination {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stdout => f.write_str("stdout"),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// One CSV column: header name and how to render an event's cell
pub struct Column {
    pub name: &'static str,
    pub render: fn(&Event) -> String,
}

/// Report columns, in output order
pub const COLUMNS: [Column; 3] = [
    Column {
        name: "seq",
        render: render_seq,
    },
    Column {
        name: "ts",
        render: render_timestamp,
    },
    Column {
        name: "what",
        render: render_label,
    },
];

fn render_seq(event: &Event) -> String {
    event.seq.to_string()
}

fn render_timestamp(event: &Event) -> String {
    event.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, false)
}

fn render_label(event: &Event) -> String {
    event.label.to_string()
}

pub fn column_names() -> Vec<&'static str> {
    COLUMNS.iter().map(|c| c.name).collect()
}

fn row(event: &Event) -> Vec<String> {
    COLUMNS.iter().map(|c| (c.render)(event)).collect()
}

/// Write the report for `log` to `out`
///
/// An empty `comment` writes no comment line. Line breaks inside a comment
/// are replaced by spaces so the comment stays on one line.
pub fn render<W: Write>(log: &EventLog, comment: &str, mut out: W) -> Result<(), ReportError> {
    debug!(events = log.len(), has_comment = !comment.is_empty(), "render: called");
    if !comment.is_empty() {
        let comment = comment.replace(['\r', '\n'], " ");
        writeln!(out, "# {comment}")?;
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);
    writer.write_record(column_names())?;
    for event in log {
        writer.write_record(row(event))?;
    }
    writer.flush()?;
    Ok(())
}

/// Render the report into memory
pub fn render_to_vec(log: &EventLog, comment: &str) -> Result<Vec<u8>, ReportError> {
    let mut buf = Vec::new();
    render(log, comment, &mut buf)?;
    Ok(buf)
}

/// Render `log` and write it to `destination`
///
/// The report is rendered in full before the destination is touched, so a
/// failure never leaves a partial file behind from rendering.
pub fn emit(log: &EventLog, comment: &str, destination: &Destination) -> Result<(), ReportError> {
    debug!(%destination, "emit: called");
    let bytes = render_to_vec(log, comment)?;

    match destination {
        Destination::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
        Destination::File(path) => {
            let mut file = File::create(path).map_err(|source| ReportError::Create {
                path: path.clone(),
                source,
            })?;
            file.write_all(&bytes)
                .and_then(|_| file.flush())
                .map_err(|source| ReportError::Write {
                    path: path.clone(),
                    source,
                })?;
        }
    }

    info!(%destination, events = log.len(), "Report written");
    Ok(())
}
