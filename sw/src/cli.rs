//! CLI argument parsing for stopwatch

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sw")]
#[command(
    version,
    about = "Collect timestamps of events and report them as CSV",
    long_about = "Collect timestamps of events and report them as CSV.\n\n\
        Press <enter> to record an event. End the session with <ctrl+d> or <ctrl+c>.\n\
        Progress messages go to stderr; the report goes to stdout or --output."
)]
pub struct Cli {
    /// Output file path (default: stdout). Values "" and "-" mean stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Comment written as "# <comment>" on the first line of the output
    #[arg(short, long)]
    pub comment: Option<String>,

    /// Path to config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}
