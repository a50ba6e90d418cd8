//! Configuration for stopwatch
//!
//! Every setting is optional; command-line flags override file values.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::report::Destination;

/// Settings read from a YAML config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Output file path; "" or "-" means stdout
    pub output: Option<String>,

    /// Comment line written above the CSV header
    pub comment: Option<String>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub log_level: Option<String>,

    /// Write logs to this file instead of stderr
    pub log_file: Option<PathBuf>,
}

/// Effective settings for one run, after merging flags over the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub destination: Destination,
    pub comment: String,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// File name looked up in the working directory
pub const LOCAL_CONFIG: &str = ".stopwatch.yml";

/// An implicit config file that exists but could not be used
#[derive(Debug)]
pub struct SkippedConfig {
    pub path: PathBuf,
    pub error: eyre::Report,
}

/// Outcome of the config lookup
///
/// Logging is set up from the loaded config, so problems found while
/// loading are returned here and reported by the caller afterwards.
#[derive(Debug, Default)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the config came from, `None` when defaults are used
    pub path: Option<PathBuf>,
    pub skipped: Vec<SkippedConfig>,
}

impl Config {
    /// Load the config file
    ///
    /// An explicit path must load. Otherwise the first usable file among
    /// [`Config::implicit_paths`] wins; broken ones are skipped and reported
    /// in [`LoadedConfig::skipped`].
    pub fn load(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
        if let Some(path) = config_path {
            let config =
                Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()))?;
            return Ok(LoadedConfig {
                config,
                path: Some(path.clone()),
                skipped: Vec::new(),
            });
        }

        let mut loaded = LoadedConfig::default();
        for path in Self::implicit_paths().into_iter().filter(|p| p.exists()) {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    loaded.config = config;
                    loaded.path = Some(path);
                    break;
                }
                Err(error) => loaded.skipped.push(SkippedConfig { path, error }),
            }
        }
        Ok(loaded)
    }

    /// `./.stopwatch.yml`, then `<config dir>/stopwatch/stopwatch.yml`
    pub fn implicit_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("stopwatch").join("stopwatch.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        serde_yaml::from_str(&content).context("Failed to parse config file")
    }

    /// Merge command-line flags over this config
    pub fn resolve(self, cli: &Cli) -> Settings {
        let output = cli.output.as_deref().or(self.output.as_deref()).unwrap_or("");
        Settings {
            destination: Destination::parse(output),
            comment: cli.comment.clone().or(self.comment).unwrap_or_default(),
            log_level: cli.log_level.clone().or(self.log_level),
            log_file: self.log_file,
        }
    }
}
