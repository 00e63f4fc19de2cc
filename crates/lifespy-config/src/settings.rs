use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "lifespy.toml";

/// Top-level schema of `lifespy.toml`. Every section is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub tracker: TrackerSettings,
    #[serde(default)]
    pub presenter: PresenterSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerSettings {
    /// Maximum history entries; absent means unbounded.
    #[serde(default)]
    pub capacity: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PresenterSettings {
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,
}

impl Default for PresenterSettings {
    fn default() -> Self {
        Self {
            refresh_ms: default_refresh_ms(),
        }
    }
}

impl PresenterSettings {
    pub fn refresh(&self) -> Duration {
        Duration::from_millis(self.refresh_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
    #[serde(default = "default_console_lines")]
    pub console_lines: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            dir: None,
            retention_days: default_retention_days(),
            console_lines: default_console_lines(),
        }
    }
}

/// Activities launched, bottom first, when the app starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSettings {
    #[serde(default = "default_launch")]
    pub launch: Vec<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            launch: default_launch(),
        }
    }
}

fn default_refresh_ms() -> u64 {
    750
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_retention_days() -> u64 {
    7
}

fn default_console_lines() -> usize {
    1000
}

fn default_launch() -> Vec<String> {
    vec!["Activity A".to_string()]
}

impl Settings {
    /// Parse and validate settings TOML.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let settings: Self = toml::from_str(input).context("failed to parse lifespy TOML")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;

        Self::from_toml_str(&raw)
            .with_context(|| format!("invalid config at {}", path.display()))
    }

    /// Load from the first location that exists, falling back to defaults.
    ///
    /// Precedence: `LIFESPY_CONFIG` env var > `<config_dir>/lifespy/lifespy.toml`.
    /// A path named by `LIFESPY_CONFIG` must exist.
    pub fn load() -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = std::env::var_os("LIFESPY_CONFIG") {
            let path = PathBuf::from(path);
            return Ok((Self::from_path(&path)?, Some(path)));
        }

        match default_path() {
            Some(path) if path.is_file() => Ok((Self::from_path(&path)?, Some(path))),
            _ => Ok((Self::default(), None)),
        }
    }

    /// Validate semantic constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.tracker.capacity == Some(0) {
            bail!("tracker.capacity must be greater than zero (omit it for unbounded)");
        }
        if self.presenter.refresh_ms == 0 {
            bail!("presenter.refresh_ms must be greater than zero");
        }
        if self.logging.filter.trim().is_empty() {
            bail!("logging.filter must not be empty");
        }
        if self.logging.console_lines == 0 {
            bail!("logging.console_lines must be greater than zero");
        }
        validate_names("session.launch", &self.session.launch)?;
        Ok(())
    }
}

/// Default location of the config file, if the platform has a config dir.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lifespy").join(CONFIG_FILE_NAME))
}

fn validate_names(field: &str, values: &[String]) -> Result<()> {
    let mut seen = BTreeSet::new();

    for value in values {
        if value.trim().is_empty() {
            bail!("{field} entries must not be empty");
        }
        if value.trim() != value {
            bail!("{field} entry {:?} has leading/trailing whitespace", value);
        }
        if !seen.insert(value.as_str()) {
            bail!("{field} contains duplicate entry {:?}", value);
        }
    }

    Ok(())
}
