use crate::clienv;
use crate::error::{ControlError, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BASE_PATH: &str = "/opt/lampp";
const CONTROL_SCRIPT_NAME: &str = "lampp";
const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BULK_TIMEOUT_SECS: u64 = 60;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 1;

/// Stack configuration, read once at startup.
///
/// Resolution order for the installation path: CLI flag (applied by the
/// caller via [`StackConfig::with_base`]), `$LAMPCTL_BASE`, config file,
/// built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Stack installation directory
    pub base_path: PathBuf,
    /// Timeout for a single control-script invocation, in seconds
    pub command_timeout_secs: u64,
    /// Timeout for whole-stack operations (start/stop/restart/reload all)
    pub bulk_timeout_secs: u64,
    /// Timeout for availability probes and the bounded-wait escalation
    pub probe_timeout_secs: u64,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from(DEFAULT_BASE_PATH),
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            bulk_timeout_secs: DEFAULT_BULK_TIMEOUT_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
        }
    }
}

impl StackConfig {
    /// $LAMPCTL_CONFIG_DIR/config.toml or ~/.config/lampctl/config.toml
    pub fn config_path() -> PathBuf {
        clienv::config_dir().join("config.toml")
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        tracing::trace!(path = %path.display(), "Loading stack config");

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                ControlError::Config(format!("failed to read {}: {e}", path.display()))
            })?;
            toml::from_str(&content)?
        } else {
            tracing::trace!("Config file does not exist, using defaults");
            Self::default()
        };

        if let Some(base) = clienv::base_path_override() {
            config.base_path = base;
        }

        tracing::trace!(base = %config.base_path.display(), "Stack config loaded");
        Ok(config)
    }

    /// Replace the installation path (CLI override).
    pub fn with_base(mut self, base: PathBuf) -> Self {
        self.base_path = base;
        self
    }

    /// Path of the privileged control script.
    pub fn control_script(&self) -> PathBuf {
        self.base_path.join(CONTROL_SCRIPT_NAME)
    }

    /// Fail early when the control script is missing entirely.
    pub fn ensure_control_script(&self) -> Result<()> {
        let script = self.control_script();
        if script.exists() {
            Ok(())
        } else {
            Err(ControlError::ScriptNotFound(script))
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn bulk_timeout(&self) -> Duration {
        Duration::from_secs(self.bulk_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Web document root served by Apache.
    pub fn htdocs_dir(&self) -> PathBuf {
        self.base_path.join("htdocs")
    }

    /// Apache error log path.
    pub fn apache_error_log(&self) -> PathBuf {
        self.base_path.join("logs").join("error_log")
    }

    /// MySQL error log path. The file is named after the host that created
    /// it, so the data directory is scanned for the first `.err` entry.
    pub fn mysql_error_log(&self) -> Option<PathBuf> {
        let dir = self.base_path.join("var").join("mysql");
        let entries = fs::read_dir(&dir).ok()?;
        let mut logs: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "err"))
            .collect();
        logs.sort();
        logs.into_iter().next()
    }
}
