use rivalbat_core::ResolveConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shortest refresh interval the daemon will honour.
pub const MIN_REFRESH_SECONDS: u64 = 5;
/// Shortest per-command timeout the daemon will honour.
pub const MIN_COMMAND_TIMEOUT_MS: u64 = 100;

/// Root configuration structure parsed from `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IndicatorConfig {
    /// Colon-separated directories prepended to `PATH` when running commands,
    /// e.g. a virtualenv's `bin/` holding `rivalcfg`.
    pub extra_path: String,
    /// Optional fallback script or shell command line.  Empty = unset.
    pub script_path: String,
    /// Poll interval.  Values below [`MIN_REFRESH_SECONDS`] are raised.
    pub refresh_seconds: u64,
    /// Per-command timeout in milliseconds.
    pub command_timeout_ms: u64,
    /// Query UPower's display device when every command fails.
    pub upower_fallback: bool,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            extra_path:         String::new(),
            script_path:        String::new(),
            refresh_seconds:    60,
            command_timeout_ms: 10_000,
            upower_fallback:    true,
        }
    }
}

impl IndicatorConfig {
    /// `extra-path` split on `:` with blank entries dropped.
    pub fn extra_path_dirs(&self) -> Vec<String> {
        self.extra_path
            .split(':')
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// `script-path`, or `None` when blank.
    pub fn script(&self) -> Option<&str> {
        let script = self.script_path.trim();
        (!script.is_empty()).then_some(script)
    }

    /// Effective refresh interval with the floor applied.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_seconds.max(MIN_REFRESH_SECONDS))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms.max(MIN_COMMAND_TIMEOUT_MS))
    }

    /// Snapshot of the settings the resolver needs for one cycle.
    pub fn resolve_config(&self) -> ResolveConfig {
        ResolveConfig {
            extra_path_dirs: self.extra_path_dirs(),
            script_path:     self.script().map(str::to_string),
            command_timeout: self.command_timeout(),
        }
    }
}
