pub mod schema;
pub mod watcher;

pub use schema::IndicatorConfig;
pub use watcher::ConfigWatcher;

use rivalbat_core::{IndicatorError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read `path` as TOML.  A file that is not there yet means "all defaults";
/// anything unreadable or malformed is a [`IndicatorError::Config`].
pub fn load(path: impl AsRef<Path>) -> Result<IndicatorConfig> {
    let path = path.as_ref();
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("No config at '{}'; using defaults.", path.display());
            return Ok(IndicatorConfig::default());
        }
        Err(e) => {
            return Err(IndicatorError::Config(format!(
                "cannot read '{}': {e}",
                path.display()
            )))
        }
    };

    let config: IndicatorConfig = toml::from_str(&raw)
        .map_err(|e| IndicatorError::Config(format!("'{}': {e}", path.display())))?;
    debug!(?config, "Loaded config from '{}'", path.display());
    Ok(config)
}

/// `$XDG_CONFIG_HOME/rivalbat/config.toml`, or `~/.config/rivalbat/config.toml`
/// when the variable is unset, empty or relative.
pub fn default_path() -> PathBuf {
    let config_home = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .filter(|dir| dir.is_absolute())
        .unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });
    config_home.join("rivalbat").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load(dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, IndicatorConfig::default());
    }

    #[test]
    fn loads_kebab_case_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
extra-path = "/opt/venv/bin:/home/me/.local/bin"
script-path = "~/bin/battery.sh"
refresh-seconds = 30
"#
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.extra_path, "/opt/venv/bin:/home/me/.local/bin");
        assert_eq!(config.script_path, "~/bin/battery.sh");
        assert_eq!(config.refresh_seconds, 30);
        // Unset keys keep their defaults.
        assert!(config.upower_fallback);
    }

    #[test]
    fn directory_in_place_of_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(load(dir.path()), Err(IndicatorError::Config(_))));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "refresh-seconds = \"soon\"").unwrap();

        assert!(matches!(load(&path), Err(IndicatorError::Config(_))));
    }
}
