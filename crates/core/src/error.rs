use thiserror::Error;

/// Top-level error type shared by every library crate in the workspace.
#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("config error: {0}")]
    Config(String),

    #[error("D-Bus error: {0}")]
    Dbus(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = IndicatorError> = std::result::Result<T, E>;
