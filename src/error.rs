use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("unknown service '{0}'")]
    UnknownService(String),

    #[error("control script not found at {0}")]
    ScriptNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ControlError>;
