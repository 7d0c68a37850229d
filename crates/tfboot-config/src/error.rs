use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl ConfigError {
    /// Validation messages, empty for read and parse failures
    pub fn validation_messages(&self) -> &[String] {
        match self {
            ConfigError::Validation(messages) => messages,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
