use thiserror::Error;

use crate::config::{ConfigError, ValidationError};
use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum DepvizError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid parameters: {0}")]
    Validation(#[from] ValidationError),
    #[error("dependency source error: {0}")]
    Source(#[from] SourceError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DepvizError>;
