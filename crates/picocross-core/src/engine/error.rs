use super::config::ConfigError;
use crate::core::io::error::LineListError;
use crate::core::spectroscopy::error::SpectroscopyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Line-list input error: {source}")]
    Input {
        #[from]
        source: LineListError,
    },

    #[error("Spectroscopy error: {source}")]
    Spectroscopy {
        #[from]
        source: SpectroscopyError,
    },

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
}
