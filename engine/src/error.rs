use shared::models::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    #[error("Market data error: {0}")]
    MarketDataError(String),

    #[error("Serialization error: {source}")]
    SerializationError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Data model error: {0}")]
    Model(#[from] ModelError),

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl EngineError {
    // Exit status for the command line front end: 2 for anything the user can fix
    // by changing arguments or settings, 1 for everything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            EngineError::ConfigError(_) | EngineError::InvalidInput(_) => 2,
            EngineError::Model(ModelError::InvalidRange { .. } | ModelError::UnknownMetric(_)) => 2,
            _ => 1,
        }
    }
}
