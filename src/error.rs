use polars::prelude::PolarsError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the roster record store, engine, and projections.
#[derive(Debug, Error)]
pub enum RosterError {
    /// A required file is missing and auto-create was not requested.
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A required column is absent or the table keys are unusable.
    #[error("schema error in {}: {message}", path.display())]
    Schema { path: PathBuf, message: String },

    /// An unparseable date or malformed structured field.
    #[error("parse error: {0}")]
    Parse(String),

    /// Unknown day-of-week literal, assignment ID, or worker ID.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("dataframe error: {0}")]
    DataFrame(#[from] PolarsError),
}

impl RosterError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn schema(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type RosterResult<T> = Result<T, RosterError>;
