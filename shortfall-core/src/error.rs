use std::path::PathBuf;

use thiserror::Error;

/// Failures while turning a raw payload into the model input table.
#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Expected a JSON object per record, got {0}")]
    NotAnObject(&'static str),

    #[error("Payload contains no records")]
    EmptyPayload,

    #[error("Field '{column}' holds an unsupported value ({kind}); expected a number, string or null")]
    UnsupportedValue { column: String, kind: &'static str },

    #[error("Expected column '{0}' is missing from the payload")]
    MissingColumn(String),

    #[error("Column '{column}' holds non-numeric value '{value}'")]
    NonNumeric { column: String, value: String },

    #[error("Column '{column}' has no value in row {row}")]
    MissingValue { column: String, row: usize },

    #[error("Cannot parse timestamp '{value}' in column '{column}'")]
    InvalidTimestamp { column: String, value: String },
}

/// Failures loading an estimator or running it.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read model file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse model file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Failed to serialize model: {0}")]
    Serialize(String),

    #[error("Invalid model: {0}")]
    Invalid(String),

    #[error("Feature table has {found} columns, but the model expects {expected}")]
    ShapeMismatch { found: usize, expected: usize },
}

/// Failures of the end-to-end prediction call.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Feature column {position} is '{found}', but the model was trained on '{expected}'")]
    SchemaMismatch {
        position: usize,
        found: String,
        expected: String,
    },

    #[error("Model returned no prediction")]
    EmptyPrediction,

    #[error("Model returned {found} predictions for {expected} records")]
    OutputCount { found: usize, expected: usize },
}
