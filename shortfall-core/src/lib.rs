//! Core library for the `shortfall` load shortfall predictor.
//!
//! This crate defines:
//! - The payload and model-input schemas
//! - Preprocessing of raw weather payloads into feature tables
//! - Estimator loading and the prediction entry points
//! - Configuration handling
//!
//! It is used by `shortfall-cli`, but is meant to sit behind any API layer that
//! hands it a JSON payload and a loaded model.

pub mod config;
pub mod error;
pub mod estimator;
pub mod frame;
pub mod model;
pub mod predict;
pub mod preprocess;
pub mod schema;

pub use config::Config;
pub use error::{ModelError, PredictError, PreprocessError};
pub use estimator::{EstimatorKind, ModelDocument, Regressor, load_model, save_model};
pub use model::FeatureTable;
pub use predict::{make_prediction, predict_batch};
pub use preprocess::{preprocess, preprocess_batch};
