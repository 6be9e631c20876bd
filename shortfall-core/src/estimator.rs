use crate::{
    error::ModelError,
    estimator::{forest::ForestRegressor, linear::LinearRegressor},
    model::FeatureTable,
};
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt::Debug, fs, path::Path};
use tracing::info;

pub mod forest;
pub mod linear;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EstimatorKind {
    Linear,
    Forest,
}

impl EstimatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimatorKind::Linear => "linear",
            EstimatorKind::Forest => "forest",
        }
    }

    pub const fn all() -> &'static [EstimatorKind] {
        &[EstimatorKind::Linear, EstimatorKind::Forest]
    }
}

impl std::fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for EstimatorKind {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "linear" => Ok(EstimatorKind::Linear),
            "forest" => Ok(EstimatorKind::Forest),
            _ => {
                let supported: Vec<&str> = EstimatorKind::all().iter().map(|k| k.as_str()).collect();
                Err(anyhow::anyhow!(
                    "Unknown estimator kind '{value}'. Supported kinds: {}.",
                    supported.join(", ")
                ))
            }
        }
    }
}

/// An inference capability over a feature table of width [`Regressor::n_features`],
/// returning one value per row.
pub trait Regressor: Send + Sync + Debug {
    fn kind(&self) -> EstimatorKind;

    fn n_features(&self) -> usize;

    /// Column names seen at training time, when the model file records them.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>, ModelError>;
}

/// Fail with a shape error unless the table and each of its rows are `expected` wide.
pub fn ensure_width(features: &FeatureTable, expected: usize) -> Result<(), ModelError> {
    if features.n_cols() != expected {
        return Err(ModelError::ShapeMismatch { found: features.n_cols(), expected });
    }

    if let Some(row) = features.rows.iter().find(|r| r.len() != expected) {
        return Err(ModelError::ShapeMismatch { found: row.len(), expected });
    }

    Ok(())
}

/// On-disk representation of a trained estimator.
///
/// Example JSON:
/// `{"kind": "linear", "intercept": 10.5, "coefficients": [0.1, ...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelDocument {
    Linear(LinearRegressor),
    Forest(ForestRegressor),
}

impl ModelDocument {
    pub fn kind(&self) -> EstimatorKind {
        match self {
            ModelDocument::Linear(_) => EstimatorKind::Linear,
            ModelDocument::Forest(_) => EstimatorKind::Forest,
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            ModelDocument::Linear(m) => m.validate(),
            ModelDocument::Forest(m) => m.validate(),
        }
    }

    pub fn into_regressor(self) -> Box<dyn Regressor> {
        match self {
            ModelDocument::Linear(m) => Box::new(m),
            ModelDocument::Forest(m) => Box::new(m),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Json,
    Toml,
}

impl Encoding {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Encoding::Toml,
            _ => Encoding::Json,
        }
    }
}

/// Read and validate a model document without building the estimator.
pub fn read_model_document(path: impl AsRef<Path>) -> Result<ModelDocument, ModelError> {
    let path = path.as_ref();

    let bytes = fs::read(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = match Encoding::for_path(path) {
        Encoding::Json => serde_json::from_slice::<ModelDocument>(&bytes).map_err(|e| e.to_string()),
        Encoding::Toml => std::str::from_utf8(&bytes)
            .map_err(|e| e.to_string())
            .and_then(|text| toml::from_str::<ModelDocument>(text).map_err(|e| e.to_string())),
    };
    let document = parsed.map_err(|message| ModelError::Parse {
        path: path.to_path_buf(),
        message,
    })?;

    document.validate()?;
    Ok(document)
}

/// Load a persisted estimator into memory.
pub fn load_model(path: impl AsRef<Path>) -> Result<Box<dyn Regressor>, ModelError> {
    let path = path.as_ref();
    let document = read_model_document(path)?;

    let model = document.into_regressor();
    info!(
        path = %path.display(),
        kind = %model.kind(),
        n_features = model.n_features(),
        "Model loaded"
    );

    Ok(model)
}

/// Write a model document; `.toml` paths are written as TOML, anything else as JSON.
pub fn save_model(path: impl AsRef<Path>, document: &ModelDocument) -> Result<(), ModelError> {
    let path = path.as_ref();

    let contents = match Encoding::for_path(path) {
        Encoding::Json => serde_json::to_string_pretty(document).map_err(|e| e.to_string()),
        Encoding::Toml => toml::to_string_pretty(document).map_err(|e| e.to_string()),
    }
    .map_err(ModelError::Serialize)?;

    fs::write(path, contents).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}
