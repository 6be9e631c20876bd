use serde::{Deserialize, Serialize};

use crate::{
    error::ModelError,
    estimator::{EstimatorKind, Regressor, ensure_width},
    model::FeatureTable,
};

/// Ordinary linear model: `intercept + coefficients · row`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

impl LinearRegressor {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self { intercept, coefficients, feature_names: None }
    }

    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.coefficients.is_empty() {
            return Err(ModelError::Invalid("linear model has no coefficients".into()));
        }

        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::Invalid("linear model has non-finite parameters".into()));
        }

        if let Some(names) = &self.feature_names {
            if names.len() != self.coefficients.len() {
                return Err(ModelError::Invalid(format!(
                    "linear model lists {} feature names for {} coefficients",
                    names.len(),
                    self.coefficients.len()
                )));
            }
        }

        Ok(())
    }

    fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept + self.coefficients.iter().zip(row).map(|(c, x)| c * x).sum::<f64>()
    }
}

impl Regressor for LinearRegressor {
    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Linear
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>, ModelError> {
        self.validate()?;
        ensure_width(features, self.n_features())?;
        Ok(features.rows.iter().map(|row| self.predict_row(row)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<f64>>) -> FeatureTable {
        let width = rows.first().map_or(0, Vec::len);
        FeatureTable::new((0..width).map(|i| format!("f{i}")).collect(), rows)
    }

    #[test]
    fn predicts_intercept_plus_dot_product() {
        let model = LinearRegressor::new(10.0, vec![1.0, -2.0, 0.5]);
        let out = model.predict(&table(vec![vec![1.0, 1.0, 4.0], vec![0.0, 0.0, 0.0]])).unwrap();
        assert_eq!(out, vec![11.0, 10.0]);
    }

    #[test]
    fn rejects_wrong_width() {
        let model = LinearRegressor::new(0.0, vec![1.0, 1.0]);
        let err = model.predict(&table(vec![vec![1.0, 2.0, 3.0]])).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { found: 3, expected: 2 }));
    }

    #[test]
    fn predict_refuses_an_invalid_model() {
        let empty = LinearRegressor::new(0.0, vec![]);
        let err = empty.predict(&table(vec![vec![]])).unwrap_err();
        assert!(matches!(err, ModelError::Invalid(_)));

        let nan = LinearRegressor::new(0.0, vec![f64::NAN]);
        assert!(matches!(nan.predict(&table(vec![vec![1.0]])), Err(ModelError::Invalid(_))));
    }

    #[test]
    fn validate_catches_bad_documents() {
        assert!(LinearRegressor::new(0.0, vec![]).validate().is_err());
        assert!(LinearRegressor::new(f64::NAN, vec![1.0]).validate().is_err());
        assert!(
            LinearRegressor::new(0.0, vec![1.0])
                .with_feature_names(vec!["a".into(), "b".into()])
                .validate()
                .is_err()
        );
        assert!(
            LinearRegressor::new(0.0, vec![1.0])
                .with_feature_names(vec!["a".into()])
                .validate()
                .is_ok()
        );
    }
}
