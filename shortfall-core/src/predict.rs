use tracing::debug;

use crate::{
    error::PredictError,
    estimator::{Regressor, ensure_width},
    model::FeatureTable,
    preprocess::{preprocess, preprocess_batch},
};

/// Predict the load shortfall for one JSON-encoded record.
///
/// Returns a one-element list, matching what the API layer forwards to clients.
pub fn make_prediction(data: &str, model: &dyn Regressor) -> Result<Vec<f64>, PredictError> {
    let features = preprocess(data)?;
    let prediction = run(&features, model)?;

    let first = *prediction.first().ok_or(PredictError::EmptyPrediction)?;
    debug!(prediction = first, "prediction complete");

    Ok(vec![first])
}

/// Predict one value per record of a JSON array (a lone object counts as one record).
pub fn predict_batch(data: &str, model: &dyn Regressor) -> Result<Vec<f64>, PredictError> {
    let features = preprocess_batch(data)?;
    let predictions = run(&features, model)?;

    if predictions.len() != features.n_rows() {
        return Err(PredictError::OutputCount {
            found: predictions.len(),
            expected: features.n_rows(),
        });
    }
    debug!(count = predictions.len(), "batch prediction complete");

    Ok(predictions)
}

fn run(features: &FeatureTable, model: &dyn Regressor) -> Result<Vec<f64>, PredictError> {
    check_schema(features, model)?;
    Ok(model.predict(features)?)
}

/// Compare the table against the estimator's input contract before inference.
pub fn check_schema(features: &FeatureTable, model: &dyn Regressor) -> Result<(), PredictError> {
    ensure_width(features, model.n_features())?;

    if let Some(trained) = model.feature_names() {
        let mismatch = features
            .columns
            .iter()
            .zip(trained)
            .enumerate()
            .find(|(_, (found, expected))| found != expected);

        if let Some((position, (found, expected))) = mismatch {
            return Err(PredictError::SchemaMismatch {
                position,
                found: found.clone(),
                expected: expected.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ModelError,
        estimator::{EstimatorKind, linear::LinearRegressor},
        schema::{FEATURE_COLUMNS, FEATURE_COUNT},
    };

    const PAYLOAD: &str = include_str!("../tests/fixtures/payload.json");

    #[derive(Debug)]
    struct Silent;

    impl Regressor for Silent {
        fn kind(&self) -> EstimatorKind {
            EstimatorKind::Linear
        }

        fn n_features(&self) -> usize {
            FEATURE_COUNT
        }

        fn predict(&self, _: &FeatureTable) -> Result<Vec<f64>, ModelError> {
            Ok(vec![])
        }
    }

    fn month_only() -> LinearRegressor {
        let mut coefficients = vec![0.0; FEATURE_COUNT];
        coefficients[0] = 100.0;
        LinearRegressor::new(5.0, coefficients)
    }

    #[test]
    fn linear_model_sees_the_derived_month() {
        assert_eq!(make_prediction(PAYLOAD, &month_only()).unwrap(), vec![305.0]);
    }

    #[test]
    fn matching_feature_names_pass() {
        let model = month_only().with_feature_names(FEATURE_COLUMNS.map(String::from).to_vec());
        assert!(make_prediction(PAYLOAD, &model).is_ok());
    }

    #[test]
    fn renamed_feature_is_a_schema_mismatch() {
        let mut names = FEATURE_COLUMNS.map(String::from).to_vec();
        names[1] = "weekday".into();
        let model = month_only().with_feature_names(names);

        let err = make_prediction(PAYLOAD, &model).unwrap_err();
        assert!(matches!(
            err,
            PredictError::SchemaMismatch { position: 1, ref found, ref expected }
                if found == "day" && expected == "weekday"
        ));
    }

    #[test]
    fn narrow_model_is_a_shape_mismatch() {
        let model = LinearRegressor::new(0.0, vec![1.0; 3]);
        let err = make_prediction(PAYLOAD, &model).unwrap_err();
        assert!(matches!(err, PredictError::Model(ModelError::ShapeMismatch { found: 17, expected: 3 })));
    }

    #[test]
    fn empty_output_is_reported() {
        assert!(matches!(make_prediction(PAYLOAD, &Silent).unwrap_err(), PredictError::EmptyPrediction));
    }

    #[test]
    fn batch_output_count_is_checked() {
        let err = predict_batch(PAYLOAD, &Silent).unwrap_err();
        assert!(matches!(err, PredictError::OutputCount { found: 0, expected: 1 }));
    }

    #[test]
    fn preprocessing_errors_propagate() {
        let err = make_prediction("{}", &month_only()).unwrap_err();
        assert!(matches!(err, PredictError::Preprocess(_)));
        assert!(err.to_string().contains("missing from the payload"));
    }

    #[test]
    fn batch_returns_one_value_per_record() {
        let batch = format!("[{PAYLOAD}, {PAYLOAD}]");
        assert_eq!(predict_batch(&batch, &month_only()).unwrap(), vec![305.0, 305.0]);
    }
}
