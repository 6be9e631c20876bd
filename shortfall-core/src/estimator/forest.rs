use serde::{Deserialize, Serialize};

use crate::{
    error::ModelError,
    estimator::{EstimatorKind, Regressor, ensure_width},
    model::FeatureTable,
};

/// A node of a regression tree. Splits send a row `left` when
/// `row[feature] <= threshold`, otherwise (including NaN) `right`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Nodes are stored flat; node 0 is the root and children always point forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            if let Node::Split { feature, left, right, .. } = *node {
                if feature >= n_features {
                    return Err(format!(
                        "node {idx} splits on feature {feature}, but the model has {n_features}"
                    ));
                }
                for child in [left, right] {
                    if child <= idx || child >= self.nodes.len() {
                        return Err(format!("node {idx} points to invalid child {child}"));
                    }
                }
            }
        }

        Ok(())
    }

    fn evaluate(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Split { feature, threshold, left, right } => {
                    idx = if row[feature] <= threshold { left } else { right };
                }
                Node::Leaf { value } => return value,
            }
        }
    }
}

/// Averaging ensemble of regression trees (a single tree is a forest of one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestRegressor {
    pub n_features: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub trees: Vec<Tree>,
}

impl ForestRegressor {
    pub fn new(n_features: usize, trees: Vec<Tree>) -> Self {
        Self { n_features, feature_names: None, trees }
    }

    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_features == 0 {
            return Err(ModelError::Invalid("forest expects zero features".into()));
        }

        if self.trees.is_empty() {
            return Err(ModelError::Invalid("forest has no trees".into()));
        }

        if let Some(names) = &self.feature_names {
            if names.len() != self.n_features {
                return Err(ModelError::Invalid(format!(
                    "forest lists {} feature names for {} features",
                    names.len(),
                    self.n_features
                )));
            }
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| ModelError::Invalid(format!("tree {i}: {e}")))?;
        }

        Ok(())
    }
}

impl Regressor for ForestRegressor {
    fn kind(&self) -> EstimatorKind {
        EstimatorKind::Forest
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>, ModelError> {
        // evaluation indexes nodes and row cells without bounds checks
        self.validate()?;
        ensure_width(features, self.n_features)?;

        let n_trees = self.trees.len() as f64;
        Ok(features
            .rows
            .iter()
            .map(|row| self.trees.iter().map(|t| t.evaluate(row)).sum::<f64>() / n_trees)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(threshold: f64, low: f64, high: f64) -> Tree {
        Tree::new(vec![
            Node::Split { feature: 0, threshold, left: 1, right: 2 },
            Node::Leaf { value: low },
            Node::Leaf { value: high },
        ])
    }

    fn table(rows: Vec<Vec<f64>>) -> FeatureTable {
        FeatureTable::new(vec!["month".into(), "day".into()], rows)
    }

    #[test]
    fn averages_tree_outputs() {
        let forest = ForestRegressor::new(2, vec![stump(6.0, 100.0, 200.0), stump(3.0, 0.0, 50.0)]);
        forest.validate().unwrap();

        let out = forest
            .predict(&table(vec![vec![1.0, 1.0], vec![4.0, 1.0], vec![12.0, 1.0]]))
            .unwrap();
        assert_eq!(out, vec![50.0, 75.0, 125.0]);
    }

    #[test]
    fn threshold_is_inclusive_and_nan_goes_right() {
        let forest = ForestRegressor::new(2, vec![stump(6.0, -1.0, 1.0)]);
        let out = forest.predict(&table(vec![vec![6.0, 0.0], vec![f64::NAN, 0.0]])).unwrap();
        assert_eq!(out, vec![-1.0, 1.0]);
    }

    #[test]
    fn rejects_backward_and_out_of_range_children() {
        let looping = Tree::new(vec![
            Node::Split { feature: 0, threshold: 0.0, left: 0, right: 1 },
            Node::Leaf { value: 0.0 },
        ]);
        let err = ForestRegressor::new(1, vec![looping]).validate().unwrap_err();
        assert!(err.to_string().contains("invalid child 0"));

        let dangling = Tree::new(vec![Node::Split { feature: 0, threshold: 0.0, left: 1, right: 2 }]);
        assert!(ForestRegressor::new(1, vec![dangling]).validate().is_err());
    }

    #[test]
    fn rejects_unknown_feature_and_empty_forest() {
        let named = ForestRegressor::new(1, vec![stump(0.0, 0.0, 0.0)])
            .with_feature_names(vec!["month".into()]);
        assert!(named.validate().is_ok());
        assert!(named.clone().with_feature_names(vec![]).validate().is_err());

        let wide = Tree::new(vec![
            Node::Split { feature: 5, threshold: 0.0, left: 1, right: 2 },
            Node::Leaf { value: 0.0 },
            Node::Leaf { value: 0.0 },
        ]);
        assert!(ForestRegressor::new(2, vec![wide]).validate().is_err());
        assert!(ForestRegressor::new(2, vec![]).validate().is_err());
    }

    #[test]
    fn predict_refuses_an_invalid_forest() {
        let rows = table(vec![vec![1.0, 1.0]]);

        let no_trees = ForestRegressor::new(2, vec![]);
        assert!(matches!(no_trees.predict(&rows), Err(ModelError::Invalid(_))));

        let no_nodes = ForestRegressor::new(2, vec![Tree::new(vec![])]);
        assert!(matches!(no_nodes.predict(&rows), Err(ModelError::Invalid(_))));

        let wide: ForestRegressor = serde_json::from_str(
            r#"{"n_features": 2, "trees": [{"nodes": [{"feature": 40, "threshold": 0.0, "left": 1, "right": 2}, {"value": 0.0}, {"value": 1.0}]}]}"#,
        )
        .unwrap();
        let err = wide.predict(&rows).unwrap_err();
        assert!(matches!(err, ModelError::Invalid(_)));
        assert!(err.to_string().contains("feature 40"));
    }

    #[test]
    fn short_row_is_a_shape_mismatch() {
        let forest = ForestRegressor::new(2, vec![stump(6.0, -1.0, 1.0)]);
        let ragged = FeatureTable {
            columns: vec!["month".into(), "day".into()],
            rows: vec![vec![1.0, 1.0], vec![]],
        };
        let err = forest.predict(&ragged).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { found: 0, expected: 2 }));
    }

    #[test]
    fn nodes_deserialize_from_plain_json() {
        let tree: Tree = serde_json::from_str(
            r#"{"nodes": [{"feature": 0, "threshold": 1.5, "left": 1, "right": 2}, {"value": 3.0}, {"value": 4.0}]}"#,
        )
        .unwrap();
        assert_eq!(tree, stump(1.5, 3.0, 4.0));
    }
}
