use serde::{Deserialize, Serialize};

/// Numeric table handed to an estimator: one row per payload record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// All values of one column, top to bottom. `None` for an unknown name or
    /// when a row is too short to hold the column.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        self.rows.iter().map(|r| r.get(idx).copied()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_lookup() {
        let table = FeatureTable::new(
            vec!["month".into(), "day".into()],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        );

        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_cols(), 2);
        assert_eq!(table.column("day"), Some(vec![2.0, 4.0]));
        assert_eq!(table.column("nope"), None);
    }

    #[test]
    fn ragged_table_has_no_full_column() {
        let table: FeatureTable =
            serde_json::from_str(r#"{"columns": ["month", "day"], "rows": [[1.0, 2.0], [3.0]]}"#)
                .unwrap();

        assert_eq!(table.column("month"), Some(vec![1.0, 3.0]));
        assert_eq!(table.column("day"), None);
    }
}
