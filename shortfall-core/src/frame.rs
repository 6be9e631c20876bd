//! A small column-oriented table, just large enough for the preprocessing steps.

use std::{cmp::Ordering, collections::HashMap, fmt};

use serde_json::{Map, Value};

use crate::error::PreprocessError;

/// A single value of a payload field.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Null,
}

impl Cell {
    pub fn from_json(column: &str, value: &Value) -> Result<Self, PreprocessError> {
        let unsupported = |kind| PreprocessError::UnsupportedValue {
            column: column.to_string(),
            kind,
        };

        match value {
            Value::Null => Ok(Cell::Null),
            Value::Bool(b) => Ok(Cell::Number(if *b { 1.0 } else { 0.0 })),
            Value::Number(n) => n.as_f64().map(Cell::Number).ok_or_else(|| unsupported("number")),
            Value::String(s) => Ok(Cell::Text(s.clone())),
            Value::Array(_) => Err(unsupported("array")),
            Value::Object(_) => Err(unsupported("object")),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric view of the cell. Text is accepted when it parses as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Null => None,
        }
    }

    /// Ordering used to enumerate categories: numbers first, then text.
    fn category_cmp(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Number(a), Cell::Number(b)) => a.total_cmp(b),
            (Cell::Number(_), _) => Ordering::Less,
            (_, Cell::Number(_)) => Ordering::Greater,
            (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
            (Cell::Text(_), Cell::Null) => Ordering::Less,
            (Cell::Null, Cell::Text(_)) => Ordering::Greater,
            (Cell::Null, Cell::Null) => Ordering::Equal,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Null => f.write_str("null"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Cell>) -> Self {
        Self { name: name.into(), values }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Frame {
    /// Build a frame from JSON objects. Columns appear in first-seen key order;
    /// a key absent from some record is `Null` in that row.
    pub fn from_records(records: &[Map<String, Value>]) -> Result<Self, PreprocessError> {
        let mut columns: Vec<Column> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (row, record) in records.iter().enumerate() {
            for (key, value) in record {
                let cell = Cell::from_json(key, value)?;
                let idx = *index.entry(key.clone()).or_insert_with(|| {
                    columns.push(Column::new(key.clone(), vec![Cell::Null; row]));
                    columns.len() - 1
                });
                columns[idx].values.push(cell);
            }

            for column in columns.iter_mut().filter(|c| c.values.len() <= row) {
                column.values.push(Cell::Null);
            }
        }

        Ok(Self { columns, n_rows: records.len() })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn column_mut(&mut self, name: &str) -> Result<&mut Column, PreprocessError> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| PreprocessError::MissingColumn(name.to_string()))
    }

    /// New frame holding exactly `names`, in that order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Frame, PreprocessError> {
        let columns = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.column(name)
                    .cloned()
                    .ok_or_else(|| PreprocessError::MissingColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Frame { columns, n_rows: self.n_rows })
    }

    /// Remove the listed columns. Names not present are ignored.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) {
        self.columns.retain(|c| !names.iter().any(|n| n.as_ref() == c.name));
    }

    /// Remove every column whose name satisfies `predicate`.
    pub fn drop_where(&mut self, predicate: impl Fn(&str) -> bool) {
        self.columns.retain(|c| !predicate(&c.name));
    }

    /// Append a column, or replace the one with the same name in place.
    pub fn push_column(&mut self, column: Column) {
        debug_assert_eq!(column.values.len(), self.n_rows, "column '{}' has the wrong length", column.name);

        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }

    /// Replace nulls with the mean of the non-null values. When every value is
    /// null the mean is undefined and the nulls stay. Returns the mean used.
    pub fn fill_null_with_mean(&mut self, name: &str) -> Result<Option<f64>, PreprocessError> {
        let column = self.column_mut(name)?;

        let mut sum = 0.0;
        let mut count = 0usize;
        for cell in column.values.iter().filter(|c| !c.is_null()) {
            let value = cell.as_f64().ok_or_else(|| PreprocessError::NonNumeric {
                column: column.name.clone(),
                value: cell.to_string(),
            })?;
            sum += value;
            count += 1;
        }

        if count == 0 {
            return Ok(None);
        }

        let mean = sum / count as f64;
        for cell in column.values.iter_mut().filter(|c| c.is_null()) {
            *cell = Cell::Number(mean);
        }

        Ok(Some(mean))
    }

    /// Replace each value with the index of its category among the sorted
    /// distinct non-null values. Nulls become -1.
    pub fn categorical_codes(&mut self, name: &str) -> Result<usize, PreprocessError> {
        let column = self.column_mut(name)?;

        let mut categories: Vec<Cell> =
            column.values.iter().filter(|c| !c.is_null()).cloned().collect();
        categories.sort_by(Cell::category_cmp);
        categories.dedup_by(|a, b| a.category_cmp(b) == Ordering::Equal);

        for cell in column.values.iter_mut() {
            let code = if cell.is_null() {
                -1.0
            } else {
                categories
                    .binary_search_by(|probe| probe.category_cmp(cell))
                    .map(|i| i as f64)
                    .unwrap_or(-1.0)
            };
            *cell = Cell::Number(code);
        }

        Ok(categories.len())
    }

    /// Row-major numeric matrix over `names`.
    pub fn to_numeric<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Vec<f64>>, PreprocessError> {
        let columns = names
            .iter()
            .map(|name| {
                self.column(name.as_ref())
                    .ok_or_else(|| PreprocessError::MissingColumn(name.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        (0..self.n_rows)
            .map(|row| {
                columns
                    .iter()
                    .map(|column| match &column.values[row] {
                        Cell::Null => Err(PreprocessError::MissingValue {
                            column: column.name.clone(),
                            row,
                        }),
                        cell => cell.as_f64().ok_or_else(|| PreprocessError::NonNumeric {
                            column: column.name.clone(),
                            value: cell.to_string(),
                        }),
                    })
                    .collect::<Result<Vec<f64>, _>>()
            })
            .collect()
    }
}
