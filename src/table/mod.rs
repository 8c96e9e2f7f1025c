use std::fmt;

/// A single cell value from a tabular dataset
/// Provides typed access without committing the whole table to one dtype
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Value {
    /// Get the value as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as an f64 (ints widen)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the value as a bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Class label used when grouping rows for stratification
    /// Only discrete-typed values have one
    pub fn class_label(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Float(_) | Value::Null => None,
        }
    }

    /// Render the value as a CSV field
    /// Floats always carry a decimal point so re-parsing infers Float again
    pub fn render(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 {
                    format!("{:.1}", f)
                } else {
                    f.to_string()
                }
            }
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Inferred type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Int,
    Float,
    Bool,
}

impl ColumnType {
    /// Discrete types are valid stratification targets
    pub fn is_discrete(&self) -> bool {
        matches!(self, ColumnType::Text | ColumnType::Int | ColumnType::Bool)
    }

    fn of(value: &Value) -> Option<ColumnType> {
        match value {
            Value::Text(_) => Some(ColumnType::Text),
            Value::Int(_) => Some(ColumnType::Int),
            Value::Float(_) => Some(ColumnType::Float),
            Value::Bool(_) => Some(ColumnType::Bool),
            Value::Null => None,
        }
    }

    /// Widest common type of two cell types
    /// Int and Float unify to Float; any other mismatch falls back to Text
    fn unify(self, other: ColumnType) -> ColumnType {
        use ColumnType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Int, Float) | (Float, Int) => Float,
            _ => Text,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Text => "text",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// An in-memory table: ordered rows over named, typed columns
/// Immutable after load; splitting produces new tables via `take_rows`
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<String>,
    dtypes: Vec<ColumnType>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table from rectangular row data, inferring each column's type
    /// as the widest type among its non-null cells (all-null columns are Text).
    /// Cells are coerced to the column type so downstream code sees one dtype
    /// per column.
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<Value>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));

        let mut dtypes = vec![None; columns.len()];
        for row in &rows {
            for (j, cell) in row.iter().enumerate() {
                if let Some(t) = ColumnType::of(cell) {
                    dtypes[j] = Some(match dtypes[j] {
                        Some(existing) => ColumnType::unify(existing, t),
                        None => t,
                    });
                }
            }
        }
        let dtypes: Vec<ColumnType> = dtypes
            .into_iter()
            .map(|t| t.unwrap_or(ColumnType::Text))
            .collect();

        for row in &mut rows {
            for (j, cell) in row.iter_mut().enumerate() {
                coerce(cell, dtypes[j]);
            }
        }

        Self {
            columns,
            dtypes,
            rows,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn dtypes(&self) -> &[ColumnType] {
        &self.dtypes
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn dtype(&self, column: usize) -> ColumnType {
        self.dtypes[column]
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, column: usize) -> &Value {
        &self.rows[row][column]
    }

    /// First `n` rows, for previews
    pub fn head(&self, n: usize) -> &[Vec<Value>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Names of columns whose type is a valid stratification target
    pub fn discrete_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .zip(&self.dtypes)
            .filter(|(_, t)| t.is_discrete())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// New table containing the given rows, in the given order
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let rows = indices.iter().map(|&i| self.rows[i].clone()).collect();
        Table {
            columns: self.columns.clone(),
            dtypes: self.dtypes.clone(),
            rows,
        }
    }
}

fn coerce(cell: &mut Value, dtype: ColumnType) {
    if cell.is_null() {
        return;
    }
    let replacement = match (&*cell, dtype) {
        (Value::Int(i), ColumnType::Float) => Some(Value::Float(*i as f64)),
        (v, ColumnType::Text) if !matches!(v, Value::Text(_)) => Some(Value::Text(v.render())),
        _ => None,
    };
    if let Some(v) = replacement {
        *cell = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_table() -> Table {
        Table::new(
            vec!["id".to_string(), "score".to_string(), "label".to_string()],
            vec![
                vec![
                    Value::Int(1),
                    Value::Float(0.5),
                    Value::Text("a".to_string()),
                ],
                vec![
                    Value::Int(2),
                    Value::Float(1.5),
                    Value::Text("b".to_string()),
                ],
                vec![
                    Value::Int(3),
                    Value::Float(2.5),
                    Value::Text("a".to_string()),
                ],
            ],
        )
    }

    #[test]
    fn infers_column_types() {
        let t = label_table();
        assert_eq!(
            t.dtypes(),
            &[ColumnType::Int, ColumnType::Float, ColumnType::Text]
        );
    }

    #[test]
    fn mixed_int_float_unifies_to_float() {
        let t = Table::new(
            vec!["x".to_string()],
            vec![
                vec![Value::Int(1)],
                vec![Value::Float(2.5)],
                vec![Value::Null],
            ],
        );
        assert_eq!(t.dtypes(), &[ColumnType::Float]);
        // Int cell was widened
        assert_eq!(t.cell(0, 0), &Value::Float(1.0));
        assert!(t.cell(2, 0).is_null());
    }

    #[test]
    fn mixed_text_and_number_falls_back_to_text() {
        let t = Table::new(
            vec!["x".to_string()],
            vec![
                vec![Value::Int(7)],
                vec![Value::Text("seven".to_string())],
            ],
        );
        assert_eq!(t.dtypes(), &[ColumnType::Text]);
        assert_eq!(t.cell(0, 0), &Value::Text("7".to_string()));
    }

    #[test]
    fn all_null_column_defaults_to_text() {
        let t = Table::new(
            vec!["x".to_string()],
            vec![vec![Value::Null], vec![Value::Null]],
        );
        assert_eq!(t.dtypes(), &[ColumnType::Text]);
    }

    #[test]
    fn discrete_columns_exclude_floats() {
        let t = label_table();
        assert_eq!(t.discrete_columns(), vec!["id", "label"]);
    }

    #[test]
    fn head_is_bounded_by_row_count() {
        let t = label_table();
        assert_eq!(t.head(2).len(), 2);
        assert_eq!(t.head(100).len(), 3);
    }

    #[test]
    fn take_rows_preserves_schema_and_order() {
        let t = label_table();
        let picked = t.take_rows(&[2, 0]);
        assert_eq!(picked.num_rows(), 2);
        assert_eq!(picked.column_names(), t.column_names());
        assert_eq!(picked.cell(0, 0), &Value::Int(3));
        assert_eq!(picked.cell(1, 0), &Value::Int(1));
    }

    #[test]
    fn float_render_keeps_decimal_point() {
        assert_eq!(Value::Float(2.0).render(), "2.0");
        assert_eq!(Value::Float(2.5).render(), "2.5");
        assert_eq!(Value::Null.render(), "");
    }
}
