use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;

use crate::config::SplitConfig;
use crate::table::{ColumnType, Table};

/// Errors raised while partitioning
/// These are recoverable: the session reports them and stays interactive
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("table has {0} row(s); at least 2 are required to split")]
    TooFewRows(usize),

    #[error("stratification column '{0}' not found")]
    UnknownColumn(String),

    #[error("stratification column '{column}' has type {dtype}; only text, int and bool columns can stratify")]
    NotDiscrete { column: String, dtype: ColumnType },

    #[error("stratification column '{0}' contains missing values")]
    NullInStratifyColumn(String),

    #[error("class '{class}' of column '{column}' has only {count} row(s); each class needs at least 2 to appear in both outputs")]
    ClassTooSmall {
        column: String,
        class: String,
        count: usize,
    },
}

/// Train/test membership of one stratification class
#[derive(Debug, Clone, Serialize)]
pub struct ClassBalance {
    pub class: String,
    pub total: usize,
    pub train: usize,
    pub test: usize,
}

/// Row counts of one completed split, plus class balance when stratified
#[derive(Debug, Clone, Serialize)]
pub struct SplitSummary {
    pub total_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub stratify: Option<String>,
    pub classes: Vec<ClassBalance>,
}

/// The two output tables; together they partition the input's rows
#[derive(Debug, Clone)]
pub struct SplitResult {
    pub train: Table,
    pub test: Table,
    pub summary: SplitSummary,
}

/// Partition a table into train and test sets
///
/// The partition is a pure function of (table, config): shuffling uses an RNG
/// seeded from `config.seed`, so a fixed seed and fraction reproduce the same
/// split. With stratification, each class contributes
/// `round(fraction * class_count)` rows to the test set (clamped so the class
/// appears in both outputs), with the remainder resolved by the seeded
/// shuffle.
pub fn train_test_split(table: &Table, config: &SplitConfig) -> Result<SplitResult, SplitError> {
    let n = table.num_rows();
    if n < 2 {
        return Err(SplitError::TooFewRows(n));
    }

    let fraction = config.test_fraction();
    let mut rng = StdRng::seed_from_u64(config.seed);

    let (mut train_idx, mut test_idx, classes) = match &config.stratify {
        Some(column) => stratified_indices(table, column, fraction, &mut rng)?,
        None => {
            let (train, test) = plain_indices(n, fraction, &mut rng);
            (train, test, Vec::new())
        }
    };

    // Row order within each output is random but fully determined by the seed
    train_idx.shuffle(&mut rng);
    test_idx.shuffle(&mut rng);

    let summary = SplitSummary {
        total_rows: n,
        train_rows: train_idx.len(),
        test_rows: test_idx.len(),
        stratify: config.stratify.clone(),
        classes,
    };

    Ok(SplitResult {
        train: table.take_rows(&train_idx),
        test: table.take_rows(&test_idx),
        summary,
    })
}

fn plain_indices(n: usize, fraction: f64, rng: &mut StdRng) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    let n_test = allocate(n, fraction);
    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();
    (train, test)
}

type StratifiedIndices = (Vec<usize>, Vec<usize>, Vec<ClassBalance>);

fn stratified_indices(
    table: &Table,
    column: &str,
    fraction: f64,
    rng: &mut StdRng,
) -> Result<StratifiedIndices, SplitError> {
    let col = table
        .column_index(column)
        .ok_or_else(|| SplitError::UnknownColumn(column.to_string()))?;
    let dtype = table.dtype(col);
    if !dtype.is_discrete() {
        return Err(SplitError::NotDiscrete {
            column: column.to_string(),
            dtype,
        });
    }

    // Group row indices by class label, in first-appearance order so the
    // whole pass is deterministic
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for i in 0..table.num_rows() {
        let label = table
            .cell(i, col)
            .class_label()
            .ok_or_else(|| SplitError::NullInStratifyColumn(column.to_string()))?;
        match groups.get_mut(&label) {
            Some(members) => members.push(i),
            None => {
                order.push(label.clone());
                groups.insert(label, vec![i]);
            }
        }
    }

    let mut train = Vec::new();
    let mut test = Vec::new();
    let mut classes = Vec::with_capacity(order.len());

    for label in &order {
        let mut members = groups.remove(label).unwrap_or_default();
        let count = members.len();
        if count < 2 {
            return Err(SplitError::ClassTooSmall {
                column: column.to_string(),
                class: label.clone(),
                count,
            });
        }

        members.shuffle(rng);
        let n_test = allocate(count, fraction);
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);

        classes.push(ClassBalance {
            class: label.clone(),
            total: count,
            train: count - n_test,
            test: n_test,
        });
    }

    Ok((train, test, classes))
}

/// `round(fraction * count)`, clamped so both sides stay non-empty
/// Callers guarantee `count >= 2`
fn allocate(count: usize, fraction: f64) -> usize {
    let rounded = (fraction * count as f64).round() as usize;
    rounded.clamp(1, count - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    /// n rows: unique int `id`, text `label` cycling through `labels`
    fn labeled_table(n: usize, labels: &[&str]) -> Table {
        let rows = (0..n)
            .map(|i| {
                vec![
                    Value::Int(i as i64),
                    Value::Text(labels[i % labels.len()].to_string()),
                ]
            })
            .collect();
        Table::new(vec!["id".to_string(), "label".to_string()], rows)
    }

    fn ids(table: &Table) -> Vec<i64> {
        table
            .rows()
            .iter()
            .map(|row| row[0].as_i64().unwrap())
            .collect()
    }

    fn config(test_size: u8, seed: u64, stratify: Option<&str>) -> SplitConfig {
        SplitConfig {
            test_size,
            seed,
            stratify: stratify.map(|s| s.to_string()),
            bundle: true,
        }
    }

    #[test]
    fn partition_covers_all_rows_without_overlap() {
        let table = labeled_table(37, &["a", "b"]);
        let result = train_test_split(&table, &config(30, 3, None)).unwrap();

        assert_eq!(result.train.num_rows() + result.test.num_rows(), 37);

        let mut all: Vec<i64> = ids(&result.train);
        all.extend(ids(&result.test));
        all.sort_unstable();
        let expected: Vec<i64> = (0..37).collect();
        assert_eq!(all, expected);
    }

    #[test]
    fn fixed_seed_reproduces_the_same_partition() {
        let table = labeled_table(50, &["x", "y", "z"]);
        let cfg = config(20, 42, Some("label"));

        let first = train_test_split(&table, &cfg).unwrap();
        let second = train_test_split(&table, &cfg).unwrap();

        assert_eq!(ids(&first.train), ids(&second.train));
        assert_eq!(ids(&first.test), ids(&second.test));
    }

    #[test]
    fn different_seeds_pick_different_test_sets() {
        let table = labeled_table(100, &["a", "b"]);
        let mut one = ids(&train_test_split(&table, &config(20, 1, None)).unwrap().test);
        let mut two = ids(&train_test_split(&table, &config(20, 2, None)).unwrap().test);
        one.sort_unstable();
        two.sort_unstable();
        assert_ne!(one, two);
    }

    #[test]
    fn boundary_fractions_leave_both_sides_non_empty() {
        let table = labeled_table(10, &["a", "b"]);

        let low = train_test_split(&table, &config(10, 0, None)).unwrap();
        assert_eq!(low.test.num_rows(), 1);
        assert_eq!(low.train.num_rows(), 9);

        let high = train_test_split(&table, &config(50, 0, None)).unwrap();
        assert_eq!(high.test.num_rows(), 5);
        assert_eq!(high.train.num_rows(), 5);
    }

    #[test]
    fn stratified_scenario_100_rows_even_binary_label() {
        // 100 rows, label split 50/50, fraction 20%, seed 42
        let table = labeled_table(100, &["pos", "neg"]);
        let result = train_test_split(&table, &config(20, 42, Some("label"))).unwrap();

        assert_eq!(result.test.num_rows(), 20);
        assert_eq!(result.train.num_rows(), 80);

        let balance = &result.summary.classes;
        assert_eq!(balance.len(), 2);
        for class in balance {
            assert_eq!(class.total, 50);
            assert_eq!(class.test, 10);
            assert_eq!(class.train, 40);
        }
    }

    #[test]
    fn stratified_proportions_track_the_original_within_rounding() {
        // Class counts 30 / 12 / 8, fraction 25%
        let mut rows = Vec::new();
        for i in 0..50 {
            let label = if i < 30 {
                "big"
            } else if i < 42 {
                "mid"
            } else {
                "small"
            };
            rows.push(vec![Value::Int(i), Value::Text(label.to_string())]);
        }
        let table = Table::new(vec!["id".to_string(), "label".to_string()], rows);

        let result = train_test_split(&table, &config(25, 9, Some("label"))).unwrap();
        let by_class: Vec<(String, usize, usize)> = result
            .summary
            .classes
            .iter()
            .map(|c| (c.class.clone(), c.test, c.train))
            .collect();

        assert_eq!(
            by_class,
            vec![
                ("big".to_string(), 8, 22),
                ("mid".to_string(), 3, 9),
                ("small".to_string(), 2, 6),
            ]
        );
        assert_eq!(result.test.num_rows(), 13);
        assert_eq!(result.train.num_rows(), 37);
    }

    #[test]
    fn singleton_class_is_a_split_error_not_a_crash() {
        let mut rows: Vec<Vec<Value>> = (0..9)
            .map(|i| vec![Value::Int(i), Value::Text("common".to_string())])
            .collect();
        rows.push(vec![Value::Int(9), Value::Text("lonely".to_string())]);
        let table = Table::new(vec!["id".to_string(), "label".to_string()], rows);

        let err = train_test_split(&table, &config(20, 42, Some("label"))).unwrap_err();
        assert!(matches!(
            err,
            SplitError::ClassTooSmall { class, count: 1, .. } if class == "lonely"
        ));
    }

    #[test]
    fn null_in_stratify_column_is_rejected() {
        let table = Table::new(
            vec!["label".to_string()],
            vec![
                vec![Value::Text("a".to_string())],
                vec![Value::Null],
                vec![Value::Text("a".to_string())],
            ],
        );
        let err = train_test_split(&table, &config(20, 0, Some("label"))).unwrap_err();
        assert!(matches!(err, SplitError::NullInStratifyColumn(_)));
    }

    #[test]
    fn unknown_and_non_discrete_columns_are_rejected() {
        let table = Table::new(
            vec!["score".to_string()],
            vec![vec![Value::Float(0.5)], vec![Value::Float(1.5)]],
        );

        let err = train_test_split(&table, &config(20, 0, Some("missing"))).unwrap_err();
        assert!(matches!(err, SplitError::UnknownColumn(_)));

        let err = train_test_split(&table, &config(20, 0, Some("score"))).unwrap_err();
        assert!(matches!(err, SplitError::NotDiscrete { .. }));
    }

    #[test]
    fn too_few_rows_is_rejected() {
        let table = labeled_table(1, &["a"]);
        assert!(matches!(
            train_test_split(&table, &config(20, 0, None)),
            Err(SplitError::TooFewRows(1))
        ));
    }

    #[test]
    fn integer_columns_can_stratify() {
        // id % 2 as an integer-coded binary label
        let rows = (0..20)
            .map(|i| vec![Value::Int(i), Value::Int(i % 2)])
            .collect();
        let table = Table::new(vec!["id".to_string(), "group".to_string()], rows);

        let result = train_test_split(&table, &config(20, 5, Some("group"))).unwrap();
        assert_eq!(result.test.num_rows(), 4);
        for class in &result.summary.classes {
            assert_eq!(class.total, 10);
            assert_eq!(class.test, 2);
        }
    }
}
