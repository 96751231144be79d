use thiserror::Error;

use super::classifier::{Classifier, ClassifierError};
use super::pipeline::{TransformError, Transformer};
use crate::data::model::{CellValue, RawTable, ResultTable, ROW_ID_COLUMN};

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("the uploaded table has no rows")]
    NoRows,
    #[error("the preprocessing pipeline rejected the data")]
    Transform(#[from] TransformError),
    #[error("the model rejected the transformed features")]
    Classify(#[from] ClassifierError),
    #[error("{stage} returned {actual} rows for {expected} input rows")]
    RowCount {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("row {row}: probability {value} is outside [0, 1]")]
    InvalidProbability { row: usize, value: f64 },
}

/// Score every row of `table` with the default-class probability.
///
/// The identifier column is copied verbatim from `id_column` when the table
/// has it, otherwise it is `row_id` holding 0-based row positions. Any bad
/// row fails the whole table.
pub fn score(
    table: &RawTable,
    transformer: &dyn Transformer,
    classifier: &dyn Classifier,
    id_column: &str,
) -> Result<ResultTable, ScoringError> {
    if table.is_empty() {
        return Err(ScoringError::NoRows);
    }

    let features = transformer.transform(table)?;
    if features.rows() != table.len() {
        return Err(ScoringError::RowCount {
            stage: "preprocessing pipeline",
            expected: table.len(),
            actual: features.rows(),
        });
    }

    let distributions = classifier.predict_probability(&features)?;
    if distributions.len() != table.len() {
        return Err(ScoringError::RowCount {
            stage: "model",
            expected: table.len(),
            actual: distributions.len(),
        });
    }

    let probabilities = distributions
        .iter()
        .enumerate()
        .map(|(row, [_, default])| {
            if (0.0..=1.0).contains(default) {
                Ok(*default)
            } else {
                Err(ScoringError::InvalidProbability {
                    row,
                    value: *default,
                })
            }
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let (id_name, ids) = match table.column(id_column) {
        Some(column) => (column.name.clone(), column.values.clone()),
        None => (
            ROW_ID_COLUMN.to_string(),
            (0..table.len() as i64).map(CellValue::Integer).collect(),
        ),
    };

    Ok(ResultTable {
        id_column: id_name,
        ids,
        probabilities,
    })
}
