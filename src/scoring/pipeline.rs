use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::matrix::FeatureMatrix;
use crate::data::model::{CellValue, RawTable};

/// Artifact format version this build understands.
pub const PIPELINE_VERSION: u32 = 3;

/// Feature-engineering stage: raw table in, numeric matrix out.
///
/// The output keeps the input's row order; its columns are described by
/// [`Transformer::output_names`].
pub trait Transformer: Send + Sync {
    fn transform(&self, table: &RawTable) -> Result<FeatureMatrix, TransformError>;

    fn output_names(&self) -> Vec<String>;
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },
    #[error("column '{column}', row {row}: '{value}' is not numeric")]
    NotNumeric {
        column: String,
        row: usize,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Preprocessing pipeline (JSON artifact)
// ---------------------------------------------------------------------------

/// One column step of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// Impute missing with `fill`, then standardise as `(x - center) / scale`.
    Numeric {
        column: String,
        fill: f64,
        center: f64,
        scale: f64,
    },
    /// One-hot over the known categories; unknown and missing encode as zeros.
    Categorical {
        column: String,
        categories: Vec<String>,
    },
}

impl Step {
    pub fn column(&self) -> &str {
        match self {
            Step::Numeric { column, .. } | Step::Categorical { column, .. } => column,
        }
    }

    fn width(&self) -> usize {
        match self {
            Step::Numeric { .. } => 1,
            Step::Categorical { categories, .. } => categories.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessingPipeline {
    pub version: u32,
    pub steps: Vec<Step>,
}

impl PreprocessingPipeline {
    /// Structural checks run once at load time.
    pub fn validate(&self) -> Result<(), String> {
        if self.version != PIPELINE_VERSION {
            return Err(format!(
                "pipeline version {} is not supported (expected {PIPELINE_VERSION})",
                self.version
            ));
        }
        for step in &self.steps {
            if let Step::Numeric { column, scale, .. } = step {
                if !scale.is_finite() {
                    return Err(format!("step '{column}': scale must be finite"));
                }
            }
        }
        Ok(())
    }

    fn width(&self) -> usize {
        self.steps.iter().map(Step::width).sum()
    }
}

impl Transformer for PreprocessingPipeline {
    fn transform(&self, table: &RawTable) -> Result<FeatureMatrix, TransformError> {
        let missing: Vec<String> = self
            .steps
            .iter()
            .map(Step::column)
            .filter(|c| table.column(c).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(TransformError::MissingColumns { columns: missing });
        }

        let mut out = FeatureMatrix::zeros(table.len(), self.width());
        let mut offset = 0;

        for step in &self.steps {
            // Presence checked above.
            let Some(column) = table.column(step.column()) else {
                continue;
            };

            match step {
                Step::Numeric {
                    column: name,
                    fill,
                    center,
                    scale,
                } => {
                    let scale = if *scale == 0.0 { 1.0 } else { *scale };
                    for (row, cell) in column.values.iter().enumerate() {
                        let x = numeric_value(cell, *fill).ok_or_else(|| {
                            TransformError::NotNumeric {
                                column: name.clone(),
                                row,
                                value: cell.to_field(),
                            }
                        })?;
                        out.set(row, offset, (x - center) / scale);
                    }
                }
                Step::Categorical { categories, .. } => {
                    for (row, cell) in column.values.iter().enumerate() {
                        if cell.is_null() {
                            continue;
                        }
                        let field = cell.to_field();
                        if let Some(slot) = categories.iter().position(|c| *c == field) {
                            out.set(row, offset + slot, 1.0);
                        }
                    }
                }
            }
            offset += step.width();
        }

        Ok(out)
    }

    fn output_names(&self) -> Vec<String> {
        self.steps
            .iter()
            .flat_map(|step| match step {
                Step::Numeric { column, .. } => vec![column.clone()],
                Step::Categorical { column, categories } => categories
                    .iter()
                    .map(|c| format!("{column}_{c}"))
                    .collect(),
            })
            .collect()
    }
}

/// `None` for text that cannot be read as a number.
fn numeric_value(cell: &CellValue, fill: f64) -> Option<f64> {
    match cell {
        c if c.is_null() => Some(fill),
        CellValue::String(s) => s.trim().parse().ok(),
        c => c.as_f64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ingest::parse_csv;
    use crate::scoring::testing::demo_pipeline;

    #[test]
    fn output_names_follow_step_order() {
        assert_eq!(
            demo_pipeline().output_names(),
            [
                "AMT_INCOME_TOTAL",
                "NAME_CONTRACT_TYPE_Cash loans",
                "NAME_CONTRACT_TYPE_Revolving loans"
            ]
        );
    }

    #[test]
    fn standardises_imputes_and_one_hot_encodes() {
        let table = parse_csv(
            b"NAME_CONTRACT_TYPE,AMT_INCOME_TOTAL\n\
              Cash loans,200000\n\
              Revolving loans,\n\
              Consumer loans,100000\n",
        )
        .unwrap();
        let m = demo_pipeline().transform(&table).unwrap();

        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.row(0), &[1.0, 1.0, 0.0]);
        assert_eq!(m.row(1), &[0.0, 0.0, 1.0]);
        assert_eq!(m.row(2), &[-1.0, 0.0, 0.0]);
    }

    #[test]
    fn reports_every_missing_column() {
        let table = parse_csv(b"SK_ID_CURR\n1\n").unwrap();
        match demo_pipeline().transform(&table) {
            Err(TransformError::MissingColumns { columns }) => {
                assert_eq!(columns, ["AMT_INCOME_TOTAL", "NAME_CONTRACT_TYPE"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn text_in_numeric_column_is_rejected() {
        let table =
            parse_csv(b"AMT_INCOME_TOTAL,NAME_CONTRACT_TYPE\n10,Cash loans\nlots,Cash loans\n")
                .unwrap();
        let err = demo_pipeline().transform(&table).unwrap_err();
        assert!(matches!(err, TransformError::NotNumeric { row: 1, .. }));
    }

    #[test]
    fn unknown_version_fails_validation() {
        let mut pipeline = demo_pipeline();
        assert!(pipeline.validate().is_ok());
        pipeline.version = 2;
        assert!(pipeline.validate().is_err());
    }

    #[test]
    fn steps_deserialize_from_tagged_json() {
        let json = r#"{"version":3,"steps":[
            {"kind":"numeric","column":"A","fill":0.0,"center":1.0,"scale":2.0},
            {"kind":"categorical","column":"B","categories":["x","y"]}
        ]}"#;
        let pipeline: PreprocessingPipeline = serde_json::from_str(json).unwrap();
        assert_eq!(pipeline.output_names(), ["A", "B_x", "B_y"]);
    }
}
