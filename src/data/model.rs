use std::fmt;

/// Column copied into the results when the upload carries it.
pub const DEFAULT_ID_COLUMN: &str = "SK_ID_CURR";

/// Identifier column synthesised from row positions when the upload has no ID.
pub const ROW_ID_COLUMN: &str = "row_id";

/// Name of the probability column in the results.
pub const TARGET_COLUMN: &str = "TARGET";

// ---------------------------------------------------------------------------
// CellValue – a single cell of an uploaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes CSV inference produces.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell; booleans count as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Full-precision text form used for CSV output and category matching.
    ///
    /// Floats always carry a decimal point so they read back as floats.
    pub fn to_field(&self) -> String {
        match self {
            CellValue::String(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) if v.is_nan() => String::new(),
            CellValue::Float(v) => format_float(*v),
            CellValue::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
            CellValue::Null => String::new(),
        }
    }
}

pub fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

// ---------------------------------------------------------------------------
// RawTable – the parsed upload
// ---------------------------------------------------------------------------

/// One named column of an uploaded table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

/// Uploaded table, stored column-major with an implicit 0-based row index.
///
/// No schema is enforced here; the preprocessing pipeline checks it at
/// transform time.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    columns: Vec<Column>,
    n_rows: usize,
}

impl RawTable {
    /// Build a table from columns that all have the same length.
    pub fn new(columns: Vec<Column>, n_rows: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.values.len() == n_rows));
        RawTable { columns, n_rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Cells of row `row`, in column order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = &CellValue> {
        self.columns.iter().map(move |c| &c.values[row])
    }
}

// ---------------------------------------------------------------------------
// ResultTable – identifier + default probability per input row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    /// Name of the identifier column (`SK_ID_CURR` or `row_id`).
    pub id_column: String,
    pub ids: Vec<CellValue>,
    /// Probability of the default class, one per input row, in row order.
    pub probabilities: Vec<f64>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate `(identifier, probability)` pairs in row order.
    pub fn rows(&self) -> impl Iterator<Item = (&CellValue, f64)> {
        self.ids.iter().zip(self.probabilities.iter().copied())
    }
}
