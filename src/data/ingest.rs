use std::collections::HashSet;

use thiserror::Error;

use super::model::{CellValue, Column, RawTable};

/// Cell texts read as missing values.
const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A",
];

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("the file is empty; a header row is expected")]
    Empty,
    #[error("the file is not text (NUL byte at offset {offset})")]
    NotText { offset: usize },
    #[error("quoted field opened on line {line} is never closed")]
    UnterminatedQuote { line: usize },
    #[error("the file is not well-formed CSV")]
    Malformed(#[source] csv::Error),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse an uploaded CSV into a [`RawTable`].
///
/// Column names and row order are kept exactly as found. Each column gets a
/// single inferred type:
/// * all non-missing cells are integers → `Integer`
/// * all are numbers → `Float` (integers promoted)
/// * all are `true` / `false` (any case) → `Bool`
/// * anything else → `String`
///
/// Missing cells become `Null`. No schema checks happen here.
pub fn parse_csv(bytes: &[u8]) -> Result<RawTable, ParseError> {
    if let Some(offset) = bytes.iter().position(|&b| b == 0) {
        return Err(ParseError::NotText { offset });
    }
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ParseError::Empty);
    }
    if let Some(line) = unterminated_quote(bytes) {
        return Err(ParseError::UnterminatedQuote { line });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(ParseError::Malformed)?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let headers = dedup_headers(headers);

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    let mut n_rows = 0;
    for result in reader.records() {
        let record = result.map_err(ParseError::Malformed)?;
        for (cells, field) in raw.iter_mut().zip(record.iter()) {
            cells.push(field.to_string());
        }
        n_rows += 1;
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column {
            name,
            values: infer_column(&cells),
        })
        .collect();

    Ok(RawTable::new(columns, n_rows))
}

/// Line on which a quoted field opens without a closing quote.
///
/// The csv reader reads such a field to end of input, merging every later
/// row into one cell. Quotes only open a field at its first byte; `""`
/// inside a quoted field is an escaped quote.
fn unterminated_quote(bytes: &[u8]) -> Option<usize> {
    let mut line = 1;
    let mut field_start = true;
    let mut open: Option<usize> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match open {
            Some(_) => match b {
                b'"' if bytes.get(i + 1) == Some(&b'"') => i += 1,
                b'"' => {
                    open = None;
                    field_start = false;
                }
                b'\n' => line += 1,
                _ => {}
            },
            None => match b {
                b'"' if field_start => open = Some(line),
                b',' | b'\r' => field_start = true,
                b'\n' => {
                    line += 1;
                    field_start = true;
                }
                _ => field_start = false,
            },
        }
        i += 1;
    }
    open
}

/// Rename repeated headers to `name.1`, `name.2`, ….
fn dedup_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    headers
        .into_iter()
        .map(|name| {
            let mut candidate = name.clone();
            let mut n = 0;
            while seen.contains(&candidate) {
                n += 1;
                candidate = format!("{name}.{n}");
            }
            seen.insert(candidate.clone());
            candidate
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Type inference
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Integer,
    Float,
    Bool,
    String,
}

fn is_missing(s: &str) -> bool {
    NA_TOKENS.contains(&s.trim())
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn cell_kind(s: &str) -> Kind {
    let t = s.trim();
    if t.parse::<i64>().is_ok() {
        Kind::Integer
    } else if t.parse::<f64>().is_ok() {
        Kind::Float
    } else if parse_bool(t).is_some() {
        Kind::Bool
    } else {
        Kind::String
    }
}

fn column_kind(cells: &[String]) -> Kind {
    let mut kind: Option<Kind> = None;
    for cell in cells.iter().filter(|c| !is_missing(c)) {
        let k = cell_kind(cell);
        kind = Some(match (kind, k) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(Kind::Integer), Kind::Float) | (Some(Kind::Float), Kind::Integer) => Kind::Float,
            _ => return Kind::String,
        });
    }
    kind.unwrap_or(Kind::Float)
}

fn infer_column(cells: &[String]) -> Vec<CellValue> {
    let kind = column_kind(cells);
    cells
        .iter()
        .map(|cell| {
            if is_missing(cell) {
                return CellValue::Null;
            }
            let t = cell.trim();
            match kind {
                Kind::Integer => t.parse().map(CellValue::Integer).unwrap_or(CellValue::Null),
                Kind::Float => t.parse().map(CellValue::Float).unwrap_or(CellValue::Null),
                Kind::Bool => parse_bool(t).map(CellValue::Bool).unwrap_or(CellValue::Null),
                Kind::String => CellValue::String(cell.clone()),
            }
        })
        .collect()
}
