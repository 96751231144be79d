use anyhow::{Context, Result};

use super::model::{format_float, ResultTable, TARGET_COLUMN};

impl ResultTable {
    /// Encode the full table as UTF-8 CSV: header row, identifier column
    /// first, `TARGET` second.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record([self.id_column.as_str(), TARGET_COLUMN])
            .context("writing CSV header")?;

        for (row, (id, probability)) in self.rows().enumerate() {
            writer
                .write_record([id.to_field(), format_float(probability)])
                .with_context(|| format!("writing CSV row {row}"))?;
        }

        writer
            .into_inner()
            .map_err(|e| e.into_error())
            .context("flushing CSV buffer")
    }
}

#[cfg(test)]
mod tests {
    use crate::data::ingest::parse_csv;
    use crate::data::model::{CellValue, ResultTable, ROW_ID_COLUMN};

    fn results() -> ResultTable {
        ResultTable {
            id_column: "SK_ID_CURR".into(),
            ids: vec![CellValue::Integer(100), CellValue::Integer(101)],
            probabilities: vec![0.0731, 0.5],
        }
    }

    #[test]
    fn writes_header_and_rows_in_order() {
        let bytes = results().to_csv_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "SK_ID_CURR,TARGET\n100,0.0731\n101,0.5\n");
    }

    #[test]
    fn reparsing_the_export_gives_back_the_table() {
        let original = ResultTable {
            id_column: ROW_ID_COLUMN.into(),
            ids: (0..4).map(CellValue::Integer).collect(),
            probabilities: vec![0.1, 1.0 / 3.0, 0.0, 0.987654321],
        };
        let parsed = parse_csv(&original.to_csv_bytes().unwrap()).unwrap();

        assert_eq!(parsed.column_names().collect::<Vec<_>>(), ["row_id", "TARGET"]);
        assert_eq!(parsed.column("row_id").unwrap().values, original.ids);
        let target: Vec<f64> = parsed
            .column("TARGET")
            .unwrap()
            .values
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect();
        assert_eq!(target, original.probabilities);
    }

    #[test]
    fn string_ids_are_quoted_when_needed() {
        let table = ResultTable {
            id_column: "SK_ID_CURR".into(),
            ids: vec![CellValue::String("a,b".into()), CellValue::Null],
            probabilities: vec![0.25, 0.75],
        };
        let text = String::from_utf8(table.to_csv_bytes().unwrap()).unwrap();
        assert_eq!(text, "SK_ID_CURR,TARGET\n\"a,b\",0.25\n,0.75\n");
    }
}
