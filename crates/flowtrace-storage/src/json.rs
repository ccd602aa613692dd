//! JSON implementation of [`FlowTableSource`].
//!
//! Accepts an array of row objects keyed by column name, as written by most
//! table exporters:
//!
//! ```json
//! [ { "FROMCOMID": 1, "TOCOMID": 2 }, { "FROMCOMID": 2, "TOCOMID": 0 } ]
//! ```
//!
//! Ids may be JSON numbers or numeric strings. Anything else in a cell, or a
//! missing key, makes that row malformed.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::Value;

use flowtrace_core::{FlowRow, ReachId};

use crate::error::StorageError;
use crate::traits::FlowTableSource;
use crate::types::{reach_from_f64, reach_from_text, FlowColumns};

/// A flow table parsed from JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFlowTable {
    name: String,
    columns: FlowColumns,
    rows: Vec<FlowRow>,
}

impl JsonFlowTable {
    /// Parses a JSON document held in memory.
    pub fn parse(text: &str, columns: FlowColumns) -> Result<Self, StorageError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value("json", value, columns)
    }

    /// Reads and parses a JSON file.
    pub fn open(path: impl AsRef<Path>, columns: FlowColumns) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let name = path.display().to_string();
        let value: Value = serde_json::from_reader(BufReader::new(file))?;
        Self::from_value(&name, value, columns)
    }

    /// Parses JSON from any reader.
    pub fn from_reader<R: Read>(reader: R, columns: FlowColumns) -> Result<Self, StorageError> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_value("json", value, columns)
    }

    fn from_value(name: &str, value: Value, columns: FlowColumns) -> Result<Self, StorageError> {
        let Value::Array(items) = value else {
            return Err(StorageError::InvalidLayout {
                reason: "expected a JSON array of row objects".to_string(),
            });
        };

        if !items.is_empty() {
            for column in [&columns.from, &columns.to] {
                let present = items
                    .iter()
                    .any(|item| item.as_object().is_some_and(|obj| obj.contains_key(column)));
                if !present {
                    return Err(StorageError::ColumnNotFound {
                        table: name.to_string(),
                        column: column.clone(),
                    });
                }
            }
        }

        let rows = items
            .iter()
            .map(|item| FlowRow {
                from: reach_from_value(item.get(&columns.from)),
                to: reach_from_value(item.get(&columns.to)),
            })
            .collect();

        Ok(JsonFlowTable {
            name: name.to_string(),
            columns,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FlowTableSource for JsonFlowTable {
    fn describe(&self) -> String {
        format!(
            "{} ({}, {}; {} rows)",
            self.name,
            self.columns.from,
            self.columns.to,
            self.rows.len()
        )
    }

    fn for_each_row(&self, f: &mut dyn FnMut(FlowRow)) -> Result<u64, StorageError> {
        for row in &self.rows {
            f(*row);
        }
        Ok(self.rows.len() as u64)
    }
}

fn reach_from_value(value: Option<&Value>) -> Option<ReachId> {
    match value? {
        Value::Number(n) => n
            .as_u64()
            .map(ReachId)
            .or_else(|| n.as_f64().and_then(reach_from_f64)),
        Value::String(s) => reach_from_text(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_and_strings() {
        let table = JsonFlowTable::parse(
            r#"[
                { "FROMCOMID": 1, "TOCOMID": 2 },
                { "FROMCOMID": "2", "TOCOMID": 3.0 },
                { "FROMCOMID": 3, "TOCOMID": 0 }
            ]"#,
            FlowColumns::default(),
        )
        .unwrap();

        let mut rows = Vec::new();
        assert_eq!(table.for_each_row(&mut |r| rows.push(r)).unwrap(), 3);
        assert_eq!(
            rows,
            vec![
                FlowRow::from((1, 2)),
                FlowRow::from((2, 3)),
                FlowRow::from((3, 0))
            ]
        );
    }

    #[test]
    fn bad_cells_are_malformed_rows() {
        let table = JsonFlowTable::parse(
            r#"[
                { "FROMCOMID": null, "TOCOMID": 2 },
                { "FROMCOMID": -3, "TOCOMID": true },
                { "TOCOMID": 4 },
                7
            ]"#,
            FlowColumns::default(),
        )
        .unwrap();

        let mut rows = Vec::new();
        table.for_each_row(&mut |r| rows.push(r)).unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.from.is_none()));
        assert_eq!(rows[0].to, Some(ReachId(2)));
        assert_eq!(rows[1].to, None);
        assert_eq!(rows[3].to, None);
    }

    #[test]
    fn custom_columns() {
        let table = JsonFlowTable::parse(
            r#"[{ "up": 5, "down": 6 }]"#,
            FlowColumns::new("up", "down"),
        )
        .unwrap();
        let mut rows = Vec::new();
        table.for_each_row(&mut |r| rows.push(r)).unwrap();
        assert_eq!(rows, vec![FlowRow::from((5, 6))]);
    }

    #[test]
    fn missing_column_everywhere() {
        let err = JsonFlowTable::parse(
            r#"[{ "FROMCOMID": 1, "DNCOMID": 2 }]"#,
            FlowColumns::default(),
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::ColumnNotFound { column, .. } if column == "TOCOMID"));
    }

    #[test]
    fn not_an_array() {
        let err = JsonFlowTable::parse(r#"{ "rows": [] }"#, FlowColumns::default()).unwrap_err();
        assert!(matches!(err, StorageError::InvalidLayout { .. }));
    }

    #[test]
    fn unparseable_json() {
        let err = JsonFlowTable::parse("[{ ", FlowColumns::default()).unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }

    #[test]
    fn empty_array_is_an_empty_table() {
        let table = JsonFlowTable::parse("[]", FlowColumns::default()).unwrap();
        assert!(table.is_empty());
    }
}
