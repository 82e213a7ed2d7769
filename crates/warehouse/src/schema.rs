//! Table schemas: inferred from sheets for loads, applied to query rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use sheetbridge_core::BridgeResult;
use sheetbridge_sheet::{CellValue, Sheet};

/// Column type of a loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    Integer,
    Float,
    Boolean,
    String,
}

/// One column of a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub mode: String,
}

/// Infer a load schema from a sheet; every column is `NULLABLE`.
///
/// A column is `INTEGER` when every non-null cell is an integer, `FLOAT`
/// when every non-null cell is numeric, `BOOLEAN` when every non-null cell
/// is a bool and `STRING` otherwise (including all-null columns).
#[must_use]
pub fn infer_schema(sheet: &Sheet) -> Vec<FieldSchema> {
    sheet
        .columns()
        .iter()
        .enumerate()
        .map(|(index, name)| FieldSchema {
            name: name.clone(),
            field_type: infer_type(sheet.rows().map(|row| &row[index])),
            mode: "NULLABLE".to_string(),
        })
        .collect()
}

fn infer_type<'a>(cells: impl Iterator<Item = &'a CellValue>) -> FieldType {
    let mut all_int = true;
    let mut all_numeric = true;
    let mut all_bool = true;
    let mut any = false;

    for cell in cells.filter(|c| !c.is_null()) {
        any = true;
        all_int &= matches!(cell, CellValue::Int(_));
        all_numeric &= cell.is_numeric();
        all_bool &= matches!(cell, CellValue::Bool(_));
    }

    match (any, all_int, all_numeric, all_bool) {
        (false, ..) => FieldType::String,
        (true, true, _, _) => FieldType::Integer,
        (true, false, true, _) => FieldType::Float,
        (true, false, false, true) => FieldType::Boolean,
        _ => FieldType::String,
    }
}

/// Serialize the rows as newline-delimited JSON that matches `schema`.
///
/// `STRING` columns carry the string form of each cell; null cells are
/// omitted from their row.
pub fn to_ndjson(sheet: &Sheet, schema: &[FieldSchema]) -> BridgeResult<Vec<u8>> {
    let mut out = Vec::new();
    for row in sheet.rows() {
        let mut record = Map::new();
        for (field, cell) in schema.iter().zip(row) {
            if cell.is_null() {
                continue;
            }
            let value = match field.field_type {
                FieldType::String => JsonValue::String(cell.as_str()),
                _ => serde_json::to_value(cell)?,
            };
            record.insert(field.name.clone(), value);
        }
        serde_json::to_writer(&mut out, &record)?;
        out.push(b'\n');
    }
    Ok(out)
}

/// Column of a query result, as reported by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub mode: Option<String>,
}

impl ResultField {
    fn is_repeated(&self) -> bool {
        self.mode.as_deref() == Some("REPEATED")
    }
}

/// Convert one raw result cell (`{"v": ...}` payload) to a typed cell.
///
/// Scalars arrive as strings and are parsed by column type. Records and
/// repeated fields are kept as JSON text.
#[must_use]
pub fn result_cell(field: &ResultField, raw: &JsonValue) -> CellValue {
    let text = match raw {
        JsonValue::Null => return CellValue::Null,
        JsonValue::String(s) if !field.is_repeated() => s.as_str(),
        other => return CellValue::String(other.to_string()),
    };

    let parsed = match field.field_type.as_str() {
        "INTEGER" | "INT64" => text.parse().ok().map(CellValue::Int),
        "FLOAT" | "FLOAT64" | "NUMERIC" | "BIGNUMERIC" => {
            text.parse().ok().map(CellValue::Float)
        }
        "BOOLEAN" | "BOOL" => text.parse().ok().map(CellValue::Bool),
        _ => None,
    };
    parsed.unwrap_or_else(|| CellValue::String(text.to_string()))
}
