// Copyright (c) 2025 Hive TCLI Client Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Column-major result batches to row-major JSON objects.
//!
//! Values are decoded according to the column's declared type, not just
//! its wire variant: decimals arrive as strings and are parsed, complex
//! types arrive as serialized strings and fall back to empty shapes
//! when unparseable, and 64-bit integers are decoded from their raw
//! octets with the precision limits of a JSON consumer in mind.

use crate::protocol::messages::{Column, ColumnDesc, RowSet, TableSchema, TypeId};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;

/// One result row: column short name to decoded value, in schema
/// position order.
pub type Row = serde_json::Map<String, Value>;

/// Largest integer a double-backed JSON consumer holds exactly (2^53-1).
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// Decode a big-endian two's-complement 64-bit value by byte summation,
/// clamping positive magnitudes above [`MAX_SAFE_INTEGER`]. Negative
/// values pass through unclamped.
pub(crate) fn int64_from_be_bytes(bytes: [u8; 8]) -> i64 {
    let negate = bytes[0] & 0x80 != 0;
    let mut value: i128 = 0;
    let mut multiplier: i128 = 1;
    let mut carry: u16 = 1;
    for i in (0..8).rev() {
        let mut v = u16::from(bytes[i]);
        if negate {
            v = (v ^ 0xff) + carry;
            carry = v >> 8;
            v &= 0xff;
        }
        value += i128::from(v) * multiplier;
        multiplier *= 256;
    }
    if negate {
        value = -value;
    }
    if value > i128::from(MAX_SAFE_INTEGER) {
        MAX_SAFE_INTEGER
    } else {
        value as i64
    }
}

/// Strip any qualifier prefix from a column name: `db.table.col` binds
/// as `col`.
pub(crate) fn short_name(column_name: &str) -> &str {
    column_name.rsplit('.').next().unwrap_or(column_name)
}

fn number(v: f64) -> Value {
    serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
}

/// Convert one string-typed cell according to its declared type.
fn convert_string(value: &str, type_id: TypeId) -> Value {
    match type_id {
        TypeId::Decimal => value.parse::<f64>().map_or(Value::Null, number),
        TypeId::Array => {
            serde_json::from_str(value).unwrap_or_else(|_| Value::Array(Vec::new()))
        }
        TypeId::Map | TypeId::Struct => serde_json::from_str(value)
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new())),
        // Timestamps, dates, intervals, unions, and user-defined types
        // arrive preformatted.
        _ => Value::String(value.to_string()),
    }
}

/// Decode the cell at `index` in a column. Out-of-range indexes decode
/// to null; ragged batches surface as nulls rather than panics.
fn cell(column: &Column, index: usize, type_id: TypeId) -> Value {
    match column {
        Column::Bool { values, .. } => values.get(index).map_or(Value::Null, |v| Value::Bool(*v)),
        Column::Byte { values, .. } => values
            .get(index)
            .map_or(Value::Null, |v| Value::Number((*v).into())),
        Column::I16 { values, .. } => values
            .get(index)
            .map_or(Value::Null, |v| Value::Number((*v).into())),
        Column::I32 { values, .. } => values
            .get(index)
            .map_or(Value::Null, |v| Value::Number((*v).into())),
        Column::I64 { values, .. } => values
            .get(index)
            .map_or(Value::Null, |v| Value::Number(int64_from_be_bytes(*v).into())),
        Column::Double { values, .. } => values.get(index).map_or(Value::Null, |v| number(*v)),
        Column::String { values, .. } => values
            .get(index)
            .map_or(Value::Null, |v| convert_string(v, type_id)),
        Column::Binary { values, .. } => values
            .get(index)
            .map_or(Value::Null, |v| Value::String(BASE64.encode(v))),
    }
}

fn declared_type(desc: &ColumnDesc) -> TypeId {
    desc.primitive_entry()
        .map_or(TypeId::Unknown(-1), |entry| entry.type_id)
}

/// Assemble column-major batches into row-major JSON objects.
///
/// Descriptors are sorted by their 1-based position, each binding to
/// the batch column at `position - 1`; keys are the short column names
/// in that order. Descriptors pointing outside a batch decode to null.
pub fn assemble_rows(schema: &TableSchema, batches: &[RowSet]) -> Vec<Row> {
    let mut descriptors: Vec<&ColumnDesc> = schema.columns.iter().collect();
    descriptors.sort_by_key(|desc| desc.position);

    let mut rows = Vec::new();
    for batch in batches {
        let height = batch.columns.iter().map(Column::len).max().unwrap_or(0);
        for index in 0..height {
            let mut row = Row::new();
            for desc in &descriptors {
                let type_id = declared_type(desc);
                let value = usize::try_from(desc.position - 1)
                    .ok()
                    .and_then(|slot| batch.columns.get(slot))
                    .map_or(Value::Null, |column| cell(column, index, type_id));
                row.insert(short_name(&desc.column_name).to_string(), value);
            }
            rows.push(row);
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::{PrimitiveTypeEntry, TypeDesc, TypeEntry};
    use serde_json::json;

    fn desc(name: &str, position: i32, type_id: TypeId) -> ColumnDesc {
        ColumnDesc {
            column_name: name.to_string(),
            type_desc: TypeDesc {
                types: vec![TypeEntry {
                    primitive: Some(PrimitiveTypeEntry {
                        type_id,
                        qualifiers: None,
                    }),
                }],
            },
            position,
            comment: None,
        }
    }

    #[test]
    fn test_int64_decode_exact_values() {
        assert_eq!(int64_from_be_bytes(0i64.to_be_bytes()), 0);
        assert_eq!(int64_from_be_bytes((-1i64).to_be_bytes()), -1);
        assert_eq!(int64_from_be_bytes((1i64 << 31).to_be_bytes()), 1 << 31);
        assert_eq!(
            int64_from_be_bytes(MAX_SAFE_INTEGER.to_be_bytes()),
            MAX_SAFE_INTEGER
        );
        assert_eq!(
            int64_from_be_bytes((-(1i64 << 53)).to_be_bytes()),
            -(1 << 53)
        );
        assert_eq!(int64_from_be_bytes(i64::MIN.to_be_bytes()), i64::MIN);
    }

    #[test]
    fn test_int64_decode_clamps_above_safe_range() {
        assert_eq!(int64_from_be_bytes((1i64 << 53).to_be_bytes()), MAX_SAFE_INTEGER);
        assert_eq!(int64_from_be_bytes(i64::MAX.to_be_bytes()), MAX_SAFE_INTEGER);
    }

    #[test]
    fn test_short_name_strips_qualifiers() {
        assert_eq!(short_name("db.table.col"), "col");
        assert_eq!(short_name("col"), "col");
    }

    #[test]
    fn test_decimal_cells_parse_or_null() {
        let column = Column::String {
            values: vec!["12.50".to_string(), "not a number".to_string()],
            nulls: Vec::new(),
        };
        assert_eq!(cell(&column, 0, TypeId::Decimal), json!(12.5));
        assert_eq!(cell(&column, 1, TypeId::Decimal), Value::Null);
    }

    #[test]
    fn test_complex_cells_fall_back_to_empty_shapes() {
        let column = Column::String {
            values: vec!["{\"a\":1}".to_string(), "garbage".to_string()],
            nulls: Vec::new(),
        };
        assert_eq!(cell(&column, 0, TypeId::Struct), json!({"a": 1}));
        assert_eq!(cell(&column, 1, TypeId::Struct), json!({}));
        assert_eq!(cell(&column, 1, TypeId::Map), json!({}));

        let arrays = Column::String {
            values: vec!["[1,2]".to_string(), "oops".to_string()],
            nulls: Vec::new(),
        };
        assert_eq!(cell(&arrays, 0, TypeId::Array), json!([1, 2]));
        assert_eq!(cell(&arrays, 1, TypeId::Array), json!([]));
    }

    #[test]
    fn test_binary_cells_encode_base64() {
        let column = Column::Binary {
            values: vec![vec![0xde, 0xad, 0xbe, 0xef]],
            nulls: Vec::new(),
        };
        assert_eq!(cell(&column, 0, TypeId::Binary), json!("3q2+7w=="));
    }

    #[test]
    fn test_assemble_rows_binds_columns_by_position() {
        // Descriptors listed out of order; positions decide binding.
        let schema = TableSchema {
            columns: vec![
                desc("t.amount", 2, TypeId::Bigint),
                desc("t.name", 1, TypeId::String),
            ],
        };
        let batch = RowSet {
            start_row_offset: 0,
            columns: vec![
                Column::String {
                    values: vec!["alpha".to_string(), "beta".to_string()],
                    nulls: Vec::new(),
                },
                Column::I64 {
                    values: vec![42i64.to_be_bytes(), (1i64 << 53).to_be_bytes()],
                    nulls: Vec::new(),
                },
            ],
        };
        let rows = assemble_rows(&schema, &[batch]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], json!("alpha"));
        assert_eq!(rows[0]["amount"], json!(42));
        assert_eq!(rows[1]["amount"], json!(MAX_SAFE_INTEGER));
        // Keys appear in position order.
        let keys: Vec<&String> = rows[0].keys().collect();
        assert_eq!(keys, vec!["name", "amount"]);
    }

    #[test]
    fn test_assemble_rows_nulls_out_of_range_bindings() {
        let schema = TableSchema {
            columns: vec![desc("a", 1, TypeId::Int), desc("ghost", 5, TypeId::Int)],
        };
        let batch = RowSet {
            start_row_offset: 0,
            columns: vec![Column::I32 {
                values: vec![7],
                nulls: Vec::new(),
            }],
        };
        let rows = assemble_rows(&schema, &[batch]);
        assert_eq!(rows[0]["a"], json!(7));
        assert_eq!(rows[0]["ghost"], Value::Null);
    }

    #[test]
    fn test_assemble_rows_spans_batches() {
        let schema = TableSchema {
            columns: vec![desc("v", 1, TypeId::Int)],
        };
        let batch = |values: Vec<i32>| RowSet {
            start_row_offset: 0,
            columns: vec![Column::I32 {
                values,
                nulls: Vec::new(),
            }],
        };
        let rows = assemble_rows(&schema, &[batch(vec![1, 2]), batch(vec![3])]);
        let values: Vec<&Value> = rows.iter().map(|r| &r["v"]).collect();
        assert_eq!(values, vec![&json!(1), &json!(2), &json!(3)]);
    }
}
