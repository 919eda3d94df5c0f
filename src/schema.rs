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

//! Wire types to structural field types.
//!
//! Maps each column's primitive type descriptor to a generic field
//! shape suitable for a JSON document model: parameterized text and
//! numeric modes, scalar markers, and placeholder shapes for complex
//! types whose element types the wire does not describe.

use crate::decode::short_name;
use crate::protocol::messages::{PrimitiveTypeEntry, TableSchema, TypeId};
use serde::Serialize;
use serde_json::{json, Value};

/// Text flavor of a string-backed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMode {
    String,
    Varchar,
    Char,
}

/// Numeric flavor of a number-backed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericMode {
    Tinyint,
    Smallint,
    Int,
    Bigint,
    Float,
    Double,
    Decimal,
}

/// Structural type of one column.
///
/// Qualifier-derived fields (`maxLength`, `precision`, `scale`) carry
/// the qualifier's integer when present, a bare string otherwise, so
/// serialized documents keep the field either way.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GenericType {
    Text {
        mode: TextMode,
        #[serde(rename = "maxLength", skip_serializing_if = "Value::is_null")]
        max_length: Value,
    },
    Numeric {
        mode: NumericMode,
        #[serde(skip_serializing_if = "Value::is_null")]
        precision: Value,
        #[serde(skip_serializing_if = "Value::is_null")]
        scale: Value,
    },
    Bool,
    Binary,
    Timestamp,
    Date,
    Interval,
    Array {
        subtype: String,
        items: Vec<Value>,
    },
    Map {
        #[serde(rename = "keySubtype")]
        key_subtype: String,
        subtype: String,
        properties: serde_json::Map<String, Value>,
    },
    Struct {
        #[serde(rename = "keyType")]
        key_type: String,
        subtype: String,
        properties: serde_json::Map<String, Value>,
    },
    Unsupported {
        #[serde(rename = "wireType")]
        wire_type: String,
    },
}

fn text(mode: TextMode, max_length: Value) -> GenericType {
    GenericType::Text { mode, max_length }
}

fn numeric(mode: NumericMode) -> GenericType {
    GenericType::Numeric {
        mode,
        precision: Value::Null,
        scale: Value::Null,
    }
}

/// Look up a named qualifier: the integer value wins, then the string
/// value, then an empty string.
fn qualifier(entry: &PrimitiveTypeEntry, name: &str) -> Value {
    entry
        .qualifiers
        .as_ref()
        .and_then(|quals| quals.qualifiers.get(name))
        .and_then(|value| {
            value
                .i32_value
                .map(Value::from)
                .or_else(|| value.string_value.clone().map(Value::String))
        })
        .unwrap_or_else(|| Value::String(String::new()))
}

/// Map one primitive type entry to its structural type. Descriptors
/// with no primitive entry, and wire types this model has no shape
/// for, map to an `unsupported` marker naming the wire type.
pub fn map_type(entry: Option<&PrimitiveTypeEntry>) -> GenericType {
    let Some(entry) = entry else {
        return GenericType::Unsupported {
            wire_type: "UNDESCRIBED".to_string(),
        };
    };
    match entry.type_id {
        // Untyped nulls present as plain text downstream.
        TypeId::Null | TypeId::String => text(TextMode::String, Value::Null),
        TypeId::Varchar => text(
            TextMode::Varchar,
            qualifier(entry, "characterMaximumLength"),
        ),
        TypeId::Char => text(TextMode::Char, qualifier(entry, "characterMaximumLength")),
        TypeId::Tinyint => numeric(NumericMode::Tinyint),
        TypeId::Smallint => numeric(NumericMode::Smallint),
        TypeId::Int => numeric(NumericMode::Int),
        TypeId::Bigint => numeric(NumericMode::Bigint),
        TypeId::Float => numeric(NumericMode::Float),
        TypeId::Double => numeric(NumericMode::Double),
        TypeId::Decimal => GenericType::Numeric {
            mode: NumericMode::Decimal,
            precision: qualifier(entry, "precision"),
            scale: qualifier(entry, "scale"),
        },
        TypeId::Boolean => GenericType::Bool,
        TypeId::Binary => GenericType::Binary,
        TypeId::Timestamp => GenericType::Timestamp,
        TypeId::Date => GenericType::Date,
        TypeId::IntervalYearMonth | TypeId::IntervalDayTime => GenericType::Interval,
        TypeId::Array => GenericType::Array {
            subtype: "array<txt>".to_string(),
            items: Vec::new(),
        },
        TypeId::Map => GenericType::Map {
            key_subtype: "string".to_string(),
            subtype: "map<txt>".to_string(),
            properties: serde_json::Map::new(),
        },
        TypeId::Struct => GenericType::Struct {
            key_type: "string".to_string(),
            subtype: "struct<txt>".to_string(),
            properties: serde_json::Map::new(),
        },
        TypeId::Union | TypeId::UserDefined | TypeId::Unknown(_) => GenericType::Unsupported {
            wire_type: entry.type_id.wire_name(),
        },
    }
}

/// Build a draft-04-style document schema from a result-set schema:
/// one property per column keyed by short name, each carrying its
/// structural type and the column comment.
pub fn map_schema(schema: &TableSchema) -> Value {
    let mut properties = serde_json::Map::new();
    for desc in &schema.columns {
        let mut field = serde_json::to_value(map_type(desc.primitive_entry()))
            .unwrap_or(Value::Null);
        if let Value::Object(object) = &mut field {
            object.insert(
                "comments".to_string(),
                Value::String(desc.comment.clone().unwrap_or_default()),
            );
        }
        properties.insert(short_name(&desc.column_name).to_string(), field);
    }
    json!({
        "$schema": "http://json-schema.org/draft-04/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::{
        ColumnDesc, TypeDesc, TypeEntry, TypeQualifierValue, TypeQualifiers,
    };
    use std::collections::HashMap;

    fn entry(type_id: TypeId) -> PrimitiveTypeEntry {
        PrimitiveTypeEntry {
            type_id,
            qualifiers: None,
        }
    }

    fn entry_with_qualifiers(
        type_id: TypeId,
        qualifiers: &[(&str, TypeQualifierValue)],
    ) -> PrimitiveTypeEntry {
        let qualifiers: HashMap<String, TypeQualifierValue> = qualifiers
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        PrimitiveTypeEntry {
            type_id,
            qualifiers: Some(TypeQualifiers { qualifiers }),
        }
    }

    fn i32_qualifier(v: i32) -> TypeQualifierValue {
        TypeQualifierValue {
            i32_value: Some(v),
            string_value: None,
        }
    }

    #[test]
    fn test_varchar_carries_max_length_qualifier() {
        let entry = entry_with_qualifiers(
            TypeId::Varchar,
            &[("characterMaximumLength", i32_qualifier(64))],
        );
        let mapped = map_type(Some(&entry));
        assert_eq!(
            serde_json::to_value(&mapped).unwrap(),
            json!({"type": "text", "mode": "varchar", "maxLength": 64})
        );
    }

    #[test]
    fn test_missing_qualifier_defaults_to_empty_string() {
        let mapped = map_type(Some(&entry(TypeId::Char)));
        assert_eq!(
            serde_json::to_value(&mapped).unwrap(),
            json!({"type": "text", "mode": "char", "maxLength": ""})
        );
    }

    #[test]
    fn test_string_qualifier_value_is_used_when_no_i32() {
        let entry = entry_with_qualifiers(
            TypeId::Decimal,
            &[
                ("precision", i32_qualifier(10)),
                (
                    "scale",
                    TypeQualifierValue {
                        i32_value: None,
                        string_value: Some("2".to_string()),
                    },
                ),
            ],
        );
        let mapped = map_type(Some(&entry));
        assert_eq!(
            serde_json::to_value(&mapped).unwrap(),
            json!({"type": "numeric", "mode": "decimal", "precision": 10, "scale": "2"})
        );
    }

    #[test]
    fn test_scalar_wire_types_map_to_markers() {
        assert_eq!(map_type(Some(&entry(TypeId::Boolean))), GenericType::Bool);
        assert_eq!(map_type(Some(&entry(TypeId::Binary))), GenericType::Binary);
        assert_eq!(
            map_type(Some(&entry(TypeId::Timestamp))),
            GenericType::Timestamp
        );
        assert_eq!(map_type(Some(&entry(TypeId::Date))), GenericType::Date);
        assert_eq!(
            map_type(Some(&entry(TypeId::IntervalDayTime))),
            GenericType::Interval
        );
    }

    #[test]
    fn test_null_wire_type_presents_as_text() {
        assert_eq!(
            serde_json::to_value(map_type(Some(&entry(TypeId::Null)))).unwrap(),
            json!({"type": "text", "mode": "string"})
        );
    }

    #[test]
    fn test_complex_types_map_to_placeholder_shapes() {
        assert_eq!(
            serde_json::to_value(map_type(Some(&entry(TypeId::Array)))).unwrap(),
            json!({"type": "array", "subtype": "array<txt>", "items": []})
        );
        assert_eq!(
            serde_json::to_value(map_type(Some(&entry(TypeId::Map)))).unwrap(),
            json!({"type": "map", "keySubtype": "string", "subtype": "map<txt>", "properties": {}})
        );
        assert_eq!(
            serde_json::to_value(map_type(Some(&entry(TypeId::Struct)))).unwrap(),
            json!({"type": "struct", "keyType": "string", "subtype": "struct<txt>", "properties": {}})
        );
    }

    #[test]
    fn test_union_and_unknown_map_to_unsupported() {
        assert_eq!(
            map_type(Some(&entry(TypeId::Union))),
            GenericType::Unsupported {
                wire_type: "UNION".to_string()
            }
        );
        assert_eq!(
            map_type(Some(&entry(TypeId::Unknown(42)))),
            GenericType::Unsupported {
                wire_type: "UNKNOWN(42)".to_string()
            }
        );
        assert_eq!(
            map_type(None),
            GenericType::Unsupported {
                wire_type: "UNDESCRIBED".to_string()
            }
        );
    }

    #[test]
    fn test_map_schema_builds_document_with_comments() {
        let schema = TableSchema {
            columns: vec![ColumnDesc {
                column_name: "t.id".to_string(),
                type_desc: TypeDesc {
                    types: vec![TypeEntry {
                        primitive: Some(entry(TypeId::Int)),
                    }],
                },
                position: 1,
                comment: Some("primary id".to_string()),
            }],
        };
        let document = map_schema(&schema);
        assert_eq!(
            document["$schema"],
            json!("http://json-schema.org/draft-04/schema#")
        );
        assert_eq!(document["additionalProperties"], json!(false));
        assert_eq!(
            document["properties"]["id"],
            json!({"type": "numeric", "mode": "int", "comments": "primary id"})
        );
    }
}
