//! Value coercion between document cells and typed fields.
//!
//! Import turns a [`ConfigValue`] into the [`FieldValue`] a field of a given
//! [`ValueKind`] expects; export turns a field back into text. The rules:
//!
//! | Kind     | Import                                            | Export                 |
//! |----------|---------------------------------------------------|------------------------|
//! | untyped  | stored as-is                                      | stringified            |
//! | nullable | `null` token → null, else by kind                 | null → `null`          |
//! | bool     | `1`, `true`, `on`, `yes` → true, else false       | `true` / `false`       |
//! | array    | split on `,` and trimmed; empty text → `[]`       | joined with `", "`     |
//! | keyed    | kept with its keys                                | one `key[sub]` per item|
//! |          |                                                   | (all-numeric: joined)  |
//! | int      | trimmed, parsed; failure is an error              | decimal                |
//! | float    | trimmed, parsed; failure is an error              | shortest round-trip    |
//! | string   | any scalar, stringified                           | verbatim               |

use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

use crate::document::{ConfigValue, OrderedMap, Scalar};
use crate::structure::{Array, FieldValue, ScalarKind, ValueKind};

/// The literal that stands for "no value" in nullable fields.
pub const NULL_TOKEN: &str = "null";

/// Text that imports as `true`. Matching is exact.
pub const TRUE_TOKENS: [&str; 4] = ["1", "true", "on", "yes"];

pub const ARRAY_SEPARATOR: char = ',';
pub const ARRAY_JOINER: &str = ", ";

#[derive(Debug, Error)]
pub enum CoerceError {
    #[error("'{value}' is not an integer: {source}")]
    InvalidInt {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("'{value}' is not a number: {source}")]
    InvalidFloat {
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("{value} is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    #[error("null is not allowed for a non-nullable field")]
    NullNotAllowed,

    #[error("expected {expected}, found {found}")]
    Shape {
        expected: &'static str,
        found: &'static str,
    },
}

/// Result of exporting one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Exported {
    /// A single `key = text` line.
    Text(String),
    /// One `key[sub] = value` line per entry.
    Entries(Vec<(String, String)>),
    /// Nothing to write.
    Omit,
}

/// `true` for the null cell and for the literal NULL token.
pub fn is_null(raw: &ConfigValue) -> bool {
    match raw {
        ConfigValue::Null => true,
        ConfigValue::Scalar(Scalar::Str(s)) => s == NULL_TOKEN,
        _ => false,
    }
}

pub(crate) fn shape_name(raw: &ConfigValue) -> &'static str {
    match raw {
        ConfigValue::Scalar(_) => "a scalar",
        ConfigValue::Null => "null",
        ConfigValue::Seq(_) => "a list",
        ConfigValue::Map(_) => "a keyed list",
        ConfigValue::Section(_) => "a section",
    }
}

/// Coerce a document cell for a field of `kind`.
///
/// Nested kinds are loaded by the gateway, not here.
pub fn import(kind: ValueKind, nullable: bool, raw: &ConfigValue) -> Result<FieldValue, CoerceError> {
    if kind == ValueKind::Untyped {
        return Ok(FieldValue::Raw(raw.clone()));
    }
    if nullable && is_null(raw) {
        return Ok(FieldValue::Null);
    }

    match kind {
        ValueKind::Untyped => Ok(FieldValue::Raw(raw.clone())),
        ValueKind::Array => import_array(raw).map(FieldValue::Array),
        ValueKind::Scalar(ScalarKind::Bool) => Ok(FieldValue::Bool(import_bool(raw))),
        ValueKind::Scalar(ScalarKind::String) => scalar_text(raw).map(FieldValue::Str),
        ValueKind::Scalar(ScalarKind::Int) => import_int(raw).map(FieldValue::Int),
        ValueKind::Scalar(ScalarKind::Float) => import_float(raw).map(FieldValue::Float),
        ValueKind::Nested(_) => Err(CoerceError::Shape {
            expected: "a plain field",
            found: "a nested object",
        }),
    }
}

/// Render a field value for a field of `kind`.
pub fn export(kind: ValueKind, nullable: bool, value: FieldValue) -> Exported {
    if kind == ValueKind::Untyped {
        return Exported::Text(render_untyped(value));
    }
    if nullable && value == FieldValue::Null {
        return Exported::Text(NULL_TOKEN.to_string());
    }

    match value {
        FieldValue::Null => Exported::Text(NULL_TOKEN.to_string()),
        FieldValue::Str(s) => Exported::Text(s),
        FieldValue::Int(i) => Exported::Text(i.to_string()),
        FieldValue::Float(x) => Exported::Text(x.to_string()),
        FieldValue::Bool(b) => Exported::Text(if b { "true" } else { "false" }.to_string()),
        FieldValue::Array(Array::Seq(items)) => Exported::Text(items.join(ARRAY_JOINER)),
        FieldValue::Array(Array::Map(map)) if map.keys().all(is_index) => {
            Exported::Text(map.values().map(String::as_str).collect::<Vec<_>>().join(ARRAY_JOINER))
        }
        FieldValue::Array(Array::Map(map)) => Exported::Entries(
            map.iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        ),
        FieldValue::Raw(raw) => Exported::Text(raw.to_string()),
    }
}

/// Keys like `0` or `12` carry no meaning of their own.
fn is_index(key: &str) -> bool {
    key.parse::<i64>().is_ok()
}

fn render_untyped(value: FieldValue) -> String {
    match value {
        FieldValue::Raw(raw) => raw.to_string(),
        other => match export(ValueKind::Scalar(ScalarKind::String), false, other) {
            Exported::Text(text) => text,
            Exported::Entries(entries) => entries
                .into_iter()
                .map(|(_, v)| v)
                .collect::<Vec<_>>()
                .join(ARRAY_JOINER),
            Exported::Omit => String::new(),
        },
    }
}

fn scalar_text(raw: &ConfigValue) -> Result<String, CoerceError> {
    match raw {
        ConfigValue::Scalar(scalar) => Ok(scalar.to_string()),
        ConfigValue::Null => Err(CoerceError::NullNotAllowed),
        other => Err(CoerceError::Shape {
            expected: "a scalar",
            found: shape_name(other),
        }),
    }
}

fn import_bool(raw: &ConfigValue) -> bool {
    match raw {
        ConfigValue::Scalar(Scalar::Bool(b)) => *b,
        ConfigValue::Scalar(scalar) => {
            let text = scalar.to_string();
            TRUE_TOKENS.contains(&text.as_str())
        }
        _ => false,
    }
}

fn import_int(raw: &ConfigValue) -> Result<i128, CoerceError> {
    if let ConfigValue::Scalar(Scalar::Int(i)) = raw {
        return Ok(i128::from(*i));
    }
    let text = scalar_text(raw)?;
    text.trim()
        .parse::<i128>()
        .map_err(|source| CoerceError::InvalidInt {
            value: text.clone(),
            source,
        })
}

fn import_float(raw: &ConfigValue) -> Result<f64, CoerceError> {
    match raw {
        ConfigValue::Scalar(Scalar::Float(x)) => return Ok(*x),
        #[allow(clippy::cast_precision_loss)]
        ConfigValue::Scalar(Scalar::Int(i)) => return Ok(*i as f64),
        _ => {}
    }
    let text = scalar_text(raw)?;
    text.trim()
        .parse::<f64>()
        .map_err(|source| CoerceError::InvalidFloat {
            value: text.clone(),
            source,
        })
}

fn import_array(raw: &ConfigValue) -> Result<Array, CoerceError> {
    match raw {
        ConfigValue::Scalar(scalar) => Ok(split_list(&scalar.to_string())),
        ConfigValue::Seq(items) => Ok(Array::Seq(items.iter().map(Scalar::to_string).collect())),
        ConfigValue::Map(map) => Ok(Array::Map(
            map.iter().map(|(k, v)| (k, v.to_string())).collect(),
        )),
        ConfigValue::Section(section) => Ok(Array::Map(
            section
                .iter()
                .filter_map(|(k, v)| v.as_scalar().map(|s| (k, s.to_string())))
                .collect::<OrderedMap<String>>(),
        )),
        ConfigValue::Null => Err(CoerceError::NullNotAllowed),
    }
}

fn split_list(text: &str) -> Array {
    if text.is_empty() {
        return Array::Seq(Vec::new());
    }
    text.split(ARRAY_SEPARATOR)
        .map(|item| item.trim().to_string())
        .collect()
}
