// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/stub.rs - In-memory representation of a flasher stub.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use serde_json::{Map, Number, Value};

use crate::error::DecodeError;
use crate::literal::Literal;

/// Name of the field holding the stub's code segment.
pub const TEXT_FIELD: &str = "text";
/// Name of the field holding the stub's initialized data segment.
pub const DATA_FIELD: &str = "data";

/// The value of one stub field.
#[derive(Debug, Clone, PartialEq)]
pub enum StubValue {
    /// A memory segment (`text` or `data`).
    Binary(Vec<u8>),
    /// Any other metadata, already in its JSON form.
    Scalar(Value),
}

/// A decoded stub loader.
///
/// Fields keep the order they had in esptool. `text` and `data` are always
/// present and always [StubValue::Binary].
#[derive(Debug, Clone, PartialEq)]
pub struct StubRecord {
    fields: Vec<(String, StubValue)>,
}

impl StubRecord {
    /// Builds a record from ordered fields, checking that both segments are
    /// present and binary.
    pub fn from_fields(fields: Vec<(String, StubValue)>) -> Result<Self, DecodeError> {
        let record = Self { fields };
        for name in [TEXT_FIELD, DATA_FIELD] {
            match record.get(name) {
                Some(StubValue::Binary(_)) => {}
                Some(StubValue::Scalar(_)) => {
                    return Err(DecodeError::UnexpectedType {
                        expected: "bytes",
                        found: "scalar",
                    });
                }
                None => return Err(DecodeError::MissingField(name)),
            }
        }
        Ok(record)
    }

    /// Converts the dict literal esptool stores into a record.
    ///
    /// `text` and `data` may be bytes or str (taken as UTF-8). Every other
    /// value is converted to JSON. A repeated key replaces the earlier value
    /// but keeps its position.
    pub fn from_literal(literal: Literal) -> Result<Self, DecodeError> {
        let entries = match literal {
            Literal::Dict(entries) => entries,
            other => {
                return Err(DecodeError::UnexpectedType {
                    expected: "dict",
                    found: other.kind(),
                });
            }
        };

        let mut fields: Vec<(String, StubValue)> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let key = match key {
                Literal::Str(key) => key,
                other => return Err(DecodeError::NonStringKey { found: other.kind() }),
            };

            let value = if key == TEXT_FIELD || key == DATA_FIELD {
                match value {
                    Literal::Bytes(b) => StubValue::Binary(b),
                    Literal::Str(s) => StubValue::Binary(s.into_bytes()),
                    other => {
                        return Err(DecodeError::UnexpectedType {
                            expected: "bytes",
                            found: other.kind(),
                        });
                    }
                }
            } else {
                StubValue::Scalar(to_json(&key, value)?)
            };

            match fields.iter_mut().find(|(k, _)| *k == key) {
                Some((_, existing)) => *existing = value,
                None => fields.push((key, value)),
            }
        }

        Self::from_fields(fields)
    }

    pub fn get(&self, name: &str) -> Option<&StubValue> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// All fields in order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &StubValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn binary(&self, name: &str) -> &[u8] {
        match self.get(name) {
            Some(StubValue::Binary(b)) => b,
            _ => &[],
        }
    }

    /// The code segment.
    pub fn text(&self) -> &[u8] {
        self.binary(TEXT_FIELD)
    }

    /// The initialized data segment.
    pub fn data(&self) -> &[u8] {
        self.binary(DATA_FIELD)
    }

    fn address(&self, name: &str) -> Option<u64> {
        match self.get(name) {
            Some(StubValue::Scalar(v)) => v.as_u64(),
            _ => None,
        }
    }

    /// The address execution starts at once the stub is loaded.
    pub fn entry(&self) -> Option<u64> {
        self.address("entry")
    }

    /// Load address of the code segment.
    pub fn text_start(&self) -> Option<u64> {
        self.address("text_start")
    }

    /// Load address of the data segment.
    pub fn data_start(&self) -> Option<u64> {
        self.address("data_start")
    }
}

fn unsupported(field: &str, reason: impl Into<String>) -> DecodeError {
    DecodeError::UnsupportedValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Converts a metadata literal to JSON.
fn to_json(field: &str, literal: Literal) -> Result<Value, DecodeError> {
    Ok(match literal {
        Literal::Int(i) => {
            if let Ok(v) = i64::try_from(i) {
                Value::Number(v.into())
            } else if let Ok(v) = u64::try_from(i) {
                Value::Number(v.into())
            } else {
                return Err(unsupported(field, format!("integer {} out of range", i)));
            }
        }
        Literal::Float(f) => Value::Number(
            Number::from_f64(f).ok_or_else(|| unsupported(field, "non-finite float"))?,
        ),
        Literal::Str(s) => Value::String(s),
        Literal::Bool(b) => Value::Bool(b),
        Literal::None => Value::Null,
        Literal::List(items) | Literal::Tuple(items) => Value::Array(
            items
                .into_iter()
                .map(|item| to_json(field, item))
                .collect::<Result<_, _>>()?,
        ),
        Literal::Dict(entries) => {
            let mut map = Map::new();
            for (key, value) in entries {
                let key = match key {
                    Literal::Str(key) => key,
                    other => return Err(DecodeError::NonStringKey { found: other.kind() }),
                };
                map.insert(key, to_json(field, value)?);
            }
            Value::Object(map)
        }
        Literal::Bytes(_) => return Err(unsupported(field, "bytes outside text/data")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal;

    #[test]
    fn converts_stub_dict() {
        let lit = literal::parse(
            "{'entry': 1074521516, 'text': b'AB', 'text_start': 1074520064, 'data': 'CD', 'data_start': 1073605544}",
        )
        .unwrap();
        let record = StubRecord::from_literal(lit).unwrap();

        assert_eq!(record.text(), b"AB");
        assert_eq!(record.data(), b"CD");
        assert_eq!(record.entry(), Some(1074521516));
        assert_eq!(record.text_start(), Some(1074520064));
        assert_eq!(record.data_start(), Some(1073605544));

        let names: Vec<&str> = record.fields().map(|(k, _)| k).collect();
        assert_eq!(names, ["entry", "text", "text_start", "data", "data_start"]);
    }

    #[test]
    fn nested_metadata_converts_to_json() {
        let lit = literal::parse(
            "{'text': b'', 'data': b'', 'ranges': [(1, 2.5), None], 'flags': {'x': True}}",
        )
        .unwrap();
        let record = StubRecord::from_literal(lit).unwrap();

        assert_eq!(
            record.get("ranges"),
            Some(&StubValue::Scalar(serde_json::json!([[1, 2.5], null])))
        );
        assert_eq!(
            record.get("flags"),
            Some(&StubValue::Scalar(serde_json::json!({"x": true})))
        );
    }

    #[test]
    fn repeated_key_replaces_value_in_place() {
        let lit = literal::parse("{'text': b'a', 'data': b'b', 'text': b'c'}").unwrap();
        let record = StubRecord::from_literal(lit).unwrap();
        assert_eq!(record.text(), b"c");
        assert_eq!(record.fields().count(), 2);
    }

    #[test]
    fn missing_segment_is_an_error() {
        let lit = literal::parse("{'text': b'a', 'entry': 1}").unwrap();
        assert!(matches!(
            StubRecord::from_literal(lit),
            Err(DecodeError::MissingField("data"))
        ));
    }

    #[test]
    fn wrong_shapes_are_errors() {
        assert!(matches!(
            StubRecord::from_literal(Literal::List(vec![])),
            Err(DecodeError::UnexpectedType { expected: "dict", .. })
        ));

        let lit = literal::parse("{1: b'a'}").unwrap();
        assert!(matches!(
            StubRecord::from_literal(lit),
            Err(DecodeError::NonStringKey { found: "int" })
        ));

        let lit = literal::parse("{'text': 5, 'data': b''}").unwrap();
        assert!(matches!(
            StubRecord::from_literal(lit),
            Err(DecodeError::UnexpectedType { expected: "bytes", found: "int" })
        ));

        let lit = literal::parse("{'text': b'', 'data': b'', 'extra': b'x'}").unwrap();
        assert!(matches!(
            StubRecord::from_literal(lit),
            Err(DecodeError::UnsupportedValue { .. })
        ));
    }
}
