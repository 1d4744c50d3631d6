// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static type and attribute descriptors
//!
//! The domain model is declarative: every entity type is described by a
//! static [`TypeDescriptor`] table instead of runtime member lookup. Entity
//! types compose the shared identity/status/geometry blocks by repeating
//! descriptor constants, so no inheritance graph exists at runtime.

use crate::error::{ModelError, Result};
use crate::types::Value;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared kind of a scalar attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
}

impl ValueKind {
    /// Get the kind name as a string
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Boolean => "boolean",
            ValueKind::Date => "date",
            ValueKind::DateTime => "datetime",
        }
    }

    /// Coerce a raw incoming value to this kind.
    ///
    /// Null passes through untouched. Text parses into the numeric, boolean
    /// and temporal kinds; numeric widening (int to float) is allowed, as is
    /// a float with no fractional part narrowing to integer. Anything else
    /// is a [`ModelError::CouldNotCoerce`].
    pub fn coerce(&self, raw: &Value) -> Result<Value> {
        match (self, raw) {
            (_, Value::Null) => Ok(Value::Null),
            (ValueKind::Text, Value::Text(s)) => Ok(Value::Text(s.clone())),
            (ValueKind::Text, Value::Int(i)) => Ok(Value::Text(i.to_string())),
            (ValueKind::Text, Value::Float(v)) => Ok(Value::Text(v.to_string())),
            (ValueKind::Text, Value::Bool(b)) => Ok(Value::Text(b.to_string())),
            (ValueKind::Text, Value::Date(_) | Value::DateTime(_)) => {
                Ok(Value::Text(raw.to_string()))
            }
            (ValueKind::Integer, Value::Int(i)) => Ok(Value::Int(*i)),
            (ValueKind::Integer, Value::Float(v)) if v.fract() == 0.0 => Ok(Value::Int(*v as i64)),
            (ValueKind::Integer, Value::Text(s)) => s
                .trim()
                .parse()
                .map(Value::Int)
                .map_err(|_| self.mismatch(raw)),
            (ValueKind::Float, Value::Float(v)) => Ok(Value::Float(*v)),
            (ValueKind::Float, Value::Int(i)) => Ok(Value::Float(*i as f64)),
            (ValueKind::Float, Value::Text(s)) => s
                .trim()
                .parse()
                .map(Value::Float)
                .map_err(|_| self.mismatch(raw)),
            (ValueKind::Boolean, Value::Bool(b)) => Ok(Value::Bool(*b)),
            (ValueKind::Boolean, Value::Text(s)) => match s.trim() {
                "true" | "True" | "TRUE" => Ok(Value::Bool(true)),
                "false" | "False" | "FALSE" => Ok(Value::Bool(false)),
                _ => Err(self.mismatch(raw)),
            },
            (ValueKind::Date, Value::Date(d)) => Ok(Value::Date(*d)),
            (ValueKind::Date, Value::Text(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| self.mismatch(raw)),
            (ValueKind::DateTime, Value::DateTime(d)) => Ok(Value::DateTime(*d)),
            (ValueKind::DateTime, Value::Text(s)) => {
                let s = s.trim();
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
                    .map(Value::DateTime)
                    .map_err(|_| self.mismatch(raw))
            }
            _ => Err(self.mismatch(raw)),
        }
    }

    fn mismatch(&self, raw: &Value) -> ModelError {
        ModelError::CouldNotCoerce {
            raw: raw.to_string(),
            kind: *self,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Geometry capability tag carried by an entity type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
}

/// Shape of a declared attribute: a scalar leaf or an embedded value object
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttributeShape {
    /// Scalar leaf of the given kind
    Scalar(ValueKind),
    /// Embedded complex/union value object
    Complex(&'static TypeDescriptor),
}

/// One declared attribute of a type
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeDescriptor {
    /// Attribute name as it appears in dotted paths
    pub name: &'static str,
    /// Whether the attribute holds an ordered sequence of values
    pub repeatable: bool,
    /// Declared shape
    pub shape: AttributeShape,
}

impl AttributeDescriptor {
    /// Whether the attribute embeds a complex value object
    pub fn has_embedded_value_object(&self) -> bool {
        matches!(self.shape, AttributeShape::Complex(_))
    }

    /// Scalar kind, if this is a scalar leaf
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self.shape {
            AttributeShape::Scalar(kind) => Some(kind),
            AttributeShape::Complex(_) => None,
        }
    }

    /// Embedded type descriptor, if this embeds a value object
    pub fn complex_type(&self) -> Option<&'static TypeDescriptor> {
        match self.shape {
            AttributeShape::Scalar(_) => None,
            AttributeShape::Complex(td) => Some(td),
        }
    }
}

/// Static description of an entity type or embedded value-object type
#[derive(Debug)]
pub struct TypeDescriptor {
    /// Full type identifier; empty for embedded value-object types
    pub uri: &'static str,
    /// Short display name
    pub short_name: &'static str,
    /// Declared attributes in canonical order
    pub attributes: &'static [AttributeDescriptor],
    /// Name of the inner primitive field when this type wraps exactly one
    /// (the value-shortcut target); None otherwise
    pub wraps_value: Option<&'static str>,
    /// Geometry capability tags
    pub geometry_kinds: &'static [GeometryKind],
}

impl TypeDescriptor {
    /// Look up a declared attribute by name
    pub fn attribute(&self, name: &str) -> Option<&'static AttributeDescriptor> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// The inner primitive attribute when this type is a quantity wrapper
    pub fn wrapped_attribute(&'static self) -> Option<&'static AttributeDescriptor> {
        self.wraps_value.and_then(|name| self.attribute(name))
    }
}

// Descriptors are unique statics; identity comparison is sufficient and
// avoids walking the (potentially deep) attribute tables.
impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for TypeDescriptor {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_text_to_float() {
        assert_eq!(
            ValueKind::Float.coerce(&Value::Text("12.5".into())).unwrap(),
            Value::Float(12.5)
        );
    }

    #[test]
    fn test_coerce_int_widens() {
        assert_eq!(
            ValueKind::Float.coerce(&Value::Int(3)).unwrap(),
            Value::Float(3.0)
        );
    }

    #[test]
    fn test_coerce_null_passes_through() {
        assert_eq!(ValueKind::Date.coerce(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_coerce_bad_date_fails() {
        let err = ValueKind::Date
            .coerce(&Value::Text("07/03/2021".into()))
            .unwrap_err();
        assert!(matches!(err, ModelError::CouldNotCoerce { .. }));
    }

    #[test]
    fn test_coerce_bool_from_text() {
        assert_eq!(
            ValueKind::Boolean.coerce(&Value::Text("True".into())).unwrap(),
            Value::Bool(true)
        );
        assert!(ValueKind::Boolean.coerce(&Value::Text("ja".into())).is_err());
    }
}
