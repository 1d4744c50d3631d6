// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bidirectional conversion between entities and flat records
//!
//! Encoding walks the declared attribute tree depth-first and emits one
//! path/value pair per populated leaf. Repeated embedded attributes are
//! encoded element by element and merged per sub-path into index-aligned
//! positional sequences: index *i* always holds the contribution of element
//! *i*, padded with nulls where an element contributed nothing.
//!
//! Decoding iterates the record's canonically ordered keys and applies each
//! through a recursive single-path setter. Structural path errors surface
//! before any mutation for that key.

use crate::error::{CodecError, Result};
use crate::path::{render_segments, PathExpression, PathSegment, PathSyntax};
use crate::resolver::{resolve_by_name, ResolvePolicy, ResolvedAttribute};
use flatgraph_model::{
    AttributeDescriptor, AttributeHolder, AttributeShape, Entity, FlatRecord, Slot, TypeDescriptor,
    TypeRegistry, Value, ValueKind, TYPE_KEY,
};
use serde::{Deserialize, Serialize};

/// Conversion options
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapperOptions {
    /// Path notation settings
    pub syntax: PathSyntax,
    /// Policy for undeclared attribute names
    pub policy: ResolvePolicy,
    /// Encode date/time leaves as their canonical string form
    pub stringify_temporal: bool,
    /// Encode repeated scalar leaves as one joined string instead of a
    /// native sequence
    pub join_repeated_as_string: bool,
    /// Split string values on the cardinality separator when decoding into a
    /// repeated scalar leaf
    pub split_cardinality_strings: bool,
    /// Apply declared-kind coercion when decoding
    pub coerce: bool,
}

impl MapperOptions {
    /// Default conversion options: native sequences, splitting enabled,
    /// coercion enabled, strict undeclared-attribute policy
    pub fn new() -> Self {
        Self {
            syntax: PathSyntax::default(),
            policy: ResolvePolicy::default(),
            stringify_temporal: false,
            join_repeated_as_string: false,
            split_cardinality_strings: true,
            coerce: true,
        }
    }
}

impl Default for MapperOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Bidirectional entity/flat-record converter
pub struct GraphMapper {
    options: MapperOptions,
}

impl Default for GraphMapper {
    fn default() -> Self {
        Self::new(MapperOptions::new())
    }
}

impl GraphMapper {
    /// Create a mapper with the given options
    pub fn new(options: MapperOptions) -> Self {
        Self { options }
    }

    /// The active options
    pub fn options(&self) -> &MapperOptions {
        &self.options
    }

    // ========================================================================
    // Encoding
    // ========================================================================

    /// Encode an entity into a flat record.
    ///
    /// The reserved type key is always present; key order follows the
    /// record's canonical ordering regardless of traversal order.
    pub fn encode(&self, entity: &Entity) -> Result<FlatRecord> {
        let mut record = FlatRecord::new();
        record.insert(TYPE_KEY, Value::Text(entity.type_uri().to_string()));
        for (path, value) in self.encode_holder(entity.holder()) {
            record.insert(path, value);
        }
        Ok(record)
    }

    /// Encode a holder into relative path/value pairs, depth first.
    fn encode_holder(&self, holder: &AttributeHolder) -> Vec<(String, Value)> {
        let syntax = &self.options.syntax;
        let mut out = Vec::new();
        for (attribute, slot) in holder.iter() {
            let Some(slot) = slot else { continue };
            match slot {
                Slot::Value(value) => {
                    if value.is_null() || matches!(value, Value::List(items) if items.is_empty()) {
                        continue;
                    }
                    let key = if attribute.repeatable {
                        format!("{}{}", attribute.name, syntax.cardinality_indicator)
                    } else {
                        attribute.name.to_string()
                    };
                    out.push((key, self.encode_leaf(attribute, value)));
                }
                Slot::Complex(child) => {
                    let nested = self.encode_holder(child);
                    self.push_nested(&mut out, attribute, child.descriptor(), nested, false);
                }
                Slot::ComplexList(elements) => {
                    if elements.is_empty() {
                        continue;
                    }
                    let merged = self.merge_elements(elements);
                    if let Some(td) = attribute.complex_type() {
                        self.push_nested(&mut out, attribute, td, merged, true);
                    }
                }
            }
        }
        for (name, value) in holder.extensions() {
            out.push((name.clone(), value.clone()));
        }
        out
    }

    /// Merge per-element encodings into index-aligned positional sequences.
    ///
    /// Element *i*'s contribution to a sub-path always lands at index *i*;
    /// indexes with no contribution are filled with null, including trailing
    /// ones, so sparse attributes across heterogeneous elements stay aligned.
    fn merge_elements(&self, elements: &[AttributeHolder]) -> Vec<(String, Value)> {
        let mut merged: Vec<(String, Vec<Value>)> = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            for (sub, value) in self.encode_holder(element) {
                let slot = match merged.iter().position(|(path, _)| path == &sub) {
                    Some(i) => i,
                    None => {
                        merged.push((sub, Vec::new()));
                        merged.len() - 1
                    }
                };
                let values = &mut merged[slot].1;
                while values.len() < index {
                    values.push(Value::Null);
                }
                values.push(value);
            }
        }
        merged
            .into_iter()
            .map(|(sub, mut values)| {
                while values.len() < elements.len() {
                    values.push(Value::Null);
                }
                (sub, Value::List(values))
            })
            .collect()
    }

    /// Prefix nested pairs with the attribute name, applying the
    /// value-shortcut rewrite for quantity wrappers.
    fn push_nested(
        &self,
        out: &mut Vec<(String, Value)>,
        attribute: &AttributeDescriptor,
        child: &'static TypeDescriptor,
        nested: Vec<(String, Value)>,
        repeated: bool,
    ) {
        let syntax = &self.options.syntax;
        let base = if repeated {
            format!("{}{}", attribute.name, syntax.cardinality_indicator)
        } else {
            attribute.name.to_string()
        };
        let shortcut = if syntax.value_shortcut {
            child.wraps_value
        } else {
            None
        };
        for (sub, value) in nested {
            let key = match shortcut {
                Some(inner) if sub == inner => base.clone(),
                _ => format!("{}{}{}", base, syntax.separator, sub),
            };
            out.push((key, value));
        }
    }

    /// Apply leaf-level encoding options to a scalar or repeated value.
    fn encode_leaf(&self, attribute: &AttributeDescriptor, value: &Value) -> Value {
        if attribute.repeatable {
            let items: Vec<Value> = match value {
                Value::List(items) => items.clone(),
                other => vec![other.clone()],
            };
            if self.options.join_repeated_as_string {
                let joined = items
                    .iter()
                    .map(|item| item.to_string())
                    .collect::<Vec<_>>()
                    .join(&self.options.syntax.cardinality_separator.to_string());
                Value::Text(joined)
            } else {
                Value::List(items.into_iter().map(|item| self.stringified(item)).collect())
            }
        } else {
            self.stringified(value.clone())
        }
    }

    fn stringified(&self, value: Value) -> Value {
        if self.options.stringify_temporal {
            match value {
                Value::Date(_) | Value::DateTime(_) => Value::Text(value.to_string()),
                other => other,
            }
        } else {
            value
        }
    }

    // ========================================================================
    // Decoding
    // ========================================================================

    /// Decode a flat record into a freshly instantiated entity.
    ///
    /// The reserved type key must be present and resolve in the registry.
    /// Keys are processed in canonical order; each key's path is validated
    /// in full before any mutation for that key.
    pub fn decode(&self, record: &FlatRecord, registry: &TypeRegistry) -> Result<Entity> {
        let uri = record.type_uri().ok_or(CodecError::MissingTypeIdentifier)?;
        let mut entity = registry.instantiate(uri)?;
        for (key, value) in record.iter() {
            if key == TYPE_KEY {
                continue;
            }
            let path = PathExpression::parse(key, &self.options.syntax)?;
            self.set_path(entity.holder_mut(), key, path.segments(), value)?;
        }
        Ok(entity)
    }

    /// Recursive single-path setter.
    fn set_path(
        &self,
        holder: &mut AttributeHolder,
        full_path: &str,
        segments: &[PathSegment],
        value: &Value,
    ) -> Result<()> {
        let Some((head, rest)) = segments.split_first() else {
            return Ok(());
        };
        if value.is_null() {
            return Ok(());
        }
        let resolved = resolve_by_name(
            holder.descriptor(),
            &head.name,
            &self.options.syntax,
            &self.options.policy,
        )?;
        let (attribute, inner) = match resolved {
            ResolvedAttribute::Extension => {
                let name = render_segments(segments, &self.options.syntax);
                holder.set_extension(name, value.clone());
                return Ok(());
            }
            ResolvedAttribute::Declared { attribute, inner } => (attribute, inner),
        };
        if head.cardinality != attribute.repeatable {
            let reason = if attribute.repeatable {
                format!(
                    "attribute '{}' is repeatable and requires the cardinality indicator",
                    attribute.name
                )
            } else {
                format!("attribute '{}' is not repeatable", attribute.name)
            };
            return Err(CodecError::cardinality(full_path, reason));
        }
        if attribute.repeatable {
            self.set_repeated(holder, full_path, attribute, inner, rest, value)
        } else if rest.is_empty() {
            self.set_leaf(holder, full_path, attribute, inner, value)
        } else {
            match attribute.shape {
                AttributeShape::Complex(_) => {
                    let child = holder.ensure_complex(attribute.name)?;
                    self.set_path(child, full_path, rest, value)
                }
                AttributeShape::Scalar(_) => Err(CodecError::assignment(
                    full_path,
                    format!(
                        "attribute '{}' is scalar and has no field '{}'",
                        attribute.name, rest[0].name
                    ),
                )),
            }
        }
    }

    /// Assign through a cardinality-marked segment.
    ///
    /// A native sequence fans out index-per-element; a scalar only ever
    /// targets a single newly-or-already allocated element.
    fn set_repeated(
        &self,
        holder: &mut AttributeHolder,
        full_path: &str,
        attribute: &'static AttributeDescriptor,
        inner: Option<&'static AttributeDescriptor>,
        rest: &[PathSegment],
        value: &Value,
    ) -> Result<()> {
        match attribute.shape {
            AttributeShape::Complex(_) if !rest.is_empty() => match value {
                Value::List(items) => {
                    for (index, item) in items.iter().enumerate() {
                        let element = holder.ensure_element(attribute.name, index)?;
                        if item.is_null() {
                            continue;
                        }
                        self.set_path(element, full_path, rest, item)?;
                    }
                    Ok(())
                }
                scalar => {
                    let element = holder.last_or_new_element(attribute.name)?;
                    self.set_path(element, full_path, rest, scalar)
                }
            },
            AttributeShape::Complex(_) => {
                // marked leaf on an embedded attribute: only valid through
                // the quantity-wrapper shortcut
                let Some(inner) = inner else {
                    return Err(CodecError::assignment(
                        full_path,
                        format!(
                            "embedded attribute '{}' requires a field path",
                            attribute.name
                        ),
                    ));
                };
                let kind = inner.value_kind().ok_or_else(|| {
                    CodecError::assignment(full_path, "wrapped field is not scalar")
                })?;
                for (index, item) in self.leaf_items(value).iter().enumerate() {
                    let element = holder.ensure_element(attribute.name, index)?;
                    if item.is_null() {
                        continue;
                    }
                    let coerced = self.coerce(kind, item, full_path)?;
                    element.set(inner.name, Slot::Value(coerced))?;
                }
                Ok(())
            }
            AttributeShape::Scalar(kind) => {
                if !rest.is_empty() {
                    return Err(CodecError::assignment(
                        full_path,
                        format!(
                            "attribute '{}' is scalar and has no field '{}'",
                            attribute.name, rest[0].name
                        ),
                    ));
                }
                let mut items = Vec::new();
                for item in self.leaf_items(value) {
                    items.push(self.coerce(kind, &item, full_path)?);
                }
                holder.set(attribute.name, Slot::Value(Value::List(items)))?;
                Ok(())
            }
        }
    }

    /// Assign a leaf value to a non-repeated attribute.
    fn set_leaf(
        &self,
        holder: &mut AttributeHolder,
        full_path: &str,
        attribute: &'static AttributeDescriptor,
        inner: Option<&'static AttributeDescriptor>,
        value: &Value,
    ) -> Result<()> {
        match (attribute.shape, inner) {
            (AttributeShape::Scalar(kind), _) => {
                let coerced = self.coerce(kind, value, full_path)?;
                holder.set(attribute.name, Slot::Value(coerced))?;
                Ok(())
            }
            (AttributeShape::Complex(_), Some(inner)) => {
                let kind = inner.value_kind().ok_or_else(|| {
                    CodecError::assignment(full_path, "wrapped field is not scalar")
                })?;
                let coerced = self.coerce(kind, value, full_path)?;
                let child = holder.ensure_complex(attribute.name)?;
                child.set(inner.name, Slot::Value(coerced))?;
                Ok(())
            }
            (AttributeShape::Complex(_), None) => Err(CodecError::assignment(
                full_path,
                format!(
                    "embedded attribute '{}' requires a field path",
                    attribute.name
                ),
            )),
        }
    }

    /// Expand a leaf value into its item sequence, splitting joined strings
    /// when enabled.
    fn leaf_items(&self, value: &Value) -> Vec<Value> {
        match value {
            Value::List(items) => items.clone(),
            Value::Text(s) if self.options.split_cardinality_strings => s
                .split(self.options.syntax.cardinality_separator)
                .map(|part| Value::Text(part.to_string()))
                .collect(),
            other => vec![other.clone()],
        }
    }

    fn coerce(&self, kind: ValueKind, value: &Value, path: &str) -> Result<Value> {
        if !self.options.coerce {
            return Ok(value.clone());
        }
        kind.coerce(value).map_err(|source| CodecError::Coercion {
            path: path.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatgraph_model::vocabulary::LICHTMAST;
    use flatgraph_model::ModelError;
    use pretty_assertions::assert_eq;

    fn registry() -> TypeRegistry {
        TypeRegistry::standard()
    }

    fn mapper() -> GraphMapper {
        GraphMapper::default()
    }

    /// A light pole exercising every attribute shape.
    fn sample_mast() -> Entity {
        let mut entity = Entity::new(&LICHTMAST);
        let holder = entity.holder_mut();
        holder
            .ensure_complex("assetId")
            .unwrap()
            .set_value("identificator", "LM-007")
            .unwrap();
        holder.set_value("naam", "Mast 7").unwrap();
        holder.set_value("toestand", "in-gebruik").unwrap();
        holder
            .ensure_complex("hoogte")
            .unwrap()
            .set_value("waarde", 12.5)
            .unwrap();
        holder
            .set_value(
                "labels",
                Value::List(vec![Value::Text("rood".into()), Value::Text("groen".into())]),
            )
            .unwrap();
        entity
    }

    #[test]
    fn test_round_trip_default_options() {
        let entity = sample_mast();
        let record = mapper().encode(&entity).unwrap();
        let back = mapper().decode(&record, &registry()).unwrap();
        assert_eq!(back, entity);
    }

    #[test]
    fn test_encode_is_idempotent_through_decode() {
        let entity = sample_mast();
        let m = mapper();
        let record = m.encode(&entity).unwrap();
        let again = m.encode(&m.decode(&record, &registry()).unwrap()).unwrap();
        assert_eq!(again, record);
    }

    #[test]
    fn test_type_key_ordered_first() {
        let record = mapper().encode(&sample_mast()).unwrap();
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys[0], TYPE_KEY);
        assert_eq!(keys[1], "assetId.identificator");
    }

    #[test]
    fn test_shortcut_collapses_quantity_wrapper() {
        let record = mapper().encode(&sample_mast()).unwrap();
        assert_eq!(record.get("hoogte"), Some(&Value::Float(12.5)));
        assert!(!record.contains_key("hoogte.waarde"));
    }

    #[test]
    fn test_shortcut_disabled_emits_full_path() {
        let options = MapperOptions {
            syntax: PathSyntax {
                value_shortcut: false,
                ..PathSyntax::default()
            },
            ..MapperOptions::new()
        };
        let record = GraphMapper::new(options).encode(&sample_mast()).unwrap();
        assert_eq!(record.get("hoogte.waarde"), Some(&Value::Float(12.5)));
        assert!(!record.contains_key("hoogte"));
    }

    #[test]
    fn test_decode_accepts_explicit_inner_path_too() {
        let mut record = FlatRecord::new();
        record.insert(TYPE_KEY, Value::Text(LICHTMAST.uri.into()));
        record.insert("hoogte.waarde", Value::Text("8.2".into()));
        let entity = mapper().decode(&record, &registry()).unwrap();
        let Some(Slot::Complex(hoogte)) = entity.holder().get("hoogte") else {
            panic!("expected complex slot");
        };
        assert_eq!(hoogte.get("waarde"), Some(&Slot::Value(Value::Float(8.2))));
    }

    #[test]
    fn test_repeated_complex_index_alignment() {
        let mut entity = Entity::new(&LICHTMAST);
        // element 0 sets only bestandsnaam, element 1 sets only uri
        entity
            .holder_mut()
            .ensure_element("documenten", 0)
            .unwrap()
            .set_value("bestandsnaam", "x0.pdf")
            .unwrap();
        entity
            .holder_mut()
            .ensure_element("documenten", 1)
            .unwrap()
            .set_value("uri", "https://example.org/y1")
            .unwrap();
        let record = mapper().encode(&entity).unwrap();
        assert_eq!(
            record.get("documenten[].bestandsnaam"),
            Some(&Value::List(vec![Value::Text("x0.pdf".into()), Value::Null]))
        );
        assert_eq!(
            record.get("documenten[].uri"),
            Some(&Value::List(vec![
                Value::Null,
                Value::Text("https://example.org/y1".into())
            ]))
        );
        // and the alignment survives a round trip
        let back = mapper().decode(&record, &registry()).unwrap();
        assert_eq!(back, entity);
    }

    #[test]
    fn test_decode_scalar_targets_single_element() {
        let mut record = FlatRecord::new();
        record.insert(TYPE_KEY, Value::Text(LICHTMAST.uri.into()));
        record.insert("documenten[].bestandsnaam", Value::Text("a.pdf".into()));
        let entity = mapper().decode(&record, &registry()).unwrap();
        let Some(Slot::ComplexList(list)) = entity.holder().get("documenten") else {
            panic!("expected complex list");
        };
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_split_cardinality_strings() {
        let mut record = FlatRecord::new();
        record.insert(TYPE_KEY, Value::Text(LICHTMAST.uri.into()));
        record.insert("labels[]", Value::Text("rood|groen".into()));
        let entity = mapper().decode(&record, &registry()).unwrap();
        assert_eq!(
            entity.holder().get("labels"),
            Some(&Slot::Value(Value::List(vec![
                Value::Text("rood".into()),
                Value::Text("groen".into())
            ])))
        );
    }

    #[test]
    fn test_join_repeated_as_string() {
        let options = MapperOptions {
            join_repeated_as_string: true,
            ..MapperOptions::new()
        };
        let record = GraphMapper::new(options).encode(&sample_mast()).unwrap();
        assert_eq!(
            record.get("labels[]"),
            Some(&Value::Text("rood|groen".into()))
        );
    }

    #[test]
    fn test_stringify_temporal() {
        let mut entity = sample_mast();
        entity
            .holder_mut()
            .set_value(
                "datumOprichtingObject",
                Value::Date(chrono::NaiveDate::from_ymd_opt(2019, 5, 1).unwrap()),
            )
            .unwrap();
        let options = MapperOptions {
            stringify_temporal: true,
            ..MapperOptions::new()
        };
        let record = GraphMapper::new(options).encode(&entity).unwrap();
        assert_eq!(
            record.get("datumOprichtingObject"),
            Some(&Value::Text("2019-05-01".into()))
        );
    }

    #[test]
    fn test_missing_type_identifier() {
        let record = FlatRecord::new();
        let err = mapper().decode(&record, &registry()).unwrap_err();
        assert!(matches!(err, CodecError::MissingTypeIdentifier));
    }

    #[test]
    fn test_unknown_type_identifier() {
        let mut record = FlatRecord::new();
        record.insert(TYPE_KEY, Value::Text("uri:nergens".into()));
        let err = mapper().decode(&record, &registry()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Model(ModelError::UnknownTypeIdentifier(_))
        ));
    }

    #[test]
    fn test_marker_on_single_attribute_is_mismatch() {
        let mut record = FlatRecord::new();
        record.insert(TYPE_KEY, Value::Text(LICHTMAST.uri.into()));
        record.insert("naam[]", Value::Text("x".into()));
        let err = mapper().decode(&record, &registry()).unwrap_err();
        assert!(matches!(err, CodecError::CardinalityMismatch { .. }));
    }

    #[test]
    fn test_missing_marker_on_repeated_attribute_is_mismatch() {
        let mut record = FlatRecord::new();
        record.insert(TYPE_KEY, Value::Text(LICHTMAST.uri.into()));
        record.insert("labels", Value::Text("x".into()));
        let err = mapper().decode(&record, &registry()).unwrap_err();
        assert!(matches!(err, CodecError::CardinalityMismatch { .. }));
    }

    #[test]
    fn test_undeclared_key_rejected_by_default() {
        let mut record = FlatRecord::new();
        record.insert(TYPE_KEY, Value::Text(LICHTMAST.uri.into()));
        record.insert("vermogen", Value::Int(150));
        let err = mapper().decode(&record, &registry()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Model(ModelError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_undeclared_key_stored_as_extension_when_allowed() {
        let options = MapperOptions {
            policy: ResolvePolicy::permissive(),
            ..MapperOptions::new()
        };
        let m = GraphMapper::new(options);
        let mut record = FlatRecord::new();
        record.insert(TYPE_KEY, Value::Text(LICHTMAST.uri.into()));
        record.insert("vermogen", Value::Int(150));
        let entity = m.decode(&record, &registry()).unwrap();
        assert_eq!(
            entity.holder().extensions().get("vermogen"),
            Some(&Value::Int(150))
        );
        // extensions survive re-encoding
        let again = m.encode(&entity).unwrap();
        assert_eq!(again.get("vermogen"), Some(&Value::Int(150)));
    }

    #[test]
    fn test_internal_prefix_key_always_rejected() {
        let options = MapperOptions {
            policy: ResolvePolicy::permissive(),
            ..MapperOptions::new()
        };
        let mut record = FlatRecord::new();
        record.insert(TYPE_KEY, Value::Text(LICHTMAST.uri.into()));
        record.insert("_geometry", Value::Text("POINT Z (0 0 0)".into()));
        let err = GraphMapper::new(options)
            .decode(&record, &registry())
            .unwrap_err();
        assert!(matches!(err, CodecError::MalformedPath { .. }));
    }

    #[test]
    fn test_coercion_error_names_the_path() {
        let mut record = FlatRecord::new();
        record.insert(TYPE_KEY, Value::Text(LICHTMAST.uri.into()));
        record.insert("hoogte", Value::Text("twaalf".into()));
        let err = mapper().decode(&record, &registry()).unwrap_err();
        let CodecError::Coercion { path, .. } = err else {
            panic!("expected coercion error, got {err}");
        };
        assert_eq!(path, "hoogte");
    }

    #[test]
    fn test_coercion_can_be_disabled() {
        let options = MapperOptions {
            coerce: false,
            ..MapperOptions::new()
        };
        let mut record = FlatRecord::new();
        record.insert(TYPE_KEY, Value::Text(LICHTMAST.uri.into()));
        record.insert("hoogte", Value::Text("twaalf".into()));
        let entity = GraphMapper::new(options)
            .decode(&record, &registry())
            .unwrap();
        let Some(Slot::Complex(hoogte)) = entity.holder().get("hoogte") else {
            panic!("expected complex slot");
        };
        assert_eq!(
            hoogte.get("waarde"),
            Some(&Slot::Value(Value::Text("twaalf".into())))
        );
    }
}
