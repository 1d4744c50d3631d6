// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property extraction and projection into entities
//!
//! Walks the defines-properties relations, collects each related element's
//! named property values (stripping the label type-wrapper convention), and
//! hands the resulting flat record to the mapper's decode path. The
//! element's fully resolved field graph is attached to the entity as an
//! auxiliary, unvalidated payload.

use crate::error::{ExchangeError, Result};
use crate::graph::ExchangeGraph;
use crate::record::{Field, RecordId, RecordType};
use flatgraph_codec::{GraphMapper, MapperOptions, ResolvePolicy};
use flatgraph_model::{Entity, FlatRecord, TypeRegistry, Value};
use rustc_hash::FxHashMap;

/// Projects property-carrying elements into typed entities
pub struct PropertyExtractor<'g> {
    graph: &'g ExchangeGraph,
    mapper: GraphMapper,
}

impl<'g> PropertyExtractor<'g> {
    /// Create an extractor with the default exchange mapper: undeclared
    /// property names become warned free-form extensions
    pub fn new(graph: &'g ExchangeGraph) -> Self {
        let options = MapperOptions {
            policy: ResolvePolicy {
                allow_undeclared: true,
                warn_on_undeclared: true,
            },
            ..MapperOptions::new()
        };
        Self::with_options(graph, options)
    }

    /// Create an extractor with custom mapper options
    pub fn with_options(graph: &'g ExchangeGraph, options: MapperOptions) -> Self {
        Self {
            graph,
            mapper: GraphMapper::new(options),
        }
    }

    /// Extract one entity per property-carrying element.
    ///
    /// Every element is attempted independently; mapping failures are
    /// collected into one aggregate error instead of aborting at the first.
    pub fn extract(&self, registry: &TypeRegistry) -> Result<Vec<Entity>> {
        let mut order: Vec<RecordId> = Vec::new();
        let mut psets_by_element: FxHashMap<u32, Vec<RecordId>> = FxHashMap::default();

        // element id -> property set ids, built from the relation records
        for relation in self.graph.property_relations() {
            let Some(related) = relation.field("RelatedObjects").and_then(Field::as_tuple)
            else {
                continue;
            };
            let Some(pset_ref) = relation.field("RelatingPropertyDefinition") else {
                continue;
            };
            let Some(pset_id) = pset_ref.as_ref_id() else {
                continue;
            };
            let Some(pset) = self.graph.get(pset_id) else {
                return Err(ExchangeError::DanglingReference(pset_id));
            };
            if pset.record_type != RecordType::PropertySet {
                continue;
            }
            for element_ref in related {
                let Some(element_id) = element_ref.as_ref_id() else {
                    continue;
                };
                if self.graph.get(element_id).is_none() {
                    return Err(ExchangeError::DanglingReference(element_id));
                }
                let sets = psets_by_element.entry(element_id.0).or_default();
                if sets.is_empty() {
                    order.push(element_id);
                }
                sets.push(pset_id);
            }
        }

        let mut entities = Vec::with_capacity(order.len());
        let mut failures: Vec<(RecordId, String)> = Vec::new();
        for element_id in order {
            let record = self.flat_record_for(&psets_by_element[&element_id.0])?;
            match self.mapper.decode(&record, registry) {
                Ok(mut entity) => {
                    if let Some(element) = self.graph.get(element_id) {
                        entity.set_auxiliary(self.graph.resolve_tree(element));
                    }
                    entities.push(entity);
                }
                Err(error) => failures.push((element_id, error.to_string())),
            }
        }

        if failures.is_empty() {
            Ok(entities)
        } else {
            Err(ExchangeError::Extraction { failures })
        }
    }

    /// Collect the named property values of a set of property sets.
    fn flat_record_for(&self, pset_ids: &[RecordId]) -> Result<FlatRecord> {
        let mut record = FlatRecord::new();
        for pset_id in pset_ids {
            let Some(pset) = self.graph.get(*pset_id) else {
                return Err(ExchangeError::DanglingReference(*pset_id));
            };
            let Some(properties) = pset.field("HasProperties").and_then(Field::as_tuple) else {
                continue;
            };
            for property_ref in properties {
                let Some(property_id) = property_ref.as_ref_id() else {
                    continue;
                };
                let Some(property) = self.graph.get(property_id) else {
                    return Err(ExchangeError::DanglingReference(property_id));
                };
                if property.record_type != RecordType::PropertySingleValue {
                    continue;
                }
                let Some(name) = property.field("Name").and_then(Field::as_str) else {
                    continue;
                };
                if record.contains_key(name) {
                    tracing::warn!(property = name, "duplicate property name; keeping the first");
                    continue;
                }
                let value = property
                    .field("NominalValue")
                    .map(project_value)
                    .unwrap_or(Value::Null);
                record.insert(name, value);
            }
        }
        Ok(record)
    }
}

/// Project a raw field into a mapper value.
fn project_value(field: &Field) -> Value {
    match field {
        Field::Null => Value::Null,
        Field::Str(s) => text_value(s),
        Field::Ref(id) => Value::Text(id.to_string()),
        Field::Tuple(items) => Value::List(items.iter().map(project_value).collect()),
    }
}

/// Decode a raw text token: strip the optional type-wrapper convention,
/// then parse logical and numeric tokens into typed values.
fn text_value(s: &str) -> Value {
    let inner = strip_type_wrapper(s);
    match inner {
        ".T." | ".TRUE." => return Value::Bool(true),
        ".F." | ".FALSE." => return Value::Bool(false),
        _ => {}
    }
    if let Some(number) = parse_number(inner) {
        return number;
    }
    if inner.contains("''") {
        return Value::Text(inner.replace("''", "'"));
    }
    Value::Text(inner.to_string())
}

/// Strip `IFCLABEL('x')`-style wrappers down to the wrapped token.
fn strip_type_wrapper(s: &str) -> &str {
    let Some(open) = s.find('(') else {
        return s;
    };
    if open == 0 || !s.ends_with(')') {
        return s;
    }
    let prefix = &s[..open];
    let is_wrapper = prefix
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
    if !is_wrapper {
        return s;
    }
    let inner = s[open + 1..s.len() - 1].trim();
    inner
        .strip_prefix('\'')
        .and_then(|stripped| stripped.strip_suffix('\''))
        .unwrap_or(inner)
}

fn parse_number(s: &str) -> Option<Value> {
    let bytes = s.as_bytes();
    let first = *bytes.first()?;
    // cheap shape check so labels never hit the number parser
    if !first.is_ascii_digit() && first != b'-' && first != b'+' {
        return None;
    }
    if s.contains('.') || s.contains('e') || s.contains('E') {
        lexical_core::parse::<f64>(bytes).ok().map(Value::Float)
    } else {
        lexical_core::parse::<i64>(bytes).ok().map(Value::Int)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatgraph_model::{Slot, TYPE_KEY};
    use pretty_assertions::assert_eq;

    const TEST_DOC: &str = "ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCPROJECT('p-guid',$,'Areaal',$,$,$,$,$,$);
#2=IFCBUILDINGELEMENTPROXY('e-guid',$,'LM-007',$,$,$,$,$,$);
#3=IFCPROPERTYSINGLEVALUE('typeURI',$,IFCLABEL('https://data.assets.example/ns/onderwerp#Lichtmast'),$);
#4=IFCPROPERTYSINGLEVALUE('naam',$,IFCLABEL('Mast 7'),$);
#5=IFCPROPERTYSINGLEVALUE('toestand',$,IFCLABEL('in-gebruik'),$);
#6=IFCPROPERTYSINGLEVALUE('hoogte',$,IFCREAL(12.5),$);
#7=IFCPROPERTYSINGLEVALUE('assetId.identificator',$,IFCLABEL('LM-007'),$);
#8=IFCPROPERTYSET('ps-guid',$,'Kenmerken',$,(#3,#4,#5,#6,#7));
#9=IFCRELDEFINESBYPROPERTIES('r-guid',$,$,$,(#2),#8);
ENDSEC;
END-ISO-10303-21;
";

    #[test]
    fn test_extract_builds_typed_entity() {
        let graph = ExchangeGraph::parse(TEST_DOC).unwrap();
        let registry = TypeRegistry::standard();
        let entities = PropertyExtractor::new(&graph).extract(&registry).unwrap();
        assert_eq!(entities.len(), 1);
        let entity = &entities[0];
        assert_eq!(entity.short_name(), "Lichtmast");
        assert_eq!(entity.identifier(), Some("LM-007"));
        let Some(Slot::Complex(hoogte)) = entity.holder().get("hoogte") else {
            panic!("expected quantity wrapper");
        };
        assert_eq!(hoogte.get("waarde"), Some(&Slot::Value(Value::Float(12.5))));
    }

    #[test]
    fn test_extract_attaches_auxiliary_payload() {
        let graph = ExchangeGraph::parse(TEST_DOC).unwrap();
        let registry = TypeRegistry::standard();
        let entities = PropertyExtractor::new(&graph).extract(&registry).unwrap();
        let payload = entities[0].auxiliary().unwrap();
        assert_eq!(payload["type"], "IFCBUILDINGELEMENTPROXY");
        assert_eq!(payload["fields"]["Name"], "LM-007");
    }

    #[test]
    fn test_extract_aggregates_failures() {
        // second element's property set lacks the type identifier
        let doc = "#1=IFCBUILDINGELEMENTPROXY('a',$,'A',$,$,$,$,$,$);
#2=IFCBUILDINGELEMENTPROXY('b',$,'B',$,$,$,$,$,$);
#3=IFCPROPERTYSINGLEVALUE('typeURI',$,IFCLABEL('https://data.assets.example/ns/onderwerp#Lichtmast'),$);
#4=IFCPROPERTYSINGLEVALUE('naam',$,IFCLABEL('Mast A'),$);
#5=IFCPROPERTYSET('p1',$,'Kenmerken',$,(#3,#4));
#6=IFCPROPERTYSINGLEVALUE('naam',$,IFCLABEL('Mast B'),$);
#7=IFCPROPERTYSET('p2',$,'Kenmerken',$,(#6));
#8=IFCRELDEFINESBYPROPERTIES('r1',$,$,$,(#1),#5);
#9=IFCRELDEFINESBYPROPERTIES('r2',$,$,$,(#2),#7);
";
        let graph = ExchangeGraph::parse(doc).unwrap();
        let registry = TypeRegistry::standard();
        let err = PropertyExtractor::new(&graph)
            .extract(&registry)
            .unwrap_err();
        let ExchangeError::Extraction { failures } = err else {
            panic!("expected aggregate extraction error");
        };
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, RecordId(2));
    }

    #[test]
    fn test_text_value_strips_wrapper() {
        assert_eq!(
            text_value("IFCLABEL('in-gebruik')"),
            Value::Text("in-gebruik".into())
        );
        assert_eq!(text_value("IFCREAL(12.5)"), Value::Float(12.5));
        assert_eq!(text_value("IFCINTEGER(4)"), Value::Int(4));
        assert_eq!(text_value("IFCBOOLEAN(.T.)"), Value::Bool(true));
        assert_eq!(text_value("plain"), Value::Text("plain".into()));
    }

    #[test]
    fn test_flat_record_has_type_key_first() {
        let graph = ExchangeGraph::parse(TEST_DOC).unwrap();
        let extractor = PropertyExtractor::new(&graph);
        let record = extractor.flat_record_for(&[RecordId(8)]).unwrap();
        assert_eq!(record.keys().next(), Some(TYPE_KEY));
    }
}
