// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Exchange record graph with lazy reference resolution
//!
//! Records are indexed by id while scanning; back-references stay unresolved
//! until a consumer walks a named field path. Two auxiliary indexes are kept
//! incrementally: the defines-properties relations and the single expected
//! spatial containment root.

use crate::error::{ExchangeError, Result};
use crate::record::{ExchangeRecord, Field, RecordId, RecordType};
use crate::scanner::{match_record_line, parse_header, HeaderInfo, RecordLines};
use crate::tokenizer::tokenize_body;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{json, Value as JsonValue};

/// A field value with back-references substituted one step
#[derive(Clone, Copy, Debug)]
pub enum Resolved<'g> {
    /// The reference target (or the record itself for an empty path)
    Record(&'g ExchangeRecord),
    /// A plain field value
    Field(&'g Field),
}

/// Parsed exchange document: record index plus auxiliary indexes
#[derive(Debug)]
pub struct ExchangeGraph {
    records: FxHashMap<u32, ExchangeRecord>,
    type_index: FxHashMap<RecordType, Vec<RecordId>>,
    property_relations: Vec<RecordId>,
    spatial_root: Option<RecordId>,
    header: HeaderInfo,
}

impl ExchangeGraph {
    /// Parse exchange text into a graph.
    ///
    /// Lines not matching the record pattern are skipped; matching lines
    /// naming a type outside the closed table are fatal.
    pub fn parse(content: &str) -> Result<Self> {
        let mut graph = Self {
            records: FxHashMap::default(),
            type_index: FxHashMap::default(),
            property_relations: Vec::new(),
            spatial_root: None,
            header: parse_header(content),
        };
        for (line_no, line) in RecordLines::new(content) {
            let Some((id, type_name, body)) = match_record_line(line) else {
                continue;
            };
            let record_type = RecordType::parse(type_name).ok_or_else(|| {
                ExchangeError::UnsupportedRecordType {
                    name: type_name.to_string(),
                    line: line_no,
                }
            })?;
            graph.insert(ExchangeRecord {
                id: RecordId(id),
                record_type,
                fields: tokenize_body(body),
            });
        }
        Ok(graph)
    }

    fn insert(&mut self, record: ExchangeRecord) {
        match record.record_type {
            RecordType::RelDefinesByProperties => self.property_relations.push(record.id),
            RecordType::RelContainedInSpatialStructure => {
                if self.spatial_root.is_some() {
                    tracing::warn!(
                        record = %record.id,
                        "multiple spatial containment roots; keeping the first"
                    );
                } else {
                    self.spatial_root = Some(record.id);
                }
            }
            _ => {}
        }
        self.type_index
            .entry(record.record_type)
            .or_default()
            .push(record.id);
        self.records.insert(record.id.0, record);
    }

    /// Header metadata
    pub fn header(&self) -> &HeaderInfo {
        &self.header
    }

    /// Look up a record by id
    pub fn get(&self, id: RecordId) -> Option<&ExchangeRecord> {
        self.records.get(&id.0)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the graph holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records of a given type
    pub fn records_by_type(&self, record_type: RecordType) -> Vec<&ExchangeRecord> {
        self.type_index
            .get(&record_type)
            .map(|ids| ids.iter().filter_map(|id| self.get(*id)).collect())
            .unwrap_or_default()
    }

    /// Count records of a given type
    pub fn count_by_type(&self, record_type: RecordType) -> usize {
        self.type_index
            .get(&record_type)
            .map(|ids| ids.len())
            .unwrap_or(0)
    }

    /// The defines-properties relation records in document order
    pub fn property_relations(&self) -> impl Iterator<Item = &ExchangeRecord> {
        self.property_relations
            .iter()
            .filter_map(move |id| self.get(*id))
    }

    /// The spatial containment root relation, if present
    pub fn spatial_root(&self) -> Option<&ExchangeRecord> {
        self.spatial_root.and_then(|id| self.get(id))
    }

    /// Element ids related by the spatial containment root
    pub fn contained_elements(&self) -> Vec<RecordId> {
        self.spatial_root()
            .and_then(|root| root.field("RelatedElements"))
            .and_then(Field::as_tuple)
            .map(|items| items.iter().filter_map(Field::as_ref_id).collect())
            .unwrap_or_default()
    }

    /// Substitute one back-reference step.
    ///
    /// Null short-circuits to None; a dangling reference surfaces here, and
    /// only here.
    pub fn deref_field<'g>(&'g self, field: &'g Field) -> Result<Option<Resolved<'g>>> {
        match field {
            Field::Null => Ok(None),
            Field::Ref(id) => match self.get(*id) {
                Some(record) => Ok(Some(Resolved::Record(record))),
                None => Err(ExchangeError::DanglingReference(*id)),
            },
            other => Ok(Some(Resolved::Field(other))),
        }
    }

    /// Follow a dotted sequence of field names from a record.
    ///
    /// Any back-reference along the way is substituted with its target
    /// record. Missing intermediate values (nulls, undeclared names, values
    /// a name walk cannot continue through) short-circuit to None rather
    /// than raising; dangling references are the one resolution error.
    pub fn resolve_field<'g>(
        &'g self,
        record: &'g ExchangeRecord,
        path: &[&str],
    ) -> Result<Option<Resolved<'g>>> {
        let mut current = record;
        for (position, name) in path.iter().enumerate() {
            let Some(field) = current.field(name) else {
                return Ok(None);
            };
            match self.deref_field(field)? {
                None => return Ok(None),
                Some(Resolved::Record(target)) => {
                    if position + 1 == path.len() {
                        return Ok(Some(Resolved::Record(target)));
                    }
                    current = target;
                }
                Some(Resolved::Field(value)) => {
                    if position + 1 == path.len() {
                        return Ok(Some(Resolved::Field(value)));
                    }
                    return Ok(None);
                }
            }
        }
        Ok(Some(Resolved::Record(record)))
    }

    /// Materialize a record's fully resolved field graph.
    ///
    /// Back-references are substituted recursively, inside tuples included;
    /// cycles are cut with a reference marker, dangling references render as
    /// null. The result is an unvalidated payload, not part of any canonical
    /// attribute tree.
    pub fn resolve_tree(&self, record: &ExchangeRecord) -> JsonValue {
        let mut visited = FxHashSet::default();
        self.tree_of(record, &mut visited)
    }

    fn tree_of(&self, record: &ExchangeRecord, visited: &mut FxHashSet<u32>) -> JsonValue {
        if !visited.insert(record.id.0) {
            return json!({ "ref": record.id.0 });
        }
        let names = record.record_type.field_names();
        let mut fields = serde_json::Map::new();
        for (index, field) in record.fields.iter().enumerate() {
            let key = names
                .get(index)
                .map(|name| name.to_string())
                .unwrap_or_else(|| format!("Field{}", index));
            fields.insert(key, self.value_of(field, visited));
        }
        visited.remove(&record.id.0);
        json!({
            "id": record.id.0,
            "type": record.record_type.name(),
            "fields": fields,
        })
    }

    fn value_of(&self, field: &Field, visited: &mut FxHashSet<u32>) -> JsonValue {
        match field {
            Field::Null => JsonValue::Null,
            Field::Str(s) => JsonValue::String(s.clone()),
            Field::Ref(id) => match self.get(*id) {
                Some(record) => self.tree_of(record, visited),
                None => JsonValue::Null,
            },
            Field::Tuple(items) => JsonValue::Array(
                items
                    .iter()
                    .map(|item| self.value_of(item, visited))
                    .collect(),
            ),
        }
    }
}
