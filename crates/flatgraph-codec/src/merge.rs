// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity merge and conflict resolution
//!
//! Combines partial representations of the same logical asset into one,
//! surfacing attribute-level disagreements instead of silently picking a
//! winner. Merging happens in flat-record space: both sides are encoded,
//! reconciled key by key, and the merged record is decoded back.

use crate::error::CodecError;
use crate::mapper::{GraphMapper, MapperOptions};
use crate::resolver::ResolvePolicy;
use flatgraph_model::{Conflict, ConflictRecord, Entity, FlatRecord, TypeRegistry, IDENTIFIER_PATH};
use rustc_hash::FxHashMap;
use std::fmt;
use thiserror::Error;

/// Errors raised while merging entities
#[derive(Error, Debug)]
pub enum MergeError {
    /// One side lacks the well-known identifier
    #[error("entity of type '{type_uri}' has no identifier")]
    MissingIdentifier { type_uri: String },

    /// The two sides identify different logical entities
    #[error("cannot merge entities with different identifiers '{left}' and '{right}'")]
    DifferentIdentifier { left: String, right: String },

    /// The two sides declare different types
    #[error("cannot merge entities of different types '{left}' and '{right}'")]
    DifferentType { left: String, right: String },

    /// Attribute-level disagreements; carries the full sorted conflict list
    /// and the partially merged record
    #[error("cannot combine: {report}")]
    CannotCombine {
        report: ConflictRecord,
        partial: FlatRecord,
    },

    /// Encode/decode failure underneath the merge
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// One failed identifier group in a source combination
#[derive(Debug)]
pub struct GroupFailure {
    /// Identifier of the failing group
    pub identifier: String,
    /// Type short-name, when known
    pub short_name: Option<String>,
    /// Contributing source identifiers in encounter order
    pub sources: Vec<String>,
    /// The underlying merge error
    pub error: MergeError,
}

impl fmt::Display for GroupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' (sources: {}): {}",
            self.short_name.as_deref().unwrap_or("entity"),
            self.identifier,
            self.sources.join(", "),
            self.error
        )
    }
}

/// Aggregate failure covering every failing group of a source combination
///
/// One bad asset never hides errors in the others: all independent groups
/// are processed and reported together.
#[derive(Debug)]
pub struct CombineError {
    /// All failing groups
    pub failures: Vec<GroupFailure>,
}

impl fmt::Display for CombineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to combine {} asset group(s)", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n{}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for CombineError {}

/// Entities contributed by one source file
#[derive(Clone, Debug)]
pub struct AssetSource {
    /// Source identifier (file name, sheet name)
    pub source_id: String,
    /// Fully decoded entities from this source
    pub entities: Vec<Entity>,
}

impl AssetSource {
    /// Create a source
    pub fn new(source_id: impl Into<String>, entities: Vec<Entity>) -> Self {
        Self {
            source_id: source_id.into(),
            entities,
        }
    }
}

/// Combines entity representations keyed by the well-known identifier
pub struct EntityMergeEngine<'r> {
    mapper: GraphMapper,
    registry: &'r TypeRegistry,
}

impl<'r> EntityMergeEngine<'r> {
    /// Create an engine with a permissive mapper, so free-form extension
    /// attributes survive the encode/decode round underneath the merge
    pub fn new(registry: &'r TypeRegistry) -> Self {
        let options = MapperOptions {
            policy: ResolvePolicy::permissive(),
            ..MapperOptions::new()
        };
        Self {
            mapper: GraphMapper::new(options),
            registry,
        }
    }

    /// Create an engine with a custom mapper
    pub fn with_mapper(registry: &'r TypeRegistry, mapper: GraphMapper) -> Self {
        Self { mapper, registry }
    }

    /// Merge two representations of the same logical entity.
    ///
    /// Keys absent or null in the first record adopt the second record's
    /// value; equal keys are a no-op; unequal keys become conflicts. Any
    /// conflict aborts with [`MergeError::CannotCombine`] carrying the full
    /// sorted list.
    pub fn merge_pair(&self, left: &Entity, right: &Entity) -> Result<Entity, MergeError> {
        let record_left = self.mapper.encode(left)?;
        let record_right = self.mapper.encode(right)?;
        let id_left = self.identifier_of(left, &record_left)?;
        let id_right = self.identifier_of(right, &record_right)?;
        if id_left != id_right {
            return Err(MergeError::DifferentIdentifier {
                left: id_left,
                right: id_right,
            });
        }
        if left.type_uri() != right.type_uri() {
            return Err(MergeError::DifferentType {
                left: left.type_uri().to_string(),
                right: right.type_uri().to_string(),
            });
        }

        let mut merged = record_left;
        let mut conflicts = Vec::new();
        for (key, value) in record_right.iter() {
            if key == IDENTIFIER_PATH {
                continue;
            }
            match merged.get(key) {
                None => {
                    merged.insert(key, value.clone());
                }
                Some(existing) if existing.is_null() => {
                    merged.insert(key, value.clone());
                }
                Some(existing) if existing == value => {}
                Some(existing) => conflicts.push(Conflict {
                    path: key.to_string(),
                    left: existing.clone(),
                    right: value.clone(),
                }),
            }
        }
        if !conflicts.is_empty() {
            let report = ConflictRecord::new(id_left, conflicts)
                .with_type_uri(left.type_uri());
            return Err(MergeError::CannotCombine {
                report,
                partial: merged,
            });
        }
        Ok(self.mapper.decode(&merged, self.registry)?)
    }

    /// Merge an arbitrary collection, grouping by identifier.
    ///
    /// Groups keep encounter order and are left-folded through
    /// [`merge_pair`](Self::merge_pair); the first conflict in a group aborts
    /// the whole call.
    pub fn merge_many(&self, entities: &[Entity]) -> Result<Vec<Entity>, MergeError> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: FxHashMap<String, Vec<&Entity>> = FxHashMap::default();
        for entity in entities {
            let id = entity
                .identifier()
                .ok_or_else(|| MergeError::MissingIdentifier {
                    type_uri: entity.type_uri().to_string(),
                })?
                .to_string();
            if !groups.contains_key(&id) {
                order.push(id.clone());
            }
            groups.entry(id).or_default().push(entity);
        }
        let mut merged = Vec::with_capacity(order.len());
        for id in order {
            let group = &groups[&id];
            let mut acc = group[0].clone();
            for next in &group[1..] {
                acc = self.merge_pair(&acc, next)?;
            }
            merged.push(acc);
        }
        Ok(merged)
    }

    /// Combine entities contributed by several sources.
    ///
    /// Groups by identifier across sources; every group is attempted, and
    /// failing groups are collected into one aggregate [`CombineError`]
    /// annotated with the contributing source identifiers.
    pub fn combine_sources(&self, sources: &[AssetSource]) -> Result<Vec<Entity>, CombineError> {
        struct Group<'a> {
            entities: Vec<&'a Entity>,
            sources: Vec<String>,
        }

        let mut order: Vec<String> = Vec::new();
        let mut groups: FxHashMap<String, Group<'_>> = FxHashMap::default();
        let mut failures: Vec<GroupFailure> = Vec::new();

        for source in sources {
            for entity in &source.entities {
                let Some(id) = entity.identifier() else {
                    failures.push(GroupFailure {
                        identifier: String::new(),
                        short_name: Some(entity.short_name().to_string()),
                        sources: vec![source.source_id.clone()],
                        error: MergeError::MissingIdentifier {
                            type_uri: entity.type_uri().to_string(),
                        },
                    });
                    continue;
                };
                let group = groups.entry(id.to_string()).or_insert_with(|| {
                    order.push(id.to_string());
                    Group {
                        entities: Vec::new(),
                        sources: Vec::new(),
                    }
                });
                group.entities.push(entity);
                if !group.sources.contains(&source.source_id) {
                    group.sources.push(source.source_id.clone());
                }
            }
        }

        let mut combined = Vec::with_capacity(order.len());
        for id in order {
            let group = &groups[&id];
            let mut acc = group.entities[0].clone();
            let mut failed = false;
            for next in &group.entities[1..] {
                match self.merge_pair(&acc, next) {
                    Ok(entity) => acc = entity,
                    Err(error) => {
                        let error = match error {
                            MergeError::CannotCombine { report, partial } => {
                                MergeError::CannotCombine {
                                    report: report.with_sources(group.sources.clone()),
                                    partial,
                                }
                            }
                            other => other,
                        };
                        failures.push(GroupFailure {
                            identifier: id.clone(),
                            short_name: Some(acc.short_name().to_string()),
                            sources: group.sources.clone(),
                            error,
                        });
                        failed = true;
                        break;
                    }
                }
            }
            if !failed {
                combined.push(acc);
            }
        }

        if failures.is_empty() {
            Ok(combined)
        } else {
            Err(CombineError { failures })
        }
    }

    fn identifier_of(&self, entity: &Entity, record: &FlatRecord) -> Result<String, MergeError> {
        record
            .identifier()
            .map(str::to_string)
            .ok_or_else(|| MergeError::MissingIdentifier {
                type_uri: entity.type_uri().to_string(),
            })
    }
}
