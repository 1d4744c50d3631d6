// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dotted attribute-path parsing and rendering
//!
//! A path addresses one attribute in the nested object graph:
//! `assetId.identificator`, `documenten[].bestandsnaam`, `hoogte`. At most
//! one cardinality marker may occur in a whole path, segments never start
//! with the reserved internal prefix, and the cardinality separator may not
//! appear literally inside a path (it would be ambiguous with joined-string
//! values).

use crate::error::{CodecError, Result};
use flatgraph_model::INTERNAL_PREFIX;
use serde::{Deserialize, Serialize};

/// Path notation settings, all independently overridable
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathSyntax {
    /// Segment separator
    pub separator: char,
    /// Suffix marking a segment that addresses a repeatable attribute
    pub cardinality_indicator: String,
    /// Separator used when a repeated value is serialized as one joined string
    pub cardinality_separator: char,
    /// Address a primitive-wrapping quantity attribute by its owner's name
    /// directly instead of requiring the explicit inner-value suffix
    pub value_shortcut: bool,
}

impl Default for PathSyntax {
    fn default() -> Self {
        Self {
            separator: '.',
            cardinality_indicator: "[]".to_string(),
            cardinality_separator: '|',
            value_shortcut: true,
        }
    }
}

/// One parsed path segment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathSegment {
    /// Attribute name
    pub name: String,
    /// Whether the segment carries the cardinality marker
    pub cardinality: bool,
}

/// A parsed dotted path; immutable once parsed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathExpression {
    segments: Vec<PathSegment>,
}

impl PathExpression {
    /// Parse a path string under the given syntax.
    ///
    /// Fails with [`CodecError::MalformedPath`] when the cardinality
    /// indicator occurs more than once in the whole string, when any segment
    /// is empty or starts with the reserved internal prefix, or when the
    /// cardinality separator appears literally in the path.
    pub fn parse(path: &str, syntax: &PathSyntax) -> Result<Self> {
        if path.is_empty() {
            return Err(CodecError::malformed(path, "path is empty"));
        }
        if path.matches(&syntax.cardinality_indicator).count() > 1 {
            return Err(CodecError::malformed(
                path,
                "cardinality indicator occurs more than once",
            ));
        }
        if path.contains(syntax.cardinality_separator) {
            return Err(CodecError::malformed(
                path,
                format!(
                    "cardinality separator '{}' may not appear in a path",
                    syntax.cardinality_separator
                ),
            ));
        }
        let mut segments = Vec::new();
        for raw in path.split(syntax.separator) {
            let (name, cardinality) = match raw.strip_suffix(&syntax.cardinality_indicator) {
                Some(stripped) => (stripped, true),
                None => (raw, false),
            };
            if name.is_empty() {
                return Err(CodecError::malformed(path, "empty path segment"));
            }
            if name.contains(&syntax.cardinality_indicator) {
                return Err(CodecError::malformed(
                    path,
                    "cardinality indicator must terminate a segment",
                ));
            }
            if name.starts_with(INTERNAL_PREFIX) {
                return Err(CodecError::malformed(
                    path,
                    format!("segment '{}' uses the reserved internal prefix", name),
                ));
            }
            segments.push(PathSegment {
                name: name.to_string(),
                cardinality,
            });
        }
        Ok(Self { segments })
    }

    /// The parsed segments in order
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// A path always has at least one segment
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Render back to the canonical string form; inverse of [`parse`](Self::parse)
    pub fn render(&self, syntax: &PathSyntax) -> String {
        render_segments(&self.segments, syntax)
    }
}

/// Render a segment slice to canonical string form
pub fn render_segments(segments: &[PathSegment], syntax: &PathSyntax) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push(syntax.separator);
        }
        out.push_str(&segment.name);
        if segment.cardinality {
            out.push_str(&syntax.cardinality_indicator);
        }
    }
    out
}
