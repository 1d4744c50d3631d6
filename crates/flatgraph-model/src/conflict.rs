// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structured merge-conflict reports

use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One attribute-level disagreement between two entity representations
///
/// Never created for two equal values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// Dotted path of the disagreeing attribute
    pub path: String,
    /// Value contributed by the first representation
    pub left: Value,
    /// Value contributed by the second representation
    pub right: Value,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}, {}", self.path, self.left, self.right)
    }
}

/// All disagreements collected while merging one logical entity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// Identifier of the logical entity
    pub identifier: String,
    /// Type identifier, when known
    pub type_uri: Option<String>,
    /// Disagreements sorted lexicographically by path
    pub conflicts: Vec<Conflict>,
    /// Contributing source identifiers, in a file-combination context
    pub sources: Vec<String>,
}

impl ConflictRecord {
    /// Create a report; conflicts are sorted by path
    pub fn new(identifier: impl Into<String>, mut conflicts: Vec<Conflict>) -> Self {
        conflicts.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            identifier: identifier.into(),
            type_uri: None,
            conflicts,
            sources: Vec::new(),
        }
    }

    /// Attach the type identifier
    pub fn with_type_uri(mut self, uri: impl Into<String>) -> Self {
        self.type_uri = Some(uri.into());
        self
    }

    /// Attach contributing source identifiers
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }
}

impl fmt::Display for ConflictRecord {
    /// One header line followed by one `path: left, right` line per conflict.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} conflicting attribute(s) for '{}'",
            self.conflicts.len(),
            self.identifier
        )?;
        for conflict in &self.conflicts {
            write!(f, "\n{}", conflict)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_line_rendering() {
        let c = Conflict {
            path: "toestand".into(),
            left: Value::Text("in-gebruik".into()),
            right: Value::Text("in-opbouw".into()),
        };
        assert_eq!(c.to_string(), "toestand: in-gebruik, in-opbouw");
    }

    #[test]
    fn test_record_sorts_by_path() {
        let record = ConflictRecord::new(
            "1",
            vec![
                Conflict {
                    path: "naam".into(),
                    left: Value::Text("b".into()),
                    right: Value::Text("c".into()),
                },
                Conflict {
                    path: "breedte".into(),
                    left: Value::Float(1.0),
                    right: Value::Float(2.0),
                },
            ],
        );
        let record_str = record.to_string();
        let lines: Vec<&str> = record_str.lines().skip(1).collect();
        assert_eq!(lines, vec!["breedte: 1, 2", "naam: b, c"]);
    }
}
