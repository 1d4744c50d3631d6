// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the path codec and graph mapper

use flatgraph_model::ModelError;
use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors raised while parsing paths or mapping records
#[derive(Error, Debug)]
pub enum CodecError {
    /// Structurally invalid dotted path; always fatal
    #[error("malformed path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    /// Record lacks the reserved type identifier key
    #[error("record is missing the 'typeURI' type identifier key")]
    MissingTypeIdentifier,

    /// Cardinality marker does not match the attribute's repeatability
    #[error("cardinality mismatch at '{path}': {reason}")]
    CardinalityMismatch { path: String, reason: String },

    /// Value cannot be assigned to the resolved attribute shape
    #[error("invalid assignment at '{path}': {reason}")]
    InvalidAssignment { path: String, reason: String },

    /// Coercion failed for the value at a path
    #[error("could not coerce value at '{path}': {source}")]
    Coercion { path: String, source: ModelError },

    /// Resolution or instantiation failure from the domain model
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl CodecError {
    /// Create a malformed-path error
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::MalformedPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a cardinality-mismatch error
    pub fn cardinality(path: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::CardinalityMismatch {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-assignment error
    pub fn assignment(path: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::InvalidAssignment {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
