// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for exchange-text parsing

use crate::record::RecordId;
use flatgraph_codec::CodecError;
use thiserror::Error;

/// Result type alias for exchange operations
pub type Result<T> = std::result::Result<T, ExchangeError>;

/// Errors raised while parsing exchange text or projecting records
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// A structurally matching line names a type outside the closed table
    #[error("unsupported record type '{name}' on line {line}")]
    UnsupportedRecordType { name: String, line: usize },

    /// A back-reference points at a record id that is never defined;
    /// surfaces only when the reference is resolved, never during scanning
    #[error("record {0} is referenced but never defined")]
    DanglingReference(RecordId),

    /// Aggregate of all per-element mapping failures in one extraction run
    #[error("{}", extraction_message(.failures))]
    Extraction { failures: Vec<(RecordId, String)> },

    /// Mapping failure underneath the projection
    #[error(transparent)]
    Codec(#[from] CodecError),
}

fn extraction_message(failures: &[(RecordId, String)]) -> String {
    let mut message = format!(
        "property extraction failed for {} element(s)",
        failures.len()
    );
    for (id, reason) in failures {
        message.push_str(&format!("\n{}: {}", id, reason));
    }
    message
}
