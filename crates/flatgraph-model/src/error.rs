// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for domain-model operations

use crate::descriptor::ValueKind;
use thiserror::Error;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised by the type registry and attribute holders
#[derive(Error, Debug)]
pub enum ModelError {
    /// Type identifier does not resolve in the registry
    #[error("unknown type identifier '{0}'")]
    UnknownTypeIdentifier(String),

    /// Attribute name is not declared on the type
    #[error("type '{type_name}' has no attribute '{attribute}'")]
    UnknownAttribute { type_name: String, attribute: String },

    /// Attribute name uses the reserved internal prefix
    #[error("attribute name '{0}' uses the reserved internal prefix")]
    ReservedAttribute(String),

    /// Slot operation does not match the attribute's declared shape
    #[error("attribute '{attribute}' {reason}")]
    SlotMismatch {
        attribute: String,
        reason: &'static str,
    },

    /// Raw value cannot be coerced to the declared kind
    #[error("could not coerce '{raw}' to {kind}")]
    CouldNotCoerce { raw: String, kind: ValueKind },
}

impl ModelError {
    /// Create an unknown-attribute error
    pub fn unknown_attribute(type_name: impl Into<String>, attribute: impl Into<String>) -> Self {
        ModelError::UnknownAttribute {
            type_name: type_name.into(),
            attribute: attribute.into(),
        }
    }

    /// Create a slot-mismatch error
    pub fn slot_mismatch(attribute: impl Into<String>, reason: &'static str) -> Self {
        ModelError::SlotMismatch {
            attribute: attribute.into(),
            reason,
        }
    }
}
