// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Attribute resolution against the domain-model contract
//!
//! Bridges a path segment name to a concrete attribute on a type. The value
//! shortcut is a resolver-level rewrite rule: a quantity-wrapper attribute
//! addressed as a leaf transparently targets its inner primitive slot, so the
//! mapper's recursion stays single-shaped.

use crate::error::Result;
use crate::path::PathSyntax;
use flatgraph_model::{AttributeDescriptor, AttributeShape, ModelError, TypeDescriptor};
use serde::{Deserialize, Serialize};

/// Policy for attribute names not declared on the type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvePolicy {
    /// Store undeclared names as free-form extensions instead of failing
    pub allow_undeclared: bool,
    /// Emit a warning diagnostic when an undeclared name is stored
    pub warn_on_undeclared: bool,
}

impl Default for ResolvePolicy {
    fn default() -> Self {
        Self {
            allow_undeclared: false,
            warn_on_undeclared: true,
        }
    }
}

impl ResolvePolicy {
    /// Permissive policy: undeclared names become silent extensions
    pub fn permissive() -> Self {
        Self {
            allow_undeclared: true,
            warn_on_undeclared: false,
        }
    }
}

/// Outcome of resolving one path segment name on a type
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResolvedAttribute {
    /// Declared attribute; `inner` carries the wrapped primitive attribute
    /// when the value-shortcut rewrite applies to leaf addressing
    Declared {
        attribute: &'static AttributeDescriptor,
        inner: Option<&'static AttributeDescriptor>,
    },
    /// Undeclared name permitted as a free-form extension
    Extension,
}

/// Resolve a path segment name on a type descriptor.
///
/// Names using the reserved internal prefix are rejected regardless of
/// policy (the path parser already refuses them; this guards direct calls).
pub fn resolve_by_name(
    descriptor: &'static TypeDescriptor,
    name: &str,
    syntax: &PathSyntax,
    policy: &ResolvePolicy,
) -> Result<ResolvedAttribute> {
    if name.starts_with(flatgraph_model::INTERNAL_PREFIX) {
        return Err(ModelError::ReservedAttribute(name.to_string()).into());
    }
    if let Some(attribute) = descriptor.attribute(name) {
        let inner = match attribute.shape {
            AttributeShape::Complex(td) if syntax.value_shortcut => td.wrapped_attribute(),
            _ => None,
        };
        return Ok(ResolvedAttribute::Declared { attribute, inner });
    }
    if policy.allow_undeclared {
        if policy.warn_on_undeclared {
            tracing::warn!(
                type_name = descriptor.short_name,
                attribute = name,
                "storing undeclared attribute as free-form extension"
            );
        }
        Ok(ResolvedAttribute::Extension)
    } else {
        Err(ModelError::unknown_attribute(descriptor.short_name, name).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use flatgraph_model::vocabulary::LICHTMAST;

    #[test]
    fn test_resolve_declared_scalar() {
        let resolved = resolve_by_name(
            &LICHTMAST,
            "naam",
            &PathSyntax::default(),
            &ResolvePolicy::default(),
        )
        .unwrap();
        let ResolvedAttribute::Declared { attribute, inner } = resolved else {
            panic!("expected declared attribute");
        };
        assert_eq!(attribute.name, "naam");
        assert!(inner.is_none());
    }

    #[test]
    fn test_shortcut_rewrites_quantity_wrapper() {
        let resolved = resolve_by_name(
            &LICHTMAST,
            "hoogte",
            &PathSyntax::default(),
            &ResolvePolicy::default(),
        )
        .unwrap();
        let ResolvedAttribute::Declared { inner, .. } = resolved else {
            panic!("expected declared attribute");
        };
        assert_eq!(inner.unwrap().name, "waarde");
    }

    #[test]
    fn test_shortcut_disabled_keeps_wrapper() {
        let syntax = PathSyntax {
            value_shortcut: false,
            ..PathSyntax::default()
        };
        let resolved =
            resolve_by_name(&LICHTMAST, "hoogte", &syntax, &ResolvePolicy::default()).unwrap();
        let ResolvedAttribute::Declared { inner, .. } = resolved else {
            panic!("expected declared attribute");
        };
        assert!(inner.is_none());
    }

    #[test]
    fn test_undeclared_rejected_by_default() {
        let err = resolve_by_name(
            &LICHTMAST,
            "vermogen",
            &PathSyntax::default(),
            &ResolvePolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CodecError::Model(ModelError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_undeclared_allowed_becomes_extension() {
        let policy = ResolvePolicy {
            allow_undeclared: true,
            warn_on_undeclared: false,
        };
        let resolved =
            resolve_by_name(&LICHTMAST, "vermogen", &PathSyntax::default(), &policy).unwrap();
        assert_eq!(resolved, ResolvedAttribute::Extension);
    }

    #[test]
    fn test_internal_prefix_always_fatal() {
        let policy = ResolvePolicy {
            allow_undeclared: true,
            warn_on_undeclared: false,
        };
        let err =
            resolve_by_name(&LICHTMAST, "_geometry", &PathSyntax::default(), &policy).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Model(ModelError::ReservedAttribute(_))
        ));
    }
}
