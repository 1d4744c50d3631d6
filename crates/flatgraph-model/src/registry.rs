// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Type registry: explicit mapping from type identifier to descriptor
//!
//! Replaces runtime string-based member lookup with a declarative table.
//! Decoding instantiates an empty entity through this registry.

use crate::descriptor::TypeDescriptor;
use crate::entity::Entity;
use crate::error::{ModelError, Result};
use crate::vocabulary;
use rustc_hash::FxHashMap;

/// Registry of known entity types, keyed by full type identifier
pub struct TypeRegistry {
    types: FxHashMap<&'static str, &'static TypeDescriptor>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            types: FxHashMap::default(),
        }
    }

    /// Create a registry preloaded with the reference vocabulary
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for td in vocabulary::ALL {
            registry.register(td);
        }
        registry
    }

    /// Register a type descriptor; the last registration for a URI wins
    pub fn register(&mut self, descriptor: &'static TypeDescriptor) {
        self.types.insert(descriptor.uri, descriptor);
    }

    /// Look up a descriptor by type identifier
    pub fn get(&self, uri: &str) -> Option<&'static TypeDescriptor> {
        self.types.get(uri).copied()
    }

    /// Instantiate an empty entity of the identified type
    pub fn instantiate(&self, uri: &str) -> Result<Entity> {
        self.get(uri)
            .map(Entity::new)
            .ok_or_else(|| ModelError::UnknownTypeIdentifier(uri.to_string()))
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instantiate_known_type() {
        let registry = TypeRegistry::standard();
        let entity = registry.instantiate(vocabulary::LICHTMAST.uri).unwrap();
        assert_eq!(entity.short_name(), "Lichtmast");
        assert!(entity.holder().is_empty());
    }

    #[test]
    fn test_instantiate_unknown_type_fails() {
        let registry = TypeRegistry::standard();
        let err = registry.instantiate("uri:nergens").unwrap_err();
        assert!(matches!(err, ModelError::UnknownTypeIdentifier(_)));
    }
}
