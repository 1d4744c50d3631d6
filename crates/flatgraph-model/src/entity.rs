// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mutable typed attribute holders
//!
//! An [`Entity`] owns a tree of attribute values described by its static
//! [`TypeDescriptor`]. Slots hold either a scalar [`Value`] (repeated scalars
//! as `Value::List`), one embedded value object, or an ordered growable list
//! of embedded value objects. An embedded value object is never partially
//! present: the slot either exists (possibly with all-null leaves) or is
//! absent.

use crate::descriptor::{AttributeDescriptor, AttributeShape, TypeDescriptor};
use crate::error::{ModelError, Result};
use crate::types::{Value, IDENTIFIER_PATH};
use std::collections::BTreeMap;

/// Current content of one attribute slot
#[derive(Clone, Debug, PartialEq)]
pub enum Slot {
    /// Scalar leaf; repeated scalar attributes store a `Value::List`
    Value(Value),
    /// Single embedded value object
    Complex(AttributeHolder),
    /// Ordered, index-addressable sequence of embedded value objects
    ComplexList(Vec<AttributeHolder>),
}

/// A typed, mutable attribute holder
///
/// Both entities and embedded value objects are holders; they differ only in
/// which descriptor they carry. Declared attributes live in `slots`,
/// free-form extension attributes in a separate sorted map.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeHolder {
    descriptor: &'static TypeDescriptor,
    slots: BTreeMap<&'static str, Slot>,
    extensions: BTreeMap<String, Value>,
}

impl AttributeHolder {
    /// Create an empty holder for the given type
    pub fn new(descriptor: &'static TypeDescriptor) -> Self {
        Self {
            descriptor,
            slots: BTreeMap::new(),
            extensions: BTreeMap::new(),
        }
    }

    /// The static type descriptor of this holder
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.descriptor
    }

    /// Look up a declared attribute by name
    pub fn attribute(&self, name: &str) -> Option<&'static AttributeDescriptor> {
        self.descriptor.attribute(name)
    }

    /// Current slot of a declared attribute, if any
    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    /// Iterate declared attributes in descriptor order with their slots
    pub fn iter(&self) -> impl Iterator<Item = (&'static AttributeDescriptor, Option<&Slot>)> {
        self.descriptor
            .attributes
            .iter()
            .map(|attr| (attr, self.slots.get(attr.name)))
    }

    /// Assign a slot to a declared attribute
    pub fn set(&mut self, name: &str, slot: Slot) -> Result<()> {
        let attr = self
            .attribute(name)
            .ok_or_else(|| ModelError::unknown_attribute(self.descriptor.short_name, name))?;
        self.slots.insert(attr.name, slot);
        Ok(())
    }

    /// Assign a scalar value to a declared attribute
    pub fn set_value(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.set(name, Slot::Value(value.into()))
    }

    /// Ensure the single embedded value object of an attribute exists
    ///
    /// Allocates an empty value object on first access.
    pub fn ensure_complex(&mut self, name: &str) -> Result<&mut AttributeHolder> {
        let attr = self
            .attribute(name)
            .ok_or_else(|| ModelError::unknown_attribute(self.descriptor.short_name, name))?;
        let td = match attr.shape {
            AttributeShape::Complex(td) if !attr.repeatable => td,
            AttributeShape::Complex(_) => {
                return Err(ModelError::slot_mismatch(name, "is repeatable"))
            }
            AttributeShape::Scalar(_) => {
                return Err(ModelError::slot_mismatch(name, "has no embedded value object"))
            }
        };
        let slot = self
            .slots
            .entry(attr.name)
            .or_insert_with(|| Slot::Complex(AttributeHolder::new(td)));
        match slot {
            Slot::Complex(holder) => Ok(holder),
            _ => Err(ModelError::slot_mismatch(name, "holds a non-complex slot")),
        }
    }

    /// Append one empty element to a repeatable embedded attribute
    pub fn push_empty_element(&mut self, name: &str) -> Result<&mut AttributeHolder> {
        let (key, td) = self.repeatable_complex(name)?;
        let slot = self
            .slots
            .entry(key)
            .or_insert_with(|| Slot::ComplexList(Vec::new()));
        let Slot::ComplexList(list) = slot else {
            return Err(ModelError::slot_mismatch(name, "holds a non-list slot"));
        };
        list.push(AttributeHolder::new(td));
        let index = list.len() - 1;
        Ok(&mut list[index])
    }

    /// Ensure an element exists at `index`, growing with empties as needed
    pub fn ensure_element(&mut self, name: &str, index: usize) -> Result<&mut AttributeHolder> {
        let (key, td) = self.repeatable_complex(name)?;
        let slot = self
            .slots
            .entry(key)
            .or_insert_with(|| Slot::ComplexList(Vec::new()));
        let Slot::ComplexList(list) = slot else {
            return Err(ModelError::slot_mismatch(name, "holds a non-list slot"));
        };
        while list.len() <= index {
            list.push(AttributeHolder::new(td));
        }
        Ok(&mut list[index])
    }

    /// The last element of a repeatable embedded attribute, allocating one
    /// only when the sequence is still empty
    pub fn last_or_new_element(&mut self, name: &str) -> Result<&mut AttributeHolder> {
        let (key, td) = self.repeatable_complex(name)?;
        let slot = self
            .slots
            .entry(key)
            .or_insert_with(|| Slot::ComplexList(Vec::new()));
        let Slot::ComplexList(list) = slot else {
            return Err(ModelError::slot_mismatch(name, "holds a non-list slot"));
        };
        if list.is_empty() {
            list.push(AttributeHolder::new(td));
        }
        let index = list.len() - 1;
        Ok(&mut list[index])
    }

    fn repeatable_complex(
        &self,
        name: &str,
    ) -> Result<(&'static str, &'static TypeDescriptor)> {
        let attr = self
            .attribute(name)
            .ok_or_else(|| ModelError::unknown_attribute(self.descriptor.short_name, name))?;
        match attr.shape {
            AttributeShape::Complex(td) if attr.repeatable => Ok((attr.name, td)),
            AttributeShape::Complex(_) => Err(ModelError::slot_mismatch(name, "is not repeatable")),
            AttributeShape::Scalar(_) => {
                Err(ModelError::slot_mismatch(name, "has no embedded value object"))
            }
        }
    }

    /// Store a free-form extension attribute
    pub fn set_extension(&mut self, name: impl Into<String>, value: Value) {
        self.extensions.insert(name.into(), value);
    }

    /// Free-form extension attributes in sorted order
    pub fn extensions(&self) -> &BTreeMap<String, Value> {
        &self.extensions
    }

    /// Whether no attribute (declared or extension) holds a value
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.extensions.is_empty()
    }
}

/// A typed, mutable entity instance
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    holder: AttributeHolder,
    /// Unvalidated payload attached by exchange pipelines; not part of the
    /// canonical attribute tree and never encoded
    auxiliary: Option<serde_json::Value>,
}

impl Entity {
    /// Create an empty entity of the given type
    pub fn new(descriptor: &'static TypeDescriptor) -> Self {
        Self {
            holder: AttributeHolder::new(descriptor),
            auxiliary: None,
        }
    }

    /// The static type descriptor
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.holder.descriptor()
    }

    /// Full type identifier
    pub fn type_uri(&self) -> &'static str {
        self.descriptor().uri
    }

    /// Short display name of the type
    pub fn short_name(&self) -> &'static str {
        self.descriptor().short_name
    }

    /// Root attribute holder
    pub fn holder(&self) -> &AttributeHolder {
        &self.holder
    }

    /// Root attribute holder, mutable
    pub fn holder_mut(&mut self) -> &mut AttributeHolder {
        &mut self.holder
    }

    /// The entity identifier at the well-known path, if present
    pub fn identifier(&self) -> Option<&str> {
        let mut holder = self.holder();
        let mut segments = IDENTIFIER_PATH.split('.').peekable();
        while let Some(name) = segments.next() {
            match holder.get(name)? {
                Slot::Complex(child) if segments.peek().is_some() => holder = child,
                Slot::Value(Value::Text(s)) if segments.peek().is_none() => return Some(s),
                _ => return None,
            }
        }
        None
    }

    /// Attached unvalidated payload, if any
    pub fn auxiliary(&self) -> Option<&serde_json::Value> {
        self.auxiliary.as_ref()
    }

    /// Attach an unvalidated payload
    pub fn set_auxiliary(&mut self, payload: serde_json::Value) {
        self.auxiliary = Some(payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::{DOCUMENT, LICHTMAST};

    #[test]
    fn test_set_and_get_scalar() {
        let mut holder = AttributeHolder::new(&LICHTMAST);
        holder.set_value("naam", "LM-007").unwrap();
        assert_eq!(
            holder.get("naam"),
            Some(&Slot::Value(Value::Text("LM-007".into())))
        );
    }

    #[test]
    fn test_unknown_attribute_is_error() {
        let mut holder = AttributeHolder::new(&LICHTMAST);
        let err = holder.set_value("bestaatNiet", "x").unwrap_err();
        assert!(matches!(err, ModelError::UnknownAttribute { .. }));
    }

    #[test]
    fn test_ensure_complex_allocates_once() {
        let mut holder = AttributeHolder::new(&LICHTMAST);
        holder
            .ensure_complex("assetId")
            .unwrap()
            .set_value("identificator", "1")
            .unwrap();
        // second access reuses the allocated value object
        let child = holder.ensure_complex("assetId").unwrap();
        assert_eq!(
            child.get("identificator"),
            Some(&Slot::Value(Value::Text("1".into())))
        );
    }

    #[test]
    fn test_ensure_element_grows_with_empties() {
        let mut holder = AttributeHolder::new(&LICHTMAST);
        holder
            .ensure_element("documenten", 2)
            .unwrap()
            .set_value("bestandsnaam", "c.pdf")
            .unwrap();
        let Some(Slot::ComplexList(list)) = holder.get("documenten") else {
            panic!("expected complex list");
        };
        assert_eq!(list.len(), 3);
        assert!(list[0].is_empty());
        assert_eq!(list[0].descriptor(), &DOCUMENT);
    }

    #[test]
    fn test_last_or_new_element() {
        let mut holder = AttributeHolder::new(&LICHTMAST);
        holder.last_or_new_element("documenten").unwrap();
        holder.last_or_new_element("documenten").unwrap();
        let Some(Slot::ComplexList(list)) = holder.get("documenten") else {
            panic!("expected complex list");
        };
        // second call targets the existing element instead of growing
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_entity_identifier() {
        let mut entity = Entity::new(&LICHTMAST);
        assert_eq!(entity.identifier(), None);
        entity
            .holder_mut()
            .ensure_complex("assetId")
            .unwrap()
            .set_value("identificator", "A-1")
            .unwrap();
        assert_eq!(entity.identifier(), Some("A-1"));
    }
}
