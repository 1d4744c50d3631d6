// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flatgraph Model - Domain-model contract and shared types
//!
//! This crate defines the contract between the flat-record mapping engine and
//! the domain object model: static type descriptors, a type registry for
//! dynamic instantiation, mutable typed attribute holders, and the shared
//! wire types (values, flat records, conflict reports).
//!
//! # Architecture
//!
//! - [`TypeDescriptor`] / [`AttributeDescriptor`] - declarative per-type
//!   attribute tables (no runtime reflection)
//! - [`TypeRegistry`] - type identifier to descriptor mapping with
//!   [`TypeRegistry::instantiate`]
//! - [`Entity`] / [`AttributeHolder`] - the mutable object graph
//! - [`FlatRecord`] - the dotted-path wire representation
//! - [`ConflictRecord`] - structured merge diagnostics
//!
//! # Example
//!
//! ```ignore
//! use flatgraph_model::{TypeRegistry, vocabulary};
//!
//! let registry = TypeRegistry::standard();
//! let mut mast = registry.instantiate(vocabulary::LICHTMAST.uri)?;
//! mast.holder_mut()
//!     .ensure_complex("assetId")?
//!     .set_value("identificator", "LM-007")?;
//! assert_eq!(mast.identifier(), Some("LM-007"));
//! ```

pub mod conflict;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod record;
pub mod registry;
pub mod types;
pub mod vocabulary;

// Re-export all public types
pub use conflict::*;
pub use descriptor::*;
pub use entity::*;
pub use error::*;
pub use record::*;
pub use registry::*;
pub use types::*;
