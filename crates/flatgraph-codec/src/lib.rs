// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flatgraph Codec - Dotted-path codec, graph mapper and merge engine
//!
//! Bidirectional conversion between flat dotted-path records and the typed
//! nested object graph defined by `flatgraph-model`, plus an entity merge
//! engine that surfaces attribute-level conflicts with structured
//! diagnostics.
//!
//! # Architecture
//!
//! - [`PathExpression`] / [`PathSyntax`] - dotted path parsing and rendering
//! - [`resolve_by_name`] / [`ResolvePolicy`] - segment-name resolution with
//!   the value-shortcut rewrite
//! - [`GraphMapper`] / [`MapperOptions`] - the encode/decode recursion
//! - [`EntityMergeEngine`] - pairwise merge, grouped merge and aggregate
//!   source combination
//!
//! # Example
//!
//! ```ignore
//! use flatgraph_codec::{GraphMapper, MapperOptions};
//! use flatgraph_model::TypeRegistry;
//!
//! let registry = TypeRegistry::standard();
//! let mapper = GraphMapper::default();
//! let entity = mapper.decode(&record, &registry)?;
//! let round_tripped = mapper.encode(&entity)?;
//! ```

mod error;
mod mapper;
mod merge;
mod path;
mod resolver;

pub use error::{CodecError, Result};
pub use mapper::{GraphMapper, MapperOptions};
pub use merge::{AssetSource, CombineError, EntityMergeEngine, GroupFailure, MergeError};
pub use path::{render_segments, PathExpression, PathSegment, PathSyntax};
pub use resolver::{resolve_by_name, ResolvePolicy, ResolvedAttribute};
