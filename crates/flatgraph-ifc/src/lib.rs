// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flatgraph IFC - STEP/IFC exchange record parser
//!
//! Parses line-oriented exchange text (`#id=TYPE(field,...);`) into a
//! resolvable record graph, then projects the property-carrying elements
//! through the flatgraph mapper into typed entities.
//!
//! # Features
//!
//! - **Quote- and nesting-aware field tokenizer** - commas only split at
//!   depth zero outside quote runs
//! - **Closed record-type table** - unknown types on matching lines are
//!   fatal, unmatched lines are skipped
//! - **Lazy reference resolution** - back-references resolve on named field
//!   walks, never eagerly for the whole file
//! - **Property projection** - property sets become flat records and decode
//!   into entities, with the resolved field graph attached as payload
//!
//! # Example
//!
//! ```ignore
//! use flatgraph_ifc::ExchangeParser;
//! use flatgraph_model::TypeRegistry;
//!
//! let registry = TypeRegistry::standard();
//! let parser = ExchangeParser::new();
//! let graph = parser.parse(content)?;
//! let assets = parser.extract(&graph, &registry)?;
//! println!("Extracted {} assets", assets.len());
//! ```

mod error;
mod graph;
mod properties;
mod record;
mod scanner;
mod tokenizer;

pub use error::{ExchangeError, Result};
pub use graph::{ExchangeGraph, Resolved};
pub use properties::PropertyExtractor;
pub use record::{ExchangeRecord, Field, RecordId, RecordType};
pub use scanner::{parse_header, HeaderInfo};
pub use tokenizer::{parse_field, split_fields, tokenize_body};

use flatgraph_codec::{MapperOptions, ResolvePolicy};
use flatgraph_model::{Entity, TypeRegistry};

/// Main exchange parser
///
/// Holds the mapper options used when projecting property sets into
/// entities. Undeclared property names default to warned free-form
/// extensions, matching what asset exports typically carry.
pub struct ExchangeParser {
    mapper_options: MapperOptions,
}

impl Default for ExchangeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeParser {
    /// Create a parser with default projection options
    pub fn new() -> Self {
        let mapper_options = MapperOptions {
            policy: ResolvePolicy {
                allow_undeclared: true,
                warn_on_undeclared: true,
            },
            ..MapperOptions::new()
        };
        Self { mapper_options }
    }

    /// Create a parser with custom projection options
    pub fn with_options(mapper_options: MapperOptions) -> Self {
        Self { mapper_options }
    }

    /// Parse exchange text into a record graph
    pub fn parse(&self, content: &str) -> Result<ExchangeGraph> {
        ExchangeGraph::parse(content)
    }

    /// Project a graph's property-carrying elements into entities
    pub fn extract(&self, graph: &ExchangeGraph, registry: &TypeRegistry) -> Result<Vec<Entity>> {
        PropertyExtractor::with_options(graph, self.mapper_options.clone()).extract(registry)
    }

    /// Parse and project in one step
    pub fn parse_and_extract(
        &self,
        content: &str,
        registry: &TypeRegistry,
    ) -> Result<Vec<Entity>> {
        let graph = self.parse(content)?;
        self.extract(&graph, registry)
    }
}

/// Quick parse function for simple use cases
pub fn parse(content: &str) -> Result<ExchangeGraph> {
    ExchangeGraph::parse(content)
}
