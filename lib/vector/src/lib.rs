//! # strata vector
//!
//! Vector index definitions. Unlike search mappings, a vector index declares a flat list of
//! exact paths, each indexed as a vector, a filter, text, or auto-embedded text.
//!
//! - [`VectorIndexFieldDefinition`] - one indexed path
//! - [`VectorIndexFieldMapping`] - path lookups (`is_used`, `is_indexed`, specifications)
//! - [`VectorIndexDefinition`] - the index aggregate
//! - [`VectorFieldDefinitionResolver`] - query-time validation

pub mod field;
pub mod index;
pub mod mapping;
pub mod resolver;

pub use field::{VectorIndexFieldDefinition, VectorIndexFieldType};
pub use index::{VectorIndexDefinition, VectorIndexDefinitionBuilder};
pub use mapping::VectorIndexFieldMapping;
pub use resolver::VectorFieldDefinitionResolver;
