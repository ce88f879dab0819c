//! # strata
//!
//! Schema layer of a document search index: field mappings, embedded document hierarchies,
//! stored source policies and vector index fields, with the path resolution query
//! execution needs.
//!
//! ## Quick Start
//!
//! ```rust
//! use strata::prelude::*;
//! use serde_json::json;
//!
//! let definition: SearchIndexDefinition = strata::codec::from_document(json!({
//!     "indexID": "507f191e810c19729de860ea",
//!     "name": "default",
//!     "database": "sample",
//!     "lastObservedCollectionName": "movies",
//!     "collectionUUID": "eb6c40ca-f25e-47e8-b48c-02a05b64a5aa",
//!     "mappings": {
//!         "dynamic": true,
//!         "fields": {"title": [{"type": "string"}, {"type": "token"}]}
//!     }
//! })).unwrap();
//!
//! let resolver = definition.create_field_definition_resolver(IndexFormatVersion::CURRENT);
//! let title = resolver
//!     .get_field_definition(&FieldPath::parse("title").unwrap(), None)
//!     .unwrap();
//! assert!(title.string().is_some() && title.token().is_some());
//!
//! // Undeclared fields fall back to the dynamic definition.
//! let year = resolver
//!     .get_field_definition(&FieldPath::parse("year").unwrap(), None)
//!     .unwrap();
//! assert!(year.number().is_some());
//! ```
//!
//! ## Crate Structure
//!
//! - [`strata-core`](strata_core) - field paths, index ids and format versions, errors,
//!   analyzer catalog, codec
//! - [`strata-schema`](strata_schema) - search index mappings and the field resolver
//! - [`strata-vector`](strata_vector) - vector index fields and their resolver

// Re-export core types
pub use strata_core::{
    codec, AnalyzerCatalog, Error, FieldPath, IndexFormatVersion, IndexId, Result,
    CURRENT_FEATURE_VERSION,
};

// Re-export search schema
pub use strata_schema::{
    DocumentFieldDefinition, DynamicDefinition, EmbeddedDocumentsFieldDefinition,
    FieldDefinition, FieldHierarchyContext, FieldTypeDefinition, FieldTypeKind, IndexMetadata,
    SearchFieldDefinitionResolver, SearchIndexDefinition, StoredSourceDefinition,
    StoredSourceMode, StringFieldPath, TypeSetDefinition, VectorFieldSpecification,
    VectorSimilarity,
};

// Re-export vector indexes
pub use strata_vector::{
    VectorFieldDefinitionResolver, VectorIndexDefinition, VectorIndexFieldDefinition,
    VectorIndexFieldMapping, VectorIndexFieldType,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AnalyzerCatalog, DocumentFieldDefinition, DynamicDefinition,
        EmbeddedDocumentsFieldDefinition, Error, FieldDefinition, FieldPath, FieldTypeKind,
        IndexFormatVersion, Result, SearchFieldDefinitionResolver, SearchIndexDefinition,
        StoredSourceDefinition, StoredSourceMode, StringFieldPath, TypeSetDefinition,
        VectorFieldDefinitionResolver, VectorIndexDefinition, VectorIndexFieldDefinition,
        VectorIndexFieldType,
    };
}
