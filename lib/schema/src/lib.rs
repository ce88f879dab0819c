//! # strata schema
//!
//! Mappings of a search index and the lookups query execution runs against them.
//!
//! ## Overview
//!
//! A mapping is a tree of [`FieldDefinition`]s. Each field holds at most one
//! [`FieldTypeDefinition`] per [`FieldTypeKind`]; `document` and `embeddedDocuments` variants
//! nest further field maps. Undeclared fields follow the [`DynamicDefinition`] of their
//! nearest container, either the built-in default or a named [`TypeSetDefinition`].
//!
//! ```rust
//! use strata_schema::{SearchIndexDefinition, StringFieldPath};
//! use strata_core::{FieldPath, IndexFormatVersion};
//! use serde_json::json;
//!
//! let definition: SearchIndexDefinition = serde_json::from_value(json!({
//!     "indexID": "507f191e810c19729de860ea",
//!     "name": "default",
//!     "database": "school",
//!     "lastObservedCollectionName": "classes",
//!     "collectionUUID": "eb6c40ca-f25e-47e8-b48c-02a05b64a5aa",
//!     "mappings": {
//!         "fields": {
//!             "teachers": {
//!                 "type": "embeddedDocuments",
//!                 "fields": {"firstName": {"type": "string"}}
//!             }
//!         }
//!     }
//! })).unwrap();
//!
//! let resolver = definition.create_field_definition_resolver(IndexFormatVersion::CURRENT);
//! let teachers = FieldPath::parse("teachers").unwrap();
//! let first_name = FieldPath::parse("teachers.firstName").unwrap();
//!
//! // Fields below an embeddedDocuments boundary are only visible from inside it.
//! assert!(resolver.get_field_definition(&first_name, None).is_none());
//! assert!(resolver
//!     .get_string_field_definition(&StringFieldPath::Field(first_name), Some(&teachers))
//!     .is_some());
//! ```
//!
//! ## Hierarchy
//!
//! ```text
//! mappings (document)
//!   ├── title            root field
//!   ├── meta (document)  root field, children flattened into the root
//!   │     └── score      root field "meta.score"
//!   └── teachers (embeddedDocuments)     relative root "teachers"
//!         ├── firstName                  field of "teachers"
//!         └── classes (embeddedDocuments) relative root "teachers.classes"
//!               └── subject              field of "teachers.classes"
//! ```

pub mod document;
pub mod dynamic;
pub mod field;
pub mod field_type;
pub mod hierarchy;
pub mod index;
pub mod metadata;
pub mod resolver;
pub mod stored_source;
pub mod type_set;
pub mod vector_spec;

pub use document::{
    DocumentFieldDefinition, DocumentFieldDefinitionBuilder, EmbeddedDocumentsFieldDefinition,
    EmbeddedDocumentsFieldDefinitionBuilder, HierarchicalFieldDefinition,
};
pub use dynamic::DynamicDefinition;
pub use field::{FieldDefinition, FieldDefinitionBuilder};
pub use field_type::{
    AutocompleteFieldDefinition, AutocompleteTokenization, FieldTypeDefinition, FieldTypeKind,
    GeoFieldDefinition, IndexOptions, KnnVectorFieldDefinition, NormsOptions,
    NumericFieldOptions, NumericRepresentation, SimilarityDefinition, SimilarityType,
    StringFieldDefinition, StringFieldDefinitionBuilder, TokenFieldDefinition, TokenNormalizer,
};
pub use hierarchy::{FieldHierarchyContext, FieldsByPath};
pub use index::{
    CustomAnalyzerDefinition, NullEmptySortPosition, SearchIndexDefinition,
    SearchIndexDefinitionBuilder, SortField, SortOrder, SynonymMappingDefinition, SynonymSource,
};
pub use metadata::{IndexMetadata, IndexMetadataBuilder, ViewDefinition};
pub use resolver::{default_dynamic_field_definition, SearchFieldDefinitionResolver, StringFieldPath};
pub use stored_source::{Exclusion, Inclusion, StoredSourceDefinition, StoredSourceMode};
pub use type_set::TypeSetDefinition;
pub use vector_spec::{
    AlgorithmType, HnswOptions, VectorFieldSpecification, VectorIndexingAlgorithm,
    VectorQuantization, VectorSimilarity, VectorSpecificationDocument,
};
