//! Query-time field checks for vector indexes.

use std::fmt;

use strata_core::{Error, FieldPath, IndexFormatVersion, Result};
use strata_schema::VectorFieldSpecification;

use crate::field::VectorIndexFieldType;
use crate::index::VectorIndexDefinition;

/// Answers path questions for queries against one [`VectorIndexDefinition`].
pub struct VectorFieldDefinitionResolver<'a> {
    definition: &'a VectorIndexDefinition,
    version: IndexFormatVersion,
}

impl<'a> VectorFieldDefinitionResolver<'a> {
    pub fn new(definition: &'a VectorIndexDefinition, version: IndexFormatVersion) -> Self {
        Self {
            definition,
            version,
        }
    }

    pub fn index_format_version(&self) -> IndexFormatVersion {
        self.version
    }

    pub fn definition(&self) -> &'a VectorIndexDefinition {
        self.definition
    }

    pub fn is_used(&self, path: &FieldPath) -> bool {
        self.definition.mapping().is_used(path)
    }

    pub fn is_indexed(&self, path: &FieldPath, field_type: VectorIndexFieldType) -> bool {
        self.definition.mapping().is_indexed(path, field_type)
    }

    pub fn sub_document_exists(&self, path: &FieldPath) -> bool {
        self.definition.mapping().sub_document_exists(path)
    }

    pub fn get_vector_field_specification(
        &self,
        path: &FieldPath,
    ) -> Option<&'a VectorFieldSpecification> {
        self.definition.mapping().get_vector_field_specification(path)
    }

    /// Check that `path` is a vector field whose dimensions match the query vector.
    pub fn validate_vector_query(
        &self,
        path: &FieldPath,
        query_dimensions: usize,
    ) -> Result<&'a VectorFieldSpecification> {
        let specification = self.get_vector_field_specification(path).ok_or_else(|| {
            Error::InvalidQuery(format!("Path '{path}' needs to be indexed as vector"))
        })?;

        let indexed = specification.num_dimensions() as usize;
        if indexed != query_dimensions {
            return Err(Error::InvalidQuery(format!(
                "vector field is indexed with {indexed} dimensions but queried with {query_dimensions}"
            )));
        }
        Ok(specification)
    }

    pub fn validate_filter_path(&self, path: &FieldPath) -> Result<()> {
        if self.is_indexed(path, VectorIndexFieldType::Filter) {
            Ok(())
        } else {
            Err(Error::InvalidQuery(format!(
                "Path '{path}' needs to be indexed as filter"
            )))
        }
    }
}

impl fmt::Debug for VectorFieldDefinitionResolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorFieldDefinitionResolver")
            .field("index", &self.definition.metadata().index_id())
            .field("version", &self.version)
            .finish()
    }
}
