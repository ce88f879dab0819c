//! Path lookups over the flat field list of a vector index.

use ahash::{AHashMap, AHashSet};
use tracing::debug;

use strata_core::{Error, FieldPath, Result};
use strata_schema::VectorFieldSpecification;

use crate::field::{VectorIndexFieldDefinition, VectorIndexFieldType};

/// Fields of a vector index keyed by their exact path.
#[derive(Debug, Clone, Default)]
pub struct VectorIndexFieldMapping {
    fields: AHashMap<FieldPath, VectorIndexFieldDefinition>,
    /// Strict ancestors of every indexed path.
    document_paths: AHashSet<FieldPath>,
    nested_root: Option<FieldPath>,
}

impl VectorIndexFieldMapping {
    /// Fails with [`Error::DuplicateVectorField`] when two fields share a path.
    pub fn create<'a>(
        fields: impl IntoIterator<Item = &'a VectorIndexFieldDefinition>,
        nested_root: Option<FieldPath>,
    ) -> Result<Self> {
        let mut by_path = AHashMap::new();
        let mut document_paths = AHashSet::new();

        for field in fields {
            let path = field.path();
            if by_path.insert(path.clone(), field.clone()).is_some() {
                return Err(Error::DuplicateVectorField(path.clone()));
            }
            document_paths.extend(path.ancestors());
        }

        debug!(
            fields = by_path.len(),
            nested_root = ?nested_root.as_ref().map(ToString::to_string),
            "Built vector field mapping"
        );
        Ok(Self {
            fields: by_path,
            document_paths,
            nested_root,
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, path: &FieldPath) -> Option<&VectorIndexFieldDefinition> {
        self.fields.get(path)
    }

    pub fn fields(&self) -> impl Iterator<Item = &VectorIndexFieldDefinition> + '_ {
        self.fields.values()
    }

    /// True when some indexed path lies strictly below `path`.
    pub fn sub_document_exists(&self, path: &FieldPath) -> bool {
        self.document_paths.contains(path)
    }

    /// True when `path` is an indexed path, lies above one, or lies below one.
    pub fn is_used(&self, path: &FieldPath) -> bool {
        self.fields.contains_key(path)
            || self.sub_document_exists(path)
            || path.ancestors().any(|ancestor| self.fields.contains_key(&ancestor))
    }

    /// True only for an exact path indexed as `field_type`.
    pub fn is_indexed(&self, path: &FieldPath, field_type: VectorIndexFieldType) -> bool {
        self.fields
            .get(path)
            .is_some_and(|field| field.field_type() == field_type)
    }

    pub fn get_vector_field_specification(
        &self,
        path: &FieldPath,
    ) -> Option<&VectorFieldSpecification> {
        self.fields.get(path).and_then(VectorIndexFieldDefinition::specification)
    }

    pub fn nested_root(&self) -> Option<&FieldPath> {
        self.nested_root.as_ref()
    }

    pub fn has_nested_root(&self) -> bool {
        self.nested_root.is_some()
    }

    pub fn is_nested_root(&self, path: &FieldPath) -> bool {
        self.nested_root.as_ref() == Some(path)
    }
}
