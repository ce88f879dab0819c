//! Document and embeddedDocuments containers.
//!
//! Both containers map field names to [`FieldDefinition`]s and carry a
//! [`DynamicDefinition`] for names they do not declare. The [`FieldHierarchyContext`] of a
//! container is computed when it is created, so a container that exists is always free of
//! embedded root clashes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use strata_core::{Error, FieldPath, Result};

use crate::dynamic::DynamicDefinition;
use crate::field::FieldDefinition;
use crate::field_type::FieldTypeKind;
use crate::hierarchy::FieldHierarchyContext;
use crate::stored_source::StoredSourceDefinition;

/// Kinds that may not appear anywhere inside an embeddedDocuments field.
const DISALLOWED_IN_EMBEDDED: [FieldTypeKind; 4] = [
    FieldTypeKind::SortableDateBetaV1,
    FieldTypeKind::SortableNumberBetaV1,
    FieldTypeKind::SortableStringBetaV1,
    FieldTypeKind::KnnVector,
];

/// Shared view of document-like containers.
pub trait HierarchicalFieldDefinition {
    fn dynamic(&self) -> &DynamicDefinition;

    fn fields(&self) -> &BTreeMap<String, FieldDefinition>;

    fn hierarchy(&self) -> &FieldHierarchyContext;

    fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields().get(name)
    }
}

fn validate_field_names(fields: &BTreeMap<String, FieldDefinition>) -> Result<()> {
    for name in fields.keys() {
        if name.is_empty() {
            return Err(Error::InvalidDefinition(
                "field names cannot be empty".to_string(),
            ));
        }
        if name.contains('.') {
            return Err(Error::InvalidDefinition(format!(
                "field name \"{name}\" cannot contain '.', declare nested fields with a document type"
            )));
        }
    }
    Ok(())
}

/// A sub-document whose fields are indexed as part of the parent document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawDocument")]
pub struct DocumentFieldDefinition {
    dynamic: DynamicDefinition,
    fields: BTreeMap<String, FieldDefinition>,
    #[serde(skip)]
    hierarchy: FieldHierarchyContext,
}

impl DocumentFieldDefinition {
    pub fn create(
        dynamic: DynamicDefinition,
        fields: BTreeMap<String, FieldDefinition>,
    ) -> Result<Self> {
        validate_field_names(&fields)?;
        let hierarchy = FieldHierarchyContext::build(&fields, false)?;
        Ok(Self {
            dynamic,
            fields,
            hierarchy,
        })
    }

    /// A container with no declared fields.
    pub fn with_dynamic(dynamic: DynamicDefinition) -> Self {
        Self {
            dynamic,
            ..Default::default()
        }
    }

    pub fn builder() -> DocumentFieldDefinitionBuilder {
        DocumentFieldDefinitionBuilder::default()
    }

    pub fn dynamic(&self) -> &DynamicDefinition {
        &self.dynamic
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldDefinition> {
        &self.fields
    }

    pub fn hierarchy(&self) -> &FieldHierarchyContext {
        &self.hierarchy
    }
}

impl PartialEq for DocumentFieldDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.dynamic == other.dynamic && self.fields == other.fields
    }
}

impl HierarchicalFieldDefinition for DocumentFieldDefinition {
    fn dynamic(&self) -> &DynamicDefinition {
        &self.dynamic
    }

    fn fields(&self) -> &BTreeMap<String, FieldDefinition> {
        &self.fields
    }

    fn hierarchy(&self) -> &FieldHierarchyContext {
        &self.hierarchy
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    #[serde(default)]
    dynamic: DynamicDefinition,
    #[serde(default)]
    fields: BTreeMap<String, FieldDefinition>,
}

impl TryFrom<RawDocument> for DocumentFieldDefinition {
    type Error = Error;

    fn try_from(raw: RawDocument) -> Result<Self> {
        Self::create(raw.dynamic, raw.fields)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentFieldDefinitionBuilder {
    dynamic: DynamicDefinition,
    fields: BTreeMap<String, FieldDefinition>,
}

impl DocumentFieldDefinitionBuilder {
    pub fn dynamic(mut self, dynamic: impl Into<DynamicDefinition>) -> Self {
        self.dynamic = dynamic.into();
        self
    }

    pub fn field(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        self.fields.insert(name.into(), definition);
        self
    }

    pub fn build(self) -> Result<DocumentFieldDefinition> {
        DocumentFieldDefinition::create(self.dynamic, self.fields)
    }
}

/// An array of sub-documents, each indexed as its own document.
///
/// Fields below an embeddedDocuments boundary are only visible when resolving relative to
/// that boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawEmbedded")]
pub struct EmbeddedDocumentsFieldDefinition {
    dynamic: DynamicDefinition,
    fields: BTreeMap<String, FieldDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stored_source: Option<StoredSourceDefinition>,
    #[serde(skip)]
    hierarchy: FieldHierarchyContext,
}

impl Default for EmbeddedDocumentsFieldDefinition {
    fn default() -> Self {
        Self {
            dynamic: DynamicDefinition::Disabled,
            fields: BTreeMap::new(),
            stored_source: None,
            hierarchy: FieldHierarchyContext::empty(true),
        }
    }
}

impl EmbeddedDocumentsFieldDefinition {
    pub fn create(
        dynamic: DynamicDefinition,
        fields: BTreeMap<String, FieldDefinition>,
        stored_source: Option<StoredSourceDefinition>,
    ) -> Result<Self> {
        validate_field_names(&fields)?;
        let hierarchy = FieldHierarchyContext::build(&fields, true)?;

        let mut disallowed: Vec<(&FieldPath, FieldTypeKind)> = hierarchy
            .root_fields()
            .iter()
            .filter_map(|(path, field)| {
                DISALLOWED_IN_EMBEDDED
                    .into_iter()
                    .find(|kind| field.contains(*kind))
                    .map(|kind| (path, kind))
            })
            .collect();
        disallowed.sort();
        if let Some((path, kind)) = disallowed.into_iter().next() {
            return Err(Error::DisallowedEmbeddedType {
                type_name: kind.name(),
                path: path.clone(),
            });
        }

        Ok(Self {
            dynamic,
            fields,
            stored_source,
            hierarchy,
        })
    }

    pub fn builder() -> EmbeddedDocumentsFieldDefinitionBuilder {
        EmbeddedDocumentsFieldDefinitionBuilder::default()
    }

    pub fn dynamic(&self) -> &DynamicDefinition {
        &self.dynamic
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldDefinition> {
        &self.fields
    }

    pub fn stored_source(&self) -> Option<&StoredSourceDefinition> {
        self.stored_source.as_ref()
    }

    pub fn hierarchy(&self) -> &FieldHierarchyContext {
        &self.hierarchy
    }
}

impl PartialEq for EmbeddedDocumentsFieldDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.dynamic == other.dynamic
            && self.fields == other.fields
            && self.stored_source == other.stored_source
    }
}

impl HierarchicalFieldDefinition for EmbeddedDocumentsFieldDefinition {
    fn dynamic(&self) -> &DynamicDefinition {
        &self.dynamic
    }

    fn fields(&self) -> &BTreeMap<String, FieldDefinition> {
        &self.fields
    }

    fn hierarchy(&self) -> &FieldHierarchyContext {
        &self.hierarchy
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawEmbedded {
    #[serde(default)]
    dynamic: DynamicDefinition,
    #[serde(default)]
    fields: BTreeMap<String, FieldDefinition>,
    #[serde(default)]
    stored_source: Option<StoredSourceDefinition>,
}

impl TryFrom<RawEmbedded> for EmbeddedDocumentsFieldDefinition {
    type Error = Error;

    fn try_from(raw: RawEmbedded) -> Result<Self> {
        Self::create(raw.dynamic, raw.fields, raw.stored_source)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmbeddedDocumentsFieldDefinitionBuilder {
    dynamic: DynamicDefinition,
    fields: BTreeMap<String, FieldDefinition>,
    stored_source: Option<StoredSourceDefinition>,
}

impl EmbeddedDocumentsFieldDefinitionBuilder {
    pub fn dynamic(mut self, dynamic: impl Into<DynamicDefinition>) -> Self {
        self.dynamic = dynamic.into();
        self
    }

    pub fn field(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        self.fields.insert(name.into(), definition);
        self
    }

    pub fn stored_source(mut self, stored_source: StoredSourceDefinition) -> Self {
        self.stored_source = Some(stored_source);
        self
    }

    pub fn build(self) -> Result<EmbeddedDocumentsFieldDefinition> {
        EmbeddedDocumentsFieldDefinition::create(self.dynamic, self.fields, self.stored_source)
    }
}
