//! Vector index definitions.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use tracing::debug;

use strata_core::{Error, FieldPath, IndexFormatVersion, Result};
use strata_schema::{IndexMetadata, StoredSourceDefinition, ViewDefinition};

use crate::field::VectorIndexFieldDefinition;
use crate::mapping::VectorIndexFieldMapping;
use crate::resolver::VectorFieldDefinitionResolver;

/// A vector index: metadata plus a flat list of indexed paths.
#[derive(Debug, Clone)]
pub struct VectorIndexDefinition {
    metadata: IndexMetadata,
    fields: Vec<VectorIndexFieldDefinition>,
    nested_root: Option<FieldPath>,
    stored_source: Option<StoredSourceDefinition>,
    mapping: VectorIndexFieldMapping,
}

impl VectorIndexDefinition {
    pub fn builder(metadata: IndexMetadata) -> VectorIndexDefinitionBuilder {
        VectorIndexDefinitionBuilder {
            metadata,
            fields: Vec::new(),
            nested_root: None,
            stored_source: None,
        }
    }

    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[VectorIndexFieldDefinition] {
        &self.fields
    }

    pub fn nested_root(&self) -> Option<&FieldPath> {
        self.nested_root.as_ref()
    }

    pub fn mapping(&self) -> &VectorIndexFieldMapping {
        &self.mapping
    }

    /// Configured stored source; nothing is stored by default.
    pub fn stored_source(&self) -> StoredSourceDefinition {
        self.stored_source.clone().unwrap_or_default()
    }

    pub fn with_updated_view(&self, view: ViewDefinition) -> Self {
        Self {
            metadata: self.metadata.with_view(view),
            ..self.clone()
        }
    }

    pub fn create_field_definition_resolver(
        &self,
        version: IndexFormatVersion,
    ) -> VectorFieldDefinitionResolver<'_> {
        VectorFieldDefinitionResolver::new(self, version)
    }
}

impl PartialEq for VectorIndexDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata
            && self.fields == other.fields
            && self.nested_root == other.nested_root
            && self.stored_source == other.stored_source
    }
}

impl fmt::Display for VectorIndexDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.metadata, f)
    }
}

pub struct VectorIndexDefinitionBuilder {
    metadata: IndexMetadata,
    fields: Vec<VectorIndexFieldDefinition>,
    nested_root: Option<FieldPath>,
    stored_source: Option<StoredSourceDefinition>,
}

impl VectorIndexDefinitionBuilder {
    pub fn field(mut self, field: VectorIndexFieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = VectorIndexFieldDefinition>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn nested_root(mut self, nested_root: FieldPath) -> Self {
        self.nested_root = Some(nested_root);
        self
    }

    pub fn stored_source(mut self, stored_source: StoredSourceDefinition) -> Self {
        self.stored_source = Some(stored_source);
        self
    }

    pub fn build(self) -> Result<VectorIndexDefinition> {
        if self.fields.is_empty() {
            return Err(Error::InvalidDefinition(
                "vector index must define at least one field".to_string(),
            ));
        }
        let mapping = VectorIndexFieldMapping::create(&self.fields, self.nested_root.clone())?;

        let definition = VectorIndexDefinition {
            metadata: self.metadata,
            fields: self.fields,
            nested_root: self.nested_root,
            stored_source: self.stored_source,
            mapping,
        };
        debug!(index = %definition, fields = definition.fields.len(), "Built vector index definition");
        Ok(definition)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VectorIndexDocumentRef<'a> {
    #[serde(flatten)]
    metadata: &'a IndexMetadata,
    fields: &'a [VectorIndexFieldDefinition],
    #[serde(skip_serializing_if = "Option::is_none")]
    nested_root: Option<&'a FieldPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stored_source: Option<&'a StoredSourceDefinition>,
}

impl Serialize for VectorIndexDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        VectorIndexDocumentRef {
            metadata: &self.metadata,
            fields: &self.fields,
            nested_root: self.nested_root.as_ref(),
            stored_source: self.stored_source.as_ref(),
        }
        .serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VectorIndexDocument {
    #[serde(flatten)]
    metadata: IndexMetadata,
    fields: Vec<VectorIndexFieldDefinition>,
    #[serde(default)]
    nested_root: Option<FieldPath>,
    #[serde(default)]
    stored_source: Option<StoredSourceDefinition>,
}

impl<'de> Deserialize<'de> for VectorIndexDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let document = VectorIndexDocument::deserialize(deserializer)?;
        VectorIndexDefinitionBuilder {
            metadata: document.metadata,
            fields: document.fields,
            nested_root: document.nested_root,
            stored_source: document.stored_source,
        }
        .build()
        .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn document(extra: Value) -> Value {
        let mut document = json!({
            "indexID": "507f191e810c19729de860ea",
            "name": "vectors",
            "database": "db",
            "lastObservedCollectionName": "movies",
            "collectionUUID": "eb6c40ca-f25e-47e8-b48c-02a05b64a5aa",
            "fields": [
                {"type": "vector", "path": "sections.embedding", "numDimensions": 8, "similarity": "cosine"},
                {"type": "filter", "path": "title"}
            ]
        });
        if let (Some(target), Value::Object(extra)) = (document.as_object_mut(), extra) {
            target.extend(extra);
        }
        document
    }

    #[test]
    fn test_decode_with_nested_root() {
        let definition: VectorIndexDefinition =
            serde_json::from_value(document(json!({"nestedRoot": "sections"}))).unwrap();
        assert_eq!(definition.nested_root().map(ToString::to_string).as_deref(), Some("sections"));
        assert!(definition.mapping().is_nested_root(&FieldPath::parse("sections").unwrap()));
        assert_eq!(definition.fields().len(), 2);
        assert_eq!(definition.stored_source(), StoredSourceDefinition::exclude_all());

        let encoded = serde_json::to_value(&definition).unwrap();
        assert_eq!(encoded["nestedRoot"], json!("sections"));
        assert_eq!(encoded["fields"][1], json!({"type": "filter", "path": "title"}));
        let decoded: VectorIndexDefinition = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, definition);
    }

    #[test]
    fn test_unknown_top_level_fields_are_ignored() {
        let definition: VectorIndexDefinition =
            serde_json::from_value(document(json!({"status": "READY"}))).unwrap();
        assert!(definition.nested_root().is_none());
    }

    #[test]
    fn test_rejects_empty_and_duplicate_fields() {
        let empty = serde_json::from_value::<VectorIndexDefinition>(document(json!({"fields": []})));
        assert!(empty.unwrap_err().to_string().contains("at least one field"));

        let duplicate = serde_json::from_value::<VectorIndexDefinition>(document(json!({
            "fields": [{"type": "filter", "path": "x"}, {"type": "text", "path": "x"}]
        })));
        assert!(duplicate.unwrap_err().to_string().contains("Duplicate vector field path: x"));
    }

    #[test]
    fn test_stored_source_and_view() {
        let definition: VectorIndexDefinition =
            serde_json::from_value(document(json!({"storedSource": {"include": ["title"]}}))).unwrap();
        assert!(definition.stored_source().is_inclusion());

        let viewed = definition.with_updated_view(ViewDefinition::new("recent", vec![]));
        assert!(viewed.to_string().contains("view 'recent'"));
        assert_ne!(viewed, definition);
    }
}
