//! Multi-typed field definitions.

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use strata_core::{Error, Result};

use crate::document::{DocumentFieldDefinition, EmbeddedDocumentsFieldDefinition};
use crate::field_type::{
    AutocompleteFieldDefinition, FieldTypeDefinition, FieldTypeKind, GeoFieldDefinition,
    KnnVectorFieldDefinition, NumericFieldOptions, StringFieldDefinition, TokenFieldDefinition,
};
use crate::vector_spec::VectorFieldSpecification;

const SORTABLE_BETA_KINDS: [FieldTypeKind; 3] = [
    FieldTypeKind::SortableDateBetaV1,
    FieldTypeKind::SortableNumberBetaV1,
    FieldTypeKind::SortableStringBetaV1,
];

/// Every way one path is indexed, at most one variant per kind.
///
/// A single variant is encoded as that variant's document, several as a list of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldDefinition {
    definitions: BTreeMap<FieldTypeKind, FieldTypeDefinition>,
}

impl FieldDefinition {
    /// Validates the same rules as decoding.
    pub fn new(definitions: impl IntoIterator<Item = FieldTypeDefinition>) -> Result<Self> {
        let mut by_kind = BTreeMap::new();
        for definition in definitions {
            let kind = definition.kind();
            if by_kind.insert(kind, definition).is_some() {
                return Err(Error::InvalidDefinition(format!(
                    "field contained multiple \"{kind}\" type definitions"
                )));
            }
        }

        if by_kind.is_empty() {
            return Err(Error::InvalidDefinition(
                "field must declare at least one type".to_string(),
            ));
        }
        if SORTABLE_BETA_KINDS
            .iter()
            .filter(|kind| by_kind.contains_key(*kind))
            .count()
            > 1
        {
            return Err(Error::InvalidDefinition(
                "can only define one of [sortableDateBetaV1, sortableNumberBetaV1, sortableStringBetaV1]"
                    .to_string(),
            ));
        }
        if by_kind.contains_key(&FieldTypeKind::KnnVector)
            && by_kind.contains_key(&FieldTypeKind::Vector)
        {
            return Err(Error::InvalidDefinition(
                "can only define one of [knnVector, vector]".to_string(),
            ));
        }
        if by_kind.contains_key(&FieldTypeKind::SortableStringBetaV1)
            && by_kind.contains_key(&FieldTypeKind::Token)
        {
            return Err(Error::InvalidDefinition(
                "Can only define one of [SortableStringBetaV1, Token]".to_string(),
            ));
        }

        Ok(Self {
            definitions: by_kind,
        })
    }

    pub fn builder() -> FieldDefinitionBuilder {
        FieldDefinitionBuilder::default()
    }

    /// The variants of `self` accepted by `keep`; may be empty.
    pub(crate) fn filtered(&self, keep: impl Fn(FieldTypeKind) -> bool) -> Self {
        Self {
            definitions: self
                .definitions
                .iter()
                .filter(|(kind, _)| keep(**kind))
                .map(|(kind, definition)| (*kind, definition.clone()))
                .collect(),
        }
    }

    /// Skips validation; callers guarantee one variant per kind.
    pub(crate) fn from_validated(definitions: impl IntoIterator<Item = FieldTypeDefinition>) -> Self {
        Self {
            definitions: definitions
                .into_iter()
                .map(|definition| (definition.kind(), definition))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn get(&self, kind: FieldTypeKind) -> Option<&FieldTypeDefinition> {
        self.definitions.get(&kind)
    }

    pub fn contains(&self, kind: FieldTypeKind) -> bool {
        self.definitions.contains_key(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = FieldTypeKind> + '_ {
        self.definitions.keys().copied()
    }

    pub fn definitions(&self) -> impl Iterator<Item = &FieldTypeDefinition> + '_ {
        self.definitions.values()
    }

    /// True if any variant other than `document` or `embeddedDocuments` is present.
    pub fn has_scalar_field_definitions(&self) -> bool {
        self.kinds().any(|kind| !kind.is_container())
    }

    pub fn autocomplete(&self) -> Option<&AutocompleteFieldDefinition> {
        match self.get(FieldTypeKind::Autocomplete)? {
            FieldTypeDefinition::Autocomplete(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn document(&self) -> Option<&Arc<DocumentFieldDefinition>> {
        match self.get(FieldTypeKind::Document)? {
            FieldTypeDefinition::Document(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn embedded_documents(&self) -> Option<&Arc<EmbeddedDocumentsFieldDefinition>> {
        match self.get(FieldTypeKind::EmbeddedDocuments)? {
            FieldTypeDefinition::EmbeddedDocuments(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn geo(&self) -> Option<&GeoFieldDefinition> {
        match self.get(FieldTypeKind::Geo)? {
            FieldTypeDefinition::Geo(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn knn_vector(&self) -> Option<&KnnVectorFieldDefinition> {
        match self.get(FieldTypeKind::KnnVector)? {
            FieldTypeDefinition::KnnVector(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn number(&self) -> Option<&NumericFieldOptions> {
        match self.get(FieldTypeKind::Number)? {
            FieldTypeDefinition::Number(options) => Some(options),
            _ => None,
        }
    }

    pub fn number_facet(&self) -> Option<&NumericFieldOptions> {
        match self.get(FieldTypeKind::NumberFacet)? {
            FieldTypeDefinition::NumberFacet(options) => Some(options),
            _ => None,
        }
    }

    pub fn string(&self) -> Option<&StringFieldDefinition> {
        match self.get(FieldTypeKind::String)? {
            FieldTypeDefinition::String(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&TokenFieldDefinition> {
        match self.get(FieldTypeKind::Token)? {
            FieldTypeDefinition::Token(definition) => Some(definition),
            _ => None,
        }
    }

    pub fn vector(&self) -> Option<&VectorFieldSpecification> {
        match self.get(FieldTypeKind::Vector)? {
            FieldTypeDefinition::Vector(specification) => Some(specification),
            _ => None,
        }
    }

    /// The vector parameters of a `knnVector` or `vector` variant.
    pub fn vector_field_specification(&self) -> Option<&VectorFieldSpecification> {
        self.knn_vector()
            .map(KnnVectorFieldDefinition::specification)
            .or_else(|| self.vector())
    }

    /// Analyzers named by this field's own string and autocomplete variants.
    pub fn analyzer_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.string()
            .into_iter()
            .flat_map(StringFieldDefinition::analyzer_names)
            .chain(self.autocomplete().and_then(AutocompleteFieldDefinition::analyzer))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldDefinitionBuilder {
    definitions: Vec<FieldTypeDefinition>,
}

impl FieldDefinitionBuilder {
    pub fn with(mut self, definition: FieldTypeDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn string(self, definition: StringFieldDefinition) -> Self {
        self.with(FieldTypeDefinition::String(definition))
    }

    pub fn number(self, options: NumericFieldOptions) -> Self {
        self.with(FieldTypeDefinition::Number(options))
    }

    pub fn document(self, definition: DocumentFieldDefinition) -> Self {
        self.with(FieldTypeDefinition::document(definition))
    }

    pub fn embedded_documents(self, definition: EmbeddedDocumentsFieldDefinition) -> Self {
        self.with(FieldTypeDefinition::embedded_documents(definition))
    }

    pub fn build(self) -> Result<FieldDefinition> {
        FieldDefinition::new(self.definitions)
    }
}

impl Serialize for FieldDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut definitions = self.definitions.values();
        match (definitions.next(), definitions.next()) {
            (Some(only), None) => only.serialize(serializer),
            _ => serializer.collect_seq(self.definitions.values()),
        }
    }
}

impl<'de> Deserialize<'de> for FieldDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(FieldDefinitionVisitor)
    }
}

struct FieldDefinitionVisitor;

impl<'de> Visitor<'de> for FieldDefinitionVisitor {
    type Value = FieldDefinition;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a field type document or a list of them")
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> std::result::Result<Self::Value, A::Error> {
        let definition =
            FieldTypeDefinition::deserialize(de::value::MapAccessDeserializer::new(map))?;
        FieldDefinition::new([definition]).map_err(de::Error::custom)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
        let mut definitions = Vec::new();
        while let Some(definition) = seq.next_element::<FieldTypeDefinition>()? {
            definitions.push(definition);
        }
        FieldDefinition::new(definitions).map_err(de::Error::custom)
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Err(E::custom("field definition cannot be null"))
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        self.visit_unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::DynamicDefinition;
    use crate::vector_spec::VectorSimilarity;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> std::result::Result<FieldDefinition, String> {
        serde_json::from_value(value).map_err(|e| e.to_string())
    }

    #[test]
    fn test_single_and_list_forms() {
        let single = decode(json!({"type": "token"})).unwrap();
        assert_eq!(single.kinds().collect::<Vec<_>>(), vec![FieldTypeKind::Token]);
        assert_eq!(serde_json::to_value(&single).unwrap(), json!({"type": "token", "normalizer": "none"}));

        let many = decode(json!([{"type": "string"}, {"type": "stringFacet"}])).unwrap();
        assert_eq!(many.len(), 2);
        assert!(serde_json::to_value(&many).unwrap().is_array());
        assert_eq!(decode(serde_json::to_value(&many).unwrap()).unwrap(), many);
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let err = decode(json!([{"type": "number"}, {"type": "number"}])).unwrap_err();
        assert!(err.contains("field contained multiple \"number\" type definitions"));
    }

    #[test]
    fn test_exclusive_kinds() {
        let sortables = json!([{"type": "sortableDateBetaV1"}, {"type": "sortableNumberBetaV1"}]);
        assert!(decode(sortables).unwrap_err().contains("can only define one of [sortableDateBetaV1"));

        let vectors = json!([
            {"type": "knnVector", "dimensions": 2, "similarity": "cosine"},
            {"type": "vector", "numDimensions": 2, "similarity": "cosine"}
        ]);
        assert!(decode(vectors).unwrap_err().contains("can only define one of [knnVector, vector]"));

        let token = json!([{"type": "sortableStringBetaV1"}, {"type": "token"}]);
        assert!(decode(token).unwrap_err().contains("[SortableStringBetaV1, Token]"));
    }

    #[test]
    fn test_null_rejected() {
        assert!(decode(json!(null)).unwrap_err().contains("cannot be null"));
        assert!(decode(json!([])).is_err());
    }

    #[test]
    fn test_has_scalar_field_definitions() {
        let document = FieldDefinition::builder()
            .document(DocumentFieldDefinition::with_dynamic(DynamicDefinition::EnabledDefault))
            .build()
            .unwrap();
        assert!(!document.has_scalar_field_definitions());

        let embedded = FieldDefinition::builder()
            .embedded_documents(EmbeddedDocumentsFieldDefinition::default())
            .build()
            .unwrap();
        assert!(!embedded.has_scalar_field_definitions());

        let mixed = FieldDefinition::builder()
            .document(DocumentFieldDefinition::default())
            .string(StringFieldDefinition::default())
            .build()
            .unwrap();
        assert!(mixed.has_scalar_field_definitions());
    }

    #[test]
    fn test_vector_field_specification_from_either_kind() {
        let knn = decode(json!({"type": "knnVector", "dimensions": 4, "similarity": "dotProduct"}))
            .unwrap();
        let spec = knn.vector_field_specification().unwrap();
        assert_eq!(spec.num_dimensions(), 4);
        assert_eq!(spec.similarity(), VectorSimilarity::DotProduct);

        let vector = decode(json!({"type": "vector", "numDimensions": 8, "similarity": "cosine"}))
            .unwrap();
        assert_eq!(vector.vector_field_specification().unwrap().num_dimensions(), 8);
        assert!(decode(json!({"type": "date"})).unwrap().vector_field_specification().is_none());
    }

    #[test]
    fn test_document_and_embedded_coexist() {
        let field = decode(json!([
            {"type": "document", "dynamic": true},
            {"type": "embeddedDocuments", "fields": {"name": {"type": "string"}}}
        ]))
        .unwrap();
        assert!(field.document().unwrap().dynamic().is_enabled());
        assert!(field.embedded_documents().unwrap().fields().contains_key("name"));
    }
}
