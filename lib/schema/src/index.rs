//! Search index definitions
//!
//! A [`SearchIndexDefinition`] is the unit handed to query execution: metadata, the mapping
//! tree, type sets, analyzers, synonyms, stored source and the optional index sort. It is
//! validated as a whole when built or decoded and is immutable afterwards, apart from the
//! last observed collection name in its metadata.
//!
//! ```json
//! {
//!   "indexID": "507f191e810c19729de860ea",
//!   "name": "default",
//!   "database": "db",
//!   "lastObservedCollectionName": "movies",
//!   "collectionUUID": "eb6c40ca-f25e-47e8-b48c-02a05b64a5aa",
//!   "mappings": {"dynamic": true}
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

use strata_core::{AnalyzerCatalog, Error, FieldPath, IndexFormatVersion, Result, CURRENT_FEATURE_VERSION};

use crate::document::DocumentFieldDefinition;
use crate::field::FieldDefinition;
use crate::field_type::{FieldTypeDefinition, FieldTypeKind};
use crate::hierarchy::{FieldHierarchyContext, FieldsByPath};
use crate::metadata::{IndexMetadata, ViewDefinition};
use crate::resolver::SearchFieldDefinitionResolver;
use crate::stored_source::StoredSourceDefinition;
use crate::type_set::TypeSetDefinition;

/// A named custom analyzer. Its tokenizer and filter configuration is kept opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomAnalyzerDefinition {
    pub name: String,
    #[serde(flatten)]
    pub configuration: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynonymSource {
    pub collection: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynonymMappingDefinition {
    pub name: String,
    pub analyzer: String,
    pub source: SynonymSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl TryFrom<i32> for SortOrder {
    type Error = Error;

    fn try_from(order: i32) -> Result<Self> {
        match order {
            1 => Ok(SortOrder::Ascending),
            -1 => Ok(SortOrder::Descending),
            other => Err(Error::InvalidDefinition(format!(
                "sort order must be 1 or -1, got {other}"
            ))),
        }
    }
}

impl From<SortOrder> for i32 {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NullEmptySortPosition {
    Lowest,
    Highest,
}

/// One key of the index sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SortField {
    pub path: FieldPath,
    pub order: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_empty_sort_position: Option<NullEmptySortPosition>,
}

impl SortField {
    pub fn new(path: FieldPath, order: SortOrder) -> Self {
        Self {
            path,
            order,
            null_empty_sort_position: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchIndexDefinition {
    metadata: IndexMetadata,
    mappings: DocumentFieldDefinition,
    analyzer: Option<String>,
    search_analyzer: Option<String>,
    analyzers: Vec<CustomAnalyzerDefinition>,
    index_feature_version: i32,
    synonyms: Vec<SynonymMappingDefinition>,
    stored_source: Option<StoredSourceDefinition>,
    type_sets: BTreeMap<String, TypeSetDefinition>,
    type_set_order: Vec<String>,
    sort: Option<Vec<SortField>>,
}

impl SearchIndexDefinition {
    pub fn builder(
        metadata: IndexMetadata,
        mappings: DocumentFieldDefinition,
    ) -> SearchIndexDefinitionBuilder {
        SearchIndexDefinitionBuilder {
            metadata,
            mappings,
            analyzer: None,
            search_analyzer: None,
            analyzers: Vec::new(),
            index_feature_version: 0,
            synonyms: Vec::new(),
            stored_source: None,
            type_sets: None,
            sort: None,
        }
    }

    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    pub fn mappings(&self) -> &DocumentFieldDefinition {
        &self.mappings
    }

    pub fn analyzer(&self) -> Option<&str> {
        self.analyzer.as_deref()
    }

    pub fn search_analyzer(&self) -> Option<&str> {
        self.search_analyzer.as_deref()
    }

    /// The index analyzer, or the catalog's fallback when none is configured.
    pub fn analyzer_or_default<'a>(&'a self, catalog: &'a AnalyzerCatalog) -> &'a str {
        self.analyzer().unwrap_or(catalog.default_analyzer.as_str())
    }

    pub fn analyzers(&self) -> &[CustomAnalyzerDefinition] {
        &self.analyzers
    }

    pub fn analyzer_map(&self) -> BTreeMap<&str, &CustomAnalyzerDefinition> {
        self.analyzers.iter().map(|a| (a.name.as_str(), a)).collect()
    }

    /// The feature version in effect, never above [`CURRENT_FEATURE_VERSION`].
    pub fn index_feature_version(&self) -> i32 {
        self.index_feature_version
    }

    pub fn synonyms(&self) -> &[SynonymMappingDefinition] {
        &self.synonyms
    }

    pub fn synonym_map(&self) -> BTreeMap<&str, &SynonymMappingDefinition> {
        self.synonyms.iter().map(|s| (s.name.as_str(), s)).collect()
    }

    /// Configured stored source; nothing is stored by default.
    pub fn stored_source(&self) -> StoredSourceDefinition {
        self.stored_source.clone().unwrap_or_default()
    }

    pub fn type_set(&self, name: &str) -> Option<&TypeSetDefinition> {
        self.type_sets.get(name)
    }

    pub fn type_sets(&self) -> impl Iterator<Item = &TypeSetDefinition> + '_ {
        self.type_set_order
            .iter()
            .filter_map(|name| self.type_sets.get(name))
    }

    pub fn sort(&self) -> Option<&[SortField]> {
        self.sort.as_deref()
    }

    pub fn hierarchy(&self) -> &FieldHierarchyContext {
        self.mappings.hierarchy()
    }

    /// Deepest nesting of embeddedDocuments fields in the mapping.
    pub fn num_embedded_documents_layers(&self) -> usize {
        self.hierarchy().num_embedded_documents_layers()
    }

    pub fn has_embedded_fields(&self) -> bool {
        self.num_embedded_documents_layers() != 0
    }

    pub fn is_indexed_as_embedded_documents_field(&self, path: &FieldPath) -> bool {
        self.hierarchy().fields_by_embedded_root().contains_key(path)
    }

    /// Statically declared fields reachable from the root without crossing an
    /// embeddedDocuments boundary.
    pub fn static_fields(&self) -> &FieldsByPath {
        self.hierarchy().root_fields()
    }

    /// Static fields declaring `kind`, sorted by path.
    pub fn static_field_definitions_of_kind(
        &self,
        kind: FieldTypeKind,
    ) -> Vec<(&FieldPath, &FieldTypeDefinition)> {
        let mut matches: Vec<_> = self
            .static_fields()
            .iter()
            .filter_map(|(path, field)| field.get(kind).map(|definition| (path, definition)))
            .collect();
        matches.sort_by(|a, b| a.0.cmp(b.0));
        matches
    }

    pub fn is_string_facets_field_indexed(&self) -> bool {
        self.static_fields()
            .values()
            .any(|field| field.contains(FieldTypeKind::StringFacet))
    }

    /// Every field definition in the mapping, including those below embedded roots.
    fn all_field_definitions(&self) -> impl Iterator<Item = &FieldDefinition> + '_ {
        let hierarchy = self.hierarchy();
        hierarchy.root_fields().values().chain(
            hierarchy
                .fields_by_embedded_root()
                .values()
                .flat_map(|fields| fields.values()),
        )
    }

    /// Analyzer names referenced anywhere in the definition that the catalog does not provide.
    pub fn non_stock_analyzer_names(&self, catalog: &AnalyzerCatalog) -> BTreeSet<String> {
        self.analyzer()
            .into_iter()
            .chain(self.search_analyzer())
            .chain(self.all_field_definitions().flat_map(FieldDefinition::analyzer_names))
            .chain(self.synonyms.iter().map(|s| s.analyzer.as_str()))
            .chain(self.type_sets.values().flat_map(TypeSetDefinition::analyzer_names))
            .filter(|name| !catalog.is_stock_analyzer(name))
            .map(str::to_owned)
            .collect()
    }

    /// A copy of this definition bound to a different view.
    pub fn with_updated_view(&self, view: ViewDefinition) -> Self {
        Self {
            metadata: self.metadata.with_view(view),
            ..self.clone()
        }
    }

    pub fn create_field_definition_resolver(
        &self,
        version: IndexFormatVersion,
    ) -> SearchFieldDefinitionResolver<'_> {
        SearchFieldDefinitionResolver::new(self, version)
    }
}

impl PartialEq for SearchIndexDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata
            && self.mappings == other.mappings
            && self.analyzer == other.analyzer
            && self.search_analyzer == other.search_analyzer
            && self.analyzers == other.analyzers
            && self.index_feature_version == other.index_feature_version
            && self.synonyms == other.synonyms
            && self.stored_source == other.stored_source
            && self.type_sets == other.type_sets
            && self.sort == other.sort
    }
}

impl fmt::Display for SearchIndexDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.metadata, f)
    }
}

pub struct SearchIndexDefinitionBuilder {
    metadata: IndexMetadata,
    mappings: DocumentFieldDefinition,
    analyzer: Option<String>,
    search_analyzer: Option<String>,
    analyzers: Vec<CustomAnalyzerDefinition>,
    index_feature_version: i32,
    synonyms: Vec<SynonymMappingDefinition>,
    stored_source: Option<StoredSourceDefinition>,
    type_sets: Option<Vec<TypeSetDefinition>>,
    sort: Option<Vec<SortField>>,
}

impl SearchIndexDefinitionBuilder {
    pub fn analyzer(mut self, name: impl Into<String>) -> Self {
        self.analyzer = Some(name.into());
        self
    }

    pub fn search_analyzer(mut self, name: impl Into<String>) -> Self {
        self.search_analyzer = Some(name.into());
        self
    }

    pub fn custom_analyzer(mut self, analyzer: CustomAnalyzerDefinition) -> Self {
        self.analyzers.push(analyzer);
        self
    }

    pub fn index_feature_version(mut self, version: i32) -> Self {
        self.index_feature_version = version;
        self
    }

    pub fn synonym(mut self, synonym: SynonymMappingDefinition) -> Self {
        self.synonyms.push(synonym);
        self
    }

    pub fn stored_source(mut self, stored_source: StoredSourceDefinition) -> Self {
        self.stored_source = Some(stored_source);
        self
    }

    pub fn type_set(mut self, type_set: TypeSetDefinition) -> Self {
        self.type_sets.get_or_insert_with(Vec::new).push(type_set);
        self
    }

    pub fn sort(mut self, sort: Vec<SortField>) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn build(self) -> Result<SearchIndexDefinition> {
        for (field, value) in [
            ("analyzer", &self.analyzer),
            ("searchAnalyzer", &self.search_analyzer),
        ] {
            if value.as_deref() == Some("") {
                return Err(Error::InvalidDefinition(format!("{field} cannot be empty")));
            }
        }
        ensure_unique("analyzers", self.analyzers.iter().map(|a| a.name.as_str()))?;
        ensure_unique("synonyms", self.synonyms.iter().map(|s| s.name.as_str()))?;

        let type_set_list = match self.type_sets {
            Some(list) if list.is_empty() => {
                return Err(Error::InvalidDefinition(
                    "typeSets cannot be empty".to_string(),
                ))
            }
            Some(list) => list,
            None => Vec::new(),
        };
        ensure_unique("typeSets", type_set_list.iter().map(TypeSetDefinition::name))?;
        let type_set_order: Vec<String> =
            type_set_list.iter().map(|t| t.name().to_string()).collect();
        let type_sets: BTreeMap<String, TypeSetDefinition> = type_set_list
            .into_iter()
            .map(|t| (t.name().to_string(), t))
            .collect();

        validate_type_set_references(&self.mappings, &type_sets)?;
        if let Some(sort) = &self.sort {
            validate_sort(sort, &self.mappings)?;
        }

        let index_feature_version = if self.index_feature_version > CURRENT_FEATURE_VERSION {
            warn!(
                index_id = %self.metadata.index_id(),
                declared = self.index_feature_version,
                current = CURRENT_FEATURE_VERSION,
                "indexFeatureVersion is higher than the current feature version"
            );
            CURRENT_FEATURE_VERSION
        } else {
            self.index_feature_version
        };

        let definition = SearchIndexDefinition {
            metadata: self.metadata,
            mappings: self.mappings,
            analyzer: self.analyzer,
            search_analyzer: self.search_analyzer,
            analyzers: self.analyzers,
            index_feature_version,
            synonyms: self.synonyms,
            stored_source: self.stored_source,
            type_sets,
            type_set_order,
            sort: self.sort,
        };
        debug!(
            index = %definition,
            static_fields = definition.static_fields().len(),
            layers = definition.num_embedded_documents_layers(),
            "Built search index definition"
        );
        Ok(definition)
    }
}

fn ensure_unique<'a>(field: &str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(Error::InvalidDefinition(format!(
                "{field} must have unique names, \"{name}\" is repeated"
            )));
        }
    }
    Ok(())
}

fn type_set_names(field: &FieldDefinition) -> impl Iterator<Item = &str> + '_ {
    let document = field.document().and_then(|d| d.dynamic().type_set_name());
    let embedded = field
        .embedded_documents()
        .and_then(|e| e.dynamic().type_set_name());
    document.into_iter().chain(embedded)
}

fn validate_type_set_references(
    mappings: &DocumentFieldDefinition,
    type_sets: &BTreeMap<String, TypeSetDefinition>,
) -> Result<()> {
    let hierarchy = mappings.hierarchy();
    let referenced: BTreeSet<&str> = mappings
        .dynamic()
        .type_set_name()
        .into_iter()
        .chain(hierarchy.root_fields().values().flat_map(type_set_names))
        .chain(
            hierarchy
                .fields_by_embedded_root()
                .values()
                .flat_map(|fields| fields.values())
                .flat_map(type_set_names),
        )
        .collect();

    let unknown: Vec<String> = referenced
        .into_iter()
        .filter(|name| !type_sets.contains_key(*name))
        .map(str::to_owned)
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(Error::UnknownTypeSets(unknown))
    }
}

fn validate_sort(sort: &[SortField], mappings: &DocumentFieldDefinition) -> Result<()> {
    let mut seen = BTreeSet::new();
    for field in sort {
        if !seen.insert(&field.path) {
            return Err(Error::InvalidDefinition(format!(
                "sort field \"{}\" is specified more than once",
                field.path
            )));
        }

        let Some(definition) = mappings.hierarchy().root_fields().get(&field.path) else {
            return Err(Error::InvalidDefinition(format!(
                "sort field \"{}\" must be statically defined outside of embeddedDocuments",
                field.path
            )));
        };
        if !definition.kinds().any(FieldTypeKind::is_indexing_sortable) {
            return Err(Error::InvalidDefinition(format!(
                "sort field \"{}\" must be indexed as one of {:?}",
                field.path,
                FieldTypeKind::INDEXING_SORTABLE.map(FieldTypeKind::name)
            )));
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchIndexDocumentRef<'a> {
    #[serde(flatten)]
    metadata: &'a IndexMetadata,
    mappings: &'a DocumentFieldDefinition,
    #[serde(skip_serializing_if = "Option::is_none")]
    analyzer: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_analyzer: Option<&'a str>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    analyzers: &'a [CustomAnalyzerDefinition],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    synonyms: &'a [SynonymMappingDefinition],
    index_feature_version: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stored_source: Option<&'a StoredSourceDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    type_sets: Vec<&'a TypeSetDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<&'a [SortField]>,
}

impl Serialize for SearchIndexDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        SearchIndexDocumentRef {
            metadata: &self.metadata,
            mappings: &self.mappings,
            analyzer: self.analyzer(),
            search_analyzer: self.search_analyzer(),
            analyzers: &self.analyzers,
            synonyms: &self.synonyms,
            index_feature_version: self.index_feature_version,
            stored_source: self.stored_source.as_ref(),
            type_sets: self.type_sets().collect(),
            sort: self.sort(),
        }
        .serialize(serializer)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchIndexDocument {
    #[serde(flatten)]
    metadata: IndexMetadata,
    mappings: DocumentFieldDefinition,
    #[serde(default)]
    analyzer: Option<String>,
    #[serde(default)]
    search_analyzer: Option<String>,
    #[serde(default)]
    analyzers: Vec<CustomAnalyzerDefinition>,
    #[serde(default)]
    index_feature_version: i32,
    #[serde(default)]
    synonyms: Vec<SynonymMappingDefinition>,
    #[serde(default)]
    stored_source: Option<StoredSourceDefinition>,
    #[serde(default)]
    type_sets: Option<Vec<TypeSetDefinition>>,
    #[serde(default)]
    sort: Option<Vec<SortField>>,
}

impl<'de> Deserialize<'de> for SearchIndexDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let document = SearchIndexDocument::deserialize(deserializer)?;
        SearchIndexDefinitionBuilder {
            metadata: document.metadata,
            mappings: document.mappings,
            analyzer: document.analyzer,
            search_analyzer: document.search_analyzer,
            analyzers: document.analyzers,
            index_feature_version: document.index_feature_version,
            synonyms: document.synonyms,
            stored_source: document.stored_source,
            type_sets: document.type_sets,
            sort: document.sort,
        }
        .build()
        .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(extra: Value) -> Result<SearchIndexDefinition> {
        let mut document = json!({
            "indexID": "507f191e810c19729de860ea",
            "name": "index",
            "database": "database",
            "lastObservedCollectionName": "collection",
            "collectionUUID": "eb6c40ca-f25e-47e8-b48c-02a05b64a5aa",
            "mappings": {"dynamic": true}
        });
        if let (Some(target), Value::Object(extra)) = (document.as_object_mut(), extra) {
            target.extend(extra);
        }
        strata_core::codec::from_document(document)
    }

    #[test]
    fn test_simple_definition_and_unknown_top_level_fields() {
        let index = definition(json!({"createdDate": "yesterday"})).unwrap();
        assert_eq!(index.metadata().name(), "index");
        assert!(index.mappings().dynamic().is_enabled());
        assert_eq!(index.index_feature_version(), 0);
        assert_eq!(index.stored_source(), StoredSourceDefinition::exclude_all());
        assert!(!index.has_embedded_fields());

        let encoded = serde_json::to_value(&index).unwrap();
        assert!(encoded.get("createdDate").is_none());
        assert_eq!(encoded["mappings"], json!({"dynamic": true, "fields": {}}));
        let decoded: SearchIndexDefinition = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, index);
    }

    #[test]
    fn test_feature_version_is_clamped() {
        let index = definition(json!({"indexFeatureVersion": CURRENT_FEATURE_VERSION + 3})).unwrap();
        assert_eq!(index.index_feature_version(), CURRENT_FEATURE_VERSION);
    }

    #[test]
    fn test_unknown_type_set_references() {
        let err = definition(json!({
            "mappings": {
                "dynamic": {"typeSet": "missing"},
                "fields": {
                    "a": {"type": "embeddedDocuments", "dynamic": {"typeSet": "alsoMissing"}},
                    "b": {"type": "document", "dynamic": {"typeSet": "present"}}
                }
            },
            "typeSets": [{"name": "present", "types": [{"type": "token"}]}]
        }))
        .unwrap_err();
        match err {
            Error::Decode(inner) => assert!(inner
                .to_string()
                .contains("Invalid typeSets defined in index definition: [\"alsoMissing\", \"missing\"]")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_type_set_reference_inside_embedded_root() {
        let err = definition(json!({
            "mappings": {
                "fields": {
                    "a": {"type": "embeddedDocuments", "fields": {
                        "b": {"type": "document", "dynamic": {"typeSet": "ghost"}}
                    }}
                }
            }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_empty_and_duplicate_type_sets() {
        assert!(definition(json!({"typeSets": []})).is_err());
        let duplicate = json!({"typeSets": [
            {"name": "t", "types": [{"type": "token"}]},
            {"name": "t", "types": [{"type": "date"}]}
        ]});
        assert!(definition(duplicate).unwrap_err().to_string().contains("unique names"));
    }

    #[test]
    fn test_sort_validation() {
        let mappings = json!({
            "dynamic": false,
            "fields": {
                "a": {"type": "token"},
                "b": {"type": "number"},
                "s": {"type": "string"},
                "e": [
                    {"type": "document", "fields": {"f": {"type": "token"}}},
                    {"type": "embeddedDocuments", "fields": {"g": {"type": "token"}}}
                ]
            }
        });
        let valid = definition(json!({
            "mappings": mappings,
            "sort": [
                {"path": "a", "order": 1},
                {"path": "b", "order": -1, "nullEmptySortPosition": "highest"},
                {"path": "e.f", "order": 1}
            ]
        }))
        .unwrap();
        assert_eq!(valid.sort().map(<[_]>::len), Some(3));

        for (sort, message) in [
            (json!([{"path": "s", "order": 1}]), "must be indexed as one of"),
            (json!([{"path": "e.g", "order": 1}]), "statically defined"),
            (json!([{"path": "zzz", "order": 1}]), "statically defined"),
            (json!([{"path": "a", "order": 1}, {"path": "a", "order": -1}]), "more than once"),
            (json!([{"path": "a", "order": 2}]), "sort order must be 1 or -1"),
        ] {
            let err = definition(json!({"mappings": mappings, "sort": sort})).unwrap_err();
            assert!(err.to_string().contains(message), "{err}");
        }
    }

    #[test]
    fn test_non_stock_analyzer_names() {
        let index = definition(json!({
            "analyzer": "lucene.standard",
            "searchAnalyzer": "custom.search",
            "analyzers": [{"name": "custom.search", "tokenizer": {"type": "standard"}}],
            "mappings": {
                "fields": {
                    "title": {"type": "string", "analyzer": "title.analyzer",
                              "multi": {"fr": {"analyzer": "lucene.french"}, "x": {"analyzer": "multi.analyzer"}}},
                    "nested": {"type": "embeddedDocuments", "fields": {
                        "name": {"type": "autocomplete", "analyzer": "embedded.autocomplete"}
                    }}
                }
            },
            "synonyms": [{"name": "syn", "analyzer": "synonym.analyzer", "source": {"collection": "s"}}],
            "typeSets": [{"name": "t", "types": [{"type": "string", "searchAnalyzer": "typeset.analyzer"}]}]
        }))
        .unwrap();

        let names = index.non_stock_analyzer_names(&AnalyzerCatalog::default());
        let expected: BTreeSet<String> = [
            "custom.search",
            "embedded.autocomplete",
            "multi.analyzer",
            "synonym.analyzer",
            "title.analyzer",
            "typeset.analyzer",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(names, expected);
        assert_eq!(index.analyzer_or_default(&AnalyzerCatalog::default()), "lucene.standard");
        assert!(index.analyzer_map().contains_key("custom.search"));
        assert!(index.synonym_map().contains_key("syn"));
    }

    #[test]
    fn test_static_field_queries() {
        let index = definition(json!({
            "mappings": {
                "fields": {
                    "tags": {"type": "stringFacet"},
                    "meta": {"type": "document", "fields": {"score": {"type": "number"}}},
                    "items": {"type": "embeddedDocuments", "fields": {"price": {"type": "number"}}}
                }
            }
        }))
        .unwrap();

        assert!(index.is_string_facets_field_indexed());
        let numbers = index.static_field_definitions_of_kind(FieldTypeKind::Number);
        assert_eq!(numbers.len(), 1);
        assert_eq!(numbers[0].0.to_string(), "meta.score");
        assert!(index.is_indexed_as_embedded_documents_field(&FieldPath::parse("items").unwrap()));
        assert!(!index.is_indexed_as_embedded_documents_field(&FieldPath::parse("meta").unwrap()));
        assert_eq!(index.num_embedded_documents_layers(), 1);
    }

    #[test]
    fn test_with_updated_view() {
        let index = definition(json!({})).unwrap();
        let viewed = index.with_updated_view(ViewDefinition::new("v", vec![]));
        assert_eq!(viewed.metadata().view().map(|v| v.name.as_str()), Some("v"));
        assert!(index.metadata().view().is_none());
        assert_ne!(viewed, index);
        assert!(viewed.to_string().contains("view 'v'"));
    }
}
