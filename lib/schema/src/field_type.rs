//! Field type variants
//!
//! Every indexable type a field can be declared as, with the options each type takes.
//! A variant is encoded as a document whose `type` key names the kind:
//!
//! ```json
//! {"type": "autocomplete", "minGrams": 3, "maxGrams": 10}
//! ```

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use strata_core::{Error, IndexFormatVersion, Result};

use crate::document::{DocumentFieldDefinition, EmbeddedDocumentsFieldDefinition};
use crate::vector_spec::{VectorFieldSpecification, VectorSimilarity, MAX_DIMENSIONS};

/// Discriminant of a [`FieldTypeDefinition`], in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldTypeKind {
    Autocomplete,
    Boolean,
    Date,
    DateFacet,
    Document,
    EmbeddedDocuments,
    Geo,
    KnnVector,
    Number,
    NumberFacet,
    ObjectId,
    SortableDateBetaV1,
    SortableNumberBetaV1,
    SortableStringBetaV1,
    String,
    StringFacet,
    Token,
    Uuid,
    Vector,
}

impl FieldTypeKind {
    pub const ALL: [FieldTypeKind; 19] = [
        FieldTypeKind::Autocomplete,
        FieldTypeKind::Boolean,
        FieldTypeKind::Date,
        FieldTypeKind::DateFacet,
        FieldTypeKind::Document,
        FieldTypeKind::EmbeddedDocuments,
        FieldTypeKind::Geo,
        FieldTypeKind::KnnVector,
        FieldTypeKind::Number,
        FieldTypeKind::NumberFacet,
        FieldTypeKind::ObjectId,
        FieldTypeKind::SortableDateBetaV1,
        FieldTypeKind::SortableNumberBetaV1,
        FieldTypeKind::SortableStringBetaV1,
        FieldTypeKind::String,
        FieldTypeKind::StringFacet,
        FieldTypeKind::Token,
        FieldTypeKind::Uuid,
        FieldTypeKind::Vector,
    ];

    /// Kinds that may back an index sort.
    pub const INDEXING_SORTABLE: [FieldTypeKind; 6] = [
        FieldTypeKind::Boolean,
        FieldTypeKind::Date,
        FieldTypeKind::Number,
        FieldTypeKind::ObjectId,
        FieldTypeKind::Token,
        FieldTypeKind::Uuid,
    ];

    /// The canonical `type` tag.
    pub fn name(self) -> &'static str {
        match self {
            FieldTypeKind::Autocomplete => "autocomplete",
            FieldTypeKind::Boolean => "boolean",
            FieldTypeKind::Date => "date",
            FieldTypeKind::DateFacet => "dateFacet",
            FieldTypeKind::Document => "document",
            FieldTypeKind::EmbeddedDocuments => "embeddedDocuments",
            FieldTypeKind::Geo => "geo",
            FieldTypeKind::KnnVector => "knnVector",
            FieldTypeKind::Number => "number",
            FieldTypeKind::NumberFacet => "numberFacet",
            FieldTypeKind::ObjectId => "objectId",
            FieldTypeKind::SortableDateBetaV1 => "sortableDateBetaV1",
            FieldTypeKind::SortableNumberBetaV1 => "sortableNumberBetaV1",
            FieldTypeKind::SortableStringBetaV1 => "sortableStringBetaV1",
            FieldTypeKind::String => "string",
            FieldTypeKind::StringFacet => "stringFacet",
            FieldTypeKind::Token => "token",
            FieldTypeKind::Uuid => "uuid",
            FieldTypeKind::Vector => "vector",
        }
    }

    pub fn is_container(self) -> bool {
        matches!(
            self,
            FieldTypeKind::Document | FieldTypeKind::EmbeddedDocuments
        )
    }

    pub fn is_indexing_sortable(self) -> bool {
        Self::INDEXING_SORTABLE.contains(&self)
    }

    /// Oldest index format that indexes this kind dynamically.
    pub fn min_format_version(self) -> IndexFormatVersion {
        match self {
            FieldTypeKind::Boolean | FieldTypeKind::ObjectId => IndexFormatVersion::FIVE,
            _ => IndexFormatVersion::MIN_SUPPORTED,
        }
    }

    pub fn is_supported_by(self, version: IndexFormatVersion) -> bool {
        version >= self.min_format_version()
    }
}

impl fmt::Display for FieldTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutocompleteTokenization {
    #[default]
    EdgeGram,
    NGram,
    RightEdgeGram,
}

pub const DEFAULT_AUTOCOMPLETE_ANALYZER: &str = "lucene.standard";

/// Options of an `autocomplete` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawAutocomplete")]
pub struct AutocompleteFieldDefinition {
    tokenization: AutocompleteTokenization,
    min_grams: u32,
    max_grams: u32,
    fold_diacritics: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    analyzer: Option<String>,
}

impl Default for AutocompleteFieldDefinition {
    fn default() -> Self {
        Self {
            tokenization: AutocompleteTokenization::default(),
            min_grams: 2,
            max_grams: 15,
            fold_diacritics: true,
            analyzer: None,
        }
    }
}

impl AutocompleteFieldDefinition {
    pub fn new(
        tokenization: AutocompleteTokenization,
        min_grams: u32,
        max_grams: u32,
        fold_diacritics: bool,
        analyzer: Option<String>,
    ) -> Result<Self> {
        if min_grams < 1 {
            return Err(Error::InvalidDefinition(
                "autocomplete minGrams must be at least 1".to_string(),
            ));
        }
        if min_grams > max_grams {
            return Err(Error::InvalidDefinition(format!(
                "autocomplete minGrams ({min_grams}) cannot be greater than maxGrams ({max_grams})"
            )));
        }
        Ok(Self {
            tokenization,
            min_grams,
            max_grams,
            fold_diacritics,
            analyzer,
        })
    }

    pub fn tokenization(&self) -> AutocompleteTokenization {
        self.tokenization
    }

    pub fn min_grams(&self) -> u32 {
        self.min_grams
    }

    pub fn max_grams(&self) -> u32 {
        self.max_grams
    }

    pub fn fold_diacritics(&self) -> bool {
        self.fold_diacritics
    }

    /// The analyzer as declared, if any.
    pub fn analyzer(&self) -> Option<&str> {
        self.analyzer.as_deref()
    }

    pub fn effective_analyzer(&self) -> &str {
        self.analyzer().unwrap_or(DEFAULT_AUTOCOMPLETE_ANALYZER)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawAutocomplete {
    #[serde(default)]
    tokenization: AutocompleteTokenization,
    #[serde(default = "default_min_grams")]
    min_grams: u32,
    #[serde(default = "default_max_grams")]
    max_grams: u32,
    #[serde(default = "default_true")]
    fold_diacritics: bool,
    #[serde(default)]
    analyzer: Option<String>,
}

fn default_min_grams() -> u32 {
    2
}

fn default_max_grams() -> u32 {
    15
}

fn default_true() -> bool {
    true
}

impl TryFrom<RawAutocomplete> for AutocompleteFieldDefinition {
    type Error = Error;

    fn try_from(raw: RawAutocomplete) -> Result<Self> {
        Self::new(
            raw.tokenization,
            raw.min_grams,
            raw.max_grams,
            raw.fold_diacritics,
            raw.analyzer,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GeoFieldDefinition {
    #[serde(default)]
    pub index_shapes: bool,
}

/// Legacy vector declaration: dimensions plus similarity, indexed with default parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "RawKnnVector", try_from = "RawKnnVector")]
pub struct KnnVectorFieldDefinition {
    specification: VectorFieldSpecification,
}

impl KnnVectorFieldDefinition {
    pub fn new(dimensions: u32, similarity: VectorSimilarity) -> Result<Self> {
        if !(1..=MAX_DIMENSIONS).contains(&dimensions) {
            return Err(Error::InvalidDefinition(format!(
                "knnVector dimensions must be between 1 and {MAX_DIMENSIONS}, got {dimensions}"
            )));
        }
        Ok(Self {
            specification: VectorFieldSpecification::with_defaults(dimensions, similarity)?,
        })
    }

    pub fn dimensions(&self) -> u32 {
        self.specification.num_dimensions()
    }

    pub fn similarity(&self) -> VectorSimilarity {
        self.specification.similarity()
    }

    pub fn specification(&self) -> &VectorFieldSpecification {
        &self.specification
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawKnnVector {
    dimensions: u32,
    similarity: VectorSimilarity,
}

impl From<KnnVectorFieldDefinition> for RawKnnVector {
    fn from(definition: KnnVectorFieldDefinition) -> Self {
        Self {
            dimensions: definition.dimensions(),
            similarity: definition.similarity(),
        }
    }
}

impl TryFrom<RawKnnVector> for KnnVectorFieldDefinition {
    type Error = Error;

    fn try_from(raw: RawKnnVector) -> Result<Self> {
        Self::new(raw.dimensions, raw.similarity)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumericRepresentation {
    #[default]
    Double,
    Int64,
}

/// Options shared by `number` and `numberFacet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NumericFieldOptions {
    #[serde(default)]
    pub representation: NumericRepresentation,
    #[serde(default = "default_true")]
    pub index_integers: bool,
    #[serde(default = "default_true")]
    pub index_doubles: bool,
}

impl Default for NumericFieldOptions {
    fn default() -> Self {
        Self {
            representation: NumericRepresentation::Double,
            index_integers: true,
            index_doubles: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndexOptions {
    Docs,
    Freqs,
    Positions,
    #[default]
    Offsets,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NormsOptions {
    #[default]
    Include,
    Omit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SimilarityType {
    Bm25,
    Boolean,
    StableTfl,
}

/// Scoring similarity of a string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimilarityDefinition {
    #[serde(rename = "type")]
    pub similarity_type: SimilarityType,
}

/// Options of a `string` field. `multi` names alternate analyses of the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawString")]
pub struct StringFieldDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    analyzer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_analyzer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_above: Option<u32>,
    index_options: IndexOptions,
    store: bool,
    norms: NormsOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity: Option<SimilarityDefinition>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    multi: BTreeMap<String, StringFieldDefinition>,
}

impl Default for StringFieldDefinition {
    fn default() -> Self {
        Self {
            analyzer: None,
            search_analyzer: None,
            ignore_above: None,
            index_options: IndexOptions::default(),
            store: true,
            norms: NormsOptions::default(),
            similarity: None,
            multi: BTreeMap::new(),
        }
    }
}

impl StringFieldDefinition {
    pub fn builder() -> StringFieldDefinitionBuilder {
        StringFieldDefinitionBuilder::default()
    }

    pub fn analyzer(&self) -> Option<&str> {
        self.analyzer.as_deref()
    }

    pub fn search_analyzer(&self) -> Option<&str> {
        self.search_analyzer.as_deref()
    }

    pub fn ignore_above(&self) -> Option<u32> {
        self.ignore_above
    }

    pub fn index_options(&self) -> IndexOptions {
        self.index_options
    }

    pub fn store(&self) -> bool {
        self.store
    }

    pub fn norms(&self) -> NormsOptions {
        self.norms
    }

    pub fn similarity(&self) -> Option<SimilarityDefinition> {
        self.similarity
    }

    pub fn multi(&self) -> &BTreeMap<String, StringFieldDefinition> {
        &self.multi
    }

    /// Analyzer names declared here and in every multi.
    pub fn analyzer_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.analyzer()
            .into_iter()
            .chain(self.search_analyzer())
            .chain(self.multi.values().flat_map(|multi| {
                multi.analyzer().into_iter().chain(multi.search_analyzer())
            }))
    }
}

#[derive(Debug, Clone, Default)]
pub struct StringFieldDefinitionBuilder {
    inner: StringFieldDefinition,
}

impl StringFieldDefinitionBuilder {
    pub fn analyzer(mut self, name: impl Into<String>) -> Self {
        self.inner.analyzer = Some(name.into());
        self
    }

    pub fn search_analyzer(mut self, name: impl Into<String>) -> Self {
        self.inner.search_analyzer = Some(name.into());
        self
    }

    pub fn ignore_above(mut self, limit: u32) -> Self {
        self.inner.ignore_above = Some(limit);
        self
    }

    pub fn index_options(mut self, options: IndexOptions) -> Self {
        self.inner.index_options = options;
        self
    }

    pub fn store(mut self, store: bool) -> Self {
        self.inner.store = store;
        self
    }

    pub fn norms(mut self, norms: NormsOptions) -> Self {
        self.inner.norms = norms;
        self
    }

    pub fn similarity(mut self, similarity_type: SimilarityType) -> Self {
        self.inner.similarity = Some(SimilarityDefinition { similarity_type });
        self
    }

    pub fn multi(mut self, name: impl Into<String>, definition: StringFieldDefinition) -> Self {
        self.inner.multi.insert(name.into(), definition);
        self
    }

    pub fn build(self) -> Result<StringFieldDefinition> {
        if let Some((name, _)) = self.inner.multi.iter().find(|(_, m)| !m.multi.is_empty()) {
            return Err(Error::InvalidDefinition(format!(
                "multi \"{name}\" cannot define nested multi definitions"
            )));
        }
        Ok(self.inner)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawString {
    #[serde(default)]
    analyzer: Option<String>,
    #[serde(default)]
    search_analyzer: Option<String>,
    #[serde(default)]
    ignore_above: Option<u32>,
    #[serde(default)]
    index_options: IndexOptions,
    #[serde(default = "default_true")]
    store: bool,
    #[serde(default)]
    norms: NormsOptions,
    #[serde(default)]
    similarity: Option<SimilarityDefinition>,
    #[serde(default)]
    multi: BTreeMap<String, StringFieldDefinition>,
}

impl TryFrom<RawString> for StringFieldDefinition {
    type Error = Error;

    fn try_from(raw: RawString) -> Result<Self> {
        StringFieldDefinitionBuilder {
            inner: StringFieldDefinition {
                analyzer: raw.analyzer,
                search_analyzer: raw.search_analyzer,
                ignore_above: raw.ignore_above,
                index_options: raw.index_options,
                store: raw.store,
                norms: raw.norms,
                similarity: raw.similarity,
                multi: raw.multi,
            },
        }
        .build()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenNormalizer {
    #[default]
    None,
    Lowercase,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TokenFieldDefinition {
    #[serde(default)]
    pub normalizer: TokenNormalizer,
}

/// One typed way of indexing a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldTypeDefinition {
    Autocomplete(AutocompleteFieldDefinition),
    Boolean,
    Date,
    DateFacet,
    Document(Arc<DocumentFieldDefinition>),
    EmbeddedDocuments(Arc<EmbeddedDocumentsFieldDefinition>),
    Geo(GeoFieldDefinition),
    KnnVector(KnnVectorFieldDefinition),
    Number(NumericFieldOptions),
    NumberFacet(NumericFieldOptions),
    ObjectId,
    SortableDateBetaV1,
    SortableNumberBetaV1,
    SortableStringBetaV1,
    String(StringFieldDefinition),
    StringFacet,
    Token(TokenFieldDefinition),
    Uuid,
    Vector(VectorFieldSpecification),
}

impl FieldTypeDefinition {
    pub fn kind(&self) -> FieldTypeKind {
        match self {
            FieldTypeDefinition::Autocomplete(_) => FieldTypeKind::Autocomplete,
            FieldTypeDefinition::Boolean => FieldTypeKind::Boolean,
            FieldTypeDefinition::Date => FieldTypeKind::Date,
            FieldTypeDefinition::DateFacet => FieldTypeKind::DateFacet,
            FieldTypeDefinition::Document(_) => FieldTypeKind::Document,
            FieldTypeDefinition::EmbeddedDocuments(_) => FieldTypeKind::EmbeddedDocuments,
            FieldTypeDefinition::Geo(_) => FieldTypeKind::Geo,
            FieldTypeDefinition::KnnVector(_) => FieldTypeKind::KnnVector,
            FieldTypeDefinition::Number(_) => FieldTypeKind::Number,
            FieldTypeDefinition::NumberFacet(_) => FieldTypeKind::NumberFacet,
            FieldTypeDefinition::ObjectId => FieldTypeKind::ObjectId,
            FieldTypeDefinition::SortableDateBetaV1 => FieldTypeKind::SortableDateBetaV1,
            FieldTypeDefinition::SortableNumberBetaV1 => FieldTypeKind::SortableNumberBetaV1,
            FieldTypeDefinition::SortableStringBetaV1 => FieldTypeKind::SortableStringBetaV1,
            FieldTypeDefinition::String(_) => FieldTypeKind::String,
            FieldTypeDefinition::StringFacet => FieldTypeKind::StringFacet,
            FieldTypeDefinition::Token(_) => FieldTypeKind::Token,
            FieldTypeDefinition::Uuid => FieldTypeKind::Uuid,
            FieldTypeDefinition::Vector(_) => FieldTypeKind::Vector,
        }
    }

    pub fn document(definition: DocumentFieldDefinition) -> Self {
        FieldTypeDefinition::Document(Arc::new(definition))
    }

    pub fn embedded_documents(definition: EmbeddedDocumentsFieldDefinition) -> Self {
        FieldTypeDefinition::EmbeddedDocuments(Arc::new(definition))
    }
}

impl<'de> Deserialize<'de> for FieldTypeDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut document = Map::deserialize(deserializer)?;
        let kind = match document.remove("type") {
            Some(tag) => FieldTypeKind::deserialize(tag).map_err(de::Error::custom)?,
            None => return Err(de::Error::missing_field("type")),
        };

        let options = Value::Object(document);
        let definition = match kind {
            FieldTypeKind::Autocomplete => FieldTypeDefinition::Autocomplete(parse(options)?),
            FieldTypeKind::Boolean => no_options(kind, options, FieldTypeDefinition::Boolean)?,
            FieldTypeKind::Date => no_options(kind, options, FieldTypeDefinition::Date)?,
            FieldTypeKind::DateFacet => no_options(kind, options, FieldTypeDefinition::DateFacet)?,
            FieldTypeKind::Document => FieldTypeDefinition::Document(parse(options)?),
            FieldTypeKind::EmbeddedDocuments => {
                FieldTypeDefinition::EmbeddedDocuments(parse(options)?)
            }
            FieldTypeKind::Geo => FieldTypeDefinition::Geo(parse(options)?),
            FieldTypeKind::KnnVector => FieldTypeDefinition::KnnVector(parse(options)?),
            FieldTypeKind::Number => FieldTypeDefinition::Number(parse(options)?),
            FieldTypeKind::NumberFacet => FieldTypeDefinition::NumberFacet(parse(options)?),
            FieldTypeKind::ObjectId => no_options(kind, options, FieldTypeDefinition::ObjectId)?,
            FieldTypeKind::SortableDateBetaV1 => {
                no_options(kind, options, FieldTypeDefinition::SortableDateBetaV1)?
            }
            FieldTypeKind::SortableNumberBetaV1 => {
                no_options(kind, options, FieldTypeDefinition::SortableNumberBetaV1)?
            }
            FieldTypeKind::SortableStringBetaV1 => {
                no_options(kind, options, FieldTypeDefinition::SortableStringBetaV1)?
            }
            FieldTypeKind::String => FieldTypeDefinition::String(parse(options)?),
            FieldTypeKind::StringFacet => {
                no_options(kind, options, FieldTypeDefinition::StringFacet)?
            }
            FieldTypeKind::Token => FieldTypeDefinition::Token(parse(options)?),
            FieldTypeKind::Uuid => no_options(kind, options, FieldTypeDefinition::Uuid)?,
            FieldTypeKind::Vector => FieldTypeDefinition::Vector(parse(options)?),
        };
        Ok(definition)
    }
}

fn parse<T: DeserializeOwned, E: de::Error>(options: Value) -> std::result::Result<T, E> {
    serde_json::from_value(options).map_err(E::custom)
}

fn no_options<E: de::Error>(
    kind: FieldTypeKind,
    options: Value,
    definition: FieldTypeDefinition,
) -> std::result::Result<FieldTypeDefinition, E> {
    match options {
        Value::Object(map) if !map.is_empty() => {
            let unknown: Vec<&String> = map.keys().collect();
            Err(E::custom(format!(
                "type \"{kind}\" does not take options, found {unknown:?}"
            )))
        }
        _ => Ok(definition),
    }
}
