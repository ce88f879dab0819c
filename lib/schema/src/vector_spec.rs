//! Vector field parameters shared by search mappings and vector indexes.

use serde::{Deserialize, Serialize};
use strata_core::{Error, Result};

pub const MAX_DIMENSIONS: u32 = 8192;

const DEFAULT_MAX_EDGES: u32 = 16;
const MAXIMUM_MAX_EDGES: u32 = 64;
const DEFAULT_NUM_EDGE_CANDIDATES: u32 = 100;
const MAXIMUM_NUM_EDGE_CANDIDATES: u32 = 3200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VectorSimilarity {
    Euclidean,
    Cosine,
    DotProduct,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VectorQuantization {
    #[default]
    None,
    Scalar,
    Binary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlgorithmType {
    #[default]
    Hnsw,
    Flat,
}

/// Graph construction parameters for HNSW indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    deny_unknown_fields,
    try_from = "RawHnswOptions"
)]
pub struct HnswOptions {
    #[serde(skip_serializing_if = "is_default_max_edges")]
    max_edges: u32,
    #[serde(skip_serializing_if = "is_default_num_edge_candidates")]
    num_edge_candidates: u32,
}

fn is_default_max_edges(value: &u32) -> bool {
    *value == DEFAULT_MAX_EDGES
}

fn is_default_num_edge_candidates(value: &u32) -> bool {
    *value == DEFAULT_NUM_EDGE_CANDIDATES
}

impl Default for HnswOptions {
    fn default() -> Self {
        Self {
            max_edges: DEFAULT_MAX_EDGES,
            num_edge_candidates: DEFAULT_NUM_EDGE_CANDIDATES,
        }
    }
}

impl HnswOptions {
    pub fn new(max_edges: u32, num_edge_candidates: u32) -> Result<Self> {
        if !(DEFAULT_MAX_EDGES..=MAXIMUM_MAX_EDGES).contains(&max_edges) {
            return Err(Error::InvalidDefinition(format!(
                "maxEdges must be between {DEFAULT_MAX_EDGES} and {MAXIMUM_MAX_EDGES}, got {max_edges}"
            )));
        }
        if !(DEFAULT_NUM_EDGE_CANDIDATES..=MAXIMUM_NUM_EDGE_CANDIDATES).contains(&num_edge_candidates)
        {
            return Err(Error::InvalidDefinition(format!(
                "numEdgeCandidates must be between {DEFAULT_NUM_EDGE_CANDIDATES} and \
                 {MAXIMUM_NUM_EDGE_CANDIDATES}, got {num_edge_candidates}"
            )));
        }
        Ok(Self {
            max_edges,
            num_edge_candidates,
        })
    }

    pub fn max_edges(&self) -> u32 {
        self.max_edges
    }

    pub fn num_edge_candidates(&self) -> u32 {
        self.num_edge_candidates
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawHnswOptions {
    #[serde(default = "default_max_edges")]
    max_edges: u32,
    #[serde(default = "default_num_edge_candidates")]
    num_edge_candidates: u32,
}

fn default_max_edges() -> u32 {
    DEFAULT_MAX_EDGES
}

fn default_num_edge_candidates() -> u32 {
    DEFAULT_NUM_EDGE_CANDIDATES
}

impl TryFrom<RawHnswOptions> for HnswOptions {
    type Error = Error;

    fn try_from(raw: RawHnswOptions) -> Result<Self> {
        HnswOptions::new(raw.max_edges, raw.num_edge_candidates)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorIndexingAlgorithm {
    Hnsw(HnswOptions),
    Flat,
}

impl Default for VectorIndexingAlgorithm {
    fn default() -> Self {
        VectorIndexingAlgorithm::Hnsw(HnswOptions::default())
    }
}

impl VectorIndexingAlgorithm {
    pub fn algorithm_type(&self) -> AlgorithmType {
        match self {
            VectorIndexingAlgorithm::Hnsw(_) => AlgorithmType::Hnsw,
            VectorIndexingAlgorithm::Flat => AlgorithmType::Flat,
        }
    }
}

/// Dimensions, similarity and storage parameters of one indexed vector field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "VectorSpecificationDocument", try_from = "VectorSpecificationDocument")]
pub struct VectorFieldSpecification {
    num_dimensions: u32,
    similarity: VectorSimilarity,
    quantization: VectorQuantization,
    indexing_algorithm: VectorIndexingAlgorithm,
}

impl VectorFieldSpecification {
    pub fn new(
        num_dimensions: u32,
        similarity: VectorSimilarity,
        quantization: VectorQuantization,
        indexing_algorithm: VectorIndexingAlgorithm,
    ) -> Result<Self> {
        if !(1..=MAX_DIMENSIONS).contains(&num_dimensions) {
            return Err(Error::InvalidDefinition(format!(
                "numDimensions must be between 1 and {MAX_DIMENSIONS}, got {num_dimensions}"
            )));
        }
        if quantization == VectorQuantization::Binary && num_dimensions % 8 != 0 {
            return Err(Error::InvalidDefinition(format!(
                "numDimensions {num_dimensions} must be a multiple of 8 for binary quantization"
            )));
        }

        Ok(Self {
            num_dimensions,
            similarity,
            quantization,
            indexing_algorithm,
        })
    }

    /// Unquantized HNSW with default graph parameters.
    pub fn with_defaults(num_dimensions: u32, similarity: VectorSimilarity) -> Result<Self> {
        Self::new(
            num_dimensions,
            similarity,
            VectorQuantization::None,
            VectorIndexingAlgorithm::default(),
        )
    }

    /// Build from the options as they appear in a definition document.
    pub fn from_options(
        num_dimensions: u32,
        similarity: VectorSimilarity,
        quantization: VectorQuantization,
        algorithm: AlgorithmType,
        hnsw_options: Option<HnswOptions>,
    ) -> Result<Self> {
        let indexing_algorithm = match (algorithm, hnsw_options) {
            (AlgorithmType::Flat, Some(_)) => {
                return Err(Error::InvalidDefinition(
                    "hnswOptions is only supported with \"indexingAlgorithm: hnsw\".".to_string(),
                ))
            }
            (AlgorithmType::Flat, None) => VectorIndexingAlgorithm::Flat,
            (AlgorithmType::Hnsw, options) => {
                VectorIndexingAlgorithm::Hnsw(options.unwrap_or_default())
            }
        };
        Self::new(num_dimensions, similarity, quantization, indexing_algorithm)
    }

    pub fn num_dimensions(&self) -> u32 {
        self.num_dimensions
    }

    pub fn similarity(&self) -> VectorSimilarity {
        self.similarity
    }

    pub fn quantization(&self) -> VectorQuantization {
        self.quantization
    }

    pub fn indexing_algorithm(&self) -> VectorIndexingAlgorithm {
        self.indexing_algorithm
    }

    /// HNSW options when they differ from the defaults.
    pub fn non_default_hnsw_options(&self) -> Option<HnswOptions> {
        match self.indexing_algorithm {
            VectorIndexingAlgorithm::Hnsw(options) if options != HnswOptions::default() => {
                Some(options)
            }
            _ => None,
        }
    }
}

/// Document form of [`VectorFieldSpecification`]; defaults are omitted when encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VectorSpecificationDocument {
    pub num_dimensions: u32,
    #[serde(default, skip_serializing_if = "is_default_algorithm")]
    pub indexing_algorithm: AlgorithmType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hnsw_options: Option<HnswOptions>,
    pub similarity: VectorSimilarity,
    #[serde(default, skip_serializing_if = "is_default_quantization")]
    pub quantization: VectorQuantization,
}

fn is_default_algorithm(value: &AlgorithmType) -> bool {
    *value == AlgorithmType::default()
}

fn is_default_quantization(value: &VectorQuantization) -> bool {
    *value == VectorQuantization::default()
}

impl From<VectorFieldSpecification> for VectorSpecificationDocument {
    fn from(spec: VectorFieldSpecification) -> Self {
        Self {
            num_dimensions: spec.num_dimensions,
            indexing_algorithm: spec.indexing_algorithm.algorithm_type(),
            hnsw_options: spec.non_default_hnsw_options(),
            similarity: spec.similarity,
            quantization: spec.quantization,
        }
    }
}

impl TryFrom<VectorSpecificationDocument> for VectorFieldSpecification {
    type Error = Error;

    fn try_from(doc: VectorSpecificationDocument) -> Result<Self> {
        VectorFieldSpecification::from_options(
            doc.num_dimensions,
            doc.similarity,
            doc.quantization,
            doc.indexing_algorithm,
            doc.hnsw_options,
        )
    }
}
