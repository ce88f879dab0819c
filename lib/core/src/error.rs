use thiserror::Error;

use crate::FieldPath;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    #[error("cannot define multiple embeddedDocuments fields at sub-paths {0}")]
    EmbeddedRootClash(FieldPath),

    #[error("cannot define fields of type {type_name} inside an embeddedDocuments field (field \"{path}\")")]
    DisallowedEmbeddedType { type_name: &'static str, path: FieldPath },

    #[error("Duplicate vector field path: {0}")]
    DuplicateVectorField(FieldPath),

    #[error("Invalid typeSets defined in index definition: {0:?}")]
    UnknownTypeSets(Vec<String>),

    #[error("Invalid field path: {0}")]
    InvalidPath(String),

    #[error("Stored source is in {actual} mode, expected {expected} mode")]
    StoredSourceMode {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl Error {
    /// True for the structural errors raised while building embeddedDocuments hierarchies.
    pub fn is_illegal_embedded_field(&self) -> bool {
        matches!(
            self,
            Error::EmbeddedRootClash(_) | Error::DisallowedEmbeddedType { .. }
        )
    }
}
