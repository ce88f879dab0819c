//! # strata core
//!
//! Building blocks shared by the strata schema crates:
//!
//! - [`FieldPath`] - dotted path to a field inside a document
//! - [`IndexId`] - 12-byte index identifier
//! - [`IndexFormatVersion`] - index format generations and version gating input
//! - [`AnalyzerCatalog`] - explicit analyzer configuration
//! - [`codec`] - the canonical document/byte encoding
//! - [`Error`] - the error type for every strata operation

pub mod codec;
pub mod config;
pub mod error;
pub mod id;
pub mod path;
pub mod version;

pub use config::AnalyzerCatalog;
pub use error::{Error, Result};
pub use id::IndexId;
pub use path::FieldPath;
pub use version::{IndexFormatVersion, CURRENT_FEATURE_VERSION};
