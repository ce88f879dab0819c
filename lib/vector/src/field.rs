//! Fields of a vector index.
//!
//! ```json
//! [
//!   {"type": "vector", "path": "plot_embedding", "numDimensions": 1536, "similarity": "cosine"},
//!   {"type": "filter", "path": "genre"},
//!   {"type": "autoEmbed", "path": "plot", "model": "voyage-3-large"}
//! ]
//! ```

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use strata_core::FieldPath;
use strata_schema::VectorFieldSpecification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VectorIndexFieldType {
    Vector,
    Filter,
    Text,
    AutoEmbed,
}

impl VectorIndexFieldType {
    pub fn name(self) -> &'static str {
        match self {
            VectorIndexFieldType::Vector => "vector",
            VectorIndexFieldType::Filter => "filter",
            VectorIndexFieldType::Text => "text",
            VectorIndexFieldType::AutoEmbed => "autoEmbed",
        }
    }
}

impl fmt::Display for VectorIndexFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One indexed path of a vector index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VectorIndexFieldDefinition {
    Vector {
        path: FieldPath,
        #[serde(flatten)]
        specification: VectorFieldSpecification,
    },
    Filter {
        path: FieldPath,
    },
    Text {
        path: FieldPath,
    },
    /// Text embedded by the named model before indexing.
    AutoEmbed {
        path: FieldPath,
        model: String,
    },
}

impl VectorIndexFieldDefinition {
    pub fn vector(path: FieldPath, specification: VectorFieldSpecification) -> Self {
        VectorIndexFieldDefinition::Vector {
            path,
            specification,
        }
    }

    pub fn filter(path: FieldPath) -> Self {
        VectorIndexFieldDefinition::Filter { path }
    }

    pub fn text(path: FieldPath) -> Self {
        VectorIndexFieldDefinition::Text { path }
    }

    pub fn auto_embed(path: FieldPath, model: impl Into<String>) -> Self {
        VectorIndexFieldDefinition::AutoEmbed {
            path,
            model: model.into(),
        }
    }

    pub fn path(&self) -> &FieldPath {
        match self {
            VectorIndexFieldDefinition::Vector { path, .. }
            | VectorIndexFieldDefinition::Filter { path }
            | VectorIndexFieldDefinition::Text { path }
            | VectorIndexFieldDefinition::AutoEmbed { path, .. } => path,
        }
    }

    pub fn field_type(&self) -> VectorIndexFieldType {
        match self {
            VectorIndexFieldDefinition::Vector { .. } => VectorIndexFieldType::Vector,
            VectorIndexFieldDefinition::Filter { .. } => VectorIndexFieldType::Filter,
            VectorIndexFieldDefinition::Text { .. } => VectorIndexFieldType::Text,
            VectorIndexFieldDefinition::AutoEmbed { .. } => VectorIndexFieldType::AutoEmbed,
        }
    }

    pub fn specification(&self) -> Option<&VectorFieldSpecification> {
        match self {
            VectorIndexFieldDefinition::Vector { specification, .. } => Some(specification),
            _ => None,
        }
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            VectorIndexFieldDefinition::AutoEmbed { model, .. } => Some(model),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AutoEmbedOptions {
    model: String,
}

impl<'de> Deserialize<'de> for VectorIndexFieldDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut document = Map::deserialize(deserializer)?;
        let field_type = match document.remove("type") {
            Some(tag) => VectorIndexFieldType::deserialize(tag).map_err(de::Error::custom)?,
            None => return Err(de::Error::missing_field("type")),
        };
        let path = match document.remove("path") {
            Some(path) => FieldPath::deserialize(path).map_err(de::Error::custom)?,
            None => return Err(de::Error::missing_field("path")),
        };

        let options = Value::Object(document);
        Ok(match field_type {
            VectorIndexFieldType::Vector => VectorIndexFieldDefinition::Vector {
                path,
                specification: serde_json::from_value(options).map_err(de::Error::custom)?,
            },
            VectorIndexFieldType::AutoEmbed => {
                let options: AutoEmbedOptions =
                    serde_json::from_value(options).map_err(de::Error::custom)?;
                if options.model.is_empty() {
                    return Err(de::Error::custom("autoEmbed model cannot be empty"));
                }
                VectorIndexFieldDefinition::AutoEmbed {
                    path,
                    model: options.model,
                }
            }
            VectorIndexFieldType::Filter | VectorIndexFieldType::Text => {
                if let Some(key) = options.as_object().and_then(|o| o.keys().next()) {
                    return Err(de::Error::custom(format!(
                        "unknown field \"{key}\" for vector index field of type \"{field_type}\""
                    )));
                }
                if field_type == VectorIndexFieldType::Filter {
                    VectorIndexFieldDefinition::Filter { path }
                } else {
                    VectorIndexFieldDefinition::Text { path }
                }
            }
        })
    }
}
