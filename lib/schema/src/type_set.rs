//! Named type sets referenced from dynamic mapping rules.

use serde::{Deserialize, Serialize};

use strata_core::{Error, Result};

use crate::document::DocumentFieldDefinition;
use crate::dynamic::DynamicDefinition;
use crate::field::FieldDefinition;
use crate::field_type::FieldTypeDefinition;

/// A reusable list of field types applied to dynamically indexed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTypeSet")]
pub struct TypeSetDefinition {
    name: String,
    types: Vec<FieldTypeDefinition>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTypeSet {
    name: String,
    types: Vec<FieldTypeDefinition>,
}

impl TryFrom<RawTypeSet> for TypeSetDefinition {
    type Error = Error;

    fn try_from(raw: RawTypeSet) -> Result<Self> {
        Self::new(raw.name, raw.types)
    }
}

impl TypeSetDefinition {
    pub fn new(name: impl Into<String>, types: Vec<FieldTypeDefinition>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidDefinition(
                "typeSet name cannot be empty".to_string(),
            ));
        }
        if let Some(container) = types.iter().find(|t| t.kind().is_container()) {
            return Err(Error::InvalidDefinition(format!(
                "typeSet \"{name}\" cannot contain type \"{}\"",
                container.kind()
            )));
        }
        FieldDefinition::new(types.iter().cloned())
            .map_err(|e| Error::InvalidDefinition(format!("typeSet \"{name}\": {e}")))?;

        Ok(Self { name, types })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &[FieldTypeDefinition] {
        &self.types
    }

    /// The definition applied to a field matched by this type set. It carries a `document`
    /// variant that keeps applying the type set below the field.
    pub fn field_definition(&self) -> FieldDefinition {
        let continuation = FieldTypeDefinition::document(DocumentFieldDefinition::with_dynamic(
            DynamicDefinition::TypeSet(self.name.clone()),
        ));
        FieldDefinition::from_validated(self.types.iter().cloned().chain([continuation]))
    }

    pub(crate) fn analyzer_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.types.iter().flat_map(|definition| {
            let names: Vec<&str> = match definition {
                FieldTypeDefinition::String(string) => string.analyzer_names().collect(),
                FieldTypeDefinition::Autocomplete(autocomplete) => {
                    autocomplete.analyzer().into_iter().collect()
                }
                _ => Vec::new(),
            };
            names
        })
    }
}
