//! Dynamic mapping rules for fields that are not declared statically.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Encoded as `false`, `true` or `{"typeSet": "<name>"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum DynamicDefinition {
    #[default]
    Disabled,
    /// Index undeclared fields with the default dynamic types.
    EnabledDefault,
    /// Index undeclared fields with the types of the named type set.
    TypeSet(String),
}

impl DynamicDefinition {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, DynamicDefinition::Disabled)
    }

    pub fn type_set_name(&self) -> Option<&str> {
        match self {
            DynamicDefinition::TypeSet(name) => Some(name),
            _ => None,
        }
    }
}

impl From<bool> for DynamicDefinition {
    fn from(enabled: bool) -> Self {
        if enabled {
            DynamicDefinition::EnabledDefault
        } else {
            DynamicDefinition::Disabled
        }
    }
}

impl Serialize for DynamicDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DynamicDefinition::Disabled => serializer.serialize_bool(false),
            DynamicDefinition::EnabledDefault => serializer.serialize_bool(true),
            DynamicDefinition::TypeSet(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("typeSet", name)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for DynamicDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DynamicVisitor)
    }
}

struct DynamicVisitor;

impl<'de> Visitor<'de> for DynamicVisitor {
    type Value = DynamicDefinition;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a boolean or a {\"typeSet\": <name>} document")
    }

    fn visit_bool<E: de::Error>(self, enabled: bool) -> Result<Self::Value, E> {
        Ok(enabled.into())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut type_set: Option<String> = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "typeSet" if type_set.is_none() => type_set = Some(map.next_value()?),
                "typeSet" => return Err(de::Error::duplicate_field("typeSet")),
                other => return Err(de::Error::unknown_field(other, &["typeSet"])),
            }
        }

        match type_set {
            Some(name) if name.is_empty() => {
                Err(de::Error::custom("dynamic typeSet name cannot be empty"))
            }
            Some(name) => Ok(DynamicDefinition::TypeSet(name)),
            None => Err(de::Error::missing_field("typeSet")),
        }
    }
}
