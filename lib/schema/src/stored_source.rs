//! Stored source: which parts of a source document are kept in the index.
//!
//! ```json
//! true                          // store everything
//! false                         // store nothing
//! {"include": ["a", "b.c"]}     // store a, b.c and everything below them
//! {"exclude": ["secret"]}       // store everything except secret
//! ```

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

use strata_core::{Error, FieldPath, Result};

const ID_FIELD: &str = "_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoredSourceMode {
    Inclusion,
    Exclusion,
}

impl StoredSourceMode {
    fn name(self) -> &'static str {
        match self {
            StoredSourceMode::Inclusion => "inclusion",
            StoredSourceMode::Exclusion => "exclusion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredSourceDefinition {
    mode: StoredSourceMode,
    paths: BTreeSet<FieldPath>,
    all: bool,
}

impl Default for StoredSourceDefinition {
    fn default() -> Self {
        Self::exclude_all()
    }
}

impl StoredSourceDefinition {
    pub fn include_all() -> Self {
        Self {
            mode: StoredSourceMode::Inclusion,
            paths: BTreeSet::new(),
            all: true,
        }
    }

    pub fn exclude_all() -> Self {
        Self {
            mode: StoredSourceMode::Exclusion,
            paths: BTreeSet::new(),
            all: true,
        }
    }

    /// Duplicate paths collapse; a path below another configured path is rejected. Including
    /// nothing is [`Self::exclude_all`] and excluding nothing is [`Self::include_all`].
    pub fn create<I, S>(mode: StoredSourceMode, dotted_paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut paths = BTreeSet::new();
        for dotted in dotted_paths {
            let dotted = dotted.as_ref();
            if dotted.trim().is_empty() {
                return Err(Error::InvalidDefinition(
                    "stored source paths cannot be blank".to_string(),
                ));
            }
            paths.insert(FieldPath::parse(dotted)?);
        }

        if paths
            .iter()
            .any(|path| path.ancestors().any(|ancestor| paths.contains(&ancestor)))
        {
            return Err(Error::InvalidDefinition(
                "path collision is not allowed".to_string(),
            ));
        }

        if paths.is_empty() {
            return Ok(match mode {
                StoredSourceMode::Inclusion => Self::exclude_all(),
                StoredSourceMode::Exclusion => Self::include_all(),
            });
        }

        Ok(Self {
            mode,
            paths,
            all: false,
        })
    }

    pub fn mode(&self) -> StoredSourceMode {
        self.mode
    }

    /// Configured paths, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> + '_ {
        self.paths.iter()
    }

    pub fn is_all_included(&self) -> bool {
        self.all && self.mode == StoredSourceMode::Inclusion
    }

    pub fn is_all_excluded(&self) -> bool {
        self.all && self.mode == StoredSourceMode::Exclusion
    }

    pub fn is_inclusion(&self) -> bool {
        self.all || self.mode == StoredSourceMode::Inclusion
    }

    pub fn is_exclusion(&self) -> bool {
        self.all || self.mode == StoredSourceMode::Exclusion
    }

    pub fn as_inclusion(&self) -> Result<Inclusion<'_>> {
        if !self.is_inclusion() {
            return Err(self.mode_error(StoredSourceMode::Inclusion));
        }
        Ok(Inclusion { definition: self })
    }

    pub fn as_exclusion(&self) -> Result<Exclusion<'_>> {
        if !self.is_exclusion() {
            return Err(self.mode_error(StoredSourceMode::Exclusion));
        }
        Ok(Exclusion { definition: self })
    }

    fn mode_error(&self, expected: StoredSourceMode) -> Error {
        Error::StoredSourceMode {
            expected: expected.name(),
            actual: self.mode.name(),
        }
    }

    /// True if the value at `path` is kept.
    pub fn is_stored(&self, path: &FieldPath) -> bool {
        match self.mode {
            StoredSourceMode::Inclusion => Inclusion { definition: self }.is_included(path),
            StoredSourceMode::Exclusion => !Exclusion { definition: self }.is_excluded(path),
        }
    }

    /// True if `path` is kept or leads to a kept path.
    pub fn is_path_to_stored(&self, path: &FieldPath) -> bool {
        match self.mode {
            StoredSourceMode::Inclusion => Inclusion { definition: self }.is_path_to_included(path),
            StoredSourceMode::Exclusion => !Exclusion { definition: self }.is_excluded(path),
        }
    }

    fn is_at_or_under_configured(&self, path: &FieldPath) -> bool {
        self.paths.contains(path) || path.ancestors().any(|ancestor| self.paths.contains(&ancestor))
    }
}

/// Inclusion-mode queries.
#[derive(Debug, Clone, Copy)]
pub struct Inclusion<'a> {
    definition: &'a StoredSourceDefinition,
}

impl Inclusion<'_> {
    /// `path` equals or lies below an included path. `_id` is always included unless
    /// everything is excluded.
    pub fn is_included(&self, path: &FieldPath) -> bool {
        if self.definition.is_all_excluded() {
            return false;
        }
        if self.definition.is_all_included() {
            return true;
        }
        self.definition.is_at_or_under_configured(path)
            || (path.depth() == 1 && path.leaf() == ID_FIELD)
    }

    /// Also true for strict ancestors of an included path.
    pub fn is_path_to_included(&self, path: &FieldPath) -> bool {
        self.is_included(path)
            || self
                .definition
                .paths
                .iter()
                .any(|configured| path.is_ancestor_of(configured))
    }
}

/// Exclusion-mode queries.
#[derive(Debug, Clone, Copy)]
pub struct Exclusion<'a> {
    definition: &'a StoredSourceDefinition,
}

impl Exclusion<'_> {
    pub fn is_excluded(&self, path: &FieldPath) -> bool {
        if self.definition.is_all_included() {
            return false;
        }
        if self.definition.is_all_excluded() {
            return true;
        }
        self.definition.is_at_or_under_configured(path)
    }
}

impl Serialize for StoredSourceDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.all {
            return serializer.serialize_bool(self.is_all_included());
        }

        let key = match self.mode {
            StoredSourceMode::Inclusion => "include",
            StoredSourceMode::Exclusion => "exclude",
        };
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(key, &self.paths)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for StoredSourceDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(StoredSourceVisitor)
    }
}

struct StoredSourceVisitor;

impl<'de> Visitor<'de> for StoredSourceVisitor {
    type Value = StoredSourceDefinition;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("boolean or document")
    }

    fn visit_bool<E: de::Error>(self, store_all: bool) -> std::result::Result<Self::Value, E> {
        Ok(if store_all {
            StoredSourceDefinition::include_all()
        } else {
            StoredSourceDefinition::exclude_all()
        })
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
        let mut selected: Option<(StoredSourceMode, Vec<String>)> = None;
        while let Some(key) = map.next_key::<String>()? {
            let mode = match key.as_str() {
                "include" => StoredSourceMode::Inclusion,
                "exclude" => StoredSourceMode::Exclusion,
                other => return Err(de::Error::unknown_field(other, &["include", "exclude"])),
            };
            if selected.is_some() {
                return Err(de::Error::custom(
                    "exactly one of [include, exclude] must be present",
                ));
            }
            selected = Some((mode, map.next_value()?));
        }

        let Some((mode, paths)) = selected else {
            return Err(de::Error::custom(
                "exactly one of [include, exclude] must be present",
            ));
        };
        if paths.is_empty() {
            return Err(de::Error::custom(format!(
                "\"{}\" cannot be empty",
                if mode == StoredSourceMode::Inclusion { "include" } else { "exclude" }
            )));
        }
        StoredSourceDefinition::create(mode, &paths).map_err(de::Error::custom)
    }
}
