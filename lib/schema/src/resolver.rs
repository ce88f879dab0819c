//! Field definition lookup for query execution.
//!
//! Resolution first looks for a statically declared field in the scope selected by the
//! embedded root. Undeclared paths fall back to the dynamic rule of the nearest declared
//! ancestor's `document` variant, or of the scope's container when no ancestor is declared.

use ahash::AHashMap;
use std::fmt;
use tracing::trace;

use strata_core::{FieldPath, IndexFormatVersion};

use crate::document::DocumentFieldDefinition;
use crate::dynamic::DynamicDefinition;
use crate::field::FieldDefinition;
use crate::field_type::{FieldTypeDefinition, NumericFieldOptions, StringFieldDefinition};
use crate::hierarchy::FieldsByPath;
use crate::index::SearchIndexDefinition;

/// The definition applied to fields matched by `dynamic: true`, restricted to the kinds
/// `version` can index.
pub fn default_dynamic_field_definition(version: IndexFormatVersion) -> FieldDefinition {
    FieldDefinition::from_validated([
        FieldTypeDefinition::Boolean,
        FieldTypeDefinition::Date,
        FieldTypeDefinition::document(DocumentFieldDefinition::with_dynamic(
            DynamicDefinition::EnabledDefault,
        )),
        FieldTypeDefinition::Number(NumericFieldOptions::default()),
        FieldTypeDefinition::ObjectId,
        FieldTypeDefinition::String(StringFieldDefinition::default()),
        FieldTypeDefinition::Uuid,
    ])
    .filtered(|kind| kind.is_supported_by(version))
}

/// A string field, or one of its multi analyzers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StringFieldPath {
    Field(FieldPath),
    Multi { path: FieldPath, multi: String },
}

impl StringFieldPath {
    pub fn path(&self) -> &FieldPath {
        match self {
            StringFieldPath::Field(path) | StringFieldPath::Multi { path, .. } => path,
        }
    }
}

impl fmt::Display for StringFieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StringFieldPath::Field(path) => write!(f, "{path}"),
            StringFieldPath::Multi { path, multi } => write!(f, "{path} (multi \"{multi}\")"),
        }
    }
}

/// Resolves field paths against one [`SearchIndexDefinition`] at a fixed index format
/// version. Lookups borrow from the definition and never allocate.
pub struct SearchFieldDefinitionResolver<'a> {
    definition: &'a SearchIndexDefinition,
    version: IndexFormatVersion,
    dynamic_default: FieldDefinition,
    type_sets: AHashMap<&'a str, FieldDefinition>,
}

impl<'a> SearchFieldDefinitionResolver<'a> {
    pub fn new(definition: &'a SearchIndexDefinition, version: IndexFormatVersion) -> Self {
        let type_sets = definition
            .type_sets()
            .map(|type_set| (type_set.name(), type_set.field_definition()))
            .collect();
        Self {
            definition,
            version,
            dynamic_default: default_dynamic_field_definition(version),
            type_sets,
        }
    }

    pub fn index_format_version(&self) -> IndexFormatVersion {
        self.version
    }

    pub fn definition(&self) -> &'a SearchIndexDefinition {
        self.definition
    }

    /// Definition of `path`, resolved relative to `embedded_root` when given.
    ///
    /// With an embedded root, `path` must lie strictly below a path indexed as
    /// embeddedDocuments, and only fields of that boundary are visible. Without one, fields
    /// below any embeddedDocuments boundary are hidden.
    pub fn get_field_definition(
        &self,
        path: &FieldPath,
        embedded_root: Option<&FieldPath>,
    ) -> Option<&FieldDefinition> {
        let hierarchy = self.definition.hierarchy();
        let (fields, scope_dynamic): (&FieldsByPath, &DynamicDefinition) = match embedded_root {
            None => (hierarchy.root_fields(), self.definition.mappings().dynamic()),
            Some(root) => {
                if !path.is_descendant_of(root) {
                    trace!(%path, %root, "Path is outside of the embedded root");
                    return None;
                }
                let fields = hierarchy.fields_by_embedded_root().get(root)?;
                let embedded = hierarchy.embedded_by_root().get(root)?;
                (fields, embedded.dynamic())
            }
        };

        if let Some(definition) = fields.get(path) {
            return Some(definition);
        }

        let declared_ancestor = path
            .ancestors()
            .take_while(|ancestor| embedded_root.map_or(true, |root| ancestor.is_descendant_of(root)))
            .find_map(|ancestor| fields.get(&ancestor).map(|definition| (ancestor, definition)));

        let dynamic = match declared_ancestor {
            Some((ancestor, definition)) => match definition.document() {
                Some(document) => document.dynamic(),
                None => {
                    trace!(%path, %ancestor, "Nearest declared ancestor is not a document");
                    return None;
                }
            },
            None => scope_dynamic,
        };

        self.resolve_dynamic(path, dynamic)
    }

    fn resolve_dynamic(
        &self,
        path: &FieldPath,
        dynamic: &DynamicDefinition,
    ) -> Option<&FieldDefinition> {
        match dynamic {
            DynamicDefinition::Disabled => {
                trace!(%path, "Field is not declared and dynamic mapping is disabled");
                None
            }
            DynamicDefinition::EnabledDefault => {
                trace!(%path, version = %self.version, "Using the default dynamic definition");
                Some(&self.dynamic_default)
            }
            DynamicDefinition::TypeSet(name) => {
                trace!(%path, type_set = %name, "Using type set definition");
                // References are checked when the index definition is built.
                self.type_sets.get(name.as_str())
            }
        }
    }

    /// The string definition of a field, or of one of its multi analyzers. Multi analyzers
    /// are only found on declared string definitions.
    pub fn get_string_field_definition(
        &self,
        path: &StringFieldPath,
        embedded_root: Option<&FieldPath>,
    ) -> Option<&StringFieldDefinition> {
        let string = self.get_field_definition(path.path(), embedded_root)?.string()?;
        match path {
            StringFieldPath::Field(_) => Some(string),
            StringFieldPath::Multi { multi, .. } => string.multi().get(multi),
        }
    }

    pub fn is_used(&self, path: &FieldPath, embedded_root: Option<&FieldPath>) -> bool {
        self.get_field_definition(path, embedded_root).is_some()
    }
}

impl fmt::Debug for SearchFieldDefinitionResolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchFieldDefinitionResolver")
            .field("index", &self.definition.metadata().index_id())
            .field("version", &self.version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_type::FieldTypeKind;
    use serde_json::{json, Value};

    fn index(mappings: Value, type_sets: Option<Value>) -> SearchIndexDefinition {
        let mut document = json!({
            "indexID": "507f191e810c19729de860ea",
            "name": "index",
            "database": "database",
            "lastObservedCollectionName": "collection",
            "collectionUUID": "eb6c40ca-f25e-47e8-b48c-02a05b64a5aa",
            "mappings": mappings
        });
        if let Some(type_sets) = type_sets {
            document["typeSets"] = type_sets;
        }
        serde_json::from_value(document).unwrap()
    }

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    fn kinds(definition: &FieldDefinition) -> Vec<FieldTypeKind> {
        definition.kinds().collect()
    }

    #[test]
    fn test_default_dynamic_definition_is_version_gated() {
        let four = default_dynamic_field_definition(IndexFormatVersion::FOUR);
        assert!(!four.contains(FieldTypeKind::Boolean));
        assert!(!four.contains(FieldTypeKind::ObjectId));
        assert!(four.contains(FieldTypeKind::String));
        assert!(four.contains(FieldTypeKind::Document));

        let current = default_dynamic_field_definition(IndexFormatVersion::CURRENT);
        assert_eq!(
            kinds(&current),
            vec![
                FieldTypeKind::Boolean,
                FieldTypeKind::Date,
                FieldTypeKind::Document,
                FieldTypeKind::Number,
                FieldTypeKind::ObjectId,
                FieldTypeKind::String,
                FieldTypeKind::Uuid,
            ]
        );
    }

    #[test]
    fn test_static_and_dynamic_fields() {
        let definition = index(
            json!({"dynamic": true, "fields": {"title": {"type": "token"}}}),
            None,
        );
        for version in IndexFormatVersion::supported() {
            let resolver = definition.create_field_definition_resolver(version);
            let title = resolver.get_field_definition(&path("title"), None).unwrap();
            assert_eq!(kinds(title), vec![FieldTypeKind::Token]);

            let dynamic = resolver.get_field_definition(&path("other.deep"), None).unwrap();
            assert_eq!(dynamic, &default_dynamic_field_definition(version));
        }
    }

    #[test]
    fn test_dynamic_disabled_returns_none() {
        let definition = index(json!({"fields": {"a": {"type": "string"}}}), None);
        let resolver = definition.create_field_definition_resolver(IndexFormatVersion::CURRENT);
        assert!(resolver.get_field_definition(&path("b"), None).is_none());
        assert!(!resolver.is_used(&path("b"), None));
        assert!(resolver.is_used(&path("a"), None));
    }

    #[test]
    fn test_non_document_ancestor_hides_descendants() {
        let definition = index(
            json!({"dynamic": true, "fields": {"a": {"type": "document", "fields": {"b": {"type": "string"}}}}}),
            None,
        );
        let resolver = definition.create_field_definition_resolver(IndexFormatVersion::CURRENT);
        assert!(resolver.get_field_definition(&path("a.b"), None).is_some());
        assert!(resolver.get_field_definition(&path("a.b.c"), None).is_none());
        assert!(resolver.get_field_definition(&path("a.c"), None).is_none());
    }

    #[test]
    fn test_nested_document_dynamic_overrides_parent() {
        let definition = index(
            json!({
                "dynamic": false,
                "fields": {"a": {"type": "document", "dynamic": true, "fields": {
                    "b": {"type": "document", "dynamic": false}
                }}}
            }),
            None,
        );
        let resolver = definition.create_field_definition_resolver(IndexFormatVersion::CURRENT);
        assert!(resolver.get_field_definition(&path("x"), None).is_none());
        assert!(resolver.get_field_definition(&path("a.x.y"), None).is_some());
        assert!(resolver.get_field_definition(&path("a.b.x"), None).is_none());
    }

    #[test]
    fn test_type_set_dynamic_field() {
        let definition = index(
            json!({"dynamic": {"typeSet": "test"}}),
            Some(json!([{"name": "test", "types": [{"type": "token"}, {"type": "autocomplete"}]}])),
        );
        for version in IndexFormatVersion::supported() {
            let resolver = definition.create_field_definition_resolver(version);
            let field = resolver.get_field_definition(&path("a"), None).unwrap();
            assert_eq!(
                kinds(field),
                vec![FieldTypeKind::Autocomplete, FieldTypeKind::Document, FieldTypeKind::Token]
            );
            assert_eq!(
                field.document().unwrap().dynamic().type_set_name(),
                Some("test")
            );
            assert_eq!(resolver.get_field_definition(&path("a.b.c"), None), Some(field));
        }
    }

    #[test]
    fn test_nested_type_set_under_static_document() {
        let definition = index(
            json!({
                "dynamic": true,
                "fields": {"a": {"type": "document", "dynamic": {"typeSet": "nested"}}}
            }),
            Some(json!([{"name": "nested", "types": [{"type": "number"}]}])),
        );
        let resolver = definition.create_field_definition_resolver(IndexFormatVersion::CURRENT);
        let nested = resolver.get_field_definition(&path("a.b"), None).unwrap();
        assert_eq!(nested, &definition.type_set("nested").unwrap().field_definition());
        let outside = resolver.get_field_definition(&path("b"), None).unwrap();
        assert!(outside.contains(FieldTypeKind::String));
    }

    #[test]
    fn test_embedded_boundaries_are_opaque() {
        let definition = index(
            json!({
                "fields": {
                    "teachers": {"type": "embeddedDocuments", "fields": {
                        "firstName": {"type": "token"},
                        "classes": {"type": "embeddedDocuments", "dynamic": true, "fields": {
                            "subject": {"type": "string"}
                        }}
                    }}
                }
            }),
            None,
        );
        let resolver = definition.create_field_definition_resolver(IndexFormatVersion::CURRENT);
        let teachers = path("teachers");
        let classes = path("teachers.classes");

        assert!(resolver.get_field_definition(&path("teachers.firstName"), None).is_none());
        let first_name = resolver
            .get_field_definition(&path("teachers.firstName"), Some(&teachers))
            .unwrap();
        assert!(first_name.token().is_some());

        assert!(resolver
            .get_field_definition(&path("teachers.classes.subject"), Some(&teachers))
            .is_none());
        assert!(resolver
            .get_field_definition(&path("teachers.classes.subject"), Some(&classes))
            .unwrap()
            .string()
            .is_some());
        assert!(resolver
            .get_field_definition(&path("teachers.classes.room"), Some(&classes))
            .is_some());
        assert!(resolver
            .get_field_definition(&path("teachers.unknown"), Some(&teachers))
            .is_none());
    }

    #[test]
    fn test_embedded_root_must_exist_and_contain_path() {
        let definition = index(
            json!({"dynamic": true, "fields": {"a": {"type": "document", "fields": {"b": {"type": "token"}}}}}),
            None,
        );
        let resolver = definition.create_field_definition_resolver(IndexFormatVersion::CURRENT);
        assert!(resolver.get_field_definition(&path("a.b"), Some(&path("a"))).is_none());

        let embedded = index(json!({"fields": {"e": {"type": "embeddedDocuments", "dynamic": true}}}), None);
        let resolver = embedded.create_field_definition_resolver(IndexFormatVersion::CURRENT);
        assert!(resolver.get_field_definition(&path("x"), Some(&path("e"))).is_none());
        assert!(resolver.get_field_definition(&path("e"), Some(&path("e"))).is_none());
        assert!(resolver.get_field_definition(&path("e.x"), Some(&path("e"))).is_some());
    }

    #[test]
    fn test_document_and_embedded_on_the_same_field() {
        let definition = index(
            json!({
                "fields": {
                    "teachers": [
                        {"type": "document", "dynamic": true},
                        {"type": "embeddedDocuments", "fields": {"firstName": {"type": "token"}}}
                    ]
                }
            }),
            None,
        );
        let resolver = definition.create_field_definition_resolver(IndexFormatVersion::CURRENT);
        let teachers = path("teachers");

        let outside = resolver
            .get_field_definition(&path("teachers.firstName"), None)
            .unwrap();
        assert!(outside.token().is_none());
        assert!(outside.string().is_some());

        let inside = resolver
            .get_field_definition(&path("teachers.firstName"), Some(&teachers))
            .unwrap();
        assert!(inside.token().is_some());
    }

    #[test]
    fn test_string_field_and_multi() {
        let definition = index(
            json!({
                "dynamic": true,
                "fields": {"title": {"type": "string", "multi": {"english": {"analyzer": "lucene.english"}}}}
            }),
            None,
        );
        let resolver = definition.create_field_definition_resolver(IndexFormatVersion::CURRENT);
        let title = path("title");

        assert!(resolver
            .get_string_field_definition(&StringFieldPath::Field(title.clone()), None)
            .is_some());
        let english = resolver
            .get_string_field_definition(
                &StringFieldPath::Multi { path: title.clone(), multi: "english".to_string() },
                None,
            )
            .unwrap();
        assert_eq!(english.analyzer(), Some("lucene.english"));
        assert!(resolver
            .get_string_field_definition(
                &StringFieldPath::Multi { path: title, multi: "french".to_string() },
                None,
            )
            .is_none());
        assert!(resolver
            .get_string_field_definition(
                &StringFieldPath::Multi { path: path("dynamic"), multi: "english".to_string() },
                None,
            )
            .is_none());
    }
}
