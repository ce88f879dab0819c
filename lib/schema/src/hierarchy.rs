//! Derived view of a container's field tree.
//!
//! Paths are relative to the container the context belongs to. Fields reachable through
//! `document` variants are flattened into [`FieldHierarchyContext::root_fields`]; every
//! `embeddedDocuments` variant starts a new relative root whose own fields are listed under
//! [`FieldHierarchyContext::fields_by_embedded_root`]. A root nested inside another root is a
//! key of the outer root's field map, while its own descendants belong to the inner root.

use ahash::{AHashMap, AHashSet};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use strata_core::{Error, FieldPath, Result};

use crate::document::EmbeddedDocumentsFieldDefinition;
use crate::field::FieldDefinition;

pub type FieldsByPath = AHashMap<FieldPath, FieldDefinition>;

#[derive(Clone, Default)]
pub struct FieldHierarchyContext {
    root_fields: FieldsByPath,
    fields_by_embedded_root: AHashMap<FieldPath, FieldsByPath>,
    embedded_by_root: AHashMap<FieldPath, Arc<EmbeddedDocumentsFieldDefinition>>,
    num_embedded_documents_layers: usize,
}

impl FieldHierarchyContext {
    /// Context of a container with no fields.
    pub fn empty(is_embedded: bool) -> Self {
        Self {
            num_embedded_documents_layers: usize::from(is_embedded),
            ..Default::default()
        }
    }

    /// Build the context for `fields`, the field map of a document container, or of an
    /// embeddedDocuments container when `is_embedded` is set.
    ///
    /// Fails when a field's `document` and `embeddedDocuments` variants both declare an
    /// embedded root at the same path.
    pub fn build(fields: &BTreeMap<String, FieldDefinition>, is_embedded: bool) -> Result<Self> {
        let mut context = Self::default();
        let mut child_layers = 0;

        for (name, field) in fields {
            let leaf = FieldPath::new_root(name.as_str());
            let embedded = field.embedded_documents();
            let document = field.document();

            if let (Some(embedded), Some(document)) = (embedded, document) {
                let embedded_roots: AHashSet<FieldPath> = embedded
                    .hierarchy()
                    .relative_roots()
                    .map(|root| root.with_new_root(name))
                    .collect();
                let clash = document
                    .hierarchy()
                    .relative_roots()
                    .map(|root| root.with_new_root(name))
                    .filter(|root| embedded_roots.contains(root))
                    .min_by(|a, b| a.depth().cmp(&b.depth()).then_with(|| a.cmp(b)));
                if let Some(path) = clash {
                    return Err(Error::EmbeddedRootClash(path));
                }
            }

            let nested = embedded
                .map(|e| e.hierarchy())
                .into_iter()
                .chain(document.map(|d| d.hierarchy()));
            for child in nested {
                for (root, root_fields) in &child.fields_by_embedded_root {
                    context
                        .fields_by_embedded_root
                        .insert(root.with_new_root(name), prepend_all(name, root_fields));
                }
                for (root, definition) in &child.embedded_by_root {
                    context
                        .embedded_by_root
                        .insert(root.with_new_root(name), Arc::clone(definition));
                }
                child_layers = child_layers.max(child.num_embedded_documents_layers);
            }

            if let Some(embedded) = embedded {
                context.fields_by_embedded_root.insert(
                    leaf.clone(),
                    prepend_all(name, &embedded.hierarchy().root_fields),
                );
                context
                    .embedded_by_root
                    .insert(leaf.clone(), Arc::clone(embedded));
            }

            if let Some(document) = document {
                for (path, definition) in &document.hierarchy().root_fields {
                    context
                        .root_fields
                        .insert(path.with_new_root(name), definition.clone());
                }
            }

            context.root_fields.insert(leaf, field.clone());
        }

        context.num_embedded_documents_layers = child_layers + usize::from(is_embedded);
        debug!(
            fields = context.root_fields.len(),
            embedded_roots = context.embedded_by_root.len(),
            layers = context.num_embedded_documents_layers,
            "Built field hierarchy"
        );
        Ok(context)
    }

    /// Fields reachable from the container through `document` variants, by relative path.
    pub fn root_fields(&self) -> &FieldsByPath {
        &self.root_fields
    }

    /// Every relative root at any depth with the fields visible from it.
    pub fn fields_by_embedded_root(&self) -> &AHashMap<FieldPath, FieldsByPath> {
        &self.fields_by_embedded_root
    }

    pub fn embedded_by_root(&self) -> &AHashMap<FieldPath, Arc<EmbeddedDocumentsFieldDefinition>> {
        &self.embedded_by_root
    }

    pub fn relative_roots(&self) -> impl Iterator<Item = &FieldPath> + '_ {
        self.fields_by_embedded_root.keys()
    }

    pub fn is_embedded_root(&self, path: &FieldPath) -> bool {
        self.embedded_by_root.contains_key(path)
    }

    /// Maximum nesting of embeddedDocuments below, and including, this container.
    pub fn num_embedded_documents_layers(&self) -> usize {
        self.num_embedded_documents_layers
    }
}

fn prepend_all(name: &str, fields: &FieldsByPath) -> FieldsByPath {
    fields
        .iter()
        .map(|(path, definition)| (path.with_new_root(name), definition.clone()))
        .collect()
}

impl fmt::Debug for FieldHierarchyContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut roots: Vec<String> = self.relative_roots().map(ToString::to_string).collect();
        roots.sort();
        f.debug_struct("FieldHierarchyContext")
            .field("root_fields", &self.root_fields.len())
            .field("relative_roots", &roots)
            .field("layers", &self.num_embedded_documents_layers)
            .finish()
    }
}
