// Integration tests for strata
use serde_json::{json, Value};
use std::sync::Arc;
use std::thread;
use strata::prelude::*;
use strata::{codec, IndexMetadata};
use strata_schema::{FieldTypeDefinition, StringFieldDefinition};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn search_index(mappings: Value, extra: Value) -> anyhow::Result<SearchIndexDefinition> {
    let mut document = json!({
        "indexID": "507f191e810c19729de860ea",
        "name": "default",
        "database": "school",
        "lastObservedCollectionName": "classes",
        "collectionUUID": uuid::Uuid::new_v4(),
        "mappings": mappings
    });
    if let (Some(target), Value::Object(extra)) = (document.as_object_mut(), extra) {
        target.extend(extra);
    }
    Ok(codec::from_document(document)?)
}

fn path(s: &str) -> FieldPath {
    FieldPath::parse(s).unwrap()
}

#[test]
fn test_encoding_is_stable() -> anyhow::Result<()> {
    init_tracing();
    let definition = search_index(
        json!({
            "dynamic": {"typeSet": "strings"},
            "fields": {
                "title": [{"type": "string", "analyzer": "lucene.english"}, {"type": "token"}],
                "plot": {"type": "vector", "numDimensions": 16, "similarity": "cosine", "quantization": "binary"},
                "teachers": {
                    "type": "embeddedDocuments",
                    "dynamic": true,
                    "storedSource": {"exclude": ["teachers.ssn"]},
                    "fields": {"classes": {"type": "embeddedDocuments"}}
                }
            }
        }),
        json!({
            "typeSets": [{"name": "strings", "types": [{"type": "token", "normalizer": "lowercase"}]}],
            "storedSource": {"include": ["title", "teachers"]},
            "sort": [{"path": "title", "order": -1}],
            "definitionVersion": 3,
            "definitionVersionCreatedAt": chrono::Utc::now().to_rfc3339()
        }),
    )?;

    let bytes = codec::encode(&definition)?;
    let decoded: SearchIndexDefinition = codec::decode(&bytes)?;
    assert_eq!(decoded, definition);
    assert_eq!(codec::encode(&decoded)?, bytes);

    let document = codec::to_document(&definition)?;
    let again: SearchIndexDefinition = codec::from_document(document.clone())?;
    assert_eq!(codec::to_document(&again)?, document);
    Ok(())
}

#[test]
fn test_layer_count_depends_on_caller_context() -> anyhow::Result<()> {
    let fields = json!({"fields": {"foo": {"type": "embeddedDocuments"}}});
    let document: DocumentFieldDefinition = codec::from_document(fields.clone())?;
    let embedded: EmbeddedDocumentsFieldDefinition = codec::from_document(fields)?;

    assert_eq!(document.hierarchy().num_embedded_documents_layers(), 1);
    assert_eq!(embedded.hierarchy().num_embedded_documents_layers(), 2);
    Ok(())
}

#[test]
fn test_clash_reports_colliding_path() {
    let err = search_index(
        json!({
            "fields": {
                "a": [
                    {"type": "document", "fields": {"b": {"type": "document", "fields": {
                        "c": {"type": "embeddedDocuments"}
                    }}}},
                    {"type": "embeddedDocuments", "fields": {"b": {"type": "document", "fields": {
                        "c": {"type": "embeddedDocuments"}
                    }}}}
                ]
            }
        }),
        json!({}),
    )
    .unwrap_err();
    assert!(err
        .to_string()
        .contains("cannot define multiple embeddedDocuments fields at sub-paths a.b.c"));
}

#[test]
fn test_embedded_boundary_opacity() -> anyhow::Result<()> {
    let definition = search_index(
        json!({
            "dynamic": false,
            "fields": {
                "teachers": {
                    "type": "embeddedDocuments",
                    "fields": {"firstName": {"type": "string"}}
                }
            }
        }),
        json!({}),
    )?;

    for version in IndexFormatVersion::supported() {
        let resolver = definition.create_field_definition_resolver(version);
        let first_name = path("teachers.firstName");
        assert!(resolver.get_field_definition(&first_name, None).is_none());
        let inside = resolver
            .get_field_definition(&first_name, Some(&path("teachers")))
            .expect("declared inside the boundary");
        assert!(inside.string().is_some());
    }
    assert!(definition.has_embedded_fields());
    Ok(())
}

#[test]
fn test_type_set_dynamic_fallback() -> anyhow::Result<()> {
    let definition = search_index(
        json!({"dynamic": {"typeSet": "searchable"}}),
        json!({"typeSets": [{"name": "searchable", "types": [{"type": "token"}, {"type": "autocomplete"}]}]}),
    )?;
    let resolver = definition.create_field_definition_resolver(IndexFormatVersion::CURRENT);

    for undeclared in ["a", "a.b", "deeply.nested.field"] {
        let field = resolver
            .get_field_definition(&path(undeclared), None)
            .expect("type set applies to every undeclared path");
        assert!(field.token().is_some());
        assert!(field.autocomplete().is_some());
        assert!(field.string().is_none());
        assert!(!field.contains(FieldTypeKind::Number));
    }
    Ok(())
}

#[test]
fn test_unknown_type_set_is_a_construction_error() {
    let err = search_index(json!({"dynamic": {"typeSet": "missing"}}), json!({})).unwrap_err();
    assert!(err.to_string().contains("Invalid typeSets defined in index definition"));
}

#[test]
fn test_default_dynamic_is_version_gated() -> anyhow::Result<()> {
    let definition = search_index(json!({"dynamic": true}), json!({}))?;
    let field = path("flag");

    let four = definition.create_field_definition_resolver(IndexFormatVersion::FOUR);
    let gated = four.get_field_definition(&field, None).expect("dynamic");
    assert!(!gated.contains(FieldTypeKind::Boolean));
    assert!(!gated.contains(FieldTypeKind::ObjectId));

    let current = definition.create_field_definition_resolver(IndexFormatVersion::CURRENT);
    let full = current.get_field_definition(&field, None).expect("dynamic");
    assert!(full.contains(FieldTypeKind::Boolean));
    assert!(full.contains(FieldTypeKind::ObjectId));
    Ok(())
}

#[test]
fn test_stored_source_inclusion() -> anyhow::Result<()> {
    let inclusion =
        StoredSourceDefinition::create(StoredSourceMode::Inclusion, ["a", "b.c", "b.d"])?;
    let included = inclusion.as_inclusion()?;
    assert!(included.is_included(&path("b.c.x")));
    assert!(!included.is_included(&path("b.e")));
    assert!(!included.is_included(&path("c")));
    assert!(included.is_path_to_included(&path("b")));

    let duplicated =
        StoredSourceDefinition::create(StoredSourceMode::Inclusion, ["b.d", "a", "b.c", "a"])?;
    assert_eq!(duplicated, inclusion);
    assert!(inclusion.as_exclusion().is_err());
    Ok(())
}

#[test]
fn test_vector_index_mapping() -> anyhow::Result<()> {
    let document = json!({
        "indexID": "507f191e810c19729de860ea",
        "name": "vectors",
        "database": "sample",
        "lastObservedCollectionName": "movies",
        "collectionUUID": uuid::Uuid::new_v4(),
        "fields": [
            {"type": "vector", "path": "plot_embedding", "numDimensions": 1536, "similarity": "dotProduct"},
            {"type": "filter", "path": "a.b"},
            {"type": "autoEmbed", "path": "plot", "model": "voyage-3-large"}
        ]
    });
    let definition: VectorIndexDefinition = codec::from_document(document.clone())?;
    let mapping = definition.mapping();

    assert!(mapping.is_used(&path("a")));
    assert!(mapping.is_indexed(&path("a.b"), VectorIndexFieldType::Filter));
    assert!(!mapping.is_indexed(&path("a.b"), VectorIndexFieldType::Vector));
    assert!(!mapping.is_indexed(&path("a"), VectorIndexFieldType::Filter));
    assert_eq!(
        mapping
            .get_vector_field_specification(&path("plot_embedding"))
            .map(|s| s.num_dimensions()),
        Some(1536)
    );

    let resolver = definition.create_field_definition_resolver(IndexFormatVersion::CURRENT);
    assert!(resolver.validate_vector_query(&path("plot_embedding"), 1536).is_ok());
    assert!(matches!(
        resolver.validate_vector_query(&path("plot"), 1536),
        Err(Error::InvalidQuery(_))
    ));

    let mut duplicate = document;
    duplicate["fields"] = json!([{"type": "filter", "path": "x"}, {"type": "filter", "path": "x"}]);
    assert!(codec::from_document::<VectorIndexDefinition>(duplicate).is_err());
    Ok(())
}

#[test]
fn test_programmatic_definition_matches_decoded() -> anyhow::Result<()> {
    let decoded = search_index(
        json!({"dynamic": true, "fields": {"title": {"type": "string"}}}),
        json!({"indexFeatureVersion": 2}),
    )?;

    let title = FieldDefinition::new([FieldTypeDefinition::String(StringFieldDefinition::default())])?;
    let mappings = DocumentFieldDefinition::builder()
        .dynamic(true)
        .field("title", title)
        .build()?;
    let metadata: IndexMetadata = codec::from_document(codec::to_document(decoded.metadata())?)?;
    let built = SearchIndexDefinition::builder(metadata, mappings)
        .index_feature_version(2)
        .build()?;

    assert_eq!(built, decoded);
    Ok(())
}

#[test]
fn test_concurrent_readers_during_rename() -> anyhow::Result<()> {
    init_tracing();
    let definition = Arc::new(search_index(
        json!({
            "dynamic": true,
            "fields": {"teachers": {"type": "embeddedDocuments", "fields": {"name": {"type": "token"}}}}
        }),
        json!({}),
    )?);

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let definition = Arc::clone(&definition);
            thread::spawn(move || {
                let resolver = definition.create_field_definition_resolver(IndexFormatVersion::CURRENT);
                let name = path("teachers.name");
                let teachers = path("teachers");
                for _ in 0..1_000 {
                    assert!(resolver.get_field_definition(&name, Some(&teachers)).is_some());
                    let collection = definition.metadata().last_observed_collection_name();
                    assert!(collection.starts_with("classes"));
                }
            })
        })
        .collect();

    for i in 0..100 {
        definition
            .metadata()
            .set_last_observed_collection_name(format!("classes_{i}"));
    }
    for reader in readers {
        reader.join().expect("reader thread panicked");
    }
    assert_eq!(&*definition.metadata().last_observed_collection_name(), "classes_99");
    Ok(())
}
