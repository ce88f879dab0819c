//! Identity and placement of an index, shared by search and vector indexes.

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use strata_core::{Error, IndexId, Result};

/// The view an index was defined on and the pipeline it resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDefinition {
    pub name: String,
    #[serde(default)]
    pub effective_pipeline: Vec<Value>,
}

impl ViewDefinition {
    pub fn new(name: impl Into<String>, effective_pipeline: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            effective_pipeline,
        }
    }
}

/// Everything about an index that is not its mapping.
///
/// The last observed collection name is the only field that changes after construction; it is
/// updated when the source collection is renamed.
pub struct IndexMetadata {
    index_id: IndexId,
    name: String,
    database: String,
    last_observed_collection_name: RwLock<Arc<str>>,
    collection_uuid: Uuid,
    view: Option<ViewDefinition>,
    num_partitions: u32,
    definition_version: Option<i64>,
    definition_version_created_at: Option<DateTime<Utc>>,
}

impl IndexMetadata {
    pub fn builder(
        index_id: IndexId,
        name: impl Into<String>,
        database: impl Into<String>,
        collection_name: impl Into<String>,
        collection_uuid: Uuid,
    ) -> IndexMetadataBuilder {
        IndexMetadataBuilder {
            document: MetadataDocument {
                index_id,
                name: name.into(),
                database: database.into(),
                last_observed_collection_name: collection_name.into(),
                collection_uuid,
                view: None,
                num_partitions: 1,
                definition_version: None,
                definition_version_created_at: None,
            },
        }
    }

    pub fn index_id(&self) -> IndexId {
        self.index_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn last_observed_collection_name(&self) -> Arc<str> {
        Arc::clone(&self.last_observed_collection_name.read())
    }

    pub fn set_last_observed_collection_name(&self, name: impl Into<Arc<str>>) {
        *self.last_observed_collection_name.write() = name.into();
    }

    pub fn collection_uuid(&self) -> Uuid {
        self.collection_uuid
    }

    pub fn view(&self) -> Option<&ViewDefinition> {
        self.view.as_ref()
    }

    pub fn num_partitions(&self) -> u32 {
        self.num_partitions
    }

    pub fn definition_version(&self) -> Option<i64> {
        self.definition_version
    }

    pub fn definition_version_created_at(&self) -> Option<DateTime<Utc>> {
        self.definition_version_created_at
    }

    /// A copy bound to `view`.
    pub fn with_view(&self, view: ViewDefinition) -> Self {
        let mut copy = self.clone();
        copy.view = Some(view);
        copy
    }

    fn to_document(&self) -> MetadataDocument {
        MetadataDocument {
            index_id: self.index_id,
            name: self.name.clone(),
            database: self.database.clone(),
            last_observed_collection_name: self.last_observed_collection_name().to_string(),
            collection_uuid: self.collection_uuid,
            view: self.view.clone(),
            num_partitions: self.num_partitions,
            definition_version: self.definition_version,
            definition_version_created_at: self.definition_version_created_at,
        }
    }
}

impl Clone for IndexMetadata {
    fn clone(&self) -> Self {
        Self {
            index_id: self.index_id,
            name: self.name.clone(),
            database: self.database.clone(),
            last_observed_collection_name: RwLock::new(self.last_observed_collection_name()),
            collection_uuid: self.collection_uuid,
            view: self.view.clone(),
            num_partitions: self.num_partitions,
            definition_version: self.definition_version,
            definition_version_created_at: self.definition_version_created_at,
        }
    }
}

impl PartialEq for IndexMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.index_id == other.index_id
            && self.name == other.name
            && self.database == other.database
            && self.last_observed_collection_name() == other.last_observed_collection_name()
            && self.collection_uuid == other.collection_uuid
            && self.view == other.view
            && self.num_partitions == other.num_partitions
            && self.definition_version == other.definition_version
            && self.definition_version_created_at.map(|t| t.timestamp())
                == other.definition_version_created_at.map(|t| t.timestamp())
    }
}

impl fmt::Debug for IndexMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexMetadata")
            .field("index_id", &self.index_id)
            .field("name", &self.name)
            .field("database", &self.database)
            .field("collection", &self.last_observed_collection_name())
            .field("collection_uuid", &self.collection_uuid)
            .field("view", &self.view)
            .field("num_partitions", &self.num_partitions)
            .field("definition_version", &self.definition_version)
            .finish()
    }
}

/// `<id> (index <name> collection <coll> (<uuid>) in database <db>)`
impl fmt::Display for IndexMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let collection = self.last_observed_collection_name();
        write!(f, "{} (index {} ", self.index_id, self.name)?;
        match &self.view {
            Some(view) => write!(f, "view '{}' on collection '{collection}'", view.name)?,
            None => write!(f, "collection {collection}")?,
        }
        write!(
            f,
            " ({}) in database {})",
            self.collection_uuid, self.database
        )
    }
}

impl Serialize for IndexMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for IndexMetadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let document = MetadataDocument::deserialize(deserializer)?;
        IndexMetadata::try_from(document).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataDocument {
    #[serde(rename = "indexID")]
    index_id: IndexId,
    name: String,
    database: String,
    last_observed_collection_name: String,
    #[serde(rename = "collectionUUID")]
    collection_uuid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    view: Option<ViewDefinition>,
    #[serde(default = "default_num_partitions")]
    num_partitions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    definition_version: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "created_at_format"
    )]
    definition_version_created_at: Option<DateTime<Utc>>,
}

fn default_num_partitions() -> u32 {
    1
}

impl TryFrom<MetadataDocument> for IndexMetadata {
    type Error = Error;

    fn try_from(document: MetadataDocument) -> Result<Self> {
        if document.name.is_empty() {
            return Err(Error::InvalidDefinition("index name cannot be empty".to_string()));
        }
        if document.num_partitions < 1 {
            return Err(Error::InvalidDefinition(
                "numPartitions must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            index_id: document.index_id,
            name: document.name,
            database: document.database,
            last_observed_collection_name: RwLock::new(Arc::from(
                document.last_observed_collection_name,
            )),
            collection_uuid: document.collection_uuid,
            view: document.view,
            num_partitions: document.num_partitions,
            definition_version: document.definition_version,
            definition_version_created_at: document
                .definition_version_created_at
                .and_then(|t| t.with_nanosecond(0)),
        })
    }
}

/// RFC 3339 with second granularity.
mod created_at_format {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => serializer.serialize_str(&super::format_created_at(time)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|time| time.with_timezone(&Utc))
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
    }
}

pub struct IndexMetadataBuilder {
    document: MetadataDocument,
}

impl IndexMetadataBuilder {
    pub fn view(mut self, view: ViewDefinition) -> Self {
        self.document.view = Some(view);
        self
    }

    pub fn num_partitions(mut self, num_partitions: u32) -> Self {
        self.document.num_partitions = num_partitions;
        self
    }

    pub fn definition_version(mut self, version: i64, created_at: Option<DateTime<Utc>>) -> Self {
        self.document.definition_version = Some(version);
        self.document.definition_version_created_at = created_at;
        self
    }

    pub fn build(self) -> Result<IndexMetadata> {
        IndexMetadata::try_from(self.document)
    }
}

/// Second-granularity text form used when encoding `definitionVersionCreatedAt`.
pub fn format_created_at(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}
