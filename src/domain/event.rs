//! Trigger event model
//!
//! Object-creation notifications arrive in the S3 event notification layout.
//! Only the bucket name and object key of each record are used.

use crate::domain::ids::ObjectReference;
use crate::domain::{CourierError, Result};
use serde::{Deserialize, Serialize};

/// A batch of object-creation notifications
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

/// One notification record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "eventName", default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,

    pub s3: S3Entity,
}

/// Storage section of a notification record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketEntity,
    pub object: ObjectEntity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketEntity {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectEntity {
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl TriggerEvent {
    /// Parse an event notification document
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::InvalidEvent`] if the document is not a
    /// notification or a record has an empty bucket or key.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let event: TriggerEvent =
            serde_json::from_slice(bytes).map_err(|e| CourierError::InvalidEvent(e.to_string()))?;

        for (index, record) in event.records.iter().enumerate() {
            if record.s3.bucket.name.trim().is_empty() {
                return Err(CourierError::InvalidEvent(format!(
                    "record {index} has an empty bucket name"
                )));
            }
            if record.s3.object.key.trim().is_empty() {
                return Err(CourierError::InvalidEvent(format!(
                    "record {index} has an empty object key"
                )));
            }
        }

        Ok(event)
    }

    /// Build an event from explicit references
    pub fn from_references(references: impl IntoIterator<Item = ObjectReference>) -> Self {
        let records = references
            .into_iter()
            .map(|reference| EventRecord {
                event_name: None,
                s3: S3Entity {
                    bucket: BucketEntity {
                        name: reference.bucket().to_string(),
                    },
                    object: ObjectEntity {
                        key: reference.key().to_string(),
                        size: None,
                    },
                },
            })
            .collect();

        Self { records }
    }

    /// Object references in record order
    pub fn references(&self) -> Vec<ObjectReference> {
        self.records
            .iter()
            .map(|record| ObjectReference::new(&record.s3.bucket.name, &record.s3.object.key))
            .collect()
    }
}
