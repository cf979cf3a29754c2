//! Fulfillment metadata model
//!
//! The JSON document stored next to each artifact names the recipient and the
//! policy holder. [`MetadataDocument`] mirrors the wire layout; it is converted
//! into the validated [`FulfillmentMetadata`] before anything is sent.

use crate::domain::{CourierError, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Sender and recipient addresses for the notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub from_address: String,
    pub to_address: String,
}

/// Policy holder record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub holder_name: String,

    /// Non-empty address lines, in document order (at most three)
    pub address_lines: Vec<String>,

    pub city: String,
    pub postal_code: Option<u64>,
    pub phone: Option<u64>,

    /// Names the notification subject and the attachment
    pub policy_number: u64,
}

/// Validated metadata for one correlation identifier
///
/// Loaded per pipeline run, consumed by the notifier and then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentMetadata {
    pub recipient: Recipient,
    pub record: PolicyRecord,
}

impl FulfillmentMetadata {
    /// Decode and validate a metadata document
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::Decode`] if the bytes are not JSON, a required
    /// field is missing or ill-typed, or an address is blank.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let document: MetadataDocument =
            serde_json::from_slice(bytes).map_err(|e| CourierError::Decode(e.to_string()))?;
        document.try_into()
    }

    /// Policy number rendered as digits
    pub fn policy_number(&self) -> String {
        self.record.policy_number.to_string()
    }
}

/// Wire layout of the metadata document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub email: EmailSection,
    pub data: DataSection,
}

/// `email` section of the metadata document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSection {
    pub from: String,
    pub to: String,
}

/// `data` section of the metadata document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSection {
    pub name: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub address_line1: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub address_line2: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub address_line3: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub city: String,

    #[serde(default)]
    pub pin_code: Option<u64>,

    #[serde(default)]
    pub mobile_number: Option<u64>,

    pub policy_number: u64,
}

/// Optional text fields treat `null` like an absent field
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl TryFrom<MetadataDocument> for FulfillmentMetadata {
    type Error = CourierError;

    fn try_from(document: MetadataDocument) -> Result<Self> {
        let MetadataDocument { email, data } = document;

        if email.from.trim().is_empty() {
            return Err(CourierError::Decode("email.from is empty".to_string()));
        }
        if email.to.trim().is_empty() {
            return Err(CourierError::Decode("email.to is empty".to_string()));
        }

        let address_lines = [data.address_line1, data.address_line2, data.address_line3]
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect();

        Ok(Self {
            recipient: Recipient {
                from_address: email.from,
                to_address: email.to,
            },
            record: PolicyRecord {
                holder_name: data.name,
                address_lines,
                city: data.city,
                postal_code: data.pin_code,
                phone: data.mobile_number,
                policy_number: data.policy_number,
            },
        })
    }
}
