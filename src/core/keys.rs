//! Object key parsing
//!
//! Trigger keys look like `unprocessed/<correlation-id><ext>`. Every helper
//! searches for its delimiters explicitly and reports
//! [`CourierError::MalformedKey`] when one is missing.

use crate::config::StorageConfig;
use crate::domain::{CorrelationId, CourierError, Result};

/// Separates the area prefix from the file name
pub const KEY_SEPARATOR: char = '/';

/// Starts the extension
pub const EXTENSION_MARKER: char = '.';

/// Delimiter used when listing a relocation set
pub const LIST_DELIMITER: &str = "/";

/// Correlation identifier of a key: the text strictly between the first
/// separator and the first extension marker
///
/// # Errors
///
/// Fails if either delimiter is absent, the separator comes after the
/// marker, or the text between them is empty or contains another separator.
///
/// # Examples
///
/// ```
/// use courier::core::keys::correlation_id;
///
/// let id = correlation_id("unprocessed/1234567890.pdf").unwrap();
/// assert_eq!(id.as_str(), "1234567890");
/// assert!(correlation_id("1234567890.pdf").is_err());
/// ```
pub fn correlation_id(key: &str) -> Result<CorrelationId> {
    let separator = find(key, KEY_SEPARATOR)?;
    let marker = find(key, EXTENSION_MARKER)?;

    if separator > marker {
        return Err(CourierError::MalformedKey(format!(
            "'{key}': separator '{KEY_SEPARATOR}' after extension marker '{EXTENSION_MARKER}'"
        )));
    }

    CorrelationId::new(&key[separator + 1..marker])
        .map_err(|e| CourierError::MalformedKey(format!("'{key}': {e}")))
}

/// Everything after the first separator
pub fn file_name(key: &str) -> Result<&str> {
    let separator = find(key, KEY_SEPARATOR)?;
    let name = &key[separator + 1..];
    if name.is_empty() {
        return Err(CourierError::MalformedKey(format!(
            "'{key}': nothing after '{KEY_SEPARATOR}'"
        )));
    }
    Ok(name)
}

/// Everything from the first extension marker, inclusive
pub fn extension(key: &str) -> Result<&str> {
    let marker = find(key, EXTENSION_MARKER)?;
    Ok(&key[marker..])
}

fn find(key: &str, delimiter: char) -> Result<usize> {
    key.find(delimiter).ok_or_else(|| {
        CourierError::MalformedKey(format!("'{key}': missing '{delimiter}'"))
    })
}

/// All structural fields of a trigger key, parsed once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKey {
    /// Area the key lives in, e.g. `unprocessed`
    pub area: String,
    pub correlation_id: CorrelationId,
    pub file_name: String,
    pub extension: String,
}

impl ParsedKey {
    /// Parse a key
    ///
    /// # Errors
    ///
    /// Returns [`CourierError::MalformedKey`] under the same rules as
    /// [`correlation_id`].
    pub fn parse(key: &str) -> Result<Self> {
        let correlation_id = correlation_id(key)?;
        let file_name = file_name(key)?.to_string();
        let extension = extension(key)?.to_string();
        let area = key[..find(key, KEY_SEPARATOR)?].to_string();

        Ok(Self {
            area,
            correlation_id,
            file_name,
            extension,
        })
    }
}

/// Where objects live inside a bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    unprocessed: String,
    processed: String,
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self::new("unprocessed", "processed")
    }
}

impl KeyLayout {
    pub fn new(unprocessed: impl Into<String>, processed: impl Into<String>) -> Self {
        Self {
            unprocessed: unprocessed.into(),
            processed: processed.into(),
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.unprocessed_prefix, &config.processed_prefix)
    }

    /// Area holding objects awaiting processing
    pub fn unprocessed_area(&self) -> &str {
        &self.unprocessed
    }

    /// Area holding processed objects
    pub fn processed_area(&self) -> &str {
        &self.processed
    }

    /// `unprocessed/<id>.json`
    pub fn metadata_key(&self, id: &CorrelationId) -> String {
        format!("{}{KEY_SEPARATOR}{id}.json", self.unprocessed)
    }

    /// `unprocessed/<id>`, the listing prefix of a relocation set
    pub fn relocation_prefix(&self, id: &CorrelationId) -> String {
        format!("{}{KEY_SEPARATOR}{id}", self.unprocessed)
    }

    /// `processed/<file_name>`
    pub fn processed_key(&self, file_name: &str) -> String {
        format!("{}{KEY_SEPARATOR}{file_name}", self.processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use test_case::test_case;

    #[test_case("unprocessed/1234567890.pdf", "1234567890" ; "pdf key")]
    #[test_case("unprocessed/1234567890.json", "1234567890" ; "metadata key")]
    #[test_case("unprocessed/ABC-77.tar.gz", "ABC-77" ; "double extension")]
    #[test_case("processed/42.pdf", "42" ; "processed area")]
    fn test_correlation_id_well_formed(key: &str, expected: &str) {
        assert_eq!(correlation_id(key).unwrap().as_str(), expected);
    }

    #[test_case("1234567890.pdf" ; "missing separator")]
    #[test_case("unprocessed/1234567890" ; "missing extension marker")]
    #[test_case("v1.2/1234567890" ; "separator after marker")]
    #[test_case("unprocessed/.pdf" ; "empty identifier")]
    #[test_case("unprocessed/nested/1.pdf" ; "nested path")]
    #[test_case("" ; "empty key")]
    fn test_correlation_id_malformed(key: &str) {
        let err = correlation_id(key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedKey);
    }

    #[test_case("unprocessed/1234567890.pdf", "1234567890.pdf" ; "pdf")]
    #[test_case("unprocessed/1234567890.json", "1234567890.json" ; "json")]
    #[test_case("unprocessed/a/b.pdf", "a/b.pdf" ; "keeps deeper segments")]
    fn test_file_name(key: &str, expected: &str) {
        assert_eq!(file_name(key).unwrap(), expected);
    }

    #[test_case("unprocessed/1234567890.pdf", ".pdf" ; "pdf")]
    #[test_case("unprocessed/1.tar.gz", ".tar.gz" ; "starts at first marker")]
    fn test_extension(key: &str, expected: &str) {
        assert_eq!(extension(key).unwrap(), expected);
    }

    #[test]
    fn test_file_name_and_extension_malformed() {
        assert!(file_name("no-separator.pdf").is_err());
        assert!(file_name("unprocessed/").is_err());
        assert!(extension("unprocessed/no-marker").is_err());
    }

    #[test]
    fn test_parsed_key() {
        let parsed = ParsedKey::parse("unprocessed/1234567890.pdf").unwrap();

        assert_eq!(parsed.area, "unprocessed");
        assert_eq!(parsed.correlation_id.as_str(), "1234567890");
        assert_eq!(parsed.file_name, "1234567890.pdf");
        assert_eq!(parsed.extension, ".pdf");
    }

    #[test]
    fn test_key_layout() {
        let layout = KeyLayout::default();
        let id = CorrelationId::new("1234567890").unwrap();

        assert_eq!(layout.metadata_key(&id), "unprocessed/1234567890.json");
        assert_eq!(layout.relocation_prefix(&id), "unprocessed/1234567890");
        assert_eq!(
            layout.processed_key("1234567890.pdf"),
            "processed/1234567890.pdf"
        );
    }

    #[test]
    fn test_key_layout_from_config() {
        let config = StorageConfig {
            unprocessed_prefix: "inbox".to_string(),
            processed_prefix: "archive".to_string(),
            ..Default::default()
        };
        let layout = KeyLayout::from_config(&config);
        let id = CorrelationId::new("7").unwrap();

        assert_eq!(layout.metadata_key(&id), "inbox/7.json");
        assert_eq!(layout.processed_key("7.pdf"), "archive/7.pdf");
    }
}
