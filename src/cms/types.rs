//! Content record and query types for the Ponzu content API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::CmsError;

/// Content type of the single "About" record.
pub const ABOUT: &str = "About";
/// Content type of event records.
pub const EVENT: &str = "Event";

/// An opaque CMS record: field name to JSON value.
pub type ContentRecord = serde_json::Map<String, Value>;

/// Sort order for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Default)]
pub enum Order {
    /// Oldest first.
    #[strum(serialize = "ASC", serialize = "asc")]
    Asc,
    /// Newest first.
    #[strum(serialize = "DESC", serialize = "desc")]
    #[default]
    Desc,
}

/// Paging options for `contents` queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Number of records to return; `-1` returns all of them.
    pub count: i64,
    /// Number of records to skip.
    pub offset: i64,
    /// Sort order.
    pub order: Order,
}

impl QueryOptions {
    /// Options returning every record.
    pub fn all() -> Self {
        Self {
            count: -1,
            ..Self::default()
        }
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            count: 10,
            offset: 0,
            order: Order::Desc,
        }
    }
}

/// A file part sent along with a create request.
#[derive(Debug, Clone)]
pub struct FormFile {
    /// Form field name.
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type of the file.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Envelope {
    data: Vec<ContentRecord>,
}

/// Decoded API response plus the raw body it came from.
#[derive(Debug, Clone)]
pub struct ContentResponse {
    /// Records from the `data` array.
    pub data: Vec<ContentRecord>,
    /// The response body exactly as received.
    pub json: Vec<u8>,
}

impl ContentResponse {
    /// Decode a `{"data": [...]}` body, keeping the raw bytes.
    pub fn from_body(json: Vec<u8>) -> Result<Self, CmsError> {
        let envelope: Envelope = serde_json::from_slice(&json)?;
        Ok(Self {
            data: envelope.data,
            json,
        })
    }

    /// Build a response from records, serializing the envelope.
    pub fn from_records(data: Vec<ContentRecord>) -> Result<Self, CmsError> {
        let envelope = Envelope { data };
        let json = serde_json::to_vec(&envelope)?;
        Ok(Self {
            data: envelope.data,
            json,
        })
    }

    /// First record, or `NotFound` when the response is empty.
    pub fn first_record(
        &self,
        content_type: &str,
        id: Option<u64>,
    ) -> Result<&ContentRecord, CmsError> {
        self.data.first().ok_or_else(|| CmsError::NotFound {
            content_type: content_type.to_string(),
            id,
        })
    }

    /// Numeric `id` of the first record, as returned by a create call.
    /// An empty response is `MissingId`.
    pub fn created_id(&self, content_type: &str) -> Result<u64, CmsError> {
        let missing = || CmsError::MissingId {
            content_type: content_type.to_string(),
        };

        let id = self
            .data
            .first()
            .and_then(|record| record.get("id"))
            .ok_or_else(missing)?;

        if let Some(id) = id.as_u64() {
            return Ok(id);
        }

        // Ponzu may report ids as floats; round like `%.0f`.
        match id.as_f64() {
            Some(f) if f.is_finite() && f >= 0.0 => Ok(f.round() as u64),
            _ => Err(missing()),
        }
    }
}

/// Build a record from flat form fields the way the CMS stores them.
///
/// Dotted keys with a numeric suffix (`details.0`, `details.1`) collapse into
/// an array ordered by index. Other keys become string fields.
pub fn record_from_form(fields: &[(String, String)]) -> ContentRecord {
    let mut record = ContentRecord::new();
    let mut arrays: BTreeMap<&str, BTreeMap<usize, &str>> = BTreeMap::new();

    for (name, value) in fields {
        let indexed = name
            .rsplit_once('.')
            .and_then(|(base, idx)| idx.parse::<usize>().ok().map(|idx| (base, idx)));

        match indexed {
            Some((base, idx)) => {
                arrays.entry(base).or_default().insert(idx, value.as_str());
            }
            None => {
                record.insert(name.clone(), Value::String(value.clone()));
            }
        }
    }

    for (base, items) in arrays {
        let values = items
            .into_values()
            .map(|v| Value::String(v.to_string()))
            .collect();
        record.insert(base.to_string(), Value::Array(values));
    }

    record
}
