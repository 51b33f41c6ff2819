//! Mock content client for unit testing.
//!
//! This module provides an in-memory client that can be used in tests
//! without making real network requests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::CmsError;

use super::client::ContentApi;
use super::types::{record_from_form, ContentRecord, ContentResponse, FormFile, Order, QueryOptions};

/// Configuration for mock client behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Whether to fail single-record requests.
    pub fail_content: bool,
    /// Whether to fail list requests.
    pub fail_contents: bool,
    /// Whether to fail create requests.
    pub fail_create: bool,
    /// Whether create requests succeed with an empty `data` array.
    pub empty_create: bool,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

/// A create call seen by the mock.
#[derive(Debug, Clone)]
pub struct CreateCall {
    /// Content type created.
    pub content_type: String,
    /// Form fields as sent.
    pub fields: Vec<(String, String)>,
    /// Number of file parts sent.
    pub file_count: usize,
}

#[derive(Debug, Default)]
struct Store {
    /// Records by content type, then id.
    records: BTreeMap<String, BTreeMap<u64, ContentRecord>>,
    creates: Vec<CreateCall>,
    next_id: u64,
}

/// In-memory content client for testing.
#[derive(Debug, Clone)]
pub struct MockCmsClient {
    /// Mock configuration.
    config: MockConfig,
    store: Arc<Mutex<Store>>,
}

impl MockCmsClient {
    /// Create a new mock client with default configuration.
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create a mock client with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            store: Arc::new(Mutex::new(Store {
                next_id: 1,
                ..Default::default()
            })),
        }
    }

    /// Store a record. Its `id` field is set to `id`.
    pub fn insert(&self, content_type: &str, id: u64, mut record: ContentRecord) {
        record.insert("id".to_string(), json!(id));
        let mut store = self.store.lock().unwrap();
        store.next_id = store.next_id.max(id.saturating_add(1));
        store
            .records
            .entry(content_type.to_string())
            .or_default()
            .insert(id, record);
    }

    /// Store a record built from a JSON object literal.
    pub fn insert_json(&self, content_type: &str, id: u64, value: Value) {
        let record = match value {
            Value::Object(map) => map,
            _ => ContentRecord::new(),
        };
        self.insert(content_type, id, record);
    }

    /// Create calls received so far.
    pub fn creates(&self) -> Vec<CreateCall> {
        self.store.lock().unwrap().creates.clone()
    }

    /// Clear all mock data.
    pub fn clear(&self) {
        let mut store = self.store.lock().unwrap();
        store.records.clear();
        store.creates.clear();
        store.next_id = 1;
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }
    }
}

impl Default for MockCmsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentApi for MockCmsClient {
    async fn content(&self, content_type: &str, id: u64) -> Result<ContentResponse, CmsError> {
        self.simulate_latency().await;

        if self.config.fail_content {
            return Err(CmsError::Mock("content"));
        }

        let record = {
            let store = self.store.lock().unwrap();
            store
                .records
                .get(content_type)
                .and_then(|records| records.get(&id))
                .cloned()
        };

        ContentResponse::from_records(record.into_iter().collect())
    }

    async fn contents(
        &self,
        content_type: &str,
        options: &QueryOptions,
    ) -> Result<ContentResponse, CmsError> {
        self.simulate_latency().await;

        if self.config.fail_contents {
            return Err(CmsError::Mock("contents"));
        }

        let mut records: Vec<ContentRecord> = {
            let store = self.store.lock().unwrap();
            store
                .records
                .get(content_type)
                .map(|records| records.values().cloned().collect())
                .unwrap_or_default()
        };

        if options.order == Order::Desc {
            records.reverse();
        }

        let offset = usize::try_from(options.offset).unwrap_or(0);
        let records = records.into_iter().skip(offset);
        let records: Vec<ContentRecord> = match usize::try_from(options.count) {
            Ok(count) => records.take(count).collect(),
            Err(_) => records.collect(),
        };

        ContentResponse::from_records(records)
    }

    async fn create(
        &self,
        content_type: &str,
        fields: &[(String, String)],
        files: Vec<FormFile>,
    ) -> Result<ContentResponse, CmsError> {
        self.simulate_latency().await;

        if self.config.fail_create {
            return Err(CmsError::Mock("create"));
        }

        let id = {
            let mut store = self.store.lock().unwrap();
            store.creates.push(CreateCall {
                content_type: content_type.to_string(),
                fields: fields.to_vec(),
                file_count: files.len(),
            });
            store.next_id
        };

        self.insert(content_type, id, record_from_form(fields));

        if self.config.empty_create {
            return ContentResponse::from_records(Vec::new());
        }

        let mut created = ContentRecord::new();
        created.insert("id".to_string(), json!(id));
        created.insert("status".to_string(), json!("public"));
        created.insert("type".to_string(), json!(content_type));
        ContentResponse::from_records(vec![created])
    }
}
