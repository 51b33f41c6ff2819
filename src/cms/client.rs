//! Ponzu content API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::CmsError;
use crate::metrics;

use super::types::{ContentResponse, FormFile, QueryOptions};

/// Remote content operations the front-end depends on.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Fetch a single record by type and id.
    async fn content(&self, content_type: &str, id: u64) -> Result<ContentResponse, CmsError>;

    /// Fetch a page of records of one type.
    async fn contents(
        &self,
        content_type: &str,
        options: &QueryOptions,
    ) -> Result<ContentResponse, CmsError>;

    /// Create a record from form fields and optional file parts.
    async fn create(
        &self,
        content_type: &str,
        fields: &[(String, String)],
        files: Vec<FormFile>,
    ) -> Result<ContentResponse, CmsError>;
}

/// HTTP client for a Ponzu CMS instance.
#[derive(Debug, Clone)]
pub struct PonzuClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL of the CMS, no trailing slash.
    host: String,
}

impl PonzuClient {
    /// Create a client from config.
    pub fn new(config: &Config) -> Result<Self, CmsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .connect_timeout(Duration::from_secs(2))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self::with_http(http, config.cms_base_url()))
    }

    /// Create a client around an existing reqwest client.
    pub fn with_http(http: reqwest::Client, host: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            http,
            host: host.trim_end_matches('/').to_string(),
        }
    }

    /// Get the CMS base URL.
    pub fn host(&self) -> &str {
        &self.host
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    /// Read a response, turning non-success statuses into errors.
    async fn read(
        operation: &'static str,
        content_type: &str,
        response: reqwest::Response,
    ) -> Result<ContentResponse, CmsError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CmsError::Status {
                operation,
                content_type: content_type.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        ContentResponse::from_body(body.to_vec())
    }

    async fn fetch_content(&self, content_type: &str, id: u64) -> Result<ContentResponse, CmsError> {
        let id = id.to_string();
        let response = self
            .http
            .get(self.url("/api/content"))
            .query(&[("type", content_type), ("id", id.as_str())])
            .send()
            .await?;

        Self::read("content", content_type, response).await
    }

    async fn fetch_contents(
        &self,
        content_type: &str,
        options: &QueryOptions,
    ) -> Result<ContentResponse, CmsError> {
        let count = options.count.to_string();
        let offset = options.offset.to_string();
        let order = options.order.to_string();

        let response = self
            .http
            .get(self.url("/api/contents"))
            .query(&[
                ("type", content_type),
                ("count", count.as_str()),
                ("offset", offset.as_str()),
                ("order", order.as_str()),
            ])
            .send()
            .await?;

        Self::read("contents", content_type, response).await
    }

    async fn submit(
        &self,
        content_type: &str,
        fields: &[(String, String)],
        files: Vec<FormFile>,
    ) -> Result<ContentResponse, CmsError> {
        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name.clone(), value.clone());
        }
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.content_type)?;
            form = form.part(file.field, part);
        }

        let response = self
            .http
            .post(self.url("/api/content/create"))
            .query(&[("type", content_type)])
            .multipart(form)
            .send()
            .await?;

        Self::read("create", content_type, response).await
    }
}

#[async_trait]
impl ContentApi for PonzuClient {
    #[instrument(skip(self), fields(host = %self.host))]
    async fn content(&self, content_type: &str, id: u64) -> Result<ContentResponse, CmsError> {
        let _timer = metrics::timer_cms_request("content");
        let result = self.fetch_content(content_type, id).await;
        match &result {
            Ok(response) => debug!(records = response.data.len(), "fetched content"),
            Err(_) => metrics::inc_cms_requests_failed("content"),
        }
        result
    }

    #[instrument(skip(self), fields(host = %self.host))]
    async fn contents(
        &self,
        content_type: &str,
        options: &QueryOptions,
    ) -> Result<ContentResponse, CmsError> {
        let _timer = metrics::timer_cms_request("contents");
        let result = self.fetch_contents(content_type, options).await;
        match &result {
            Ok(response) => debug!(records = response.data.len(), "fetched contents"),
            Err(_) => metrics::inc_cms_requests_failed("contents"),
        }
        result
    }

    #[instrument(skip(self, values, files), fields(host = %self.host, field_count = values.len()))]
    async fn create(
        &self,
        content_type: &str,
        values: &[(String, String)],
        files: Vec<FormFile>,
    ) -> Result<ContentResponse, CmsError> {
        let _timer = metrics::timer_cms_request("create");
        let result = self.submit(content_type, values, files).await;
        match &result {
            Ok(response) => debug!(records = response.data.len(), "created content"),
            Err(_) => metrics::inc_cms_requests_failed("create"),
        }
        result
    }
}
