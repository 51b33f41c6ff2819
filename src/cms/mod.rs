//! Content module for the remote Ponzu CMS.
//!
//! This module handles:
//! - Record, query and response types
//! - The `ContentApi` seam and the HTTP client behind it
//! - Mock client for testing

pub mod client;
pub mod mock;
pub mod types;

pub use client::{ContentApi, PonzuClient};
pub use mock::{MockCmsClient, MockConfig};
pub use types::{
    record_from_form, ContentRecord, ContentResponse, FormFile, Order, QueryOptions, ABOUT, EVENT,
};
