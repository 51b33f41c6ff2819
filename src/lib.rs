//! HTML front-end for a Ponzu content API.
//!
//! Serves an "About" page and a list of "Event" records fetched from the CMS,
//! and accepts a form that creates new events through the same API.
//!
//! ```text
//! GET  /            index with a link to the events list
//! GET  /about       About #1 (title + rich text)
//! GET  /events      all events as HTML, or ?format=json for the raw CMS body
//! POST /events      multipart form -> CMS create -> 302 to /event/{id}
//! GET  /event/{id}  a single event
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types and their HTTP mapping
//! - [`cms`]: Content API trait, Ponzu client and mock client
//! - [`render`]: Inline page templates
//! - [`api`]: HTTP router and handlers
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod cms;
pub mod config;
pub mod error;
pub mod metrics;
pub mod render;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
