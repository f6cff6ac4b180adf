//! HTTP client for a Fritz server.
//!
//! [`HttpAdapter`] implements [`fritz_core::adapter::PersistenceAdapter`] over
//! the `/api/v1` REST routes, so editing sessions and entity forms can run
//! against a remote server exactly as they do against the in-memory adapter.

pub mod client;
pub mod config;
pub mod error;

pub use client::HttpAdapter;
pub use config::ClientConfig;
pub use error::ClientError;
