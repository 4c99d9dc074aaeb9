//! neuquery SDK - HTTP client for the query service.
//!
//! Provides a small async API for running Cypher queries against a
//! neuquery server and materializing the columnar results as rows.

pub mod client;
pub mod error;

pub use client::NeuQueryClient;
pub use error::QueryError;
pub use neuquery_core::RowSet;
