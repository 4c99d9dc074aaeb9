//! Core data model shared by the neuquery client and CLI tools.

pub mod models;

pub use models::{QueryRequest, RowSet};

/// Endpoint serving Cypher results as an Arrow IPC stream.
pub const ARROW_ENDPOINT: &str = "/api/custom/arrow";

/// Endpoint serving Cypher results as a JSON table.
pub const JSON_ENDPOINT: &str = "/api/custom/custom";

/// Media type the server sets on Arrow IPC stream responses.
pub const ARROW_STREAM_MEDIA_TYPE: &str = "application/vnd.apache.arrow.stream";
