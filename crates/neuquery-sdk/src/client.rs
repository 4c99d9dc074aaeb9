//! HTTP client for running Cypher queries.

use std::io::Cursor;

use arrow::ipc::reader::StreamReader;
use arrow::json::writer::JsonArray;
use arrow::json::WriterBuilder;
use arrow::record_batch::RecordBatch;
use serde::Deserialize;
use serde_json::{Map, Value};

use neuquery_core::{
    QueryRequest, RowSet, ARROW_ENDPOINT, ARROW_STREAM_MEDIA_TYPE, JSON_ENDPOINT,
};

use crate::error::QueryError;

/// Client for a neuquery server.
///
/// Each query call is a single request/response exchange with no retries
/// and no timeout beyond the transport defaults.
pub struct NeuQueryClient {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

/// Table shape returned by the JSON results endpoint.
#[derive(Debug, Deserialize)]
struct JsonTable {
    columns: Vec<String>,
    data: Vec<Vec<Value>>,
}

impl NeuQueryClient {
    /// Create a client for unauthenticated access.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_token(base_url, None)
    }

    /// Create a client that sends `Authorization: Bearer <token>` with
    /// every request. An empty token is treated as absent.
    pub fn with_token(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: token
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            client: reqwest::Client::new(),
        }
    }

    /// Update the bearer token at runtime (rotation, refresh).
    pub fn set_auth_token(&mut self, token: Option<String>) {
        self.auth_token = token
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
    }

    /// Run a Cypher query and decode the Arrow IPC stream response into
    /// a row-major [`RowSet`].
    pub async fn run_query(&self, dataset: &str, cypher: &str) -> Result<RowSet, QueryError> {
        let request = validated_request(dataset, cypher)?;
        let url = format!("{}{}", self.base_url, ARROW_ENDPOINT);
        tracing::info!(%url, dataset, "sending query request");

        let response = self.post_json(&url, &request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::Request {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains(ARROW_STREAM_MEDIA_TYPE) {
            return Err(QueryError::Protocol(content_type));
        }

        let body = response.bytes().await?;
        let rows = decode_arrow_stream(&body)?;
        tracing::info!(
            rows = rows.num_rows(),
            columns = rows.num_columns(),
            "decoded Arrow table"
        );

        Ok(rows)
    }

    /// Run a Cypher query against the JSON results endpoint.
    ///
    /// Same request shape as [`run_query`](Self::run_query), but the
    /// response is a JSON table instead of an Arrow stream.
    pub async fn run_query_json(&self, dataset: &str, cypher: &str) -> Result<RowSet, QueryError> {
        let request = validated_request(dataset, cypher)?;
        let url = format!("{}{}", self.base_url, JSON_ENDPOINT);
        tracing::info!(%url, dataset, "sending query request");

        let response = self.post_json(&url, &request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::Request {
                status: status.as_u16(),
                body,
            });
        }

        let table: JsonTable = response.json().await?;
        let rows = rows_from_json_table(table)?;
        tracing::info!(
            rows = rows.num_rows(),
            columns = rows.num_columns(),
            "decoded JSON table"
        );

        Ok(rows)
    }

    fn post_json(&self, url: &str, request: &QueryRequest) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(token) = self.auth_token.as_deref() {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder
    }
}

fn validated_request(dataset: &str, cypher: &str) -> Result<QueryRequest, QueryError> {
    if cypher.trim().is_empty() {
        return Err(QueryError::Validation(
            "cypher query must not be empty".to_string(),
        ));
    }
    if dataset.trim().is_empty() {
        return Err(QueryError::Validation(
            "dataset name must not be empty".to_string(),
        ));
    }
    Ok(QueryRequest {
        cypher: cypher.to_string(),
        dataset: dataset.to_string(),
    })
}

/// Decode a complete Arrow IPC stream into a row set.
fn decode_arrow_stream(bytes: &[u8]) -> Result<RowSet, QueryError> {
    let reader = StreamReader::try_new(Cursor::new(bytes), None)
        .map_err(|err| QueryError::Decode(err.to_string()))?;

    let columns: Vec<String> = reader
        .schema()
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect();

    let mut batches: Vec<RecordBatch> = Vec::new();
    for batch in reader {
        batches.push(batch.map_err(|err| QueryError::Decode(err.to_string()))?);
    }

    let rows = project_rows(&batches)?;
    Ok(RowSet::new(columns, rows))
}

/// Project column-major record batches into row objects.
///
/// Nulls are kept explicit so every row exposes every column.
fn project_rows(batches: &[RecordBatch]) -> Result<Vec<Map<String, Value>>, QueryError> {
    if batches.iter().all(|batch| batch.num_rows() == 0) {
        return Ok(Vec::new());
    }

    let mut writer = WriterBuilder::new()
        .with_explicit_nulls(true)
        .build::<_, JsonArray>(Vec::new());
    let refs: Vec<&RecordBatch> = batches.iter().collect();
    writer
        .write_batches(&refs)
        .map_err(|err| QueryError::Decode(err.to_string()))?;
    writer
        .finish()
        .map_err(|err| QueryError::Decode(err.to_string()))?;

    serde_json::from_slice(&writer.into_inner()).map_err(|err| QueryError::Decode(err.to_string()))
}

/// Convert the JSON endpoint's column/data table into a row set.
fn rows_from_json_table(table: JsonTable) -> Result<RowSet, QueryError> {
    let mut rows = Vec::with_capacity(table.data.len());
    for (index, values) in table.data.into_iter().enumerate() {
        if values.len() != table.columns.len() {
            return Err(QueryError::Decode(format!(
                "row {} has {} values but the table has {} columns",
                index,
                values.len(),
                table.columns.len()
            )));
        }
        rows.push(table.columns.iter().cloned().zip(values).collect());
    }
    Ok(RowSet::new(table.columns, rows))
}
