//! Integration tests for the query client against a mocked server.

use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::ipc::writer::StreamWriter;
use arrow::record_batch::RecordBatch;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use neuquery_sdk::{NeuQueryClient, QueryError};

const ARROW_STREAM: &str = "application/vnd.apache.arrow.stream";

/// Encode a small two-column result the way the server would.
fn sample_arrow_stream() -> Vec<u8> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("type", DataType::Utf8, true),
        Field::new("count", DataType::Int64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(vec![Some("KC"), None, Some("PN")])) as ArrayRef,
            Arc::new(Int64Array::from(vec![420, 77, 12])) as ArrayRef,
        ],
    )
    .expect("build record batch");

    let mut writer = StreamWriter::try_new(Vec::new(), &schema).expect("create stream writer");
    writer.write(&batch).expect("write batch");
    writer.finish().expect("finish stream");
    writer.into_inner().expect("take buffer")
}

#[tokio::test]
async fn run_query_decodes_arrow_stream() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/custom/arrow"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "cypher": "MATCH (n) RETURN n.type AS type, count(*) AS count",
            "dataset": "hemibrain"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sample_arrow_stream(), ARROW_STREAM))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = NeuQueryClient::new(mock_server.uri());
    let rows = client
        .run_query(
            "hemibrain",
            "MATCH (n) RETURN n.type AS type, count(*) AS count",
        )
        .await
        .expect("query succeeds");

    assert_eq!(rows.num_rows(), 3);
    assert_eq!(rows.num_columns(), 2);
    assert_eq!(rows.columns(), ["type".to_string(), "count".to_string()]);
    assert_eq!(rows.rows()[0]["type"], json!("KC"));
    assert_eq!(rows.rows()[0]["count"], json!(420));
    // Nulls stay visible in the row projection.
    assert_eq!(rows.rows()[1]["type"], Value::Null);
    assert_eq!(rows.rows()[2]["count"], json!(12));
}

#[tokio::test]
async fn run_query_sends_bearer_token_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/custom/arrow"))
        .and(header("Authorization", "Bearer sekrit"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sample_arrow_stream(), ARROW_STREAM))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = NeuQueryClient::with_token(mock_server.uri(), Some("sekrit".to_string()));
    client
        .run_query("hemibrain", "MATCH (n) RETURN n LIMIT 1")
        .await
        .expect("authenticated query succeeds");
}

#[tokio::test]
async fn run_query_surfaces_http_error_with_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/custom/arrow"))
        .respond_with(ResponseTemplate::new(400).set_body_string("dataset not found: nope"))
        .mount(&mock_server)
        .await;

    let client = NeuQueryClient::new(mock_server.uri());
    let err = client
        .run_query("nope", "MATCH (n) RETURN n")
        .await
        .expect_err("non-2xx must fail");

    match err {
        QueryError::Request { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "dataset not found: nope");
        }
        other => panic!("expected Request error, got {other:?}"),
    }
}

#[tokio::test]
async fn run_query_rejects_unexpected_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/custom/arrow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": []})))
        .mount(&mock_server)
        .await;

    let client = NeuQueryClient::new(mock_server.uri());
    let err = client
        .run_query("hemibrain", "MATCH (n) RETURN n")
        .await
        .expect_err("wrong content type must fail");

    match err {
        QueryError::Protocol(content_type) => {
            assert!(content_type.contains("application/json"));
        }
        other => panic!("expected Protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn run_query_validates_inputs_before_sending() {
    // Nothing is listening here; a validation failure must never reach
    // the network.
    let client = NeuQueryClient::new("http://127.0.0.1:9");

    let err = client
        .run_query("hemibrain", "")
        .await
        .expect_err("empty cypher must fail");
    assert!(matches!(err, QueryError::Validation(_)));

    let err = client
        .run_query("", "MATCH (n) RETURN n")
        .await
        .expect_err("empty dataset must fail");
    assert!(matches!(err, QueryError::Validation(_)));
}

#[tokio::test]
async fn run_query_json_builds_rowset_from_table() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/custom/custom"))
        .and(body_json(json!({
            "cypher": "MATCH (n) RETURN n.type AS type, count(*) AS count",
            "dataset": "hemibrain"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "columns": ["type", "count"],
            "data": [["KC", 420], ["PN", 12]]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = NeuQueryClient::new(mock_server.uri());
    let rows = client
        .run_query_json(
            "hemibrain",
            "MATCH (n) RETURN n.type AS type, count(*) AS count",
        )
        .await
        .expect("query succeeds");

    assert_eq!(rows.num_rows(), 2);
    assert_eq!(rows.columns(), ["type".to_string(), "count".to_string()]);
    assert_eq!(rows.rows()[1]["type"], json!("PN"));

    let counts = rows.column("count").expect("known column");
    assert_eq!(counts, vec![&json!(420), &json!(12)]);
}

#[tokio::test]
async fn run_query_json_surfaces_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/custom/custom"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&mock_server)
        .await;

    let client = NeuQueryClient::new(mock_server.uri());
    let err = client
        .run_query_json("hemibrain", "MATCH (n) RETURN n")
        .await
        .expect_err("non-2xx must fail");

    match err {
        QueryError::Request { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "unauthorized");
        }
        other => panic!("expected Request error, got {other:?}"),
    }
}
