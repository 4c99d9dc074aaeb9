//! CLI tool to run a Cypher query and print the resulting rows.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use neuquery_sdk::NeuQueryClient;

/// Transport used to fetch query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Arrow IPC stream endpoint
    Arrow,
    /// JSON table endpoint
    Json,
}

/// Run a Cypher query against a neuquery server
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Server base URL
    #[arg(long, default_value = "http://localhost:11000")]
    server: String,

    /// Dataset to query
    #[arg(long)]
    dataset: String,

    /// Bearer token for authenticated access
    #[arg(long)]
    token: Option<String>,

    /// Result transport
    #[arg(long, value_enum, default_value = "arrow")]
    format: Format,

    /// Cypher query text
    cypher: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let client = NeuQueryClient::with_token(args.server, args.token);

    let rows = match args.format {
        Format::Arrow => client.run_query(&args.dataset, &args.cypher).await?,
        Format::Json => client.run_query_json(&args.dataset, &args.cypher).await?,
    };

    println!("{} rows x {} columns", rows.num_rows(), rows.num_columns());
    println!("columns: {}", rows.columns().join(", "));
    for row in rows.rows() {
        println!("{}", serde_json::to_string(row)?);
    }

    Ok(())
}
