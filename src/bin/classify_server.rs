//! classify-server: 批量文本分类 HTTP 服务
//!
//! Usage:
//!   classify-server            Serve POST /predit/text using settings from the environment
//!   classify-server version    Show version information
//!   classify-server help       Show this help message

use ai_detect_rust::batch;
use ai_detect_rust::classifier::{RemoteClassifier, RemoteClassifierConfig};
use ai_detect_rust::server::{self, AppState};
use ai_detect_rust::{BatchConfig, ServerConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        None | Some("serve") => run().await,
        Some("version" | "--version" | "-V") => {
            println!("classify-server {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some("help" | "--help" | "-h") => {
            print_usage();
            Ok(())
        }
        Some(other) => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"classify-server: micro-batching text classification service

USAGE:
    classify-server [COMMAND]

COMMANDS:
    serve                       Start the HTTP server (default)
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    BATCH_TIMEOUT               Collection window per batch, seconds (default 0.05)
    BATCH_SIZE_MAX              Maximum texts per classifier call (default 8)
    CLASSIFY_HOST               Bind host (default 0.0.0.0)
    CLASSIFY_PORT               Bind port (default 8000)
    SEGMENT_LENGTH              Characters per document segment (default 300)
    CLASSIFIER_URL              Inference server endpoint
    CLASSIFIER_TIMEOUT_SECS     Inference request timeout (default 60)
    RUST_LOG                    Log filter (default info)"#
    );
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let batch_config = BatchConfig::from_env()?;
    let server_config = ServerConfig::from_env()?;
    let classifier = RemoteClassifier::new(RemoteClassifierConfig::from_env()?)?;
    tracing::info!(endpoint = %classifier.endpoint(), "using remote classifier");

    let (gate, aggregator) = batch::spawn(batch_config, Arc::new(classifier))?;
    let state = AppState::new(gate, server_config.segment_length).with_stats(aggregator.stats());

    server::serve(&server_config, state).await?;
    aggregator.join().await?;
    Ok(())
}
