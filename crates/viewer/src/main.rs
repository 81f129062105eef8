use std::fs::File;
use std::io::{self, BufReader};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use viewer::parser::{parse, ParseResult};
use viewer::server;
use viewer::state::Snapshot;
use viewer::tree::build_tree;

/// Reconstruct and browse the span hierarchy of a logdrill capture.
#[derive(Debug, Parser)]
#[command(name = "logdrill-viewer", version)]
struct Args {
    /// Log capture to load ("-" reads stdin)
    input: PathBuf,

    /// Address to serve the API on
    #[arg(long, default_value = "127.0.0.1:7077")]
    bind: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let result = load(&args.input)?;

    let format = result
        .format
        .map(|f| f.as_str())
        .unwrap_or("none (empty capture)");
    let tree = build_tree(&result.entries);
    let stats = tree.stats();
    info!(
        "loaded {} entries ({} spans, format: {})",
        result.entries.len(),
        stats.total_spans,
        format
    );

    let snapshot = Arc::new(Snapshot {
        tree,
        entries: result.entries,
        format: result.format,
    });

    server::serve(args.bind, snapshot).await
}

fn load(input: &PathBuf) -> Result<ParseResult> {
    if input.as_os_str() == "-" {
        return parse(io::stdin().lock()).context("failed to parse stdin");
    }

    let file = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    parse(BufReader::new(file)).with_context(|| format!("failed to parse {}", input.display()))
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,viewer=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
