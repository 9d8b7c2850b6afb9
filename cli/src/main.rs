//! ratematch CLI
//!
//! Runs a batch of conversion requests from a JSON fixture and prints one
//! outcome per request.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ratematch_common::TenantId;
use ratematch_fx::{ConversionEngine, EngineConfig};

mod fixture;

use fixture::Fixture;

/// ratematch CLI
#[derive(Parser, Debug)]
#[command(name = "ratematch")]
#[command(about = "Resolve exchange rates and convert amounts from a JSON fixture")]
struct Args {
    /// Path to the JSON fixture
    #[arg(short, long)]
    fixture: PathBuf,

    /// Tenant to run as (defaults to the fixture's tenant)
    #[arg(short, long)]
    tenant: Option<String>,

    /// Maximum number of requests per batch
    #[arg(long)]
    max_batch_size: Option<usize>,

    /// Batch size from which requests are evaluated in parallel
    #[arg(long)]
    parallel_threshold: Option<usize>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );
    // stdout carries the results
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    let fixture = Fixture::load(&args.fixture)?;

    let mut config = fixture.apply_currencies(EngineConfig::from_env());
    if let Some(size) = args.max_batch_size {
        config.max_batch_size = size;
    }
    if let Some(threshold) = args.parallel_threshold {
        config.parallel_threshold = threshold;
    }
    let tenant = args
        .tenant
        .map(TenantId::new)
        .unwrap_or_else(|| fixture.tenant_id());
    let requests = fixture.requests(chrono::Utc::now())?;

    info!(
        fixture = %args.fixture.display(),
        tenant = %tenant,
        requests = requests.len(),
        rates = fixture.rates.len(),
        "Running conversion batch"
    );

    let engine = match ConversionEngine::new(Arc::new(fixture.provider()?), config) {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(anyhow::anyhow!("Configuration error: {}", e));
        }
    };
    let batch = engine.convert_batch(&requests, &tenant, None).await?;

    let outputs = fixture::render(batch);
    println!("{}", serde_json::to_string_pretty(&outputs)?);

    Ok(())
}
