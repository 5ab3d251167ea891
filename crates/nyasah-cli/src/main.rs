use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

mod run;

#[derive(Debug, Parser)]
#[command(name = "nyasah")]
#[command(about = "Review and social proof insights engine")]
struct Cli {
    /// JSON dataset with `entities`, `reviews` and `proof_events` arrays
    #[arg(long, global = true, env = "NYASAH_DATA")]
    data: Option<PathBuf>,

    /// YAML provider config; overrides the NYASAH_PROVIDER* variables
    #[arg(long, global = true)]
    provider_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ask the provider a free-form question on behalf of a tenant
    Query {
        #[arg(long)]
        tenant: Uuid,
        text: String,
    },
    /// Build an insights snapshot for one entity
    Insights {
        #[arg(long)]
        entity: Uuid,
    },
    /// Generate suggested actions for one entity
    Actions {
        #[arg(long)]
        entity: Uuid,
    },
    /// Rank recommendations mined from a tenant's proof history
    Recommend {
        #[arg(long)]
        tenant: Uuid,
    },
    /// Sentiment, engagement and keyword trends for a tenant
    Trends {
        #[arg(long)]
        tenant: Uuid,
    },
    /// Score sentiment and extract keywords for stored reviews
    Enrich {
        /// Only enrich this entity's reviews
        #[arg(long)]
        entity: Option<Uuid>,
    },
}

fn init_tracing(fallback_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        nyasah_core::load_engine_config().context("failed to load engine configuration")?;
    init_tracing(&config.log_level);

    if let Some(path) = &cli.provider_config {
        config.provider = nyasah_core::load_provider_config(path)?;
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling analysis");
            on_interrupt.cancel();
        }
    });

    let output = run::execute(&config, cli.data.as_deref(), cli.command, &cancel).await?;
    println!("{output}");
    Ok(())
}
