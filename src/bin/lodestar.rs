//! CLI binary for lodestar.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lodestar::crawl::crawl_to_file;
use lodestar::{AppState, MetasearchRequest, Secrets, Server, ServiceConfig};
use lodestar_search::{Aggregator, QueryKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Lodestar: metasearch with LLM-ranked results.
#[derive(Parser)]
#[command(name = "lodestar", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, env = "LODESTAR_CONFIG")]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Option<Command>,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve {
        /// Interface to bind, overriding the config file.
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overriding the config file.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one query and print the first page as JSON.
    Search {
        /// Query text.
        query: String,
        /// Search images instead of the web.
        #[arg(long)]
        images: bool,
        /// Page to print.
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Query every engine once and write the merged results to a file.
    Crawl {
        /// Query text.
        query: String,
        /// Output file.
        #[arg(short, long, default_value = "crawl.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("lodestar=info,lodestar_search=info,tower_http=warn,chromiumoxide=warn")
        }))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(ServiceConfig::default_config_path);
    let config = ServiceConfig::load_or_default(&config_path)?;
    let secrets = Secrets::from_env();

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => run_serve(config, secrets, host, port).await,
        Command::Search {
            query,
            images,
            page,
        } => run_search(config, secrets, query, images, page).await,
        Command::Crawl { query, output } => run_crawl(config, query, output).await,
    }
}

async fn run_serve(
    mut config: ServiceConfig,
    secrets: Secrets,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = AppState::from_config(&config, &secrets)?;
    let pipeline = state.pipeline.clone();
    let server = Server::start(state, &config.server).await?;
    println!("Lodestar v{} listening on http://{}", env!("CARGO_PKG_VERSION"), server.addr());

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    server.shutdown();
    pipeline.aggregator().shutdown().await;
    Ok(())
}

async fn run_search(
    config: ServiceConfig,
    secrets: Secrets,
    query: String,
    images: bool,
    page: usize,
) -> anyhow::Result<()> {
    let state = AppState::from_config(&config, &secrets)?;
    let kind = if images {
        QueryKind::Image
    } else {
        QueryKind::Web
    };
    let request = MetasearchRequest::new(query, kind, page, config.pagination.page_size)?;

    let outcome = state.pipeline.run(&request).await;
    state.pipeline.aggregator().shutdown().await;

    println!("{}", serde_json::to_string_pretty(&outcome?)?);
    Ok(())
}

async fn run_crawl(config: ServiceConfig, query: String, output: PathBuf) -> anyhow::Result<()> {
    config.validate()?;
    let aggregator = Aggregator::new(&config.search)?;
    let record = crawl_to_file(&aggregator, &query, config.search.clone(), &output).await?;
    println!("Wrote {} results to {}", record.total, output.display());
    Ok(())
}
