use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mission_control::anomaly::AnomalyRegistry;
use mission_control::config::{AppConfig, LogFormat, LoggingConfig};
use mission_control::search::SearchProvider;

#[derive(Parser)]
#[command(
    name = "mission-control",
    about = "Anomaly mission control for the Manus blockchain and Copilot integration",
    version,
    long_about = None
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address, overriding SERVER_HOST / SERVER_PORT
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run one simulated anomaly scan and print the report
    Detect {
        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Query the configured web search provider
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(long, default_value = "10")]
        count: usize,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Show ledger status
    Status {
        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },
}

fn build_subscriber(logging: &LoggingConfig) -> Box<dyn tracing::Subscriber + Send + Sync> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    // Logs go to stderr so `--json` output on stdout stays parseable.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Json => Box::new(builder.json().finish()),
        LogFormat::Text => Box::new(builder.finish()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config loading logs its own warnings, so a scoped subscriber built from
    // LOG_LEVEL / LOG_FORMAT covers it until the resolved settings take over.
    let bootstrap = LoggingConfig::bootstrap(|key| std::env::var(key).ok());
    let config = tracing::subscriber::with_default(build_subscriber(&bootstrap), || {
        AppConfig::resolve(cli.config.as_deref())
    })?;
    tracing::subscriber::set_global_default(build_subscriber(&config.logging))?;

    match cli.command {
        Commands::Serve { bind } => {
            let mut config = config;
            if let Some(bind) = bind {
                if let Some((host, port)) = bind.rsplit_once(':') {
                    config.server.host = host.to_string();
                    config.server.port = port
                        .parse()
                        .with_context(|| format!("invalid port in --bind {bind}"))?;
                } else {
                    anyhow::bail!("--bind must be HOST:PORT, got {bind}");
                }
            }
            tracing::info!(bind = %config.server.bind_address(), "Starting Mission Control");
            mission_control::serve(config).await?;
        }
        Commands::Detect { json } => {
            let registry = AnomalyRegistry::new();
            let batch = registry.detect().await;
            let report = registry.report().await;
            if json {
                let out = serde_json::json!({ "anomalies": batch, "report": report });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("\nMission Control Anomaly Scan");
                println!("{:<10} | {:<18} | {:<10} | Description", "Severity", "Type", "Status");
                println!("{:-<10}-|-{:-<18}-|-{:-<10}-|-{:-<40}", "", "", "", "");
                for a in &batch {
                    println!(
                        "{:<10} | {:<18} | {:<10} | {}",
                        a.severity,
                        a.kind,
                        a.status,
                        a.description
                    );
                }
                println!(
                    "\nTotal: {}  Resolved: {}  Pending: {}",
                    report.total, report.resolved_count, report.pending_count
                );
                println!();
            }
        }
        Commands::Search { query, count, json } => {
            let provider = mission_control::search::provider_from_config(&config.search)?;
            let response = provider.search(&query, count).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("\n=== Search: {} ({}) ===", response.query, response.source);
                for r in &response.results {
                    println!("[Insight] {}", r.title);
                    println!("  {}", r.url);
                    if let Some(snippet) = &r.snippet {
                        println!("  {}", snippet);
                    }
                }
                println!();
            }
        }
        Commands::Status { json } => {
            let ledger = mission_control::blockchain::LedgerClient::new(
                config.ledger.node_url.as_str(),
                config.ledger.network_id.as_str(),
                config.ledger.enable_planetary,
            );
            let status = ledger.status();
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("Network:     {}", status.network_id);
                println!("Block:       {}", status.current_block);
                println!("Sync:        {}", status.sync_status);
                println!("Nodes:       {}", status.planetary_nodes.join(", "));
                println!("Last block:  {}", status.last_block_time.to_rfc3339());
            }
        }
    }

    Ok(())
}
