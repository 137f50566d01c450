use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use roro_models::config::RoroConfig;

#[derive(Parser, Debug)]
#[command(name = "roro", about = "Risk On / Risk Off macro analyst agent team")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/roro.toml")]
    config: String,

    /// Question to put to the team (defaults to the weekly Risk On/Risk Off query)
    #[arg(short, long)]
    query: Option<String>,

    /// Print the full team report as JSON instead of the answer text
    #[arg(long)]
    json: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config: RoroConfig = match std::fs::read_to_string(&cli.config) {
        Ok(raw) => {
            toml::from_str(&raw).with_context(|| format!("Failed to parse config: {}", cli.config))?
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %cli.config, "No config file found, using defaults");
            RoroConfig::default()
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read config: {}", cli.config));
        }
    };

    let question = cli.query.as_deref().unwrap_or(roro::DEFAULT_QUERY);

    let report = roro::run_query(&config, question)
        .await
        .map_err(|e| anyhow::anyhow!("Team run failed: {e}"))?;

    if cli.json {
        let output = if cli.pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        println!("{output}");
    } else {
        println!("{}", report.answer);
    }

    Ok(())
}
