//! vtlookup CLI.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vtlookup::{Config, FileInput, ScanSummary, VirusTotalClient, PRIVACY_POLICY_URI};

#[derive(Parser, Debug)]
#[command(name = "vtlookup")]
#[command(about = "Look up a file's SHA-256 digest on VirusTotal")]
#[command(version)]
struct Args {
    /// File to look up
    #[arg(required_unless_present_any = ["print_config", "privacy"])]
    file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// VirusTotal API key (overrides the configuration file)
    #[arg(long, env = "VT_APIKEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Service base URL (overrides the configuration file)
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "warn")]
    log_level: String,

    /// Print example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Print the VirusTotal privacy policy URL and exit
    #[arg(long)]
    privacy: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", Config::example());
        return Ok(());
    }

    if args.privacy {
        println!("{}", PRIVACY_POLICY_URI);
        return Ok(());
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            Config::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(api_key) = args.api_key {
        config.virustotal.api_key = Some(api_key);
    }
    if let Some(endpoint) = args.endpoint {
        config.virustotal.endpoint = endpoint;
    }
    config.validate()?;

    let file = args.file.context("a file to look up is required")?;

    let client = VirusTotalClient::new(config.client_config())?;
    let summary = client
        .scan(&FileInput::from_path(&file))
        .await
        .with_context(|| format!("lookup of {} failed", file.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&file, &summary);
    }

    Ok(())
}

fn print_summary(file: &std::path::Path, summary: &ScanSummary) {
    println!("File:    {}", file.display());
    println!("SHA-256: {}", summary.sha256);
    println!("Report:  {}", summary.lookup_uri);

    match (summary.found, summary.counts) {
        (None, _) | (_, None) => {
            println!("No API key configured; open the report link to check this file.");
            println!("Set VT_APIKEY or pass --api-key to enable lookups.");
        }
        (Some(false), _) => {
            println!("Result:  not known to VirusTotal");
        }
        (Some(true), Some(counts)) if counts.total == 0 => {
            println!("Result:  known to VirusTotal, no engine supports this file type");
        }
        (Some(true), Some(counts)) => {
            println!("Result:  {} engines flagged this file as malicious", counts);
            if let Some(label) = &summary.threat_label {
                println!("Label:   {}", label);
            }
        }
    }
}
