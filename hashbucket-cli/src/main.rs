//! HashBucket CLI - bucket feature values locally or against a running server

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use hashbucket_core::{hash_feature, BucketCount, BucketDistribution, FeatureValue};
use hashbucket_server::{PredictResponse, ServerConfig};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "hashbucket")]
#[command(about = "HashBucket - deterministic feature hashing into integer buckets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a value into a bucket locally
    Hash {
        /// Value to hash
        value: String,

        /// Number of buckets
        #[arg(short, long, default_value = "10", allow_hyphen_values = true)]
        buckets: i64,

        /// Parse VALUE as a JSON scalar (42, true, "text") instead of a plain string
        #[arg(long)]
        json: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Send a prediction request to a running server
    Predict {
        /// Value to hash
        value: String,

        /// Number of buckets
        #[arg(short, long, default_value = "10", allow_hyphen_values = true)]
        buckets: i64,

        /// Parse VALUE as a JSON scalar instead of a plain string
        #[arg(long)]
        json: bool,

        /// Server base URL
        #[arg(short, long, default_value = "http://localhost:5000")]
        url: String,
    },

    /// Hash synthetic values and report how they spread over the buckets
    Distribution {
        /// Number of values to generate
        #[arg(short, long, default_value = "10000")]
        samples: u64,

        /// Number of buckets
        #[arg(short, long, default_value = "10")]
        buckets: u64,

        /// Prefix for generated values (`<prefix><index>`)
        #[arg(long, default_value = "user_")]
        prefix: String,

        /// Number of parallel threads (0 = one per core)
        #[arg(short, long, default_value = "0")]
        threads: usize,
    },

    /// Start the HashBucket HTTP server
    Serve {
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Port to listen on, overriding the configured address
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let serving = matches!(cli.command, Commands::Serve { .. });
    if cli.verbose || serving {
        let filter = if cli.verbose {
            "hashbucket=debug,hashbucket_server=debug"
        } else {
            "info"
        };
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }

    match cli.command {
        Commands::Hash {
            value,
            buckets,
            json,
            format,
        } => hash_command(&value, buckets, json, format)?,
        Commands::Predict {
            value,
            buckets,
            json,
            url,
        } => predict_command(&value, buckets, json, &url).await?,
        Commands::Distribution {
            samples,
            buckets,
            prefix,
            threads,
        } => distribution_command(samples, buckets, &prefix, threads)?,
        Commands::Serve { config, port } => serve_command(config, port).await?,
    }

    Ok(())
}

/// Turn a command-line argument into a JSON scalar
fn parse_value(raw: &str, as_json: bool) -> Result<serde_json::Value> {
    if as_json {
        serde_json::from_str(raw).with_context(|| format!("Not valid JSON: {}", raw))
    } else {
        Ok(serde_json::Value::String(raw.to_string()))
    }
}

fn hash_command(raw: &str, buckets: i64, as_json: bool, format: OutputFormat) -> Result<()> {
    let value = FeatureValue::try_from(parse_value(raw, as_json)?)?;
    let buckets = BucketCount::try_from(buckets)?;

    let start = Instant::now();
    let bucket = hash_feature(&value, buckets);
    let elapsed = start.elapsed();

    match format {
        OutputFormat::Json => {
            let response = PredictResponse {
                hashed_feature: bucket,
                input_value: value,
                num_buckets: buckets,
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("{} Hash Result", "═".blue().bold());
            println!("{} Value: {} ({})", "▸".blue(), value, value.kind());
            println!("{} Buckets: {}", "▸".blue(), buckets);
            println!("{} Bucket: {}", "▸".blue(), bucket.to_string().green().bold());
            println!(
                "{} Hash time: {:.3}µs",
                "▸".blue(),
                elapsed.as_secs_f64() * 1_000_000.0
            );
        }
    }

    Ok(())
}

async fn predict_command(raw: &str, buckets: i64, as_json: bool, url: &str) -> Result<()> {
    let body = serde_json::json!({
        "feature_value": parse_value(raw, as_json)?,
        "num_buckets": buckets,
    });
    let endpoint = format!("{}/predict", url.trim_end_matches('/'));

    println!("{} POST {}", "→".blue(), endpoint);

    let response = reqwest::Client::new()
        .post(&endpoint)
        .json(&body)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", endpoint))?;

    let status = response.status();
    let json: serde_json::Value = response
        .json()
        .await
        .context("Server returned a non-JSON body")?;

    if !status.is_success() {
        println!("{} Server returned {}", "✗".red(), status);
        println!("{}", serde_json::to_string_pretty(&json)?);
        bail!("prediction failed with status {}", status);
    }

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn distribution_command(samples: u64, buckets: u64, prefix: &str, threads: usize) -> Result<()> {
    let buckets = BucketCount::new(buckets)?;
    let empty = BucketDistribution::new(buckets)
        .context("Bucket count too large for a distribution")?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("Failed to build thread pool")?;

    println!("{} Hashing {} values into {} buckets...", "→".blue(), samples, buckets);

    let start = Instant::now();
    let dist = pool.install(|| {
        (0..samples)
            .into_par_iter()
            .fold(
                || empty.clone(),
                |mut dist, i| {
                    let value = FeatureValue::string(format!("{}{}", prefix, i));
                    dist.record(hash_feature(&value, buckets));
                    dist
                },
            )
            .reduce(|| empty.clone(), |a, b| a.merge(&b))
    });
    let duration = start.elapsed();

    let widest = dist.counts().iter().copied().max().unwrap_or(0).max(1);

    println!("\n{} Bucket Distribution", "═".blue().bold());
    for (bucket, &count) in dist.counts().iter().enumerate() {
        let bar_len = (count * 40 / widest) as usize;
        println!(
            "{} {:>4} {:>8} {}",
            "▸".blue(),
            bucket,
            count,
            "█".repeat(bar_len).green()
        );
    }

    println!("\n{} Total values: {}", "▸".blue(), dist.total());
    println!("{} Max skew: {:.3}", "▸".blue(), dist.max_skew());
    println!("{} Duration: {:.3}s", "▸".blue(), duration.as_secs_f64());
    if duration.as_secs_f64() > 0.0 {
        println!(
            "{} Throughput: {:.0} hashes/sec",
            "▸".blue(),
            samples as f64 / duration.as_secs_f64()
        );
    }

    Ok(())
}

async fn serve_command(config: Option<PathBuf>, port: Option<u16>) -> Result<()> {
    let mut server_config =
        ServerConfig::load(config.as_deref()).context("Failed to load configuration")?;

    if let Some(port) = port {
        let mut addr = server_config.socket_addr()?;
        addr.set_port(port);
        server_config.bind_address = addr.to_string();
    }

    println!(
        "{} Starting HashBucket server on {}...",
        "→".blue(),
        server_config.bind_address
    );

    hashbucket_server::run(server_config).await
}
