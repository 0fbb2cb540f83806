//! CLI entry point for the accident infographics pipeline.
//!
//! Builds the infographics envelope for a news flash, serves the
//! cache-backed widget list, and warms the S3 widget cache.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use accident_infographics::Infographics;
use accident_infographics::config::Settings;
use accident_infographics::constants::INFOGRAPHICS_CACHE_YEARS_AGO;
use accident_infographics::infra::S3InfographicsCache;
use accident_infographics::output::emit;
use accident_infographics::store::PgAccidentStore;
use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "accident_infographics")]
#[command(about = "Builds accident infographics widgets for news flashes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute every widget for a news flash and print the full envelope
    Create {
        /// News flash to build infographics for
        news_flash_id: i64,

        /// Lookback in years, ending at the latest accident on record
        #[arg(short, long, default_value_t = 1)]
        years_ago: i64,

        /// Write the envelope to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Read cached widgets from S3 and append freshly computed uncached ones
    Cached {
        news_flash_id: i64,

        #[arg(short, long, default_value_t = 1)]
        years_ago: i64,

        /// S3 bucket holding the widget cache (defaults to INFOGRAPHICS_CACHE_BUCKET)
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Cache objects are gzip-compressed
        #[arg(long, default_value_t = false)]
        gzip: bool,

        #[arg(short, long)]
        output: Option<String>,
    },
    /// Precompute cacheable widgets for news flashes and upload them to S3
    WarmCache {
        /// Comma-separated news flash ids
        #[arg(value_delimiter = ',', required = true)]
        news_flash_ids: Vec<i64>,

        /// Comma-separated lookbacks to cache
        #[arg(short, long, value_delimiter = ',', default_values_t = INFOGRAPHICS_CACHE_YEARS_AGO)]
        years_ago: Vec<i64>,

        #[arg(long)]
        s3_bucket: Option<String>,

        /// Gzip compress cache objects before uploading
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/accident_infographics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("accident_infographics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let store = PgAccidentStore::connect(&settings.database_url, settings.db_max_connections).await?;
    let infographics = Infographics::new(Arc::new(store), settings.generator_limits());

    match cli.command {
        Commands::Create {
            news_flash_id,
            years_ago,
            output,
        } => {
            match infographics.infographics_data(news_flash_id, years_ago).await? {
                Some(data) => emit(output.as_deref(), &data)?,
                None => {
                    warn!(news_flash_id, years_ago, "No infographics for request");
                    emit(output.as_deref(), &serde_json::json!({}))?;
                }
            }
        }
        Commands::Cached {
            news_flash_id,
            years_ago,
            s3_bucket,
            gzip,
            output,
        } => {
            let cache = s3_cache(&settings, s3_bucket, gzip).await?;
            let widgets = infographics
                .get_infographics_data(&cache, news_flash_id, years_ago)
                .await;
            emit(output.as_deref(), &widgets)?;
        }
        Commands::WarmCache {
            news_flash_ids,
            years_ago,
            s3_bucket,
            gzip,
        } => {
            let cache = s3_cache(&settings, s3_bucket, gzip).await?;
            let mut written = 0;
            for news_flash_id in &news_flash_ids {
                written += infographics
                    .warm_cache(&cache, *news_flash_id, &years_ago)
                    .await?;
            }
            info!(
                news_flashes = news_flash_ids.len(),
                entries = written,
                "Cache warm-up complete"
            );
        }
    }

    Ok(())
}

/// Resolves the cache bucket from the CLI flag or the environment.
async fn s3_cache(
    settings: &Settings,
    s3_bucket: Option<String>,
    gzip: bool,
) -> Result<S3InfographicsCache> {
    let Some(bucket) = s3_bucket.or_else(|| settings.cache_bucket.clone()) else {
        bail!("S3 bucket not specified: pass --s3-bucket or set INFOGRAPHICS_CACHE_BUCKET");
    };
    info!(bucket = %bucket, "Using S3 infographics cache");
    Ok(S3InfographicsCache::from_env(bucket, gzip || settings.cache_gzip).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warm_cache_defaults_to_cached_lookbacks() {
        let cli = Cli::try_parse_from(["accident_infographics", "warm-cache", "7,8"]).unwrap();
        let Commands::WarmCache {
            news_flash_ids,
            years_ago,
            ..
        } = cli.command
        else {
            panic!("expected warm-cache");
        };
        assert_eq!(news_flash_ids, vec![7, 8]);
        assert_eq!(years_ago, INFOGRAPHICS_CACHE_YEARS_AGO);
    }

    #[test]
    fn test_warm_cache_lookbacks_override_default() {
        let cli =
            Cli::try_parse_from(["accident_infographics", "warm-cache", "7", "--years-ago", "2,4"])
                .unwrap();
        let Commands::WarmCache { years_ago, .. } = cli.command else {
            panic!("expected warm-cache");
        };
        assert_eq!(years_ago, vec![2, 4]);
    }
}
