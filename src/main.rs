use anyhow::Context;
use clap::Parser;
use dex_locale::app::ports::ProgressSink;
use dex_locale::config::Config;
use dex_locale::infra::{BarProgress, ReqwestCatalog};
use dex_locale::storage::JsonFileWriter;
use dex_locale::{logging, metrics, Pipeline, PipelineSettings};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "dex_locale")]
#[command(about = "Fetch localized display names from the catalog into a JSON lookup table")]
#[command(version)]
struct Cli {
    /// TOML config file (defaults to ./dex_locale.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output JSON file
    #[arg(long)]
    output: Option<PathBuf>,
    /// Locale code to pick names for
    #[arg(long)]
    locale: Option<String>,
    /// Number of fetch workers
    #[arg(long)]
    concurrency: Option<usize>,
    /// Catalog API root
    #[arg(long)]
    base_url: Option<String>,
    /// Log every dropped job at warn level
    #[arg(long)]
    log_dropped: bool,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(locale) = self.locale {
            config.locale = locale;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if self.log_dropped {
            config.log_dropped_jobs = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let _log_guard = logging::init_logging();
    metrics::init_metrics();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    cli.apply(&mut config);
    config.validate()?;
    info!(?config, "configuration loaded");

    let catalog = Arc::new(ReqwestCatalog::new(config.request_timeout(), config.max_connections)?);
    let pipeline = Pipeline::new(PipelineSettings::from(&config), catalog);
    let writer = JsonFileWriter::new(&config.output_path);
    let locale = config.locale.clone();

    let report = pipeline
        .run(&writer, |total| -> Arc<dyn ProgressSink> {
            Arc::new(BarProgress::new(total, &locale))
        })
        .await
        .context("name aggregation failed")?;

    println!(
        "✅ Wrote {} with {} entries",
        writer.path().display(),
        report.entries
    );
    println!(
        "   jobs: {} | written: {} | no {} name: {} | dropped: {} | overrides: {} | {:.1}s",
        report.total_jobs,
        report.written,
        locale,
        report.no_name,
        report.dropped,
        report.overrides_applied,
        report.duration_secs()
    );
    Ok(())
}
