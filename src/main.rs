use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use webinar_scraper::apis::factory::create_extractors;
use webinar_scraper::app::refresh_use_case::{RefreshSummary, RefreshUseCase};
use webinar_scraper::common::constants::CSV_FILE_NAME;
use webinar_scraper::config::Config;
use webinar_scraper::infra::catalog_store_adapter::JsonCatalogStore;
use webinar_scraper::infra::csv_output_adapter::{render_csv, CsvFilePublisher};
use webinar_scraper::infra::json_output_adapter::JsonFilePublisher;
use webinar_scraper::observability::{init_logging, init_metrics, push_to_gateway};
use webinar_scraper::pipeline::processing::catalog::query::{CatalogQuery, CatalogStats, SortColumn};
use webinar_scraper::pipeline::processing::dates::{DateNormalizer, SortDirection};
use webinar_scraper::Status;

const METRICS_JOB: &str = "webinar_scraper";

#[derive(Parser)]
#[command(name = "webinar_scraper")]
#[command(about = "Compensation webinar catalog scraper")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every source, reconcile with the stored catalog and write outputs
    Run {
        /// Specific sources to run (comma-separated). Available: pave, worldatwork, syndio
        #[arg(long)]
        sources: Option<String>,
        /// Compute the merged catalog without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Browse the stored catalog
    List {
        /// Case-insensitive text to find in titles and descriptions
        #[arg(long)]
        search: Option<String>,
        /// Only show this source (Pave, WorldAtWork, Syndio)
        #[arg(long)]
        source: Option<String>,
        /// Only show this status (Upcoming, "On Demand")
        #[arg(long)]
        status: Option<String>,
        /// Column to sort by: source, title, status, airDate, description, link
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// Convert a stored JSON catalog to CSV without scraping
    ExportCsv {
        /// Catalog JSON to read (defaults to the configured data catalog)
        #[arg(long)]
        input: Option<PathBuf>,
        /// CSV file to write (defaults to webinars.csv next to the input)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let config = Config::load().context("Failed to load configuration")?;
    let _log_guard = init_logging(&config.log_dir);

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { sources, dry_run } => run_refresh(&config, sources, dry_run).await,
        Commands::List {
            search,
            source,
            status,
            sort,
            desc,
        } => {
            let status = status
                .map(|s| s.parse::<Status>())
                .transpose()
                .map_err(|e| anyhow!(e))?;
            let column = sort
                .map(|s| s.parse::<SortColumn>())
                .transpose()
                .map_err(|e| anyhow!(e))?;
            let direction = if desc { SortDirection::Descending } else { SortDirection::Ascending };
            let query = CatalogQuery {
                search,
                source,
                status,
                sort: column.map(|column| (column, direction)),
            };
            list_catalog(&config, &query).await
        }
        Commands::ExportCsv { input, output } => export_csv(&config, input, output).await,
    }
}

async fn run_refresh(config: &Config, sources: Option<String>, dry_run: bool) -> Result<()> {
    println!("🔄 Running webinar refresh...");

    let metrics_handle = match init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            None
        }
    };

    let source_names: Vec<String> = match sources {
        Some(list) => list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => config.sources.clone(),
    };
    let extractors =
        create_extractors(&source_names, config).context("Failed to set up extractors")?;
    let store = JsonCatalogStore::new(config.catalog_path());
    let csv_paths = vec![config.data_csv_path(), config.public_csv_path()];

    let use_case = RefreshUseCase::new(extractors, Box::new(store))
        .with_publisher(Box::new(JsonFilePublisher::new(config.public_catalog_path())))
        .with_publisher(Box::new(CsvFilePublisher::new(csv_paths)))
        .with_dry_run(dry_run);

    let summary = use_case.run(Utc::now()).await.context("Refresh failed")?;
    print_summary(config, &summary);

    let pushgateway_url = config.pushgateway_url.as_deref();
    if let (Some(handle), Some(url)) = (metrics_handle.as_ref(), pushgateway_url) {
        if let Err(e) = push_to_gateway(handle, url, METRICS_JOB).await {
            warn!("Failed to push metrics: {}", e);
        }
    }
    Ok(())
}

fn print_summary(config: &Config, summary: &RefreshSummary) {
    println!("\n📊 Refresh Results:");
    for outcome in &summary.sources {
        match &outcome.error {
            None => println!("   {}: {} webinars", outcome.source, outcome.records),
            Some(error) => println!("   {}: ❌ {}", outcome.source, error),
        }
    }
    println!("   Status fixes: {}", summary.reconcile.corrected());
    println!("   Added: {}", summary.merge.added);
    println!("   Updated: {}", summary.merge.updated);
    println!("   Removed: {}", summary.merge.removed.len());
    println!("   Catalog size: {}", summary.total);

    if summary.written {
        println!(
            "\n✅ Saved to {} and {}",
            config.catalog_path().display(),
            config.public_catalog_path().display()
        );
    } else if summary.changed {
        println!("\n📝 Dry run: changes detected, nothing written");
    } else {
        println!("\n✅ No changes, data is up to date");
    }
}

async fn list_catalog(config: &Config, query: &CatalogQuery) -> Result<()> {
    let store = JsonCatalogStore::new(config.catalog_path());
    let Some(document) = store
        .read_document()
        .await
        .with_context(|| format!("Failed to read {}", store.path().display()))?
    else {
        println!(
            "⚠️  No catalog at {}. Run `webinar_scraper run` first.",
            store.path().display()
        );
        return Ok(());
    };

    let normalizer = DateNormalizer::for_current_date();
    let stats = CatalogStats::from_catalog(&document.webinars);
    let rows = query.apply(&document.webinars, &normalizer);

    println!(
        "📚 {} webinars ({} upcoming, {} on demand)",
        stats.total, stats.upcoming, stats.on_demand
    );
    if let Some(updated) = document.last_updated {
        println!("   Last updated: {}", updated.format("%b %-d, %Y"));
    }
    println!();

    for record in &rows {
        println!(
            "{:<14} {:<10} {:<12} {}",
            normalizer.display(&record.air_date),
            record.status,
            record.source,
            record.title
        );
        println!("{:<38} {}", "", record.link);
    }
    if rows.is_empty() {
        println!("No webinars match the current filters.");
    } else {
        info!("Listed {} of {} webinars", rows.len(), stats.total);
    }
    Ok(())
}

async fn export_csv(
    config: &Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let input = input.unwrap_or_else(|| config.catalog_path());
    let output = output.unwrap_or_else(|| input.with_file_name(CSV_FILE_NAME));

    let document = JsonCatalogStore::new(&input)
        .read_document()
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?
        .ok_or_else(|| anyhow!("No catalog found at {}", input.display()))?;

    tokio::fs::write(&output, render_csv(&document.webinars))
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("✅ Converted {} webinars to {}", document.webinars.len(), output.display());
    Ok(())
}
