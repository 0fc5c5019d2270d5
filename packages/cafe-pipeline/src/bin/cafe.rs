//! Command-line entry point for collection and export runs.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cafe_pipeline::pipeline::export::bean_scores;
use cafe_pipeline::tables;
use cafe_pipeline::{CollectConfig, Collector, FetcherExt, RelationalExporter, ReplayFetcher};

#[derive(Parser)]
#[command(name = "cafe")]
#[command(about = "Café menu collection and SQL export")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect stores from saved state blobs
    Collect {
        /// Directory of saved blobs (<query>/<n>.json)
        #[arg(long)]
        fixtures: PathBuf,

        /// File with one query per line (defaults to the built-in list)
        #[arg(long)]
        queries: Option<PathBuf>,

        /// Output directory for stores.csv, menus.csv, crawl_log.json
        #[arg(long, default_value = "data/raw")]
        out: PathBuf,

        #[arg(long)]
        max_stores: Option<usize>,

        #[arg(long)]
        region: Option<String>,

        /// Skip politeness delays
        #[arg(long)]
        no_pacing: bool,
    },

    /// Convert the final CSV tables into an INSERT script
    ExportSql {
        /// Directory holding <table>.csv files
        #[arg(long, default_value = "data/final")]
        data: PathBuf,

        #[arg(long, default_value = "sql/data_import.sql")]
        out: PathBuf,
    },

    /// Estimate, validate and export bean sensory scores
    BeanScores {
        #[arg(long)]
        scores: PathBuf,

        #[arg(long)]
        beans: PathBuf,

        #[arg(long)]
        flavors: PathBuf,

        #[arg(long, default_value = "sql")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cafe_pipeline=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Collect {
            fixtures,
            queries,
            out,
            max_stores,
            region,
            no_pacing,
        } => cmd_collect(fixtures, queries, &out, max_stores, region, no_pacing).await,
        Commands::ExportSql { data, out } => cmd_export_sql(&data, &out),
        Commands::BeanScores {
            scores,
            beans,
            flavors,
            out_dir,
        } => cmd_bean_scores(&scores, &beans, &flavors, &out_dir),
    }
}

async fn cmd_collect(
    fixtures: PathBuf,
    queries: Option<PathBuf>,
    out: &Path,
    max_stores: Option<usize>,
    region: Option<String>,
    no_pacing: bool,
) -> Result<()> {
    let mut config = CollectConfig::from_env().context("Failed to load collect config")?;

    if let Some(path) = queries {
        let list = tables::read_query_list(&path)
            .with_context(|| format!("Failed to read queries from {}", path.display()))?;
        config = config.with_queries(list);
    }
    if let Some(max) = max_stores {
        config = config.with_max_stores(max);
    }
    if let Some(region) = region {
        config = config.with_region(region);
    }
    if no_pacing {
        config = config.with_pacing(cafe_pipeline::PacingConfig::disabled());
    }

    let fetcher = ReplayFetcher::new(fixtures).paced(&config.pacing);
    let outcome = Collector::new(fetcher, config).run().await;

    tables::write_collection(out, &outcome.stores, &outcome.log)
        .with_context(|| format!("Failed to write results to {}", out.display()))?;

    tracing::info!(
        "Collected {} stores ({} menus), {} skipped for no coffee menu, {} query errors",
        outcome.log.total_stores,
        outcome.log.total_menus,
        outcome.log.skipped_no_menu,
        outcome.log.errors.len()
    );

    Ok(())
}

fn cmd_export_sql(data: &Path, out: &Path) -> Result<()> {
    let dataset = tables::read_dataset(data)
        .with_context(|| format!("Failed to read tables from {}", data.display()))?;

    let script = RelationalExporter::default()
        .render(&dataset)
        .context("Failed to render SQL")?;

    write_file(out, &script.sql)?;

    for (category, count) in &script.category_distribution {
        tracing::info!("  {} ({}): {} stores", category.label(), category, count);
    }
    tracing::info!("Wrote {} rows to {}", script.total_rows(), out.display());

    Ok(())
}

fn cmd_bean_scores(scores: &Path, beans: &Path, flavors: &Path, out_dir: &Path) -> Result<()> {
    let sources = tables::read_source_scores(scores)
        .with_context(|| format!("Failed to read {}", scores.display()))?;
    let roasts = tables::read_bean_roasts(beans)
        .with_context(|| format!("Failed to read {}", beans.display()))?;
    let notes = tables::read_flavor_notes(flavors)
        .with_context(|| format!("Failed to read {}", flavors.display()))?;

    let index = bean_scores::bean_index(roasts, notes);
    let prepared = match bean_scores::prepare(&sources, &index) {
        Ok(prepared) => prepared,
        Err(e) => bail!("Validation failed, nothing written: {}", e),
    };

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let csv_path = out_dir.join(tables::BEAN_SCORES_CSV);
    tables::write_bean_scores(&csv_path, &prepared)
        .with_context(|| format!("Failed to write {}", csv_path.display()))?;

    let sql_path = out_dir.join(tables::BEAN_SCORES_SQL);
    write_file(&sql_path, &bean_scores::render_insert(&prepared))?;

    tracing::info!(
        "Wrote {} bean scores to {} and {}",
        prepared.len(),
        csv_path.display(),
        sql_path.display()
    );

    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
