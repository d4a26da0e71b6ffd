//! paperdex CLI
//!
//! Local execution entry point: crawl arXiv categories into the index, then
//! export the index as static-site content.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use paperdex::{
    error::Result,
    models::Config,
    pipeline::{self, shutdown_channel},
    services::ArxivFetcher,
    storage::{IndexLoad, IndexStorage, LocalStorage},
};

/// paperdex - incremental arXiv category index
#[derive(Parser, Debug)]
#[command(
    name = "paperdex",
    version,
    about = "Incremental arXiv category index and static-site exporter"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch categories, merge into the index and rebuild summary pages
    Crawl {
        /// Comma-separated category list (overrides config)
        #[arg(long)]
        categories: Option<String>,

        /// File with one category per line (overrides config and --categories)
        #[arg(long)]
        categories_file: Option<PathBuf>,

        /// Output directory for the index and pages
        #[arg(short, long)]
        output: Option<String>,

        /// Seconds to wait between categories
        #[arg(long)]
        delay: Option<u64>,
    },

    /// Export the index as Hexo-style site content
    Export {
        /// Directory holding the index to export
        #[arg(short, long)]
        output: Option<String>,

        /// Site root to write into
        #[arg(long)]
        site_dir: Option<String>,

        /// Summaries per page
        #[arg(long)]
        page_size: Option<usize>,

        /// Newest records per category copied into highlights
        #[arg(long)]
        highlights: Option<usize>,

        /// Comma-separated category prefixes; an empty value exports every category
        #[arg(long)]
        category_prefixes: Option<String>,
    },

    /// Validate the configuration file
    Validate,

    /// Show index and last-run info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Split a comma-separated list, dropping blank entries.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("paperdex starting...");

    let mut config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::load_or_default(&cli.config)
    };
    log::info!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Crawl {
            categories,
            categories_file,
            output,
            delay,
        } => {
            if let Some(categories) = categories {
                config.categories = split_list(&categories);
            }
            if let Some(path) = categories_file {
                config.categories = Config::load_category_file(&path)?;
                log::info!(
                    "Loaded {} categories from {}",
                    config.categories.len(),
                    path.display()
                );
            }
            if let Some(output) = output {
                config.paths.output_dir = output;
            }
            if let Some(delay) = delay {
                config.crawler.delay_secs = delay;
            }
            config.validate()?;

            let storage = LocalStorage::with_layout(&config.paths);
            let fetcher = ArxivFetcher::new(Arc::new(config.crawler.clone()))?;

            let (tx, rx) = shutdown_channel();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupt received; stopping after the current category");
                    let _ = tx.send(true);
                }
            });

            let stats = pipeline::run_crawler(&config, &storage, &fetcher, rx).await?;
            if stats.categories_failed > 0 {
                log::warn!(
                    "{} of {} categories failed to fetch",
                    stats.categories_failed,
                    stats.categories
                );
            }
        }

        Command::Export {
            output,
            site_dir,
            page_size,
            highlights,
            category_prefixes,
        } => {
            if let Some(output) = output {
                config.paths.output_dir = output;
            }
            if let Some(site_dir) = site_dir {
                config.export.site_dir = site_dir;
            }
            if let Some(page_size) = page_size {
                config.pagination.page_size = page_size;
            }
            if let Some(highlights) = highlights {
                config.export.highlights = highlights;
            }
            if let Some(prefixes) = category_prefixes {
                config.export.category_prefixes = split_list(&prefixes);
            }
            config.validate()?;

            let storage = LocalStorage::with_layout(&config.paths);
            pipeline::run_export(&config, &storage).await?;
        }

        Command::Validate => {
            pipeline::run_validate(&config)?;
            log::info!("All validations passed!");
        }

        Command::Info => {
            let storage = LocalStorage::with_layout(&config.paths);
            log::info!("Index: {}", storage.index_location());

            match storage.load_index().await? {
                IndexLoad::Loaded(index) => {
                    log::info!("Records: {}", index.len());
                    log::info!("Categories: {}", index.categories().len());
                }
                IndexLoad::Absent => log::info!("No index found yet."),
                IndexLoad::Corrupt { reason } => log::warn!("Index is unreadable: {}", reason),
            }

            match storage.load_stats().await? {
                Some(stats) => {
                    log::info!(
                        "Last run: {} ({} new, {} updated, {}/{} categories{})",
                        stats.end_time.format("%Y-%m-%d %H:%M:%S UTC"),
                        stats.new_records,
                        stats.updated_records,
                        stats.categories_succeeded(),
                        stats.categories,
                        if stats.cancelled { ", cancelled" } else { "" }
                    );
                }
                None => log::info!("No crawl has run yet."),
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
