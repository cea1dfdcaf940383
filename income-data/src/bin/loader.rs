use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use income_data::ItemLoader;
use income_db_sqlite::SqliteRepository;
use tracing_subscriber::EnvFilter;

/// Load income and deduction item definitions from CSV files into the store.
///
/// Income items CSV columns: id, name, kind (taxable | tax_exempt), category,
/// monthly_limit (empty for none), order.
///
/// Deduction items CSV columns: id, name, category, default_value (empty for
/// none).
///
/// Each file replaces the whole stored collection.
#[derive(Parser, Debug)]
#[command(name = "income-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// SQLite database path or URL; the file is created if missing
    #[arg(short, long, default_value = "income.db")]
    database: String,

    /// CSV file with income item definitions
    #[arg(short, long)]
    income_items: Option<PathBuf>,

    /// CSV file with deduction item definitions
    #[arg(short = 'D', long)]
    deductions: Option<PathBuf>,

    /// Write the default catalog into collections that were never stored
    #[arg(short, long, default_value_t = false)]
    seed_defaults: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;
    repo.run_migrations()
        .await
        .context("Failed to run migrations")?;

    if let Some(path) = &args.income_items {
        println!("Loading income items from: {}", path.display());
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let items = ItemLoader::parse_income_items(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        let loaded = ItemLoader::load_income_items(&repo, &items)
            .await
            .context("Failed to store income items")?;
        println!("Loaded {} income items.", loaded);
    }

    if let Some(path) = &args.deductions {
        println!("Loading deduction items from: {}", path.display());
        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let items = ItemLoader::parse_deduction_items(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
        let loaded = ItemLoader::load_deduction_items(&repo, &items)
            .await
            .context("Failed to store deduction items")?;
        println!("Loaded {} deduction items.", loaded);
    }

    if args.seed_defaults {
        let seeded = repo
            .seed_defaults()
            .await
            .context("Failed to seed default catalog")?;
        println!("Seeded {} collections with defaults.", seeded);
    }

    Ok(())
}
