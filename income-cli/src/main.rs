use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use income_core::Collection;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use income_cli::config::{AppConfig, ConfigOverrides};
use income_cli::input::CalculationInput;
use income_cli::utils::parse_entry;
use income_cli::{app, logging, report};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Take-home pay calculator for Korean wage income.
///
/// Computes income tax, local income tax and social insurance from itemised
/// income and deductions, either from an input file or from income groups
/// kept in the store.
#[derive(Debug, Parser)]
#[command(name = "income-calc", version, about)]
struct Cli {
    /// TOML configuration file (default: ./income-calc.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `income.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Database backend to use.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Log level or filter directive; RUST_LOG takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Print results as JSON instead of a text report.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Calculate one person's net income from a file and/or entered values.
    Calculate {
        /// TOML or JSON input file.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// CSV bracket table replacing the statutory one.
        #[arg(short, long)]
        brackets: Option<PathBuf>,

        /// Income value as ID=AMOUNT; repeatable.
        #[arg(long = "income", value_name = "ID=AMOUNT", value_parser = parse_entry)]
        income: Vec<(String, Decimal)>,

        /// Deduction value as ID=AMOUNT; repeatable.
        #[arg(long = "deduction", value_name = "ID=AMOUNT", value_parser = parse_entry)]
        deduction: Vec<(String, Decimal)>,
    },

    /// Calculate a stored income group.
    Group {
        /// Group id.
        id: String,

        /// CSV bracket table replacing the statutory one.
        #[arg(short, long)]
        brackets: Option<PathBuf>,
    },

    /// List stored income groups with their combined net income.
    Groups,

    /// Create the store and seed the default item catalog.
    Init,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to encode JSON output")?;
    println!("{text}");
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_overrides(ConfigOverrides {
            log_level: cli.log_level,
            backend: cli.backend,
            connection_string: cli.db,
        });
    config.validate().context("Invalid configuration")?;

    logging::init_logging(&config.log_level)?;
    if let Some(path) = &cli.log_file {
        logging::enable_file_logging(path)?;
    }
    debug!(?config, "configuration loaded");
    if config.database.is_in_memory() && !matches!(cli.command, Command::Calculate { .. }) {
        warn!("using an in-memory store; nothing is kept after this command");
    }

    match cli.command {
        Command::Calculate {
            input,
            brackets,
            income,
            deduction,
        } => {
            let input = match &input {
                Some(path) => CalculationInput::from_file(path)?,
                None => CalculationInput::default(),
            }
            .with_entries(income, deduction);

            let brackets = app::load_brackets(brackets.as_deref())?;
            let calculator = app::calculator(&brackets)?;
            let (income_items, deduction_items) = input.items();
            let result = calculator.calculate_person(&income_items, &deduction_items, &input.person);

            if cli.json {
                print_json(&result)?;
            } else {
                print!("{}", report::render_person(&input.person.name, &result));
            }
        }

        Command::Group { id, brackets } => {
            let repo = app::build_registry().create(&config.database).await?;
            let brackets = app::load_brackets(brackets.as_deref())?;
            let calculator = app::calculator(&brackets)?;
            let result = app::calculate_group(repo.as_ref(), &calculator, &id).await?;

            if cli.json {
                print_json(&result)?;
            } else {
                print!("{}", report::render_group(&result));
            }
        }

        Command::Groups => {
            let repo = app::build_registry().create(&config.database).await?;
            let calculator = income_core::IncomeCalculator::default();
            let results = app::calculate_groups(repo.as_ref(), &calculator).await?;

            if cli.json {
                print_json(&results)?;
            } else {
                print!("{}", report::render_group_list(&results));
            }
        }

        Command::Init => {
            // The factory migrates and seeds on open.
            let repo = app::build_registry().create(&config.database).await?;
            let income_items = repo.list_income_items().await?;
            let deduction_items = repo.list_deduction_items().await?;
            let modified = repo.last_modified(Collection::IncomeItems).await?;
            info!(database = %config.database.connection_string, "store initialised");

            println!(
                "Store '{}' ready: {} income items, {} deduction items (items last changed {}).",
                config.database.connection_string,
                income_items.len(),
                deduction_items.len(),
                modified
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "never".to_string())
            );
        }
    }

    Ok(())
}
