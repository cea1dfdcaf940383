//! Wiring shared by the `income-calc` subcommands.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use income_core::calculations::{IncomeCalculator, default_brackets};
use income_core::db::RepositoryRegistry;
use income_core::{GroupCalculation, IncomeRepository, SocialInsuranceRates, TaxBracket};
use income_data::BracketLoader;
use income_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, info};

/// Registry with every backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// The bracket table from `path`, or the statutory table.
pub fn load_brackets(path: Option<&Path>) -> Result<Vec<TaxBracket>> {
    match path {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
            let brackets = BracketLoader::parse(file)
                .with_context(|| format!("Failed to load brackets: {}", path.display()))?;
            info!(path = %path.display(), rows = brackets.len(), "loaded tax brackets");
            Ok(brackets)
        }
        None => Ok(default_brackets().to_vec()),
    }
}

/// Builds a calculator over `brackets` with the default insurance rates.
pub fn calculator(brackets: &[TaxBracket]) -> Result<IncomeCalculator<'_>> {
    IncomeCalculator::new(brackets, SocialInsuranceRates::default())
        .context("Invalid calculator configuration")
}

/// Calculates every stored group against the stored item lists.
pub async fn calculate_groups(
    repo: &dyn IncomeRepository,
    calculator: &IncomeCalculator<'_>,
) -> Result<Vec<GroupCalculation>> {
    let income_items = repo
        .list_income_items()
        .await
        .context("Failed to list income items")?;
    let deduction_items = repo
        .list_deduction_items()
        .await
        .context("Failed to list deduction items")?;
    let groups = repo
        .list_income_groups()
        .await
        .context("Failed to list income groups")?;
    debug!(groups = groups.len(), "calculating stored groups");

    Ok(groups
        .iter()
        .map(|group| calculator.calculate_group(&income_items, &deduction_items, group))
        .collect())
}

/// Calculates one stored group.
pub async fn calculate_group(
    repo: &dyn IncomeRepository,
    calculator: &IncomeCalculator<'_>,
    group_id: &str,
) -> Result<GroupCalculation> {
    let group = repo
        .get_income_group(group_id)
        .await
        .with_context(|| format!("Failed to load income group '{}'", group_id))?;
    let income_items = repo
        .list_income_items()
        .await
        .context("Failed to list income items")?;
    let deduction_items = repo
        .list_deduction_items()
        .await
        .context("Failed to list deduction items")?;

    Ok(calculator.calculate_group(&income_items, &deduction_items, &group))
}
