//! Integration tests for item loading using the actual database backend.

use income_core::IncomeRepository;
use income_core::calculations::{IncomeCalculator, SocialInsuranceRates};
use income_core::catalog::default_deduction_items;
use income_data::{BracketLoader, ItemLoader, ItemLoaderError};
use income_db_sqlite::SqliteRepository;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use sqlx::sqlite::SqlitePoolOptions;

const INCOME_ITEMS_CSV: &str = include_str!("../test-data/income_items.csv");
const DEDUCTION_ITEMS_CSV: &str = include_str!("../test-data/deduction_items.csv");
const TAX_BRACKETS_CSV: &str = include_str!("../test-data/tax_brackets.csv");

async fn setup_test_db() -> SqliteRepository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    let repo = SqliteRepository::new_with_pool(pool).await;
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");

    repo
}

#[tokio::test]
async fn test_load_income_items() {
    let repo = setup_test_db().await;

    let items =
        ItemLoader::parse_income_items(INCOME_ITEMS_CSV.as_bytes()).expect("Failed to parse CSV");
    let loaded = ItemLoader::load_income_items(&repo, &items)
        .await
        .expect("Failed to load items");

    assert_eq!(loaded, 7);
    let stored = repo.list_income_items().await.unwrap();
    assert_eq!(stored, items);
    assert_eq!(stored[6].id, "research_allowance");
    assert_eq!(stored[6].monthly_limit, Some(dec!(200000)));
}

#[tokio::test]
async fn test_load_deduction_items_matches_catalog() {
    let repo = setup_test_db().await;

    let items = ItemLoader::parse_deduction_items(DEDUCTION_ITEMS_CSV.as_bytes())
        .expect("Failed to parse CSV");
    ItemLoader::load_deduction_items(&repo, &items)
        .await
        .expect("Failed to load items");

    let stored = repo.list_deduction_items().await.unwrap();
    assert_eq!(stored.len(), default_deduction_items().len());
    assert_eq!(stored[0].default_value, Some(dec!(1500000)));
}

#[tokio::test]
async fn test_load_is_idempotent() {
    let repo = setup_test_db().await;
    let items =
        ItemLoader::parse_income_items(INCOME_ITEMS_CSV.as_bytes()).expect("Failed to parse CSV");

    ItemLoader::load_income_items(&repo, &items).await.unwrap();
    ItemLoader::load_income_items(&repo, &items).await.unwrap();

    assert_eq!(repo.list_income_items().await.unwrap().len(), 7);
}

#[tokio::test]
async fn test_load_replaces_existing_items() {
    let repo = setup_test_db().await;
    repo.seed_defaults().await.unwrap();

    let csv = "id,name,kind,category,monthly_limit,order\nstipend,Stipend,taxable,other,,1";
    let items = ItemLoader::parse_income_items(csv.as_bytes()).unwrap();
    ItemLoader::load_income_items(&repo, &items).await.unwrap();

    let stored = repo.list_income_items().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, "stipend");
}

#[tokio::test]
async fn test_invalid_file_leaves_store_untouched() {
    let repo = setup_test_db().await;
    repo.seed_defaults().await.unwrap();
    let before = repo.list_income_items().await.unwrap();

    let csv = "id,name,kind,category,monthly_limit,order\nx,X,taxable,a,,1\nx,X,taxable,a,,2";
    let result = ItemLoader::parse_income_items(csv.as_bytes());

    assert!(matches!(result, Err(ItemLoaderError::DuplicateId(_))));
    assert_eq!(repo.list_income_items().await.unwrap(), before);
}

#[tokio::test]
async fn test_loaded_items_and_brackets_drive_calculator() {
    let repo = setup_test_db().await;
    let items = ItemLoader::parse_income_items(INCOME_ITEMS_CSV.as_bytes()).unwrap();
    let deductions = ItemLoader::parse_deduction_items(DEDUCTION_ITEMS_CSV.as_bytes()).unwrap();
    ItemLoader::load_income_items(&repo, &items).await.unwrap();
    ItemLoader::load_deduction_items(&repo, &deductions).await.unwrap();
    let brackets = BracketLoader::parse(TAX_BRACKETS_CSV.as_bytes()).unwrap();

    let calculator = IncomeCalculator::new(&brackets, SocialInsuranceRates::default())
        .expect("Loaded table should be valid");
    let person = income_core::PersonIncomeInput::new("A")
        .with_income("base_salary", dec!(30000000))
        .with_income("research_allowance", dec!(300000));
    let result = calculator.calculate_person(
        &repo.list_income_items().await.unwrap(),
        &repo.list_deduction_items().await.unwrap(),
        &person,
    );

    assert_eq!(result.tax_exempt_income_total, dec!(2400000));
    assert_eq!(result.total_deductions, dec!(1500000));
    assert_eq!(result.income_tax, dec!(1552500));
}
