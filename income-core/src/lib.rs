pub mod calculations;
pub mod catalog;
pub mod db;
pub mod models;

pub use calculations::{CalculatorError, IncomeCalculator, SocialInsuranceRates};
pub use db::{Collection, DbConfig, IncomeRepository, RepositoryError};
pub use models::*;
