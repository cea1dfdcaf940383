//! Income calculation modules.
//!
//! - [`income`]: the twelve-step take-home pay calculator
//! - [`brackets`]: the progressive income tax table
//! - [`insurance`]: employee social insurance contributions
//! - [`common`]: rounding helpers shared by the steps

pub mod brackets;
pub mod common;
pub mod income;
pub mod insurance;

pub use brackets::{default_brackets, validate_brackets};
pub use income::{CalculatorError, IncomeCalculator, calculate};
pub use insurance::SocialInsuranceRates;
