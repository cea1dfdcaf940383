pub(crate) mod amount;
mod calculated_income;
mod deduction_item;
mod income_group;
mod income_item;
mod tax_bracket;

pub use amount::{MAX_ENTRY_AMOUNT, normalize_amount_text, parse_amount};
pub use calculated_income::{CalculatedIncome, GroupCalculation, SocialInsurance};
pub use deduction_item::DeductionItem;
pub use income_group::{IncomeGroup, PersonIncomeInput};
pub use income_item::{IncomeItem, IncomeKind};
pub use tax_bracket::TaxBracket;
