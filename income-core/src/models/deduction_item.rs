use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One configurable deduction line, e.g. the basic personal deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionItem {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Decimal>,
}
