use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a progressive tax table.
///
/// A taxable standard `s` falls in this bracket when `min < s <= max`.
/// `max` is `None` for the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
    pub progressive_deduction: Decimal,
}

impl TaxBracket {
    pub fn contains(
        &self,
        taxable_standard: Decimal,
    ) -> bool {
        taxable_standard > self.min && self.max.is_none_or(|max| taxable_standard <= max)
    }
}
