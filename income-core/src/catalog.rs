//! Default income and deduction item definitions.
//!
//! A fresh store is seeded with these lists. Tax-exempt allowances carry the
//! statutory monthly limit of 200,000 won.
//!
//! | id                   | kind       | monthly limit |
//! |----------------------|------------|---------------|
//! | `base_salary`        | taxable    |               |
//! | `bonus`              | taxable    |               |
//! | `overtime_pay`       | taxable    |               |
//! | `meal_allowance`     | tax-exempt | 200,000       |
//! | `vehicle_allowance`  | tax-exempt | 200,000       |
//! | `childcare_allowance`| tax-exempt | 200,000       |

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{DeductionItem, IncomeItem, IncomeKind};

const EXEMPT_MONTHLY_LIMIT: Decimal = dec!(200000);
const PERSONAL_DEDUCTION: Decimal = dec!(1500000);

fn income_item(
    id: &str,
    name: &str,
    kind: IncomeKind,
    category: &str,
    order: i32,
) -> IncomeItem {
    let monthly_limit = match kind {
        IncomeKind::Taxable => None,
        IncomeKind::TaxExempt => Some(EXEMPT_MONTHLY_LIMIT),
    };
    IncomeItem {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        category: category.to_string(),
        monthly_limit,
        order,
    }
}

fn deduction_item(
    id: &str,
    name: &str,
    category: &str,
    default_value: Option<Decimal>,
) -> DeductionItem {
    DeductionItem {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        default_value,
    }
}

/// Default income items, sorted by `order`.
pub fn default_income_items() -> Vec<IncomeItem> {
    vec![
        income_item("base_salary", "Base salary", IncomeKind::Taxable, "salary", 1),
        income_item("bonus", "Bonus", IncomeKind::Taxable, "salary", 2),
        income_item("overtime_pay", "Overtime pay", IncomeKind::Taxable, "salary", 3),
        income_item("meal_allowance", "Meal allowance", IncomeKind::TaxExempt, "allowance", 4),
        income_item(
            "vehicle_allowance",
            "Vehicle maintenance allowance",
            IncomeKind::TaxExempt,
            "allowance",
            5,
        ),
        income_item(
            "childcare_allowance",
            "Childcare allowance",
            IncomeKind::TaxExempt,
            "allowance",
            6,
        ),
    ]
}

/// Default deduction items. Only the personal deduction has a default value.
pub fn default_deduction_items() -> Vec<DeductionItem> {
    vec![
        deduction_item("personal", "Basic personal deduction", "personal", Some(PERSONAL_DEDUCTION)),
        deduction_item("dependents", "Dependents deduction", "personal", None),
        deduction_item("insurance_premiums", "Insurance premiums", "special", None),
        deduction_item("housing_fund", "Housing fund", "special", None),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::calculate;

    #[test]
    fn income_items_are_sorted_by_order() {
        let items = default_income_items();

        assert!(items.windows(2).all(|w| w[0].order < w[1].order));
    }

    #[test]
    fn income_item_ids_are_unique() {
        let items = default_income_items();
        let ids: HashSet<_> = items.iter().map(|i| i.id.as_str()).collect();

        assert_eq!(ids.len(), items.len());
    }

    #[test]
    fn only_exempt_items_have_limits() {
        for item in default_income_items() {
            assert_eq!(item.monthly_limit.is_some(), !item.is_taxable(), "{}", item.id);
        }
    }

    #[test]
    fn personal_deduction_defaults_to_one_and_a_half_million() {
        let items = default_deduction_items();
        let personal = items.iter().find(|d| d.id == "personal").unwrap();

        assert_eq!(personal.default_value, Some(dec!(1500000)));
        assert_eq!(items.iter().filter(|d| d.default_value.is_some()).count(), 1);
    }

    #[test]
    fn catalog_defaults_feed_the_calculator() {
        let values = BTreeMap::from([
            ("base_salary".to_string(), dec!(30000000)),
            ("meal_allowance".to_string(), dec!(200000)),
        ]);

        let result = calculate(
            &default_income_items(),
            &default_deduction_items(),
            &values,
            &BTreeMap::new(),
        );

        assert_eq!(result.tax_exempt_income_total, dec!(2400000));
        assert_eq!(result.total_deductions, dec!(1500000));
        // 20,250,000 - 1,500,000 = 18,750,000; * 15% - 1,260,000
        assert_eq!(result.income_tax, dec!(1552500));
    }
}
