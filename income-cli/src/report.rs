//! Plain-text reports. JSON output serializes the result types directly.

use std::fmt::Write;

use income_core::{CalculatedIncome, GroupCalculation};
use rust_decimal::Decimal;

use crate::utils::{format_rate, format_won};

const LABEL_WIDTH: usize = 34;
const AMOUNT_WIDTH: usize = 18;

fn line(
    out: &mut String,
    label: &str,
    amount: Decimal,
) {
    let _ = writeln!(out, "  {label:<LABEL_WIDTH$}{:>AMOUNT_WIDTH$}", format_won(amount));
}

fn rule(out: &mut String) {
    let _ = writeln!(out, "  {}", "-".repeat(LABEL_WIDTH + AMOUNT_WIDTH));
}

/// Step-by-step breakdown for one person.
pub fn render_person(
    name: &str,
    result: &CalculatedIncome,
) -> String {
    let mut out = String::new();
    let title = if name.is_empty() { "Income" } else { name };
    let _ = writeln!(out, "{title}");

    line(&mut out, "Taxable income", result.taxable_income_total);
    line(&mut out, "Tax-exempt income", result.tax_exempt_income_total);
    line(&mut out, "Gross income", result.gross_income);
    rule(&mut out);
    line(&mut out, "Employment income deduction", result.employment_income_deduction);
    line(&mut out, "Income after deduction", result.taxable_income_after_deduction);
    line(&mut out, "Deductions", result.total_deductions);
    line(&mut out, "Taxable standard", result.taxable_standard);
    rule(&mut out);
    let _ = writeln!(
        out,
        "  {:<LABEL_WIDTH$}{:>AMOUNT_WIDTH$}",
        "Marginal rate",
        format_rate(result.marginal_rate)
    );
    line(&mut out, "Income tax", result.income_tax);
    line(&mut out, "Local income tax", result.local_income_tax);
    rule(&mut out);

    let insurance = &result.social_insurance;
    line(&mut out, "National pension", insurance.national_pension);
    line(&mut out, "Health insurance", insurance.health_insurance);
    line(&mut out, "Long-term care insurance", insurance.long_term_care);
    line(&mut out, "Employment insurance", insurance.employment_insurance);
    line(&mut out, "Workers' compensation", insurance.workers_compensation);
    line(&mut out, "Social insurance total", insurance.total);
    rule(&mut out);

    line(&mut out, "Net income", result.net_income);
    line(&mut out, "Monthly net income", result.monthly_net_income);
    out
}

/// Both people of a group followed by the combined totals.
pub fn render_group(group: &GroupCalculation) -> String {
    let mut out = String::new();
    let title = if group.group_name.is_empty() {
        group.group_id.as_str()
    } else {
        group.group_name.as_str()
    };
    let _ = writeln!(out, "== {title} ==");

    for (index, (name, person)) in group.person_names.iter().zip(&group.people).enumerate() {
        let _ = writeln!(out);
        let title = if name.is_empty() {
            format!("Person {}", index + 1)
        } else {
            name.clone()
        };
        out.push_str(&render_person(&title, person));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Combined");
    line(&mut out, "Gross income", group.combined_gross_income);
    line(&mut out, "Net income", group.combined_net_income);
    line(&mut out, "Monthly net income", group.combined_monthly_net_income);
    out
}

/// One line per group: id, name and combined monthly net income.
pub fn render_group_list(groups: &[GroupCalculation]) -> String {
    if groups.is_empty() {
        return "No income groups stored.\n".to_string();
    }

    let mut out = String::new();
    for group in groups {
        let _ = writeln!(
            out,
            "{:<16} {:<24} {:>AMOUNT_WIDTH$} / month",
            group.group_id,
            group.group_name,
            format_won(group.combined_monthly_net_income)
        );
    }
    out
}
