//! Turns statements into display-ready view models.
//!
//! The view models are used by both the HTML templates and the JSON data
//! endpoints, so every amount is already formatted as a string.

use std::collections::BTreeMap;

use numfmt::{Formatter, Precision};
use serde::Serialize;

use crate::{
    date_range::{YearMonth, format_date},
    money::{Currency, Money},
    statement::core::{
        CashflowStatement, LineItem, MonthlyGrid, Section, Statement, StatementKind,
    },
};

/// A statement with all amounts formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementView {
    pub kind: StatementKind,
    pub title: &'static str,
    pub start_date: String,
    pub end_date: String,
    pub currency: String,
    pub inflows: SectionView,
    pub outflows: SectionView,
    pub net_title: &'static str,
    pub net: String,
    pub is_profit: bool,
    /// Outflows as a percentage of inflows.
    pub outflow_ratio: String,
    pub monthly: Option<MonthlyView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub title: &'static str,
    pub line_items: Vec<LineItemView>,
    pub subtotal: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItemView {
    pub category: String,
    pub amount: String,
    pub percentage: String,
    /// The number of transactions in the category.
    pub count: i64,
}

/// The month by month tables for both sides of a statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyView {
    pub inflows: MonthlyTableView,
    pub outflows: MonthlyTableView,
}

/// One row per month of the statement period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTableView {
    /// The column order: the section's line items first, then any category
    /// that only appears in the monthly data.
    pub categories: Vec<String>,
    pub rows: Vec<MonthlyRowView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRowView {
    /// The sortable month key, e.g. "2024-01".
    pub month: String,
    /// The display label, e.g. "Jan 2024".
    pub label: String,
    /// Every category of the table, zero if there was no activity.
    pub amounts: BTreeMap<String, String>,
    pub total: String,
}

/// A cashflow statement with the account balances formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashflowStatementView {
    pub account_name: String,
    pub starting_balance: String,
    pub ending_balance: String,
    #[serde(flatten)]
    pub statement: StatementView,
}

pub fn format_statement(statement: &Statement) -> StatementView {
    let monthly = statement.monthly.as_ref().map(|monthly| {
        let months = statement.period.months();

        MonthlyView {
            inflows: format_monthly_table(
                &statement.inflows,
                &monthly.inflows,
                &months,
                &statement.currency,
            ),
            outflows: format_monthly_table(
                &statement.outflows,
                &monthly.outflows,
                &months,
                &statement.currency,
            ),
        }
    });

    StatementView {
        kind: statement.kind,
        title: statement.kind.title(),
        start_date: format_date(statement.period.start()),
        end_date: format_date(statement.period.end()),
        currency: statement.currency.code().to_owned(),
        inflows: format_section(&statement.inflows),
        outflows: format_section(&statement.outflows),
        net_title: statement.kind.net_title(),
        net: format_money(&statement.net),
        is_profit: statement.is_profit(),
        outflow_ratio: statement.outflow_ratio().to_string(),
        monthly,
    }
}

pub fn format_cashflow_statement(cashflow: &CashflowStatement) -> CashflowStatementView {
    CashflowStatementView {
        account_name: cashflow.account_name.clone(),
        starting_balance: format_money(&cashflow.starting_balance),
        ending_balance: format_money(&cashflow.ending_balance),
        statement: format_statement(&cashflow.statement),
    }
}

fn format_section(section: &Section) -> SectionView {
    SectionView {
        title: section.title,
        line_items: section.line_items.iter().map(format_line_item).collect(),
        subtotal: format_money(&section.subtotal),
    }
}

fn format_line_item(line_item: &LineItem) -> LineItemView {
    LineItemView {
        category: line_item.category.clone(),
        amount: format_money(&line_item.amount),
        percentage: line_item.percentage.to_string(),
        count: line_item.count,
    }
}

fn format_monthly_table(
    section: &Section,
    grid: &MonthlyGrid,
    months: &[YearMonth],
    currency: &Currency,
) -> MonthlyTableView {
    let mut categories: Vec<String> = section
        .line_items
        .iter()
        .map(|item| item.category.clone())
        .collect();

    for category in grid.categories() {
        if !categories.iter().any(|existing| existing == category) {
            categories.push(category.to_owned());
        }
    }

    let zero = Money::zero(currency.clone());

    let rows = months
        .iter()
        .map(|month| {
            let amounts = categories
                .iter()
                .map(|category| {
                    let amount = grid.get(month, category).unwrap_or(&zero);
                    (category.clone(), format_money(amount))
                })
                .collect();

            MonthlyRowView {
                month: month.key(),
                label: month.label(),
                amounts,
                total: format_money(&grid.month_total(month, currency)),
            }
        })
        .collect();

    MonthlyTableView { categories, rows }
}

/// Format `money` with its currency symbol, thousands separators and two
/// decimal places, e.g. "$1,234.56" or "-€1,000.00".
pub fn format_money(money: &Money) -> String {
    let symbol = money.currency().symbol();
    let sign = if money.is_negative() { "-" } else { "" };
    let minor_units = money.amount().unsigned_abs();
    let major = minor_units / 100;
    let cents = minor_units % 100;

    format!("{sign}{}.{cents:02}", format_major_units(major, &symbol))
}

/// Format whole major units with `symbol` as a prefix and thousands separators.
///
/// The cents are formatted separately since numfmt drops trailing zeros.
fn format_major_units(major: u64, symbol: &str) -> String {
    // numfmt formats zero as "0" without the prefix.
    if major == 0 {
        return format!("{symbol}0");
    }

    match Formatter::currency(symbol) {
        Ok(formatter) => formatter
            .precision(Precision::Decimals(0))
            .fmt_string(major as f64),
        Err(error) => {
            tracing::warn!("could not create a currency formatter for {symbol:?}: {error:?}");
            format!("{symbol}{major}")
        }
    }
}
