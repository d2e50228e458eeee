//! Builds statements from per-category rows.
//!
//! The flat rows and the monthly rows come from two independent queries, so
//! they can disagree slightly. A category that only shows up in the monthly
//! rows is added to the flat section using its monthly total.

use std::collections::{BTreeMap, HashMap};

use crate::{
    Error,
    date_range::DateRange,
    money::{Currency, Money},
    statement::core::{
        CategoryAmount, CategoryTotal, LineItem, MonthlyBreakdown, MonthlyCategoryAmount,
        MonthlyGrid, Percentage, Section, Statement, StatementKind, StatementRows,
    },
};

/// Build a statement of `kind` for `period` from `rows`.
///
/// `default_currency` is only used when there are no rows at all.
///
/// # Errors
/// Returns [Error::CurrencyMismatch] if the rows are not all in one currency,
/// or [Error::AmountOverflow] if a total does not fit in an `i64`.
/// No partial statement is produced in either case.
pub fn build_statement(
    kind: StatementKind,
    period: DateRange,
    rows: &StatementRows,
    default_currency: &Currency,
) -> Result<Statement, Error> {
    let currency = find_statement_currency(rows, default_currency)?;

    let monthly = match &rows.monthly {
        Some(monthly) => Some(MonthlyBreakdown {
            inflows: build_monthly_grid(&monthly.inflows)?,
            outflows: build_monthly_grid(&monthly.outflows)?,
        }),
        None => None,
    };

    let inflows = build_section(
        kind.inflow_title(),
        &rows.inflows,
        monthly.as_ref().map(|monthly| &monthly.inflows),
        &currency,
    )?;
    let outflows = build_section(
        kind.outflow_title(),
        &rows.outflows,
        monthly.as_ref().map(|monthly| &monthly.outflows),
        &currency,
    )?;
    let net = inflows.subtotal.checked_sub(&outflows.subtotal)?;

    Ok(Statement {
        kind,
        period,
        currency,
        inflows,
        outflows,
        net,
        monthly,
    })
}

/// Find the one currency shared by every row.
///
/// The first currency seen is the expected one, the first row that differs is reported.
fn find_statement_currency(
    rows: &StatementRows,
    default_currency: &Currency,
) -> Result<Currency, Error> {
    let flat_amounts = rows
        .inflows
        .iter()
        .chain(rows.outflows.iter())
        .map(|row| &row.amount);
    let monthly_amounts = rows
        .monthly
        .iter()
        .flat_map(|monthly| monthly.inflows.iter().chain(monthly.outflows.iter()))
        .map(|row| &row.amount);

    let mut expected: Option<&Currency> = None;

    for amount in flat_amounts.chain(monthly_amounts) {
        match expected {
            None => expected = Some(amount.currency()),
            Some(currency) if currency != amount.currency() => {
                return Err(Error::CurrencyMismatch {
                    expected: currency.clone(),
                    found: amount.currency().clone(),
                });
            }
            Some(_) => {}
        }
    }

    Ok(expected.unwrap_or(default_currency).clone())
}

fn add_amounts(a: i64, b: i64) -> Result<i64, Error> {
    a.checked_add(b).ok_or(Error::AmountOverflow)
}

fn build_monthly_grid(rows: &[MonthlyCategoryAmount]) -> Result<MonthlyGrid, Error> {
    let mut grid = MonthlyGrid::default();

    for row in rows {
        let amount = grid
            .cells
            .entry(row.month)
            .or_insert_with(BTreeMap::new)
            .entry(row.category.clone())
            .or_insert_with(|| Money::zero(row.amount.currency().clone()));
        *amount = amount.checked_add(&row.amount)?;

        let month_total = grid.month_totals.entry(row.month).or_insert(0);
        *month_total = add_amounts(*month_total, row.amount.amount())?;

        let category_total = grid
            .category_totals
            .entry(row.category.clone())
            .or_insert_with(CategoryTotal::default);
        category_total.amount = add_amounts(category_total.amount, row.amount.amount())?;
        category_total.count = category_total.count.saturating_add(row.count);
    }

    Ok(grid)
}

fn build_section(
    title: &'static str,
    rows: &[CategoryAmount],
    monthly: Option<&MonthlyGrid>,
    currency: &Currency,
) -> Result<Section, Error> {
    // Category to (amount, transaction count).
    let mut totals: HashMap<&str, (i64, i64)> = HashMap::new();

    for row in rows {
        let (amount, count) = totals.entry(row.category.as_str()).or_insert((0, 0));
        *amount = add_amounts(*amount, row.amount.amount())?;
        *count = count.saturating_add(row.count);
    }

    if let Some(monthly) = monthly {
        for category in monthly.categories() {
            totals.entry(category).or_insert_with(|| {
                (
                    monthly.category_total(category, currency).amount(),
                    monthly.category_count(category),
                )
            });
        }
    }

    let subtotal = totals
        .values()
        .try_fold(0, |subtotal, (amount, _)| add_amounts(subtotal, *amount))?;

    let mut line_items: Vec<LineItem> = totals
        .into_iter()
        .map(|(category, (amount, count))| LineItem {
            category: category.to_owned(),
            amount: Money::new(amount, currency.clone()),
            percentage: Percentage::of(amount, subtotal),
            count,
        })
        .collect();

    line_items.sort_by(|a, b| {
        b.amount
            .amount()
            .cmp(&a.amount.amount())
            .then_with(|| a.category.cmp(&b.category))
    });

    Ok(Section {
        title,
        line_items,
        subtotal: Money::new(subtotal, currency.clone()),
    })
}
