//! The statement read model: line items, sections and the statement itself.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
};

use serde::Serialize;

use crate::{
    date_range::{DateRange, YearMonth},
    money::{Currency, Money},
};

/// The total amount for one category over a reporting period.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: Money,
    /// The number of transactions making up `amount`.
    pub count: i64,
}

impl CategoryAmount {
    /// A total made up of a single transaction, see [CategoryAmount::with_count].
    pub fn new(category: &str, amount: Money) -> Self {
        Self {
            category: category.to_owned(),
            amount,
            count: 1,
        }
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }
}

/// The total amount for one category in one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyCategoryAmount {
    pub month: YearMonth,
    pub category: String,
    pub amount: Money,
    pub count: i64,
}

impl MonthlyCategoryAmount {
    pub fn new(month: YearMonth, category: &str, amount: Money) -> Self {
        Self {
            month,
            category: category.to_owned(),
            amount,
            count: 1,
        }
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }
}

/// Month-bucketed rows for both sides of a statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyRows {
    pub inflows: Vec<MonthlyCategoryAmount>,
    pub outflows: Vec<MonthlyCategoryAmount>,
}

/// The raw rows a statement is built from.
///
/// `monthly` is `None` for the flat view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementRows {
    pub inflows: Vec<CategoryAmount>,
    pub outflows: Vec<CategoryAmount>,
    pub monthly: Option<MonthlyRows>,
}

/// Which report a statement represents, decides the section titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// Revenue against expenses.
    IncomeStatement,
    /// Money into and out of one or more money accounts.
    Cashflow,
}

impl StatementKind {
    pub fn title(&self) -> &'static str {
        match self {
            StatementKind::IncomeStatement => "Income Statement",
            StatementKind::Cashflow => "Cash Flow Statement",
        }
    }

    pub fn inflow_title(&self) -> &'static str {
        match self {
            StatementKind::IncomeStatement => "Revenue",
            StatementKind::Cashflow => "Inflows",
        }
    }

    pub fn outflow_title(&self) -> &'static str {
        match self {
            StatementKind::IncomeStatement => "Expenses",
            StatementKind::Cashflow => "Outflows",
        }
    }

    pub fn net_title(&self) -> &'static str {
        match self {
            StatementKind::IncomeStatement => "Net Profit",
            StatementKind::Cashflow => "Net Cash Flow",
        }
    }
}

/// A percentage stored in hundredths of a percent, i.e. rounded to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Percentage(i64);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);

    /// `part` as a percentage of `whole`, rounded half up to two decimal places.
    ///
    /// Returns zero when `whole` is not positive instead of dividing by zero.
    pub fn of(part: i64, whole: i64) -> Self {
        if whole <= 0 {
            return Self::ZERO;
        }

        let numerator = i128::from(part) * 10_000 * 2 + i128::from(whole);
        let denominator = i128::from(whole) * 2;

        Self(numerator.div_euclid(denominator) as i64)
    }

    pub fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    pub fn hundredths(&self) -> i64 {
        self.0
    }
}

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();

        write!(f, "{sign}{}.{:02}%", abs / 100, abs % 100)
    }
}

/// One category's amount and its share of the section subtotal.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub category: String,
    pub amount: Money,
    pub percentage: Percentage,
    /// The number of transactions in the category.
    pub count: i64,
}

/// One side of a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: &'static str,
    /// Sorted by amount, largest first, ties broken by category name.
    pub line_items: Vec<LineItem>,
    /// Always the sum of `line_items`.
    pub subtotal: Money,
}

/// Amounts per month and category for one side of a statement.
///
/// The month and category totals are summed when the grid is built, so
/// reading them cannot overflow.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlyGrid {
    pub(super) cells: BTreeMap<YearMonth, BTreeMap<String, Money>>,
    pub(super) month_totals: BTreeMap<YearMonth, i64>,
    pub(super) category_totals: BTreeMap<String, CategoryTotal>,
}

/// The sum of one category over every month of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) struct CategoryTotal {
    pub(super) amount: i64,
    pub(super) count: i64,
}

impl MonthlyGrid {
    /// The amount for `category` in `month`, if there was any activity.
    pub fn get(&self, month: &YearMonth, category: &str) -> Option<&Money> {
        self.cells.get(month).and_then(|row| row.get(category))
    }

    /// The months with at least one amount, in chronological order.
    pub fn months(&self) -> impl Iterator<Item = &YearMonth> {
        self.cells.keys()
    }

    /// Every category that appears in any month, sorted by name.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.category_totals.keys().map(String::as_str).collect()
    }

    /// The sum over all categories for `month`.
    pub fn month_total(&self, month: &YearMonth, currency: &Currency) -> Money {
        let total = self.month_totals.get(month).copied().unwrap_or(0);

        Money::new(total, currency.clone())
    }

    /// The sum over all months for `category`.
    pub fn category_total(&self, category: &str, currency: &Currency) -> Money {
        let total = self
            .category_totals
            .get(category)
            .map(|total| total.amount)
            .unwrap_or(0);

        Money::new(total, currency.clone())
    }

    /// The number of transactions over all months for `category`.
    pub fn category_count(&self, category: &str) -> i64 {
        self.category_totals
            .get(category)
            .map(|total| total.count)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Month by month amounts for both sides of a statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlyBreakdown {
    pub inflows: MonthlyGrid,
    pub outflows: MonthlyGrid,
}

/// An income or cashflow statement for a single currency.
///
/// Built fresh for every report request by
/// [build_statement](crate::statement::build_statement) and never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub period: DateRange,
    pub currency: Currency,
    pub inflows: Section,
    pub outflows: Section,
    /// Inflow subtotal minus outflow subtotal.
    pub net: Money,
    pub monthly: Option<MonthlyBreakdown>,
}

impl Statement {
    /// Whether the net result is strictly positive.
    ///
    /// A net result of exactly zero is break-even, not profit.
    pub fn is_profit(&self) -> bool {
        self.net.is_positive()
    }

    /// Whether more money came in than went out, see [Statement::is_profit].
    pub fn is_positive(&self) -> bool {
        self.is_profit()
    }

    pub fn is_break_even(&self) -> bool {
        self.net.is_zero()
    }

    /// The outflow subtotal as a percentage of the inflow subtotal.
    pub fn outflow_ratio(&self) -> Percentage {
        Percentage::of(self.outflows.subtotal.amount(), self.inflows.subtotal.amount())
    }
}

/// A cashflow statement together with the balances of the accounts it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct CashflowStatement {
    pub account_name: String,
    pub statement: Statement,
    /// `ending_balance` minus the net cash flow.
    pub starting_balance: Money,
    pub ending_balance: Money,
}
