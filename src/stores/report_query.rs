//! Defines the report query trait.

use crate::{
    Error,
    date_range::DateRange,
    statement::{CategoryAmount, MonthlyCategoryAmount},
    stores::AccountSelection,
};

/// Rows for money flowing in and money flowing out, in that order.
pub type FlowRows<T> = (Vec<T>, Vec<T>);

/// Retrieves per-category totals for building statements.
///
/// Implementations may return the same category more than once, e.g. once per
/// money account. Callers are expected to sum duplicates.
pub trait ReportQuery {
    /// Income per category for deposits dated within `range`.
    ///
    /// Deposits without a category are reported under "Uncategorized".
    fn income_by_category(&self, range: &DateRange) -> Result<Vec<CategoryAmount>, Error>;

    /// Expenses per category for withdrawals dated within `range`.
    fn expenses_by_category(&self, range: &DateRange) -> Result<Vec<CategoryAmount>, Error>;

    /// Income per category and month for deposits dated within `range`.
    fn monthly_income_by_category(
        &self,
        range: &DateRange,
    ) -> Result<Vec<MonthlyCategoryAmount>, Error>;

    /// Expenses per category and month for withdrawals dated within `range`.
    fn monthly_expenses_by_category(
        &self,
        range: &DateRange,
    ) -> Result<Vec<MonthlyCategoryAmount>, Error>;

    /// Money into and out of the selected accounts per category.
    fn cashflow_by_category(
        &self,
        range: &DateRange,
        account: AccountSelection,
    ) -> Result<FlowRows<CategoryAmount>, Error>;

    /// Money into and out of the selected accounts per category and month.
    fn monthly_cashflow_by_category(
        &self,
        range: &DateRange,
        account: AccountSelection,
    ) -> Result<FlowRows<MonthlyCategoryAmount>, Error>;
}
