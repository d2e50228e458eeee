//! Builds income and cashflow statements from the stores.
//!
//! Statements are built with a monthly breakdown where possible. If the
//! monthly data cannot be loaded or aggregated the service falls back to the
//! flat view, and only a failure of the flat view is returned to the caller.

use std::collections::BTreeSet;

use crate::{
    Error,
    date_range::DateRange,
    events::{ReportEvent, ReportEvents},
    money::{Currency, Money},
    statement::{
        CashflowStatement, CategoryAmount, MonthlyCategoryAmount, MonthlyRows, Statement,
        StatementKind, StatementRows, build_statement,
    },
    stores::{AccountSelection, FlowRows, MoneyAccountStore, ReportQuery},
};

/// The account name shown for a cashflow statement covering every account.
pub const ALL_ACCOUNTS_NAME: &str = "All accounts";

/// Generates financial statements.
#[derive(Debug, Clone)]
pub struct FinancialReportService<Q, A> {
    query: Q,
    accounts: A,
    events: ReportEvents,
    default_currency: Currency,
}

impl<Q, A> FinancialReportService<Q, A>
where
    Q: ReportQuery,
    A: MoneyAccountStore,
{
    /// Create a report service.
    ///
    /// `default_currency` is used for statements without any transactions.
    pub fn new(query: Q, accounts: A, events: ReportEvents, default_currency: Currency) -> Self {
        Self {
            query,
            accounts,
            events,
            default_currency,
        }
    }

    /// The accounts a cashflow statement can be generated for.
    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    /// Build the income statement for `period`.
    ///
    /// # Errors
    /// Returns an error if the flat income statement cannot be built, e.g. on
    /// an SQL error or when transactions are in more than one currency.
    pub fn income_statement(&self, period: DateRange) -> Result<Statement, Error> {
        let statement = self.build_with_fallback(
            StatementKind::IncomeStatement,
            period,
            &self.default_currency,
            || {
                Ok((
                    self.query.income_by_category(&period)?,
                    self.query.expenses_by_category(&period)?,
                ))
            },
            || {
                Ok((
                    self.query.monthly_income_by_category(&period)?,
                    self.query.monthly_expenses_by_category(&period)?,
                ))
            },
        )?;

        self.events.publish(ReportEvent::IncomeStatementGenerated {
            period,
            net: statement.net.clone(),
            monthly: statement.monthly.is_some(),
        });

        Ok(statement)
    }

    /// Build the cashflow statement for the selected accounts over `period`.
    ///
    /// The ending balance is the current balance of the selected accounts and
    /// the starting balance is the ending balance minus the net cash flow.
    /// A period without transactions is in the currency of the accounts.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if a single account is selected and it does
    /// not exist, or an error if the flat statement cannot be built.
    pub fn cashflow_statement(
        &self,
        period: DateRange,
        selection: AccountSelection,
    ) -> Result<CashflowStatement, Error> {
        let account_name = match selection {
            AccountSelection::All => ALL_ACCOUNTS_NAME.to_owned(),
            AccountSelection::One(id) => self.accounts.get(id)?.name,
        };

        let balance = self.accounts.balance(selection).inspect_err(|error| {
            tracing::error!("could not get the balance for account {selection}: {error}")
        })?;
        // An empty period has no transactions to take the currency from, so
        // it is taken from the accounts.
        let default_currency = balance
            .as_ref()
            .map(|balance| balance.currency().clone())
            .unwrap_or_else(|| self.default_currency.clone());

        let statement = self.build_with_fallback(
            StatementKind::Cashflow,
            period,
            &default_currency,
            || self.query.cashflow_by_category(&period, selection),
            || self.query.monthly_cashflow_by_category(&period, selection),
        )?;

        let ending_balance = balance.unwrap_or_else(|| Money::zero(statement.currency.clone()));
        let starting_balance = ending_balance.checked_sub(&statement.net).inspect_err(|error| {
            tracing::error!("account balance does not match the statement currency: {error}")
        })?;

        self.events.publish(ReportEvent::CashflowStatementGenerated {
            period,
            account: selection,
            net: statement.net.clone(),
            monthly: statement.monthly.is_some(),
        });

        Ok(CashflowStatement {
            account_name,
            statement,
            starting_balance,
            ending_balance,
        })
    }

    fn build_with_fallback(
        &self,
        kind: StatementKind,
        period: DateRange,
        default_currency: &Currency,
        flat_rows: impl FnOnce() -> Result<FlowRows<CategoryAmount>, Error>,
        monthly_rows: impl FnOnce() -> Result<FlowRows<MonthlyCategoryAmount>, Error>,
    ) -> Result<Statement, Error> {
        let (inflows, outflows) = flat_rows().inspect_err(|error| {
            tracing::error!("could not get the rows for the {}: {error}", kind.title())
        })?;
        let mut rows = StatementRows {
            inflows,
            outflows,
            monthly: None,
        };

        match monthly_rows() {
            Ok((inflows, outflows)) => {
                rows.monthly = Some(MonthlyRows { inflows, outflows });
                log_monthly_only_categories(kind, &rows);

                match build_statement(kind, period, &rows, default_currency) {
                    Ok(statement) => return Ok(statement),
                    Err(error) => tracing::warn!(
                        "could not build the monthly {}, falling back to the flat view: {error}",
                        kind.title()
                    ),
                }

                rows.monthly = None;
            }
            Err(error) => tracing::warn!(
                "could not get the monthly rows for the {}, falling back to the flat view: {error}",
                kind.title()
            ),
        }

        build_statement(kind, period, &rows, default_currency).inspect_err(|error| {
            tracing::error!("could not build the {}: {error}", kind.title())
        })
    }
}

/// Log categories that only appear in the monthly rows.
///
/// The flat and monthly rows are read by separate queries, so a transaction
/// added in between can show up in only one of them.
fn log_monthly_only_categories(kind: StatementKind, rows: &StatementRows) {
    let Some(monthly) = &rows.monthly else {
        return;
    };

    let sides = [
        (&rows.inflows, &monthly.inflows, kind.inflow_title()),
        (&rows.outflows, &monthly.outflows, kind.outflow_title()),
    ];

    for (flat, monthly, title) in sides {
        let flat_categories: BTreeSet<&str> =
            flat.iter().map(|row| row.category.as_str()).collect();
        let monthly_only: BTreeSet<&str> = monthly
            .iter()
            .map(|row| row.category.as_str())
            .filter(|category| !flat_categories.contains(category))
            .collect();

        if !monthly_only.is_empty() {
            tracing::debug!(
                "{title} categories {monthly_only:?} only appear in the monthly rows, \
                adding them to the totals"
            );
        }
    }
}
