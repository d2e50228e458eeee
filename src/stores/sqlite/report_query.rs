//! Implements the report queries against a SQLite database.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, named_params};

use crate::{
    Error,
    date_range::{DateRange, YearMonth},
    db::TransactionKind,
    money::{Currency, Money},
    statement::{CategoryAmount, MonthlyCategoryAmount},
    stores::{AccountId, AccountSelection, FlowRows, ReportQuery, sqlite::lock_connection},
};

/// Which transactions count towards a set of category totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CategoryFilter {
    /// Income categories, plus transactions without a category as "Uncategorized".
    IncomeOrUncategorized,
    /// Expense categories only, transactions without a category are left out.
    Expense,
    /// Any category, transactions without a category as "Uncategorized".
    Any,
}

/// Builds the SQL for summing and counting transactions per category.
///
/// Rows are grouped per account too, so a category may appear once for each
/// account with matching transactions.
fn category_totals_sql(kind: TransactionKind, filter: CategoryFilter, by_month: bool) -> String {
    let (join, category_condition) = match filter {
        CategoryFilter::IncomeOrUncategorized => (
            "LEFT JOIN category c ON c.id = t.category_id",
            "AND (c.id IS NULL OR c.kind = 'income')",
        ),
        CategoryFilter::Expense => (
            "INNER JOIN category c ON c.id = t.category_id",
            "AND c.kind = 'expense'",
        ),
        CategoryFilter::Any => ("LEFT JOIN category c ON c.id = t.category_id", ""),
    };

    let (month_column, month_group) = if by_month {
        ("strftime('%Y-%m', t.date) AS month,", "month,")
    } else {
        ("", "")
    };

    format!(
        "SELECT
            {month_column}
            COALESCE(c.name, 'Uncategorized') AS category_name,
            SUM(t.amount) AS total_amount,
            COUNT(t.id) AS transaction_count,
            a.currency
        FROM \"transaction\" t
        INNER JOIN money_account a ON a.id = t.account_id
        {join}
        WHERE t.kind = '{kind}'
            AND t.date BETWEEN :start AND :end
            AND (:account_id IS NULL OR t.account_id = :account_id)
            {category_condition}
        GROUP BY {month_group} category_name, t.account_id, a.currency
        ORDER BY category_name {order_month}",
        kind = kind.as_str(),
        order_month = if by_month { ", month" } else { "" },
    )
}

/// Reads category totals from a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteReportQuery {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteReportQuery {
    /// Create a new report query with a SQLite database.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn category_totals(
        &self,
        kind: TransactionKind,
        filter: CategoryFilter,
        range: &DateRange,
        account_id: Option<AccountId>,
    ) -> Result<Vec<CategoryAmount>, Error> {
        let connection = lock_connection(&self.connection)?;

        let rows = connection
            .prepare(&category_totals_sql(kind, filter, false))?
            .query_map(
                named_params! {
                    ":start": range.start(),
                    ":end": range.end(),
                    ":account_id": account_id,
                },
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(category, amount, count, currency)| -> Result<CategoryAmount, Error> {
                Ok(
                    CategoryAmount::new(&category, Money::new(amount, Currency::new(&currency)?))
                        .with_count(count),
                )
            })
            .collect()
    }

    fn monthly_category_totals(
        &self,
        kind: TransactionKind,
        filter: CategoryFilter,
        range: &DateRange,
        account_id: Option<AccountId>,
    ) -> Result<Vec<MonthlyCategoryAmount>, Error> {
        let connection = lock_connection(&self.connection)?;

        let rows = connection
            .prepare(&category_totals_sql(kind, filter, true))?
            .query_map(
                named_params! {
                    ":start": range.start(),
                    ":end": range.end(),
                    ":account_id": account_id,
                },
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(month, category, amount, count, currency)| -> Result<MonthlyCategoryAmount, Error> {
                let month: YearMonth = month
                    .parse()
                    .inspect_err(|error| tracing::error!("invalid transaction month: {error}"))?;

                Ok(MonthlyCategoryAmount::new(
                    month,
                    &category,
                    Money::new(amount, Currency::new(&currency)?),
                )
                .with_count(count))
            })
            .collect()
    }
}

impl ReportQuery for SQLiteReportQuery {
    fn income_by_category(&self, range: &DateRange) -> Result<Vec<CategoryAmount>, Error> {
        self.category_totals(
            TransactionKind::Deposit,
            CategoryFilter::IncomeOrUncategorized,
            range,
            None,
        )
    }

    fn expenses_by_category(&self, range: &DateRange) -> Result<Vec<CategoryAmount>, Error> {
        self.category_totals(
            TransactionKind::Withdrawal,
            CategoryFilter::Expense,
            range,
            None,
        )
    }

    fn monthly_income_by_category(
        &self,
        range: &DateRange,
    ) -> Result<Vec<MonthlyCategoryAmount>, Error> {
        self.monthly_category_totals(
            TransactionKind::Deposit,
            CategoryFilter::IncomeOrUncategorized,
            range,
            None,
        )
    }

    fn monthly_expenses_by_category(
        &self,
        range: &DateRange,
    ) -> Result<Vec<MonthlyCategoryAmount>, Error> {
        self.monthly_category_totals(
            TransactionKind::Withdrawal,
            CategoryFilter::Expense,
            range,
            None,
        )
    }

    fn cashflow_by_category(
        &self,
        range: &DateRange,
        account: AccountSelection,
    ) -> Result<FlowRows<CategoryAmount>, Error> {
        let account_id = account.account_id();

        let inflows = self.category_totals(
            TransactionKind::Deposit,
            CategoryFilter::Any,
            range,
            account_id,
        )?;
        let outflows = self.category_totals(
            TransactionKind::Withdrawal,
            CategoryFilter::Any,
            range,
            account_id,
        )?;

        Ok((inflows, outflows))
    }

    fn monthly_cashflow_by_category(
        &self,
        range: &DateRange,
        account: AccountSelection,
    ) -> Result<FlowRows<MonthlyCategoryAmount>, Error> {
        let account_id = account.account_id();

        let inflows = self.monthly_category_totals(
            TransactionKind::Deposit,
            CategoryFilter::Any,
            range,
            account_id,
        )?;
        let outflows = self.monthly_category_totals(
            TransactionKind::Withdrawal,
            CategoryFilter::Any,
            range,
            account_id,
        )?;

        Ok((inflows, outflows))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{Date, macros::date};

    use crate::{
        date_range::DateRange,
        db::{
            CategoryId, CategoryKind, NewTransaction, TransactionKind, initialize,
            insert_category, insert_money_account, insert_transaction,
        },
        money::{Currency, Money},
        statement::{CategoryAmount, MonthlyCategoryAmount},
        stores::{AccountId, AccountSelection, ReportQuery, sqlite::SQLiteReportQuery},
    };

    struct Fixture {
        query: SQLiteReportQuery,
        connection: Arc<Mutex<Connection>>,
        everyday: AccountId,
        savings: AccountId,
        salary: CategoryId,
        rent: CategoryId,
    }

    impl Fixture {
        fn new() -> Self {
            let connection = Connection::open_in_memory().unwrap();
            initialize(&connection).unwrap();

            let nzd = |amount| Money::new(amount, Currency::new("NZD").unwrap());
            let everyday = insert_money_account(&connection, "Everyday", &nzd(0)).unwrap();
            let savings = insert_money_account(&connection, "Savings", &nzd(0)).unwrap();
            let salary = insert_category(&connection, "Salary", CategoryKind::Income).unwrap();
            let rent = insert_category(&connection, "Rent", CategoryKind::Expense).unwrap();

            let connection = Arc::new(Mutex::new(connection));

            Self {
                query: SQLiteReportQuery::new(connection.clone()),
                connection,
                everyday,
                savings,
                salary,
                rent,
            }
        }

        fn deposit(
            &self,
            account_id: AccountId,
            category_id: Option<CategoryId>,
            amount: i64,
            date: Date,
        ) {
            self.insert(account_id, category_id, TransactionKind::Deposit, amount, date);
        }

        fn withdraw(
            &self,
            account_id: AccountId,
            category_id: Option<CategoryId>,
            amount: i64,
            date: Date,
        ) {
            self.insert(account_id, category_id, TransactionKind::Withdrawal, amount, date);
        }

        fn insert(
            &self,
            account_id: AccountId,
            category_id: Option<CategoryId>,
            kind: TransactionKind,
            amount: i64,
            date: Date,
        ) {
            let connection = self.connection.lock().unwrap();
            insert_transaction(
                &connection,
                &NewTransaction {
                    account_id,
                    category_id,
                    kind,
                    amount,
                    date,
                },
            )
            .unwrap();
        }
    }

    fn nzd(amount: i64) -> Money {
        Money::new(amount, Currency::new("NZD").unwrap())
    }

    fn year_2024() -> DateRange {
        DateRange::calendar_year(2024)
    }

    #[test]
    fn income_groups_by_category_and_account() {
        let fixture = Fixture::new();
        let salary = Some(fixture.salary);
        fixture.deposit(fixture.everyday, salary, 1_000, date!(2024 - 01 - 15));
        fixture.deposit(fixture.everyday, salary, 2_000, date!(2024 - 02 - 15));
        fixture.deposit(fixture.savings, salary, 500, date!(2024 - 03 - 15));
        fixture.deposit(fixture.everyday, None, 40, date!(2024 - 03 - 20));
        // Outside the range.
        fixture.deposit(fixture.everyday, salary, 9_999, date!(2025 - 01 - 01));

        let mut rows = fixture.query.income_by_category(&year_2024()).unwrap();
        rows.sort_by_key(|row| (row.category.clone(), row.amount.amount()));

        assert_eq!(
            rows,
            vec![
                CategoryAmount::new("Salary", nzd(500)),
                CategoryAmount::new("Salary", nzd(3_000)).with_count(2),
                CategoryAmount::new("Uncategorized", nzd(40)),
            ]
        );
    }

    #[test]
    fn expenses_exclude_uncategorized_withdrawals() {
        let fixture = Fixture::new();
        fixture.withdraw(fixture.everyday, Some(fixture.rent), 800, date!(2024 - 05 - 01));
        fixture.withdraw(fixture.everyday, None, 15, date!(2024 - 05 - 02));

        let rows = fixture.query.expenses_by_category(&year_2024()).unwrap();

        assert_eq!(rows, vec![CategoryAmount::new("Rent", nzd(800))]);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let fixture = Fixture::new();
        let rent = Some(fixture.rent);
        fixture.withdraw(fixture.everyday, rent, 1, date!(2024 - 01 - 01));
        fixture.withdraw(fixture.everyday, rent, 2, date!(2024 - 12 - 31));
        fixture.withdraw(fixture.everyday, rent, 4, date!(2023 - 12 - 31));

        let rows = fixture.query.expenses_by_category(&year_2024()).unwrap();

        assert_eq!(rows, vec![CategoryAmount::new("Rent", nzd(3)).with_count(2)]);
    }

    #[test]
    fn monthly_income_is_bucketed_by_month() {
        let fixture = Fixture::new();
        let salary = Some(fixture.salary);
        fixture.deposit(fixture.everyday, salary, 1_000, date!(2024 - 01 - 15));
        fixture.deposit(fixture.everyday, salary, 1_000, date!(2024 - 01 - 31));
        fixture.deposit(fixture.everyday, salary, 2_000, date!(2024 - 02 - 15));

        let rows = fixture.query.monthly_income_by_category(&year_2024()).unwrap();

        assert_eq!(
            rows,
            vec![
                MonthlyCategoryAmount::new("2024-01".parse().unwrap(), "Salary", nzd(2_000))
                    .with_count(2),
                MonthlyCategoryAmount::new("2024-02".parse().unwrap(), "Salary", nzd(2_000)),
            ]
        );
    }

    #[test]
    fn monthly_expenses_are_bucketed_by_month() {
        let fixture = Fixture::new();
        let rent = Some(fixture.rent);
        fixture.withdraw(fixture.everyday, rent, 700, date!(2024 - 06 - 01));
        fixture.withdraw(fixture.everyday, rent, 700, date!(2024 - 07 - 01));

        let rows = fixture.query.monthly_expenses_by_category(&year_2024()).unwrap();

        assert_eq!(
            rows,
            vec![
                MonthlyCategoryAmount::new("2024-06".parse().unwrap(), "Rent", nzd(700)),
                MonthlyCategoryAmount::new("2024-07".parse().unwrap(), "Rent", nzd(700)),
            ]
        );
    }

    #[test]
    fn cashflow_filters_by_account() {
        let fixture = Fixture::new();
        fixture.deposit(fixture.everyday, Some(fixture.salary), 3_000, date!(2024 - 01 - 15));
        fixture.withdraw(fixture.everyday, None, 25, date!(2024 - 01 - 16));
        fixture.withdraw(fixture.savings, Some(fixture.rent), 900, date!(2024 - 01 - 17));

        let (inflows, outflows) = fixture
            .query
            .cashflow_by_category(&year_2024(), AccountSelection::One(fixture.everyday))
            .unwrap();

        assert_eq!(inflows, vec![CategoryAmount::new("Salary", nzd(3_000))]);
        assert_eq!(outflows, vec![CategoryAmount::new("Uncategorized", nzd(25))]);

        let (inflows, outflows) = fixture
            .query
            .cashflow_by_category(&year_2024(), AccountSelection::All)
            .unwrap();

        assert_eq!(inflows.len(), 1);
        assert_eq!(
            outflows,
            vec![
                CategoryAmount::new("Rent", nzd(900)),
                CategoryAmount::new("Uncategorized", nzd(25)),
            ]
        );
    }

    #[test]
    fn monthly_cashflow_filters_by_account() {
        let fixture = Fixture::new();
        fixture.deposit(fixture.everyday, Some(fixture.salary), 3_000, date!(2024 - 01 - 15));
        fixture.deposit(fixture.savings, Some(fixture.salary), 100, date!(2024 - 02 - 15));
        fixture.withdraw(fixture.savings, Some(fixture.rent), 900, date!(2024 - 03 - 17));

        let (inflows, outflows) = fixture
            .query
            .monthly_cashflow_by_category(&year_2024(), AccountSelection::One(fixture.savings))
            .unwrap();

        assert_eq!(
            inflows,
            vec![MonthlyCategoryAmount::new("2024-02".parse().unwrap(), "Salary", nzd(100))]
        );
        assert_eq!(
            outflows,
            vec![MonthlyCategoryAmount::new("2024-03".parse().unwrap(), "Rent", nzd(900))]
        );
    }

    #[test]
    fn empty_database_returns_no_rows() {
        let fixture = Fixture::new();

        assert_eq!(fixture.query.income_by_category(&year_2024()), Ok(vec![]));
        assert_eq!(
            fixture.query.cashflow_by_category(&year_2024(), AccountSelection::All),
            Ok((vec![], vec![]))
        );
    }

    #[test]
    fn cashflow_counts_transactions_per_category() {
        let fixture = Fixture::new();
        let rent = Some(fixture.rent);
        fixture.withdraw(fixture.everyday, rent, 900, date!(2024 - 01 - 01));
        fixture.withdraw(fixture.everyday, rent, 900, date!(2024 - 02 - 01));
        fixture.withdraw(fixture.everyday, rent, 900, date!(2024 - 02 - 15));
        fixture.withdraw(fixture.everyday, None, 10, date!(2024 - 02 - 20));

        let (_, outflows) = fixture
            .query
            .cashflow_by_category(&year_2024(), AccountSelection::One(fixture.everyday))
            .unwrap();

        let counts: Vec<(&str, i64)> = outflows
            .iter()
            .map(|row| (row.category.as_str(), row.count))
            .collect();
        assert_eq!(counts, vec![("Rent", 3), ("Uncategorized", 1)]);

        let (_, monthly_outflows) = fixture
            .query
            .monthly_cashflow_by_category(&year_2024(), AccountSelection::One(fixture.everyday))
            .unwrap();

        let monthly_counts: Vec<(String, &str, i64)> = monthly_outflows
            .iter()
            .map(|row| (row.month.key(), row.category.as_str(), row.count))
            .collect();
        assert_eq!(
            monthly_counts,
            vec![
                ("2024-01".to_owned(), "Rent", 1),
                ("2024-02".to_owned(), "Rent", 2),
                ("2024-02".to_owned(), "Uncategorized", 1),
            ]
        );
    }
}
