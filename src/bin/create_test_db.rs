use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration, Month};

use finance_reports::{
    CategoryKind, NewTransaction, TransactionKind, initialize_db, insert_category,
    insert_money_account, insert_transaction,
    money::{Currency, Money},
};

/// A utility for creating a test database for the finance reports server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The currency of the seeded accounts.
    #[arg(long, default_value = "USD")]
    currency: String,

    /// The year to create a year of transactions for.
    #[arg(long, default_value_t = 2024)]
    year: i32,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    let currency = Currency::new(&args.currency)?;

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating accounts and categories...");

    let everyday = insert_money_account(&conn, "Everyday", &Money::new(2_450_00, currency.clone()))?;
    let savings = insert_money_account(&conn, "Savings", &Money::new(12_000_00, currency))?;

    let salary = insert_category(&conn, "Salary", CategoryKind::Income)?;
    let interest = insert_category(&conn, "Interest", CategoryKind::Income)?;
    let rent = insert_category(&conn, "Rent", CategoryKind::Expense)?;
    let groceries = insert_category(&conn, "Groceries", CategoryKind::Expense)?;
    let utilities = insert_category(&conn, "Utilities", CategoryKind::Expense)?;

    println!("Creating transactions for {}...", args.year);

    let mut count = 0;

    for month in 1..=12u8 {
        let month = Month::try_from(month)?;
        let first = Date::from_calendar_date(args.year, month, 1)?;

        let mut seed = |account_id, category_id, kind, amount, date| {
            insert_transaction(
                &conn,
                &NewTransaction {
                    account_id,
                    category_id,
                    kind,
                    amount,
                    date,
                },
            )
            .map(|_| count += 1)
        };

        seed(everyday, Some(salary), TransactionKind::Deposit, 5_200_00, first)?;
        seed(everyday, Some(rent), TransactionKind::Withdrawal, 1_800_00, first)?;
        seed(
            everyday,
            Some(utilities),
            TransactionKind::Withdrawal,
            150_00 + i64::from(u8::from(month)) * 5_00,
            first + Duration::days(14),
        )?;

        for week in 0..4 {
            seed(
                everyday,
                Some(groceries),
                TransactionKind::Withdrawal,
                180_00 + week * 12_34,
                first + Duration::weeks(week),
            )?;
        }

        seed(
            savings,
            Some(interest),
            TransactionKind::Deposit,
            42_00,
            first + Duration::days(27),
        )?;

        // A transfer between the two accounts, which is left uncategorized.
        seed(
            everyday,
            None,
            TransactionKind::Withdrawal,
            1_000_00,
            first + Duration::days(20),
        )?;
        seed(
            savings,
            None,
            TransactionKind::Deposit,
            1_000_00,
            first + Duration::days(20),
        )?;
    }

    println!("Created {count} transactions.");
    println!("Success!");

    Ok(())
}
