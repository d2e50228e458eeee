//! The database schema and functions for adding records to it.
//!
//! The reports only ever read from the database, the insert functions exist
//! for seeding test databases.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use time::Date;

use crate::{Error, money::Money, stores::AccountId};

pub type CategoryId = i64;

pub type TransactionId = i64;

/// Whether a category groups income or expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
        }
    }
}

/// The direction money moves for a transaction, relative to its account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Money into the account.
    Deposit,
    /// Money out of the account.
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }
}

/// A transaction to insert with [insert_transaction].
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub account_id: AccountId,
    pub category_id: Option<CategoryId>,
    pub kind: TransactionKind,
    /// The amount in minor units of the account's currency, never negative.
    pub amount: i64,
    pub date: Date,
}

/// Create the tables for the application if they do not exist.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_money_account_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

pub fn create_money_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS money_account (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            currency TEXT NOT NULL,
            balance INTEGER NOT NULL
        )",
        (),
    )?;

    Ok(())
}

pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense'))
        )",
        (),
    )?;

    Ok(())
}

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            account_id INTEGER NOT NULL,
            category_id INTEGER,
            kind TEXT NOT NULL CHECK (kind IN ('deposit', 'withdrawal')),
            amount INTEGER NOT NULL CHECK (amount >= 0),
            date TEXT NOT NULL,
            FOREIGN KEY(account_id) REFERENCES money_account(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
        )",
        (),
    )?;

    // Reports always filter by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date)",
        (),
    )?;

    Ok(())
}

/// Add a money account with its current `balance`.
///
/// # Errors
/// Returns an error if an account with `name` already exists or there is some
/// other SQL error.
pub fn insert_money_account(
    connection: &Connection,
    name: &str,
    balance: &Money,
) -> Result<AccountId, Error> {
    connection.execute(
        "INSERT INTO money_account (name, currency, balance) VALUES (?1, ?2, ?3)",
        (name, balance.currency().code(), balance.amount()),
    )?;

    Ok(connection.last_insert_rowid())
}

pub fn insert_category(
    connection: &Connection,
    name: &str,
    kind: CategoryKind,
) -> Result<CategoryId, Error> {
    connection.execute(
        "INSERT INTO category (name, kind) VALUES (?1, ?2)",
        (name, kind.as_str()),
    )?;

    Ok(connection.last_insert_rowid())
}

pub fn insert_transaction(
    connection: &Connection,
    transaction: &NewTransaction,
) -> Result<TransactionId, Error> {
    connection.execute(
        "INSERT INTO \"transaction\" (account_id, category_id, kind, amount, date)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            transaction.account_id,
            transaction.category_id,
            transaction.kind.as_str(),
            transaction.amount,
            transaction.date,
        ),
    )?;

    Ok(connection.last_insert_rowid())
}
