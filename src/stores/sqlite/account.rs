//! Implements a SQLite backed money account store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    money::{Currency, Money},
    stores::{
        AccountId, AccountSelection, MoneyAccount, MoneyAccountStore, sqlite::lock_connection,
    },
};

/// Retrieves money accounts from a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteMoneyAccountStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteMoneyAccountStore {
    /// Create a new account store with a SQLite database.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

/// An account as stored, before the currency code is validated.
struct AccountRow {
    id: AccountId,
    name: String,
    currency: String,
    balance: i64,
}

impl AccountRow {
    fn map_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            currency: row.get(2)?,
            balance: row.get(3)?,
        })
    }

    fn into_account(self) -> Result<MoneyAccount, Error> {
        let currency = Currency::new(&self.currency).inspect_err(|error| {
            tracing::error!("account {} has an invalid currency: {error}", self.id)
        })?;

        Ok(MoneyAccount {
            id: self.id,
            name: self.name,
            balance: Money::new(self.balance, currency),
        })
    }
}

impl MoneyAccountStore for SQLiteMoneyAccountStore {
    /// Retrieve all accounts in the database.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn get_all(&self) -> Result<Vec<MoneyAccount>, Error> {
        let connection = lock_connection(&self.connection)?;

        connection
            .prepare("SELECT id, name, currency, balance FROM money_account ORDER BY name;")?
            .query_map([], AccountRow::map_row)?
            .map(|maybe_row| maybe_row.map_err(Error::from)?.into_account())
            .collect()
    }

    /// Retrieve the account with `id`.
    ///
    /// # Errors
    /// This function will return [Error::NotFound] if there is no such account
    /// or an error if there is an SQL error.
    fn get(&self, id: AccountId) -> Result<MoneyAccount, Error> {
        let connection = lock_connection(&self.connection)?;

        connection
            .prepare("SELECT id, name, currency, balance FROM money_account WHERE id = :id;")?
            .query_row(&[(":id", &id)], AccountRow::map_row)?
            .into_account()
    }

    fn balance(&self, selection: AccountSelection) -> Result<Option<Money>, Error> {
        match selection {
            AccountSelection::One(id) => self.get(id).map(|account| Some(account.balance)),
            AccountSelection::All => {
                let mut total: Option<Money> = None;

                for account in self.get_all()? {
                    total = Some(match total {
                        None => account.balance,
                        Some(total) => total.checked_add(&account.balance)?,
                    });
                }

                Ok(total)
            }
        }
    }
}
