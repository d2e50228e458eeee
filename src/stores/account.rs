//! Defines the money account store trait.

use std::fmt::Display;

use crate::{Error, money::Money};

pub type AccountId = i64;

/// A bank account, credit card or cash box that money moves in and out of.
#[derive(Debug, Clone, PartialEq)]
pub struct MoneyAccount {
    pub id: AccountId,
    pub name: String,
    /// The current balance.
    pub balance: Money,
}

/// Which accounts a cashflow statement covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountSelection {
    /// Every account combined.
    #[default]
    All,
    One(AccountId),
}

impl AccountSelection {
    /// The ID of the selected account, `None` if all accounts are selected.
    pub fn account_id(&self) -> Option<AccountId> {
        match self {
            AccountSelection::All => None,
            AccountSelection::One(id) => Some(*id),
        }
    }
}

impl Display for AccountSelection {
    /// Formats as the value used in query strings and forms: "all" or the account ID.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountSelection::All => write!(f, "all"),
            AccountSelection::One(id) => write!(f, "{id}"),
        }
    }
}

/// Retrieves money accounts and their balances.
pub trait MoneyAccountStore {
    /// Get every account, ordered by name.
    fn get_all(&self) -> Result<Vec<MoneyAccount>, Error>;

    /// Get the account with `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no such account.
    fn get(&self, id: AccountId) -> Result<MoneyAccount, Error>;

    /// The current balance of the selected accounts.
    ///
    /// Returns `None` if the selection covers no accounts.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if a single account is selected and it does not exist,
    /// or [Error::CurrencyMismatch] if the selected accounts hold different currencies.
    fn balance(&self, selection: AccountSelection) -> Result<Option<Money>, Error>;
}
