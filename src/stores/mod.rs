//! Contains the traits for the data sources the reports are built from and
//! their SQLite implementations.

mod account;
mod report_query;

pub mod sqlite;

pub use account::{AccountId, AccountSelection, MoneyAccount, MoneyAccountStore};
pub use report_query::{FlowRows, ReportQuery};
