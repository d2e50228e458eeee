//! SQLite implementations of the stores.

mod account;
mod report_query;

pub use account::SQLiteMoneyAccountStore;
pub use report_query::SQLiteReportQuery;

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::Error;

/// Acquire the lock on the shared database connection.
fn lock_connection(
    connection: &Arc<Mutex<Connection>>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
}
