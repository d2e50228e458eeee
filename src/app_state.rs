//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    Error,
    db::initialize,
    events::ReportEvents,
    money::Currency,
    report_service::FinancialReportService,
    stores::sqlite::{SQLiteMoneyAccountStore, SQLiteReportQuery},
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The currency of statements that have no transactions.
    pub default_currency: Currency,

    /// Where "statement generated" events are published.
    pub events: ReportEvents,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        default_currency: Currency,
        events: ReportEvents,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            default_currency,
            events,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

/// The report service backed by the SQLite stores.
pub type ReportService = FinancialReportService<SQLiteReportQuery, SQLiteMoneyAccountStore>;

/// The state needed by the report pages and endpoints.
#[derive(Debug, Clone)]
pub struct ReportState {
    pub service: ReportService,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            service: FinancialReportService::new(
                SQLiteReportQuery::new(state.db_connection.clone()),
                SQLiteMoneyAccountStore::new(state.db_connection.clone()),
                state.events.clone(),
                state.default_currency.clone(),
            ),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
