//! Finance Reports is a web app for viewing income statements and cashflow
//! statements built from the transactions in a SQLite database.
//!
//! This library provides a REST API that directly serves HTML pages, plus a
//! JSON data endpoint for each report.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod cashflow;
mod db;
mod endpoints;
mod error;
mod events;
mod html;
mod income_statement;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod report_form;
mod report_service;
mod report_view;
mod routing;
mod timezone;

#[allow(missing_docs)]
pub mod date_range;
#[allow(missing_docs)]
pub mod money;
#[allow(missing_docs)]
pub mod statement;
#[allow(missing_docs)]
pub mod stores;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::{
    CategoryKind, NewTransaction, TransactionKind, initialize as initialize_db, insert_category,
    insert_money_account, insert_transaction,
};
pub use error::Error;
pub use events::{DEFAULT_EVENT_CAPACITY, ReportEvent, ReportEvents, spawn_event_logger};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use report_service::FinancialReportService;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
