//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use time::Date;

use crate::{
    alert::Alert, internal_server_error::InternalServerError, money::Currency,
    not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// Two amounts in different currencies were combined.
    ///
    /// A statement only ever holds amounts in a single currency, so this
    /// error means no statement can be produced for the inputs.
    #[error("cannot combine amounts in {expected} and {found}")]
    CurrencyMismatch {
        /// The currency of the amounts seen first.
        expected: Currency,
        /// The currency that did not match.
        found: Currency,
    },

    /// A total was too large to store in minor units.
    #[error("the total amount is too large to represent")]
    AmountOverflow,

    /// A date range was created with the start after the end.
    #[error("the start date {start} is after the end date {end}")]
    InvalidDateRange {
        /// The first day of the range.
        start: Date,
        /// The last day of the range.
        end: Date,
    },

    /// A date or month could not be parsed.
    #[error("\"{0}\" is not a valid date, expected the format YYYY-MM-DD")]
    InvalidDate(String),

    /// A currency code that is not three ASCII letters.
    #[error("\"{0}\" is not a valid currency code")]
    InvalidCurrency(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::InvalidDateRange { start, end } => (
                StatusCode::BAD_REQUEST,
                Alert {
                    message: "Invalid report period".to_owned(),
                    details: format!(
                        "The start date {start} is after the end date {end}. \
                        Change the dates so the period starts on or before the day it ends."
                    ),
                },
            ),
            Error::InvalidDate(text) => (
                StatusCode::BAD_REQUEST,
                Alert {
                    message: "Invalid date".to_owned(),
                    details: format!("\"{text}\" is not a date. Enter dates as YYYY-MM-DD."),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert {
                    message: "Account not found".to_owned(),
                    details: "The account could not be found. \
                    Try refreshing the page to see if the account has been deleted."
                        .to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
