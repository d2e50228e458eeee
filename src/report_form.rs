//! Query and form parameters for generating reports, and their validation.
//!
//! Validation happens before any report is built so that a bad request never
//! reaches the statement aggregator.

use std::{collections::BTreeMap, fmt::Display};

use serde::Deserialize;

use crate::{
    date_range::{DateRange, parse_date},
    stores::{AccountId, AccountSelection},
};

/// The value of `account_id` that selects every account.
pub const ALL_ACCOUNTS_VALUE: &str = "all";

/// The longest period a report can cover, in calendar months.
pub const MAX_REPORT_MONTHS: i64 = 10 * 12;

const INVALID_DATE_MESSAGE: &str = "Enter a date in the format YYYY-MM-DD";

/// The raw parameters of a report request.
///
/// Every field is optional so that a missing field can be reported alongside
/// the other validation errors instead of rejecting the request outright.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReportForm {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub account_id: Option<String>,
}

/// Whether a request must name an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    /// A missing account selects every account.
    Optional,
    /// The request must include `account_id`, which may be "all".
    Required,
}

/// A validated report request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportRequest {
    pub period: DateRange,
    pub account: AccountSelection,
}

/// Validation messages keyed by the name of the field they apply to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    /// Record `message` for `field`, replacing any earlier message.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The fields and messages in field name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();

        write!(f, "{}", messages.join("; "))
    }
}

impl ReportForm {
    /// Validate the form, falling back to `default_period` for missing dates.
    ///
    /// # Errors
    /// Returns every problem found: dates that are not in the `YYYY-MM-DD`
    /// format, a start date after the end date, a period spanning more than
    /// [MAX_REPORT_MONTHS] months, and an account ID that is missing (when
    /// `account_field` is [AccountField::Required]) or not a number.
    pub fn validate(
        &self,
        default_period: DateRange,
        account_field: AccountField,
    ) -> Result<ReportRequest, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let start = parse_optional_date(
            self.start_date.as_deref(),
            default_period.start(),
            "start_date",
            &mut errors,
        );
        let end = parse_optional_date(
            self.end_date.as_deref(),
            default_period.end(),
            "end_date",
            &mut errors,
        );

        let period = match (start, end) {
            (Some(start), Some(end)) => match DateRange::new(start, end) {
                Ok(period) if period.month_count() > MAX_REPORT_MONTHS => {
                    errors.add(
                        "end_date",
                        format!(
                            "The period can cover at most {} years",
                            MAX_REPORT_MONTHS / 12
                        ),
                    );
                    None
                }
                Ok(period) => Some(period),
                Err(_) => {
                    errors.add("end_date", "The end date must be on or after the start date");
                    None
                }
            },
            _ => None,
        };

        let account = parse_account(self.account_id.as_deref(), account_field, &mut errors);

        match (period, account) {
            (Some(period), Some(account)) if errors.is_empty() => {
                Ok(ReportRequest { period, account })
            }
            _ => Err(errors),
        }
    }
}

fn parse_optional_date(
    text: Option<&str>,
    default: time::Date,
    field: &'static str,
    errors: &mut ValidationErrors,
) -> Option<time::Date> {
    match text.map(str::trim) {
        None | Some("") => Some(default),
        Some(text) => match parse_date(text) {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add(field, INVALID_DATE_MESSAGE);
                None
            }
        },
    }
}

fn parse_account(
    text: Option<&str>,
    account_field: AccountField,
    errors: &mut ValidationErrors,
) -> Option<AccountSelection> {
    match (text.map(str::trim), account_field) {
        (None | Some(""), AccountField::Optional) => Some(AccountSelection::All),
        (None | Some(""), AccountField::Required) => {
            errors.add("account_id", "Choose an account or \"all\"");
            None
        }
        (Some(text), _) if text.eq_ignore_ascii_case(ALL_ACCOUNTS_VALUE) => {
            Some(AccountSelection::All)
        }
        (Some(text), _) => match text.parse::<AccountId>() {
            Ok(id) => Some(AccountSelection::One(id)),
            Err(_) => {
                errors.add("account_id", format!("\"{text}\" is not a valid account"));
                None
            }
        },
    }
}
