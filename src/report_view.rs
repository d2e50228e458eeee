//! Markup and responses shared by the income statement and cashflow pages.

use axum::{
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    alert::Alert,
    date_range::{DateRange, format_date},
    html::{
        FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
    },
    report_form::{ReportForm, ValidationErrors},
    statement::{
        MonthlyTableView, ReportChart, SectionView, StatementKind, StatementView, charts_script,
        charts_view,
    },
};

const AMOUNT_CELL_STYLE: &str = "px-6 py-4 text-right whitespace-nowrap";
const POSITIVE_STYLE: &str = "text-green-600 dark:text-green-400";
const NEGATIVE_STYLE: &str = "text-red-600 dark:text-red-400";

/// The ID of the element the generated report is swapped into.
pub const REPORT_CONTAINER_ID: &str = "report";

/// The dates to show in the report form.
///
/// Dates the user typed are shown as typed so they can be corrected, missing
/// dates are filled in from `default_period`.
pub fn form_dates(form: &ReportForm, default_period: DateRange) -> (String, String) {
    let or_default = |text: &Option<String>, default: Date| match text.as_deref().map(str::trim) {
        None | Some("") => format_date(default),
        Some(text) => text.to_owned(),
    };

    (
        or_default(&form.start_date, default_period.start()),
        or_default(&form.end_date, default_period.end()),
    )
}

/// The start and end date inputs of a report form with any validation errors.
pub fn date_fields(start_date: &str, end_date: &str, errors: &ValidationErrors) -> Markup {
    html! {
        div class="grid grid-cols-1 sm:grid-cols-2 gap-4"
        {
            (date_input("start_date", "Start date", start_date, errors.get("start_date")))
            (date_input("end_date", "End date", end_date, errors.get("end_date")))
        }
    }
}

fn date_input(name: &str, label: &str, value: &str, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (label) }

            input
                name=(name)
                id=(name)
                type="date"
                value=(value)
                required
                class=(FORM_TEXT_INPUT_STYLE);

            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }
    }
}

/// The tables, totals and chart shared by both kinds of statement.
///
/// `summary` is shown above the tables.
pub fn statement_body(view: &StatementView, summary: Markup, chart: Option<ReportChart>) -> Markup {
    let charts: Vec<ReportChart> = chart.into_iter().collect();
    let show_counts = view.kind == StatementKind::Cashflow;

    html! {
        div class="w-full space-y-6"
        {
            p class="text-sm text-gray-600 dark:text-gray-400"
            {
                (view.start_date) " to " (view.end_date) " (" (view.currency) ")"
            }

            (summary)

            div class="grid grid-cols-1 lg:grid-cols-2 gap-6"
            {
                (section_table(&view.inflows, show_counts))
                (section_table(&view.outflows, show_counts))
            }

            @if !charts.is_empty() {
                (charts_view(&charts))
                script { (charts_script(&charts)) }
            }

            @if let Some(monthly) = &view.monthly {
                (monthly_table(view.inflows.title, &monthly.inflows))
                (monthly_table(view.outflows.title, &monthly.outflows))
            }
        }
    }
}

/// A labelled total, coloured green when positive and red when negative.
pub fn summary_figure(label: &str, amount: &str, is_positive: Option<bool>) -> Markup {
    let style = match is_positive {
        Some(true) => POSITIVE_STYLE,
        Some(false) => NEGATIVE_STYLE,
        None => "",
    };

    html! {
        div class="p-4 rounded-lg shadow bg-white dark:bg-gray-800"
        {
            dt class="text-sm text-gray-600 dark:text-gray-400" { (label) }
            dd class={"text-2xl font-bold " (style)} { (amount) }
        }
    }
}

/// A section's line items, with a transaction count column if `show_counts`.
fn section_table(section: &SectionView, show_counts: bool) -> Markup {
    let columns = if show_counts { 4 } else { 3 };

    html! {
        section
        {
            h3 class="text-xl font-semibold mb-4" { (section.title) }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class=(AMOUNT_CELL_STYLE) { "Amount" }
                            th scope="col" class=(AMOUNT_CELL_STYLE) { "Share" }
                            @if show_counts {
                                th scope="col" class=(AMOUNT_CELL_STYLE) { "Transactions" }
                            }
                        }
                    }

                    tbody
                    {
                        @for item in &section.line_items {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                th
                                    scope="row"
                                    class={(TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white"}
                                {
                                    (item.category)
                                }
                                td class=(AMOUNT_CELL_STYLE) { (item.amount) }
                                td class=(AMOUNT_CELL_STYLE) { (item.percentage) }
                                @if show_counts {
                                    td class=(AMOUNT_CELL_STYLE) { (item.count) }
                                }
                            }
                        }

                        @if section.line_items.is_empty() {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td colspan=(columns) class=(TABLE_CELL_STYLE) { "Nothing to show for this period." }
                            }
                        }
                    }

                    tfoot
                    {
                        tr class="font-semibold text-gray-900 dark:text-white"
                        {
                            th scope="row" class=(TABLE_CELL_STYLE) { "Total " (section.title) }
                            td class=(AMOUNT_CELL_STYLE) { (section.subtotal) }
                            td class=(AMOUNT_CELL_STYLE) {}
                            @if show_counts {
                                td class=(AMOUNT_CELL_STYLE) {}
                            }
                        }
                    }
                }
            }
        }
    }
}

fn monthly_table(title: &str, table: &MonthlyTableView) -> Markup {
    html! {
        section
        {
            h3 class="text-xl font-semibold mb-4" { (title) " by Month" }

            div class="overflow-x-auto rounded-lg shadow"
            {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Month" }
                            @for category in &table.categories {
                                th scope="col" class=(AMOUNT_CELL_STYLE) { (category) }
                            }
                            th scope="col" class=(AMOUNT_CELL_STYLE) { "Total" }
                        }
                    }

                    tbody
                    {
                        @for row in &table.rows {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                th
                                    scope="row"
                                    class={(TABLE_CELL_STYLE) " whitespace-nowrap font-medium text-gray-900 dark:text-white"}
                                {
                                    (row.label)
                                }
                                @for category in &table.categories {
                                    td class=(AMOUNT_CELL_STYLE)
                                    {
                                        (row.amounts.get(category).map(String::as_str).unwrap_or_default())
                                    }
                                }
                                td class={(AMOUNT_CELL_STYLE) " font-semibold"} { (row.total) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// A 400 response with an alert listing every validation error.
///
/// Used for HTMX form posts, where the alert is swapped into the alert container.
pub fn validation_alert_response(errors: &ValidationErrors) -> Response {
    let details = errors
        .iter()
        .map(|(_, message)| message)
        .collect::<Vec<_>>()
        .join(". ");

    (
        StatusCode::BAD_REQUEST,
        Alert {
            message: "Check the report settings".to_owned(),
            details,
        }
        .into_html(),
    )
        .into_response()
}

/// A 400 response with the validation errors as plain text.
pub fn validation_text_response(errors: &ValidationErrors) -> Response {
    (StatusCode::BAD_REQUEST, errors.to_string()).into_response()
}

/// Serialize `value` as a JSON response.
///
/// # Errors
/// Returns [Error::JSONSerializationError] if `value` cannot be serialized.
pub fn json_response<T: Serialize>(value: &T) -> Result<Response, Error> {
    let body = serde_json::to_string(value).map_err(|error| {
        tracing::error!("could not serialize report as JSON: {error}");
        Error::JSONSerializationError(error.to_string())
    })?;

    Ok(([(CONTENT_TYPE, "application/json")], body).into_response())
}
