//! The income statement page, its HTMX report endpoint and the JSON data endpoint.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, Query};
use axum_htmx::HxRequest;
use maud::{Markup, html};

use crate::{
    Error,
    app_state::ReportState,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, PAGE_CONTAINER_STYLE, base, loading_spinner, page_heading},
    navigation::NavBar,
    report_form::{AccountField, ReportForm, ValidationErrors},
    report_view::{
        REPORT_CONTAINER_ID, date_fields, form_dates, json_response, statement_body,
        summary_figure, validation_alert_response, validation_text_response,
    },
    statement::{
        ReportChart, Statement, StatementView, chart_head_elements, format_statement,
        monthly_chart,
    },
    timezone::current_year,
};

/// Display the income statement page.
///
/// The period comes from the `start_date` and `end_date` query parameters and
/// defaults to the current calendar year. Invalid parameters are shown next
/// to the form fields with a 400 status.
pub async fn get_income_statement_page(
    State(state): State<ReportState>,
    HxRequest(is_htmx): HxRequest,
    Query(form): Query<ReportForm>,
) -> Result<Response, Error> {
    let default_period = current_year(&state.local_timezone)?;
    let (start_date, end_date) = form_dates(&form, default_period);

    match form.validate(default_period, AccountField::Optional) {
        Ok(request) => {
            let statement = state.service.income_statement(request.period)?;
            let report = income_statement_report(&statement);

            if is_htmx {
                return Ok(report.into_response());
            }

            Ok(income_statement_view(
                &start_date,
                &end_date,
                &ValidationErrors::default(),
                Some(report),
            )
            .into_response())
        }
        Err(errors) => {
            tracing::debug!("invalid income statement request: {errors}");

            Ok((
                StatusCode::BAD_REQUEST,
                income_statement_view(&start_date, &end_date, &errors, None),
            )
                .into_response())
        }
    }
}

/// Generate the income statement from the report form.
///
/// Returns the report as an HTML fragment, or an alert if the form is
/// invalid or the statement could not be built.
pub async fn generate_income_statement(
    State(state): State<ReportState>,
    Form(form): Form<ReportForm>,
) -> Response {
    let default_period = match current_year(&state.local_timezone) {
        Ok(period) => period,
        Err(error) => return error.into_alert_response(),
    };

    let request = match form.validate(default_period, AccountField::Optional) {
        Ok(request) => request,
        Err(errors) => return validation_alert_response(&errors),
    };

    match state.service.income_statement(request.period) {
        Ok(statement) => income_statement_report(&statement).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Get the income statement as JSON.
pub async fn get_income_statement_data(
    State(state): State<ReportState>,
    Query(form): Query<ReportForm>,
) -> Result<Response, Error> {
    let default_period = current_year(&state.local_timezone)?;

    let request = match form.validate(default_period, AccountField::Optional) {
        Ok(request) => request,
        Err(errors) => return Ok(validation_text_response(&errors)),
    };

    let statement = state.service.income_statement(request.period)?;

    json_response(&format_statement(&statement))
}

fn income_statement_report(statement: &Statement) -> Markup {
    let view = format_statement(statement);
    let chart = monthly_chart(statement);

    income_statement_report_view(&view, chart)
}

fn income_statement_report_view(view: &StatementView, chart: Option<ReportChart>) -> Markup {
    let summary = html! {
        dl class="grid grid-cols-1 sm:grid-cols-3 gap-4"
        {
            (summary_figure(view.inflows.title, &view.inflows.subtotal, None))
            (summary_figure(view.outflows.title, &view.outflows.subtotal, None))
            (summary_figure(view.net_title, &view.net, Some(view.is_profit)))
        }

        p class="text-sm text-gray-600 dark:text-gray-400"
        {
            "Expenses are " (view.outflow_ratio) " of revenue."
        }
    };

    statement_body(view, summary, chart)
}

fn income_statement_view(
    start_date: &str,
    end_date: &str,
    errors: &ValidationErrors,
    report: Option<Markup>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::INCOME_STATEMENT_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class={(PAGE_CONTAINER_STYLE) " max-w-screen-xl space-y-6"}
        {
            (page_heading("Income Statement"))

            form
                hx-post=(endpoints::INCOME_STATEMENT_GENERATE)
                hx-target={"#" (REPORT_CONTAINER_ID)}
                hx-target-error="#alert-container"
                hx-swap="innerHTML"
                hx-indicator="#indicator"
                class="w-full space-y-4 md:space-y-6"
            {
                (date_fields(start_date, end_date, errors))

                button type="submit" id="indicator" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span class="htmx-indicator" { (loading_spinner()) }
                    " Generate Report"
                }
            }

            div id=(REPORT_CONTAINER_ID) class="w-full"
            {
                @if let Some(report) = report {
                    (report)
                }
            }
        }
    };

    base("Income Statement", &chart_head_elements(), &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{body::Body, extract::State, http::StatusCode, response::Response};
    use axum_extra::extract::{Form, Query};
    use axum_htmx::HxRequest;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        app_state::ReportState,
        db::{
            CategoryKind, NewTransaction, TransactionKind, initialize, insert_category,
            insert_money_account, insert_transaction,
        },
        endpoints,
        events::ReportEvents,
        income_statement::{
            generate_income_statement, get_income_statement_data, get_income_statement_page,
        },
        money::{Currency, Money},
        report_form::ReportForm,
        report_service::FinancialReportService,
        stores::sqlite::{SQLiteMoneyAccountStore, SQLiteReportQuery},
        test_utils::{
            assert_content_type, assert_form_input_with_value, assert_form_submit_button,
            assert_hx_endpoint, assert_status_ok, assert_valid_html, must_get_form,
            parse_html_document, parse_html_fragment, read_body_text, read_json,
        },
    };

    fn usd(amount: i64) -> Money {
        Money::new(amount, Currency::new("USD").unwrap())
    }

    fn get_test_state() -> ReportState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let account_id = insert_money_account(&connection, "Everyday", &usd(100_000)).unwrap();
        let salary = insert_category(&connection, "Salary", CategoryKind::Income).unwrap();
        let rent = insert_category(&connection, "Rent", CategoryKind::Expense).unwrap();

        for (category_id, kind, amount, date) in [
            (salary, TransactionKind::Deposit, 500_000, date!(2024 - 01 - 15)),
            (rent, TransactionKind::Withdrawal, 200_000, date!(2024 - 01 - 20)),
            (salary, TransactionKind::Deposit, 500_000, date!(2024 - 02 - 15)),
            (rent, TransactionKind::Withdrawal, 200_000, date!(2024 - 02 - 20)),
        ] {
            insert_transaction(
                &connection,
                &NewTransaction {
                    account_id,
                    category_id: Some(category_id),
                    kind,
                    amount,
                    date,
                },
            )
            .unwrap();
        }

        let connection = Arc::new(Mutex::new(connection));

        ReportState {
            service: FinancialReportService::new(
                SQLiteReportQuery::new(connection.clone()),
                SQLiteMoneyAccountStore::new(connection),
                ReportEvents::default(),
                Currency::new("USD").unwrap(),
            ),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn form(start_date: &str, end_date: &str) -> ReportForm {
        ReportForm {
            start_date: Some(start_date.to_owned()),
            end_date: Some(end_date.to_owned()),
            account_id: None,
        }
    }

    async fn get_page(state: ReportState, form: ReportForm) -> Response<Body> {
        get_income_statement_page(State(state), HxRequest(false), Query(form))
            .await
            .unwrap()
    }

    fn table_rows(html: &Html, selector: &str) -> Vec<Vec<String>> {
        let row_selector = Selector::parse(selector).unwrap();
        let cell_selector = Selector::parse("th, td").unwrap();

        html.select(&row_selector)
            .map(|row| {
                row.select(&cell_selector)
                    .map(|cell| cell.text().collect::<String>().trim().to_owned())
                    .collect()
            })
            .collect()
    }

    #[tokio::test]
    async fn page_renders_form_and_report() {
        let response = get_page(get_test_state(), form("2024-01-01", "2024-03-31")).await;

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::INCOME_STATEMENT_GENERATE, "hx-post");
        assert_form_input_with_value(&form, "start_date", "date", "2024-01-01");
        assert_form_input_with_value(&form, "end_date", "date", "2024-03-31");
        assert_form_submit_button(&form, "Generate Report");

        let rows = table_rows(&html, "#report section tbody tr");
        assert_eq!(
            rows[..2],
            [
                vec!["Salary".to_owned(), "$10,000.00".to_owned(), "100.00%".to_owned()],
                vec!["Rent".to_owned(), "$4,000.00".to_owned(), "100.00%".to_owned()],
            ]
        );
        assert!(html.html().contains("$6,000.00"), "net profit missing");
        assert!(html.html().contains("Expenses are 40.00% of revenue."));
    }

    #[tokio::test]
    async fn page_shows_every_month_of_period() {
        let response = get_page(get_test_state(), form("2024-01-01", "2024-03-31")).await;
        let html = parse_html_document(response).await;

        let months: Vec<String> = html
            .select(&Selector::parse("#report section tbody th").unwrap())
            .map(|cell| cell.text().collect::<String>())
            .filter(|text| text.ends_with("2024"))
            .collect();

        assert_eq!(
            months,
            vec![
                "Jan 2024", "Feb 2024", "Mar 2024", "Jan 2024", "Feb 2024", "Mar 2024"
            ]
        );
        assert!(html.html().contains("monthly-chart"));
    }

    #[tokio::test]
    async fn page_defaults_to_current_year() {
        let response = get_page(get_test_state(), ReportForm::default()).await;

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        let form = must_get_form(&html);
        let year = time::OffsetDateTime::now_utc().year();
        assert_form_input_with_value(&form, "start_date", "date", &format!("{year}-01-01"));
        assert_form_input_with_value(&form, "end_date", "date", &format!("{year}-12-31"));
    }

    #[tokio::test]
    async fn page_shows_validation_errors() {
        let response = get_page(get_test_state(), form("2024-03-01", "2024-01-01")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(
            html.html()
                .contains("The end date must be on or after the start date")
        );
        let report = html
            .select(&Selector::parse("#report").unwrap())
            .next()
            .unwrap();
        assert_eq!(report.children().count(), 0);
    }

    #[tokio::test]
    async fn htmx_page_request_returns_report_only() {
        let response = get_income_statement_page(
            State(get_test_state()),
            HxRequest(true),
            Query(form("2024-01-01", "2024-01-31")),
        )
        .await
        .unwrap();

        assert_status_ok(&response);
        let html = parse_html_fragment(response).await;
        assert!(html.select(&Selector::parse("nav").unwrap()).next().is_none());
        assert!(html.html().contains("Revenue"));
    }

    #[tokio::test]
    async fn generate_returns_report_fragment() {
        let response =
            generate_income_statement(State(get_test_state()), Form(form("2024-02-01", "2024-02-29")))
                .await;

        assert_status_ok(&response);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert!(html.select(&Selector::parse("form").unwrap()).next().is_none());
        let rows = table_rows(&html, "section tbody tr");
        assert_eq!(
            rows[0],
            vec!["Salary".to_owned(), "$5,000.00".to_owned(), "100.00%".to_owned()]
        );
    }

    #[tokio::test]
    async fn generate_rejects_invalid_dates() {
        let response =
            generate_income_statement(State(get_test_state()), Form(form("last week", "")))
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        assert!(html.html().contains("Enter a date in the format YYYY-MM-DD"));
    }

    #[tokio::test]
    async fn data_returns_json_statement() {
        let response =
            get_income_statement_data(State(get_test_state()), Query(form("2024-01-01", "2024-01-31")))
                .await
                .unwrap();

        assert_status_ok(&response);
        assert_content_type(&response, "application/json");
        let json = read_json(response).await;

        assert_eq!(json["kind"], "income_statement");
        assert_eq!(json["start_date"], "2024-01-01");
        assert_eq!(json["net"], "$3,000.00");
        assert_eq!(json["is_profit"], true);
        assert_eq!(json["inflows"]["line_items"][0]["category"], "Salary");
        assert_eq!(json["monthly"]["inflows"]["rows"][0]["month"], "2024-01");
    }

    #[tokio::test]
    async fn data_rejects_invalid_range_with_plain_text() {
        let response =
            get_income_statement_data(State(get_test_state()), Query(form("2024-02-01", "2024-01-01")))
                .await
                .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_content_type(&response, "text/plain; charset=utf-8");
    }

    #[tokio::test]
    async fn data_rejects_period_longer_than_ten_years() {
        let response =
            get_income_statement_data(State(get_test_state()), Query(form("0001-01-01", "9999-12-31")))
                .await
                .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let text = read_body_text(response).await;
        assert!(text.contains("end_date: The period can cover at most 10 years"), "{text}");
    }
}
