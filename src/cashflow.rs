//! The cashflow statement page, its HTMX report endpoint and the JSON data endpoint.

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
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, loading_spinner, page_heading,
    },
    navigation::NavBar,
    report_form::{ALL_ACCOUNTS_VALUE, AccountField, ReportForm, ValidationErrors},
    report_service::ALL_ACCOUNTS_NAME,
    report_view::{
        REPORT_CONTAINER_ID, date_fields, form_dates, json_response, statement_body,
        summary_figure, validation_alert_response, validation_text_response,
    },
    statement::{
        CashflowStatement, CashflowStatementView, ReportChart, chart_head_elements,
        format_cashflow_statement, monthly_chart,
    },
    stores::{MoneyAccount, MoneyAccountStore},
    timezone::current_year,
};

/// Display the cashflow statement page.
///
/// The `account_id` query parameter selects an account by ID, or every
/// account with "all" or when it is missing. The period defaults to the
/// current calendar year.
pub async fn get_cashflow_page(
    State(state): State<ReportState>,
    HxRequest(is_htmx): HxRequest,
    Query(form): Query<ReportForm>,
) -> Result<Response, Error> {
    let default_period = current_year(&state.local_timezone)?;
    let (start_date, end_date) = form_dates(&form, default_period);

    match form.validate(default_period, AccountField::Optional) {
        Ok(request) => {
            let statement = state
                .service
                .cashflow_statement(request.period, request.account)?;
            let report = cashflow_report(&statement);

            if is_htmx {
                return Ok(report.into_response());
            }

            let accounts = state.service.accounts().get_all()?;
            let fields = CashflowFormFields {
                start_date: &start_date,
                end_date: &end_date,
                account_id: &request.account.to_string(),
                accounts: &accounts,
            };

            Ok(cashflow_view(&fields, &ValidationErrors::default(), Some(report)).into_response())
        }
        Err(errors) => {
            tracing::debug!("invalid cashflow request: {errors}");

            let accounts = state.service.accounts().get_all()?;
            let fields = CashflowFormFields {
                start_date: &start_date,
                end_date: &end_date,
                account_id: form.account_id.as_deref().unwrap_or(ALL_ACCOUNTS_VALUE),
                accounts: &accounts,
            };

            Ok((StatusCode::BAD_REQUEST, cashflow_view(&fields, &errors, None)).into_response())
        }
    }
}

/// Generate the cashflow statement from the report form.
///
/// Returns the report as an HTML fragment, or an alert if the form is
/// invalid, the account does not exist or the statement could not be built.
pub async fn generate_cashflow(
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

    match state
        .service
        .cashflow_statement(request.period, request.account)
    {
        Ok(statement) => cashflow_report(&statement).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Get the cashflow statement as JSON.
///
/// Unlike the page, the `account_id` parameter is required.
pub async fn get_cashflow_data(
    State(state): State<ReportState>,
    Query(form): Query<ReportForm>,
) -> Result<Response, Error> {
    let default_period = current_year(&state.local_timezone)?;

    let request = match form.validate(default_period, AccountField::Required) {
        Ok(request) => request,
        Err(errors) => return Ok(validation_text_response(&errors)),
    };

    let statement = state
        .service
        .cashflow_statement(request.period, request.account)?;

    json_response(&format_cashflow_statement(&statement))
}

fn cashflow_report(statement: &CashflowStatement) -> Markup {
    let view = format_cashflow_statement(statement);
    let chart = monthly_chart(&statement.statement);

    cashflow_report_view(&view, chart)
}

fn cashflow_report_view(view: &CashflowStatementView, chart: Option<ReportChart>) -> Markup {
    let statement = &view.statement;
    let summary = html! {
        h3 class="text-xl font-semibold" { (view.account_name) }

        dl class="grid grid-cols-1 sm:grid-cols-3 gap-4"
        {
            (summary_figure("Starting Balance", &view.starting_balance, None))
            (summary_figure(statement.net_title, &statement.net, Some(statement.is_profit)))
            (summary_figure("Ending Balance", &view.ending_balance, None))
        }
    };

    statement_body(statement, summary, chart)
}

struct CashflowFormFields<'a> {
    start_date: &'a str,
    end_date: &'a str,
    /// The selected option, "all" or an account ID.
    account_id: &'a str,
    accounts: &'a [MoneyAccount],
}

fn account_select(fields: &CashflowFormFields<'_>, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label for="account_id" class=(FORM_LABEL_STYLE) { "Account" }

            select name="account_id" id="account_id" class=(FORM_TEXT_INPUT_STYLE)
            {
                option
                    value=(ALL_ACCOUNTS_VALUE)
                    selected[fields.account_id.eq_ignore_ascii_case(ALL_ACCOUNTS_VALUE)]
                {
                    (ALL_ACCOUNTS_NAME)
                }

                @for account in fields.accounts {
                    @let value = account.id.to_string();
                    option value=(value) selected[fields.account_id == value]
                    {
                        (account.name)
                    }
                }
            }

            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }
    }
}

fn cashflow_view(
    fields: &CashflowFormFields<'_>,
    errors: &ValidationErrors,
    report: Option<Markup>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::CASHFLOW_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class={(PAGE_CONTAINER_STYLE) " max-w-screen-xl space-y-6"}
        {
            (page_heading("Cash Flow"))

            form
                hx-post=(endpoints::CASHFLOW_GENERATE)
                hx-target={"#" (REPORT_CONTAINER_ID)}
                hx-target-error="#alert-container"
                hx-swap="innerHTML"
                hx-indicator="#indicator"
                class="w-full space-y-4 md:space-y-6"
            {
                (account_select(fields, errors.get("account_id")))

                (date_fields(fields.start_date, fields.end_date, errors))

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

    base("Cash Flow", &chart_head_elements(), &content)
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
        cashflow::{generate_cashflow, get_cashflow_data, get_cashflow_page},
        db::{
            CategoryKind, NewTransaction, TransactionKind, initialize, insert_category,
            insert_money_account, insert_transaction,
        },
        endpoints,
        events::ReportEvents,
        money::{Currency, Money},
        report_form::ReportForm,
        report_service::FinancialReportService,
        stores::{AccountId, sqlite::{SQLiteMoneyAccountStore, SQLiteReportQuery}},
        test_utils::{
            assert_content_type, assert_form_input_with_value, assert_form_submit_button,
            assert_hx_endpoint, assert_status_ok, assert_valid_html, must_get_form,
            parse_html_document, parse_html_fragment, read_body_text, read_json,
        },
    };

    fn usd(amount: i64) -> Money {
        Money::new(amount, Currency::new("USD").unwrap())
    }

    struct Fixture {
        state: ReportState,
        everyday_id: AccountId,
    }

    /// Two accounts: "Everyday" with a balance of $900 and "Savings" with $5,000.
    fn get_fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let everyday_id = insert_money_account(&connection, "Everyday", &usd(90_000)).unwrap();
        let savings_id = insert_money_account(&connection, "Savings", &usd(500_000)).unwrap();
        let salary = insert_category(&connection, "Salary", CategoryKind::Income).unwrap();
        let groceries = insert_category(&connection, "Groceries", CategoryKind::Expense).unwrap();

        for (account_id, category_id, kind, amount, date) in [
            (everyday_id, Some(salary), TransactionKind::Deposit, 300_000, date!(2024 - 01 - 15)),
            (everyday_id, Some(groceries), TransactionKind::Withdrawal, 50_000, date!(2024 - 01 - 20)),
            (everyday_id, None, TransactionKind::Withdrawal, 10_000, date!(2024 - 02 - 01)),
            (savings_id, None, TransactionKind::Deposit, 100_000, date!(2024 - 02 - 02)),
        ] {
            insert_transaction(
                &connection,
                &NewTransaction {
                    account_id,
                    category_id,
                    kind,
                    amount,
                    date,
                },
            )
            .unwrap();
        }

        let connection = Arc::new(Mutex::new(connection));

        Fixture {
            state: ReportState {
                service: FinancialReportService::new(
                    SQLiteReportQuery::new(connection.clone()),
                    SQLiteMoneyAccountStore::new(connection),
                    ReportEvents::default(),
                    Currency::new("USD").unwrap(),
                ),
                local_timezone: "Etc/UTC".to_owned(),
            },
            everyday_id,
        }
    }

    fn form(account_id: Option<&str>) -> ReportForm {
        ReportForm {
            start_date: Some("2024-01-01".to_owned()),
            end_date: Some("2024-02-29".to_owned()),
            account_id: account_id.map(str::to_owned),
        }
    }

    async fn get_page(state: ReportState, form: ReportForm) -> Response<Body> {
        get_cashflow_page(State(state), HxRequest(false), Query(form))
            .await
            .unwrap()
    }

    fn selected_account(html: &Html) -> String {
        html.select(&Selector::parse("select[name=account_id] option[selected]").unwrap())
            .next()
            .expect("No selected account")
            .text()
            .collect()
    }

    #[tokio::test]
    async fn page_renders_account_select_and_report() {
        let fixture = get_fixture();
        let account_id = fixture.everyday_id.to_string();

        let response = get_page(fixture.state, form(Some(&account_id))).await;

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::CASHFLOW_GENERATE, "hx-post");
        assert_form_input_with_value(&form, "start_date", "date", "2024-01-01");
        assert_form_submit_button(&form, "Generate Report");
        assert_eq!(selected_account(&html), "Everyday");

        let options: Vec<String> = html
            .select(&Selector::parse("select[name=account_id] option").unwrap())
            .map(|option| option.text().collect())
            .collect();
        assert_eq!(options, vec!["All accounts", "Everyday", "Savings"]);

        let text = html.html();
        // $3,000 in, $600 out and a current balance of $900.
        assert!(text.contains("$2,400.00"), "net cash flow missing");
        assert!(text.contains("-$1,500.00"), "starting balance missing");
        assert!(text.contains("$900.00"), "ending balance missing");
        assert!(text.contains("Uncategorized"));
    }

    #[tokio::test]
    async fn page_shows_transaction_counts() {
        let fixture = get_fixture();
        let account_id = fixture.everyday_id.to_string();

        let response = get_page(fixture.state, form(Some(&account_id))).await;

        let html = parse_html_document(response).await;
        let headers: Vec<String> = html
            .select(&Selector::parse("#report section thead th").unwrap())
            .map(|cell| cell.text().collect::<String>())
            .collect();
        assert_eq!(headers[..4], ["Category", "Amount", "Share", "Transactions"]);

        let cell_selector = Selector::parse("th, td").unwrap();
        let rows: Vec<Vec<String>> = html
            .select(&Selector::parse("#report section tbody tr").unwrap())
            .map(|row| {
                row.select(&cell_selector)
                    .map(|cell| cell.text().collect::<String>().trim().to_owned())
                    .collect()
            })
            .collect();
        assert_eq!(
            rows[..3],
            [
                vec!["Salary", "$3,000.00", "100.00%", "1"],
                vec!["Groceries", "$500.00", "83.33%", "1"],
                vec!["Uncategorized", "$100.00", "16.67%", "1"],
            ]
        );
    }

    #[tokio::test]
    async fn page_defaults_to_all_accounts() {
        let response = get_page(get_fixture().state, form(None)).await;

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_eq!(selected_account(&html), "All accounts");
        assert!(html.html().contains("$5,900.00"), "combined balance missing");
    }

    #[tokio::test]
    async fn page_with_unknown_account_is_not_found() {
        let result = get_cashflow_page(
            State(get_fixture().state),
            HxRequest(false),
            Query(form(Some("999"))),
        )
        .await;

        assert!(matches!(result, Err(crate::Error::NotFound)));
    }

    #[tokio::test]
    async fn page_shows_account_validation_error() {
        let response = get_page(get_fixture().state, form(Some("savings"))).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(html.html().contains("is not a valid account"));
    }

    #[tokio::test]
    async fn generate_returns_report_fragment() {
        let fixture = get_fixture();
        let account_id = fixture.everyday_id.to_string();

        let response = generate_cashflow(State(fixture.state), Form(form(Some(&account_id)))).await;

        assert_status_ok(&response);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert!(html.select(&Selector::parse("nav").unwrap()).next().is_none());
        assert!(html.html().contains("Everyday"));
    }

    #[tokio::test]
    async fn generate_with_unknown_account_returns_alert() {
        let response = generate_cashflow(State(get_fixture().state), Form(form(Some("999")))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let html = parse_html_fragment(response).await;
        assert!(html.html().contains("Account not found"));
    }

    #[tokio::test]
    async fn data_returns_json_with_balances() {
        let fixture = get_fixture();
        let account_id = fixture.everyday_id.to_string();

        let response = get_cashflow_data(State(fixture.state), Query(form(Some(&account_id))))
            .await
            .unwrap();

        assert_status_ok(&response);
        assert_content_type(&response, "application/json");
        let json = read_json(response).await;
        assert_eq!(json["account_name"], "Everyday");
        assert_eq!(json["kind"], "cashflow");
        assert_eq!(json["starting_balance"], "-$1,500.00");
        assert_eq!(json["net"], "$2,400.00");
        assert_eq!(json["ending_balance"], "$900.00");
        assert_eq!(json["outflows"]["line_items"][0]["category"], "Groceries");
        assert_eq!(json["outflows"]["line_items"][1]["category"], "Uncategorized");
    }

    #[tokio::test]
    async fn data_for_all_accounts() {
        let response = get_cashflow_data(State(get_fixture().state), Query(form(Some("all"))))
            .await
            .unwrap();

        let json = read_json(response).await;
        assert_eq!(json["account_name"], "All accounts");
        assert_eq!(json["net"], "$3,400.00");
        assert_eq!(json["ending_balance"], "$5,900.00");
        assert_eq!(json["starting_balance"], "$2,500.00");
    }

    #[tokio::test]
    async fn data_requires_account() {
        let response = get_cashflow_data(State(get_fixture().state), Query(form(None)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            read_body_text(response).await,
            "account_id: Choose an account or \"all\""
        );
    }
}
