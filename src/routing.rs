//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    cashflow::{generate_cashflow, get_cashflow_data, get_cashflow_page},
    endpoints,
    income_statement::{
        generate_income_statement, get_income_statement_data, get_income_statement_page,
    },
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(
            endpoints::INCOME_STATEMENT_VIEW,
            get(get_income_statement_page),
        )
        .route(
            endpoints::INCOME_STATEMENT_GENERATE,
            post(generate_income_statement),
        )
        .route(
            endpoints::INCOME_STATEMENT_DATA,
            get(get_income_statement_data),
        )
        .route(endpoints::CASHFLOW_VIEW, get(get_cashflow_page))
        .route(endpoints::CASHFLOW_GENERATE, post(generate_cashflow))
        .route(endpoints::CASHFLOW_DATA, get(get_cashflow_data))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the income statement.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::INCOME_STATEMENT_VIEW)
}
