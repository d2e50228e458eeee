//! The API endpoints URIs.

/// The root route which redirects to the income statement.
pub const ROOT: &str = "/";
/// The page for viewing the income statement.
pub const INCOME_STATEMENT_VIEW: &str = "/reports/income-statement";
/// The route for generating the income statement from the report form.
pub const INCOME_STATEMENT_GENERATE: &str = "/reports/income-statement/generate";
/// The route for getting the income statement as JSON.
pub const INCOME_STATEMENT_DATA: &str = "/reports/income-statement/data";
/// The page for viewing the cashflow statement.
pub const CASHFLOW_VIEW: &str = "/reports/cashflow";
/// The route for generating the cashflow statement from the report form.
pub const CASHFLOW_GENERATE: &str = "/reports/cashflow/generate";
/// The route for getting the cashflow statement as JSON.
pub const CASHFLOW_DATA: &str = "/reports/cashflow/data";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";
