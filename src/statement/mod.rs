//! Financial statements.
//!
//! Aggregates per-category rows into income and cashflow statements and
//! formats them for display.

mod aggregator;
mod charts;
mod core;
mod formatter;

pub use aggregator::build_statement;
pub use charts::{ReportChart, chart_head_elements, charts_script, charts_view, monthly_chart};
pub use self::core::{
    CashflowStatement, CategoryAmount, LineItem, MonthlyBreakdown, MonthlyCategoryAmount,
    MonthlyGrid, MonthlyRows, Percentage, Section, Statement, StatementKind, StatementRows,
};
pub use formatter::{
    CashflowStatementView, LineItemView, MonthlyRowView, MonthlyTableView, MonthlyView,
    SectionView, StatementView, format_cashflow_statement, format_money, format_statement,
};
