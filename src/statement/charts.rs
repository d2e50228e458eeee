//! ECharts visualisations of a statement's monthly breakdown.
//!
//! Charts are generated as ECharts option objects and initialised on the page
//! by a script added to the document head.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::{Line, bar::Bar},
};
use maud::{Markup, PreEscaped, html};

use crate::{html::HeadElement, money::Currency, statement::core::Statement};

/// A chart with its HTML container ID and ECharts configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration
    pub options: String,
}

/// The monthly totals chart for `statement`.
///
/// Returns `None` for statements without a monthly breakdown.
pub fn monthly_chart(statement: &Statement) -> Option<ReportChart> {
    let monthly = statement.monthly.as_ref()?;
    let months = statement.period.months();
    let labels: Vec<String> = months.iter().map(|month| month.label()).collect();

    let inflows: Vec<f64> = months
        .iter()
        .map(|month| {
            monthly
                .inflows
                .month_total(month, &statement.currency)
                .as_major_units()
        })
        .collect();
    let outflows: Vec<f64> = months
        .iter()
        .map(|month| {
            monthly
                .outflows
                .month_total(month, &statement.currency)
                .as_major_units()
        })
        .collect();
    let net: Vec<f64> = inflows
        .iter()
        .zip(outflows.iter())
        .map(|(inflow, outflow)| inflow - outflow)
        .collect();

    let chart = Chart::new()
        .title(
            Title::new()
                .text(statement.kind.title())
                .subtext("Monthly totals"),
        )
        .tooltip(currency_tooltip(&statement.currency))
        .legend(Legend::new().top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(80)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter(&statement.currency))),
        )
        .series(
            Bar::new()
                .name(statement.kind.inflow_title())
                .data(inflows),
        )
        .series(
            Bar::new()
                .name(statement.kind.outflow_title())
                .data(outflows),
        )
        .series(Line::new().name(statement.kind.net_title()).data(net));

    Some(ReportChart {
        id: "monthly-chart",
        options: chart.to_string(),
    })
}

/// Renders the HTML containers for `charts`.
pub fn charts_view(charts: &[ReportChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            @for chart in charts {
                div
                    id=(chart.id)
                    class="min-h-[380px] rounded dark:bg-gray-100"
                {}
            }
        }
    )
}

/// Generates the JavaScript that initialises `charts` with dark mode support
/// and responsive resizing.
///
/// The script runs immediately if the page has already loaded, which is the
/// case when the report is swapped in by HTMX.
pub fn charts_script(charts: &[ReportChart]) -> PreEscaped<String> {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    if (!chartDom) return;
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    PreEscaped(format!(
        "if (document.readyState === 'loading') {{\n\
            document.addEventListener('DOMContentLoaded', function() {{\n{script_content}\n}});\n\
        }} else {{\n{script_content}\n}}"
    ))
}

/// The script tags needed in the document head to draw charts.
pub fn chart_head_elements() -> Vec<HeadElement> {
    vec![HeadElement::ScriptLink(
        "/static/echarts.6.0.0.min.js".to_owned(),
    )]
}

fn currency_formatter(currency: &Currency) -> JsFunction {
    JsFunction::new_with_args(
        "number",
        &format!(
            "const currencyFormatter = new Intl.NumberFormat('en-US', {{
              style: 'currency',
              currency: '{}'
            }});
            return (number) ? currencyFormatter.format(number) : \"-\";",
            currency.code()
        ),
    )
}

fn currency_tooltip(currency: &Currency) -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter(currency))
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
