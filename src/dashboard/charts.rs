//! Chart generation and rendering for the dashboard.
//!
//! Both charts cover the months in the monthly series:
//! - **Monthly Income vs Expenses**: side by side bars per month
//! - **Balance Trend**: each month's income minus expenses as a line
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with a HTML container and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, ItemStyle, JsFunction, Tooltip, Trigger,
    },
    series::{Line, bar::Bar},
};
use maud::{Markup, PreEscaped, html};

use crate::{dashboard::aggregation::MonthlyAggregate, html::HeadElement};

const INCOME_COLOR: &str = "#22c55e";
const EXPENSES_COLOR: &str = "#ef4444";
const BALANCE_COLOR: &str = "#8b5cf6";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Creates the dashboard charts for `series`, ready for rendering.
pub(super) fn build_dashboard_charts(series: &[MonthlyAggregate]) -> [DashboardChart; 2] {
    [
        DashboardChart {
            id: "income-expenses-chart",
            options: income_expenses_chart(series).to_string(),
        },
        DashboardChart {
            id: "balance-trend-chart",
            options: balance_trend_chart(series).to_string(),
        },
    ]
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto my-4"
        {
            div class="grid grid-cols-1 lg:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
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

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{script_content}\n}});"
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

fn month_labels(series: &[MonthlyAggregate]) -> Vec<String> {
    series.iter().map(|month| month.label.clone()).collect()
}

fn chart_grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .top(70)
        .contain_label(true)
}

fn currency_axis() -> Axis {
    Axis::new()
        .type_(AxisType::Value)
        .axis_label(AxisLabel::new().formatter(currency_formatter()))
}

pub(super) fn income_expenses_chart(series: &[MonthlyAggregate]) -> Chart {
    let income: Vec<f64> = series.iter().map(|month| month.income).collect();
    let expenses: Vec<f64> = series.iter().map(|month| month.expenses).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Monthly Income vs Expenses")
                .subtext("Last six months with transactions"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().right("4%"))
        .grid(chart_grid())
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(month_labels(series)),
        )
        .y_axis(currency_axis())
        .series(
            Bar::new()
                .name("Income")
                .item_style(ItemStyle::new().color(INCOME_COLOR))
                .data(income),
        )
        .series(
            Bar::new()
                .name("Expenses")
                .item_style(ItemStyle::new().color(EXPENSES_COLOR))
                .data(expenses),
        )
}

pub(super) fn balance_trend_chart(series: &[MonthlyAggregate]) -> Chart {
    let balances: Vec<f64> = series.iter().map(|month| month.balance).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Balance Trend")
                .subtext("Income minus expenses per month"),
        )
        .tooltip(currency_tooltip())
        .grid(chart_grid())
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(month_labels(series)),
        )
        .y_axis(currency_axis())
        .series(
            Line::new()
                .name("Balance")
                .item_style(ItemStyle::new().color(BALANCE_COLOR))
                .data(balances),
        )
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"$0.00\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::{balance_trend_chart, build_dashboard_charts, income_expenses_chart};
    use crate::dashboard::aggregation::MonthlyAggregate;

    fn series() -> Vec<MonthlyAggregate> {
        vec![
            MonthlyAggregate {
                month: date!(2024 - 01 - 01),
                label: "Jan 2024".to_owned(),
                income: 1000.0,
                expenses: 400.0,
                balance: 600.0,
            },
            MonthlyAggregate {
                month: date!(2024 - 02 - 01),
                label: "Feb 2024".to_owned(),
                income: 200.0,
                expenses: 450.5,
                balance: -250.5,
            },
        ]
    }

    #[test]
    fn income_expenses_chart_has_both_series() {
        let options = income_expenses_chart(&series()).to_string();

        assert!(options.contains("Monthly Income vs Expenses"));
        assert!(options.contains("Jan 2024"));
        assert!(options.contains("\"Income\""));
        assert!(options.contains("\"Expenses\""));
        assert!(options.contains("450.5"));
    }

    #[test]
    fn balance_trend_chart_plots_balances() {
        let options = balance_trend_chart(&series()).to_string();

        assert!(options.contains("Balance Trend"));
        assert!(options.contains("-250.5"));
        assert!(options.contains("Feb 2024"));
    }

    #[test]
    fn builds_charts_with_distinct_ids() {
        let charts = build_dashboard_charts(&series());

        assert_ne!(charts[0].id, charts[1].id);
        assert!(charts.iter().all(|chart| !chart.options.is_empty()));
    }
}
