//! Chart generation and rendering for the reports.
//!
//! Charts are built as ECharts configurations with `charming` and rendered
//! as empty containers plus a script that initialises them.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, JsFunction,
        Tooltip, Trigger,
    },
    series::{Line, bar},
};
use maud::{Markup, PreEscaped, html};
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    html::HeadElement,
    report::{BalancePoint, DailyCreditDebit},
};

/// A chart with its HTML container ID and ECharts configuration.
pub(super) struct ReportChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for `charts`.
pub(super) fn charts_view(charts: &[ReportChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
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

/// Generates the JavaScript that initialises `charts` once the page has loaded.
pub(super) fn charts_script(charts: &[ReportChart]) -> HeadElement {
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
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

pub(super) fn balance_chart(points: &[BalancePoint]) -> Chart {
    let labels: Vec<String> = points.iter().map(|point| point.date.to_string()).collect();
    let values: Vec<f64> = points.iter().map(|point| to_chart_value(point.balance)).collect();

    Chart::new()
        .title(Title::new().text("Balance").subtext("Last two years"))
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Line::new().name("Balance").data(values))
}

pub(super) fn credit_debit_chart(days: &[DailyCreditDebit]) -> Chart {
    let labels: Vec<String> = days.iter().map(|day| day.date.to_string()).collect();
    let credits: Vec<f64> = days.iter().map(|day| to_chart_value(day.credit)).collect();
    let debits: Vec<f64> = days.iter().map(|day| to_chart_value(day.debit)).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Credits and debits")
                .subtext("Per day, without internal transfers")
                .left(20)
                .top("1%"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().left(250).top("1%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(90)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            bar::Bar::new()
                .name("Credit")
                .stack("Cash flow")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(credits),
        )
        .series(
            bar::Bar::new()
                .name("Debit")
                .stack("Cash flow")
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(debits),
        )
}

/// Charts only need cents, so the lossy conversion to f64 is fine here.
fn to_chart_value(amount: Decimal) -> f64 {
    amount.round_dp(2).to_f64().unwrap_or_default()
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('fr-BE', {
              style: 'currency',
              currency: 'EUR'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
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
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::report::{BalancePoint, DailyCreditDebit};

    use super::{balance_chart, credit_debit_chart};

    #[test]
    fn balance_chart_has_one_label_per_point() {
        let points = [
            BalancePoint {
                date: date!(2024 - 01 - 01),
                balance: dec!(100),
            },
            BalancePoint {
                date: date!(2024 - 01 - 02),
                balance: dec!(130.5),
            },
        ];

        let options = balance_chart(&points).to_string();

        assert!(options.contains("2024-01-01"));
        assert!(options.contains("2024-01-02"));
        assert!(options.contains("130.5"));
    }

    #[test]
    fn credit_debit_chart_has_both_series() {
        let days = [DailyCreditDebit {
            date: date!(2024 - 05 - 01),
            credit: dec!(50),
            debit: dec!(-12.25),
        }];

        let options = credit_debit_chart(&days).to_string();

        assert!(options.contains("\"Credit\""));
        assert!(options.contains("\"Debit\""));
        assert!(options.contains("-12.25"));
    }
}
