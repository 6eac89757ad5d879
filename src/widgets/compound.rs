//! Investment growth widget
//!
//! The growth chart comes from the local projection, so it is drawn as
//! soon as the form is valid, with or without a service result.

use super::{percent_of, BarSegment, Breakdown, Calculator, ChartBar, GrowthChart, LabeledValue, WidgetView};
use crate::format::{format_currency, format_percent};
use crate::models::{CalculatorKind, CompoundData, CompoundResult, ProjectionInput};
use crate::projection::{compounding_label, project, ProjectionSeries};
use crate::validation::validate_projection;
use crate::Result;

pub struct CompoundCalculator;

impl Calculator for CompoundCalculator {
    type Input = ProjectionInput;
    type Output = CompoundResult;

    const KIND: CalculatorKind = CalculatorKind::Compound;

    fn validate(input: &ProjectionInput) -> Result<()> {
        validate_projection(input)
    }

    fn render(input: &ProjectionInput, data: Option<&CompoundData>) -> WidgetView {
        let mut view = WidgetView::new(Self::KIND, "📈", "Investment Growth Calculator");

        view.inputs = vec![
            LabeledValue::new("Initial Investment", format_currency(input.principal)),
            LabeledValue::new("Annual Return", format_percent(input.annual_rate_percent)),
            LabeledValue::new("Time Period", format!("{} years", input.years)),
            LabeledValue::new("Compounding", compounding_label(input.compounding_frequency)),
        ];
        if input.monthly_contribution > 0.0 {
            view.inputs.push(LabeledValue::new(
                "Monthly Contribution",
                format_currency(input.monthly_contribution),
            ));
        }

        if validate_projection(input).is_ok() {
            view.growth_chart = Some(growth_chart(&project(input)));
        }

        let Some(data) = data else {
            return view;
        };
        let result = &data.result;

        view.highlight = Some(LabeledValue::new(
            "Future Value",
            format_currency(result.future_value),
        ));

        view.breakdown = Some(Breakdown {
            title: "Value Breakdown".to_string(),
            segments: vec![
                BarSegment {
                    class: "contributions".to_string(),
                    legend: format!("Contributions: {}", format_currency(result.total_contributions)),
                    percent: percent_of(result.total_contributions, result.future_value),
                },
                BarSegment {
                    class: "earnings".to_string(),
                    legend: format!(
                        "Interest Earned: {}",
                        format_currency(result.total_interest_earned)
                    ),
                    percent: percent_of(result.total_interest_earned, result.future_value),
                },
            ],
        });

        view.totals = vec![LabeledValue::new(
            "Effective Annual Rate",
            format_percent(result.effective_annual_rate),
        )];

        view
    }
}

/// Column chart scaled to the largest projected value
pub fn growth_chart(series: &ProjectionSeries) -> GrowthChart {
    let max = series.max_value();
    let last = series.len().saturating_sub(1);

    let bars = series
        .iter()
        .enumerate()
        .map(|(idx, point)| ChartBar {
            year: point.year,
            height_percent: percent_of(point.value, max),
            tooltip: format!("Year {}: {}", point.year, format_currency(point.value)),
            label: (idx == last).then(|| format_currency(point.value)),
        })
        .collect();

    let final_year = series.points().last().map(|p| p.year).unwrap_or(0);

    GrowthChart {
        title: "Growth Over Time".to_string(),
        bars,
        axis_start: "Year 0".to_string(),
        axis_end: format!("Year {}", final_year),
    }
}
