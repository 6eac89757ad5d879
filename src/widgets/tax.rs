//! Tax estimation widget

use super::{percent_of, BarSegment, Breakdown, Calculator, LabeledValue, WidgetView};
use crate::format::{format_currency, format_percent};
use crate::models::{CalculatorKind, TaxData, TaxInput, TaxResult};
use crate::validation::validate_tax;
use crate::Result;

pub struct TaxEstimator;

fn state_code(input: &TaxInput) -> Option<String> {
    input
        .state
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
}

impl Calculator for TaxEstimator {
    type Input = TaxInput;
    type Output = TaxResult;

    const KIND: CalculatorKind = CalculatorKind::Tax;

    fn validate(input: &TaxInput) -> Result<()> {
        validate_tax(input)
    }

    fn render(input: &TaxInput, data: Option<&TaxData>) -> WidgetView {
        let mut view = WidgetView::new(Self::KIND, "📊", "Tax Estimator (2024)");

        view.inputs = vec![
            LabeledValue::new("Gross Income", format_currency(input.gross_income)),
            LabeledValue::new("Filing Status", input.filing_status.to_string()),
            LabeledValue::new("Deductions", format_currency(input.deductions)),
        ];
        if let Some(state) = state_code(input) {
            view.inputs.push(LabeledValue::new("State", state));
        }

        let Some(data) = data else {
            return view;
        };
        let (input, result) = (&data.input, &data.result);

        view.highlight = Some(LabeledValue::new(
            "Take-Home Pay",
            format_currency(result.take_home_pay),
        ));

        view.breakdown = Some(Breakdown {
            title: "Income Breakdown".to_string(),
            segments: vec![
                BarSegment {
                    class: "take-home".to_string(),
                    legend: format!("Take Home: {}", format_currency(result.take_home_pay)),
                    percent: percent_of(result.take_home_pay, input.gross_income),
                },
                BarSegment {
                    class: "tax".to_string(),
                    legend: format!("Total Tax: {}", format_currency(result.total_tax)),
                    percent: percent_of(result.total_tax, input.gross_income),
                },
            ],
        });

        view.totals = vec![
            LabeledValue::new("Taxable Income", format_currency(result.taxable_income)),
            LabeledValue::new("Federal Tax", format_currency(result.federal_tax)),
        ];
        if result.state_tax > 0.0 {
            let label = match state_code(input) {
                Some(state) => format!("State Tax ({})", state),
                None => "State Tax".to_string(),
            };
            view.totals.push(LabeledValue::new(label, format_currency(result.state_tax)));
        }
        view.totals.push(LabeledValue::new(
            "Effective Tax Rate",
            format_percent(result.effective_rate),
        ));

        view
    }
}
