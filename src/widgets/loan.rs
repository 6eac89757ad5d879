//! Loan payment widget

use super::{percent_of, BarSegment, Breakdown, Calculator, LabeledValue, WidgetView};
use crate::format::{format_currency, format_percent};
use crate::models::{CalculatorKind, LoanData, LoanInput, LoanResult};
use crate::validation::validate_loan;
use crate::Result;

const MONTHS_PER_YEAR: u64 = 12;

pub struct LoanCalculator;

impl Calculator for LoanCalculator {
    type Input = LoanInput;
    type Output = LoanResult;

    const KIND: CalculatorKind = CalculatorKind::Loan;

    fn validate(input: &LoanInput) -> Result<()> {
        validate_loan(input)
    }

    fn render(input: &LoanInput, data: Option<&LoanData>) -> WidgetView {
        let mut view = WidgetView::new(Self::KIND, "🏠", "Loan Payment Calculator");

        view.inputs = vec![
            LabeledValue::new("Loan Amount", format_currency(input.principal)),
            LabeledValue::new("Interest Rate", format!("{} APR", format_percent(input.annual_rate))),
            LabeledValue::new("Loan Term", format!("{} years", input.years)),
        ];

        let Some(data) = data else {
            return view;
        };
        let (input, result) = (&data.input, &data.result);

        view.highlight = Some(LabeledValue::new(
            "Monthly Payment",
            format_currency(result.monthly_payment),
        ));

        view.breakdown = Some(Breakdown {
            title: "Payment Breakdown".to_string(),
            segments: vec![
                BarSegment {
                    class: "principal".to_string(),
                    legend: format!("Principal: {}", format_currency(input.principal)),
                    percent: percent_of(input.principal, result.total_payment),
                },
                BarSegment {
                    class: "interest".to_string(),
                    legend: format!("Interest: {}", format_currency(result.total_interest)),
                    percent: percent_of(result.total_interest, result.total_payment),
                },
            ],
        });

        view.totals = vec![LabeledValue::new(
            format!("Total of {} Payments", u64::from(input.years) * MONTHS_PER_YEAR),
            format_currency(result.total_payment),
        )];

        view
    }
}
