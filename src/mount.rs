//! Standalone widget bootstrap
//!
//! A host page may inject an `{input, result}` object for the widget to
//! display. Without one, the widget renders its named sample data.

use crate::error::WidgetError;
use crate::models::{
    CalculatorKind, CompoundData, CompoundResult, FilingStatus, LoanData, LoanInput, LoanResult,
    ProjectionInput, TaxData, TaxInput, TaxResult, WidgetData,
};
use crate::widgets::{Calculator, CompoundCalculator, LoanCalculator, TaxEstimator, WidgetView};
use crate::Result;
use lazy_static::lazy_static;
use serde_json::Value;
use tracing::{debug, info, warn};

lazy_static! {
    pub static ref FALLBACK_LOAN_DATA: LoanData = WidgetData {
        input: LoanInput {
            principal: 300000.0,
            annual_rate: 6.5,
            years: 30,
        },
        result: LoanResult {
            monthly_payment: 1896.20,
            total_payment: 682632.0,
            total_interest: 382632.0,
        },
    };

    pub static ref FALLBACK_COMPOUND_DATA: CompoundData = WidgetData {
        input: ProjectionInput {
            principal: 10000.0,
            annual_rate_percent: 7.0,
            years: 20,
            compounding_frequency: 12,
            monthly_contribution: 500.0,
        },
        result: CompoundResult {
            future_value: 282195.85,
            total_contributions: 130000.0,
            total_interest_earned: 152195.85,
            effective_annual_rate: 7.23,
        },
    };

    pub static ref FALLBACK_TAX_DATA: TaxData = WidgetData {
        input: TaxInput {
            gross_income: 150000.0,
            filing_status: FilingStatus::Single,
            deductions: 14600.0,
            state: Some("CA".to_string()),
        },
        result: TaxResult {
            federal_tax: 26798.0,
            state_tax: 12587.70,
            total_tax: 39385.70,
            effective_rate: 26.26,
            take_home_pay: 110614.30,
            taxable_income: 135400.0,
        },
    };
}

/// Render a standalone widget from injected data, or from its sample
/// data when nothing was injected. Injected input goes through the same
/// range checks as the form.
pub fn mount(kind: CalculatorKind, injected: Option<Value>) -> Result<WidgetView> {
    match kind {
        CalculatorKind::Loan => mount_with::<LoanCalculator>(injected, &*FALLBACK_LOAN_DATA),
        CalculatorKind::Compound => {
            mount_with::<CompoundCalculator>(injected, &*FALLBACK_COMPOUND_DATA)
        }
        CalculatorKind::Tax => mount_with::<TaxEstimator>(injected, &*FALLBACK_TAX_DATA),
    }
}

pub fn mount_with<C: Calculator>(
    injected: Option<Value>,
    fallback: &WidgetData<C::Input, C::Output>,
) -> Result<WidgetView> {
    let data = match injected {
        Some(value) => {
            debug!(kind = %C::KIND, "Mounting with injected data");
            let data = serde_json::from_value::<WidgetData<C::Input, C::Output>>(value)
                .map_err(|e| {
                    WidgetError::Validation(format!("Malformed {} widget data: {}", C::KIND, e))
                })?;
            C::validate(&data.input).map_err(|e| {
                warn!(kind = %C::KIND, error = %e, "Rejected injected widget data");
                WidgetError::Validation(format!("Invalid {} widget data: {}", C::KIND, e.user_message()))
            })?;
            data
        }
        None => {
            info!(kind = %C::KIND, "No widget data injected, using sample data");
            fallback.clone()
        }
    };

    Ok(C::render(&data.input, Some(&data)))
}
