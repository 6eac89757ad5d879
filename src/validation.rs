//! Caller-side range checks
//!
//! Run before anything reaches the projection engine or the service.
//! Every violated rule is reported, joined with "; ".

use crate::error::WidgetError;
use crate::models::{LoanInput, ProjectionInput, TaxInput};
use crate::Result;

pub const MAX_INVESTMENT_YEARS: u32 = 100;
pub const MAX_COMPOUNDING_FREQUENCY: u32 = 365;
pub const MAX_INVESTMENT_RATE: f64 = 100.0;
pub const MAX_LOAN_YEARS: u32 = 50;
pub const MAX_LOAN_RATE: f64 = 30.0;

pub fn validate_projection(input: &ProjectionInput) -> Result<()> {
    let mut issues = Vec::new();

    if !input.principal.is_finite() || input.principal < 0.0 {
        issues.push("Principal must be non-negative".to_string());
    }
    if !in_range(input.annual_rate_percent, 0.0, MAX_INVESTMENT_RATE) {
        issues.push(format!(
            "Annual rate must be between 0 and {}",
            MAX_INVESTMENT_RATE
        ));
    }
    if input.years == 0 || input.years > MAX_INVESTMENT_YEARS {
        issues.push(format!("Years must be between 1 and {}", MAX_INVESTMENT_YEARS));
    }
    if input.compounding_frequency == 0 || input.compounding_frequency > MAX_COMPOUNDING_FREQUENCY {
        issues.push(format!(
            "Compounding frequency must be between 1 and {}",
            MAX_COMPOUNDING_FREQUENCY
        ));
    }
    if !input.monthly_contribution.is_finite() || input.monthly_contribution < 0.0 {
        issues.push("Monthly contribution must be non-negative".to_string());
    }

    finish(issues)
}

pub fn validate_loan(input: &LoanInput) -> Result<()> {
    let mut issues = Vec::new();

    if !input.principal.is_finite() || input.principal <= 0.0 {
        issues.push("Principal must be positive".to_string());
    }
    if !in_range(input.annual_rate, 0.0, MAX_LOAN_RATE) {
        issues.push(format!("Annual rate must be between 0 and {}", MAX_LOAN_RATE));
    }
    if input.years == 0 || input.years > MAX_LOAN_YEARS {
        issues.push(format!("Years must be between 1 and {}", MAX_LOAN_YEARS));
    }

    finish(issues)
}

pub fn validate_tax(input: &TaxInput) -> Result<()> {
    let mut issues = Vec::new();

    if !input.gross_income.is_finite() || input.gross_income < 0.0 {
        issues.push("Gross income must be non-negative".to_string());
    }
    if !input.deductions.is_finite() || input.deductions < 0.0 {
        issues.push("Deductions must be non-negative".to_string());
    }
    if let Some(state) = &input.state {
        let valid = state.len() == 2 && state.chars().all(|c| c.is_ascii_alphabetic());
        if !valid {
            issues.push(format!("Invalid state code: {}", state));
        }
    }

    finish(issues)
}

fn in_range(value: f64, min: f64, max: f64) -> bool {
    value.is_finite() && value >= min && value <= max
}

fn finish(issues: Vec<String>) -> Result<()> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(WidgetError::Validation(issues.join("; ")))
    }
}
