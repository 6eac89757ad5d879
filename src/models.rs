//! Core data models for the calculator widgets
//!
//! Field names follow the calculation service's camelCase JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CalculatorKind {
    Loan,
    Compound,
    Tax,
}

impl CalculatorKind {
    /// Name of the remote tool backing this calculator
    pub fn tool_name(&self) -> &'static str {
        match self {
            CalculatorKind::Loan => "calculate_loan_payment",
            CalculatorKind::Compound => "calculate_compound_interest",
            CalculatorKind::Tax => "estimate_taxes",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    MarriedJoint,
    MarriedSeparate,
    HeadOfHousehold,
}

//
// ================= Widget Data =================
//

/// Input/result pair as returned in `structuredContent` and as injected
/// into a standalone widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WidgetData<I, R> {
    pub input: I,
    pub result: R,
}

//
// ================= Projection =================
//

fn default_compounding_frequency() -> u32 {
    12
}

/// Compound-interest input. Also the tool arguments for
/// `calculate_compound_interest`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionInput {
    pub principal: f64,
    #[serde(rename = "annualRate")]
    pub annual_rate_percent: f64,
    pub years: u32,
    #[serde(default = "default_compounding_frequency")]
    pub compounding_frequency: u32,
    #[serde(default)]
    pub monthly_contribution: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProjectionPoint {
    pub year: u32,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompoundResult {
    pub future_value: f64,
    pub total_contributions: f64,
    pub total_interest_earned: f64,
    pub effective_annual_rate: f64,
}

//
// ================= Loan =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoanInput {
    pub principal: f64,
    pub annual_rate: f64,
    pub years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoanResult {
    pub monthly_payment: f64,
    pub total_payment: f64,
    pub total_interest: f64,
}

//
// ================= Tax =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaxInput {
    pub gross_income: f64,
    pub filing_status: FilingStatus,
    #[serde(default)]
    pub deductions: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    pub federal_tax: f64,
    pub state_tax: f64,
    pub total_tax: f64,
    pub effective_rate: f64,
    pub take_home_pay: f64,
    pub taxable_income: f64,
}

pub type LoanData = WidgetData<LoanInput, LoanResult>;
pub type CompoundData = WidgetData<ProjectionInput, CompoundResult>;
pub type TaxData = WidgetData<TaxInput, TaxResult>;

impl fmt::Display for CalculatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CalculatorKind::Loan => "Loan",
            CalculatorKind::Compound => "Investment",
            CalculatorKind::Tax => "Taxes",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilingStatus::Single => "Single",
            FilingStatus::MarriedJoint => "Married Filing Jointly",
            FilingStatus::MarriedSeparate => "Married Filing Separately",
            FilingStatus::HeadOfHousehold => "Head of Household",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_input_defaults() {
        let input: ProjectionInput = serde_json::from_value(serde_json::json!({
            "principal": 5000,
            "annualRate": 4.5,
            "years": 10
        }))
        .unwrap();

        assert_eq!(input.compounding_frequency, 12);
        assert_eq!(input.monthly_contribution, 0.0);
        assert_eq!(input.annual_rate_percent, 4.5);
    }

    #[test]
    fn test_tax_input_wire_names() {
        let input = TaxInput {
            gross_income: 150000.0,
            filing_status: FilingStatus::MarriedJoint,
            deductions: 0.0,
            state: None,
        };

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["grossIncome"], 150000.0);
        assert_eq!(json["filingStatus"], "married_joint");
        assert!(json.get("state").is_none());
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(CalculatorKind::Loan.tool_name(), "calculate_loan_payment");
        assert_eq!(CalculatorKind::Tax.tool_name(), "estimate_taxes");
        assert_eq!(CalculatorKind::Compound.to_string(), "Investment");
    }
}
