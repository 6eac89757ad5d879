//! Client-side growth projection
//!
//! Computes a year-by-year future-value series so the compound-interest
//! widget can draw its growth chart without waiting on the service.
//! Pure and synchronous; inputs are expected to be validated upstream.

use crate::models::{ProjectionInput, ProjectionPoint};
use serde::{Deserialize, Serialize};

const MONTHS_PER_YEAR: u32 = 12;

/// Ordered projection points, one per year starting at year 0
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ProjectionSeries {
    points: Vec<ProjectionPoint>,
}

impl ProjectionSeries {
    pub fn points(&self) -> &[ProjectionPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProjectionPoint> {
        self.points.iter()
    }

    /// Value at the last projected year
    pub fn final_value(&self) -> f64 {
        self.points.last().map(|p| p.value).unwrap_or(0.0)
    }

    /// Largest value in the series, used to scale chart bars
    pub fn max_value(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.value)
            .fold(0.0, f64::max)
    }
}

impl<'a> IntoIterator for &'a ProjectionSeries {
    type Item = &'a ProjectionPoint;
    type IntoIter = std::slice::Iter<'a, ProjectionPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Project the value of an investment for every year in `0..=years`.
///
/// The principal compounds `compounding_frequency` times a year. Monthly
/// contributions are treated as an ordinary annuity compounded monthly,
/// accumulating linearly when the rate is zero.
pub fn project(input: &ProjectionInput) -> ProjectionSeries {
    let rate = input.annual_rate_percent / 100.0;
    let n = input.compounding_frequency.max(1);
    let period_rate = rate / n as f64;
    let monthly_rate = rate / MONTHS_PER_YEAR as f64;

    let points = (0..=input.years)
        .map(|year| {
            let principal_fv = input.principal * (1.0 + period_rate).powi((n * year) as i32);

            let contribution_fv = if input.monthly_contribution > 0.0 && year > 0 {
                let months = MONTHS_PER_YEAR * year;
                if monthly_rate == 0.0 {
                    input.monthly_contribution * months as f64
                } else {
                    input.monthly_contribution
                        * (((1.0 + monthly_rate).powi(months as i32) - 1.0) / monthly_rate)
                }
            } else {
                0.0
            };

            ProjectionPoint {
                year,
                value: principal_fv + contribution_fv,
            }
        })
        .collect();

    ProjectionSeries { points }
}

/// Human label for a compounding frequency
pub fn compounding_label(frequency: u32) -> String {
    match frequency {
        1 => "annually".to_string(),
        4 => "quarterly".to_string(),
        12 => "monthly".to_string(),
        365 => "daily".to_string(),
        other => format!("{}x/year", other),
    }
}
