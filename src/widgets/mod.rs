//! Presentation layer
//!
//! Each calculator turns its input and (optionally) its last result into
//! a `WidgetView`: a plain layout model of summaries, bars and totals that
//! any rendering surface can draw. `Display` gives a text rendering.

use crate::models::{CalculatorKind, WidgetData};
use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod compound;
pub mod loan;
pub mod tax;

pub use compound::CompoundCalculator;
pub use loan::LoanCalculator;
pub use tax::TaxEstimator;

/// Width in characters of text-rendered bars
const TEXT_BAR_WIDTH: usize = 40;

/// One calculator widget: its remote tool, its input checks, its layout
pub trait Calculator: Send + Sync + 'static {
    type Input: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static;
    type Output: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static;

    const KIND: CalculatorKind;

    fn validate(input: &Self::Input) -> Result<()>;

    fn render(
        input: &Self::Input,
        data: Option<&WidgetData<Self::Input, Self::Output>>,
    ) -> WidgetView;
}

//
// ================= View Model =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabeledValue {
    pub label: String,
    pub value: String,
}

impl LabeledValue {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A slice of a horizontal percentage bar, with its legend text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BarSegment {
    pub class: String,
    pub legend: String,
    /// Share of the bar, 0..=100
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Breakdown {
    pub title: String,
    pub segments: Vec<BarSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartBar {
    pub year: u32,
    /// Height relative to the tallest bar, 0..=100
    pub height_percent: f64,
    pub tooltip: String,
    /// Value printed on the bar, only set on the last one
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthChart {
    pub title: String,
    pub bars: Vec<ChartBar>,
    pub axis_start: String,
    pub axis_end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase", tag = "state", content = "message")]
pub enum ViewStatus {
    Idle,
    Loading,
    Error(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WidgetView {
    pub kind: CalculatorKind,
    pub icon: String,
    pub title: String,
    pub inputs: Vec<LabeledValue>,
    pub highlight: Option<LabeledValue>,
    pub growth_chart: Option<GrowthChart>,
    pub breakdown: Option<Breakdown>,
    pub totals: Vec<LabeledValue>,
    pub status: ViewStatus,
}

impl WidgetView {
    pub fn new(kind: CalculatorKind, icon: &str, title: &str) -> Self {
        Self {
            kind,
            icon: icon.to_string(),
            title: title.to_string(),
            inputs: Vec::new(),
            highlight: None,
            growth_chart: None,
            breakdown: None,
            totals: Vec::new(),
            status: ViewStatus::Idle,
        }
    }

    pub fn with_status(mut self, status: ViewStatus) -> Self {
        self.status = status;
        self
    }
}

/// `part` as a percentage of `whole`, clamped to 0..=100.
/// A zero or non-finite whole yields 0.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 || !whole.is_finite() || !part.is_finite() {
        return 0.0;
    }
    (part / whole * 100.0).clamp(0.0, 100.0)
}

//
// ================= Text Rendering =================
//

impl fmt::Display for WidgetView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.icon, self.title)?;
        writeln!(f)?;

        for item in &self.inputs {
            writeln!(f, "  {:<24} {}", item.label, item.value)?;
        }

        match &self.status {
            ViewStatus::Idle => {}
            ViewStatus::Loading => {
                writeln!(f)?;
                writeln!(f, "  Calculating...")?;
            }
            ViewStatus::Error(message) => {
                writeln!(f)?;
                writeln!(f, "  ! {}", message)?;
            }
        }

        if let Some(highlight) = &self.highlight {
            writeln!(f)?;
            writeln!(f, "  {}: {}", highlight.label, highlight.value)?;
        }

        if let Some(chart) = &self.growth_chart {
            writeln!(f)?;
            writeln!(f, "  {}", chart.title)?;
            for bar in &chart.bars {
                let filled = scaled_width(bar.height_percent);
                write!(f, "  {:>4} |{}", bar.year, "█".repeat(filled))?;
                if let Some(label) = &bar.label {
                    write!(f, " {}", label)?;
                }
                writeln!(f)?;
            }
            writeln!(f, "  {} .. {}", chart.axis_start, chart.axis_end)?;
        }

        if let Some(breakdown) = &self.breakdown {
            writeln!(f)?;
            writeln!(f, "  {}", breakdown.title)?;

            let fills = ['█', '░', '▒', '▓'];
            let mut bar = String::new();
            for (i, segment) in breakdown.segments.iter().enumerate() {
                let fill = fills[i % fills.len()];
                bar.extend(std::iter::repeat(fill).take(scaled_width(segment.percent)));
            }
            writeln!(f, "  [{}]", bar)?;

            for segment in &breakdown.segments {
                writeln!(f, "  - {} ({:.1}%)", segment.legend, segment.percent)?;
            }
        }

        if !self.totals.is_empty() {
            writeln!(f)?;
            for item in &self.totals {
                writeln!(f, "  {:<24} {}", item.label, item.value)?;
            }
        }

        Ok(())
    }
}

fn scaled_width(percent: f64) -> usize {
    ((percent.clamp(0.0, 100.0) / 100.0) * TEXT_BAR_WIDTH as f64).round() as usize
}
