//! Financial Calculator Widgets
//!
//! Embeddable calculators for loan payments, investment growth and
//! income tax estimates:
//! - Local compound-growth projection for instant charts
//! - Currency and percent formatting for display
//! - Session-oriented tool client for the remote calculation service
//! - Per-widget state reducer, controller and view layout
//!
//! WIDGET LOOP:
//! INPUT → VALIDATE → SESSION → INVOKE → REDUCE → RENDER

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod models;
pub mod mount;
pub mod projection;
pub mod state;
pub mod validation;
pub mod widgets;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use client::{call_tool, McpClient, SessionHandle, ToolService};
pub use controller::CalculatorController;
pub use format::{format_currency, format_percent, CurrencyFormat};
pub use mount::mount;
pub use projection::{project, ProjectionSeries};
