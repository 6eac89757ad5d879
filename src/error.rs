//! Error types for the calculator widgets

use thiserror::Error;

/// Result type alias for widget operations
pub type Result<T> = std::result::Result<T, WidgetError>;

#[derive(Error, Debug)]
pub enum WidgetError {

    // =============================
    // Widget Errors
    // =============================

    /// Input outside the allowed numeric range. Raised by callers before
    /// the projection engine or the remote service is involved.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Session negotiation timed out or the transport failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The calculation service answered with an error envelope.
    #[error("Remote error: {0}")]
    Remote(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl WidgetError {
    /// Message shown to the user in place of a result.
    pub fn user_message(&self) -> String {
        match self {
            WidgetError::Validation(msg) => msg.clone(),
            WidgetError::Connection(msg) => format!("Failed to connect: {}", msg),
            WidgetError::Remote(msg) => msg.clone(),
            other => format!("Calculation failed: {}", other),
        }
    }
}
