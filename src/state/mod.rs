//! Widget UI state
//!
//! An immutable value transitioned by discrete events. The controller
//! owns the only copy and replaces it whole on every event.
//!
//! Completion ordering is last-completed-wins: whichever in-flight
//! calculation finishes last determines what is displayed, regardless
//! of the order the calculations were started in.

use crate::models::WidgetData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Identifies one user-triggered calculation
pub type CalculationId = Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WidgetState<I, R> {
    /// Current form values
    pub input: I,
    /// Last successfully completed calculation, with the input it was run on
    pub result: Option<WidgetData<I, R>>,
    /// Calculations started but not yet completed
    pub in_flight: Vec<CalculationId>,
    /// Message from the last failure, cleared by the next start or success
    pub error: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent<I, R> {
    InputChanged(I),
    /// Input failed validation; nothing was sent
    InputRejected(String),
    CalculationStarted(CalculationId),
    CalculationSucceeded {
        id: CalculationId,
        data: WidgetData<I, R>,
    },
    CalculationFailed {
        id: CalculationId,
        message: String,
    },
    /// The caller stopped waiting; the id leaves the in-flight set silently
    CalculationCancelled(CalculationId),
}

impl<I, R> WidgetState<I, R> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            result: None,
            in_flight: Vec::new(),
            error: None,
            completed_at: None,
        }
    }

    /// Start from an already known result, e.g. injected widget data
    pub fn with_result(data: WidgetData<I, R>) -> Self
    where
        I: Clone,
    {
        Self {
            input: data.input.clone(),
            result: Some(data),
            in_flight: Vec::new(),
            error: None,
            completed_at: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Apply one event, producing the next state.
    pub fn reduce(mut self, event: WidgetEvent<I, R>) -> Self {
        match event {
            WidgetEvent::InputChanged(input) => {
                self.input = input;
            }

            WidgetEvent::InputRejected(message) => {
                self.error = Some(message);
            }

            WidgetEvent::CalculationStarted(id) => {
                if !self.in_flight.contains(&id) {
                    self.in_flight.push(id);
                }
                self.error = None;
            }

            WidgetEvent::CalculationSucceeded { id, data } => {
                if !self.complete(id) {
                    return self;
                }
                self.result = Some(data);
                self.error = None;
                self.completed_at = Some(Utc::now());
            }

            WidgetEvent::CalculationFailed { id, message } => {
                if !self.complete(id) {
                    return self;
                }
                // Prior result stays on screen
                self.error = Some(message);
            }

            WidgetEvent::CalculationCancelled(id) => {
                self.complete(id);
            }
        }

        self
    }

    /// Drop `id` from the in-flight set. Returns false for ids that were
    /// never started or already completed.
    fn complete(&mut self, id: CalculationId) -> bool {
        match self.in_flight.iter().position(|pending| *pending == id) {
            Some(idx) => {
                self.in_flight.remove(idx);
                true
            }
            None => {
                debug!(%id, "Ignoring completion for unknown calculation");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type State = WidgetState<u32, String>;

    fn data(input: u32, result: &str) -> WidgetData<u32, String> {
        WidgetData {
            input,
            result: result.to_string(),
        }
    }

    #[test]
    fn test_success_flow() {
        let id = Uuid::new_v4();
        let state = State::new(1)
            .reduce(WidgetEvent::CalculationStarted(id));
        assert!(state.is_loading());

        let state = state.reduce(WidgetEvent::CalculationSucceeded { id, data: data(1, "one") });
        assert!(!state.is_loading());
        assert_eq!(state.result, Some(data(1, "one")));
        assert!(state.completed_at.is_some());
        assert!(state.error.is_none());
    }

    #[test]
    fn test_failure_keeps_prior_result() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let state = State::new(1)
            .reduce(WidgetEvent::CalculationStarted(first))
            .reduce(WidgetEvent::CalculationSucceeded { id: first, data: data(1, "one") })
            .reduce(WidgetEvent::InputChanged(2))
            .reduce(WidgetEvent::CalculationStarted(second))
            .reduce(WidgetEvent::CalculationFailed {
                id: second,
                message: "Connection timeout".to_string(),
            });

        assert_eq!(state.input, 2);
        assert_eq!(state.result, Some(data(1, "one")));
        assert_eq!(state.error.as_deref(), Some("Connection timeout"));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_last_completed_wins() {
        let slow = Uuid::new_v4();
        let fast = Uuid::new_v4();

        let state = State::new(1)
            .reduce(WidgetEvent::CalculationStarted(slow))
            .reduce(WidgetEvent::InputChanged(2))
            .reduce(WidgetEvent::CalculationStarted(fast))
            .reduce(WidgetEvent::CalculationSucceeded { id: fast, data: data(2, "two") });

        assert!(state.is_loading());
        assert_eq!(state.result, Some(data(2, "two")));

        let state = state.reduce(WidgetEvent::CalculationSucceeded { id: slow, data: data(1, "one") });

        assert!(!state.is_loading());
        assert_eq!(state.result, Some(data(1, "one")));
    }

    #[test]
    fn test_unknown_completion_ignored() {
        let state = State::new(1);
        let before = state.clone();

        let state = state
            .reduce(WidgetEvent::CalculationSucceeded { id: Uuid::new_v4(), data: data(9, "nine") })
            .reduce(WidgetEvent::CalculationFailed { id: Uuid::new_v4(), message: "late".to_string() });

        assert_eq!(state, before);
    }

    #[test]
    fn test_cancelled_calculation_leaves_result_and_error() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        let state = State::new(1)
            .reduce(WidgetEvent::CalculationStarted(first))
            .reduce(WidgetEvent::CalculationSucceeded { id: first, data: data(1, "one") })
            .reduce(WidgetEvent::CalculationStarted(second))
            .reduce(WidgetEvent::CalculationCancelled(second));

        assert!(!state.is_loading());
        assert_eq!(state.result, Some(data(1, "one")));
        assert!(state.error.is_none());
    }

    #[test]
    fn test_start_clears_error() {
        let state = State::new(1)
            .reduce(WidgetEvent::InputRejected("Years must be between 1 and 50".to_string()));
        assert!(state.error.is_some());

        let state = state.reduce(WidgetEvent::CalculationStarted(Uuid::new_v4()));
        assert!(state.error.is_none());
    }
}
