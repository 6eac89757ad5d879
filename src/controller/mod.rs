//! Calculator controller
//!
//! Drives one widget: validates the form, negotiates a session, invokes
//! the calculator's tool and feeds every step into the state reducer.
//!
//! VALIDATE → START → OPEN SESSION → INVOKE → SUCCEED | FAIL

use crate::client::{call_tool, ToolService};
use crate::models::WidgetData;
use crate::state::{CalculationId, WidgetEvent, WidgetState};
use crate::widgets::{Calculator, ViewStatus, WidgetView};
use crate::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

type State<C> = WidgetState<<C as Calculator>::Input, <C as Calculator>::Output>;

/// Owns the displayed state of one calculator widget.
/// Clones share the same state and service.
pub struct CalculatorController<C: Calculator> {
    service: Arc<dyn ToolService>,
    state: Arc<RwLock<State<C>>>,
}

impl<C: Calculator> Clone for CalculatorController<C> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            state: Arc::clone(&self.state),
        }
    }
}

/// Withdraws a started calculation when `calculate` is dropped before
/// its completion has been recorded.
struct InFlightGuard<C: Calculator> {
    state: Arc<RwLock<State<C>>>,
    id: Option<CalculationId>,
}

impl<C: Calculator> InFlightGuard<C> {
    fn disarm(mut self) {
        self.id = None;
    }
}

impl<C: Calculator> Drop for InFlightGuard<C> {
    fn drop(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        debug!(kind = %C::KIND, %id, "Calculation dropped before completion");

        let event = WidgetEvent::CalculationCancelled(id);
        match self.state.try_write() {
            Ok(mut guard) => {
                let next = guard.clone().reduce(event);
                *guard = next;
            }
            Err(_) => {
                // Lock is busy; finish the withdrawal on the runtime
                let state = Arc::clone(&self.state);
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    handle.spawn(async move {
                        let mut guard = state.write().await;
                        let next = guard.clone().reduce(event);
                        *guard = next;
                    });
                }
            }
        }
    }
}

impl<C: Calculator> CalculatorController<C> {
    pub fn new(service: Arc<dyn ToolService>, input: C::Input) -> Self {
        Self::with_state(service, WidgetState::new(input))
    }

    pub fn with_state(service: Arc<dyn ToolService>, state: State<C>) -> Self {
        Self {
            service,
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> State<C> {
        self.state.read().await.clone()
    }

    pub async fn set_input(&self, input: C::Input) {
        self.dispatch(WidgetEvent::InputChanged(input)).await;
    }

    async fn dispatch(&self, event: WidgetEvent<C::Input, C::Output>) {
        let mut guard = self.state.write().await;
        let next = guard.clone().reduce(event);
        *guard = next;
    }

    /// Run one calculation for the current input.
    ///
    /// Failures are recorded in the state for display and also returned.
    /// A previously displayed result is never cleared by a failure.
    /// Dropping the future withdraws the calculation without an error.
    pub async fn calculate(&self) -> Result<WidgetData<C::Input, C::Output>> {
        let input = self.state.read().await.input.clone();

        if let Err(e) = C::validate(&input) {
            debug!(kind = %C::KIND, error = %e, "Input rejected");
            self.dispatch(WidgetEvent::InputRejected(e.user_message())).await;
            return Err(e);
        }

        let id = Uuid::new_v4();
        self.dispatch(WidgetEvent::CalculationStarted(id)).await;
        let in_flight = InFlightGuard::<C> {
            state: Arc::clone(&self.state),
            id: Some(id),
        };
        info!(kind = %C::KIND, %id, "Calculation started");

        let outcome = self.run(&input).await;

        match &outcome {
            Ok(data) => {
                info!(kind = %C::KIND, %id, "Calculation succeeded");
                self.dispatch(WidgetEvent::CalculationSucceeded {
                    id,
                    data: data.clone(),
                })
                .await;
            }
            Err(e) => {
                warn!(kind = %C::KIND, %id, error = %e, "Calculation failed");
                self.dispatch(WidgetEvent::CalculationFailed {
                    id,
                    message: e.user_message(),
                })
                .await;
            }
        }
        in_flight.disarm();

        outcome
    }

    async fn run(&self, input: &C::Input) -> Result<WidgetData<C::Input, C::Output>> {
        let session = self.service.open_session().await?;
        call_tool(self.service.as_ref(), &session, C::KIND.tool_name(), input).await
    }

    /// Layout for the current state
    pub async fn view(&self) -> WidgetView {
        let state = self.state.read().await;

        let status = if state.is_loading() {
            ViewStatus::Loading
        } else if let Some(message) = &state.error {
            ViewStatus::Error(message.clone())
        } else {
            ViewStatus::Idle
        };

        C::render(&state.input, state.result.as_ref()).with_status(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{McpClient, SessionHandle, StructuredResult};
    use crate::config::ClientConfig;
    use crate::error::WidgetError;
    use crate::models::{LoanInput, ProjectionInput};
    use crate::mount::{FALLBACK_COMPOUND_DATA, FALLBACK_LOAN_DATA};
    use crate::widgets::{CompoundCalculator, LoanCalculator};
    use axum::routing::get;
    use axum::Router;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn loan_result(input: &Value) -> Value {
        let principal = input["principal"].as_f64().unwrap_or(0.0);
        json!({
            "monthlyPayment": principal / 100.0,
            "totalPayment": principal * 2.0,
            "totalInterest": principal
        })
    }

    /// Echoes the arguments back with a canned result
    struct EchoService {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ToolService for EchoService {
        async fn open_session(&self) -> Result<SessionHandle> {
            Ok(SessionHandle::new("echo", "http://localhost/mcp/messages?sessionId=echo"))
        }

        async fn invoke(
            &self,
            _session: &SessionHandle,
            tool_name: &str,
            arguments: Value,
        ) -> Result<StructuredResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(tool_name, "calculate_loan_payment");
            Ok(StructuredResult {
                structured_content: json!({"result": loan_result(&arguments), "input": arguments}),
                content: vec![],
            })
        }
    }

    /// Never completes a handshake
    struct OfflineService;

    #[async_trait::async_trait]
    impl ToolService for OfflineService {
        async fn open_session(&self) -> Result<SessionHandle> {
            Err(WidgetError::Connection("Connection timeout".to_string()))
        }

        async fn invoke(&self, _: &SessionHandle, _: &str, _: Value) -> Result<StructuredResult> {
            unreachable!("no session was opened")
        }
    }

    /// Opens sessions but never answers a call
    struct HangingService;

    #[async_trait::async_trait]
    impl ToolService for HangingService {
        async fn open_session(&self) -> Result<SessionHandle> {
            Ok(SessionHandle::new("hang", "http://localhost/mcp/messages?sessionId=hang"))
        }

        async fn invoke(&self, _: &SessionHandle, _: &str, _: Value) -> Result<StructuredResult> {
            std::future::pending::<Result<StructuredResult>>().await
        }
    }

    /// Holds each call until the test releases it, keyed by principal
    struct GatedService {
        gates: Mutex<HashMap<u64, oneshot::Receiver<()>>>,
    }

    #[async_trait::async_trait]
    impl ToolService for GatedService {
        async fn open_session(&self) -> Result<SessionHandle> {
            Ok(SessionHandle::new("gated", "http://localhost/mcp/messages?sessionId=gated"))
        }

        async fn invoke(&self, _: &SessionHandle, _: &str, arguments: Value) -> Result<StructuredResult> {
            let key = arguments["principal"].as_f64().unwrap_or(0.0) as u64;
            let gate = self.gates.lock().unwrap().remove(&key).expect("gate registered");
            gate.await.map_err(|_| WidgetError::Connection("gate dropped".to_string()))?;

            Ok(StructuredResult {
                structured_content: json!({"result": loan_result(&arguments), "input": arguments}),
                content: vec![],
            })
        }
    }

    fn loan(principal: f64) -> LoanInput {
        LoanInput { principal, annual_rate: 6.5, years: 30 }
    }

    #[tokio::test]
    async fn test_successful_calculation() {
        let service = Arc::new(EchoService { calls: AtomicUsize::new(0) });
        let controller = CalculatorController::<LoanCalculator>::new(service.clone(), loan(200000.0));

        let data = tokio_test::assert_ok!(controller.calculate().await);
        assert_eq!(data.result.monthly_payment, 2000.0);

        let state = controller.state().await;
        assert_eq!(state.result.unwrap().input, loan(200000.0));
        assert!(state.in_flight.is_empty());
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);

        let view = controller.view().await;
        assert_eq!(view.status, ViewStatus::Idle);
        assert_eq!(view.highlight.unwrap().value, "$2,000.00");
    }

    #[tokio::test]
    async fn test_connection_failure_keeps_displayed_result() {
        let state = WidgetState::with_result(FALLBACK_LOAN_DATA.clone());
        let controller = CalculatorController::<LoanCalculator>::with_state(Arc::new(OfflineService), state);

        let result = controller.calculate().await;
        assert!(matches!(result, Err(WidgetError::Connection(_))));

        let state = controller.state().await;
        assert_eq!(state.result.as_ref(), Some(&*FALLBACK_LOAN_DATA));
        assert_eq!(state.error.as_deref(), Some("Failed to connect: Connection timeout"));

        let view = controller.view().await;
        assert_eq!(view.status, ViewStatus::Error("Failed to connect: Connection timeout".to_string()));
        assert_eq!(view.highlight.unwrap().value, "$1,896.20");
    }

    #[tokio::test]
    async fn test_handshake_timeout_keeps_displayed_result() {
        let router = Router::new().route(
            "/mcp",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                ""
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let config = ClientConfig::new(format!("http://{}", addr))
            .with_handshake_timeout(Duration::from_millis(100));
        let client = McpClient::new(config).unwrap();
        let controller = CalculatorController::<LoanCalculator>::with_state(
            Arc::new(client),
            WidgetState::with_result(FALLBACK_LOAN_DATA.clone()),
        );

        let result = controller.calculate().await;
        assert!(matches!(result, Err(WidgetError::Connection(ref msg)) if msg == "Connection timeout"));

        let state = controller.state().await;
        assert!(!state.is_loading());
        assert_eq!(state.result.as_ref(), Some(&*FALLBACK_LOAN_DATA));
        assert_eq!(state.error.as_deref(), Some("Failed to connect: Connection timeout"));
    }

    #[tokio::test]
    async fn test_dropped_calculation_stops_loading() {
        let controller = CalculatorController::<LoanCalculator>::with_state(
            Arc::new(HangingService),
            WidgetState::with_result(FALLBACK_LOAN_DATA.clone()),
        );

        let outcome = tokio::time::timeout(Duration::from_millis(50), controller.calculate()).await;
        assert!(outcome.is_err());

        let state = controller.state().await;
        assert!(!state.is_loading());
        assert!(state.error.is_none());
        assert_eq!(state.result.as_ref(), Some(&*FALLBACK_LOAN_DATA));
        assert_eq!(controller.view().await.status, ViewStatus::Idle);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_service() {
        let service = Arc::new(EchoService { calls: AtomicUsize::new(0) });
        let controller = CalculatorController::<LoanCalculator>::new(service.clone(), loan(-5.0));

        let result = controller.calculate().await;
        assert!(matches!(result, Err(WidgetError::Validation(_))));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);

        let state = controller.state().await;
        assert_eq!(state.error.as_deref(), Some("Principal must be positive"));
        assert!(state.in_flight.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_order_completion_last_completed_wins() {
        let (release_first, first_gate) = oneshot::channel();
        let (release_second, second_gate) = oneshot::channel();
        let service = Arc::new(GatedService {
            gates: Mutex::new(HashMap::from([(100000, first_gate), (200000, second_gate)])),
        });
        let controller = CalculatorController::<LoanCalculator>::new(service, loan(100000.0));

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.calculate().await })
        };
        wait_for_in_flight(&controller, 1).await;

        controller.set_input(loan(200000.0)).await;
        let second = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.calculate().await })
        };
        wait_for_in_flight(&controller, 2).await;

        release_second.send(()).unwrap();
        second.await.unwrap().unwrap();

        let state = controller.state().await;
        assert!(state.is_loading());
        assert_eq!(state.result.as_ref().unwrap().input.principal, 200000.0);

        release_first.send(()).unwrap();
        first.await.unwrap().unwrap();

        let state = controller.state().await;
        assert!(!state.is_loading());
        assert_eq!(state.result.as_ref().unwrap().input.principal, 100000.0);
        assert_eq!(state.input.principal, 200000.0);
    }

    #[tokio::test]
    async fn test_compound_view_renders_before_any_result() {
        let controller = CalculatorController::<CompoundCalculator>::new(
            Arc::new(OfflineService),
            FALLBACK_COMPOUND_DATA.input,
        );

        let view = controller.view().await;
        assert!(view.growth_chart.is_some());
        assert!(view.highlight.is_none());

        controller
            .set_input(ProjectionInput { years: 5, ..FALLBACK_COMPOUND_DATA.input })
            .await;
        let view = controller.view().await;
        assert_eq!(view.growth_chart.unwrap().bars.len(), 6);
    }

    async fn wait_for_in_flight(controller: &CalculatorController<LoanCalculator>, count: usize) {
        for _ in 0..1000 {
            if controller.state().await.in_flight.len() == count {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("expected {} calculations in flight", count);
    }
}
