use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use crate::core::agent::AgentInvoker;
use crate::core::model::WorkflowResponse;

// One request lane per console operation. A lane owns exactly one
// (loading, result, error) triple; triples never cross lanes. Triggering a
// lane that is already in flight races last-writer-wins, with no
// cancellation of the superseded call.

const GENERIC_FAILURE: &str = "An unexpected error occurred";

/// Reference-counted busy indicator shared by every lane. Each in-flight
/// invocation holds a guard, so overlapping lanes cannot clear the
/// indicator early.
#[derive(Debug, Clone, Default)]
pub struct BusyGauge(Arc<AtomicUsize>);

impl BusyGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self) -> BusyGuard {
        self.0.fetch_add(1, Ordering::SeqCst);
        BusyGuard(Arc::clone(&self.0))
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::SeqCst) > 0
    }
}

pub struct BusyGuard(Arc<AtomicUsize>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Input half of a lane: builds the deterministic agent instruction, or
/// returns `None` when required fields are missing (the trigger is then a
/// silent no-op).
pub trait LaneIntent: Send + Sync {
    fn instruction(&self) -> Option<String>;
    fn fallback_error() -> &'static str;
}

/// Submit-form field set. All fields are free text at this layer; the agent
/// interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurchaseOrderForm {
    pub requester: String,
    pub department: String,
    pub amount: String,
    pub vendor: String,
    pub vendor_status: String,
    pub description: String,
    pub priority: String,
    pub category: String,
}

pub struct SubmitIntent(pub PurchaseOrderForm);

impl LaneIntent for SubmitIntent {
    fn instruction(&self) -> Option<String> {
        let form = &self.0;
        if form.requester.trim().is_empty()
            || form.department.trim().is_empty()
            || form.amount.trim().is_empty()
        {
            return None;
        }
        Some(format!(
            "Submit a new Purchase Order with the following details:\n\
             Requester: {}\n\
             Department: {}\n\
             Amount: ${}\n\
             Vendor: {}\n\
             Vendor Status: {}\n\
             Description: {}\n\
             Priority: {}\n\
             Category: {}",
            form.requester,
            form.department,
            form.amount,
            form.vendor,
            form.vendor_status,
            form.description,
            form.priority,
            form.category,
        ))
    }

    fn fallback_error() -> &'static str {
        "Failed to submit PO"
    }
}

pub struct StatusIntent {
    pub query: String,
}

impl LaneIntent for StatusIntent {
    fn instruction(&self) -> Option<String> {
        let query = self.query.trim();
        if query.is_empty() {
            return None;
        }
        Some(format!("Check the status of Purchase Order: {query}"))
    }

    fn fallback_error() -> &'static str {
        "Failed to check status"
    }
}

pub struct DashboardIntent;

impl LaneIntent for DashboardIntent {
    fn instruction(&self) -> Option<String> {
        Some(
            "Show the dashboard summary of all purchase orders including department \
             breakdown, pending counts, and total amounts."
                .to_string(),
        )
    }

    fn fallback_error() -> &'static str {
        "Failed to load dashboard"
    }
}

pub struct ReminderIntent;

impl LaneIntent for ReminderIntent {
    fn instruction(&self) -> Option<String> {
        Some(
            "Review all pending purchase orders and send reminder notifications to \
             approvers who have POs pending for more than 24 hours. List all pending \
             POs with their current approval status, pending approver details, and \
             days waiting."
                .to_string(),
        )
    }

    fn fallback_error() -> &'static str {
        "Failed to check reminders"
    }
}

#[derive(Debug, Default)]
struct LaneState {
    loading: bool,
    result: Option<WorkflowResponse>,
    error: Option<String>,
}

/// Point-in-time copy of a lane's triple for the render path.
#[derive(Debug, Clone, Default)]
pub struct LaneSnapshot {
    pub loading: bool,
    pub result: Option<WorkflowResponse>,
    pub error: Option<String>,
}

pub struct Lane<I> {
    state: Arc<Mutex<LaneState>>,
    _intent: PhantomData<fn(I)>,
}

impl<I> Clone for Lane<I> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            _intent: PhantomData,
        }
    }
}

impl<I> Default for Lane<I> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(LaneState::default())),
            _intent: PhantomData,
        }
    }
}

impl<I: LaneIntent> Lane<I> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LaneState> {
        // Display state stays usable even if a writer panicked mid-update.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs one invocation through the lane protocol. Missing required
    /// input is a silent no-op that leaves the triple and the busy gauge
    /// untouched. Otherwise: loading set and both outcomes cleared, one
    /// adapter call, then exactly one of result/error installed and loading
    /// cleared, with the busy guard released regardless of outcome.
    pub async fn trigger(
        &self,
        intent: &I,
        invoker: &dyn AgentInvoker,
        agent_id: &str,
        busy: &BusyGauge,
    ) {
        let Some(instruction) = intent.instruction() else {
            return;
        };

        {
            let mut state = self.lock();
            state.loading = true;
            state.result = None;
            state.error = None;
        }
        let _busy = busy.acquire();

        let outcome = invoker.invoke(&instruction, agent_id).await;

        let mut state = self.lock();
        match outcome {
            Ok(reply) => {
                let inner_ok =
                    reply.success && reply.response.as_ref().is_some_and(|r| r.is_success());
                if inner_ok {
                    state.result = reply.response.and_then(|r| r.result);
                } else {
                    let message = reply
                        .response
                        .and_then(|r| r.message)
                        .filter(|m| !m.is_empty())
                        .or_else(|| reply.error.filter(|e| !e.is_empty()))
                        .unwrap_or_else(|| I::fallback_error().to_string());
                    warn!("agent reported failure: {message}");
                    state.error = Some(message);
                }
            }
            Err(err) => {
                let text = err.to_string();
                warn!("agent invocation failed: {text}");
                state.error = Some(if text.is_empty() {
                    GENERIC_FAILURE.to_string()
                } else {
                    text
                });
            }
        }
        state.loading = false;
    }

    pub fn snapshot(&self) -> LaneSnapshot {
        let state = self.lock();
        LaneSnapshot {
            loading: state.loading,
            result: state.result.clone(),
            error: state.error.clone(),
        }
    }

    /// Installs a canned result (sample-data toggle). Loading is left alone.
    pub fn put_result(&self, result: WorkflowResponse) {
        self.lock().result = Some(result);
    }

    pub fn clear_result(&self) {
        self.lock().result = None;
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agent::{AgentResponse, InvokeReply};
    use anyhow::anyhow;
    use async_trait::async_trait;

    struct StubInvoker {
        reply: Option<InvokeReply>,
        transport_error: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl StubInvoker {
        fn replying(reply: InvokeReply) -> Self {
            Self {
                reply: Some(reply),
                transport_error: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: None,
                transport_error: Some(message.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl AgentInvoker for StubInvoker {
        async fn invoke(&self, instruction: &str, _agent_id: &str) -> anyhow::Result<InvokeReply> {
            self.calls.lock().unwrap().push(instruction.to_string());
            match &self.transport_error {
                Some(message) => Err(anyhow!("{message}")),
                None => Ok(self.reply.clone().unwrap_or_default()),
            }
        }
    }

    fn inner_success(result: WorkflowResponse) -> InvokeReply {
        InvokeReply {
            success: true,
            response: Some(AgentResponse {
                status: Some("success".into()),
                result: Some(result),
                message: None,
            }),
            error: None,
        }
    }

    fn payload(message: &str) -> WorkflowResponse {
        WorkflowResponse {
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    fn filled_form() -> PurchaseOrderForm {
        PurchaseOrderForm {
            requester: "Sarah Chen".into(),
            department: "IT".into(),
            amount: "24500".into(),
            vendor: "Dell Technologies".into(),
            vendor_status: "preferred".into(),
            description: "Laptops".into(),
            priority: "high".into(),
            category: "hardware".into(),
        }
    }

    #[tokio::test]
    async fn missing_required_input_is_a_silent_no_op() {
        let lane: Lane<SubmitIntent> = Lane::new();
        lane.put_result(payload("existing"));
        let busy = BusyGauge::new();
        let stub = StubInvoker::replying(inner_success(payload("new")));

        let mut form = filled_form();
        form.requester = "   ".into();
        lane.trigger(&SubmitIntent(form), &stub, "agent-1", &busy).await;

        let snap = lane.snapshot();
        assert_eq!(stub.call_count(), 0);
        assert!(!snap.loading);
        assert_eq!(snap.result, Some(payload("existing")));
        assert!(snap.error.is_none());
        assert!(!busy.is_busy());
    }

    #[tokio::test]
    async fn blank_status_query_is_a_silent_no_op() {
        let lane: Lane<StatusIntent> = Lane::new();
        let busy = BusyGauge::new();
        let stub = StubInvoker::replying(inner_success(payload("x")));

        lane.trigger(&StatusIntent { query: "  ".into() }, &stub, "agent-1", &busy)
            .await;

        assert_eq!(stub.call_count(), 0);
        assert!(lane.snapshot().result.is_none());
    }

    #[tokio::test]
    async fn inner_success_exposes_the_payload_unchanged() {
        let lane: Lane<DashboardIntent> = Lane::new();
        let busy = BusyGauge::new();
        let expected = payload("dashboard ready");
        let stub = StubInvoker::replying(inner_success(expected.clone()));

        lane.trigger(&DashboardIntent, &stub, "agent-1", &busy).await;

        let snap = lane.snapshot();
        assert_eq!(snap.result, Some(expected));
        assert!(snap.error.is_none());
        assert!(!snap.loading);
        assert!(!busy.is_busy());
    }

    #[tokio::test]
    async fn remote_failure_prefers_the_inner_message() {
        let lane: Lane<ReminderIntent> = Lane::new();
        let busy = BusyGauge::new();
        let stub = StubInvoker::replying(InvokeReply {
            success: true,
            response: Some(AgentResponse {
                status: Some("error".into()),
                result: None,
                message: Some("quota exhausted".into()),
            }),
            error: Some("transport detail".into()),
        });

        lane.trigger(&ReminderIntent, &stub, "agent-1", &busy).await;

        assert_eq!(lane.snapshot().error.as_deref(), Some("quota exhausted"));
    }

    #[tokio::test]
    async fn remote_failure_falls_back_to_adapter_error_then_lane_default() {
        let lane: Lane<ReminderIntent> = Lane::new();
        let busy = BusyGauge::new();

        let stub = StubInvoker::replying(InvokeReply {
            success: false,
            response: None,
            error: Some("agent unavailable".into()),
        });
        lane.trigger(&ReminderIntent, &stub, "agent-1", &busy).await;
        assert_eq!(lane.snapshot().error.as_deref(), Some("agent unavailable"));

        let stub = StubInvoker::replying(InvokeReply::default());
        lane.trigger(&ReminderIntent, &stub, "agent-1", &busy).await;
        assert_eq!(
            lane.snapshot().error.as_deref(),
            Some(ReminderIntent::fallback_error())
        );
    }

    #[tokio::test]
    async fn transport_failure_uses_the_error_text() {
        let lane: Lane<DashboardIntent> = Lane::new();
        let busy = BusyGauge::new();
        let stub = StubInvoker::failing("connection refused");

        lane.trigger(&DashboardIntent, &stub, "agent-1", &busy).await;

        let snap = lane.snapshot();
        assert_eq!(snap.error.as_deref(), Some("connection refused"));
        assert!(snap.result.is_none());
        assert!(!snap.loading);
        assert!(!busy.is_busy());
    }

    #[tokio::test]
    async fn failure_never_leaves_a_stale_result_beside_the_error() {
        let lane: Lane<DashboardIntent> = Lane::new();
        let busy = BusyGauge::new();
        lane.put_result(payload("stale"));

        let stub = StubInvoker::failing("boom");
        lane.trigger(&DashboardIntent, &stub, "agent-1", &busy).await;

        let snap = lane.snapshot();
        assert!(snap.result.is_none());
        assert!(snap.error.is_some());
    }

    #[tokio::test]
    async fn lanes_do_not_cross_contaminate() {
        let dash: Lane<DashboardIntent> = Lane::new();
        let reminders: Lane<ReminderIntent> = Lane::new();
        let busy = BusyGauge::new();

        let ok = StubInvoker::replying(inner_success(payload("dash")));
        dash.trigger(&DashboardIntent, &ok, "agent-1", &busy).await;
        let bad = StubInvoker::failing("down");
        reminders.trigger(&ReminderIntent, &bad, "agent-1", &busy).await;

        assert_eq!(dash.snapshot().result, Some(payload("dash")));
        assert!(dash.snapshot().error.is_none());
        assert!(reminders.snapshot().result.is_none());
        assert_eq!(reminders.snapshot().error.as_deref(), Some("down"));
    }

    #[test]
    fn busy_gauge_counts_overlapping_holders() {
        let busy = BusyGauge::new();
        assert!(!busy.is_busy());
        let first = busy.acquire();
        let second = busy.acquire();
        drop(first);
        assert!(busy.is_busy());
        drop(second);
        assert!(!busy.is_busy());
    }

    #[test]
    fn submit_instruction_uses_the_fixed_field_order() {
        let text = SubmitIntent(filled_form()).instruction().unwrap();
        assert_eq!(
            text,
            "Submit a new Purchase Order with the following details:\n\
             Requester: Sarah Chen\n\
             Department: IT\n\
             Amount: $24500\n\
             Vendor: Dell Technologies\n\
             Vendor Status: preferred\n\
             Description: Laptops\n\
             Priority: high\n\
             Category: hardware"
        );
    }

    #[test]
    fn status_instruction_trims_the_query() {
        let text = StatusIntent { query: "  PO-2026-00612  ".into() }
            .instruction()
            .unwrap();
        assert_eq!(text, "Check the status of Purchase Order: PO-2026-00612");
    }
}
