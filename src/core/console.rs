use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;

use crate::core::agent::AgentInvoker;
use crate::core::config::ConsoleConfig;
use crate::core::lane::{
    BusyGauge, DashboardIntent, Lane, LaneSnapshot, PurchaseOrderForm, ReminderIntent,
    StatusIntent, SubmitIntent,
};
use crate::core::samples;
use crate::core::schedule::{ScheduleController, ScheduleSnapshot};
use crate::core::scheduler::SchedulerApi;

// Page controller: owns the four response lanes, the schedule controller,
// the shared busy gauge and the sample-data toggle. Cheap to clone so the
// interface layer can hand copies to spawned operations.

/// Editable input state: the submit form and the status search query.
#[derive(Debug, Clone, Default)]
pub struct ConsoleInputs {
    pub form: PurchaseOrderForm,
    pub search_query: String,
}

#[derive(Clone)]
pub struct Console {
    config: ConsoleConfig,
    invoker: Arc<dyn AgentInvoker>,
    scheduler: Arc<dyn SchedulerApi>,
    busy: BusyGauge,
    submit_lane: Lane<SubmitIntent>,
    status_lane: Lane<StatusIntent>,
    dashboard_lane: Lane<DashboardIntent>,
    reminder_lane: Lane<ReminderIntent>,
    schedule: ScheduleController,
    inputs: Arc<Mutex<ConsoleInputs>>,
    sample_data: Arc<AtomicBool>,
}

impl Console {
    pub fn new(
        config: ConsoleConfig,
        invoker: Arc<dyn AgentInvoker>,
        scheduler: Arc<dyn SchedulerApi>,
    ) -> Self {
        let schedule = ScheduleController::new(config.schedule_id.clone());
        Self {
            config,
            invoker,
            scheduler,
            busy: BusyGauge::new(),
            submit_lane: Lane::new(),
            status_lane: Lane::new(),
            dashboard_lane: Lane::new(),
            reminder_lane: Lane::new(),
            schedule,
            inputs: Arc::new(Mutex::new(ConsoleInputs::default())),
            sample_data: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Mount-time work: one schedule fetch, nothing else. No response lane
    /// is auto-triggered.
    pub async fn init(&self) {
        self.schedule.fetch(self.scheduler.as_ref()).await;
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    fn inputs_lock(&self) -> MutexGuard<'_, ConsoleInputs> {
        self.inputs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn inputs(&self) -> ConsoleInputs {
        self.inputs_lock().clone()
    }

    pub fn with_inputs<R>(&self, edit: impl FnOnce(&mut ConsoleInputs) -> R) -> R {
        edit(&mut self.inputs_lock())
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn sample_data(&self) -> bool {
        self.sample_data.load(Ordering::SeqCst)
    }

    pub fn submit_view(&self) -> LaneSnapshot {
        self.submit_lane.snapshot()
    }

    pub fn status_view(&self) -> LaneSnapshot {
        self.status_lane.snapshot()
    }

    pub fn dashboard_view(&self) -> LaneSnapshot {
        self.dashboard_lane.snapshot()
    }

    pub fn reminder_view(&self) -> LaneSnapshot {
        self.reminder_lane.snapshot()
    }

    pub fn schedule_view(&self) -> ScheduleSnapshot {
        self.schedule.snapshot()
    }

    pub async fn submit(&self) {
        let intent = SubmitIntent(self.inputs_lock().form.clone());
        self.submit_lane
            .trigger(&intent, self.invoker.as_ref(), &self.config.agent_id, &self.busy)
            .await;
    }

    pub async fn check_status(&self) {
        let intent = StatusIntent {
            query: self.inputs_lock().search_query.clone(),
        };
        self.status_lane
            .trigger(&intent, self.invoker.as_ref(), &self.config.agent_id, &self.busy)
            .await;
    }

    pub async fn load_dashboard(&self) {
        self.dashboard_lane
            .trigger(
                &DashboardIntent,
                self.invoker.as_ref(),
                &self.config.agent_id,
                &self.busy,
            )
            .await;
    }

    pub async fn run_reminder_sweep(&self) {
        self.reminder_lane
            .trigger(
                &ReminderIntent,
                self.invoker.as_ref(),
                &self.config.agent_id,
                &self.busy,
            )
            .await;
    }

    pub async fn refresh_schedule(&self) {
        self.schedule.fetch(self.scheduler.as_ref()).await;
    }

    pub async fn toggle_schedule(&self) {
        self.schedule.toggle(self.scheduler.as_ref()).await;
    }

    pub async fn trigger_schedule_now(&self) {
        self.schedule.trigger_now(self.scheduler.as_ref()).await;
    }

    pub async fn load_schedule_logs(&self) {
        self.schedule.load_logs(self.scheduler.as_ref()).await;
    }

    /// Sample-data toggle. ON installs the canned payload into every lane
    /// and pre-fills the inputs; OFF clears every lane result and leaves
    /// the inputs alone. Both directions clear every lane error, and
    /// neither touches loading flags or the schedule controller.
    pub fn set_sample_data(&self, on: bool) {
        self.sample_data.store(on, Ordering::SeqCst);
        if on {
            info!("sample data enabled");
            self.submit_lane.put_result(samples::submit_response());
            self.status_lane.put_result(samples::status_response());
            self.dashboard_lane.put_result(samples::dashboard_response());
            self.reminder_lane.put_result(samples::reminder_response());
            let mut inputs = self.inputs_lock();
            inputs.form = samples::submit_form();
            inputs.search_query = samples::STATUS_QUERY.to_string();
        } else {
            info!("sample data disabled");
            self.submit_lane.clear_result();
            self.status_lane.clear_result();
            self.dashboard_lane.clear_result();
            self.reminder_lane.clear_result();
        }
        self.submit_lane.clear_error();
        self.status_lane.clear_error();
        self.dashboard_lane.clear_error();
        self.reminder_lane.clear_error();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agent::{AgentResponse, InvokeReply};
    use crate::core::render::{TimelineIcon, timeline};
    use crate::core::scheduler::{Schedule, ScheduleLogEntry};
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use tokio::sync::Notify;

    struct StubInvoker {
        reply: InvokeReply,
        gate: Option<Arc<Notify>>,
    }

    impl StubInvoker {
        fn success(result: crate::core::model::WorkflowResponse) -> Self {
            Self {
                reply: InvokeReply {
                    success: true,
                    response: Some(AgentResponse {
                        status: Some("success".into()),
                        result: Some(result),
                        message: None,
                    }),
                    error: None,
                },
                gate: None,
            }
        }

        fn gated(result: crate::core::model::WorkflowResponse, gate: Arc<Notify>) -> Self {
            let mut stub = Self::success(result);
            stub.gate = Some(gate);
            stub
        }
    }

    #[async_trait]
    impl AgentInvoker for StubInvoker {
        async fn invoke(&self, _instruction: &str, _agent_id: &str) -> Result<InvokeReply> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Ok(self.reply.clone())
        }
    }

    #[derive(Default)]
    struct StubScheduler {
        schedules: Vec<Schedule>,
        fetch_count: Mutex<usize>,
    }

    #[async_trait]
    impl SchedulerApi for StubScheduler {
        async fn fetch_all(&self) -> Result<Vec<Schedule>> {
            *self.fetch_count.lock().unwrap() += 1;
            Ok(self.schedules.clone())
        }

        async fn logs(&self, _schedule_id: &str) -> Result<Value> {
            Ok(json!([]))
        }

        async fn pause(&self, _schedule_id: &str) -> Result<()> {
            Err(anyhow!("unexpected pause"))
        }

        async fn resume(&self, _schedule_id: &str) -> Result<()> {
            Err(anyhow!("unexpected resume"))
        }

        async fn trigger_now(&self, _schedule_id: &str) -> Result<()> {
            Err(anyhow!("unexpected trigger"))
        }
    }

    fn console_with(invoker: StubInvoker, scheduler: StubScheduler) -> Console {
        Console::new(
            ConsoleConfig::default(),
            Arc::new(invoker),
            Arc::new(scheduler),
        )
    }

    fn active_schedule() -> Schedule {
        Schedule {
            id: ConsoleConfig::default().schedule_id,
            is_active: true,
            cron: Some("0 9 * * 1-5".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn init_performs_exactly_one_schedule_fetch_and_triggers_no_lane() {
        let scheduler = Arc::new(StubScheduler {
            schedules: vec![active_schedule()],
            ..Default::default()
        });
        let console = Console::new(
            ConsoleConfig::default(),
            Arc::new(StubInvoker::success(Default::default())),
            scheduler.clone(),
        );

        console.init().await;

        assert_eq!(*scheduler.fetch_count.lock().unwrap(), 1);
        assert!(console.schedule_view().current.is_some());
        assert!(console.submit_view().result.is_none());
        assert!(console.status_view().result.is_none());
        assert!(console.dashboard_view().result.is_none());
        assert!(console.reminder_view().result.is_none());
        assert!(!console.is_busy());
    }

    #[tokio::test]
    async fn sample_toggle_on_installs_payloads_and_prefills_inputs() {
        let console = console_with(StubInvoker::success(Default::default()), StubScheduler::default());

        console.set_sample_data(true);

        assert!(console.sample_data());
        assert_eq!(console.submit_view().result, Some(samples::submit_response()));
        assert_eq!(console.status_view().result, Some(samples::status_response()));
        assert_eq!(console.dashboard_view().result, Some(samples::dashboard_response()));
        assert_eq!(console.reminder_view().result, Some(samples::reminder_response()));
        let inputs = console.inputs();
        assert_eq!(inputs.form, samples::submit_form());
        assert_eq!(inputs.search_query, samples::STATUS_QUERY);
    }

    #[tokio::test]
    async fn sample_toggle_off_clears_results_but_not_inputs() {
        let console = console_with(StubInvoker::success(Default::default()), StubScheduler::default());
        console.set_sample_data(true);

        console.set_sample_data(false);

        assert!(!console.sample_data());
        assert!(console.submit_view().result.is_none());
        assert!(console.status_view().result.is_none());
        assert!(console.dashboard_view().result.is_none());
        assert!(console.reminder_view().result.is_none());
        assert_eq!(console.inputs().form, samples::submit_form());
        assert_eq!(console.inputs().search_query, samples::STATUS_QUERY);
    }

    #[tokio::test]
    async fn sample_toggle_clears_errors_in_both_directions() {
        let console = console_with(
            StubInvoker {
                reply: InvokeReply::default(),
                gate: None,
            },
            StubScheduler::default(),
        );
        console.load_dashboard().await;
        assert!(console.dashboard_view().error.is_some());

        console.set_sample_data(true);
        assert!(console.dashboard_view().error.is_none());

        console.load_dashboard().await;
        assert!(console.dashboard_view().error.is_some());
        console.set_sample_data(false);
        assert!(console.dashboard_view().error.is_none());
    }

    #[tokio::test]
    async fn sample_toggle_round_trip_leaves_schedule_state_untouched() {
        let scheduler = StubScheduler {
            schedules: vec![active_schedule()],
            ..Default::default()
        };
        let console = console_with(StubInvoker::success(Default::default()), scheduler);
        console.init().await;
        let before = console.schedule_view();

        console.set_sample_data(true);
        console.set_sample_data(false);

        let after = console.schedule_view();
        assert_eq!(after.phase, before.phase);
        assert_eq!(after.current, before.current);
        assert_eq!(after.logs, before.logs);
        assert!(after.message.is_none());
    }

    #[tokio::test]
    async fn sample_toggle_does_not_touch_a_lane_in_flight() {
        let gate = Arc::new(Notify::new());
        let console = console_with(
            StubInvoker::gated(samples::dashboard_response(), gate.clone()),
            StubScheduler::default(),
        );

        let background = console.clone();
        let task = tokio::spawn(async move { background.load_dashboard().await });
        while !console.dashboard_view().loading {
            tokio::task::yield_now().await;
        }

        console.set_sample_data(true);
        assert!(console.dashboard_view().loading);
        assert!(console.is_busy());

        gate.notify_one();
        task.await.unwrap();
        assert!(!console.dashboard_view().loading);
        assert!(!console.is_busy());
        assert_eq!(console.dashboard_view().result, Some(samples::dashboard_response()));
    }

    #[tokio::test]
    async fn submit_scenario_renders_the_expected_timeline() {
        let console = console_with(
            StubInvoker::success(samples::submit_response()),
            StubScheduler::default(),
        );
        console.with_inputs(|inputs| {
            inputs.form = PurchaseOrderForm {
                requester: "Sarah Chen".into(),
                department: "IT".into(),
                amount: "24500".into(),
                vendor: "Dell Technologies".into(),
                vendor_status: "preferred".into(),
                description: "Procurement of 10 Dell Latitude 7450 laptops for new engineering team members".into(),
                priority: "high".into(),
                category: "hardware".into(),
            };
        });

        console.submit().await;

        let view = console.submit_view();
        assert!(view.error.is_none());
        let result = view.result.unwrap();
        assert_eq!(
            result.po_details.as_ref().unwrap().po_number.as_deref(),
            Some("PO-2026-00847")
        );
        assert_eq!(result.approval_progress, Some(33.0));
        let nodes = timeline(result.chain());
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].icon, TimelineIcon::Approved);
        assert_eq!(nodes[1].icon, TimelineIcon::Pending);
        assert_eq!(nodes[2].icon, TimelineIcon::Pending);
    }

    #[tokio::test]
    async fn check_status_uses_the_search_query_input() {
        let console = console_with(
            StubInvoker::success(samples::status_response()),
            StubScheduler::default(),
        );
        console.with_inputs(|inputs| inputs.search_query = "PO-2026-00612".into());

        console.check_status().await;

        assert_eq!(console.status_view().result, Some(samples::status_response()));
    }

    #[tokio::test]
    async fn blank_query_leaves_the_status_lane_untouched() {
        let console = console_with(
            StubInvoker::success(samples::status_response()),
            StubScheduler::default(),
        );

        console.check_status().await;

        let view = console.status_view();
        assert!(view.result.is_none());
        assert!(view.error.is_none());
        assert!(!view.loading);
    }

    #[test]
    fn log_entry_defaults_render_na() {
        let entry = ScheduleLogEntry::default();
        assert_eq!(entry.executed_at_display(), "N/A");
    }
}
