use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::warn;

use crate::core::scheduler::{Schedule, ScheduleLogEntry, SchedulerApi};

// Controller for the one recurring reminder schedule the console is bound
// to. The schedule's phase is never stored: it is always derived by looking
// the fixed id up in the most recently fetched list, so a stale list yields
// a stale view until the next fetch.

const TOGGLE_FAILURE: &str = "Failed to update schedule";
const TRIGGER_FAILURE: &str = "Failed to trigger schedule";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulePhase {
    #[default]
    Unknown,
    Active,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTone {
    Success,
    Error,
    Info,
}

/// The single schedule-pane message. Every command replaces it wholesale;
/// success and error are never shown together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub tone: MessageTone,
    pub text: String,
}

impl StatusMessage {
    fn success(text: &str) -> Self {
        Self {
            tone: MessageTone::Success,
            text: text.to_string(),
        }
    }

    fn error(text: String, fallback: &str) -> Self {
        Self {
            tone: MessageTone::Error,
            text: if text.is_empty() {
                fallback.to_string()
            } else {
                text
            },
        }
    }
}

#[derive(Debug, Default)]
struct ScheduleState {
    schedules: Vec<Schedule>,
    fetching: bool,
    logs: Vec<ScheduleLogEntry>,
    logs_loading: bool,
    action_loading: bool,
    trigger_loading: bool,
    message: Option<StatusMessage>,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleSnapshot {
    pub current: Option<Schedule>,
    pub phase: SchedulePhase,
    pub fetching: bool,
    pub logs: Vec<ScheduleLogEntry>,
    pub logs_loading: bool,
    pub action_loading: bool,
    pub trigger_loading: bool,
    pub message: Option<StatusMessage>,
}

#[derive(Clone)]
pub struct ScheduleController {
    schedule_id: String,
    state: Arc<Mutex<ScheduleState>>,
}

impl ScheduleController {
    pub fn new(schedule_id: impl Into<String>) -> Self {
        Self {
            schedule_id: schedule_id.into(),
            state: Arc::new(Mutex::new(ScheduleState::default())),
        }
    }

    pub fn schedule_id(&self) -> &str {
        &self.schedule_id
    }

    fn lock(&self) -> MutexGuard<'_, ScheduleState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn current_locked(state: &ScheduleState, id: &str) -> Option<Schedule> {
        state.schedules.iter().find(|s| s.id == id).cloned()
    }

    pub fn snapshot(&self) -> ScheduleSnapshot {
        let state = self.lock();
        let current = Self::current_locked(&state, &self.schedule_id);
        let phase = match &current {
            None => SchedulePhase::Unknown,
            Some(s) if s.is_active => SchedulePhase::Active,
            Some(_) => SchedulePhase::Paused,
        };
        ScheduleSnapshot {
            current,
            phase,
            fetching: state.fetching,
            logs: state.logs.clone(),
            logs_loading: state.logs_loading,
            action_loading: state.action_loading,
            trigger_loading: state.trigger_loading,
            message: state.message.clone(),
        }
    }

    pub fn phase(&self) -> SchedulePhase {
        self.snapshot().phase
    }

    /// Repopulates the schedule list. A failed fetch leaves the previous
    /// list in place.
    pub async fn fetch(&self, api: &dyn SchedulerApi) {
        self.lock().fetching = true;
        match api.fetch_all().await {
            Ok(schedules) => {
                let mut state = self.lock();
                state.schedules = schedules;
            }
            Err(err) => warn!("schedule fetch failed: {err}"),
        }
        self.lock().fetching = false;
    }

    /// Pause when active, resume when paused; no-op while the schedule is
    /// unresolved. Both outcomes re-fetch the list, because a failed
    /// command may still have changed remote state.
    pub async fn toggle(&self, api: &dyn SchedulerApi) {
        let active = {
            let state = self.lock();
            match Self::current_locked(&state, &self.schedule_id) {
                Some(schedule) => schedule.is_active,
                None => return,
            }
        };

        {
            let mut state = self.lock();
            state.action_loading = true;
            state.message = None;
        }

        let outcome = if active {
            api.pause(&self.schedule_id).await
        } else {
            api.resume(&self.schedule_id).await
        };
        let message = match outcome {
            Ok(()) if active => StatusMessage::success("Schedule paused successfully."),
            Ok(()) => StatusMessage::success("Schedule activated successfully."),
            Err(err) => StatusMessage::error(err.to_string(), TOGGLE_FAILURE),
        };
        self.lock().message = Some(message);

        self.fetch(api).await;
        self.lock().action_loading = false;
    }

    /// Manual run, allowed in any phase. Success reloads the execution
    /// log; failure surfaces an error and leaves the log alone.
    pub async fn trigger_now(&self, api: &dyn SchedulerApi) {
        {
            let mut state = self.lock();
            state.trigger_loading = true;
            state.message = None;
        }

        match api.trigger_now(&self.schedule_id).await {
            Ok(()) => {
                self.lock().message = Some(StatusMessage::success(
                    "Schedule triggered manually. Check logs for results.",
                ));
                self.load_logs(api).await;
            }
            Err(err) => {
                self.lock().message =
                    Some(StatusMessage::error(err.to_string(), TRIGGER_FAILURE));
            }
        }
        self.lock().trigger_loading = false;
    }

    /// Fetches the execution history. Failures and malformed payloads both
    /// degrade to an empty list; the loading flag always clears.
    pub async fn load_logs(&self, api: &dyn SchedulerApi) {
        self.lock().logs_loading = true;
        let entries = match api.logs(&self.schedule_id).await {
            Ok(payload) => coerce_log_entries(payload),
            Err(err) => {
                warn!("schedule log fetch failed: {err}");
                Vec::new()
            }
        };
        let mut state = self.lock();
        state.logs = entries;
        state.logs_loading = false;
    }
}

/// Accepts a bare array or a `{"logs": [...]}` envelope; anything else is
/// an empty list. Entries are kept in the order returned, and a malformed
/// element degrades to an all-absent entry instead of poisoning the list.
pub(crate) fn coerce_log_entries(payload: Value) -> Vec<ScheduleLogEntry> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("logs") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect()
}
