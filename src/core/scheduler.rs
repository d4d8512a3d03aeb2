use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

// Client for the external scheduler service that owns the recurring
// reminder job. The console never runs the job itself; it only reads the
// schedule list, flips the active flag, fires manual runs and reads the
// execution history.

/// One recurring job as the scheduler reports it. The cron expression is
/// opaque to this console.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub id: String,
    pub name: Option<String>,
    pub cron: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScheduleLogEntry {
    pub id: Option<String>,
    pub executed_at: Option<String>,
    pub status: Option<String>,
    pub error: Option<String>,
    pub response: Option<Value>,
}

impl ScheduleLogEntry {
    pub fn executed_at_display(&self) -> &str {
        self.executed_at.as_deref().unwrap_or("N/A")
    }

    /// Detail column: the error string when present, else a truncated
    /// preview of a textual response, else a fixed completion marker.
    pub fn detail(&self) -> String {
        if let Some(error) = &self.error {
            return error.clone();
        }
        match &self.response {
            Some(Value::String(text)) => text.chars().take(100).collect(),
            _ => "Completed".to_string(),
        }
    }
}

#[async_trait]
pub trait SchedulerApi: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Schedule>>;
    /// Raw log payload; the schedule controller owns the non-list coercion
    /// rule, so this deliberately does not parse into entries.
    async fn logs(&self, schedule_id: &str) -> Result<Value>;
    async fn pause(&self, schedule_id: &str) -> Result<()>;
    async fn resume(&self, schedule_id: &str) -> Result<()>;
    async fn trigger_now(&self, schedule_id: &str) -> Result<()>;
}

pub struct HttpSchedulerApi {
    client: Client,
    base_url: Url,
}

impl HttpSchedulerApi {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| anyhow!("invalid scheduler endpoint {path}: {e}"))
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let res = self.client.get(self.endpoint(path)?).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            return Err(anyhow!(
                "Scheduler API error ({}): {}",
                status,
                res.text().await.unwrap_or_default()
            ));
        }
        Ok(res.json().await?)
    }

    async fn post_command(&self, path: &str) -> Result<()> {
        let res = self.client.post(self.endpoint(path)?).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            return Err(anyhow!(
                "Scheduler API error ({}): {}",
                status,
                res.text().await.unwrap_or_default()
            ));
        }
        let body: Value = res.json().await.unwrap_or(Value::Null);
        ensure_envelope_ok(&body)
    }
}

/// Command endpoints answer `{"success": …, "error": …}`; a 2xx with
/// `success: false` is still a failure.
fn ensure_envelope_ok(body: &Value) -> Result<()> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("scheduler request failed");
        return Err(anyhow!("{message}"));
    }
    Ok(())
}

/// The list endpoint answers either a bare array or a
/// `{"schedules": [...]}` envelope.
pub(crate) fn parse_schedule_list(body: Value) -> Result<Vec<Schedule>> {
    ensure_envelope_ok(&body)?;
    let list = match body {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => map
            .remove("schedules")
            .ok_or_else(|| anyhow!("scheduler response has no schedule list"))?,
        other => return Err(anyhow!("unexpected scheduler response: {other}")),
    };
    Ok(serde_json::from_value(list)?)
}

#[async_trait]
impl SchedulerApi for HttpSchedulerApi {
    async fn fetch_all(&self) -> Result<Vec<Schedule>> {
        let body = self.get_json("api/schedules").await?;
        parse_schedule_list(body)
    }

    async fn logs(&self, schedule_id: &str) -> Result<Value> {
        debug!("loading execution logs for schedule {schedule_id}");
        self.get_json(&format!("api/schedules/{schedule_id}/logs"))
            .await
    }

    async fn pause(&self, schedule_id: &str) -> Result<()> {
        self.post_command(&format!("api/schedules/{schedule_id}/pause"))
            .await
    }

    async fn resume(&self, schedule_id: &str) -> Result<()> {
        self.post_command(&format!("api/schedules/{schedule_id}/resume"))
            .await
    }

    async fn trigger_now(&self, schedule_id: &str) -> Result<()> {
        self.post_command(&format!("api/schedules/{schedule_id}/trigger"))
            .await
    }
}

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

fn day_name(value: &str) -> Option<&'static str> {
    let index: usize = value.parse().ok()?;
    // Both 0 and 7 mean Sunday in common cron dialects.
    if index > 7 {
        return None;
    }
    DAY_NAMES.get(index % 7).copied()
}

fn twelve_hour(hour: u32, minute: u32) -> String {
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display_hour}:{minute:02} {meridiem}")
}

/// Human-readable description of a five-field cron expression. Pure
/// formatting: covers the shapes this console meets (fixed minute/hour with
/// a day-of-week selector, and minute steps) and echoes anything else
/// verbatim.
pub fn cron_to_human(expr: &str) -> String {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    let [minute, hour, dom, month, dow] = fields.as_slice() else {
        return expr.to_string();
    };
    if *dom != "*" || *month != "*" {
        return expr.to_string();
    }

    if let Some(step) = minute.strip_prefix("*/") {
        if *hour == "*" && *dow == "*" && step.parse::<u32>().is_ok() {
            return format!("Every {step} minutes");
        }
        return expr.to_string();
    }

    let (Ok(m), Ok(h)) = (minute.parse::<u32>(), hour.parse::<u32>()) else {
        return expr.to_string();
    };
    if m > 59 || h > 23 {
        return expr.to_string();
    }
    let time = twelve_hour(h, m);

    let days = if *dow == "*" {
        Some("every day".to_string())
    } else if let Some((from, to)) = dow.split_once('-') {
        match (day_name(from), day_name(to)) {
            (Some(a), Some(b)) => Some(format!("{a} through {b}")),
            _ => None,
        }
    } else {
        let names: Option<Vec<&str>> = dow.split(',').map(day_name).collect();
        names.map(|n| n.join(", "))
    };

    match days {
        Some(days) => format!("At {time}, {days}"),
        None => expr.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schedule_list_parses_a_bare_array() {
        let parsed = parse_schedule_list(json!([
            {"id": "sched-1", "is_active": true, "cron": "0 9 * * 1-5"}
        ]))
        .unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "sched-1");
        assert!(parsed[0].is_active);
    }

    #[test]
    fn schedule_list_parses_a_wrapped_envelope() {
        let parsed = parse_schedule_list(json!({
            "success": true,
            "schedules": [{"id": "a"}, {"id": "b", "is_active": false}]
        }))
        .unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].id, "b");
    }

    #[test]
    fn schedule_list_rejects_failure_envelopes() {
        let err = parse_schedule_list(json!({"success": false, "error": "nope"}))
            .unwrap_err()
            .to_string();
        assert_eq!(err, "nope");
    }

    #[test]
    fn envelope_without_success_flag_passes() {
        assert!(ensure_envelope_ok(&json!({"message": "ok"})).is_ok());
        assert!(ensure_envelope_ok(&Value::Null).is_ok());
    }

    #[test]
    fn log_detail_prefers_error_then_text_preview() {
        let mut entry = ScheduleLogEntry {
            error: Some("timed out".into()),
            response: Some(json!("long response")),
            ..Default::default()
        };
        assert_eq!(entry.detail(), "timed out");

        entry.error = None;
        assert_eq!(entry.detail(), "long response");

        entry.response = Some(json!({"nested": true}));
        assert_eq!(entry.detail(), "Completed");

        entry.response = None;
        assert_eq!(entry.detail(), "Completed");
    }

    #[test]
    fn log_detail_truncates_long_text_responses() {
        let long = "x".repeat(250);
        let entry = ScheduleLogEntry {
            response: Some(Value::String(long)),
            ..Default::default()
        };
        assert_eq!(entry.detail().len(), 100);
    }

    #[test]
    fn executed_at_falls_back_to_na() {
        let entry = ScheduleLogEntry::default();
        assert_eq!(entry.executed_at_display(), "N/A");
    }

    #[test]
    fn cron_weekday_range_reads_naturally() {
        assert_eq!(cron_to_human("0 9 * * 1-5"), "At 9:00 AM, Monday through Friday");
    }

    #[test]
    fn cron_daily_and_single_day_forms() {
        assert_eq!(cron_to_human("30 17 * * *"), "At 5:30 PM, every day");
        assert_eq!(cron_to_human("0 0 * * 0"), "At 12:00 AM, Sunday");
        assert_eq!(cron_to_human("15 12 * * 1,3,5"), "At 12:15 PM, Monday, Wednesday, Friday");
    }

    #[test]
    fn cron_minute_steps() {
        assert_eq!(cron_to_human("*/15 * * * *"), "Every 15 minutes");
    }

    #[test]
    fn unrecognized_cron_shapes_echo_verbatim() {
        assert_eq!(cron_to_human("not a cron"), "not a cron");
        assert_eq!(cron_to_human("0 9 1 * *"), "0 9 1 * *");
        assert_eq!(cron_to_human("0 9 * * 9"), "0 9 * * 9");
        assert_eq!(cron_to_human("61 9 * * *"), "61 9 * * *");
    }
}
