pub mod markdown;

use crate::core::model::ApprovalStep;

// Pure classification layer: maps the agent's loosely-typed status strings
// onto closed vocabularies the interface layer can style. Nothing in here
// touches the network or lane state, and every function is total over
// arbitrary input strings.

/// Visual tone vocabulary shared by badges, borders and connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Caution,
    Negative,
    Elevated,
    Muted,
    Info,
    Dimmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Approved,
    Pending,
    PendingApproval,
    Rejected,
    Escalated,
    OnHold,
    Draft,
    Skipped,
    Unknown,
}

impl StepStatus {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("approved") => StepStatus::Approved,
            Some("pending") => StepStatus::Pending,
            Some("pending_approval") => StepStatus::PendingApproval,
            Some("rejected") => StepStatus::Rejected,
            Some("escalated") => StepStatus::Escalated,
            Some("on_hold") => StepStatus::OnHold,
            Some("draft") => StepStatus::Draft,
            Some("skipped") => StepStatus::Skipped,
            _ => StepStatus::Unknown,
        }
    }

    /// Unmatched and absent statuses share the info bucket.
    pub fn tone(self) -> Tone {
        match self {
            StepStatus::Approved => Tone::Positive,
            StepStatus::Pending | StepStatus::PendingApproval => Tone::Caution,
            StepStatus::Rejected => Tone::Negative,
            StepStatus::Escalated => Tone::Elevated,
            StepStatus::OnHold => Tone::Muted,
            StepStatus::Draft | StepStatus::Unknown => Tone::Info,
            StepStatus::Skipped => Tone::Dimmed,
        }
    }
}

/// Badge label for a raw status string: underscores become spaces, absent
/// becomes "unknown".
pub fn status_label(status: Option<&str>) -> String {
    status.unwrap_or("unknown").replace('_', " ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
    Unranked,
}

impl Priority {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("urgent") => Priority::Urgent,
            Some("high") => Priority::High,
            Some("medium") => Priority::Medium,
            Some("low") => Priority::Low,
            _ => Priority::Unranked,
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            Priority::Urgent => Tone::Negative,
            Priority::High => Tone::Elevated,
            Priority::Medium => Tone::Caution,
            Priority::Low => Tone::Positive,
            Priority::Unranked => Tone::Muted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Error,
    Warning,
    Reminder,
    Info,
}

impl AlertKind {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("error") => AlertKind::Error,
            Some("warning") => AlertKind::Warning,
            Some("reminder") => AlertKind::Reminder,
            _ => AlertKind::Info,
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            AlertKind::Error => Tone::Negative,
            AlertKind::Warning => Tone::Caution,
            AlertKind::Reminder | AlertKind::Info => Tone::Info,
        }
    }
}

/// Vendor trust badge: only the preferred tier reads as positive.
pub fn vendor_tone(vendor_status: Option<&str>) -> Tone {
    match vendor_status.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("preferred") => Tone::Positive,
        _ => Tone::Caution,
    }
}

/// Days-pending badge in the reminder table: three or more days escalates.
pub fn pending_days_tone(days: u32) -> Tone {
    if days >= 3 { Tone::Negative } else { Tone::Caution }
}

/// Execution-log status badge. Unrecognized tokens stay neutral.
pub fn log_status_tone(status: Option<&str>) -> Tone {
    match status.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("success") => Tone::Positive,
        Some("error") | Some("failed") => Tone::Negative,
        _ => Tone::Info,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineIcon {
    Approved,
    Rejected,
    Skipped,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorKind {
    Positive,
    Negative,
    Dimmed,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineNode {
    pub step_label: u32,
    pub icon: TimelineIcon,
    pub connector: ConnectorKind,
    pub is_last: bool,
}

/// Maps an ordered approval chain onto timeline node descriptors. Chain
/// order is authoritative; each node's icon derives only from its own
/// status. Everything that is not approved/rejected/skipped renders as an
/// in-progress clock, but its connector stays neutral rather than amber.
pub fn timeline(chain: &[ApprovalStep]) -> Vec<TimelineNode> {
    let last = chain.len().saturating_sub(1);
    chain
        .iter()
        .enumerate()
        .map(|(idx, step)| {
            let (icon, connector) = match StepStatus::parse(step.status.as_deref()) {
                StepStatus::Approved => (TimelineIcon::Approved, ConnectorKind::Positive),
                StepStatus::Rejected => (TimelineIcon::Rejected, ConnectorKind::Negative),
                StepStatus::Skipped => (TimelineIcon::Skipped, ConnectorKind::Dimmed),
                _ => (TimelineIcon::Pending, ConnectorKind::Neutral),
            };
            TimelineNode {
                step_label: step.step.unwrap_or(idx as u32 + 1),
                icon,
                connector,
                is_last: idx == last && !chain.is_empty(),
            }
        })
        .collect()
}

/// US-locale currency formatting. An absent amount is the zero string, not
/// an error.
pub fn format_usd(amount: Option<f64>) -> String {
    let value = amount.unwrap_or(0.0);
    let cents = (value.abs() * 100.0).round() as u64;
    let dollars = cents / 100;
    let fraction = cents % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{fraction:02}")
}
