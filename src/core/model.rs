use serde::{Deserialize, Serialize};

// Wire shapes for the agent's structured responses. Every field is optional:
// the agent assembles these payloads from free-form reasoning and routinely
// omits sections, so parsing must never fail on a partial object. Rendering
// code supplies the "N/A"/zero defaults.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    SubmitPo,
    CheckStatus,
    Dashboard,
    SendReminder,
    Unknown,
}

impl ActionType {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("submit_po") => ActionType::SubmitPo,
            Some("check_status") => ActionType::CheckStatus,
            Some("dashboard") => ActionType::Dashboard,
            Some("send_reminder") => ActionType::SendReminder,
            _ => ActionType::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::SubmitPo => "submit_po",
            ActionType::CheckStatus => "check_status",
            ActionType::Dashboard => "dashboard",
            ActionType::SendReminder => "send_reminder",
            ActionType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoDetails {
    pub po_number: Option<String>,
    pub requester: Option<String>,
    pub department: Option<String>,
    pub amount: Option<f64>,
    pub vendor: Option<String>,
    pub vendor_status: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub submission_date: Option<String>,
    pub estimated_completion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApprovalStep {
    pub step: Option<u32>,
    pub approver_name: Option<String>,
    pub approver_role: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertItem {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PendingApprover {
    pub name: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub days_pending: Option<u32>,
    pub reminder_sent: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReminderDetails {
    pub pending_approvers: Option<Vec<PendingApprover>>,
    pub reminder_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DepartmentBreakdown {
    pub department: Option<String>,
    pub count: Option<u32>,
    pub total_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_pos: Option<u32>,
    pub pending_approval: Option<u32>,
    pub approved: Option<u32>,
    pub rejected: Option<u32>,
    pub total_amount: Option<f64>,
    pub average_approval_time: Option<String>,
    pub urgent_pos: Option<u32>,
    pub department_breakdown: Option<Vec<DepartmentBreakdown>>,
}

/// One structured response from the approval agent. At most one of the
/// detail sections is populated, selected by `action_type`; `alerts` and
/// `message` can accompany any of them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkflowResponse {
    pub action_type: Option<String>,
    pub po_details: Option<PoDetails>,
    pub approval_chain: Option<Vec<ApprovalStep>>,
    pub current_status: Option<String>,
    pub approval_progress: Option<f64>,
    pub alerts: Option<Vec<AlertItem>>,
    pub reminder_details: Option<ReminderDetails>,
    pub dashboard_summary: Option<DashboardSummary>,
    pub message: Option<String>,
}

impl WorkflowResponse {
    pub fn action(&self) -> ActionType {
        ActionType::parse(self.action_type.as_deref())
    }

    /// Approval chain steps, empty when the section is absent.
    pub fn chain(&self) -> &[ApprovalStep] {
        self.approval_chain.as_deref().unwrap_or_default()
    }

    /// Alerts, empty when the section is absent.
    pub fn alert_items(&self) -> &[AlertItem] {
        self.alerts.as_deref().unwrap_or_default()
    }
}
