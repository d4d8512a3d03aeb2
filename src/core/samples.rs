use crate::core::lane::PurchaseOrderForm;
use crate::core::model::{
    AlertItem, ApprovalStep, DashboardSummary, DepartmentBreakdown, PendingApprover, PoDetails,
    ReminderDetails, WorkflowResponse,
};

// Fixed sample payloads installed by the sample-data toggle. One canned
// response per lane, mirroring what the agent returns on the happy path.

fn alert(kind: &str, message: &str) -> AlertItem {
    AlertItem {
        kind: Some(kind.to_string()),
        message: Some(message.to_string()),
    }
}

fn step(index: u32, name: &str, role: &str, status: &str, notes: &str) -> ApprovalStep {
    ApprovalStep {
        step: Some(index),
        approver_name: Some(name.to_string()),
        approver_role: Some(role.to_string()),
        status: Some(status.to_string()),
        notes: Some(notes.to_string()),
    }
}

pub fn submit_response() -> WorkflowResponse {
    WorkflowResponse {
        action_type: Some("submit_po".into()),
        po_details: Some(PoDetails {
            po_number: Some("PO-2026-00847".into()),
            requester: Some("Sarah Chen".into()),
            department: Some("IT".into()),
            amount: Some(24500.0),
            vendor: Some("Dell Technologies".into()),
            vendor_status: Some("preferred".into()),
            description: Some(
                "Procurement of 10 Dell Latitude 7450 laptops for new engineering team members"
                    .into(),
            ),
            priority: Some("high".into()),
            category: Some("hardware".into()),
            submission_date: Some("2026-02-25".into()),
            estimated_completion: Some("2026-03-03".into()),
        }),
        approval_chain: Some(vec![
            step(
                1,
                "Michael Torres",
                "IT Manager",
                "approved",
                "Approved - within quarterly budget allocation",
            ),
            step(2, "Jennifer Walsh", "Finance Director", "pending", ""),
            step(3, "David Kim", "VP of Operations", "pending", ""),
        ]),
        current_status: Some("pending_approval".into()),
        approval_progress: Some(33.0),
        alerts: Some(vec![
            alert(
                "info",
                "PO-2026-00847 has been submitted and is now in the approval queue.",
            ),
            alert(
                "warning",
                "Amount exceeds $20,000 threshold - requires VP-level approval.",
            ),
        ]),
        reminder_details: None,
        dashboard_summary: None,
        message: Some(
            "Purchase Order PO-2026-00847 has been submitted successfully. It requires \
             3-level approval due to the amount exceeding $20,000. Currently pending \
             Finance Director review."
                .into(),
        ),
    }
}

pub fn status_response() -> WorkflowResponse {
    WorkflowResponse {
        action_type: Some("check_status".into()),
        po_details: Some(PoDetails {
            po_number: Some("PO-2026-00612".into()),
            requester: Some("Alex Rivera".into()),
            department: Some("Marketing".into()),
            amount: Some(8750.0),
            vendor: Some("Adobe Systems".into()),
            vendor_status: Some("preferred".into()),
            description: Some(
                "Annual renewal of Adobe Creative Cloud Enterprise licenses (25 seats)".into(),
            ),
            priority: Some("medium".into()),
            category: Some("software".into()),
            submission_date: Some("2026-02-20".into()),
            estimated_completion: Some("2026-02-27".into()),
        }),
        approval_chain: Some(vec![
            step(
                1,
                "Lisa Park",
                "Marketing Manager",
                "approved",
                "Approved - standard renewal",
            ),
            step(
                2,
                "Robert Chen",
                "Finance Manager",
                "approved",
                "Within budget. Approved.",
            ),
        ]),
        current_status: Some("approved".into()),
        approval_progress: Some(100.0),
        alerts: Some(vec![alert(
            "info",
            "PO-2026-00612 has been fully approved and is ready for processing.",
        )]),
        reminder_details: None,
        dashboard_summary: None,
        message: Some(
            "Purchase Order PO-2026-00612 has been fully approved. All approvers have \
             signed off. The order is ready for vendor processing."
                .into(),
        ),
    }
}

pub fn dashboard_response() -> WorkflowResponse {
    let breakdown = [
        ("IT", 42, 567_300.0),
        ("Marketing", 28, 234_100.0),
        ("Operations", 35, 412_500.0),
        ("R&D", 22, 389_200.0),
        ("Finance", 14, 128_750.0),
        ("HR", 15, 110_800.0),
    ];
    WorkflowResponse {
        action_type: Some("dashboard".into()),
        dashboard_summary: Some(DashboardSummary {
            total_pos: Some(156),
            pending_approval: Some(23),
            approved: Some(118),
            rejected: Some(15),
            total_amount: Some(1_842_650.75),
            average_approval_time: Some("2.4 business days".into()),
            urgent_pos: Some(4),
            department_breakdown: Some(
                breakdown
                    .into_iter()
                    .map(|(department, count, total_amount)| DepartmentBreakdown {
                        department: Some(department.to_string()),
                        count: Some(count),
                        total_amount: Some(total_amount),
                    })
                    .collect(),
            ),
        }),
        alerts: Some(vec![
            alert("warning", "4 urgent POs require immediate attention."),
            alert(
                "reminder",
                "7 POs have been pending for more than 3 business days.",
            ),
        ]),
        message: Some(
            "Dashboard summary as of February 25, 2026. 23 POs are currently pending \
             approval with a total value of $1,842,650.75."
                .into(),
        ),
        ..Default::default()
    }
}

pub fn reminder_response() -> WorkflowResponse {
    let approvers = [
        ("Jennifer Walsh", "Finance Director", "j.walsh@company.com", 3, true),
        ("David Kim", "VP of Operations", "d.kim@company.com", 2, true),
        ("Maria Santos", "HR Director", "m.santos@company.com", 5, false),
        ("James Liu", "CTO", "j.liu@company.com", 1, true),
    ];
    WorkflowResponse {
        action_type: Some("send_reminder".into()),
        reminder_details: Some(ReminderDetails {
            pending_approvers: Some(
                approvers
                    .into_iter()
                    .map(|(name, role, email, days_pending, reminder_sent)| PendingApprover {
                        name: Some(name.to_string()),
                        role: Some(role.to_string()),
                        email: Some(email.to_string()),
                        days_pending: Some(days_pending),
                        reminder_sent: Some(reminder_sent),
                    })
                    .collect(),
            ),
            reminder_message: Some(
                "Reminder notifications have been sent to 3 out of 4 pending approvers. \
                 Maria Santos could not be reached - please follow up manually."
                    .into(),
            ),
        }),
        alerts: Some(vec![
            alert(
                "warning",
                "Maria Santos has not responded for 5 business days. Consider escalation.",
            ),
            alert("info", "Reminders successfully sent to 3 approvers."),
        ]),
        message: Some(
            "Reminder check complete. 4 approvers have pending POs. Automated reminders \
             sent to 3 approvers. 1 requires manual follow-up."
                .into(),
        ),
        ..Default::default()
    }
}

/// Form values matching the canned submit response.
pub fn submit_form() -> PurchaseOrderForm {
    PurchaseOrderForm {
        requester: "Sarah Chen".into(),
        department: "IT".into(),
        amount: "24500".into(),
        vendor: "Dell Technologies".into(),
        vendor_status: "preferred".into(),
        description: "Procurement of 10 Dell Latitude 7450 laptops for new engineering team members"
            .into(),
        priority: "high".into(),
        category: "hardware".into(),
    }
}

/// Search query matching the canned status response.
pub const STATUS_QUERY: &str = "PO-2026-00612";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ActionType;
    use crate::core::render::{TimelineIcon, timeline};

    #[test]
    fn canned_payloads_carry_their_action_types() {
        assert_eq!(submit_response().action(), ActionType::SubmitPo);
        assert_eq!(status_response().action(), ActionType::CheckStatus);
        assert_eq!(dashboard_response().action(), ActionType::Dashboard);
        assert_eq!(reminder_response().action(), ActionType::SendReminder);
    }

    #[test]
    fn canned_submit_chain_renders_one_approved_then_two_pending() {
        let response = submit_response();
        let nodes = timeline(response.chain());
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].icon, TimelineIcon::Approved);
        assert_eq!(nodes[1].icon, TimelineIcon::Pending);
        assert_eq!(nodes[2].icon, TimelineIcon::Pending);
        assert!(nodes[2].is_last);
        assert_eq!(response.approval_progress, Some(33.0));
    }

    #[test]
    fn canned_form_passes_submit_validation() {
        use crate::core::lane::{LaneIntent, SubmitIntent};
        assert!(SubmitIntent(submit_form()).instruction().is_some());
    }
}
