use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::{ConsoleTui, FORM_FIELDS, Tab};
use crate::core::lane::LaneSnapshot;
use crate::core::model::{PoDetails, WorkflowResponse};
use crate::core::render::{
    AlertKind, ConnectorKind, Priority, StepStatus, TimelineIcon, Tone, format_usd,
    log_status_tone, pending_days_tone, status_label, timeline, vendor_tone,
};
use crate::core::render::markdown::{MdBlock, MdSpan, parse_blocks};
use crate::core::schedule::{MessageTone, SchedulePhase};
use crate::core::scheduler::cron_to_human;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

// Tones map to terminal colors in exactly one place.
fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Positive => Color::Green,
        Tone::Caution => Color::Yellow,
        Tone::Negative => Color::Red,
        Tone::Elevated => Color::LightRed,
        Tone::Muted => Color::DarkGray,
        Tone::Info => Color::Blue,
        Tone::Dimmed => Color::Gray,
    }
}

fn badge(label: &str, tone: Tone) -> Span<'static> {
    Span::styled(format!("[{label}]"), Style::default().fg(tone_color(tone)))
}

fn dim(text: &str) -> Span<'static> {
    Span::styled(text.to_string(), Style::default().fg(Color::DarkGray))
}

fn plain(text: &str) -> Span<'static> {
    Span::raw(text.to_string())
}

fn spinner(tick: usize) -> &'static str {
    SPINNER_FRAMES[tick % SPINNER_FRAMES.len()]
}

pub fn draw(frame: &mut Frame, app: &ConsoleTui) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_tabs(frame, app, chunks[1]);
    draw_body(frame, app, chunks[2]);
    draw_footer(frame, app, chunks[3]);
}

fn draw_header(frame: &mut Frame, app: &ConsoleTui, area: Rect) {
    let busy = if app.console().is_busy() {
        Span::styled(
            format!("{} Processing", spinner(app.tick())),
            Style::default().fg(Color::Blue),
        )
    } else {
        Span::styled("● Ready", Style::default().fg(Color::Green))
    };
    let sample = if app.console().sample_data() {
        Span::styled("Sample Data: ON", Style::default().fg(Color::Yellow))
    } else {
        dim("Sample Data: OFF")
    };
    let line = Line::from(vec![
        Span::styled(
            " PO Approval Workflow Manager ",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        dim("· multi-level purchase order approvals  "),
        sample,
        plain("  "),
        busy,
    ]);
    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(header, area);
}

fn draw_tabs(frame: &mut Frame, app: &ConsoleTui, area: Rect) {
    let mut spans = vec![plain(" ")];
    for tab in Tab::ALL {
        if tab == app.active_tab() {
            spans.push(Span::styled(
                format!(" {} ", tab.title()),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(
                format!(" {} ", tab.title()),
                Style::default().fg(Color::Gray),
            ));
        }
        spans.push(plain(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_footer(frame: &mut Frame, app: &ConsoleTui, area: Rect) {
    let hints = match app.active_tab() {
        Tab::Submit => "↑/↓ field · type to edit · Enter submit · Tab next pane · ^S sample · ^C quit",
        Tab::Status => "type query · Enter check status · Tab next pane · ^S sample · ^C quit",
        Tab::Dashboard => "Enter/r load dashboard · Tab next pane · ^S sample · ^C quit",
        Tab::Reminders => "Enter/r run reminder sweep · Tab next pane · ^S sample · ^C quit",
        Tab::Schedule => "p pause/resume · t run now · l logs · r refresh · Tab next pane · ^C quit",
    };
    frame.render_widget(Paragraph::new(Line::from(dim(hints))), area);
}

fn draw_body(frame: &mut Frame, app: &ConsoleTui, area: Rect) {
    let lines = match app.active_tab() {
        Tab::Submit => submit_lines(app),
        Tab::Status => status_lines(app),
        Tab::Dashboard => dashboard_lines(app),
        Tab::Reminders => reminder_lines(app),
        Tab::Schedule => schedule_lines(app),
    };
    let body = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(body, area);
}

pub fn draw_recovery(frame: &mut Frame, app: &ConsoleTui) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Something went wrong",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(plain(&format!(
            "  {}",
            app.render_fault().unwrap_or("unknown rendering fault")
        ))),
        Line::from(""),
        Line::from(dim("  Press r to try again, Ctrl+C to quit.")),
    ];
    let view = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Recovery "))
        .wrap(Wrap { trim: false });
    frame.render_widget(view, frame.area());
}

// ── Markdown ───────────────────────────────────────────────────────────────

fn md_spans(spans: &[MdSpan], prefix: &str) -> Line<'static> {
    let mut parts = vec![plain(prefix)];
    for span in spans {
        if span.strong {
            parts.push(Span::styled(
                span.text.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        } else {
            parts.push(plain(&span.text));
        }
    }
    Line::from(parts)
}

fn md_lines(text: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut ordinal = 0usize;
    for block in parse_blocks(text) {
        if !matches!(block, MdBlock::Numbered(_)) {
            ordinal = 0;
        }
        match block {
            MdBlock::Heading { level, text } => {
                let style = match level {
                    1 => Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    2 => Style::default().add_modifier(Modifier::BOLD),
                    _ => Style::default().add_modifier(Modifier::ITALIC),
                };
                lines.push(Line::from(Span::styled(format!("  {text}"), style)));
            }
            MdBlock::Bullet(spans) => lines.push(md_spans(&spans, "    • ")),
            MdBlock::Numbered(spans) => {
                ordinal += 1;
                lines.push(md_spans(&spans, &format!("    {ordinal}. ")));
            }
            MdBlock::Paragraph(spans) => lines.push(md_spans(&spans, "  ")),
            MdBlock::Spacer => lines.push(Line::from("")),
        }
    }
    lines
}

// ── Shared response sections ───────────────────────────────────────────────

fn loading_line(tick: usize, label: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {} {label}", spinner(tick)),
        Style::default().fg(Color::Yellow),
    ))
}

fn error_line(message: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled("  ✘ ", Style::default().fg(Color::Red)),
        Span::styled(message.to_string(), Style::default().fg(Color::Red)),
    ])
}

fn field_row(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![dim(&format!("  {label:<16}")), plain(value)])
}

fn po_details_lines(details: &PoDetails) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let priority = Priority::parse(details.priority.as_deref());
    lines.push(Line::from(vec![
        Span::styled(
            format!("  {} ", details.po_number.as_deref().unwrap_or("N/A")),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        badge(details.priority.as_deref().unwrap_or("unknown"), priority.tone()),
        plain(" "),
        badge(details.category.as_deref().unwrap_or("other"), Tone::Info),
    ]));
    if let Some(description) = &details.description {
        lines.push(Line::from(dim(&format!("  {description}"))));
    }
    lines.push(field_row("Requester", details.requester.as_deref().unwrap_or("N/A")));
    lines.push(field_row("Department", details.department.as_deref().unwrap_or("N/A")));
    lines.push(Line::from(vec![
        dim(&format!("  {:<16}", "Amount")),
        Span::styled(
            format_usd(details.amount),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(field_row("Vendor", details.vendor.as_deref().unwrap_or("N/A")));
    lines.push(Line::from(vec![
        dim(&format!("  {:<16}", "Vendor Status")),
        badge(
            details.vendor_status.as_deref().unwrap_or("N/A"),
            vendor_tone(details.vendor_status.as_deref()),
        ),
    ]));
    lines.push(field_row(
        "Submitted",
        details.submission_date.as_deref().unwrap_or("N/A"),
    ));
    if let Some(estimated) = &details.estimated_completion {
        lines.push(field_row("Est. Completion", estimated));
    }
    lines
}

fn progress_bar(progress: f64) -> Line<'static> {
    let clamped = progress.clamp(0.0, 100.0);
    let filled = (clamped / 5.0).round() as usize;
    let bar: String = "█".repeat(filled) + &"─".repeat(20 - filled);
    Line::from(vec![
        dim(&format!("  {:<16}", "Progress")),
        Span::styled(bar, Style::default().fg(Color::Blue)),
        plain(&format!(" {clamped:.0}%")),
    ])
}

fn status_badge(status: Option<&str>) -> Span<'static> {
    badge(
        &status_label(status),
        StepStatus::parse(status).tone(),
    )
}

fn chain_lines(response: &WorkflowResponse) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    lines.push(Line::from(vec![
        Span::styled("  Approval Chain ", Style::default().add_modifier(Modifier::BOLD)),
        status_badge(response.current_status.as_deref()),
    ]));
    if let Some(progress) = response.approval_progress {
        lines.push(progress_bar(progress));
    }

    let chain = response.chain();
    if chain.is_empty() {
        lines.push(Line::from(dim("  No approval steps available.")));
        return lines;
    }

    for (node, step) in timeline(chain).iter().zip(chain) {
        let (glyph, color) = match node.icon {
            TimelineIcon::Approved => ("✔", Color::Green),
            TimelineIcon::Rejected => ("✘", Color::Red),
            TimelineIcon::Skipped => ("»", Color::Gray),
            TimelineIcon::Pending => ("◷", Color::Yellow),
        };
        let connector_color = match node.connector {
            ConnectorKind::Positive => Color::Green,
            ConnectorKind::Negative => Color::Red,
            ConnectorKind::Dimmed => Color::Gray,
            ConnectorKind::Neutral => Color::DarkGray,
        };
        // The last node never draws an outgoing connector.
        let connector = |text: &str| {
            if node.is_last {
                plain(&" ".repeat(text.chars().count()))
            } else {
                Span::styled(text.to_string(), Style::default().fg(connector_color))
            }
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {glyph} "), Style::default().fg(color)),
            plain(step.approver_name.as_deref().unwrap_or("Unknown")),
            dim(&format!("  Step {} ", node.step_label)),
            status_badge(step.status.as_deref()),
        ]));
        lines.push(Line::from(vec![
            connector("  │  "),
            dim(step.approver_role.as_deref().unwrap_or("")),
        ]));
        if let Some(notes) = step.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            lines.push(Line::from(vec![
                connector("  │  "),
                Span::styled(
                    notes.to_string(),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                ),
            ]));
        }
    }
    lines
}

fn alert_lines(response: &WorkflowResponse) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for alert in response.alert_items() {
        let kind = AlertKind::parse(alert.kind.as_deref());
        let glyph = match kind {
            AlertKind::Error => "✘",
            AlertKind::Warning => "▲",
            AlertKind::Reminder => "◉",
            AlertKind::Info => "ℹ",
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {glyph} "),
                Style::default().fg(tone_color(kind.tone())),
            ),
            plain(alert.message.as_deref().unwrap_or("")),
        ]));
    }
    lines
}

fn workflow_result_lines(response: &WorkflowResponse) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(message) = &response.message {
        lines.extend(md_lines(message));
        lines.push(Line::from(""));
    }
    if let Some(details) = &response.po_details {
        lines.extend(po_details_lines(details));
        lines.push(Line::from(""));
    }
    lines.extend(chain_lines(response));
    lines.push(Line::from(""));
    lines.extend(alert_lines(response));
    lines
}

fn lane_outcome_lines(
    snapshot: &LaneSnapshot,
    tick: usize,
    loading_label: &str,
    empty_hint: &str,
    render: impl Fn(&WorkflowResponse) -> Vec<Line<'static>>,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if snapshot.loading {
        lines.push(loading_line(tick, loading_label));
        return lines;
    }
    if let Some(error) = &snapshot.error {
        lines.push(error_line(error));
        return lines;
    }
    match &snapshot.result {
        Some(response) => lines.extend(render(response)),
        None => lines.push(Line::from(dim(empty_hint))),
    }
    lines
}

// ── Tabs ───────────────────────────────────────────────────────────────────

fn submit_lines(app: &ConsoleTui) -> Vec<Line<'static>> {
    let inputs = app.console().inputs();
    let values = [
        inputs.form.requester.clone(),
        inputs.form.department.clone(),
        inputs.form.amount.clone(),
        inputs.form.vendor.clone(),
        inputs.form.vendor_status.clone(),
        inputs.form.priority.clone(),
        inputs.form.category.clone(),
        inputs.form.description.clone(),
    ];

    let mut lines = vec![Line::from(Span::styled(
        "  New Purchase Order",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for (index, (label, value)) in FORM_FIELDS.iter().zip(values).enumerate() {
        let focused = index == app.form_focus();
        let marker = if focused { "▌" } else { " " };
        let value_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(marker.to_string(), Style::default().fg(Color::Cyan)),
            dim(&format!(" {label:<16}")),
            Span::styled(value, value_style),
        ]));
    }
    lines.push(Line::from(""));

    lines.extend(lane_outcome_lines(
        &app.console().submit_view(),
        app.tick(),
        "Submitting...",
        "  Fill in the details above and press Enter to submit for approval.",
        workflow_result_lines,
    ));
    lines
}

fn status_lines(app: &ConsoleTui) -> Vec<Line<'static>> {
    let inputs = app.console().inputs();
    let mut lines = vec![
        Line::from(Span::styled(
            "  Track Purchase Order",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            dim("  Query  "),
            Span::styled(inputs.search_query, Style::default().fg(Color::Cyan)),
            Span::styled("▏", Style::default().fg(Color::Cyan)),
        ]),
        Line::from(""),
    ];
    lines.extend(lane_outcome_lines(
        &app.console().status_view(),
        app.tick(),
        "Searching...",
        "  Enter a PO number above to view its approval status and chain.",
        workflow_result_lines,
    ));
    lines
}

fn dashboard_result_lines(response: &WorkflowResponse) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(message) = &response.message {
        lines.extend(md_lines(message));
        lines.push(Line::from(""));
    }

    let summary = response.dashboard_summary.clone().unwrap_or_default();
    let count = |value: Option<u32>| value.unwrap_or(0).to_string();
    let tiles: [(&str, String, Tone); 7] = [
        ("Total POs", count(summary.total_pos), Tone::Info),
        ("Pending Approval", count(summary.pending_approval), Tone::Caution),
        ("Approved", count(summary.approved), Tone::Positive),
        ("Rejected", count(summary.rejected), Tone::Negative),
        ("Total Amount", format_usd(summary.total_amount), Tone::Positive),
        ("Urgent POs", count(summary.urgent_pos), Tone::Elevated),
        (
            "Avg. Approval Time",
            summary
                .average_approval_time
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            Tone::Info,
        ),
    ];
    for (label, value, tone) in tiles {
        lines.push(Line::from(vec![
            dim(&format!("  {label:<20}")),
            Span::styled(value, Style::default().fg(tone_color(tone)).add_modifier(Modifier::BOLD)),
        ]));
    }

    if let Some(breakdown) = summary
        .department_breakdown
        .as_ref()
        .filter(|rows| !rows.is_empty())
    {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Department Breakdown",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(dim(&format!(
            "  {:<16}{:>10}{:>16}",
            "Department", "PO Count", "Total Amount"
        ))));
        for row in breakdown {
            lines.push(Line::from(vec![
                plain(&format!(
                    "  {:<16}{:>10}",
                    row.department.as_deref().unwrap_or("N/A"),
                    row.count.unwrap_or(0)
                )),
                Span::styled(
                    format!("{:>16}", format_usd(row.total_amount)),
                    Style::default().fg(Color::Green),
                ),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.extend(alert_lines(response));
    lines
}

fn dashboard_lines(app: &ConsoleTui) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "  Approval Dashboard",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(lane_outcome_lines(
        &app.console().dashboard_view(),
        app.tick(),
        "Loading...",
        "  Press Enter to fetch the latest PO approval metrics.",
        dashboard_result_lines,
    ));
    lines
}

fn reminder_result_lines(response: &WorkflowResponse) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if let Some(message) = &response.message {
        lines.extend(md_lines(message));
        lines.push(Line::from(""));
    }

    let details = response.reminder_details.clone().unwrap_or_default();
    if let Some(approvers) = details
        .pending_approvers
        .as_ref()
        .filter(|rows| !rows.is_empty())
    {
        lines.push(Line::from(Span::styled(
            format!("  Pending Approvers ({})", approvers.len()),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(dim(&format!(
            "  {:<18}{:<20}{:<26}{:>6}  {}",
            "Name", "Role", "Email", "Days", "Sent"
        ))));
        for approver in approvers {
            let days = approver.days_pending.unwrap_or(0);
            let unit = if days == 1 { "day" } else { "days" };
            let sent = approver.reminder_sent.unwrap_or(false);
            lines.push(Line::from(vec![
                plain(&format!(
                    "  {:<18}{:<20}{:<26}",
                    approver.name.as_deref().unwrap_or("N/A"),
                    approver.role.as_deref().unwrap_or("N/A"),
                    approver.email.as_deref().unwrap_or("N/A"),
                )),
                Span::styled(
                    format!("{days:>2} {unit}"),
                    Style::default().fg(tone_color(pending_days_tone(days))),
                ),
                if sent {
                    Span::styled("  ✔", Style::default().fg(Color::Green))
                } else {
                    Span::styled("  ✘", Style::default().fg(Color::Red))
                },
            ]));
        }
        lines.push(Line::from(""));
    }

    if let Some(summary) = &details.reminder_message {
        lines.push(Line::from(Span::styled(
            "  Reminder Summary",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.extend(md_lines(summary));
        lines.push(Line::from(""));
    }

    lines.extend(alert_lines(response));
    lines
}

fn reminder_lines(app: &ConsoleTui) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "  Pending Reminders",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(lane_outcome_lines(
        &app.console().reminder_view(),
        app.tick(),
        "Checking...",
        "  Press Enter to see approvers with pending POs.",
        reminder_result_lines,
    ));
    lines
}

fn schedule_lines(app: &ConsoleTui) -> Vec<Line<'static>> {
    let snapshot = app.console().schedule_view();
    let timezone = app.console().config().timezone_label.clone();
    let mut lines = vec![Line::from(vec![
        Span::styled(
            "  Automated Reminder Schedule ",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        match snapshot.phase {
            SchedulePhase::Active => badge("Active", Tone::Positive),
            SchedulePhase::Paused => badge("Paused", Tone::Muted),
            SchedulePhase::Unknown => dim("unresolved"),
        },
    ])];

    if snapshot.fetching {
        lines.push(loading_line(app.tick(), "Loading schedule..."));
    } else if let Some(schedule) = &snapshot.current {
        let cron = schedule.cron.as_deref().unwrap_or("");
        lines.push(field_row("Schedule", &cron_to_human(cron)));
        lines.push(field_row("Timezone", &timezone));
        lines.push(field_row("Cron Expression", cron));
        lines.push(Line::from(""));
        let action = if snapshot.phase == SchedulePhase::Active {
            "p Pause Schedule"
        } else {
            "p Activate Schedule"
        };
        if snapshot.action_loading || snapshot.trigger_loading {
            lines.push(loading_line(app.tick(), "Updating..."));
        } else {
            lines.push(Line::from(dim(&format!(
                "  {action} · t Run Now · l Load Logs · r Refresh"
            ))));
        }
    } else {
        lines.push(Line::from(dim(
            "  Schedule not found. It may not be configured yet or the schedule id may have changed.",
        )));
    }

    if let Some(message) = &snapshot.message {
        let tone = match message.tone {
            MessageTone::Success => Tone::Positive,
            MessageTone::Error => Tone::Negative,
            MessageTone::Info => Tone::Info,
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", message.text),
            Style::default().fg(tone_color(tone)),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Execution History",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if snapshot.logs_loading {
        lines.push(loading_line(app.tick(), "Loading execution logs..."));
    } else if snapshot.logs.is_empty() {
        lines.push(Line::from(dim(
            "  No execution logs yet. Press l to fetch history.",
        )));
    } else {
        lines.push(Line::from(dim(&format!(
            "  {:<26}{:<12}{}",
            "Executed At", "Status", "Details"
        ))));
        for entry in &snapshot.logs {
            let status = entry.status.as_deref();
            lines.push(Line::from(vec![
                plain(&format!("  {:<26}", entry.executed_at_display())),
                Span::styled(
                    format!("{:<12}", status.unwrap_or("unknown")),
                    Style::default().fg(tone_color(log_status_tone(status))),
                ),
                plain(&entry.detail()),
            ]));
        }
    }
    lines
}
