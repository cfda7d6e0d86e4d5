//! Terminal output for the `render`, `watch` and `stats` commands

use comfy_table::{Cell, Color, ContentArrangement, Table};
use xpboard_core::analytics::DashboardSummary;
use xpboard_core::error::ErrorSeverity;
use xpboard_core::format::{format_number, format_xp};
use xpboard_core::{RenderReport, SlotOutcome};

fn header(no_color: bool, text: &str) -> Cell {
    if no_color {
        Cell::new(text)
    } else {
        Cell::new(text).fg(Color::Cyan)
    }
}

/// Two-column profile summary
pub fn print_summary(summary: &DashboardSummary, no_color: bool) {
    let mut table = Table::new();
    if no_color {
        table.force_no_tty();
    }
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![header(no_color, "Metric"), header(no_color, "Value")]);

    let projects = &summary.projects;
    let rows: Vec<(&str, String)> = vec![
        (
            "User",
            format!(
                "[{}] {} ({})",
                summary.initials, summary.display_name, summary.login
            ),
        ),
        (
            "Email",
            summary.email.clone().unwrap_or_else(|| "-".to_string()),
        ),
        ("Total XP", format_xp(summary.total_xp)),
        (
            "Level",
            format!(
                "{} ({:.0}% to next)",
                summary.level, summary.progress_to_next_level
            ),
        ),
        (
            "Cohort level",
            summary
                .cohort_level
                .map(|l| l.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        (
            "Audit ratio",
            if summary.audit_ratio_low {
                format!("{} (below 1, make more audits)", summary.audit_ratio)
            } else {
                summary.audit_ratio.clone()
            },
        ),
        (
            "Audits done / received",
            format!("{} / {}", summary.audit_done, summary.audit_received),
        ),
        ("XP last 7 days", format_xp(summary.xp_last_week)),
        ("XP last 30 days", format_xp(summary.xp_last_month)),
        (
            "Last XP project",
            summary
                .last_xp_project
                .as_ref()
                .map(|project| match &summary.last_xp_ago {
                    Some(ago) => format!("{} ({})", project, ago),
                    None => project.clone(),
                })
                .unwrap_or_else(|| "-".to_string()),
        ),
        (
            "Projects",
            format!(
                "{} ({} passed, {} failed, {}% success)",
                format_number(projects.total as i64),
                projects.passed,
                projects.failed,
                projects.success_rate()
            ),
        ),
        (
            "Projects last 30 days",
            format!(
                "{} ({} passed, {} failed, {}% success)",
                summary.recent_projects.total,
                summary.recent_projects.passed,
                summary.recent_projects.failed,
                summary.recent_projects.success_rate
            ),
        ),
        (
            "Top skills",
            if summary.top_skills.is_empty() {
                "-".to_string()
            } else {
                summary.top_skills.join(", ")
            },
        ),
        (
            "Declared skills",
            if summary.declared_skills.is_empty() {
                "-".to_string()
            } else {
                summary
                    .declared_skills
                    .iter()
                    .map(|s| format!("{} {}%", s.skill, s.percentage))
                    .collect::<Vec<_>>()
                    .join(", ")
            },
        ),
    ];

    for (metric, value) in rows {
        let value_cell = if metric == "Audit ratio" && summary.audit_ratio_low {
            styled(Cell::new(value), tint(no_color, Color::Yellow))
        } else {
            Cell::new(value)
        };
        table.add_row(vec![Cell::new(metric), value_cell]);
    }

    println!("{table}");
}

fn outcome_mark(outcome: SlotOutcome, no_color: bool) -> Cell {
    let (mark, color) = match outcome {
        SlotOutcome::Rendered => ("✓ rendered", Color::Green),
        SlotOutcome::Placeholder => ("○ no data", Color::DarkGrey),
        SlotOutcome::Failed => ("✗ failed", Color::Red),
    };
    styled(Cell::new(mark), tint(no_color, color))
}

fn tint(no_color: bool, color: Color) -> Option<Color> {
    (!no_color).then_some(color)
}

fn styled(cell: Cell, color: Option<Color>) -> Cell {
    match color {
        Some(color) => cell.fg(color),
        None => cell,
    }
}

/// Per-slot outcome table
pub fn report_table(report: &RenderReport, no_color: bool) -> Table {
    let mut table = Table::new();
    if no_color {
        table.force_no_tty();
    }
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![header(no_color, "Chart"), header(no_color, "Outcome")]);
    for (slot, outcome) in &report.slots {
        table.add_row(vec![Cell::new(slot), outcome_mark(*outcome, no_color)]);
    }
    table
}

/// Per-slot outcome and any issues from a render cycle
pub fn print_report(report: &RenderReport, no_color: bool) {
    println!("{}", report_table(report, no_color));

    if report.records_skipped > 0 {
        println!("  ({} malformed records skipped)", report.records_skipped);
    }

    if !report.has_errors() {
        return;
    }

    let mut issues = Table::new();
    if no_color {
        issues.force_no_tty();
    }
    issues.set_content_arrangement(ContentArrangement::Dynamic);
    issues.set_header(vec![
        header(no_color, "Severity"),
        header(no_color, "Source"),
        header(no_color, "Message"),
    ]);
    for issue in &report.issues {
        let (label, color) = match issue.severity {
            ErrorSeverity::Warning => ("warning", Color::Yellow),
            ErrorSeverity::Error => ("error", Color::Red),
            ErrorSeverity::Fatal => ("fatal", Color::Magenta),
        };
        let message = match &issue.suggestion {
            Some(hint) => format!("{}\nhint: {}", issue.message, hint),
            None => issue.message.clone(),
        };
        issues.add_row(vec![
            styled(Cell::new(label), tint(no_color, color)),
            Cell::new(&issue.source),
            Cell::new(message),
        ]);
    }
    eprintln!("{issues}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use xpboard_core::error::RenderIssue;
    use xpboard_core::ChartSlot;

    fn report() -> RenderReport {
        let mut report = RenderReport::new();
        report.record_slot(ChartSlot::XpProgress, SlotOutcome::Rendered);
        report.record_slot(ChartSlot::LevelHistogram, SlotOutcome::Failed);
        report.add_issue(RenderIssue::warning("top_skills", "No skill transactions"));
        report
    }

    #[test]
    fn test_no_color_disables_outcome_colors() {
        assert_eq!(tint(true, Color::Red), None);
        assert_eq!(tint(false, Color::Red), Some(Color::Red));
    }

    #[test]
    fn test_report_table_lists_every_slot_without_escapes() {
        let rendered = report_table(&report(), true).to_string();
        assert!(rendered.contains("✓ rendered"));
        assert!(rendered.contains("✗ failed"));
        assert!(!rendered.contains('\u{1b}'));
    }
}
