use serde::Serialize;

use crate::model::project::Project;
use crate::model::task::{Task, TaskStatus};
use crate::ops::import::ImportReport;
use crate::ops::stats::BoardStats;

/// Number of id characters shown in text output
pub const SHORT_ID_LEN: usize = 8;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson<'a> {
    #[serde(flatten)]
    pub task: &'a Task,
    /// Name of the project the reference resolves to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<&'a str>,
}

#[derive(Serialize)]
pub struct TaskListJson<'a> {
    pub count: usize,
    pub tasks: Vec<TaskJson<'a>>,
}

#[derive(Serialize)]
pub struct ColumnJson<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<TaskJson<'a>>,
}

#[derive(Serialize)]
pub struct BoardJson<'a> {
    pub columns: Vec<ColumnJson<'a>>,
}

#[derive(Serialize)]
pub struct ProjectJson<'a> {
    #[serde(flatten)]
    pub project: &'a Project,
    pub task_count: usize,
}

#[derive(Serialize)]
pub struct MutationJson {
    pub action: &'static str,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u64>,
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((i, _)) => &id[..i],
        None => id,
    }
}

fn status_marker(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "[ ]",
        TaskStatus::InProgress => "[>]",
        TaskStatus::Done => "[x]",
    }
}

/// One-line summary: `[ ] 1a2b3c4d  high    Title  @project  due:2025-06-01  #tag`
pub fn format_task_line(task: &Task, project_name: Option<&str>) -> String {
    let mut line = format!(
        "{} {}  {:<6}  {}",
        status_marker(task.status),
        short_id(&task.id),
        task.priority.as_str(),
        task.title
    );
    match (project_name, task.project.as_deref()) {
        (Some(name), _) => line.push_str(&format!("  @{}", name)),
        (None, Some(reference)) => line.push_str(&format!("  @{}?", reference)),
        (None, None) => {}
    }
    if let Some(due) = task.due_date {
        line.push_str(&format!("  due:{}", due));
    }
    let (done, total) = task.subtask_progress();
    if total > 0 {
        line.push_str(&format!("  ({}/{})", done, total));
    }
    if task.time_tracking.is_running {
        line.push_str("  *timer*");
    }
    for tag in &task.tags {
        line.push_str(&format!("  #{}", tag));
    }
    line
}

/// Multi-line detail view for `tb show`
pub fn format_task_detail(task: &Task, project_name: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}  {}\n", task.id, task.title));
    out.push_str(&format!("status:   {}\n", task.status.label()));
    out.push_str(&format!("priority: {}\n", task.priority.as_str()));
    if let Some(reference) = task.project.as_deref() {
        let shown = project_name.unwrap_or(reference);
        out.push_str(&format!("project:  {}\n", shown));
    }
    if let Some(due) = task.due_date {
        out.push_str(&format!("due:      {}\n", due));
    }
    if let Some(estimate) = task.estimated_time {
        out.push_str(&format!("estimate: {}m\n", estimate));
    }
    out.push_str(&format!(
        "tracked:  {}m{}\n",
        task.time_tracking.elapsed,
        if task.time_tracking.is_running { " (running)" } else { "" }
    ));
    out.push_str(&format!("created:  {}\n", task.created_at.format("%Y-%m-%d %H:%M")));
    if !task.tags.is_empty() {
        out.push_str(&format!("tags:     {}\n", task.tags.join(", ")));
    }
    if task.archived {
        out.push_str("archived\n");
    }
    if !task.description.is_empty() {
        out.push('\n');
        out.push_str(&task.description);
        out.push('\n');
    }
    if !task.subtasks.is_empty() {
        out.push_str("\nsubtasks:\n");
        for sub in &task.subtasks {
            out.push_str(&format!(
                "  {} {}  {}\n",
                if sub.done { "[x]" } else { "[ ]" },
                short_id(&sub.id),
                sub.title
            ));
        }
    }
    if !task.comments.is_empty() {
        out.push_str("\ncomments:\n");
        for comment in &task.comments {
            out.push_str(&format!(
                "  {}  {}\n",
                comment.created_at.format("%Y-%m-%d %H:%M"),
                comment.text
            ));
        }
    }
    out
}

pub fn format_project_line(project: &Project, task_count: usize) -> String {
    let mut line = format!(
        "{}  {}  {}  ({} tasks)",
        short_id(&project.id),
        project.color,
        project.name,
        task_count
    );
    if !project.is_active() {
        line.push_str("  [archived]");
    }
    line
}

pub fn format_stats(stats: &BoardStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("tasks:       {}\n", stats.total));
    out.push_str(&format!(
        "status:      todo {}  in progress {}  done {}\n",
        stats.by_status.todo, stats.by_status.in_progress, stats.by_status.done
    ));
    out.push_str(&format!(
        "priority:    low {}  medium {}  high {}\n",
        stats.by_priority.low, stats.by_priority.medium, stats.by_priority.high
    ));
    out.push_str(&format!("overdue:     {}\n", stats.overdue));
    out.push_str(&format!("tracked:     {}m\n", stats.tracked_minutes));
    if !stats.by_project.is_empty() {
        out.push_str("\nprojects:\n");
        for p in &stats.by_project {
            out.push_str(&format!("  {:<20} {}/{}\n", p.name, p.completed, p.total));
        }
    }
    out.push_str("\nlast 7 days (created/done):\n");
    for day in &stats.trend {
        out.push_str(&format!("  {}  {}/{}\n", day.date, day.created, day.completed));
    }
    out
}

pub fn format_import_report(report: &ImportReport) -> String {
    let noun = match report.kind {
        crate::ops::import::RecordKind::Tasks => "tasks",
        crate::ops::import::RecordKind::Projects => "projects",
    };
    let mut out = format!("imported {} {}", report.imported.len(), noun);
    if !report.errors.is_empty() {
        out.push_str(&format!(", skipped {} rows:", report.errors.len()));
        for err in &report.errors {
            out.push_str(&format!("\n  {}", err));
        }
    }
    out
}
