use chrono::{Days, NaiveDate};
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::board::BoardState;
use crate::model::task::{Priority, Task, TaskStatus};
use crate::ops::query::resolve_project;

/// Number of calendar days covered by the completion trend
pub const TREND_DAYS: u64 = 7;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectStats {
    /// `None` collects tasks without a (resolvable) project
    pub project_id: Option<String>,
    pub name: String,
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendDay {
    pub date: NaiveDate,
    /// Tasks created on this day
    pub created: usize,
    /// How many of those are done now
    pub completed: usize,
}

/// Aggregate analytics over the non-archived tasks of a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub total: usize,
    pub by_status: StatusCounts,
    pub by_priority: PriorityCounts,
    pub by_project: Vec<ProjectStats>,
    pub trend: Vec<TrendDay>,
    pub overdue: usize,
    pub tracked_minutes: u64,
}

pub fn board_stats(state: &BoardState, today: NaiveDate) -> BoardStats {
    let tasks: Vec<&Task> = state.tasks.values().filter(|t| !t.archived).collect();
    BoardStats {
        total: tasks.len(),
        by_status: status_counts(&tasks),
        by_priority: priority_counts(&tasks),
        by_project: project_stats(state, &tasks),
        trend: completion_trend(&tasks, today),
        overdue: tasks
            .iter()
            .filter(|t| !t.is_done() && t.due_date.is_some_and(|d| d < today))
            .count(),
        tracked_minutes: tasks
            .iter()
            .map(|t| t.time_tracking.elapsed)
            .fold(0, u64::saturating_add),
    }
}

pub fn status_counts(tasks: &[&Task]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for task in tasks {
        match task.status {
            TaskStatus::Todo => counts.todo += 1,
            TaskStatus::InProgress => counts.in_progress += 1,
            TaskStatus::Done => counts.done += 1,
        }
    }
    counts
}

pub fn priority_counts(tasks: &[&Task]) -> PriorityCounts {
    let mut counts = PriorityCounts::default();
    for task in tasks {
        match task.priority {
            Priority::Low => counts.low += 1,
            Priority::Medium => counts.medium += 1,
            Priority::High => counts.high += 1,
        }
    }
    counts
}

/// Per-project totals, in project order, followed by a "No project" bucket
/// if any task has no resolvable project.
pub fn project_stats(state: &BoardState, tasks: &[&Task]) -> Vec<ProjectStats> {
    let mut buckets: IndexMap<Option<String>, ProjectStats> = state
        .projects
        .values()
        .map(|p| {
            (
                Some(p.id.clone()),
                ProjectStats {
                    project_id: Some(p.id.clone()),
                    name: p.name.clone(),
                    total: 0,
                    completed: 0,
                },
            )
        })
        .collect();

    for task in tasks {
        let key = resolve_project(task, &state.projects).map(|p| p.id.clone());
        let entry = buckets.entry(key).or_insert_with(|| ProjectStats {
            project_id: None,
            name: "No project".to_string(),
            total: 0,
            completed: 0,
        });
        entry.total += 1;
        if task.is_done() {
            entry.completed += 1;
        }
    }

    buckets.into_values().collect()
}

/// One entry per day for the `TREND_DAYS` days ending at `today`, oldest
/// first, bucketed by the calendar day (UTC) of `created_at`.
pub fn completion_trend(tasks: &[&Task], today: NaiveDate) -> Vec<TrendDay> {
    (0..TREND_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| {
            let created: Vec<&&Task> = tasks
                .iter()
                .filter(|t| t.created_at.date_naive() == date)
                .collect();
            TrendDay {
                date,
                created: created.len(),
                completed: created.iter().filter(|t| t.is_done()).count(),
            }
        })
        .collect()
}
