use std::cmp::Ordering;

use indexmap::IndexMap;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use crate::model::board::BoardState;
use crate::model::project::{Project, same_name};
use crate::model::task::{Priority, Task, TaskStatus};

/// Constraints for `filtered_tasks`. `None` fields impose nothing; the
/// supplied ones are AND-ed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    /// Compared against the task's project reference like project names are
    pub project: Option<String>,
    pub priority: Option<Priority>,
    pub tag: Option<String>,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.project.is_none()
            && self.priority.is_none()
            && self.tag.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status
            && task.status != status
        {
            return false;
        }
        if let Some(priority) = self.priority
            && task.priority != priority
        {
            return false;
        }
        if let Some(project) = self.project.as_deref().filter(|p| !p.trim().is_empty()) {
            match task.project.as_deref() {
                Some(reference) if same_name(reference, project) => {}
                _ => return false,
            }
        }
        if let Some(tag) = self.tag.as_deref().filter(|t| !t.trim().is_empty()) {
            let tag = tag.trim();
            if !task.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Title,
    Status,
    Priority,
    DueDate,
    CreatedAt,
    EstimatedTime,
    Project,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<SortKey> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "title" => Some(SortKey::Title),
            "status" => Some(SortKey::Status),
            "priority" => Some(SortKey::Priority),
            "duedate" | "due" => Some(SortKey::DueDate),
            "createdat" | "created" => Some(SortKey::CreatedAt),
            "estimatedtime" | "estimate" => Some(SortKey::EstimatedTime),
            "project" => Some(SortKey::Project),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        SortConfig {
            key: SortKey::CreatedAt,
            direction: SortDirection::Asc,
        }
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Non-archived tasks in display order (the default view)
pub fn active_tasks(state: &BoardState) -> Vec<&Task> {
    state.tasks.values().filter(|t| !t.archived).collect()
}

pub fn archived_tasks(state: &BoardState) -> Vec<&Task> {
    state.tasks.values().filter(|t| t.archived).collect()
}

pub fn filtered_tasks<'a>(tasks: &[&'a Task], filter: &TaskFilter) -> Vec<&'a Task> {
    tasks.iter().copied().filter(|t| filter.matches(t)).collect()
}

/// Case-insensitive substring match on title or description. A blank query
/// returns the input as is.
pub fn searched_tasks<'a>(tasks: &[&'a Task], query: &str) -> Vec<&'a Task> {
    let query = query.trim();
    if query.is_empty() {
        return tasks.to_vec();
    }
    match RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => tasks
            .iter()
            .copied()
            .filter(|t| re.is_match(&t.title) || re.is_match(&t.description))
            .collect(),
        Err(_) => {
            let needle = query.to_lowercase();
            tasks
                .iter()
                .copied()
                .filter(|t| {
                    t.title.to_lowercase().contains(&needle)
                        || t.description.to_lowercase().contains(&needle)
                })
                .collect()
        }
    }
}

/// Stable sort. Tasks missing the sort field go last in either direction.
pub fn sorted_tasks<'a>(tasks: &[&'a Task], sort: SortConfig) -> Vec<&'a Task> {
    let mut out = tasks.to_vec();
    out.sort_by(|a, b| compare_tasks(a, b, sort));
    out
}

fn compare_tasks(a: &Task, b: &Task, sort: SortConfig) -> Ordering {
    let directed = |ord: Ordering| match sort.direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    };
    match sort.key {
        SortKey::Title => directed(a.title.to_lowercase().cmp(&b.title.to_lowercase())),
        SortKey::Status => directed(a.status.cmp(&b.status)),
        SortKey::Priority => directed(a.priority.cmp(&b.priority)),
        SortKey::CreatedAt => directed(a.created_at.cmp(&b.created_at)),
        SortKey::DueDate => missing_last(a.due_date, b.due_date, directed),
        SortKey::EstimatedTime => missing_last(a.estimated_time, b.estimated_time, directed),
        SortKey::Project => missing_last(
            a.project.as_ref().map(|p| p.to_lowercase()),
            b.project.as_ref().map(|p| p.to_lowercase()),
            directed,
        ),
    }
}

fn missing_last<T: Ord>(
    a: Option<T>,
    b: Option<T>,
    directed: impl Fn(Ordering) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => directed(a.cmp(&b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Group tasks into the three status columns, preserving order in each.
pub fn kanban_columns<'a>(tasks: &[&'a Task]) -> Vec<(TaskStatus, Vec<&'a Task>)> {
    TaskStatus::ALL
        .iter()
        .map(|&status| {
            let column = tasks.iter().copied().filter(|t| t.status == status).collect();
            (status, column)
        })
        .collect()
}

/// Resolve a task's project reference. Ids win over names, and active
/// projects win over archived ones with the same name. Dangling references
/// resolve to `None`.
pub fn resolve_project<'a>(
    task: &Task,
    projects: &'a IndexMap<String, Project>,
) -> Option<&'a Project> {
    let reference = task.project.as_deref()?;
    if let Some(project) = projects.get(reference) {
        return Some(project);
    }
    projects
        .values()
        .find(|p| p.is_active() && same_name(&p.name, reference))
        .or_else(|| projects.values().find(|p| same_name(&p.name, reference)))
}
