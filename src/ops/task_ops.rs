use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::board::BoardState;
use crate::model::task::{
    Comment, Subtask, Task, TaskDraft, TaskStatus, TimeTracking, normalize_tags,
};

/// What kind of record an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Task,
    Project,
    Subtask,
    Comment,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Task => write!(f, "task"),
            EntityKind::Project => write!(f, "project"),
            EntityKind::Subtask => write!(f, "subtask"),
            EntityKind::Comment => write!(f, "comment"),
        }
    }
}

/// Error type for store commands. A command that returns an error has not
/// changed the state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
    #[error("conflict: {0}")]
    Conflict(String),
}

impl StoreError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        StoreError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation { .. })
    }
}

// ---------------------------------------------------------------------------
// Task CRUD
// ---------------------------------------------------------------------------

/// Build a full task from a draft and append it to the board.
pub fn add_task(
    state: &mut BoardState,
    draft: TaskDraft,
    now: DateTime<Utc>,
) -> Result<Task, StoreError> {
    let task = build_task(state, draft, now)?;
    state.tasks.insert(task.id.clone(), task.clone());
    Ok(task)
}

/// Validate a draft and fill in every default, without inserting it.
pub fn build_task(
    state: &BoardState,
    draft: TaskDraft,
    now: DateTime<Utc>,
) -> Result<Task, StoreError> {
    let title = validate_title(&draft.title)?;

    let id = match draft.id.map(|id| id.trim().to_string()) {
        Some(id) if !id.is_empty() => {
            if state.tasks.contains_key(&id) {
                return Err(StoreError::Conflict(format!("task id {} already exists", id)));
            }
            id
        }
        _ => next_task_id(state),
    };

    Ok(Task {
        id,
        title,
        description: draft.description.unwrap_or_default(),
        status: draft.status.unwrap_or(TaskStatus::Todo),
        priority: draft.priority.unwrap_or_default(),
        project: normalize_project_ref(draft.project),
        due_date: draft.due_date,
        created_at: draft.created_at.unwrap_or(now),
        estimated_time: draft.estimated_time,
        tags: normalize_tags(&draft.tags),
        subtasks: Vec::new(),
        time_tracking: TimeTracking {
            elapsed: draft.elapsed.unwrap_or(0),
            ..TimeTracking::default()
        },
        comments: Vec::new(),
        archived: false,
    })
}

/// Replace the stored task with the same id. This is a full replacement,
/// not a merge; only `created_at` is carried over from the stored record.
pub fn update_task(state: &mut BoardState, task: Task) -> Result<Task, StoreError> {
    let stored = state
        .tasks
        .get(&task.id)
        .ok_or_else(|| StoreError::not_found(EntityKind::Task, &task.id))?;

    let title = validate_title(&task.title)?;
    validate_timer(&task.time_tracking)?;

    let mut task = task;
    task.title = title;
    task.created_at = stored.created_at;
    task.project = normalize_project_ref(task.project);
    task.tags = normalize_tags(&task.tags);

    let slot = find_task_mut(state, &task.id)?;
    *slot = task.clone();
    Ok(task)
}

/// Permanently remove a task. Deleting twice reports not-found the second time.
pub fn delete_task(state: &mut BoardState, task_id: &str) -> Result<Task, StoreError> {
    state
        .tasks
        .shift_remove(task_id)
        .ok_or_else(|| StoreError::not_found(EntityKind::Task, task_id))
}

pub fn archive_task(state: &mut BoardState, task_id: &str) -> Result<(), StoreError> {
    let task = find_task_mut(state, task_id)?;
    task.archived = true;
    Ok(())
}

pub fn restore_task(state: &mut BoardState, task_id: &str) -> Result<(), StoreError> {
    let task = find_task_mut(state, task_id)?;
    task.archived = false;
    Ok(())
}

/// Move a task to another kanban column.
pub fn set_status(
    state: &mut BoardState,
    task_id: &str,
    status: TaskStatus,
) -> Result<(), StoreError> {
    let task = find_task_mut(state, task_id)?;
    task.status = status;
    Ok(())
}

/// Drop every archived task. Returns how many were removed.
pub fn clear_archived(state: &mut BoardState) -> usize {
    let before = state.tasks.len();
    state.tasks.retain(|_, task| !task.archived);
    before - state.tasks.len()
}

// ---------------------------------------------------------------------------
// Subtasks and comments
// ---------------------------------------------------------------------------

pub fn add_subtask(
    state: &mut BoardState,
    task_id: &str,
    title: &str,
) -> Result<Subtask, StoreError> {
    let title = validate_title(title)?;
    let task = find_task_mut(state, task_id)?;
    let subtask = Subtask {
        id: Uuid::new_v4().to_string(),
        title,
        done: false,
    };
    task.subtasks.push(subtask.clone());
    Ok(subtask)
}

/// Flip a subtask's done flag. Returns the new value.
pub fn toggle_subtask(
    state: &mut BoardState,
    task_id: &str,
    subtask_id: &str,
) -> Result<bool, StoreError> {
    let task = find_task_mut(state, task_id)?;
    let subtask = task
        .subtasks
        .iter_mut()
        .find(|s| s.id == subtask_id)
        .ok_or_else(|| StoreError::not_found(EntityKind::Subtask, subtask_id))?;
    subtask.done = !subtask.done;
    Ok(subtask.done)
}

pub fn delete_subtask(
    state: &mut BoardState,
    task_id: &str,
    subtask_id: &str,
) -> Result<(), StoreError> {
    let task = find_task_mut(state, task_id)?;
    let idx = task
        .subtasks
        .iter()
        .position(|s| s.id == subtask_id)
        .ok_or_else(|| StoreError::not_found(EntityKind::Subtask, subtask_id))?;
    task.subtasks.remove(idx);
    Ok(())
}

pub fn add_comment(
    state: &mut BoardState,
    task_id: &str,
    text: &str,
    now: DateTime<Utc>,
) -> Result<Comment, StoreError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(StoreError::validation("comment", "must not be empty"));
    }
    let task = find_task_mut(state, task_id)?;
    let comment = Comment {
        id: Uuid::new_v4().to_string(),
        text: text.to_string(),
        created_at: now,
    };
    task.comments.push(comment.clone());
    Ok(comment)
}

pub fn delete_comment(
    state: &mut BoardState,
    task_id: &str,
    comment_id: &str,
) -> Result<(), StoreError> {
    let task = find_task_mut(state, task_id)?;
    let idx = task
        .comments
        .iter()
        .position(|c| c.id == comment_id)
        .ok_or_else(|| StoreError::not_found(EntityKind::Comment, comment_id))?;
    task.comments.remove(idx);
    Ok(())
}

// ---------------------------------------------------------------------------
// Time tracking
// ---------------------------------------------------------------------------

pub fn start_timer(
    state: &mut BoardState,
    task_id: &str,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let task = find_task_mut(state, task_id)?;
    if task.time_tracking.is_running {
        return Err(StoreError::validation("timer", "already running"));
    }
    task.time_tracking.is_running = true;
    task.time_tracking.start_time = Some(now);
    Ok(())
}

/// Stop a running timer and add the whole minutes since it started.
/// Returns the minutes added.
pub fn stop_timer(
    state: &mut BoardState,
    task_id: &str,
    now: DateTime<Utc>,
) -> Result<u64, StoreError> {
    let task = find_task_mut(state, task_id)?;
    let tracking = &mut task.time_tracking;
    let started = match (tracking.is_running, tracking.start_time) {
        (true, Some(started)) => started,
        _ => return Err(StoreError::validation("timer", "not running")),
    };
    let minutes = u64::try_from((now - started).num_minutes()).unwrap_or(0);
    tracking.elapsed = tracking.elapsed.saturating_add(minutes);
    tracking.is_running = false;
    tracking.start_time = None;
    Ok(minutes)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate a task id not already present on the board.
pub fn next_task_id(state: &BoardState) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !state.tasks.contains_key(&id) {
            return id;
        }
    }
}

pub fn find_task_mut<'a>(
    state: &'a mut BoardState,
    task_id: &str,
) -> Result<&'a mut Task, StoreError> {
    state
        .tasks
        .get_mut(task_id)
        .ok_or_else(|| StoreError::not_found(EntityKind::Task, task_id))
}

fn validate_title(title: &str) -> Result<String, StoreError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(StoreError::validation("title", "must not be empty"));
    }
    Ok(title.to_string())
}

fn validate_timer(tracking: &TimeTracking) -> Result<(), StoreError> {
    if tracking.is_running && tracking.start_time.is_none() {
        return Err(StoreError::validation(
            "time_tracking",
            "a running timer needs a start time",
        ));
    }
    Ok(())
}

fn normalize_project_ref(project: Option<String>) -> Option<String> {
    project
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Priority;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 14, 9, 30, 0).unwrap()
    }

    fn sample_board() -> BoardState {
        let mut state = BoardState::new();
        add_task(&mut state, TaskDraft::new("First task"), now()).unwrap();
        add_task(
            &mut state,
            TaskDraft::new("Second task").with_status(TaskStatus::InProgress),
            now(),
        )
        .unwrap();
        state
    }

    fn first_id(state: &BoardState) -> String {
        state.tasks.keys().next().unwrap().clone()
    }

    // --- CRUD ---

    #[test]
    fn add_task_fills_defaults() {
        let mut state = BoardState::new();
        let task = add_task(&mut state, TaskDraft::new("  Write spec  "), now()).unwrap();
        assert_eq!(task.title, "Write spec");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.created_at, now());
        assert_eq!(task.description, "");
        assert!(task.project.is_none());
        assert!(!task.archived);
        assert_eq!(task.time_tracking, TimeTracking::default());
        assert_eq!(state.tasks.len(), 1);
    }

    #[test]
    fn add_task_rejects_blank_title() {
        let mut state = BoardState::new();
        let err = add_task(&mut state, TaskDraft::new("   "), now()).unwrap_err();
        assert!(err.is_validation());
        assert!(state.tasks.is_empty());
    }

    #[test]
    fn add_task_ids_unique_under_rapid_calls() {
        let mut state = BoardState::new();
        for i in 0..500 {
            add_task(&mut state, TaskDraft::new(format!("Task {}", i)), now()).unwrap();
        }
        assert_eq!(state.tasks.len(), 500);
    }

    #[test]
    fn add_task_keeps_supplied_id_and_created_at() {
        let mut state = BoardState::new();
        let created = now() - Duration::days(3);
        let draft = TaskDraft {
            id: Some("t-1".into()),
            created_at: Some(created),
            ..TaskDraft::new("Imported")
        };
        let task = add_task(&mut state, draft, now()).unwrap();
        assert_eq!(task.id, "t-1");
        assert_eq!(task.created_at, created);
    }

    #[test]
    fn add_task_duplicate_id_conflicts() {
        let mut state = BoardState::new();
        let draft = TaskDraft {
            id: Some("t-1".into()),
            ..TaskDraft::new("One")
        };
        add_task(&mut state, draft.clone(), now()).unwrap();
        let err = add_task(&mut state, draft, now()).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(state.tasks.len(), 1);
    }

    #[test]
    fn add_task_normalizes_tags_and_project() {
        let mut state = BoardState::new();
        let draft = TaskDraft::new("Tagged")
            .with_tags(["ui", "ui", " api "])
            .with_project("  ");
        let task = add_task(&mut state, draft, now()).unwrap();
        assert_eq!(task.tags, vec!["ui", "api"]);
        assert!(task.project.is_none());
    }

    #[test]
    fn update_task_replaces_whole_record() {
        let mut state = sample_board();
        let id = first_id(&state);
        let mut task = state.tasks[&id].clone();
        task.title = "Renamed".into();
        task.description = "Now with words".into();
        task.tags = vec!["x".into()];
        task.created_at = now() + Duration::days(10);

        update_task(&mut state, task).unwrap();
        let stored = &state.tasks[&id];
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.description, "Now with words");
        assert_eq!(stored.tags, vec!["x"]);
        // created_at is immutable
        assert_eq!(stored.created_at, now());
    }

    #[test]
    fn update_task_missing_id_is_not_found() {
        let mut state = sample_board();
        let mut task = state.tasks[&first_id(&state)].clone();
        task.id = "nope".into();
        let err = update_task(&mut state, task).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn update_task_blank_title_leaves_state() {
        let mut state = sample_board();
        let before = state.clone();
        let mut task = state.tasks[&first_id(&state)].clone();
        task.title = " ".into();
        assert!(update_task(&mut state, task).unwrap_err().is_validation());
        assert_eq!(state, before);
    }

    #[test]
    fn delete_task_twice_reports_not_found() {
        let mut state = sample_board();
        let id = first_id(&state);
        delete_task(&mut state, &id).unwrap();
        assert!(!state.tasks.contains_key(&id));
        let err = delete_task(&mut state, &id).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn delete_task_preserves_order_of_rest() {
        let mut state = sample_board();
        add_task(&mut state, TaskDraft::new("Third"), now()).unwrap();
        let id = first_id(&state);
        delete_task(&mut state, &id).unwrap();
        let titles: Vec<&str> = state.tasks.values().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Second task", "Third"]);
    }

    #[test]
    fn archive_and_restore() {
        let mut state = sample_board();
        let id = first_id(&state);
        let original = state.tasks[&id].clone();

        archive_task(&mut state, &id).unwrap();
        assert!(state.tasks[&id].archived);

        restore_task(&mut state, &id).unwrap();
        assert_eq!(state.tasks[&id], original);

        assert!(archive_task(&mut state, "missing").unwrap_err().is_not_found());
        assert!(restore_task(&mut state, "missing").unwrap_err().is_not_found());
    }

    #[test]
    fn clear_archived_removes_only_archived() {
        let mut state = sample_board();
        let id = first_id(&state);
        archive_task(&mut state, &id).unwrap();
        assert_eq!(clear_archived(&mut state), 1);
        assert_eq!(state.tasks.len(), 1);
    }

    // --- Subtasks / comments ---

    #[test]
    fn subtask_lifecycle() {
        let mut state = sample_board();
        let id = first_id(&state);
        let sub = add_subtask(&mut state, &id, "Check links").unwrap();
        assert_eq!(state.tasks[&id].subtask_progress(), (0, 1));

        assert!(toggle_subtask(&mut state, &id, &sub.id).unwrap());
        assert_eq!(state.tasks[&id].subtask_progress(), (1, 1));

        delete_subtask(&mut state, &id, &sub.id).unwrap();
        assert!(state.tasks[&id].subtasks.is_empty());
        assert!(
            toggle_subtask(&mut state, &id, &sub.id)
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn comment_lifecycle() {
        let mut state = sample_board();
        let id = first_id(&state);
        assert!(add_comment(&mut state, &id, "  ", now()).unwrap_err().is_validation());

        let comment = add_comment(&mut state, &id, "Looks good", now()).unwrap();
        assert_eq!(state.tasks[&id].comments.len(), 1);
        assert_eq!(state.tasks[&id].comments[0].text, "Looks good");

        delete_comment(&mut state, &id, &comment.id).unwrap();
        assert!(state.tasks[&id].comments.is_empty());
    }

    // --- Timer ---

    #[test]
    fn timer_adds_elapsed_only_on_stop() {
        let mut state = sample_board();
        let id = first_id(&state);

        start_timer(&mut state, &id, now()).unwrap();
        let tracking = &state.tasks[&id].time_tracking;
        assert!(tracking.is_running);
        assert_eq!(tracking.start_time, Some(now()));
        assert_eq!(tracking.elapsed, 0);

        assert!(start_timer(&mut state, &id, now()).unwrap_err().is_validation());

        let added = stop_timer(&mut state, &id, now() + Duration::seconds(25 * 60 + 40)).unwrap();
        assert_eq!(added, 25);
        let tracking = &state.tasks[&id].time_tracking;
        assert!(!tracking.is_running);
        assert!(tracking.start_time.is_none());
        assert_eq!(tracking.elapsed, 25);

        assert!(stop_timer(&mut state, &id, now()).unwrap_err().is_validation());
    }

    #[test]
    fn timer_stop_before_start_adds_nothing() {
        let mut state = sample_board();
        let id = first_id(&state);
        start_timer(&mut state, &id, now()).unwrap();
        assert_eq!(stop_timer(&mut state, &id, now() - Duration::hours(1)).unwrap(), 0);
    }

    #[test]
    fn timer_stop_saturates_elapsed() {
        let mut state = sample_board();
        let id = first_id(&state);
        state.tasks[&id].time_tracking.elapsed = u64::MAX - 1;
        start_timer(&mut state, &id, now()).unwrap();
        stop_timer(&mut state, &id, now() + Duration::minutes(30)).unwrap();
        assert_eq!(state.tasks[&id].time_tracking.elapsed, u64::MAX);
    }

    #[test]
    fn update_rejects_running_timer_without_start() {
        let mut state = sample_board();
        let mut task = state.tasks[&first_id(&state)].clone();
        task.time_tracking.is_running = true;
        task.time_tracking.start_time = None;
        assert!(update_task(&mut state, task).unwrap_err().is_validation());
    }
}
