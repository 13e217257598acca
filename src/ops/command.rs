use chrono::{DateTime, Utc};

use crate::model::board::BoardState;
use crate::model::project::{Project, ProjectInput};
use crate::model::task::{Comment, Subtask, Task, TaskDraft, TaskStatus};
use crate::ops::import::{ImportError, ImportReport, import_csv};
use crate::ops::task_ops::StoreError;
use crate::ops::{project_ops, task_ops};

/// Every state change the board accepts
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddTask(TaskDraft),
    UpdateTask(Task),
    DeleteTask(String),
    ArchiveTask(String),
    RestoreTask(String),
    SetStatus {
        task_id: String,
        status: TaskStatus,
    },
    AddSubtask {
        task_id: String,
        title: String,
    },
    ToggleSubtask {
        task_id: String,
        subtask_id: String,
    },
    DeleteSubtask {
        task_id: String,
        subtask_id: String,
    },
    AddComment {
        task_id: String,
        text: String,
    },
    DeleteComment {
        task_id: String,
        comment_id: String,
    },
    StartTimer(String),
    StopTimer(String),
    ClearArchived,
    AddProject(ProjectInput),
    UpdateProject(Project),
    DeleteProject(String),
    ArchiveProject(String),
    RestoreProject(String),
    ImportCsv(String),
}

impl Command {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddTask(_) => "add_task",
            Command::UpdateTask(_) => "update_task",
            Command::DeleteTask(_) => "delete_task",
            Command::ArchiveTask(_) => "archive_task",
            Command::RestoreTask(_) => "restore_task",
            Command::SetStatus { .. } => "set_status",
            Command::AddSubtask { .. } => "add_subtask",
            Command::ToggleSubtask { .. } => "toggle_subtask",
            Command::DeleteSubtask { .. } => "delete_subtask",
            Command::AddComment { .. } => "add_comment",
            Command::DeleteComment { .. } => "delete_comment",
            Command::StartTimer(_) => "start_timer",
            Command::StopTimer(_) => "stop_timer",
            Command::ClearArchived => "clear_archived",
            Command::AddProject(_) => "add_project",
            Command::UpdateProject(_) => "update_project",
            Command::DeleteProject(_) => "delete_project",
            Command::ArchiveProject(_) => "archive_project",
            Command::RestoreProject(_) => "restore_project",
            Command::ImportCsv(_) => "import_csv",
        }
    }
}

/// What a successful command produced
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Task(Task),
    Project(Project),
    Subtask(Subtask),
    Comment(Comment),
    /// New value of a toggled flag
    Toggled(bool),
    /// Minutes added by stopping a timer
    Minutes(u64),
    /// Number of records removed
    Removed(usize),
    Import(ImportReport),
    Done,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Import(#[from] ImportError),
}

impl CommandError {
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            CommandError::Store(e) => Some(e),
            CommandError::Import(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.store_error().is_some_and(StoreError::is_not_found)
    }

    pub fn is_conflict(&self) -> bool {
        self.store_error().is_some_and(StoreError::is_conflict)
    }

    pub fn is_validation(&self) -> bool {
        self.store_error().is_some_and(StoreError::is_validation)
    }
}

/// Apply a command to a board and return the resulting board. The input is
/// never modified, so a failed command has no effect at all.
pub fn apply(
    command: Command,
    state: &BoardState,
    now: DateTime<Utc>,
) -> Result<(BoardState, Outcome), CommandError> {
    let mut next = state.clone();
    let outcome = apply_in_place(command, &mut next, now)?;
    Ok((next, outcome))
}

/// Apply a command directly to `state`. Every store operation validates
/// before it mutates, but callers that need all-or-nothing semantics for
/// imports should work on a copy (as `apply` does).
pub fn apply_in_place(
    command: Command,
    next: &mut BoardState,
    now: DateTime<Utc>,
) -> Result<Outcome, CommandError> {
    let outcome = match command {
        Command::AddTask(draft) => Outcome::Task(task_ops::add_task(next, draft, now)?),
        Command::UpdateTask(task) => Outcome::Task(task_ops::update_task(next, task)?),
        Command::DeleteTask(id) => Outcome::Task(task_ops::delete_task(next, &id)?),
        Command::ArchiveTask(id) => {
            task_ops::archive_task(next, &id)?;
            Outcome::Done
        }
        Command::RestoreTask(id) => {
            task_ops::restore_task(next, &id)?;
            Outcome::Done
        }
        Command::SetStatus { task_id, status } => {
            task_ops::set_status(next, &task_id, status)?;
            Outcome::Done
        }
        Command::AddSubtask { task_id, title } => {
            Outcome::Subtask(task_ops::add_subtask(next, &task_id, &title)?)
        }
        Command::ToggleSubtask {
            task_id,
            subtask_id,
        } => Outcome::Toggled(task_ops::toggle_subtask(next, &task_id, &subtask_id)?),
        Command::DeleteSubtask {
            task_id,
            subtask_id,
        } => {
            task_ops::delete_subtask(next, &task_id, &subtask_id)?;
            Outcome::Done
        }
        Command::AddComment { task_id, text } => {
            Outcome::Comment(task_ops::add_comment(next, &task_id, &text, now)?)
        }
        Command::DeleteComment {
            task_id,
            comment_id,
        } => {
            task_ops::delete_comment(next, &task_id, &comment_id)?;
            Outcome::Done
        }
        Command::StartTimer(id) => {
            task_ops::start_timer(next, &id, now)?;
            Outcome::Done
        }
        Command::StopTimer(id) => Outcome::Minutes(task_ops::stop_timer(next, &id, now)?),
        Command::ClearArchived => Outcome::Removed(task_ops::clear_archived(next)),
        Command::AddProject(input) => Outcome::Project(project_ops::add_project(next, input, now)?),
        Command::UpdateProject(project) => {
            Outcome::Project(project_ops::update_project(next, project, now)?)
        }
        Command::DeleteProject(id) => Outcome::Project(project_ops::delete_project(next, &id)?),
        Command::ArchiveProject(id) => {
            project_ops::archive_project(next, &id, now)?;
            Outcome::Done
        }
        Command::RestoreProject(id) => {
            project_ops::restore_project(next, &id, now)?;
            Outcome::Done
        }
        Command::ImportCsv(text) => Outcome::Import(import_csv(next, &text, now)?),
    };
    Ok(outcome)
}
