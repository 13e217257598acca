use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::model::board::BoardState;
use crate::model::config::BoardConfig;
use crate::model::project::{Project, ProjectInput};
use crate::model::task::{Task, TaskDraft, TaskStatus};
use crate::ops::command::{self, Command, CommandError, Outcome};
use crate::ops::history::History;
use crate::ops::import::ImportReport;
use crate::ops::query::{self, SortConfig, TaskFilter};
use crate::ops::stats::{BoardStats, board_stats};
use crate::parse::{CsvError, serialize_projects, serialize_tasks};

/// Source of "now" for timestamps
pub type Clock = fn() -> DateTime<Utc>;

/// A board session: the undo timeline (which owns the live state) plus the
/// current view settings. Every mutation goes through here.
pub struct Engine {
    history: History,
    filter: TaskFilter,
    sort: SortConfig,
    search_query: String,
    show_archived: bool,
    clock: Clock,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(BoardState::default(), &BoardConfig::default())
    }
}

impl Engine {
    pub fn new(state: BoardState, config: &BoardConfig) -> Self {
        Engine {
            history: History::new(state, config.history.max_depth),
            filter: TaskFilter::default(),
            sort: config.view.sort_config(),
            search_query: String::new(),
            show_archived: config.view.show_archived,
            clock: Utc::now,
        }
    }

    /// Replace the clock (tests pin time with this)
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// The live state
    pub fn state(&self) -> &BoardState {
        self.history.current()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Swap in a whole new board and start a fresh undo timeline
    pub fn load(&mut self, state: BoardState) {
        info!(
            tasks = state.tasks.len(),
            projects = state.projects.len(),
            "board loaded"
        );
        self.history.reset(state);
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Dispatch any command. On success the resulting state is recorded on
    /// the undo timeline; on failure nothing changes.
    pub fn execute(&mut self, command: Command) -> Result<Outcome, CommandError> {
        let name = command.name();
        let now = (self.clock)();
        match command::apply(command, self.history.current(), now) {
            Ok((next, outcome)) => {
                self.history.record(next);
                debug!(command = name, history_len = self.history.len(), "command applied");
                Ok(outcome)
            }
            Err(e) => {
                debug!(command = name, error = %e, "command rejected");
                Err(e)
            }
        }
    }

    pub fn add_task(&mut self, draft: TaskDraft) -> Result<Task, CommandError> {
        match self.execute(Command::AddTask(draft))? {
            Outcome::Task(task) => Ok(task),
            other => unreachable!("add_task produced {:?}", other),
        }
    }

    pub fn update_task(&mut self, task: Task) -> Result<Task, CommandError> {
        match self.execute(Command::UpdateTask(task))? {
            Outcome::Task(task) => Ok(task),
            other => unreachable!("update_task produced {:?}", other),
        }
    }

    /// Remove a task and hand it back. Undo brings it back unchanged.
    pub fn delete_task(&mut self, task_id: &str) -> Result<Task, CommandError> {
        match self.execute(Command::DeleteTask(task_id.to_string()))? {
            Outcome::Task(task) => Ok(task),
            other => unreachable!("delete_task produced {:?}", other),
        }
    }

    pub fn archive_task(&mut self, task_id: &str) -> Result<(), CommandError> {
        self.execute(Command::ArchiveTask(task_id.to_string())).map(drop)
    }

    pub fn restore_task(&mut self, task_id: &str) -> Result<(), CommandError> {
        self.execute(Command::RestoreTask(task_id.to_string())).map(drop)
    }

    pub fn set_status(&mut self, task_id: &str, status: TaskStatus) -> Result<(), CommandError> {
        self.execute(Command::SetStatus {
            task_id: task_id.to_string(),
            status,
        })
        .map(drop)
    }

    pub fn start_timer(&mut self, task_id: &str) -> Result<(), CommandError> {
        self.execute(Command::StartTimer(task_id.to_string())).map(drop)
    }

    /// Stop the timer, adding the whole minutes since it started
    pub fn stop_timer(&mut self, task_id: &str) -> Result<u64, CommandError> {
        match self.execute(Command::StopTimer(task_id.to_string()))? {
            Outcome::Minutes(minutes) => Ok(minutes),
            other => unreachable!("stop_timer produced {:?}", other),
        }
    }

    pub fn add_project(
        &mut self,
        input: impl Into<ProjectInput>,
    ) -> Result<Project, CommandError> {
        match self.execute(Command::AddProject(input.into()))? {
            Outcome::Project(project) => Ok(project),
            other => unreachable!("add_project produced {:?}", other),
        }
    }

    pub fn delete_project(&mut self, project_id: &str) -> Result<Project, CommandError> {
        match self.execute(Command::DeleteProject(project_id.to_string()))? {
            Outcome::Project(project) => Ok(project),
            other => unreachable!("delete_project produced {:?}", other),
        }
    }

    /// Import CSV text (tasks or projects, detected from the header) as one
    /// undoable step. Bad rows are skipped and listed in the report.
    pub fn import_csv(&mut self, text: &str) -> Result<ImportReport, CommandError> {
        let report = match self.execute(Command::ImportCsv(text.to_string()))? {
            Outcome::Import(report) => report,
            other => unreachable!("import_csv produced {:?}", other),
        };
        for row in &report.errors {
            warn!(line = row.line, "import skipped row: {}", row.message);
        }
        info!(
            imported = report.imported.len(),
            skipped = report.errors.len(),
            "import finished"
        );
        Ok(report)
    }

    /// Export every task (archived included) as CSV
    pub fn export_csv(&self) -> Result<String, CsvError> {
        serialize_tasks(self.state().tasks.values())
    }

    pub fn export_projects_csv(&self) -> Result<String, CsvError> {
        serialize_projects(self.state().projects.values())
    }

    /// Step back one command. Returns false at the start of the timeline.
    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo().is_some();
        debug!(moved, index = self.history.index(), "undo");
        moved
    }

    /// Step forward one command. Returns false at the tail.
    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo().is_some();
        debug!(moved, index = self.history.index(), "redo");
        moved
    }

    // -----------------------------------------------------------------------
    // View settings and derived views
    // -----------------------------------------------------------------------

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    pub fn set_sort(&mut self, sort: SortConfig) {
        self.sort = sort;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn set_show_archived(&mut self, show: bool) {
        self.show_archived = show;
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    pub fn sort(&self) -> SortConfig {
        self.sort
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Tasks as the list view shows them: active (or archived) tasks,
    /// filtered, then searched, then sorted.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        let base = if self.show_archived {
            query::archived_tasks(self.state())
        } else {
            query::active_tasks(self.state())
        };
        let filtered = query::filtered_tasks(&base, &self.filter);
        let searched = query::searched_tasks(&filtered, &self.search_query);
        query::sorted_tasks(&searched, self.sort)
    }

    /// Visible tasks grouped into kanban columns
    pub fn kanban(&self) -> Vec<(TaskStatus, Vec<&Task>)> {
        query::kanban_columns(&self.visible_tasks())
    }

    pub fn stats(&self, today: NaiveDate) -> BoardStats {
        board_stats(self.state(), today)
    }

    /// The project a task points at, if it still exists
    pub fn project_of(&self, task: &Task) -> Option<&Project> {
        query::resolve_project(task, &self.state().projects)
    }
}
