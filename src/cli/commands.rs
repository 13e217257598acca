use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tb", about = concat!("taskboard v", env!("CARGO_PKG_VERSION"), " - tasks, projects and a kanban board"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different board directory
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create taskboard.toml and an empty board in the current directory
    Init(InitArgs),
    /// Add a task
    Add(AddArgs),
    /// Change fields of a task
    Edit(EditArgs),
    /// Move a task to another status column
    Status(StatusArgs),
    /// Permanently delete a task
    Rm(IdArgs),
    /// Archive a task (hidden from default views)
    Archive(IdArgs),
    /// Restore an archived task
    Restore(IdArgs),
    /// Show task details
    Show(IdArgs),
    /// Add a subtask, or toggle one with --toggle
    Sub(SubArgs),
    /// Add a comment to a task
    Comment(CommentArgs),
    /// Start or stop a task's timer
    Timer(TimerCmd),
    /// Delete every archived task
    Purge,
    /// List tasks
    List(ListArgs),
    /// Show tasks grouped by status
    Board(ViewArgs),
    /// Show board statistics
    Stats,
    /// Project management
    Project(ProjectCmd),
    /// Import tasks or projects from a CSV file
    Import(ImportArgs),
    /// Export tasks (or projects) as CSV
    Export(ExportArgs),
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Undo history depth to write into the config
    #[arg(long)]
    pub history: Option<usize>,
    /// Reinitialize even if taskboard.toml already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Task command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct IdArgs {
    /// Task ID (or a unique prefix of it)
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Task description
    #[arg(short, long)]
    pub description: Option<String>,
    /// Initial status (todo, in_progress, done)
    #[arg(long)]
    pub status: Option<String>,
    /// Priority (low, medium, high)
    #[arg(short, long)]
    pub priority: Option<String>,
    /// Project name or ID
    #[arg(long)]
    pub project: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    /// Estimate in minutes
    #[arg(long)]
    pub estimate: Option<u32>,
    /// Tag (repeatable)
    #[arg(short, long)]
    pub tag: Vec<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID (or a unique prefix of it)
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New description (empty string clears it)
    #[arg(short, long)]
    pub description: Option<String>,
    /// New priority (low, medium, high)
    #[arg(short, long)]
    pub priority: Option<String>,
    /// New project name or ID (empty string clears it)
    #[arg(long)]
    pub project: Option<String>,
    /// New due date (YYYY-MM-DD, empty string clears it)
    #[arg(long)]
    pub due: Option<String>,
    /// New estimate in minutes (0 clears it)
    #[arg(long)]
    pub estimate: Option<u32>,
    /// Replace all tags (repeatable)
    #[arg(short, long)]
    pub tag: Vec<String>,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Task ID (or a unique prefix of it)
    pub id: String,
    /// New status (todo, in_progress, done)
    pub status: String,
}

#[derive(Args)]
pub struct SubArgs {
    /// Parent task ID (or a unique prefix of it)
    pub id: String,
    /// Subtask title, or the subtask ID with --toggle
    pub title: String,
    /// Toggle the subtask with this ID instead of adding one
    #[arg(long)]
    pub toggle: bool,
}

#[derive(Args)]
pub struct CommentArgs {
    /// Task ID (or a unique prefix of it)
    pub id: String,
    /// Comment text
    pub text: String,
}

#[derive(Args)]
pub struct TimerCmd {
    #[command(subcommand)]
    pub action: TimerAction,
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start tracking time on a task
    Start(IdArgs),
    /// Stop tracking and add the elapsed minutes
    Stop(IdArgs),
}

// ---------------------------------------------------------------------------
// View args
// ---------------------------------------------------------------------------

#[derive(Args, Default)]
pub struct ViewArgs {
    /// Filter by status
    #[arg(long)]
    pub status: Option<String>,
    /// Filter by project reference
    #[arg(long)]
    pub project: Option<String>,
    /// Filter by priority
    #[arg(long)]
    pub priority: Option<String>,
    /// Filter by tag
    #[arg(long)]
    pub tag: Option<String>,
    /// Case-insensitive text search over title and description
    #[arg(short, long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub view: ViewArgs,
    /// Sort key (title, status, priority, due_date, created_at, estimated_time, project)
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
    /// List archived tasks instead of active ones
    #[arg(long)]
    pub archived: bool,
}

// ---------------------------------------------------------------------------
// Project command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a project
    Add(ProjectAddArgs),
    /// Delete a project (tasks keep their reference)
    Rm(ProjectRefArgs),
    /// Archive a project
    Archive(ProjectRefArgs),
    /// Restore an archived project
    Restore(ProjectRefArgs),
    /// List projects
    List(ProjectListArgs),
}

#[derive(Args)]
pub struct ProjectAddArgs {
    /// Project name
    pub name: String,
    /// Project description
    #[arg(short, long)]
    pub description: Option<String>,
    /// Display color (e.g. "#22c55e")
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args)]
pub struct ProjectRefArgs {
    /// Project ID or name
    pub project: String,
}

#[derive(Args)]
pub struct ProjectListArgs {
    /// Include archived projects
    #[arg(long)]
    pub all: bool,
}

// ---------------------------------------------------------------------------
// CSV args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ImportArgs {
    /// CSV file to import (tasks or projects, detected from the header)
    pub file: String,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Export projects instead of tasks
    #[arg(long)]
    pub projects: bool,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}
