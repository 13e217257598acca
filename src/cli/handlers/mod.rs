mod init;
pub use init::{cmd_init, init_board};

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::engine::Engine;
use crate::io::board_io::{self, BoardDir};
use crate::model::board::BoardState;
use crate::model::project::{ProjectDraft, ProjectInput};
use crate::model::task::{Priority, Task, TaskDraft, TaskStatus};
use crate::ops::command::{Command, Outcome};
use crate::ops::project_ops::find_project;
use crate::ops::query::{SortConfig, SortDirection, SortKey, TaskFilter};
use crate::parse::fields::parse_date;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = match cli.dir {
        Some(ref dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };

    match cli.command {
        // Init creates the board, so it runs before discovery
        Commands::Init(args) => cmd_init(&start, args),

        // Read commands
        Commands::List(args) => cmd_list(&mut open(&start)?, args, json),
        Commands::Board(args) => cmd_board(&mut open(&start)?, args, json),
        Commands::Show(args) => cmd_show(&open(&start)?, args, json),
        Commands::Stats => cmd_stats(&open(&start)?, json),
        Commands::Export(args) => cmd_export(&open(&start)?, args),

        // Write commands
        Commands::Add(args) => cmd_add(&mut open(&start)?, args, json),
        Commands::Edit(args) => cmd_edit(&mut open(&start)?, args, json),
        Commands::Status(args) => cmd_status(&mut open(&start)?, args, json),
        Commands::Rm(args) => cmd_rm(&mut open(&start)?, args, json),
        Commands::Archive(args) => cmd_archive(&mut open(&start)?, args, json),
        Commands::Restore(args) => cmd_restore(&mut open(&start)?, args, json),
        Commands::Sub(args) => cmd_sub(&mut open(&start)?, args, json),
        Commands::Comment(args) => cmd_comment(&mut open(&start)?, args, json),
        Commands::Timer(args) => cmd_timer(&mut open(&start)?, args, json),
        Commands::Purge => cmd_purge(&mut open(&start)?, json),
        Commands::Project(args) => cmd_project(&mut open(&start)?, args, json),
        Commands::Import(args) => cmd_import(&mut open(&start)?, args, json),
    }
}

/// Find and load the board at or above `start`
fn open(start: &Path) -> Result<Session, Box<dyn std::error::Error>> {
    let start = std::fs::canonicalize(start)
        .map_err(|e| format!("cannot resolve -C path '{}': {}", start.display(), e))?;
    Ok(Session::open(&start)?)
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A board loaded from disk for the duration of one command
struct Session {
    dir: BoardDir,
    engine: Engine,
}

impl Session {
    fn open(start: &Path) -> Result<Self, board_io::BoardIoError> {
        let dir = board_io::open_board(start)?;
        let state = dir.load()?;
        let engine = Engine::new(state, &dir.config);
        Ok(Session { dir, engine })
    }

    fn state(&self) -> &BoardState {
        self.engine.state()
    }

    fn save(&self) -> Result<(), board_io::BoardIoError> {
        self.dir.save(self.engine.state())
    }

    fn project_name(&self, task: &Task) -> Option<&str> {
        self.engine.project_of(task).map(|p| p.name.as_str())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve a task reference: an exact id, or a prefix matching exactly one id.
fn resolve_task_id(state: &BoardState, reference: &str) -> Result<String, String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err("task id must not be empty".to_string());
    }
    if state.tasks.contains_key(reference) {
        return Ok(reference.to_string());
    }
    let matches: Vec<&String> = state
        .tasks
        .keys()
        .filter(|id| id.starts_with(reference))
        .collect();
    match matches.as_slice() {
        [id] => Ok((*id).clone()),
        [] => Err(format!("task not found: {}", reference)),
        _ => Err(format!(
            "ambiguous task id '{}' matches {} tasks",
            reference,
            matches.len()
        )),
    }
}

fn resolve_project_id(state: &BoardState, reference: &str) -> Result<String, String> {
    find_project(state, reference.trim())
        .map(|p| p.id.clone())
        .ok_or_else(|| format!("project not found: {}", reference))
}

fn parse_status(s: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(s)
        .ok_or_else(|| format!("invalid status '{}' (use todo, in_progress, done)", s))
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse(s).ok_or_else(|| format!("invalid priority '{}' (use low, medium, high)", s))
}

fn parse_sort_key(s: &str) -> Result<SortKey, String> {
    SortKey::parse(s).ok_or_else(|| format!("invalid sort key '{}'", s))
}

fn build_filter(args: &ViewArgs) -> Result<TaskFilter, String> {
    Ok(TaskFilter {
        status: args.status.as_deref().map(parse_status).transpose()?,
        project: args.project.clone(),
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        tag: args.tag.clone(),
    })
}

fn apply_view(engine: &mut Engine, args: &ViewArgs) -> Result<(), String> {
    engine.set_filter(build_filter(args)?);
    engine.set_search_query(args.search.clone().unwrap_or_default());
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_mutation(action: &'static str, id: &str, json: bool) -> CmdResult {
    if json {
        print_json(&MutationJson {
            action,
            id: id.to_string(),
            minutes: None,
        })
    } else {
        println!("{} {}", action, short_id(id));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(session: &mut Session, args: ListArgs, json: bool) -> CmdResult {
    apply_view(&mut session.engine, &args.view)?;
    if let Some(ref key) = args.sort {
        session.engine.set_sort(SortConfig {
            key: parse_sort_key(key)?,
            direction: if args.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            },
        });
    } else if args.desc {
        let mut sort = session.engine.sort();
        sort.direction = SortDirection::Desc;
        session.engine.set_sort(sort);
    }
    if args.archived {
        session.engine.set_show_archived(true);
    }

    let tasks = session.engine.visible_tasks();
    if json {
        let out = TaskListJson {
            count: tasks.len(),
            tasks: tasks
                .iter()
                .map(|t| TaskJson {
                    task: t,
                    project_name: session.project_name(t),
                })
                .collect(),
        };
        return print_json(&out);
    }
    for task in &tasks {
        println!("{}", format_task_line(task, session.project_name(task)));
    }
    Ok(())
}

fn cmd_board(session: &mut Session, args: ViewArgs, json: bool) -> CmdResult {
    apply_view(&mut session.engine, &args)?;
    let columns = session.engine.kanban();
    if json {
        let out = BoardJson {
            columns: columns
                .iter()
                .map(|(status, tasks)| ColumnJson {
                    status: *status,
                    tasks: tasks
                        .iter()
                        .map(|t| TaskJson {
                            task: t,
                            project_name: session.project_name(t),
                        })
                        .collect(),
                })
                .collect(),
        };
        return print_json(&out);
    }
    for (i, (status, tasks)) in columns.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("{} ({})", status.label(), tasks.len());
        for task in tasks {
            println!("  {}", format_task_line(task, session.project_name(task)));
        }
    }
    Ok(())
}

fn cmd_show(session: &Session, args: IdArgs, json: bool) -> CmdResult {
    let id = resolve_task_id(session.state(), &args.id)?;
    let task = &session.state().tasks[&id];
    if json {
        return print_json(&TaskJson {
            task,
            project_name: session.project_name(task),
        });
    }
    print!("{}", format_task_detail(task, session.project_name(task)));
    Ok(())
}

fn cmd_stats(session: &Session, json: bool) -> CmdResult {
    let stats = session.engine.stats(Local::now().date_naive());
    if json {
        return print_json(&stats);
    }
    print!("{}", format_stats(&stats));
    Ok(())
}

fn cmd_export(session: &Session, args: ExportArgs) -> CmdResult {
    let csv = if args.projects {
        session.engine.export_projects_csv()?
    } else {
        session.engine.export_csv()?
    };
    match args.output {
        Some(path) => {
            board_io::write_text(Path::new(&path), &csv)?;
            eprintln!("wrote {}", path);
        }
        None => print!("{}", csv),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Task write commands
// ---------------------------------------------------------------------------

fn cmd_add(session: &mut Session, args: AddArgs, json: bool) -> CmdResult {
    let draft = TaskDraft {
        description: args.description,
        status: args.status.as_deref().map(parse_status).transpose()?,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        project: args.project,
        due_date: args.due.as_deref().map(parse_date).transpose()?,
        estimated_time: args.estimate,
        tags: args.tag,
        ..TaskDraft::new(args.title)
    };
    let task = session.engine.add_task(draft)?;
    session.save()?;

    if json {
        return print_json(&TaskJson {
            task: &task,
            project_name: session.project_name(&task),
        });
    }
    println!("added {}  {}", short_id(&task.id), task.title);
    Ok(())
}

fn cmd_edit(session: &mut Session, args: EditArgs, json: bool) -> CmdResult {
    let id = resolve_task_id(session.state(), &args.id)?;
    let mut task = session.state().tasks[&id].clone();

    if let Some(title) = args.title {
        task.title = title;
    }
    if let Some(description) = args.description {
        task.description = description;
    }
    if let Some(ref priority) = args.priority {
        task.priority = parse_priority(priority)?;
    }
    if let Some(project) = args.project {
        task.project = Some(project).filter(|p| !p.trim().is_empty());
    }
    if let Some(ref due) = args.due {
        task.due_date = match due.trim() {
            "" => None,
            d => Some(parse_date(d)?),
        };
    }
    if let Some(estimate) = args.estimate {
        task.estimated_time = Some(estimate).filter(|m| *m > 0);
    }
    if !args.tag.is_empty() {
        task.tags = args.tag;
    }

    let task = session.engine.update_task(task)?;
    session.save()?;
    if json {
        return print_json(&TaskJson {
            task: &task,
            project_name: session.project_name(&task),
        });
    }
    println!("updated {}  {}", short_id(&task.id), task.title);
    Ok(())
}

fn cmd_status(session: &mut Session, args: StatusArgs, json: bool) -> CmdResult {
    let id = resolve_task_id(session.state(), &args.id)?;
    let status = parse_status(&args.status)?;
    session.engine.set_status(&id, status)?;
    session.save()?;
    if json {
        return print_mutation("status", &id, true);
    }
    println!("{} -> {}", short_id(&id), status.label());
    Ok(())
}

fn cmd_rm(session: &mut Session, args: IdArgs, json: bool) -> CmdResult {
    let id = resolve_task_id(session.state(), &args.id)?;
    session.engine.delete_task(&id)?;
    session.save()?;
    print_mutation("deleted", &id, json)
}

fn cmd_archive(session: &mut Session, args: IdArgs, json: bool) -> CmdResult {
    let id = resolve_task_id(session.state(), &args.id)?;
    session.engine.archive_task(&id)?;
    session.save()?;
    print_mutation("archived", &id, json)
}

fn cmd_restore(session: &mut Session, args: IdArgs, json: bool) -> CmdResult {
    let id = resolve_task_id(session.state(), &args.id)?;
    session.engine.restore_task(&id)?;
    session.save()?;
    print_mutation("restored", &id, json)
}

fn cmd_sub(session: &mut Session, args: SubArgs, json: bool) -> CmdResult {
    let task_id = resolve_task_id(session.state(), &args.id)?;
    let command = if args.toggle {
        Command::ToggleSubtask {
            task_id,
            subtask_id: args.title,
        }
    } else {
        Command::AddSubtask {
            task_id,
            title: args.title,
        }
    };
    let outcome = session.engine.execute(command)?;
    session.save()?;
    match outcome {
        Outcome::Subtask(sub) => print_mutation("added subtask", &sub.id, json),
        Outcome::Toggled(done) => {
            let action = if done { "checked" } else { "unchecked" };
            print_mutation(action, &args.id, json)
        }
        _ => Ok(()),
    }
}

fn cmd_comment(session: &mut Session, args: CommentArgs, json: bool) -> CmdResult {
    let task_id = resolve_task_id(session.state(), &args.id)?;
    let outcome = session.engine.execute(Command::AddComment {
        task_id,
        text: args.text,
    })?;
    session.save()?;
    match outcome {
        Outcome::Comment(comment) => print_mutation("commented", &comment.id, json),
        _ => Ok(()),
    }
}

fn cmd_timer(session: &mut Session, args: TimerCmd, json: bool) -> CmdResult {
    match args.action {
        TimerAction::Start(args) => {
            let id = resolve_task_id(session.state(), &args.id)?;
            session.engine.start_timer(&id)?;
            session.save()?;
            print_mutation("timer started", &id, json)
        }
        TimerAction::Stop(args) => {
            let id = resolve_task_id(session.state(), &args.id)?;
            let minutes = session.engine.stop_timer(&id)?;
            session.save()?;
            if json {
                return print_json(&MutationJson {
                    action: "timer stopped",
                    id,
                    minutes: Some(minutes),
                });
            }
            println!("timer stopped {}  +{}m", short_id(&id), minutes);
            Ok(())
        }
    }
}

fn cmd_purge(session: &mut Session, json: bool) -> CmdResult {
    let removed = match session.engine.execute(Command::ClearArchived)? {
        Outcome::Removed(n) => n,
        _ => 0,
    };
    session.save()?;
    if json {
        return print_json(&serde_json::json!({ "removed": removed }));
    }
    println!("removed {} archived tasks", removed);
    Ok(())
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

fn cmd_project(session: &mut Session, args: ProjectCmd, json: bool) -> CmdResult {
    match args.action {
        ProjectAction::Add(args) => {
            let input = if args.description.is_none() && args.color.is_none() {
                ProjectInput::Name(args.name)
            } else {
                ProjectInput::Full(ProjectDraft {
                    name: args.name,
                    description: args.description,
                    color: args.color,
                    ..ProjectDraft::default()
                })
            };
            let project = session.engine.add_project(input)?;
            session.save()?;
            if json {
                return print_json(&ProjectJson {
                    project: &project,
                    task_count: 0,
                });
            }
            println!("added project {}  {}", short_id(&project.id), project.name);
            Ok(())
        }
        ProjectAction::Rm(args) => {
            let id = resolve_project_id(session.state(), &args.project)?;
            let project = session.engine.delete_project(&id)?;
            session.save()?;
            if json {
                return print_mutation("deleted project", &project.id, true);
            }
            println!("deleted project {}", project.name);
            Ok(())
        }
        ProjectAction::Archive(args) => {
            let id = resolve_project_id(session.state(), &args.project)?;
            session.engine.execute(Command::ArchiveProject(id.clone()))?;
            session.save()?;
            print_mutation("archived project", &id, json)
        }
        ProjectAction::Restore(args) => {
            let id = resolve_project_id(session.state(), &args.project)?;
            session.engine.execute(Command::RestoreProject(id.clone()))?;
            session.save()?;
            print_mutation("restored project", &id, json)
        }
        ProjectAction::List(args) => cmd_project_list(session, args.all, json),
    }
}

fn cmd_project_list(session: &Session, all: bool, json: bool) -> CmdResult {
    let state = session.state();
    let rows: Vec<ProjectJson> = state
        .projects
        .values()
        .filter(|p| all || p.is_active())
        .map(|project| ProjectJson {
            project,
            task_count: state
                .tasks
                .values()
                .filter(|t| !t.archived)
                .filter(|t| session.engine.project_of(t).is_some_and(|p| p.id == project.id))
                .count(),
        })
        .collect();

    if json {
        return print_json(&rows);
    }
    for row in &rows {
        println!("{}", format_project_line(row.project, row.task_count));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

fn cmd_import(session: &mut Session, args: ImportArgs, json: bool) -> CmdResult {
    let text = board_io::read_text(Path::new(&args.file))?;
    let report = session.engine.import_csv(&text)?;
    session.save()?;
    if json {
        return print_json(&report);
    }
    println!("{}", format_import_report(&report));
    Ok(())
}
