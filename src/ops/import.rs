use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::board::BoardState;
use crate::ops::project_ops::build_project;
use crate::ops::task_ops::build_task;
use crate::parse::{CsvError, ImportRowError, parse_projects, parse_tasks};

/// Error type for import operations that fail as a whole
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Csv(#[from] CsvError),
    #[error("unrecognized CSV header: expected a `title` (tasks) or `name` (projects) column")]
    UnknownFormat,
}

/// Which kind of records a CSV document holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Tasks,
    Projects,
}

/// Partial-success report of an import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub kind: RecordKind,
    /// Ids of the records added, in file order
    pub imported: Vec<String>,
    /// Rows that were skipped
    pub errors: Vec<ImportRowError>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Work out whether the document holds tasks or projects from its header.
/// Header-less (empty) text counts as an empty task list.
pub fn detect_kind(text: &str) -> Result<RecordKind, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers().map_err(CsvError::from)?;
    let names: Vec<String> = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_ascii_lowercase())
        .collect();

    if names.iter().all(|n| n.is_empty()) || names.iter().any(|n| n == "title") {
        Ok(RecordKind::Tasks)
    } else if names.iter().any(|n| n == "name") {
        Ok(RecordKind::Projects)
    } else {
        Err(ImportError::UnknownFormat)
    }
}

/// Parse CSV text and add the records it holds to the board. Malformed
/// rows, and rows whose id or project name is already taken, are skipped
/// and reported; everything else is added.
pub fn import_csv(
    state: &mut BoardState,
    text: &str,
    now: DateTime<Utc>,
) -> Result<ImportReport, ImportError> {
    match detect_kind(text)? {
        RecordKind::Tasks => import_tasks(state, text, now),
        RecordKind::Projects => import_projects(state, text, now),
    }
}

pub fn import_tasks(
    state: &mut BoardState,
    text: &str,
    now: DateTime<Utc>,
) -> Result<ImportReport, ImportError> {
    let parsed = parse_tasks(text)?;
    let mut report = ImportReport {
        kind: RecordKind::Tasks,
        imported: Vec::new(),
        errors: parsed.errors,
    };

    for (line, draft) in parsed.rows {
        match build_task(state, draft, now) {
            Ok(task) => {
                report.imported.push(task.id.clone());
                state.tasks.insert(task.id.clone(), task);
            }
            Err(e) => report.errors.push(ImportRowError::new(line, e.to_string())),
        }
    }

    report.errors.sort_by_key(|e| e.line);
    Ok(report)
}

pub fn import_projects(
    state: &mut BoardState,
    text: &str,
    now: DateTime<Utc>,
) -> Result<ImportReport, ImportError> {
    let parsed = parse_projects(text)?;
    let mut report = ImportReport {
        kind: RecordKind::Projects,
        imported: Vec::new(),
        errors: parsed.errors,
    };

    for (line, draft) in parsed.rows {
        match build_project(state, draft, now) {
            Ok(project) => {
                report.imported.push(project.id.clone());
                state.projects.insert(project.id.clone(), project);
            }
            Err(e) => report.errors.push(ImportRowError::new(line, e.to_string())),
        }
    }

    report.errors.sort_by_key(|e| e.line);
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
