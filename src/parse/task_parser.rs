use csv::StringRecord;

use crate::model::task::{Priority, TaskDraft, TaskStatus};
use crate::parse::error::{CsvError, ImportRowError};
use crate::parse::fields::{ColumnMap, parse_date, parse_number, parse_timestamp, split_tags};

/// Rows parsed from a task CSV document
#[derive(Debug, Default)]
pub struct ParsedTasks {
    /// Well-formed rows with their source line numbers
    pub rows: Vec<(u64, TaskDraft)>,
    /// Rows that were skipped
    pub errors: Vec<ImportRowError>,
}

/// Parse task CSV text into drafts.
///
/// Columns are located by header name, in any order; unknown columns are
/// ignored and missing ones fall back to the task defaults. A row without a
/// title, or with a value that cannot be parsed, is skipped and reported.
/// An empty document (not even a header) yields no rows.
pub fn parse_tasks(text: &str) -> Result<ParsedTasks, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers);
    let mut parsed = ParsedTasks::default();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Ok(parsed);
    }
    if !columns.has("title") {
        return Err(CsvError::MissingColumn("title"));
    }

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                parsed.errors.push(ImportRowError::new(line, e.to_string()));
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if is_blank(&record) {
            continue;
        }
        match parse_task_row(&columns, &record) {
            Ok(draft) => parsed.rows.push((line, draft)),
            Err(message) => parsed.errors.push(ImportRowError::new(line, message)),
        }
    }

    Ok(parsed)
}

fn parse_task_row(columns: &ColumnMap, record: &StringRecord) -> Result<TaskDraft, String> {
    let title = columns
        .get(record, "title")
        .ok_or_else(|| "missing required title".to_string())?;

    let status = match columns.get(record, "status") {
        Some(v) => Some(TaskStatus::parse(v).ok_or_else(|| format!("unknown status {:?}", v))?),
        None => None,
    };
    let priority = match columns.get(record, "priority") {
        Some(v) => Some(Priority::parse(v).ok_or_else(|| format!("unknown priority {:?}", v))?),
        None => None,
    };

    Ok(TaskDraft {
        id: columns.get(record, "id").map(str::to_string),
        title: title.to_string(),
        description: columns.get_raw(record, "description").map(str::to_string),
        status,
        priority,
        project: columns.get(record, "project").map(str::to_string),
        due_date: columns.get(record, "dueDate").map(parse_date).transpose()?,
        created_at: columns
            .get(record, "createdAt")
            .map(parse_timestamp)
            .transpose()?,
        estimated_time: columns
            .get(record, "estimatedTime")
            .map(|v| parse_number::<u32>("estimatedTime", v))
            .transpose()?,
        tags: columns.get(record, "tags").map(split_tags).unwrap_or_default(),
        elapsed: columns
            .get(record, "timeElapsed")
            .map(|v| parse_number::<u64>("timeElapsed", v))
            .transpose()?,
    })
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}
