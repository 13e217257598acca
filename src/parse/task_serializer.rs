use crate::model::task::Task;
use crate::parse::error::CsvError;
use crate::parse::fields::{format_date, format_timestamp, join_tags};

/// Task columns in export order
pub const TASK_COLUMNS: [&str; 11] = [
    "id",
    "title",
    "description",
    "status",
    "project",
    "priority",
    "dueDate",
    "createdAt",
    "estimatedTime",
    "tags",
    "timeElapsed",
];

/// Serialize tasks to CSV, one row per task after a header row.
///
/// Only the flat schema survives: subtasks, comments, the archived flag and
/// the running state of the timer are not written. `timeElapsed` carries
/// the finalized minutes only.
pub fn serialize_tasks<'a, I>(tasks: I) -> Result<String, CsvError>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(TASK_COLUMNS)?;

    for task in tasks {
        writer.write_record(task_row(task))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

fn task_row(task: &Task) -> [String; 11] {
    [
        task.id.clone(),
        task.title.clone(),
        task.description.clone(),
        task.status.as_str().to_string(),
        task.project.clone().unwrap_or_default(),
        task.priority.as_str().to_string(),
        task.due_date.as_ref().map(format_date).unwrap_or_default(),
        format_timestamp(&task.created_at),
        task.estimated_time
            .map(|m| m.to_string())
            .unwrap_or_default(),
        join_tags(&task.tags),
        task.time_tracking.elapsed.to_string(),
    ]
}
