use csv::StringRecord;

use crate::model::project::{ProjectDraft, ProjectStatus};
use crate::parse::error::{CsvError, ImportRowError};
use crate::parse::fields::{ColumnMap, parse_timestamp};

#[derive(Debug, Default)]
pub struct ParsedProjects {
    pub rows: Vec<(u64, ProjectDraft)>,
    pub errors: Vec<ImportRowError>,
}

/// Parse project CSV text into drafts. Same rules as task parsing, with
/// `name` as the required column.
pub fn parse_projects(text: &str) -> Result<ParsedProjects, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers);
    let mut parsed = ParsedProjects::default();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Ok(parsed);
    }
    if !columns.has("name") {
        return Err(CsvError::MissingColumn("name"));
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
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        match parse_project_row(&columns, &record) {
            Ok(draft) => parsed.rows.push((line, draft)),
            Err(message) => parsed.errors.push(ImportRowError::new(line, message)),
        }
    }

    Ok(parsed)
}

fn parse_project_row(columns: &ColumnMap, record: &StringRecord) -> Result<ProjectDraft, String> {
    let name = columns
        .get(record, "name")
        .ok_or_else(|| "missing required name".to_string())?;
    let status = match columns.get(record, "status") {
        Some(v) => Some(
            ProjectStatus::parse(v).ok_or_else(|| format!("unknown project status {:?}", v))?,
        ),
        None => None,
    };

    Ok(ProjectDraft {
        id: columns.get(record, "id").map(str::to_string),
        name: name.to_string(),
        description: columns.get_raw(record, "description").map(str::to_string),
        color: columns.get(record, "color").map(str::to_string),
        status,
        created_at: columns
            .get(record, "createdAt")
            .map(parse_timestamp)
            .transpose()?,
        updated_at: columns
            .get(record, "updatedAt")
            .map(parse_timestamp)
            .transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_projects_and_reports_bad_rows() {
        let text = "\
id,name,description,color,status,createdAt,updatedAt
p-1,Acme,Client work,#ff8800,active,2025-01-02T03:04:05Z,2025-01-03T00:00:00Z
p-2,,Nameless,,active,,
p-3,Globex,,,paused,,
p-4,Initech,,,,,
";
        let parsed = parse_projects(text).unwrap();
        let names: Vec<&str> = parsed.rows.iter().map(|(_, d)| d.name.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Initech"]);
        assert_eq!(parsed.errors.len(), 2);
        assert_eq!(parsed.errors[0].line, 3);
        assert_eq!(parsed.errors[1].line, 4);

        let acme = &parsed.rows[0].1;
        assert_eq!(acme.status, Some(ProjectStatus::Active));
        assert_eq!(acme.color.as_deref(), Some("#ff8800"));
        assert!(acme.updated_at > acme.created_at);

        let initech = &parsed.rows[1].1;
        assert_eq!(initech.status, None);
        assert_eq!(initech.color, None);
    }

    #[test]
    fn missing_name_column_is_fatal() {
        assert!(matches!(
            parse_projects("title\nx\n"),
            Err(CsvError::MissingColumn("name"))
        ));
    }
}
