use crate::model::project::Project;
use crate::parse::error::CsvError;
use crate::parse::fields::format_timestamp;

/// Project columns in export order
pub const PROJECT_COLUMNS: [&str; 7] = [
    "id",
    "name",
    "description",
    "color",
    "status",
    "createdAt",
    "updatedAt",
];

/// Serialize projects to CSV. Every project field is part of the flat
/// schema, so nothing is lost.
pub fn serialize_projects<'a, I>(projects: I) -> Result<String, CsvError>
where
    I: IntoIterator<Item = &'a Project>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(PROJECT_COLUMNS)?;

    for project in projects {
        let created_at = format_timestamp(&project.created_at);
        let updated_at = format_timestamp(&project.updated_at);
        writer.write_record([
            project.id.as_str(),
            project.name.as_str(),
            project.description.as_str(),
            project.color.as_str(),
            project.status.as_str(),
            created_at.as_str(),
            updated_at.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
