use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Color given to projects created without one
pub const DEFAULT_PROJECT_COLOR: &str = "#6366f1";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<ProjectStatus> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Some(ProjectStatus::Active),
            "archived" => Some(ProjectStatus::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project that tasks can point at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    /// Unique among active projects (case-insensitive)
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Display hint only
    pub color: String,
    #[serde(default)]
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn is_active(&self) -> bool {
        self.status == ProjectStatus::Active
    }
}

/// Partial project accepted by `add_project`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub status: Option<ProjectStatus>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// `add_project` takes either a bare name or a full object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectInput {
    Name(String),
    Full(ProjectDraft),
}

impl From<&str> for ProjectInput {
    fn from(name: &str) -> Self {
        ProjectInput::Name(name.to_string())
    }
}

impl From<String> for ProjectInput {
    fn from(name: String) -> Self {
        ProjectInput::Name(name)
    }
}

impl From<ProjectDraft> for ProjectInput {
    fn from(draft: ProjectDraft) -> Self {
        ProjectInput::Full(draft)
    }
}

impl ProjectInput {
    /// Normalize both forms into a draft
    pub fn into_draft(self) -> ProjectDraft {
        match self {
            ProjectInput::Name(name) => ProjectDraft {
                name,
                ..ProjectDraft::default()
            },
            ProjectInput::Full(draft) => draft,
        }
    }
}

/// Project names compare trimmed and case-insensitively
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
