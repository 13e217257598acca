use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::board::BoardState;
use crate::model::project::{
    DEFAULT_PROJECT_COLOR, Project, ProjectDraft, ProjectInput, ProjectStatus, same_name,
};
use crate::ops::task_ops::{EntityKind, StoreError};

/// Add a project from a bare name or a full object. Both forms reject a
/// name already used by an active project.
pub fn add_project(
    state: &mut BoardState,
    input: ProjectInput,
    now: DateTime<Utc>,
) -> Result<Project, StoreError> {
    let project = build_project(state, input.into_draft(), now)?;
    state.projects.insert(project.id.clone(), project.clone());
    Ok(project)
}

/// Validate a draft and fill in defaults, without inserting it.
pub fn build_project(
    state: &BoardState,
    draft: ProjectDraft,
    now: DateTime<Utc>,
) -> Result<Project, StoreError> {
    let name = validate_name(&draft.name)?;
    let status = draft.status.unwrap_or_default();
    if status == ProjectStatus::Active {
        ensure_name_free(state, &name, None)?;
    }

    let id = match draft.id.map(|id| id.trim().to_string()) {
        Some(id) if !id.is_empty() => {
            if state.projects.contains_key(&id) {
                return Err(StoreError::Conflict(format!(
                    "project id {} already exists",
                    id
                )));
            }
            id
        }
        _ => next_project_id(state),
    };

    let created_at = draft.created_at.unwrap_or(now);
    Ok(Project {
        id,
        name,
        description: draft.description.unwrap_or_default(),
        color: draft
            .color
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROJECT_COLOR.to_string()),
        status,
        created_at,
        updated_at: draft.updated_at.unwrap_or(created_at),
    })
}

/// Full replacement of a project. `created_at` is kept, `updated_at` bumped.
pub fn update_project(
    state: &mut BoardState,
    project: Project,
    now: DateTime<Utc>,
) -> Result<Project, StoreError> {
    let stored = state
        .projects
        .get(&project.id)
        .ok_or_else(|| StoreError::not_found(EntityKind::Project, &project.id))?;
    let created_at = stored.created_at;

    let name = validate_name(&project.name)?;
    if project.status == ProjectStatus::Active {
        ensure_name_free(state, &name, Some(&project.id))?;
    }

    let mut project = project;
    project.name = name;
    project.created_at = created_at;
    project.updated_at = now;

    let slot = find_project_mut(state, &project.id)?;
    *slot = project.clone();
    Ok(project)
}

/// Remove a project. Tasks that reference it are left alone; their
/// reference simply stops resolving.
pub fn delete_project(state: &mut BoardState, project_id: &str) -> Result<Project, StoreError> {
    state
        .projects
        .shift_remove(project_id)
        .ok_or_else(|| StoreError::not_found(EntityKind::Project, project_id))
}

pub fn archive_project(
    state: &mut BoardState,
    project_id: &str,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let project = find_project_mut(state, project_id)?;
    project.status = ProjectStatus::Archived;
    project.updated_at = now;
    Ok(())
}

/// Reactivate an archived project. Fails if an active project took its name
/// in the meantime.
pub fn restore_project(
    state: &mut BoardState,
    project_id: &str,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let name = state
        .projects
        .get(project_id)
        .map(|p| p.name.clone())
        .ok_or_else(|| StoreError::not_found(EntityKind::Project, project_id))?;
    ensure_name_free(state, &name, Some(project_id))?;

    let project = find_project_mut(state, project_id)?;
    project.status = ProjectStatus::Active;
    project.updated_at = now;
    Ok(())
}

/// Look up a project by id first, then by name.
pub fn find_project<'a>(state: &'a BoardState, reference: &str) -> Option<&'a Project> {
    state.projects.get(reference).or_else(|| {
        state
            .projects
            .values()
            .find(|p| same_name(&p.name, reference))
    })
}

fn find_project_mut<'a>(
    state: &'a mut BoardState,
    project_id: &str,
) -> Result<&'a mut Project, StoreError> {
    state
        .projects
        .get_mut(project_id)
        .ok_or_else(|| StoreError::not_found(EntityKind::Project, project_id))
}

fn next_project_id(state: &BoardState) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !state.projects.contains_key(&id) {
            return id;
        }
    }
}

fn validate_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::validation("name", "must not be empty"));
    }
    Ok(name.to_string())
}

fn ensure_name_free(
    state: &BoardState,
    name: &str,
    except_id: Option<&str>,
) -> Result<(), StoreError> {
    let taken = state.projects.values().any(|p| {
        p.is_active() && Some(p.id.as_str()) != except_id && same_name(&p.name, name)
    });
    if taken {
        return Err(StoreError::Conflict(format!(
            "an active project named {:?} already exists",
            name
        )));
    }
    Ok(())
}
