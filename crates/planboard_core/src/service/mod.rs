//! Board use-case facades.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level CRUD and move APIs.
//! - Own cross-collection cascades and text validation; the store stays a
//!   plain collection adapter.
//!
//! # Invariants
//! - Facades never catch-and-hide store failures; every error propagates
//!   once and the caller decides whether to reload state.
//! - Deleting siblings never renumbers survivors; gaps in `order` are
//!   tolerated and only relative order matters.

pub mod planner_service;
pub mod project_service;
pub mod task_service;

pub use planner_service::{PlannerService, StageMove};
pub use project_service::{NewProject, ProjectMove, ProjectService, ProjectUpdate};
pub use task_service::{BoardSnapshot, ColumnMove, TaskMove, TaskService, TaskUpdate};

use crate::model::ProjectId;
use crate::store::{PlannerStore, StoreError, TaskFilter};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors from facade operations.
#[derive(Debug)]
pub enum ServiceError {
    /// A required text field is blank after trim.
    EmptyField(&'static str),
    /// Target entity does not exist, or the caller's view of sibling
    /// positions is stale.
    NotFound { entity: &'static str, id: Uuid },
    /// Persistence adapter failure.
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{field} must not be blank"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Trims and validates a required text field.
fn require_text(field: &'static str, value: &str) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

/// Deletes a project together with its task board and tasks.
///
/// Returns whether the project itself was found and removed. Used by the
/// project facade and by stage/layer deletion cascades so both backends
/// get identical cleanup.
pub(crate) fn delete_project_cascade<S: PlannerStore>(
    store: &S,
    project_id: ProjectId,
) -> ServiceResult<bool> {
    if let Some(board) = store.get_board_for_project(project_id)? {
        for column in &board.columns {
            for task in store.list_tasks(&TaskFilter::column(column.id))? {
                store.delete_task(task.id)?;
            }
        }
        store.delete_board(board.id)?;
    }
    Ok(store.delete_project(project_id)?)
}
