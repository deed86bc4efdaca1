//! Persistence adapter contract and backend implementations.
//!
//! # Responsibility
//! - Define one explicit store interface over the four board collections:
//!   planner tree, projects, task boards (+columns), tasks — plus template
//!   snapshots.
//! - Keep backend details (SQL, blob files) out of the service layer.
//!
//! # Invariants
//! - Sibling list reads come back sorted ascending by `order`, ties broken
//!   by id.
//! - `update_*` returns `None` for a missing id and never creates.
//! - Cascading deletes across collections are the caller's responsibility;
//!   only embedded children (stage layers, board columns) die with their
//!   owner.
//! - Multi-entity batches are sequences of individually-atomic writes; the
//!   store offers no cross-entity transaction.

pub mod config;
pub mod json_store;
pub mod sqlite_store;

pub use config::{open_store, StoreConfig};
pub use json_store::JsonPlannerStore;
pub use sqlite_store::SqlitePlannerStore;

use crate::db::DbError;
use crate::model::{
    BoardId, ColumnId, ContentPlanner, Layer, LayerId, Project, ProjectId, Stage, StageId, Task,
    TaskBoard, TaskColumn, TaskId, Template,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from persistence adapter operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite failure.
    Sqlite(rusqlite::Error),
    /// Underlying file I/O failure.
    Io(std::io::Error),
    /// A collection blob or column value cannot be encoded/decoded.
    Serde(serde_json::Error),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    /// A write targeted the planner tree before the singleton was created.
    MissingPlanner,
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Serde(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingPlanner => write!(f, "content planner has not been initialized"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Serde(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::MissingPlanner => None,
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::Sqlite(err),
            DbError::SchemaTooNew {
                db_version,
                latest_supported,
            } => Self::UninitializedConnection {
                expected_version: latest_supported,
                actual_version: db_version,
            },
        }
    }
}

/// Exact-match filter over project container fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub stage_id: Option<StageId>,
    pub layer_id: Option<LayerId>,
}

impl ProjectFilter {
    /// Filter matching every project of one stage.
    pub fn stage(stage_id: StageId) -> Self {
        Self {
            stage_id: Some(stage_id),
            layer_id: None,
        }
    }

    /// Filter matching one `(stage, layer)` container.
    pub fn layer(stage_id: StageId, layer_id: LayerId) -> Self {
        Self {
            stage_id: Some(stage_id),
            layer_id: Some(layer_id),
        }
    }
}

/// Exact-match filter over task container fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub column_id: Option<ColumnId>,
}

impl TaskFilter {
    /// Filter matching every task of one column.
    pub fn column(column_id: ColumnId) -> Self {
        Self {
            column_id: Some(column_id),
        }
    }
}

/// Partial update of one stage document.
#[derive(Debug, Clone, Default)]
pub struct StagePatch {
    pub name: Option<String>,
    pub order: Option<i64>,
    /// Replaces the embedded layer set wholesale when present.
    pub layers: Option<Vec<Layer>>,
}

/// Partial update of one project.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub due_date: Option<i64>,
    pub order: Option<i64>,
    pub stage_id: Option<StageId>,
    pub layer_id: Option<LayerId>,
}

/// Partial update of one task board document.
#[derive(Debug, Clone, Default)]
pub struct BoardPatch {
    /// Replaces the embedded column set wholesale when present.
    pub columns: Option<Vec<TaskColumn>>,
}

/// Partial update of one task.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub order: Option<i64>,
    pub column_id: Option<ColumnId>,
}

/// Store interface over the board collections.
///
/// Both backends — the SQLite document store and the local JSON blob
/// store — satisfy this contract with identical semantics; reordering
/// logic above it never branches on the backend.
pub trait PlannerStore {
    /// Loads the planner singleton with stages and layers, sorted.
    fn get_planner(&self) -> StoreResult<Option<ContentPlanner>>;
    /// Persists a freshly built planner tree. Fails if one already exists.
    fn init_planner(&self, planner: &ContentPlanner) -> StoreResult<()>;
    /// Appends one stage document to the planner tree.
    fn add_stage(&self, stage: &Stage) -> StoreResult<()>;
    /// Merges a partial update into one stage document.
    fn update_stage(&self, stage_id: StageId, patch: &StagePatch) -> StoreResult<Option<Stage>>;
    /// Removes one stage document and its embedded layers.
    fn delete_stage(&self, stage_id: StageId) -> StoreResult<bool>;

    /// Lists projects matching the filter, sorted by order.
    fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>>;
    /// Loads one project by id.
    fn get_project(&self, project_id: ProjectId) -> StoreResult<Option<Project>>;
    /// Appends one project to the collection.
    fn add_project(&self, project: &Project) -> StoreResult<()>;
    /// Merges a partial update into one project and refreshes `updated_at`.
    fn update_project(
        &self,
        project_id: ProjectId,
        patch: &ProjectPatch,
    ) -> StoreResult<Option<Project>>;
    /// Removes one project.
    fn delete_project(&self, project_id: ProjectId) -> StoreResult<bool>;

    /// Loads the board attached to one project, columns sorted.
    fn get_board_for_project(&self, project_id: ProjectId) -> StoreResult<Option<TaskBoard>>;
    /// Appends one board document.
    fn add_board(&self, board: &TaskBoard) -> StoreResult<()>;
    /// Merges a partial update into one board document.
    fn update_board(&self, board_id: BoardId, patch: &BoardPatch) -> StoreResult<Option<TaskBoard>>;
    /// Removes one board document and its embedded columns.
    fn delete_board(&self, board_id: BoardId) -> StoreResult<bool>;

    /// Lists tasks matching the filter, sorted by order.
    fn list_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>>;
    /// Loads one task by id.
    fn get_task(&self, task_id: TaskId) -> StoreResult<Option<Task>>;
    /// Appends one task to the collection.
    fn add_task(&self, task: &Task) -> StoreResult<()>;
    /// Merges a partial update into one task.
    fn update_task(&self, task_id: TaskId, patch: &TaskPatch) -> StoreResult<Option<Task>>;
    /// Removes one task.
    fn delete_task(&self, task_id: TaskId) -> StoreResult<bool>;

    /// Lists template snapshots, oldest first.
    fn list_templates(&self) -> StoreResult<Vec<Template>>;
    /// Appends one template snapshot.
    fn add_template(&self, template: &Template) -> StoreResult<()>;
}

impl<T: PlannerStore + ?Sized> PlannerStore for &T {
    fn get_planner(&self) -> StoreResult<Option<ContentPlanner>> {
        (**self).get_planner()
    }

    fn init_planner(&self, planner: &ContentPlanner) -> StoreResult<()> {
        (**self).init_planner(planner)
    }

    fn add_stage(&self, stage: &Stage) -> StoreResult<()> {
        (**self).add_stage(stage)
    }

    fn update_stage(&self, stage_id: StageId, patch: &StagePatch) -> StoreResult<Option<Stage>> {
        (**self).update_stage(stage_id, patch)
    }

    fn delete_stage(&self, stage_id: StageId) -> StoreResult<bool> {
        (**self).delete_stage(stage_id)
    }

    fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>> {
        (**self).list_projects(filter)
    }

    fn get_project(&self, project_id: ProjectId) -> StoreResult<Option<Project>> {
        (**self).get_project(project_id)
    }

    fn add_project(&self, project: &Project) -> StoreResult<()> {
        (**self).add_project(project)
    }

    fn update_project(
        &self,
        project_id: ProjectId,
        patch: &ProjectPatch,
    ) -> StoreResult<Option<Project>> {
        (**self).update_project(project_id, patch)
    }

    fn delete_project(&self, project_id: ProjectId) -> StoreResult<bool> {
        (**self).delete_project(project_id)
    }

    fn get_board_for_project(&self, project_id: ProjectId) -> StoreResult<Option<TaskBoard>> {
        (**self).get_board_for_project(project_id)
    }

    fn add_board(&self, board: &TaskBoard) -> StoreResult<()> {
        (**self).add_board(board)
    }

    fn update_board(
        &self,
        board_id: BoardId,
        patch: &BoardPatch,
    ) -> StoreResult<Option<TaskBoard>> {
        (**self).update_board(board_id, patch)
    }

    fn delete_board(&self, board_id: BoardId) -> StoreResult<bool> {
        (**self).delete_board(board_id)
    }

    fn list_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        (**self).list_tasks(filter)
    }

    fn get_task(&self, task_id: TaskId) -> StoreResult<Option<Task>> {
        (**self).get_task(task_id)
    }

    fn add_task(&self, task: &Task) -> StoreResult<()> {
        (**self).add_task(task)
    }

    fn update_task(&self, task_id: TaskId, patch: &TaskPatch) -> StoreResult<Option<Task>> {
        (**self).update_task(task_id, patch)
    }

    fn delete_task(&self, task_id: TaskId) -> StoreResult<bool> {
        (**self).delete_task(task_id)
    }

    fn list_templates(&self) -> StoreResult<Vec<Template>> {
        (**self).list_templates()
    }

    fn add_template(&self, template: &Template) -> StoreResult<()> {
        (**self).add_template(template)
    }
}
