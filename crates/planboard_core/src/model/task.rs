//! Per-project task boards: columns of checklist items.
//!
//! # Invariants
//! - At most one board exists per project; it is created lazily on first
//!   column creation or board fetch.
//! - A board exclusively owns its columns; a task's container key is its
//!   `column_id`.

use crate::model::project::ProjectId;
use crate::order::OrderedEntity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable task board identifier.
pub type BoardId = Uuid;
/// Stable task column identifier.
pub type ColumnId = Uuid;
/// Stable task identifier.
pub type TaskId = Uuid;

/// Checklist board attached to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskBoard {
    pub id: BoardId,
    pub project_id: ProjectId,
    pub columns: Vec<TaskColumn>,
}

impl TaskBoard {
    /// Creates an empty board for a project.
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            columns: Vec::new(),
        }
    }

    /// Finds a column by id.
    pub fn column(&self, column_id: ColumnId) -> Option<&TaskColumn> {
        self.columns.iter().find(|column| column.id == column_id)
    }
}

/// Checklist column within a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskColumn {
    pub id: ColumnId,
    pub name: String,
    pub order: i64,
}

impl TaskColumn {
    /// Creates a column with a generated stable id.
    pub fn new(name: impl Into<String>, order: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            order,
        }
    }
}

/// Checklist item within a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub column_id: ColumnId,
    pub order: i64,
    pub completed: bool,
}

impl Task {
    /// Creates an open task in the given column.
    pub fn new(text: impl Into<String>, column_id: ColumnId, order: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            column_id,
            order,
            completed: false,
        }
    }
}

impl OrderedEntity for TaskColumn {
    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }
}

impl OrderedEntity for Task {
    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }
}
