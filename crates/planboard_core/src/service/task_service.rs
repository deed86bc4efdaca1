//! Task board facade: lazy board creation, column CRUD, task moves.
//!
//! # Invariants
//! - A board is created lazily on first fetch or column creation; task
//!   creation requires the board to already exist.
//! - Column reordering is one board-document write; task moves persist
//!   one update per task.
//! - Deleting a column cascades to its tasks; survivors keep their
//!   `order` values.

use crate::model::{BoardId, ColumnId, ProjectId, Task, TaskBoard, TaskColumn, TaskId};
use crate::order::{reorder_across, reorder_within};
use crate::service::{require_text, ServiceError, ServiceResult};
use crate::store::{BoardPatch, PlannerStore, TaskFilter, TaskPatch};

/// Board plus the tasks of all its columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub board: TaskBoard,
    pub tasks: Vec<Task>,
}

/// Partial update of a task's text and completion state.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub text: Option<String>,
    pub completed: Option<bool>,
}

/// Drag payload for reordering columns within a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMove {
    pub project_id: ProjectId,
    pub column_id: ColumnId,
    pub source_index: usize,
    pub dest_index: usize,
}

/// Drag payload for moving a task within or between columns.
///
/// The entity found at `source_index` of the source column must be
/// `task_id`, otherwise the caller's view is stale and the move is
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskMove {
    pub task_id: TaskId,
    pub source_column: ColumnId,
    pub dest_column: ColumnId,
    pub source_index: usize,
    pub dest_index: usize,
}

/// Facade over task boards, columns, and tasks.
pub struct TaskService<S: PlannerStore> {
    store: S,
}

impl<S: PlannerStore> TaskService<S> {
    /// Creates the facade over a store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads a project's board and tasks, creating an empty board on
    /// first fetch.
    pub fn fetch_board(&self, project_id: ProjectId) -> ServiceResult<BoardSnapshot> {
        if let Some(board) = self.store.get_board_for_project(project_id)? {
            let mut tasks = Vec::new();
            for column in &board.columns {
                tasks.extend(self.store.list_tasks(&TaskFilter::column(column.id))?);
            }
            return Ok(BoardSnapshot { board, tasks });
        }

        let board = TaskBoard::new(project_id);
        self.store.add_board(&board)?;
        Ok(BoardSnapshot {
            board,
            tasks: Vec::new(),
        })
    }

    /// Creates a column appended to the board, creating the board first
    /// when the project does not have one yet.
    pub fn create_column(&self, project_id: ProjectId, name: &str) -> ServiceResult<TaskColumn> {
        let name = require_text("column name", name)?;
        let board = match self.store.get_board_for_project(project_id)? {
            Some(board) => board,
            None => {
                let board = TaskBoard::new(project_id);
                self.store.add_board(&board)?;
                board
            }
        };

        let column = TaskColumn::new(name, board.columns.len() as i64);
        let mut columns = board.columns;
        columns.push(column.clone());
        self.replace_columns(board.id, columns)?;
        Ok(column)
    }

    /// Renames a column.
    pub fn rename_column(
        &self,
        project_id: ProjectId,
        column_id: ColumnId,
        name: &str,
    ) -> ServiceResult<TaskColumn> {
        let name = require_text("column name", name)?;
        let board = self.require_board(project_id)?;

        let mut columns = board.columns;
        let column = columns
            .iter_mut()
            .find(|column| column.id == column_id)
            .ok_or(ServiceError::NotFound {
                entity: "task column",
                id: column_id,
            })?;
        column.name = name;
        let renamed = column.clone();

        self.replace_columns(board.id, columns)?;
        Ok(renamed)
    }

    /// Deletes a column and every task in it.
    ///
    /// Surviving columns keep their `order` values; gaps are tolerated.
    pub fn delete_column(&self, project_id: ProjectId, column_id: ColumnId) -> ServiceResult<()> {
        let board = self.require_board(project_id)?;
        if board.column(column_id).is_none() {
            return Err(ServiceError::NotFound {
                entity: "task column",
                id: column_id,
            });
        }

        for task in self.store.list_tasks(&TaskFilter::column(column_id))? {
            self.store.delete_task(task.id)?;
        }

        let columns = board
            .columns
            .iter()
            .filter(|column| column.id != column_id)
            .cloned()
            .collect();
        self.replace_columns(board.id, columns)
    }

    /// Moves a column to a new position within its board.
    ///
    /// Returns the reordered column set, persisted as one board write.
    pub fn move_column(&self, request: &ColumnMove) -> ServiceResult<Vec<TaskColumn>> {
        let board = self.require_board(request.project_id)?;
        let columns = board.columns;

        let matches = columns
            .get(request.source_index)
            .is_some_and(|column| column.id == request.column_id);
        if !matches {
            return Err(ServiceError::NotFound {
                entity: "task column",
                id: request.column_id,
            });
        }

        let dest_index = request.dest_index.min(columns.len().saturating_sub(1));
        if request.source_index == dest_index {
            return Ok(columns);
        }

        let reordered = reorder_within(columns, request.source_index, dest_index);
        self.replace_columns(board.id, reordered.clone())?;
        Ok(reordered)
    }

    /// Creates an open task appended to a column.
    ///
    /// The project's board must already exist.
    pub fn create_task(
        &self,
        project_id: ProjectId,
        column_id: ColumnId,
        text: &str,
    ) -> ServiceResult<Task> {
        let text = require_text("task text", text)?;
        let board = self.require_board(project_id)?;
        if board.column(column_id).is_none() {
            return Err(ServiceError::NotFound {
                entity: "task column",
                id: column_id,
            });
        }

        let siblings = self.store.list_tasks(&TaskFilter::column(column_id))?;
        let task = Task::new(text, column_id, siblings.len() as i64);
        self.store.add_task(&task)?;
        Ok(task)
    }

    /// Updates a task's text and/or completion state.
    pub fn update_task(&self, task_id: TaskId, update: &TaskUpdate) -> ServiceResult<Task> {
        let text = update
            .text
            .as_deref()
            .map(|text| require_text("task text", text))
            .transpose()?;

        let patch = TaskPatch {
            text,
            completed: update.completed,
            ..TaskPatch::default()
        };
        self.store
            .update_task(task_id, &patch)?
            .ok_or(ServiceError::NotFound {
                entity: "task",
                id: task_id,
            })
    }

    /// Deletes a task.
    ///
    /// Surviving siblings keep their `order` values; gaps are tolerated.
    pub fn delete_task(&self, task_id: TaskId) -> ServiceResult<()> {
        if !self.store.delete_task(task_id)? {
            return Err(ServiceError::NotFound {
                entity: "task",
                id: task_id,
            });
        }
        Ok(())
    }

    /// Moves a task within its column or into another column.
    ///
    /// Every task in the affected column(s) is persisted with its new
    /// order; the moved task additionally persists its new column id.
    pub fn move_task(&self, request: &TaskMove) -> ServiceResult<()> {
        let source_items = self
            .store
            .list_tasks(&TaskFilter::column(request.source_column))?;

        let matches = source_items
            .get(request.source_index)
            .is_some_and(|task| task.id == request.task_id);
        if !matches {
            return Err(ServiceError::NotFound {
                entity: "task",
                id: request.task_id,
            });
        }

        if request.source_column == request.dest_column {
            if request.source_index == request.dest_index {
                return Ok(());
            }
            let reordered =
                reorder_within(source_items, request.source_index, request.dest_index);
            for task in &reordered {
                self.persist_order(task, None)?;
            }
            return Ok(());
        }

        let dest_items = self
            .store
            .list_tasks(&TaskFilter::column(request.dest_column))?;

        let dest_column = request.dest_column;
        let (source_items, dest_items) = reorder_across(
            source_items,
            dest_items,
            request.source_index,
            request.dest_index,
            |task| task.column_id = dest_column,
        );

        for task in &source_items {
            self.persist_order(task, None)?;
        }
        for task in &dest_items {
            let rekey = (task.id == request.task_id).then_some(dest_column);
            self.persist_order(task, rekey)?;
        }
        Ok(())
    }

    fn persist_order(&self, task: &Task, rekey: Option<ColumnId>) -> ServiceResult<()> {
        let patch = TaskPatch {
            order: Some(task.order),
            column_id: rekey,
            ..TaskPatch::default()
        };
        self.store
            .update_task(task.id, &patch)?
            .ok_or(ServiceError::NotFound {
                entity: "task",
                id: task.id,
            })?;
        Ok(())
    }

    fn replace_columns(&self, board_id: BoardId, columns: Vec<TaskColumn>) -> ServiceResult<()> {
        let patch = BoardPatch {
            columns: Some(columns),
        };
        self.store
            .update_board(board_id, &patch)?
            .ok_or(ServiceError::NotFound {
                entity: "task board",
                id: board_id,
            })?;
        Ok(())
    }

    fn require_board(&self, project_id: ProjectId) -> ServiceResult<TaskBoard> {
        self.store
            .get_board_for_project(project_id)?
            .ok_or(ServiceError::NotFound {
                entity: "task board",
                id: project_id,
            })
    }
}
