//! Domain model for the content planning board.
//!
//! # Responsibility
//! - Define the canonical records shared by both persistence backends.
//! - Keep entity shapes plain data so interface layers can consume them
//!   without translation.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID.
//! - `order` values are container-local positions maintained by the
//!   ordering module; the model never renumbers on its own.

pub mod planner;
pub mod project;
pub mod task;

pub use planner::{ContentPlanner, Layer, LayerId, PlannerId, Stage, StageId, DEFAULT_LAYER_NAMES};
pub use project::{LayerKey, Project, ProjectId, Template, TemplateId};
pub use task::{BoardId, ColumnId, Task, TaskBoard, TaskColumn, TaskId};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
