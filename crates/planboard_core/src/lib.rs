//! Core domain logic for the Planboard content planning board.
//! This crate is the single source of truth for board invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod order;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{
    BoardId, ColumnId, ContentPlanner, Layer, LayerId, LayerKey, PlannerId, Project, ProjectId,
    Stage, StageId, Task, TaskBoard, TaskColumn, TaskId, Template, TemplateId,
    DEFAULT_LAYER_NAMES,
};
pub use order::{normalize, reorder_across, reorder_within, OrderedEntity};
pub use service::{
    BoardSnapshot, ColumnMove, NewProject, PlannerService, ProjectMove, ProjectService,
    ProjectUpdate, ServiceError, ServiceResult, StageMove, TaskMove, TaskService, TaskUpdate,
};
pub use store::{
    open_store, BoardPatch, JsonPlannerStore, PlannerStore, ProjectFilter, ProjectPatch,
    SqlitePlannerStore, StagePatch, StoreConfig, StoreError, StoreResult, TaskFilter, TaskPatch,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
