//! Project cards and template snapshots.
//!
//! # Invariants
//! - A project belongs to exactly one `(stage_id, layer_id)` pair at a
//!   time; that pair is its container key.
//! - `updated_at` refreshes on every persisted field update.
//! - A template is an independent snapshot with no back-reference to the
//!   project it was taken from.

use crate::model::now_epoch_ms;
use crate::model::planner::{LayerId, StageId};
use crate::order::OrderedEntity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable project identifier.
pub type ProjectId = Uuid;
/// Stable template identifier.
pub type TemplateId = Uuid;

/// Container key identifying the sibling group a project belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerKey {
    pub stage_id: StageId,
    pub layer_id: LayerId,
}

impl LayerKey {
    pub fn new(stage_id: StageId, layer_id: LayerId) -> Self {
        Self { stage_id, layer_id }
    }
}

/// A card; the unit of planning content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub stage_id: StageId,
    pub layer_id: LayerId,
    pub order: i64,
    pub tags: Vec<String>,
    /// Epoch milliseconds, when a due date is set.
    pub due_date: Option<i64>,
    /// Epoch milliseconds, stamped at creation.
    pub created_at: i64,
    /// Epoch milliseconds, refreshed by the persistence adapter on update.
    pub updated_at: i64,
}

impl Project {
    /// Creates a project in the given container with creation timestamps.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        key: LayerKey,
        order: i64,
        tags: Vec<String>,
        due_date: Option<i64>,
    ) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            stage_id: key.stage_id,
            layer_id: key.layer_id,
            order,
            tags,
            due_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the container key this project currently belongs to.
    pub fn container_key(&self) -> LayerKey {
        LayerKey::new(self.stage_id, self.layer_id)
    }
}

impl OrderedEntity for Project {
    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }
}

/// Snapshot copy of a project's descriptive fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Epoch milliseconds, stamped at snapshot time.
    pub created_at: i64,
}

impl Template {
    /// Creates a template snapshot.
    pub fn new(name: impl Into<String>, description: impl Into<String>, tags: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            tags,
            created_at: now_epoch_ms(),
        }
    }
}
