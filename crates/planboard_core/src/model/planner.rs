//! Content planner tree: the singleton root, its stages, and their layers.
//!
//! # Invariants
//! - At most one `ContentPlanner` exists per store.
//! - A stage exclusively owns its layers; layers never outlive the stage.
//! - `order` is unique among sibling stages and among sibling layers of
//!   one stage while the board is only mutated through the facades.

use crate::order::OrderedEntity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of the planner singleton.
pub type PlannerId = Uuid;
/// Stable stage identifier.
pub type StageId = Uuid;
/// Stable layer identifier.
pub type LayerId = Uuid;

/// Layer names used for a freshly bootstrapped stage.
pub const DEFAULT_LAYER_NAMES: [&str; 3] = ["To Do", "In Progress", "Done"];

const BOOTSTRAP_STAGE_NAME: &str = "Production";

/// Singleton root owning the ordered stage collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPlanner {
    pub id: PlannerId,
    pub stages: Vec<Stage>,
}

impl ContentPlanner {
    /// Creates an empty planner root.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            stages: Vec::new(),
        }
    }

    /// Creates the default first-run planner: one "Production" stage with
    /// the standard three layers.
    pub fn bootstrap() -> Self {
        let mut planner = Self::new();
        planner
            .stages
            .push(Stage::with_default_layers(BOOTSTRAP_STAGE_NAME, 0));
        planner
    }

    /// Finds a stage by id.
    pub fn stage(&self, stage_id: StageId) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.id == stage_id)
    }

    /// Finds a stage by id, mutably.
    pub fn stage_mut(&mut self, stage_id: StageId) -> Option<&mut Stage> {
        self.stages.iter_mut().find(|stage| stage.id == stage_id)
    }
}

impl Default for ContentPlanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level board column owning an ordered set of layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    pub order: i64,
    pub layers: Vec<Layer>,
}

impl Stage {
    /// Creates a stage with the given layers.
    pub fn new(name: impl Into<String>, order: i64, layers: Vec<Layer>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            order,
            layers,
        }
    }

    /// Creates a stage pre-populated with the default layer set.
    pub fn with_default_layers(name: impl Into<String>, order: i64) -> Self {
        let layers = DEFAULT_LAYER_NAMES
            .iter()
            .enumerate()
            .map(|(index, layer_name)| Layer::new(*layer_name, index as i64))
            .collect();
        Self::new(name, order, layers)
    }

    /// Finds a layer by id.
    pub fn layer(&self, layer_id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == layer_id)
    }
}

/// Sub-lane within a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub order: i64,
}

impl Layer {
    /// Creates a layer with a generated stable id.
    pub fn new(name: impl Into<String>, order: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            order,
        }
    }
}

impl OrderedEntity for Stage {
    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }
}

impl OrderedEntity for Layer {
    fn order(&self) -> i64 {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = order;
    }
}
