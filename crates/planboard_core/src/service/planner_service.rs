//! Planner tree facade: stages, layers, and stage reordering.
//!
//! # Invariants
//! - The planner singleton is created exactly once; repeated
//!   initialization is a no-op returning the existing tree.
//! - Stage reordering persists one update per stage, never a bulk write.
//! - Stage and layer deletion cascades to the projects (and their boards
//!   and tasks) living in the deleted container.

use crate::model::{ContentPlanner, Layer, LayerId, Stage, StageId};
use crate::order::reorder_within;
use crate::service::{delete_project_cascade, require_text, ServiceError, ServiceResult};
use crate::store::{PlannerStore, ProjectFilter, StagePatch};
use log::info;

/// Drag payload for reordering the stage collection.
///
/// `source_index`/`dest_index` address the stage list sorted by order;
/// the entity found at `source_index` must be `stage_id`, otherwise the
/// caller's view is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageMove {
    pub stage_id: StageId,
    pub source_index: usize,
    pub dest_index: usize,
}

/// Facade over the planner tree.
pub struct PlannerService<S: PlannerStore> {
    store: S,
}

impl<S: PlannerStore> PlannerService<S> {
    /// Creates the facade over a store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Loads the planner singleton, creating the default board on first
    /// use. Idempotent: an existing tree is returned untouched.
    pub fn ensure_initialized(&self) -> ServiceResult<ContentPlanner> {
        if let Some(planner) = self.store.get_planner()? {
            return Ok(planner);
        }
        let planner = ContentPlanner::bootstrap();
        self.store.init_planner(&planner)?;
        info!(
            "event=planner_bootstrap module=service status=ok stages={}",
            planner.stages.len()
        );
        Ok(planner)
    }

    /// Creates a stage appended after the current last stage.
    pub fn create_stage(&self, name: &str, layer_names: &[&str]) -> ServiceResult<Stage> {
        let name = require_text("stage name", name)?;
        let mut layers = Vec::with_capacity(layer_names.len());
        for (index, layer_name) in layer_names.iter().enumerate() {
            layers.push(Layer::new(require_text("layer name", layer_name)?, index as i64));
        }

        let planner = self.require_planner()?;
        let stage = Stage::new(name, planner.stages.len() as i64, layers);
        self.store.add_stage(&stage)?;
        Ok(stage)
    }

    /// Renames a stage.
    pub fn rename_stage(&self, stage_id: StageId, name: &str) -> ServiceResult<Stage> {
        let name = require_text("stage name", name)?;
        let patch = StagePatch {
            name: Some(name),
            ..StagePatch::default()
        };
        self.store
            .update_stage(stage_id, &patch)?
            .ok_or(ServiceError::NotFound {
                entity: "stage",
                id: stage_id,
            })
    }

    /// Deletes a stage, its layers, and every project living in it.
    ///
    /// Surviving stages keep their `order` values; gaps are tolerated.
    pub fn delete_stage(&self, stage_id: StageId) -> ServiceResult<()> {
        for project in self.store.list_projects(&ProjectFilter::stage(stage_id))? {
            delete_project_cascade(&self.store, project.id)?;
        }
        if !self.store.delete_stage(stage_id)? {
            return Err(ServiceError::NotFound {
                entity: "stage",
                id: stage_id,
            });
        }
        Ok(())
    }

    /// Creates a layer appended after the stage's current last layer.
    pub fn create_layer(&self, stage_id: StageId, name: &str) -> ServiceResult<Layer> {
        let name = require_text("layer name", name)?;
        let planner = self.require_planner()?;
        let stage = planner.stage(stage_id).ok_or(ServiceError::NotFound {
            entity: "stage",
            id: stage_id,
        })?;

        let layer = Layer::new(name, stage.layers.len() as i64);
        let mut layers = stage.layers.clone();
        layers.push(layer.clone());
        self.replace_layers(stage_id, layers)?;
        Ok(layer)
    }

    /// Renames a layer within a stage.
    pub fn rename_layer(
        &self,
        stage_id: StageId,
        layer_id: LayerId,
        name: &str,
    ) -> ServiceResult<Layer> {
        let name = require_text("layer name", name)?;
        let planner = self.require_planner()?;
        let stage = planner.stage(stage_id).ok_or(ServiceError::NotFound {
            entity: "stage",
            id: stage_id,
        })?;

        let mut layers = stage.layers.clone();
        let layer = layers
            .iter_mut()
            .find(|layer| layer.id == layer_id)
            .ok_or(ServiceError::NotFound {
                entity: "layer",
                id: layer_id,
            })?;
        layer.name = name;
        let renamed = layer.clone();

        self.replace_layers(stage_id, layers)?;
        Ok(renamed)
    }

    /// Deletes a layer and every project living in it.
    ///
    /// Projects in sibling layers are untouched and keep their `order`
    /// values.
    pub fn delete_layer(&self, stage_id: StageId, layer_id: LayerId) -> ServiceResult<()> {
        let planner = self.require_planner()?;
        let stage = planner.stage(stage_id).ok_or(ServiceError::NotFound {
            entity: "stage",
            id: stage_id,
        })?;
        if stage.layer(layer_id).is_none() {
            return Err(ServiceError::NotFound {
                entity: "layer",
                id: layer_id,
            });
        }

        for project in self
            .store
            .list_projects(&ProjectFilter::layer(stage_id, layer_id))?
        {
            delete_project_cascade(&self.store, project.id)?;
        }

        let layers = stage
            .layers
            .iter()
            .filter(|layer| layer.id != layer_id)
            .cloned()
            .collect();
        self.replace_layers(stage_id, layers)
    }

    /// Moves a stage to a new position in the stage collection.
    ///
    /// Returns the reordered collection. Each stage's new order is
    /// persisted with an individual update call.
    pub fn move_stage(&self, request: &StageMove) -> ServiceResult<Vec<Stage>> {
        let planner = self.require_planner()?;
        let stages = planner.stages;

        let matches = stages
            .get(request.source_index)
            .is_some_and(|stage| stage.id == request.stage_id);
        if !matches {
            return Err(ServiceError::NotFound {
                entity: "stage",
                id: request.stage_id,
            });
        }

        let dest_index = request.dest_index.min(stages.len().saturating_sub(1));
        if request.source_index == dest_index {
            return Ok(stages);
        }

        let reordered = reorder_within(stages, request.source_index, dest_index);
        for stage in &reordered {
            let patch = StagePatch {
                order: Some(stage.order),
                ..StagePatch::default()
            };
            self.store.update_stage(stage.id, &patch)?;
        }
        Ok(reordered)
    }

    fn replace_layers(&self, stage_id: StageId, layers: Vec<Layer>) -> ServiceResult<()> {
        let patch = StagePatch {
            layers: Some(layers),
            ..StagePatch::default()
        };
        self.store
            .update_stage(stage_id, &patch)?
            .ok_or(ServiceError::NotFound {
                entity: "stage",
                id: stage_id,
            })?;
        Ok(())
    }

    fn require_planner(&self) -> ServiceResult<ContentPlanner> {
        Ok(self
            .store
            .get_planner()?
            .ok_or(crate::store::StoreError::MissingPlanner)?)
    }
}
