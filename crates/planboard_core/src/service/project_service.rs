//! Project facade: card CRUD, cross-layer moves, template snapshots.
//!
//! # Invariants
//! - A new project appends to its container: `order = sibling count`.
//! - Same-container moves are detected here by key equality and routed
//!   around the cross-container path, so the moved card is never counted
//!   in both lists.
//! - Move persistence is per entity and not transactional; on failure the
//!   caller reloads board state instead of trusting partial results.

use crate::model::{LayerKey, Project, ProjectId, Template};
use crate::order::{reorder_across, reorder_within};
use crate::service::{delete_project_cascade, require_text, ServiceError, ServiceResult};
use crate::store::{PlannerStore, ProjectFilter, ProjectPatch};

/// Input for creating a project card.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub key: LayerKey,
    pub tags: Vec<String>,
    /// Epoch milliseconds.
    pub due_date: Option<i64>,
}

/// Partial update of a project's descriptive fields.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Epoch milliseconds.
    pub due_date: Option<i64>,
}

/// Drag payload for moving a card within or between layers.
///
/// The entity found at `source_index` of the source container must be
/// `project_id`, otherwise the caller's view is stale and the move is
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectMove {
    pub project_id: ProjectId,
    pub source: LayerKey,
    pub dest: LayerKey,
    pub source_index: usize,
    pub dest_index: usize,
}

/// Facade over the project collection.
pub struct ProjectService<S: PlannerStore> {
    store: S,
}

impl<S: PlannerStore> ProjectService<S> {
    /// Creates the facade over a store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a project appended to its `(stage, layer)` container.
    pub fn create_project(&self, request: NewProject) -> ServiceResult<Project> {
        let name = require_text("project name", &request.name)?;
        let siblings = self.store.list_projects(&ProjectFilter::layer(
            request.key.stage_id,
            request.key.layer_id,
        ))?;

        let project = Project::new(
            name,
            request.description,
            request.key,
            siblings.len() as i64,
            request.tags,
            request.due_date,
        );
        self.store.add_project(&project)?;
        Ok(project)
    }

    /// Lists the cards of one `(stage, layer)` container, sorted by order.
    pub fn list_projects_for_layer(&self, key: LayerKey) -> ServiceResult<Vec<Project>> {
        Ok(self
            .store
            .list_projects(&ProjectFilter::layer(key.stage_id, key.layer_id))?)
    }

    /// Updates a project's descriptive fields; `updated_at` refreshes.
    pub fn update_project(
        &self,
        project_id: ProjectId,
        update: &ProjectUpdate,
    ) -> ServiceResult<Project> {
        let name = update
            .name
            .as_deref()
            .map(|name| require_text("project name", name))
            .transpose()?;

        let patch = ProjectPatch {
            name,
            description: update.description.clone(),
            tags: update.tags.clone(),
            due_date: update.due_date,
            ..ProjectPatch::default()
        };
        self.store
            .update_project(project_id, &patch)?
            .ok_or(ServiceError::NotFound {
                entity: "project",
                id: project_id,
            })
    }

    /// Deletes a project together with its task board and tasks.
    ///
    /// Surviving siblings keep their `order` values; gaps are tolerated.
    pub fn delete_project(&self, project_id: ProjectId) -> ServiceResult<()> {
        if !delete_project_cascade(&self.store, project_id)? {
            return Err(ServiceError::NotFound {
                entity: "project",
                id: project_id,
            });
        }
        Ok(())
    }

    /// Moves a card within its layer or into another layer.
    ///
    /// Every card in the affected container(s) is persisted with its new
    /// order; the moved card additionally persists its new container key.
    pub fn move_project(&self, request: &ProjectMove) -> ServiceResult<()> {
        let source_items = self.store.list_projects(&ProjectFilter::layer(
            request.source.stage_id,
            request.source.layer_id,
        ))?;

        let matches = source_items
            .get(request.source_index)
            .is_some_and(|project| project.id == request.project_id);
        if !matches {
            return Err(ServiceError::NotFound {
                entity: "project",
                id: request.project_id,
            });
        }

        if request.source == request.dest {
            if request.source_index == request.dest_index {
                return Ok(());
            }
            let reordered =
                reorder_within(source_items, request.source_index, request.dest_index);
            for project in &reordered {
                self.persist_order(project, None)?;
            }
            return Ok(());
        }

        let dest_items = self.store.list_projects(&ProjectFilter::layer(
            request.dest.stage_id,
            request.dest.layer_id,
        ))?;

        let dest_key = request.dest;
        let (source_items, dest_items) = reorder_across(
            source_items,
            dest_items,
            request.source_index,
            request.dest_index,
            |project| {
                project.stage_id = dest_key.stage_id;
                project.layer_id = dest_key.layer_id;
            },
        );

        for project in &source_items {
            self.persist_order(project, None)?;
        }
        for project in &dest_items {
            let rekey = (project.id == request.project_id).then_some(dest_key);
            self.persist_order(project, rekey)?;
        }
        Ok(())
    }

    /// Snapshots a project's descriptive fields into a template.
    ///
    /// The project's task board is not copied.
    pub fn save_as_template(&self, project_id: ProjectId) -> ServiceResult<Template> {
        let project = self
            .store
            .get_project(project_id)?
            .ok_or(ServiceError::NotFound {
                entity: "project",
                id: project_id,
            })?;

        let template = Template::new(
            format!("{} Template", project.name),
            project.description,
            project.tags,
        );
        self.store.add_template(&template)?;
        Ok(template)
    }

    /// Lists template snapshots, oldest first.
    pub fn list_templates(&self) -> ServiceResult<Vec<Template>> {
        Ok(self.store.list_templates()?)
    }

    fn persist_order(&self, project: &Project, rekey: Option<LayerKey>) -> ServiceResult<()> {
        let mut patch = ProjectPatch {
            order: Some(project.order),
            ..ProjectPatch::default()
        };
        if let Some(key) = rekey {
            patch.stage_id = Some(key.stage_id);
            patch.layer_id = Some(key.layer_id);
        }
        self.store
            .update_project(project.id, &patch)?
            .ok_or(ServiceError::NotFound {
                entity: "project",
                id: project.id,
            })?;
        Ok(())
    }
}
