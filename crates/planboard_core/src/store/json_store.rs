//! Local JSON-backed planner store.
//!
//! # Responsibility
//! - Persist each collection as one independent blob file under a root
//!   directory, mirroring client-local keyed storage.
//!
//! # Invariants
//! - Blob layout: `content_planner.json`, `projects.json`,
//!   `task_boards.json`, `tasks.json`, `templates.json`. No schema
//!   versioning.
//! - A missing blob reads as an empty collection.
//! - Every mutation rewrites the owning collection blob wholesale.

use crate::model::{
    now_epoch_ms, BoardId, ContentPlanner, Project, ProjectId, Stage, StageId, Task, TaskBoard,
    TaskId, Template,
};
use crate::store::{
    BoardPatch, PlannerStore, ProjectFilter, ProjectPatch, StagePatch, StoreError, StoreResult,
    TaskFilter, TaskPatch,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

const PLANNER_BLOB: &str = "content_planner.json";
const PROJECTS_BLOB: &str = "projects.json";
const BOARDS_BLOB: &str = "task_boards.json";
const TASKS_BLOB: &str = "tasks.json";
const TEMPLATES_BLOB: &str = "templates.json";

/// Planner store over a directory of collection blobs.
pub struct JsonPlannerStore {
    dir: PathBuf,
}

impl JsonPlannerStore {
    /// Opens (and creates, if needed) the blob directory.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn read_blob<T: DeserializeOwned>(&self, name: &str) -> StoreResult<Option<T>> {
        let path = self.dir.join(name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn write_blob<T: Serialize>(&self, name: &str, value: &T) -> StoreResult<()> {
        let path = self.dir.join(name);
        fs::write(path, serde_json::to_string(value)?)?;
        Ok(())
    }

    fn load_planner(&self) -> StoreResult<Option<ContentPlanner>> {
        self.read_blob(PLANNER_BLOB)
    }

    fn require_planner(&self) -> StoreResult<ContentPlanner> {
        self.load_planner()?.ok_or(StoreError::MissingPlanner)
    }

    fn load_projects(&self) -> StoreResult<Vec<Project>> {
        Ok(self.read_blob(PROJECTS_BLOB)?.unwrap_or_default())
    }

    fn load_boards(&self) -> StoreResult<Vec<TaskBoard>> {
        Ok(self.read_blob(BOARDS_BLOB)?.unwrap_or_default())
    }

    fn load_tasks(&self) -> StoreResult<Vec<Task>> {
        Ok(self.read_blob(TASKS_BLOB)?.unwrap_or_default())
    }

    fn load_templates(&self) -> StoreResult<Vec<Template>> {
        Ok(self.read_blob(TEMPLATES_BLOB)?.unwrap_or_default())
    }
}

impl PlannerStore for JsonPlannerStore {
    fn get_planner(&self) -> StoreResult<Option<ContentPlanner>> {
        let Some(mut planner) = self.load_planner()? else {
            return Ok(None);
        };
        planner.stages.sort_by_key(|stage| (stage.order, stage.id));
        for stage in &mut planner.stages {
            stage.layers.sort_by_key(|layer| (layer.order, layer.id));
        }
        Ok(Some(planner))
    }

    fn init_planner(&self, planner: &ContentPlanner) -> StoreResult<()> {
        if self.load_planner()?.is_some() {
            return Err(StoreError::InvalidData(
                "content planner already initialized".to_string(),
            ));
        }
        self.write_blob(PLANNER_BLOB, planner)
    }

    fn add_stage(&self, stage: &Stage) -> StoreResult<()> {
        let mut planner = self.require_planner()?;
        planner.stages.push(stage.clone());
        self.write_blob(PLANNER_BLOB, &planner)
    }

    fn update_stage(&self, stage_id: StageId, patch: &StagePatch) -> StoreResult<Option<Stage>> {
        let Some(mut planner) = self.load_planner()? else {
            return Ok(None);
        };
        let Some(stage) = planner.stage_mut(stage_id) else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            stage.name = name.clone();
        }
        if let Some(order) = patch.order {
            stage.order = order;
        }
        if let Some(layers) = &patch.layers {
            stage.layers = layers.clone();
        }
        let updated = stage.clone();

        self.write_blob(PLANNER_BLOB, &planner)?;
        Ok(Some(updated))
    }

    fn delete_stage(&self, stage_id: StageId) -> StoreResult<bool> {
        let Some(mut planner) = self.load_planner()? else {
            return Ok(false);
        };
        let before = planner.stages.len();
        planner.stages.retain(|stage| stage.id != stage_id);
        if planner.stages.len() == before {
            return Ok(false);
        }
        self.write_blob(PLANNER_BLOB, &planner)?;
        Ok(true)
    }

    fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>> {
        let mut projects = self.load_projects()?;
        projects.retain(|project| {
            filter
                .stage_id
                .map_or(true, |stage_id| project.stage_id == stage_id)
                && filter
                    .layer_id
                    .map_or(true, |layer_id| project.layer_id == layer_id)
        });
        projects.sort_by_key(|project| (project.order, project.id));
        Ok(projects)
    }

    fn get_project(&self, project_id: ProjectId) -> StoreResult<Option<Project>> {
        Ok(self
            .load_projects()?
            .into_iter()
            .find(|project| project.id == project_id))
    }

    fn add_project(&self, project: &Project) -> StoreResult<()> {
        let mut projects = self.load_projects()?;
        projects.push(project.clone());
        self.write_blob(PROJECTS_BLOB, &projects)
    }

    fn update_project(
        &self,
        project_id: ProjectId,
        patch: &ProjectPatch,
    ) -> StoreResult<Option<Project>> {
        let mut projects = self.load_projects()?;
        let Some(project) = projects.iter_mut().find(|project| project.id == project_id) else {
            return Ok(None);
        };

        if let Some(name) = &patch.name {
            project.name = name.clone();
        }
        if let Some(description) = &patch.description {
            project.description = description.clone();
        }
        if let Some(tags) = &patch.tags {
            project.tags = tags.clone();
        }
        if let Some(due_date) = patch.due_date {
            project.due_date = Some(due_date);
        }
        if let Some(order) = patch.order {
            project.order = order;
        }
        if let Some(stage_id) = patch.stage_id {
            project.stage_id = stage_id;
        }
        if let Some(layer_id) = patch.layer_id {
            project.layer_id = layer_id;
        }
        project.updated_at = now_epoch_ms();
        let updated = project.clone();

        self.write_blob(PROJECTS_BLOB, &projects)?;
        Ok(Some(updated))
    }

    fn delete_project(&self, project_id: ProjectId) -> StoreResult<bool> {
        let mut projects = self.load_projects()?;
        let before = projects.len();
        projects.retain(|project| project.id != project_id);
        if projects.len() == before {
            return Ok(false);
        }
        self.write_blob(PROJECTS_BLOB, &projects)?;
        Ok(true)
    }

    fn get_board_for_project(&self, project_id: ProjectId) -> StoreResult<Option<TaskBoard>> {
        let board = self
            .load_boards()?
            .into_iter()
            .find(|board| board.project_id == project_id);
        Ok(board.map(|mut board| {
            board.columns.sort_by_key(|column| (column.order, column.id));
            board
        }))
    }

    fn add_board(&self, board: &TaskBoard) -> StoreResult<()> {
        let mut boards = self.load_boards()?;
        boards.push(board.clone());
        self.write_blob(BOARDS_BLOB, &boards)
    }

    fn update_board(&self, board_id: BoardId, patch: &BoardPatch) -> StoreResult<Option<TaskBoard>> {
        let mut boards = self.load_boards()?;
        let Some(board) = boards.iter_mut().find(|board| board.id == board_id) else {
            return Ok(None);
        };

        if let Some(columns) = &patch.columns {
            board.columns = columns.clone();
        }
        let updated = board.clone();

        self.write_blob(BOARDS_BLOB, &boards)?;
        Ok(Some(updated))
    }

    fn delete_board(&self, board_id: BoardId) -> StoreResult<bool> {
        let mut boards = self.load_boards()?;
        let before = boards.len();
        boards.retain(|board| board.id != board_id);
        if boards.len() == before {
            return Ok(false);
        }
        self.write_blob(BOARDS_BLOB, &boards)?;
        Ok(true)
    }

    fn list_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let mut tasks = self.load_tasks()?;
        tasks.retain(|task| {
            filter
                .column_id
                .map_or(true, |column_id| task.column_id == column_id)
        });
        tasks.sort_by_key(|task| (task.order, task.id));
        Ok(tasks)
    }

    fn get_task(&self, task_id: TaskId) -> StoreResult<Option<Task>> {
        Ok(self
            .load_tasks()?
            .into_iter()
            .find(|task| task.id == task_id))
    }

    fn add_task(&self, task: &Task) -> StoreResult<()> {
        let mut tasks = self.load_tasks()?;
        tasks.push(task.clone());
        self.write_blob(TASKS_BLOB, &tasks)
    }

    fn update_task(&self, task_id: TaskId, patch: &TaskPatch) -> StoreResult<Option<Task>> {
        let mut tasks = self.load_tasks()?;
        let Some(task) = tasks.iter_mut().find(|task| task.id == task_id) else {
            return Ok(None);
        };

        if let Some(text) = &patch.text {
            task.text = text.clone();
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        if let Some(order) = patch.order {
            task.order = order;
        }
        if let Some(column_id) = patch.column_id {
            task.column_id = column_id;
        }
        let updated = task.clone();

        self.write_blob(TASKS_BLOB, &tasks)?;
        Ok(Some(updated))
    }

    fn delete_task(&self, task_id: TaskId) -> StoreResult<bool> {
        let mut tasks = self.load_tasks()?;
        let before = tasks.len();
        tasks.retain(|task| task.id != task_id);
        if tasks.len() == before {
            return Ok(false);
        }
        self.write_blob(TASKS_BLOB, &tasks)?;
        Ok(true)
    }

    fn list_templates(&self) -> StoreResult<Vec<Template>> {
        let mut templates = self.load_templates()?;
        templates.sort_by_key(|template| (template.created_at, template.id));
        Ok(templates)
    }

    fn add_template(&self, template: &Template) -> StoreResult<()> {
        let mut templates = self.load_templates()?;
        templates.push(template.clone());
        self.write_blob(TEMPLATES_BLOB, &templates)
    }
}
