//! SQLite-backed planner store.
//!
//! # Responsibility
//! - Map the store contract onto relational tables with uuid TEXT keys.
//! - Keep SQL details inside this boundary.
//!
//! # Invariants
//! - Sibling queries are deterministic: `sort_order ASC, <uuid> ASC`.
//! - Embedded-document replacement (stage layers, board columns) runs in
//!   one immediate transaction, so a single entity update is atomic.
//! - No cross-entity transaction is offered; batch callers write entity
//!   by entity.

use crate::db::migrations::latest_version;
use crate::db::{open_db, open_db_in_memory};
use crate::model::{
    BoardId, ContentPlanner, Layer, Project, ProjectId, Stage, StageId, Task, TaskBoard,
    TaskColumn, TaskId, Template,
};
use crate::store::{
    BoardPatch, PlannerStore, ProjectFilter, ProjectPatch, StagePatch, StoreError, StoreResult,
    TaskFilter, TaskPatch,
};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use std::path::Path;
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT
    project_uuid,
    name,
    description,
    stage_uuid,
    layer_uuid,
    sort_order,
    tags,
    due_date,
    created_at,
    updated_at
FROM projects";

const TASK_SELECT_SQL: &str = "SELECT
    task_uuid,
    text,
    column_uuid,
    sort_order,
    completed
FROM tasks";

/// Planner store over a migrated SQLite connection.
#[derive(Debug)]
pub struct SqlitePlannerStore {
    conn: Connection,
}

impl SqlitePlannerStore {
    /// Opens a database file, migrates it, and wraps it as a store.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens an in-memory database, migrates it, and wraps it as a store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps an already-opened connection after verifying its schema.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    fn immediate_tx(&self) -> StoreResult<Transaction<'_>> {
        Ok(Transaction::new_unchecked(
            &self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl PlannerStore for SqlitePlannerStore {
    fn get_planner(&self) -> StoreResult<Option<ContentPlanner>> {
        let planner_id: Option<String> = self
            .conn
            .query_row("SELECT planner_uuid FROM planner LIMIT 1;", [], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(planner_id) = planner_id else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT stage_uuid, name, sort_order
             FROM stages
             ORDER BY sort_order ASC, stage_uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut stages = Vec::new();
        while let Some(row) = rows.next()? {
            let stage_uuid: String = row.get("stage_uuid")?;
            let stage_id = parse_uuid(&stage_uuid, "stages.stage_uuid")?;
            stages.push(Stage {
                id: stage_id,
                name: row.get("name")?,
                order: row.get("sort_order")?,
                layers: load_layers(&self.conn, stage_id)?,
            });
        }

        Ok(Some(ContentPlanner {
            id: parse_uuid(&planner_id, "planner.planner_uuid")?,
            stages,
        }))
    }

    fn init_planner(&self, planner: &ContentPlanner) -> StoreResult<()> {
        let tx = self.immediate_tx()?;
        tx.execute(
            "INSERT INTO planner (planner_uuid) VALUES (?1);",
            [planner.id.to_string()],
        )?;
        for stage in &planner.stages {
            insert_stage(&tx, stage)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn add_stage(&self, stage: &Stage) -> StoreResult<()> {
        let tx = self.immediate_tx()?;
        let has_planner: i64 =
            tx.query_row("SELECT EXISTS(SELECT 1 FROM planner);", [], |row| row.get(0))?;
        if has_planner == 0 {
            return Err(StoreError::MissingPlanner);
        }
        insert_stage(&tx, stage)?;
        tx.commit()?;
        Ok(())
    }

    fn update_stage(&self, stage_id: StageId, patch: &StagePatch) -> StoreResult<Option<Stage>> {
        let tx = self.immediate_tx()?;
        if load_stage(&tx, stage_id)?.is_none() {
            return Ok(None);
        }

        if let Some(name) = &patch.name {
            tx.execute(
                "UPDATE stages SET name = ?2 WHERE stage_uuid = ?1;",
                params![stage_id.to_string(), name],
            )?;
        }
        if let Some(order) = patch.order {
            tx.execute(
                "UPDATE stages SET sort_order = ?2 WHERE stage_uuid = ?1;",
                params![stage_id.to_string(), order],
            )?;
        }
        if let Some(layers) = &patch.layers {
            tx.execute(
                "DELETE FROM layers WHERE stage_uuid = ?1;",
                [stage_id.to_string()],
            )?;
            insert_layers(&tx, stage_id, layers)?;
        }

        let stage = load_stage(&tx, stage_id)?;
        tx.commit()?;
        Ok(stage)
    }

    fn delete_stage(&self, stage_id: StageId) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM stages WHERE stage_uuid = ?1;",
            [stage_id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn list_projects(&self, filter: &ProjectFilter) -> StoreResult<Vec<Project>> {
        let mut sql = format!("{PROJECT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(stage_id) = filter.stage_id {
            sql.push_str(" AND stage_uuid = ?");
            bind_values.push(Value::Text(stage_id.to_string()));
        }
        if let Some(layer_id) = filter.layer_id {
            sql.push_str(" AND layer_uuid = ?");
            bind_values.push(Value::Text(layer_id.to_string()));
        }
        sql.push_str(" ORDER BY sort_order ASC, project_uuid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn get_project(&self, project_id: ProjectId) -> StoreResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE project_uuid = ?1;"))?;
        let mut rows = stmt.query([project_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn add_project(&self, project: &Project) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO projects (
                project_uuid,
                name,
                description,
                stage_uuid,
                layer_uuid,
                sort_order,
                tags,
                due_date,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                project.id.to_string(),
                project.name.as_str(),
                project.description.as_str(),
                project.stage_id.to_string(),
                project.layer_id.to_string(),
                project.order,
                serde_json::to_string(&project.tags)?,
                project.due_date,
                project.created_at,
                project.updated_at,
            ],
        )?;
        Ok(())
    }

    fn update_project(
        &self,
        project_id: ProjectId,
        patch: &ProjectPatch,
    ) -> StoreResult<Option<Project>> {
        let mut sets = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(name) = &patch.name {
            sets.push("name = ?");
            bind_values.push(Value::Text(name.clone()));
        }
        if let Some(description) = &patch.description {
            sets.push("description = ?");
            bind_values.push(Value::Text(description.clone()));
        }
        if let Some(tags) = &patch.tags {
            sets.push("tags = ?");
            bind_values.push(Value::Text(serde_json::to_string(tags)?));
        }
        if let Some(due_date) = patch.due_date {
            sets.push("due_date = ?");
            bind_values.push(Value::Integer(due_date));
        }
        if let Some(order) = patch.order {
            sets.push("sort_order = ?");
            bind_values.push(Value::Integer(order));
        }
        if let Some(stage_id) = patch.stage_id {
            sets.push("stage_uuid = ?");
            bind_values.push(Value::Text(stage_id.to_string()));
        }
        if let Some(layer_id) = patch.layer_id {
            sets.push("layer_uuid = ?");
            bind_values.push(Value::Text(layer_id.to_string()));
        }
        sets.push("updated_at = (strftime('%s', 'now') * 1000)");

        let sql = format!(
            "UPDATE projects SET {} WHERE project_uuid = ?;",
            sets.join(", ")
        );
        bind_values.push(Value::Text(project_id.to_string()));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Ok(None);
        }
        self.get_project(project_id)
    }

    fn delete_project(&self, project_id: ProjectId) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM projects WHERE project_uuid = ?1;",
            [project_id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn get_board_for_project(&self, project_id: ProjectId) -> StoreResult<Option<TaskBoard>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT board_uuid, project_uuid
                 FROM task_boards
                 WHERE project_uuid = ?1;",
                [project_id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((board_uuid, project_uuid)) = row else {
            return Ok(None);
        };

        let board_id = parse_uuid(&board_uuid, "task_boards.board_uuid")?;
        Ok(Some(TaskBoard {
            id: board_id,
            project_id: parse_uuid(&project_uuid, "task_boards.project_uuid")?,
            columns: load_columns(&self.conn, board_id)?,
        }))
    }

    fn add_board(&self, board: &TaskBoard) -> StoreResult<()> {
        let tx = self.immediate_tx()?;
        tx.execute(
            "INSERT INTO task_boards (board_uuid, project_uuid) VALUES (?1, ?2);",
            params![board.id.to_string(), board.project_id.to_string()],
        )?;
        insert_columns(&tx, board.id, &board.columns)?;
        tx.commit()?;
        Ok(())
    }

    fn update_board(&self, board_id: BoardId, patch: &BoardPatch) -> StoreResult<Option<TaskBoard>> {
        let tx = self.immediate_tx()?;
        let project_uuid: Option<String> = tx
            .query_row(
                "SELECT project_uuid FROM task_boards WHERE board_uuid = ?1;",
                [board_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(project_uuid) = project_uuid else {
            return Ok(None);
        };

        if let Some(columns) = &patch.columns {
            tx.execute(
                "DELETE FROM task_columns WHERE board_uuid = ?1;",
                [board_id.to_string()],
            )?;
            insert_columns(&tx, board_id, columns)?;
        }

        let board = TaskBoard {
            id: board_id,
            project_id: parse_uuid(&project_uuid, "task_boards.project_uuid")?,
            columns: load_columns(&tx, board_id)?,
        };
        tx.commit()?;
        Ok(Some(board))
    }

    fn delete_board(&self, board_id: BoardId) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM task_boards WHERE board_uuid = ?1;",
            [board_id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn list_tasks(&self, filter: &TaskFilter) -> StoreResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(column_id) = filter.column_id {
            sql.push_str(" AND column_uuid = ?");
            bind_values.push(Value::Text(column_id.to_string()));
        }
        sql.push_str(" ORDER BY sort_order ASC, task_uuid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn get_task(&self, task_id: TaskId) -> StoreResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE task_uuid = ?1;"))?;
        let mut rows = stmt.query([task_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn add_task(&self, task: &Task) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO tasks (task_uuid, text, column_uuid, sort_order, completed)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                task.id.to_string(),
                task.text.as_str(),
                task.column_id.to_string(),
                task.order,
                bool_to_int(task.completed),
            ],
        )?;
        Ok(())
    }

    fn update_task(&self, task_id: TaskId, patch: &TaskPatch) -> StoreResult<Option<Task>> {
        let mut sets = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(text) = &patch.text {
            sets.push("text = ?");
            bind_values.push(Value::Text(text.clone()));
        }
        if let Some(completed) = patch.completed {
            sets.push("completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }
        if let Some(order) = patch.order {
            sets.push("sort_order = ?");
            bind_values.push(Value::Integer(order));
        }
        if let Some(column_id) = patch.column_id {
            sets.push("column_uuid = ?");
            bind_values.push(Value::Text(column_id.to_string()));
        }
        if sets.is_empty() {
            return self.get_task(task_id);
        }

        let sql = format!("UPDATE tasks SET {} WHERE task_uuid = ?;", sets.join(", "));
        bind_values.push(Value::Text(task_id.to_string()));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Ok(None);
        }
        self.get_task(task_id)
    }

    fn delete_task(&self, task_id: TaskId) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM tasks WHERE task_uuid = ?1;",
            [task_id.to_string()],
        )?;
        Ok(changed > 0)
    }

    fn list_templates(&self) -> StoreResult<Vec<Template>> {
        let mut stmt = self.conn.prepare(
            "SELECT template_uuid, name, description, tags, created_at
             FROM templates
             ORDER BY created_at ASC, template_uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut templates = Vec::new();
        while let Some(row) = rows.next()? {
            let template_uuid: String = row.get("template_uuid")?;
            let tags_text: String = row.get("tags")?;
            templates.push(Template {
                id: parse_uuid(&template_uuid, "templates.template_uuid")?,
                name: row.get("name")?,
                description: row.get("description")?,
                tags: parse_tags(&tags_text, "templates.tags")?,
                created_at: row.get("created_at")?,
            });
        }
        Ok(templates)
    }

    fn add_template(&self, template: &Template) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO templates (template_uuid, name, description, tags, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                template.id.to_string(),
                template.name.as_str(),
                template.description.as_str(),
                serde_json::to_string(&template.tags)?,
                template.created_at,
            ],
        )?;
        Ok(())
    }
}

fn insert_stage(conn: &Connection, stage: &Stage) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO stages (stage_uuid, name, sort_order) VALUES (?1, ?2, ?3);",
        params![stage.id.to_string(), stage.name.as_str(), stage.order],
    )?;
    insert_layers(conn, stage.id, &stage.layers)
}

fn insert_layers(conn: &Connection, stage_id: StageId, layers: &[Layer]) -> StoreResult<()> {
    for layer in layers {
        conn.execute(
            "INSERT INTO layers (layer_uuid, stage_uuid, name, sort_order)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                layer.id.to_string(),
                stage_id.to_string(),
                layer.name.as_str(),
                layer.order,
            ],
        )?;
    }
    Ok(())
}

fn insert_columns(conn: &Connection, board_id: BoardId, columns: &[TaskColumn]) -> StoreResult<()> {
    for column in columns {
        conn.execute(
            "INSERT INTO task_columns (column_uuid, board_uuid, name, sort_order)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                column.id.to_string(),
                board_id.to_string(),
                column.name.as_str(),
                column.order,
            ],
        )?;
    }
    Ok(())
}

fn load_stage(conn: &Connection, stage_id: StageId) -> StoreResult<Option<Stage>> {
    let row: Option<(String, i64)> = conn
        .query_row(
            "SELECT name, sort_order FROM stages WHERE stage_uuid = ?1;",
            [stage_id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    let Some((name, order)) = row else {
        return Ok(None);
    };
    Ok(Some(Stage {
        id: stage_id,
        name,
        order,
        layers: load_layers(conn, stage_id)?,
    }))
}

fn load_layers(conn: &Connection, stage_id: StageId) -> StoreResult<Vec<Layer>> {
    let mut stmt = conn.prepare(
        "SELECT layer_uuid, name, sort_order
         FROM layers
         WHERE stage_uuid = ?1
         ORDER BY sort_order ASC, layer_uuid ASC;",
    )?;
    let mut rows = stmt.query([stage_id.to_string()])?;
    let mut layers = Vec::new();
    while let Some(row) = rows.next()? {
        let layer_uuid: String = row.get("layer_uuid")?;
        layers.push(Layer {
            id: parse_uuid(&layer_uuid, "layers.layer_uuid")?,
            name: row.get("name")?,
            order: row.get("sort_order")?,
        });
    }
    Ok(layers)
}

fn load_columns(conn: &Connection, board_id: BoardId) -> StoreResult<Vec<TaskColumn>> {
    let mut stmt = conn.prepare(
        "SELECT column_uuid, name, sort_order
         FROM task_columns
         WHERE board_uuid = ?1
         ORDER BY sort_order ASC, column_uuid ASC;",
    )?;
    let mut rows = stmt.query([board_id.to_string()])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let column_uuid: String = row.get("column_uuid")?;
        columns.push(TaskColumn {
            id: parse_uuid(&column_uuid, "task_columns.column_uuid")?,
            name: row.get("name")?,
            order: row.get("sort_order")?,
        });
    }
    Ok(columns)
}

fn parse_project_row(row: &Row<'_>) -> StoreResult<Project> {
    let project_uuid: String = row.get("project_uuid")?;
    let stage_uuid: String = row.get("stage_uuid")?;
    let layer_uuid: String = row.get("layer_uuid")?;
    let tags_text: String = row.get("tags")?;

    Ok(Project {
        id: parse_uuid(&project_uuid, "projects.project_uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        stage_id: parse_uuid(&stage_uuid, "projects.stage_uuid")?,
        layer_id: parse_uuid(&layer_uuid, "projects.layer_uuid")?,
        order: row.get("sort_order")?,
        tags: parse_tags(&tags_text, "projects.tags")?,
        due_date: row.get("due_date")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_task_row(row: &Row<'_>) -> StoreResult<Task> {
    let task_uuid: String = row.get("task_uuid")?;
    let column_uuid: String = row.get("column_uuid")?;
    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid completed value `{other}` in tasks.completed"
            )));
        }
    };

    Ok(Task {
        id: parse_uuid(&task_uuid, "tasks.task_uuid")?,
        text: row.get("text")?,
        column_id: parse_uuid(&column_uuid, "tasks.column_uuid")?,
        order: row.get("sort_order")?,
        completed,
    })
}

fn parse_tags(value: &str, column: &'static str) -> StoreResult<Vec<String>> {
    serde_json::from_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid tag list `{value}` in {column}")))
}

fn parse_uuid(value: &str, column: &'static str) -> StoreResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
