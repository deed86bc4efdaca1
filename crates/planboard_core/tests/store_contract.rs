//! Behavioral contract shared by both persistence backends.
//!
//! Every scenario runs once against the SQLite store and once against the
//! JSON blob store; the facades above must not be able to tell them apart.

use planboard_core::{
    open_store, JsonPlannerStore, LayerKey, NewProject, PlannerService, PlannerStore, ProjectMove,
    ProjectPatch, ProjectService, SqlitePlannerStore, StoreConfig, TaskPatch, TaskService,
};
use tempfile::TempDir;
use uuid::Uuid;

fn new_project(name: &str, key: LayerKey) -> NewProject {
    NewProject {
        name: name.to_string(),
        description: String::new(),
        key,
        tags: vec!["tag".to_string()],
        due_date: None,
    }
}

fn bootstrap_and_move_project<S: PlannerStore>(store: &S) {
    let planner_service = PlannerService::new(store);
    let project_service = ProjectService::new(store);

    let planner = planner_service.ensure_initialized().unwrap();
    let stage = &planner.stages[0];
    let todo = LayerKey::new(stage.id, stage.layers[0].id);
    let done = LayerKey::new(stage.id, stage.layers[2].id);

    let p1 = project_service
        .create_project(new_project("P1", todo))
        .unwrap();
    let p2 = project_service
        .create_project(new_project("P2", todo))
        .unwrap();

    project_service
        .move_project(&ProjectMove {
            project_id: p1.id,
            source: todo,
            dest: done,
            source_index: 0,
            dest_index: 0,
        })
        .unwrap();

    let todo_cards = project_service.list_projects_for_layer(todo).unwrap();
    assert_eq!(
        todo_cards.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![p2.id]
    );
    assert_eq!(todo_cards[0].order, 0);

    let done_cards = project_service.list_projects_for_layer(done).unwrap();
    assert_eq!(
        done_cards.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![p1.id]
    );
    assert_eq!(done_cards[0].order, 0);
    assert_eq!(done_cards[0].layer_id, done.layer_id);
}

fn cascade_on_project_delete<S: PlannerStore>(store: &S) {
    let planner_service = PlannerService::new(store);
    let project_service = ProjectService::new(store);
    let task_service = TaskService::new(store);

    let planner = planner_service.ensure_initialized().unwrap();
    let stage = &planner.stages[0];
    let key = LayerKey::new(stage.id, stage.layers[0].id);

    let project = project_service
        .create_project(new_project("Card", key))
        .unwrap();
    let column = task_service.create_column(project.id, "Checklist").unwrap();
    let task = task_service
        .create_task(project.id, column.id, "step one")
        .unwrap();

    project_service.delete_project(project.id).unwrap();

    // Board and tasks died with the project on both backends.
    assert!(store.get_project(project.id).unwrap().is_none());
    assert!(store.get_board_for_project(project.id).unwrap().is_none());
    assert!(store.get_task(task.id).unwrap().is_none());
}

fn update_missing_returns_none<S: PlannerStore>(store: &S) {
    let missing = Uuid::new_v4();

    assert!(store
        .update_project(missing, &ProjectPatch::default())
        .unwrap()
        .is_none());
    assert!(store.update_task(missing, &TaskPatch::default()).unwrap().is_none());
    assert!(!store.delete_project(missing).unwrap());
    assert!(!store.delete_task(missing).unwrap());
}

#[test]
fn sqlite_bootstrap_and_move_project() {
    let store = SqlitePlannerStore::open_in_memory().unwrap();
    bootstrap_and_move_project(&store);
}

#[test]
fn json_bootstrap_and_move_project() {
    let dir = TempDir::new().unwrap();
    let store = JsonPlannerStore::open(dir.path()).unwrap();
    bootstrap_and_move_project(&store);
}

#[test]
fn sqlite_cascade_on_project_delete() {
    let store = SqlitePlannerStore::open_in_memory().unwrap();
    cascade_on_project_delete(&store);
}

#[test]
fn json_cascade_on_project_delete() {
    let dir = TempDir::new().unwrap();
    let store = JsonPlannerStore::open(dir.path()).unwrap();
    cascade_on_project_delete(&store);
}

#[test]
fn sqlite_update_missing_returns_none() {
    let store = SqlitePlannerStore::open_in_memory().unwrap();
    update_missing_returns_none(&store);
}

#[test]
fn json_update_missing_returns_none() {
    let dir = TempDir::new().unwrap();
    let store = JsonPlannerStore::open(dir.path()).unwrap();
    update_missing_returns_none(&store);
}

#[test]
fn json_store_writes_one_blob_per_collection() {
    let dir = TempDir::new().unwrap();
    let store = JsonPlannerStore::open(dir.path()).unwrap();

    let planner_service = PlannerService::new(&store);
    let project_service = ProjectService::new(&store);
    let task_service = TaskService::new(&store);

    let planner = planner_service.ensure_initialized().unwrap();
    let stage = &planner.stages[0];
    let key = LayerKey::new(stage.id, stage.layers[0].id);
    let project = project_service
        .create_project(new_project("Card", key))
        .unwrap();
    task_service.create_column(project.id, "Checklist").unwrap();
    project_service.save_as_template(project.id).unwrap();

    for blob in [
        "content_planner.json",
        "projects.json",
        "task_boards.json",
        "templates.json",
    ] {
        assert!(dir.path().join(blob).exists(), "blob `{blob}` should exist");
    }
}

#[test]
fn json_store_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let stage_id;
    {
        let store = JsonPlannerStore::open(dir.path()).unwrap();
        let planner = PlannerService::new(&store).ensure_initialized().unwrap();
        stage_id = planner.stages[0].id;
    }

    let store = JsonPlannerStore::open(dir.path()).unwrap();
    let planner = PlannerService::new(&store).ensure_initialized().unwrap();
    assert_eq!(planner.stages[0].id, stage_id);
}

#[test]
fn open_store_selects_backend_from_config() {
    let dir = TempDir::new().unwrap();

    let sqlite = open_store(&StoreConfig::Sqlite {
        db_path: dir.path().join("board.db"),
    })
    .unwrap();
    PlannerService::new(&*sqlite).ensure_initialized().unwrap();
    assert!(dir.path().join("board.db").exists());

    let json = open_store(&StoreConfig::LocalJson {
        dir: dir.path().join("blobs"),
    })
    .unwrap();
    PlannerService::new(&*json).ensure_initialized().unwrap();
    assert!(dir.path().join("blobs").join("content_planner.json").exists());
}
