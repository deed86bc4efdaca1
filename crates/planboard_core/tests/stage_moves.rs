use planboard_core::{
    LayerKey, NewProject, PlannerService, ProjectService, ServiceError, SqlitePlannerStore,
    StageMove, TaskService,
};
use uuid::Uuid;

fn setup() -> SqlitePlannerStore {
    SqlitePlannerStore::open_in_memory().unwrap()
}

fn new_project(name: &str, key: LayerKey) -> NewProject {
    NewProject {
        name: name.to_string(),
        description: String::new(),
        key,
        tags: Vec::new(),
        due_date: None,
    }
}

#[test]
fn move_last_stage_to_front_renumbers_all_stages() {
    let store = setup();
    let service = PlannerService::new(&store);
    service.ensure_initialized().unwrap();

    let s2 = service.create_stage("Stage Two", &["To Do"]).unwrap();
    let s3 = service.create_stage("Stage Three", &["To Do"]).unwrap();

    let planner = service.ensure_initialized().unwrap();
    let s1 = planner.stages[0].clone();
    assert_eq!(
        planner.stages.iter().map(|s| s.order).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );

    let reordered = service
        .move_stage(&StageMove {
            stage_id: s3.id,
            source_index: 2,
            dest_index: 0,
        })
        .unwrap();
    let ids: Vec<_> = reordered.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![s3.id, s1.id, s2.id]);
    assert_eq!(
        reordered.iter().map(|s| s.order).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );

    // Each stage's order was persisted individually; a fresh load agrees.
    let reloaded = service.ensure_initialized().unwrap();
    let reloaded_ids: Vec<_> = reloaded.stages.iter().map(|s| s.id).collect();
    assert_eq!(reloaded_ids, vec![s3.id, s1.id, s2.id]);
    assert_eq!(
        reloaded.stages.iter().map(|s| s.order).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn move_stage_round_trip_restores_original_layout() {
    let store = setup();
    let service = PlannerService::new(&store);
    service.ensure_initialized().unwrap();
    service.create_stage("Stage Two", &["To Do"]).unwrap();
    let s3 = service.create_stage("Stage Three", &["To Do"]).unwrap();

    let before: Vec<_> = service
        .ensure_initialized()
        .unwrap()
        .stages
        .iter()
        .map(|s| s.id)
        .collect();

    service
        .move_stage(&StageMove {
            stage_id: s3.id,
            source_index: 2,
            dest_index: 0,
        })
        .unwrap();
    service
        .move_stage(&StageMove {
            stage_id: s3.id,
            source_index: 0,
            dest_index: 2,
        })
        .unwrap();

    let after: Vec<_> = service
        .ensure_initialized()
        .unwrap()
        .stages
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(after, before);
}

#[test]
fn move_stage_noop_keeps_sequence() {
    let store = setup();
    let service = PlannerService::new(&store);
    service.ensure_initialized().unwrap();
    let s2 = service.create_stage("Stage Two", &["To Do"]).unwrap();

    let reordered = service
        .move_stage(&StageMove {
            stage_id: s2.id,
            source_index: 1,
            dest_index: 1,
        })
        .unwrap();
    assert_eq!(reordered[1].id, s2.id);
    assert_eq!(
        reordered.iter().map(|s| s.order).collect::<Vec<_>>(),
        vec![0, 1]
    );
}

#[test]
fn move_stage_with_stale_payload_is_rejected() {
    let store = setup();
    let service = PlannerService::new(&store);
    service.ensure_initialized().unwrap();
    let s2 = service.create_stage("Stage Two", &["To Do"]).unwrap();

    // Claimed source index does not hold the moved stage.
    let err = service
        .move_stage(&StageMove {
            stage_id: s2.id,
            source_index: 0,
            dest_index: 1,
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "stage", id } if id == s2.id));

    let err = service
        .move_stage(&StageMove {
            stage_id: Uuid::new_v4(),
            source_index: 0,
            dest_index: 1,
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "stage", .. }));
}

#[test]
fn delete_stage_cascades_projects_boards_and_tasks() {
    let store = setup();
    let planner_service = PlannerService::new(&store);
    let project_service = ProjectService::new(&store);
    let task_service = TaskService::new(&store);

    let planner = planner_service.ensure_initialized().unwrap();
    let stage = planner.stages[0].clone();
    let doomed = planner_service
        .create_stage("Doomed", &["To Do", "Done"])
        .unwrap();

    let keep_key = LayerKey::new(stage.id, stage.layers[0].id);
    let doomed_key = LayerKey::new(doomed.id, doomed.layers[0].id);

    let kept = project_service
        .create_project(new_project("Keeper", keep_key))
        .unwrap();
    let lost = project_service
        .create_project(new_project("Lost", doomed_key))
        .unwrap();

    let column = task_service.create_column(lost.id, "Checklist").unwrap();
    task_service
        .create_task(lost.id, column.id, "write outline")
        .unwrap();

    planner_service.delete_stage(doomed.id).unwrap();

    assert!(project_service
        .list_projects_for_layer(doomed_key)
        .unwrap()
        .is_empty());
    let survivors = project_service.list_projects_for_layer(keep_key).unwrap();
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].id, kept.id);

    // The cascade removed the board; fetching now lazily creates a fresh
    // empty one.
    let snapshot = task_service.fetch_board(lost.id).unwrap();
    assert!(snapshot.board.columns.is_empty());
    assert!(snapshot.tasks.is_empty());
}

#[test]
fn delete_stage_keeps_survivor_orders_with_gap() {
    let store = setup();
    let service = PlannerService::new(&store);
    service.ensure_initialized().unwrap();
    let s2 = service.create_stage("Stage Two", &["To Do"]).unwrap();
    let s3 = service.create_stage("Stage Three", &["To Do"]).unwrap();

    service.delete_stage(s2.id).unwrap();

    // Survivors are not renumbered: the gap at order 1 remains, only
    // relative order matters.
    let planner = service.ensure_initialized().unwrap();
    assert_eq!(planner.stages.len(), 2);
    assert_eq!(planner.stages[0].order, 0);
    assert_eq!(planner.stages[1].id, s3.id);
    assert_eq!(planner.stages[1].order, 2);
}

#[test]
fn delete_missing_stage_reports_not_found() {
    let store = setup();
    let service = PlannerService::new(&store);
    service.ensure_initialized().unwrap();

    let err = service.delete_stage(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "stage", .. }));
}
