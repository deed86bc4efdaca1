use planboard_core::{
    ColumnMove, LayerKey, NewProject, PlannerService, ProjectService, ServiceError,
    SqlitePlannerStore, TaskMove, TaskService, TaskUpdate,
};
use uuid::Uuid;

fn setup() -> SqlitePlannerStore {
    SqlitePlannerStore::open_in_memory().unwrap()
}

/// Creates one project on the default board and returns its id.
fn seed_project(store: &SqlitePlannerStore) -> Uuid {
    let planner = PlannerService::new(store).ensure_initialized().unwrap();
    let stage = &planner.stages[0];
    let key = LayerKey::new(stage.id, stage.layers[0].id);
    ProjectService::new(store)
        .create_project(NewProject {
            name: "Card".to_string(),
            description: String::new(),
            key,
            tags: Vec::new(),
            due_date: None,
        })
        .unwrap()
        .id
}

#[test]
fn fetch_board_lazily_creates_an_empty_board() {
    let store = setup();
    let project_id = seed_project(&store);
    let service = TaskService::new(&store);

    let snapshot = service.fetch_board(project_id).unwrap();
    assert_eq!(snapshot.board.project_id, project_id);
    assert!(snapshot.board.columns.is_empty());
    assert!(snapshot.tasks.is_empty());

    // A second fetch returns the same board instead of creating another.
    let again = service.fetch_board(project_id).unwrap();
    assert_eq!(again.board.id, snapshot.board.id);
}

#[test]
fn create_column_lazily_creates_the_board() {
    let store = setup();
    let project_id = seed_project(&store);
    let service = TaskService::new(&store);

    let first = service.create_column(project_id, "Backlog").unwrap();
    let second = service.create_column(project_id, "Doing").unwrap();
    assert_eq!(first.order, 0);
    assert_eq!(second.order, 1);

    let snapshot = service.fetch_board(project_id).unwrap();
    assert_eq!(snapshot.board.columns.len(), 2);
    assert_eq!(snapshot.board.columns[0].id, first.id);
    assert_eq!(snapshot.board.columns[1].id, second.id);
}

#[test]
fn create_column_rejects_blank_name() {
    let store = setup();
    let project_id = seed_project(&store);
    let service = TaskService::new(&store);

    let err = service.create_column(project_id, "  ").unwrap_err();
    assert!(matches!(err, ServiceError::EmptyField("column name")));
}

#[test]
fn create_task_requires_existing_board_and_column() {
    let store = setup();
    let project_id = seed_project(&store);
    let service = TaskService::new(&store);

    // No board yet: task creation does not lazily create one.
    let err = service
        .create_task(project_id, Uuid::new_v4(), "write outline")
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            entity: "task board",
            ..
        }
    ));

    let column = service.create_column(project_id, "Backlog").unwrap();
    let err = service
        .create_task(project_id, Uuid::new_v4(), "write outline")
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            entity: "task column",
            ..
        }
    ));

    let task = service
        .create_task(project_id, column.id, "write outline")
        .unwrap();
    assert_eq!(task.order, 0);
    assert!(!task.completed);

    let second = service
        .create_task(project_id, column.id, "record voiceover")
        .unwrap();
    assert_eq!(second.order, 1);
}

#[test]
fn move_task_to_front_within_column() {
    let store = setup();
    let project_id = seed_project(&store);
    let service = TaskService::new(&store);

    let backlog = service.create_column(project_id, "Backlog").unwrap();
    let t1 = service.create_task(project_id, backlog.id, "t1").unwrap();
    let t2 = service.create_task(project_id, backlog.id, "t2").unwrap();
    let t3 = service.create_task(project_id, backlog.id, "t3").unwrap();

    service
        .move_task(&TaskMove {
            task_id: t3.id,
            source_column: backlog.id,
            dest_column: backlog.id,
            source_index: 2,
            dest_index: 0,
        })
        .unwrap();

    let snapshot = service.fetch_board(project_id).unwrap();
    assert_eq!(
        snapshot.tasks.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![t3.id, t1.id, t2.id]
    );
    assert_eq!(
        snapshot.tasks.iter().map(|t| t.order).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn move_task_across_columns_rekeys_and_renumbers() {
    let store = setup();
    let project_id = seed_project(&store);
    let service = TaskService::new(&store);

    let backlog = service.create_column(project_id, "Backlog").unwrap();
    let doing = service.create_column(project_id, "Doing").unwrap();
    let t1 = service.create_task(project_id, backlog.id, "t1").unwrap();
    let t2 = service.create_task(project_id, backlog.id, "t2").unwrap();
    let t3 = service.create_task(project_id, doing.id, "t3").unwrap();

    service
        .move_task(&TaskMove {
            task_id: t1.id,
            source_column: backlog.id,
            dest_column: doing.id,
            source_index: 0,
            dest_index: 1,
        })
        .unwrap();

    let snapshot = service.fetch_board(project_id).unwrap();
    let backlog_tasks: Vec<_> = snapshot
        .tasks
        .iter()
        .filter(|t| t.column_id == backlog.id)
        .collect();
    let doing_tasks: Vec<_> = snapshot
        .tasks
        .iter()
        .filter(|t| t.column_id == doing.id)
        .collect();

    assert_eq!(backlog_tasks.iter().map(|t| t.id).collect::<Vec<_>>(), [t2.id]);
    assert_eq!(backlog_tasks[0].order, 0);
    assert_eq!(
        doing_tasks.iter().map(|t| t.id).collect::<Vec<_>>(),
        [t3.id, t1.id]
    );
    assert_eq!(
        doing_tasks.iter().map(|t| t.order).collect::<Vec<_>>(),
        [0, 1]
    );
}

#[test]
fn stale_task_drag_payload_is_rejected() {
    let store = setup();
    let project_id = seed_project(&store);
    let service = TaskService::new(&store);

    let backlog = service.create_column(project_id, "Backlog").unwrap();
    let t1 = service.create_task(project_id, backlog.id, "t1").unwrap();
    service.create_task(project_id, backlog.id, "t2").unwrap();

    let err = service
        .move_task(&TaskMove {
            task_id: t1.id,
            source_column: backlog.id,
            dest_column: backlog.id,
            source_index: 1,
            dest_index: 0,
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "task", id } if id == t1.id));
}

#[test]
fn move_column_reorders_within_board() {
    let store = setup();
    let project_id = seed_project(&store);
    let service = TaskService::new(&store);

    let c1 = service.create_column(project_id, "One").unwrap();
    let c2 = service.create_column(project_id, "Two").unwrap();
    let c3 = service.create_column(project_id, "Three").unwrap();

    let reordered = service
        .move_column(&ColumnMove {
            project_id,
            column_id: c3.id,
            source_index: 2,
            dest_index: 0,
        })
        .unwrap();
    assert_eq!(
        reordered.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![c3.id, c1.id, c2.id]
    );
    assert_eq!(
        reordered.iter().map(|c| c.order).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );

    let snapshot = service.fetch_board(project_id).unwrap();
    assert_eq!(
        snapshot.board.columns.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![c3.id, c1.id, c2.id]
    );
}

#[test]
fn update_task_toggles_completion_and_validates_text() {
    let store = setup();
    let project_id = seed_project(&store);
    let service = TaskService::new(&store);

    let backlog = service.create_column(project_id, "Backlog").unwrap();
    let task = service.create_task(project_id, backlog.id, "draft").unwrap();

    let updated = service
        .update_task(
            task.id,
            &TaskUpdate {
                text: Some("final draft".to_string()),
                completed: Some(true),
            },
        )
        .unwrap();
    assert_eq!(updated.text, "final draft");
    assert!(updated.completed);

    let err = service
        .update_task(
            task.id,
            &TaskUpdate {
                text: Some(" ".to_string()),
                completed: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::EmptyField("task text")));
}

#[test]
fn delete_column_cascades_tasks_and_keeps_survivor_orders() {
    let store = setup();
    let project_id = seed_project(&store);
    let service = TaskService::new(&store);

    let c1 = service.create_column(project_id, "One").unwrap();
    let c2 = service.create_column(project_id, "Two").unwrap();
    let c3 = service.create_column(project_id, "Three").unwrap();
    service.create_task(project_id, c2.id, "doomed").unwrap();
    let kept = service.create_task(project_id, c3.id, "kept").unwrap();

    service.delete_column(project_id, c2.id).unwrap();

    let snapshot = service.fetch_board(project_id).unwrap();
    assert_eq!(
        snapshot.board.columns.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![c1.id, c3.id]
    );
    // Survivor columns keep their order values; the gap stays.
    assert_eq!(
        snapshot
            .board
            .columns
            .iter()
            .map(|c| c.order)
            .collect::<Vec<_>>(),
        vec![0, 2]
    );
    assert_eq!(snapshot.tasks.len(), 1);
    assert_eq!(snapshot.tasks[0].id, kept.id);
}

#[test]
fn delete_task_reports_missing_id() {
    let store = setup();
    seed_project(&store);
    let service = TaskService::new(&store);

    let err = service.delete_task(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "task", .. }));
}
