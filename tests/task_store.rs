use chrono::{Duration, NaiveDate};
use tasknest::{Database, DatabaseError, Priority, Task};

fn task(title: &str) -> Task {
    Task::new(title.to_string(), Priority::Medium)
}

#[test]
fn create_and_read_roundtrip() {
    let db = Database::open_in_memory().unwrap();

    let mut original = Task::new("File taxes".to_string(), Priority::Urgent);
    original.description = "before the deadline".to_string();
    original.due_date = NaiveDate::from_ymd_opt(2025, 4, 15);
    original.category_id = Some("personal".to_string());

    let created = db.create_task(&original).unwrap();
    assert_eq!(created, original);

    let loaded = db.get_task(&original.id).unwrap();
    assert_eq!(loaded, original);
}

#[test]
fn create_with_existing_id_is_duplicate() {
    let db = Database::open_in_memory().unwrap();
    let original = task("Water plants");
    db.create_task(&original).unwrap();

    let mut clash = task("Something else");
    clash.id = original.id.clone();
    match db.create_task(&clash) {
        Err(DatabaseError::DuplicateId(id)) => assert_eq!(id, original.id),
        other => panic!("expected DuplicateId, got {other:?}"),
    }
    assert_eq!(db.get_task(&original.id).unwrap().title, "Water plants");
}

#[test]
fn read_missing_task_is_not_found() {
    let db = Database::open_in_memory().unwrap();
    assert!(matches!(db.get_task("nope"), Err(DatabaseError::NotFound(_))));
    assert!(db.find_task("nope").unwrap().is_none());
}

#[test]
fn read_all_orders_by_created_at_descending() {
    let db = Database::open_in_memory().unwrap();
    let mut oldest = task("oldest");
    let mut middle = task("middle");
    let newest = task("newest");
    oldest.created_at = newest.created_at - Duration::hours(2);
    middle.created_at = newest.created_at - Duration::hours(1);

    db.create_task(&middle).unwrap();
    db.create_task(&newest).unwrap();
    db.create_task(&oldest).unwrap();

    let titles: Vec<String> = db.get_all_tasks().unwrap().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["newest", "middle", "oldest"]);
}

#[test]
fn update_replaces_fields_but_not_created_at() {
    let db = Database::open_in_memory().unwrap();
    let original = task("Draft");
    db.create_task(&original).unwrap();

    let mut edited = original.clone();
    edited.title = "Final".to_string();
    edited.completed = true;
    edited.priority = Priority::Low;
    edited.due_date = NaiveDate::from_ymd_opt(2030, 1, 1);
    edited.created_at = original.created_at - Duration::days(30);

    assert_eq!(db.update_task(&edited).unwrap(), 1);

    let loaded = db.get_task(&original.id).unwrap();
    assert_eq!(loaded.title, "Final");
    assert!(loaded.completed);
    assert_eq!(loaded.priority, Priority::Low);
    assert_eq!(loaded.due_date, NaiveDate::from_ymd_opt(2030, 1, 1));
    assert_eq!(loaded.created_at, original.created_at);
}

#[test]
fn update_and_delete_of_missing_task_report_zero() {
    let db = Database::open_in_memory().unwrap();
    let ghost = task("ghost");

    assert_eq!(db.update_task(&ghost).unwrap(), 0);
    assert_eq!(db.delete_task(&ghost.id).unwrap(), 0);
    assert!(db.get_all_tasks().unwrap().is_empty());
}

#[test]
fn delete_removes_task() {
    let db = Database::open_in_memory().unwrap();
    let keep = task("keep");
    let gone = task("gone");
    db.create_task(&keep).unwrap();
    db.create_task(&gone).unwrap();

    assert_eq!(db.delete_task(&gone.id).unwrap(), 1);
    assert!(db.find_task(&gone.id).unwrap().is_none());
    assert_eq!(db.get_all_tasks().unwrap().len(), 1);
}

#[test]
fn dangling_category_reference_is_stored() {
    let db = Database::open_in_memory().unwrap();
    let mut orphan = task("orphan");
    orphan.category_id = Some("no-such-category".to_string());
    db.create_task(&orphan).unwrap();

    let loaded = db.get_task(&orphan.id).unwrap();
    assert_eq!(loaded.category_id.as_deref(), Some("no-such-category"));
}

#[test]
fn legacy_rows_are_read_defensively() {
    let db = Database::open_in_memory().unwrap();
    db.conn()
        .execute(
            "INSERT INTO tasks (id, title, description, completed, priority, createdAt, dueDate)
             VALUES ('legacy', 'Old row', NULL, 0, 'critical', '2023-11-02T08:30:00.000', '2023-12-01T00:00:00.000')",
            [],
        )
        .unwrap();

    let loaded = db.get_task("legacy").unwrap();
    assert_eq!(loaded.priority, Priority::Medium);
    assert_eq!(loaded.description, "");
    assert_eq!(loaded.due_date, NaiveDate::from_ymd_opt(2023, 12, 1));
    assert_eq!(
        tasknest::models::format_timestamp(&loaded.created_at),
        "2023-11-02T08:30:00.000Z"
    );
}

#[test]
fn writes_are_durable_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("tasks.db");

    let saved = task("persist me");
    {
        let db = Database::open(&path).unwrap();
        db.create_task(&saved).unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(db.get_task(&saved.id).unwrap(), saved);
}

#[test]
fn open_under_a_regular_file_is_storage_unavailable() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let path = file.path().join("tasks.db");

    assert!(matches!(
        Database::open(&path),
        Err(DatabaseError::StorageUnavailable(_))
    ));
}

#[test]
fn open_on_a_directory_is_storage_unavailable() {
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(
        Database::open(dir.path()),
        Err(DatabaseError::StorageUnavailable(_))
    ));
}

#[test]
fn read_all_orders_mixed_timestamp_formats_by_time() {
    let db = Database::open_in_memory().unwrap();
    db.conn()
        .execute_batch(
            "INSERT INTO tasks (id, title, completed, priority, createdAt)
             VALUES ('new', 'rfc3339 row', 0, 'low', '2024-01-01T13:00:00.000Z'),
                    ('spaced', 'space separated row', 0, 'low', '2024-01-01 14:00:00'),
                    ('naive', 'naive iso row', 0, 'low', '2024-01-01T12:30:00');",
        )
        .unwrap();

    let ids: Vec<String> = db.get_all_tasks().unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["spaced", "new", "naive"]);
}
