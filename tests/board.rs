use chrono::{Duration, NaiveDate};
use tasknest::{Database, NewTask, Priority, SortBy, StatusFilter, TaskBoard, TaskQuery};

fn board() -> TaskBoard {
    TaskBoard::new(Database::open_in_memory().unwrap()).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
}

fn titles(board: &TaskBoard) -> Vec<String> {
    board
        .view_at(today())
        .tasks
        .into_iter()
        .map(|t| t.title)
        .collect()
}

#[test]
fn new_board_loads_seeded_categories() {
    let board = board();
    assert_eq!(board.categories().len(), 5);
    assert!(board.tasks().is_empty());
    assert_eq!(board.query(), &TaskQuery::default());
}

#[test]
fn add_task_persists_and_reloads() {
    let mut board = board();
    let mut new_task = NewTask::new("Book flights", Priority::High);
    new_task.description = "window seat".to_string();
    new_task.category_id = Some("personal".to_string());

    let task = board.add_task(new_task).unwrap();

    assert_eq!(board.tasks().len(), 1);
    assert_eq!(board.tasks()[0], task);
    assert_eq!(board.database().get_task(&task.id).unwrap(), task);
    assert!(!task.completed);
    assert_eq!(board.category_of(&task).map(|c| c.name.as_str()), Some("Personal"));
}

#[test]
fn toggle_flips_completion_and_reports_missing() {
    let mut board = board();
    let task = board.add_task(NewTask::new("Stretch", Priority::Low)).unwrap();

    assert_eq!(board.toggle_task(&task.id).unwrap(), Some(true));
    assert!(board.tasks()[0].completed);
    assert_eq!(board.toggle_task(&task.id).unwrap(), Some(false));
    assert!(!board.database().get_task(&task.id).unwrap().completed);

    assert_eq!(board.toggle_task("missing").unwrap(), None);
}

#[test]
fn delete_task_removes_it_from_view() {
    let mut board = board();
    let keep = board.add_task(NewTask::new("keep", Priority::Medium)).unwrap();
    let gone = board.add_task(NewTask::new("gone", Priority::Medium)).unwrap();

    assert!(board.delete_task(&gone.id).unwrap());
    assert!(!board.delete_task(&gone.id).unwrap());
    assert_eq!(titles(&board), vec![keep.title]);
}

#[test]
fn update_task_keeps_identity_and_creation_time() {
    let mut board = board();
    let task = board.add_task(NewTask::new("draft", Priority::Medium)).unwrap();

    let mut edited = task.clone();
    edited.title = "final".to_string();
    edited.created_at = task.created_at + Duration::days(3);
    edited.due_date = Some(today());
    assert!(board.update_task(&edited).unwrap());

    let stored = board.database().get_task(&task.id).unwrap();
    assert_eq!(stored.title, "final");
    assert_eq!(stored.due_date, Some(today()));
    assert_eq!(stored.created_at, task.created_at);

    let mut stranger = edited.clone();
    stranger.id = "not-stored".to_string();
    assert!(!board.update_task(&stranger).unwrap());
}

#[test]
fn view_applies_filters_but_stats_cover_everything() {
    let mut board = board();
    let mut late = NewTask::new("Pay invoice", Priority::Urgent);
    late.due_date = Some(today() - Duration::days(2));
    late.category_id = Some("work".to_string());
    board.add_task(late).unwrap();

    let mut shop = NewTask::new("Buy groceries", Priority::Low);
    shop.category_id = Some("shopping".to_string());
    let shop = board.add_task(shop).unwrap();
    board.toggle_task(&shop.id).unwrap();

    let mut errands = NewTask::new("Errands", Priority::Medium);
    errands.description = "pick up GROCeries".to_string();
    board.add_task(errands).unwrap();

    board.set_filter(StatusFilter::Pending);
    board.set_search("groc");
    let view = board.view_at(today());

    assert_eq!(view.tasks.len(), 1);
    assert_eq!(view.tasks[0].title, "Errands");
    assert_eq!(view.stats.total, 3);
    assert_eq!(view.stats.completed, 1);
    assert_eq!(view.stats.pending, 2);
    assert_eq!(view.overdue_count, 1);

    board.set_filter(StatusFilter::All);
    board.set_search("");
    board.set_category_filter(Some("work".to_string()));
    let view = board.view_at(today());
    assert_eq!(view.tasks.len(), 1);
    assert!(view.is_overdue(&view.tasks[0]));
}

#[test]
fn sort_mode_changes_view_order() {
    let mut board = board();
    board.add_task(NewTask::new("b task", Priority::Low)).unwrap();
    board.add_task(NewTask::new("A task", Priority::Urgent)).unwrap();
    board.add_task(NewTask::new("c task", Priority::High)).unwrap();

    board.set_sort(SortBy::Title);
    assert_eq!(titles(&board), vec!["A task", "b task", "c task"]);

    board.set_sort(SortBy::Priority);
    assert_eq!(titles(&board), vec!["A task", "c task", "b task"]);
}

#[test]
fn deleting_category_leaves_tasks_with_unresolved_reference() {
    let mut board = board();
    let hobby = board.add_category("Hobby", 0xFF00BCD4, 0xE40A).unwrap();
    assert_eq!(board.categories().len(), 6);

    let mut paint = NewTask::new("Paint", Priority::Medium);
    paint.category_id = Some(hobby.id.clone());
    let paint = board.add_task(paint).unwrap();
    board.set_category_filter(Some(hobby.id.clone()));

    assert!(board.delete_category(&hobby.id).unwrap());
    assert_eq!(board.categories().len(), 5);
    assert_eq!(board.query().category_id, None);

    let stored = board.database().get_task(&paint.id).unwrap();
    assert_eq!(stored.category_id.as_deref(), Some(hobby.id.as_str()));
    assert!(board.category_of(&stored).is_none());
}

#[test]
fn rename_category_updates_loaded_list() {
    let mut board = board();
    let mut work = board.database().get_category("work").unwrap();
    work.name = "Office".to_string();
    assert!(board.update_category(&work).unwrap());
    assert!(board.categories().iter().any(|c| c.name == "Office"));
}

#[test]
fn with_query_sets_initial_selection() {
    let board = board().with_query(TaskQuery {
        status: StatusFilter::Completed,
        sort_by: SortBy::Priority,
        ..TaskQuery::default()
    });
    assert_eq!(board.query().status, StatusFilter::Completed);
    assert_eq!(board.query().sort_by, SortBy::Priority);
}

#[test]
fn view_resolves_categories_from_its_snapshot() {
    let mut board = board();
    let mut report = NewTask::new("Quarterly report", Priority::High);
    report.category_id = Some("work".to_string());
    board.add_task(report).unwrap();

    let mut orphan = NewTask::new("Orphan", Priority::Low);
    orphan.category_id = Some("missing".to_string());
    board.add_task(orphan).unwrap();

    let view = board.view_at(today());
    assert_eq!(view.categories.len(), 5);
    let names: Vec<Option<&str>> = view
        .tasks
        .iter()
        .map(|t| view.category_of(t).map(|c| c.name.as_str()))
        .collect();
    assert!(names.contains(&Some("Work")));
    assert!(names.contains(&None));

    board.delete_category("work").unwrap();
    assert!(view.tasks.iter().any(|t| view.category_of(t).is_some()));
    let fresh = board.view_at(today());
    assert!(fresh.tasks.iter().all(|t| fresh.category_of(t).is_none()));
}
