use chrono::{Local, NaiveDate};
use log::info;
use serde::Serialize;

use crate::database::{Database, DatabaseError};
use crate::models::{self, Category, Priority, Task};
use crate::query::{self, SortBy, StatusFilter, TaskQuery, TaskStats};

/// Fields collected by a "new task" form. Only the title is required.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub category_id: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: title.into(),
            priority,
            ..Self::default()
        }
    }
}

/// Everything a list screen needs to render one frame.
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub tasks: Vec<Task>,
    pub stats: TaskStats,
    pub overdue_count: usize,
    pub categories: Vec<Category>,
    #[serde(skip)]
    pub today: NaiveDate,
}

impl TaskView {
    pub fn is_overdue(&self, task: &Task) -> bool {
        task.is_overdue(self.today)
    }

    /// Resolve against the categories loaded when the view was taken.
    pub fn category_of(&self, task: &Task) -> Option<&Category> {
        models::find_category(&self.categories, task.category_id.as_deref())
    }
}

/// State behind the task list: the store, the last loaded snapshots and the
/// active filter/sort selection.
pub struct TaskBoard {
    database: Database,
    tasks: Vec<Task>,
    categories: Vec<Category>,
    query: TaskQuery,
}

impl TaskBoard {
    pub fn new(database: Database) -> Result<Self, DatabaseError> {
        let mut board = Self {
            database,
            tasks: Vec::new(),
            categories: Vec::new(),
            query: TaskQuery::default(),
        };
        board.load_categories()?;
        board.load_tasks()?;
        Ok(board)
    }

    pub fn with_query(mut self, query: TaskQuery) -> Self {
        self.query = query;
        self
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn query(&self) -> &TaskQuery {
        &self.query
    }

    pub fn load_tasks(&mut self) -> Result<&[Task], DatabaseError> {
        self.tasks = self.database.get_all_tasks()?;
        Ok(&self.tasks)
    }

    pub fn load_categories(&mut self) -> Result<&[Category], DatabaseError> {
        self.categories = self.database.get_all_categories()?;
        Ok(&self.categories)
    }

    /// Resolve a task's category; dangling or missing ids give `None`.
    pub fn category_of(&self, task: &Task) -> Option<&Category> {
        models::find_category(&self.categories, task.category_id.as_deref())
    }

    pub fn add_task(&mut self, new_task: NewTask) -> Result<Task, DatabaseError> {
        let mut task = Task::new(new_task.title, new_task.priority);
        task.description = new_task.description;
        task.due_date = new_task.due_date;
        task.category_id = new_task.category_id;

        let created = self.database.create_task(&task)?;
        info!("event=task_add module=board status=ok id={}", created.id);
        self.load_tasks()?;
        Ok(created)
    }

    /// Full edit. Identity and creation time always come from the stored record.
    /// Returns false when the task no longer exists.
    pub fn update_task(&mut self, task: &Task) -> Result<bool, DatabaseError> {
        let Some(stored) = self.database.find_task(&task.id)? else {
            return Ok(false);
        };
        let edited = Task {
            created_at: stored.created_at,
            ..task.clone()
        };
        let changed = self.database.update_task(&edited)?;
        self.load_tasks()?;
        Ok(changed > 0)
    }

    /// Flip `completed` on the stored record. Returns the new state, or `None`
    /// when the task no longer exists.
    pub fn toggle_task(&mut self, id: &str) -> Result<Option<bool>, DatabaseError> {
        let Some(mut task) = self.database.find_task(id)? else {
            return Ok(None);
        };
        task.completed = !task.completed;
        self.database.update_task(&task)?;
        self.load_tasks()?;
        Ok(Some(task.completed))
    }

    /// Remove a task. Callers own the confirmation step.
    pub fn delete_task(&mut self, id: &str) -> Result<bool, DatabaseError> {
        let removed = self.database.delete_task(id)?;
        if removed > 0 {
            info!("event=task_delete module=board status=ok id={}", id);
        }
        self.load_tasks()?;
        Ok(removed > 0)
    }

    pub fn add_category(&mut self, name: impl Into<String>, color: u32, icon: u32) -> Result<Category, DatabaseError> {
        let created = self.database.create_category(&Category::new(name.into(), color, icon))?;
        self.load_categories()?;
        Ok(created)
    }

    pub fn update_category(&mut self, category: &Category) -> Result<bool, DatabaseError> {
        let changed = self.database.update_category(category)?;
        self.load_categories()?;
        Ok(changed > 0)
    }

    /// Remove a category. Tasks that referenced it keep the id and resolve to no category.
    pub fn delete_category(&mut self, id: &str) -> Result<bool, DatabaseError> {
        let removed = self.database.delete_category(id)?;
        if self.query.category_id.as_deref() == Some(id) {
            self.query.category_id = None;
        }
        self.load_categories()?;
        Ok(removed > 0)
    }

    pub fn set_filter(&mut self, status: StatusFilter) {
        self.query.status = status;
    }

    pub fn set_category_filter(&mut self, category_id: Option<String>) {
        self.query.category_id = category_id;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
    }

    pub fn set_sort(&mut self, sort_by: SortBy) {
        self.query.sort_by = sort_by;
    }

    /// Derived view of the loaded snapshot as of `today`. Stats and the
    /// overdue count always cover the whole list, not just the filtered rows.
    pub fn view_at(&self, today: NaiveDate) -> TaskView {
        TaskView {
            tasks: query::derive(&self.tasks, &self.query, today),
            stats: query::stats(&self.tasks),
            overdue_count: query::overdue_count(&self.tasks, today),
            categories: self.categories.clone(),
            today,
        }
    }

    pub fn current_view(&self) -> TaskView {
        self.view_at(Local::now().date_naive())
    }
}
