use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use thiserror::Error;

use crate::board::{NewTask, TaskBoard, TaskView};
use crate::database::DatabaseError;
use crate::models::{self, Priority, Task};
use crate::query::{SortBy, StatusFilter};
use crate::utils::{parse_color, parse_date};

#[derive(Parser)]
#[command(name = "tasknest")]
#[command(about = "Personal to-do list with categories, filters and overdue tracking")]
#[command(version)]
pub struct Cli {
    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    /// Use this database file instead of the configured one
    #[arg(long)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks (default if no subcommand)
    List {
        /// all, completed or pending
        #[arg(long)]
        status: Option<String>,
        /// Only tasks in this category id
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive text to find in title or description
        #[arg(long)]
        search: Option<String>,
        /// date, priority or title
        #[arg(long)]
        sort: Option<String>,
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a new task
    Add {
        /// Task title
        title: String,
        /// low, medium, high or urgent
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Longer description
        #[arg(long)]
        description: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
        /// Category id
        #[arg(long)]
        category: Option<String>,
    },
    /// Edit fields of an existing task
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Due date (YYYY-MM-DD), or "none" to clear
        #[arg(long)]
        due: Option<String>,
        /// Category id, or "none" to clear
        #[arg(long)]
        category: Option<String>,
    },
    /// Mark a task done, or pending again
    Toggle { id: String },
    /// Delete a task
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show task counts
    Stats,
    /// List categories
    Categories,
    /// Add a category
    AddCategory {
        name: String,
        /// Packed ARGB color, hex (#FF2196F3) or decimal
        #[arg(long, default_value = "#FF9E9E9E")]
        color: String,
        /// Icon code point
        #[arg(long, default_value_t = 0xE892)]
        icon: u32,
    },
    /// Delete a category; its tasks keep their data
    DeleteCategory {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("No task with id {0}")]
    UnknownTask(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

fn parse_due(due: &str) -> Result<chrono::NaiveDate, CliError> {
    parse_date(due)
        .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", due, e)))
}

/// `Some("none")` clears an optional field, `Some(value)` sets it, `None` keeps it
fn is_clear(value: &str) -> bool {
    value.eq_ignore_ascii_case("none")
}

/// Ask on stdin; anything but y/yes declines
fn confirm(prompt: &str) -> Result<bool, CliError> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Handle the list command
pub fn handle_list(
    board: &mut TaskBoard,
    status: Option<String>,
    category: Option<String>,
    search: Option<String>,
    sort: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    if let Some(status) = status {
        board.set_filter(StatusFilter::from_token(&status));
    }
    if let Some(sort) = sort {
        board.set_sort(SortBy::from_token(&sort));
    }
    board.set_category_filter(category);
    board.set_search(search.unwrap_or_default());

    let view = board.current_view();
    if json {
        let out = serde_json::to_string_pretty(&view)
            .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    if view.tasks.is_empty() {
        println!("No tasks.");
    }
    for task in &view.tasks {
        println!("{}", format_task_line(&view, task));
    }
    println!();
    print_summary(&view);
    Ok(())
}

fn format_task_line(view: &TaskView, task: &Task) -> String {
    let status_indicator = if task.completed { "✓" } else { "○" };
    let due_str = task
        .due_date
        .as_ref()
        .map(|d| {
            let marker = if view.is_overdue(task) { " OVERDUE" } else { "" };
            format!(" [due {}{}]", models::format_date(d), marker)
        })
        .unwrap_or_default();
    let category_str = view
        .category_of(task)
        .map(|c| format!(" ({})", c.name))
        .unwrap_or_default();

    format!(
        "{} {:<8} {}{}{}  {}",
        status_indicator,
        task.priority.as_str(),
        task.title,
        category_str,
        due_str,
        task.id
    )
}

fn print_summary(view: &TaskView) {
    println!(
        "{} total, {} completed, {} pending, {} overdue ({:.0}% done)",
        view.stats.total,
        view.stats.completed,
        view.stats.pending,
        view.overdue_count,
        view.stats.completion_percent()
    );
}

/// Handle the add command
pub fn handle_add(
    board: &mut TaskBoard,
    title: String,
    priority: String,
    description: Option<String>,
    due: Option<String>,
    category: Option<String>,
) -> Result<(), CliError> {
    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(CliError::InvalidArgument("title must not be empty".to_string()));
    }

    let due_date = due.as_deref().map(parse_due).transpose()?;

    let mut new_task = NewTask::new(title, Priority::from_token(&priority));
    new_task.description = description.unwrap_or_default();
    new_task.due_date = due_date;
    new_task.category_id = category;

    let task = board.add_task(new_task)?;
    println!("Task created successfully (ID: {})", task.id);
    Ok(())
}

/// Handle the edit command
pub fn handle_edit(
    board: &mut TaskBoard,
    id: String,
    title: Option<String>,
    priority: Option<String>,
    description: Option<String>,
    due: Option<String>,
    category: Option<String>,
) -> Result<(), CliError> {
    let mut task = board
        .database()
        .find_task(&id)?
        .ok_or_else(|| CliError::UnknownTask(id.clone()))?;

    if let Some(title) = title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(CliError::InvalidArgument("title must not be empty".to_string()));
        }
        task.title = title;
    }
    if let Some(priority) = priority {
        task.priority = Priority::from_token(&priority);
    }
    if let Some(description) = description {
        task.description = description;
    }
    if let Some(due) = due {
        task.due_date = if is_clear(&due) { None } else { Some(parse_due(&due)?) };
    }
    if let Some(category) = category {
        task.category_id = if is_clear(&category) { None } else { Some(category) };
    }

    if board.update_task(&task)? {
        println!("Task {} updated", id);
        Ok(())
    } else {
        Err(CliError::UnknownTask(id))
    }
}

/// Handle the toggle command
pub fn handle_toggle(board: &mut TaskBoard, id: String) -> Result<(), CliError> {
    match board.toggle_task(&id)? {
        Some(true) => println!("Task {} completed", id),
        Some(false) => println!("Task {} marked pending", id),
        None => return Err(CliError::UnknownTask(id)),
    }
    Ok(())
}

/// Handle the delete command. Deletion is never silent: without `--yes` the user is asked.
pub fn handle_delete(board: &mut TaskBoard, id: String, yes: bool) -> Result<(), CliError> {
    let task = board
        .database()
        .find_task(&id)?
        .ok_or_else(|| CliError::UnknownTask(id.clone()))?;

    if !yes && !confirm(&format!("Delete task '{}'?", task.title))? {
        println!("Cancelled");
        return Ok(());
    }

    board.delete_task(&id)?;
    println!("Deleted task '{}'", task.title);
    Ok(())
}

/// Handle the stats command
pub fn handle_stats(board: &TaskBoard) -> Result<(), CliError> {
    print_summary(&board.current_view());
    Ok(())
}

/// Handle the categories command
pub fn handle_categories(board: &TaskBoard) -> Result<(), CliError> {
    for category in board.categories() {
        let count = board
            .tasks()
            .iter()
            .filter(|t| t.category_id.as_deref() == Some(category.id.as_str()))
            .count();
        println!(
            "{:<12} {:<16} #{:08X}  {} task(s)",
            category.id, category.name, category.color, count
        );
    }
    Ok(())
}

/// Handle the add-category command
pub fn handle_add_category(
    board: &mut TaskBoard,
    name: String,
    color: String,
    icon: u32,
) -> Result<(), CliError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(CliError::InvalidArgument("category name must not be empty".to_string()));
    }
    let color = parse_color(&color)
        .ok_or_else(|| CliError::InvalidArgument(format!("invalid color '{}'", color)))?;

    let category = board.add_category(name, color, icon)?;
    println!("Category created successfully (ID: {})", category.id);
    Ok(())
}

/// Handle the delete-category command
pub fn handle_delete_category(board: &mut TaskBoard, id: String, yes: bool) -> Result<(), CliError> {
    let category = board.database().get_category(&id)?;

    if !yes && !confirm(&format!("Delete category '{}'?", category.name))? {
        println!("Cancelled");
        return Ok(());
    }

    board.delete_category(&id)?;
    println!("Deleted category '{}'", category.name);
    Ok(())
}
