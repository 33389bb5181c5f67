//! Filtering, searching and ordering of task snapshots.
//!
//! Everything here is a pure function over borrowed input: nothing performs
//! I/O and every call returns a freshly allocated result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};

use crate::models::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    /// Unrecognized tokens degrade to `All`.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "all" => StatusFilter::All,
            "completed" => StatusFilter::Completed,
            "pending" => StatusFilter::Pending,
            other => {
                log::warn!("event=enum_fallback module=query kind=status token={other:?} fallback=all");
                StatusFilter::All
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Completed => "completed",
            StatusFilter::Pending => "pending",
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => task.completed,
            StatusFilter::Pending => !task.completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Date,
    Priority,
    Title,
}

impl SortBy {
    /// Unrecognized tokens degrade to `Date`.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "date" => SortBy::Date,
            "priority" => SortBy::Priority,
            "title" => SortBy::Title,
            other => {
                log::warn!("event=enum_fallback module=query kind=sort token={other:?} fallback=date");
                SortBy::Date
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Date => "date",
            SortBy::Priority => "priority",
            SortBy::Title => "title",
        }
    }
}

/// Filter and sort parameters for a derived task view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskQuery {
    pub status: StatusFilter,
    pub category_id: Option<String>,
    pub search: String,
    pub sort_by: SortBy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskStats {
    /// Share of completed tasks, 0 for an empty list.
    pub fn completion_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 * 100.0 / self.total as f64
        }
    }
}

fn matches_search(task: &Task, query_lower: &str) -> bool {
    task.title.to_lowercase().contains(query_lower)
        || task.description.to_lowercase().contains(query_lower)
}

/// Apply the status, category and search filters (in that order) and then sort.
/// `today` is the calendar day used for the overdue rule.
pub fn derive(tasks: &[Task], query: &TaskQuery, today: NaiveDate) -> Vec<Task> {
    let query_lower = query.search.to_lowercase();

    let mut view: Vec<Task> = tasks
        .iter()
        .filter(|task| query.status.matches(task))
        .filter(|task| match query.category_id {
            Some(ref id) => task.category_id.as_deref() == Some(id.as_str()),
            None => true,
        })
        .filter(|task| query_lower.is_empty() || matches_search(task, &query_lower))
        .cloned()
        .collect();

    sort_tasks(&mut view, query.sort_by, today);
    view
}

/// Stable in-place sort by the given mode.
pub fn sort_tasks(tasks: &mut [Task], sort_by: SortBy, today: NaiveDate) {
    match sort_by {
        SortBy::Priority => tasks.sort_by_key(|task| task.priority.rank()),
        SortBy::Title => tasks.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase())),
        SortBy::Date => tasks.sort_by(|a, b| compare_by_date(a, b, today)),
    }
}

/// Dated tasks first, overdue ahead of the rest, then due day ascending.
/// Undated tasks follow, newest first.
fn compare_by_date(a: &Task, b: &Task, today: NaiveDate) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(a_due), Some(b_due)) => {
            let a_key = (!a.is_overdue(today), a_due);
            let b_key = (!b.is_overdue(today), b_due);
            a_key.cmp(&b_key)
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Reverse(a.created_at).cmp(&Reverse(b.created_at)),
    }
}

/// Number of overdue tasks in the full, unfiltered list.
pub fn overdue_count(tasks: &[Task], today: NaiveDate) -> usize {
    tasks.iter().filter(|task| task.is_overdue(today)).count()
}

pub fn stats(tasks: &[Task]) -> TaskStats {
    let completed = tasks.iter().filter(|task| task.completed).count();
    TaskStats {
        total: tasks.len(),
        completed,
        pending: tasks.len() - completed,
    }
}
