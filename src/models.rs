use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Parse a stored or user-supplied token; anything unrecognized is medium.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "low" => Priority::Low,
            "medium" => Priority::Medium,
            "high" => Priority::High,
            "urgent" => Priority::Urgent,
            other => {
                log::warn!("event=enum_fallback module=models kind=priority token={other:?} fallback=medium");
                Priority::Medium
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    /// Sort rank, most pressing first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Urgent => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub due_date: Option<NaiveDate>,
    pub category_id: Option<String>,
}

impl Task {
    pub fn new(title: String, priority: Priority) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description: String::new(),
            completed: false,
            priority,
            // Stored with millisecond precision
            created_at: Utc::now().trunc_subsecs(3),
            due_date: None,
            category_id: None,
        }
    }

    /// A task is overdue when it is still pending and its due day lies strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: u32,
    pub icon: u32,
}

impl Category {
    pub fn new(name: String, color: u32, icon: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            color,
            icon,
        }
    }
}

/// Categories seeded into an empty store: (id, name, ARGB color, icon code point).
pub const DEFAULT_CATEGORIES: [(&str, &str, u32, u32); 5] = [
    ("work", "Work", 0xFF21_96F3, 0xE8F9),
    ("personal", "Personal", 0xFF4C_AF50, 0xE7FD),
    ("shopping", "Shopping", 0xFFFF_9800, 0xE8CC),
    ("health", "Health", 0xFFF4_4336, 0xE87D),
    ("education", "Education", 0xFF9C_27B0, 0xE80C),
];

pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|&(id, name, color, icon)| Category {
            id: id.to_string(),
            name: name.to_string(),
            color,
            icon,
        })
        .collect()
}

/// Resolve a task's category against a loaded list. Dangling ids resolve to `None`.
pub fn find_category<'a>(categories: &'a [Category], id: Option<&str>) -> Option<&'a Category> {
    let id = id?;
    categories.iter().find(|c| c.id == id)
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Accepts RFC 3339 or a naive ISO-8601 timestamp (read as UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Reads a stored due date at day granularity; a full timestamp keeps only its date part.
pub fn parse_due_date(s: &str) -> Option<NaiveDate> {
    let day = s.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
