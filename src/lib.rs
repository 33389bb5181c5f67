pub mod board;
pub mod cli;
pub mod config;
pub mod database;
pub mod logging;
pub mod migrations;
pub mod models;
pub mod query;
pub mod utils;

pub use board::{NewTask, TaskBoard, TaskView};
pub use config::Config;
pub use database::{Database, DatabaseError};
pub use models::{Category, Priority, Task};
pub use query::{SortBy, StatusFilter, TaskQuery, TaskStats};
pub use utils::Profile;
