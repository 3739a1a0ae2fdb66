pub mod cli;
pub mod config;
pub mod database;
pub mod journal;
pub mod logging;
pub mod models;
pub mod notify;
pub mod profile;
pub mod review;
pub mod session;
pub mod store;
pub mod timer;
pub mod tui;
pub mod utils;

pub use config::Config;
pub use database::Database;
pub use journal::Journal;
pub use models::{DailyLog, Mood, Task, UserProfile};
pub use timer::{FocusTimer, Mode};
pub use utils::Profile;
