use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::Config;
use crate::database::{Database, DatabaseError};
use crate::journal::{Journal, JournalError};
use crate::models::{CommunicationStyle, DailyLog, Mood, UserProfile};
use crate::profile::{self, ProfileError};
use crate::review::{self, GeminiClient};
use crate::utils::{get_current_date_string, normalize_date};

#[derive(Parser)]
#[command(name = "focuslog")]
#[command(about = "Daily task journal with a focus timer and an end-of-day review")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Add a task to a day's log
    Add {
        /// Task text
        text: String,
        /// Day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Start time (HH:MM), requires --end
        #[arg(long, requires = "end")]
        start: Option<String>,
        /// End time (HH:MM), requires --start
        #[arg(long, requires = "start")]
        end: Option<String>,
    },
    /// Show a day's tasks and mood
    List {
        #[arg(long)]
        date: Option<String>,
        /// Summarise every day that has entries instead
        #[arg(long, conflicts_with = "date")]
        all: bool,
    },
    /// Flip a task between done and not done
    Toggle {
        /// Task id or a unique prefix of it
        id: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a task
    Delete {
        /// Task id or a unique prefix of it
        id: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Record the day's mood (rad, good, okay, bad, awful)
    Mood {
        mood: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Ask for an end-of-day review of a day's log
    Review {
        #[arg(long)]
        date: Option<String>,
    },
    /// Show or create the user profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Print the stored profile
    Show,
    /// Create the profile (only once)
    Set {
        #[arg(long)]
        name: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        goals: String,
        #[arg(long)]
        challenges: String,
        /// direct, supportive or formal
        #[arg(long, default_value = "supportive")]
        style: String,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("{0}")]
    JournalError(#[from] JournalError),
    #[error("{0}")]
    ProfileError(#[from] ProfileError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("No task matches id '{0}'")]
    TaskNotFound(String),
    #[error("Id prefix '{0}' matches more than one task")]
    AmbiguousId(String),
}

/// Validate `--date` into a canonical key, defaulting to today
fn resolve_date(date: Option<String>) -> Result<String, CliError> {
    match date {
        Some(date_str) => normalize_date(&date_str)
            .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", date_str, e))),
        None => Ok(get_current_date_string()),
    }
}

/// Full id of the single task whose id starts with `prefix`
fn resolve_task_id(log: &DailyLog, prefix: &str) -> Result<String, CliError> {
    let mut matches = log.tasks.iter().filter(|task| task.id.starts_with(prefix));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(task.id.clone()),
        (Some(_), Some(_)) => Err(CliError::AmbiguousId(prefix.to_string())),
        (None, _) => Err(CliError::TaskNotFound(prefix.to_string())),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn handle_add(
    text: String,
    date: Option<String>,
    start: Option<String>,
    end: Option<String>,
    db: &Database,
) -> Result<(), CliError> {
    profile::require(db)?;
    let date = resolve_date(date)?;
    let journal = Journal::new(db);
    let task = match (start, end) {
        (Some(start), Some(end)) => journal.add_timed_task(&date, &text, &start, &end)?,
        (None, None) => journal.add_task(&date, &text)?,
        _ => {
            return Err(CliError::InvalidArgument(
                "--start and --end must be given together".to_string(),
            ));
        }
    };
    println!("Task added to {} (ID: {})", date, short_id(&task.id));
    Ok(())
}

pub fn handle_list(date: Option<String>, all: bool, db: &Database) -> Result<(), CliError> {
    profile::require(db)?;
    if all {
        let days = db.list_days()?;
        if days.is_empty() {
            println!("No entries yet.");
        }
        for day in days {
            let mood = day.mood.map(|m| format!("  {}", m.label())).unwrap_or_default();
            println!("{}  {}/{} done{}", day.date, day.completed_count, day.task_count, mood);
        }
        return Ok(());
    }

    let date = resolve_date(date)?;
    let log = Journal::new(db).log(&date)?;
    match log.mood {
        Some(mood) => println!("{}  mood: {} ({})", date, mood.label(), mood),
        None => println!("{}", date),
    }
    if log.tasks.is_empty() {
        println!("  (no tasks)");
    }
    for task in &log.tasks {
        let mark = if task.completed { "x" } else { " " };
        let range = task.time_range().map(|r| format!("  {}", r)).unwrap_or_default();
        println!("  [{}] {}  {}{}", mark, short_id(&task.id), task.text, range);
    }
    Ok(())
}

pub fn handle_toggle(id: String, date: Option<String>, db: &Database) -> Result<(), CliError> {
    profile::require(db)?;
    let date = resolve_date(date)?;
    let journal = Journal::new(db);
    let id = resolve_task_id(&journal.log(&date)?, &id)?;
    journal.toggle_complete(&date, &id)?;
    println!("Task {} toggled", short_id(&id));
    Ok(())
}

pub fn handle_delete(id: String, date: Option<String>, db: &Database) -> Result<(), CliError> {
    profile::require(db)?;
    let date = resolve_date(date)?;
    let journal = Journal::new(db);
    let id = resolve_task_id(&journal.log(&date)?, &id)?;
    journal.delete_task(&date, &id)?;
    println!("Task {} deleted", short_id(&id));
    Ok(())
}

pub fn handle_mood(mood: String, date: Option<String>, db: &Database) -> Result<(), CliError> {
    profile::require(db)?;
    let date = resolve_date(date)?;
    let mood: Mood = mood.parse().map_err(CliError::InvalidArgument)?;
    Journal::new(db).set_mood(&date, mood)?;
    println!("Mood for {} set to {}", date, mood.label());
    Ok(())
}

/// Synchronous review; prints whatever the user would see in the TUI
pub fn handle_review(date: Option<String>, config: &Config, db: &Database) -> Result<(), CliError> {
    let user = profile::require(db)?;
    let date = resolve_date(date)?;
    let log = Journal::new(db).log(&date)?;
    let client = GeminiClient::from_config(&config.review);
    let outcome = review::request_review(&client, &log.tasks, log.mood, Some(&user));
    println!("{}", outcome.message());
    Ok(())
}

pub fn handle_profile(action: ProfileAction, db: &Database) -> Result<(), CliError> {
    match action {
        ProfileAction::Show => match profile::load(db)? {
            Some(user) => {
                println!("Name:       {}", user.name);
                println!("Role:       {}", user.role);
                println!("Goals:      {}", user.goals);
                println!("Challenges: {}", user.challenges);
                println!("Style:      {}", user.communication_style.as_str());
            }
            None => println!("{}", ProfileError::Missing),
        },
        ProfileAction::Set { name, role, goals, challenges, style } => {
            let communication_style: CommunicationStyle =
                style.parse().map_err(CliError::InvalidArgument)?;
            let user = UserProfile {
                name,
                role,
                goals,
                challenges,
                communication_style,
            };
            profile::create(db, &user)?;
            println!("Profile saved for {}", user.name);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Task;

    fn sample_profile() -> UserProfile {
        UserProfile {
            name: "Mei".to_string(),
            role: "Engineer".to_string(),
            goals: "Ship".to_string(),
            challenges: "Focus".to_string(),
            communication_style: CommunicationStyle::Direct,
        }
    }

    fn onboarded_db() -> Database {
        let db = Database::open_in_memory().expect("db");
        profile::create(&db, &sample_profile()).expect("profile");
        db
    }

    fn log_with(ids: &[&str]) -> DailyLog {
        let mut log = DailyLog::default();
        for id in ids {
            let mut task = Task::new(format!("task {id}"));
            task.id = id.to_string();
            log.push_task(task);
        }
        log
    }

    #[test]
    fn task_id_prefix_must_be_unique() {
        let log = log_with(&["abc123", "abd456"]);
        assert_eq!(resolve_task_id(&log, "abc").expect("unique"), "abc123");
        assert!(matches!(resolve_task_id(&log, "ab"), Err(CliError::AmbiguousId(_))));
        assert!(matches!(resolve_task_id(&log, "zz"), Err(CliError::TaskNotFound(_))));
    }

    #[test]
    fn bad_date_is_rejected() {
        assert!(matches!(
            resolve_date(Some("2026/02/16".to_string())),
            Err(CliError::DateParseError(_))
        ));
        assert_eq!(resolve_date(Some("2026-02-16".to_string())).expect("date"), "2026-02-16");
    }

    #[test]
    fn unpadded_date_lands_on_the_same_day() {
        let db = onboarded_db();
        handle_add("unpadded".to_string(), Some("2026-2-5".to_string()), None, None, &db).expect("add");
        let log = Journal::new(&db).log("2026-02-05").expect("log");
        assert_eq!(log.tasks.len(), 1);
        assert_eq!(log.tasks[0].text, "unpadded");
    }

    #[test]
    fn add_then_toggle_by_prefix() {
        let db = onboarded_db();
        handle_add("Write notes".to_string(), Some("2026-02-16".to_string()), None, None, &db)
            .expect("add");
        let journal = Journal::new(&db);
        let id = journal.log("2026-02-16").expect("log").tasks[0].id.clone();

        handle_toggle(id[..6].to_string(), Some("2026-02-16".to_string()), &db).expect("toggle");
        assert!(journal.log("2026-02-16").expect("log").tasks[0].completed);
    }

    #[test]
    fn unknown_mood_is_an_argument_error() {
        let db = onboarded_db();
        assert!(matches!(
            handle_mood("meh".to_string(), None, &db),
            Err(CliError::InvalidArgument(_))
        ));
    }

    #[test]
    fn commands_need_a_profile_first() {
        let db = Database::open_in_memory().expect("db");
        assert!(matches!(
            handle_add("Write notes".to_string(), None, None, None, &db),
            Err(CliError::ProfileError(ProfileError::Missing))
        ));
        assert!(matches!(
            handle_review(None, &Config::default(), &db),
            Err(CliError::ProfileError(ProfileError::Missing))
        ));
        assert!(db.list_days().expect("days").is_empty());
    }

    #[test]
    fn cli_parses_timed_add() {
        let cli = Cli::try_parse_from([
            "focuslog", "add", "Deep work", "--start", "09:00", "--end", "09:25",
        ])
        .expect("parse");
        assert!(matches!(
            cli.command,
            Some(Commands::Add { start: Some(_), end: Some(_), .. })
        ));
        assert!(Cli::try_parse_from(["focuslog", "add", "x", "--start", "09:00"]).is_err());
    }
}
