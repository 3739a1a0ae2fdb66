use clap::Parser;
use color_eyre::Result;
use focuslog::{cli::{Cli, Commands}, Config, Database, Profile};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev keeps config, database and log file apart from real data
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let log_path = focuslog::logging::init(profile);
    tracing::info!(?profile, log = ?log_path, "focuslog starting");

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from_path(&focuslog::utils::expand_path(path), profile)?,
        None => Config::load_with_profile(profile)?,
    };

    let db_path = config.get_database_path();
    let db = Database::new(
        db_path.to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?
    )?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let app = focuslog::tui::App::new(config, db)?;
            focuslog::tui::run_event_loop(app)?;
        }
        Commands::Add { text, date, start, end } => {
            focuslog::cli::handle_add(text, date, start, end, &db)?;
        }
        Commands::List { date, all } => {
            focuslog::cli::handle_list(date, all, &db)?;
        }
        Commands::Toggle { id, date } => {
            focuslog::cli::handle_toggle(id, date, &db)?;
        }
        Commands::Delete { id, date } => {
            focuslog::cli::handle_delete(id, date, &db)?;
        }
        Commands::Mood { mood, date } => {
            focuslog::cli::handle_mood(mood, date, &db)?;
        }
        Commands::Review { date } => {
            focuslog::cli::handle_review(date, &config, &db)?;
        }
        Commands::Profile { action } => {
            focuslog::cli::handle_profile(action, &db)?;
        }
    }

    Ok(())
}
