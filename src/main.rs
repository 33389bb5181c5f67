use clap::Parser;
use color_eyre::Result;
use tasknest::{Config, Database, Profile, TaskBoard, cli::{Cli, Commands}};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev keeps config and data apart from the everyday profile
    let profile = if cli.dev {
        Profile::Dev
    } else {
        Profile::Prod
    };

    let config = Config::load_with_profile(profile)?;

    if let Err(e) = tasknest::logging::init_logging(&config.log_level, &config.get_log_dir()) {
        eprintln!("WARNING: file logging disabled: {}", e);
    }

    let db_path = match cli.db {
        Some(ref path) => tasknest::utils::expand_path(path),
        None => config.get_database_path(),
    };
    // Schema downgrade and storage failures abort startup here
    let db = Database::open(&db_path)?;
    let mut board = TaskBoard::new(db)?.with_query(config.initial_query());

    match cli.command.unwrap_or(Commands::List {
        status: None,
        category: None,
        search: None,
        sort: None,
        json: false,
    }) {
        Commands::List { status, category, search, sort, json } => {
            tasknest::cli::handle_list(&mut board, status, category, search, sort, json)?;
        }
        Commands::Add { title, priority, description, due, category } => {
            tasknest::cli::handle_add(&mut board, title, priority, description, due, category)?;
        }
        Commands::Edit { id, title, priority, description, due, category } => {
            tasknest::cli::handle_edit(&mut board, id, title, priority, description, due, category)?;
        }
        Commands::Toggle { id } => {
            tasknest::cli::handle_toggle(&mut board, id)?;
        }
        Commands::Delete { id, yes } => {
            tasknest::cli::handle_delete(&mut board, id, yes)?;
        }
        Commands::Stats => {
            tasknest::cli::handle_stats(&board)?;
        }
        Commands::Categories => {
            tasknest::cli::handle_categories(&board)?;
        }
        Commands::AddCategory { name, color, icon } => {
            tasknest::cli::handle_add_category(&mut board, name, color, icon)?;
        }
        Commands::DeleteCategory { id, yes } => {
            tasknest::cli::handle_delete_category(&mut board, id, yes)?;
        }
    }

    Ok(())
}
