mod api;
mod config;
mod menu;
mod serve;
mod students;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use gradebook_db::Database;
use gradebook_logging::{init_tracing, LogFormat};

use crate::config::ProjectConfig;
use crate::students::RecordAction;

#[derive(Parser, Debug)]
#[command(
    name = "gradebook",
    about = "Track students and their per-subject scores",
    version,
    author
)]
struct Cli {
    /// Database connection string (sqlite:///path.db, sqlite::memory: or a file path)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormatChoice>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Runs the interactive menu when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Record(RecordAction),

    /// Interactive menu
    Menu,

    /// Serve the JSON API
    Serve {
        /// Address to bind (default: 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (default: $PORT or 5000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config = ProjectConfig::load(&working_dir)?.unwrap_or_default();

    init_tracing(
        &config.log_level(cli.log_level.as_deref()),
        config.log_format(cli.log_format.map(Into::into)),
    );

    let db = open_database(&config, cli.database.as_deref())?;
    let backup_path = config.backup_path(None);

    match cli.command {
        Some(Commands::Record(action)) => {
            students::handle_record_command(&db, action, &backup_path)?;
        }
        Some(Commands::Menu) | None => {
            menu::run_menu(&db, &backup_path)?;
        }
        Some(Commands::Serve { host, port }) => {
            let host = config.host(host.as_deref());
            let port = config.port(port);
            serve::handle_serve_command(db, &host, port, backup_path).await?;
        }
    }

    Ok(())
}

fn open_database(config: &ProjectConfig, cli_url: Option<&str>) -> Result<Database> {
    match config.database_url(cli_url) {
        Some(url) => {
            tracing::debug!(%url, "opening database");
            Database::open_url(&url).with_context(|| format!("Failed to open database {}", url))
        }
        None => {
            tracing::debug!(path = %Database::default_path().display(), "opening default database");
            Database::open().context("Failed to initialize database")
        }
    }
}
