/// Habit tracker binary
///
/// Parses the command line, sets up logging on stderr and serves the habit
/// tools as line-delimited JSON-RPC over stdin/stdout.

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use habit_tracker::HabitTrackerServer;

const DB_FILE_NAME: &str = "habits.db";

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// SQLite database file; defaults to `habits.db` in a per-user directory
    #[arg(long, env = "HABIT_TRACKER_DB")]
    database: Option<PathBuf>,

    /// Log lifecycle events (info level)
    #[arg(short, long)]
    debug: bool,

    /// Log every request and mutation (debug level)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.debug {
            "info"
        } else {
            "warn"
        }
    }
}

/// Whether `dir` exists (or can be created) and accepts new files
fn is_writable_dir(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }

    let probe = dir.join(".write_probe");
    let writable = std::fs::write(&probe, b"").is_ok();
    let _ = std::fs::remove_file(&probe);
    writable
}

/// Pick the database location: home, data dir, config dir, working dir,
/// then the system temp dir
fn default_database_path() -> std::io::Result<PathBuf> {
    let candidates = [
        dirs::home_dir().map(|p| p.join(".habit_tracker")),
        dirs::data_dir().map(|p| p.join("habit_tracker")),
        dirs::config_dir().map(|p| p.join("habit_tracker")),
        std::env::current_dir().ok().map(|p| p.join(".habit_tracker")),
    ];

    if let Some(dir) = candidates.iter().flatten().find(|dir| is_writable_dir(dir)) {
        return Ok(dir.join(DB_FILE_NAME));
    }

    let temp_dir = std::env::temp_dir().join("habit_tracker");
    std::fs::create_dir_all(&temp_dir)?;
    warn!("No writable user directory, using {}", temp_dir.display());
    Ok(temp_dir.join(DB_FILE_NAME))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_tracker={}", args.log_level()))
        .with_writer(std::io::stderr)
        .init();

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            path
        }
        None => default_database_path()?,
    };

    info!("Using database at {}", db_path.display());

    let server = HabitTrackerServer::new(db_path).await?;
    server.run().await?;

    info!("Habit tracker shut down");
    Ok(())
}
