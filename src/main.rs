use std::fs::File;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::{error, info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use folio::core::book::Book;
use folio::core::config::{self, CliOverrides, FolioConfig};
use folio::core::progress::{FileStore, MemoryStore, ProgressStore};
use folio::core::state::App;
use folio::tui;

#[derive(Parser)]
#[command(name = "folio", about = "Interactive books in the terminal")]
struct Args {
    /// Book file (TOML). Defaults to the built-in book.
    #[arg(short, long)]
    book: Option<PathBuf>,

    /// Start from the first page, ignoring saved progress
    #[arg(long)]
    restart: bool,

    /// Keep progress in memory only
    #[arg(long)]
    no_persist: bool,

    /// Log verbosity written to folio.log
    #[arg(long, default_value_t, value_enum)]
    log_level: LogLevel,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    #[default]
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to folio.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("folio.log") {
        let _ = WriteLogger::init(args.log_level.into(), log_config, log_file);
    }
    install_panic_logger();

    let file_config = config::load_config().unwrap_or_else(|e| {
        warn!("Ignoring config file: {}", e);
        FolioConfig::default()
    });
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            book: args.book,
            no_persist: args.no_persist,
            restart: args.restart,
        },
    );

    let book = match &resolved.book_path {
        Some(path) => Book::load(path),
        None => Book::builtin(),
    }
    .map_err(|e| {
        error!("Failed to load book: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    let store: Box<dyn ProgressStore> = match &resolved.progress_path {
        Some(path) => {
            info!("Progress file: {}", path.display());
            Box::new(FileStore::new(path))
        }
        None => {
            info!("Progress kept in memory");
            Box::new(MemoryStore::new())
        }
    };

    let app = App::new(book, store, resolved.timing, resolved.restart)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    info!(
        "Folio starting: \"{}\" on page {}",
        app.book.title,
        app.nav.current_page_id()
    );

    tui::run(app)
}

/// Route panics into the log before the terminal is torn down.
fn install_panic_logger() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        error!("Panic: {}", panic_info);
        previous(panic_info);
    }));
}
