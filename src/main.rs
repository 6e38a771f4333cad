// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use building_meter::logging::init_console_logging;
#[cfg(feature = "tui")]
use building_meter::logging::init_file_logging;
use building_meter::{
    export_record, get_previous_record, AppConfig, CsvWorkbookWriter, LoadStatus, RecordStore,
    SpreadsheetSink, SqliteStore, XlsxWorkbookWriter,
};
use std::env;
use std::path::PathBuf;
use tracing::warn;

enum Command {
    Ui,
    List,
    Create(String),
    Export { month: Option<String>, csv: bool },
}

fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();

    // --config <path> may appear anywhere
    let config_path = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            if i + 1 >= args.len() {
                bail!("--config needs a path");
            }
            let path = PathBuf::from(args.remove(i + 1));
            args.remove(i);
            Some(path)
        }
        None => None,
    };
    let config = AppConfig::load(config_path.as_deref())?;

    let command = match args.first().map(String::as_str) {
        None => Command::Ui,
        Some("list") => Command::List,
        Some("create") => match args.get(1) {
            Some(month) => Command::Create(month.clone()),
            None => bail!("usage: building-meter create YYYY-MM"),
        },
        Some("export") => {
            let csv = args.iter().any(|a| a == "--csv");
            let month = args.iter().skip(1).find(|a| *a != "--csv").cloned();
            Command::Export { month, csv }
        }
        Some(other) => bail!("unknown command: {} (expected list, create, export)", other),
    };

    match command {
        Command::Ui => run_ui_mode(&config),
        Command::List => {
            init_console_logging()?;
            run_list(&config)
        }
        Command::Create(month) => {
            init_console_logging()?;
            run_create(&config, &month)
        }
        Command::Export { month, csv } => {
            init_console_logging()?;
            run_export(&config, month.as_deref(), csv)
        }
    }
}

fn open_store(config: &AppConfig) -> Result<RecordStore<SqliteStore>> {
    let storage = SqliteStore::open(&config.database_path)?;
    let (store, status) = RecordStore::open(storage)?;
    match &status {
        LoadStatus::Recovered(reason) => {
            warn!(%reason, "saved records were unreadable and have been reset");
            eprintln!("⚠️  Saved records were unreadable and have been reset");
        }
        LoadStatus::Partial { skipped, reason, .. } => {
            warn!(skipped, %reason, "some saved months were unreadable");
            eprintln!("⚠️  Skipped {} unreadable month(s): {}", skipped, reason);
        }
        _ => {}
    }
    Ok(store)
}

fn run_list(config: &AppConfig) -> Result<()> {
    let store = open_store(config)?;

    if store.records().is_empty() {
        println!("No months recorded yet. Run: building-meter create YYYY-MM");
        return Ok(());
    }

    for record in store.records() {
        let marker = if store.current_id() == Some(record.id.as_str()) { "*" } else { " " };
        println!("{} {}  {}", marker, record.id, record.name);
    }

    Ok(())
}

fn run_create(config: &AppConfig, month: &str) -> Result<()> {
    let mut store = open_store(config)?;
    let id = store.create_month(month)?;
    println!("✓ Created {}", id);
    Ok(())
}

fn run_export(config: &AppConfig, month: Option<&str>, csv: bool) -> Result<()> {
    let store = open_store(config)?;

    let current = match month {
        Some(id) => store
            .find_record(id)
            .with_context(|| format!("No record for {}", id))?,
        None => store.current_record().context("No records to export")?,
    };
    let previous = get_previous_record(store.records(), &current.id);

    let mut sink: Box<dyn SpreadsheetSink> = if csv {
        Box::new(CsvWorkbookWriter::new(config.export_dir.clone()))
    } else {
        Box::new(XlsxWorkbookWriter::new(config.export_dir.clone()))
    };
    let path = export_record(sink.as_mut(), current, previous)?;
    println!("✓ Exported {} to {}", current.name, path.display());

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &AppConfig) -> Result<()> {
    let _guard = init_file_logging(&config.log_dir)?;

    let storage = SqliteStore::open(&config.database_path)?;
    let (store, status) = RecordStore::open(storage)?;

    let mut app = ui::App::new(store, &status, config.export_dir.clone());
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &AppConfig) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: building-meter list | create YYYY-MM | export [YYYY-MM] [--csv]");
    std::process::exit(1);
}
