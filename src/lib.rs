// Building Meter - Core Library
// Monthly utility readings per household and shop: record store,
// derivations, spreadsheet export and local persistence.

pub mod config;
pub mod db;
pub mod derive;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod store;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{
    load_records, save_records, Hydrated, KeyValueStore, LoadStatus, SqliteStore, STORAGE_KEY,
};
pub use derive::{
    household_delta, is_unit_completed, progress_by_inspector, room_label, usage_delta,
    HouseholdDelta, InspectorProgress, UsageDelta,
};
pub use error::MeterError;
pub use export::{
    build_workbook, export_record, Cell, CsvWorkbookWriter, Sheet, SpreadsheetSink, Workbook,
    XlsxWorkbookWriter,
};
pub use model::{
    parse_reading, CommercialField, CommercialReading, HouseholdField, HouseholdReading,
    InspectorRole, MonthlyRecord, Reading, COMMERCIAL_UNITS, HOUSEHOLD_COUNT,
};
pub use store::{get_previous_record, RecordStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
