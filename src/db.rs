// 💾 Persistence Adapter - Record Collection ↔ SQLite key/value blob
// The whole collection is one JSON array under a fixed key.

use crate::model::MonthlyRecord;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

/// Storage key; the JSON shape under it is a compatibility contract
pub const STORAGE_KEY: &str = "meter_records_v2";

// ============================================================================
// KEY/VALUE STORAGE
// ============================================================================

/// Durable string storage addressed by key.
pub trait KeyValueStore {
    /// Value for `key`, or None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

/// SQLite-backed store (WAL journal when file-backed)
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        setup_database(&conn)?;
        info!(path = %path.display(), "database opened");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        setup_database(&conn)?;
        Ok(Self { conn })
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // In-memory databases report "memory" and ignore the request
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS storage (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    Ok(())
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read key {}", key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO storage (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
                params![key, value],
            )
            .with_context(|| format!("Failed to write key {}", key))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM storage WHERE key = ?1", params![key])
            .with_context(|| format!("Failed to delete key {}", key))?;
        Ok(())
    }
}

// ============================================================================
// LOAD / SAVE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    /// Nothing stored under the key
    Empty,
    /// Collection restored with this many records
    Loaded(usize),
    /// Stored blob was not a JSON array; it was deleted and the collection reset
    Recovered(String),
    /// Blob was an array but some elements were unreadable. Those were
    /// skipped; the blob itself is left in place.
    Partial {
        loaded: usize,
        skipped: usize,
        reason: String,
    },
}

#[derive(Debug)]
pub struct Hydrated {
    pub records: Vec<MonthlyRecord>,
    pub status: LoadStatus,
}

/// Read the collection. A blob that is not a JSON array is discarded (key
/// deleted) and reported as `Recovered` with an empty collection. Inside an
/// array each record is read on its own; unreadable ones are skipped and
/// reported as `Partial`. Only storage I/O failures are returned as errors.
pub fn load_records<S: KeyValueStore + ?Sized>(store: &S) -> Result<Hydrated> {
    let raw = match store.get(STORAGE_KEY)? {
        Some(raw) => raw,
        None => {
            debug!("no saved records");
            return Ok(Hydrated {
                records: Vec::new(),
                status: LoadStatus::Empty,
            });
        }
    };

    let elements = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(elements)) => elements,
        Ok(other) => {
            let reason = format!("expected an array, found {}", json_kind(&other));
            return discard(store, reason);
        }
        Err(e) => return discard(store, e.to_string()),
    };

    let total = elements.len();
    let mut records = Vec::with_capacity(total);
    let mut first_error = None;

    for (i, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<MonthlyRecord>(element) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(index = i, error = %e, "skipping unreadable record");
                first_error.get_or_insert_with(|| format!("record {}: {}", i, e));
            }
        }
    }

    let status = match first_error {
        None => {
            info!(count = records.len(), "records loaded");
            LoadStatus::Loaded(records.len())
        }
        Some(reason) => {
            let skipped = total - records.len();
            warn!(loaded = records.len(), skipped, "records loaded with omissions");
            LoadStatus::Partial {
                loaded: records.len(),
                skipped,
                reason,
            }
        }
    };

    Ok(Hydrated { records, status })
}

fn discard<S: KeyValueStore + ?Sized>(store: &S, reason: String) -> Result<Hydrated> {
    warn!(%reason, "saved records unreadable; discarding");
    store.delete(STORAGE_KEY)?;
    Ok(Hydrated {
        records: Vec::new(),
        status: LoadStatus::Recovered(reason),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Write the collection back; an empty collection deletes the key.
pub fn save_records<S: KeyValueStore + ?Sized>(store: &S, records: &[MonthlyRecord]) -> Result<()> {
    if records.is_empty() {
        store.delete(STORAGE_KEY)?;
        debug!("collection empty; key removed");
        return Ok(());
    }

    let json = serde_json::to_string(records).context("Failed to serialize records")?;
    store.set(STORAGE_KEY, &json)?;
    debug!(count = records.len(), bytes = json.len(), "records saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_key_is_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        let hydrated = load_records(&store).unwrap();
        assert!(hydrated.records.is_empty());
        assert_eq!(hydrated.status, LoadStatus::Empty);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let store = SqliteStore::open_in_memory().unwrap();

        let mut march = MonthlyRecord::blank("2025-03");
        march.main_meter = Some(1520.75);
        march.households[5].water = Some(33.0);
        march.commercials[2].water = Some(8.5);
        let records = vec![MonthlyRecord::blank("2025-02"), march];

        save_records(&store, &records).unwrap();
        let hydrated = load_records(&store).unwrap();

        assert_eq!(hydrated.status, LoadStatus::Loaded(2));
        assert_eq!(hydrated.records, records);
    }

    #[test]
    fn test_save_empty_removes_key() {
        let store = SqliteStore::open_in_memory().unwrap();
        save_records(&store, &[MonthlyRecord::blank("2025-03")]).unwrap();
        assert!(store.get(STORAGE_KEY).unwrap().is_some());

        save_records(&store, &[]).unwrap();
        assert!(store.get(STORAGE_KEY).unwrap().is_none());
        assert_eq!(load_records(&store).unwrap().status, LoadStatus::Empty);
    }

    #[test]
    fn test_corrupt_blob_is_discarded() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set(STORAGE_KEY, "{not json").unwrap();

        let hydrated = load_records(&store).unwrap();
        assert!(hydrated.records.is_empty());
        assert!(matches!(hydrated.status, LoadStatus::Recovered(_)));
        assert!(store.get(STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_non_array_blob_is_discarded() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set(STORAGE_KEY, r#"{"id":"2025-03"}"#).unwrap();

        let hydrated = load_records(&store).unwrap();
        assert!(matches!(hydrated.status, LoadStatus::Recovered(_)));
        assert!(store.get(STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_bad_element_keeps_the_rest() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut broken = serde_json::to_value(MonthlyRecord::blank("2025-02")).unwrap();
        broken["households"][0]["water"] = serde_json::json!(true);
        let good = serde_json::to_value(MonthlyRecord::blank("2025-01")).unwrap();
        let unknown_inspector = serde_json::json!({
            "id": "2025-03", "name": "2025년 3월", "mainMeter": "",
            "households": [], "commercials": [{"unit": "101호", "inspector": "대리", "water": ""}]
        });
        let blob = serde_json::to_string(&vec![good, broken, unknown_inspector]).unwrap();
        store.set(STORAGE_KEY, &blob).unwrap();

        let hydrated = load_records(&store).unwrap();
        assert_eq!(hydrated.records.len(), 1);
        assert_eq!(hydrated.records[0].id, "2025-01");
        match hydrated.status {
            LoadStatus::Partial { loaded, skipped, reason } => {
                assert_eq!((loaded, skipped), (1, 2));
                assert!(reason.starts_with("record 1:"));
            }
            other => panic!("expected Partial, got {:?}", other),
        }

        // The original blob is untouched
        assert_eq!(store.get(STORAGE_KEY).unwrap().as_deref(), Some(blob.as_str()));
    }

    #[test]
    fn test_reads_blob_written_by_browser_form() {
        let store = SqliteStore::open_in_memory().unwrap();
        let blob = r#"[{"id":"2024-11","name":"2024년 11월","mainMeter":1200,
            "households":[{"floor":"2층","unit":"1호","inspector":"과장",
              "outdoorUnit":"","heating":3.5,"hotWater":"","water":12,
              "elec13":"","elec14":"","elec15":"","elec16":"","elec17":"","elec19":"","elec20":""}],
            "commercials":[{"unit":"101호","inspector":"주임","water":""}]}]"#;
        store.set(STORAGE_KEY, blob).unwrap();

        let hydrated = load_records(&store).unwrap();
        assert_eq!(hydrated.status, LoadStatus::Loaded(1));
        let record = &hydrated.records[0];
        assert_eq!(record.main_meter, Some(1200.0));
        assert_eq!(record.households[0].heating, Some(3.5));
        assert_eq!(record.households[0].hot_water, None);
        assert_eq!(record.commercials[0].water, None);
    }

    #[test]
    fn test_file_database_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meter.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            save_records(&store, &[MonthlyRecord::blank("2025-03")]).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let hydrated = load_records(&store).unwrap();
        assert_eq!(hydrated.records.len(), 1);
        assert_eq!(hydrated.records[0].id, "2025-03");
    }
}
