// ── Sort preference persistence ──
//
// Each table's ordering survives restarts in an opaque string slot.
// Storage failures are logged and otherwise ignored: a broken
// preference file must never stop the console from working.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::sort::TableSort;

/// Slot holding the proxy table ordering.
pub const PROXY_SORT_SLOT: &str = "pgw.sort.proxies";
/// Slot holding the mapping table ordering.
pub const MAPPING_SORT_SLOT: &str = "pgw.sort.mappings";

/// Current record schema. Records with another version are ignored.
pub const SORT_RECORD_VERSION: u32 = 1;

/// Opaque key-value blob storage.
pub trait PreferenceStore: Send + Sync {
    fn load(&self, slot: &str) -> Option<String>;
    fn save(&self, slot: &str, blob: &str);
}

/// What goes into a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortRecord {
    pub version: u32,
    pub key: String,
    pub ascending: bool,
}

/// Read a table's ordering, falling back to the default on any problem.
pub fn load_table_sort<K>(store: &dyn PreferenceStore, slot: &str) -> TableSort<K>
where
    K: FromStr + Default + Copy + Eq,
{
    let Some(blob) = store.load(slot) else {
        return TableSort::default();
    };

    let record: SortRecord = match serde_json::from_str(&blob) {
        Ok(r) => r,
        Err(e) => {
            warn!(slot, error = %e, "ignoring malformed sort preference");
            return TableSort::default();
        }
    };

    if record.version != SORT_RECORD_VERSION {
        warn!(slot, version = record.version, "ignoring sort preference with unknown version");
        return TableSort::default();
    }

    match record.key.parse::<K>() {
        Ok(key) => TableSort::new(key, record.ascending),
        Err(_) => {
            warn!(slot, key = %record.key, "ignoring sort preference with unknown key");
            TableSort::default()
        }
    }
}

/// Persist a table's ordering.
pub fn save_table_sort<K: AsRef<str>>(store: &dyn PreferenceStore, slot: &str, sort: &TableSort<K>) {
    let record = SortRecord {
        version: SORT_RECORD_VERSION,
        key: sort.key.as_ref().to_owned(),
        ascending: sort.ascending,
    };
    match serde_json::to_string(&record) {
        Ok(blob) => store.save(slot, &blob),
        Err(e) => warn!(slot, error = %e, "failed to encode sort preference"),
    }
}

// ── In-memory store ────────────────────────────────────────────────

/// Process-local slots. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    slots: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a slot.
    pub fn with_slot(self, slot: &str, blob: &str) -> Self {
        self.save(slot, blob);
        self
    }
}

impl PreferenceStore for MemoryPreferences {
    fn load(&self, slot: &str) -> Option<String> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(slot)
            .cloned()
    }

    fn save(&self, slot: &str, blob: &str) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(slot.to_owned(), blob.to_owned());
    }
}

// ── JSON file store ────────────────────────────────────────────────

/// All slots in one JSON object on disk.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// `prefs.json` in the platform data directory.
    pub fn default_location() -> Option<Self> {
        let dirs = directories::ProjectDirs::from("", "", "pgw")?;
        Some(Self::new(dirs.data_dir().join("prefs.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "cannot read preferences");
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "preferences file is not valid JSON");
            BTreeMap::new()
        })
    }

    fn write_all(&self, slots: &BTreeMap<String, String>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(slots).map_err(std::io::Error::other)?;
        std::fs::write(&self.path, json)
    }
}

impl PreferenceStore for FilePreferences {
    fn load(&self, slot: &str) -> Option<String> {
        self.read_all().remove(slot)
    }

    fn save(&self, slot: &str, blob: &str) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut slots = self.read_all();
        slots.insert(slot.to_owned(), blob.to_owned());
        match self.write_all(&slots) {
            Ok(()) => debug!(slot, path = %self.path.display(), "saved preference"),
            Err(e) => warn!(slot, path = %self.path.display(), error = %e, "cannot save preferences"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::{MappingSortKey, ProxySortKey};

    #[test]
    fn missing_slot_gives_default() {
        let store = MemoryPreferences::new();
        let sort: TableSort<ProxySortKey> = load_table_sort(&store, PROXY_SORT_SLOT);
        assert_eq!(sort, TableSort::new(ProxySortKey::Address, true));
    }

    #[test]
    fn malformed_records_give_default() {
        for blob in [
            "not json",
            r#"{"version":1}"#,
            r#"{"version":99,"key":"port","ascending":false}"#,
            r#"{"version":1,"key":"nonsense","ascending":false}"#,
            r#"["client", false]"#,
        ] {
            let store = MemoryPreferences::new().with_slot(MAPPING_SORT_SLOT, blob);
            let sort: TableSort<MappingSortKey> = load_table_sort(&store, MAPPING_SORT_SLOT);
            assert_eq!(sort, TableSort::new(MappingSortKey::Client, true), "blob: {blob}");
        }
    }

    #[test]
    fn save_then_load() {
        let store = MemoryPreferences::new();
        save_table_sort(&store, PROXY_SORT_SLOT, &TableSort::new(ProxySortKey::Latency, false));

        let blob = store.load(PROXY_SORT_SLOT).unwrap_or_default();
        assert!(blob.contains("\"key\":\"latency\""));

        let sort: TableSort<ProxySortKey> = load_table_sort(&store, PROXY_SORT_SLOT);
        assert_eq!(sort, TableSort::new(ProxySortKey::Latency, false));
    }

    #[test]
    fn file_store_keeps_other_slots() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let path = dir.path().join("nested").join("prefs.json");
        let store = FilePreferences::new(&path);

        assert!(store.load(PROXY_SORT_SLOT).is_none());
        store.save(PROXY_SORT_SLOT, "a");
        store.save(MAPPING_SORT_SLOT, "b");

        let reopened = FilePreferences::new(&path);
        assert_eq!(reopened.load(PROXY_SORT_SLOT).as_deref(), Some("a"));
        assert_eq!(reopened.load(MAPPING_SORT_SLOT).as_deref(), Some("b"));
    }

    #[test]
    fn corrupt_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{{{").unwrap_or_else(|e| panic!("write: {e}"));

        let store = FilePreferences::new(&path);
        assert!(store.load(PROXY_SORT_SLOT).is_none());
        store.save(PROXY_SORT_SLOT, "fresh");
        assert_eq!(store.load(PROXY_SORT_SLOT).as_deref(), Some("fresh"));
    }
}
