//! Durable record store.
//!
//! [`FileStore`] keeps every key in a single JSON object file:
//!
//! ```json
//! {"bestScore":"14","bestTime":"{\"minutes\":1,\"seconds\":5}"}
//! ```
//!
//! Values are the serialized strings the core hands over, stored verbatim.
//! A missing file is an empty store. A file that does not parse is logged and
//! treated as empty; it is replaced on the next write.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tui_memory_core::KeyValueStore;

pub use tui_memory_core as core;

/// String-keyed store persisted to one JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`, reading whatever is there.
    ///
    /// Never fails: a missing file is an empty store, and an unreadable or
    /// malformed one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => parse_entries(&path, &bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                log::warn!("cannot read record store {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        log::debug!("opened record store {} ({} keys)", path.display(), entries.len());
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the whole map: temp file in the same directory, then rename.
    fn persist(&self) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let json = serde_json::to_vec_pretty(&self.entries)?;
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }
}

fn parse_entries(path: &Path, bytes: &[u8]) -> BTreeMap<String, String> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return BTreeMap::new();
    }
    match serde_json::from_slice(bytes) {
        Ok(map) => map,
        Err(e) => {
            log::warn!("ignoring corrupt record store {}: {}", path.display(), e);
            BTreeMap::new()
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tui_memory_core::records::{BEST_SCORE_KEY, BEST_TIME_KEY};
    use tui_memory_core::types::ElapsedTime;
    use tui_memory_core::BestRecord;

    #[test]
    fn missing_file_is_empty_store() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::open(dir.path().join("records.json"));
        assert!(store.is_empty());
        assert_eq!(store.get(BEST_SCORE_KEY), None);
    }

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("records.json");

        let mut store = FileStore::open(&path);
        store.set(BEST_SCORE_KEY, "14").unwrap();
        store
            .set(BEST_TIME_KEY, r#"{"minutes":1,"seconds":5}"#)
            .unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.len(), 2);
        let rec = BestRecord::load(&reopened);
        assert_eq!(rec.moves, Some(14));
        assert_eq!(rec.time, Some(ElapsedTime::new(1, 5)));
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn corrupt_file_is_treated_as_empty_and_replaced() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("records.json");
        fs::write(&path, "{ not json").expect("Write failed");

        let mut store = FileStore::open(&path);
        assert!(store.is_empty());

        store.set(BEST_SCORE_KEY, "9").unwrap();
        let text = fs::read_to_string(&path).expect("Read failed");
        let map: BTreeMap<String, String> = serde_json::from_str(&text).unwrap();
        assert_eq!(map.get(BEST_SCORE_KEY).map(String::as_str), Some("9"));
    }

    #[test]
    fn invalid_utf8_file_is_treated_as_empty() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("records.json");
        fs::write(&path, [0xff, 0xfe, b'{', b'}']).expect("Write failed");

        let mut store = FileStore::open(&path);
        assert!(store.is_empty());
        assert_eq!(BestRecord::load(&store), BestRecord::default());

        store.set(BEST_SCORE_KEY, "12").unwrap();
        assert_eq!(FileStore::open(&path).get(BEST_SCORE_KEY).as_deref(), Some("12"));
    }

    #[test]
    fn unreadable_path_is_treated_as_empty() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        // A directory cannot be read as a file.
        let store = FileStore::open(dir.path());
        assert!(store.is_empty());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("deeper").join("records.json");

        let mut store = FileStore::open(&path);
        store.set(BEST_SCORE_KEY, "3").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn empty_file_is_empty_store() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("records.json");
        fs::write(&path, "").expect("Write failed");
        assert!(FileStore::open(&path).is_empty());
    }

    #[test]
    fn tmp_path_sits_next_to_target() {
        let p = Path::new("/data/tui-memory/records.json");
        assert_eq!(tmp_path(p), PathBuf::from("/data/tui-memory/records.json.tmp"));
    }
}
