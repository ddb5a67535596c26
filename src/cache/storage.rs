//! File-backed cache storage
//!
//! Whole-file read, whole-file overwrite. Writes go through a temp file and
//! rename so a failed write leaves the prior content untouched. No locking:
//! single process, last-writer-wins.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::error::CacheError;

type Result<T> = std::result::Result<T, CacheError>;

/// File-per-key cache store rooted at an app-private directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open or create the store at the default data location
    /// (`~/.local/share/rollcall` on Linux).
    pub fn open() -> Result<Self> {
        Self::open_at(&Self::data_dir()?)
    }

    /// Get the default cache directory path
    pub fn data_dir() -> Result<PathBuf> {
        let base = dirs::data_dir().ok_or(CacheError::NoDataDir)?;
        Ok(base.join("rollcall"))
    }

    /// Open the store at a specific directory (for testing)
    pub fn open_at(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .map_err(|e| CacheError::Io(format!("Failed to create cache dir: {}", e)))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// The directory backing this store
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Overwrite the full content of `key`. Returns false on any error,
    /// leaving prior content in place.
    pub fn write(&self, key: &str, content: &str) -> bool {
        let tmp = self.dir.join(format!(".{}.tmp", key));
        let path = self.dir.join(key);

        if let Err(e) = std::fs::write(&tmp, content) {
            log::error!("Failed to write cache temp file for {}: {}", key, e);
            let _ = std::fs::remove_file(&tmp);
            return false;
        }
        if let Err(e) = std::fs::rename(&tmp, &path) {
            log::error!("Failed to commit cache file {}: {}", key, e);
            let _ = std::fs::remove_file(&tmp);
            return false;
        }
        log::debug!("Saved cache to {}", path.display());
        true
    }

    /// Read the content of `key`, or `None` if absent or unreadable.
    pub fn read(&self, key: &str) -> Option<String> {
        let path = self.dir.join(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                if path.exists() {
                    log::warn!("Failed to read cache file {}: {}", key, e);
                } else {
                    log::debug!("Cache file {} does not exist", key);
                }
                None
            }
        }
    }

    pub fn exists(&self, key: &str) -> bool {
        self.dir.join(key).exists()
    }

    /// File metadata for `key`, or `None` if absent.
    pub fn file_info(&self, key: &str) -> Option<CacheFileInfo> {
        let path = self.dir.join(key);
        let meta = std::fs::metadata(&path).ok()?;
        let last_modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        Some(CacheFileInfo {
            path,
            size: meta.len(),
            last_modified,
        })
    }

    /// Delete every cache file in the store directory.
    pub fn clear_all(&self) -> Result<ClearStats> {
        let mut removed = 0usize;
        let entries = std::fs::read_dir(&self.dir)
            .map_err(|e| CacheError::Io(format!("Failed to list cache dir: {}", e)))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_file() {
                match std::fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
                }
            }
        }

        Ok(ClearStats {
            entries_removed: removed,
        })
    }
}

/// Metadata for a single cache file
#[derive(Debug, Clone)]
pub struct CacheFileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub last_modified: i64,
}

/// Statistics about a cache clear operation
#[derive(Debug)]
pub struct ClearStats {
    pub entries_removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (FileStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open_at(dir.path()).unwrap();
        (store, dir)
    }

    #[test]
    fn write_then_read_round_trips_bytes() {
        let (store, _dir) = test_store();
        let content = r#"{"data":[1,2,3],"msg":"操作成功"}"#;

        assert!(store.write("weekly.json", content));
        assert_eq!(store.read("weekly.json").as_deref(), Some(content));
    }

    #[test]
    fn read_missing_key_is_none() {
        let (store, _dir) = test_store();
        assert_eq!(store.read("absent.json"), None);
        assert!(!store.exists("absent.json"));
    }

    #[test]
    fn write_overwrites_fully() {
        let (store, _dir) = test_store();
        store.write("k.json", "first version with a long tail");
        store.write("k.json", "second");
        assert_eq!(store.read("k.json").as_deref(), Some("second"));
    }

    #[test]
    fn write_leaves_no_temp_files() {
        let (store, dir) = test_store();
        store.write("k.json", "content");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn file_info_reports_size() {
        let (store, _dir) = test_store();
        store.write("k.json", "12345");
        let info = store.file_info("k.json").unwrap();
        assert_eq!(info.size, 5);
        assert!(info.path.ends_with("k.json"));
        assert!(store.file_info("absent.json").is_none());
    }

    #[test]
    fn clear_all_removes_entries() {
        let (store, _dir) = test_store();
        store.write("a.json", "a");
        store.write("b.json", "b");

        let stats = store.clear_all().unwrap();
        assert_eq!(stats.entries_removed, 2);
        assert!(store.read("a.json").is_none());
        assert!(store.read("b.json").is_none());
    }
}
