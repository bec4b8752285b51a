//! Dataset Cache
//! Memoizes loaded datasets per source file identity (path, size, mtime).

use crate::data::loader::{DataLoader, Datasets, LoaderError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
}

impl FileStamp {
    fn of(path: &Path) -> Result<Self, LoaderError> {
        let meta = fs::metadata(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

struct CacheEntry {
    stamps: Vec<FileStamp>,
    datasets: Arc<Datasets>,
}

/// Owns the loader and the last successful load.
///
/// Created once at startup. `get` only re-reads when a source file changed
/// or after `invalidate`.
pub struct DatasetCache {
    loader: DataLoader,
    entry: Option<CacheEntry>,
}

impl DatasetCache {
    pub fn new(loader: DataLoader) -> Self {
        Self {
            loader,
            entry: None,
        }
    }

    pub fn loader(&self) -> &DataLoader {
        &self.loader
    }

    /// Return the cached datasets if the sources are unchanged, loading otherwise.
    pub fn get(&mut self) -> Result<Arc<Datasets>, LoaderError> {
        let stamps = self
            .loader
            .source_paths()
            .iter()
            .map(|path| FileStamp::of(path))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(entry) = &self.entry {
            if entry.stamps == stamps {
                debug!("dataset cache hit");
                return Ok(Arc::clone(&entry.datasets));
            }
            info!("source files changed, reloading");
        }

        let datasets = Arc::new(self.loader.load()?);
        self.entry = Some(CacheEntry {
            stamps,
            datasets: Arc::clone(&datasets),
        });
        Ok(datasets)
    }

    /// Drop the cached result; the next `get` reloads from disk.
    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            info!("dataset cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::{fixture_loader, USD_CSV};
    use crate::data::ParsePolicy;
    use tempfile::TempDir;

    #[test]
    fn test_unchanged_files_hit_cache() {
        let dir = TempDir::new().unwrap();
        let mut cache = DatasetCache::new(fixture_loader(dir.path(), ParsePolicy::Abort));

        let first = cache.get().unwrap();
        let second = cache.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.entry.is_some());
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let dir = TempDir::new().unwrap();
        let mut cache = DatasetCache::new(fixture_loader(dir.path(), ParsePolicy::Abort));

        let first = cache.get().unwrap();
        cache.invalidate();
        assert!(cache.entry.is_none());

        let second = cache.get().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[test]
    fn test_changed_file_is_reloaded() {
        let dir = TempDir::new().unwrap();
        let mut cache = DatasetCache::new(fixture_loader(dir.path(), ParsePolicy::Abort));
        let first = cache.get().unwrap();
        assert_eq!(first.usd.len(), 3);

        let appended = format!("{USD_CSV}2023-01-05,1255.0\n");
        fs::write(dir.path().join("USD_KRW.csv"), appended).unwrap();

        let second = cache.get().unwrap();
        assert_eq!(second.usd.len(), 4);
        assert_eq!(first.cpi, second.cpi);
    }

    #[test]
    fn test_failed_load_keeps_nothing() {
        let dir = TempDir::new().unwrap();
        let mut cache = DatasetCache::new(fixture_loader(dir.path(), ParsePolicy::Abort));
        fs::write(dir.path().join("EUR_KRW.csv"), "Date,Rate\n2023-01-02,1.0\n").unwrap();

        assert!(cache.get().is_err());
        assert!(cache.entry.is_none());
    }
}
