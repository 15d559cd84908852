//! Dataset Loader Module
//! Loads delimited files into DataFrames, memoized per path for the
//! lifetime of the process (source files are static for a session).

use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("failed to parse CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Memoized CSV loading with Polars. The cache is populated lazily through
/// [`DatasetCache::load`] and never evicted or invalidated.
pub struct DatasetCache {
    frames: HashMap<PathBuf, DataFrame>,
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetCache {
    pub fn new() -> Self {
        Self {
            frames: HashMap::new(),
        }
    }

    /// Load a CSV file, returning the cached frame when the same path was
    /// loaded before. Types are inferred best-effort from the contents.
    pub fn load(&mut self, path: &Path) -> Result<&DataFrame, LoadError> {
        if !self.frames.contains_key(path) {
            let df = Self::read_csv(path)?;
            info!(
                path = %path.display(),
                rows = df.height(),
                cols = df.width(),
                "loaded dataset"
            );
            self.frames.insert(path.to_path_buf(), df);
        }
        Ok(&self.frames[path])
    }

    /// Read a CSV from disk, bypassing the cache.
    pub fn read_csv(path: &Path) -> Result<DataFrame, LoadError> {
        if !path.exists() {
            return Err(LoadError::FileNotFound(path.to_path_buf()));
        }

        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        Ok(df)
    }

    /// Whether a path has been loaded into the cache.
    pub fn is_cached(&self, path: &Path) -> bool {
        self.frames.contains_key(path)
    }

    /// Number of cached frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_csv_with_inferred_types() {
        let dir = tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "sites.csv",
            "Resource Name,County,Latitude\nA,Kings,40.1\nB,Queens,40.3\n",
        );

        let mut cache = DatasetCache::new();
        let df = cache.load(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
        assert!(df.column("Latitude").unwrap().dtype().is_float());
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempdir().unwrap();
        let mut cache = DatasetCache::new();
        let err = cache.load(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound(_)));
    }

    #[test]
    fn second_load_is_served_from_the_cache() {
        let dir = tempdir().unwrap();
        let path = write_csv(dir.path(), "a.csv", "x\n1\n2\n");

        let mut cache = DatasetCache::new();
        assert_eq!(cache.load(&path).unwrap().height(), 2);
        assert!(cache.is_cached(&path));

        // Rewrite the file on disk; the cached frame must still be served.
        fs::write(&path, "x\n1\n2\n3\n4\n").unwrap();
        assert_eq!(cache.load(&path).unwrap().height(), 2);
        assert_eq!(cache.len(), 1);
    }
}
