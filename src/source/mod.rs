//! Raw record acquisition
//!
//! A [`RecordSource`] produces a table matching the input schema or fails.
//! Sources receive all of their settings at construction.

use crate::error::Result;
use crate::schema::validate_schema;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Anything that can produce the raw property table
pub trait RecordSource {
    fn fetch(&self) -> Result<DataFrame>;
}

/// Read a headed CSV file, inferring column types
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(10_000))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

/// Write a table as a headed CSV file, creating parent directories
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df.clone())?;
    Ok(())
}

/// Property records stored in a CSV flat file
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for CsvSource {
    fn fetch(&self) -> Result<DataFrame> {
        let df = read_csv(&self.path)?;
        validate_schema(&df)?;
        info!(path = %self.path.display(), rows = df.height(), "Loaded property records");
        Ok(df)
    }
}

/// Serves a local CSV copy of another source's records.
///
/// When caching is enabled and the cache file exists it is read instead of
/// the inner source; otherwise the inner source is fetched and the cache
/// file is (re)written.
#[derive(Debug, Clone)]
pub struct CachedSource<S> {
    inner: S,
    cache_path: PathBuf,
    use_cache: bool,
}

impl<S: RecordSource> CachedSource<S> {
    pub fn new(inner: S, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            cache_path: cache_path.into(),
            use_cache: true,
        }
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }
}

impl<S: RecordSource> RecordSource for CachedSource<S> {
    fn fetch(&self) -> Result<DataFrame> {
        if self.use_cache && self.cache_path.is_file() {
            let df = read_csv(&self.cache_path)?;
            validate_schema(&df)?;
            info!(cache = %self.cache_path.display(), rows = df.height(), "Read cached records");
            return Ok(df);
        }

        let df = self.inner.fetch()?;
        write_csv(&df, &self.cache_path)?;
        info!(cache = %self.cache_path.display(), rows = df.height(), "Wrote record cache");
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrepError;
    use crate::schema::INPUT_COLUMNS;
    use std::cell::Cell;

    const ROW: &str = "101,2.0,3.0,2.0,1000.0,6037.0,34123456,-118123456,6000.0,10000.0,4000.0,500.0,1.0,261,Single Family Residential";

    fn write_raw_csv(dir: &Path) -> PathBuf {
        let path = dir.join("raw.csv");
        std::fs::write(&path, format!("{}\n{}\n", INPUT_COLUMNS.join(","), ROW)).unwrap();
        path
    }

    struct CountingSource {
        df: DataFrame,
        calls: Cell<usize>,
    }

    impl RecordSource for CountingSource {
        fn fetch(&self) -> Result<DataFrame> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.df.clone())
        }
    }

    #[test]
    fn test_csv_source_reads_schema() {
        let dir = tempfile::tempdir().unwrap();
        let df = CsvSource::new(write_raw_csv(dir.path())).fetch().unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), INPUT_COLUMNS.len());
    }

    #[test]
    fn test_csv_source_rejects_partial_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.csv");
        std::fs::write(&path, "parcelid,bathroomcnt\n1,2.0\n").unwrap();

        let err = CsvSource::new(path).fetch().unwrap_err();
        assert!(matches!(err, PrepError::SchemaMismatch(_)));
    }

    #[test]
    fn test_cached_source_reuses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let raw = CsvSource::new(write_raw_csv(dir.path())).fetch().unwrap();
        let inner = CountingSource {
            df: raw,
            calls: Cell::new(0),
        };

        let cached = CachedSource::new(inner, dir.path().join("cache/records.csv"));
        assert_eq!(cached.fetch().unwrap().height(), 1);
        assert_eq!(cached.fetch().unwrap().height(), 1);
        assert_eq!(cached.inner.calls.get(), 1);
    }

    #[test]
    fn test_cached_source_refreshes_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let raw = CsvSource::new(write_raw_csv(dir.path())).fetch().unwrap();
        let inner = CountingSource {
            df: raw,
            calls: Cell::new(0),
        };

        let cached = CachedSource::new(inner, dir.path().join("records.csv")).with_cache(false);
        cached.fetch().unwrap();
        cached.fetch().unwrap();
        assert_eq!(cached.inner.calls.get(), 2);
    }
}
