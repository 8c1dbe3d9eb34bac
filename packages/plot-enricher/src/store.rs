//! File-per-movie JSON storage.
//!
//! Each record lives in `<clean title>-<year>.json` under one directory.
//! Writes go to a sibling temp file that is renamed over the target, so a
//! record on disk is always either the old version or the new one.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::fs;
use tracing::debug;

use crate::error::{EnrichError, Result};
use crate::types::MovieRecord;

static RE_FILENAME_UNSAFE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());

/// File name for a record: `<clean title>-<year>.json`.
///
/// The title keeps word characters, whitespace and hyphens only, is trimmed,
/// and has spaces replaced by hyphens. A missing year becomes `Unknown`.
pub fn record_file_name(title: &str, year: &str) -> String {
    let clean = RE_FILENAME_UNSAFE.replace_all(title, "");
    let clean = clean.trim().replace(' ', "-");
    let year = if year.trim().is_empty() { "Unknown" } else { year.trim() };
    format!("{}-{}.json", clean, year)
}

/// Directory of movie record files.
#[derive(Debug, Clone)]
pub struct MovieStore {
    dir: PathBuf,
}

impl MovieStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sorted snapshot of every `*.json` file in the directory.
    pub async fn list(&self) -> Result<Vec<PathBuf>> {
        if !fs::metadata(&self.dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(EnrichError::StorageDirMissing(self.dir.clone()));
        }

        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| EnrichError::storage(&self.dir, e))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| EnrichError::storage(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") && path.is_file() {
                paths.push(path);
            }
        }

        paths.sort();
        debug!(dir = %self.dir.display(), count = paths.len(), "Listed movie records");
        Ok(paths)
    }

    /// Read and parse one record.
    pub async fn load(&self, path: &Path) -> Result<MovieRecord> {
        let raw = fs::read_to_string(path)
            .await
            .map_err(|e| EnrichError::storage(path, e))?;
        serde_json::from_str(&raw).map_err(|e| EnrichError::json(path, e))
    }

    /// Atomically rewrite one record.
    pub async fn save(&self, path: &Path, record: &MovieRecord) -> Result<()> {
        let json = serde_json::to_string_pretty(record).map_err(|e| EnrichError::json(path, e))?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json.as_bytes())
            .await
            .map_err(|e| EnrichError::storage(&temp_path, e))?;

        if let Err(e) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(EnrichError::storage(path, e));
        }
        Ok(())
    }

    /// Write a record under its derived file name.
    pub async fn insert(&self, record: &MovieRecord) -> Result<PathBuf> {
        let title = record.title().ok_or_else(|| EnrichError::MalformedRecord {
            path: self.dir.clone(),
            reason: "missing title".into(),
        })?;
        let path = self.dir.join(record_file_name(title, &record.year_text()));
        self.save(&path, record).await?;
        Ok(path)
    }

    /// Resolve a record named on the command line.
    ///
    /// Accepts an existing path, a file name inside the store, or a file
    /// stem without the `.json` extension.
    pub async fn resolve(&self, name: &str) -> Result<PathBuf> {
        let direct = PathBuf::from(name);
        let stem = name.strip_suffix(".json").unwrap_or(name);
        let candidates = [
            direct,
            self.dir.join(name),
            self.dir.join(format!("{}.json", stem)),
        ];

        for candidate in candidates {
            if fs::metadata(&candidate)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false)
            {
                return Ok(candidate);
            }
        }

        Err(EnrichError::RecordNotFound(name.to_string()))
    }
}
