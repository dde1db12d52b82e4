//! JSON file-based storage backend.
//!
//! A human-readable favorites file written atomically (write-to-temp + rename)
//! so a crash never leaves it half written.
//!
//! # Performance Characteristics
//!
//! - **Read**: O(1) - loads entire file into memory once
//! - **Write**: O(n) - serializes and writes entire dataset

use crate::domain::error::{ReelgridError, Result};
use crate::domain::MovieId;
use crate::storage::backend::FavoriteStore;
use crate::storage::models::FavoriteRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Current on-disk format version.
const FORMAT_VERSION: u32 = 1;

/// JSON storage container format.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageData {
    version: u32,

    /// Favorites keyed by movie id.
    #[serde(default)]
    favorites: BTreeMap<MovieId, FavoriteRecord>,
}

impl Default for StorageData {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            favorites: BTreeMap::new(),
        }
    }
}

/// JSON file storage backend.
///
/// The whole list is kept in memory and persisted after every modification.
///
/// # Thread Safety
///
/// This type is `Send` but not `Sync`. It's designed to be used from a single
/// worker thread, matching the Zellij plugin architecture.
///
/// # File Format
///
/// ```json
/// {
///   "version": 1,
///   "favorites": {
///     "603": {
///       "movie_id": 603,
///       "title": "The Matrix",
///       "poster_path": "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
///       "rating": 8.2,
///       "created_at": 1714564800
///     }
///   }
/// }
/// ```
pub struct JsonStorage {
    file_path: PathBuf,
    data: StorageData,
    dirty: bool,
}

impl JsonStorage {
    /// Creates or opens a JSON storage backend.
    ///
    /// If the file exists, loads existing data. Otherwise starts empty; the
    /// file is created on the first write. Parent directories are created
    /// automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Parent directory creation fails
    /// - File exists but contains invalid JSON
    /// - File permissions prevent reading
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing JSON storage");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            tracing::debug!("initializing new empty storage");
            StorageData::default()
        };

        tracing::debug!(favorite_count = data.favorites.len(), "storage initialized");

        Ok(Self {
            file_path,
            data,
            dirty: false,
        })
    }

    fn load_from_file(path: &Path) -> Result<StorageData> {
        let contents = std::fs::read_to_string(path)?;
        let data: StorageData = serde_json::from_str(&contents)
            .map_err(|e| ReelgridError::Storage(format!("failed to parse JSON: {e}")))?;

        if data.version > FORMAT_VERSION {
            return Err(ReelgridError::Storage(format!(
                "unsupported favorites format version {}",
                data.version
            )));
        }

        tracing::debug!(
            version = data.version,
            favorites = data.favorites.len(),
            "loaded storage data"
        );
        Ok(data)
    }

    /// Saves storage data to disk using atomic write.
    fn save_to_file(&mut self) -> Result<()> {
        if !self.dirty {
            tracing::trace!("skipping save, no changes");
            return Ok(());
        }

        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|e| ReelgridError::Storage(format!("failed to serialize JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        self.dirty = false;
        tracing::debug!(path = ?self.file_path, "storage saved");
        Ok(())
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl FavoriteStore for JsonStorage {
    fn list_favorites(&self) -> Result<Vec<FavoriteRecord>> {
        let _span = tracing::debug_span!("json_list_favorites").entered();

        let mut favorites: Vec<FavoriteRecord> = self.data.favorites.values().cloned().collect();
        favorites.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.movie_id.cmp(&b.movie_id))
        });

        tracing::debug!(count = favorites.len(), "retrieved favorites");
        Ok(favorites)
    }

    fn add_favorite(&mut self, favorite: &FavoriteRecord) -> Result<FavoriteRecord> {
        let _span = tracing::debug_span!("json_add_favorite",
            movie_id = favorite.movie_id,
            title = %favorite.title
        )
        .entered();

        if self.data.favorites.contains_key(&favorite.movie_id) {
            tracing::debug!("favorite already stored");
            return Err(ReelgridError::DuplicateFavorite(favorite.movie_id));
        }

        self.data.favorites.insert(favorite.movie_id, favorite.clone());
        self.dirty = true;
        if let Err(e) = self.save_to_file() {
            self.data.favorites.remove(&favorite.movie_id);
            self.dirty = false;
            return Err(e);
        }

        tracing::debug!("favorite added");
        Ok(favorite.clone())
    }

    fn remove_favorite(&mut self, movie_id: MovieId) -> Result<bool> {
        let _span = tracing::debug_span!("json_remove_favorite", movie_id).entered();

        let Some(removed) = self.data.favorites.remove(&movie_id) else {
            tracing::debug!("favorite not stored, nothing to remove");
            return Ok(false);
        };

        self.dirty = true;
        if let Err(e) = self.save_to_file() {
            self.data.favorites.insert(movie_id, removed);
            self.dirty = false;
            return Err(e);
        }

        tracing::debug!("favorite removed");
        Ok(true)
    }
}

impl Drop for JsonStorage {
    fn drop(&mut self) {
        if self.dirty {
            tracing::debug!("saving dirty data on drop");
            if let Err(e) = self.save_to_file() {
                tracing::error!(error = %e, "failed to save on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(movie_id: MovieId, created_at: i64) -> FavoriteRecord {
        FavoriteRecord {
            movie_id,
            title: format!("Movie {movie_id}"),
            poster_path: None,
            rating: 7.0,
            created_at,
        }
    }

    #[test]
    fn duplicates_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path().join("favorites.json")).unwrap();

        storage.add_favorite(&record(1, 10)).unwrap();
        let err = storage.add_favorite(&record(1, 20)).unwrap_err();
        assert!(matches!(err, ReelgridError::DuplicateFavorite(1)));
        assert_eq!(storage.list_favorites().unwrap().len(), 1);
    }

    #[test]
    fn removing_absent_favorite_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path().join("favorites.json")).unwrap();
        assert!(!storage.remove_favorite(99).unwrap());
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonStorage::new(path), Err(ReelgridError::Storage(_))));
    }

    #[test]
    fn newer_format_versions_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");
        std::fs::write(&path, r#"{"version": 9, "favorites": {}}"#).unwrap();
        assert!(JsonStorage::new(path).is_err());
    }
}
