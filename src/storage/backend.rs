//! Storage backend abstraction.
//!
//! [`FavoriteStore`] is the favorites contract: list, create (rejecting
//! duplicates) and delete by movie id. Each method maps directly to one worker
//! message.

use crate::domain::error::Result;
use crate::domain::MovieId;
use crate::storage::models::FavoriteRecord;

/// Abstraction over persistent favorites backends.
///
/// # Implementations
///
/// - [`JsonStorage`](crate::storage::JsonStorage): JSON file with atomic writes (default)
///
/// # Examples
///
/// ```no_run
/// use reelgrid::storage::{FavoriteStore, JsonStorage};
/// use std::path::PathBuf;
///
/// let storage = JsonStorage::new(PathBuf::from("/tmp/favorites.json"))?;
/// let favorites = storage.list_favorites()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait FavoriteStore: Send {
    /// Returns every favorite, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read operation fails.
    fn list_favorites(&self) -> Result<Vec<FavoriteRecord>>;

    /// Stores a new favorite and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`ReelgridError::DuplicateFavorite`](crate::domain::ReelgridError::DuplicateFavorite)
    /// if the movie is already stored, or an error if persisting fails.
    fn add_favorite(&mut self, favorite: &FavoriteRecord) -> Result<FavoriteRecord>;

    /// Deletes the favorite for `movie_id`.
    ///
    /// Returns whether a record was removed; removing an absent favorite is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting fails.
    fn remove_favorite(&mut self, movie_id: MovieId) -> Result<bool>;
}
