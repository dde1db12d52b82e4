//! Storage record models for persistence layer.
//!
//! Records are kept separate from the domain [`Favorite`] so the file format can
//! evolve without touching UI code.

use crate::domain::{Favorite, MovieId};
use serde::{Deserialize, Serialize};

/// A favorite as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    pub movie_id: MovieId,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,

    #[serde(default)]
    pub rating: f32,

    /// Unix timestamp when the favorite was stored.
    pub created_at: i64,
}

impl From<&Favorite> for FavoriteRecord {
    fn from(favorite: &Favorite) -> Self {
        Self {
            movie_id: favorite.movie_id,
            title: favorite.title.clone(),
            poster_path: favorite.poster_path.clone(),
            rating: favorite.rating,
            created_at: favorite.created_at,
        }
    }
}

impl From<FavoriteRecord> for Favorite {
    fn from(record: FavoriteRecord) -> Self {
        Self {
            movie_id: record.movie_id,
            title: record.title,
            poster_path: record.poster_path,
            rating: record.rating,
            created_at: record.created_at,
        }
    }
}
