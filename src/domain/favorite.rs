//! Favorite movie model.

use super::movie::{MovieId, MovieSummary};
use serde::{Deserialize, Serialize};

/// A movie the user saved to their favorites list.
///
/// Favorites carry enough of the movie summary to render a card without
/// refetching anything from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub movie_id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    pub rating: f32,
    /// Unix timestamp when the favorite was created.
    pub created_at: i64,
}

impl Favorite {
    /// Builds a favorite from a grid card, stamped with the current time.
    #[must_use]
    pub fn from_summary(movie: &MovieSummary) -> Self {
        Self {
            movie_id: movie.id,
            title: movie.title.clone(),
            poster_path: movie.poster_path.clone(),
            rating: movie.rating,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Card representation used by the favorites grid.
    #[must_use]
    pub fn to_summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.movie_id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            rating: self.rating,
            release_date: None,
            overview: String::new(),
        }
    }
}
