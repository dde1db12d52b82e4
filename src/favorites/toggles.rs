//! Optimistic favorite toggling.
//!
//! The confirmed set mirrors the last snapshot loaded from the store. A toggle
//! flips the movie immediately through a pending overlay, and the store's answer
//! either confirms the overlay or rolls it back. Snapshots that arrive while a
//! toggle is pending replace the confirmed set but never the overlay.

use crate::domain::{Favorite, MovieId, MovieSummary, ReelgridError};
use std::collections::{BTreeMap, BTreeSet};

/// Per-movie toggle lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    /// Shown state equals the store's state.
    Confirmed,
    /// Shown state is `target`; the store has not answered yet.
    OptimisticPending { target: bool },
    /// The last toggle failed and the shown state was restored.
    RolledBack,
}

/// Write the store must perform for a toggle.
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleRequest {
    Add(Favorite),
    Remove(MovieId),
}

#[derive(Debug, Clone)]
struct Pending {
    target: bool,
    favorite: Option<Favorite>,
}

/// The user's favorites as currently shown.
#[derive(Debug, Clone, Default)]
pub struct FavoriteToggles {
    confirmed: BTreeMap<MovieId, Favorite>,
    pending: BTreeMap<MovieId, Pending>,
    rolled_back: BTreeSet<MovieId>,
    loaded: bool,
    load_error: Option<String>,
}

impl FavoriteToggles {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a snapshot has been received from the store.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Why the last snapshot load failed, until a new one arrives.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Records a failed snapshot load. The confirmed set is kept.
    pub fn load_failed(&mut self, message: impl Into<String>) {
        self.load_error = Some(message.into());
    }

    /// Forgets a load failure ahead of another attempt.
    pub fn clear_load_error(&mut self) {
        self.load_error = None;
    }

    /// Shown favorite state of a movie, pending overlays included.
    #[must_use]
    pub fn is_favorite(&self, id: MovieId) -> bool {
        self.pending
            .get(&id)
            .map_or_else(|| self.confirmed.contains_key(&id), |p| p.target)
    }

    #[must_use]
    pub fn state(&self, id: MovieId) -> ToggleState {
        if let Some(p) = self.pending.get(&id) {
            ToggleState::OptimisticPending { target: p.target }
        } else if self.rolled_back.contains(&id) {
            ToggleState::RolledBack
        } else {
            ToggleState::Confirmed
        }
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Flips a movie optimistically and returns the store write to perform.
    ///
    /// Returns `None` while a toggle for the same movie is still pending.
    pub fn toggle(&mut self, movie: &MovieSummary) -> Option<ToggleRequest> {
        if self.pending.contains_key(&movie.id) {
            tracing::debug!(movie_id = movie.id, "toggle ignored while pending");
            return None;
        }
        self.rolled_back.remove(&movie.id);

        let target = !self.is_favorite(movie.id);
        let (favorite, request) = if target {
            let favorite = Favorite::from_summary(movie);
            (Some(favorite.clone()), ToggleRequest::Add(favorite))
        } else {
            (None, ToggleRequest::Remove(movie.id))
        };
        self.pending.insert(movie.id, Pending { target, favorite });

        tracing::debug!(movie_id = movie.id, target, "optimistic favorite toggle");
        Some(request)
    }

    /// Applies the store's answer for a pending toggle.
    ///
    /// A duplicate-favorite rejection means the store already holds the target
    /// state, so it confirms rather than rolls back. Answers for movies without a
    /// pending toggle are ignored.
    pub fn settle(&mut self, id: MovieId, outcome: Result<(), &ReelgridError>) -> ToggleState {
        let Some(pending) = self.pending.remove(&id) else {
            return self.state(id);
        };

        let confirmed = match outcome {
            Ok(()) => true,
            Err(ReelgridError::DuplicateFavorite(_)) if pending.target => true,
            Err(err) => {
                tracing::warn!(movie_id = id, error = %err, "favorite toggle failed, rolling back");
                false
            }
        };

        if !confirmed {
            self.rolled_back.insert(id);
            return ToggleState::RolledBack;
        }

        match (pending.target, pending.favorite) {
            (true, Some(favorite)) => {
                self.confirmed.entry(id).or_insert(favorite);
            }
            _ => {
                self.confirmed.remove(&id);
            }
        }
        ToggleState::Confirmed
    }

    /// Replaces the confirmed set with a fresh snapshot from the store.
    pub fn replace_snapshot(&mut self, favorites: Vec<Favorite>) {
        self.confirmed = favorites.into_iter().map(|f| (f.movie_id, f)).collect();
        self.loaded = true;
        self.load_error = None;
    }

    /// Favorites as shown, newest first.
    #[must_use]
    pub fn list(&self) -> Vec<Favorite> {
        let mut shown: Vec<Favorite> = self
            .confirmed
            .values()
            .filter(|f| self.is_favorite(f.movie_id))
            .cloned()
            .collect();
        shown.extend(
            self.pending
                .iter()
                .filter(|(id, _)| !self.confirmed.contains_key(id))
                .filter_map(|(_, p)| p.favorite.clone()),
        );
        shown.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.title.cmp(&b.title))
        });
        shown
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.list().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
