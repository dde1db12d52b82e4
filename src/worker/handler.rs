//! Worker thread implementation for the favorites store.
//!
//! The worker is the single writer of the favorites file, so concurrent toggles
//! from the UI are serialized by the worker's message queue. Every request gets
//! exactly one response, errors included, so the UI can settle its optimistic
//! state.

use crate::domain::error::{ReelgridError, Result};
use crate::domain::{Favorite, MovieId};
use crate::infrastructure::paths;
use crate::storage::{FavoriteRecord, FavoriteStore, JsonStorage};
use crate::worker::{WorkerMessage, WorkerResponse};
use serde::{Deserialize, Serialize};
use zellij_tile::prelude::{PluginMessage, ZellijWorker};
use zellij_tile::shim::post_message_to_plugin;

/// File name of the favorites store inside the plugin data directory.
pub const FAVORITES_FILE: &str = "favorites.json";

/// Worker state. The store is opened lazily on the first message.
#[derive(Serialize, Deserialize, Default)]
pub struct FavoritesWorker {
    #[serde(skip)]
    storage: Option<Box<dyn FavoriteStore>>,
}

impl FavoritesWorker {
    /// Opens the JSON store in the plugin data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be initialized.
    pub fn open_default() -> Result<Self> {
        let path = paths::get_data_dir().join(FAVORITES_FILE);
        Ok(Self::with_store(Box::new(JsonStorage::new(path)?)))
    }

    /// Creates a worker over an already opened store.
    #[must_use]
    pub fn with_store(storage: Box<dyn FavoriteStore>) -> Self {
        Self {
            storage: Some(storage),
        }
    }

    fn store(&mut self) -> Result<&mut Box<dyn FavoriteStore>> {
        self.storage
            .as_mut()
            .ok_or_else(|| ReelgridError::Worker("Storage not initialized".to_string()))
    }

    /// Maps a storage result to a response with consistent logging.
    fn respond<T, F>(
        operation: &str,
        movie_id: Option<MovieId>,
        result: Result<T>,
        on_success: F,
    ) -> WorkerResponse
    where
        F: FnOnce(T) -> WorkerResponse,
    {
        match result {
            Ok(value) => {
                tracing::debug!(operation, "storage operation successful");
                on_success(value)
            }
            Err(ReelgridError::DuplicateFavorite(id)) => {
                tracing::debug!(operation, movie_id = id, "favorite already stored");
                WorkerResponse::AlreadyFavorite { movie_id: id }
            }
            Err(e) => {
                tracing::warn!(operation, error = %e, "storage operation failed");
                WorkerResponse::Error {
                    movie_id,
                    message: format!("{operation}: {e}"),
                }
            }
        }
    }

    fn handle_load_favorites(&mut self) -> WorkerResponse {
        Self::respond(
            "load favorites",
            None,
            self.store().and_then(|s| s.list_favorites()),
            |records| WorkerResponse::FavoritesLoaded {
                favorites: records.into_iter().map(Favorite::from).collect(),
            },
        )
    }

    fn handle_add_favorite(&mut self, favorite: &Favorite) -> WorkerResponse {
        let record = FavoriteRecord::from(favorite);
        Self::respond(
            "add favorite",
            Some(favorite.movie_id),
            self.store().and_then(|s| s.add_favorite(&record)),
            |stored| WorkerResponse::FavoriteAdded {
                favorite: stored.into(),
            },
        )
    }

    fn handle_remove_favorite(&mut self, movie_id: MovieId) -> WorkerResponse {
        Self::respond(
            "remove favorite",
            Some(movie_id),
            self.store().and_then(|s| s.remove_favorite(movie_id)),
            |removed| WorkerResponse::FavoriteRemoved { movie_id, removed },
        )
    }

    /// Attaches the parent trace context from a message to the current thread.
    ///
    /// Returns a context guard that must be held for the duration of the operation.
    fn attach_parent_trace_context(message: &WorkerMessage) -> Option<opentelemetry::ContextGuard> {
        use opentelemetry::trace::{
            SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState,
        };

        let trace_context = message.trace_context()?;
        let trace_id = TraceId::from_hex(&trace_context.trace_id).ok()?;
        let span_id = SpanId::from_hex(&trace_context.parent_span_id).ok()?;

        let span_context = SpanContext::new(
            trace_id,
            span_id,
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );
        let otel_context = opentelemetry::Context::current().with_remote_span_context(span_context);
        Some(otel_context.attach())
    }

    /// Processes a worker message and returns its response.
    pub fn handle_message(&mut self, message: WorkerMessage) -> WorkerResponse {
        let _context_guard = Self::attach_parent_trace_context(&message);

        let span = tracing::debug_span!("worker_handle_message", movie_id = ?message.movie_id());
        let _guard = span.entered();

        match message {
            WorkerMessage::LoadFavorites { .. } => self.handle_load_favorites(),
            WorkerMessage::AddFavorite { favorite, .. } => self.handle_add_favorite(&favorite),
            WorkerMessage::RemoveFavorite { movie_id, .. } => self.handle_remove_favorite(movie_id),
        }
    }

    fn post(name: String, response: &WorkerResponse) {
        match serde_json::to_string(response) {
            Ok(payload) => post_message_to_plugin(PluginMessage {
                name,
                payload,
                worker_name: None,
            }),
            Err(e) => tracing::error!(error = %e, "failed to serialize worker response"),
        }
    }
}

/// Tracks whether worker tracing has been initialized.
static WORKER_TRACING_INITIALIZED: std::sync::atomic::AtomicBool =
    std::sync::atomic::AtomicBool::new(false);

impl ZellijWorker<'_> for FavoritesWorker {
    /// Handles one message from the plugin.
    ///
    /// `payload` is a JSON `WorkerMessage`; the response is posted back under the
    /// same message name.
    fn on_message(&mut self, message: String, payload: String) {
        if !WORKER_TRACING_INITIALIZED.swap(true, std::sync::atomic::Ordering::Relaxed) {
            crate::observability::init_tracing(&crate::Config::default());
        }

        let worker_message: WorkerMessage = match serde_json::from_str(&payload) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!(error = %e, "failed to deserialize worker message");
                return;
            }
        };

        if self.storage.is_none() {
            match Self::open_default() {
                Ok(worker) => self.storage = worker.storage,
                Err(e) => {
                    tracing::error!(error = %e, "failed to initialize storage");
                    let response = WorkerResponse::Error {
                        movie_id: worker_message.movie_id(),
                        message: format!("Failed to initialize storage: {e}"),
                    };
                    Self::post(message, &response);
                    return;
                }
            }
        }

        let response = self.handle_message(worker_message);
        Self::post(message, &response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn favorite(movie_id: MovieId) -> Favorite {
        Favorite {
            movie_id,
            title: format!("Movie {movie_id}"),
            poster_path: Some("/p.jpg".into()),
            rating: 8.0,
            created_at: 1_700_000_000 + i64::try_from(movie_id).unwrap(),
        }
    }

    fn worker(dir: &tempfile::TempDir) -> FavoritesWorker {
        let store = JsonStorage::new(dir.path().join(FAVORITES_FILE)).unwrap();
        FavoritesWorker::with_store(Box::new(store))
    }

    #[test]
    fn add_then_load_returns_the_favorite() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = worker(&dir);

        let added = w.handle_message(WorkerMessage::add_favorite(favorite(603)));
        assert_eq!(added, WorkerResponse::FavoriteAdded { favorite: favorite(603) });

        let loaded = w.handle_message(WorkerMessage::load_favorites());
        assert_eq!(
            loaded,
            WorkerResponse::FavoritesLoaded {
                favorites: vec![favorite(603)]
            }
        );
    }

    #[test]
    fn duplicate_add_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = worker(&dir);
        w.handle_message(WorkerMessage::add_favorite(favorite(1)));
        let again = w.handle_message(WorkerMessage::add_favorite(favorite(1)));
        assert_eq!(again, WorkerResponse::AlreadyFavorite { movie_id: 1 });
    }

    #[test]
    fn remove_reports_whether_anything_changed() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = worker(&dir);
        w.handle_message(WorkerMessage::add_favorite(favorite(2)));

        assert_eq!(
            w.handle_message(WorkerMessage::remove_favorite(2)),
            WorkerResponse::FavoriteRemoved { movie_id: 2, removed: true }
        );
        assert_eq!(
            w.handle_message(WorkerMessage::remove_favorite(2)),
            WorkerResponse::FavoriteRemoved { movie_id: 2, removed: false }
        );
    }

    #[test]
    fn uninitialized_worker_answers_with_an_error() {
        let mut w = FavoritesWorker::default();
        let response = w.handle_message(WorkerMessage::remove_favorite(5));
        assert!(matches!(
            response,
            WorkerResponse::Error { movie_id: Some(5), .. }
        ));
    }
}
