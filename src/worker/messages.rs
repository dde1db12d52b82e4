//! Worker thread message types for cross-thread communication.
//!
//! This module defines the request and response protocol between the main plugin
//! thread and the background worker that owns the favorites store. It also
//! implements distributed tracing context propagation across thread boundaries.

use crate::domain::{Favorite, MovieId};
use serde::{Deserialize, Serialize};

/// Distributed tracing context for cross-thread span propagation.
///
/// Captures the current trace and span IDs from OpenTelemetry to maintain
/// trace continuity when passing messages to the worker thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Parent span ID for linking spans across threads.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Creates a trace context from the current tracing span.
    ///
    /// Returns `None` if the current span context is invalid or not sampled.
    #[must_use]
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let span = tracing::Span::current();
        let otel_context = span.context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            tracing::trace!("span context is not valid");
            return None;
        }

        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }
}

/// Generates constructors that attach the current trace context to each
/// `WorkerMessage` variant.
macro_rules! worker_message_builders {
    (
        $(
            $builder_name:ident($variant:ident { $($field:ident: $ty:ty),* $(,)? })
        ),* $(,)?
    ) => {
        impl WorkerMessage {
            $(
                #[doc = concat!("Create a ", stringify!($variant), " message with current trace context")]
                #[must_use]
                pub fn $builder_name($($field: $ty),*) -> Self {
                    Self::$variant {
                        $($field,)*
                        trace_context: TraceContext::from_current(),
                    }
                }
            )*
        }
    };
}

worker_message_builders! {
    load_favorites(LoadFavorites {}),
    add_favorite(AddFavorite { favorite: Favorite }),
    remove_favorite(RemoveFavorite { movie_id: MovieId }),
}

/// Messages sent from the main thread to the worker thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerMessage {
    /// Read every stored favorite.
    LoadFavorites {
        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Store a new favorite; duplicates are rejected.
    AddFavorite {
        favorite: Favorite,

        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },

    /// Delete the favorite for a movie.
    RemoveFavorite {
        movie_id: MovieId,

        #[serde(skip_serializing_if = "Option::is_none")]
        trace_context: Option<TraceContext>,
    },
}

impl WorkerMessage {
    /// Trace context carried by any variant.
    #[must_use]
    pub const fn trace_context(&self) -> Option<&TraceContext> {
        match self {
            Self::LoadFavorites { trace_context }
            | Self::AddFavorite { trace_context, .. }
            | Self::RemoveFavorite { trace_context, .. } => trace_context.as_ref(),
        }
    }

    /// Movie the message writes, if any.
    #[must_use]
    pub const fn movie_id(&self) -> Option<MovieId> {
        match self {
            Self::LoadFavorites { .. } => None,
            Self::AddFavorite { favorite, .. } => Some(favorite.movie_id),
            Self::RemoveFavorite { movie_id, .. } => Some(*movie_id),
        }
    }
}

/// Responses sent from the worker thread back to the main thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerResponse {
    /// Every stored favorite, newest first.
    FavoritesLoaded { favorites: Vec<Favorite> },

    /// The favorite was stored.
    FavoriteAdded { favorite: Favorite },

    /// The favorite is gone; `removed` is false if it was never stored.
    FavoriteRemoved { movie_id: MovieId, removed: bool },

    /// The movie was already stored.
    AlreadyFavorite { movie_id: MovieId },

    /// The operation failed. `movie_id` names the write that failed, if any.
    Error {
        #[serde(default)]
        movie_id: Option<MovieId>,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_survive_the_json_channel() {
        let message = WorkerMessage::RemoveFavorite {
            movie_id: 603,
            trace_context: Some(TraceContext {
                trace_id: "0af7651916cd43dd8448eb211c80319c".into(),
                parent_span_id: "b7ad6b7169203331".into(),
            }),
        };
        let json = serde_json::to_string(&message).unwrap();
        let back: WorkerMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
        assert_eq!(back.movie_id(), Some(603));
        assert!(back.trace_context().is_some());
    }

    #[test]
    fn missing_trace_context_is_omitted() {
        let json = serde_json::to_string(&WorkerMessage::LoadFavorites { trace_context: None }).unwrap();
        assert!(!json.contains("trace_context"));
        let back: WorkerMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.movie_id(), None);
    }
}
