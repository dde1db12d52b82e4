//! Domain layer for the Reelgrid plugin.
//!
//! Core types independent of Zellij APIs, the HTTP transport, or storage:
//!
//! - [`error`]: Error types and result aliases
//! - [`movie`]: Movie summaries, pages, and detail records
//! - [`query`]: Query state and result-set identity
//! - [`favorite`]: The user's saved movies

pub mod error;
pub mod favorite;
pub mod movie;
pub mod query;

pub use error::{ReelgridError, Result};
pub use favorite::Favorite;
pub use movie::{CastMember, Genre, MovieDetails, MovieId, MovieSummary, Page};
pub use query::{QueryKey, QueryKind, QueryState};
