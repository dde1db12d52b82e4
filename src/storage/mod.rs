//! Storage layer for the favorites list.
//!
//! Favorites are the only data the plugin persists. The worker owns the store and
//! is the only writer.
//!
//! # Modules
//!
//! - `backend`: Storage trait abstraction for backend implementations
//! - `json`: JSON file-based storage implementation
//! - `models`: Storage record types separate from domain models

pub mod backend;
pub mod json;
pub mod models;

pub use backend::FavoriteStore;
pub use json::JsonStorage;
pub use models::FavoriteRecord;
