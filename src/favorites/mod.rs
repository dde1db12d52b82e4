//! The user's favorites list as the UI sees it.

pub mod toggles;

pub use toggles::{FavoriteToggles, ToggleRequest, ToggleState};
