//! Input and view mode state types for the application.
//!
//! These enums decide which keybindings are active and which screen the
//! renderer draws.
//!
//! # State Machine
//!
//! Input modes:
//! - **Normal**: grid navigation and commands
//! - **Search**: the search box is open, either taking keystrokes or handing
//!   navigation back to the grid
//!
//! View modes:
//! - **Browse**: the infinite grid of the current query
//! - **Favorites**: the grid of favorited movies, newest first
//! - **Detail**: the detail page of one movie
//!
//! ```rust
//! use reelgrid::app::modes::{InputMode, SearchFocus, ViewMode};
//!
//! let input_mode = InputMode::Search(SearchFocus::Typing);
//! assert!(input_mode.is_typing());
//! assert_eq!(ViewMode::default(), ViewMode::Browse);
//! ```

/// Focus inside search mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFocus {
    /// Keystrokes edit the query.
    Typing,

    /// The query stays visible while arrows and hjkl move through results.
    Navigating,
}

/// Current input handling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Navigation and single-key commands.
    #[default]
    Normal,

    /// Search box is open with the given focus.
    Search(SearchFocus),
}

impl InputMode {
    /// Whether printable keys should be appended to the query.
    #[must_use]
    pub const fn is_typing(self) -> bool {
        matches!(self, Self::Search(SearchFocus::Typing))
    }
}

/// Which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Browse,
    Favorites,
    /// Detail page; the movie and the screen to return to live in
    /// [`DetailState`](super::state::DetailState).
    Detail,
}
