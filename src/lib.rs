//! Reelgrid: a Zellij plugin for browsing movies in an infinitely scrolling,
//! virtualized card grid.
//!
//! Reelgrid provides:
//! - A responsive grid of movie cards that loads pages on demand as it scrolls
//! - Debounced search with fuzzy highlighting of matched titles
//! - Favorites with optimistic toggles, persisted by a background worker
//! - A detail page per movie, cached for an hour
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Zellij Plugin Shim (main.rs)                       │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Event handling, actions, view model              │
//! └─────────────────────────────────────────────────────┘
//!      │              │               │             │
//! ┌──────────┐  ┌───────────┐  ┌────────────┐  ┌──────────┐
//! │ grid/    │  │ remote/   │  │ favorites/ │  │ ui/      │
//! │ rows,    │  │ TMDB      │  │ optimistic │  │ cards,   │
//! │ virtual  │  │ requests  │  │ toggles    │  │ themes   │
//! │ range,   │  │ + cache   │  │            │  │          │
//! │ pages    │  │           │  │            │  │          │
//! └──────────┘  └───────────┘  └────────────┘  └──────────┘
//!                                     │
//! ┌─────────────────────────────────────────────────────┐
//! │  Worker (worker/) → Storage (storage/)              │  ← Favorites file
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain, Infrastructure, Observability              │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! ```kdl
//! pane {
//!     plugin location="file:/path/to/reelgrid.wasm" {
//!         access_token "eyJhbGciOi..."
//!         locale "en-US"
//!         theme "catppuccin-mocha"
//!         search_debounce_ms "300"
//!         trace_level "info"
//!     }
//! }
//! ```
//!
//! # Example
//!
//! ```rust
//! use reelgrid::{handle_event, initialize, Config, Event};
//!
//! let mut state = initialize(&Config::default());
//! let (_render, actions) = handle_event(&mut state, &Event::PermissionsGranted)?;
//! assert_eq!(actions.len(), 2); // page 1 request + favorites load
//! # Ok::<(), reelgrid::ReelgridError>(())
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod cache;
pub mod domain;
pub mod favorites;
pub mod grid;
pub mod infrastructure;
pub mod remote;
pub mod storage;
pub mod ui;
pub mod worker;

pub mod observability;

pub use app::{handle_event, Action, AppState, Event, InputMode, SearchFocus, ViewMode};
pub use domain::{MovieSummary, ReelgridError, Result};
pub use ui::Theme;

use domain::query::DEFAULT_LOCALE;
use remote::{TmdbClient, DEFAULT_API_BASE_URL};
use std::collections::BTreeMap;

const DEFAULT_OVERSCAN: usize = 5;
const DEFAULT_ROW_HEIGHT: usize = 8;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Plugin configuration parsed from Zellij's configuration map.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the TMDB v3 API. Default: `https://api.themoviedb.org/3`
    pub api_base_url: String,

    /// TMDB read access token, sent as a bearer token.
    pub access_token: Option<String>,

    /// Language for titles and overviews, e.g. `en-US`.
    pub locale: String,

    /// Built-in theme name. Ignored if `theme_file` is set.
    pub theme_name: Option<String>,

    /// Path to a custom TOML theme file. See [`ui::theme`] for the format.
    pub theme_file: Option<String>,

    /// Tracing filter directive: `trace`, `debug`, `info`, `warn`, `error` or
    /// `off`. Default: `"info"`
    pub trace_level: Option<String>,

    /// Rows rendered beyond each edge of the viewport.
    pub overscan: usize,

    /// Height assumed for rows that have not been measured yet, in lines.
    pub row_height: usize,

    /// Idle time before typed search text is committed. `0` commits on every
    /// keystroke.
    pub search_debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            access_token: None,
            locale: DEFAULT_LOCALE.to_string(),
            theme_name: None,
            theme_file: None,
            trace_level: None,
            overscan: DEFAULT_OVERSCAN,
            row_height: DEFAULT_ROW_HEIGHT,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
        }
    }
}

impl Config {
    /// Parses configuration from Zellij's configuration map.
    ///
    /// Missing keys, blank strings and numbers that do not parse all fall back
    /// to the defaults. A `row_height` of zero is treated as invalid.
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use reelgrid::Config;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("locale".to_string(), "de-DE".to_string());
    /// map.insert("overscan".to_string(), "two".to_string());
    ///
    /// let config = Config::from_zellij(&map);
    /// assert_eq!(config.locale, "de-DE");
    /// assert_eq!(config.overscan, 5);
    /// ```
    #[must_use]
    pub fn from_zellij(config: &BTreeMap<String, String>) -> Self {
        let text = |key: &str| {
            config
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(String::from)
        };
        let defaults = Self::default();

        Self {
            api_base_url: text("api_base_url").unwrap_or(defaults.api_base_url),
            access_token: text("access_token"),
            locale: text("locale").unwrap_or(defaults.locale),
            theme_name: text("theme"),
            theme_file: text("theme_file"),
            trace_level: text("trace_level"),
            overscan: text("overscan")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.overscan),
            row_height: text("row_height")
                .and_then(|s| s.parse().ok())
                .filter(|&h: &usize| h > 0)
                .unwrap_or(defaults.row_height),
            search_debounce_ms: text("search_debounce_ms")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.search_debounce_ms),
        }
    }
}

fn load_theme(config: &Config) -> Theme {
    if let Some(theme_file) = &config.theme_file {
        let path = infrastructure::expand_tilde(theme_file);
        match Theme::from_file(&path) {
            Ok(theme) => return theme,
            Err(e) => {
                tracing::warn!(theme_file = %theme_file, error = %e, "failed to load theme from file, using default");
            }
        }
    }

    config.theme_name.as_ref().map_or_else(Theme::default, |theme_name| {
        Theme::from_name(theme_name).unwrap_or_else(|| {
            tracing::warn!(theme_name = %theme_name, "unknown theme, using default");
            Theme::default()
        })
    })
}

/// Builds the application state from configuration.
///
/// An unusable `api_base_url` falls back to the public TMDB endpoint; an
/// unloadable theme falls back to the default theme. Nothing is requested
/// until [`Event::PermissionsGranted`] is handled.
#[must_use]
pub fn initialize(config: &Config) -> AppState {
    tracing::debug!(locale = %config.locale, "initializing reelgrid plugin");

    let client = TmdbClient::new(&config.api_base_url, config.access_token.clone())
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "invalid api_base_url, using the public endpoint");
            TmdbClient::public(config.access_token.clone())
        });

    AppState::new(config, client, load_theme(config))
}
