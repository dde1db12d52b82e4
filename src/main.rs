//! Zellij plugin wrapper and entry point.
//!
//! Thin integration layer between the Reelgrid library and the Zellij plugin
//! system. Host events are translated into library events, the library returns
//! actions, and this module performs them with the Zellij API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────┐
//! │   Zellij Main Thread    │
//! │  ┌──────────────────┐   │
//! │  │  State (plugin)  │   │  ← UI state, web requests, timers
//! │  └──────────────────┘   │
//! │          │              │
//! │          │ IPC          │
//! │          ▼              │
//! │  ┌──────────────────┐   │
//! │  │ FavoritesWorker  │   │  ← favorites.json reads and writes
//! │  │ (worker thread)  │   │
//! │  └──────────────────┘   │
//! └─────────────────────────┘
//! ```
//!
//! # Plugin Lifecycle
//!
//! 1. **Load**: Parse config, initialize tracing, create `AppState`
//! 2. **Permissions**: Request `WebAccess`; nothing is fetched until granted
//! 3. **Update**: Translate events, delegate to `handle_event`, run actions
//! 4. **Render**: Report the pane size, then draw the view model
//!
//! # Event Mapping
//!
//! - `Key` → navigation, search and command events by input mode
//! - `Mouse(ScrollUp/ScrollDown)` → `Event::ScrollUp` / `Event::ScrollDown`
//! - `Timer` → `Event::Tick` (search debounce)
//! - `WebRequestResult` → `Event::WebResponse`
//! - `CustomMessage("favorites")` → `Event::WorkerResponse`
//!
//! # Keybindings
//!
//! Global (all modes):
//! - `Ctrl+n` / `Ctrl+p`: Move down / up
//! - Arrows, `PageUp`, `PageDown`: Move through the grid
//!
//! In normal mode:
//! - `h`/`j`/`k`/`l`: Move left / down / up / right
//! - `g` / `G`: First / last movie
//! - `Enter`: Open details
//! - `Esc`: Back
//! - `f`: Toggle favorite
//! - `F`: Show favorites
//! - `b`: Show browse grid
//! - `/`: Search
//! - `r`: Retry a failed request
//! - `q`: Close plugin
//!
//! While typing a search:
//! - Printable keys edit the query
//! - `Enter`: Move focus to the results
//! - `Esc`: Clear and close the search
//!
//! While navigating search results, normal mode keys apply and `/` returns to
//! the search input.

#![allow(clippy::multiple_crate_versions)]

use std::collections::BTreeMap;
use zellij_tile::prelude::*;
use zellij_tile::shim::post_message_to;

use reelgrid::worker::{FavoritesWorker, WorkerMessage, WorkerResponse, WORKER_NAME};
use reelgrid::{handle_event, Action, Config, Event};

// Register plugin and worker with Zellij
register_plugin!(State);
register_worker!(FavoritesWorker, favorites_worker, FAVORITES_WORKER);

/// Plugin state wrapper.
///
/// Wraps the library's `AppState` with the Zellij-specific pieces: worker
/// messaging and the last pane size seen by `render`.
struct State {
    /// Core application state from library layer.
    app: reelgrid::app::AppState,

    /// Worker thread identifier for IPC messaging.
    worker_name: String,

    /// Pane size of the previous render, as `(rows, cols)`.
    size: (usize, usize),
}

impl Default for State {
    fn default() -> Self {
        let default_config = Config::default();
        Self {
            app: reelgrid::initialize(&default_config),
            worker_name: WORKER_NAME.to_string(),
            size: (0, 0),
        }
    }
}

impl ZellijPlugin for State {
    /// Initializes the plugin on load.
    ///
    /// Parses configuration, initializes tracing and application state, asks
    /// for web access and subscribes to the events the plugin reacts to.
    fn load(&mut self, configuration: BTreeMap<String, String>) {
        let config = Config::from_zellij(&configuration);
        reelgrid::observability::init_tracing(&config);

        let span = tracing::debug_span!("plugin_load");
        let _guard = span.entered();

        tracing::debug!(
            locale = %config.locale,
            api_base_url = %config.api_base_url,
            has_token = config.access_token.is_some(),
            "parsed configuration"
        );
        self.app = reelgrid::initialize(&config);

        request_permission(&[PermissionType::WebAccess]);
        subscribe(&[
            EventType::Key,
            EventType::Mouse,
            EventType::Timer,
            EventType::WebRequestResult,
            EventType::CustomMessage,
            EventType::PermissionRequestResult,
        ]);

        tracing::debug!("plugin load complete - waiting for permissions");
    }

    /// Translates a Zellij event, delegates to `handle_event` and executes the
    /// resulting actions. Returns `true` if the UI should re-render.
    fn update(&mut self, event: zellij_tile::prelude::Event) -> bool {
        let event_name = Self::get_event_name(&event);
        let span_name = format!("plugin_update::{event_name}");
        let span = tracing::debug_span!("plugin_update_event", otel.name = %span_name, event_type = %event_name);
        let _guard = span.entered();

        let our_event = match event {
            zellij_tile::prelude::Event::Key(ref key) => match self.map_key_event(key) {
                Some(event) => event,
                None => return false,
            },
            zellij_tile::prelude::Event::Mouse(mouse) => match mouse {
                Mouse::ScrollUp(lines) => Event::ScrollUp(lines),
                Mouse::ScrollDown(lines) => Event::ScrollDown(lines),
                _ => return false,
            },
            zellij_tile::prelude::Event::Timer(_elapsed) => Event::Tick,
            zellij_tile::prelude::Event::WebRequestResult(status, _headers, body, context) => {
                Event::WebResponse {
                    status,
                    body,
                    context,
                }
            }
            zellij_tile::prelude::Event::CustomMessage(message, payload) => {
                match self.map_custom_message_event(&message, &payload) {
                    Some(event) => event,
                    None => return false,
                }
            }
            zellij_tile::prelude::Event::PermissionRequestResult(permissions) => {
                match Self::map_permission_result(permissions) {
                    Some(event) => event,
                    None => return false,
                }
            }
            _ => return false,
        };

        self.dispatch(&our_event)
    }

    /// Reports size changes to the library, then draws the current view.
    fn render(&mut self, rows: usize, cols: usize) {
        if self.size != (rows, cols) {
            self.size = (rows, cols);
            self.dispatch(&Event::Resize { rows, cols });
        }
        reelgrid::ui::render(&mut self.app, rows, cols);
    }
}

impl State {
    /// Runs one library event and its actions.
    fn dispatch(&mut self, event: &Event) -> bool {
        match handle_event(&mut self.app, event) {
            Ok((should_render, actions)) => {
                tracing::debug!(
                    action_count = actions.len(),
                    should_render = should_render,
                    "event handled successfully"
                );
                for a in actions {
                    self.execute_action(&a);
                }
                should_render
            }
            Err(e) => {
                tracing::warn!(error = %e, "error handling event");
                false
            }
        }
    }

    /// Gets a string name for a Zellij event for logging purposes.
    fn get_event_name(event: &zellij_tile::prelude::Event) -> String {
        match event {
            zellij_tile::prelude::Event::Key(key) => format!("Key({:?})", key.bare_key),
            zellij_tile::prelude::Event::Mouse(..) => "Mouse".to_string(),
            zellij_tile::prelude::Event::Timer(..) => "Timer".to_string(),
            zellij_tile::prelude::Event::WebRequestResult(status, ..) => {
                format!("WebRequestResult({status})")
            }
            zellij_tile::prelude::Event::CustomMessage(msg, _) => format!("CustomMessage({msg})"),
            zellij_tile::prelude::Event::PermissionRequestResult(..) => {
                "PermissionRequestResult".to_string()
            }
            _ => "Other".to_string(),
        }
    }

    /// Maps keyboard events to application events.
    fn map_key_event(&self, key: &KeyWithModifier) -> Option<Event> {
        tracing::debug!(bare_key = ?key.bare_key, "key event");

        if key.bare_key == BareKey::Char('n') && key.has_modifiers(&[KeyModifier::Ctrl]) {
            return Some(Event::KeyDown);
        }
        if key.bare_key == BareKey::Char('p') && key.has_modifiers(&[KeyModifier::Ctrl]) {
            return Some(Event::KeyUp);
        }

        let navigation = match key.bare_key {
            BareKey::Down => Some(Event::KeyDown),
            BareKey::Up => Some(Event::KeyUp),
            BareKey::Left => Some(Event::KeyLeft),
            BareKey::Right => Some(Event::KeyRight),
            BareKey::PageDown => Some(Event::PageDown),
            BareKey::PageUp => Some(Event::PageUp),
            _ => None,
        };
        if navigation.is_some() {
            return navigation;
        }

        if self.app.input_mode.is_typing() {
            return Some(match key.bare_key {
                BareKey::Enter => Event::FocusResults,
                BareKey::Esc => Event::ExitSearch,
                BareKey::Backspace => Event::Backspace,
                BareKey::Char(c) => Event::Char(c),
                _ => return None,
            });
        }

        Some(match key.bare_key {
            BareKey::Char('j') => Event::KeyDown,
            BareKey::Char('k') => Event::KeyUp,
            BareKey::Char('h') => Event::KeyLeft,
            BareKey::Char('l') => Event::KeyRight,
            BareKey::Char('g') | BareKey::Home => Event::Home,
            BareKey::Char('G') | BareKey::End => Event::End,
            BareKey::Enter => Event::Select,
            BareKey::Esc => Event::Back,
            BareKey::Char('f') => Event::ToggleFavorite,
            BareKey::Char('F') => Event::ShowFavorites,
            BareKey::Char('b') => Event::ShowBrowse,
            BareKey::Char('/') => Event::SearchMode,
            BareKey::Char('r') => Event::Retry,
            BareKey::Char('q') => Event::CloseFocus,
            _ => return None,
        })
    }

    /// Maps permission request results to application events.
    fn map_permission_result(permissions: PermissionStatus) -> Option<Event> {
        match permissions {
            PermissionStatus::Granted => {
                tracing::debug!("permissions granted - loading movies");
                Some(Event::PermissionsGranted)
            }
            PermissionStatus::Denied => {
                tracing::warn!("web access denied - no movies can be loaded");
                None
            }
        }
    }

    /// Maps custom message events to application events.
    fn map_custom_message_event(&self, message: &str, payload: &str) -> Option<Event> {
        tracing::debug!(message_name = %message, payload_len = payload.len(), "custom message event");

        if message != self.worker_name {
            tracing::debug!(message_name = %message, "ignoring custom message with unknown name");
            return None;
        }
        match serde_json::from_str::<WorkerResponse>(payload) {
            Ok(response) => {
                tracing::debug!(response = ?response, "worker response received");
                Some(Event::WorkerResponse(response))
            }
            Err(e) => {
                tracing::debug!(error = %e, "failed to deserialize worker response");
                None
            }
        }
    }

    /// Posts a message to the worker thread.
    ///
    /// Serialization errors are logged and the message is dropped.
    fn post_worker_message(&self, message: &WorkerMessage) {
        match serde_json::to_string(&message) {
            Ok(payload) => {
                tracing::debug!(payload_len = payload.len(), "posting message to worker");
                post_message_to(PluginMessage {
                    worker_name: Some(self.worker_name.clone()),
                    name: self.worker_name.clone(),
                    payload,
                });
            }
            Err(e) => {
                tracing::debug!(error = %e, "failed to serialize worker message");
            }
        }
    }

    /// Translates a library action into Zellij API calls.
    #[tracing::instrument(level = "debug", skip(self))]
    fn execute_action(&self, action: &Action) {
        match action {
            Action::CloseFocus => {
                tracing::debug!("closing plugin focus");
                hide_self();
            }
            Action::PostToWorker(ref message) => {
                tracing::debug!(message = ?message, "posting message to worker");
                self.post_worker_message(message);
            }
            Action::WebRequest(ref request) => {
                tracing::debug!(url = %request.url, "issuing web request");
                web_request(
                    request.url.clone(),
                    HttpVerb::Get,
                    request.headers.clone(),
                    vec![],
                    request.context.clone(),
                );
            }
            Action::SetTimeout(secs) => {
                tracing::trace!(secs, "setting timer");
                set_timeout(*secs);
            }
        }
    }
}
