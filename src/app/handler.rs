//! Event handling and state transition logic.
//!
//! The handler follows a unidirectional data flow:
//! 1. Events arrive from the plugin runtime, the web request callback or the
//!    favorites worker
//! 2. [`handle_event`] pattern-matches the event
//! 3. State mutations happen through `AppState` methods
//! 4. Actions are collected and returned for the runtime to execute
//!
//! Web responses are routed by the [`RequestContext`] they were issued with, so a
//! page response for a replaced query and a detail response for a closed page
//! are both recognized and dropped by the state they would have touched.

use crate::app::state::Movement;
use crate::app::{Action, AppState, InputMode};
use crate::domain::error::{ReelgridError, Result};
use crate::remote::{HttpResponse, RequestContext};
use crate::worker::WorkerResponse;
use std::collections::BTreeMap;

/// Events triggered by user input, the host, or worker responses.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Web access was granted; loads the first page and the favorites.
    PermissionsGranted,
    /// The plugin pane was drawn at a new size.
    Resize { rows: usize, cols: usize },
    /// A debounce timer elapsed.
    Tick,
    /// Hides the plugin.
    CloseFocus,

    KeyUp,
    KeyDown,
    KeyLeft,
    KeyRight,
    PageUp,
    PageDown,
    Home,
    End,
    /// Mouse wheel, in lines.
    ScrollUp(usize),
    ScrollDown(usize),

    /// Opens the search box with typing focus.
    SearchMode,
    /// Commits the typed query and moves keys to the grid.
    FocusResults,
    /// Clears the query and closes the search box.
    ExitSearch,
    /// Appends a character to the search query.
    Char(char),
    /// Removes the last character from the search query.
    Backspace,

    /// Opens the detail page of the selected movie.
    Select,
    /// Leaves the detail page or the favorites grid.
    Back,
    ToggleFavorite,
    ShowFavorites,
    ShowBrowse,
    /// Retries the failed request on the current screen.
    Retry,

    /// A web request finished.
    WebResponse {
        status: u16,
        body: Vec<u8>,
        context: BTreeMap<String, String>,
    },

    /// Wraps a response from the favorites worker.
    WorkerResponse(WorkerResponse),
}

impl Event {
    /// Short name for logs; response bodies stay out of span fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PermissionsGranted => "PermissionsGranted",
            Self::Resize { .. } => "Resize",
            Self::Tick => "Tick",
            Self::CloseFocus => "CloseFocus",
            Self::KeyUp => "KeyUp",
            Self::KeyDown => "KeyDown",
            Self::KeyLeft => "KeyLeft",
            Self::KeyRight => "KeyRight",
            Self::PageUp => "PageUp",
            Self::PageDown => "PageDown",
            Self::Home => "Home",
            Self::End => "End",
            Self::ScrollUp(_) => "ScrollUp",
            Self::ScrollDown(_) => "ScrollDown",
            Self::SearchMode => "SearchMode",
            Self::FocusResults => "FocusResults",
            Self::ExitSearch => "ExitSearch",
            Self::Char(_) => "Char",
            Self::Backspace => "Backspace",
            Self::Select => "Select",
            Self::Back => "Back",
            Self::ToggleFavorite => "ToggleFavorite",
            Self::ShowFavorites => "ShowFavorites",
            Self::ShowBrowse => "ShowBrowse",
            Self::Retry => "Retry",
            Self::WebResponse { .. } => "WebResponse",
            Self::WorkerResponse(_) => "WorkerResponse",
        }
    }
}

fn movement(event: &Event) -> Option<Movement> {
    Some(match event {
        Event::KeyUp => Movement::Up,
        Event::KeyDown => Movement::Down,
        Event::KeyLeft => Movement::Left,
        Event::KeyRight => Movement::Right,
        Event::PageUp => Movement::PageUp,
        Event::PageDown => Movement::PageDown,
        Event::Home => Movement::Home,
        Event::End => Movement::End,
        _ => return None,
    })
}

/// Processes an event, mutates application state, and returns whether a render
/// is needed plus the actions to execute in order.
///
/// # Errors
///
/// Returns [`ReelgridError::Fetch`] when a web response carries a context this
/// plugin did not issue.
pub fn handle_event(state: &mut AppState, event: &Event) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", event_type = event.kind()).entered();

    if let Some(movement) = movement(event) {
        return Ok((true, state.move_selection(movement)));
    }

    match event {
        Event::PermissionsGranted => {
            tracing::debug!("web access granted, loading first page");
            Ok((true, state.start()))
        }
        Event::Resize { rows, cols } => Ok((false, state.set_viewport(*rows, *cols))),
        Event::Tick => {
            let actions = state.timer_fired();
            Ok((true, actions))
        }
        Event::CloseFocus => Ok((false, vec![Action::CloseFocus])),
        Event::ScrollUp(lines) => Ok((true, state.scroll_lines(-signed(*lines)))),
        Event::ScrollDown(lines) => Ok((true, state.scroll_lines(signed(*lines)))),

        Event::SearchMode => {
            tracing::debug!("entering search mode");
            Ok((true, state.enter_search()))
        }
        Event::FocusResults => {
            if state.search_input.trim().is_empty() {
                return Ok((true, state.exit_search()));
            }
            Ok((true, state.focus_results()))
        }
        Event::ExitSearch => {
            tracing::debug!(query = %state.search_input, "exiting search mode");
            Ok((true, state.exit_search()))
        }
        Event::Char(c) => {
            if !state.input_mode.is_typing() {
                return Ok((false, vec![]));
            }
            let actions = state.push_search_char(*c);
            tracing::trace!(query = %state.search_input, char = %c, "search query updated");
            Ok((true, actions))
        }
        Event::Backspace => {
            if !state.input_mode.is_typing() {
                return Ok((false, vec![]));
            }
            Ok((true, state.pop_search_char()))
        }

        Event::Select => {
            let Some(movie) = state.selected_movie() else {
                tracing::debug!("no movie selected");
                return Ok((false, vec![]));
            };
            tracing::debug!(movie_id = movie.id, title = %movie.title, "movie selected");
            Ok((true, state.open_detail()))
        }
        Event::Back => {
            if matches!(state.input_mode, InputMode::Search(_)) && state.detail.is_none() {
                return Ok((true, state.exit_search()));
            }
            Ok((true, state.go_back()))
        }
        Event::ToggleFavorite => {
            let actions = state.toggle_favorite();
            Ok((!actions.is_empty(), actions))
        }
        Event::ShowFavorites => Ok((true, state.show_favorites())),
        Event::ShowBrowse => Ok((true, state.show_browse())),
        Event::Retry => Ok((true, state.retry())),

        Event::WebResponse {
            status,
            body,
            context,
        } => {
            let response = HttpResponse {
                status: *status,
                body: body.clone(),
            };
            match RequestContext::from_map(context)? {
                RequestContext::Page(ticket) => {
                    tracing::debug!(
                        status,
                        generation = ticket.generation,
                        page = ticket.page,
                        "page response"
                    );
                    Ok(state.apply_page(ticket, &response))
                }
                RequestContext::Details(movie_id) => {
                    tracing::debug!(status, movie_id, "detail response");
                    Ok((state.apply_details(movie_id, &response), vec![]))
                }
            }
        }

        Event::WorkerResponse(response) => Ok(handle_worker_response(state, response)),

        Event::KeyUp
        | Event::KeyDown
        | Event::KeyLeft
        | Event::KeyRight
        | Event::PageUp
        | Event::PageDown
        | Event::Home
        | Event::End => Ok((false, vec![])),
    }
}

fn signed(lines: usize) -> isize {
    isize::try_from(lines).unwrap_or(isize::MAX)
}

fn handle_worker_response(state: &mut AppState, response: &WorkerResponse) -> (bool, Vec<Action>) {
    match response {
        WorkerResponse::FavoritesLoaded { favorites } => {
            state.favorites_loaded(favorites.clone());
            (true, vec![])
        }
        WorkerResponse::FavoriteAdded { favorite } => {
            (true, state.settle_favorite(favorite.movie_id, Ok(())))
        }
        WorkerResponse::FavoriteRemoved { movie_id, removed } => {
            tracing::debug!(movie_id, removed, "favorite removed");
            (true, state.settle_favorite(*movie_id, Ok(())))
        }
        WorkerResponse::AlreadyFavorite { movie_id } => {
            let err = ReelgridError::DuplicateFavorite(*movie_id);
            (true, state.settle_favorite(*movie_id, Err(&err)))
        }
        WorkerResponse::Error { movie_id, message } => {
            tracing::error!(movie_id = ?movie_id, "favorites worker error: {message}");
            match movie_id {
                Some(id) => {
                    let err = ReelgridError::Storage(message.clone());
                    (true, state.settle_favorite(*id, Err(&err)))
                }
                None => {
                    state.favorites_load_failed(message);
                    (true, vec![])
                }
            }
        }
    }
}
