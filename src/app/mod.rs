//! Application layer coordinating state, events, and actions.
//!
//! Sits between the plugin runtime (`main.rs`) and the grid, remote, favorites
//! and worker layers:
//!
//! ```text
//! Keys / Mouse / Timer → Events → handle_event → AppState → Actions → Host
//!                          ↑                                    ↓
//!                          └──── web responses, worker replies ─┘
//! ```
//!
//! - [`actions`]: side effects for the host to perform
//! - [`handler`]: event processing
//! - [`modes`]: input and view modes
//! - [`state`]: application state and view model computation

pub mod actions;
pub mod handler;
pub mod modes;
pub mod state;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use modes::{InputMode, SearchFocus, ViewMode};
pub use state::{AppState, DetailState, DetailStatus, Movement};
