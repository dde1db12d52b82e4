//! Side effects requested by the event handler.
//!
//! [`handle_event`](super::handle_event) never talks to the host directly. It
//! returns a `Vec<Action>` and the plugin shim performs them in order, which keeps
//! every state transition testable without a running Zellij.
//!
//! ```rust
//! use reelgrid::app::Action;
//! use reelgrid::worker::WorkerMessage;
//!
//! let actions = vec![
//!     Action::PostToWorker(WorkerMessage::load_favorites()),
//!     Action::SetTimeout(0.3),
//! ];
//! assert_eq!(actions.len(), 2);
//! ```

use crate::remote::HttpRequest;
use crate::worker::WorkerMessage;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Hides the plugin pane.
    CloseFocus,

    /// Posts a message to the favorites worker.
    PostToWorker(WorkerMessage),

    /// Issues an HTTP GET through the host. The request's context map comes
    /// back with the response.
    WebRequest(HttpRequest),

    /// Asks the host for a timer event after the given number of seconds.
    SetTimeout(f64),
}
