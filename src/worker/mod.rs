//! Background worker for favorites storage.
//!
//! All favorites I/O runs on Zellij's worker thread so the render loop never
//! blocks on the filesystem. Messages carry trace context so worker spans join
//! the trace of the keypress that caused them.
//!
//! - `messages`: Request/response protocol types with trace context propagation
//! - `handler`: Worker implementation and message processing logic

pub mod handler;
pub mod messages;

pub use handler::FavoritesWorker;
pub use messages::{TraceContext, WorkerMessage, WorkerResponse};

/// Name the worker is registered under.
pub const WORKER_NAME: &str = "favorites";
