//! The infinite virtualized grid.
//!
//! - [`partition`]: flat movie slice to rows
//! - [`columns`]: width notifications to a column count
//! - [`virtualizer`]: visible row range over variable row heights
//! - [`pagination`]: page bookkeeping and the next-page trigger

pub mod columns;
pub mod pagination;
pub mod partition;
pub mod virtualizer;

pub use columns::{LayoutObserver, ResponsiveColumns};
pub use pagination::{Acceptance, FetchTicket, InfiniteQuery};
pub use virtualizer::{VirtualRow, Virtualizer, VirtualizerOptions};
