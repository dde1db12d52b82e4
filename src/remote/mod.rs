//! Remote movie catalog access.
//!
//! - [`request`]: host-neutral request/response values and request contexts
//! - [`tmdb`]: the TMDB client and the [`PageFetcher`] seam

pub mod request;
pub mod tmdb;

pub use request::{HttpRequest, HttpResponse, RequestContext};
pub use tmdb::{FetchStart, PageFetcher, TmdbClient, DEFAULT_API_BASE_URL};
