//! Transport-neutral HTTP request and response values.
//!
//! The plugin host performs requests asynchronously and hands results back as
//! events. Each request therefore carries a string context map that says what the
//! response is for; [`RequestContext`] is the typed form of that map.

use crate::domain::{MovieId, ReelgridError, Result};
use crate::grid::FetchTicket;
use std::collections::BTreeMap;

const KIND: &str = "reelgrid_request";
const GENERATION: &str = "generation";
const PAGE: &str = "page";
const MOVIE_ID: &str = "movie_id";

/// A planned GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub context: BTreeMap<String, String>,
}

/// A completed request as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// What a request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestContext {
    /// A page of the grid query.
    Page(FetchTicket),
    /// The detail record of one movie.
    Details(MovieId),
}

impl RequestContext {
    /// Encodes the context into the host's string map.
    ///
    /// ```
    /// use reelgrid::grid::FetchTicket;
    /// use reelgrid::remote::RequestContext;
    ///
    /// let ctx = RequestContext::Page(FetchTicket { generation: 4, page: 2 });
    /// assert_eq!(RequestContext::from_map(&ctx.to_map()).unwrap(), ctx);
    /// ```
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        match self {
            Self::Page(ticket) => {
                map.insert(KIND.to_string(), "page".to_string());
                map.insert(GENERATION.to_string(), ticket.generation.to_string());
                map.insert(PAGE.to_string(), ticket.page.to_string());
            }
            Self::Details(id) => {
                map.insert(KIND.to_string(), "details".to_string());
                map.insert(MOVIE_ID.to_string(), id.to_string());
            }
        }
        map
    }

    /// Decodes a context map produced by [`to_map`](Self::to_map).
    ///
    /// # Errors
    ///
    /// Returns [`ReelgridError::Fetch`] if the map does not describe a request
    /// issued by this plugin.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self> {
        match map.get(KIND).map(String::as_str) {
            Some("page") => Ok(Self::Page(FetchTicket {
                generation: parse_field(map, GENERATION)?,
                page: parse_field(map, PAGE)?,
            })),
            Some("details") => Ok(Self::Details(parse_field(map, MOVIE_ID)?)),
            other => Err(ReelgridError::Fetch(format!(
                "unknown request context kind: {other:?}"
            ))),
        }
    }
}

fn parse_field<T: std::str::FromStr>(map: &BTreeMap<String, String>, key: &str) -> Result<T> {
    map.get(key)
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| ReelgridError::Fetch(format!("request context is missing '{key}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_context_survives_the_map() {
        let ctx = RequestContext::Details(603);
        assert_eq!(RequestContext::from_map(&ctx.to_map()).unwrap(), ctx);
    }

    #[test]
    fn foreign_contexts_are_rejected() {
        let mut map = BTreeMap::new();
        assert!(RequestContext::from_map(&map).is_err());

        map.insert(KIND.to_string(), "page".to_string());
        map.insert(GENERATION.to_string(), "x".to_string());
        map.insert(PAGE.to_string(), "1".to_string());
        assert!(RequestContext::from_map(&map).is_err());
    }

    #[test]
    fn success_range_is_2xx() {
        let ok = HttpResponse { status: 204, body: vec![] };
        let redirect = HttpResponse { status: 301, body: vec![] };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
    }
}
