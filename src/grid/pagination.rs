//! Page bookkeeping for one infinite query.
//!
//! [`InfiniteQuery`] owns the pages loaded for the current [`QueryState`] and
//! decides when the next page may be requested. Every request is identified by
//! a [`FetchTicket`]; results are only applied when their ticket still matches
//! the current generation and the page that is actually in flight, which keeps
//! the flattened sequence equal to the concatenation of pages 1..=N.

use crate::domain::{MovieSummary, Page, QueryState, ReelgridError};
use serde::{Deserialize, Serialize};

/// Identifies one page request of one query generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchTicket {
    pub generation: u64,
    pub page: u32,
}

/// What happened to a fetch result handed to [`InfiniteQuery::accept`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// The page was appended.
    Applied,
    /// The result belongs to a query that has since been replaced.
    Stale,
    /// The result is for a page that is not the one in flight.
    OutOfOrder,
    /// The request failed; pagination is stalled until [`InfiniteQuery::resume`].
    Failed,
}

/// The last fetch failure of the current query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub page: u32,
    pub message: String,
}

/// Pages of the active query plus the flattened movie sequence.
#[derive(Debug, Clone)]
pub struct InfiniteQuery {
    query: QueryState,
    generation: u64,
    pages: Vec<Page>,
    movies: Vec<MovieSummary>,
    in_flight: Option<u32>,
    has_next_page: bool,
    error: Option<LoadError>,
    stalled: bool,
}

impl InfiniteQuery {
    /// An idle query with no pages. Call [`restart`](Self::restart) to load it.
    #[must_use]
    pub fn new(query: QueryState) -> Self {
        Self {
            query,
            generation: 0,
            pages: Vec::new(),
            movies: Vec::new(),
            in_flight: None,
            has_next_page: false,
            error: None,
            stalled: false,
        }
    }

    /// Replaces the query, drops every loaded page and requests page 1.
    ///
    /// Any request still in flight for the previous generation becomes stale.
    pub fn restart(&mut self, query: QueryState) -> FetchTicket {
        self.generation += 1;
        self.query = query;
        self.pages.clear();
        self.movies.clear();
        self.has_next_page = false;
        self.error = None;
        self.stalled = false;
        self.in_flight = Some(1);

        tracing::debug!(
            generation = self.generation,
            query = %self.query.text,
            "restarting infinite query"
        );
        FetchTicket {
            generation: self.generation,
            page: 1,
        }
    }

    /// Requests the next page when the last visible row is the last real row
    /// (or the sentinel behind it).
    ///
    /// Returns `None` while a request is in flight, after the last page, or
    /// while stalled by a failure. Firing marks the page as in flight before
    /// returning, so repeated calls in the same frame yield a single ticket.
    pub fn maybe_fetch_next(
        &mut self,
        last_visible_index: usize,
        real_row_count: usize,
    ) -> Option<FetchTicket> {
        if !self.has_next_page || self.in_flight.is_some() || self.stalled {
            return None;
        }
        if last_visible_index + 1 < real_row_count {
            return None;
        }

        let page = self.next_page_number();
        self.in_flight = Some(page);
        tracing::debug!(generation = self.generation, page, "requesting next page");
        Some(FetchTicket {
            generation: self.generation,
            page,
        })
    }

    /// Applies a fetch result if its ticket is still current.
    pub fn accept(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page, ReelgridError>,
    ) -> Acceptance {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                "discarding stale page"
            );
            return Acceptance::Stale;
        }
        if self.in_flight != Some(ticket.page) {
            tracing::warn!(
                page = ticket.page,
                in_flight = ?self.in_flight,
                "discarding page that is not in flight"
            );
            return Acceptance::OutOfOrder;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                self.has_next_page = page.has_next();
                self.movies.extend(page.movies.iter().cloned());
                self.pages.push(Page {
                    number: ticket.page,
                    ..page
                });
                self.error = None;
                Acceptance::Applied
            }
            Err(err) => {
                tracing::warn!(page = ticket.page, error = %err, "page fetch failed");
                self.error = Some(LoadError {
                    page: ticket.page,
                    message: err.to_string(),
                });
                self.stalled = true;
                Acceptance::Failed
            }
        }
    }

    /// Clears a failure stall so the next trigger may retry; called on user
    /// scroll input.
    pub fn resume(&mut self) {
        if self.stalled {
            tracing::debug!(generation = self.generation, "pagination resumed");
        }
        self.stalled = false;
    }

    /// Explicit retry after a failure.
    ///
    /// A failed first page restarts the query; a failed later page is requested
    /// again directly.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        self.error.as_ref()?;
        if self.pages.is_empty() {
            let query = self.query.clone();
            return Some(self.restart(query));
        }
        if self.in_flight.is_some() {
            return None;
        }
        self.stalled = false;
        let page = self.next_page_number();
        self.in_flight = Some(page);
        Some(FetchTicket {
            generation: self.generation,
            page,
        })
    }

    fn next_page_number(&self) -> u32 {
        self.pages.last().map_or(1, |p| p.number + 1)
    }

    #[must_use]
    pub const fn query(&self) -> &QueryState {
        &self.query
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Movies of all accepted pages, flattened in page order.
    #[must_use]
    pub fn movies(&self) -> &[MovieSummary] {
        &self.movies
    }

    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    #[must_use]
    pub const fn error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    /// Page 1 is in flight and nothing has been loaded yet.
    #[must_use]
    pub fn is_loading_first(&self) -> bool {
        self.pages.is_empty() && self.in_flight.is_some()
    }

    /// A later page is in flight.
    #[must_use]
    pub fn is_fetching_next(&self) -> bool {
        !self.pages.is_empty() && self.in_flight.is_some()
    }

    /// Page 1 failed and nothing is loaded.
    #[must_use]
    pub fn first_page_failed(&self) -> bool {
        self.pages.is_empty() && self.in_flight.is_none() && self.error.is_some()
    }

    /// Total results reported by the catalog for this query.
    #[must_use]
    pub fn total_results(&self) -> u64 {
        self.pages.last().map_or(0, |p| p.total_results)
    }
}

impl Default for InfiniteQuery {
    fn default() -> Self {
        Self::new(QueryState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u32, ids: std::ops::Range<u64>, total_pages: u32) -> Page {
        Page {
            number,
            movies: ids
                .map(|id| MovieSummary {
                    id,
                    title: format!("Movie {id}"),
                    poster_path: None,
                    rating: 5.0,
                    release_date: None,
                    overview: String::new(),
                })
                .collect(),
            total_pages,
            total_results: u64::from(total_pages) * 20,
        }
    }

    fn ids(q: &InfiniteQuery) -> Vec<u64> {
        q.movies().iter().map(|m| m.id).collect()
    }

    #[test]
    fn first_page_populates_movies() {
        let mut q = InfiniteQuery::default();
        let ticket = q.restart(QueryState::default());
        assert!(q.is_loading_first());

        assert_eq!(q.accept(ticket, Ok(page(1, 0..20, 3))), Acceptance::Applied);
        assert!(!q.is_loading_first());
        assert_eq!(q.movies().len(), 20);
        assert!(q.has_next_page());
    }

    #[test]
    fn repeated_triggers_fetch_once() {
        let mut q = InfiniteQuery::default();
        let t1 = q.restart(QueryState::default());
        q.accept(t1, Ok(page(1, 0..20, 5)));

        let next = q.maybe_fetch_next(5, 5);
        assert_eq!(next.map(|t| t.page), Some(2));
        assert!(q.is_fetching_next());
        for _ in 0..10 {
            assert_eq!(q.maybe_fetch_next(5, 5), None);
        }
    }

    #[test]
    fn trigger_waits_for_the_last_row() {
        let mut q = InfiniteQuery::default();
        let t1 = q.restart(QueryState::default());
        q.accept(t1, Ok(page(1, 0..20, 5)));

        assert_eq!(q.maybe_fetch_next(3, 5), None);
        assert!(q.maybe_fetch_next(4, 5).is_some());
    }

    #[test]
    fn query_change_discards_in_flight_results() {
        let mut q = InfiniteQuery::default();
        let popular = q.restart(QueryState::default());
        let search = q.restart(QueryState::search("matrix", "en-US"));

        assert_eq!(q.accept(popular, Ok(page(1, 100..120, 9))), Acceptance::Stale);
        assert!(q.movies().is_empty());

        assert_eq!(q.accept(search, Ok(page(1, 0..3, 1))), Acceptance::Applied);
        assert_eq!(ids(&q), vec![0, 1, 2]);
        assert!(!q.has_next_page());
    }

    #[test]
    fn pages_append_in_order() {
        let mut q = InfiniteQuery::default();
        let t1 = q.restart(QueryState::default());
        q.accept(t1, Ok(page(1, 0..2, 3)));
        let t2 = q.maybe_fetch_next(0, 1).unwrap();
        q.accept(t2, Ok(page(2, 2..4, 3)));
        let t3 = q.maybe_fetch_next(1, 2).unwrap();
        q.accept(t3, Ok(page(3, 4..6, 3)));

        assert_eq!(ids(&q), vec![0, 1, 2, 3, 4, 5]);
        let numbers: Vec<u32> = q.pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(!q.has_next_page());
        assert_eq!(q.maybe_fetch_next(2, 3), None);
    }

    #[test]
    fn results_for_pages_not_in_flight_are_rejected() {
        let mut q = InfiniteQuery::default();
        let t1 = q.restart(QueryState::default());
        q.accept(t1, Ok(page(1, 0..2, 3)));

        let bogus = FetchTicket {
            generation: q.generation(),
            page: 3,
        };
        assert_eq!(q.accept(bogus, Ok(page(3, 4..6, 3))), Acceptance::OutOfOrder);
        assert_eq!(q.accept(t1, Ok(page(1, 0..2, 3))), Acceptance::OutOfOrder);
        assert_eq!(ids(&q), vec![0, 1]);
    }

    #[test]
    fn failure_stalls_until_resumed() {
        let mut q = InfiniteQuery::default();
        let t1 = q.restart(QueryState::default());
        q.accept(t1, Ok(page(1, 0..2, 3)));
        let t2 = q.maybe_fetch_next(0, 1).unwrap();

        let err = ReelgridError::Fetch("HTTP 500".into());
        assert_eq!(q.accept(t2, Err(err)), Acceptance::Failed);
        assert!(q.stalled);
        assert_eq!(q.maybe_fetch_next(0, 1), None);

        q.resume();
        let again = q.maybe_fetch_next(0, 1).unwrap();
        assert_eq!(again.page, 2);
    }

    #[test]
    fn first_page_failure_is_reported_and_retried() {
        let mut q = InfiniteQuery::default();
        let t1 = q.restart(QueryState::search("dune", "en-US"));
        q.accept(t1, Err(ReelgridError::Validation("missing results".into())));

        assert!(q.first_page_failed());
        assert_eq!(q.error().map(|e| e.page), Some(1));

        let retry = q.retry().unwrap();
        assert_eq!(retry.page, 1);
        assert!(retry.generation > t1.generation);
        assert_eq!(q.query().text, "dune");
        assert!(!q.first_page_failed());
    }

    #[test]
    fn retry_without_error_does_nothing() {
        let mut q = InfiniteQuery::default();
        let t1 = q.restart(QueryState::default());
        q.accept(t1, Ok(page(1, 0..2, 3)));
        assert_eq!(q.retry(), None);
    }

    #[test]
    fn empty_page_ends_pagination() {
        let mut q = InfiniteQuery::default();
        let t1 = q.restart(QueryState::search("   ", "en-US"));
        q.accept(t1, Ok(Page::empty(1)));
        assert!(!q.has_next_page());
        assert!(q.movies().is_empty());
        assert!(!q.first_page_failed());
    }
}
