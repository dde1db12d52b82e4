//! Query state identifying one paginated result set.
//!
//! A [`QueryState`] is what the user asked for (search text plus locale). Its
//! [`QueryKind`] decides which endpoint serves it, and its [`QueryKey`] names the
//! result set whose pages are tracked independently.

use serde::{Deserialize, Serialize};

/// Locale used when configuration does not provide one.
pub const DEFAULT_LOCALE: &str = "en-US";

/// The search text and locale driving the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    /// Raw text as typed; empty means the default popular listing.
    pub text: String,
    pub locale: String,
}

/// How a query is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind<'a> {
    /// Empty text: the popular movies listing.
    Listing,
    /// Whitespace-only text: resolves to an empty result without a request.
    Blank,
    /// Search for the trimmed text.
    Search(&'a str),
}

/// Identity of a result set: trimmed text plus locale.
///
/// `search` keeps a blank search apart from the listing, since both trim to an
/// empty text but resolve to different result sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryKey {
    pub search: bool,
    pub text: String,
    pub locale: String,
}

impl QueryState {
    /// The default popular listing in `locale`.
    #[must_use]
    pub fn listing(locale: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            locale: locale.into(),
        }
    }

    /// A search for `text` in `locale`.
    #[must_use]
    pub fn search(text: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            locale: locale.into(),
        }
    }

    /// Classifies the query.
    ///
    /// ```
    /// use reelgrid::domain::{QueryKind, QueryState};
    ///
    /// assert_eq!(QueryState::listing("en-US").kind(), QueryKind::Listing);
    /// assert_eq!(QueryState::search("   ", "en-US").kind(), QueryKind::Blank);
    /// assert_eq!(QueryState::search(" matrix ", "en-US").kind(), QueryKind::Search("matrix"));
    /// ```
    #[must_use]
    pub fn kind(&self) -> QueryKind<'_> {
        if self.text.is_empty() {
            return QueryKind::Listing;
        }
        match self.text.trim() {
            "" => QueryKind::Blank,
            trimmed => QueryKind::Search(trimmed),
        }
    }

    /// Whether this query searches rather than lists.
    #[must_use]
    pub fn is_search(&self) -> bool {
        !matches!(self.kind(), QueryKind::Listing)
    }

    /// Result-set identity; queries with equal keys share their pages.
    ///
    /// ```
    /// use reelgrid::domain::QueryState;
    ///
    /// let typed = QueryState::search("matrix ", "en-US");
    /// assert_eq!(typed.key(), QueryState::search("matrix", "en-US").key());
    /// assert_ne!(QueryState::search(" ", "en-US").key(), QueryState::listing("en-US").key());
    /// ```
    #[must_use]
    pub fn key(&self) -> QueryKey {
        QueryKey {
            search: self.is_search(),
            text: self.text.trim().to_string(),
            locale: self.locale.clone(),
        }
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::listing(DEFAULT_LOCALE)
    }
}
