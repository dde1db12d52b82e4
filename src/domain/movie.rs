//! Movie domain models.
//!
//! [`MovieSummary`] is the unit shown on a grid card, [`Page`] is one fetched
//! slice of a paginated listing, and [`MovieDetails`] backs the detail view.
//! All of them are immutable once built from a validated API response.

use serde::{Deserialize, Serialize};

/// Stable movie identifier assigned by the remote catalog.
pub type MovieId = u64;

/// Highest rating the catalog reports.
pub const MAX_RATING: f32 = 10.0;

/// A movie as shown on a grid card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: MovieId,
    pub title: String,
    /// Relative poster path (e.g. `/abc.jpg`), `None` when the catalog has no poster.
    pub poster_path: Option<String>,
    /// Average vote in `[0, 10]`.
    pub rating: f32,
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: String,
}

impl MovieSummary {
    /// Rating rounded to one decimal, the way cards display it.
    #[must_use]
    pub fn display_rating(&self) -> String {
        format!("{:.1}", self.rating)
    }

    /// Four-digit release year, if the release date is known.
    ///
    /// ```
    /// use reelgrid::domain::MovieSummary;
    ///
    /// let movie = MovieSummary {
    ///     id: 603,
    ///     title: "The Matrix".into(),
    ///     poster_path: None,
    ///     rating: 8.2,
    ///     release_date: Some("1999-03-30".into()),
    ///     overview: String::new(),
    /// };
    /// assert_eq!(movie.release_year(), Some("1999"));
    /// ```
    #[must_use]
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .filter(|year| year.chars().all(|c| c.is_ascii_digit()))
    }
}

/// One page of a paginated movie listing.
///
/// Pages are 1-based and never mutated after creation; the pagination layer
/// appends them in page order to build the flattened movie sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
    pub movies: Vec<MovieSummary>,
    pub total_pages: u32,
    pub total_results: u64,
}

impl Page {
    /// An empty terminal page, used for blank searches.
    #[must_use]
    pub const fn empty(number: u32) -> Self {
        Self {
            number,
            movies: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }

    /// Whether another page may follow this one.
    ///
    /// An empty page always ends pagination, even if the catalog claims more
    /// pages exist.
    #[must_use]
    pub fn has_next(&self) -> bool {
        !self.movies.is_empty() && self.number < self.total_pages
    }
}

/// A genre tag on a movie detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// A billed cast member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    pub character: String,
}

/// Full movie information for the detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub summary: MovieSummary,
    pub tagline: Option<String>,
    pub genres: Vec<Genre>,
    /// Runtime in minutes, `None` when unknown or zero.
    pub runtime: Option<u32>,
    pub budget: u64,
    pub revenue: u64,
    pub status: String,
    pub director: Option<String>,
    /// YouTube key of the first official trailer.
    pub trailer_key: Option<String>,
    pub cast: Vec<CastMember>,
}

impl MovieDetails {
    /// Trailer URL on YouTube, if a trailer is known.
    #[must_use]
    pub fn trailer_url(&self) -> Option<String> {
        self.trailer_key
            .as_ref()
            .map(|key| format!("https://www.youtube.com/watch?v={key}"))
    }
}

/// Formats a runtime in minutes as `"{h}h {m}m"`.
///
/// ```
/// use reelgrid::domain::movie::format_runtime;
///
/// assert_eq!(format_runtime(136), "2h 16m");
/// assert_eq!(format_runtime(45), "0h 45m");
/// ```
#[must_use]
pub fn format_runtime(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Formats a whole-dollar amount with thousands separators.
///
/// ```
/// use reelgrid::domain::movie::format_money;
///
/// assert_eq!(format_money(63_000_000), "$63,000,000");
/// assert_eq!(format_money(0), "$0");
/// ```
#[must_use]
pub fn format_money(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("${out}")
}

/// Poster size buckets offered by the image CDN, smallest first.
const POSTER_SIZES: [(u32, &str); 6] = [
    (92, "w92"),
    (154, "w154"),
    (185, "w185"),
    (342, "w342"),
    (500, "w500"),
    (780, "w780"),
];

/// Builds a poster image URL, picking the smallest bucket that covers `width`.
///
/// ```
/// use reelgrid::domain::movie::poster_url;
///
/// assert_eq!(poster_url("/p.jpg", 300), "https://image.tmdb.org/t/p/w342/p.jpg");
/// assert_eq!(poster_url("/p.jpg", 2000), "https://image.tmdb.org/t/p/original/p.jpg");
/// ```
#[must_use]
pub fn poster_url(path: &str, width: u32) -> String {
    let size = POSTER_SIZES
        .iter()
        .find(|(max, _)| width <= *max)
        .map_or("original", |(_, name)| name);
    format!("https://image.tmdb.org/t/p/{size}{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: MovieId) -> MovieSummary {
        MovieSummary {
            id,
            title: format!("Movie {id}"),
            poster_path: None,
            rating: 7.26,
            release_date: None,
            overview: String::new(),
        }
    }

    #[test]
    fn empty_page_never_has_next() {
        let page = Page {
            number: 1,
            movies: vec![],
            total_pages: 40,
            total_results: 800,
        };
        assert!(!page.has_next());
    }

    #[test]
    fn last_page_has_no_next() {
        let page = Page {
            number: 3,
            movies: vec![movie(1)],
            total_pages: 3,
            total_results: 41,
        };
        assert!(!page.has_next());

        let earlier = Page { number: 2, ..page };
        assert!(earlier.has_next());
    }

    #[test]
    fn release_year_rejects_garbage() {
        let mut m = movie(1);
        m.release_date = Some(String::new());
        assert_eq!(m.release_year(), None);
        m.release_date = Some("soon".into());
        assert_eq!(m.release_year(), None);
    }

    #[test]
    fn rating_is_shown_with_one_decimal() {
        assert_eq!(movie(1).display_rating(), "7.3");
    }

    #[test]
    fn money_groups_thousands() {
        assert_eq!(format_money(1_234), "$1,234");
        assert_eq!(format_money(999), "$999");
        assert_eq!(format_money(1_000_000), "$1,000,000");
    }
}
