//! Client for the TMDB-compatible movie API.
//!
//! Requests are planned here and executed by the plugin host; responses come
//! back as raw bytes and are validated into domain types. Wire structs stay
//! private so nothing outside this module sees unvalidated data.

use super::request::{HttpRequest, HttpResponse, RequestContext};
use crate::domain::movie::MAX_RATING;
use crate::domain::{
    CastMember, Genre, MovieDetails, MovieId, MovieSummary, Page, QueryKind, QueryState,
    ReelgridError, Result,
};
use crate::grid::FetchTicket;
use serde::Deserialize;
use std::collections::BTreeMap;
use url::Url;

/// API root used when configuration does not override it.
pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Billed cast members kept on a detail record.
const TOP_CAST: usize = 10;

/// Outcome of planning a page fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchStart {
    /// The page is known without a request (blank searches).
    Ready(Page),
    /// The page must be requested.
    Request(HttpRequest),
}

/// Loads one page of a query.
///
/// Split in two halves because the host performs the request: `start` plans it,
/// `finish` turns the response into a validated [`Page`].
pub trait PageFetcher {
    /// Plans the request for `ticket.page` of `query`.
    ///
    /// # Errors
    ///
    /// Returns [`ReelgridError::Config`] if the request URL cannot be built.
    fn start(&self, query: &QueryState, ticket: FetchTicket) -> Result<FetchStart>;

    /// Validates a page response.
    ///
    /// # Errors
    ///
    /// Returns [`ReelgridError::Fetch`] for non-success statuses and
    /// [`ReelgridError::Validation`] for bodies that do not decode.
    fn finish(&self, response: &HttpResponse) -> Result<Page>;
}

/// TMDB client configuration.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    /// Validated absolute URL, re-parsed per request.
    base: String,
    access_token: Option<String>,
}

impl TmdbClient {
    /// Creates a client for `base_url`, optionally authenticating with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ReelgridError::Config`] if `base_url` is not an absolute URL
    /// that can carry path segments.
    pub fn new(base_url: &str, access_token: Option<String>) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| ReelgridError::Config(format!("invalid api_base_url '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ReelgridError::Config(format!(
                "api_base_url '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            base: base.into(),
            access_token: access_token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Client for the public TMDB endpoint.
    #[must_use]
    pub fn public(access_token: Option<String>) -> Self {
        Self {
            base: DEFAULT_API_BASE_URL.to_string(),
            access_token: access_token.filter(|t| !t.trim().is_empty()),
        }
    }

    fn endpoint(&self, segments: &[&str], params: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&self.base)
            .map_err(|e| ReelgridError::Config(format!("invalid api_base_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ReelgridError::Config("api_base_url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    fn headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("accept".to_string(), "application/json".to_string());
        if let Some(token) = &self.access_token {
            headers.insert("Authorization".to_string(), format!("Bearer {token}"));
        }
        headers
    }

    /// Plans the detail request for one movie, with credits and videos appended.
    ///
    /// # Errors
    ///
    /// Returns [`ReelgridError::Config`] if the request URL cannot be built.
    pub fn details_request(&self, movie_id: MovieId, locale: &str) -> Result<HttpRequest> {
        let id = movie_id.to_string();
        let url = self.endpoint(
            &["movie", id.as_str()],
            &[("language", locale), ("append_to_response", "credits,videos")],
        )?;
        Ok(HttpRequest {
            url: url.into(),
            headers: self.headers(),
            context: RequestContext::Details(movie_id).to_map(),
        })
    }

    /// Validates a detail response.
    ///
    /// # Errors
    ///
    /// Same as [`PageFetcher::finish`].
    pub fn finish_details(&self, response: &HttpResponse) -> Result<MovieDetails> {
        let wire: WireDetails = decode(response)?;
        Ok(wire.into_details())
    }
}

impl PageFetcher for TmdbClient {
    fn start(&self, query: &QueryState, ticket: FetchTicket) -> Result<FetchStart> {
        let page = ticket.page.to_string();
        let url = match query.kind() {
            QueryKind::Blank => return Ok(FetchStart::Ready(Page::empty(ticket.page))),
            QueryKind::Listing => self.endpoint(
                &["movie", "popular"],
                &[("language", query.locale.as_str()), ("page", page.as_str())],
            )?,
            QueryKind::Search(text) => self.endpoint(
                &["search", "movie"],
                &[
                    ("query", text),
                    ("language", query.locale.as_str()),
                    ("page", page.as_str()),
                ],
            )?,
        };

        tracing::debug!(url = %url, page = ticket.page, "planned page request");
        Ok(FetchStart::Request(HttpRequest {
            url: url.into(),
            headers: self.headers(),
            context: RequestContext::Page(ticket).to_map(),
        }))
    }

    fn finish(&self, response: &HttpResponse) -> Result<Page> {
        let wire: WirePage = decode(response)?;
        wire.into_page()
    }
}

fn decode<T: for<'de> Deserialize<'de>>(response: &HttpResponse) -> Result<T> {
    if !response.is_success() {
        let detail = serde_json::from_slice::<WireStatus>(&response.body)
            .ok()
            .and_then(|s| s.status_message)
            .unwrap_or_default();
        return Err(ReelgridError::Fetch(
            format!("API Error: HTTP {} {detail}", response.status)
                .trim_end()
                .to_string(),
        ));
    }
    serde_json::from_slice(&response.body)
        .map_err(|e| ReelgridError::Validation(format!("unexpected response body: {e}")))
}

#[derive(Deserialize)]
struct WireStatus {
    status_message: Option<String>,
}

#[derive(Deserialize)]
struct WirePage {
    page: u32,
    results: Vec<WireMovie>,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    total_results: u64,
}

impl WirePage {
    fn into_page(self) -> Result<Page> {
        if self.page == 0 {
            return Err(ReelgridError::Validation("page numbers start at 1".into()));
        }
        Ok(Page {
            number: self.page,
            movies: self.results.into_iter().map(WireMovie::into_summary).collect(),
            total_pages: self.total_pages,
            total_results: self.total_results,
        })
    }
}

#[derive(Deserialize)]
struct WireMovie {
    id: MovieId,
    title: String,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    vote_average: Option<f32>,
    #[serde(default)]
    release_date: Option<String>,
}

impl WireMovie {
    fn into_summary(self) -> MovieSummary {
        let rating = self
            .vote_average
            .filter(|r| r.is_finite())
            .unwrap_or(0.0)
            .clamp(0.0, MAX_RATING);
        MovieSummary {
            id: self.id,
            title: self.title,
            poster_path: non_empty(self.poster_path),
            rating,
            release_date: non_empty(self.release_date),
            overview: self.overview.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct WireDetails {
    #[serde(flatten)]
    movie: WireMovie,
    #[serde(default)]
    tagline: Option<String>,
    #[serde(default)]
    genres: Vec<Genre>,
    #[serde(default)]
    runtime: Option<u32>,
    #[serde(default)]
    budget: u64,
    #[serde(default)]
    revenue: u64,
    #[serde(default)]
    status: String,
    #[serde(default)]
    credits: WireCredits,
    #[serde(default)]
    videos: WireVideos,
}

#[derive(Deserialize, Default)]
struct WireCredits {
    #[serde(default)]
    cast: Vec<WireCast>,
    #[serde(default)]
    crew: Vec<WireCrew>,
}

#[derive(Deserialize)]
struct WireCast {
    name: String,
    #[serde(default)]
    character: String,
    #[serde(default)]
    order: u32,
}

#[derive(Deserialize)]
struct WireCrew {
    name: String,
    #[serde(default)]
    job: String,
}

#[derive(Deserialize, Default)]
struct WireVideos {
    #[serde(default)]
    results: Vec<WireVideo>,
}

#[derive(Deserialize)]
struct WireVideo {
    key: String,
    #[serde(default)]
    site: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    official: bool,
}

impl WireDetails {
    fn into_details(self) -> MovieDetails {
        let director = self
            .credits
            .crew
            .iter()
            .find(|c| c.job == "Director")
            .map(|c| c.name.clone());

        let mut trailers: Vec<&WireVideo> = self
            .videos
            .results
            .iter()
            .filter(|v| v.site == "YouTube" && v.kind == "Trailer")
            .collect();
        trailers.sort_by_key(|v| !v.official);
        let trailer_key = trailers.first().map(|v| v.key.clone());

        let mut cast = self.credits.cast;
        cast.sort_by_key(|c| c.order);
        let cast = cast
            .into_iter()
            .take(TOP_CAST)
            .map(|c| CastMember {
                name: c.name,
                character: c.character,
            })
            .collect();

        MovieDetails {
            summary: self.movie.into_summary(),
            tagline: non_empty(self.tagline),
            genres: self.genres,
            runtime: self.runtime.filter(|m| *m > 0),
            budget: self.budget,
            revenue: self.revenue,
            status: self.status,
            director,
            trailer_key,
            cast,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
