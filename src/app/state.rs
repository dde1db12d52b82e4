//! Application state and view model computation.
//!
//! [`AppState`] is the single source of truth for everything on screen: the
//! infinite query behind the browse grid, the favorites overlay, the open detail
//! page, and one [`GridPane`] (virtualizer, selection, scroll) per grid. Event
//! handling mutates it; [`AppState::layout`] turns it into a
//! [`UIViewModel`] for the renderer.
//!
//! The grid pipeline runs in one direction on every change:
//!
//! ```text
//! movies → row_count(columns) → Virtualizer::set_row_count → range(scroll)
//!        → measure visible rows → maybe_fetch_next(last visible row)
//! ```
//!
//! Only rows inside the virtual range are measured or turned into cards, so the
//! cost of a frame does not grow with the number of loaded pages.

use super::modes::{InputMode, SearchFocus, ViewMode};
use super::Action;
use crate::cache::{self, CacheKind, QueryCache};
use crate::domain::movie::{format_money, format_runtime, poster_url};
use crate::domain::{
    Favorite, MovieDetails, MovieId, MovieSummary, QueryKind, QueryState, ReelgridError,
};
use crate::favorites::{FavoriteToggles, ToggleRequest, ToggleState};
use crate::grid::{
    partition, Acceptance, FetchTicket, InfiniteQuery, LayoutObserver, ResponsiveColumns,
    VirtualRow, Virtualizer, VirtualizerOptions,
};
use crate::remote::{FetchStart, HttpResponse, PageFetcher, TmdbClient};
use crate::ui::helpers::{clip_ranges, highlight_ranges, wrap};
use crate::ui::layout::{self, GridMetrics};
use crate::ui::viewmodel::{
    Card, Content, DetailLine, DetailView, FooterInfo, GridRow, GridView, HeaderInfo,
    LoaderState, Notice, NoticeKind, RowKind, SearchBarInfo, TitleLine, UIViewModel,
};
use crate::ui::Theme;
use crate::worker::WorkerMessage;
use crate::Config;
use chrono::Utc;
use fuzzy_matcher::skim::SkimMatcherV2;

/// Cache key of the favorites snapshot.
const FAVORITES_KEY: &str = "all";

/// Measure-and-recompute rounds per frame before settling for the last range.
const MEASURE_PASSES: usize = 3;

/// Title, subtitle and spacer above the detail body.
const DETAIL_HEADER_LINES: usize = 3;
/// Notice message, subtitle and spacer.
const DETAIL_NOTICE_LINES: usize = 3;
/// Horizontal margin on each side of the detail body.
const DETAIL_MARGIN: usize = 2;
/// Poster width requested for the detail page link, in pixels.
const POSTER_WIDTH: u32 = 500;

/// Selection movement inside a grid or detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
}

/// Virtualizer plus cursor for one grid.
#[derive(Debug, Clone)]
struct GridPane {
    virtualizer: Virtualizer,
    /// Index into the pane's flat item list.
    selected: usize,
    /// First visible line of the scrollable surface.
    scroll: usize,
    /// Set when rows were reflowed; the next refresh scrolls to the selection.
    follow_pending: bool,
}

impl GridPane {
    fn new(options: VirtualizerOptions) -> Self {
        Self {
            virtualizer: Virtualizer::new(options),
            selected: 0,
            scroll: 0,
            follow_pending: false,
        }
    }

    fn reset(&mut self) {
        self.selected = 0;
        self.scroll = 0;
        self.virtualizer.set_row_count(0, false);
        self.virtualizer.reset_measurements();
    }

    fn clamp_selection(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn clamp_scroll(&mut self, viewport: usize) {
        self.scroll = self.scroll.min(self.virtualizer.max_scroll(viewport));
    }

    fn scroll_by(&mut self, delta: isize, viewport: usize) {
        self.scroll = self.scroll.saturating_add_signed(delta);
        self.clamp_scroll(viewport);
    }

    fn apply_movement(&mut self, movement: Movement, len: usize, columns: usize, viewport: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let last = len - 1;
        let current = self.selected.min(last);
        let real_rows = partition::row_count(len, columns);

        self.selected = match movement {
            Movement::Left => current.saturating_sub(1),
            Movement::Right => (current + 1).min(last),
            Movement::Up => current.checked_sub(columns).unwrap_or(current),
            Movement::Down => {
                if current + columns <= last {
                    current + columns
                } else if partition::row_of(current, columns) < partition::row_of(last, columns) {
                    last
                } else {
                    current
                }
            }
            Movement::PageUp | Movement::PageDown => {
                let top = self
                    .virtualizer
                    .offset_of(partition::row_of(current, columns));
                let target = if movement == Movement::PageDown {
                    top + viewport.max(1)
                } else {
                    top.saturating_sub(viewport.max(1))
                };
                let row = self
                    .virtualizer
                    .row_at(target)
                    .unwrap_or(real_rows - 1)
                    .min(real_rows - 1);
                (row * columns + current % columns).min(last)
            }
            Movement::Home => 0,
            Movement::End => last,
        };
    }

    /// Scrolls just enough to show the selected row. Returns whether the scroll
    /// offset moved.
    fn reveal_selected(&mut self, columns: usize, viewport: usize) -> bool {
        let row = partition::row_of(self.selected, columns);
        if row >= self.virtualizer.real_rows() || viewport == 0 {
            return false;
        }
        let top = self.virtualizer.offset_of(row);
        let bottom = top + self.virtualizer.row_height(row);
        let before = self.scroll;

        if top < self.scroll || bottom - top > viewport {
            self.scroll = top;
        } else if bottom > self.scroll + viewport {
            self.scroll = bottom - viewport;
        }
        self.scroll != before
    }

    /// After a wheel scroll, moves the selection onto a visible row so keyboard
    /// input continues from what the user is looking at.
    fn pull_selection_into_view(&mut self, len: usize, columns: usize, viewport: usize) {
        let real_rows = self.virtualizer.real_rows();
        if len == 0 || real_rows == 0 || viewport == 0 {
            return;
        }
        let row = partition::row_of(self.selected, columns);
        let top = self.virtualizer.offset_of(row);
        let bottom = top + self.virtualizer.row_height(row);
        let view_end = self.scroll + viewport;

        let target = if bottom <= self.scroll {
            let first = self.virtualizer.row_at(self.scroll).unwrap_or(0);
            if self.virtualizer.offset_of(first) < self.scroll && first + 1 < real_rows {
                first + 1
            } else {
                first
            }
        } else if top >= view_end {
            let last = self.virtualizer.row_at(view_end - 1).unwrap_or(0);
            let last_end = self.virtualizer.offset_of(last) + self.virtualizer.row_height(last);
            if last_end > view_end && last > 0 {
                last - 1
            } else {
                last
            }
        } else {
            return;
        };

        let target = target.min(real_rows - 1);
        self.selected = (target * columns + self.selected % columns).min(len - 1);
    }

    /// Computes the virtual range, measuring every row in it. Measurements that
    /// move rows trigger another round.
    fn measure_range(
        &mut self,
        items: &[MovieSummary],
        metrics: &GridMetrics,
        viewport: usize,
    ) -> Vec<VirtualRow> {
        for _ in 0..MEASURE_PASSES {
            self.clamp_scroll(viewport);
            let range = self.virtualizer.range(self.scroll, viewport);
            let mut moved = false;
            for row in &range {
                let height = if row.is_sentinel {
                    layout::LOADER_HEIGHT
                } else {
                    partition::row(items, metrics.columns, row.index)
                        .map_or(row.height, |cards| layout::row_height(cards, metrics))
                };
                moved |= self.virtualizer.measure(row.index, height);
            }
            if !moved {
                return range;
            }
        }
        self.clamp_scroll(viewport);
        self.virtualizer.range(self.scroll, viewport)
    }

    fn refresh(
        &mut self,
        items: &[MovieSummary],
        metrics: &GridMetrics,
        viewport: usize,
        follow_selection: bool,
    ) -> Vec<VirtualRow> {
        let follow_selection = follow_selection || std::mem::take(&mut self.follow_pending);
        if follow_selection {
            self.reveal_selected(metrics.columns, viewport);
        }
        let range = self.measure_range(items, metrics, viewport);
        if follow_selection && self.reveal_selected(metrics.columns, viewport) {
            return self.measure_range(items, metrics, viewport);
        }
        range
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailStatus {
    Loading,
    Ready(Box<MovieDetails>),
    Failed(String),
}

/// The open detail page.
#[derive(Debug, Clone)]
pub struct DetailState {
    pub movie: MovieSummary,
    pub status: DetailStatus,
    /// Screen restored by going back.
    pub return_to: ViewMode,
    /// First visible body line.
    pub scroll: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Viewport {
    rows: usize,
    cols: usize,
}

/// Central application state container.
#[derive(Debug, Clone)]
pub struct AppState {
    pub theme: Theme,
    pub input_mode: InputMode,
    pub view_mode: ViewMode,

    /// Text in the search box. Committed into `query` after the debounce.
    pub search_input: String,

    /// Pages of the committed query.
    pub query: InfiniteQuery,

    pub favorites: FavoriteToggles,
    pub detail: Option<DetailState>,

    client: TmdbClient,
    locale: String,
    debounce_secs: f64,
    /// Debounce timers requested but not yet fired.
    pending_timers: usize,

    columns: ResponsiveColumns,
    browse: GridPane,
    favorites_pane: GridPane,

    details_cache: QueryCache<MovieDetails>,
    favorites_cache: QueryCache<Vec<Favorite>>,

    viewport: Viewport,
}

impl AppState {
    #[must_use]
    pub fn new(config: &Config, client: TmdbClient, theme: Theme) -> Self {
        let options = VirtualizerOptions {
            estimate_row_height: config.row_height,
            overscan: config.overscan,
        };
        Self {
            theme,
            input_mode: InputMode::Normal,
            view_mode: ViewMode::Browse,
            search_input: String::new(),
            query: InfiniteQuery::new(QueryState::listing(config.locale.clone())),
            favorites: FavoriteToggles::new(),
            detail: None,
            client,
            locale: config.locale.clone(),
            debounce_secs: std::time::Duration::from_millis(config.search_debounce_ms)
                .as_secs_f64(),
            pending_timers: 0,
            columns: ResponsiveColumns::default(),
            browse: GridPane::new(options),
            favorites_pane: GridPane::new(options),
            details_cache: QueryCache::new(),
            favorites_cache: QueryCache::new(),
            viewport: Viewport::default(),
        }
    }

    /// Loads page 1 of the default listing and the favorites snapshot.
    /// Issues the first requests once web access is granted. Text typed into
    /// the search box before that is committed here.
    pub fn start(&mut self) -> Vec<Action> {
        let first = QueryState::search(self.search_input.clone(), self.locale.clone());
        let mut actions = self.restart_query(first);
        actions.push(Action::PostToWorker(WorkerMessage::load_favorites()));
        actions
    }


    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns.columns()
    }

    // ---- search -------------------------------------------------------------

    /// Opens the search box; searching always happens on the browse grid.
    pub fn enter_search(&mut self) -> Vec<Action> {
        self.input_mode = InputMode::Search(SearchFocus::Typing);
        self.view_mode = ViewMode::Browse;
        self.refresh_browse(false)
    }

    pub fn push_search_char(&mut self, c: char) -> Vec<Action> {
        self.search_input.push(c);
        self.schedule_commit()
    }

    pub fn pop_search_char(&mut self) -> Vec<Action> {
        if self.search_input.pop().is_none() {
            return Vec::new();
        }
        self.schedule_commit()
    }

    /// Commits the typed text now and hands the keys back to the grid.
    pub fn focus_results(&mut self) -> Vec<Action> {
        self.input_mode = InputMode::Search(SearchFocus::Navigating);
        let mut actions = self.commit_search();
        actions.extend(self.refresh_browse(false));
        actions
    }

    /// Clears the query and returns to the default listing.
    pub fn exit_search(&mut self) -> Vec<Action> {
        self.input_mode = InputMode::Normal;
        self.search_input.clear();
        let mut actions = self.commit_search();
        actions.extend(self.refresh_browse(false));
        actions
    }

    fn schedule_commit(&mut self) -> Vec<Action> {
        if self.debounce_secs <= 0.0 {
            return self.commit_search();
        }
        self.pending_timers += 1;
        vec![Action::SetTimeout(self.debounce_secs)]
    }

    /// A debounce timer elapsed. Every keystroke schedules one timer of the same
    /// length, so the input has been idle for the full period exactly when the
    /// last outstanding timer fires.
    pub fn timer_fired(&mut self) -> Vec<Action> {
        if self.pending_timers == 0 {
            return Vec::new();
        }
        self.pending_timers -= 1;
        if self.pending_timers > 0 {
            return Vec::new();
        }
        self.commit_search()
    }

    /// Whether the search box holds text that differs from the loaded query.
    #[must_use]
    pub fn is_search_pending(&self) -> bool {
        let typed = QueryState::search(self.search_input.clone(), self.locale.clone());
        typed.key() != self.query.query().key()
    }

    /// Restarts the grid query if the typed text names a different result set.
    ///
    /// Nothing is requested before [`start`](Self::start); the typed text waits
    /// for it.
    pub fn commit_search(&mut self) -> Vec<Action> {
        if self.query.generation() == 0 {
            tracing::debug!("search deferred until web access is granted");
            return Vec::new();
        }
        let next = QueryState::search(self.search_input.clone(), self.locale.clone());
        if next.key() == self.query.query().key() {
            return Vec::new();
        }
        tracing::debug!(query = %next.text, "committing search");
        self.restart_query(next)
    }

    // ---- pages ----------------------------------------------------------------

    fn restart_query(&mut self, query: QueryState) -> Vec<Action> {
        let ticket = self.query.restart(query);
        self.browse.reset();
        self.start_fetch(ticket)
    }

    fn start_fetch(&mut self, ticket: FetchTicket) -> Vec<Action> {
        match self.client.start(self.query.query(), ticket) {
            Ok(FetchStart::Request(request)) => vec![Action::WebRequest(request)],
            Ok(FetchStart::Ready(page)) => {
                self.query.accept(ticket, Ok(page));
                self.refresh_browse(false)
            }
            Err(err) => {
                self.query.accept(ticket, Err(err));
                Vec::new()
            }
        }
    }

    /// Feeds a page response into the query. Returns whether anything visible
    /// changed, plus follow-up requests.
    pub fn apply_page(&mut self, ticket: FetchTicket, response: &HttpResponse) -> (bool, Vec<Action>) {
        let result = self.client.finish(response);
        match self.query.accept(ticket, result) {
            Acceptance::Applied | Acceptance::Failed => (true, self.refresh_browse(false)),
            Acceptance::Stale | Acceptance::OutOfOrder => (false, Vec::new()),
        }
    }

    /// Retries whatever failed on the current screen.
    pub fn retry(&mut self) -> Vec<Action> {
        match self.view_mode {
            ViewMode::Detail => return self.retry_detail(),
            ViewMode::Favorites => return self.retry_favorites(),
            ViewMode::Browse => {}
        }
        match self.query.retry() {
            Some(ticket) => {
                if ticket.page == 1 {
                    self.browse.reset();
                }
                self.start_fetch(ticket)
            }
            None => Vec::new(),
        }
    }

    // ---- grid -----------------------------------------------------------------

    /// Records the plugin size and re-runs the grid pipeline when it changed.
    pub fn set_viewport(&mut self, rows: usize, cols: usize) -> Vec<Action> {
        if !self.apply_viewport(rows, cols) {
            return Vec::new();
        }
        self.refresh_favorites(false);
        self.refresh_browse(false)
    }

    fn apply_viewport(&mut self, rows: usize, cols: usize) -> bool {
        let next = Viewport { rows, cols };
        if next == self.viewport {
            return false;
        }
        self.viewport = next;

        if let Some(columns) = self.columns.observe(cols) {
            tracing::debug!(columns, width = cols, "grid reflowed");
            // Row indices now name different movies.
            for pane in [&mut self.browse, &mut self.favorites_pane] {
                pane.virtualizer.reset_measurements();
                pane.follow_pending = true;
            }
        }
        true
    }

    fn search_bar_visible(&self) -> bool {
        self.view_mode == ViewMode::Browse
            && (matches!(self.input_mode, InputMode::Search(_)) || !self.search_input.is_empty())
    }

    fn grid_height(&self) -> usize {
        layout::content_height(self.viewport.rows, self.search_bar_visible())
    }

    fn metrics(&self) -> GridMetrics {
        GridMetrics::new(self.viewport.cols, self.columns.columns())
    }

    /// Re-runs the pipeline for the browse grid and requests the next page if
    /// the virtual range reaches the last row.
    fn refresh_browse(&mut self, follow_selection: bool) -> Vec<Action> {
        let metrics = self.metrics();
        let height = self.grid_height();
        let movies = self.query.movies();
        let real_rows = partition::row_count(movies.len(), metrics.columns);
        self.browse.clamp_selection(movies.len());
        self.browse
            .virtualizer
            .set_row_count(real_rows, self.query.has_next_page());
        if height == 0 {
            return Vec::new();
        }

        let range = self.browse.refresh(movies, &metrics, height, follow_selection);
        let Some(last) = range.last() else {
            return Vec::new();
        };
        match self.query.maybe_fetch_next(last.index, real_rows) {
            Some(ticket) => self.start_fetch(ticket),
            None => Vec::new(),
        }
    }

    fn favorite_movies(&self) -> Vec<MovieSummary> {
        self.favorites.list().iter().map(Favorite::to_summary).collect()
    }

    fn refresh_favorites(&mut self, follow_selection: bool) {
        let items = self.favorite_movies();
        let metrics = self.metrics();
        let height = self.grid_height();
        self.favorites_pane.clamp_selection(items.len());
        self.favorites_pane
            .virtualizer
            .set_row_count(partition::row_count(items.len(), metrics.columns), false);
        if height > 0 {
            self.favorites_pane
                .refresh(&items, &metrics, height, follow_selection);
        }
    }

    /// Re-runs the pipeline for the current screen, keeping the selection
    /// visible.
    pub fn refresh(&mut self) -> Vec<Action> {
        match self.view_mode {
            ViewMode::Browse => self.refresh_browse(true),
            ViewMode::Favorites => {
                self.refresh_favorites(true);
                Vec::new()
            }
            ViewMode::Detail => Vec::new(),
        }
    }

    pub fn move_selection(&mut self, movement: Movement) -> Vec<Action> {
        let columns = self.columns.columns();
        let height = self.grid_height();
        match self.view_mode {
            ViewMode::Browse => {
                let len = self.query.movies().len();
                self.browse.apply_movement(movement, len, columns, height);
                self.query.resume();
                self.refresh_browse(true)
            }
            ViewMode::Favorites => {
                let len = self.favorites.len();
                self.favorites_pane
                    .apply_movement(movement, len, columns, height);
                self.refresh_favorites(true);
                Vec::new()
            }
            ViewMode::Detail => {
                self.scroll_detail(movement);
                Vec::new()
            }
        }
    }

    /// Mouse wheel scroll by `delta` lines (negative is up).
    pub fn scroll_lines(&mut self, delta: isize) -> Vec<Action> {
        let columns = self.columns.columns();
        let height = self.grid_height();
        match self.view_mode {
            ViewMode::Browse => {
                let len = self.query.movies().len();
                self.browse.scroll_by(delta, height);
                self.browse.pull_selection_into_view(len, columns, height);
                self.query.resume();
                self.refresh_browse(false)
            }
            ViewMode::Favorites => {
                let len = self.favorites.len();
                self.favorites_pane.scroll_by(delta, height);
                self.favorites_pane
                    .pull_selection_into_view(len, columns, height);
                self.refresh_favorites(false);
                Vec::new()
            }
            ViewMode::Detail => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.scroll = detail.scroll.saturating_add_signed(delta);
                }
                Vec::new()
            }
        }
    }

    /// Movie under the cursor on the current screen.
    #[must_use]
    pub fn selected_movie(&self) -> Option<MovieSummary> {
        match self.view_mode {
            ViewMode::Browse => self.query.movies().get(self.browse.selected).cloned(),
            ViewMode::Favorites => self
                .favorites
                .list()
                .get(self.favorites_pane.selected)
                .map(Favorite::to_summary),
            ViewMode::Detail => self.detail.as_ref().map(|d| d.movie.clone()),
        }
    }

    // ---- favorites ------------------------------------------------------------

    pub fn toggle_favorite(&mut self) -> Vec<Action> {
        let Some(movie) = self.selected_movie() else {
            return Vec::new();
        };
        let Some(request) = self.favorites.toggle(&movie) else {
            return Vec::new();
        };
        self.favorites_changed();

        let message = match request {
            ToggleRequest::Add(favorite) => WorkerMessage::add_favorite(favorite),
            ToggleRequest::Remove(movie_id) => WorkerMessage::remove_favorite(movie_id),
        };
        vec![Action::PostToWorker(message)]
    }

    /// Applies the store's answer to a toggle, then reloads the snapshot to
    /// reconcile with whatever the store now holds.
    pub fn settle_favorite(
        &mut self,
        movie_id: MovieId,
        outcome: std::result::Result<(), &ReelgridError>,
    ) -> Vec<Action> {
        let state = self.favorites.settle(movie_id, outcome);
        tracing::debug!(movie_id, state = ?state, "favorite toggle settled");
        self.favorites_changed();
        self.favorites_cache.invalidate_kind(CacheKind::Favorites);
        if self.favorites.has_pending() {
            return Vec::new();
        }
        vec![Action::PostToWorker(WorkerMessage::load_favorites())]
    }

    /// The worker could not read the favorites store.
    pub fn favorites_load_failed(&mut self, message: &str) {
        tracing::warn!(error = %message, "favorites snapshot failed to load");
        self.favorites.load_failed(message);
        self.favorites_changed();
    }

    fn retry_favorites(&mut self) -> Vec<Action> {
        if self.favorites.load_error().is_none() {
            return Vec::new();
        }
        self.favorites.clear_load_error();
        self.favorites_cache
            .invalidate(CacheKind::Favorites, FAVORITES_KEY);
        self.favorites_changed();
        vec![Action::PostToWorker(WorkerMessage::load_favorites())]
    }

    pub fn favorites_loaded(&mut self, favorites: Vec<Favorite>) {
        tracing::debug!(count = favorites.len(), "favorites snapshot loaded");
        self.favorites_cache.insert(
            CacheKind::Favorites,
            FAVORITES_KEY,
            favorites.clone(),
            Utc::now(),
            cache::favorites_ttl(),
        );
        self.favorites.replace_snapshot(favorites);
        self.favorites_changed();
    }

    fn favorites_changed(&mut self) {
        self.favorites_pane.virtualizer.reset_measurements();
        self.refresh_favorites(false);
    }

    pub fn show_favorites(&mut self) -> Vec<Action> {
        self.view_mode = ViewMode::Favorites;
        self.input_mode = InputMode::Normal;
        self.refresh_favorites(true);

        let fresh = self
            .favorites_cache
            .fresh(CacheKind::Favorites, FAVORITES_KEY, Utc::now())
            .is_some();
        if fresh {
            return Vec::new();
        }
        self.favorites.clear_load_error();
        self.refresh_favorites(false);
        vec![Action::PostToWorker(WorkerMessage::load_favorites())]
    }

    pub fn show_browse(&mut self) -> Vec<Action> {
        self.view_mode = ViewMode::Browse;
        self.refresh_browse(true)
    }

    // ---- detail ---------------------------------------------------------------

    fn details_key(&self, movie_id: MovieId) -> String {
        format!("{movie_id}:{}", self.locale)
    }

    /// Opens the detail page of the selected movie. Cached records show at once;
    /// stale ones are shown while a fresh copy is requested.
    pub fn open_detail(&mut self) -> Vec<Action> {
        if self.view_mode == ViewMode::Detail {
            return Vec::new();
        }
        let Some(movie) = self.selected_movie() else {
            return Vec::new();
        };
        let movie_id = movie.id;
        let key = self.details_key(movie_id);
        let (status, refetch) = match self.details_cache.get(CacheKind::Details, &key) {
            Some(entry) => (
                DetailStatus::Ready(Box::new(entry.data.clone())),
                entry.is_stale(Utc::now()),
            ),
            None => (DetailStatus::Loading, true),
        };

        tracing::debug!(movie_id, refetch, "opening detail page");
        self.detail = Some(DetailState {
            movie,
            status,
            return_to: self.view_mode,
            scroll: 0,
        });
        self.view_mode = ViewMode::Detail;

        if refetch {
            self.request_details(movie_id)
        } else {
            Vec::new()
        }
    }

    fn request_details(&mut self, movie_id: MovieId) -> Vec<Action> {
        match self.client.details_request(movie_id, &self.locale) {
            Ok(request) => vec![Action::WebRequest(request)],
            Err(err) => {
                if let Some(detail) = self.detail.as_mut().filter(|d| d.movie.id == movie_id) {
                    detail.status = DetailStatus::Failed(err.to_string());
                }
                Vec::new()
            }
        }
    }

    fn retry_detail(&mut self) -> Vec<Action> {
        let Some(detail) = self.detail.as_mut() else {
            return Vec::new();
        };
        if !matches!(detail.status, DetailStatus::Failed(_)) {
            return Vec::new();
        }
        detail.status = DetailStatus::Loading;
        let movie_id = detail.movie.id;
        self.request_details(movie_id)
    }

    /// Feeds a detail response into the cache and the open page. Returns whether
    /// the open page changed.
    pub fn apply_details(&mut self, movie_id: MovieId, response: &HttpResponse) -> bool {
        let result = self.client.finish_details(response);
        if let Ok(details) = &result {
            let key = self.details_key(movie_id);
            self.details_cache.insert(
                CacheKind::Details,
                key,
                details.clone(),
                Utc::now(),
                cache::details_ttl(),
            );
        }

        let Some(detail) = self.detail.as_mut().filter(|d| d.movie.id == movie_id) else {
            return false;
        };
        match result {
            Ok(details) => detail.status = DetailStatus::Ready(Box::new(details)),
            Err(err) => {
                tracing::warn!(movie_id, error = %err, "detail fetch failed");
                // A stale record on screen beats an error.
                if !matches!(detail.status, DetailStatus::Ready(_)) {
                    detail.status = DetailStatus::Failed(err.to_string());
                }
            }
        }
        true
    }

    fn scroll_detail(&mut self, movement: Movement) {
        let page = layout::content_height(self.viewport.rows, false)
            .saturating_sub(DETAIL_HEADER_LINES)
            .max(1);
        let Some(detail) = self.detail.as_mut() else {
            return;
        };
        detail.scroll = match movement {
            Movement::Up | Movement::Left => detail.scroll.saturating_sub(1),
            Movement::Down | Movement::Right => detail.scroll + 1,
            Movement::PageUp => detail.scroll.saturating_sub(page),
            Movement::PageDown => detail.scroll + page,
            Movement::Home => 0,
            // Clamped to the last page when laid out.
            Movement::End => usize::MAX / 2,
        };
    }

    /// Leaves the detail page or the favorites grid.
    pub fn go_back(&mut self) -> Vec<Action> {
        match self.view_mode {
            ViewMode::Detail => {
                let return_to = self.detail.take().map_or(ViewMode::Browse, |d| d.return_to);
                self.view_mode = return_to;
                match return_to {
                    ViewMode::Favorites => {
                        self.refresh_favorites(false);
                        Vec::new()
                    }
                    _ => self.refresh_browse(false),
                }
            }
            ViewMode::Favorites => self.show_browse(),
            ViewMode::Browse => Vec::new(),
        }
    }

    // ---- view model -----------------------------------------------------------

    /// Computes the view model for a `rows` x `cols` frame.
    ///
    /// Only rows in the virtual range become cards. Rows are measured here too,
    /// so a frame drawn right after a resize already uses real heights.
    pub fn layout(&mut self, rows: usize, cols: usize) -> UIViewModel {
        self.apply_viewport(rows, cols);

        let content = match self.view_mode {
            ViewMode::Browse => self.browse_content(),
            ViewMode::Favorites => self.favorites_content(),
            ViewMode::Detail => self.detail_content(),
        };

        UIViewModel {
            header: self.compute_header(),
            footer: self.compute_footer(),
            search_bar: self.compute_search_bar(),
            content,
        }
    }

    fn browse_content(&mut self) -> Content {
        if self.query.first_page_failed() {
            return notice(NoticeKind::Error, "Couldn't load movies", "Press r to retry");
        }
        if self.query.is_loading_first() {
            return notice(NoticeKind::Loading, "Loading movies…", "");
        }
        if self.query.movies().is_empty() {
            return notice(NoticeKind::Empty, "No results found", "Try different keywords");
        }

        let metrics = self.metrics();
        let height = self.grid_height();
        let movies = self.query.movies();
        self.browse.virtualizer.set_row_count(
            partition::row_count(movies.len(), metrics.columns),
            self.query.has_next_page(),
        );
        let range = self.browse.refresh(movies, &metrics, height, false);

        let loader = if self.query.is_fetching_next() {
            LoaderState::Fetching
        } else if let Some(err) = self.query.error() {
            LoaderState::Failed(err.message.clone())
        } else {
            LoaderState::Idle
        };
        let pattern = match self.query.query().kind() {
            QueryKind::Search(text) => Some(text),
            QueryKind::Listing | QueryKind::Blank => None,
        };

        let rows = build_rows(&range, movies, &metrics, self.browse.selected, &self.favorites, pattern, &loader);
        Content::Grid(GridView {
            columns: metrics.columns,
            card_width: metrics.card_width,
            scroll: self.browse.scroll,
            viewport_height: height,
            total_height: self.browse.virtualizer.total_height(),
            rows,
        })
    }

    fn favorites_content(&mut self) -> Content {
        let items = self.favorite_movies();
        if items.is_empty() {
            return if self.favorites.load_error().is_some() {
                notice(NoticeKind::Error, "Couldn't load favorites", "Press r to retry")
            } else if self.favorites.is_loaded() {
                notice(NoticeKind::Empty, "No favorites yet", "Press f on any movie to add it")
            } else {
                notice(NoticeKind::Loading, "Loading favorites…", "")
            };
        }

        let metrics = self.metrics();
        let height = self.grid_height();
        self.favorites_pane.clamp_selection(items.len());
        self.favorites_pane
            .virtualizer
            .set_row_count(partition::row_count(items.len(), metrics.columns), false);
        let range = self.favorites_pane.refresh(&items, &metrics, height, false);

        let rows = build_rows(
            &range,
            &items,
            &metrics,
            self.favorites_pane.selected,
            &self.favorites,
            None,
            &LoaderState::Idle,
        );
        Content::Grid(GridView {
            columns: metrics.columns,
            card_width: metrics.card_width,
            scroll: self.favorites_pane.scroll,
            viewport_height: height,
            total_height: self.favorites_pane.virtualizer.total_height(),
            rows,
        })
    }

    fn detail_content(&mut self) -> Content {
        let width = self
            .viewport
            .cols
            .saturating_sub(DETAIL_MARGIN * 2)
            .max(1);
        let body_height = layout::content_height(self.viewport.rows, false)
            .saturating_sub(DETAIL_HEADER_LINES);

        let Some(detail) = self.detail.as_mut() else {
            return notice(NoticeKind::Empty, "No movie selected", "Press esc to go back");
        };
        let movie = &detail.movie;
        let is_favorite = self.favorites.is_favorite(movie.id);

        let (subtitle, lines, notice_info) = match &detail.status {
            DetailStatus::Ready(details) => (
                details_subtitle(details),
                details_lines(details, width),
                None,
            ),
            DetailStatus::Loading => (
                summary_subtitle(movie),
                overview_lines(&movie.overview, width),
                Some(Notice {
                    kind: NoticeKind::Loading,
                    message: "Loading details…".into(),
                    subtitle: String::new(),
                }),
            ),
            DetailStatus::Failed(_) => (
                summary_subtitle(movie),
                overview_lines(&movie.overview, width),
                Some(Notice {
                    kind: NoticeKind::Error,
                    message: "Couldn't load details".into(),
                    subtitle: "Press r to retry".into(),
                }),
            ),
        };

        let body_height = if notice_info.is_some() {
            body_height.saturating_sub(DETAIL_NOTICE_LINES)
        } else {
            body_height
        };
        detail.scroll = detail.scroll.min(lines.len().saturating_sub(body_height));

        Content::Detail(DetailView {
            title: movie.title.clone(),
            subtitle,
            is_favorite,
            lines: lines
                .into_iter()
                .skip(detail.scroll)
                .take(body_height)
                .collect(),
            notice: notice_info,
        })
    }

    fn compute_header(&self) -> HeaderInfo {
        let title = match self.view_mode {
            ViewMode::Browse => {
                let loaded = self.query.movies().len();
                let total = self.query.total_results();
                match self.query.query().kind() {
                    QueryKind::Listing if total > 0 => {
                        format!(" Popular Movies ({loaded} of {total}) ")
                    }
                    QueryKind::Listing => " Popular Movies ".to_string(),
                    QueryKind::Blank => " Search ".to_string(),
                    QueryKind::Search(text) => format!(" Results for \"{text}\" ({total}) "),
                }
            }
            ViewMode::Favorites => format!(" Favorites ({}) ", self.favorites.len()),
            ViewMode::Detail => self
                .detail
                .as_ref()
                .map_or_else(|| " Movie ".to_string(), |d| format!(" {} ", d.movie.title)),
        };
        HeaderInfo { title }
    }

    fn compute_footer(&self) -> FooterInfo {
        let keybindings = match (self.view_mode, self.input_mode) {
            (ViewMode::Detail, _) => "j/k: scroll  f: favorite  r: retry  Esc: back  q: quit",
            (ViewMode::Favorites, _) => {
                "hjkl: move  Enter: details  f: unfavorite  b: browse  /: search  q: quit"
            }
            (ViewMode::Browse, InputMode::Search(SearchFocus::Typing)) => {
                "Type to search  Enter: results  Esc: clear  arrows: move"
            }
            (ViewMode::Browse, InputMode::Search(SearchFocus::Navigating)) => {
                "hjkl: move  Enter: details  f: favorite  /: edit query  Esc: clear"
            }
            (ViewMode::Browse, InputMode::Normal) if self.query.error().is_some() => {
                "hjkl: move  r: retry  /: search  F: favorites  q: quit"
            }
            (ViewMode::Browse, InputMode::Normal) => {
                "hjkl: move  Enter: details  f: favorite  F: favorites  /: search  q: quit"
            }
        };
        FooterInfo {
            keybindings: keybindings.to_string(),
        }
    }

    fn compute_search_bar(&self) -> Option<SearchBarInfo> {
        self.search_bar_visible().then(|| SearchBarInfo {
            query: self.search_input.clone(),
            is_focused: self.input_mode.is_typing(),
            is_pending: self.is_search_pending(),
        })
    }
}

fn notice(kind: NoticeKind, message: &str, subtitle: &str) -> Content {
    Content::Notice(Notice {
        kind,
        message: message.to_string(),
        subtitle: subtitle.to_string(),
    })
}

/// Turns a virtual range into renderable rows.
fn build_rows(
    range: &[VirtualRow],
    items: &[MovieSummary],
    metrics: &GridMetrics,
    selected: usize,
    favorites: &FavoriteToggles,
    pattern: Option<&str>,
    loader: &LoaderState,
) -> Vec<GridRow> {
    let matcher = pattern.map(|p| (SkimMatcherV2::default(), p));

    range
        .iter()
        .map(|row| {
            let kind = if row.is_sentinel {
                RowKind::Loader(loader.clone())
            } else {
                let first = row.index * metrics.columns;
                let cards = partition::row(items, metrics.columns, row.index)
                    .unwrap_or_default()
                    .iter()
                    .enumerate()
                    .map(|(offset, movie)| {
                        let highlights = matcher.as_ref().map_or_else(Vec::new, |(m, p)| {
                            highlight_ranges(m, &movie.title, p)
                        });
                        card(movie, metrics, first + offset == selected, favorites, &highlights)
                    })
                    .collect();
                RowKind::Cards(cards)
            };
            GridRow {
                index: row.index,
                start: row.start,
                height: row.height,
                kind,
            }
        })
        .collect()
}

fn card(
    movie: &MovieSummary,
    metrics: &GridMetrics,
    is_selected: bool,
    favorites: &FavoriteToggles,
    highlights: &[(usize, usize)],
) -> Card {
    let title_lines = layout::title_lines(&movie.title, metrics.inner_width)
        .into_iter()
        .map(|line| TitleLine {
            highlight_ranges: clip_ranges(highlights, line.start, line.text.chars().count()),
            text: line.text,
        })
        .collect();
    let meta = match movie.release_year() {
        Some(year) => format!("★ {}  {year}", movie.display_rating()),
        None => format!("★ {}", movie.display_rating()),
    };

    Card {
        movie_id: movie.id,
        title_lines,
        meta,
        is_selected,
        is_favorite: favorites.is_favorite(movie.id),
        is_pending: matches!(
            favorites.state(movie.id),
            ToggleState::OptimisticPending { .. }
        ),
    }
}

fn summary_subtitle(movie: &MovieSummary) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(year) = movie.release_year() {
        parts.push(year.to_string());
    }
    parts.push(format!("★ {}", movie.display_rating()));
    parts.join(" · ")
}

fn details_subtitle(details: &MovieDetails) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(year) = details.summary.release_year() {
        parts.push(year.to_string());
    }
    if let Some(runtime) = details.runtime {
        parts.push(format_runtime(runtime));
    }
    parts.push(format!("★ {}", details.summary.display_rating()));
    parts.join(" · ")
}

fn overview_lines(overview: &str, width: usize) -> Vec<DetailLine> {
    if overview.trim().is_empty() {
        return vec![DetailLine::Dim("No overview available.".into())];
    }
    wrap(overview, width, usize::MAX)
        .into_iter()
        .map(|line| DetailLine::Text(line.text))
        .collect()
}

fn details_lines(details: &MovieDetails, width: usize) -> Vec<DetailLine> {
    let mut lines = Vec::new();

    if let Some(tagline) = &details.tagline {
        lines.extend(wrap(tagline, width, usize::MAX).into_iter().map(|l| DetailLine::Dim(l.text)));
        lines.push(DetailLine::Blank);
    }

    lines.push(DetailLine::Heading("Overview".into()));
    lines.extend(overview_lines(&details.summary.overview, width));

    if !details.genres.is_empty() {
        let genres: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
        lines.push(DetailLine::Blank);
        lines.push(DetailLine::Heading("Genres".into()));
        lines.push(DetailLine::Text(genres.join(", ")));
    }

    if let Some(director) = &details.director {
        lines.push(DetailLine::Blank);
        lines.push(DetailLine::Heading("Director".into()));
        lines.push(DetailLine::Text(director.clone()));
    }

    if !details.cast.is_empty() {
        lines.push(DetailLine::Blank);
        lines.push(DetailLine::Heading("Cast".into()));
        for member in &details.cast {
            let text = if member.character.is_empty() {
                member.name.clone()
            } else {
                format!("{} as {}", member.name, member.character)
            };
            lines.push(DetailLine::Text(text));
        }
    }

    lines.push(DetailLine::Blank);
    lines.push(DetailLine::Heading("Facts".into()));
    if !details.status.is_empty() {
        lines.push(DetailLine::Text(format!("Status: {}", details.status)));
    }
    if details.budget > 0 {
        lines.push(DetailLine::Text(format!("Budget: {}", format_money(details.budget))));
    }
    if details.revenue > 0 {
        lines.push(DetailLine::Text(format!("Revenue: {}", format_money(details.revenue))));
    }

    if let Some(url) = details.trailer_url() {
        lines.push(DetailLine::Blank);
        lines.push(DetailLine::Heading("Trailer".into()));
        lines.push(DetailLine::Dim(url));
    }

    if let Some(path) = &details.summary.poster_path {
        lines.push(DetailLine::Blank);
        lines.push(DetailLine::Heading("Poster".into()));
        lines.push(DetailLine::Dim(poster_url(path, POSTER_WIDTH)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RequestContext;
    use crate::ui::viewmodel::RowKind;

    fn config(debounce_ms: u64) -> Config {
        Config {
            search_debounce_ms: debounce_ms,
            ..Config::default()
        }
    }

    fn state_with(debounce_ms: u64) -> AppState {
        let client = TmdbClient::new(crate::remote::DEFAULT_API_BASE_URL, None).unwrap();
        AppState::new(&config(debounce_ms), client, Theme::default())
    }

    fn page_response(page: u32, count: u64, total_pages: u32) -> HttpResponse {
        let first = u64::from(page - 1) * count;
        let results: Vec<serde_json::Value> = (first..first + count)
            .map(|id| {
                serde_json::json!({
                    "id": id + 1,
                    "title": format!("Movie {}", id + 1),
                    "vote_average": 7.0,
                    "release_date": "2001-01-01",
                })
            })
            .collect();
        let body = serde_json::json!({
            "page": page,
            "results": results,
            "total_pages": total_pages,
            "total_results": u64::from(total_pages) * count,
        });
        HttpResponse {
            status: 200,
            body: body.to_string().into_bytes(),
        }
    }

    fn page_ticket(actions: &[Action]) -> FetchTicket {
        actions
            .iter()
            .find_map(|action| match action {
                Action::WebRequest(request) => match RequestContext::from_map(&request.context) {
                    Ok(RequestContext::Page(ticket)) => Some(ticket),
                    _ => None,
                },
                _ => None,
            })
            .expect("a page request")
    }

    fn page_requests(actions: &[Action]) -> usize {
        actions
            .iter()
            .filter(|a| matches!(a, Action::WebRequest(_)))
            .count()
    }

    /// Starts the listing on a 24x100 screen (three columns) with page 1 loaded.
    fn loaded(count: u64, total_pages: u32) -> AppState {
        let mut state = state_with(0);
        let ticket = page_ticket(&state.start());
        state.set_viewport(24, 100);
        let (changed, _) = state.apply_page(ticket, &page_response(1, count, total_pages));
        assert!(changed);
        state
    }

    fn notice_of(state: &mut AppState) -> Notice {
        match state.layout(24, 100).content {
            Content::Notice(notice) => notice,
            other => panic!("expected a notice, got {other:?}"),
        }
    }

    fn grid_of(state: &mut AppState) -> GridView {
        match state.layout(24, 100).content {
            Content::Grid(grid) => grid,
            other => panic!("expected a grid, got {other:?}"),
        }
    }

    #[test]
    fn start_requests_page_one_and_favorites() {
        let mut state = state_with(300);
        let actions = state.start();

        assert_eq!(page_ticket(&actions).page, 1);
        assert!(actions
            .iter()
            .any(|a| matches!(a, Action::PostToWorker(WorkerMessage::LoadFavorites { .. }))));
        assert_eq!(notice_of(&mut state).kind, NoticeKind::Loading);
    }

    #[test]
    fn failed_first_page_offers_retry() {
        let mut state = state_with(0);
        let ticket = page_ticket(&state.start());
        state.apply_page(
            ticket,
            &HttpResponse {
                status: 500,
                body: Vec::new(),
            },
        );

        let notice = notice_of(&mut state);
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Couldn't load movies");
        assert_eq!(page_ticket(&state.retry()).page, 1);
    }

    #[test]
    fn empty_results_show_the_empty_state() {
        let mut state = state_with(0);
        state.start();
        state.enter_search();
        for c in "zzzz".chars() {
            state.push_search_char(c);
        }
        let ticket = state.query.generation();
        let body = serde_json::json!({"page": 1, "results": [], "total_pages": 0, "total_results": 0});
        state.apply_page(
            FetchTicket {
                generation: ticket,
                page: 1,
            },
            &HttpResponse {
                status: 200,
                body: body.to_string().into_bytes(),
            },
        );

        let notice = notice_of(&mut state);
        assert_eq!(notice.kind, NoticeKind::Empty);
        assert_eq!(notice.message, "No results found");
        assert_eq!(notice.subtitle, "Try different keywords");
    }

    #[test]
    fn blank_search_resolves_empty_without_a_request() {
        let mut state = state_with(0);
        state.start();
        state.enter_search();
        let actions = state.push_search_char(' ');

        assert_eq!(page_requests(&actions), 0);
        assert_eq!(notice_of(&mut state).message, "No results found");
    }

    #[test]
    fn only_rows_near_the_viewport_become_cards() {
        let mut state = loaded(60, 1);
        let grid = grid_of(&mut state);

        assert_eq!(grid.columns, 3);
        assert!(grid.rows.len() < 20, "{} rows materialized", grid.rows.len());
        assert_eq!(grid.rows[0].index, 0);
        assert!(grid
            .rows
            .iter()
            .all(|row| matches!(row.kind, RowKind::Cards(_))));
        let cards: usize = grid
            .rows
            .iter()
            .map(|row| match &row.kind {
                RowKind::Cards(cards) => cards.len(),
                RowKind::Loader(_) => 0,
            })
            .sum();
        assert_eq!(cards, grid.rows.len() * 3);
    }

    #[test]
    fn reaching_the_end_requests_the_next_page_once() {
        let mut state = loaded(60, 3);
        assert_eq!(state.query.movies().len(), 60);
        assert!(!state.query.is_fetching_next());

        let actions = state.move_selection(Movement::End);
        assert_eq!(page_ticket(&actions).page, 2);
        assert_eq!(page_requests(&state.move_selection(Movement::Up)), 0);
        assert_eq!(page_requests(&state.move_selection(Movement::End)), 0);

        let grid = grid_of(&mut state);
        let loader = grid.rows.iter().find_map(|row| match &row.kind {
            RowKind::Loader(state) => Some(state.clone()),
            RowKind::Cards(_) => None,
        });
        assert_eq!(loader, Some(LoaderState::Fetching));
    }

    #[test]
    fn responses_for_a_replaced_query_are_dropped() {
        let mut state = state_with(0);
        let listing = page_ticket(&state.start());
        state.enter_search();
        let search = page_ticket(&state.push_search_char('x'));
        assert_ne!(listing.generation, search.generation);

        let (changed, actions) = state.apply_page(listing, &page_response(1, 20, 5));
        assert!(!changed);
        assert!(actions.is_empty());
        assert!(state.query.movies().is_empty());
    }

    #[test]
    fn late_page_of_a_replaced_query_is_discarded() {
        let mut state = state_with(0);
        let first = page_ticket(&state.start());
        state.set_viewport(24, 100);
        let (_, mut actions) = state.apply_page(first, &page_response(1, 60, 5));
        actions.extend(state.move_selection(Movement::End));
        let second = page_ticket(&actions);
        assert_eq!(second.page, 2);
        let (changed, mut actions) = state.apply_page(second, &page_response(2, 60, 5));
        assert!(changed);
        actions.extend(state.move_selection(Movement::End));
        let third = page_ticket(&actions);
        assert_eq!(third.page, 3);
        assert_eq!(state.query.movies().len(), 120);

        state.enter_search();
        let mut actions = Vec::new();
        for c in "matrix".chars() {
            actions = state.push_search_char(c);
        }
        let matrix = page_ticket(&actions);
        assert_eq!(matrix.page, 1);

        let (changed, actions) = state.apply_page(third, &page_response(3, 60, 5));
        assert!(!changed);
        assert!(actions.is_empty());
        assert!(state.query.movies().is_empty());

        let (changed, _) = state.apply_page(matrix, &page_response(1, 20, 2));
        assert!(changed);
        assert_eq!(state.query.movies().len(), 20);
        assert_eq!(state.query.query().text, "matrix");
    }

    #[test]
    fn typing_before_start_waits_for_web_access() {
        let mut state = state_with(0);
        state.set_viewport(24, 100);
        state.enter_search();
        assert_eq!(page_requests(&state.push_search_char('a')), 0);
        assert_eq!(page_requests(&state.focus_results()), 0);
        assert_eq!(state.query.generation(), 0);

        let actions = state.start();
        assert_eq!(page_ticket(&actions).page, 1);
        assert_eq!(state.query.query().text, "a");
    }

    #[test]
    fn search_commits_after_the_last_debounce_timer() {
        let mut state = state_with(300);
        state.start();
        state.enter_search();

        let first = state.push_search_char('a');
        assert_eq!(first, vec![Action::SetTimeout(0.3)]);
        state.push_search_char('b');
        assert!(state.is_search_pending());

        assert!(state.timer_fired().is_empty());
        let actions = state.timer_fired();
        assert_eq!(page_ticket(&actions).page, 1);
        assert_eq!(state.query.query().text, "ab");
        assert!(!state.is_search_pending());
        assert!(state.timer_fired().is_empty());
    }

    #[test]
    fn trailing_whitespace_does_not_restart_the_search() {
        let mut state = state_with(0);
        state.start();
        state.enter_search();
        for c in "matrix".chars() {
            state.push_search_char(c);
        }
        let generation = state.query.generation();

        assert!(state.push_search_char(' ').is_empty());
        assert_eq!(state.query.generation(), generation);
    }

    #[test]
    fn exiting_search_returns_to_the_listing() {
        let mut state = state_with(0);
        state.start();
        state.enter_search();
        state.push_search_char('q');

        let actions = state.exit_search();
        assert_eq!(page_ticket(&actions).page, 1);
        assert!(!state.query.query().is_search());
        assert_eq!(state.input_mode, InputMode::Normal);
        assert!(state.layout(24, 100).search_bar.is_none());
    }

    #[test]
    fn failed_favorite_write_rolls_back() {
        let mut state = loaded(30, 1);
        state.favorites_loaded(Vec::new());
        let movie_id = state.selected_movie().unwrap().id;

        let actions = state.toggle_favorite();
        assert!(matches!(
            actions.as_slice(),
            [Action::PostToWorker(WorkerMessage::AddFavorite { .. })]
        ));
        assert!(state.favorites.is_favorite(movie_id));
        assert!(state.toggle_favorite().is_empty(), "pending toggles are ignored");

        let err = ReelgridError::Storage("disk full".into());
        let actions = state.settle_favorite(movie_id, Err(&err));
        assert!(!state.favorites.is_favorite(movie_id));
        assert!(matches!(
            actions.as_slice(),
            [Action::PostToWorker(WorkerMessage::LoadFavorites { .. })]
        ));
    }

    #[test]
    fn snapshot_reload_waits_for_every_pending_toggle() {
        let mut state = loaded(30, 1);
        state.favorites_loaded(Vec::new());
        let first = state.query.movies()[0].id;
        state.toggle_favorite();
        state.move_selection(Movement::Right);
        let second = state.selected_movie().unwrap().id;
        state.toggle_favorite();

        assert!(state.settle_favorite(first, Ok(())).is_empty());
        let actions = state.settle_favorite(second, Ok(()));
        assert!(matches!(
            actions.as_slice(),
            [Action::PostToWorker(WorkerMessage::LoadFavorites { .. })]
        ));
        assert!(state.favorites.is_favorite(first));
        assert!(state.favorites.is_favorite(second));
    }

    #[test]
    fn failed_favorites_load_can_be_retried() {
        let mut state = loaded(30, 1);
        state.favorites_load_failed("permission denied");
        state.show_favorites();
        assert_eq!(notice_of(&mut state).kind, NoticeKind::Loading);

        state.favorites_load_failed("permission denied");
        let notice = notice_of(&mut state);
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.message, "Couldn't load favorites");
        assert_eq!(notice.subtitle, "Press r to retry");

        let actions = state.retry();
        assert!(matches!(
            actions.as_slice(),
            [Action::PostToWorker(WorkerMessage::LoadFavorites { .. })]
        ));
        assert_eq!(notice_of(&mut state).kind, NoticeKind::Loading);
        assert!(state.retry().is_empty(), "a load is already on its way");

        state.favorites_loaded(Vec::new());
        assert_eq!(notice_of(&mut state).message, "No favorites yet");
    }

    #[test]
    fn favorites_view_lists_confirmed_favorites() {
        let mut state = loaded(30, 1);
        let actions = state.show_favorites();
        assert_eq!(actions.len(), 1);
        assert_eq!(notice_of(&mut state).message, "Loading favorites…");

        state.favorites_loaded(Vec::new());
        let notice = notice_of(&mut state);
        assert_eq!(notice.message, "No favorites yet");
        assert!(state.show_favorites().is_empty(), "snapshot is fresh");

        let movie = state.query.movies()[4].clone();
        state.favorites_loaded(vec![Favorite::from_summary(&movie)]);
        let grid = grid_of(&mut state);
        let RowKind::Cards(cards) = &grid.rows[0].kind else {
            panic!("expected cards");
        };
        assert_eq!(cards[0].movie_id, movie.id);
        assert!(cards[0].is_favorite);
    }

    #[test]
    fn detail_page_uses_the_cache_and_restores_the_grid() {
        let mut state = loaded(60, 1);
        state.move_selection(Movement::PageDown);
        state.move_selection(Movement::PageDown);
        let selected = state.browse.selected;
        let scroll = state.browse.scroll;
        assert!(scroll > 0);

        let actions = state.open_detail();
        assert_eq!(state.view_mode, ViewMode::Detail);
        let movie_id = state.selected_movie().unwrap().id;
        assert!(matches!(
            actions.as_slice(),
            [Action::WebRequest(req)]
                if RequestContext::from_map(&req.context).unwrap() == RequestContext::Details(movie_id)
        ));

        let body = serde_json::json!({
            "id": movie_id,
            "title": "Movie",
            "overview": "A hacker learns the truth.",
            "runtime": 136,
            "genres": [{"id": 28, "name": "Action"}],
            "status": "Released",
        });
        assert!(state.apply_details(
            movie_id,
            &HttpResponse {
                status: 200,
                body: body.to_string().into_bytes(),
            }
        ));
        let Content::Detail(detail) = state.layout(24, 100).content else {
            panic!("expected the detail page");
        };
        assert!(detail.notice.is_none());
        assert!(detail.subtitle.contains("2h 16m"));
        assert!(detail.lines.contains(&DetailLine::Text("Action".into())));

        state.go_back();
        assert_eq!(state.view_mode, ViewMode::Browse);
        assert_eq!(state.browse.selected, selected);
        assert_eq!(state.browse.scroll, scroll);

        assert!(state.open_detail().is_empty(), "fresh cache entry");
    }

    #[test]
    fn failed_detail_fetch_can_be_retried() {
        let mut state = loaded(10, 1);
        state.open_detail();
        let movie_id = state.selected_movie().unwrap().id;
        state.apply_details(
            movie_id,
            &HttpResponse {
                status: 404,
                body: br#"{"status_message":"not found"}"#.to_vec(),
            },
        );

        let Content::Detail(detail) = state.layout(24, 100).content else {
            panic!("expected the detail page");
        };
        assert_eq!(detail.notice.map(|n| n.kind), Some(NoticeKind::Error));
        assert_eq!(page_requests(&state.retry()), 1);
    }

    #[test]
    fn selection_survives_a_column_change() {
        let mut state = loaded(60, 1);
        for _ in 0..4 {
            state.move_selection(Movement::Down);
        }
        state.move_selection(Movement::Right);
        assert_eq!(state.browse.selected, 13);

        state.set_viewport(24, 50);
        assert_eq!(state.columns(), 2);
        assert_eq!(state.browse.selected, 13);

        let Content::Grid(grid) = state.layout(24, 50).content else {
            panic!("expected a grid");
        };
        let visible_selected = grid.rows.iter().any(|row| {
            row.start >= grid.scroll
                && matches!(&row.kind, RowKind::Cards(cards) if cards.iter().any(|c| c.is_selected))
        });
        assert!(visible_selected);
    }

    #[test]
    fn grid_movement_clamps_at_the_edges() {
        let mut state = loaded(7, 1);
        state.move_selection(Movement::Up);
        assert_eq!(state.browse.selected, 0);
        state.move_selection(Movement::Down);
        state.move_selection(Movement::Down);
        assert_eq!(state.browse.selected, 6);
        state.move_selection(Movement::Down);
        assert_eq!(state.browse.selected, 6);
        state.move_selection(Movement::Left);
        state.move_selection(Movement::Up);
        assert_eq!(state.browse.selected, 2);
        state.move_selection(Movement::Home);
        assert_eq!(state.browse.selected, 0);
    }

    #[test]
    fn search_matches_are_highlighted_in_titles() {
        let mut state = state_with(0);
        state.start();
        state.set_viewport(24, 100);
        state.enter_search();
        for c in "movie".chars() {
            state.push_search_char(c);
        }
        let ticket = FetchTicket {
            generation: state.query.generation(),
            page: 1,
        };
        state.apply_page(ticket, &page_response(1, 3, 1));

        let Content::Grid(grid) = state.layout(24, 100).content else {
            panic!("expected a grid");
        };
        let RowKind::Cards(cards) = &grid.rows[0].kind else {
            panic!("expected cards");
        };
        assert_eq!(cards[0].title_lines[0].highlight_ranges, vec![(0, 5)]);
    }
}
