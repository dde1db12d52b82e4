//! View model types representing renderable UI state.
//!
//! View models are computed by [`AppState::layout`](crate::app::AppState::layout)
//! and consumed by the renderer. They carry no business logic, only
//! display-ready data: wrapped titles, highlight ranges, selection, and the rows
//! the virtualizer decided to materialize.

/// Complete UI view model for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct UIViewModel {
    pub header: HeaderInfo,
    pub footer: FooterInfo,

    /// Present while the search box is open or holds a query.
    pub search_bar: Option<SearchBarInfo>,

    pub content: Content,
}

/// What fills the area between header and footer.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Grid(GridView),
    Notice(Notice),
    Detail(DetailView),
}

/// The visible slice of a card grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridView {
    pub columns: usize,
    pub card_width: usize,

    /// Scroll offset in lines; rows are positioned relative to it.
    pub scroll: usize,
    pub viewport_height: usize,
    pub total_height: usize,

    /// Virtual rows intersecting the viewport, overscan included, in order.
    pub rows: Vec<GridRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub index: usize,
    /// Offset of the row's first line on the scrollable surface.
    pub start: usize,
    pub height: usize,
    pub kind: RowKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    Cards(Vec<Card>),
    /// Trailing sentinel row.
    Loader(LoaderState),
}

/// What the sentinel row shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderState {
    /// Next page is in flight.
    Fetching,
    /// The last page request failed; scrolling or `r` retries.
    Failed(String),
    /// More pages exist but none is requested yet.
    Idle,
}

/// One movie card.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub movie_id: u64,
    pub title_lines: Vec<TitleLine>,
    /// Rating and release year, e.g. `★ 7.3  1999`.
    pub meta: String,
    pub is_selected: bool,
    pub is_favorite: bool,
    /// A favorite toggle for this movie awaits the store's answer.
    pub is_pending: bool,
}

/// One wrapped line of a card title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleLine {
    pub text: String,
    /// `(start, end)` character ranges of fuzzy matches within `text`.
    pub highlight_ranges: Vec<(usize, usize)>,
}

/// Centered two-line message replacing the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Loading,
    Empty,
    Error,
}

/// Detail page of one movie, already wrapped and scrolled.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub title: String,
    pub subtitle: String,
    pub is_favorite: bool,
    pub lines: Vec<DetailLine>,
    /// Shown below the title while the record loads or after it failed.
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailLine {
    Heading(String),
    Text(String),
    /// Secondary text such as the tagline or a trailer link.
    Dim(String),
    Blank,
}

/// Header display information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub title: String,
}

/// Footer display information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterInfo {
    /// Keybinding help text, e.g. `"/: search  f: favorite  q: quit"`.
    pub keybindings: String,
}

/// Search box state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBarInfo {
    pub query: String,
    /// Keystrokes go to the box rather than the grid.
    pub is_focused: bool,
    /// The typed text has not been committed yet.
    pub is_pending: bool,
}
