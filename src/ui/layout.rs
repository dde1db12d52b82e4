//! Screen geometry shared by view model computation and rendering.
//!
//! Row heights handed to the virtualizer come from here, so the renderer and the
//! scroll math always agree on how tall a card is.

use crate::domain::MovieSummary;
use crate::ui::helpers::{wrap, WrappedLine};

/// Lines taken by the header and the border under it.
pub const HEADER_LINES: usize = 2;
/// Lines taken by the border above the footer and the footer itself.
pub const FOOTER_LINES: usize = 2;
pub const SEARCH_BAR_LINES: usize = 3;

/// Blank cells between two cards of a row.
pub const GUTTER: usize = 1;
/// Blank lines under each row of cards.
pub const ROW_GAP: usize = 1;
pub const MAX_TITLE_LINES: usize = 3;
/// Top border, meta line and bottom border.
const CARD_CHROME: usize = 3;
/// Border plus one space on each side of the card text.
const CARD_INSET: usize = 4;
/// Height of the sentinel row.
pub const LOADER_HEIGHT: usize = 3;

/// Card sizes for one grid width and column count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridMetrics {
    pub columns: usize,
    pub card_width: usize,
    /// Cells available for card text.
    pub inner_width: usize,
}

impl GridMetrics {
    /// ```
    /// use reelgrid::ui::layout::GridMetrics;
    ///
    /// let m = GridMetrics::new(100, 3);
    /// assert_eq!(m.card_width, 32);
    /// assert_eq!(m.inner_width, 28);
    /// ```
    #[must_use]
    pub fn new(width: usize, columns: usize) -> Self {
        let columns = columns.max(1);
        let gutters = GUTTER * (columns - 1);
        let card_width = (width.saturating_sub(gutters) / columns).max(CARD_INSET + 1);
        Self {
            columns,
            card_width,
            inner_width: card_width - CARD_INSET,
        }
    }
}

/// Wrapped title lines of a card; never empty.
#[must_use]
pub fn title_lines(title: &str, inner_width: usize) -> Vec<WrappedLine> {
    let mut lines = wrap(title, inner_width, MAX_TITLE_LINES);
    if lines.is_empty() {
        lines.push(WrappedLine {
            start: 0,
            text: String::new(),
        });
    }
    lines
}

#[must_use]
pub fn card_height(movie: &MovieSummary, inner_width: usize) -> usize {
    CARD_CHROME + title_lines(&movie.title, inner_width).len()
}

/// Height of a row of cards: its tallest card plus the gap below it.
#[must_use]
pub fn row_height(row: &[MovieSummary], metrics: &GridMetrics) -> usize {
    row.iter()
        .map(|m| card_height(m, metrics.inner_width))
        .max()
        .unwrap_or(CARD_CHROME + 1)
        + ROW_GAP
}

/// Lines left for the grid once chrome is drawn.
#[must_use]
pub const fn content_height(rows: usize, with_search_bar: bool) -> usize {
    let chrome = HEADER_LINES + FOOTER_LINES + if with_search_bar { SEARCH_BAR_LINES } else { 0 };
    rows.saturating_sub(chrome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str) -> MovieSummary {
        MovieSummary {
            id: 1,
            title: title.to_string(),
            poster_path: None,
            rating: 5.0,
            release_date: None,
            overview: String::new(),
        }
    }

    #[test]
    fn tallest_card_sets_the_row_height() {
        let metrics = GridMetrics::new(40, 2);
        assert_eq!(metrics.inner_width, 15);

        let short = movie("Up");
        let long = movie("Dr. Strangelove or: How I Learned to Stop Worrying");
        assert_eq!(row_height(&[short.clone()], &metrics), 5);
        assert_eq!(row_height(&[short, long], &metrics), 7);
    }

    #[test]
    fn narrow_widths_keep_a_usable_card() {
        let metrics = GridMetrics::new(3, 2);
        assert_eq!(metrics.inner_width, 1);
        assert_eq!(card_height(&movie(""), metrics.inner_width), 4);
    }

    #[test]
    fn search_bar_takes_grid_lines() {
        assert_eq!(content_height(24, false), 20);
        assert_eq!(content_height(24, true), 17);
        assert_eq!(content_height(3, true), 0);
    }
}
