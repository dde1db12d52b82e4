//! Composable UI component renderers.
//!
//! Each component draws one part of the screen at an explicit row and returns
//! the next free row where that is useful:
//!
//! - [`header`]: title bar
//! - [`footer`]: keybinding hints
//! - [`search`]: search input box
//! - [`grid`]: virtualized card grid and its loader row
//! - [`notice`]: centered loading, empty and error messages
//! - [`detail`]: movie detail page
//!
//! ```text
//! [Header]
//! [Border]
//! [Search Bar - 3 lines, while searching]
//! [Grid | Notice | Detail]
//! [Border]
//! [Footer]
//! ```

mod detail;
mod footer;
mod grid;
mod header;
mod notice;
mod search;

pub use grid::{card_line, loader_text};

use crate::ui::helpers::position_cursor;
use crate::ui::layout::content_height;
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{Content, UIViewModel};

use detail::render_detail;
use footer::render_footer;
use grid::render_grid;
use header::render_header;
use notice::render_notice;
use search::render_search_bar;

/// Renders a horizontal border line at `row` and returns `row + 1`.
fn render_border(row: usize, color: &str, cols: usize) -> usize {
    position_cursor(row, 1);
    print!("{}", Theme::fg(color));
    print!("{}", "─".repeat(cols));
    print!("{}", Theme::reset());
    row + 1
}

/// Draws a full frame.
///
/// The content area's height matches what
/// [`AppState::layout`](crate::app::AppState::layout) used for scrolling, so
/// the grid fills exactly the lines between the chrome.
pub fn render_screen(vm: &UIViewModel, theme: &Theme, rows: usize, cols: usize) {
    if rows == 0 || cols == 0 {
        return;
    }
    let mut current_row = 1;

    current_row = render_header(current_row, &vm.header, theme, cols);
    current_row = render_border(current_row, &theme.colors.border, cols);
    if let Some(search) = &vm.search_bar {
        current_row = render_search_bar(current_row, search, theme, cols);
    }

    let height = content_height(rows, vm.search_bar.is_some());
    match &vm.content {
        Content::Grid(grid) => render_grid(grid, theme, current_row, cols),
        Content::Notice(notice) => render_notice(notice, theme, current_row, height, cols),
        Content::Detail(detail) => render_detail(detail, theme, current_row, height, cols),
    }

    let footer_row = rows;
    let border_row = footer_row.saturating_sub(1);
    if border_row > current_row {
        render_border(border_row, &theme.colors.border, cols);
    }
    render_footer(footer_row, &vm.footer, theme, cols);
}
