//! Header component renderer.
//!
//! Renders the title bar of every screen: the listing with its loaded count,
//! search results, the favorites grid and the detail page title. Text is
//! centered, bold and drawn over the theme's optional header background.

use crate::ui::helpers::{center, position_cursor};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::HeaderInfo;

/// Renders the header title bar at the specified row.
///
/// The title is centered and bold; titles wider than the pane are cut with `…`.
/// The line is padded to the full pane width so the background color spans it.
///
/// # Parameters
///
/// * `row` - Row position to render the header (1-indexed)
/// * `header` - Header information (title text)
/// * `theme` - Active color theme
/// * `cols` - Pane width in columns
///
/// # Returns
///
/// The next available row position (row + 1)
///
/// # Layout
///
/// ```text
/// [padding] Popular Movies (40 of 10000) [padding]
/// ```
///
/// Centering measures display width, so titles with wide characters stay
/// centered.
pub fn render_header(row: usize, header: &HeaderInfo, theme: &Theme, cols: usize) -> usize {
    position_cursor(row, 1);
    print!("{}", Theme::bold());
    print!("{}", Theme::fg(&theme.colors.header_fg));
    if let Some(bg) = &theme.colors.header_bg {
        print!("{}", Theme::bg(bg));
    }
    print!("{}", center(&header.title, cols));
    print!("{}", Theme::reset());
    row + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_takes_one_row() {
        let header = HeaderInfo {
            title: "Popular Movies (40 of 10000)".to_string(),
        };
        assert_eq!(render_header(3, &header, &Theme::default(), 40), 4);
        assert_eq!(render_header(1, &header, &Theme::default(), 8), 2);
    }
}
