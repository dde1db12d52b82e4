//! Centered notice shown instead of the grid: first-page loading, empty results,
//! and load failures.

use crate::ui::helpers::{center, position_cursor};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{Notice, NoticeKind};

/// Renders `notice` centered in the `height` lines starting at `top`.
pub fn render_notice(notice: &Notice, theme: &Theme, top: usize, height: usize, cols: usize) {
    let row = top + height / 3;
    render_notice_at(row, notice, theme, cols);
}

/// Renders the message and its subtitle at `row`; returns the next free row.
pub fn render_notice_at(row: usize, notice: &Notice, theme: &Theme, cols: usize) -> usize {
    let color = match notice.kind {
        NoticeKind::Loading => &theme.colors.text_dim,
        NoticeKind::Empty => &theme.colors.empty_state_fg,
        NoticeKind::Error => &theme.colors.error_fg,
    };

    position_cursor(row, 1);
    print!("{}", Theme::fg(color));
    print!("{}", center(&notice.message, cols));
    print!("{}", Theme::reset());

    if notice.subtitle.is_empty() {
        return row + 1;
    }
    position_cursor(row + 1, 1);
    print!("{}", Theme::dim());
    print!("{}", Theme::fg(&theme.colors.text_dim));
    print!("{}", center(&notice.subtitle, cols));
    print!("{}", Theme::reset());
    row + 2
}
