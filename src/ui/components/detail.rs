//! Movie detail page renderer.

use super::notice::render_notice_at;
use crate::ui::helpers::{pad, position_cursor, truncate};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{DetailLine, DetailView};

/// Left and right margin of the page body.
const MARGIN: usize = 2;

/// Draws the detail page into the `height` lines starting at `top`.
///
/// The title block takes three lines, an optional notice three more, and the
/// body fills the rest. The body arrives already scrolled.
pub fn render_detail(detail: &DetailView, theme: &Theme, top: usize, height: usize, cols: usize) {
    if height == 0 {
        return;
    }
    let width = cols.saturating_sub(MARGIN * 2);
    let indent = " ".repeat(MARGIN);

    let heart = if detail.is_favorite { " ♥" } else { "" };
    position_cursor(top, 1);
    print!("{indent}{}{}", Theme::bold(), Theme::fg(&theme.colors.header_fg));
    print!("{}", truncate(&detail.title, width.saturating_sub(heart.chars().count())));
    print!("{}{heart}{}", Theme::fg(&theme.colors.favorite_fg), Theme::reset());

    position_cursor(top + 1, 1);
    print!("{indent}{}", Theme::fg(&theme.colors.rating_fg));
    print!("{}", truncate(&detail.subtitle, width));
    print!("{}", Theme::reset());

    let mut row = top + 3;
    if let Some(notice) = &detail.notice {
        row = render_notice_at(row, notice, theme, cols) + 1;
    }

    let bottom = top + height;
    for line in &detail.lines {
        if row >= bottom {
            break;
        }
        position_cursor(row, 1);
        let (style, text) = match line {
            DetailLine::Heading(text) => (
                format!("{}{}", Theme::bold(), Theme::fg(&theme.colors.header_fg)),
                text.as_str(),
            ),
            DetailLine::Text(text) => (Theme::fg(&theme.colors.text_normal), text.as_str()),
            DetailLine::Dim(text) => (Theme::fg(&theme.colors.text_dim), text.as_str()),
            DetailLine::Blank => (String::new(), ""),
        };
        print!("{indent}{style}{}{}", pad(text, width), Theme::reset());
        row += 1;
    }
}
