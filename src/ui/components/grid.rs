//! Card grid renderer.
//!
//! Draws the rows of a [`GridView`] that intersect the viewport. Rows are laid
//! out on a scrollable surface (`row.start` is a surface offset) and clipped line
//! by line, so a row half scrolled out of view shows its visible half.
//!
//! Every card of a row is drawn at the row's height:
//!
//! ```text
//! ╭────────────────╮
//! │ The Lord of    │
//! │ the Rings      │
//! │                │
//! │ ★ 8.4  2001  ♥ │
//! ╰────────────────╯
//! ```

use crate::ui::helpers::{center, highlighted, pad, position_cursor};
use crate::ui::layout::{GUTTER, ROW_GAP};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::{Card, GridRow, GridView, LoaderState, RowKind};

/// Draws the visible part of `grid` into the `grid.viewport_height` lines
/// starting at screen row `top`.
pub fn render_grid(grid: &GridView, theme: &Theme, top: usize, cols: usize) {
    let view_end = grid.scroll + grid.viewport_height;

    for row in &grid.rows {
        for line in 0..row.height {
            let y = row.start + line;
            if y < grid.scroll || y >= view_end {
                continue;
            }
            position_cursor(top + (y - grid.scroll), 1);
            print!("{}", row_line(row, line, grid.card_width, theme, cols));
        }
    }
}

fn row_line(row: &GridRow, line: usize, card_width: usize, theme: &Theme, cols: usize) -> String {
    match &row.kind {
        RowKind::Cards(cards) => {
            let card_height = row.height.saturating_sub(ROW_GAP);
            if line >= card_height {
                return String::new();
            }
            let gutter = " ".repeat(GUTTER);
            cards
                .iter()
                .map(|card| card_line(card, line, card_height, card_width, theme))
                .collect::<Vec<_>>()
                .join(&gutter)
        }
        RowKind::Loader(state) => loader_line(state, line, row.height, theme, cols),
    }
}

/// Line `line` of a card drawn `height` lines tall and `width` cells wide.
#[must_use]
pub fn card_line(card: &Card, line: usize, height: usize, width: usize, theme: &Theme) -> String {
    let inner = width.saturating_sub(4);
    let border = if card.is_selected {
        format!("{}{}", Theme::bold(), Theme::fg(&theme.colors.card_selected_border))
    } else {
        Theme::fg(&theme.colors.card_border)
    };
    let reset = Theme::reset();
    let rule = "─".repeat(width.saturating_sub(2));

    if line == 0 {
        return format!("{border}╭{rule}╮{reset}");
    }
    if line + 1 == height {
        return format!("{border}╰{rule}╯{reset}");
    }

    let body = if line + 2 == height {
        meta_text(card, inner, theme)
    } else {
        title_text(card, line - 1, inner, theme)
    };
    format!("{border}│{reset} {body} {border}│{reset}")
}

fn title_text(card: &Card, index: usize, inner: usize, theme: &Theme) -> String {
    let base = if card.is_selected {
        format!("{}{}", Theme::bold(), Theme::fg(&theme.colors.text_normal))
    } else {
        Theme::fg(&theme.colors.text_normal)
    };
    let Some(title) = card.title_lines.get(index) else {
        return " ".repeat(inner);
    };
    let text = pad(&title.text, inner);
    format!(
        "{base}{}{}",
        highlighted(&text, &title.highlight_ranges, theme, &base),
        Theme::reset()
    )
}

fn meta_text(card: &Card, inner: usize, theme: &Theme) -> String {
    let marker = if card.is_favorite { "♥" } else { " " };
    let marker_color = if card.is_pending {
        &theme.colors.text_dim
    } else {
        &theme.colors.favorite_fg
    };
    if inner < 3 {
        return format!("{}{}{}", Theme::fg(&theme.colors.rating_fg), pad(&card.meta, inner), Theme::reset());
    }
    format!(
        "{}{}{} {}{marker}{}",
        Theme::fg(&theme.colors.rating_fg),
        pad(&card.meta, inner - 2),
        Theme::reset(),
        Theme::fg(marker_color),
        Theme::reset()
    )
}

/// Text of the trailing sentinel row. Empty while no page is loading.
#[must_use]
pub fn loader_text(state: &LoaderState) -> String {
    match state {
        LoaderState::Fetching => "Loading more movies…".to_string(),
        LoaderState::Failed(message) => format!("Couldn't load more: {message} (r to retry)"),
        LoaderState::Idle => String::new(),
    }
}

fn loader_line(state: &LoaderState, line: usize, height: usize, theme: &Theme, cols: usize) -> String {
    if line != height / 2 || *state == LoaderState::Idle {
        return String::new();
    }
    let color = match state {
        LoaderState::Failed(_) => &theme.colors.error_fg,
        LoaderState::Fetching | LoaderState::Idle => &theme.colors.text_dim,
    };
    format!("{}{}{}", Theme::fg(color), center(&loader_text(state), cols), Theme::reset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::helpers::display_width;
    use crate::ui::viewmodel::TitleLine;

    fn strip_ansi(text: &str) -> String {
        let mut out = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\u{1b}' {
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    fn card() -> Card {
        Card {
            movie_id: 120,
            title_lines: vec![
                TitleLine {
                    text: "The Lord of".into(),
                    highlight_ranges: vec![(4, 8)],
                },
                TitleLine {
                    text: "the Rings".into(),
                    highlight_ranges: vec![],
                },
            ],
            meta: "★ 8.4  2001".into(),
            is_selected: true,
            is_favorite: true,
            is_pending: false,
        }
    }

    #[test]
    fn every_card_line_fills_the_card_width() {
        let theme = Theme::default();
        let lines: Vec<String> = (0..6)
            .map(|line| strip_ansi(&card_line(&card(), line, 6, 18, &theme)))
            .collect();

        assert_eq!(lines[0], format!("╭{}╮", "─".repeat(16)));
        assert!(lines[1].starts_with("│ The Lord of "));
        assert!(lines[2].starts_with("│ the Rings "));
        assert_eq!(lines[3], format!("│{}│", " ".repeat(16)));
        assert!(lines[4].starts_with("│ ★ 8.4  2001"));
        assert!(lines[4].ends_with("♥ │"));
        assert_eq!(lines[5], format!("╰{}╯", "─".repeat(16)));
        assert!(lines.iter().all(|l| display_width(l) == 18));
    }

    #[test]
    fn highlights_are_wrapped_in_escapes() {
        let theme = Theme::default();
        let line = card_line(&card(), 1, 6, 16, &theme);
        assert!(line.contains(&format!("{}Lord", Theme::bg(&theme.colors.match_highlight_bg))));
    }

    #[test]
    fn idle_sentinel_draws_nothing() {
        let theme = Theme::default();
        assert_eq!(loader_text(&LoaderState::Idle), "");
        assert!((0..3).all(|line| loader_line(&LoaderState::Idle, line, 3, &theme, 40).is_empty()));
        assert!(strip_ansi(&loader_line(&LoaderState::Fetching, 1, 3, &theme, 40)).contains("Loading more movies…"));
    }

    #[test]
    fn loader_explains_a_stalled_page() {
        assert_eq!(
            loader_text(&LoaderState::Failed("API Error: HTTP 500".into())),
            "Couldn't load more: API Error: HTTP 500 (r to retry)"
        );
    }
}
