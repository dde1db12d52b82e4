//! Shared text and rendering utilities.
//!
//! Widths are measured in terminal cells with `unicode-width`, so CJK titles and
//! emoji line up with ASCII ones. Character ranges (for fuzzy highlights) are
//! indices into `char`s, never bytes.

use crate::ui::theme::Theme;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Positions the cursor at a 1-indexed row and column.
pub fn position_cursor(row: usize, col: usize) {
    print!("\u{1b}[{row};{col}H");
}

/// Width of `text` in terminal cells.
#[must_use]
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Longest prefix of `text` that fits in `width` cells.
#[must_use]
pub fn fit(text: &str, width: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|c| {
            let w = c.width().unwrap_or(0);
            if used + w > width {
                return false;
            }
            used += w;
            true
        })
        .collect()
}

/// Cuts `text` to `width` cells, ending in `…` when something was dropped.
///
/// ```
/// use reelgrid::ui::helpers::truncate;
///
/// assert_eq!(truncate("The Matrix", 20), "The Matrix");
/// assert_eq!(truncate("The Matrix Reloaded", 10), "The Matri…");
/// ```
#[must_use]
pub fn truncate(text: &str, width: usize) -> String {
    if display_width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut cut = fit(text, width - 1);
    cut.push('…');
    cut
}

/// Pads `text` with spaces to exactly `width` cells, truncating if longer.
#[must_use]
pub fn pad(text: &str, width: usize) -> String {
    let cut = truncate(text, width);
    let fill = width.saturating_sub(display_width(&cut));
    format!("{cut}{}", " ".repeat(fill))
}

/// Centers `text` in `width` cells.
#[must_use]
pub fn center(text: &str, width: usize) -> String {
    let cut = truncate(text, width);
    let used = display_width(&cut);
    let left = (width.saturating_sub(used)) / 2;
    let right = width.saturating_sub(used + left);
    format!("{}{cut}{}", " ".repeat(left), " ".repeat(right))
}

/// A wrapped line and the character index where it starts in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedLine {
    pub start: usize,
    pub text: String,
}

/// Greedy word wrap into at most `max_lines` lines of `width` cells.
///
/// Words longer than a line are split. When text remains after the last line,
/// that line ends in `…`.
///
/// ```
/// use reelgrid::ui::helpers::wrap;
///
/// let lines = wrap("The Lord of the Rings", 10, 3);
/// let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
/// assert_eq!(texts, ["The Lord", "of the", "Rings"]);
/// assert_eq!(lines[1].start, 9);
/// ```
#[must_use]
pub fn wrap(text: &str, width: usize, max_lines: usize) -> Vec<WrappedLine> {
    let chars: Vec<char> = text.chars().collect();
    let width = width.max(1);
    let mut lines: Vec<WrappedLine> = Vec::new();
    let mut i = 0;

    while lines.len() < max_lines {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }

        let start = i;
        let mut end = i;
        let mut used = 0;
        let mut last_space = None;
        while end < chars.len() {
            let w = chars[end].width().unwrap_or(0);
            if used + w > width {
                break;
            }
            if chars[end].is_whitespace() {
                last_space = Some(end);
            }
            used += w;
            end += 1;
        }

        let mut cut = if end < chars.len() && !chars[end].is_whitespace() {
            last_space.filter(|&s| s > start).unwrap_or(end)
        } else {
            end
        };
        if cut == start {
            cut = start + 1;
        }

        let line: String = chars[start..cut].iter().collect();
        lines.push(WrappedLine {
            start,
            text: line.trim_end().to_string(),
        });
        i = cut;
    }

    let truncated = chars[i.min(chars.len())..].iter().any(|c| !c.is_whitespace());
    if truncated {
        if let Some(last) = lines.last_mut() {
            let mut cut = fit(&last.text, width - 1);
            cut.push('…');
            last.text = cut;
        }
    }
    lines
}

/// Fuzzy-match `pattern` against `text` and coalesce matched characters into
/// `(start, end)` ranges.
#[must_use]
pub fn highlight_ranges(matcher: &SkimMatcherV2, text: &str, pattern: &str) -> Vec<(usize, usize)> {
    let Some((_score, indices)) = matcher.fuzzy_indices(text, pattern) else {
        return Vec::new();
    };

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for idx in indices {
        match ranges.last_mut() {
            Some((_, end)) if *end == idx => *end = idx + 1,
            _ => ranges.push((idx, idx + 1)),
        }
    }
    ranges
}

/// Re-bases ranges of a whole text onto the line covering characters
/// `[start, start + len)`.
#[must_use]
pub fn clip_ranges(ranges: &[(usize, usize)], start: usize, len: usize) -> Vec<(usize, usize)> {
    let end = start + len;
    ranges
        .iter()
        .filter(|&&(s, e)| s < end && e > start)
        .map(|&(s, e)| (s.max(start) - start, e.min(end) - start))
        .collect()
}

/// Styles `text` with highlighted ranges, restoring `base` after each one.
///
/// `base` is the escape sequence in effect around the text (foreground plus an
/// optional background), so highlights never leak past their range.
#[must_use]
pub fn highlighted(text: &str, ranges: &[(usize, usize)], theme: &Theme, base: &str) -> String {
    if ranges.is_empty() {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::new();
    let mut pos = 0;
    for &(start, end) in ranges {
        let start = start.min(chars.len());
        let end = end.min(chars.len());
        if start < pos || start >= end {
            continue;
        }
        out.extend(&chars[pos..start]);
        out.push_str(&Theme::fg(&theme.colors.match_highlight_fg));
        out.push_str(&Theme::bg(&theme.colors.match_highlight_bg));
        out.extend(&chars[start..end]);
        out.push_str(Theme::reset());
        out.push_str(base);
        pos = end;
    }
    out.extend(&chars[pos..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_characters_count_double() {
        assert_eq!(display_width("千と千尋"), 8);
        assert_eq!(fit("千と千尋", 5), "千と");
        assert_eq!(truncate("千と千尋の神隠し", 7), "千と千…");
    }

    #[test]
    fn pad_and_center_fill_the_width() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(center("ab", 6), "  ab  ");
        assert_eq!(display_width(&pad("a very long title", 5)), 5);
    }

    #[test]
    fn overlong_words_are_split() {
        let lines = wrap("Supercalifragilistic", 8, 5);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["Supercal", "ifragili", "stic"]);
        assert_eq!(lines[2].start, 16);
    }

    #[test]
    fn wrap_marks_dropped_text() {
        let lines = wrap("one two three four five", 8, 2);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "one two");
        assert!(lines[1].text.ends_with('…'));
        assert!(display_width(&lines[1].text) <= 8);
    }

    #[test]
    fn blank_text_wraps_to_nothing() {
        assert!(wrap("   ", 10, 3).is_empty());
    }

    #[test]
    fn adjacent_match_indices_coalesce() {
        let matcher = SkimMatcherV2::default();
        let ranges = highlight_ranges(&matcher, "The Matrix", "matr");
        assert_eq!(ranges, vec![(4, 8)]);
        assert!(highlight_ranges(&matcher, "Alien", "zzz").is_empty());
    }

    #[test]
    fn ranges_are_rebased_onto_lines() {
        let ranges = [(2, 6), (9, 10)];
        assert_eq!(clip_ranges(&ranges, 4, 5), vec![(0, 2)]);
        assert_eq!(clip_ranges(&ranges, 9, 3), vec![(0, 1)]);
        assert!(clip_ranges(&ranges, 6, 3).is_empty());
    }
}
