//! Column observation for the responsive grid.
//!
//! The grid never asks the terminal how many cards fit; it asks a
//! [`LayoutObserver`], which turns width notifications into a column count. The
//! virtualization math only ever sees the resulting integer.

/// Observes an external layout decision and reports the column count.
pub trait LayoutObserver {
    /// Current column count, always at least 1.
    fn columns(&self) -> usize;

    /// Feeds a new surface width (in terminal cells).
    ///
    /// Returns `Some(columns)` only when the column count actually changed, so
    /// callers can drop row-indexed caches exactly when row identity breaks.
    fn observe(&mut self, width: usize) -> Option<usize>;
}

/// A minimum width at which a column count applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoint {
    pub min_width: usize,
    pub columns: usize,
}

/// Default breakpoints in terminal cells: one card on very narrow panes, then
/// two through five cards as the pane widens.
pub const DEFAULT_BREAKPOINTS: [Breakpoint; 5] = [
    Breakpoint { min_width: 0, columns: 1 },
    Breakpoint { min_width: 40, columns: 2 },
    Breakpoint { min_width: 80, columns: 3 },
    Breakpoint { min_width: 120, columns: 4 },
    Breakpoint { min_width: 160, columns: 5 },
];

/// Breakpoint-driven column observer.
///
/// ```
/// use reelgrid::grid::columns::{LayoutObserver, ResponsiveColumns};
///
/// let mut columns = ResponsiveColumns::default();
/// assert_eq!(columns.columns(), 1);
/// assert_eq!(columns.observe(100), Some(3));
/// assert_eq!(columns.observe(101), None);
/// assert_eq!(columns.observe(170), Some(5));
/// ```
#[derive(Debug, Clone)]
pub struct ResponsiveColumns {
    breakpoints: Vec<Breakpoint>,
    current: usize,
    last_width: Option<usize>,
}

impl ResponsiveColumns {
    /// Creates an observer from breakpoints in any order.
    ///
    /// Column counts of 0 are clamped to 1. Before the first observation the
    /// smallest supported column count is reported.
    #[must_use]
    pub fn new(mut breakpoints: Vec<Breakpoint>) -> Self {
        for bp in &mut breakpoints {
            bp.columns = bp.columns.max(1);
        }
        breakpoints.sort_by_key(|bp| bp.min_width);
        let current = breakpoints.iter().map(|bp| bp.columns).min().unwrap_or(1);
        Self {
            breakpoints,
            current,
            last_width: None,
        }
    }

    fn columns_for(&self, width: usize) -> usize {
        self.breakpoints
            .iter()
            .rev()
            .find(|bp| width >= bp.min_width)
            .or_else(|| self.breakpoints.first())
            .map_or(1, |bp| bp.columns)
    }
}

impl Default for ResponsiveColumns {
    fn default() -> Self {
        Self::new(DEFAULT_BREAKPOINTS.to_vec())
    }
}

impl LayoutObserver for ResponsiveColumns {
    fn columns(&self) -> usize {
        self.current
    }

    fn observe(&mut self, width: usize) -> Option<usize> {
        if self.last_width == Some(width) {
            return None;
        }
        self.last_width = Some(width);

        let next = self.columns_for(width);
        if next == self.current {
            return None;
        }

        tracing::debug!(width, from = self.current, to = next, "grid column count changed");
        self.current = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_below_first_breakpoint_use_the_first() {
        let mut columns = ResponsiveColumns::new(vec![
            Breakpoint { min_width: 50, columns: 2 },
            Breakpoint { min_width: 100, columns: 4 },
        ]);
        assert_eq!(columns.columns(), 2);
        assert_eq!(columns.observe(10), None);
        assert_eq!(columns.columns(), 2);
        assert_eq!(columns.observe(100), Some(4));
    }

    #[test]
    fn zero_column_breakpoints_clamp_to_one() {
        let mut columns = ResponsiveColumns::new(vec![Breakpoint { min_width: 0, columns: 0 }]);
        assert_eq!(columns.columns(), 1);
        assert_eq!(columns.observe(0), None);
    }

    #[test]
    fn shrinking_reports_the_change() {
        let mut columns = ResponsiveColumns::default();
        assert_eq!(columns.observe(200), Some(5));
        assert_eq!(columns.observe(45), Some(2));
        assert_eq!(columns.observe(45), None);
    }

    #[test]
    fn empty_breakpoints_fall_back_to_one_column() {
        let mut columns = ResponsiveColumns::new(vec![]);
        assert_eq!(columns.columns(), 1);
        assert_eq!(columns.observe(300), None);
    }
}
