//! Viewport virtualization over variable-height rows.
//!
//! The [`Virtualizer`] keeps one height per row (measured if known, estimated
//! otherwise) and a prefix-sum table of row start offsets. Visible-range lookups
//! binary-search that table, so a scroll event costs `O(log n)` regardless of how
//! many pages have been loaded. The table is rebuilt lazily from the first row
//! whose height changed.
//!
//! When more pages may exist, a sentinel row is appended after the last real
//! row. It renders a loading indicator, and its presence in the visible range is
//! the signal that drives pagination.

/// Tuning knobs for the virtualizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualizerOptions {
    /// Height (in terminal lines) assumed for rows that have not been measured.
    pub estimate_row_height: usize,
    /// Rows rendered beyond each edge of the viewport.
    pub overscan: usize,
}

impl Default for VirtualizerOptions {
    fn default() -> Self {
        Self {
            estimate_row_height: 8,
            overscan: 5,
        }
    }
}

/// One row inside the current virtual range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualRow {
    pub index: usize,
    /// Offset of the row's first line from the top of the scrollable surface.
    pub start: usize,
    pub height: usize,
    /// Whether this is the trailing loader row rather than movie content.
    pub is_sentinel: bool,
}

impl VirtualRow {
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.height
    }
}

/// Computes which rows intersect the viewport and where they sit.
///
/// ```
/// use reelgrid::grid::virtualizer::{Virtualizer, VirtualizerOptions};
///
/// let mut v = Virtualizer::new(VirtualizerOptions { estimate_row_height: 10, overscan: 0 });
/// v.set_row_count(100, true);
/// assert_eq!(v.total_height(), 1010);
///
/// let range = v.range(95, 20);
/// let indices: Vec<usize> = range.iter().map(|r| r.index).collect();
/// assert_eq!(indices, vec![9, 10, 11]);
/// assert_eq!(range[0].start, 90);
/// ```
#[derive(Debug, Clone)]
pub struct Virtualizer {
    options: VirtualizerOptions,
    real_rows: usize,
    sentinel: bool,
    measured: Vec<Option<usize>>,
    /// `offsets[i]` is the start of row `i`; `offsets[count]` is the total height.
    offsets: Vec<usize>,
    dirty_from: Option<usize>,
}

impl Virtualizer {
    #[must_use]
    pub fn new(options: VirtualizerOptions) -> Self {
        Self {
            options: VirtualizerOptions {
                estimate_row_height: options.estimate_row_height.max(1),
                overscan: options.overscan,
            },
            real_rows: 0,
            sentinel: false,
            measured: Vec::new(),
            offsets: vec![0],
            dirty_from: None,
        }
    }

    /// Number of virtual rows, including the sentinel.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.real_rows + self.sentinel as usize
    }

    /// Number of rows carrying movie content.
    #[must_use]
    pub const fn real_rows(&self) -> usize {
        self.real_rows
    }

    /// Index of the sentinel row, if one is present.
    #[must_use]
    pub const fn sentinel_index(&self) -> Option<usize> {
        if self.sentinel {
            Some(self.real_rows)
        } else {
            None
        }
    }

    /// Updates the row count, appending a sentinel when `has_next_page` is set.
    ///
    /// Measurements of surviving rows are kept. The old sentinel slot loses its
    /// measurement when a real row takes its place.
    pub fn set_row_count(&mut self, real_rows: usize, has_next_page: bool) {
        if real_rows == self.real_rows && has_next_page == self.sentinel {
            return;
        }

        let old_count = self.count();
        let old_sentinel = self.sentinel_index();

        self.real_rows = real_rows;
        self.sentinel = has_next_page;
        let count = self.count();
        self.measured.resize(count, None);

        let mut first_changed = old_count.min(count);
        if let Some(old) = old_sentinel {
            if old < count {
                self.measured[old] = None;
                first_changed = first_changed.min(old);
            }
        }
        self.mark_dirty(first_changed);
    }

    /// Records the rendered height of a row.
    ///
    /// Returns `true` if the height differs from what was cached, meaning
    /// offsets below this row moved.
    pub fn measure(&mut self, index: usize, height: usize) -> bool {
        let height = height.max(1);
        match self.measured.get_mut(index) {
            Some(slot) if *slot != Some(height) => {
                *slot = Some(height);
                self.mark_dirty(index);
                true
            }
            _ => false,
        }
    }

    /// Forgets every measurement, e.g. after the column count changed and row
    /// indices now name different movies.
    pub fn reset_measurements(&mut self) {
        self.measured.iter_mut().for_each(|slot| *slot = None);
        self.mark_dirty(0);
    }

    /// Height used for a row: measured if known, estimated otherwise.
    #[must_use]
    pub fn row_height(&self, index: usize) -> usize {
        self.measured
            .get(index)
            .copied()
            .flatten()
            .unwrap_or(self.options.estimate_row_height)
    }

    /// Sum of all row heights, used to size the scrollable surface.
    pub fn total_height(&mut self) -> usize {
        self.ensure_offsets();
        self.offsets[self.count()]
    }

    /// Start offset of `index`; indices past the end map to the total height.
    pub fn offset_of(&mut self, index: usize) -> usize {
        self.ensure_offsets();
        self.offsets[index.min(self.count())]
    }

    /// Largest scroll offset that still fills the viewport.
    pub fn max_scroll(&mut self, viewport_height: usize) -> usize {
        self.total_height().saturating_sub(viewport_height)
    }

    /// Row containing the given offset, if any.
    pub fn row_at(&mut self, offset: usize) -> Option<usize> {
        self.ensure_offsets();
        let count = self.count();
        let index = self.offsets[1..=count].partition_point(|&end| end <= offset);
        (index < count).then_some(index)
    }

    /// Rows intersecting `[scroll, scroll + viewport_height)`, extended by the
    /// overscan on both sides, in index order.
    pub fn range(&mut self, scroll: usize, viewport_height: usize) -> Vec<VirtualRow> {
        self.ensure_offsets();
        let count = self.count();
        if count == 0 {
            return Vec::new();
        }

        let bottom = scroll.saturating_add(viewport_height.max(1));
        let first = self.offsets[1..=count]
            .partition_point(|&end| end <= scroll)
            .min(count - 1);
        let last = self.offsets[..count]
            .partition_point(|&start| start < bottom)
            .max(first + 1);

        let start = first.saturating_sub(self.options.overscan);
        let end = last.saturating_add(self.options.overscan).min(count);

        (start..end)
            .map(|index| VirtualRow {
                index,
                start: self.offsets[index],
                height: self.offsets[index + 1] - self.offsets[index],
                is_sentinel: Some(index) == self.sentinel_index(),
            })
            .collect()
    }

    fn mark_dirty(&mut self, index: usize) {
        self.dirty_from = Some(self.dirty_from.map_or(index, |current| current.min(index)));
    }

    fn ensure_offsets(&mut self) {
        let Some(from) = self.dirty_from.take() else {
            return;
        };
        let count = self.count();
        let from = from.min(count).min(self.offsets.len() - 1);

        self.offsets.truncate(from + 1);
        for index in from..count {
            let next = self.offsets[index] + self.row_height(index);
            self.offsets.push(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn virtualizer(estimate: usize, overscan: usize) -> Virtualizer {
        Virtualizer::new(VirtualizerOptions {
            estimate_row_height: estimate,
            overscan,
        })
    }

    fn indices(rows: &[VirtualRow]) -> Vec<usize> {
        rows.iter().map(|r| r.index).collect()
    }

    #[test]
    fn empty_virtualizer_has_no_rows() {
        let mut v = virtualizer(8, 5);
        assert_eq!(v.total_height(), 0);
        assert!(v.range(0, 40).is_empty());
        assert_eq!(v.row_at(0), None);
    }

    #[test]
    fn sentinel_is_appended_when_more_pages_exist() {
        let mut v = virtualizer(8, 0);
        v.set_row_count(3, true);
        assert_eq!(v.count(), 4);
        assert_eq!(v.sentinel_index(), Some(3));

        let rows = v.range(0, 100);
        assert_eq!(indices(&rows), vec![0, 1, 2, 3]);
        assert!(rows[3].is_sentinel);
        assert!(!rows[2].is_sentinel);

        v.set_row_count(3, false);
        assert_eq!(v.sentinel_index(), None);
        assert_eq!(v.total_height(), 24);
    }

    #[test]
    fn measurements_shift_later_offsets() {
        let mut v = virtualizer(10, 0);
        v.set_row_count(4, false);
        assert!(v.measure(1, 4));
        assert!(!v.measure(1, 4));

        assert_eq!(v.offset_of(2), 14);
        assert_eq!(v.total_height(), 34);
        assert_eq!(v.row_at(12), Some(1));
        assert_eq!(v.row_at(14), Some(2));
        assert_eq!(v.row_at(34), None);
    }

    #[test]
    fn remeasurement_updates_offsets() {
        let mut v = virtualizer(10, 0);
        v.set_row_count(3, false);
        v.measure(0, 6);
        assert_eq!(v.offset_of(1), 6);
        v.measure(0, 9);
        assert_eq!(v.offset_of(1), 9);
    }

    #[test]
    fn reset_returns_to_estimates() {
        let mut v = virtualizer(10, 0);
        v.set_row_count(3, false);
        v.measure(0, 3);
        v.measure(2, 3);
        v.reset_measurements();
        assert_eq!(v.total_height(), 30);
    }

    #[test]
    fn sentinel_measurement_does_not_leak_into_real_row() {
        let mut v = virtualizer(10, 0);
        v.set_row_count(2, true);
        v.measure(2, 3);
        assert_eq!(v.total_height(), 23);

        v.set_row_count(4, true);
        assert_eq!(v.row_height(2), 10);
        assert_eq!(v.total_height(), 50);
    }

    #[test]
    fn overscan_extends_both_edges() {
        let mut v = virtualizer(10, 2);
        v.set_row_count(50, false);
        let rows = v.range(200, 30);
        assert_eq!(indices(&rows), (18..25).collect::<Vec<_>>());
    }

    #[test]
    fn scrolling_past_the_end_keeps_the_last_row() {
        let mut v = virtualizer(10, 0);
        v.set_row_count(5, false);
        let rows = v.range(10_000, 20);
        assert_eq!(indices(&rows), vec![4]);
    }

    #[test]
    fn zero_height_measurements_are_floored() {
        let mut v = virtualizer(0, 0);
        v.set_row_count(2, false);
        assert_eq!(v.total_height(), 2);
        v.measure(0, 0);
        assert_eq!(v.row_height(0), 1);
    }

    proptest! {
        #[test]
        fn ranges_never_skip_rows_while_scrolling_down(
            heights in prop::collection::vec(1usize..20, 1..120),
            viewport in 1usize..60,
            step in 1usize..25,
            overscan in 0usize..4,
        ) {
            let mut v = virtualizer(8, overscan);
            v.set_row_count(heights.len(), true);
            for (i, h) in heights.iter().enumerate() {
                v.measure(i, *h);
            }

            let max = v.max_scroll(viewport);
            let mut seen_up_to = 0usize;
            let mut scroll = 0usize;
            loop {
                let rows = v.range(scroll, viewport);
                prop_assert!(!rows.is_empty());
                for pair in rows.windows(2) {
                    prop_assert_eq!(pair[0].index + 1, pair[1].index);
                    prop_assert_eq!(pair[0].end(), pair[1].start);
                }
                prop_assert!(rows[0].index <= seen_up_to);
                seen_up_to = seen_up_to.max(rows[rows.len() - 1].index + 1);

                if scroll >= max {
                    break;
                }
                scroll = (scroll + step).min(max);
            }
            prop_assert_eq!(seen_up_to, v.count());
        }

        #[test]
        fn visible_rows_cover_the_viewport(
            heights in prop::collection::vec(1usize..20, 1..80),
            scroll in 0usize..800,
            viewport in 1usize..60,
        ) {
            let mut v = virtualizer(8, 0);
            v.set_row_count(heights.len(), false);
            for (i, h) in heights.iter().enumerate() {
                v.measure(i, *h);
            }
            let total = v.total_height();
            prop_assert_eq!(total, heights.iter().sum::<usize>());

            let scroll = scroll.min(v.max_scroll(viewport));
            let rows = v.range(scroll, viewport);
            let first = rows[0];
            let last = rows[rows.len() - 1];
            prop_assert!(first.start <= scroll);
            prop_assert!(last.end() >= (scroll + viewport).min(total));
        }
    }
}
