//! Row partitioning of the flattened movie sequence.
//!
//! Rows are derived views: row `i` is always the slice `[i * columns, (i + 1) * columns)`
//! of the flattened sequence, truncated at the end. Nothing here is cached, so a
//! column-count change simply produces a different set of rows on the next call.

/// Clamps a measured column count to the smallest usable value.
#[must_use]
pub const fn clamp_columns(columns: usize) -> usize {
    if columns == 0 {
        1
    } else {
        columns
    }
}

/// Number of rows needed to hold `len` items at `columns` per row.
///
/// ```
/// use reelgrid::grid::partition::row_count;
///
/// assert_eq!(row_count(0, 4), 0);
/// assert_eq!(row_count(9, 4), 3);
/// assert_eq!(row_count(5, 0), 5);
/// ```
#[must_use]
pub const fn row_count(len: usize, columns: usize) -> usize {
    len.div_ceil(clamp_columns(columns))
}

/// Groups `items` into rows of `columns` items each; the last row may be shorter.
///
/// ```
/// use reelgrid::grid::partition::partition;
///
/// let rows = partition(&[1, 2, 3, 4, 5], 2);
/// assert_eq!(rows, vec![&[1, 2][..], &[3, 4][..], &[5][..]]);
/// ```
#[must_use]
pub fn partition<T>(items: &[T], columns: usize) -> Vec<&[T]> {
    items.chunks(clamp_columns(columns)).collect()
}

/// Returns row `index` without materializing the other rows.
#[must_use]
pub fn row<T>(items: &[T], columns: usize, index: usize) -> Option<&[T]> {
    let columns = clamp_columns(columns);
    let start = index.checked_mul(columns)?;
    if start >= items.len() {
        return None;
    }
    let end = (start + columns).min(items.len());
    Some(&items[start..end])
}

/// Row that contains item `item_index`.
#[must_use]
pub const fn row_of(item_index: usize, columns: usize) -> usize {
    item_index / clamp_columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_columns_clamps_to_one() {
        let rows = partition(&["a", "b"], 0);
        assert_eq!(rows.len(), 2);
        assert_eq!(row(&["a", "b"], 0, 1), Some(&["b"][..]));
    }

    #[test]
    fn row_past_end_is_none() {
        assert_eq!(row(&[1, 2, 3], 2, 2), None);
        assert_eq!(row::<u8>(&[], 3, 0), None);
        assert_eq!(row(&[1, 2, 3], 2, usize::MAX), None);
    }

    #[test]
    fn row_of_maps_items_to_rows() {
        assert_eq!(row_of(0, 3), 0);
        assert_eq!(row_of(5, 3), 1);
        assert_eq!(row_of(6, 3), 2);
    }

    proptest! {
        #[test]
        fn partition_produces_ceil_rows(len in 0usize..500, columns in 1usize..12) {
            let items: Vec<usize> = (0..len).collect();
            let rows = partition(&items, columns);

            prop_assert_eq!(rows.len(), len.div_ceil(columns));
            prop_assert_eq!(rows.len(), row_count(len, columns));

            for (i, r) in rows.iter().enumerate() {
                let is_last = i + 1 == rows.len();
                if is_last && len % columns != 0 {
                    prop_assert_eq!(r.len(), len % columns);
                } else {
                    prop_assert_eq!(r.len(), columns);
                }
                prop_assert_eq!(*r, &items[i * columns..(i * columns + r.len())]);
                prop_assert_eq!(row(&items, columns, i), Some(*r));
            }
        }
    }
}
