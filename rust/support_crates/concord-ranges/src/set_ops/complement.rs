use std::{iter::Peekable, ops::Range};

/// Yields the complement (gaps) within the half-open universe `[0, size)` of a
/// stream of covering ranges ordered by `start`.
///
/// Unlike a plain set of disjoint ranges, the input may contain ranges that
/// overlap, nest or touch each other (a sorted list of matches usually does);
/// they are coalesced on the fly. Empty ranges (`start >= end`) cover nothing.
///
/// Assumptions on the input:
/// - Ranges are yielded in ascending order by `start`.
///
/// Type constraints:
/// - `T: Default` is used as the lower bound (assumes `T::default()` is the minimum, e.g. 0).
///
/// Complexity: O(n) over the input, constant extra memory.
pub fn complement_ranges<T, I>(size: T, ranges: I) -> ComplementRanges<I::IntoIter, T>
where
    T: Ord + Clone + Default,
    I: IntoIterator<Item = Range<T>>,
{
    ComplementRanges::new(size, ranges.into_iter())
}

/// Iterator adapter implementing [`complement_ranges`].
pub struct ComplementRanges<I, T>
where
    I: Iterator<Item = Range<T>>,
{
    it: Peekable<I>,
    size: T,
    /// Everything below `cursor` is either covered or already yielded.
    cursor: T,
}

impl<I, T> ComplementRanges<I, T>
where
    I: Iterator<Item = Range<T>>,
    T: Ord + Clone + Default,
{
    pub fn new(size: T, it: I) -> Self {
        Self {
            it: it.peekable(),
            size,
            cursor: T::default(),
        }
    }

    fn take_gap(&mut self, end: T) -> Option<Range<T>> {
        let start = std::mem::replace(&mut self.cursor, end.clone());
        (start < end).then_some(start..end)
    }
}

impl<I, T> Iterator for ComplementRanges<I, T>
where
    I: Iterator<Item = Range<T>>,
    T: Ord + Clone + Default,
{
    type Item = Range<T>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor < self.size {
            let Some(r) = self.it.peek() else {
                // Tail gap [cursor, size)
                let size = self.size.clone();
                return self.take_gap(size);
            };

            if r.start >= r.end || r.end <= self.cursor {
                self.it.next();
                continue;
            }

            if r.start > self.cursor {
                let gap_end = std::cmp::min(r.start.clone(), self.size.clone());
                if let Some(gap) = self.take_gap(gap_end) {
                    return Some(gap);
                }
                continue;
            }

            // r.start <= cursor < r.end: the range covers the cursor.
            self.cursor = std::cmp::min(r.end.clone(), self.size.clone());
            self.it.next();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaps(size: u32, ranges: Vec<Range<u32>>) -> Vec<Range<u32>> {
        complement_ranges(size, ranges).collect()
    }

    #[test]
    fn complement_empty_input() {
        assert_eq!(gaps(5, vec![]), vec![0..5]);
    }

    #[test]
    fn complement_size_zero() {
        assert_eq!(gaps(0, vec![0..1]), Vec::<Range<u32>>::new());
    }

    #[test]
    fn complement_gap_before_and_after() {
        assert_eq!(gaps(6, vec![2..4]), vec![0..2, 4..6]);
    }

    #[test]
    fn complement_unit_ranges() {
        assert_eq!(gaps(5, vec![1..2, 3..4]), vec![0..1, 2..3, 4..5]);
    }

    #[test]
    fn complement_adjacent_coalesced() {
        assert_eq!(gaps(6, vec![1..3, 3..5]), vec![0..1, 5..6]);
    }

    #[test]
    fn complement_overlapping_and_nested() {
        assert_eq!(gaps(10, vec![1..6, 2..3, 4..7, 8..9]), vec![0..1, 7..8, 9..10]);
        // Same start, growing end, as produced by a sorted list of matches.
        assert_eq!(gaps(8, vec![2..3, 2..5, 2..4]), vec![0..2, 5..8]);
    }

    #[test]
    fn complement_empty_ranges_cover_nothing() {
        assert_eq!(gaps(4, vec![1..1, 2..2]), vec![0..4]);
    }

    #[test]
    fn complement_range_beyond_size() {
        assert_eq!(gaps(5, vec![1..100]), vec![0..1]);
        assert_eq!(gaps(5, vec![8..10]), vec![0..5]);
    }

    #[test]
    fn complement_complete_coverage() {
        assert_eq!(gaps(7, vec![0..3, 3..7]), Vec::<Range<u32>>::new());
    }

    #[test]
    fn complement_matches_bitmap() {
        fastrand::seed(84712093);
        for _ in 0..300 {
            let size = fastrand::u32(0..40);
            let mut ranges: Vec<Range<u32>> = (0..fastrand::usize(0..8))
                .map(|_| {
                    let start = fastrand::u32(0..45);
                    start..start + fastrand::u32(0..6)
                })
                .collect();
            ranges.sort_by_key(|r| r.start);

            let mut covered = vec![false; size as usize];
            for r in &ranges {
                for p in r.clone() {
                    if p < size {
                        covered[p as usize] = true;
                    }
                }
            }
            let expected: Vec<u32> = (0..size).filter(|&p| !covered[p as usize]).collect();
            let actual: Vec<u32> = complement_ranges(size, ranges.clone())
                .flatten()
                .collect();
            assert_eq!(actual, expected, "size {size}, ranges {ranges:?}");
        }
    }
}
