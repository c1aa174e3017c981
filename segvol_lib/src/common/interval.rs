/// Inclusive range of integer labels `[start, end]`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Interval {
    /// First label in the range
    pub start: u32,
    /// Last label in the range (inclusive)
    pub end: u32,
}

impl Interval {
    pub fn new(start: u32, end: u32) -> Interval {
        Interval { start, end }
    }

    /// Check if label is inside the interval.
    pub fn contains(&self, label: u32) -> bool {
        self.start <= label && label <= self.end
    }

    /// Interval contains exactly one label.
    pub fn is_single(&self) -> bool {
        self.start == self.end
    }
}

impl From<(u32, u32)> for Interval {
    fn from((start, end): (u32, u32)) -> Self {
        Interval { start, end }
    }
}

/// Collapse intervals into the minimal sorted set of disjoint intervals
/// covering the same labels.
///
/// Intervals are stable-sorted by `start`. An interval whose `start` is not
/// greater than the `end` of the interval being built is merged into it, so
/// touching intervals like `[0,5]` and `[5,8]` become `[0,8]`.
/// Input order is not preserved.
///
/// ```
/// # use segvol_lib::common::{merge_intervals, Interval};
/// let merged = merge_intervals(vec![(3, 8).into(), (1, 5).into(), (10, 12).into()]);
/// assert_eq!(merged, vec![Interval::new(1, 8), Interval::new(10, 12)]);
/// ```
pub fn merge_intervals(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort_by_key(|i| i.start);

    let mut iter = intervals.into_iter();
    let mut current = match iter.next() {
        Some(first) => first,
        None => return vec![],
    };

    let mut merged = Vec::new();
    for next in iter {
        if next.start <= current.end {
            current.end = current.end.max(next.end);
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);

    merged
}
