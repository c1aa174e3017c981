use std::ops::RangeInclusive;

use rayon::prelude::*;

/// Range of labels observed in a volume.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct LabelRange {
    /// Lower bound
    pub low: u32,
    /// Upper bound (inclusive)
    pub high: u32,
}

impl LabelRange {
    /// Constructs new, empty range.
    /// Any label extends it.
    pub fn empty() -> LabelRange {
        LabelRange {
            low: u32::MAX,
            high: 0,
        }
    }

    /// Constructs new range with one element, `label`.
    pub fn seed(label: u32) -> LabelRange {
        LabelRange {
            low: label,
            high: label,
        }
    }

    /// Constructs minimal range, where all samples from an iterator
    /// are inside the range.
    pub fn from_samples<I>(iter: I) -> LabelRange
    where
        I: IntoIterator,
        I::Item: Into<u32>,
    {
        let mut range = LabelRange::empty();
        for label in iter {
            range.extend(label.into());
        }
        range
    }

    /// Same as [`from_samples`](LabelRange::from_samples), reduced in parallel.
    /// Used for whole voxel buffers.
    pub fn from_slice_par(samples: &[u32]) -> LabelRange {
        samples
            .par_iter()
            .fold(LabelRange::empty, |mut range, &label| {
                range.extend(label);
                range
            })
            .reduce(LabelRange::empty, |a, b| a.union(&b))
    }

    /// Extend the range with new label.
    pub fn extend(&mut self, label: u32) {
        self.low = self.low.min(label);
        self.high = self.high.max(label);
    }

    /// Smallest range containing both ranges.
    pub fn union(&self, other: &LabelRange) -> LabelRange {
        LabelRange {
            low: self.low.min(other.low),
            high: self.high.max(other.high),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.low > self.high
    }

    /// Check if label is inside the range.
    pub fn contains(&self, label: u32) -> bool {
        self.low <= label && label <= self.high
    }

    /// `high - low`, zero for an empty range.
    pub fn span(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            self.high - self.low
        }
    }
}

impl Default for LabelRange {
    fn default() -> Self {
        Self::empty()
    }
}

/// Conversion from standard library type.
/// ```
/// # use segvol_lib::common::LabelRange;
/// let range: LabelRange = (0..=45).into();
/// assert!(range.contains(45));
/// ```
impl From<RangeInclusive<u32>> for LabelRange {
    fn from(range: RangeInclusive<u32>) -> Self {
        LabelRange {
            low: *range.start(),
            high: *range.end(),
        }
    }
}
