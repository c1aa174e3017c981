mod interval;
mod label_range;

pub use interval::{merge_intervals, Interval};
pub use label_range::LabelRange;
