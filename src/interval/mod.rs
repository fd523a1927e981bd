//! Temporal regions: intervals, span intervals and sets of span intervals.

mod interval;
mod relation;
mod siset;
mod span;

pub use interval::{Interval, Time, MAX_TIME, MIN_TIME};
pub use relation::Relation;
pub use siset::{intersection, subtract, SISet};
pub use span::SpanInterval;
