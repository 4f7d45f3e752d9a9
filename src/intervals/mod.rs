//! Interval algorithms over resolved annotation spans.
//!
//! Everything here is a pure function over [`AnnotationSpan`] slices; the
//! [`Document`](crate::eaf::Document) resolves tiers through its timeline,
//! calls into this module, and writes any results back as new tiers.
//!
//! Two coverage conventions are in play:
//! - point and range lookups ([`select_at`], [`select_between`]) treat a
//!   span as the closed interval `[start, end]`;
//! - the sweeps ([`merge`], [`gaps`]) treat a span as the instants it
//!   covers, `start <= t < end`, so back-to-back annotations neither
//!   overlap nor leave a gap.

pub mod gaps;
pub mod glue;
pub mod merge;

pub use gaps::{activity_runs, classify_runs, Activity, ActivityRun, ClassifiedInterval, Transition};
pub use glue::glue_spans;
pub use merge::merge_spans;

use crate::eaf::{AnnotationSpan, Millis};

/// Spans containing `millis` (inclusive at both ends), sorted.
pub fn select_at<'a, I>(spans: I, millis: Millis) -> Vec<AnnotationSpan>
where
    I: IntoIterator<Item = &'a AnnotationSpan>,
{
    let mut out: Vec<AnnotationSpan> = spans
        .into_iter()
        .filter(|span| span.contains(millis))
        .cloned()
        .collect();
    out.sort();
    out
}

/// Spans overlapping `[start, end]` (inclusive at both ends), sorted.
pub fn select_between<'a, I>(spans: I, start: Millis, end: Millis) -> Vec<AnnotationSpan>
where
    I: IntoIterator<Item = &'a AnnotationSpan>,
{
    let mut out: Vec<AnnotationSpan> = spans
        .into_iter()
        .filter(|span| span.overlaps(start, end))
        .cloned()
        .collect();
    out.sort();
    out
}
