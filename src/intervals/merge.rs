//! Union of several tiers' coverage into one tier.

use std::collections::BTreeSet;

use crate::eaf::{AnnotationSpan, Millis};

/// Default maximum distance between covered instants of one merged run.
pub const DEFAULT_MERGE_GAP: Millis = 1;

/// Merges spans into maximal runs of covered instants.
///
/// Two covered instants belong to the same run when they are at most
/// `gap_threshold` apart (thresholds below 1 behave as 1, i.e. only
/// contiguous coverage merges). A run covering instants `first..=last`
/// becomes `[first, last + 1]`, valued with the sorted distinct values of
/// the spans that cover it joined by `_`. Empty and reversed spans cover
/// nothing and are ignored.
pub fn merge_spans(spans: &[AnnotationSpan], gap_threshold: Millis) -> Vec<AnnotationSpan> {
    let gap_threshold = gap_threshold.max(1);

    let mut covering: Vec<&AnnotationSpan> = spans.iter().filter(|s| s.end > s.start).collect();
    covering.sort_by_key(|s| (s.start, s.end));

    let mut out = Vec::new();
    let mut iter = covering.into_iter();
    let Some(first) = iter.next() else {
        return out;
    };

    let mut run_start = first.start;
    let mut run_last = first.end - 1;
    let mut values: BTreeSet<&str> = BTreeSet::from([first.value.as_str()]);

    for span in iter {
        if span.start - run_last <= gap_threshold {
            run_last = run_last.max(span.end - 1);
        } else {
            out.push(finish_run(run_start, run_last, &values));
            run_start = span.start;
            run_last = span.end - 1;
            values.clear();
        }
        values.insert(span.value.as_str());
    }
    out.push(finish_run(run_start, run_last, &values));

    out
}

fn finish_run(start: Millis, last: Millis, values: &BTreeSet<&str>) -> AnnotationSpan {
    let value = values.iter().copied().collect::<Vec<_>>().join("_");
    AnnotationSpan::new(start, last + 1, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disjoint_spans_stay_apart() {
        let spans = vec![
            AnnotationSpan::new(0, 100, "A"),
            AnnotationSpan::new(200, 300, "B"),
        ];
        let merged = merge_spans(&spans, 1);
        assert_eq!(
            merged,
            vec![
                AnnotationSpan::new(0, 100, "A"),
                AnnotationSpan::new(200, 300, "B"),
            ]
        );
    }

    #[test]
    fn test_overlapping_spans_join_values() {
        let spans = vec![
            AnnotationSpan::new(50, 150, "B"),
            AnnotationSpan::new(0, 100, "A"),
        ];
        let merged = merge_spans(&spans, 1);
        assert_eq!(merged, vec![AnnotationSpan::new(0, 150, "A_B")]);
    }

    #[test]
    fn test_adjacent_spans_are_contiguous() {
        let spans = vec![
            AnnotationSpan::new(0, 100, "x"),
            AnnotationSpan::new(100, 200, "y"),
        ];
        assert_eq!(merge_spans(&spans, 1), vec![AnnotationSpan::new(0, 200, "x_y")]);
    }

    #[test]
    fn test_threshold_bridges_small_gaps() {
        let spans = vec![
            AnnotationSpan::new(0, 100, "x"),
            AnnotationSpan::new(110, 200, "x"),
        ];
        // Last covered instant is 99, next is 110: distance 11.
        assert_eq!(merge_spans(&spans, 10).len(), 2);
        assert_eq!(merge_spans(&spans, 11), vec![AnnotationSpan::new(0, 200, "x")]);
    }

    #[test]
    fn test_contained_span_does_not_shrink_run() {
        let spans = vec![
            AnnotationSpan::new(0, 500, "long"),
            AnnotationSpan::new(10, 20, "short"),
            AnnotationSpan::new(400, 450, "late"),
        ];
        assert_eq!(
            merge_spans(&spans, 1),
            vec![AnnotationSpan::new(0, 500, "late_long_short")]
        );
    }

    #[test]
    fn test_empty_spans_are_ignored() {
        let spans = vec![
            AnnotationSpan::new(10, 10, "zero"),
            AnnotationSpan::new(30, 20, "reversed"),
        ];
        assert!(merge_spans(&spans, 1).is_empty());
        assert!(merge_spans(&[], 1).is_empty());
    }
}
