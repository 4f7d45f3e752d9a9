//! Gluing of near-adjacent annotations within one tier.

use std::collections::BTreeSet;

use crate::eaf::{AnnotationSpan, Millis};

/// Default gap below which consecutive annotations are glued.
pub const DEFAULT_GLUE_THRESHOLD: Millis = 85;

/// Collapses spans separated by less than `threshold` into one span.
///
/// Spans are sorted by start (then end, then value) and any whose value is
/// in `excluded` is dropped first. A span is glued onto the running one
/// when `span.start - running.end < threshold`; the running end becomes the
/// later of the two ends and the values are joined with `_`.
pub fn glue_spans(
    spans: &[AnnotationSpan],
    threshold: Millis,
    excluded: &BTreeSet<String>,
) -> Vec<AnnotationSpan> {
    let mut sorted: Vec<&AnnotationSpan> = spans
        .iter()
        .filter(|s| !excluded.contains(&s.value))
        .collect();
    sorted.sort();

    let mut out = Vec::new();
    let mut running: Option<AnnotationSpan> = None;

    for span in sorted {
        running = Some(match running.take() {
            None => span.clone(),
            Some(mut current) if span.start - current.end < threshold => {
                current.end = current.end.max(span.end);
                current.value.push('_');
                current.value.push_str(&span.value);
                current
            }
            Some(current) => {
                out.push(current);
                span.clone()
            }
        });
    }
    out.extend(running);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> Vec<AnnotationSpan> {
        vec![
            AnnotationSpan::new(150, 200, "y"),
            AnnotationSpan::new(0, 100, "x"),
        ]
    }

    #[test]
    fn test_glues_when_gap_below_threshold() {
        let glued = glue_spans(&pair(), DEFAULT_GLUE_THRESHOLD, &BTreeSet::new());
        assert_eq!(glued, vec![AnnotationSpan::new(0, 200, "x_y")]);
    }

    #[test]
    fn test_keeps_apart_when_gap_reaches_threshold() {
        let glued = glue_spans(&pair(), 10, &BTreeSet::new());
        assert_eq!(
            glued,
            vec![
                AnnotationSpan::new(0, 100, "x"),
                AnnotationSpan::new(150, 200, "y"),
            ]
        );

        // Strictly less than: a gap of exactly 50 is not glued at 50.
        assert_eq!(glue_spans(&pair(), 50, &BTreeSet::new()).len(), 2);
        assert_eq!(glue_spans(&pair(), 51, &BTreeSet::new()).len(), 1);
    }

    #[test]
    fn test_excluded_values_are_dropped() {
        let spans = vec![
            AnnotationSpan::new(0, 100, "x"),
            AnnotationSpan::new(110, 120, "@noise"),
            AnnotationSpan::new(130, 200, "y"),
        ];
        let excluded: BTreeSet<String> = ["@noise".to_string()].into_iter().collect();
        assert_eq!(
            glue_spans(&spans, 85, &excluded),
            vec![AnnotationSpan::new(0, 200, "x_y")]
        );
    }

    #[test]
    fn test_contained_span_keeps_running_end() {
        let spans = vec![
            AnnotationSpan::new(0, 300, "outer"),
            AnnotationSpan::new(100, 150, "inner"),
        ];
        assert_eq!(
            glue_spans(&spans, 85, &BTreeSet::new()),
            vec![AnnotationSpan::new(0, 300, "outer_inner")]
        );
    }

    #[test]
    fn test_final_run_is_flushed() {
        let spans = vec![
            AnnotationSpan::new(0, 10, "a"),
            AnnotationSpan::new(500, 510, "b"),
            AnnotationSpan::new(520, 530, "c"),
        ];
        assert_eq!(
            glue_spans(&spans, 85, &BTreeSet::new()),
            vec![
                AnnotationSpan::new(0, 10, "a"),
                AnnotationSpan::new(500, 530, "b_c"),
            ]
        );
        assert!(glue_spans(&[], 85, &BTreeSet::new()).is_empty());
    }
}
