//! Praat TextGrid export.
//!
//! Each exported tier becomes an `IntervalTier` in the long text format.
//! TextGrid tiers must tile the whole grid without overlaps, so:
//! - uncovered stretches are filled with empty intervals
//! - an annotation starting before the previous one ends is dropped
//! - reversed spans are dropped
//!
//! Dropped annotations are logged as warnings. Times are written in seconds.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::warn;

use super::{AnnotationSpan, Document, Millis};
use crate::error::EafError;

/// Write the document as a TextGrid, leaving out the `excluded` tiers.
pub fn write_textgrid(
    path: &Path,
    doc: &Document,
    excluded: &BTreeSet<String>,
) -> Result<(), EafError> {
    let text = to_textgrid_string(doc, excluded)?;
    fs::write(path, text).map_err(EafError::Io)
}

/// Render the document as a TextGrid string, leaving out the `excluded` tiers.
pub fn to_textgrid_string(doc: &Document, excluded: &BTreeSet<String>) -> Result<String, EafError> {
    let mut tiers: Vec<(&str, Vec<AnnotationSpan>)> = Vec::new();
    for name in doc.tier_names() {
        if excluded.contains(name) {
            continue;
        }
        let mut spans = doc.annotations_of(name)?;
        spans.sort();
        tiers.push((name, spans));
    }

    let (xmin, xmax) = tiers
        .iter()
        .flat_map(|(_, spans)| spans.iter())
        .fold((0, 0), |(lo, hi): (Millis, Millis), s| {
            (lo.min(s.start), hi.max(s.end))
        });

    let mut out = String::new();
    writeln!(out, "File type = \"ooTextFile\"").expect("write to string");
    writeln!(out, "Object class = \"TextGrid\"").expect("write to string");
    writeln!(out).expect("write to string");
    writeln!(out, "xmin = {}", seconds(xmin)).expect("write to string");
    writeln!(out, "xmax = {}", seconds(xmax)).expect("write to string");
    writeln!(out, "tiers? <exists>").expect("write to string");
    writeln!(out, "size = {}", tiers.len()).expect("write to string");
    writeln!(out, "item []:").expect("write to string");

    for (idx, (name, spans)) in tiers.iter().enumerate() {
        let intervals = tile(name, spans, xmin, xmax);

        writeln!(out, "    item [{}]:", idx + 1).expect("write to string");
        writeln!(out, "        class = \"IntervalTier\"").expect("write to string");
        writeln!(out, "        name = \"{}\"", praat_escape(name)).expect("write to string");
        writeln!(out, "        xmin = {}", seconds(xmin)).expect("write to string");
        writeln!(out, "        xmax = {}", seconds(xmax)).expect("write to string");
        writeln!(out, "        intervals: size = {}", intervals.len()).expect("write to string");
        for (i, (start, end, text)) in intervals.iter().enumerate() {
            writeln!(out, "        intervals [{}]:", i + 1).expect("write to string");
            writeln!(out, "            xmin = {}", seconds(*start)).expect("write to string");
            writeln!(out, "            xmax = {}", seconds(*end)).expect("write to string");
            writeln!(out, "            text = \"{}\"", praat_escape(text))
                .expect("write to string");
        }
    }

    Ok(out)
}

/// Turns sorted spans into gapless, non-overlapping intervals over `[xmin, xmax]`.
fn tile<'a>(
    tier: &str,
    spans: &'a [AnnotationSpan],
    xmin: Millis,
    xmax: Millis,
) -> Vec<(Millis, Millis, &'a str)> {
    let mut out = Vec::with_capacity(spans.len() * 2 + 1);
    let mut cursor = xmin;

    for span in spans {
        if span.end < span.start {
            warn!(
                "tier '{}': dropping reversed annotation [{}, {}] '{}' from TextGrid",
                tier, span.start, span.end, span.value
            );
            continue;
        }
        if span.start < cursor {
            warn!(
                "tier '{}': dropping overlapping annotation [{}, {}] '{}' from TextGrid",
                tier, span.start, span.end, span.value
            );
            continue;
        }
        if span.start > cursor {
            out.push((cursor, span.start, ""));
        }
        out.push((span.start, span.end, span.value.as_str()));
        cursor = span.end;
    }

    if cursor < xmax || out.is_empty() {
        out.push((cursor, xmax, ""));
    }
    out
}

fn seconds(millis: Millis) -> f64 {
    millis as f64 / 1000.0
}

fn praat_escape(raw: &str) -> String {
    raw.replace('"', "\"\"")
}
