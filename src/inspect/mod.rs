//! Document inspection.
//!
//! Produces a structured report with summary counts, the timeline range,
//! the header's media list and a per-tier table.

mod report;

pub use report::{InspectReport, MediaEntry, SummarySection, TierRow};

use crate::eaf::{AnnotationSpan, Document, Millis, Tier};

/// Inspect a document and produce a report.
pub fn inspect_document(doc: &Document) -> InspectReport {
    let tiers: Vec<TierRow> = doc.tiers().into_iter().map(|t| tier_row(doc, t)).collect();

    let summary = SummarySection {
        tiers: tiers.len(),
        alignable_annotations: tiers.iter().map(|t| t.alignable).sum(),
        reference_annotations: tiers.iter().map(|t| t.reference).sum(),
        timeslots: doc.timeline().len(),
        linguistic_types: doc.linguistic_types.len(),
        controlled_vocabularies: doc.controlled_vocabularies.len(),
        linked_files: doc.header.linked_file_descriptors.len(),
    };

    let media = doc
        .header
        .media_descriptors
        .iter()
        .map(|d| MediaEntry {
            url: d.url().unwrap_or("").to_string(),
            mime_type: d.mime_type().unwrap_or("unknown").to_string(),
        })
        .collect();

    InspectReport {
        summary,
        time_range: doc.full_time_interval().ok(),
        media,
        tiers,
    }
}

fn tier_row(doc: &Document, tier: &Tier) -> TierRow {
    let attrs = &tier.attributes;
    let spans = doc.annotations_of(tier.name()).unwrap_or_default();

    TierRow {
        rank: tier.rank,
        name: attrs.name.clone(),
        linguistic_type: attrs.linguistic_type.clone(),
        parent: attrs.parent.clone(),
        participant: attrs.participant.clone(),
        alignable: tier.alignable.len(),
        reference: tier.reference.len(),
        covered_ms: covered_millis(&spans),
    }
}

/// Length of the union of `[start, end)` spans; reversed spans count as empty.
fn covered_millis(spans: &[AnnotationSpan]) -> Millis {
    let mut bounds: Vec<(Millis, Millis)> = spans
        .iter()
        .filter(|s| s.end > s.start)
        .map(|s| (s.start, s.end))
        .collect();
    bounds.sort_unstable();

    let mut total = 0;
    let mut current: Option<(Millis, Millis)> = None;
    for (start, end) in bounds {
        current = match current {
            Some((s, e)) if start <= e => Some((s, e.max(end))),
            Some((s, e)) => {
                total += e - s;
                Some((start, end))
            }
            None => Some((start, end)),
        };
    }
    if let Some((s, e)) = current {
        total += e - s;
    }
    total
}
