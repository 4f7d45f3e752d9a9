//! Inspect report types and terminal formatting.

use serde::Serialize;
use std::fmt;

use crate::eaf::Millis;

/// The result of inspecting a document.
#[derive(Clone, Debug, Serialize)]
pub struct InspectReport {
    pub summary: SummarySection,

    /// `(min, max)` over all timed slots, if any.
    pub time_range: Option<(Millis, Millis)>,

    pub media: Vec<MediaEntry>,

    /// One row per tier, in rank order.
    pub tiers: Vec<TierRow>,
}

/// Document-wide counts.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SummarySection {
    pub tiers: usize,
    pub alignable_annotations: usize,
    pub reference_annotations: usize,
    pub timeslots: usize,
    pub linguistic_types: usize,
    pub controlled_vocabularies: usize,
    pub linked_files: usize,
}

/// A media descriptor from the header.
#[derive(Clone, Debug, Serialize)]
pub struct MediaEntry {
    pub url: String,
    pub mime_type: String,
}

/// Per-tier statistics.
#[derive(Clone, Debug, Serialize)]
pub struct TierRow {
    pub rank: usize,
    pub name: String,
    pub linguistic_type: String,
    pub parent: Option<String>,
    pub participant: Option<String>,
    pub alignable: usize,
    pub reference: usize,
    /// Milliseconds covered by at least one annotation of the tier.
    pub covered_ms: Millis,
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "╭─────────────────────────────────────────────────────────────╮")?;
        writeln!(f, "│              📊  EAF Document Inspection Report             │")?;
        writeln!(f, "╰─────────────────────────────────────────────────────────────╯")?;
        writeln!(f)?;

        self.fmt_summary(f)?;
        writeln!(f)?;

        if !self.media.is_empty() {
            self.fmt_media(f)?;
            writeln!(f)?;
        }

        self.fmt_tiers(f)
    }
}

impl InspectReport {
    fn fmt_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.summary;

        writeln!(f, "┌─ Summary ─────────────────────────────────────────────────┐")?;
        writeln!(f, "│")?;
        writeln!(f, "│   Tiers:                   {:>8}", format_number(s.tiers))?;
        writeln!(f, "│   Alignable annotations:   {:>8}", format_number(s.alignable_annotations))?;
        writeln!(f, "│   Reference annotations:   {:>8}", format_number(s.reference_annotations))?;
        writeln!(f, "│   Timeslots:               {:>8}", format_number(s.timeslots))?;
        writeln!(f, "│   Linguistic types:        {:>8}", format_number(s.linguistic_types))?;
        if s.controlled_vocabularies > 0 {
            writeln!(
                f,
                "│   Controlled vocabularies: {:>8}",
                format_number(s.controlled_vocabularies)
            )?;
        }
        if s.linked_files > 0 {
            writeln!(f, "│   Linked files:            {:>8}", format_number(s.linked_files))?;
        }
        writeln!(f, "│")?;
        match self.time_range {
            Some((start, end)) => writeln!(
                f,
                "│   Time range:    {} – {} ({})",
                format_millis(start),
                format_millis(end),
                format_millis(end - start)
            )?,
            None => writeln!(f, "│   Time range:    no timed slots")?,
        }
        writeln!(f, "│")?;
        writeln!(f, "└───────────────────────────────────────────────────────────┘")
    }

    fn fmt_media(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "┌─ Media ({}) {}┐", self.media.len(), "─".repeat(48))?;
        for media in &self.media {
            writeln!(f, "│   {:<16} {}", truncate_label(&media.mime_type, 16), media.url)?;
        }
        writeln!(f, "└───────────────────────────────────────────────────────────┘")
    }

    fn fmt_tiers(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "┌─ Tiers ({}) {}┐", self.tiers.len(), "─".repeat(48))?;
        writeln!(f, "│")?;

        if self.tiers.is_empty() {
            writeln!(f, "│   No tiers found.")?;
        } else {
            writeln!(
                f,
                "│   {:>3}  {:<16} {:<12} {:<12} {:>7} {:>7} {:>10}",
                "#", "name", "type", "parent", "align", "ref", "covered"
            )?;
            for row in &self.tiers {
                writeln!(
                    f,
                    "│   {:>3}  {:<16} {:<12} {:<12} {:>7} {:>7} {:>10}",
                    row.rank,
                    truncate_label(&row.name, 16),
                    truncate_label(&row.linguistic_type, 12),
                    truncate_label(row.parent.as_deref().unwrap_or("-"), 12),
                    format_number(row.alignable),
                    format_number(row.reference),
                    format_millis(row.covered_ms)
                )?;
            }
        }

        writeln!(f, "│")?;
        writeln!(f, "└───────────────────────────────────────────────────────────┘")
    }
}

/// Format a number with thousands separators.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// `m:ss.mmm`, with a leading minus for negative values.
fn format_millis(ms: Millis) -> String {
    let sign = if ms < 0 { "-" } else { "" };
    let ms = ms.unsigned_abs();
    format!("{}{}:{:02}.{:03}", sign, ms / 60_000, (ms / 1000) % 60, ms % 1000)
}

/// Truncate a label to fit in the display column.
fn truncate_label(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        label.to_string()
    } else {
        let kept: String = label.chars().take(max_len - 1).collect();
        format!("{kept}…")
    }
}
