//! Document validation.
//!
//! The model accepts data ELAN would reject so that real-world files load;
//! this module is where that looseness is reported:
//! - Timeline integrity (missing, unaligned, unused and negative timeslots,
//!   reversed spans)
//! - Reference integrity (dangling references and predecessors, cycles)
//! - Declarations (parent tiers, linguistic types, controlled vocabularies)

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::{BTreeSet, HashSet};

use crate::eaf::{AnnotationId, Document, Tier, TimeslotId};
use crate::error::EafError;

/// Options for validation behavior.
#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
}

/// Validates a document and returns a report of all issues found.
///
/// Tiers are checked in rank order, then linguistic types, then the
/// timeline, so the report order is deterministic.
pub fn validate_document(doc: &Document, _opts: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();

    if doc.tier_names().is_empty() {
        report.add(ValidationIssue::warning(
            IssueCode::NoTiers,
            "Document has no tiers",
            IssueContext::Document,
        ));
    }

    let annotation_ids: HashSet<AnnotationId> = doc
        .tiers()
        .into_iter()
        .flat_map(|t| t.alignable.keys().chain(t.reference.keys()).copied())
        .collect();

    for tier in doc.tiers() {
        validate_tier_declaration(doc, tier, &mut report);
        validate_alignable(doc, tier, &mut report);
        validate_references(doc, tier, &annotation_ids, &mut report);
    }

    validate_linguistic_types(doc, &mut report);
    validate_timeslot_usage(doc, &mut report);

    report
}

fn validate_tier_declaration(doc: &Document, tier: &Tier, report: &mut ValidationReport) {
    let name = tier.name();

    if let Some(parent) = &tier.attributes.parent {
        if !doc.has_tier(parent) {
            report.add(ValidationIssue::error(
                IssueCode::MissingParentTier,
                format!("Parent tier '{}' does not exist", parent),
                IssueContext::Tier { name: name.into() },
            ));
        }
    }

    let lt = &tier.attributes.linguistic_type;
    if !doc.has_linguistic_type(lt) {
        report.add(ValidationIssue::warning(
            IssueCode::UnknownLinguisticType,
            format!("Linguistic type '{}' is not declared", lt),
            IssueContext::Tier { name: name.into() },
        ));
    }
}

fn validate_alignable(doc: &Document, tier: &Tier, report: &mut ValidationReport) {
    let timeline = doc.timeline();

    for ann in tier.alignable.values() {
        let context = || IssueContext::Annotation {
            tier: tier.name().into(),
            id: ann.id,
        };

        let mut times = [None, None];
        for (slot, time) in [ann.start, ann.end].into_iter().zip(times.iter_mut()) {
            match timeline.get(slot) {
                Err(_) => report.add(ValidationIssue::error(
                    IssueCode::MissingTimeslot,
                    format!("References non-existent timeslot {}", slot),
                    context(),
                )),
                Ok(None) => report.add(ValidationIssue::warning(
                    IssueCode::UnalignedTimeslot,
                    format!("Timeslot {} has no time value", slot),
                    context(),
                )),
                Ok(Some(ms)) => *time = Some(ms),
            }
        }

        if let [Some(start), Some(end)] = times {
            if end < start {
                report.add(ValidationIssue::error(
                    IssueCode::ReversedSpan,
                    format!("Ends at {} ms, before its start at {} ms", end, start),
                    context(),
                ));
            }
        }
    }
}

fn validate_references(
    doc: &Document,
    tier: &Tier,
    annotation_ids: &HashSet<AnnotationId>,
    report: &mut ValidationReport,
) {
    for ann in tier.reference.values() {
        let context = || IssueContext::Annotation {
            tier: tier.name().into(),
            id: ann.id,
        };

        if !annotation_ids.contains(&ann.annotation_ref) {
            report.add(ValidationIssue::error(
                IssueCode::DanglingReference,
                format!("References non-existent annotation {}", ann.annotation_ref),
                context(),
            ));
        } else if let Err(EafError::ReferenceCycle(_)) = doc.resolve_span(ann.id) {
            report.add(ValidationIssue::error(
                IssueCode::ReferenceCycle,
                "Reference chain loops back on itself",
                context(),
            ));
        }

        if let Some(previous) = ann.previous {
            if !annotation_ids.contains(&previous) {
                report.add(ValidationIssue::warning(
                    IssueCode::DanglingPrevious,
                    format!("Previous annotation {} does not exist", previous),
                    context(),
                ));
            }
        }
    }
}

fn validate_linguistic_types(doc: &Document, report: &mut ValidationReport) {
    for lt in &doc.linguistic_types {
        let Some(cv) = &lt.controlled_vocabulary else {
            continue;
        };
        if doc.controlled_vocabulary(cv).is_err() {
            report.add(ValidationIssue::warning(
                IssueCode::UnknownControlledVocabulary,
                format!("Controlled vocabulary '{}' is not declared", cv),
                IssueContext::LinguisticType { id: lt.id.clone() },
            ));
        }
    }
}

fn validate_timeslot_usage(doc: &Document, report: &mut ValidationReport) {
    let referenced: BTreeSet<TimeslotId> = doc
        .tiers()
        .into_iter()
        .flat_map(|t| t.timeslot_refs())
        .collect();

    for (id, value) in doc.timeline().iter() {
        if let Some(ms) = value.filter(|ms| *ms < 0) {
            report.add(ValidationIssue::error(
                IssueCode::NegativeTime,
                format!("Time value {} ms is before the start of the media", ms),
                IssueContext::Timeslot { id },
            ));
        }
        if !referenced.contains(&id) {
            report.add(ValidationIssue::warning(
                IssueCode::UnreferencedTimeslot,
                "No annotation references this timeslot",
                IssueContext::Timeslot { id },
            ));
        }
    }
}
