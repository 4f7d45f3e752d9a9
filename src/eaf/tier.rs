//! Tiers and the two kinds of annotation they own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ids::{AnnotationId, TimeslotId};
use super::Millis;

/// Linguistic type used by tiers created without an explicit one.
pub const DEFAULT_LINGUISTIC_TYPE: &str = "default-lt";

/// Declared attributes of a tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAttributes {
    /// Tier name (`TIER_ID`); unique within a document.
    pub name: String,

    /// `LINGUISTIC_TYPE_REF`.
    pub linguistic_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_locale: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotator: Option<String>,

    /// Attributes this model has no field for, kept for round-trips.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl TierAttributes {
    pub fn new(name: impl Into<String>, linguistic_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            linguistic_type: linguistic_type.into(),
            parent: None,
            participant: None,
            default_locale: None,
            annotator: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_participant(mut self, participant: impl Into<String>) -> Self {
        self.participant = Some(participant.into());
        self
    }

    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = Some(locale.into());
        self
    }

    pub fn with_annotator(mut self, annotator: impl Into<String>) -> Self {
        self.annotator = Some(annotator.into());
        self
    }
}

/// An annotation bound directly to two timeslots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignableAnnotation {
    pub id: AnnotationId,
    pub start: TimeslotId,
    pub end: TimeslotId,
    pub value: String,

    /// Graphic reference (`SVG_REF`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg_ref: Option<String>,
}

/// An annotation that inherits its time span from another annotation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefAnnotation {
    pub id: AnnotationId,

    /// The annotation whose span this one inherits.
    pub annotation_ref: AnnotationId,

    pub value: String,

    /// Predecessor in a chain of annotations sharing one span.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<AnnotationId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg_ref: Option<String>,
}

/// Borrowed view of either kind of annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnnotationRef<'a> {
    Alignable(&'a AlignableAnnotation),
    Reference(&'a RefAnnotation),
}

impl<'a> AnnotationRef<'a> {
    pub fn id(&self) -> AnnotationId {
        match self {
            AnnotationRef::Alignable(ann) => ann.id,
            AnnotationRef::Reference(ann) => ann.id,
        }
    }

    pub fn value(&self) -> &'a str {
        match *self {
            AnnotationRef::Alignable(ann) => &ann.value,
            AnnotationRef::Reference(ann) => &ann.value,
        }
    }
}

/// A resolved annotation: times in milliseconds plus its value.
///
/// Field order makes the derived ordering sort by start, then end, then value.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnnotationSpan {
    pub start: Millis,
    pub end: Millis,
    pub value: String,
}

impl AnnotationSpan {
    pub fn new(start: Millis, end: Millis, value: impl Into<String>) -> Self {
        Self {
            start,
            end,
            value: value.into(),
        }
    }

    /// Length in milliseconds (negative for reversed spans).
    pub fn duration(&self) -> Millis {
        self.end - self.start
    }

    /// Inclusive containment, as used by point lookups.
    pub fn contains(&self, millis: Millis) -> bool {
        self.start <= millis && millis <= self.end
    }

    /// Inclusive overlap with `[start, end]`.
    pub fn overlaps(&self, start: Millis, end: Millis) -> bool {
        self.end >= start && self.start <= end
    }
}

/// A named, ranked collection of annotations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub attributes: TierAttributes,

    /// Creation rank; tiers are written out in this order.
    pub rank: usize,

    #[serde(default)]
    pub alignable: BTreeMap<AnnotationId, AlignableAnnotation>,

    #[serde(default)]
    pub reference: BTreeMap<AnnotationId, RefAnnotation>,
}

impl Tier {
    pub fn new(attributes: TierAttributes, rank: usize) -> Self {
        Self {
            attributes,
            rank,
            alignable: BTreeMap::new(),
            reference: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.attributes.name
    }

    /// Looks up an annotation of either kind owned by this tier.
    pub fn get(&self, id: AnnotationId) -> Option<AnnotationRef<'_>> {
        self.alignable
            .get(&id)
            .map(AnnotationRef::Alignable)
            .or_else(|| self.reference.get(&id).map(AnnotationRef::Reference))
    }

    pub fn annotation_count(&self) -> usize {
        self.alignable.len() + self.reference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alignable.is_empty() && self.reference.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.alignable.clear();
        self.reference.clear();
    }

    /// Timeslots referenced by this tier's alignable annotations.
    pub fn timeslot_refs(&self) -> impl Iterator<Item = TimeslotId> + '_ {
        self.alignable
            .values()
            .flat_map(|ann| [ann.start, ann.end])
    }
}
