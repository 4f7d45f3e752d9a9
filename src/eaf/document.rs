//! The document facade: the single mutation surface of the model.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::ids::AnnotationId;
use super::metadata::{
    AttributeBag, Constraint, ControlledVocabulary, ExternalRef, Header, LinguisticType,
};
use super::tier::{
    AlignableAnnotation, AnnotationRef, AnnotationSpan, RefAnnotation, Tier, TierAttributes,
    DEFAULT_LINGUISTIC_TYPE,
};
use super::timeline::Timeline;
use super::Millis;
use crate::error::EafError;
use crate::intervals::{self, gaps};

const DEFAULT_AUTHOR: &str = "eafkit";
const EAF_VERSION: &str = "2.7";

/// An in-memory EAF document.
///
/// Tiers, timeslots and annotation ids are private so that every change
/// goes through methods that keep them consistent: annotations always
/// point at existing timeslots, ids are never reused, and removing
/// annotations drops the timeslots nobody references any more.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    /// `ANNOTATION_DOCUMENT` attributes (`AUTHOR`, `DATE`, `VERSION`, ...).
    #[serde(default)]
    pub info: AttributeBag,

    #[serde(default)]
    pub header: Header,

    timeline: Timeline,

    tiers: BTreeMap<String, Tier>,

    /// Highest annotation id suffix issued or loaded.
    last_annotation: u64,

    next_rank: usize,

    #[serde(default)]
    pub linguistic_types: Vec<LinguisticType>,

    /// `LOCALE` elements (`LANGUAGE_CODE`, `COUNTRY_CODE`, `VARIANT`).
    #[serde(default)]
    pub locales: Vec<AttributeBag>,

    #[serde(default)]
    pub constraints: Vec<Constraint>,

    #[serde(default)]
    pub controlled_vocabularies: Vec<ControlledVocabulary>,

    #[serde(default)]
    pub lexicon_refs: Vec<AttributeBag>,

    #[serde(default)]
    pub external_refs: Vec<ExternalRef>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document with a single time-alignable
    /// `default-lt` linguistic type.
    pub fn new() -> Self {
        let mut doc = Self::empty();
        doc.info.insert("AUTHOR".into(), DEFAULT_AUTHOR.into());
        doc.info.insert(
            "DATE".into(),
            chrono::Local::now()
                .format("%Y-%m-%dT%H:%M:%S%:z")
                .to_string(),
        );
        doc.info.insert("VERSION".into(), EAF_VERSION.into());
        doc.info.insert("FORMAT".into(), EAF_VERSION.into());
        doc.header.attributes.insert("MEDIA_FILE".into(), String::new());
        doc.header
            .attributes
            .insert("TIME_UNITS".into(), "milliseconds".into());
        doc.linguistic_types
            .push(LinguisticType::new(DEFAULT_LINGUISTIC_TYPE).time_alignable(true));
        doc
    }

    /// A document with no metadata at all, as a starting point for readers.
    pub(crate) fn empty() -> Self {
        Self {
            info: AttributeBag::new(),
            header: Header::default(),
            timeline: Timeline::new(),
            tiers: BTreeMap::new(),
            last_annotation: 0,
            next_rank: 0,
            linguistic_types: Vec::new(),
            locales: Vec::new(),
            constraints: Vec::new(),
            controlled_vocabularies: Vec::new(),
            lexicon_refs: Vec::new(),
            external_refs: Vec::new(),
        }
    }

    // ---------------------------------------------------------------------
    // Tier registry
    // ---------------------------------------------------------------------

    /// Adds an empty tier. Fails if the name is taken; replacing a tier is
    /// an explicit [`remove_tier`](Self::remove_tier) followed by this.
    pub fn add_tier(&mut self, attributes: TierAttributes) -> Result<(), EafError> {
        if self.tiers.contains_key(&attributes.name) {
            return Err(EafError::DuplicateTier(attributes.name));
        }
        let rank = self.next_rank;
        self.next_rank += 1;
        debug!("adding tier '{}' at rank {}", attributes.name, rank);
        self.tiers
            .insert(attributes.name.clone(), Tier::new(attributes, rank));
        Ok(())
    }

    /// Removes a tier with all its annotations and cleans the timeline.
    pub fn remove_tier(&mut self, name: &str) -> Result<Tier, EafError> {
        let tier = self
            .tiers
            .remove(name)
            .ok_or_else(|| EafError::TierNotFound(name.to_string()))?;
        debug!(
            "removed tier '{}' with {} annotation(s)",
            name,
            tier.annotation_count()
        );
        self.clean_timeslots();
        Ok(tier)
    }

    pub fn has_tier(&self, name: &str) -> bool {
        self.tiers.contains_key(name)
    }

    pub fn tier(&self, name: &str) -> Result<&Tier, EafError> {
        self.tiers
            .get(name)
            .ok_or_else(|| EafError::TierNotFound(name.to_string()))
    }

    fn tier_mut(&mut self, name: &str) -> Result<&mut Tier, EafError> {
        self.tiers
            .get_mut(name)
            .ok_or_else(|| EafError::TierNotFound(name.to_string()))
    }

    /// All tiers in rank order.
    pub fn tiers(&self) -> Vec<&Tier> {
        let mut tiers: Vec<&Tier> = self.tiers.values().collect();
        tiers.sort_by_key(|t| t.rank);
        tiers
    }

    /// Tier names in rank order.
    pub fn tier_names(&self) -> Vec<&str> {
        self.tiers().into_iter().map(Tier::name).collect()
    }

    /// The creation rank of a tier.
    pub fn tier_index(&self, name: &str) -> Result<usize, EafError> {
        self.tier(name).map(|t| t.rank)
    }

    /// Names of the tiers whose parent is `name`, in rank order.
    pub fn child_tiers(&self, name: &str) -> Result<Vec<&str>, EafError> {
        self.tier(name)?;
        Ok(self
            .tiers()
            .into_iter()
            .filter(|t| t.attributes.parent.as_deref() == Some(name))
            .map(Tier::name)
            .collect())
    }

    pub fn linguistic_type_of(&self, name: &str) -> Result<&str, EafError> {
        Ok(&self.tier(name)?.attributes.linguistic_type)
    }

    pub fn locale_of(&self, name: &str) -> Result<Option<&str>, EafError> {
        Ok(self.tier(name)?.attributes.default_locale.as_deref())
    }

    pub fn participant_of(&self, name: &str) -> Result<Option<&str>, EafError> {
        Ok(self.tier(name)?.attributes.participant.as_deref())
    }

    /// Tiers of a linguistic type, optionally restricted to one parent.
    pub fn tiers_with_linguistic_type(
        &self,
        linguistic_type: &str,
        parent: Option<&str>,
    ) -> Vec<&str> {
        self.tiers()
            .into_iter()
            .filter(|t| t.attributes.linguistic_type == linguistic_type)
            .filter(|t| parent.is_none() || t.attributes.parent.as_deref() == parent)
            .map(Tier::name)
            .collect()
    }

    /// Removes `name` if present and adds it back empty with `attributes`.
    fn reset_tier(&mut self, attributes: TierAttributes) -> Result<(), EafError> {
        if self.tiers.contains_key(&attributes.name) {
            self.remove_tier(&attributes.name.clone())?;
        }
        self.add_tier(attributes)
    }

    /// Linguistic type given to tiers this document derives itself.
    pub fn fallback_linguistic_type(&self) -> String {
        if self.has_linguistic_type(DEFAULT_LINGUISTIC_TYPE) {
            return DEFAULT_LINGUISTIC_TYPE.to_string();
        }
        self.linguistic_types
            .first()
            .map(|lt| lt.id.clone())
            .unwrap_or_else(|| DEFAULT_LINGUISTIC_TYPE.to_string())
    }

    // ---------------------------------------------------------------------
    // Annotations
    // ---------------------------------------------------------------------

    fn next_annotation_id(&mut self) -> AnnotationId {
        self.last_annotation += 1;
        AnnotationId::new(self.last_annotation)
    }

    /// Highest annotation id suffix issued so far.
    pub fn last_annotation_id(&self) -> u64 {
        self.last_annotation
    }

    /// Adds an alignable annotation on two fresh timeslots.
    ///
    /// `start <= end` is not checked; reversed spans are stored as given
    /// and reported by validation.
    pub fn insert_annotation(
        &mut self,
        tier: &str,
        start: Millis,
        end: Millis,
        value: impl Into<String>,
    ) -> Result<AnnotationId, EafError> {
        self.insert_annotation_with_svg(tier, start, end, value, None)
    }

    /// Like [`insert_annotation`](Self::insert_annotation), with a graphic reference.
    pub fn insert_annotation_with_svg(
        &mut self,
        tier: &str,
        start: Millis,
        end: Millis,
        value: impl Into<String>,
        svg_ref: Option<String>,
    ) -> Result<AnnotationId, EafError> {
        // Check the tier first so a failure allocates nothing.
        self.tier(tier)?;

        let start_slot = self.timeline.allocate();
        let end_slot = self.timeline.allocate();
        self.timeline.set(start_slot, start)?;
        self.timeline.set(end_slot, end)?;
        let id = self.next_annotation_id();

        self.tier_mut(tier)?.alignable.insert(
            id,
            AlignableAnnotation {
                id,
                start: start_slot,
                end: end_slot,
                value: value.into(),
                svg_ref,
            },
        );
        Ok(id)
    }

    /// Adds a reference annotation to `tier`.
    ///
    /// `referenced` and `previous` are stored without checking that they
    /// exist; validation reports dangling references.
    pub fn append_reference_annotation(
        &mut self,
        tier: &str,
        value: impl Into<String>,
        referenced: AnnotationId,
        previous: Option<AnnotationId>,
    ) -> Result<AnnotationId, EafError> {
        self.tier(tier)?;
        let id = self.next_annotation_id();
        self.tier_mut(tier)?.reference.insert(
            id,
            RefAnnotation {
                id,
                annotation_ref: referenced,
                value: value.into(),
                previous,
                svg_ref: None,
            },
        );
        Ok(id)
    }

    /// Re-links the predecessor of a reference annotation.
    pub fn update_previous_annotation(
        &mut self,
        tier: &str,
        id: AnnotationId,
        previous: Option<AnnotationId>,
    ) -> Result<(), EafError> {
        let ann = self
            .tier_mut(tier)?
            .reference
            .get_mut(&id)
            .ok_or(EafError::AnnotationNotFound(id))?;
        ann.previous = previous;
        Ok(())
    }

    /// Removes every annotation of `tier` and cleans the timeline.
    pub fn remove_all_annotations(&mut self, tier: &str) -> Result<(), EafError> {
        self.tier_mut(tier)?.clear();
        self.clean_timeslots();
        Ok(())
    }

    /// Finds an annotation of either kind anywhere in the document.
    pub fn annotation(&self, id: AnnotationId) -> Result<(&Tier, AnnotationRef<'_>), EafError> {
        self.tiers
            .values()
            .find_map(|tier| tier.get(id).map(|ann| (tier, ann)))
            .ok_or(EafError::AnnotationNotFound(id))
    }

    /// Resolves the time span of any annotation, following reference
    /// chains down to an alignable annotation. The value is the one of
    /// the annotation asked for.
    pub fn resolve_span(&self, id: AnnotationId) -> Result<AnnotationSpan, EafError> {
        let (_, origin) = self.annotation(id)?;
        let value = origin.value().to_string();

        let mut seen = HashSet::from([id]);
        let mut current = origin;
        loop {
            match current {
                AnnotationRef::Alignable(ann) => {
                    let (start, end) = self.timed_bounds(ann)?;
                    return Ok(AnnotationSpan::new(start, end, value));
                }
                AnnotationRef::Reference(ann) => {
                    if !seen.insert(ann.annotation_ref) {
                        return Err(EafError::ReferenceCycle(id));
                    }
                    current = self.annotation(ann.annotation_ref)?.1;
                }
            }
        }
    }

    fn timed_bounds(&self, ann: &AlignableAnnotation) -> Result<(Millis, Millis), EafError> {
        let start = self
            .timeline
            .get(ann.start)?
            .ok_or(EafError::UnalignedTimeslot(ann.start))?;
        let end = self
            .timeline
            .get(ann.end)?
            .ok_or(EafError::UnalignedTimeslot(ann.end))?;
        Ok((start, end))
    }

    /// Resolved spans of a tier's alignable annotations, in id order.
    ///
    /// Annotations with a missing or unaligned boundary have no position
    /// on the timeline and are left out, with a warning naming how many.
    pub fn annotations_of(&self, tier: &str) -> Result<Vec<AnnotationSpan>, EafError> {
        let tier = self.tier(tier)?;
        let spans: Vec<AnnotationSpan> = tier
            .alignable
            .values()
            .filter_map(|ann| {
                let (start, end) = self.timed_bounds(ann).ok()?;
                Some(AnnotationSpan::new(start, end, ann.value.clone()))
            })
            .collect();

        let skipped = tier.alignable.len() - spans.len();
        if skipped > 0 {
            warn!(
                "tier '{}': skipped {} annotation(s) with an unaligned or missing boundary",
                tier.name(),
                skipped
            );
        }
        Ok(spans)
    }

    /// Sorted spans of `tier` containing `millis` (inclusive).
    pub fn annotations_at(
        &self,
        tier: &str,
        millis: Millis,
    ) -> Result<Vec<AnnotationSpan>, EafError> {
        let spans = self.annotations_of(tier)?;
        Ok(intervals::select_at(&spans, millis))
    }

    /// Sorted spans of `tier` overlapping `[start, end]` (inclusive).
    pub fn annotations_between(
        &self,
        tier: &str,
        start: Millis,
        end: Millis,
    ) -> Result<Vec<AnnotationSpan>, EafError> {
        let spans = self.annotations_of(tier)?;
        if end < start {
            return Err(EafError::InvalidRange { start, end });
        }
        Ok(intervals::select_between(&spans, start, end))
    }

    /// Reference annotations of a tier, in id order.
    pub fn reference_annotations_of(&self, tier: &str) -> Result<Vec<&RefAnnotation>, EafError> {
        Ok(self.tier(tier)?.reference.values().collect())
    }

    // ---------------------------------------------------------------------
    // Timeline
    // ---------------------------------------------------------------------

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// `(min, max)` over every timed slot in the document.
    pub fn full_time_interval(&self) -> Result<(Millis, Millis), EafError> {
        self.timeline.full_range()
    }

    /// Drops timeslots no alignable annotation references.
    pub fn clean_timeslots(&mut self) -> usize {
        let referenced: BTreeSet<_> = self
            .tiers
            .values()
            .flat_map(|tier| tier.timeslot_refs())
            .collect();
        let removed = self.timeline.cleanup(&referenced);
        if removed > 0 {
            debug!("cleaned {} unreferenced timeslot(s)", removed);
        }
        removed
    }

    // ---------------------------------------------------------------------
    // Extraction, shifting, copying
    // ---------------------------------------------------------------------

    /// Returns an independent copy holding only the alignable annotations
    /// that overlap `[start, end]` (inclusive).
    ///
    /// Reference annotations are copied untouched, even when the
    /// annotation they point at was dropped.
    pub fn extract(&self, start: Millis, end: Millis) -> Result<Document, EafError> {
        if end < start {
            return Err(EafError::InvalidRange { start, end });
        }
        let mut out = self.clone();
        out.retain_overlapping(start, end);
        Ok(out)
    }

    /// Keeps alignable annotations overlapping `[start, end]`. An unaligned
    /// boundary does not count against an annotation.
    fn retain_overlapping(&mut self, start: Millis, end: Millis) {
        let timeline = &self.timeline;
        for tier in self.tiers.values_mut() {
            tier.alignable.retain(|_, ann| {
                let ann_start = timeline.get(ann.start).ok().flatten();
                let ann_end = timeline.get(ann.end).ok().flatten();
                ann_end.map_or(true, |e| e >= start) && ann_start.map_or(true, |s| s <= end)
            });
        }
        self.clean_timeslots();
    }

    /// Returns a copy with every timeslot moved by `delta` milliseconds.
    ///
    /// Content that would leave the original `[0, max]` window is trimmed
    /// first: a positive delta drops annotations past `max - delta`, a
    /// negative one drops annotations before `-delta`.
    ///
    /// Trimming keeps anything that touches the window, so with a negative
    /// delta an annotation straddling `-delta` keeps its start and ends up
    /// with a negative time. Validation reports those as `NegativeTime`.
    pub fn shift_annotations(&self, delta: Millis) -> Result<Document, EafError> {
        let (_, max) = self.full_time_interval()?;
        let (keep_from, keep_to) = if delta < 0 { (-delta, max) } else { (0, max - delta) };

        let mut out = self.clone();
        if keep_to < keep_from {
            for tier in out.tiers.values_mut() {
                tier.alignable.clear();
            }
            out.clean_timeslots();
        } else {
            out.retain_overlapping(keep_from, keep_to);
        }
        out.timeline.shift_all(delta);
        out.clean_timeslots();
        debug!("shifted document by {} ms", delta);
        Ok(out)
    }

    /// Copies tier `name` into `dest`, replacing a tier of the same name.
    ///
    /// Attributes and alignable annotations are copied; reference
    /// annotations are not. Annotations with an unaligned boundary are
    /// skipped like in [`annotations_of`](Self::annotations_of), which is
    /// common on subdivision tiers. Merge and glue drop them the same way.
    pub fn copy_tier(&self, dest: &mut Document, name: &str) -> Result<(), EafError> {
        let source = self.tier(name)?;
        let spans = self.annotations_of(name)?;

        dest.reset_tier(source.attributes.clone())?;
        for span in spans {
            dest.insert_annotation(name, span.start, span.end, span.value)?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Derived tiers
    // ---------------------------------------------------------------------

    /// Writes `spans` into a fresh tier called `name`, replacing any
    /// existing tier of that name.
    fn materialize(
        &mut self,
        name: &str,
        linguistic_type: String,
        spans: Vec<AnnotationSpan>,
    ) -> Result<(), EafError> {
        self.reset_tier(TierAttributes::new(name, linguistic_type))?;
        debug!("materializing {} annotation(s) into '{}'", spans.len(), name);
        for span in spans {
            self.insert_annotation(name, span.start, span.end, span.value)?;
        }
        Ok(())
    }

    /// Merges the coverage of several tiers into one new tier and returns
    /// its name (`<names>_Merged` by default).
    pub fn merge_tiers<S: AsRef<str>>(
        &mut self,
        names: &[S],
        new_name: Option<&str>,
        gap_threshold: Millis,
    ) -> Result<String, EafError> {
        let mut spans = Vec::new();
        for name in names {
            spans.extend(self.annotations_of(name.as_ref())?);
        }
        let merged = intervals::merge_spans(&spans, gap_threshold);

        let new_name = new_name.map(str::to_string).unwrap_or_else(|| {
            let joined: Vec<&str> = names.iter().map(AsRef::as_ref).collect();
            format!("{}_Merged", joined.join("_"))
        });
        let lt = self.fallback_linguistic_type();
        self.materialize(&new_name, lt, merged)?;
        Ok(new_name)
    }

    /// Glues near-adjacent annotations of `tier` into a new tier and
    /// returns its name (`<tier>_glued` by default).
    pub fn glue_annotations(
        &mut self,
        tier: &str,
        output: Option<&str>,
        threshold: Millis,
        excluded: &BTreeSet<String>,
    ) -> Result<String, EafError> {
        let spans = self.annotations_of(tier)?;
        let glued = intervals::glue_spans(&spans, threshold, excluded);

        let output = output
            .map(str::to_string)
            .unwrap_or_else(|| format!("{tier}_glued"));
        let lt = self.fallback_linguistic_type();
        self.materialize(&output, lt, glued)?;
        Ok(output)
    }

    /// Classifies gaps, pauses and overlaps between two tiers.
    pub fn gaps_and_overlaps(
        &self,
        first: &str,
        second: &str,
        max_len: Option<Millis>,
    ) -> Result<GapsAndOverlaps, EafError> {
        let first_spans = self.annotations_of(first)?;
        let second_spans = self.annotations_of(second)?;

        let runs = gaps::activity_runs(&first_spans, &second_spans);
        let classified = gaps::filter_by_length(gaps::classify_runs(&runs), max_len);

        Ok(GapsAndOverlaps {
            first_tier: first.to_string(),
            second_tier: second.to_string(),
            runs,
            intervals: classified,
        })
    }

    /// Runs [`gaps_and_overlaps`](Self::gaps_and_overlaps) and stores the
    /// labelled intervals in a new tier (`<first>_<second>_go` by default).
    pub fn create_gaps_and_overlaps_tier(
        &mut self,
        first: &str,
        second: &str,
        name: Option<&str>,
        max_len: Option<Millis>,
        linguistic_type: Option<&str>,
    ) -> Result<GapsAndOverlaps, EafError> {
        let result = self.gaps_and_overlaps(first, second, max_len)?;

        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| format!("{first}_{second}_go"));
        let lt = linguistic_type
            .map(str::to_string)
            .unwrap_or_else(|| self.fallback_linguistic_type());
        self.materialize(&name, lt, result.labelled_spans())?;
        Ok(result)
    }

    // ---------------------------------------------------------------------
    // Linguistic types and controlled vocabularies
    // ---------------------------------------------------------------------

    /// Adds a linguistic type, replacing one with the same id in place.
    pub fn add_linguistic_type(&mut self, linguistic_type: LinguisticType) {
        match self
            .linguistic_types
            .iter_mut()
            .find(|lt| lt.id == linguistic_type.id)
        {
            Some(existing) => *existing = linguistic_type,
            None => self.linguistic_types.push(linguistic_type),
        }
    }

    pub fn remove_linguistic_type(&mut self, id: &str) -> Result<LinguisticType, EafError> {
        let idx = self
            .linguistic_types
            .iter()
            .position(|lt| lt.id == id)
            .ok_or_else(|| EafError::LinguisticTypeNotFound(id.to_string()))?;
        Ok(self.linguistic_types.remove(idx))
    }

    pub fn linguistic_type(&self, id: &str) -> Result<&LinguisticType, EafError> {
        self.linguistic_types
            .iter()
            .find(|lt| lt.id == id)
            .ok_or_else(|| EafError::LinguisticTypeNotFound(id.to_string()))
    }

    pub fn has_linguistic_type(&self, id: &str) -> bool {
        self.linguistic_types.iter().any(|lt| lt.id == id)
    }

    pub fn constraint_for(&self, id: &str) -> Result<Option<&str>, EafError> {
        Ok(self.linguistic_type(id)?.constraints.as_deref())
    }

    pub fn is_time_alignable(&self, id: &str) -> Result<bool, EafError> {
        Ok(self.linguistic_type(id)?.time_alignable)
    }

    /// Adds a controlled vocabulary, replacing one with the same id in place.
    pub fn add_controlled_vocabulary(&mut self, cv: ControlledVocabulary) {
        match self
            .controlled_vocabularies
            .iter_mut()
            .find(|existing| existing.id == cv.id)
        {
            Some(existing) => *existing = cv,
            None => self.controlled_vocabularies.push(cv),
        }
    }

    pub fn remove_controlled_vocabulary(
        &mut self,
        id: &str,
    ) -> Result<ControlledVocabulary, EafError> {
        let idx = self
            .controlled_vocabularies
            .iter()
            .position(|cv| cv.id == id)
            .ok_or_else(|| EafError::ControlledVocabularyNotFound(id.to_string()))?;
        Ok(self.controlled_vocabularies.remove(idx))
    }

    pub fn controlled_vocabulary(&self, id: &str) -> Result<&ControlledVocabulary, EafError> {
        self.controlled_vocabularies
            .iter()
            .find(|cv| cv.id == id)
            .ok_or_else(|| EafError::ControlledVocabularyNotFound(id.to_string()))
    }

    /// Points a linguistic type at a controlled vocabulary. The vocabulary
    /// itself may be added later.
    pub fn attach_controlled_vocabulary(
        &mut self,
        linguistic_type: &str,
        cv_id: &str,
    ) -> Result<(), EafError> {
        let lt = self
            .linguistic_types
            .iter_mut()
            .find(|lt| lt.id == linguistic_type)
            .ok_or_else(|| EafError::LinguisticTypeNotFound(linguistic_type.to_string()))?;
        lt.controlled_vocabulary = Some(cv_id.to_string());
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------

    pub(crate) fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    /// Registers a fully-built tier read from a file. Its rank is the
    /// next free one and the annotation counter is advanced past its ids.
    pub(crate) fn push_loaded_tier(&mut self, mut tier: Tier) -> Result<(), EafError> {
        if self.tiers.contains_key(tier.name()) {
            return Err(EafError::DuplicateTier(tier.name().to_string()));
        }
        let max_id = tier
            .alignable
            .keys()
            .chain(tier.reference.keys())
            .map(AnnotationId::as_u64)
            .max()
            .unwrap_or(0);
        self.last_annotation = self.last_annotation.max(max_id);

        tier.rank = self.next_rank;
        self.next_rank += 1;
        self.tiers.insert(tier.name().to_string(), tier);
        Ok(())
    }

    /// Re-registers everything of a deserialized snapshot so the stored
    /// counters and ranks are not taken on trust.
    ///
    /// Tiers are pushed again in their stored rank order, which renumbers
    /// ranks and moves the annotation counter past every id present. A
    /// tier filed under a key other than its own name is rejected.
    pub(crate) fn reindex_loaded(mut self) -> Result<Self, EafError> {
        let mut tiers: Vec<(String, Tier)> =
            std::mem::take(&mut self.tiers).into_iter().collect();
        tiers.sort_by_key(|(_, tier)| tier.rank);

        self.next_rank = 0;
        for (key, tier) in tiers {
            if key != tier.name() {
                return Err(EafError::TierKeyMismatch {
                    key,
                    name: tier.name().to_string(),
                });
            }
            self.push_loaded_tier(tier)?;
        }
        self.timeline.resync_counter();
        Ok(self)
    }
}

/// Result of [`Document::gaps_and_overlaps`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GapsAndOverlaps {
    pub first_tier: String,
    pub second_tier: String,

    /// The combined timeline as maximal activity runs (never filtered).
    pub runs: Vec<gaps::ActivityRun>,

    /// Classified silent and simultaneous runs, after length filtering.
    pub intervals: Vec<gaps::ClassifiedInterval>,
}

impl GapsAndOverlaps {
    /// Intervals as spans valued with their conventional labels.
    pub fn labelled_spans(&self) -> Vec<AnnotationSpan> {
        self.intervals
            .iter()
            .map(|i| {
                AnnotationSpan::new(
                    i.start,
                    i.end,
                    i.kind.label(&self.first_tier, &self.second_tier),
                )
            })
            .collect()
    }
}
