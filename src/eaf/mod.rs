//! The EAF document model.
//!
//! An EAF document is a set of named tiers whose annotations point into one
//! shared timeline. Alignable annotations reference two timeslots directly;
//! reference annotations borrow the span of another annotation. The
//! [`Document`] facade owns all of it and is the only way to mutate it, so
//! that timeslots and ids stay consistent.
//!
//! # Design Principles
//!
//! 1. **Typed ids**: timeslot and annotation ids are distinct newtypes and
//!    are issued by counters held in the document, never reused.
//!
//! 2. **Permissive construction**: the model can represent data ELAN would
//!    reject (reversed spans, references to missing annotations), so that
//!    files load and [`validation`](crate::validation) can report issues
//!    instead of the parser refusing them.
//!
//! 3. **Explicit absence**: lookups by tier name fail with
//!    [`EafError::TierNotFound`](crate::EafError::TierNotFound) rather than
//!    returning an empty result.
//!
//! # Example
//!
//! ```
//! use eafkit::eaf::{Document, TierAttributes, DEFAULT_LINGUISTIC_TYPE};
//!
//! let mut doc = Document::new();
//! doc.add_tier(TierAttributes::new("speaker1", DEFAULT_LINGUISTIC_TYPE)).unwrap();
//! doc.insert_annotation("speaker1", 0, 1200, "hello there").unwrap();
//!
//! let spans = doc.annotations_of("speaker1").unwrap();
//! assert_eq!(spans[0].value, "hello there");
//! ```

mod document;
mod ids;
pub mod io_eaf;
pub mod io_json;
pub mod io_textgrid;
mod metadata;
mod tier;
mod timeline;

/// Milliseconds on the document timeline.
pub type Millis = i64;

pub use document::{Document, GapsAndOverlaps};
pub use ids::{AnnotationId, TimeslotId};
pub use metadata::{
    AttributeBag, Constraint, ControlledVocabulary, Descriptor, ExternalRef, Header,
    LinguisticType, Property,
};
pub use tier::{
    AlignableAnnotation, AnnotationRef, AnnotationSpan, RefAnnotation, Tier, TierAttributes,
    DEFAULT_LINGUISTIC_TYPE,
};
pub use timeline::Timeline;
