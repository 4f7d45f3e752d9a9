//! Newtype IDs for timeslots and annotations.
//!
//! EAF files spell these as `ts<N>` and `a<N>`. The numeric suffix is what
//! orders them and what the id counters are rebuilt from on load, so the
//! newtypes store only the number and add the prefix when displayed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a point on the shared timeline.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeslotId(pub u64);

impl TimeslotId {
    const PREFIX: &'static str = "ts";

    /// Creates a new TimeslotId.
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric suffix.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Parses the `ts<N>` spelling used in EAF files.
    pub fn from_xml_id(raw: &str) -> Option<Self> {
        parse_suffix(raw, Self::PREFIX).map(Self)
    }
}

impl fmt::Debug for TimeslotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeslotId({})", self.0)
    }
}

impl fmt::Display for TimeslotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

/// Identifier of an annotation, unique across every tier of a document.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub u64);

impl AnnotationId {
    const PREFIX: &'static str = "a";

    /// Creates a new AnnotationId.
    #[inline]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric suffix.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Parses the `a<N>` spelling used in EAF files.
    pub fn from_xml_id(raw: &str) -> Option<Self> {
        parse_suffix(raw, Self::PREFIX).map(Self)
    }
}

impl fmt::Debug for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnnotationId({})", self.0)
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

impl From<u64> for TimeslotId {
    fn from(id: u64) -> Self {
        TimeslotId::new(id)
    }
}

impl From<u64> for AnnotationId {
    fn from(id: u64) -> Self {
        AnnotationId::new(id)
    }
}

fn parse_suffix(raw: &str, prefix: &str) -> Option<u64> {
    let digits = raw.trim().strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
