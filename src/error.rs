use std::path::PathBuf;
use thiserror::Error;

use crate::eaf::{AnnotationId, Millis, TimeslotId};
use crate::validation::ValidationReport;

/// The main error type for eafkit operations.
#[derive(Debug, Error)]
pub enum EafError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tier not found: '{0}'")]
    TierNotFound(String),

    #[error("Annotation not found: {0}")]
    AnnotationNotFound(AnnotationId),

    #[error("Timeslot not found: {0}")]
    TimeslotNotFound(TimeslotId),

    #[error("Tier already exists: '{0}'")]
    DuplicateTier(String),

    #[error("Tier '{name}' is stored under the key '{key}'")]
    TierKeyMismatch { key: String, name: String },

    #[error("Timeslot {0} has no time value")]
    UnalignedTimeslot(TimeslotId),

    #[error("Timeline has no timed slots")]
    EmptyTimeline,

    #[error("Invalid range: end {end} is before start {start}")]
    InvalidRange { start: Millis, end: Millis },

    #[error("Reference chain starting at {0} loops back on itself")]
    ReferenceCycle(AnnotationId),

    #[error("Linguistic type not found: '{0}'")]
    LinguisticTypeNotFound(String),

    #[error("Controlled vocabulary not found: '{0}'")]
    ControlledVocabularyNotFound(String),

    #[error("Failed to parse EAF XML from {path}: {message}")]
    EafXmlParse { path: PathBuf, message: String },

    #[error("Failed to parse document JSON from {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write document JSON to {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },
}
