//! Declarative document metadata: linguistic types, controlled
//! vocabularies, locales and the header block.
//!
//! None of this is time-dependent. Several EAF elements carry open-ended
//! attribute sets, so those are stored as attribute bags with typed
//! accessors for the keys the toolkit actually reads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An ordered attribute map as found on an XML element.
pub type AttributeBag = BTreeMap<String, String>;

/// A linguistic type declaration referenced by tiers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinguisticType {
    pub id: String,
    pub time_alignable: bool,
    pub graphic_references: bool,

    /// Constraint stereotype name, e.g. `Symbolic_Association`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controlled_vocabulary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext_ref: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: AttributeBag,
}

impl LinguisticType {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            time_alignable: false,
            graphic_references: false,
            constraints: None,
            controlled_vocabulary: None,
            ext_ref: None,
            extra: AttributeBag::new(),
        }
    }

    pub fn time_alignable(mut self, yes: bool) -> Self {
        self.time_alignable = yes;
        self
    }

    pub fn graphic_references(mut self, yes: bool) -> Self {
        self.graphic_references = yes;
        self
    }

    pub fn with_constraints(mut self, stereotype: impl Into<String>) -> Self {
        self.constraints = Some(stereotype.into());
        self
    }

    pub fn with_controlled_vocabulary(mut self, cv_id: impl Into<String>) -> Self {
        self.controlled_vocabulary = Some(cv_id.into());
        self
    }

    pub fn with_ext_ref(mut self, ext_ref: impl Into<String>) -> Self {
        self.ext_ref = Some(ext_ref.into());
        self
    }
}

/// A controlled vocabulary: allowed values with their descriptions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlledVocabulary {
    pub id: String,

    #[serde(default)]
    pub description: String,

    /// Entry value -> entry description.
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
}

impl ControlledVocabulary {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn with_entry(mut self, value: impl Into<String>, description: impl Into<String>) -> Self {
        self.entries.insert(value.into(), description.into());
        self
    }

    pub fn contains(&self, value: &str) -> bool {
        self.entries.contains_key(value)
    }
}

/// A `CONSTRAINT` declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub stereotype: String,
    pub description: String,
}

/// An `EXTERNAL_REF` declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRef {
    pub id: String,
    pub ref_type: String,
    pub value: String,
}

/// A header `PROPERTY`: optional name attribute and a text value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    #[serde(default)]
    pub attributes: AttributeBag,
    #[serde(default)]
    pub value: String,
}

/// A media or linked-file descriptor from the header.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(default)]
    pub attributes: AttributeBag,
}

impl Descriptor {
    pub fn new(attributes: AttributeBag) -> Self {
        Self { attributes }
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.attributes.get("MIME_TYPE").map(String::as_str)
    }

    /// `MEDIA_URL` for media descriptors, `LINK_URL` for linked files.
    pub fn url(&self) -> Option<&str> {
        self.attributes
            .get("MEDIA_URL")
            .or_else(|| self.attributes.get("LINK_URL"))
            .map(String::as_str)
    }

    fn mime_contains(&self, needle: &str) -> bool {
        self.mime_type().is_some_and(|mime| mime.contains(needle))
    }
}

/// The `HEADER` element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// `MEDIA_FILE`, `TIME_UNITS`, ...
    #[serde(default)]
    pub attributes: AttributeBag,

    #[serde(default)]
    pub media_descriptors: Vec<Descriptor>,

    #[serde(default)]
    pub linked_file_descriptors: Vec<Descriptor>,

    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Header {
    /// Media descriptors whose MIME type mentions video.
    pub fn video(&self) -> Vec<&Descriptor> {
        self.media_descriptors
            .iter()
            .filter(|d| d.mime_contains("video"))
            .collect()
    }

    /// Media descriptors whose MIME type mentions audio.
    pub fn audio(&self) -> Vec<&Descriptor> {
        self.media_descriptors
            .iter()
            .filter(|d| d.mime_contains("audio"))
            .collect()
    }

    /// Linked plain-text files, which ELAN uses for time series.
    pub fn time_series(&self) -> Vec<&Descriptor> {
        self.linked_file_descriptors
            .iter()
            .filter(|d| d.mime_contains("text/plain"))
            .collect()
    }
}
