//! JSON snapshots of a whole document.
//!
//! The snapshot is a direct serde rendering of [`Document`], id counters
//! included. Reading one back re-registers every tier and slot, so new ids
//! continue past both the stored counters and the highest id present.
//! Useful for:
//! - Debugging: seeing exactly what a parsed EAF file turned into
//! - Exchanging documents between tools without going through XML

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::Error as _;

use super::Document;
use crate::error::EafError;

/// Reads a document snapshot from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_document_json(path: &Path) -> Result<Document, EafError> {
    let file = File::open(path).map_err(EafError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader)
        .and_then(reindex)
        .map_err(|source| EafError::JsonParse {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes a document snapshot to a JSON file.
pub fn write_document_json(path: &Path, doc: &Document) -> Result<(), EafError> {
    let file = File::create(path).map_err(EafError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, doc).map_err(|source| EafError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a document snapshot from a JSON string.
pub fn from_json_str(json: &str) -> Result<Document, serde_json::Error> {
    serde_json::from_str(json).and_then(reindex)
}

fn reindex(doc: Document) -> Result<Document, serde_json::Error> {
    doc.reindex_loaded()
        .map_err(|err| serde_json::Error::custom(err.to_string()))
}

/// Writes a document snapshot to a JSON string.
pub fn to_json_string(doc: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(doc)
}
