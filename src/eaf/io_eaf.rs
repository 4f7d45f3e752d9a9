//! EAF XML reader and writer.
//!
//! Reads `ANNOTATION_DOCUMENT` files as written by ELAN (format 2.x) and
//! writes them back in a stable layout:
//! - header, time order, tiers (rank order), linguistic types, locales,
//!   constraints, controlled vocabularies, external refs, lexicon refs
//! - attributes sorted by name, unset optional attributes omitted
//! - time slots sorted by numeric suffix
//!
//! Unknown top-level elements are skipped with a warning.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use roxmltree::Node;

use super::metadata::{
    AttributeBag, Constraint, ControlledVocabulary, Descriptor, ExternalRef, LinguisticType,
    Property,
};
use super::tier::{AlignableAnnotation, RefAnnotation, Tier, TierAttributes};
use super::{AnnotationId, Document, Millis, TimeslotId};
use crate::error::EafError;

const ROOT_TAG: &str = "ANNOTATION_DOCUMENT";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str = "http://www.mpi.nl/tools/elan/EAFv2.7.xsd";
const INDENT: &str = "    ";

/// Read an EAF file.
pub fn read_eaf(path: &Path) -> Result<Document, EafError> {
    let xml = fs::read_to_string(path).map_err(EafError::Io)?;
    parse_eaf_str(&xml, path)
}

/// Write a document as EAF XML, creating parent directories as needed.
pub fn write_eaf(path: &Path, doc: &Document) -> Result<(), EafError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(EafError::Io)?;
    }
    fs::write(path, build_eaf_xml(doc)).map_err(EafError::Io)
}

/// Parse EAF XML from a string.
pub fn from_eaf_str(xml: &str) -> Result<Document, EafError> {
    parse_eaf_str(xml, Path::new("<string>"))
}

/// Parse EAF XML from bytes (must be valid UTF-8).
pub fn from_eaf_slice(bytes: &[u8]) -> Result<Document, EafError> {
    let xml = std::str::from_utf8(bytes).map_err(|source| EafError::EafXmlParse {
        path: PathBuf::from("<bytes>"),
        message: format!("input is not valid UTF-8: {source}"),
    })?;
    parse_eaf_str(xml, Path::new("<bytes>"))
}

/// Serialize a document to an EAF XML string.
pub fn to_eaf_string(doc: &Document) -> String {
    build_eaf_xml(doc)
}

fn parse_error(path: &Path, message: impl Into<String>) -> EafError {
    EafError::EafXmlParse {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn parse_eaf_str(xml: &str, path: &Path) -> Result<Document, EafError> {
    let tree = roxmltree::Document::parse(xml).map_err(|e| parse_error(path, e.to_string()))?;

    let root = tree.root_element();
    if root.tag_name().name() != ROOT_TAG {
        return Err(parse_error(
            path,
            format!("missing <{ROOT_TAG}> root element"),
        ));
    }

    let mut doc = Document::empty();
    // Schema location and other namespaced attributes are regenerated on write.
    doc.info = plain_attributes(root);

    let mut seen_annotations: HashSet<AnnotationId> = HashSet::new();

    for node in root.children().filter(Node::is_element) {
        match node.tag_name().name() {
            "HEADER" => parse_header(node, &mut doc, path)?,
            "TIME_ORDER" => parse_time_order(node, &mut doc, path)?,
            "TIER" => {
                let tier = parse_tier(node, path, &mut seen_annotations)?;
                doc.push_loaded_tier(tier).map_err(|err| match err {
                    EafError::DuplicateTier(name) => {
                        parse_error(path, format!("duplicate tier id '{name}'"))
                    }
                    other => other,
                })?;
            }
            "LINGUISTIC_TYPE" => {
                let lt = parse_linguistic_type(node, path)?;
                doc.linguistic_types.push(lt);
            }
            "LOCALE" => doc.locales.push(plain_attributes(node)),
            "CONSTRAINT" => doc.constraints.push(Constraint {
                stereotype: required_attr(node, "STEREOTYPE", path, "<CONSTRAINT>")?.to_string(),
                description: node.attribute("DESCRIPTION").unwrap_or("").to_string(),
            }),
            "CONTROLLED_VOCABULARY" => {
                let cv = parse_controlled_vocabulary(node, path)?;
                doc.controlled_vocabularies.push(cv);
            }
            "LEXICON_REF" => doc.lexicon_refs.push(plain_attributes(node)),
            "EXTERNAL_REF" => doc.external_refs.push(ExternalRef {
                id: required_attr(node, "EXT_REF_ID", path, "<EXTERNAL_REF>")?.to_string(),
                ref_type: required_attr(node, "TYPE", path, "<EXTERNAL_REF>")?.to_string(),
                value: required_attr(node, "VALUE", path, "<EXTERNAL_REF>")?.to_string(),
            }),
            other => warn!("skipping unsupported element <{other}> in {}", path.display()),
        }
    }

    debug!(
        "loaded {} tier(s) and {} timeslot(s) from {}",
        doc.tier_names().len(),
        doc.timeline().len(),
        path.display()
    );
    Ok(doc)
}

fn parse_header(node: Node<'_, '_>, doc: &mut Document, path: &Path) -> Result<(), EafError> {
    doc.header.attributes = plain_attributes(node);
    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "MEDIA_DESCRIPTOR" => doc
                .header
                .media_descriptors
                .push(Descriptor::new(plain_attributes(child))),
            "LINKED_FILE_DESCRIPTOR" => doc
                .header
                .linked_file_descriptors
                .push(Descriptor::new(plain_attributes(child))),
            "PROPERTY" => doc.header.properties.push(Property {
                attributes: plain_attributes(child),
                value: child.text().unwrap_or("").to_string(),
            }),
            other => warn!(
                "skipping unsupported header element <{other}> in {}",
                path.display()
            ),
        }
    }
    Ok(())
}

fn parse_time_order(node: Node<'_, '_>, doc: &mut Document, path: &Path) -> Result<(), EafError> {
    for slot in node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "TIME_SLOT")
    {
        let raw_id = required_attr(slot, "TIME_SLOT_ID", path, "<TIME_SLOT>")?;
        let id = parse_timeslot_ref(raw_id, path, "<TIME_SLOT>")?;
        if doc.timeline().contains(id) {
            return Err(parse_error(path, format!("duplicate time slot id '{raw_id}'")));
        }

        let value = slot
            .attribute("TIME_VALUE")
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|raw| {
                raw.parse::<Millis>().map_err(|_| {
                    parse_error(
                        path,
                        format!(
                            "invalid TIME_VALUE '{raw}' on '{raw_id}'; \
                             expected integer milliseconds"
                        ),
                    )
                })
            })
            .transpose()?;

        doc.timeline_mut().insert_loaded(id, value);
    }
    Ok(())
}

fn parse_tier(
    node: Node<'_, '_>,
    path: &Path,
    seen_annotations: &mut HashSet<AnnotationId>,
) -> Result<Tier, EafError> {
    let mut extra = plain_attributes(node);
    let name = extra
        .remove("TIER_ID")
        .ok_or_else(|| parse_error(path, "missing 'TIER_ID' attribute in <TIER>"))?;
    let linguistic_type = extra.remove("LINGUISTIC_TYPE_REF").ok_or_else(|| {
        parse_error(
            path,
            format!("missing 'LINGUISTIC_TYPE_REF' attribute in tier '{name}'"),
        )
    })?;

    let attributes = TierAttributes {
        parent: extra.remove("PARENT_REF"),
        participant: extra.remove("PARTICIPANT"),
        default_locale: extra.remove("DEFAULT_LOCALE"),
        annotator: extra.remove("ANNOTATOR"),
        extra,
        ..TierAttributes::new(name.clone(), linguistic_type)
    };
    // Rank is reassigned when the tier is registered.
    let mut tier = Tier::new(attributes, 0);

    for inner in node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "ANNOTATION")
        .flat_map(|n| n.children().filter(Node::is_element))
    {
        let raw_id = required_attr(inner, "ANNOTATION_ID", path, "annotation")?;
        let id = parse_annotation_ref(raw_id, path, "ANNOTATION_ID")?;
        if !seen_annotations.insert(id) {
            return Err(parse_error(
                path,
                format!("duplicate annotation id '{raw_id}' in tier '{name}'"),
            ));
        }
        let svg_ref = inner.attribute("SVG_REF").map(ToOwned::to_owned);
        let value = annotation_value(inner);

        match inner.tag_name().name() {
            "ALIGNABLE_ANNOTATION" => {
                let start = parse_timeslot_ref(
                    required_attr(inner, "TIME_SLOT_REF1", path, "<ALIGNABLE_ANNOTATION>")?,
                    path,
                    "TIME_SLOT_REF1",
                )?;
                let end = parse_timeslot_ref(
                    required_attr(inner, "TIME_SLOT_REF2", path, "<ALIGNABLE_ANNOTATION>")?,
                    path,
                    "TIME_SLOT_REF2",
                )?;
                tier.alignable.insert(
                    id,
                    AlignableAnnotation {
                        id,
                        start,
                        end,
                        value,
                        svg_ref,
                    },
                );
            }
            "REF_ANNOTATION" => {
                let annotation_ref = parse_annotation_ref(
                    required_attr(inner, "ANNOTATION_REF", path, "<REF_ANNOTATION>")?,
                    path,
                    "ANNOTATION_REF",
                )?;
                let previous = inner
                    .attribute("PREVIOUS_ANNOTATION")
                    .map(|raw| parse_annotation_ref(raw, path, "PREVIOUS_ANNOTATION"))
                    .transpose()?;
                tier.reference.insert(
                    id,
                    RefAnnotation {
                        id,
                        annotation_ref,
                        value,
                        previous,
                        svg_ref,
                    },
                );
            }
            other => {
                return Err(parse_error(
                    path,
                    format!("tier '{name}' contains unsupported annotation type <{other}>"),
                ))
            }
        }
    }

    Ok(tier)
}

/// Fuzz-only entrypoint for parsing a lone `<TIER>` element.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_tier(xml: &str) -> Result<(), EafError> {
    let path = Path::new("<fuzz>");
    let tree = roxmltree::Document::parse(xml).map_err(|e| parse_error(path, e.to_string()))?;
    let _ = parse_tier(tree.root_element(), path, &mut HashSet::new())?;
    Ok(())
}

fn parse_linguistic_type(node: Node<'_, '_>, path: &Path) -> Result<LinguisticType, EafError> {
    let mut extra = plain_attributes(node);
    let id = extra
        .remove("LINGUISTIC_TYPE_ID")
        .ok_or_else(|| {
            parse_error(
                path,
                "missing 'LINGUISTIC_TYPE_ID' attribute in <LINGUISTIC_TYPE>",
            )
        })?;

    let time_alignable = parse_bool_attr(extra.remove("TIME_ALIGNABLE"), &id, path)?;
    let graphic_references = parse_bool_attr(extra.remove("GRAPHIC_REFERENCES"), &id, path)?;

    Ok(LinguisticType {
        time_alignable,
        graphic_references,
        constraints: extra.remove("CONSTRAINTS"),
        controlled_vocabulary: extra.remove("CONTROLLED_VOCABULARY_REF"),
        ext_ref: extra.remove("EXT_REF"),
        extra,
        ..LinguisticType::new(id)
    })
}

fn parse_controlled_vocabulary(
    node: Node<'_, '_>,
    path: &Path,
) -> Result<ControlledVocabulary, EafError> {
    let id = required_attr(node, "CV_ID", path, "<CONTROLLED_VOCABULARY>")?;
    let mut cv = ControlledVocabulary::new(id, node.attribute("DESCRIPTION").unwrap_or(""));

    for entry in node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "CV_ENTRY")
    {
        let value = entry.text().unwrap_or("");
        cv.entries.insert(
            value.to_string(),
            entry.attribute("DESCRIPTION").unwrap_or("").to_string(),
        );
    }
    Ok(cv)
}

/// Attributes without a namespace prefix.
fn plain_attributes(node: Node<'_, '_>) -> AttributeBag {
    node.attributes()
        .filter(|attr| attr.namespace().is_none())
        .map(|attr| (attr.name().to_string(), attr.value().to_string()))
        .collect()
}

fn annotation_value(node: Node<'_, '_>) -> String {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == "ANNOTATION_VALUE")
        .and_then(|child| child.text())
        .unwrap_or("")
        .to_string()
}

fn required_attr<'a>(
    node: Node<'a, '_>,
    attr: &str,
    path: &Path,
    context: &str,
) -> Result<&'a str, EafError> {
    node.attribute(attr)
        .ok_or_else(|| parse_error(path, format!("missing '{attr}' attribute in {context}")))
}

fn parse_timeslot_ref(raw: &str, path: &Path, context: &str) -> Result<TimeslotId, EafError> {
    TimeslotId::from_xml_id(raw.trim()).ok_or_else(|| {
        parse_error(
            path,
            format!("invalid time slot id '{raw}' in {context}; expected 'ts<N>'"),
        )
    })
}

fn parse_annotation_ref(raw: &str, path: &Path, context: &str) -> Result<AnnotationId, EafError> {
    AnnotationId::from_xml_id(raw.trim()).ok_or_else(|| {
        parse_error(
            path,
            format!("invalid annotation id '{raw}' in {context}; expected 'a<N>'"),
        )
    })
}

fn parse_bool_attr(raw: Option<String>, owner: &str, path: &Path) -> Result<bool, EafError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
        Some(v) => Err(parse_error(
            path,
            format!(
                "linguistic type '{owner}' has invalid boolean '{v}'; \
                 expected 'true' or 'false'"
            ),
        )),
    }
}

// -------------------------------------------------------------------------
// Writing
// -------------------------------------------------------------------------

fn build_eaf_xml(doc: &Document) -> String {
    let mut xml = String::new();
    writeln!(xml, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>").expect("write to string");
    writeln!(
        xml,
        "<{ROOT_TAG} xmlns:xsi=\"{XSI_NAMESPACE}\" \
         xsi:noNamespaceSchemaLocation=\"{SCHEMA_LOCATION}\"{}>",
        format_attrs(&doc.info)
    )
    .expect("write to string");

    write_header(&mut xml, doc);
    write_time_order(&mut xml, doc);
    for tier in doc.tiers() {
        write_tier(&mut xml, tier);
    }

    for lt in &doc.linguistic_types {
        let mut attrs = lt.extra.clone();
        attrs.insert("LINGUISTIC_TYPE_ID".into(), lt.id.clone());
        attrs.insert("TIME_ALIGNABLE".into(), lt.time_alignable.to_string());
        attrs.insert("GRAPHIC_REFERENCES".into(), lt.graphic_references.to_string());
        insert_opt(&mut attrs, "CONSTRAINTS", lt.constraints.as_deref());
        insert_opt(&mut attrs, "CONTROLLED_VOCABULARY_REF", lt.controlled_vocabulary.as_deref());
        insert_opt(&mut attrs, "EXT_REF", lt.ext_ref.as_deref());
        empty_element(&mut xml, 1, "LINGUISTIC_TYPE", &attrs);
    }

    for locale in &doc.locales {
        empty_element(&mut xml, 1, "LOCALE", locale);
    }

    for constraint in &doc.constraints {
        let attrs = AttributeBag::from([
            ("DESCRIPTION".to_string(), constraint.description.clone()),
            ("STEREOTYPE".to_string(), constraint.stereotype.clone()),
        ]);
        empty_element(&mut xml, 1, "CONSTRAINT", &attrs);
    }

    for cv in &doc.controlled_vocabularies {
        let attrs = AttributeBag::from([
            ("CV_ID".to_string(), cv.id.clone()),
            ("DESCRIPTION".to_string(), cv.description.clone()),
        ]);
        writeln!(xml, "{INDENT}<CONTROLLED_VOCABULARY{}>", format_attrs(&attrs))
            .expect("write to string");
        for (value, description) in &cv.entries {
            writeln!(
                xml,
                "{INDENT}{INDENT}<CV_ENTRY DESCRIPTION=\"{}\">{}</CV_ENTRY>",
                xml_escape(description),
                xml_escape(value)
            )
            .expect("write to string");
        }
        writeln!(xml, "{INDENT}</CONTROLLED_VOCABULARY>").expect("write to string");
    }

    for ext in &doc.external_refs {
        let attrs = AttributeBag::from([
            ("EXT_REF_ID".to_string(), ext.id.clone()),
            ("TYPE".to_string(), ext.ref_type.clone()),
            ("VALUE".to_string(), ext.value.clone()),
        ]);
        empty_element(&mut xml, 1, "EXTERNAL_REF", &attrs);
    }

    for lexicon in &doc.lexicon_refs {
        empty_element(&mut xml, 1, "LEXICON_REF", lexicon);
    }

    writeln!(xml, "</{ROOT_TAG}>").expect("write to string");
    xml
}

fn write_header(xml: &mut String, doc: &Document) {
    let header = &doc.header;
    writeln!(xml, "{INDENT}<HEADER{}>", format_attrs(&header.attributes)).expect("write to string");
    for media in &header.media_descriptors {
        empty_element(xml, 2, "MEDIA_DESCRIPTOR", &media.attributes);
    }
    for linked in &header.linked_file_descriptors {
        empty_element(xml, 2, "LINKED_FILE_DESCRIPTOR", &linked.attributes);
    }
    for property in &header.properties {
        writeln!(
            xml,
            "{INDENT}{INDENT}<PROPERTY{}>{}</PROPERTY>",
            format_attrs(&property.attributes),
            xml_escape(&property.value)
        )
        .expect("write to string");
    }
    writeln!(xml, "{INDENT}</HEADER>").expect("write to string");
}

fn write_time_order(xml: &mut String, doc: &Document) {
    writeln!(xml, "{INDENT}<TIME_ORDER>").expect("write to string");
    for (id, value) in doc.timeline().iter() {
        let value = value
            .map(|millis| format!(" TIME_VALUE=\"{millis}\""))
            .unwrap_or_default();
        writeln!(
            xml,
            "{INDENT}{INDENT}<TIME_SLOT TIME_SLOT_ID=\"{id}\"{value}/>"
        )
        .expect("write to string");
    }
    writeln!(xml, "{INDENT}</TIME_ORDER>").expect("write to string");
}

fn write_tier(xml: &mut String, tier: &Tier) {
    let attributes = &tier.attributes;
    let mut attrs = attributes.extra.clone();
    attrs.insert("TIER_ID".into(), attributes.name.clone());
    attrs.insert("LINGUISTIC_TYPE_REF".into(), attributes.linguistic_type.clone());
    insert_opt(&mut attrs, "PARENT_REF", attributes.parent.as_deref());
    insert_opt(&mut attrs, "PARTICIPANT", attributes.participant.as_deref());
    insert_opt(&mut attrs, "DEFAULT_LOCALE", attributes.default_locale.as_deref());
    insert_opt(&mut attrs, "ANNOTATOR", attributes.annotator.as_deref());

    if tier.is_empty() {
        empty_element(xml, 1, "TIER", &attrs);
        return;
    }

    writeln!(xml, "{INDENT}<TIER{}>", format_attrs(&attrs)).expect("write to string");

    for ann in tier.alignable.values() {
        let mut attrs = AttributeBag::from([
            ("ANNOTATION_ID".to_string(), ann.id.to_string()),
            ("TIME_SLOT_REF1".to_string(), ann.start.to_string()),
            ("TIME_SLOT_REF2".to_string(), ann.end.to_string()),
        ]);
        insert_opt(&mut attrs, "SVG_REF", ann.svg_ref.as_deref());
        write_annotation(xml, "ALIGNABLE_ANNOTATION", &attrs, &ann.value);
    }

    for ann in tier.reference.values() {
        let mut attrs = AttributeBag::from([
            ("ANNOTATION_ID".to_string(), ann.id.to_string()),
            ("ANNOTATION_REF".to_string(), ann.annotation_ref.to_string()),
        ]);
        if let Some(previous) = ann.previous {
            attrs.insert("PREVIOUS_ANNOTATION".into(), previous.to_string());
        }
        insert_opt(&mut attrs, "SVG_REF", ann.svg_ref.as_deref());
        write_annotation(xml, "REF_ANNOTATION", &attrs, &ann.value);
    }

    writeln!(xml, "{INDENT}</TIER>").expect("write to string");
}

fn write_annotation(xml: &mut String, tag: &str, attrs: &AttributeBag, value: &str) {
    let pad = INDENT.repeat(2);
    writeln!(xml, "{pad}<ANNOTATION>").expect("write to string");
    writeln!(xml, "{pad}{INDENT}<{tag}{}>", format_attrs(attrs)).expect("write to string");
    writeln!(
        xml,
        "{pad}{INDENT}{INDENT}<ANNOTATION_VALUE>{}</ANNOTATION_VALUE>",
        xml_escape(value)
    )
    .expect("write to string");
    writeln!(xml, "{pad}{INDENT}</{tag}>").expect("write to string");
    writeln!(xml, "{pad}</ANNOTATION>").expect("write to string");
}

fn empty_element(xml: &mut String, depth: usize, tag: &str, attrs: &AttributeBag) {
    writeln!(xml, "{}<{tag}{}/>", INDENT.repeat(depth), format_attrs(attrs))
        .expect("write to string");
}

fn insert_opt(attrs: &mut AttributeBag, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        attrs.insert(key.to_string(), value.to_string());
    }
}

/// ` KEY="value"` pairs in key order, with a leading space per pair.
fn format_attrs(attrs: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in attrs {
        write!(out, " {}=\"{}\"", key, xml_escape(value)).expect("write to string");
    }
    out
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eaf::{AnnotationSpan, DEFAULT_LINGUISTIC_TYPE};

    const MINIMAL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ANNOTATION_DOCUMENT xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="http://www.mpi.nl/tools/elan/EAFv2.7.xsd" AUTHOR="tester" DATE="2020-01-01T00:00:00+00:00" FORMAT="2.7" VERSION="2.7">
    <HEADER MEDIA_FILE="" TIME_UNITS="milliseconds">
        <MEDIA_DESCRIPTOR MEDIA_URL="file:///rec.wav" MIME_TYPE="audio/x-wav"/>
        <PROPERTY NAME="lastUsedAnnotationId">3</PROPERTY>
    </HEADER>
    <TIME_ORDER>
        <TIME_SLOT TIME_SLOT_ID="ts1" TIME_VALUE="0"/>
        <TIME_SLOT TIME_SLOT_ID="ts2" TIME_VALUE="500"/>
        <TIME_SLOT TIME_SLOT_ID="ts7"/>
    </TIME_ORDER>
    <TIER LINGUISTIC_TYPE_REF="default-lt" PARTICIPANT="Ann" TIER_ID="words">
        <ANNOTATION>
            <ALIGNABLE_ANNOTATION ANNOTATION_ID="a1" TIME_SLOT_REF1="ts1" TIME_SLOT_REF2="ts2">
                <ANNOTATION_VALUE>fish &amp; chips</ANNOTATION_VALUE>
            </ALIGNABLE_ANNOTATION>
        </ANNOTATION>
    </TIER>
    <TIER LINGUISTIC_TYPE_REF="gloss" PARENT_REF="words" TIER_ID="gloss">
        <ANNOTATION>
            <REF_ANNOTATION ANNOTATION_ID="a5" ANNOTATION_REF="a1">
                <ANNOTATION_VALUE>food</ANNOTATION_VALUE>
            </REF_ANNOTATION>
        </ANNOTATION>
    </TIER>
    <LINGUISTIC_TYPE GRAPHIC_REFERENCES="false" LINGUISTIC_TYPE_ID="default-lt" TIME_ALIGNABLE="true"/>
    <LINGUISTIC_TYPE CONSTRAINTS="Symbolic_Association" GRAPHIC_REFERENCES="false" LINGUISTIC_TYPE_ID="gloss" TIME_ALIGNABLE="false"/>
    <CONSTRAINT DESCRIPTION="1-1 association" STEREOTYPE="Symbolic_Association"/>
</ANNOTATION_DOCUMENT>
"#;

    #[test]
    fn parse_reads_tiers_and_counters() {
        let doc = from_eaf_str(MINIMAL).expect("parse");

        assert_eq!(doc.tier_names(), vec!["words", "gloss"]);
        assert_eq!(
            doc.annotations_of("words").unwrap(),
            vec![AnnotationSpan::new(0, 500, "fish & chips")]
        );
        assert_eq!(doc.participant_of("words").unwrap(), Some("Ann"));
        assert_eq!(doc.last_annotation_id(), 5);
        assert_eq!(doc.timeline().last_issued(), 7);
        assert_eq!(doc.timeline().get(TimeslotId(7)).unwrap(), None);
        assert!(!doc.info.keys().any(|k| k.contains("noNamespace")));
        assert_eq!(doc.header.audio().len(), 1);
        assert_eq!(doc.header.properties[0].value, "3");
        assert_eq!(doc.constraint_for("gloss").unwrap(), Some("Symbolic_Association"));
    }

    #[test]
    fn new_ids_continue_after_loaded_ones() {
        let mut doc = from_eaf_str(MINIMAL).expect("parse");
        let id = doc.insert_annotation("words", 600, 700, "more").unwrap();
        assert_eq!(id, AnnotationId(6));
        assert!(doc.timeline().contains(TimeslotId(8)));
    }

    #[test]
    fn parse_rejects_wrong_root() {
        let err = from_eaf_str("<TIERS/>").unwrap_err();
        match err {
            EafError::EafXmlParse { message, .. } => assert!(message.contains(ROOT_TAG)),
            other => panic!("expected EafXmlParse, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_duplicate_tiers_and_annotations() {
        let dup_tier = r#"<ANNOTATION_DOCUMENT>
            <TIER LINGUISTIC_TYPE_REF="lt" TIER_ID="t"/>
            <TIER LINGUISTIC_TYPE_REF="lt" TIER_ID="t"/>
        </ANNOTATION_DOCUMENT>"#;
        let err = from_eaf_str(dup_tier).unwrap_err();
        assert!(matches!(
            err,
            EafError::EafXmlParse { ref message, .. } if message.contains("duplicate tier")
        ));

        let dup_ann = r#"<ANNOTATION_DOCUMENT>
            <TIER LINGUISTIC_TYPE_REF="lt" TIER_ID="a">
                <ANNOTATION><REF_ANNOTATION ANNOTATION_ID="a1" ANNOTATION_REF="a9"><ANNOTATION_VALUE/></REF_ANNOTATION></ANNOTATION>
            </TIER>
            <TIER LINGUISTIC_TYPE_REF="lt" TIER_ID="b">
                <ANNOTATION><REF_ANNOTATION ANNOTATION_ID="a1" ANNOTATION_REF="a9"><ANNOTATION_VALUE/></REF_ANNOTATION></ANNOTATION>
            </TIER>
        </ANNOTATION_DOCUMENT>"#;
        let err = from_eaf_str(dup_ann).unwrap_err();
        assert!(matches!(
            err,
            EafError::EafXmlParse { ref message, .. } if message.contains("duplicate annotation")
        ));
    }

    #[test]
    fn parse_rejects_malformed_ids_and_times() {
        let bad_slot = r#"<ANNOTATION_DOCUMENT><TIME_ORDER>
            <TIME_SLOT TIME_SLOT_ID="slot1" TIME_VALUE="0"/>
        </TIME_ORDER></ANNOTATION_DOCUMENT>"#;
        assert!(from_eaf_str(bad_slot).is_err());

        let bad_time = r#"<ANNOTATION_DOCUMENT><TIME_ORDER>
            <TIME_SLOT TIME_SLOT_ID="ts1" TIME_VALUE="1.5"/>
        </TIME_ORDER></ANNOTATION_DOCUMENT>"#;
        assert!(from_eaf_str(bad_time).is_err());

        assert!(from_eaf_slice(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn write_then_read_preserves_content() {
        let mut doc = Document::new();
        doc.add_tier(
            TierAttributes::new("spk", DEFAULT_LINGUISTIC_TYPE).with_annotator("me <you>"),
        )
        .unwrap();
        doc.add_tier(TierAttributes::new("empty", DEFAULT_LINGUISTIC_TYPE))
            .unwrap();
        let a = doc
            .insert_annotation_with_svg("spk", 10, 20, "\"quoted\" & <tagged>", Some("svg1".into()))
            .unwrap();
        doc.append_reference_annotation("empty", "ref", a, None)
            .unwrap();
        doc.add_controlled_vocabulary(ControlledVocabulary::new("cv", "d").with_entry("N", "noun"));

        let xml = to_eaf_string(&doc);
        assert!(xml.contains("&quot;quoted&quot; &amp; &lt;tagged&gt;"));
        assert!(xml.contains(SCHEMA_LOCATION));

        let restored = from_eaf_str(&xml).expect("parse restored");
        assert_eq!(restored.tier_names(), doc.tier_names());
        assert_eq!(
            restored.annotations_of("spk").unwrap(),
            doc.annotations_of("spk").unwrap()
        );
        assert_eq!(
            restored.tier("spk").unwrap().alignable[&a].svg_ref.as_deref(),
            Some("svg1")
        );
        assert_eq!(
            restored.tier("spk").unwrap().attributes.annotator.as_deref(),
            Some("me <you>")
        );
        assert_eq!(restored.info, doc.info);
        assert_eq!(restored.header, doc.header);
        assert_eq!(restored.linguistic_types, doc.linguistic_types);
        assert_eq!(restored.controlled_vocabularies, doc.controlled_vocabularies);
        assert_eq!(restored.reference_annotations_of("empty").unwrap().len(), 1);
    }

    #[test]
    fn write_sorts_attributes_and_omits_unset() {
        let mut doc = Document::new();
        doc.add_tier(TierAttributes::new("t", DEFAULT_LINGUISTIC_TYPE))
            .unwrap();
        doc.insert_annotation("t", 0, 1, "x").unwrap();

        let xml = to_eaf_string(&doc);
        assert!(xml.contains("<TIER LINGUISTIC_TYPE_REF=\"default-lt\" TIER_ID=\"t\">"));
        assert!(!xml.contains("PARENT_REF"));
        assert!(xml.contains(
            "<ALIGNABLE_ANNOTATION ANNOTATION_ID=\"a1\" TIME_SLOT_REF1=\"ts1\" TIME_SLOT_REF2=\"ts2\">"
        ));
    }
}
