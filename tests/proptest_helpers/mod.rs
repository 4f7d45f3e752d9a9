#![allow(dead_code)]

use std::collections::BTreeSet;

use eafkit::eaf::{AnnotationSpan, Document, Millis, TierAttributes, DEFAULT_LINGUISTIC_TYPE};
use proptest::collection::{btree_set, vec};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Annotation text, including characters XML must escape. Never starts
/// with whitespace so text nodes survive parsing unchanged.
pub fn arb_value() -> BoxedStrategy<String> {
    prop_oneof![
        1 => Just(String::new()),
        6 => "[a-zA-Z0-9&<>\"'_.-][a-zA-Z0-9 &<>\"'_.-]{0,10}",
    ]
    .boxed()
}

pub fn arb_tier_name() -> BoxedStrategy<String> {
    "[A-Za-z][A-Za-z0-9_]{0,6}".boxed()
}

/// Well-formed spans (`start <= end`) within `[0, limit]`.
pub fn arb_spans(limit: Millis, max_count: usize) -> BoxedStrategy<Vec<AnnotationSpan>> {
    vec(
        (0..limit, 0..=limit / 4, arb_value()).prop_map(move |(start, len, value)| {
            AnnotationSpan::new(start, (start + len).min(limit), value)
        }),
        0..max_count,
    )
    .boxed()
}

/// A document with one to four tiers of alignable annotations.
pub fn arb_document() -> BoxedStrategy<Document> {
    btree_set(arb_tier_name(), 1..5)
        .prop_flat_map(|names: BTreeSet<String>| {
            let names: Vec<String> = names.into_iter().collect();
            let count = names.len();
            (Just(names), vec(arb_spans(20_000, 12), count))
        })
        .prop_map(|(names, spans)| build_document(&names, &spans))
        .boxed()
}

pub fn build_document(names: &[String], spans: &[Vec<AnnotationSpan>]) -> Document {
    let mut doc = Document::new();
    for (name, tier_spans) in names.iter().zip(spans) {
        doc.add_tier(TierAttributes::new(name.clone(), DEFAULT_LINGUISTIC_TYPE))
            .expect("unique tier names");
        for span in tier_spans {
            doc.insert_annotation(name, span.start, span.end, span.value.clone())
                .expect("tier exists");
        }
    }
    doc
}

/// Spans of every tier, sorted, keyed by tier name in rank order.
pub fn tier_contents(doc: &Document) -> Vec<(String, Vec<AnnotationSpan>)> {
    doc.tier_names()
        .into_iter()
        .map(|name| {
            let mut spans = doc.annotations_of(name).expect("tier exists");
            spans.sort();
            (name.to_string(), spans)
        })
        .collect()
}

/// Instants `start <= t < end` covered by at least one span.
pub fn covered_instants(spans: &[AnnotationSpan]) -> BTreeSet<Millis> {
    spans.iter().flat_map(|s| s.start..s.end).collect()
}
