mod proptest_helpers;

use eafkit::eaf::io_eaf::{from_eaf_slice, from_eaf_str, to_eaf_string};
use eafkit::eaf::io_json::{from_json_str, to_json_string};
use eafkit::eaf::TierAttributes;
use proptest::prelude::*;

use proptest_helpers::{arb_document, arb_value, tier_contents};

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn eaf_roundtrip_preserves_tiers_and_spans(doc in arb_document()) {
        let xml = to_eaf_string(&doc);
        let restored = from_eaf_str(&xml).unwrap();

        prop_assert_eq!(tier_contents(&restored), tier_contents(&doc));
        prop_assert_eq!(restored.timeline().len(), doc.timeline().len());
        prop_assert_eq!(restored.last_annotation_id(), doc.last_annotation_id());
        prop_assert_eq!(&restored.info, &doc.info);
        prop_assert_eq!(&restored.linguistic_types, &doc.linguistic_types);

        // Writing the re-read document reproduces the same bytes.
        prop_assert_eq!(to_eaf_string(&restored), xml);
    }

    #[test]
    fn eaf_roundtrip_preserves_tier_attributes(
        doc in arb_document(),
        participant in arb_value(),
        annotator in arb_value(),
    ) {
        let mut doc = doc;
        let parent = doc.tier_names()[0].to_string();
        doc.add_tier(
            TierAttributes::new("extra-tier", "default-lt")
                .with_parent(parent)
                .with_participant(participant)
                .with_annotator(annotator),
        )
        .unwrap();

        let restored = from_eaf_str(&to_eaf_string(&doc)).unwrap();
        prop_assert_eq!(
            &restored.tier("extra-tier").unwrap().attributes,
            &doc.tier("extra-tier").unwrap().attributes
        );
        prop_assert_eq!(restored.tier_names(), doc.tier_names());
    }

    #[test]
    fn json_roundtrip_preserves_document(doc in arb_document()) {
        let json = to_json_string(&doc).unwrap();
        let restored = from_json_str(&json).unwrap();

        prop_assert_eq!(tier_contents(&restored), tier_contents(&doc));
        prop_assert_eq!(to_eaf_string(&restored), to_eaf_string(&doc));
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = from_eaf_slice(&bytes);
    }
}
