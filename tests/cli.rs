use assert_cmd::Command;
use eafkit::eaf::io_eaf::read_eaf;
use eafkit::eaf::AnnotationSpan;
use tempfile::TempDir;

const CONVERSATION: &str = "tests/fixtures/conversation.eaf";
const INVALID: &str = "tests/fixtures/invalid.eaf";

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.arg("-V");
    cmd.assert().success().stdout("eafkit 0.1.0\n");
}

// Validate subcommand tests

#[test]
fn validate_valid_document_succeeds() {
    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["validate", CONVERSATION]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Validation passed"));
}

#[test]
fn validate_invalid_document_fails() {
    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["validate", INVALID]);
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("3 error(s) and 1 warning(s)"))
        .stderr(predicates::str::contains("Validation failed"));
}

#[test]
fn validate_reports_structure_problems() {
    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["validate", INVALID]);
    cmd.assert()
        .failure()
        .stdout(predicates::str::contains("MissingParentTier"))
        .stdout(predicates::str::contains("ReversedSpan"))
        .stdout(predicates::str::contains("DanglingReference"))
        .stdout(predicates::str::contains("UnreferencedTimeslot"));
}

#[test]
fn validate_json_output_format() {
    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["validate", CONVERSATION, "--output", "json"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"error_count\": 0"))
        .stdout(predicates::str::contains("\"issues\": []"));
}

#[test]
fn validate_strict_fails_on_warnings() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("empty.eaf");
    std::fs::write(
        &path,
        r#"<ANNOTATION_DOCUMENT><HEADER TIME_UNITS="milliseconds"/><TIME_ORDER/></ANNOTATION_DOCUMENT>"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["validate", path.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("NoTiers"));

    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["validate", "--strict", path.to_str().unwrap()]);
    cmd.assert().failure();
}

#[test]
fn validate_nonexistent_file_fails() {
    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["validate", "tests/fixtures/does_not_exist.eaf"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("IO error"));
}

// Inspect subcommand tests

#[test]
fn inspect_prints_summary_and_tiers() {
    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["inspect", CONVERSATION]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Inspection Report"))
        .stdout(predicates::str::contains("Tiers (3)"))
        .stdout(predicates::str::contains("Media (2)"))
        .stdout(predicates::str::contains("gloss-lt"));
}

#[test]
fn inspect_json_output_format() {
    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["inspect", CONVERSATION, "--output", "json"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"alignable_annotations\": 4"))
        .stdout(predicates::str::contains("\"reference_annotations\": 1"))
        .stdout(predicates::str::contains("\"mime_type\": \"video/mp4\""));
}

// Interval subcommand tests

#[test]
fn gaps_prints_labelled_intervals() {
    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["gaps", CONVERSATION, "--first", "A", "--second", "B"]);
    cmd.assert()
        .success()
        .stdout("1000\t1200\tP_A\n2000\t2300\tG12_A_B\n3000\t3200\tO21_B_A\n");
}

#[test]
fn gaps_max_len_filters_long_intervals() {
    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args([
        "gaps",
        CONVERSATION,
        "--first",
        "A",
        "--second",
        "B",
        "--max-len",
        "250",
    ]);
    cmd.assert()
        .success()
        .stdout("1000\t1200\tP_A\n3000\t3200\tO21_B_A\n");
}

#[test]
fn gaps_writes_tier_when_output_given() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("go.eaf");

    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["gaps", CONVERSATION, "--first", "A", "--second", "B", "-o"])
        .arg(&out)
        .args(["--format", "json"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"kind\": \"Gap12\""));

    let doc = read_eaf(&out).unwrap();
    let spans = doc.annotations_of("A_B_go").unwrap();
    assert_eq!(
        spans,
        vec![
            AnnotationSpan::new(1000, 1200, "P_A"),
            AnnotationSpan::new(2000, 2300, "G12_A_B"),
            AnnotationSpan::new(3000, 3200, "O21_B_A"),
        ]
    );
    assert_eq!(doc.linguistic_type_of("A_B_go").unwrap(), "default-lt");
}

#[test]
fn merge_creates_merged_tier() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("merged.eaf");

    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["merge", CONVERSATION, "--tier", "A", "--tier", "B", "-o"])
        .arg(&out);
    cmd.assert().success().stdout(predicates::str::contains(
        "Merged 2 tier(s) into 'A_B_Merged' (3 annotation(s))",
    ));

    let doc = read_eaf(&out).unwrap();
    let mut spans = doc.annotations_of("A_B_Merged").unwrap();
    spans.sort();
    assert_eq!(
        spans,
        vec![
            AnnotationSpan::new(0, 1000, "hello"),
            AnnotationSpan::new(1200, 2000, "how are you"),
            AnnotationSpan::new(2300, 4000, "fine & you?_great"),
        ]
    );
    // Source tiers are left alone.
    assert_eq!(doc.annotations_of("A").unwrap().len(), 3);
}

#[test]
fn merge_unknown_tier_fails() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("merged.eaf");

    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["merge", CONVERSATION, "--tier", "nope", "-o"])
        .arg(&out);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Tier not found: 'nope'"));
    assert!(!out.exists());
}

#[test]
fn glue_joins_close_annotations() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("glued.eaf");

    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args([
        "glue",
        CONVERSATION,
        "--tier",
        "A",
        "--threshold",
        "250",
        "--name",
        "turns",
        "-o",
    ])
    .arg(&out);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("into 'turns' (2 annotation(s))"));

    let doc = read_eaf(&out).unwrap();
    let mut spans = doc.annotations_of("turns").unwrap();
    spans.sort();
    assert_eq!(spans[0], AnnotationSpan::new(0, 2000, "hello_how are you"));
    assert_eq!(spans[1], AnnotationSpan::new(3000, 4000, "great"));
}

#[test]
fn glue_default_threshold_keeps_separate_annotations() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("glued.eaf");

    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["glue", CONVERSATION, "--tier", "A", "--skip-value", "great", "-o"])
        .arg(&out);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("into 'A_glued' (2 annotation(s))"));
}

// Document transformation tests

#[test]
fn extract_keeps_overlapping_annotations() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("part.eaf");

    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["extract", CONVERSATION, "--start", "0", "--end", "1100", "-o"])
        .arg(&out);
    cmd.assert().success();

    let doc = read_eaf(&out).unwrap();
    assert_eq!(
        doc.annotations_of("A").unwrap(),
        vec![AnnotationSpan::new(0, 1000, "hello")]
    );
    assert!(doc.annotations_of("B").unwrap().is_empty());
    assert_eq!(doc.reference_annotations_of("gloss").unwrap().len(), 1);
    assert_eq!(doc.timeline().len(), 2);
}

#[test]
fn extract_rejects_reversed_range() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("part.eaf");

    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["extract", CONVERSATION, "--start", "500", "--end", "100", "-o"])
        .arg(&out);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Invalid range"));
}

#[test]
fn shift_moves_every_annotation() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("shifted.eaf");

    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["shift", CONVERSATION, "--by", "-1100", "-o"])
        .arg(&out);
    cmd.assert().success();

    let doc = read_eaf(&out).unwrap();
    // "hello" ends before the new origin and is trimmed.
    assert_eq!(
        doc.annotations_of("A").unwrap(),
        vec![
            AnnotationSpan::new(100, 900, "how are you"),
            AnnotationSpan::new(1900, 2900, "great"),
        ]
    );
    assert_eq!(
        doc.annotations_of("B").unwrap(),
        vec![AnnotationSpan::new(1200, 2100, "fine & you?")]
    );
}

// Export tests

#[test]
fn textgrid_export_writes_interval_tiers() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("conversation.TextGrid");

    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["textgrid", CONVERSATION])
        .arg(&out)
        .args(["--exclude", "gloss"]);
    cmd.assert().success();

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("File type = \"ooTextFile\"\n"));
    assert!(text.contains("size = 2\n"));
    assert!(text.contains("name = \"A\""));
    assert!(!text.contains("name = \"gloss\""));
    assert!(text.contains("intervals: size = 5"));
    assert!(text.contains("text = \"fine & you?\""));
}

#[test]
fn textgrid_unknown_excluded_tier_fails() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out.TextGrid");

    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["textgrid", CONVERSATION])
        .arg(&out)
        .args(["--exclude", "ghost"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Tier not found: 'ghost'"));
}

#[test]
fn json_snapshot_loads_back() {
    let tmp = TempDir::new().unwrap();
    let json = tmp.path().join("conversation.json");

    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["json", CONVERSATION]).arg(&json);
    cmd.assert().success();

    // A .json input goes through the snapshot reader.
    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["validate"]).arg(&json);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Validation passed"));
}

#[test]
fn malformed_xml_fails() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.eaf");
    std::fs::write(&path, "<ANNOTATION_DOCUMENT><TIER>").unwrap();

    let mut cmd = Command::cargo_bin("eafkit").unwrap();
    cmd.args(["inspect"]).arg(&path);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Failed to parse EAF XML"));
}
