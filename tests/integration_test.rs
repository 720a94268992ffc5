use bannerkit::prelude::*;
use std::fs;
use tempfile::tempdir;

const NO_OVERRIDES: [&str; 0] = [];

const CANONICAL: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<base type=\"widget\" virtual_resolution=\"1440, 900\">\n\t<!-- native widgets -->\n\t<widgets>\n\t\t<widget type=\"button\" name=\"ok_button\" style=\"flat\" text=\"\"/>\n\t\t<widget type=\"grid\" name=\"inventory_grid\" num_of_cols=\"6\"/>\n\t</widgets>\n\t<tags></tags>\n</base>\n";

#[test]
fn test_file_round_trip_is_byte_identical() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("Looknfeel.xml");
    fs::write(&base, CANONICAL).unwrap();

    let mut merger = DocumentMerger::new();
    let doc = merger.load_and_merge(&base, &NO_OVERRIDES).unwrap();

    let saved = dir.path().join("saved.xml");
    merger.save_to_original_location(&doc, &saved).unwrap();

    assert_eq!(fs::read_to_string(&saved).unwrap(), CANONICAL);
}

#[test]
fn test_missing_base_file_is_fatal() {
    let dir = tempdir().unwrap();
    let mut merger = DocumentMerger::new();
    let err = merger
        .load_and_merge(dir.path().join("absent.xml"), &NO_OVERRIDES)
        .unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}

#[test]
fn test_missing_override_files_are_skipped() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("base.xml");
    fs::write(&base, "<base><widget name=\"a\" x=\"1\"/></base>").unwrap();

    let present = dir.path().join("mod_b.xml");
    fs::write(&present, "<base><widget name=\"a\" y=\"2\"/></base>").unwrap();
    let missing = dir.path().join("mod_a.xml");

    let mut merger = DocumentMerger::new();
    let doc = merger
        .load_and_merge(&base, &[missing, present])
        .unwrap();

    let widget = doc.root.child_element("widget").unwrap();
    assert_eq!(widget.attribute("x"), Some("1"));
    assert_eq!(widget.attribute("y"), Some("2"));
}

#[test]
fn test_malformed_override_is_fatal_with_path() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("base.xml");
    fs::write(&base, "<base/>").unwrap();
    let broken = dir.path().join("broken.xml");
    fs::write(&broken, "<base><widget></base>").unwrap();

    let mut merger = DocumentMerger::new();
    let err = merger.load_and_merge(&base, &[&broken]).unwrap_err();
    match err {
        Error::MalformedDocument { path, .. } => assert_eq!(path, broken),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_merge_modules_first_path_is_base() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("native.xml");
    fs::write(&base, "<base><widget name=\"a\" x=\"1\"/></base>").unwrap();
    let overlay = dir.path().join("mod.xml");
    fs::write(&overlay, "<base><widget name=\"b\"/></base>").unwrap();

    let mut merger = DocumentMerger::new();
    let doc = merger.merge_modules(&[&base, &overlay]).unwrap();
    assert_eq!(doc.root.child_elements().count(), 2);

    let err = merger.merge_modules::<&str>(&[]).unwrap_err();
    assert!(matches!(err, Error::NoModules));
}

#[test]
fn test_edit_session_end_to_end() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("Looknfeel.xml");
    fs::write(&base, CANONICAL).unwrap();

    let mut session = EditSession::new(LooknfeelMapper);
    let original = session
        .load_for_edit(&base, &NO_OVERRIDES, &NodePath::parse("/base").unwrap())
        .unwrap();

    // The empty text attribute and the empty tags container both survive
    // as present-but-empty.
    assert_eq!(original.widgets.items()[0].text, Presence::PresentEmpty);

    let mut edited = original.clone();
    if let Presence::Present(widgets) = &mut edited.widgets {
        widgets[1].num_of_cols = Presence::Present("8".to_string());
    }

    let outcome = session.save_changes(&original, &edited).unwrap();
    assert_eq!(outcome.applied, 1);
    assert_eq!(outcome.skipped, 0);

    // Only the implicated attribute changed; every other byte survives.
    let saved = fs::read_to_string(&base).unwrap();
    assert_eq!(
        saved,
        CANONICAL.replace("num_of_cols=\"6\"", "num_of_cols=\"8\"")
    );
}

#[test]
fn test_session_with_override_edits_merged_state() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("Looknfeel.xml");
    fs::write(
        &base,
        "<base type=\"widget\"><widgets><widget name=\"ok\" style=\"flat\"/></widgets></base>",
    )
    .unwrap();
    let overlay = dir.path().join("override.xml");
    fs::write(
        &overlay,
        "<base><widgets><widget name=\"ok\" font_size=\"14\"/></widgets></base>",
    )
    .unwrap();

    let mut session = EditSession::new(LooknfeelMapper);
    let record = session
        .load_for_edit(&base, &[&overlay], &NodePath::parse("/base").unwrap())
        .unwrap();

    let widget = &record.widgets.items()[0];
    assert_eq!(widget.style, Presence::Present("flat".to_string()));
    assert_eq!(widget.font_size, Presence::Present("14".to_string()));
}

#[test]
fn test_validation_is_data_not_error() {
    let session = EditSession::new(LooknfeelMapper);
    let record = LooknfeelRecord::default();
    let result = session.validate(&record);
    assert!(result.is_valid());
    assert!(!result.warnings.is_empty());
}
