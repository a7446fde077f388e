use pretty_assertions::assert_eq;
use ptxprobe_core::search::find_in_file_with_config;
use ptxprobe_core::{
    analyze_file, diff_files, extract_strings_from_file, find_in_file, guess_fields_in_file,
    load_file, BinaryDiff, ByteOrder, Encoding, Error, FieldGuesser, MarkerSearch, SearchConfig,
    StringTableScanner, DEFAULT_MARKER_TERMS,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A baseline session and the same session after adding markers
fn write_sessions(dir: &Path) -> (PathBuf, PathBuf) {
    let mut baseline = b"PTX\x01\x01\x00\x00\x00session\xFF".to_vec();
    while baseline.len() % 4 != 0 {
        baseline.push(0);
    }

    let mut variant = baseline.clone();
    // Marker table: a UTF-16LE name followed by its sample position
    for (name, seconds) in [("Intro", 30u32), ("Chorus", 60)] {
        let mut entry: Vec<u8> = name.encode_utf16().flat_map(u16::to_le_bytes).collect();
        while entry.len() % 4 != 0 {
            entry.push(0);
        }
        entry.extend_from_slice(&(seconds * 44_100).to_le_bytes());
        variant.extend_from_slice(&entry);
    }

    let a = dir.join("empty_test.ptx");
    let b = dir.join("test_with_markers.ptx");
    fs::write(&a, &baseline).unwrap();
    fs::write(&b, &variant).unwrap();
    (a, b)
}

#[test]
fn test_markers_found_in_variant_only() {
    let dir = TempDir::new().unwrap();
    let (a, b) = write_sessions(dir.path());

    assert!(find_in_file(&a, DEFAULT_MARKER_TERMS).unwrap().is_empty());

    let found = find_in_file(&b, DEFAULT_MARKER_TERMS).unwrap();
    let summary: Vec<(&str, Encoding)> = found
        .iter()
        .map(|o| (o.term.as_str(), o.encoding))
        .collect();
    assert_eq!(
        summary,
        vec![("Intro", Encoding::WideLe), ("Chorus", Encoding::WideLe)]
    );
}

#[test]
fn test_verbatim_term_is_found_at_its_offset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("narrow.ptx");
    let mut raw = vec![0x11u8; 37];
    raw.extend_from_slice(b"Verse 1");
    raw.extend_from_slice(&[0x22; 5]);
    fs::write(&path, &raw).unwrap();

    let found =
        find_in_file_with_config(&path, &["Verse 1"], SearchConfig::new().context_radius(3))
            .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].position, 37);
    assert_eq!(found[0].encoding, Encoding::Narrow);
    assert_eq!(found[0].context(), b"\x11\x11\x11Verse 1\x22\x22\x22");
}

#[test]
fn test_diff_locates_appended_marker_table() {
    let dir = TempDir::new().unwrap();
    let (a, b) = write_sessions(dir.path());

    let report = diff_files(&a, &b).unwrap();
    assert_eq!(report.size_delta, 32);
    assert_eq!(report.first_difference_offset(), None);

    let trailing = report.trailing_extra_bytes().unwrap();
    assert_eq!(&trailing[..4], b"I\0n\0");
}

#[test]
fn test_fields_and_strings_from_file() {
    let dir = TempDir::new().unwrap();
    let (_, b) = write_sessions(dir.path());

    let fields = guess_fields_in_file(&b, 44_100.0).unwrap();
    // The UTF-16 names read as plausible counts too; look at the value slots
    let positions: Vec<(usize, ByteOrder, f64)> = fields
        .iter()
        .filter(|f| f.offset == 28 || f.offset == 44)
        .map(|f| (f.offset, f.byte_order, f.seconds))
        .collect();
    assert_eq!(
        positions,
        vec![(28, ByteOrder::Little, 30.0), (44, ByteOrder::Little, 60.0)]
    );

    let strings = extract_strings_from_file(&b).unwrap();
    assert_eq!(strings[0].text, "PTX");
    assert_eq!(strings[1].text, "session");
    assert_eq!(strings[1].start_offset, 8);
}

#[test]
fn test_analyze_file() {
    let dir = TempDir::new().unwrap();
    let (a, _) = write_sessions(dir.path());

    let report = analyze_file(&a).unwrap();
    assert_eq!(report.header.total_len, 16);
    assert_eq!(report.strings.len(), 2);
}

#[test]
fn test_missing_file_is_reported_with_path() {
    let dir = TempDir::new().unwrap();
    let (a, _) = write_sessions(dir.path());
    let missing = dir.path().join("missing.ptx");

    for err in [
        find_in_file(&missing, DEFAULT_MARKER_TERMS).unwrap_err(),
        diff_files(&a, &missing).unwrap_err(),
        diff_files(&missing, &a).unwrap_err(),
    ] {
        assert!(matches!(err, Error::FileRead { .. }));
        assert_eq!(err.path(), Some(missing.as_path()));
        assert!(err.is_recoverable());
    }
}

#[test]
fn test_invalid_sample_rate_is_rejected_before_reading() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.ptx");
    let err = guess_fields_in_file(&missing, 0.0).unwrap_err();
    assert!(matches!(err, Error::InvalidSampleRate { .. }));
}

#[test]
fn test_primitives_are_idempotent() {
    let dir = TempDir::new().unwrap();
    let (a, b) = write_sessions(dir.path());
    let a = load_file(a).unwrap();
    let b = load_file(b).unwrap();

    let search = MarkerSearch::new();
    assert_eq!(
        search.find(&b, DEFAULT_MARKER_TERMS),
        search.find(&b, DEFAULT_MARKER_TERMS)
    );

    let scanner = StringTableScanner::new();
    assert_eq!(scanner.extract(&b), scanner.extract(&b));

    let guesser = FieldGuesser::new();
    assert!(!guesser.guess(&b).is_empty());
    assert_eq!(guesser.guess(&b), guesser.guess(&b));

    let diff = BinaryDiff::new();
    assert_eq!(diff.diff(&a, &b), diff.diff(&a, &b));
    assert!(diff.diff(&b, &b).is_identical());
}

#[cfg(feature = "serde")]
#[test]
fn test_findings_serialize_bytes_as_hex() {
    use bytes::Bytes;

    let a = Bytes::from_static(&[1, 2, 3]);
    let b = Bytes::from_static(&[1, 2, 3, 0xAB]);
    let json = serde_json::to_value(BinaryDiff::new().diff(&a, &b)).unwrap();
    assert_eq!(json["size_delta"], 1);
    assert_eq!(json["trailing"]["preview"], "ab");
    assert_eq!(json["trailing"]["side"], "B");
    assert_eq!(json["trailing"]["ascii"], "");
}
