//! Unit tests for release archive extraction.

use super::*;
use crate::test_support::{ArchiveFixture, minimal_release_archive};
use flate2::Compression;
use flate2::write::GzEncoder;
use rstest::{fixture, rstest};
use std::io::Cursor;
use tempfile::TempDir;

#[fixture]
fn dest() -> TempDir {
    tempfile::tempdir().expect("temp dir")
}

fn extract_bytes(bytes: Vec<u8>, dest: &Path) -> Result<ExtractionSummary, ExtractionError> {
    extract_from_reader(MultiGzDecoder::new(Cursor::new(bytes)), dest)
}

#[rstest]
fn extracts_directory_and_file_entries(dest: TempDir) {
    let summary =
        extract_bytes(minimal_release_archive(), dest.path()).expect("extraction succeeds");

    assert!(dest.path().join("go/bin").is_dir());
    let content = fs::read(dest.path().join("go/bin/tool")).expect("read extracted file");
    assert_eq!(content, b"X");
    assert_eq!(
        summary,
        ExtractionSummary {
            directories: 2,
            files: 1,
            skipped: 0,
        }
    );
}

#[cfg(unix)]
#[rstest]
fn file_entries_keep_their_declared_mode(dest: TempDir) {
    use std::os::unix::fs::PermissionsExt;

    extract_bytes(minimal_release_archive(), dest.path()).expect("extraction succeeds");

    let mode = fs::metadata(dest.path().join("go/bin/tool"))
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o100, 0o100, "mode {mode:o} is not executable");
}

#[rstest]
#[case::symlink(ArchiveFixture::new().symlink("go/bin/gofmt-link", "gofmt"))]
#[case::hard_link(ArchiveFixture::new().hard_link("go/bin/go-copy", "go/bin/go"))]
#[case::fifo(ArchiveFixture::new().fifo("go/pipe"))]
fn non_regular_entries_are_skipped_and_later_entries_extract(
    #[case] fixture: ArchiveFixture,
    dest: TempDir,
) {
    let bytes = fixture.file("go/VERSION", 0o644, b"go1.21.0").finish();

    let summary = extract_bytes(bytes, dest.path()).expect("extraction succeeds");

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.files, 1);
    assert_eq!(
        fs::read(dest.path().join("go/VERSION")).expect("read VERSION"),
        b"go1.21.0"
    );
}

#[rstest]
fn skipped_entries_leave_nothing_on_disk(dest: TempDir) {
    let bytes = ArchiveFixture::new()
        .directory("go/")
        .symlink("go/link", "VERSION")
        .finish();

    extract_bytes(bytes, dest.path()).expect("extraction succeeds");

    assert!(fs::symlink_metadata(dest.path().join("go/link")).is_err());
}

#[rstest]
fn existing_directories_are_accepted(dest: TempDir) {
    fs::create_dir_all(dest.path().join("go/bin")).expect("pre-create");

    let summary =
        extract_bytes(minimal_release_archive(), dest.path()).expect("extraction succeeds");
    assert_eq!(summary.directories, 2);
}

#[rstest]
fn files_without_directory_entries_get_parents(dest: TempDir) {
    let bytes = ArchiveFixture::new()
        .file("go/src/runtime/proc.go", 0o644, b"package runtime")
        .finish();

    extract_bytes(bytes, dest.path()).expect("extraction succeeds");
    assert!(dest.path().join("go/src/runtime/proc.go").is_file());
}

#[rstest]
fn empty_archive_extracts_nothing(dest: TempDir) {
    let summary = extract_bytes(ArchiveFixture::new().finish(), dest.path())
        .expect("empty archive is well-formed");
    assert_eq!(summary, ExtractionSummary::default());
}

#[rstest]
#[case::parent_dir("../escape.txt")]
#[case::nested_parent("go/../../escape.txt")]
#[case::absolute("/tmp/escape.txt")]
fn traversal_entries_are_rejected(#[case] raw_name: &str, dest: TempDir) {
    let bytes = ArchiveFixture::new().raw_file(raw_name, b"evil").finish();

    let err = extract_bytes(bytes, dest.path()).expect_err("traversal should fail");
    assert!(
        matches!(err, ExtractionError::PathTraversal { .. }),
        "expected PathTraversal for {raw_name}, got {err:?}"
    );
    assert!(err.is_format_error());
}

#[rstest]
fn corrupt_gzip_stream_is_a_format_error(dest: TempDir) {
    let err = extract_bytes(b"definitely not gzip".to_vec(), dest.path())
        .expect_err("garbage should fail");
    assert!(matches!(err, ExtractionError::Stream { .. }), "got {err:?}");
    assert!(err.is_format_error());
}

#[rstest]
fn truncated_archive_is_a_format_error(dest: TempDir) {
    // Poorly compressible content so the cut lands inside the file data.
    let noise: Vec<u8> = (0..65_536u32)
        .map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8)
        .collect();
    let mut bytes = ArchiveFixture::new()
        .file("go/big", 0o644, &noise)
        .finish();
    bytes.truncate(bytes.len() / 2);

    let err = extract_bytes(bytes, dest.path()).expect_err("truncated archive should fail");
    assert!(err.is_format_error(), "got {err:?}");
}

#[rstest]
fn every_gzip_member_is_extracted(dest: TempDir) {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, contents) in [("go/a", b"first"), ("go/b", b"other")] {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_mode(0o644);
        header.set_size(contents.len() as u64);
        builder
            .append_data(&mut header, path, &contents[..])
            .expect("append entry");
    }
    let tar_bytes = builder.into_inner().expect("finish tar");
    let (head, tail) = tar_bytes.split_at(1024);

    let mut bytes = Vec::new();
    for part in [head, tail] {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(part).expect("compress member");
        bytes.extend(encoder.finish().expect("finish member"));
    }

    let summary = extract_bytes(bytes, dest.path()).expect("extraction succeeds");

    assert_eq!(summary.files, 2);
    assert_eq!(fs::read(dest.path().join("go/a")).expect("read a"), b"first");
    assert_eq!(fs::read(dest.path().join("go/b")).expect("read b"), b"other");
}

#[rstest]
fn extract_archive_reads_from_disk(dest: TempDir) {
    let archive_path = dest.path().join("go1.21.0.linux-amd64.tar.gz");
    fs::write(&archive_path, minimal_release_archive()).expect("write archive");

    extract_archive(&archive_path, dest.path()).expect("extraction succeeds");
    assert!(dest.path().join("go/bin/tool").is_file());
}

#[rstest]
fn missing_archive_is_an_open_error(dest: TempDir) {
    let err = extract_archive(&dest.path().join("absent.tar.gz"), dest.path())
        .expect_err("missing archive should fail");
    assert!(matches!(err, ExtractionError::Open { .. }));
    assert!(!err.is_format_error());
}

#[rstest]
#[case::directory(EntryType::Directory, EntryKind::Directory)]
#[case::regular(EntryType::Regular, EntryKind::File { mode: 0o640 })]
#[case::symlink(EntryType::Symlink, EntryKind::Other(EntryType::Symlink))]
#[case::hard_link(EntryType::Link, EntryKind::Other(EntryType::Link))]
#[case::char_device(EntryType::Char, EntryKind::Other(EntryType::Char))]
#[case::block_device(EntryType::Block, EntryKind::Other(EntryType::Block))]
#[case::fifo(EntryType::Fifo, EntryKind::Other(EntryType::Fifo))]
fn entry_kind_dispatches_on_entry_type(#[case] entry_type: EntryType, #[case] expected: EntryKind) {
    let mut header = Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_mode(0o640);

    assert_eq!(
        EntryKind::from_header(&header).expect("valid header"),
        expected
    );
}
