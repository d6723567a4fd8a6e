#[path = "../src/backup.rs"]
mod backup;

use std::fs::File;
use std::io::{Read, Write};
use zip::write::FileOptions;

fn read_entry(bundle: &std::path::Path, name: &str) -> Vec<u8> {
    let f = File::open(bundle).expect("open bundle");
    let mut archive = zip::ZipArchive::new(f).expect("open zip archive");
    let mut out = Vec::new();
    archive
        .by_name(name)
        .expect("bundle entry")
        .read_to_end(&mut out)
        .expect("read entry");
    out
}

#[test]
fn bundle_export_and_import_roundtrip() {
    let workspace = tempfile::tempdir().expect("source workspace");
    let restored_ws = tempfile::tempdir().expect("target workspace");
    let out_dir = tempfile::tempdir().expect("out dir");

    let bytes = b"sqlite-test-payload";
    std::fs::write(workspace.path().join("school.sqlite3"), bytes).expect("write source db");

    let bundle_path = out_dir.path().join("nested").join("workspace.zip");
    let export =
        backup::export_workspace_bundle(workspace.path(), &bundle_path).expect("export bundle");
    assert_eq!(export.bundle_format, backup::BUNDLE_FORMAT);
    assert_eq!(export.entry_count, 3);
    assert_eq!(export.db_sha256.len(), 64);

    let manifest: serde_json::Value =
        serde_json::from_slice(&read_entry(&bundle_path, "manifest.json")).expect("manifest json");
    assert_eq!(manifest["format"], backup::BUNDLE_FORMAT);
    assert_eq!(manifest["dbSha256"], export.db_sha256.as_str());
    assert_eq!(manifest["dbBytes"], bytes.len());
    assert_eq!(read_entry(&bundle_path, "db/school.sqlite3"), bytes);

    let import =
        backup::import_workspace_bundle(&bundle_path, restored_ws.path()).expect("import bundle");
    assert_eq!(import.bundle_format_detected, backup::BUNDLE_FORMAT);
    assert!(import.checksum_verified);
    let restored = std::fs::read(restored_ws.path().join("school.sqlite3")).expect("read restored db");
    assert_eq!(restored, bytes);
    assert!(!restored_ws.path().join("school.sqlite3.importing").exists());
}

#[test]
fn tampered_database_entry_is_rejected_before_restore() {
    let workspace = tempfile::tempdir().expect("workspace");
    let dst = workspace.path().join("school.sqlite3");
    std::fs::write(&dst, b"live-database").expect("write live db");

    let bundle_path = workspace.path().join("tampered.zip");
    {
        let f = File::create(&bundle_path).expect("create bundle");
        let mut zip = zip::ZipWriter::new(f);
        let opts = FileOptions::default();
        let manifest = serde_json::json!({
            "format": backup::BUNDLE_FORMAT,
            "version": 1,
            "dbSha256": "0".repeat(64),
        });
        zip.start_file("manifest.json", opts).expect("start manifest");
        zip.write_all(manifest.to_string().as_bytes()).expect("write manifest");
        zip.start_file("db/school.sqlite3", opts).expect("start db");
        zip.write_all(b"corrupted-bytes").expect("write db");
        zip.finish().expect("finish zip");
    }

    let err = backup::import_workspace_bundle(&bundle_path, workspace.path())
        .expect_err("checksum mismatch must fail");
    assert!(err.to_string().contains("checksum mismatch"), "{}", err);
    assert_eq!(std::fs::read(&dst).expect("read live db"), b"live-database");
}

#[test]
fn unknown_bundle_format_is_rejected() {
    let workspace = tempfile::tempdir().expect("workspace");
    let bundle_path = workspace.path().join("other.zip");
    {
        let f = File::create(&bundle_path).expect("create bundle");
        let mut zip = zip::ZipWriter::new(f);
        zip.start_file("manifest.json", FileOptions::default())
            .expect("start manifest");
        zip.write_all(br#"{"format":"something-else"}"#)
            .expect("write manifest");
        zip.finish().expect("finish zip");
    }

    let err = backup::import_workspace_bundle(&bundle_path, workspace.path())
        .expect_err("foreign format must fail");
    assert!(err.to_string().contains("unsupported bundle format"), "{}", err);
    assert!(!workspace.path().join("school.sqlite3").exists());
}

#[test]
fn raw_sqlite_file_is_copied_without_verification() {
    let source = tempfile::tempdir().expect("source dir");
    let target = tempfile::tempdir().expect("target workspace");
    let raw = source.path().join("copy.sqlite3");
    std::fs::write(&raw, b"SQLite format 3\0payload").expect("write raw db");

    let import = backup::import_workspace_bundle(&raw, target.path()).expect("import raw");
    assert_eq!(import.bundle_format_detected, "sqlite3");
    assert!(!import.checksum_verified);
    assert_eq!(
        std::fs::read(target.path().join("school.sqlite3")).expect("read restored"),
        b"SQLite format 3\0payload"
    );
}
