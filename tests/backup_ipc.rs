mod support;

use serde_json::json;
use support::{student_payload, Sidecar};

#[test]
fn restoring_into_selected_workspace_reopens_it() {
    let workspace = tempfile::tempdir().expect("workspace");
    let bundle = workspace.path().join("backup.zip");
    let mut sc = Sidecar::spawn();
    sc.request_ok(
        "workspace.select",
        json!({ "path": workspace.path().to_string_lossy() }),
    );
    sc.request_ok("students.create", json!({ "student": student_payload("S1", "Amrani", "Lina") }));
    sc.request_ok(
        "backup.exportWorkspaceBundle",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    sc.request_ok("students.create", json!({ "student": student_payload("S2", "Benali", "Karim") }));

    let restored = sc.request_ok(
        "backup.importWorkspaceBundle",
        json!({ "inPath": bundle.to_string_lossy() }),
    );
    assert_eq!(restored["reopened"], true);
    assert_eq!(restored["checksumVerified"], true);
    let listed = sc.request_ok("students.list", json!({}));
    assert_eq!(listed["count"], 1);
}

#[test]
fn restoring_into_other_workspace_keeps_selection() {
    let current = tempfile::tempdir().expect("current workspace");
    let other = tempfile::tempdir().expect("other workspace");
    let bundle = current.path().join("backup.zip");
    let current_path = current.path().to_string_lossy().to_string();
    let mut sc = Sidecar::spawn();
    sc.request_ok("workspace.select", json!({ "path": current_path }));
    sc.request_ok("students.create", json!({ "student": student_payload("S1", "Amrani", "Lina") }));
    sc.request_ok(
        "backup.exportWorkspaceBundle",
        json!({ "outPath": bundle.to_string_lossy() }),
    );
    sc.request_ok("students.create", json!({ "student": student_payload("S2", "Benali", "Karim") }));

    let restored = sc.request_ok(
        "backup.importWorkspaceBundle",
        json!({
            "inPath": bundle.to_string_lossy(),
            "workspacePath": other.path().to_string_lossy()
        }),
    );
    assert_eq!(restored["reopened"], false);
    assert!(other.path().join("school.sqlite3").is_file());

    let health = sc.request_ok("health", json!({}));
    assert_eq!(health["workspacePath"], current_path);
    let listed = sc.request_ok("students.list", json!({}));
    assert_eq!(listed["count"], 2);

    sc.request_ok(
        "workspace.select",
        json!({ "path": other.path().to_string_lossy() }),
    );
    let restored_list = sc.request_ok("students.list", json!({}));
    assert_eq!(restored_list["count"], 1);
}
