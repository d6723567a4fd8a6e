mod support;

use serde_json::json;
use support::Sidecar;

fn setup() -> (tempfile::TempDir, Sidecar) {
    let workspace = tempfile::tempdir().expect("temp workspace");
    let mut sc = Sidecar::spawn();
    sc.request_ok(
        "workspace.select",
        json!({ "path": workspace.path().to_string_lossy() }),
    );
    (workspace, sc)
}

#[test]
fn rows_missing_required_cells_are_counted_as_failures() {
    let (_workspace, mut sc) = setup();

    let result = sc.request_ok(
        "import.students",
        json!({
            "columns": ["student_id", "last_name", "first_name", "gender", "birth_date", "registration_year"],
            "rows": [
                { "student_id": "S1", "last_name": "Amrani", "first_name": "Lina", "gender": "F", "birth_date": "2011-02-03", "registration_year": 2019.0 },
                { "student_id": "S2", "last_name": "Benali", "first_name": "Karim", "gender": "M", "birth_date": null },
                { "student_id": "S3", "last_name": "Cherif", "first_name": "Nadia", "gender": "F", "birth_date": "05/06/2012 00:00:00" },
                { "student_id": "S4", "first_name": "Yanis", "gender": "M", "birth_date": "2012-01-01" }
            ]
        }),
    );
    assert_eq!(result["summary"]["succeeded"], 2);
    assert_eq!(result["summary"]["failed"], 2);
    assert_eq!(result["summary"]["failures"][0]["row"], 2);
    assert_eq!(result["summary"]["failures"][1]["row"], 4);

    let listed = sc.request_ok("students.list", json!({}));
    assert_eq!(listed["count"], 2);
    let s1 = sc.request_ok("students.get", json!({ "studentId": "S1" }));
    assert_eq!(s1["student"]["registrationYear"], 2019);
    let s3 = sc.request_ok("students.get", json!({ "studentId": "S3" }));
    assert_eq!(s3["student"]["birthDate"], "2012-06-05");
}

#[test]
fn unmapped_required_column_fails_whole_import() {
    let (_workspace, mut sc) = setup();

    let resp = sc.request(
        "import.students",
        json!({
            "columns": ["student_id", "last_name", "first_name", "gender"],
            "rows": [ { "student_id": "S1", "last_name": "A", "first_name": "L", "gender": "F" } ]
        }),
    );
    assert_eq!(resp["ok"], false);
    assert_eq!(resp["error"]["code"], "validation_failed");
    assert_eq!(resp["error"]["message"], "missing required column: birth_date");

    let listed = sc.request_ok("students.list", json!({}));
    assert_eq!(listed["count"], 0);
}

#[test]
fn csv_file_import_applies_mapping_and_upserts() {
    let (workspace, mut sc) = setup();
    let csv = workspace.path().join("eleves.csv");
    std::fs::write(
        &csv,
        "\u{feff}Matricule,Nom,Prenom,Sexe,Naissance,Section\r\n\
         S1,Amrani,Lina,F,2011-02-03,A\r\n\
         S2,\"Ben Ali, Jr\",Karim,M,2010-09-12,B\r\n",
    )
    .expect("write csv");
    let mapping = json!({
        "student_id": "Matricule",
        "last_name": "Nom",
        "first_name": "Prenom",
        "gender": "Sexe",
        "birth_date": "Naissance",
        "section": "Section",
        "birth_place": "Lieu"
    });

    let first = sc.request_ok(
        "import.studentsFromFile",
        json!({ "path": csv.to_string_lossy(), "mapping": mapping }),
    );
    assert_eq!(first["summary"]["inserted"], 2);
    let s2 = sc.request_ok("students.get", json!({ "studentId": "S2" }));
    assert_eq!(s2["student"]["lastName"], "Ben Ali, Jr");

    std::fs::write(
        &csv,
        "Matricule,Nom,Prenom,Sexe,Naissance,Section\nS1,,,,,C\n",
    )
    .expect("rewrite csv");
    let second = sc.request_ok(
        "import.studentsFromFile",
        json!({ "path": csv.to_string_lossy(), "mapping": mapping }),
    );
    assert_eq!(second["summary"]["updated"], 1);
    let s1 = sc.request_ok("students.get", json!({ "studentId": "S1" }));
    assert_eq!(s1["student"]["section"], "C");
    assert_eq!(s1["student"]["lastName"], "Amrani");

    let xlsx = workspace.path().join("eleves.xlsx");
    std::fs::write(&xlsx, b"PK").expect("write xlsx");
    assert_eq!(
        sc.request_err(
            "import.studentsFromFile",
            json!({ "path": xlsx.to_string_lossy(), "mapping": mapping })
        ),
        "validation_failed"
    );
    assert_eq!(
        sc.request_err(
            "import.studentsFromFile",
            json!({ "path": workspace.path().join("missing.csv").to_string_lossy(), "mapping": mapping })
        ),
        "io_failed"
    );
}

#[test]
fn teacher_import_inserts_every_complete_row() {
    let (_workspace, mut sc) = setup();

    let result = sc.request_ok(
        "import.teachers",
        json!({
            "columns": ["last_name", "first_name", "gender", "specialization"],
            "rows": [
                { "last_name": "Haddad", "first_name": "Omar", "gender": "M", "specialization": "Physics" },
                { "last_name": "Haddad", "first_name": "Omar", "gender": "M" },
                { "last_name": "Saidi", "first_name": "Nora" }
            ]
        }),
    );
    assert_eq!(result["summary"]["succeeded"], 2);
    assert_eq!(result["summary"]["failed"], 1);
    let teachers = sc.request_ok("teachers.list", json!({}));
    assert_eq!(teachers["count"], 2);
}
