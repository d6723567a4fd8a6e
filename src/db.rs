use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE_NAME: &str = "school.sqlite3";

/// Seeded disciplinary actions. Reports may register further names at runtime.
pub const ACTION_CATALOG: [&str; 5] = [
    "oral warning",
    "written warning",
    "reprimand",
    "referral to guidance committee",
    "parent summon",
];

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            student_id TEXT PRIMARY KEY,
            last_name TEXT NOT NULL,
            first_name TEXT NOT NULL,
            gender TEXT NOT NULL,
            birth_date TEXT NOT NULL,
            birth_judgment TEXT,
            birth_certificate_type TEXT,
            registration_year INTEGER,
            birth_certificate_number TEXT,
            birth_place TEXT,
            academic_year TEXT,
            section TEXT,
            class_number TEXT,
            study_system TEXT,
            registration_number INTEGER,
            registration_date TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now'))
        )",
        [],
    )?;
    ensure_students_classification_columns(conn)?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_name ON students(last_name, first_name)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_class ON students(academic_year, section, class_number)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS teachers(
            teacher_id INTEGER PRIMARY KEY AUTOINCREMENT,
            last_name TEXT NOT NULL,
            first_name TEXT NOT NULL,
            gender TEXT NOT NULL,
            birth_date TEXT,
            specialization TEXT,
            phone_number TEXT,
            email TEXT,
            address TEXT,
            hire_date TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now'))
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_teachers_name ON teachers(last_name, first_name)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_teachers_specialization ON teachers(specialization)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS staff(
            staff_id INTEGER PRIMARY KEY AUTOINCREMENT,
            last_name TEXT NOT NULL,
            first_name TEXT NOT NULL,
            gender TEXT NOT NULL,
            birth_date TEXT,
            job_title TEXT NOT NULL,
            phone_number TEXT,
            email TEXT,
            address TEXT,
            hire_date TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now'))
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_staff_name ON staff(last_name, first_name)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_staff_job ON staff(job_title)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS medical_certificates(
            certificate_id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            receipt_date TEXT NOT NULL,
            school_doctor_verified INTEGER NOT NULL DEFAULT 0,
            parent_delivered INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(student_id) REFERENCES students(student_id) ON DELETE CASCADE
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_certificates_student ON medical_certificates(student_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_certificates_dates ON medical_certificates(start_date, end_date)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS behavior_reports(
            report_id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id TEXT NOT NULL,
            reporter_name TEXT NOT NULL,
            reporter_role TEXT NOT NULL,
            specialization TEXT,
            report_date TEXT NOT NULL,
            report_time TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(student_id) REFERENCES students(student_id) ON DELETE CASCADE
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_reports_student ON behavior_reports(student_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_reports_date ON behavior_reports(report_date)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS actions(
            action_id INTEGER PRIMARY KEY AUTOINCREMENT,
            action_name TEXT NOT NULL UNIQUE
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS report_actions(
            report_id INTEGER NOT NULL,
            action_id INTEGER NOT NULL,
            PRIMARY KEY(report_id, action_id),
            FOREIGN KEY(report_id) REFERENCES behavior_reports(report_id) ON DELETE CASCADE,
            FOREIGN KEY(action_id) REFERENCES actions(action_id) ON DELETE CASCADE
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_report_actions_action ON report_actions(action_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS parent_summons(
            summon_id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id TEXT NOT NULL,
            parent_name TEXT NOT NULL,
            summoner_name TEXT NOT NULL,
            summon_date TEXT NOT NULL,
            summon_time TEXT NOT NULL,
            attended INTEGER NOT NULL DEFAULT 0,
            report_id INTEGER,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(student_id) REFERENCES students(student_id) ON DELETE CASCADE,
            FOREIGN KEY(report_id) REFERENCES behavior_reports(report_id) ON DELETE SET NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_summons_student ON parent_summons(student_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_summons_date ON parent_summons(summon_date)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_summons_attended ON parent_summons(attended)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_summons_report ON parent_summons(report_id)",
        [],
    )?;

    seed_action_catalog(conn)?;

    Ok(())
}

fn seed_action_catalog(conn: &Connection) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare("INSERT OR IGNORE INTO actions(action_name) VALUES(?)")?;
    for name in ACTION_CATALOG {
        stmt.execute([name])?;
    }
    Ok(())
}

// Workspaces created before classification fields were tracked only carry the
// identity columns. Add the missing ones; existing rows keep NULL.
fn ensure_students_classification_columns(conn: &Connection) -> rusqlite::Result<()> {
    for (column, decl) in [
        ("academic_year", "TEXT"),
        ("section", "TEXT"),
        ("class_number", "TEXT"),
        ("study_system", "TEXT"),
        ("registration_number", "INTEGER"),
        ("registration_date", "TEXT"),
    ] {
        if !table_has_column(conn, "students", column)? {
            conn.execute(
                &format!("ALTER TABLE students ADD COLUMN {} {}", column, decl),
                [],
            )?;
        }
    }
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
