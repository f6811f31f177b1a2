//! Database schema and migrations.
//!
//! Migrations are applied in order; the schema_version table records which
//! ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: administrators
    r#"
CREATE TABLE admins (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    email           TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password        TEXT NOT NULL,           -- Argon2 hash
    name            TEXT NOT NULL,
    role            TEXT NOT NULL DEFAULT 'admin',
    last_activity   TEXT NOT NULL,
    is_active       INTEGER NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
"#,
    // v2: students, provisioned by administrators
    r#"
CREATE TABLE students (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id      TEXT NOT NULL UNIQUE,
    first_name      TEXT NOT NULL,
    last_name       TEXT NOT NULL,
    email           TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password        TEXT NOT NULL,           -- Argon2 hash
    phone           TEXT,
    date_of_birth   TEXT,
    enrollment_date TEXT NOT NULL,
    course          TEXT NOT NULL,
    batch           TEXT NOT NULL,
    is_active       INTEGER NOT NULL DEFAULT 1,
    last_activity   TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE INDEX idx_students_first_name ON students(first_name);
"#,
    // v3: attendance, one row per student and day
    r#"
CREATE TABLE attendance (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id  INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
    date        TEXT NOT NULL,
    status      TEXT NOT NULL CHECK (status IN ('present', 'absent', 'late')),
    reason      TEXT,
    marked_by   TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    UNIQUE (student_id, date)
);
"#,
    // v4: test results
    r#"
CREATE TABLE test_results (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id      INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
    test_number     INTEGER NOT NULL,
    test_name       TEXT NOT NULL,
    subject         TEXT NOT NULL,
    max_marks       INTEGER NOT NULL,
    obtained_marks  INTEGER NOT NULL,
    percentage      REAL NOT NULL,
    grade           TEXT NOT NULL,
    test_date       TEXT NOT NULL,
    remarks         TEXT,
    added_by        TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE INDEX idx_test_results_student_test ON test_results(student_id, test_number);
"#,
];
