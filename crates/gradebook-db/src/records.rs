//! Student and grade records.

use std::path::{Path, PathBuf};
use std::sync::MutexGuard;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::backup::render_backup;
use crate::model::{normalize_subject, round2, validate_score, GradeMap, Student, Topper};
use crate::StoreError;

pub const STUDENT_NOT_FOUND: &str = "Student not found";
pub const GRADES_SAVED: &str = "Grades saved";

/// Record store with a borrowed connection.
///
/// Every operation runs in its own transaction. Returning early or bailing out
/// with `?` drops the transaction, which rolls back anything written so far.
pub struct RecordStore<'db> {
    conn: MutexGuard<'db, Connection>,
}

struct StudentRow {
    id: i64,
    name: String,
    roll_number: String,
}

impl<'db> RecordStore<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Add a student. Returns `false` when the roll number is already taken.
    pub fn add_student(&mut self, name: &str, roll_number: &str) -> Result<bool, StoreError> {
        let name = name.trim();
        let roll_number = roll_number.trim();
        if name.is_empty() || roll_number.is_empty() {
            return Err(StoreError::InvalidInput(
                "Name and roll number are required".to_string(),
            ));
        }

        let tx = self.conn.transaction()?;
        if Self::find_student(&tx, roll_number)?.is_some() {
            debug!(roll_number, "roll number already exists");
            return Ok(false);
        }

        tx.execute(
            "INSERT INTO students (name, roll_number) VALUES (?1, ?2)",
            params![name, roll_number],
        )?;
        tx.commit()?;

        debug!(roll_number, "student added");
        Ok(true)
    }

    /// Insert or update grades for a student, keyed by normalized subject.
    ///
    /// Pairs are applied in order, so when two pairs normalize to the same
    /// subject the later score wins. All pairs are written in one transaction:
    /// an invalid score anywhere in `grades` leaves the student's grades untouched.
    pub fn add_grades(
        &mut self,
        roll_number: &str,
        grades: &[(String, f64)],
    ) -> Result<(bool, String), StoreError> {
        let tx = self.conn.transaction()?;
        let Some(student) = Self::find_student(&tx, roll_number.trim())? else {
            return Ok((false, STUDENT_NOT_FOUND.to_string()));
        };

        for (subject, score) in grades {
            let subject = normalize_subject(subject);
            if subject.is_empty() {
                return Err(StoreError::InvalidInput("Subject is required".to_string()));
            }
            let score = validate_score(*score)?;

            let updated = tx.execute(
                "UPDATE grades SET score = ?1 WHERE student_id = ?2 AND subject = ?3",
                params![score, student.id, subject],
            )?;
            if updated == 0 {
                tx.execute(
                    "INSERT INTO grades (subject, score, student_id) VALUES (?1, ?2, ?3)",
                    params![subject, score, student.id],
                )?;
            }
        }

        tx.commit()?;

        debug!(
            roll_number = %student.roll_number,
            count = grades.len(),
            "grades saved"
        );
        Ok((true, GRADES_SAVED.to_string()))
    }

    /// Snapshot of one student and their grades.
    pub fn view_student_details(
        &mut self,
        roll_number: &str,
    ) -> Result<Option<Student>, StoreError> {
        let tx = self.conn.transaction()?;
        let Some(row) = Self::find_student(&tx, roll_number.trim())? else {
            return Ok(None);
        };
        let grades = Self::grades_for(&tx, row.id)?;
        tx.commit()?;

        Ok(Some(Student {
            name: row.name,
            roll_number: row.roll_number,
            grades,
        }))
    }

    /// Mean score of a student, `None` for an unknown student or one without grades.
    pub fn calculate_average(&mut self, roll_number: &str) -> Result<Option<f64>, StoreError> {
        let tx = self.conn.transaction()?;
        let average: Option<f64> = tx.query_row(
            r#"
            SELECT AVG(g.score)
            FROM grades g
            JOIN students s ON s.id = g.student_id
            WHERE s.roll_number = ?1
            "#,
            params![roll_number.trim()],
            |row| row.get(0),
        )?;
        tx.commit()?;

        Ok(average.map(round2))
    }

    /// Highest score in a subject. Ties go to the smallest roll number.
    pub fn subject_topper(&mut self, subject: &str) -> Result<Option<Topper>, StoreError> {
        let subject = normalize_subject(subject);
        let tx = self.conn.transaction()?;
        let topper = tx
            .query_row(
                r#"
                SELECT s.name, s.roll_number, g.score
                FROM grades g
                JOIN students s ON s.id = g.student_id
                WHERE g.subject = ?1
                ORDER BY g.score DESC, s.roll_number ASC
                LIMIT 1
                "#,
                params![subject],
                |row| {
                    Ok(Topper {
                        name: row.get(0)?,
                        roll_number: row.get(1)?,
                        score: row.get(2)?,
                    })
                },
            )
            .optional()?;
        tx.commit()?;

        Ok(topper)
    }

    /// Mean of every score recorded for a subject.
    pub fn class_average(&mut self, subject: &str) -> Result<Option<f64>, StoreError> {
        let subject = normalize_subject(subject);
        let tx = self.conn.transaction()?;
        let average: Option<f64> = tx.query_row(
            "SELECT AVG(score) FROM grades WHERE subject = ?1",
            params![subject],
            |row| row.get(0),
        )?;
        tx.commit()?;

        Ok(average.map(round2))
    }

    /// Every student with their grades, in insertion order.
    pub fn list_students(&mut self) -> Result<Vec<Student>, StoreError> {
        let tx = self.conn.transaction()?;

        let rows = {
            let mut stmt = tx.prepare("SELECT id, name, roll_number FROM students ORDER BY id")?;
            let rows = stmt.query_map([], Self::row_to_student)?;

            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            out
        };

        let mut students = Vec::with_capacity(rows.len());
        for row in rows {
            let grades = Self::grades_for(&tx, row.id)?;
            students.push(Student {
                name: row.name,
                roll_number: row.roll_number,
                grades,
            });
        }
        tx.commit()?;

        Ok(students)
    }

    /// Write a flat-text backup of every student to `path`, replacing any
    /// existing file.
    pub fn save_backup(&mut self, path: impl AsRef<Path>) -> Result<PathBuf, StoreError> {
        let path = path.as_ref();
        let students = self.list_students()?;
        std::fs::write(path, render_backup(&students))?;

        info!(path = %path.display(), students = students.len(), "backup saved");
        Ok(path.to_path_buf())
    }

    fn find_student(conn: &Connection, roll_number: &str) -> Result<Option<StudentRow>, StoreError> {
        let row = conn
            .query_row(
                "SELECT id, name, roll_number FROM students WHERE roll_number = ?1",
                params![roll_number],
                Self::row_to_student,
            )
            .optional()?;
        Ok(row)
    }

    fn grades_for(conn: &Connection, student_id: i64) -> Result<GradeMap, StoreError> {
        let mut stmt =
            conn.prepare("SELECT subject, score FROM grades WHERE student_id = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![student_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?;

        let mut grades = GradeMap::new();
        for row in rows {
            let (subject, score) = row?;
            grades.insert(subject, score);
        }

        Ok(grades)
    }

    fn row_to_student(row: &rusqlite::Row) -> Result<StudentRow, rusqlite::Error> {
        Ok(StudentRow {
            id: row.get(0)?,
            name: row.get(1)?,
            roll_number: row.get(2)?,
        })
    }
}
