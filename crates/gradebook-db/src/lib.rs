//! Database layer for gradebook.
//!
//! Provides a `Database` struct that owns the SQLite connection and hands out
//! a [`RecordStore`] for student and grade operations.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gradebook_db::Database;
//!
//! let db = Database::open_url("sqlite:///students.db")?;
//! db.records()?.add_student("Alice", "R1")?;
//!
//! db.records()?.add_grades("R1", &[("math".to_string(), 90.0)])?;
//!
//! assert_eq!(db.records()?.calculate_average("R1")?, Some(90.0));
//! ```

mod backup;
mod error;
mod model;
mod records;

pub use backup::render_backup;
pub use error::StoreError;
pub use model::{
    format_score, normalize_subject, parse_score, round2, validate_score, GradeMap, Student,
    Topper,
};
pub use records::{RecordStore, GRADES_SAVED, STUDENT_NOT_FOUND};

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The main database struct that owns the SQLite connection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the default location.
    ///
    /// The default location is `~/.local/share/gradebook/gradebook.db`.
    pub fn open() -> Result<Self, StoreError> {
        let db_path = Self::default_path();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        Self::open_at(&db_path)
    }

    /// Open or create a database at a specific path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    /// Open a database from a connection string.
    ///
    /// Accepted forms:
    /// - `sqlite::memory:`, `sqlite://` or `sqlite:///:memory:` for an in-memory database
    /// - `sqlite:///relative/path.db` and `sqlite:////absolute/path.db`
    /// - a plain file path
    pub fn open_url(url: &str) -> Result<Self, StoreError> {
        let url = url.trim();

        match url {
            "sqlite::memory:" | "sqlite://" | "sqlite:///:memory:" => {
                return Self::open_in_memory();
            }
            _ => {}
        }

        if let Some(path) = url.strip_prefix("sqlite:///") {
            return Self::open_at(Path::new(path));
        }

        if url.is_empty() || url.contains("://") {
            return Err(StoreError::UnsupportedUrl(url.to_string()));
        }

        Self::open_at(Path::new(url))
    }

    /// Get the default database path.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gradebook")
            .join("gradebook.db")
    }

    /// Access the record store.
    pub fn records(&self) -> Result<RecordStore<'_>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(RecordStore::new(conn))
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Initialize the database schema.
    fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS students (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                roll_number TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS grades (
                id INTEGER PRIMARY KEY,
                subject TEXT NOT NULL,
                score REAL NOT NULL,
                student_id INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
                CONSTRAINT uq_subject_per_student UNIQUE (subject, student_id)
            );

            CREATE INDEX IF NOT EXISTS idx_grades_subject ON grades(subject);
            "#,
        )
    }
}
