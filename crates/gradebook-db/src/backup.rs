//! Flat-text backup format.
//!
//! One line per student, tab separated:
//! `ROLL\tNAME\tSUBJECT:SCORE, SUBJECT:SCORE\tAverage:VALUE`

use crate::model::{format_score, Student};

/// Render every student as a backup line, joined by `\n` with no trailing newline.
pub fn render_backup(students: &[Student]) -> String {
    students
        .iter()
        .map(backup_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn backup_line(student: &Student) -> String {
    let grades = if student.grades.is_empty() {
        "No grades".to_string()
    } else {
        student
            .grades
            .iter()
            .map(|(subject, score)| format!("{}:{}", subject, format_score(*score)))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let average = student
        .average()
        .map(format_score)
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "{}\t{}\t{}\tAverage:{}",
        student.roll_number, student.name, grades, average
    )
}
