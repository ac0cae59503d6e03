use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use gradebook_db::{
    format_score, normalize_subject, parse_score, Database, Student, StoreError, Topper,
};

#[derive(Subcommand, Debug)]
pub enum RecordAction {
    /// Add a new student
    AddStudent {
        /// Student name
        name: String,

        /// Unique roll number
        roll_number: String,
    },

    /// Add or update grades for a student
    AddGrades {
        /// Roll number of the student
        roll_number: String,

        /// Comma-separated Subject:Score pairs, e.g. "Math:85, Science:90"
        grades: String,
    },

    /// Show a student's details and grades
    Show {
        roll_number: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a student's average score
    Average {
        roll_number: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the top scorer in a subject
    Topper {
        subject: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the class average for a subject
    ClassAverage {
        subject: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List all students
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save a flat-text backup of every student
    Backup {
        /// Output file (default: students_backup.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn handle_record_command(db: &Database, action: RecordAction, backup_path: &Path) -> Result<()> {
    let mut records = db.records()?;

    match action {
        RecordAction::AddStudent { name, roll_number } => {
            if records.add_student(&name, &roll_number)? {
                println!("{}", "Added.".bright_green());
            } else {
                anyhow::bail!("Roll number already exists.");
            }
        }
        RecordAction::AddGrades {
            roll_number,
            grades,
        } => {
            let grades = parse_grade_pairs(&grades)?;
            let (ok, message) = records.add_grades(&roll_number, &grades)?;
            if !ok {
                anyhow::bail!(message);
            }
            println!("{}", message.bright_green());
        }
        RecordAction::Show { roll_number, json } => {
            let Some(student) = records.view_student_details(&roll_number)? else {
                anyhow::bail!("Student not found.");
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&student)?);
            } else {
                print_student_detail(&student);
            }
        }
        RecordAction::Average { roll_number, json } => {
            let average = records.calculate_average(&roll_number)?;

            if json {
                let body = json!({ "rollNumber": roll_number.trim(), "average": average });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print_average(average);
            }
        }
        RecordAction::Topper { subject, json } => {
            let topper = records.subject_topper(&subject)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&topper)?);
            } else {
                print_topper(&subject, topper.as_ref());
            }
        }
        RecordAction::ClassAverage { subject, json } => {
            let average = records.class_average(&subject)?;

            if json {
                let body = json!({ "subject": normalize_subject(&subject), "average": average });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print_class_average(&subject, average);
            }
        }
        RecordAction::List { json } => {
            let students = records.list_students()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&students)?);
            } else if students.is_empty() {
                println!("{}", "No students yet.".dimmed());
            } else {
                print_students_table(&students);
            }
        }
        RecordAction::Backup { output } => {
            let target = output.as_deref().unwrap_or(backup_path);
            let path = records.save_backup(target)?;
            println!("Backup saved to {}", path.display().to_string().bright_cyan());
        }
    }

    Ok(())
}

/// Parse `Subject:Score` pairs separated by commas, keeping their order.
pub fn parse_grade_pairs(raw: &str) -> Result<Vec<(String, f64)>, StoreError> {
    let mut grades = Vec::new();

    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((subject, score)) = pair.split_once(':') else {
            return Err(StoreError::InvalidInput(format!(
                "Expected Subject:Score, got '{}'",
                pair
            )));
        };
        grades.push((subject.trim().to_string(), parse_score(score)?));
    }

    if grades.is_empty() {
        return Err(StoreError::InvalidInput("No grades given".to_string()));
    }

    Ok(grades)
}

pub fn print_student_detail(student: &Student) {
    println!(
        "{} - {}",
        student.roll_number.bright_cyan(),
        student.name.bold()
    );

    if student.grades.is_empty() {
        println!("  {}", "No grades yet.".dimmed());
        return;
    }

    for (subject, score) in &student.grades {
        println!("  {}: {}", subject, format_score(*score));
    }

    if let Some(average) = student.average() {
        println!("  {} {}", "Average:".dimmed(), format_score(average));
    }
}

pub fn print_average(average: Option<f64>) {
    match average {
        Some(avg) => println!("Average: {}", format_score(avg)),
        None => println!("{}", "No grades or student not found.".dimmed()),
    }
}

pub fn print_topper(subject: &str, topper: Option<&Topper>) {
    match topper {
        Some(t) => println!(
            "Topper in {}: {} ({}) - {}",
            normalize_subject(subject),
            t.name.bold(),
            t.roll_number,
            format_score(t.score)
        ),
        None => println!("{}", "No scores for that subject yet.".dimmed()),
    }
}

pub fn print_class_average(subject: &str, average: Option<f64>) {
    match average {
        Some(avg) => println!(
            "Class average in {}: {}",
            normalize_subject(subject),
            format_score(avg)
        ),
        None => println!("{}", "No scores yet.".dimmed()),
    }
}

pub fn print_students_table(students: &[Student]) {
    let roll_width = students
        .iter()
        .map(|s| s.roll_number.len())
        .max()
        .unwrap_or(0)
        .max("ROLL".len());

    println!(
        "{:<roll_width$}  {:<24}  {:>8}  {:>7}",
        "ROLL".bold(),
        "NAME".bold(),
        "SUBJECTS".bold(),
        "AVERAGE".bold(),
    );

    for student in students {
        let average = student
            .average()
            .map(format_score)
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "{:<roll_width$}  {:<24}  {:>8}  {:>7}",
            student.roll_number,
            student.name,
            student.grades.len(),
            average,
        );
    }
}
