//! Interactive menu for gradebook.
//!
//! Prompts for each operation in a loop until the user picks Exit.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Select};

use gradebook_db::{Database, StoreError};

use crate::students::{
    parse_grade_pairs, print_average, print_class_average, print_student_detail, print_topper,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    AddStudent,
    AddGrades,
    ViewStudent,
    StudentAverage,
    SubjectTopper,
    ClassAverage,
    ListStudents,
    SaveBackup,
    Exit,
}

impl MenuItem {
    const ALL: [MenuItem; 9] = [
        MenuItem::AddStudent,
        MenuItem::AddGrades,
        MenuItem::ViewStudent,
        MenuItem::StudentAverage,
        MenuItem::SubjectTopper,
        MenuItem::ClassAverage,
        MenuItem::ListStudents,
        MenuItem::SaveBackup,
        MenuItem::Exit,
    ];

    fn label(self) -> &'static str {
        match self {
            MenuItem::AddStudent => "Add student",
            MenuItem::AddGrades => "Add/Update grades",
            MenuItem::ViewStudent => "View student details",
            MenuItem::StudentAverage => "Calculate student's average",
            MenuItem::SubjectTopper => "Subject-wise topper",
            MenuItem::ClassAverage => "Class average for subject",
            MenuItem::ListStudents => "List all students",
            MenuItem::SaveBackup => "Save local backup",
            MenuItem::Exit => "Exit",
        }
    }
}

pub fn run_menu(db: &Database, backup_path: &Path) -> Result<()> {
    let labels: Vec<&str> = MenuItem::ALL.iter().map(|item| item.label()).collect();

    loop {
        eprintln!();
        let selection = Select::new()
            .with_prompt("Student Performance Tracker")
            .items(&labels)
            .default(0)
            .interact()?;

        let item = MenuItem::ALL[selection];
        if item == MenuItem::Exit {
            eprintln!("Goodbye!");
            return Ok(());
        }

        match run_item(db, item, backup_path) {
            Ok(()) => {}
            Err(e) => match e.downcast_ref::<StoreError>() {
                Some(store_err) if store_err.is_invalid_input() => {
                    eprintln!("{} {}", "✗".bright_red(), store_err);
                }
                _ => return Err(e),
            },
        }
    }
}

fn run_item(db: &Database, item: MenuItem, backup_path: &Path) -> Result<()> {
    match item {
        MenuItem::AddStudent => {
            let name = prompt("Name")?;
            let roll = prompt("Roll number")?;
            if db.records()?.add_student(&name, &roll)? {
                eprintln!("{} Added.", "✓".bright_green());
            } else {
                eprintln!("{} Roll number already exists.", "✗".bright_red());
            }
        }
        MenuItem::AddGrades => {
            let roll = prompt("Roll number")?;
            eprintln!(
                "{}",
                "Enter grades as Subject:Score (e.g., Math:85), comma-separated.".dimmed()
            );
            let grades = parse_grade_pairs(&prompt("Grades")?)?;
            let (ok, message) = db.records()?.add_grades(&roll, &grades)?;
            if ok {
                eprintln!("{} {}", "✓".bright_green(), message);
            } else {
                eprintln!("{} {}", "✗".bright_red(), message);
            }
        }
        MenuItem::ViewStudent => {
            let roll = prompt("Roll number")?;
            match db.records()?.view_student_details(&roll)? {
                Some(student) => print_student_detail(&student),
                None => eprintln!("{} Student not found.", "✗".bright_red()),
            }
        }
        MenuItem::StudentAverage => {
            let roll = prompt("Roll number")?;
            print_average(db.records()?.calculate_average(&roll)?);
        }
        MenuItem::SubjectTopper => {
            let subject = prompt("Subject")?;
            let topper = db.records()?.subject_topper(&subject)?;
            print_topper(&subject, topper.as_ref());
        }
        MenuItem::ClassAverage => {
            let subject = prompt("Subject")?;
            print_class_average(&subject, db.records()?.class_average(&subject)?);
        }
        MenuItem::ListStudents => {
            let students = db.records()?.list_students()?;
            if students.is_empty() {
                eprintln!("{}", "No students yet.".dimmed());
            }
            for s in &students {
                println!("{} - {} ({} subjects)", s.roll_number, s.name, s.grades.len());
            }
        }
        MenuItem::SaveBackup => {
            let path = db.records()?.save_backup(backup_path)?;
            eprintln!("{} Backup saved to {}", "✓".bright_green(), path.display());
        }
        MenuItem::Exit => {}
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    let value: String = Input::new().with_prompt(label).interact_text()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_lists_every_operation_once() {
        let labels: Vec<&str> = MenuItem::ALL.iter().map(|i| i.label()).collect();
        assert_eq!(labels.len(), 9);
        assert_eq!(labels[0], "Add student");
        assert_eq!(labels[8], "Exit");

        let mut unique = labels.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), labels.len());
    }
}
