//! Student snapshots and the value rules shared by every front end.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Subject name to score, keyed by normalized subject.
pub type GradeMap = BTreeMap<String, f64>;

/// A student read back from the store, with all of their grades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub name: String,
    pub roll_number: String,
    pub grades: GradeMap,
}

impl Student {
    /// Mean of all scores rounded to two decimals, `None` with no grades.
    pub fn average(&self) -> Option<f64> {
        mean(self.grades.values().copied())
    }
}

/// Highest scorer in a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topper {
    pub name: String,
    pub roll_number: String,
    pub score: f64,
}

/// Trim and title-case a subject: the first letter of every run of letters is
/// upper case, the rest lower case.
pub fn normalize_subject(subject: &str) -> String {
    let mut normalized = String::with_capacity(subject.len());
    let mut prev_is_letter = false;

    for c in subject.trim().chars() {
        if prev_is_letter {
            normalized.extend(c.to_lowercase());
        } else {
            normalized.extend(c.to_uppercase());
        }
        prev_is_letter = c.is_alphabetic();
    }

    normalized
}

/// Reject scores that are not finite numbers inside `[0, 100]`.
pub fn validate_score(score: f64) -> Result<f64, StoreError> {
    if !score.is_finite() {
        return Err(StoreError::InvalidScore("Score must be a number".to_string()));
    }
    if !(0.0..=100.0).contains(&score) {
        return Err(StoreError::InvalidScore(
            "Score must be between 0 and 100".to_string(),
        ));
    }
    Ok(score)
}

/// Parse user-entered text into a validated score.
pub fn parse_score(raw: &str) -> Result<f64, StoreError> {
    let score: f64 = raw
        .trim()
        .parse()
        .map_err(|_| StoreError::InvalidScore("Score must be a number".to_string()))?;
    validate_score(score)
}

/// Round to two decimals, sending exact ties to the even digit.
///
/// Works on the exact binary value, so `2.675` (stored just below) becomes
/// `2.67` and `82.125` (stored exactly) becomes `82.12`.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Render a score the way the backup file expects: integral values keep one
/// decimal place (`90.0`), everything else uses the shortest exact form.
pub fn format_score(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Arithmetic mean rounded with [`round2`], `None` for no scores.
pub(crate) fn mean(scores: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = scores.fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));
    if count == 0 {
        None
    } else {
        Some(round2(sum / count as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_subject() {
        assert_eq!(normalize_subject("math"), "Math");
        assert_eq!(normalize_subject("  MATH "), "Math");
        assert_eq!(normalize_subject("computer science"), "Computer Science");
        assert_eq!(normalize_subject("o'neil studies"), "O'Neil Studies");
        assert_eq!(normalize_subject("3d art"), "3D Art");
        assert_eq!(normalize_subject(""), "");
    }

    #[test]
    fn test_validate_score_bounds() {
        assert_eq!(validate_score(0.0).unwrap(), 0.0);
        assert_eq!(validate_score(100.0).unwrap(), 100.0);
        assert!(validate_score(-1.0).is_err());
        assert!(validate_score(105.0).is_err());
        assert!(validate_score(f64::NAN).is_err());
        assert!(validate_score(f64::INFINITY).is_err());
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score(" 87.5 ").unwrap(), 87.5);

        let err = parse_score("eighty").unwrap_err();
        assert_eq!(err.to_string(), "Score must be a number");
        assert!(err.is_invalid_input());

        let err = parse_score("101").unwrap_err();
        assert_eq!(err.to_string(), "Score must be between 0 and 100");
    }

    #[test]
    fn test_round2_ties_to_even() {
        assert_eq!(round2(82.125), 82.12);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(83.333333), 83.33);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(90.0), 90.0);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(90.0), "90.0");
        assert_eq!(format_score(0.0), "0.0");
        assert_eq!(format_score(87.5), "87.5");
        assert_eq!(format_score(83.33), "83.33");
    }

    #[test]
    fn test_student_serializes_camel_case() {
        let student = Student {
            name: "Alice".to_string(),
            roll_number: "R1".to_string(),
            grades: GradeMap::from([("Math".to_string(), 90.0)]),
        };
        let json = serde_json::to_value(&student).unwrap();
        assert_eq!(json["rollNumber"], "R1");
        assert_eq!(json["grades"]["Math"], 90.0);
    }

    #[test]
    fn test_student_average() {
        let mut student = Student {
            name: "Alice".to_string(),
            roll_number: "R1".to_string(),
            grades: GradeMap::new(),
        };
        assert_eq!(student.average(), None);

        student.grades.insert("A".to_string(), 80.0);
        student.grades.insert("B".to_string(), 90.0);
        student.grades.insert("C".to_string(), 80.0);
        assert_eq!(student.average(), Some(83.33));
    }
}
