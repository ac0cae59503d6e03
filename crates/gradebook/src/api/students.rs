use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use gradebook_db::{parse_score, validate_score, Student, StoreError};

use super::{store_error, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudent {
    pub name: String,
    pub roll_number: String,
}

/// A score as submitted: JSON number or form-style text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ScoreInput {
    Number(f64),
    Text(String),
}

impl ScoreInput {
    fn into_score(self) -> Result<f64, StoreError> {
        match self {
            ScoreInput::Number(n) => validate_score(n),
            ScoreInput::Text(s) => parse_score(&s),
        }
    }
}

/// Grades keyed by subject, in the order the client sent them.
#[derive(Debug, Deserialize)]
pub struct GradesRequest {
    pub grades: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetail {
    #[serde(flatten)]
    pub student: Student,
    pub average: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<Student>>, (StatusCode, String)> {
    let students = state
        .db
        .records()
        .and_then(|mut r| r.list_students())
        .map_err(store_error)?;

    Ok(Json(students))
}

pub async fn create_student(
    State(state): State<AppState>,
    Json(body): Json<NewStudent>,
) -> Result<(StatusCode, Json<Student>), (StatusCode, String)> {
    let mut records = state.db.records().map_err(store_error)?;

    let added = records
        .add_student(&body.name, &body.roll_number)
        .map_err(store_error)?;
    if !added {
        return Err((
            StatusCode::CONFLICT,
            "Roll number already exists.".to_string(),
        ));
    }

    let student = records
        .view_student_details(&body.roll_number)
        .map_err(store_error)?
        .ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Student vanished after insert".to_string(),
            )
        })?;

    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn get_student(
    State(state): State<AppState>,
    Path(roll): Path<String>,
) -> Result<Json<StudentDetail>, (StatusCode, String)> {
    let mut records = state.db.records().map_err(store_error)?;

    let student = records
        .view_student_details(&roll)
        .map_err(store_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Student not found.".to_string()))?;
    let average = records.calculate_average(&roll).map_err(store_error)?;

    Ok(Json(StudentDetail { student, average }))
}

pub async fn add_grades(
    State(state): State<AppState>,
    Path(roll): Path<String>,
    Json(body): Json<GradesRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    let mut grades = Vec::with_capacity(body.grades.len());
    for (subject, value) in body.grades {
        let score = serde_json::from_value::<ScoreInput>(value)
            .map_err(|_| StoreError::InvalidScore("Score must be a number".to_string()))
            .and_then(ScoreInput::into_score)
            .map_err(store_error)?;
        grades.push((subject, score));
    }

    let (ok, message) = state
        .db
        .records()
        .and_then(|mut r| r.add_grades(&roll, &grades))
        .map_err(store_error)?;

    if !ok {
        return Err((StatusCode::NOT_FOUND, message));
    }

    Ok(Json(MessageResponse { message }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_state;

    fn new_student(name: &str, roll: &str) -> Json<NewStudent> {
        Json(NewStudent {
            name: name.to_string(),
            roll_number: roll.to_string(),
        })
    }

    fn grades_body(raw: &str) -> Json<GradesRequest> {
        Json(serde_json::from_str(raw).unwrap())
    }

    #[tokio::test]
    async fn test_create_and_list_students() {
        let state = test_state();

        let (status, Json(student)) = create_student(State(state.clone()), new_student("Alice", "R1"))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(student.roll_number, "R1");

        let Json(students) = list_students(State(state)).await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].name, "Alice");
    }

    #[tokio::test]
    async fn test_duplicate_and_blank_students() {
        let state = test_state();
        create_student(State(state.clone()), new_student("Alice", "R1"))
            .await
            .unwrap();

        let (status, _) = create_student(State(state.clone()), new_student("Bob", "R1"))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, message) = create_student(State(state), new_student("", "R2"))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Name and roll number are required");
    }

    #[tokio::test]
    async fn test_grades_and_detail() {
        let state = test_state();
        create_student(State(state.clone()), new_student("Alice", "R1"))
            .await
            .unwrap();

        let Json(saved) = add_grades(
            State(state.clone()),
            Path("R1".to_string()),
            grades_body(r#"{"grades": {"math": 80, "science": "90"}}"#),
        )
        .await
        .unwrap();
        assert_eq!(saved.message, "Grades saved");

        let Json(detail) = get_student(State(state), Path("R1".to_string()))
            .await
            .unwrap();
        assert_eq!(detail.student.grades.get("Math"), Some(&80.0));
        assert_eq!(detail.student.grades.get("Science"), Some(&90.0));
        assert_eq!(detail.average, Some(85.0));
    }

    #[tokio::test]
    async fn test_repeated_subject_keys_last_one_wins() {
        let state = test_state();
        create_student(State(state.clone()), new_student("Alice", "R1"))
            .await
            .unwrap();

        add_grades(
            State(state.clone()),
            Path("R1".to_string()),
            grades_body(r#"{"grades": {"math": 90, "Math": 85}}"#),
        )
        .await
        .unwrap();

        let Json(detail) = get_student(State(state), Path("R1".to_string()))
            .await
            .unwrap();
        assert_eq!(detail.student.grades.len(), 1);
        assert_eq!(detail.student.grades.get("Math"), Some(&85.0));
    }

    #[tokio::test]
    async fn test_invalid_grades_are_bad_requests() {
        let state = test_state();
        create_student(State(state.clone()), new_student("Alice", "R1"))
            .await
            .unwrap();

        let (status, message) = add_grades(
            State(state.clone()),
            Path("R1".to_string()),
            grades_body(r#"{"grades": {"math": "ninety"}}"#),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Score must be a number");

        let (status, _) = add_grades(
            State(state.clone()),
            Path("R1".to_string()),
            grades_body(r#"{"grades": {"math": 105}}"#),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, message) = add_grades(
            State(state.clone()),
            Path("R1".to_string()),
            grades_body(r#"{"grades": {"math": true}}"#),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Score must be a number");

        let Json(detail) = get_student(State(state), Path("R1".to_string()))
            .await
            .unwrap();
        assert!(detail.student.grades.is_empty());
        assert_eq!(detail.average, None);
    }

    #[tokio::test]
    async fn test_unknown_student_is_not_found() {
        let state = test_state();

        let (status, _) = get_student(State(state.clone()), Path("R404".to_string()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, message) = add_grades(
            State(state),
            Path("R404".to_string()),
            grades_body(r#"{"grades": {"math": 50}}"#),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "Student not found");
    }
}
