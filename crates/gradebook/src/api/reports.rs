use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use gradebook_db::{normalize_subject, Topper};

use super::{store_error, AppState};

#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub subject: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectReport {
    pub subject: String,
    pub topper: Option<Topper>,
    pub class_average: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct BackupResponse {
    pub path: String,
}

pub async fn get_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<SubjectReport>, (StatusCode, String)> {
    let subject = params
        .subject
        .map(|s| normalize_subject(&s))
        .unwrap_or_default();

    if subject.is_empty() {
        return Ok(Json(SubjectReport {
            subject,
            topper: None,
            class_average: None,
        }));
    }

    let mut records = state.db.records().map_err(store_error)?;
    let topper = records.subject_topper(&subject).map_err(store_error)?;
    let class_average = records.class_average(&subject).map_err(store_error)?;

    Ok(Json(SubjectReport {
        subject,
        topper,
        class_average,
    }))
}

pub async fn save_backup(
    State(state): State<AppState>,
) -> Result<Json<BackupResponse>, (StatusCode, String)> {
    let path = state
        .db
        .records()
        .and_then(|mut r| r.save_backup(&state.backup_path))
        .map_err(store_error)?;

    Ok(Json(BackupResponse {
        path: path.display().to_string(),
    }))
}
