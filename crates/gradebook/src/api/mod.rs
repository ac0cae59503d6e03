mod reports;
mod students;

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use gradebook_db::{Database, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub backup_path: PathBuf,
}

pub fn create_router(db: Arc<Database>, backup_path: PathBuf) -> Router {
    let state = AppState { db, backup_path };

    Router::new()
        .route(
            "/api/students",
            get(students::list_students).post(students::create_student),
        )
        .route("/api/students/{roll}", get(students::get_student))
        .route("/api/students/{roll}/grades", post(students::add_grades))
        .route("/api/reports", get(reports::get_report))
        .route("/api/backup", post(reports::save_backup))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Map store failures onto HTTP status codes.
fn store_error(e: StoreError) -> (StatusCode, String) {
    if e.is_invalid_input() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else {
        tracing::error!(error = %e, "record store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

#[cfg(test)]
fn test_state() -> AppState {
    AppState {
        db: Arc::new(Database::open_in_memory().unwrap()),
        backup_path: PathBuf::from("students_backup.txt"),
    }
}
