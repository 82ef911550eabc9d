use super::recruitment_handlers as handlers;
use crate::state::AppState;
use axum::{routing::post, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/create-job", post(handlers::create_job))
        .route("/edit-job", post(handlers::edit_job))
        .route("/get-jobs", post(handlers::get_jobs))
        .route("/get-job", post(handlers::get_job))
        .route("/remove-job", post(handlers::remove_job))
        .route("/create-detail-job", post(handlers::create_detail_job))
        .route("/update-detail-job", post(handlers::update_detail_job))
        .route("/upload-detail-job-file", post(handlers::upload_detail_job_file))
        .route("/get-detail-job-file", post(handlers::get_detail_job_file))
        .route("/remove-detail-job-file", post(handlers::remove_detail_job_file))
        .route("/create-cv", post(handlers::create_cv))
        .route("/get-cvs", post(handlers::get_cvs))
        .route("/get-cv", post(handlers::get_cv))
        .route("/update-cv", post(handlers::update_cv))
        .route("/remove-cv", post(handlers::remove_cv))
        .route("/create-cv-comment", post(handlers::create_cv_comment))
        .route("/edit-cv-comment", post(handlers::edit_cv_comment))
        .route("/get-cv-comments", post(handlers::get_cv_comments))
        .route("/remove-cv-comment", post(handlers::remove_cv_comment))
        .route("/create-log-cv-status", post(handlers::create_log_cv_status))
        .route("/get-log-cv-status", post(handlers::get_log_cv_status))
        .route("/statistic-cv-by-status", post(handlers::statistic_cv_by_status))
}
