pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::matching::handlers as matching;
use crate::resume::handlers as resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Résumé API
        .route("/api/v1/resumes/parse", post(resume::handle_parse_resume))
        .route(
            "/api/v1/resumes/upload",
            post(resume::handle_upload_resume).layer(upload_limit),
        )
        // Jobs API
        .route("/api/v1/jobs", get(jobs::handle_list_jobs))
        .route("/api/v1/jobs/recent", get(jobs::handle_recent_jobs))
        .route("/api/v1/jobs/search", post(jobs::handle_search_jobs))
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        // Match API
        .route("/api/v1/match", post(matching::handle_match))
        .route("/api/v1/match/rank", post(matching::handle_rank_catalog))
        // Sources API
        .route("/api/v1/sources", get(jobs::handle_list_sources))
        .route("/api/v1/sources/sync", post(jobs::handle_sync_sources))
        .with_state(state)
}
