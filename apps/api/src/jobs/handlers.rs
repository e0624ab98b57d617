//! Axum route handlers for the Jobs and Sources API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::aggregator::SyncReport;
use crate::jobs::listing::{
    most_recent, rank, ListedJob, ListingFilters, ListingPage, DEFAULT_RECENT_LIMIT,
};
use crate::jobs::models::JobPosting;
use crate::jobs::search::{search, SearchQuery, SearchResults};
use crate::jobs::sources::SourceStats;
use crate::resume::models::CandidateProfile;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListJobsQuery {
    pub location: Option<String>,
    pub category: Option<String>,
    /// Comma-separated.
    pub skills: Option<String>,
    pub remote: Option<bool>,
}

impl From<ListJobsQuery> for ListingFilters {
    fn from(query: ListJobsQuery) -> Self {
        ListingFilters {
            location: query.location.filter(|l| !l.trim().is_empty()),
            category: query.category.filter(|c| !c.trim().is_empty()),
            skills: query
                .skills
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            remote: query.remote,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecentJobsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub query: SearchQuery,
    /// When present, every hit is scored against this profile.
    #[serde(default)]
    pub profile: Option<CandidateProfile>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/jobs
///
/// Filtered catalog, newest first, with freshness badges and listing metadata.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<ListingPage>, AppError> {
    let filters = ListingFilters::from(query);
    let aggregator = state.aggregator.read().await;
    Ok(Json(rank(aggregator.jobs(), &filters, Utc::now())))
}

/// GET /api/v1/jobs/recent?limit=
pub async fn handle_recent_jobs(
    State(state): State<AppState>,
    Query(query): Query<RecentJobsQuery>,
) -> Result<Json<Vec<ListedJob>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let aggregator = state.aggregator.read().await;
    Ok(Json(most_recent(aggregator.jobs(), limit, Utc::now())))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPosting>, AppError> {
    let aggregator = state.aggregator.read().await;
    aggregator
        .get(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("job {id}")))
}

/// POST /api/v1/jobs/search
///
/// Candidate-facing search. Applies the configured company-rating floor.
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResults>, AppError> {
    if let Some(min) = request.query.min_rating {
        if !(0.0..=5.0).contains(&min) {
            return Err(AppError::Validation(
                "min_rating must be between 0 and 5".to_string(),
            ));
        }
    }

    let aggregator = state.aggregator.read().await;
    let results = search(
        aggregator.jobs(),
        &request.query,
        request.profile.as_ref(),
        state.scorer.as_ref(),
        state.config.min_company_rating,
        Utc::now(),
    );
    Ok(Json(results))
}

/// GET /api/v1/sources
pub async fn handle_list_sources(
    State(state): State<AppState>,
) -> Result<Json<Vec<SourceStats>>, AppError> {
    Ok(Json(state.aggregator.read().await.source_stats()))
}

/// POST /api/v1/sources/sync
///
/// Full sync of every source. Waits for any in-flight scheduled sync to finish first.
pub async fn handle_sync_sources(
    State(state): State<AppState>,
) -> Result<Json<SyncReport>, AppError> {
    let report = state.aggregator.sync().await;
    Ok(Json(report))
}
