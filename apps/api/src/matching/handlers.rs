//! Axum route handlers for the Match API.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::jobs::models::JobPosting;
use crate::matching::scoring::{rank_jobs, MatchResult, ScoredJob};
use crate::resume::models::CandidateProfile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    #[serde(default)]
    pub profile: Option<CandidateProfile>,
    #[serde(default)]
    pub job: Option<JobPosting>,
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    #[serde(default)]
    pub profile: Option<CandidateProfile>,
}

/// POST /api/v1/match
///
/// Scores one profile against one job. Both are required.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResult>, AppError> {
    let (Some(profile), Some(job)) = (request.profile, request.job) else {
        return Err(AppError::MissingInput(
            "both profile and job are required".to_string(),
        ));
    };
    Ok(Json(state.scorer.score(&profile, &job)))
}

/// POST /api/v1/match/rank
///
/// Scores the whole catalog for a profile, best match first.
pub async fn handle_rank_catalog(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> Result<Json<Vec<ScoredJob>>, AppError> {
    let profile = request
        .profile
        .ok_or_else(|| AppError::MissingInput("profile is required".to_string()))?;

    let aggregator = state.aggregator.read().await;
    let ranked = rank_jobs(state.scorer.as_ref(), &profile, aggregator.jobs());
    Ok(Json(ranked))
}
