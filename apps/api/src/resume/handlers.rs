//! Axum route handlers for the Résumé API.

use axum::{extract::Multipart, Json};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::resume::extract::extract_text;
use crate::resume::models::CandidateProfile;
use crate::resume::parser::parse_resume;

#[derive(Debug, Deserialize)]
pub struct ParseResumeRequest {
    pub raw_text: String,
}

/// POST /api/v1/resumes/parse
///
/// Parses pasted résumé text. The response carries masked contacts only.
pub async fn handle_parse_resume(
    Json(request): Json<ParseResumeRequest>,
) -> Result<Json<CandidateProfile>, AppError> {
    let profile = parse_resume(&request.raw_text)?;
    Ok(Json(profile))
}

/// POST /api/v1/resumes/upload
///
/// Accepts a multipart `file` field (PDF or plain text), extracts its text and parses it.
pub async fn handle_upload_resume(
    mut multipart: Multipart,
) -> Result<Json<CandidateProfile>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes: Bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read upload: {e}")))?;

        info!(
            file_name = file_name.as_deref().unwrap_or("<unnamed>"),
            size = bytes.len(),
            "extracting resume upload"
        );

        let text = tokio::task::spawn_blocking(move || {
            extract_text(file_name.as_deref(), content_type.as_deref(), &bytes)
        })
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

        let profile = parse_resume(&text)?;
        return Ok(Json(profile));
    }

    Err(AppError::MissingInput(
        "multipart body must contain a 'file' field".to_string(),
    ))
}
