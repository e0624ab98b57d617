//! Job sources: the fetch capability behind every registered feed.
//!
//! `JobSource` is the seam: the aggregator only ever sees `Arc<dyn JobSource>`, so HTTP feeds,
//! JSON files and test fakes are interchangeable.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;

use crate::config::SourceConfig;
use crate::jobs::models::RawPosting;

#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<RawPosting>>;
}

// ────────────────────────────────────────────────────────────────────────────
// HttpJobSource
// ────────────────────────────────────────────────────────────────────────────

/// Reads a JSON array of postings from an HTTP endpoint. Bodies larger than `max_bytes` are
/// refused, whether the server announces the length or streams it.
pub struct HttpJobSource {
    client: Client,
    url: String,
    max_bytes: u64,
}

impl HttpJobSource {
    pub fn new(url: impl Into<String>, timeout: Duration, max_bytes: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for job source")?;
        Ok(Self {
            client,
            url: url.into(),
            max_bytes,
        })
    }
}

#[async_trait]
impl JobSource for HttpJobSource {
    async fn fetch(&self) -> Result<Vec<RawPosting>> {
        let mut response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.url))?
            .error_for_status()
            .with_context(|| format!("GET {} returned an error status", self.url))?;

        if let Some(announced) = response.content_length() {
            ensure_feed_size(announced, self.max_bytes)
                .with_context(|| format!("GET {} refused", self.url))?;
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| format!("GET {} failed mid-body", self.url))?
        {
            ensure_feed_size((body.len() + chunk.len()) as u64, self.max_bytes)
                .with_context(|| format!("GET {} refused", self.url))?;
            body.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&body)
            .with_context(|| format!("GET {} returned malformed postings", self.url))
    }
}

fn ensure_feed_size(len: u64, max_bytes: u64) -> Result<()> {
    if len > max_bytes {
        bail!("feed body of {len} bytes exceeds the {max_bytes} byte limit");
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// FileJobSource
// ────────────────────────────────────────────────────────────────────────────

/// Reads a JSON array of postings from disk on every fetch.
pub struct FileJobSource {
    path: PathBuf,
}

impl FileJobSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl JobSource for FileJobSource {
    async fn fetch(&self) -> Result<Vec<RawPosting>> {
        let body = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        serde_json::from_str(&body)
            .with_context(|| format!("{} is not a JSON array of postings", self.path.display()))
    }
}

/// Builds the fetcher for a configured source: URLs become HTTP feeds, anything else a file.
pub fn build_source(
    config: &SourceConfig,
    timeout: Duration,
    max_feed_bytes: u64,
) -> Result<Arc<dyn JobSource>> {
    let location = config.location.as_str();
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Arc::new(HttpJobSource::new(location, timeout, max_feed_bytes)?))
    } else {
        Ok(Arc::new(FileJobSource::new(location)))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Registration records
// ────────────────────────────────────────────────────────────────────────────

/// A registration request. Every field is required; missing ones are rejected by the aggregator.
#[derive(Clone, Default)]
pub struct NewSource {
    pub name: String,
    pub fetcher: Option<Arc<dyn JobSource>>,
    pub refresh_interval_hours: Option<f64>,
}

impl NewSource {
    pub fn new(
        name: impl Into<String>,
        fetcher: Arc<dyn JobSource>,
        refresh_interval_hours: f64,
    ) -> Self {
        Self {
            name: name.into(),
            fetcher: Some(fetcher),
            refresh_interval_hours: Some(refresh_interval_hours),
        }
    }
}

/// A registered source and its sync bookkeeping. Only the aggregator mutates it.
pub struct SourceRegistration {
    pub(crate) name: String,
    pub(crate) fetcher: Arc<dyn JobSource>,
    pub(crate) refresh_interval_hours: f64,
    pub(crate) last_sync_at: Option<DateTime<Utc>>,
    pub(crate) total_jobs_last_sync: usize,
    pub(crate) last_error: Option<String>,
}

impl SourceRegistration {
    /// Never-synced sources are always due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_sync_at {
            None => true,
            Some(last) => {
                let elapsed_hours = (now - last).num_seconds() as f64 / 3600.0;
                elapsed_hours >= self.refresh_interval_hours
            }
        }
    }

    pub fn stats(&self) -> SourceStats {
        SourceStats {
            name: self.name.clone(),
            last_sync_at: self.last_sync_at,
            total_jobs_last_sync: self.total_jobs_last_sync,
            refresh_interval_hours: self.refresh_interval_hours,
            last_error: self.last_error.clone(),
        }
    }
}

impl std::fmt::Debug for SourceRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistration")
            .field("name", &self.name)
            .field("refresh_interval_hours", &self.refresh_interval_hours)
            .field("last_sync_at", &self.last_sync_at)
            .field("total_jobs_last_sync", &self.total_jobs_last_sync)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStats {
    pub name: String,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub total_jobs_last_sync: usize,
    pub refresh_interval_hours: f64,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn registration(last_sync_at: Option<DateTime<Utc>>, hours: f64) -> SourceRegistration {
        SourceRegistration {
            name: "linkedin".to_string(),
            fetcher: Arc::new(FileJobSource::new("/nonexistent")),
            refresh_interval_hours: hours,
            last_sync_at,
            total_jobs_last_sync: 0,
            last_error: None,
        }
    }

    #[tokio::test]
    async fn test_file_source_reads_postings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": 1, "title": "Data Scientist", "company": "Company A", "location": "Bangalore"}}]"#
        )
        .unwrap();

        let postings = FileJobSource::new(file.path()).fetch().await.unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].title, "Data Scientist");
    }

    #[tokio::test]
    async fn test_file_source_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileJobSource::new(dir.path().join("missing.json"));
        assert!(source.fetch().await.is_err());
    }

    #[tokio::test]
    async fn test_file_source_malformed_json_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(FileJobSource::new(file.path()).fetch().await.is_err());
    }

    #[test]
    fn test_build_source_accepts_urls_and_paths() {
        let timeout = Duration::from_secs(5);
        let http = SourceConfig {
            name: "feed".to_string(),
            location: "https://feeds.example.com/jobs.json".to_string(),
            refresh_interval_hours: 6.0,
        };
        let file = SourceConfig {
            location: "./jobs.json".to_string(),
            ..http.clone()
        };
        assert!(build_source(&http, timeout, 1024).is_ok());
        assert!(build_source(&file, timeout, 1024).is_ok());
    }

    #[test]
    fn test_feed_size_limit_is_inclusive() {
        assert!(ensure_feed_size(1024, 1024).is_ok());
        assert!(ensure_feed_size(1025, 1024).is_err());
    }

    /// Serves `body` once per request on a loopback port and returns the feed URL.
    async fn serve_feed(body: String) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().route(
            "/jobs.json",
            axum::routing::get(move || {
                let body = body.clone();
                async move { body }
            }),
        );
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}/jobs.json")
    }

    #[tokio::test]
    async fn test_http_source_reads_feed_within_limit() {
        let url = serve_feed(
            r#"[{"id": 7, "title": "ML Engineer", "company": "Company C", "location": "Pune"}]"#
                .to_string(),
        )
        .await;
        let source = HttpJobSource::new(url, Duration::from_secs(5), 4096).unwrap();

        let postings = source.fetch().await.unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].title, "ML Engineer");
    }

    #[tokio::test]
    async fn test_http_source_refuses_oversized_feed() {
        let padding = "x".repeat(512);
        let url = serve_feed(format!(
            r#"[{{"title": "Job", "company": "Co", "location": "City", "description": "{padding}"}}]"#
        ))
        .await;
        let source = HttpJobSource::new(url, Duration::from_secs(5), 128).unwrap();

        let err = source.fetch().await.unwrap_err();
        assert!(format!("{err:#}").contains("exceeds the 128 byte limit"));
    }

    #[test]
    fn test_never_synced_source_is_due() {
        assert!(registration(None, 6.0).is_due(Utc::now()));
    }

    #[test]
    fn test_due_after_refresh_interval() {
        let now = Utc::now();
        let source = registration(Some(now - chrono::Duration::hours(5)), 6.0);
        assert!(!source.is_due(now));
        assert!(source.is_due(now + chrono::Duration::hours(1)));
    }
}
