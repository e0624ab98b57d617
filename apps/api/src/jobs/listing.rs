//! Listing ranker: filters the catalog, orders it by recency and attaches freshness badges.
//!
//! Every function takes an explicit `now` so results are reproducible.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::jobs::models::JobPosting;

/// Hours within which a posting counts as new.
pub const NEW_WINDOW_HOURS: i64 = 24;
/// Hours within which a posting counts as fresh.
pub const FRESH_WINDOW_HOURS: i64 = 48;
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// All filters are optional and AND-combined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilters {
    /// Case-insensitive substring of the job location.
    pub location: Option<String>,
    /// Exact category.
    pub category: Option<String>,
    /// A job passes if any of these is a substring of any of its skills.
    pub skills: Vec<String>,
    /// Exact match on `is_remote`.
    pub remote: Option<bool>,
}

impl ListingFilters {
    pub fn matches(&self, job: &JobPosting) -> bool {
        if let Some(location) = &self.location {
            if !job.location.to_lowercase().contains(&location.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if job.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if !self.skills.is_empty() {
            let job_skills: Vec<String> = job.skills.iter().map(|s| s.to_lowercase()).collect();
            let any = self.skills.iter().any(|wanted| {
                let wanted = wanted.to_lowercase();
                job_skills.iter().any(|skill| skill.contains(&wanted))
            });
            if !any {
                return false;
            }
        }
        if let Some(remote) = self.remote {
            if job.is_remote != remote {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FreshnessIndicator {
    pub badge: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

impl FreshnessIndicator {
    pub const NEW: Self = Self {
        badge: "new",
        label: "New",
        color: "green",
    };
    pub const FRESH: Self = Self {
        badge: "fresh",
        label: "Fresh",
        color: "blue",
    };
}

/// A catalog entry annotated for display. The catalog record itself is never touched.
#[derive(Debug, Clone, Serialize)]
pub struct ListedJob {
    #[serde(flatten)]
    pub job: JobPosting,
    pub freshness_indicator: Option<FreshnessIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingMetadata {
    pub total_count: usize,
    pub new_jobs_count: usize,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingPage {
    pub jobs: Vec<ListedJob>,
    pub metadata: ListingMetadata,
}

/// Applies `filters`, sorts newest first (undated postings last) and annotates freshness.
pub fn rank<'a>(
    jobs: impl IntoIterator<Item = &'a JobPosting>,
    filters: &ListingFilters,
    now: DateTime<Utc>,
) -> ListingPage {
    let mut selected: Vec<&JobPosting> = jobs.into_iter().filter(|job| filters.matches(job)).collect();
    sort_newest_first(&mut selected);

    let new_jobs_count = new_jobs_count(selected.iter().copied(), NEW_WINDOW_HOURS, now);
    let jobs: Vec<ListedJob> = selected
        .into_iter()
        .map(|job| ListedJob {
            job: job.clone(),
            freshness_indicator: job.posted_date.and_then(|posted| freshness_indicator(posted, now)),
            age: None,
        })
        .collect();

    ListingPage {
        metadata: ListingMetadata {
            total_count: jobs.len(),
            new_jobs_count,
            last_updated: now,
        },
        jobs,
    }
}

fn sort_newest_first(jobs: &mut [&JobPosting]) {
    jobs.sort_by(|a, b| b.posted_date.cmp(&a.posted_date));
}

/// `new` under 24 hours, `fresh` under 48, otherwise nothing.
pub fn freshness_indicator(
    posted: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<FreshnessIndicator> {
    let elapsed = now - posted;
    if elapsed < Duration::hours(NEW_WINDOW_HOURS) {
        Some(FreshnessIndicator::NEW)
    } else if elapsed < Duration::hours(FRESH_WINDOW_HOURS) {
        Some(FreshnessIndicator::FRESH)
    } else {
        None
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n > 1 {
        format!("Posted {n} {unit}s ago")
    } else {
        format!("Posted {n} {unit} ago")
    }
}

/// Human-readable age, e.g. "Posted 3 days ago". Months are counted as 30 days.
pub fn job_age(posted: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let hours = (now - posted).num_hours();
    let days = hours / 24;
    if hours < 1 {
        "Posted less than an hour ago".to_string()
    } else if hours < 24 {
        plural(hours, "hour")
    } else if days < 7 {
        plural(days, "day")
    } else if days < 30 {
        plural(days / 7, "week")
    } else {
        plural(days / 30, "month")
    }
}

/// The `limit` newest postings with freshness and age attached.
pub fn most_recent(jobs: &[JobPosting], limit: usize, now: DateTime<Utc>) -> Vec<ListedJob> {
    let mut sorted: Vec<&JobPosting> = jobs.iter().collect();
    sort_newest_first(&mut sorted);
    sorted
        .into_iter()
        .take(limit)
        .map(|job| ListedJob {
            job: job.clone(),
            freshness_indicator: job.posted_date.and_then(|posted| freshness_indicator(posted, now)),
            age: job.posted_date.map(|posted| job_age(posted, now)),
        })
        .collect()
}

/// Postings dated at or after `now - hours`. Undated postings are excluded.
pub fn jobs_in_time_range<'a>(
    jobs: impl IntoIterator<Item = &'a JobPosting>,
    hours: i64,
    now: DateTime<Utc>,
) -> Vec<&'a JobPosting> {
    let cutoff = now - Duration::hours(hours);
    jobs.into_iter()
        .filter(|job| job.posted_date.is_some_and(|posted| posted >= cutoff))
        .collect()
}

pub fn new_jobs_count<'a>(
    jobs: impl IntoIterator<Item = &'a JobPosting>,
    hours: i64,
    now: DateTime<Utc>,
) -> usize {
    jobs_in_time_range(jobs, hours, now).len()
}
