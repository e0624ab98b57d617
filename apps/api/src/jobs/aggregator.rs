//! Job Aggregator: owned store for registered sources and the unified catalog.
//!
//! A sync runs in three steps: plan the fetches under a read lock, fetch with no catalog lock
//! held, then apply every result under one short write lock. `SharedAggregator` wraps the store
//! for the service; its sync guard keeps two syncs from ever overlapping while readers carry on.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock, RwLockReadGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::models::{IdentityKey, JobPosting, RawPosting};
use crate::jobs::sources::{JobSource, NewSource, SourceRegistration, SourceStats};

/// Outcome of one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub fetched: usize,
    pub unique: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed_sources: Vec<String>,
    pub catalog_size: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MergeOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// A fetch chosen while the catalog was readable. Carries its own handle to the fetcher so it
/// can run after the lock is released.
pub struct PendingFetch {
    name: String,
    fetcher: Arc<dyn JobSource>,
}

pub struct FetchResult {
    name: String,
    result: anyhow::Result<Vec<RawPosting>>,
}

#[derive(Debug, Default)]
pub struct JobAggregator {
    sources: Vec<SourceRegistration>,
    catalog: Vec<JobPosting>,
    /// Identity key → position in `catalog`. Entries are never removed, so positions are stable.
    index: HashMap<IdentityKey, usize>,
}

impl JobAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source. Fails with `InvalidSource` if the name, fetcher or a positive
    /// refresh interval is missing, or if the name is already taken.
    pub fn register(&mut self, source: NewSource) -> Result<(), AppError> {
        let name = source.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::InvalidSource("source name is required".to_string()));
        }
        let fetcher = source.fetcher.ok_or_else(|| {
            AppError::InvalidSource(format!("source '{name}' has no fetch capability"))
        })?;
        let refresh_interval_hours = source
            .refresh_interval_hours
            .filter(|h| h.is_finite() && *h > 0.0)
            .ok_or_else(|| {
                AppError::InvalidSource(format!(
                    "source '{name}' needs a positive refresh interval"
                ))
            })?;
        if self.sources.iter().any(|s| s.name == name) {
            return Err(AppError::InvalidSource(format!(
                "source '{name}' is already registered"
            )));
        }

        info!(source = %name, refresh_interval_hours, "registered job source");
        self.sources.push(SourceRegistration {
            name,
            fetcher,
            refresh_interval_hours,
            last_sync_at: None,
            total_jobs_last_sync: 0,
            last_error: None,
        });
        Ok(())
    }

    pub fn sources(&self) -> &[SourceRegistration] {
        &self.sources
    }

    pub fn source_stats(&self) -> Vec<SourceStats> {
        self.sources.iter().map(SourceRegistration::stats).collect()
    }

    pub fn jobs(&self) -> &[JobPosting] {
        &self.catalog
    }

    pub fn get(&self, id: Uuid) -> Option<&JobPosting> {
        self.catalog.iter().find(|job| job.id == id)
    }

    /// Fetches from every registered source, in registration order.
    pub async fn sync(&mut self) -> SyncReport {
        let fetched = fetch_all(self.plan(None)).await;
        self.apply(fetched, Utc::now())
    }

    /// Fetches only from sources whose refresh interval has elapsed at `now`.
    pub async fn sync_due(&mut self, now: DateTime<Utc>) -> SyncReport {
        let plan = self.plan(Some(now));
        if plan.is_empty() {
            return self.idle_report();
        }
        let fetched = fetch_all(plan).await;
        self.apply(fetched, now)
    }

    /// Sources to fetch, in registration order. `due_at` narrows to sources that are due then.
    pub fn plan(&self, due_at: Option<DateTime<Utc>>) -> Vec<PendingFetch> {
        self.sources
            .iter()
            .filter(|source| due_at.map_or(true, |now| source.is_due(now)))
            .map(|source| PendingFetch {
                name: source.name.clone(),
                fetcher: Arc::clone(&source.fetcher),
            })
            .collect()
    }

    /// Stores fetch results one source at a time, in the order given. Each source's batch is
    /// deduplicated on its own and then merged, so on a conflict the later source wins.
    ///
    /// A failing source is logged and skipped; its `last_sync_at` and job count are left as
    /// they were and the error is recorded on the registration.
    pub fn apply(&mut self, fetched: Vec<FetchResult>, now: DateTime<Utc>) -> SyncReport {
        let mut report = SyncReport::default();

        for FetchResult { name, result } in fetched {
            let Some(source) = self.sources.iter_mut().find(|s| s.name == name) else {
                continue;
            };
            match result {
                Ok(postings) => {
                    source.last_sync_at = Some(now);
                    source.total_jobs_last_sync = postings.len();
                    source.last_error = None;
                    debug!(source = %name, fetched = postings.len(), "source fetched");

                    let batch: Vec<RawPosting> = postings
                        .into_iter()
                        .map(|mut posting| {
                            posting.source = Some(name.clone());
                            posting
                        })
                        .collect();
                    report.fetched += batch.len();
                    let unique = remove_duplicates(batch);
                    report.unique += unique.len();

                    let outcome = self.process_and_store(unique);
                    report.inserted += outcome.inserted;
                    report.updated += outcome.updated;
                    report.unchanged += outcome.unchanged;
                }
                Err(e) => {
                    warn!(source = %name, error = %e, "error syncing job source");
                    source.last_error = Some(format!("{e:#}"));
                    report.failed_sources.push(name);
                }
            }
        }

        report.catalog_size = self.catalog.len();
        info!(
            fetched = report.fetched,
            inserted = report.inserted,
            updated = report.updated,
            failed = report.failed_sources.len(),
            catalog_size = report.catalog_size,
            "job sync complete"
        );
        report
    }

    fn idle_report(&self) -> SyncReport {
        SyncReport {
            catalog_size: self.catalog.len(),
            ..SyncReport::default()
        }
    }

    /// Merges an already-deduplicated batch into the catalog. An entry with the same identity
    /// key is shallow-merged (incoming fields win); anything else is appended.
    pub fn process_and_store(&mut self, postings: Vec<RawPosting>) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        for posting in postings {
            let key = posting.identity_key();
            match self.index.get(&key) {
                Some(&pos) => {
                    if self.catalog[pos].merge_from(posting) {
                        debug!(key = %key, "merged updated posting");
                        outcome.updated += 1;
                    } else {
                        outcome.unchanged += 1;
                    }
                }
                None => {
                    self.index.insert(key, self.catalog.len());
                    self.catalog.push(JobPosting::from_raw(posting));
                    outcome.inserted += 1;
                }
            }
        }
        outcome
    }
}

/// Runs planned fetches one after another, in plan order. Touches no catalog state.
pub async fn fetch_all(plan: Vec<PendingFetch>) -> Vec<FetchResult> {
    let mut results = Vec::with_capacity(plan.len());
    for PendingFetch { name, fetcher } in plan {
        let result = fetcher.fetch().await;
        results.push(FetchResult { name, result });
    }
    results
}

/// Keeps the first posting seen for each identity key, preserving batch order.
pub fn remove_duplicates(postings: Vec<RawPosting>) -> Vec<RawPosting> {
    let mut seen = HashSet::new();
    let before = postings.len();
    let unique: Vec<RawPosting> = postings
        .into_iter()
        .filter(|posting| seen.insert(posting.identity_key()))
        .collect();
    debug!(before, after = unique.len(), "removed duplicate postings");
    unique
}

/// The aggregator as the service shares it between handlers and the scheduler.
#[derive(Debug)]
pub struct SharedAggregator {
    catalog: RwLock<JobAggregator>,
    /// Held for a whole sync. Never held together with a catalog write.
    sync_guard: Mutex<()>,
}

impl SharedAggregator {
    pub fn new(aggregator: JobAggregator) -> Self {
        Self {
            catalog: RwLock::new(aggregator),
            sync_guard: Mutex::new(()),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, JobAggregator> {
        self.catalog.read().await
    }

    pub async fn sync(&self) -> SyncReport {
        self.run_sync(None).await
    }

    pub async fn sync_due(&self, now: DateTime<Utc>) -> SyncReport {
        self.run_sync(Some(now)).await
    }

    async fn run_sync(&self, due_at: Option<DateTime<Utc>>) -> SyncReport {
        let _in_flight = self.sync_guard.lock().await;

        let plan = self.catalog.read().await.plan(due_at);
        if plan.is_empty() && due_at.is_some() {
            return self.catalog.read().await.idle_report();
        }

        let fetched = fetch_all(plan).await;
        let now = due_at.unwrap_or_else(Utc::now);
        self.catalog.write().await.apply(fetched, now)
    }
}

/// Background loop: every `tick`, syncs whichever sources are due.
pub fn spawn_sync_scheduler(aggregator: Arc<SharedAggregator>, tick: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + tick, tick);
        loop {
            interval.tick().await;
            let report = aggregator.sync_due(Utc::now()).await;
            if !report.failed_sources.is_empty() {
                warn!(failed = ?report.failed_sources, "scheduled sync had failing sources");
            }
        }
    })
}
