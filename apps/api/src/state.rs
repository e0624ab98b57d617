use std::sync::Arc;

use crate::config::Config;
use crate::jobs::aggregator::{JobAggregator, SharedAggregator};
use crate::matching::scoring::MatchScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Catalog and source registry. Reads never wait on an in-flight fetch.
    pub aggregator: Arc<SharedAggregator>,
    /// Pluggable match scorer. Default: KeywordMatchScorer.
    pub scorer: Arc<dyn MatchScorer>,
}

impl AppState {
    pub fn new(config: Config, aggregator: JobAggregator, scorer: Arc<dyn MatchScorer>) -> Self {
        Self {
            config,
            aggregator: Arc::new(SharedAggregator::new(aggregator)),
            scorer,
        }
    }
}
