// Job catalog: source registration, sync with dedup and merge, listing and candidate search.

pub mod aggregator;
pub mod handlers;
pub mod listing;
pub mod models;
pub mod search;
pub mod sources;
