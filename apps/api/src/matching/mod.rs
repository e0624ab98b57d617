// Match scoring between a candidate profile and catalog postings.

pub mod handlers;
pub mod scoring;
