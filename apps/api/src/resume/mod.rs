// Résumé ingestion: text extraction, rule-based parsing, contact masking.
// No network or storage access here; handlers are the only async entry points.

pub mod extract;
pub mod handlers;
pub mod masking;
pub mod models;
pub mod parser;
pub mod rules;
pub mod vocabulary;
