//! Fixed term vocabularies used by the résumé extractors.
//!
//! A `Vocabulary` is a tagged, enumerable constant set. Matching goes through its methods, so
//! callers never depend on how the terms are stored.

use serde::Serialize;
use tracing::trace;

/// What a vocabulary enumerates. Carried for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyKind {
    TechnicalSkill,
    Certification,
    Role,
    Degree,
    City,
}

/// An ordered, immutable set of lower-case ASCII terms.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    kind: VocabularyKind,
    terms: &'static [&'static str],
}

impl Vocabulary {
    pub const fn new(kind: VocabularyKind, terms: &'static [&'static str]) -> Self {
        Self { kind, terms }
    }

    pub fn terms(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.terms.iter().copied()
    }

    /// Every term that occurs in `text` (case-insensitive substring), in vocabulary order.
    pub fn terms_in(&self, text: &str) -> Vec<&'static str> {
        let haystack = text.to_ascii_lowercase();
        let found: Vec<&'static str> = self
            .terms()
            .filter(|term| haystack.contains(term))
            .collect();
        trace!(kind = ?self.kind, found = found.len(), "vocabulary scan");
        found
    }

    /// For each term that occurs in `text`, the first occurrence as written in `text`,
    /// in vocabulary order.
    pub fn occurrences_in<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let haystack = text.to_ascii_lowercase();
        self.terms()
            .filter_map(|term| slice_at(text, &haystack, term))
            .collect()
    }

    /// The leftmost occurrence of any term in `text`, as written in `text`.
    /// Ties at the same offset go to the earlier vocabulary term.
    pub fn leftmost_in<'t>(&self, text: &'t str) -> Option<&'t str> {
        let haystack = text.to_ascii_lowercase();
        self.terms()
            .filter_map(|term| haystack.find(term).map(|pos| (pos, term.len())))
            .min_by_key(|(pos, _)| *pos)
            .map(|(pos, len)| &text[pos..pos + len])
    }
}

// ASCII lowercasing keeps byte offsets identical, so offsets found in `haystack` slice `text`.
fn slice_at<'t>(text: &'t str, haystack: &str, term: &str) -> Option<&'t str> {
    haystack.find(term).map(|pos| &text[pos..pos + term.len()])
}

pub const TECHNICAL_SKILLS: Vocabulary = Vocabulary::new(
    VocabularyKind::TechnicalSkill,
    &[
        // languages
        "python",
        "r",
        "sql",
        "java",
        "scala",
        "javascript",
        "typescript",
        // machine learning and data science
        "machine learning",
        "deep learning",
        "tensorflow",
        "pytorch",
        "scikit-learn",
        "pandas",
        "numpy",
        "matplotlib",
        "seaborn",
        "statistics",
        "probability",
        "regression",
        "classification",
        "clustering",
        "nlp",
        "computer vision",
        // data engineering
        "apache spark",
        "kafka",
        "airflow",
        "hadoop",
        "hive",
        "elasticsearch",
        "mongodb",
        "cassandra",
        "redis",
        "etl",
        // cloud and devops
        "aws",
        "gcp",
        "azure",
        "docker",
        "kubernetes",
        "terraform",
        "jenkins",
        "git",
        "ci/cd",
        "mlops",
        // databases
        "mysql",
        "postgresql",
        "oracle",
        "snowflake",
        "redshift",
        "bigquery",
        "databricks",
        // BI
        "tableau",
        "power bi",
        "looker",
        "excel",
    ],
);

pub const CERTIFICATIONS: Vocabulary = Vocabulary::new(
    VocabularyKind::Certification,
    &[
        "aws certified",
        "google cloud",
        "azure certified",
        "pmp",
        "scrum master",
    ],
);

pub const ROLES: Vocabulary = Vocabulary::new(
    VocabularyKind::Role,
    &[
        "data scientist",
        "data engineer",
        "analyst",
        "engineer",
        "developer",
    ],
);

pub const DEGREES: Vocabulary = Vocabulary::new(
    VocabularyKind::Degree,
    &[
        "phd", "ph.d", "master", "msc", "bachelor", "bsc", "btech", "mtech", "mba",
    ],
);

pub const CITIES: Vocabulary = Vocabulary::new(
    VocabularyKind::City,
    &[
        "bangalore",
        "bengaluru",
        "mumbai",
        "delhi",
        "hyderabad",
        "chennai",
        "pune",
        "kolkata",
        "gurugram",
        "noida",
        "gurgaon",
    ],
);
