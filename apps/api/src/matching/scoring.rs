//! Match Scoring: pluggable, trait-based scorer for a (candidate profile, job posting) pair.
//!
//! Default: `KeywordMatchScorer` (deterministic keyword/regex signals, no model).
//! `AppState` holds an `Arc<dyn MatchScorer>`.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::jobs::models::JobPosting;
use crate::resume::models::CandidateProfile;
use crate::resume::rules::{compiled, first_match, Rule};

/// Weight of the skill sub-score in the composite.
pub const SKILL_WEIGHT: f64 = 0.6;
/// Weight of the experience sub-score in the composite.
pub const EXPERIENCE_WEIGHT: f64 = 0.3;
/// Flat bonus when the locations overlap. Not scaled.
pub const LOCATION_BONUS: f64 = 10.0;

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceAlignment {
    Under,
    Perfect,
    Over,
    Unknown,
}

impl ExperienceAlignment {
    pub fn sub_score(self) -> f64 {
        match self {
            Self::Perfect => 100.0,
            Self::Over => 80.0,
            Self::Under => 60.0,
            Self::Unknown => 50.0,
        }
    }
}

/// Years range parsed from a job's experience text. `max: None` is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperienceRange {
    pub min: u32,
    pub max: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub score: u32, // 0 – 100
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub experience_alignment: ExperienceAlignment,
    pub location_preference: bool,
}

/// A catalog entry annotated with its match. The catalog record itself is never touched.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredJob {
    #[serde(flatten)]
    pub job: JobPosting,
    #[serde(rename = "match")]
    pub match_result: MatchResult,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap scoring backends without touching handlers or search.
pub trait MatchScorer: Send + Sync {
    fn score(&self, profile: &CandidateProfile, job: &JobPosting) -> MatchResult;
}

/// Keyword-based scorer.
///
/// Algorithm:
/// 1. skills: matched job skills / job skill count × 100 (bidirectional substring)
/// 2. experience: alignment of candidate years with the job's parsed range
/// 3. location: either lower-cased location contains the other
/// 4. score = round(skills × 0.6 + experience × 0.3 + (location ? 10 : 0)), clamped to 0–100
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordMatchScorer;

impl MatchScorer for KeywordMatchScorer {
    fn score(&self, profile: &CandidateProfile, job: &JobPosting) -> MatchResult {
        let candidate_skills = profile.technical_skills();
        let skill_score = calculate_skill_match(candidate_skills, &job.skills);
        let experience_alignment =
            calculate_experience_alignment(profile.total_years(), job.experience.as_deref());
        let location_preference =
            calculate_location_match(profile.location(), Some(job.location.as_str()));

        let composite = skill_score * SKILL_WEIGHT
            + experience_alignment.sub_score() * EXPERIENCE_WEIGHT
            + if location_preference { LOCATION_BONUS } else { 0.0 };

        let (matched_skills, missing_skills) = partition_skills(candidate_skills, &job.skills);

        MatchResult {
            score: composite.round().clamp(0.0, 100.0) as u32,
            matched_skills,
            missing_skills,
            experience_alignment,
            location_preference,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sub-signals
// ────────────────────────────────────────────────────────────────────────────

/// Either token contains the other. Inputs must already be lower-cased.
/// Permissive on purpose: "java" is satisfied by "javascript".
fn skills_overlap(candidate: &str, job: &str) -> bool {
    candidate.contains(job) || job.contains(candidate)
}

fn lowercased<S: AsRef<str>>(skills: &[S]) -> Vec<String> {
    skills.iter().map(|s| s.as_ref().to_lowercase()).collect()
}

/// Percentage (0–100) of job skills satisfied by at least one candidate skill.
/// Zero when either side is empty.
pub fn calculate_skill_match<C, J>(candidate_skills: &[C], job_skills: &[J]) -> f64
where
    C: AsRef<str>,
    J: AsRef<str>,
{
    if candidate_skills.is_empty() || job_skills.is_empty() {
        return 0.0;
    }
    let candidate = lowercased(candidate_skills);
    let matched = lowercased(job_skills)
        .iter()
        .filter(|job_skill| candidate.iter().any(|c| skills_overlap(c, job_skill)))
        .count();
    matched as f64 / job_skills.len() as f64 * 100.0
}

/// Splits the job's skills, in job order and original casing, into (matched, missing).
pub fn partition_skills<C, J>(candidate_skills: &[C], job_skills: &[J]) -> (Vec<String>, Vec<String>)
where
    C: AsRef<str>,
    J: AsRef<str>,
{
    let candidate = lowercased(candidate_skills);
    job_skills
        .iter()
        .map(|skill| skill.as_ref().to_string())
        .partition(|skill| {
            let job_skill = skill.to_lowercase();
            candidate.iter().any(|c| skills_overlap(c, &job_skill))
        })
}

static EXPLICIT_RANGE: OnceLock<Regex> = OnceLock::new();
static OPEN_ENDED: OnceLock<Regex> = OnceLock::new();
static SINGLE_NUMBER: OnceLock<Regex> = OnceLock::new();

fn capture_u32(caps: &regex::Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

fn explicit_range(text: &str) -> Option<ExperienceRange> {
    let caps = compiled(&EXPLICIT_RANGE, r"(\d+)\s*[-–]\s*(\d+)").captures(text)?;
    Some(ExperienceRange {
        min: capture_u32(&caps, 1)?,
        max: Some(capture_u32(&caps, 2)?),
    })
}

fn open_ended(text: &str) -> Option<ExperienceRange> {
    let caps = compiled(&OPEN_ENDED, r"(\d+)\s*\+").captures(text)?;
    Some(ExperienceRange {
        min: capture_u32(&caps, 1)?,
        max: None,
    })
}

fn single_number(text: &str) -> Option<ExperienceRange> {
    let caps = compiled(&SINGLE_NUMBER, r"(\d+)").captures(text)?;
    let years = capture_u32(&caps, 1)?;
    Some(ExperienceRange {
        min: years,
        max: Some(years.saturating_add(2)),
    })
}

pub const EXPERIENCE_RANGE_RULES: &[Rule<ExperienceRange>] = &[
    Rule {
        name: "explicit_range",
        apply: explicit_range,
    },
    Rule {
        name: "open_ended",
        apply: open_ended,
    },
    Rule {
        name: "single_number",
        apply: single_number,
    },
];

/// "4-7 years" → 4..=7, "5+ years" → 5.., "3 years" → 3..=5. `None` if there is no number.
pub fn parse_experience_range(text: &str) -> Option<ExperienceRange> {
    first_match(EXPERIENCE_RANGE_RULES, &text.to_lowercase()).map(|(_, range)| range)
}

pub fn calculate_experience_alignment(
    candidate_years: u32,
    job_experience: Option<&str>,
) -> ExperienceAlignment {
    let Some(range) = job_experience
        .filter(|text| !text.is_empty())
        .and_then(parse_experience_range)
    else {
        return ExperienceAlignment::Unknown;
    };

    if candidate_years < range.min {
        ExperienceAlignment::Under
    } else if range.max.is_some_and(|max| candidate_years > max) {
        ExperienceAlignment::Over
    } else {
        ExperienceAlignment::Perfect
    }
}

/// True when either lower-cased location contains the other. Absent or empty on either side → false.
pub fn calculate_location_match(candidate: Option<&str>, job: Option<&str>) -> bool {
    match (candidate, job) {
        (Some(candidate), Some(job)) if !candidate.is_empty() && !job.is_empty() => {
            let candidate = candidate.to_lowercase();
            let job = job.to_lowercase();
            job.contains(&candidate) || candidate.contains(&job)
        }
        _ => false,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Batch ranking
// ────────────────────────────────────────────────────────────────────────────

/// Scores every job and sorts by score, highest first. Ties keep their input order.
pub fn rank_jobs(
    scorer: &dyn MatchScorer,
    profile: &CandidateProfile,
    jobs: &[JobPosting],
) -> Vec<ScoredJob> {
    let mut scored: Vec<ScoredJob> = jobs
        .iter()
        .map(|job| ScoredJob {
            job: job.clone(),
            match_result: scorer.score(profile, job),
        })
        .collect();
    scored.sort_by(|a, b| b.match_result.score.cmp(&a.match_result.score));
    scored
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
