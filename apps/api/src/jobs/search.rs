//! Candidate-facing search: free-text term plus filters over the catalog, optionally match-scored.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::jobs::listing::{rank, ListedJob, ListingFilters, ListingMetadata};
use crate::jobs::models::JobPosting;
use crate::matching::scoring::{MatchResult, MatchScorer};
use crate::resume::models::CandidateProfile;

/// Window used by `recent_only`.
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// Experience bands offered to candidates. Each band matches on markers in the job's
/// experience text rather than on a parsed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceBucket {
    #[serde(rename = "0-2 years")]
    Entry,
    #[serde(rename = "2-4 years")]
    Junior,
    #[serde(rename = "4-7 years")]
    Mid,
    #[serde(rename = "7+ years")]
    Senior,
}

impl ExperienceBucket {
    fn markers(self) -> &'static [&'static str] {
        match self {
            Self::Entry => &["1-3", "0-2", "fresher"],
            Self::Junior => &["2-4", "1-3"],
            Self::Mid => &["4-7", "3-6", "5-8"],
            Self::Senior => &["7+", "8+", "senior", "lead"],
        }
    }

    pub fn matches(self, experience: &str) -> bool {
        let experience = experience.to_lowercase();
        self.markers().iter().any(|marker| experience.contains(marker))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    /// Case-insensitive substring of title, company, any skill or description.
    pub term: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub experience: Option<ExperienceBucket>,
    /// Inclusive minimum company rating.
    pub min_rating: Option<f32>,
    pub remote_only: bool,
    /// Only postings from the last 30 days.
    pub recent_only: bool,
    pub skills: Vec<String>,
}

impl SearchQuery {
    fn matches_term(&self, job: &JobPosting) -> bool {
        let Some(term) = self.term.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return true;
        };
        let term = term.to_lowercase();
        job.title.to_lowercase().contains(&term)
            || job.company.to_lowercase().contains(&term)
            || job.skills.iter().any(|s| s.to_lowercase().contains(&term))
            || job
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term))
    }

    fn listing_filters(&self) -> ListingFilters {
        ListingFilters {
            location: self.location.clone().filter(|l| !l.is_empty()),
            category: self.category.clone().filter(|c| !c.is_empty()),
            skills: self.skills.clone(),
            remote: self.remote_only.then_some(true),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub listing: ListedJob,
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    pub match_result: Option<MatchResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub jobs: Vec<SearchHit>,
    pub metadata: ListingMetadata,
}

fn meets_quality_floor(job: &JobPosting, floor: f32) -> bool {
    job.company_rating.is_some_and(|rating| rating >= floor)
}

/// Runs a candidate search.
///
/// Postings below `quality_floor` (or unrated) are dropped first, the query filters are applied,
/// and the survivors are ordered newest first with freshness badges. With a profile, every hit
/// is scored and the list is re-sorted by score; equal scores keep recency order.
pub fn search(
    jobs: &[JobPosting],
    query: &SearchQuery,
    profile: Option<&CandidateProfile>,
    scorer: &dyn MatchScorer,
    quality_floor: f32,
    now: DateTime<Utc>,
) -> SearchResults {
    let recent_cutoff = now - Duration::days(RECENT_WINDOW_DAYS);

    let candidates = jobs.iter().filter(|job| {
        meets_quality_floor(job, quality_floor)
            && (!query.recent_only || job.posted_date.is_some_and(|p| p >= recent_cutoff))
            && query.matches_term(job)
            && query.experience.map_or(true, |bucket| {
                job.experience.as_deref().is_some_and(|e| bucket.matches(e))
            })
            && query
                .min_rating
                .map_or(true, |min| job.company_rating.is_some_and(|r| r >= min))
    });

    let page = rank(candidates, &query.listing_filters(), now);

    let mut hits: Vec<SearchHit> = page
        .jobs
        .into_iter()
        .map(|listing| SearchHit {
            match_result: profile.map(|p| scorer.score(p, &listing.job)),
            listing,
        })
        .collect();

    if profile.is_some() {
        hits.sort_by_key(|hit| {
            std::cmp::Reverse(hit.match_result.as_ref().map_or(0, |m| m.score))
        });
    }

    SearchResults {
        jobs: hits,
        metadata: page.metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scoring::KeywordMatchScorer;
    use crate::resume::models::{ExperienceSummary, PersonalInfo, SkillSet};
    use chrono::TimeZone;

    const FLOOR: f32 = 3.5;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn job(title: &str, days_ago: i64, rating: Option<f32>, experience: &str) -> JobPosting {
        let mut job: JobPosting = serde_json::from_value(serde_json::json!({
            "title": title,
            "company": "Company",
            "location": "Bangalore, India",
        }))
        .unwrap();
        job.posted_date = Some(now() - Duration::days(days_ago));
        job.company_rating = rating;
        job.experience = Some(experience.to_string());
        job
    }

    fn catalog() -> Vec<JobPosting> {
        let mut ds = job("Data Scientist", 1, Some(4.2), "4-7 years");
        ds.skills = vec!["Python".to_string(), "Machine Learning".to_string()];

        let mut de = job("Data Engineer", 3, Some(4.0), "2-4 years");
        de.skills = vec!["Spark".to_string(), "SQL".to_string()];
        de.is_remote = true;

        let mut lead = job("Lead Analyst", 60, Some(4.6), "Senior level");
        lead.skills = vec!["SQL".to_string(), "Tableau".to_string()];
        lead.description = Some("Own the python reporting stack".to_string());

        let unrated = job("Unrated Role", 0, None, "0-2 years");
        let low = job("Low Rated Role", 0, Some(2.9), "0-2 years");

        vec![ds, de, lead, unrated, low]
    }

    fn titles(results: &SearchResults) -> Vec<&str> {
        results.jobs.iter().map(|h| h.listing.job.title.as_str()).collect()
    }

    fn run(query: SearchQuery) -> SearchResults {
        search(&catalog(), &query, None, &KeywordMatchScorer, FLOOR, now())
    }

    #[test]
    fn test_quality_floor_drops_low_and_unrated() {
        let results = run(SearchQuery::default());
        assert_eq!(
            titles(&results),
            vec!["Data Scientist", "Data Engineer", "Lead Analyst"]
        );
        assert_eq!(results.metadata.total_count, 3);
        assert!(results.jobs.iter().all(|h| h.match_result.is_none()));
    }

    #[test]
    fn test_term_matches_skills_and_description() {
        let results = run(SearchQuery {
            term: Some("PYTHON".to_string()),
            ..SearchQuery::default()
        });
        assert_eq!(titles(&results), vec!["Data Scientist", "Lead Analyst"]);
    }

    #[test]
    fn test_recent_only_keeps_last_30_days() {
        let results = run(SearchQuery {
            recent_only: true,
            ..SearchQuery::default()
        });
        assert_eq!(titles(&results), vec!["Data Scientist", "Data Engineer"]);
    }

    #[test]
    fn test_experience_buckets() {
        assert!(ExperienceBucket::Entry.matches("Fresher"));
        assert!(ExperienceBucket::Junior.matches("1-3 years"));
        assert!(ExperienceBucket::Mid.matches("5-8 Years"));
        assert!(ExperienceBucket::Senior.matches("Senior level"));
        assert!(!ExperienceBucket::Senior.matches("4-7 years"));

        let results = run(SearchQuery {
            experience: Some(ExperienceBucket::Senior),
            ..SearchQuery::default()
        });
        assert_eq!(titles(&results), vec!["Lead Analyst"]);
    }

    #[test]
    fn test_bucket_deserializes_from_label() {
        let query: SearchQuery =
            serde_json::from_str(r#"{"experience": "4-7 years", "remote_only": true}"#).unwrap();
        assert_eq!(query.experience, Some(ExperienceBucket::Mid));
        assert!(query.remote_only);
    }

    #[test]
    fn test_rating_remote_and_skill_filters() {
        let rated = run(SearchQuery {
            min_rating: Some(4.2),
            ..SearchQuery::default()
        });
        assert_eq!(titles(&rated), vec!["Data Scientist", "Lead Analyst"]);

        let remote = run(SearchQuery {
            remote_only: true,
            ..SearchQuery::default()
        });
        assert_eq!(titles(&remote), vec!["Data Engineer"]);

        let sql = run(SearchQuery {
            skills: vec!["sql".to_string()],
            ..SearchQuery::default()
        });
        assert_eq!(titles(&sql), vec!["Data Engineer", "Lead Analyst"]);
    }

    #[test]
    fn test_profile_reorders_by_match_score() {
        let profile = CandidateProfile {
            personal_info: PersonalInfo {
                location: Some("Bangalore".to_string()),
                ..PersonalInfo::default()
            },
            skills: SkillSet {
                technical: vec!["sql".to_string(), "tableau".to_string()],
                certifications: vec![],
            },
            experience: ExperienceSummary {
                total_years: 3,
                roles: vec![],
            },
            ..CandidateProfile::default()
        };

        let results = search(
            &catalog(),
            &SearchQuery::default(),
            Some(&profile),
            &KeywordMatchScorer,
            FLOOR,
            now(),
        );

        assert_eq!(
            titles(&results),
            vec!["Lead Analyst", "Data Engineer", "Data Scientist"]
        );
        let top = results.jobs[0].match_result.as_ref().unwrap();
        assert_eq!(top.matched_skills, vec!["SQL", "Tableau"]);
        let json = serde_json::to_value(&results.jobs[0]).unwrap();
        assert_eq!(json["match"]["score"], 85);
        assert_eq!(json["title"], "Lead Analyst");
    }
}
