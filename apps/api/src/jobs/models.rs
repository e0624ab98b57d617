use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Dedup identity of a posting: lower-cased (title, company, location).
/// Source-provided ids are never used for identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IdentityKey {
    title: String,
    company: String,
    location: String,
}

impl IdentityKey {
    pub fn new(title: &str, company: &str, location: &str) -> Self {
        Self {
            title: title.to_lowercase(),
            company: company.to_lowercase(),
            location: location.to_lowercase(),
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.title, self.company, self.location)
    }
}

/// A posting as delivered by a source feed. Only the identity fields are required;
/// anything absent is left untouched when merged over an existing catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPosting {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub posted_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_remote: Option<bool>,
    #[serde(default)]
    pub company_rating: Option<f32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default, rename = "type")]
    pub employment_type: Option<String>,
    /// Overwritten with the registration name by the aggregator.
    #[serde(default)]
    pub source: Option<String>,
}

impl RawPosting {
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey::new(&self.title, &self.company, &self.location)
    }
}

/// A unified catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    /// Catalog-assigned id, stable across merges.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Free-text range such as "4-7 years" or "5+ years".
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub posted_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_remote: bool,
    #[serde(default)]
    pub company_rating: Option<f32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
}

impl JobPosting {
    /// Creates a new catalog entry from a raw posting.
    pub fn from_raw(raw: RawPosting) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id: raw.id,
            source: raw.source,
            title: raw.title,
            company: raw.company,
            location: raw.location,
            category: raw.category,
            skills: raw.skills.unwrap_or_default(),
            experience: raw.experience,
            posted_date: raw.posted_date,
            is_remote: raw.is_remote.unwrap_or(false),
            company_rating: raw.company_rating,
            description: raw.description,
            salary: raw.salary,
            employment_type: raw.employment_type,
        }
    }

    /// Shallow merge: every field present on `raw` overwrites, absent fields are kept.
    /// Returns whether anything changed.
    pub fn merge_from(&mut self, raw: RawPosting) -> bool {
        let before = self.clone();

        self.title = raw.title;
        self.company = raw.company;
        self.location = raw.location;
        overwrite(&mut self.source_id, raw.id);
        overwrite(&mut self.source, raw.source);
        overwrite(&mut self.category, raw.category);
        overwrite(&mut self.experience, raw.experience);
        overwrite(&mut self.posted_date, raw.posted_date);
        overwrite(&mut self.company_rating, raw.company_rating);
        overwrite(&mut self.description, raw.description);
        overwrite(&mut self.salary, raw.salary);
        overwrite(&mut self.employment_type, raw.employment_type);
        if let Some(skills) = raw.skills {
            self.skills = skills;
        }
        if let Some(is_remote) = raw.is_remote {
            self.is_remote = is_remote;
        }

        *self != before
    }
}

fn overwrite<T>(slot: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}

/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` (read as UTC) and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn flexible_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognised timestamp '{s}'"))),
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
