use serde::{Deserialize, Serialize};

use crate::resume::masking::{mask_email, mask_phone};

/// Contact details. Raw values are kept for internal pre-fill and are never serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: Option<String>,
    pub email_masked: Option<String>,
    #[serde(skip_serializing, default)]
    pub email_raw: Option<String>,
    pub phone_masked: Option<String>,
    #[serde(skip_serializing, default)]
    pub phone_raw: Option<String>,
    pub location: Option<String>,
}

impl PersonalInfo {
    /// Builds the record from raw contacts, deriving the masked forms.
    pub fn from_contacts(
        name: Option<String>,
        email_raw: Option<String>,
        phone_raw: Option<String>,
        location: Option<String>,
    ) -> Self {
        Self {
            name,
            email_masked: email_raw.as_deref().map(mask_email),
            email_raw,
            phone_masked: phone_raw.as_deref().map(mask_phone),
            phone_raw,
            location,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillSet {
    /// Lower-case, unique, vocabulary order.
    pub technical: Vec<String>,
    /// Matched certification text as written, pattern order.
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceSummary {
    pub total_years: u32,
    pub roles: Vec<Role>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Degree {
    pub degree: String,
}

/// Structured candidate profile produced by the résumé parser.
/// Treated as an immutable value once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub personal_info: PersonalInfo,
    pub skills: SkillSet,
    pub experience: ExperienceSummary,
    pub education: Vec<Degree>,
    /// Original input, kept for audit. Never rendered.
    #[serde(skip_serializing, default)]
    pub raw_text: String,
}

impl CandidateProfile {
    pub fn technical_skills(&self) -> &[String] {
        &self.skills.technical
    }

    pub fn location(&self) -> Option<&str> {
        self.personal_info.location.as_deref()
    }

    pub fn total_years(&self) -> u32 {
        self.experience.total_years
    }
}
