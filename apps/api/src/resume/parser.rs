//! Résumé Parser: turns raw résumé text into a privacy-masked `CandidateProfile`.
//!
//! Pure keyword and pattern extraction; every sub-extraction is a standalone function so it can
//! be tested on its own.

use tracing::debug;

use crate::errors::AppError;
use crate::resume::models::{
    CandidateProfile, Degree, ExperienceSummary, PersonalInfo, Role, SkillSet,
};
use crate::resume::rules;
use crate::resume::vocabulary::{CERTIFICATIONS, DEGREES, ROLES, TECHNICAL_SKILLS};

/// Parses résumé text. Fails with `InvalidInput` when the text is empty.
pub fn parse_resume(raw_text: &str) -> Result<CandidateProfile, AppError> {
    if raw_text.is_empty() {
        return Err(AppError::InvalidInput(
            "resume text cannot be empty".to_string(),
        ));
    }

    let profile = CandidateProfile {
        personal_info: extract_personal_info(raw_text),
        skills: extract_skills(raw_text),
        experience: extract_experience(raw_text),
        education: extract_education(raw_text),
        raw_text: raw_text.to_string(),
    };

    debug!(
        skills = profile.skills.technical.len(),
        certifications = profile.skills.certifications.len(),
        total_years = profile.experience.total_years,
        degrees = profile.education.len(),
        "parsed resume"
    );

    Ok(profile)
}

pub fn extract_personal_info(text: &str) -> PersonalInfo {
    PersonalInfo::from_contacts(
        rules::name(text),
        rules::email(text),
        rules::phone(text),
        rules::location(text),
    )
}

pub fn extract_skills(text: &str) -> SkillSet {
    SkillSet {
        technical: TECHNICAL_SKILLS
            .terms_in(text)
            .into_iter()
            .map(str::to_string)
            .collect(),
        certifications: extract_certifications(text),
    }
}

pub fn extract_certifications(text: &str) -> Vec<String> {
    CERTIFICATIONS
        .occurrences_in(text)
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn extract_experience(text: &str) -> ExperienceSummary {
    ExperienceSummary {
        total_years: rules::total_years(text),
        roles: ROLES
            .terms_in(text)
            .into_iter()
            .map(|title| Role {
                title: title.to_string(),
            })
            .collect(),
    }
}

pub fn extract_education(text: &str) -> Vec<Degree> {
    DEGREES
        .terms_in(text)
        .into_iter()
        .map(|degree| Degree {
            degree: degree.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESUME: &str = r#"
John Doe
Senior Data Scientist
Email: john.doe@example.com
Phone: +91-9876543210
Bangalore, India

EXPERIENCE:
7 years of experience in machine learning and data science
- Data Scientist at Company A
- Data Engineer at Company B

SKILLS:
Python, R, SQL, Machine Learning, Deep Learning, TensorFlow, PyTorch,
Pandas, NumPy, Scikit-learn, AWS, Docker, Kubernetes, Tableau

EDUCATION:
Master's in Computer Science
Bachelor of Technology

CERTIFICATIONS:
AWS Certified Solutions Architect
"#;

    #[test]
    fn test_parse_full_resume() {
        let profile = parse_resume(FULL_RESUME).unwrap();

        let info = &profile.personal_info;
        assert_eq!(info.name.as_deref(), Some("John Doe"));
        assert_eq!(info.email_raw.as_deref(), Some("john.doe@example.com"));
        assert!(info.email_masked.as_deref().unwrap().contains("***"));
        assert!(info.phone_masked.as_deref().unwrap().contains("****"));
        assert_eq!(info.location.as_deref(), Some("Bangalore"));

        let technical = &profile.skills.technical;
        assert!(technical.len() > 5);
        for skill in ["python", "machine learning", "tensorflow", "kubernetes"] {
            assert!(technical.iter().any(|s| s == skill), "missing {skill}");
        }
        assert_eq!(profile.skills.certifications, vec!["AWS Certified"]);

        assert_eq!(profile.experience.total_years, 7);
        let titles: Vec<&str> = profile
            .experience
            .roles
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(
            titles,
            vec!["data scientist", "data engineer", "engineer"]
        );

        let degrees: Vec<&str> = profile.education.iter().map(|d| d.degree.as_str()).collect();
        assert_eq!(degrees, vec!["master", "bachelor"]);

        assert_eq!(profile.raw_text, FULL_RESUME);
    }

    #[test]
    fn test_parse_rejects_empty_text() {
        assert!(matches!(parse_resume(""), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_whitespace_only_yields_default_profile() {
        let profile = parse_resume("  \n\t").unwrap();
        assert!(profile.personal_info.name.is_none());
        assert!(profile.skills.technical.is_empty());
        assert!(profile.education.is_empty());
        assert_eq!(profile.experience.total_years, 2);
    }

    #[test]
    fn test_technical_skills_have_no_duplicates() {
        let skills = extract_skills("Python, python, PYTHON, SQL, sql");
        let mut sorted = skills.technical.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), skills.technical.len());
    }

    #[test]
    fn test_skills_are_lowercase() {
        let skills = extract_skills("Proficient in Python, Machine Learning, SQL, TensorFlow, and AWS.");
        assert!(skills
            .technical
            .iter()
            .all(|s| s == &s.to_lowercase()));
        assert!(skills.technical.contains(&"machine learning".to_string()));
    }

    #[test]
    fn test_certifications_in_pattern_order() {
        let certs = extract_certifications("PMP holder; AWS Certified Solutions Architect; Google Cloud Professional");
        assert_eq!(certs, vec!["AWS Certified", "Google Cloud", "PMP"]);
    }

    #[test]
    fn test_education_various_formats() {
        let degrees = extract_education("PhD in Machine Learning, MSc Data Science, BTech, MBA");
        let names: Vec<&str> = degrees.iter().map(|d| d.degree.as_str()).collect();
        assert_eq!(names, vec!["phd", "msc", "btech", "mba"]);
    }

    #[test]
    fn test_personal_info_without_contacts() {
        let info = extract_personal_info("nothing useful here at all");
        assert!(info.email_raw.is_none());
        assert!(info.email_masked.is_none());
        assert!(info.phone_raw.is_none());
        assert!(info.location.is_none());
    }
}
