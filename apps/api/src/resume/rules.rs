//! Extractor rules: each a pure `text -> Option<T>` function.
//!
//! Rules are grouped into ordered lists and evaluated first-match-wins by [`first_match`].

use std::sync::OnceLock;

use regex::Regex;

use crate::resume::vocabulary::CITIES;

/// A named, independently testable extraction step.
#[derive(Clone, Copy)]
pub struct Rule<T> {
    pub name: &'static str,
    pub apply: fn(&str) -> Option<T>,
}

/// Evaluates `rules` in order and returns the first hit together with the rule's name.
pub fn first_match<T>(rules: &[Rule<T>], text: &str) -> Option<(&'static str, T)> {
    rules
        .iter()
        .find_map(|rule| (rule.apply)(text).map(|value| (rule.name, value)))
}

pub(crate) fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static extractor pattern must compile"))
}

fn first_number(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

// ────────────────────────────────────────────────────────────────────────────
// Contact details
// ────────────────────────────────────────────────────────────────────────────

static EMAIL: OnceLock<Regex> = OnceLock::new();
static PHONE: OnceLock<Regex> = OnceLock::new();
static NAME_LINE: OnceLock<Regex> = OnceLock::new();

/// First `local@domain.tld` address in the text.
pub fn email(text: &str) -> Option<String> {
    compiled(
        &EMAIL,
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
    )
    .find(text)
    .map(|m| m.as_str().to_string())
}

/// First loosely grouped phone number, with an optional country-code prefix.
pub fn phone(text: &str) -> Option<String> {
    compiled(
        &PHONE,
        r"(\+\d{1,3}[-.\s]?)?(\(?\d{3}\)?[-.\s]?)?\d{3}[-.\s]?\d{4}",
    )
    .find(text)
    .map(|m| m.as_str().trim().to_string())
}

/// Best-effort name detection over the first three non-empty lines.
///
/// Accepts 2–4 capitalized words, shorter than 50 characters, with no `@` or URL.
pub fn name(text: &str) -> Option<String> {
    let pattern = compiled(&NAME_LINE, r"^[A-Z][a-z]+(\s[A-Z][a-z]+){1,3}$");
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(3)
        .find(|line| {
            line.chars().count() < 50
                && !line.contains('@')
                && !line.contains("http")
                && !line.contains("www.")
                && pattern.is_match(line)
        })
        .map(str::to_string)
}

/// First gazetteer city mentioned, as written in the text.
pub fn location(text: &str) -> Option<String> {
    CITIES.leftmost_in(text).map(str::to_string)
}

// ────────────────────────────────────────────────────────────────────────────
// Years of experience
// ────────────────────────────────────────────────────────────────────────────

static YEARS_OF_EXPERIENCE: OnceLock<Regex> = OnceLock::new();
static YEARS_EXPERIENCE: OnceLock<Regex> = OnceLock::new();
static YRS_EXP: OnceLock<Regex> = OnceLock::new();
static EXPERIENCE_THEN_YEARS: OnceLock<Regex> = OnceLock::new();

fn years_of_experience(text: &str) -> Option<u32> {
    let re = compiled(
        &YEARS_OF_EXPERIENCE,
        r"(?i)(\d+)\s*[-+]?\s*years?\s*of\s*experience",
    );
    first_number(re, text)
}

fn years_experience(text: &str) -> Option<u32> {
    first_number(
        compiled(&YEARS_EXPERIENCE, r"(?i)(\d+)\s*years?\s*experience"),
        text,
    )
}

fn yrs_exp(text: &str) -> Option<u32> {
    first_number(compiled(&YRS_EXP, r"(?i)(\d+)\s*yrs?\s*exp"), text)
}

fn experience_then_years(text: &str) -> Option<u32> {
    first_number(
        compiled(&EXPERIENCE_THEN_YEARS, r"(?i)experience.*?(\d+)\s*years?"),
        text,
    )
}

fn senior_title(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    (lower.contains("senior") || lower.contains("lead")).then_some(5)
}

fn junior_title(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    (lower.contains("junior") || lower.contains("fresher")).then_some(1)
}

fn intern_title(text: &str) -> Option<u32> {
    text.to_lowercase().contains("intern").then_some(0)
}

/// Assumed experience when nothing in the text says otherwise.
pub const DEFAULT_EXPERIENCE_YEARS: u32 = 2;

/// Explicit year counts first, then seniority keywords.
pub const EXPERIENCE_RULES: &[Rule<u32>] = &[
    Rule {
        name: "n_years_of_experience",
        apply: years_of_experience,
    },
    Rule {
        name: "n_years_experience",
        apply: years_experience,
    },
    Rule {
        name: "n_yrs_exp",
        apply: yrs_exp,
    },
    Rule {
        name: "experience_n_years",
        apply: experience_then_years,
    },
    Rule {
        name: "senior_or_lead",
        apply: senior_title,
    },
    Rule {
        name: "junior_or_fresher",
        apply: junior_title,
    },
    Rule {
        name: "intern",
        apply: intern_title,
    },
];

/// Total years of experience claimed by the text.
pub fn total_years(text: &str) -> u32 {
    first_match(EXPERIENCE_RULES, text)
        .map(|(_, years)| years)
        .unwrap_or(DEFAULT_EXPERIENCE_YEARS)
}
