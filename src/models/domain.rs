use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Candidate record as supplied by the candidate store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub resume_text: Option<String>,
}

impl Candidate {
    pub fn new(id: i64, resume_text: impl Into<String>) -> Self {
        Self {
            id,
            name: None,
            email: None,
            resume_text: Some(resume_text.into()),
        }
    }

    /// Helper to get the résumé text, treating a missing one as empty
    pub fn resume_text(&self) -> &str {
        self.resume_text.as_deref().unwrap_or("")
    }
}

/// Job posting as supplied by the job store. Only the description is ranked against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub description: String,
}

/// Scored candidate, ranked by descending score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub score: f64,
}

impl MatchResult {
    pub fn from_candidate(candidate: &Candidate, score: f64) -> Self {
        Self {
            candidate_id: candidate.id,
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            score,
        }
    }
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\w.-]+@[\w.-]+").expect("email pattern is valid")
});

/// Longest first line still accepted as a display name
const MAX_NAME_LEN: usize = 100;

/// Name, contact address and cleaned-up text pulled out of a raw résumé
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "resumeText")]
    pub resume_text: String,
}

impl ParsedResume {
    /// Extract candidate details from plain résumé text
    ///
    /// The first line becomes the name when it is shorter than 100 characters,
    /// and the first thing that looks like an address becomes the email.
    pub fn from_text(text: &str) -> Self {
        let name = text
            .split('\n')
            .next()
            .map(str::trim)
            .filter(|first| !first.is_empty() && first.chars().count() < MAX_NAME_LEN)
            .map(str::to_string);

        let email = EMAIL_RE.find(text).map(|m| m.as_str().to_string());

        Self {
            name,
            email,
            resume_text: normalize_whitespace(text),
        }
    }

    pub fn into_candidate(self, id: i64) -> Candidate {
        Candidate {
            id,
            name: self.name,
            email: self.email,
            resume_text: Some(self.resume_text),
        }
    }
}

/// Collapse every run of whitespace into a single space and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
