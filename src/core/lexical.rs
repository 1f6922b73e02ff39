use std::collections::HashSet;
use rayon::prelude::*;
use crate::core::similarity::to_percentage;
use crate::core::strategy::{ScoreList, ScoringError, ScoringStrategy, StrategyKind};
use crate::models::Candidate;

/// Tokens must be longer than this many characters to take part in matching
const MIN_TOKEN_CHARS: usize = 2;

/// Keyword-overlap scoring
///
/// Scoring formula:
/// J     = lower-cased, deduplicated job tokens longer than 2 characters
/// hits  = |{ t in J : t is a substring of lower(resume) }|
/// score = min(1, hits / max(1, |J|)) * 100, rounded to two decimals
///
/// Needs no model and never fails, which makes it the terminal fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalStrategy;

impl LexicalStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Score every candidate, in input order
    pub fn score_all(&self, job_description: &str, candidates: &[Candidate]) -> ScoreList {
        let job_tokens = job_tokens(job_description);
        candidates
            .par_iter()
            .map(|candidate| overlap_score(&job_tokens, candidate.resume_text()))
            .collect()
    }
}

impl ScoringStrategy for LexicalStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Lexical
    }

    fn score(&self, job_description: &str, candidates: &[Candidate]) -> Result<ScoreList, ScoringError> {
        Ok(self.score_all(job_description, candidates))
    }
}

/// Split a job description into its distinct, lower-cased keywords
///
/// Frequency is ignored; only presence matters.
pub fn job_tokens(job_description: &str) -> HashSet<String> {
    job_description
        .split_whitespace()
        .filter(|word| word.chars().count() > MIN_TOKEN_CHARS)
        .map(str::to_lowercase)
        .collect()
}

/// Overlap score (0-100) of a résumé against a prepared token set
///
/// Containment is a plain substring check, so `java` also matches
/// `javascript`.
#[inline]
pub fn overlap_score(job_tokens: &HashSet<String>, resume_text: &str) -> f64 {
    let resume = resume_text.to_lowercase();
    let hits = job_tokens
        .iter()
        .filter(|token| resume.contains(token.as_str()))
        .count();

    let ratio = (hits as f64 / job_tokens.len().max(1) as f64).min(1.0);
    to_percentage(ratio)
}
