use std::fmt;
use thiserror::Error;
use crate::models::Candidate;

/// Per-candidate scores, aligned index for index with the input candidates
pub type ScoreList = Vec<f64>;

/// Reasons a scoring attempt can fail
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Encoding failure: {0}")]
    EncodingFailure(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid scores: {0}")]
    InvalidScores(String),
}

/// Which strategy produced a ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Semantic,
    Lexical,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Semantic => "semantic",
            StrategyKind::Lexical => "lexical",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scoring algorithm the matcher can rank with
///
/// Implementations return one score per candidate, in input order. They do not
/// sort and do not recover from their own failures; the matcher owns both.
pub trait ScoringStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn score(&self, job_description: &str, candidates: &[Candidate]) -> Result<ScoreList, ScoringError>;
}
