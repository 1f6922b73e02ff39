//! Resume Rank - candidate ranking service
//!
//! Scores résumés against a job description and returns a deterministic,
//! explainable ranking. Embedding similarity is used when a sentence-embedding
//! model is available; keyword overlap is the fallback that always works.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{LexicalStrategy, Matcher, RankOutcome, ScoringError, ScoringStrategy, SemanticStrategy, StrategyKind};
pub use crate::models::{Candidate, Job, MatchResult, ParsedResume, RankRequest, RankResponse};
pub use crate::services::{Embedder, EmbeddingProvider, SemanticAvailability};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let matcher = Matcher::default();
        let results = matcher.rank("rust developer", &[Candidate::new(1, "Rust developer")]);
        assert_eq!(results[0].score, 100.0);
    }
}
