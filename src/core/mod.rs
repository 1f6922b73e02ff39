// Core algorithm exports
pub mod lexical;
pub mod matcher;
pub mod semantic;
pub mod similarity;
pub mod strategy;

pub use lexical::{LexicalStrategy, job_tokens, overlap_score};
pub use matcher::{Matcher, RankOutcome, rank_by_score};
pub use semantic::SemanticStrategy;
pub use similarity::{cosine_similarity, round2, to_percentage};
pub use strategy::{ScoreList, ScoringError, ScoringStrategy, StrategyKind};
