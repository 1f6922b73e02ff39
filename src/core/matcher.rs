use std::cmp::Ordering;
use std::sync::Arc;
use crate::config::SemanticSettings;
use crate::core::{
    lexical::LexicalStrategy,
    semantic::SemanticStrategy,
    strategy::{ScoreList, ScoringError, ScoringStrategy, StrategyKind},
};
use crate::models::{Candidate, MatchResult};
use crate::services::{embedding_provider, EmbeddingProvider, SemanticAvailability};

/// Result of the ranking process
#[derive(Debug, Clone)]
pub struct RankOutcome {
    pub matches: Vec<MatchResult>,
    pub strategy: StrategyKind,
    /// Why the semantic attempt was abandoned, when it was made and failed
    pub fallback_reason: Option<String>,
}

/// Main ranking orchestrator
///
/// # Pipeline Stages
/// 1. Semantic scoring, when a semantic strategy was wired in at startup
/// 2. Lexical scoring, when stage 1 is missing or fails for this call
/// 3. Stable sort by descending score
///
/// The fallback decision is made on every call. A semantic failure in one call
/// does not stop the next call from trying again.
#[derive(Clone)]
pub struct Matcher {
    semantic: Option<Arc<dyn ScoringStrategy>>,
    lexical: LexicalStrategy,
}

impl Matcher {
    /// Matcher that only ever uses keyword overlap
    pub fn lexical_only() -> Self {
        Self {
            semantic: None,
            lexical: LexicalStrategy::new(),
        }
    }

    /// Matcher that tries `semantic` first on every call
    pub fn with_semantic(semantic: Arc<dyn ScoringStrategy>) -> Self {
        Self {
            semantic: Some(semantic),
            lexical: LexicalStrategy::new(),
        }
    }

    /// Build the matcher from the startup availability probe
    ///
    /// Returns the embedding provider alongside so callers can report on or
    /// warm up the model.
    pub fn from_availability(
        availability: &SemanticAvailability,
        settings: &SemanticSettings,
    ) -> (Self, Option<Arc<EmbeddingProvider>>) {
        if !availability.is_ready() {
            tracing::info!("Semantic scoring off: {}", availability.summary());
            return (Self::lexical_only(), None);
        }

        match embedding_provider(settings) {
            Some(provider) => {
                let provider = Arc::new(provider);
                let strategy = SemanticStrategy::new(provider.clone());
                (Self::with_semantic(Arc::new(strategy)), Some(provider))
            }
            None => {
                tracing::warn!("Semantic scoring reported ready but no embedding backend is built in");
                (Self::lexical_only(), None)
            }
        }
    }

    pub fn semantic_enabled(&self) -> bool {
        self.semantic.is_some()
    }

    /// Rank candidates against a job description, best match first
    ///
    /// Every candidate appears exactly once in the output. Equal scores keep
    /// their input order. Never fails.
    pub fn rank(&self, job_description: &str, candidates: &[Candidate]) -> Vec<MatchResult> {
        self.rank_detailed(job_description, candidates).matches
    }

    /// Same as [`rank`](Self::rank), also reporting which strategy was used
    pub fn rank_detailed(&self, job_description: &str, candidates: &[Candidate]) -> RankOutcome {
        if candidates.is_empty() {
            return RankOutcome {
                matches: Vec::new(),
                strategy: self.preferred_strategy(),
                fallback_reason: None,
            };
        }

        let (scores, strategy, fallback_reason) = match self.try_semantic(job_description, candidates) {
            Some(Ok(scores)) => (scores, StrategyKind::Semantic, None),
            Some(Err(e)) => {
                tracing::warn!(
                    "Semantic scoring failed for {} candidates, falling back to lexical: {}",
                    candidates.len(),
                    e
                );
                let scores = self.lexical.score_all(job_description, candidates);
                (scores, StrategyKind::Lexical, Some(e.to_string()))
            }
            None => {
                let scores = self.lexical.score_all(job_description, candidates);
                (scores, StrategyKind::Lexical, None)
            }
        };

        let matches = rank_by_score(candidates, &scores);

        tracing::debug!(
            "Ranked {} candidates with {} strategy (top score: {:?})",
            matches.len(),
            strategy,
            matches.first().map(|m| m.score)
        );

        RankOutcome {
            matches,
            strategy,
            fallback_reason,
        }
    }

    fn preferred_strategy(&self) -> StrategyKind {
        if self.semantic.is_some() {
            StrategyKind::Semantic
        } else {
            StrategyKind::Lexical
        }
    }

    fn try_semantic(
        &self,
        job_description: &str,
        candidates: &[Candidate],
    ) -> Option<Result<ScoreList, ScoringError>> {
        let semantic = self.semantic.as_ref()?;
        Some(
            semantic
                .score(job_description, candidates)
                .and_then(|scores| validate_scores(scores, candidates.len())),
        )
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::lexical_only()
    }
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("semantic", &self.semantic.as_ref().map(|s| s.kind()))
            .finish()
    }
}

/// A strategy's output must line up with the candidates and be orderable
fn validate_scores(scores: ScoreList, expected: usize) -> Result<ScoreList, ScoringError> {
    if scores.len() != expected {
        return Err(ScoringError::InvalidScores(format!(
            "expected {} scores, got {}",
            expected,
            scores.len()
        )));
    }
    if let Some(bad) = scores.iter().find(|s| !s.is_finite()) {
        return Err(ScoringError::InvalidScores(format!("non-finite score {bad}")));
    }
    Ok(scores)
}

/// Pair candidates with their scores and sort by score (descending)
///
/// `sort_by` is stable, so ties keep input order. `0.0` and `-0.0` tie.
pub fn rank_by_score(candidates: &[Candidate], scores: &[f64]) -> Vec<MatchResult> {
    let mut matches: Vec<MatchResult> = candidates
        .iter()
        .zip(scores)
        .map(|(candidate, &score)| MatchResult::from_candidate(candidate, score))
        .collect();

    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    matches
}
