use std::sync::Arc;
use rayon::prelude::*;
use crate::core::similarity::{cosine_similarity, to_percentage};
use crate::core::strategy::{ScoreList, ScoringError, ScoringStrategy, StrategyKind};
use crate::models::Candidate;
use crate::services::{EmbedderError, EmbeddingProvider};

/// Embedding-similarity scoring
///
/// score = round(cosine(embed(job), embed(resume)) * 100, 2)
///
/// Scores fall in [-100, 100]. Any failure is returned as-is; recovering from
/// it is the matcher's job.
#[derive(Debug, Clone)]
pub struct SemanticStrategy {
    provider: Arc<EmbeddingProvider>,
}

impl SemanticStrategy {
    pub fn new(provider: Arc<EmbeddingProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<EmbeddingProvider> {
        &self.provider
    }
}

impl ScoringStrategy for SemanticStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Semantic
    }

    fn score(&self, job_description: &str, candidates: &[Candidate]) -> Result<ScoreList, ScoringError> {
        let embedder = self.provider.get().map_err(|e| match e {
            EmbedderError::Unavailable(msg) => ScoringError::ModelUnavailable(msg),
            other => ScoringError::ModelUnavailable(other.to_string()),
        })?;

        let job_vector = embedder
            .embed(job_description)
            .map_err(|e| ScoringError::EncodingFailure(e.to_string()))?;

        let resumes: Vec<&str> = candidates.iter().map(Candidate::resume_text).collect();
        let resume_vectors = embedder
            .embed_batch(&resumes)
            .map_err(|e| ScoringError::EncodingFailure(e.to_string()))?;

        if resume_vectors.len() != candidates.len() {
            return Err(ScoringError::EncodingFailure(format!(
                "expected {} résumé embeddings, got {}",
                candidates.len(),
                resume_vectors.len()
            )));
        }

        resume_vectors
            .par_iter()
            .map(|resume_vector| {
                let similarity = cosine_similarity(&job_vector, resume_vector)?;
                if !similarity.is_finite() {
                    return Err(ScoringError::InvalidScores(format!(
                        "non-finite similarity from {}",
                        embedder.id()
                    )));
                }
                Ok(to_percentage(similarity))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::embedding::tests::CharEmbedder;
    use crate::services::{Embedder, EmbedderResult, ModelLoader};

    struct BrokenLoader;

    impl ModelLoader for BrokenLoader {
        fn model_id(&self) -> &str {
            "broken"
        }

        fn load(&self) -> EmbedderResult<Arc<dyn Embedder>> {
            Err(EmbedderError::Unavailable("no model files".to_string()))
        }
    }

    /// Returns vectors whose length depends on the input
    struct RaggedEmbedder;

    impl Embedder for RaggedEmbedder {
        fn embed(&self, text: &str) -> EmbedderResult<Vec<f32>> {
            Ok(vec![1.0; text.len() % 3 + 1])
        }

        fn dimension(&self) -> usize {
            3
        }

        fn id(&self) -> &str {
            "ragged"
        }
    }

    fn strategy_with(embedder: Arc<dyn Embedder>) -> SemanticStrategy {
        SemanticStrategy::new(Arc::new(EmbeddingProvider::preloaded(embedder)))
    }

    #[test]
    fn test_scores_follow_similarity() {
        let strategy = strategy_with(Arc::new(CharEmbedder));
        let candidates = vec![
            Candidate::new(1, "abc"),
            Candidate::new(2, "xyz"),
            Candidate::new(3, "ABC abc"),
        ];

        let scores = strategy.score("abc", &candidates).unwrap();

        assert_eq!(scores, vec![100.0, 0.0, 100.0]);
    }

    #[test]
    fn test_empty_resume_is_scored() {
        let strategy = strategy_with(Arc::new(CharEmbedder));
        let candidates = vec![Candidate {
            id: 1,
            name: None,
            email: None,
            resume_text: None,
        }];

        let scores = strategy.score("rust engineer", &candidates).unwrap();
        assert_eq!(scores, vec![0.0]);
    }

    #[test]
    fn test_load_failure_is_model_unavailable() {
        let strategy = SemanticStrategy::new(Arc::new(EmbeddingProvider::new(BrokenLoader)));
        let err = strategy.score("rust", &[Candidate::new(1, "rust")]).unwrap_err();
        assert!(matches!(err, ScoringError::ModelUnavailable(_)));
    }

    #[test]
    fn test_dimension_mismatch_is_reported() {
        let strategy = strategy_with(Arc::new(RaggedEmbedder));
        // job len 4 -> 2 dims, résumé len 3 -> 1 dim
        let err = strategy.score("abcd", &[Candidate::new(1, "abc")]).unwrap_err();
        assert!(matches!(err, ScoringError::DimensionMismatch { .. }));
    }
}
