//! FastEmbed-backed sentence embedder (ONNX runtime).
//!
//! Model files are fetched into the cache directory on first load, which can
//! take tens of seconds on a cold start.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::embedding::{Embedder, EmbedderError, EmbedderResult, ModelLoader};
use crate::config::SemanticSettings;

/// Known model names and their output dimension
fn resolve_model(name: &str) -> Option<(EmbeddingModel, usize)> {
    match name {
        "all-MiniLM-L6-v2" | "sentence-transformers/all-MiniLM-L6-v2" => {
            Some((EmbeddingModel::AllMiniLML6V2, 384))
        }
        "all-MiniLM-L12-v2" | "sentence-transformers/all-MiniLM-L12-v2" => {
            Some((EmbeddingModel::AllMiniLML12V2, 384))
        }
        "bge-small-en-v1.5" | "BAAI/bge-small-en-v1.5" => Some((EmbeddingModel::BGESmallENV15, 384)),
        "bge-base-en-v1.5" | "BAAI/bge-base-en-v1.5" => Some((EmbeddingModel::BGEBaseENV15, 768)),
        _ => None,
    }
}

pub struct FastEmbedder {
    model: Mutex<TextEmbedding>,
    id: String,
    dimension: usize,
}

impl FastEmbedder {
    pub fn load(
        model_name: &str,
        cache_dir: Option<PathBuf>,
        show_download_progress: bool,
    ) -> EmbedderResult<Self> {
        let (model, dimension) = resolve_model(model_name).ok_or_else(|| {
            EmbedderError::Unavailable(format!("unsupported embedding model: {model_name}"))
        })?;

        let mut options = InitOptions::new(model).with_show_download_progress(show_download_progress);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        let model = TextEmbedding::try_new(options)
            .map_err(|e| EmbedderError::Unavailable(format!("fastembed init failed: {e}")))?;

        Ok(Self {
            model: Mutex::new(model),
            id: model_name.to_string(),
            dimension,
        })
    }

    fn check_dimension(&self, embedding: &[f32]) -> EmbedderResult<()> {
        if embedding.len() != self.dimension {
            return Err(EmbedderError::EmbeddingFailed(format!(
                "fastembed dimension mismatch: expected {}, got {}",
                self.dimension,
                embedding.len()
            )));
        }
        Ok(())
    }
}

impl Embedder for FastEmbedder {
    fn embed(&self, text: &str) -> EmbedderResult<Vec<f32>> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| EmbedderError::EmbeddingFailed("fastembed returned no embedding".to_string()))
    }

    fn embed_batch(&self, texts: &[&str]) -> EmbedderResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut model = self
            .model
            .lock()
            .map_err(|_| EmbedderError::Internal("fastembed lock poisoned".to_string()))?;

        let embeddings = model
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbedderError::EmbeddingFailed(format!("fastembed embed failed: {e}")))?;

        if embeddings.len() != texts.len() {
            return Err(EmbedderError::EmbeddingFailed(format!(
                "fastembed returned {} embeddings for {} texts",
                embeddings.len(),
                texts.len()
            )));
        }
        for embedding in &embeddings {
            self.check_dimension(embedding)?;
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Loads a [`FastEmbedder`] from the `semantic` settings
pub struct FastEmbedLoader {
    model: String,
    cache_dir: Option<PathBuf>,
    show_download_progress: bool,
}

impl FastEmbedLoader {
    pub fn from_settings(settings: &SemanticSettings) -> Self {
        Self {
            model: settings.model.clone(),
            cache_dir: settings.cache_dir.as_ref().map(PathBuf::from),
            show_download_progress: settings.show_download_progress,
        }
    }
}

impl ModelLoader for FastEmbedLoader {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn load(&self) -> EmbedderResult<Arc<dyn Embedder>> {
        let embedder = FastEmbedder::load(&self.model, self.cache_dir.clone(), self.show_download_progress)?;
        Ok(Arc::new(embedder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_models() {
        assert_eq!(resolve_model("all-MiniLM-L6-v2").map(|(_, d)| d), Some(384));
        assert_eq!(resolve_model("BAAI/bge-base-en-v1.5").map(|(_, d)| d), Some(768));
        assert!(resolve_model("gpt-embedder").is_none());
    }

    #[test]
    fn test_unknown_model_is_unavailable() {
        let err = match FastEmbedder::load("gpt-embedder", None, false) {
            Ok(_) => panic!("expected unsupported-model error"),
            Err(err) => err,
        };
        assert!(matches!(err, EmbedderError::Unavailable(_)));
    }
}
