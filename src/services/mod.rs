// Service exports
pub mod embedding;
#[cfg(feature = "semantic")]
pub mod fastembed_embedder;

pub use embedding::{
    Embedder, EmbedderError, EmbedderResult, EmbeddingProvider, ModelLoader, SemanticAvailability,
};
#[cfg(feature = "semantic")]
pub use fastembed_embedder::{FastEmbedLoader, FastEmbedder};

use crate::config::SemanticSettings;

/// Provider for the compiled-in embedding backend
#[cfg(feature = "semantic")]
pub fn embedding_provider(settings: &SemanticSettings) -> Option<EmbeddingProvider> {
    Some(EmbeddingProvider::new(FastEmbedLoader::from_settings(settings)))
}

/// Provider for the compiled-in embedding backend; none without the `semantic` feature
#[cfg(not(feature = "semantic"))]
pub fn embedding_provider(_settings: &SemanticSettings) -> Option<EmbeddingProvider> {
    None
}
