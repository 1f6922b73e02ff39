//! Sentence-embedding plumbing for the semantic strategy.
//!
//! [`Embedder`] is the seam every embedding backend sits behind. The
//! [`EmbeddingProvider`] owns the process-wide model handle: it loads the model
//! on first use through a [`ModelLoader`], keeps it for the life of the
//! process, and lets a failed load be retried on the next call.
//!
//! [`SemanticAvailability`] is decided once at startup and tells the matcher
//! whether a semantic strategy should be wired in at all.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use once_cell::sync::OnceCell;
use thiserror::Error;
use crate::config::SemanticSettings;

/// Errors raised by embedding backends
#[derive(Debug, Error)]
pub enum EmbedderError {
    /// The backend is not compiled in, disabled, or its model failed to load.
    #[error("Embedder unavailable: {0}")]
    Unavailable(String),

    /// The model was loaded but could not embed the input.
    #[error("Embedding failed: {0}")]
    EmbeddingFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type EmbedderResult<T> = Result<T, EmbedderError>;

/// Text embedding backend
///
/// Every vector produced by one embedder has exactly [`dimension()`](Self::dimension)
/// components. The empty string is valid input and must embed like any other text.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> EmbedderResult<Vec<f32>>;

    /// Embed several texts, returning vectors in input order
    ///
    /// The default calls [`embed()`](Self::embed) per text; backends with batched
    /// inference should override it.
    fn embed_batch(&self, texts: &[&str]) -> EmbedderResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize;

    /// Stable identifier, e.g. `all-MiniLM-L6-v2`
    fn id(&self) -> &str;
}

/// Constructs an embedder; may be slow (downloads, disk reads)
pub trait ModelLoader: Send + Sync {
    fn model_id(&self) -> &str;

    fn load(&self) -> EmbedderResult<Arc<dyn Embedder>>;
}

/// Lazily loaded, write-once embedder handle
///
/// The first successful [`get()`](Self::get) stores the model; concurrent first
/// callers block on the same initialization instead of loading twice. Once
/// stored, reads are lock-free. A failed load stores nothing.
pub struct EmbeddingProvider {
    loader: Box<dyn ModelLoader>,
    handle: OnceCell<Arc<dyn Embedder>>,
    load_attempts: AtomicUsize,
}

impl EmbeddingProvider {
    pub fn new(loader: impl ModelLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            handle: OnceCell::new(),
            load_attempts: AtomicUsize::new(0),
        }
    }

    /// Wrap an embedder that is already loaded
    pub fn preloaded(embedder: Arc<dyn Embedder>) -> Self {
        let provider = Self::new(PreloadedLoader(embedder.id().to_string()));
        // A fresh cell cannot already be set.
        let _ = provider.handle.set(embedder);
        provider
    }

    pub fn model_id(&self) -> &str {
        self.loader.model_id()
    }

    /// Returns the cached embedder, loading it first if needed
    pub fn get(&self) -> EmbedderResult<Arc<dyn Embedder>> {
        self.handle
            .get_or_try_init(|| {
                let attempt = self.load_attempts.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::info!(
                    "Loading embedding model {} (attempt {})",
                    self.loader.model_id(),
                    attempt
                );
                let started = std::time::Instant::now();
                let embedder = self.loader.load().map_err(|e| {
                    tracing::warn!("Embedding model {} failed to load: {}", self.loader.model_id(), e);
                    e
                })?;
                tracing::info!(
                    "Embedding model {} loaded in {:?} ({} dims)",
                    embedder.id(),
                    started.elapsed(),
                    embedder.dimension()
                );
                Ok(embedder)
            })
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.get().is_some()
    }

    /// Number of times the loader has been invoked
    pub fn load_attempts(&self) -> usize {
        self.load_attempts.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingProvider")
            .field("model_id", &self.model_id())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

struct PreloadedLoader(String);

impl ModelLoader for PreloadedLoader {
    fn model_id(&self) -> &str {
        &self.0
    }

    fn load(&self) -> EmbedderResult<Arc<dyn Embedder>> {
        Err(EmbedderError::Internal("preloaded provider has no loader".to_string()))
    }
}

/// Whether the semantic strategy can be offered in this process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticAvailability {
    Ready { model_id: String },
    /// Built without the `semantic` feature.
    NotCompiled,
    /// Turned off through `semantic.enabled`.
    Disabled,
}

impl SemanticAvailability {
    /// Decide availability from the build and the configuration
    pub fn probe(settings: &SemanticSettings) -> Self {
        if !cfg!(feature = "semantic") {
            return SemanticAvailability::NotCompiled;
        }
        if !settings.enabled {
            return SemanticAvailability::Disabled;
        }
        SemanticAvailability::Ready {
            model_id: settings.model.clone(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SemanticAvailability::Ready { .. })
    }

    pub fn summary(&self) -> String {
        match self {
            SemanticAvailability::Ready { model_id } => format!("semantic ready ({model_id})"),
            SemanticAvailability::NotCompiled => "semantic not compiled in".to_string(),
            SemanticAvailability::Disabled => "semantic disabled by configuration".to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    /// Deterministic bag-of-characters embedder for tests
    pub(crate) struct CharEmbedder;

    impl Embedder for CharEmbedder {
        fn embed(&self, text: &str) -> EmbedderResult<Vec<f32>> {
            let mut v = vec![0.0f32; 26];
            for c in text.to_lowercase().chars().filter(|c| c.is_ascii_lowercase()) {
                v[(c as u8 - b'a') as usize] += 1.0;
            }
            Ok(v)
        }

        fn dimension(&self) -> usize {
            26
        }

        fn id(&self) -> &str {
            "char-26"
        }
    }

    struct CountingLoader {
        calls: Arc<AtomicUsize>,
        fail_first: usize,
    }

    impl ModelLoader for CountingLoader {
        fn model_id(&self) -> &str {
            "char-26"
        }

        fn load(&self) -> EmbedderResult<Arc<dyn Embedder>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(20));
            if call < self.fail_first {
                return Err(EmbedderError::Unavailable("network down".to_string()));
            }
            Ok(Arc::new(CharEmbedder))
        }
    }

    #[test]
    fn test_loads_once_and_caches() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = EmbeddingProvider::new(CountingLoader { calls: calls.clone(), fail_first: 0 });

        assert!(!provider.is_loaded());
        let first = provider.get().unwrap();
        let second = provider.get().unwrap();

        assert!(provider.is_loaded());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = EmbeddingProvider::new(CountingLoader { calls: calls.clone(), fail_first: 1 });

        assert!(matches!(provider.get(), Err(EmbedderError::Unavailable(_))));
        assert!(!provider.is_loaded());

        assert!(provider.get().is_ok());
        assert_eq!(provider.load_attempts(), 2);
    }

    #[test]
    fn test_concurrent_first_calls_load_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(EmbeddingProvider::new(CountingLoader {
            calls: calls.clone(),
            fail_first: 0,
        }));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let provider = provider.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    provider.get().is_ok()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_preloaded_provider() {
        let provider = EmbeddingProvider::preloaded(Arc::new(CharEmbedder));
        assert!(provider.is_loaded());
        assert_eq!(provider.model_id(), "char-26");
        assert!(provider.get().is_ok());
        assert_eq!(provider.load_attempts(), 0);
    }

    #[test]
    fn test_availability_probe() {
        let mut settings = SemanticSettings::default();
        let probed = SemanticAvailability::probe(&settings);
        if cfg!(feature = "semantic") {
            assert!(probed.is_ready());
            assert!(probed.summary().contains(&settings.model));
        } else {
            assert_eq!(probed, SemanticAvailability::NotCompiled);
        }

        settings.enabled = false;
        let probed = SemanticAvailability::probe(&settings);
        assert!(!probed.is_ready());
    }

    #[test]
    fn test_error_display() {
        let err = EmbedderError::Unavailable("model not downloaded".to_string());
        assert!(err.to_string().contains("unavailable"));
        assert!(err.to_string().contains("model not downloaded"));

        let err = EmbedderError::EmbeddingFailed("inference error".to_string());
        assert!(err.to_string().contains("Embedding failed"));
    }
}
