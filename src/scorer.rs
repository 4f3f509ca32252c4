//! Classifier adapters and lazy model loading.
//!
//! The model is an opaque scoring function: chunk text in, five-class
//! distribution out. Anything that honors that contract (and the label
//! order) can stand in for it, including a test double.
//!
//! Loading happens at most once per [`LazyModel`]. The first caller pays
//! for the load; concurrent callers wait on the same load and then share
//! the resulting [`ModelHandle`]. A failed load is not remembered, so a
//! missing artifact keeps failing with
//! [`Error::ModelUnavailable`](crate::Error::ModelUnavailable) until it
//! appears.

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::codec::TokenCodec;
use crate::probability::Probabilities;
use crate::{Error, Result};

/// A sequence classifier over the five [`Label`](crate::Label)s.
pub trait SequenceScorer: Send + Sync {
    /// Score one chunk of text.
    ///
    /// Implementations pad or truncate to their fixed input width, run one
    /// forward pass without gradient tracking, and normalize the logits.
    /// Must be deterministic for fixed weights and input.
    ///
    /// # Errors
    ///
    /// [`Error::Tokenization`](crate::Error::Tokenization) or
    /// [`Error::Inference`](crate::Error::Inference).
    fn score(&self, text: &str) -> Result<Probabilities>;
}

impl<S: SequenceScorer + ?Sized> SequenceScorer for Arc<S> {
    fn score(&self, text: &str) -> Result<Probabilities> {
        (**self).score(text)
    }
}

/// A loaded tokenizer and classifier that share a vocabulary.
#[derive(Clone)]
pub struct ModelHandle {
    codec: Arc<dyn TokenCodec>,
    scorer: Arc<dyn SequenceScorer>,
}

impl ModelHandle {
    /// Bundle a codec with the scorer trained on its vocabulary.
    pub fn new(codec: impl TokenCodec + 'static, scorer: impl SequenceScorer + 'static) -> Self {
        Self {
            codec: Arc::new(codec),
            scorer: Arc::new(scorer),
        }
    }

    /// Bundle already-shared collaborators.
    #[must_use]
    pub fn from_shared(codec: Arc<dyn TokenCodec>, scorer: Arc<dyn SequenceScorer>) -> Self {
        Self { codec, scorer }
    }

    /// The tokenizer.
    #[must_use]
    pub fn codec(&self) -> &dyn TokenCodec {
        self.codec.as_ref()
    }

    /// The classifier.
    #[must_use]
    pub fn scorer(&self) -> &dyn SequenceScorer {
        self.scorer.as_ref()
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle").finish_non_exhaustive()
    }
}

/// Produces a [`ModelHandle`] from some artifact.
pub trait ModelLoader: Send + Sync {
    /// Load the tokenizer and classifier.
    ///
    /// # Errors
    ///
    /// [`Error::ModelUnavailable`](crate::Error::ModelUnavailable) if the
    /// artifact is missing or malformed.
    fn load(&self) -> Result<ModelHandle>;
}

impl<F> ModelLoader for F
where
    F: Fn() -> Result<ModelHandle> + Send + Sync,
{
    fn load(&self) -> Result<ModelHandle> {
        self()
    }
}

/// A model that is loaded on first use and cached afterwards.
///
/// ```rust
/// use papertriage::{LazyModel, ModelHandle, WordCodec, Probabilities, Label, SequenceScorer};
///
/// struct AlwaysTheory;
/// impl SequenceScorer for AlwaysTheory {
///     fn score(&self, _: &str) -> papertriage::Result<Probabilities> {
///         Ok(Probabilities::one_hot(Label::Theory))
///     }
/// }
///
/// let lazy = LazyModel::from_fn(|| Ok(ModelHandle::new(WordCodec::new(), AlwaysTheory)));
/// assert!(!lazy.is_loaded());
/// let a = lazy.get().unwrap();
/// let b = lazy.get().unwrap();
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
/// ```
pub struct LazyModel {
    loader: Box<dyn ModelLoader>,
    cell: OnceLock<Arc<ModelHandle>>,
    guard: Mutex<()>,
}

impl LazyModel {
    /// Wrap a loader. Nothing is loaded until [`LazyModel::get`].
    pub fn new(loader: impl ModelLoader + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            cell: OnceLock::new(),
            guard: Mutex::new(()),
        }
    }

    /// Wrap a loading closure.
    pub fn from_fn<F>(load: F) -> Self
    where
        F: Fn() -> Result<ModelHandle> + Send + Sync + 'static,
    {
        Self::new(load)
    }

    /// A lazy model that is already loaded.
    #[must_use]
    pub fn ready(handle: ModelHandle) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Arc::new(handle));
        Self {
            loader: Box::new(|| -> Result<ModelHandle> {
                Err(Error::Inference("preloaded model has no loader".to_string()))
            }),
            cell,
            guard: Mutex::new(()),
        }
    }

    /// Whether a load has succeeded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The cached handle, loading it first if needed.
    ///
    /// # Errors
    ///
    /// Whatever the loader returns. Failures are not cached.
    pub fn get(&self) -> Result<Arc<ModelHandle>> {
        if let Some(handle) = self.cell.get() {
            return Ok(Arc::clone(handle));
        }

        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = self.cell.get() {
            return Ok(Arc::clone(handle));
        }

        let handle = match self.loader.load() {
            Ok(handle) => Arc::new(handle),
            Err(e) => {
                log::warn!("model load failed: {e}");
                return Err(e);
            }
        };
        let _ = self.cell.set(Arc::clone(&handle));
        Ok(handle)
    }
}

impl fmt::Debug for LazyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyModel")
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}
