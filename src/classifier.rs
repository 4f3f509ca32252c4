//! The prediction pipeline.
//!
//! ```text
//! text ──trim──> < min_chars? ──yes──> (NotResearch, 0.99)
//!                     │ no
//!                     v
//!               load model (once)
//!                     │
//!                     v
//!   encode ──> chunk ──> score each chunk ──> mean ──> argmax ──> stabilize
//! ```
//!
//! One call is strictly sequential and all-or-nothing: any failing chunk
//! fails the document, and no partial result is returned.

use std::fmt;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;

use crate::aggregate::{round_to, ScoreAggregator, Stabilizer};
use crate::chunker::TokenChunker;
use crate::config::ClassifierConfig;
use crate::probability::Probabilities;
use crate::scorer::{LazyModel, ModelHandle, ModelLoader};
use crate::{Chunk, Error, Label, Result};

/// The answer for one document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    /// Predicted class.
    pub label: Label,
    /// Reported confidence, after stabilization.
    pub confidence: f32,
    /// Mean probability of `label` before stabilization.
    pub raw_confidence: f32,
    /// Number of chunks scored; zero on the short-circuit path.
    pub chunks: usize,
    /// Mean distribution over all chunks; `None` on the short-circuit path.
    pub probabilities: Option<Probabilities>,
}

impl Classification {
    fn short_circuit(confidence: f32) -> Self {
        Self {
            label: Label::NotResearch,
            confidence,
            raw_confidence: confidence,
            chunks: 0,
            probabilities: None,
        }
    }

    /// Whether the model was bypassed because the input was too short.
    #[must_use]
    pub const fn is_short_circuit(&self) -> bool {
        self.chunks == 0
    }

    /// Whether the document was judged to be a research paper.
    #[must_use]
    pub const fn is_research(&self) -> bool {
        self.label.is_research()
    }

    /// Whether stabilization changed the confidence.
    #[must_use]
    pub fn is_stabilized(&self) -> bool {
        self.confidence.to_bits() != self.raw_confidence.to_bits()
    }

    /// Confidence rounded to three decimals, for display.
    #[must_use]
    pub fn display_confidence(&self) -> f32 {
        round_to(f64::from(self.confidence), 3)
    }

    /// The `(label, confidence)` pair.
    #[must_use]
    pub const fn into_pair(self) -> (Label, f32) {
        (self.label, self.confidence)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.3})", self.label, self.confidence)
    }
}

/// Classifies documents of any length with a fixed-window model.
///
/// Tokenizer and classifier are injected through a [`ModelLoader`] and
/// loaded on the first call that needs them.
///
/// ```rust
/// use papertriage::{
///     ClassifierConfig, Label, ModelHandle, PaperClassifier, Probabilities,
///     SequenceScorer, WordCodec,
/// };
///
/// struct AlwaysJournal;
/// impl SequenceScorer for AlwaysJournal {
///     fn score(&self, _: &str) -> papertriage::Result<Probabilities> {
///         Ok(Probabilities::one_hot(Label::Journal))
///     }
/// }
///
/// let handle = ModelHandle::new(WordCodec::new(), AlwaysJournal);
/// let classifier = PaperClassifier::from_handle(handle, &ClassifierConfig::default()).unwrap();
///
/// let short = classifier.classify("Invoice #42").unwrap();
/// assert_eq!((short.label, short.confidence), (Label::NotResearch, 0.99));
///
/// let paper = classifier
///     .classify("We study convergence of stochastic gradient methods on convex losses.")
///     .unwrap();
/// assert_eq!(paper.label, Label::Journal);
/// ```
#[derive(Debug)]
pub struct PaperClassifier {
    model: LazyModel,
    chunker: TokenChunker,
    stabilizer: Stabilizer,
    min_chars: usize,
    short_circuit_confidence: f32,
}

impl PaperClassifier {
    /// Build a classifier that loads its model on first use.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate. The
    /// loader is not called here.
    pub fn new(loader: impl ModelLoader + 'static, config: &ClassifierConfig) -> Result<Self> {
        Self::with_model(LazyModel::new(loader), config)
    }

    /// Build a classifier around an already-loaded model.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate.
    pub fn from_handle(handle: ModelHandle, config: &ClassifierConfig) -> Result<Self> {
        Self::with_model(LazyModel::ready(handle), config)
    }

    /// Build a classifier backed by the BERT artifact in `config.model_dir`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate. A
    /// missing artifact is reported on the first classification.
    #[cfg(feature = "bert")]
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        Self::new(crate::bert::BertArtifact::from_config(config)?, config)
    }

    fn with_model(model: LazyModel, config: &ClassifierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            model,
            chunker: TokenChunker::new(config.token_window()?),
            stabilizer: config.stabilizer()?,
            min_chars: config.min_chars,
            short_circuit_confidence: config.short_circuit_confidence,
        })
    }

    /// The chunker in use.
    #[must_use]
    pub const fn chunker(&self) -> &TokenChunker {
        &self.chunker
    }

    /// Whether the model has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.model.is_loaded()
    }

    /// Load the model now instead of on the first request.
    ///
    /// # Errors
    ///
    /// [`Error::ModelUnavailable`] if the artifact cannot be loaded.
    pub fn preload(&self) -> Result<()> {
        self.model.get().map(|_| ())
    }

    /// Whether `text` is too short to be worth scoring.
    #[must_use]
    pub fn is_trivial(&self, text: &str) -> bool {
        text.trim().chars().count() < self.min_chars
    }

    /// Classify one document's plain text.
    ///
    /// # Errors
    ///
    /// - [`Error::ModelUnavailable`] if the model cannot be loaded.
    /// - [`Error::Tokenization`] if the tokenizer rejects the text.
    /// - [`Error::Inference`] or [`Error::InvalidProbabilities`] if scoring
    ///   a chunk fails.
    pub fn classify(&self, text: &str) -> Result<Classification> {
        if self.is_trivial(text) {
            log::debug!("input below {} chars, skipping model", self.min_chars);
            return Ok(Classification::short_circuit(self.short_circuit_confidence));
        }

        let model = self.model.get()?;
        let tokens = model.codec().encode(text)?;
        if tokens.is_empty() {
            log::debug!("input encoded to no tokens, skipping model");
            return Ok(Classification::short_circuit(self.short_circuit_confidence));
        }

        let chunks = self.chunker.chunk(model.codec(), &tokens)?;
        let mut aggregator = ScoreAggregator::new();
        for chunk in &chunks {
            let probabilities = model.scorer().score(&chunk.text)?;
            log::trace!("chunk {} {:?}", chunk.index, probabilities.as_array());
            aggregator.push(&probabilities);
        }

        let aggregate = aggregator.finish(&self.stabilizer).ok_or_else(|| {
            Error::Inference("no chunks produced for non-empty input".to_string())
        })?;

        log::debug!(
            "classified {} tokens in {} chunks: {} raw={:.4} reported={:.4}",
            tokens.len(),
            aggregate.chunks,
            aggregate.label,
            aggregate.raw_confidence,
            aggregate.confidence,
        );

        Ok(Classification {
            label: aggregate.label,
            confidence: aggregate.confidence,
            raw_confidence: aggregate.raw_confidence,
            chunks: aggregate.chunks,
            probabilities: Some(aggregate.probabilities),
        })
    }

    /// Classify the contents of a UTF-8 text file.
    ///
    /// # Errors
    ///
    /// - [`Error::Tokenization`] if the file is not valid UTF-8.
    /// - [`Error::Io`] if it cannot be read at all.
    /// - Otherwise as [`PaperClassifier::classify`].
    pub fn classify_file(&self, path: impl AsRef<Path>) -> Result<Classification> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::InvalidData => Error::Tokenization(format!("{}: {e}", path.display())),
            _ => Error::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        self.classify(&text)
    }

    /// The chunks `text` would be scored as. Empty for trivial input.
    ///
    /// # Errors
    ///
    /// As [`PaperClassifier::classify`], minus scoring errors.
    pub fn chunks(&self, text: &str) -> Result<Vec<Chunk>> {
        if self.is_trivial(text) {
            return Ok(Vec::new());
        }
        let model = self.model.get()?;
        self.chunker.chunk_text(model.codec(), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SequenceScorer, WordCodec};

    struct Fixed([f32; 5]);

    impl SequenceScorer for Fixed {
        fn score(&self, _text: &str) -> Result<Probabilities> {
            Probabilities::try_from_array(self.0)
        }
    }

    fn classifier(scores: [f32; 5]) -> PaperClassifier {
        let handle = ModelHandle::new(WordCodec::new(), Fixed(scores));
        PaperClassifier::from_handle(handle, &ClassifierConfig::default()).unwrap()
    }

    const ABSTRACT: &str = "We propose a new method for sparse attention and evaluate it.";

    #[test]
    fn test_short_input_short_circuits() {
        let c = classifier([1.0, 0.0, 0.0, 0.0, 0.0]);
        let out = c.classify("   too short   ").unwrap();
        assert_eq!(out.into_pair(), (Label::NotResearch, 0.99));
        assert!(out.is_short_circuit());
        assert!(out.probabilities.is_none());
    }

    #[test]
    fn test_threshold_counts_trimmed_chars() {
        let c = classifier([1.0, 0.0, 0.0, 0.0, 0.0]);
        let exactly_30 = format!("  {}  ", "x".repeat(30));
        let just_under = format!("\n{}\n", "x".repeat(29));
        assert_eq!(c.classify(&exactly_30).unwrap().label, Label::Conference);
        assert_eq!(c.classify(&just_under).unwrap().label, Label::NotResearch);
    }

    #[test]
    fn test_confident_prediction() {
        let out = classifier([0.02, 0.03, 0.9, 0.03, 0.02]).classify(ABSTRACT).unwrap();
        assert_eq!(out.label, Label::Implementation);
        assert!((out.confidence - 0.9).abs() < 1e-6);
        assert_eq!(out.chunks, 1);
        assert!(!out.is_stabilized());
    }

    #[test]
    fn test_low_confidence_is_stabilized() {
        let out = classifier([0.1, 0.2, 0.2, 0.4, 0.1]).classify(ABSTRACT).unwrap();
        assert_eq!(out.label, Label::Theory);
        assert!((out.raw_confidence - 0.4).abs() < 1e-6);
        assert!((out.confidence - 0.52).abs() < 1e-6);
        assert!(out.is_stabilized());
    }

    #[test]
    fn test_display_confidence_rounds() {
        let out = classifier([0.0, 0.0, 0.0, 0.0, 1.0]).classify(ABSTRACT).unwrap();
        assert_eq!(out.display_confidence(), 1.0);
        assert_eq!(out.to_string(), "NotResearch (1.000)");
    }

    #[test]
    fn test_chunks_for_inspection() {
        let c = classifier([1.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(c.chunks("short").unwrap().is_empty());
        let chunks = c.chunks(ABSTRACT).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, ABSTRACT);
    }
}
