//! # papertriage
//!
//! Classify research papers of any length with a fixed-window classifier.
//!
//! ## The Problem
//!
//! A fine-tuned BERT classifier takes 256 tokens. A conference paper is
//! 8,000. Truncating keeps the title and abstract and drops the evidence:
//! the experiments that make it an implementation paper, the proofs that
//! make it a theory paper, the absence of either that makes it a receipt.
//!
//! ## The Pipeline
//!
//! ```text
//! Document text
//!      │
//!      ├── trimmed < 30 chars ──────────────> (NotResearch, 0.99)
//!      │
//!      v
//! encode (no truncation, no [CLS]/[SEP])
//!      │      t0 t1 t2 ... t8191
//!      v
//! split into overlapping windows
//!      │      [t0..t253] [t216..t469] [t432..t685] ...
//!      v
//! decode each window, score it
//!      │      p0 = [0.61 0.20 0.09 0.06 0.04]
//!      │      p1 = [0.55 0.25 0.10 0.06 0.04]
//!      │      ...
//!      v
//! mean of chunk distributions, argmax
//!      │
//!      v
//! stabilize low confidence ───────────────> (Conference, 0.58)
//! ```
//!
//! ## Labels
//!
//! Five classes, in a fixed order shared with the trained model:
//! `Conference`, `Journal`, `Implementation`, `Theory`, `NotResearch`.
//!
//! ## Quick Start
//!
//! ```rust
//! use papertriage::{
//!     ClassifierConfig, Label, ModelHandle, PaperClassifier, Probabilities,
//!     SequenceScorer, WordCodec,
//! };
//!
//! // Any scorer honoring the five-label contract will do.
//! struct KeywordScorer;
//! impl SequenceScorer for KeywordScorer {
//!     fn score(&self, text: &str) -> papertriage::Result<Probabilities> {
//!         let label = if text.contains("theorem") { Label::Theory } else { Label::Journal };
//!         Ok(Probabilities::one_hot(label))
//!     }
//! }
//!
//! let handle = ModelHandle::new(WordCodec::new(), KeywordScorer);
//! let classifier = PaperClassifier::from_handle(handle, &ClassifierConfig::default())?;
//!
//! let result = classifier.classify("We prove the main theorem by induction on n.")?;
//! assert_eq!(result.label, Label::Theory);
//! # Ok::<(), papertriage::Error>(())
//! ```
//!
//! ## BERT Backend (requires `bert` feature)
//!
//! ```rust,ignore
//! use papertriage::{ClassifierConfig, PaperClassifier};
//!
//! let config = ClassifierConfig::default().with_model_dir("./saved_bert");
//! let classifier = PaperClassifier::from_config(&config)?;
//! let result = classifier.classify(&extracted_text)?;
//! println!("{} ({:.3})", result.label, result.display_confidence());
//! ```
//!
//! ## Cost
//!
//! | Document | Tokens | Chunks (256/40) | Forward passes |
//! |----------|--------|-----------------|----------------|
//! | Abstract | 250 | 1 | 1 |
//! | Short paper | 4,000 | 19 | 19 |
//! | Long paper | 12,000 | 56 | 56 |
//!
//! Chunks are scored sequentially, in document order.

mod aggregate;
mod chunk;
mod chunker;
mod classifier;
mod codec;
mod config;
mod error;
mod label;
mod probability;
mod scorer;
mod window;

#[cfg(feature = "bert")]
mod bert;

pub use aggregate::{Aggregate, ScoreAggregator, Stabilizer};
pub use chunk::Chunk;
pub use chunker::TokenChunker;
pub use classifier::{Classification, PaperClassifier};
pub use codec::{TokenCodec, WordCodec};
pub use config::ClassifierConfig;
pub use error::{Error, Result};
pub use label::{Label, ParseLabelError, NUM_LABELS};
pub use probability::Probabilities;
pub use scorer::{LazyModel, ModelHandle, ModelLoader, SequenceScorer};
pub use window::{TokenWindow, MARKER_SLOTS};

#[cfg(feature = "bert")]
pub use bert::{BertArtifact, BertSequenceScorer, HfTokenizerCodec};
