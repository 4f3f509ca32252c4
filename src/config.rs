//! Classifier configuration.
//!
//! Every field has a default, so a JSON document only needs the fields it
//! changes:
//!
//! ```json
//! { "model_dir": "/srv/models/saved_bert", "force_cpu": true }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::aggregate::{Stabilizer, DEFAULT_STABILIZE_ANCHOR, DEFAULT_STABILIZE_BELOW};
use crate::window::{TokenWindow, DEFAULT_OVERLAP, DEFAULT_WINDOW};
use crate::{Error, Result};

/// Inputs shorter than this (in characters, after trimming) are not scored.
pub const DEFAULT_MIN_CHARS: usize = 30;

/// Confidence reported for inputs too short to score.
pub const DEFAULT_SHORT_CIRCUIT_CONFIDENCE: f32 = 0.99;

/// Default artifact directory.
pub const DEFAULT_MODEL_DIR: &str = "./saved_bert";

/// Settings for [`PaperClassifier`](crate::PaperClassifier).
///
/// ```rust
/// use papertriage::ClassifierConfig;
///
/// let cfg = ClassifierConfig::from_json(r#"{ "overlap": 64 }"#).unwrap();
/// assert_eq!(cfg.window, 256);
/// assert_eq!(cfg.overlap, 64);
/// assert_eq!(cfg.min_chars, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Directory holding the trained classifier and its tokenizer.
    pub model_dir: PathBuf,
    /// Tokens per forward pass, boundary markers included.
    pub window: usize,
    /// Tokens shared between consecutive windows, markers included.
    pub overlap: usize,
    /// Trimmed inputs shorter than this many characters short-circuit.
    pub min_chars: usize,
    /// Confidence reported on the short-circuit path.
    pub short_circuit_confidence: f32,
    /// Raw confidences below this are stabilized.
    pub stabilize_below: f32,
    /// Anchor that low confidences are pulled toward.
    pub stabilize_anchor: f32,
    /// Never use an accelerator even if one is available.
    pub force_cpu: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            window: DEFAULT_WINDOW,
            overlap: DEFAULT_OVERLAP,
            min_chars: DEFAULT_MIN_CHARS,
            short_circuit_confidence: DEFAULT_SHORT_CIRCUIT_CONFIDENCE,
            stabilize_below: DEFAULT_STABILIZE_BELOW,
            stabilize_anchor: DEFAULT_STABILIZE_ANCHOR,
            force_cpu: false,
        }
    }
}

impl ClassifierConfig {
    /// Parse from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on malformed JSON or unknown fields.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read and parse a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Set the artifact directory.
    #[must_use]
    pub fn with_model_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.model_dir = dir.into();
        self
    }

    /// Set window size and overlap.
    #[must_use]
    pub fn with_window(mut self, window: usize, overlap: usize) -> Self {
        self.window = window;
        self.overlap = overlap;
        self
    }

    /// Set the short-input threshold.
    #[must_use]
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }

    /// Force CPU inference.
    #[must_use]
    pub fn with_force_cpu(mut self, force_cpu: bool) -> Self {
        self.force_cpu = force_cpu;
        self
    }

    /// The validated token window.
    ///
    /// # Errors
    ///
    /// See [`TokenWindow::new`].
    pub fn token_window(&self) -> Result<TokenWindow> {
        TokenWindow::new(self.window, self.overlap)
    }

    /// The validated stabilizer.
    ///
    /// # Errors
    ///
    /// See [`Stabilizer::new`].
    pub fn stabilizer(&self) -> Result<Stabilizer> {
        Stabilizer::new(self.stabilize_below, self.stabilize_anchor)
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// The first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        self.token_window()?;
        self.stabilizer()?;
        if !(0.0..=1.0).contains(&self.short_circuit_confidence) {
            return Err(Error::Config(format!(
                "short_circuit_confidence {} outside [0, 1]",
                self.short_circuit_confidence
            )));
        }
        Ok(())
    }
}
