//! Tokenizer adapters.
//!
//! The classifier only ever sees text; the chunker only ever sees token ids.
//! A [`TokenCodec`] converts between the two using the same vocabulary the
//! classifier was trained with.
//!
//! ## Contract
//!
//! - `encode` never truncates and never inserts boundary markers, so the
//!   length of the result is the true token length of the document.
//! - `decode` strips boundary markers and adds nothing beyond what subword
//!   merging produces.
//! - Re-encoding a decoded chunk gives an equivalent sequence. Exact ids may
//!   differ at chunk edges where a subword was cut, but no interior token is
//!   dropped.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, Result};

/// Text to token-id codec.
///
/// Implementations must be shareable across threads; one codec instance
/// serves every request for the lifetime of the process.
pub trait TokenCodec: Send + Sync {
    /// Encode text into token ids, without special tokens or truncation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tokenization`] if the tokenizer rejects the input.
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    /// Decode token ids back into text, skipping special tokens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tokenization`] on ids outside the vocabulary.
    fn decode(&self, ids: &[u32]) -> Result<String>;

    /// Token length of `text`.
    ///
    /// # Errors
    ///
    /// Same as [`TokenCodec::encode`].
    fn count_tokens(&self, text: &str) -> Result<usize> {
        self.encode(text).map(|ids| ids.len())
    }
}

impl<C: TokenCodec + ?Sized> TokenCodec for std::sync::Arc<C> {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        (**self).encode(text)
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        (**self).decode(ids)
    }
}

#[derive(Debug, Default)]
struct Vocab {
    ids: HashMap<String, u32>,
    segments: Vec<String>,
}

/// A self-contained codec over Unicode word boundaries (UAX #29).
///
/// Every word, space run, and punctuation mark becomes one token. The
/// vocabulary grows as new segments are encoded, so the codec is lossless:
/// decoding an encoding reproduces the input exactly.
///
/// Useful when no trained tokenizer is at hand: demos, tests, and measuring
/// how a chunking configuration behaves on real text.
///
/// The vocabulary is never pruned and grows with every new segment seen.
/// Meant for tests and demos; a long-running service should use a trained,
/// fixed-vocabulary codec.
///
/// ```rust
/// use papertriage::{TokenCodec, WordCodec};
///
/// let codec = WordCodec::new();
/// let ids = codec.encode("Attention is all you need.").unwrap();
/// assert_eq!(ids.len(), 10); // 5 words, 4 spaces, 1 period
/// assert_eq!(codec.decode(&ids).unwrap(), "Attention is all you need.");
/// ```
#[derive(Debug, Default)]
pub struct WordCodec {
    vocab: RwLock<Vocab>,
}

impl WordCodec {
    /// Create a codec with an empty vocabulary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct segments seen so far.
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.vocab
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .segments
            .len()
    }

    fn lookup(&self, segment: &str) -> Option<u32> {
        self.vocab
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .ids
            .get(segment)
            .copied()
    }

    fn intern(&self, segment: &str) -> Result<u32> {
        let mut vocab = self.vocab.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(&id) = vocab.ids.get(segment) {
            return Ok(id);
        }
        let id = u32::try_from(vocab.segments.len())
            .map_err(|_| Error::Tokenization("vocabulary exhausted".to_string()))?;
        vocab.ids.insert(segment.to_string(), id);
        vocab.segments.push(segment.to_string());
        Ok(id)
    }
}

impl TokenCodec for WordCodec {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        text.split_word_bounds()
            .map(|segment| match self.lookup(segment) {
                Some(id) => Ok(id),
                None => self.intern(segment),
            })
            .collect()
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        let vocab = self.vocab.read().unwrap_or_else(PoisonError::into_inner);
        let mut out = String::new();
        for &id in ids {
            let segment = vocab
                .segments
                .get(id as usize)
                .ok_or_else(|| Error::Tokenization(format!("unknown token id {id}")))?;
            out.push_str(segment);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lossless_roundtrip() {
        let codec = WordCodec::new();
        let text = "  Deep nets,\n\tfine-tuned: 95.3% accuracy (see Table 2).  ";
        let ids = codec.encode(text).unwrap();
        assert_eq!(codec.decode(&ids).unwrap(), text);
    }

    #[test]
    fn test_repeated_segments_share_ids() {
        let codec = WordCodec::new();
        let ids = codec.encode("proof proof proof").unwrap();
        assert_eq!(ids[0], ids[2]);
        assert_eq!(ids[0], ids[4]);
        assert_eq!(codec.vocab_size(), 2);
    }

    #[test]
    fn test_reencode_is_identical() {
        let codec = WordCodec::new();
        let ids = codec.encode("We prove the lemma by induction.").unwrap();
        let text = codec.decode(&ids[2..6]).unwrap();
        assert_eq!(codec.encode(&text).unwrap(), ids[2..6].to_vec());
    }

    #[test]
    fn test_vocabulary_only_grows() {
        let codec = WordCodec::new();
        codec.encode("first batch").unwrap();
        let after_first = codec.vocab_size();
        codec.encode("second batch").unwrap();
        assert_eq!(codec.vocab_size(), after_first + 1);
        codec.encode("first batch").unwrap();
        assert_eq!(codec.vocab_size(), after_first + 1);
    }

    #[test]
    fn test_unknown_id_is_tokenization_error() {
        let codec = WordCodec::new();
        assert!(matches!(codec.decode(&[7]), Err(Error::Tokenization(_))));
    }

    #[test]
    fn test_empty_text() {
        let codec = WordCodec::new();
        assert!(codec.encode("").unwrap().is_empty());
        assert_eq!(codec.count_tokens("").unwrap(), 0);
        assert_eq!(codec.decode(&[]).unwrap(), "");
    }

    #[test]
    fn test_multibyte_text() {
        let codec = WordCodec::new();
        let text = "Théorème de Gödel: 日本語のテキスト";
        let ids = codec.encode(text).unwrap();
        assert_eq!(codec.decode(&ids).unwrap(), text);
    }
}
