//! The Chunk type: a decoded window of document tokens.

/// A contiguous run of document tokens, decoded back to text.
///
/// `start` and `end` are token offsets into the encoded document, not byte
/// offsets into the text. Chunks exist only for the duration of a single
/// classification and are never persisted.
///
/// ## Overlap
///
/// Consecutive chunks share tokens at their boundary:
///
/// ```text
/// Tokens:  t0 t1 t2 t3 t4 t5 t6 t7 t8 t9
/// Chunk 0: t0 .. t5       [0..6]
/// Chunk 1:       t4 .. t9 [4..10]
///                ^^^^^
///           shared [4..6]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The decoded chunk text.
    pub text: String,
    /// Token offset where this chunk starts.
    pub start: usize,
    /// Token offset where this chunk ends (exclusive).
    pub end: usize,
    /// Zero-based index of this chunk in document order.
    pub index: usize,
}

impl Chunk {
    /// Create a new chunk.
    #[must_use]
    pub fn new(text: impl Into<String>, start: usize, end: usize, index: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            index,
        }
    }

    /// Number of document tokens in this chunk.
    #[must_use]
    pub fn token_len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the chunk covers no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The token span of this chunk.
    #[must_use]
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl std::fmt::Display for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunk {{ index: {}, tokens: {}..{}, chars: {} }}",
            self.index,
            self.start,
            self.end,
            self.text.chars().count()
        )
    }
}
