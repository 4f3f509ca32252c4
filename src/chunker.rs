//! Token-window chunking with overlap.
//!
//! Splits an encoded document into windows the classifier can take in one
//! forward pass, then decodes each window back to text.
//!
//! ## How It Works
//!
//! ```text
//! window = 10, overlap = 4  =>  content_len = 8, step = 6
//!
//! Tokens: t0 .. t16 (n = 17)
//!
//! Chunk 0: t0  .. t7    [0..8]
//! Chunk 1: t6  .. t13   [6..14]   <- starts at 0 + 6
//! Chunk 2: t12 .. t16   [12..17]  <- final chunk may be shorter
//! ```
//!
//! Chunking stops as soon as a chunk reaches the last token, so a trailing
//! chunk is never wholly contained in its predecessor.
//!
//! ## Why Token Ids?
//!
//! Splitting on characters or words would only approximate the window: the
//! same 1000 characters can be 180 or 400 subword tokens. Splitting the id
//! sequence itself makes each chunk fit exactly, and keeps the split
//! lossless. Padding a short final chunk is the scorer's business.

use std::ops::Range;

use crate::codec::TokenCodec;
use crate::{Chunk, Result, TokenWindow};

/// Splits token sequences into overlapping windows.
///
/// ## Example
///
/// ```rust
/// use papertriage::{TokenChunker, TokenWindow};
///
/// let chunker = TokenChunker::new(TokenWindow::new(10, 4).unwrap());
/// let spans = chunker.spans(17);
///
/// assert_eq!(spans, vec![0..8, 6..14, 12..17]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenChunker {
    window: TokenWindow,
}

impl TokenChunker {
    /// Create a chunker for the given window.
    #[must_use]
    pub const fn new(window: TokenWindow) -> Self {
        Self { window }
    }

    /// The window this chunker splits into.
    #[must_use]
    pub const fn window(&self) -> TokenWindow {
        self.window
    }

    /// Token spans for a sequence of `n_tokens`, in document order.
    ///
    /// Empty for `n_tokens == 0`; callers are expected to short-circuit
    /// before that happens.
    #[must_use]
    pub fn spans(&self, n_tokens: usize) -> Vec<Range<usize>> {
        let content_len = self.window.content_len();
        let step = self.window.step();
        let mut spans = Vec::with_capacity(self.window.expected_chunks(n_tokens));
        let mut start = 0;

        while start < n_tokens {
            let end = (start + content_len).min(n_tokens);
            spans.push(start..end);

            if end == n_tokens {
                break;
            }
            start += step;
        }

        spans
    }

    /// Split `tokens` into chunks and decode each one.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::Tokenization`](crate::Error::Tokenization) from
    /// the codec. No partial output is returned.
    pub fn chunk<C>(&self, codec: &C, tokens: &[u32]) -> Result<Vec<Chunk>>
    where
        C: TokenCodec + ?Sized,
    {
        self.spans(tokens.len())
            .into_iter()
            .enumerate()
            .map(|(index, span)| {
                let text = codec.decode(&tokens[span.clone()])?;
                Ok(Chunk::new(text, span.start, span.end, index))
            })
            .collect()
    }

    /// Encode `text` and chunk it in one step.
    ///
    /// # Errors
    ///
    /// Propagates codec errors.
    pub fn chunk_text<C>(&self, codec: &C, text: &str) -> Result<Vec<Chunk>>
    where
        C: TokenCodec + ?Sized,
    {
        let tokens = codec.encode(text)?;
        self.chunk(codec, &tokens)
    }
}
