//! Token window configuration.
//!
//! ## The Problem
//!
//! A sequence classifier sees a fixed number of tokens per forward pass.
//! Research papers run to thousands of tokens. Truncating to the first
//! window throws away everything after the abstract.
//!
//! ## The Window
//!
//! Each forward pass gets `window` tokens, two of which are boundary
//! markers (`[CLS]` and `[SEP]` for BERT). The remaining `window - 2`
//! slots carry document tokens:
//!
//! ```text
//! window = 256
//!
//! [CLS] t0 t1 ... t253 [SEP]
//!       \_____254_____/
//!         content_len
//! ```
//!
//! ## Overlap
//!
//! Consecutive windows start `window - overlap` tokens apart. Because the
//! overlap is counted against the full window (markers included), two full
//! chunks share `overlap - 2` document tokens:
//!
//! ```text
//! window = 10, overlap = 4  =>  content_len = 8, step = 6
//!
//! Chunk 0: t0  .. t7    [0..8]
//! Chunk 1: t6  .. t13   [6..14]   <- shares t6, t7
//! Chunk 2: t12 .. t19   [12..20]  <- shares t12, t13
//! ```
//!
//! An overlap below 2 would make the step longer than a chunk and skip
//! tokens, so it is rejected.

use crate::{Error, Result};

/// Token slots reserved for boundary markers in every window.
pub const MARKER_SLOTS: usize = 2;

/// Default window size in tokens.
pub const DEFAULT_WINDOW: usize = 256;

/// Default overlap in tokens.
pub const DEFAULT_OVERLAP: usize = 40;

/// Window size and overlap for chunked inference.
///
/// # Examples
///
/// ```rust
/// use papertriage::TokenWindow;
///
/// let w = TokenWindow::new(256, 40).unwrap();
/// assert_eq!(w.content_len(), 254);
/// assert_eq!(w.step(), 216);
///
/// assert!(TokenWindow::new(256, 254).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenWindow {
    window: usize,
    overlap: usize,
}

impl TokenWindow {
    /// Create a validated window.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidWindow`] if `window <= 4`.
    /// - [`Error::InvalidOverlap`] unless `2 <= overlap < window - 2`.
    pub fn new(window: usize, overlap: usize) -> Result<Self> {
        if window <= 2 * MARKER_SLOTS {
            return Err(Error::InvalidWindow { window });
        }
        if overlap < MARKER_SLOTS || overlap >= window - MARKER_SLOTS {
            return Err(Error::InvalidOverlap { window, overlap });
        }
        Ok(Self { window, overlap })
    }

    /// Total tokens per forward pass, markers included.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Overlap between consecutive windows.
    #[must_use]
    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    /// Document tokens per chunk.
    #[must_use]
    pub const fn content_len(&self) -> usize {
        self.window - MARKER_SLOTS
    }

    /// Distance between consecutive chunk starts.
    #[must_use]
    pub const fn step(&self) -> usize {
        self.window - self.overlap
    }

    /// Document tokens shared by two consecutive full chunks.
    #[must_use]
    pub const fn shared_tokens(&self) -> usize {
        self.content_len() - self.step()
    }

    /// Number of chunks a sequence of `n_tokens` splits into.
    ///
    /// ```rust
    /// use papertriage::TokenWindow;
    ///
    /// let w = TokenWindow::default();
    /// assert_eq!(w.expected_chunks(0), 0);
    /// assert_eq!(w.expected_chunks(254), 1);
    /// assert_eq!(w.expected_chunks(255), 2);
    /// ```
    #[must_use]
    pub fn expected_chunks(&self, n_tokens: usize) -> usize {
        match n_tokens {
            0 => 0,
            n if n <= self.content_len() => 1,
            n => (n - self.content_len()).div_ceil(self.step()) + 1,
        }
    }
}

impl Default for TokenWindow {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl TryFrom<(usize, usize)> for TokenWindow {
    type Error = Error;

    fn try_from((window, overlap): (usize, usize)) -> Result<Self> {
        Self::new(window, overlap)
    }
}
