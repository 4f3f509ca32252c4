//! Property-based tests for chunking and aggregation.
//!
//! These tests verify the invariants the pipeline depends on:
//! - Count: chunk count follows the window arithmetic exactly
//! - Coverage: every token lands in at least one chunk
//! - Bounds: no chunk exceeds the window's content length
//! - Aggregation: the mean is a distribution and ignores scoring order

use std::ops::Range;

use proptest::prelude::*;
use papertriage::{
    Label, Probabilities, ScoreAggregator, Stabilizer, TokenChunker, TokenCodec, TokenWindow,
    WordCodec,
};

// =============================================================================
// Test Generators
// =============================================================================

/// A valid (window, overlap) pair.
fn arbitrary_window() -> impl Strategy<Value = TokenWindow> {
    (5usize..300)
        .prop_flat_map(|w| (Just(w), 2usize..w - 2))
        .prop_map(|(w, o)| TokenWindow::new(w, o).unwrap())
}

/// Softmax of random logits: always a valid distribution.
fn arbitrary_probabilities() -> impl Strategy<Value = Probabilities> {
    prop::array::uniform5(-8.0f32..8.0).prop_map(Probabilities::from_logits)
}

/// Word-like text.
fn word_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::string::string_regex("[A-Za-z]{1,12}").unwrap(), 1..200)
        .prop_map(|words| words.join(" "))
}

// =============================================================================
// Invariant Helpers
// =============================================================================

/// Every index in `0..n` is inside some span.
fn spans_cover(spans: &[Range<usize>], n: usize) -> bool {
    let mut covered = vec![false; n];
    for span in spans {
        for c in &mut covered[span.clone()] {
            *c = true;
        }
    }
    covered.iter().all(|&c| c)
}

/// Spans start in increasing order.
fn spans_ordered(spans: &[Range<usize>]) -> bool {
    spans.windows(2).all(|w| w[0].start < w[1].start)
}

// =============================================================================
// Chunker Tests
// =============================================================================

proptest! {
    #[test]
    fn short_sequence_is_one_chunk(window in arbitrary_window(), frac in 0.0f64..1.0) {
        let n = 1 + (frac * (window.content_len() - 1) as f64) as usize;
        let spans = TokenChunker::new(window).spans(n);
        prop_assert_eq!(spans, vec![0..n]);
    }

    #[test]
    fn long_sequence_chunk_count(window in arbitrary_window(), extra in 1usize..5000) {
        let n = window.content_len() + extra;
        let spans = TokenChunker::new(window).spans(n);
        let expected = (n - window.content_len()).div_ceil(window.step()) + 1;
        prop_assert_eq!(spans.len(), expected);
        prop_assert_eq!(window.expected_chunks(n), expected);
    }

    #[test]
    fn spans_cover_every_token(window in arbitrary_window(), n in 1usize..3000) {
        let spans = TokenChunker::new(window).spans(n);
        prop_assert!(!spans.is_empty());
        prop_assert!(spans_cover(&spans, n));
        prop_assert!(spans_ordered(&spans));
        prop_assert_eq!(spans.first().map(|s| s.start), Some(0));
        prop_assert_eq!(spans.last().map(|s| s.end), Some(n));
    }

    #[test]
    fn spans_fit_window(window in arbitrary_window(), n in 1usize..3000) {
        for span in TokenChunker::new(window).spans(n) {
            prop_assert!(!span.is_empty());
            prop_assert!(span.len() <= window.content_len());
        }
    }

    #[test]
    fn full_chunks_share_overlap(window in arbitrary_window(), n in 1usize..3000) {
        let spans = TokenChunker::new(window).spans(n);
        for pair in spans.windows(2) {
            if pair[1].len() == window.content_len() {
                prop_assert_eq!(pair[0].end - pair[1].start, window.shared_tokens());
            }
        }
    }

    #[test]
    fn decoded_chunks_reencode_within_budget(text in word_text()) {
        let codec = WordCodec::new();
        let window = TokenWindow::new(32, 8).unwrap();
        let chunks = TokenChunker::new(window).chunk_text(&codec, &text).unwrap();

        for chunk in &chunks {
            let reencoded = codec.count_tokens(&chunk.text).unwrap();
            prop_assert!(reencoded <= window.content_len());
        }
    }

    #[test]
    fn single_chunk_equals_whole_decode(text in word_text()) {
        let codec = WordCodec::new();
        let tokens = codec.encode(&text).unwrap();
        let window = TokenWindow::new(512, 40).unwrap();
        prop_assume!(tokens.len() <= window.content_len());

        let chunks = TokenChunker::new(window).chunk(&codec, &tokens).unwrap();
        prop_assert_eq!(chunks.len(), 1);
        prop_assert_eq!(&chunks[0].text, &codec.decode(&tokens).unwrap());
    }
}

// =============================================================================
// Aggregation Tests
// =============================================================================

proptest! {
    #[test]
    fn mean_is_a_distribution(
        vectors in prop::collection::vec(arbitrary_probabilities(), 1..50)
    ) {
        let mean = vectors.iter().copied().collect::<ScoreAggregator>().mean().unwrap();
        let total: f32 = mean.as_array().iter().sum();
        prop_assert!((total - 1.0).abs() < 1e-4);
        prop_assert!(mean.as_array().iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn mean_ignores_scoring_order(
        vectors in prop::collection::vec(arbitrary_probabilities(), 1..50)
    ) {
        let forward: ScoreAggregator = vectors.iter().copied().collect();
        let backward: ScoreAggregator = vectors.iter().rev().copied().collect();

        let a = forward.mean().unwrap();
        let b = backward.mean().unwrap();
        for (x, y) in a.as_array().iter().zip(b.as_array()) {
            prop_assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn stabilized_confidence_in_range(
        vectors in prop::collection::vec(arbitrary_probabilities(), 1..20)
    ) {
        let agg: ScoreAggregator = vectors.into_iter().collect();
        let out = agg.finish(&Stabilizer::default()).unwrap();
        prop_assert!((0.0..=1.0).contains(&out.confidence));
        prop_assert!(out.confidence >= out.raw_confidence);
        prop_assert_eq!(out.label, out.probabilities.argmax());
    }

    #[test]
    fn stabilizer_band(raw in 0.0f32..1.0) {
        let s = Stabilizer::default();
        let out = s.apply(raw);
        if raw < s.threshold() {
            prop_assert!(out >= s.anchor() / 2.0 - 1e-4);
            prop_assert!(out <= (s.threshold() + s.anchor()) / 2.0 + 1e-4);
        } else {
            prop_assert_eq!(out, raw);
        }
    }
}

// =============================================================================
// Edge Cases
// =============================================================================

#[test]
fn empty_sequence_produces_no_chunks() {
    let chunker = TokenChunker::default();
    assert!(chunker.spans(0).is_empty());
    assert!(chunker.chunk(&WordCodec::new(), &[]).unwrap().is_empty());
}

#[test]
fn one_hot_mean_is_exact() {
    let agg: ScoreAggregator = std::iter::repeat(Probabilities::one_hot(Label::Theory))
        .take(7)
        .collect();
    let mean = agg.mean().unwrap();
    assert_eq!(mean.get(Label::Theory), 1.0);
    assert_eq!(mean.get(Label::Journal), 0.0);
}
