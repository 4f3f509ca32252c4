//! Combining per-chunk scores into one document score.
//!
//! ## Mean, Not Vote
//!
//! Each chunk yields a probability vector. The document vector is their
//! unweighted arithmetic mean:
//!
//! ```text
//! chunk 0: [0.70, 0.10, 0.10, 0.05, 0.05]
//! chunk 1: [0.60, 0.20, 0.10, 0.05, 0.05]
//! chunk 2: [0.05, 0.05, 0.05, 0.05, 0.80]   <- references section
//!          ----------------------------------
//! mean:    [0.45, 0.12, 0.08, 0.05, 0.30]   -> Conference, 0.45
//! ```
//!
//! A majority vote would throw away how sure each chunk was; the mean keeps
//! calibration and one odd chunk cannot flip a confident document. The mean
//! of distributions is itself a distribution.
//!
//! ## Stabilization
//!
//! A raw top score below the threshold (0.55) is pulled halfway toward an
//! anchor (0.64) and rounded to four decimals:
//!
//! ```text
//! raw 0.10 -> (0.10 + 0.64) / 2 = 0.37
//! raw 0.54 -> (0.54 + 0.64) / 2 = 0.59
//! raw 0.55 -> 0.55 (unchanged)
//! ```
//!
//! Low scores from this model cluster at the decision boundary between two
//! classes rather than spreading across all five, so reporting them
//! verbatim (down to the 0.20 uniform floor) overstates the uncertainty.

use crate::label::NUM_LABELS;
use crate::probability::Probabilities;
use crate::{Error, Label, Result};

/// Default stabilization threshold.
pub const DEFAULT_STABILIZE_BELOW: f32 = 0.55;

/// Default stabilization anchor.
pub const DEFAULT_STABILIZE_ANCHOR: f32 = 0.64;

/// Linear correction for low raw confidences.
///
/// ```rust
/// use papertriage::Stabilizer;
///
/// let s = Stabilizer::default();
/// assert!((s.apply(0.10) - 0.37).abs() < 1e-6);
/// assert_eq!(s.apply(0.55), 0.55);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stabilizer {
    threshold: f32,
    anchor: f32,
}

impl Stabilizer {
    /// Create a stabilizer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if either value lies outside `[0, 1]`.
    pub fn new(threshold: f32, anchor: f32) -> Result<Self> {
        for (name, v) in [("threshold", threshold), ("anchor", anchor)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(Error::Config(format!(
                    "stabilization {name} {v} outside [0, 1]"
                )));
            }
        }
        Ok(Self { threshold, anchor })
    }

    /// A stabilizer that never fires.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            threshold: 0.0,
            anchor: 0.0,
        }
    }

    /// Raw confidences strictly below this are corrected.
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    /// The value low confidences are pulled toward.
    #[must_use]
    pub const fn anchor(&self) -> f32 {
        self.anchor
    }

    /// Whether `raw` would be corrected.
    #[must_use]
    pub fn fires(&self, raw: f32) -> bool {
        raw < self.threshold
    }

    /// Stabilized confidence for a raw top score.
    #[must_use]
    pub fn apply(&self, raw: f32) -> f32 {
        if self.fires(raw) {
            round_to((f64::from(raw) + f64::from(self.anchor)) / 2.0, 4)
        } else {
            raw
        }
    }
}

impl Default for Stabilizer {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_STABILIZE_BELOW,
            anchor: DEFAULT_STABILIZE_ANCHOR,
        }
    }
}

/// Round half away from zero to `places` decimals.
pub(crate) fn round_to(value: f64, places: i32) -> f32 {
    let scale = 10f64.powi(places);
    ((value * scale).round() / scale) as f32
}

/// Document-level outcome of aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregate {
    /// Winning label (first in enumeration order on ties).
    pub label: Label,
    /// Mean probability of the winning label.
    pub raw_confidence: f32,
    /// Confidence after stabilization.
    pub confidence: f32,
    /// The mean probability vector.
    pub probabilities: Probabilities,
    /// Number of chunk vectors averaged.
    pub chunks: usize,
}

impl Aggregate {
    /// Whether stabilization changed the confidence.
    #[must_use]
    pub fn stabilized(&self) -> bool {
        self.raw_confidence.to_bits() != self.confidence.to_bits()
    }
}

/// Running sum of per-chunk probability vectors.
///
/// Sums in `f64` so the mean does not depend on the order chunks were
/// scored in, beyond rounding at the last `f32` digit.
///
/// ```rust
/// use papertriage::{Label, Probabilities, ScoreAggregator, Stabilizer};
///
/// let mut agg = ScoreAggregator::new();
/// agg.push(&Probabilities::one_hot(Label::Theory));
/// agg.push(&Probabilities::one_hot(Label::Theory));
///
/// let out = agg.finish(&Stabilizer::default()).unwrap();
/// assert_eq!(out.label, Label::Theory);
/// assert_eq!(out.confidence, 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScoreAggregator {
    sum: [f64; NUM_LABELS],
    count: usize,
}

impl ScoreAggregator {
    /// Create an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one chunk's scores.
    pub fn push(&mut self, probabilities: &Probabilities) {
        for (acc, &p) in self.sum.iter_mut().zip(probabilities.as_array()) {
            *acc += f64::from(p);
        }
        self.count += 1;
    }

    /// Number of vectors added.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether nothing has been added.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Element-wise mean, `None` when empty.
    #[must_use]
    pub fn mean(&self) -> Option<Probabilities> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some(Probabilities::from_array_unchecked(
            self.sum.map(|s| (s / n) as f32),
        ))
    }

    /// Mean, argmax, and stabilization. `None` when empty.
    #[must_use]
    pub fn finish(&self, stabilizer: &Stabilizer) -> Option<Aggregate> {
        let probabilities = self.mean()?;
        let label = probabilities.argmax();
        let raw_confidence = probabilities.get(label);
        Some(Aggregate {
            label,
            raw_confidence,
            confidence: stabilizer.apply(raw_confidence),
            probabilities,
            chunks: self.count,
        })
    }
}

impl<'a> Extend<&'a Probabilities> for ScoreAggregator {
    fn extend<I: IntoIterator<Item = &'a Probabilities>>(&mut self, iter: I) {
        for p in iter {
            self.push(p);
        }
    }
}

impl Extend<Probabilities> for ScoreAggregator {
    fn extend<I: IntoIterator<Item = Probabilities>>(&mut self, iter: I) {
        for p in iter {
            self.push(&p);
        }
    }
}

impl FromIterator<Probabilities> for ScoreAggregator {
    fn from_iter<I: IntoIterator<Item = Probabilities>>(iter: I) -> Self {
        let mut agg = Self::new();
        agg.extend(iter);
        agg
    }
}
