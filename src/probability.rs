//! Five-class probability vectors.

use std::ops::Index;

use serde::Serialize;

use crate::label::{Label, NUM_LABELS};
use crate::{Error, Result};

/// Tolerance on the sum of a probability vector.
const SUM_TOLERANCE: f32 = 1e-3;

/// A distribution over the five [`Label`]s, indexed by [`Label::index`].
///
/// Values are non-negative and sum to 1 (within floating-point tolerance).
/// Produced once per chunk by a scorer, and once per document by the
/// aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Probabilities([f32; NUM_LABELS]);

impl Probabilities {
    /// Softmax over raw class logits.
    ///
    /// Subtracts the max logit first so large logits do not overflow.
    ///
    /// ```rust
    /// use papertriage::{Label, Probabilities};
    ///
    /// let p = Probabilities::from_logits([0.0, 0.0, 0.0, 3.0, 0.0]);
    /// assert_eq!(p.argmax(), Label::Theory);
    /// assert!((p.as_array().iter().sum::<f32>() - 1.0).abs() < 1e-6);
    /// ```
    #[must_use]
    pub fn from_logits(logits: [f32; NUM_LABELS]) -> Self {
        let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut out = logits.map(|l| (l - max).exp());
        let total: f32 = out.iter().sum();
        for v in &mut out {
            *v /= total;
        }
        Self(out)
    }

    /// A distribution with all mass on `label`.
    #[must_use]
    pub fn one_hot(label: Label) -> Self {
        let mut out = [0.0; NUM_LABELS];
        out[label.index()] = 1.0;
        Self(out)
    }

    /// The uniform distribution.
    #[must_use]
    pub fn uniform() -> Self {
        Self([1.0 / NUM_LABELS as f32; NUM_LABELS])
    }

    /// Validate an externally produced vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProbabilities`] if the slice does not hold
    /// exactly five finite, non-negative values summing to 1.
    pub fn try_from_slice(values: &[f32]) -> Result<Self> {
        let arr: [f32; NUM_LABELS] = values.try_into().map_err(|_| {
            Error::InvalidProbabilities(format!(
                "expected {NUM_LABELS} values, got {}",
                values.len()
            ))
        })?;
        Self::try_from_array(arr)
    }

    /// Validate a fixed-size array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProbabilities`] on negative, non-finite, or
    /// non-normalized input.
    pub fn try_from_array(values: [f32; NUM_LABELS]) -> Result<Self> {
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(Error::InvalidProbabilities(format!(
                "entry {bad} is negative or not finite"
            )));
        }
        let total: f32 = values.iter().sum();
        if (total - 1.0).abs() > SUM_TOLERANCE {
            return Err(Error::InvalidProbabilities(format!(
                "entries sum to {total}, expected 1"
            )));
        }
        Ok(Self(values))
    }

    /// Build without validation. Callers must uphold the simplex property.
    pub(crate) const fn from_array_unchecked(values: [f32; NUM_LABELS]) -> Self {
        Self(values)
    }

    /// Probability assigned to `label`.
    #[must_use]
    pub fn get(&self, label: Label) -> f32 {
        self.0[label.index()]
    }

    /// The raw values in label order.
    #[must_use]
    pub const fn as_array(&self) -> &[f32; NUM_LABELS] {
        &self.0
    }

    /// The most probable label. Ties go to the earlier label.
    #[must_use]
    pub fn argmax(&self) -> Label {
        let mut best = 0;
        for (i, &v) in self.0.iter().enumerate().skip(1) {
            if v > self.0[best] {
                best = i;
            }
        }
        Label::ALL[best]
    }

    /// The largest entry.
    #[must_use]
    pub fn max(&self) -> f32 {
        self.0[self.argmax().index()]
    }

    /// Iterate `(label, probability)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, f32)> + '_ {
        Label::ALL.iter().copied().zip(self.0.iter().copied())
    }
}

impl Index<Label> for Probabilities {
    type Output = f32;

    fn index(&self, label: Label) -> &f32 {
        &self.0[label.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let p = Probabilities::from_logits([1.0, -2.0, 0.5, 3.0, 0.0]);
        let total: f32 = p.as_array().iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!(p.as_array().iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_softmax_large_logits() {
        let p = Probabilities::from_logits([1000.0, 999.0, 0.0, 0.0, 0.0]);
        assert!(p.as_array().iter().all(|v| v.is_finite()));
        assert_eq!(p.argmax(), Label::Conference);
    }

    #[test]
    fn test_argmax_tie_goes_to_first() {
        let p = Probabilities::try_from_array([0.1, 0.4, 0.1, 0.4, 0.0]).unwrap();
        assert_eq!(p.argmax(), Label::Journal);
        assert!((p.max() - 0.4).abs() < f32::EPSILON);

        assert_eq!(Probabilities::uniform().argmax(), Label::Conference);
    }

    #[test]
    fn test_try_from_slice_rejects_bad_input() {
        assert!(Probabilities::try_from_slice(&[0.5, 0.5]).is_err());
        assert!(Probabilities::try_from_slice(&[0.5, 0.5, 0.5, 0.0, 0.0]).is_err());
        assert!(Probabilities::try_from_slice(&[1.5, -0.5, 0.0, 0.0, 0.0]).is_err());
        assert!(Probabilities::try_from_slice(&[f32::NAN, 1.0, 0.0, 0.0, 0.0]).is_err());
        assert!(Probabilities::try_from_slice(&[0.2; 5]).is_ok());
    }

    #[test]
    fn test_index_by_label() {
        let p = Probabilities::one_hot(Label::Implementation);
        assert_eq!(p[Label::Implementation], 1.0);
        assert_eq!(p.get(Label::Theory), 0.0);
        assert_eq!(p.iter().count(), NUM_LABELS);
    }
}
