//! Weight vectors for the heuristic evaluator.
//!
//! A [`Weights`] value holds one weight per feature, in the order of
//! [`Feature::ALL`](crate::feature::Feature::ALL). Weights are read-only during a search; the
//! training crate produces new vectors instead of modifying existing ones.

use serde::{Deserialize, Serialize};

use crate::feature::FeatureSet;

/// Hand-tuned weights for the six baseline features.
///
/// These came out of an earlier genetic tuning run and serve as the fixed default evaluator.
const BASELINE_WEIGHTS: [f32; 6] = [
    8.564_914, 8.411_581, 6.374_97, 2.701_592_5, 5.351_03, 0.136_676_47,
];

/// Extra weights for absolute credit and battery in the extended set.
const EXTENDED_EXTRA_WEIGHTS: [f32; 2] = [1.0, 0.5];

#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::From, derive_more::Deref,
)]
#[serde(transparent)]
pub struct Weights(Vec<f32>);

impl Weights {
    #[must_use]
    pub fn new(weights: Vec<f32>) -> Self {
        Self(weights)
    }

    /// Fixed default weights for `set`.
    #[must_use]
    pub fn baseline(set: FeatureSet) -> Self {
        let mut weights = BASELINE_WEIGHTS.to_vec();
        if set == FeatureSet::Extended {
            weights.extend(EXTENDED_EXTRA_WEIGHTS);
        }
        Self(weights)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}
