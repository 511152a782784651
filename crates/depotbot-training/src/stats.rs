//! Per-generation statistics used to follow a training run.

use serde::{Deserialize, Serialize};

use crate::genetic::Population;

/// Summary statistics of a set of `f32` values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub std_dev: f32,
}

impl DescriptiveStats {
    /// Returns `None` for an empty input.
    ///
    /// ```
    /// # use depotbot_training::stats::DescriptiveStats;
    /// let stats = DescriptiveStats::new([5.0, 2.0, 4.0, 1.0, 3.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let values = values.into_iter().collect::<Vec<_>>();
        let min = values.iter().copied().reduce(f32::min)?;
        let max = values.iter().copied().reduce(f32::max)?;
        let n = values.len() as f32;
        let mean = values.iter().sum::<f32>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
        Some(Self {
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

/// Snapshot of one evaluated generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: usize,
    /// Win counts over the whole population.
    pub fitness: DescriptiveStats,
    /// Spread of each gene position over the population, in feature order.
    pub genes: Vec<DescriptiveStats>,
    pub best_genes: Vec<f32>,
}

impl GenerationSummary {
    /// Summarizes a population whose fitness has been evaluated.
    ///
    /// Returns `None` for an empty population.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(generation: usize, population: &Population) -> Option<Self> {
        let individuals = population.individuals();
        let best = individuals.first()?;
        let fitness = DescriptiveStats::new(individuals.iter().map(|ind| ind.fitness() as f32))?;
        let genes = (0..best.genome().len())
            .map(|i| DescriptiveStats::new(individuals.iter().map(|ind| ind.genome().genes()[i])))
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            generation,
            fitness,
            genes,
            best_genes: best.genome().genes().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_has_no_stats() {
        assert_eq!(DescriptiveStats::new([]), None);
    }

    #[test]
    fn test_std_dev() {
        let stats = DescriptiveStats::new([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((stats.mean - 5.0).abs() < 1e-6);
        assert!((stats.std_dev - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_single_value() {
        let stats = DescriptiveStats::new([1.5]).unwrap();
        assert_eq!(stats.min, stats.max);
        assert_eq!(stats.std_dev, 0.0);
    }
}
