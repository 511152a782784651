//! Evolvable weight vectors.
//!
//! A [`Genome`] is an ordered list of real-valued genes, one per evaluator feature, bounded by
//! `[min, max)`.
//!
//! # Crossover
//!
//! Every gene draws its own blend coefficient `t ∈ [0, 1)`:
//!
//! ```text
//! child[i] = t_i × a[i] + (1 − t_i) × b[i]
//! ```
//!
//! Because each position blends independently, two parents already produce a wide spread of
//! children. A blended gene always lies between its parents' genes.
//!
//! # Mutation
//!
//! After blending, each gene is replaced with probability `mutation_chance` by a fresh uniform
//! draw over `[min, max)`. Mutation is a jump anywhere in the range, not a small perturbation
//! around the blended value.

use depotbot_evaluator::weights::Weights;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Mutation probability used unless configured otherwise.
pub const DEFAULT_MUTATION_CHANCE: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    genes: Vec<f32>,
    min: f32,
    max: f32,
    mutation_chance: f32,
}

impl Genome {
    /// Draws `len` genes independently and uniformly from `[min, max)`.
    ///
    /// # Panics
    ///
    /// Panics if `min >= max`.
    pub fn random<R>(len: usize, min: f32, max: f32, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(min < max, "empty gene range [{min}, {max})");
        Self {
            genes: (0..len).map(|_| rng.random_range(min..max)).collect(),
            min,
            max,
            mutation_chance: DEFAULT_MUTATION_CHANCE,
        }
    }

    /// Wraps existing genes. Genes outside `[min, max)` are kept as they are.
    ///
    /// # Panics
    ///
    /// Panics if `min >= max`, since mutation draws from that range.
    #[must_use]
    pub fn from_genes(genes: Vec<f32>, min: f32, max: f32) -> Self {
        assert!(min < max, "empty gene range [{min}, {max})");
        Self {
            genes,
            min,
            max,
            mutation_chance: DEFAULT_MUTATION_CHANCE,
        }
    }

    #[must_use]
    pub fn with_mutation_chance(mut self, mutation_chance: f32) -> Self {
        self.mutation_chance = mutation_chance.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn genes(&self) -> &[f32] {
        &self.genes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    #[must_use]
    pub fn mutation_chance(&self) -> f32 {
        self.mutation_chance
    }

    /// Produces a child from `self` and `other` without touching either parent.
    ///
    /// The child inherits range and mutation chance from `self`.
    ///
    /// # Panics
    ///
    /// Panics if the parents have different lengths.
    #[must_use]
    pub fn crossover<R>(&self, other: &Self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert_eq!(
            self.genes.len(),
            other.genes.len(),
            "parents must have the same number of genes"
        );
        let genes = self
            .genes
            .iter()
            .zip(&other.genes)
            .map(|(&a, &b)| {
                let t: f32 = rng.random();
                // clamped because rounding can land one ulp outside the parents
                let blended = (t * a + (1.0 - t) * b).clamp(a.min(b), a.max(b));
                if rng.random_bool(self.mutation_chance.into()) {
                    rng.random_range(self.min..self.max)
                } else {
                    blended
                }
            })
            .collect();
        Self {
            genes,
            ..*self
        }
    }

    #[must_use]
    pub fn to_weights(&self) -> Weights {
        Weights::new(self.genes.clone())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn rng() -> Pcg64Mcg {
        Pcg64Mcg::seed_from_u64(0x5eed)
    }

    #[test]
    fn test_random_genes_lie_in_range() {
        let mut rng = rng();
        let genome = Genome::random(100, -2.0, 3.0, &mut rng);
        assert_eq!(genome.len(), 100);
        assert!(genome.genes().iter().all(|g| (-2.0..3.0).contains(g)));
        assert!((genome.mutation_chance() - DEFAULT_MUTATION_CHANCE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_blend_stays_between_parents() {
        let mut rng = rng();
        let a = Genome::from_genes(vec![1.0; 6], 0.0, 10.0).with_mutation_chance(0.0);
        let b = Genome::from_genes(vec![0.0; 6], 0.0, 10.0);
        for _ in 0..100 {
            let child = a.crossover(&b, &mut rng);
            assert_eq!(child.len(), 6);
            assert!(child.genes().iter().all(|g| (0.0..=1.0).contains(g)));
        }
    }

    #[test]
    fn test_unmutated_genes_lie_between_parents() {
        let mut rng = rng();
        for _ in 0..50 {
            let a = Genome::random(8, -5.0, 5.0, &mut rng).with_mutation_chance(0.0);
            let b = Genome::random(8, -5.0, 5.0, &mut rng);
            let child = a.crossover(&b, &mut rng);
            for ((c, x), y) in child.genes().iter().zip(a.genes()).zip(b.genes()) {
                assert!(x.min(*y) <= *c && *c <= x.max(*y));
            }
        }
    }

    #[test]
    fn test_mutation_rate_converges() {
        // both parents sit outside the gene range, so any gene inside it was replaced
        let mut rng = rng();
        let p = 0.25;
        let a = Genome::from_genes(vec![-1.0; 20], 1.0, 2.0).with_mutation_chance(p);
        let b = Genome::from_genes(vec![-1.0; 20], 1.0, 2.0);
        let mut replaced = 0_u32;
        let mut total = 0_u32;
        for _ in 0..2000 {
            let child = a.crossover(&b, &mut rng);
            replaced += u32::try_from(child.genes().iter().filter(|g| **g >= 1.0).count()).unwrap();
            total += 20;
        }
        let rate = f64::from(replaced) / f64::from(total);
        assert!((rate - f64::from(p)).abs() < 0.01, "rate {rate}");
    }

    #[test]
    fn test_crossover_leaves_parents_untouched() {
        let mut rng = rng();
        let a = Genome::random(6, 0.0, 10.0, &mut rng).with_mutation_chance(1.0);
        let b = Genome::random(6, 0.0, 10.0, &mut rng);
        let (a_before, b_before) = (a.clone(), b.clone());
        let _ = a.crossover(&b, &mut rng);
        assert_eq!(a, a_before);
        assert_eq!(b, b_before);
    }

    #[test]
    #[should_panic(expected = "empty gene range")]
    fn test_from_genes_rejects_empty_range() {
        let _ = Genome::from_genes(vec![1.0; 6], 5.0, 5.0);
    }

    #[test]
    #[should_panic(expected = "same number of genes")]
    fn test_crossover_rejects_length_mismatch() {
        let mut rng = rng();
        let a = Genome::from_genes(vec![1.0; 6], 0.0, 10.0);
        let b = Genome::from_genes(vec![1.0; 8], 0.0, 10.0);
        let _ = a.crossover(&b, &mut rng);
    }
}
