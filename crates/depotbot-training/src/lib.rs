//! Evolving evaluator weights with a genetic algorithm.
//!
//! # How Training Works
//!
//! 1. **Population** - Random genomes, one gene per evaluator feature
//! 2. **Matches** - Every genome plays every other genome on freshly generated warehouses
//! 3. **Fitness** - Matches won, decided by the final credit comparison
//! 4. **Reproduction** - Elites survive, the rest are bred by tournament selection and crossover
//! 5. **Repeat** - For the configured number of generations
//!
//! # Architecture
//!
//! ```text
//! Genetic Algorithm (genetic)
//!     ↓ evolves
//! Genomes (genome)
//!     ↓ become weights of
//! HeuristicEvaluator (depotbot-evaluator)
//!     ↓ driven by
//! Greedy or search agents (depotbot-search)
//!     ↓ playing
//! Matches (arena)
//!     ↓ producing
//! Fitness (win counts) and per-generation statistics (stats)
//! ```
//!
//! # Example
//!
//! ```
//! use depotbot_engine::WarehouseConfig;
//! use depotbot_training::genetic::{self, GeneticParams};
//!
//! let params = GeneticParams {
//!     population: 3,
//!     generations: 2,
//!     elite_count: 1,
//!     warehouse: WarehouseConfig {
//!         width: 4,
//!         height: 4,
//!         step_limit: 20,
//!         ..WarehouseConfig::default()
//!     },
//!     ..GeneticParams::default()
//! };
//! let outcome = genetic::train(&params, &mut rand::rng(), |_| {}).unwrap();
//! assert_eq!(outcome.history.len(), 2);
//! ```
//!
//! # Current Limitations
//!
//! - **No persistence**: A run starts from random genomes; evolved weights are only reported
//!   to the caller.
//! - **Relative fitness**: Win counts compare genomes with each other, not with a fixed
//!   opponent, so fitness values of different generations are not comparable.

pub mod arena;
pub mod genetic;
pub mod genome;
pub mod stats;
