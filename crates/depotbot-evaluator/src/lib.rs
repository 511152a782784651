//! Heuristic evaluation of warehouse states.
//!
//! This crate turns a game state into a single score for one robot. It is the leaf of every
//! game-tree search in `depotbot-search`.
//!
//! # Architecture
//!
//! ```text
//! Warehouse state (depotbot-engine)
//!     ↓ read by
//! Feature Extraction (feature) - fixed-order vector of named markers
//!     ↓ combined with
//! Weights (weights) - one weight per feature, evolved by depotbot-training
//!     ↓ by
//! Heuristic Evaluator (heuristic) - terminal short-circuit, then weighted sum
//! ```
//!
//! # Design Principles
//!
//! ## Fixed Feature Order
//!
//! Features are identified by the [`feature::Feature`] enum rather than by name. A weight vector
//! lines up with the features of a [`feature::FeatureSet`] position by position, and the
//! evaluator refuses to build when the two lengths differ. There is no runtime name lookup.
//!
//! ## Terminal Short-Circuit
//!
//! Finished games score [`heuristic::win_score`] or [`heuristic::loss_score`] from the credit
//! comparison alone, so a search always prefers a won terminal over any heuristic estimate.
//! Both are finite so expectation nodes can average them, and both grow with the steps left in
//! the game so that a quick win beats a slow one.
//!
//! # Example
//!
//! ```
//! use depotbot_engine::{AgentId, Warehouse, WarehouseConfig};
//! use depotbot_evaluator::{
//!     feature::FeatureConfig,
//!     heuristic::{HeuristicEvaluator, StateEvaluator},
//! };
//!
//! let warehouse = Warehouse::with_seed(&WarehouseConfig::default(), 3).unwrap();
//! let evaluator = HeuristicEvaluator::new(FeatureConfig::default(), None).unwrap();
//! let score = evaluator.evaluate(&warehouse, AgentId::First);
//! assert!(score.is_finite());
//! ```

pub mod feature;
pub mod heuristic;
pub mod weights;
