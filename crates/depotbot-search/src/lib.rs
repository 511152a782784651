//! Adversarial game-tree search with anytime iterative deepening.
//!
//! # Architecture
//!
//! ```text
//! Agent (agent)                       - choose_move(state, agent, deadline)
//!     ↓ drives
//! Iterative Deepening (controller)   - depth 1, 2, 3, ... commits after each full pass
//!     ↓ runs one pass with
//! Value Propagator (propagator)      - minimax, alpha-beta or expectimax recursion
//!     ↓ scores leaves with
//! StateEvaluator (depotbot-evaluator)
//! ```
//!
//! Every node polls a [`control::SearchControl`]. When the deadline passes or someone calls
//! [`control::SearchControl::stop`], the recursion unwinds and the unfinished pass is dropped.
//! The caller-owned [`controller::BestMoveCell`] keeps the answer of the deepest completed pass.
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//!
//! use depotbot_engine::{AgentId, GameState, Warehouse, WarehouseConfig};
//! use depotbot_evaluator::{feature::FeatureConfig, heuristic::HeuristicEvaluator};
//! use depotbot_search::agent::{Agent, SearchAgent};
//!
//! let warehouse = Warehouse::with_seed(&WarehouseConfig::default(), 1).unwrap();
//! let evaluator = HeuristicEvaluator::new(FeatureConfig::default(), None).unwrap();
//! let mut agent = SearchAgent::alpha_beta(evaluator);
//!
//! let deadline = Instant::now() + Duration::from_millis(50);
//! let mv = agent.choose_move(&warehouse, AgentId::First, deadline).unwrap();
//! assert!(warehouse.legal_moves(AgentId::First).contains(&mv));
//! ```

pub mod agent;
pub mod control;
pub mod controller;
pub mod propagator;
