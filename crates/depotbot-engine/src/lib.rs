//! Game state for the two-robot warehouse game.
//!
//! The crate has two layers:
//!
//! - [`core`] - Plain value types: grid [`Position`], [`Direction`], [`Action`] and [`AgentId`]
//! - [`engine`] - The [`GameState`] and [`WarehouseView`] traits consumed by the search and
//!   evaluator crates, plus the concrete [`Warehouse`] simulation
//!
//! Search code only relies on the traits. Every clone of a [`Warehouse`] is an independent
//! value, so a search may branch by cloning and applying moves without affecting siblings.
//!
//! # Example
//!
//! ```
//! use depotbot_engine::{
//!     Action, AgentId, Direction, GameState, Warehouse, WarehouseConfig, WarehouseView,
//! };
//!
//! let mut warehouse = Warehouse::with_seed(&WarehouseConfig::default(), 7).unwrap();
//! let moves = warehouse.legal_moves(AgentId::First);
//! assert!(moves.contains(&Action::Park));
//!
//! let mut branch = warehouse.clone();
//! branch.apply(AgentId::First, Action::Park).unwrap();
//! assert_eq!(branch.steps_left() + 1, warehouse.steps_left());
//! # let _ = Direction::North;
//! # warehouse.apply(AgentId::First, Action::Park).unwrap();
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("{agent} cannot {action} here")]
pub struct IllegalMoveError {
    pub agent: AgentId,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum LayoutError {
    #[display("position {_0} is outside the {_1}x{_2} grid")]
    OutOfBounds(#[error(not(source))] Position, u8, u8),
    #[display("both robots start on {_0}")]
    RobotsOverlap(#[error(not(source))] Position),
    #[display("no starting position for {_0}")]
    MissingRobot(#[error(not(source))] AgentId),
    #[display("package at {_0} is delivered to its own cell")]
    DegeneratePackage(#[error(not(source))] Position),
    #[display("a {_0}x{_1} grid cannot hold two robots and two chargers")]
    GridTooSmall(u8, u8),
}
