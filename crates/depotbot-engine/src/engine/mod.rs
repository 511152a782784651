//! Game rules and state.
//!
//! - [`GameState`] - What a game-tree search needs: legal moves, move application,
//!   terminal test and cheap independent copies
//! - [`WarehouseView`] - Read access to robots, packages and chargers, used by the heuristic
//! - [`Warehouse`] - The concrete two-robot warehouse game
//! - [`WarehouseConfig`] / [`WarehouseBuilder`] - Random or hand-placed layouts
//!
//! # Rules
//!
//! Robots alternate single actions. Moving costs one battery unit. A robot may carry one
//! package at a time; delivering it to its destination pays twice the distance between the
//! package's origin and destination. Standing on a charger converts credit into battery,
//! spending only what fits under the battery cap. Every action consumes one step of a shared
//! step budget, and the game ends when the budget is exhausted or both batteries are empty.
//! The robot with more credit wins.

pub use self::{builder::*, state::*, warehouse::*};

mod builder;
mod state;
mod warehouse;
