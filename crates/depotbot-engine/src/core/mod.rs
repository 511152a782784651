//! Value types shared by the simulation, the evaluator and the search.

pub use self::{action::*, agent::*, position::*};

mod action;
mod agent;
mod position;
