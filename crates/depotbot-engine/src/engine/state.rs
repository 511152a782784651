use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{AgentId, IllegalMoveError, Position};

/// Upper bound on the number of legal moves in any state.
pub const MAX_LEGAL_MOVES: usize = 8;

pub type MoveList<M> = ArrayVec<M, MAX_LEGAL_MOVES>;

/// Turn-based two-player game state as seen by a game-tree search.
///
/// `Clone` must produce a fully independent value: applying a move to a clone never changes
/// the original.
pub trait GameState: Clone {
    type Move: Copy + Eq + fmt::Debug + fmt::Display;

    /// Legal moves for `agent`, in a fixed enumeration order.
    fn legal_moves(&self, agent: AgentId) -> MoveList<Self::Move>;

    /// Applies `mv` for `agent` in place.
    ///
    /// Returns an error and leaves the state untouched if `mv` is not currently legal.
    fn apply(&mut self, agent: AgentId, mv: Self::Move) -> Result<(), IllegalMoveError>;

    fn is_terminal(&self) -> bool;
}

/// Read access to the warehouse-specific parts of a state.
pub trait WarehouseView {
    fn robot(&self, agent: AgentId) -> &Robot;

    fn packages_on_board(&self) -> impl Iterator<Item = &Package>;

    fn chargers(&self) -> &[Position];

    fn max_battery(&self) -> u32;

    /// Actions left in the shared step budget.
    fn steps_left(&self) -> u32;

    /// Winner by credit comparison, or `None` while the game is still running.
    fn outcome(&self) -> Option<Outcome>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub position: Position,
    pub destination: Position,
    pub on_board: bool,
}

impl Package {
    /// Credit paid when this package is delivered.
    #[must_use]
    pub const fn reward(&self) -> u32 {
        2 * self.position.manhattan(self.destination)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Robot {
    pub position: Position,
    pub battery: u32,
    pub credit: u32,
    pub package: Option<Package>,
}

impl Robot {
    #[must_use]
    pub const fn holds_package(&self) -> bool {
        self.package.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum Outcome {
    Winner(AgentId),
    Draw,
}

impl Outcome {
    /// Decides a finished game from the two credit totals.
    #[must_use]
    pub fn from_credits(first: u32, second: u32) -> Self {
        match first.cmp(&second) {
            std::cmp::Ordering::Greater => Self::Winner(AgentId::First),
            std::cmp::Ordering::Less => Self::Winner(AgentId::Second),
            std::cmp::Ordering::Equal => Self::Draw,
        }
    }

    #[must_use]
    pub fn winner(self) -> Option<AgentId> {
        match self {
            Self::Winner(agent) => Some(agent),
            Self::Draw => None,
        }
    }
}
