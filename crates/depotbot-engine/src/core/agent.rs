use serde::{Deserialize, Serialize};

/// Identifies one of the two robots.
///
/// Robots alternate plies, so the opponent of the robot to move is always the robot that
/// moves next.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
pub enum AgentId {
    #[display("robot 0")]
    First,
    #[display("robot 1")]
    Second,
}

impl AgentId {
    pub const ALL: [Self; 2] = [Self::First, Self::Second];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }

    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}
