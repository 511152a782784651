use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[display("north")]
    North,
    #[display("south")]
    South,
    #[display("east")]
    East,
    #[display("west")]
    West,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];
}

/// A single robot action. One action is one ply.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[display("park")]
    Park,
    #[display("move {_0}")]
    Move(Direction),
    #[display("pick up")]
    PickUp,
    #[display("drop off")]
    DropOff,
    #[display("charge")]
    Charge,
}

impl Action {
    /// Every action in legal-move enumeration order.
    pub const ALL: [Self; 8] = [
        Self::Park,
        Self::Move(Direction::North),
        Self::Move(Direction::South),
        Self::Move(Direction::East),
        Self::Move(Direction::West),
        Self::PickUp,
        Self::DropOff,
        Self::Charge,
    ];
}
