use serde::{Deserialize, Serialize};

use super::Direction;

/// A cell on the warehouse grid. `x` grows eastwards, `y` grows southwards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[display("({x}, {y})")]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

impl Position {
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Grid (Manhattan) distance between two cells.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) as u32 + self.y.abs_diff(other.y) as u32
    }

    /// Returns the neighbouring cell, or `None` when stepping off the top or left edge.
    ///
    /// The bottom and right edges depend on the grid size and are checked by the caller.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let Self { x, y } = self;
        match direction {
            Direction::North => y.checked_sub(1).map(|y| Self { x, y }),
            Direction::South => y.checked_add(1).map(|y| Self { x, y }),
            Direction::East => x.checked_add(1).map(|x| Self { x, y }),
            Direction::West => x.checked_sub(1).map(|x| Self { x, y }),
        }
    }
}
