use arrayvec::ArrayVec;
use rand::{Rng, SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use crate::{AgentId, LayoutError, Position};

use super::{Package, Robot, Warehouse, warehouse::PACKAGES_ON_BOARD};

/// Parameters for randomly generated warehouses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseConfig {
    pub width: u8,
    pub height: u8,
    /// Total packages spawned over the whole game.
    pub package_count: usize,
    pub initial_battery: u32,
    pub max_battery: u32,
    /// Shared step budget; both robots' actions count against it.
    pub step_limit: u32,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            width: 5,
            height: 5,
            package_count: 6,
            initial_battery: 20,
            max_battery: 20,
            step_limit: 100,
        }
    }
}

impl Warehouse {
    /// Generates a layout from a seed. The same seed always yields the same warehouse.
    pub fn with_seed(config: &WarehouseConfig, seed: u64) -> Result<Self, LayoutError> {
        let mut rng = Pcg64Mcg::seed_from_u64(seed);
        Self::random(config, &mut rng)
    }

    /// Generates a layout with distinct starting cells for both robots and both chargers.
    ///
    /// Package origins and destinations are drawn independently; a package never has its
    /// destination on its own cell.
    pub fn random<R>(config: &WarehouseConfig, rng: &mut R) -> Result<Self, LayoutError>
    where
        R: Rng + ?Sized,
    {
        let WarehouseConfig {
            width,
            height,
            package_count,
            initial_battery,
            max_battery,
            step_limit,
        } = *config;
        if usize::from(width) * usize::from(height) < 4 {
            return Err(LayoutError::GridTooSmall(width, height));
        }

        let mut cells: Vec<Position> = (0..height)
            .flat_map(|y| (0..width).map(move |x| Position::new(x, y)))
            .collect();
        cells.shuffle(rng);

        let mut builder = WarehouseBuilder::new(width, height)
            .robot(AgentId::First, cells[0], initial_battery, 0)
            .robot(AgentId::Second, cells[1], initial_battery, 0)
            .charger(cells[2])
            .charger(cells[3])
            .max_battery(max_battery)
            .step_limit(step_limit);

        for _ in 0..package_count {
            let position = random_cell(width, height, rng);
            let destination = loop {
                let candidate = random_cell(width, height, rng);
                if candidate != position {
                    break candidate;
                }
            };
            builder = builder.package(position, destination);
        }

        builder.build()
    }
}

fn random_cell<R>(width: u8, height: u8, rng: &mut R) -> Position
where
    R: Rng + ?Sized,
{
    Position::new(rng.random_range(0..width), rng.random_range(0..height))
}

/// Places robots, packages and chargers by hand.
///
/// Packages spawn in the order they are added; the first two start on the board.
///
/// ```
/// use depotbot_engine::{AgentId, Position, WarehouseBuilder, WarehouseView};
///
/// let warehouse = WarehouseBuilder::new(3, 1)
///     .robot(AgentId::First, Position::new(0, 0), 10, 0)
///     .robot(AgentId::Second, Position::new(2, 0), 10, 0)
///     .package(Position::new(1, 0), Position::new(2, 0))
///     .build()
///     .unwrap();
/// assert_eq!(warehouse.packages_on_board().count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct WarehouseBuilder {
    width: u8,
    height: u8,
    robots: [Option<Robot>; 2],
    packages: Vec<Package>,
    chargers: ArrayVec<Position, 2>,
    max_battery: u32,
    step_limit: u32,
}

impl WarehouseBuilder {
    #[must_use]
    pub fn new(width: u8, height: u8) -> Self {
        let defaults = WarehouseConfig::default();
        Self {
            width,
            height,
            robots: [None, None],
            packages: vec![],
            chargers: ArrayVec::new(),
            max_battery: defaults.max_battery,
            step_limit: defaults.step_limit,
        }
    }

    #[must_use]
    pub fn robot(mut self, agent: AgentId, position: Position, battery: u32, credit: u32) -> Self {
        self.robots[agent.index()] = Some(Robot {
            position,
            battery,
            credit,
            package: None,
        });
        self
    }

    #[must_use]
    pub fn package(mut self, position: Position, destination: Position) -> Self {
        self.packages.push(Package {
            position,
            destination,
            on_board: false,
        });
        self
    }

    /// Adds a charger. Only the first two chargers are kept.
    #[must_use]
    pub fn charger(mut self, position: Position) -> Self {
        let _ = self.chargers.try_push(position);
        self
    }

    #[must_use]
    pub fn max_battery(mut self, max_battery: u32) -> Self {
        self.max_battery = max_battery;
        self
    }

    #[must_use]
    pub fn step_limit(mut self, step_limit: u32) -> Self {
        self.step_limit = step_limit;
        self
    }

    pub fn build(self) -> Result<Warehouse, LayoutError> {
        let Self {
            width,
            height,
            robots: [first, second],
            mut packages,
            chargers,
            max_battery,
            step_limit,
        } = self;

        let first = first.ok_or(LayoutError::MissingRobot(AgentId::First))?;
        let second = second.ok_or(LayoutError::MissingRobot(AgentId::Second))?;
        if first.position == second.position {
            return Err(LayoutError::RobotsOverlap(first.position));
        }

        let in_bounds = |p: Position| {
            if p.x < width && p.y < height {
                Ok(())
            } else {
                Err(LayoutError::OutOfBounds(p, width, height))
            }
        };
        in_bounds(first.position)?;
        in_bounds(second.position)?;
        for charger in &chargers {
            in_bounds(*charger)?;
        }
        for package in &packages {
            in_bounds(package.position)?;
            in_bounds(package.destination)?;
            if package.position == package.destination {
                return Err(LayoutError::DegeneratePackage(package.position));
            }
        }

        for package in packages.iter_mut().take(PACKAGES_ON_BOARD) {
            package.on_board = true;
        }

        Ok(Warehouse {
            width,
            height,
            robots: [first, second],
            packages,
            chargers,
            max_battery,
            steps_left: step_limit,
        })
    }
}
