use arrayvec::ArrayVec;

use crate::{Action, AgentId, Direction, IllegalMoveError, Position};

use super::{GameState, MoveList, Outcome, Package, Robot, WarehouseView};

/// Number of packages lying on the board at the same time.
pub const PACKAGES_ON_BOARD: usize = 2;

/// Two robots competing for packages on a rectangular grid.
///
/// Construct one with [`Warehouse::with_seed`], [`Warehouse::random`] or
/// [`WarehouseBuilder`](super::WarehouseBuilder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warehouse {
    pub(super) width: u8,
    pub(super) height: u8,
    pub(super) robots: [Robot; 2],
    /// Packages not yet picked up, in spawn order. The first few are `on_board`.
    pub(super) packages: Vec<Package>,
    pub(super) chargers: ArrayVec<Position, 2>,
    pub(super) max_battery: u32,
    pub(super) steps_left: u32,
}

impl Warehouse {
    #[must_use]
    pub fn width(&self) -> u8 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u8 {
        self.height
    }

    /// Packages still waiting to spawn.
    pub fn queued_packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter().filter(|p| !p.on_board)
    }

    fn contains(&self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }

    fn move_target(&self, agent: AgentId, direction: Direction) -> Option<Position> {
        let robot = &self.robots[agent.index()];
        let other = &self.robots[agent.opponent().index()];
        robot
            .position
            .step(direction)
            .filter(|&target| self.contains(target) && target != other.position)
    }

    fn package_at(&self, position: Position) -> Option<usize> {
        self.packages
            .iter()
            .position(|p| p.on_board && p.position == position)
    }

    fn is_legal(&self, agent: AgentId, action: Action) -> bool {
        let robot = &self.robots[agent.index()];
        match action {
            Action::Park => true,
            Action::Move(direction) => {
                robot.battery > 0 && self.move_target(agent, direction).is_some()
            }
            Action::PickUp => robot.package.is_none() && self.package_at(robot.position).is_some(),
            Action::DropOff => robot
                .package
                .is_some_and(|p| p.destination == robot.position),
            Action::Charge => {
                robot.credit > 0
                    && robot.battery < self.max_battery
                    && self.chargers.contains(&robot.position)
            }
        }
    }

    fn spawn_packages(&mut self) {
        let on_board = self.packages.iter().filter(|p| p.on_board).count();
        for package in self
            .packages
            .iter_mut()
            .filter(|p| !p.on_board)
            .take(PACKAGES_ON_BOARD.saturating_sub(on_board))
        {
            package.on_board = true;
        }
    }
}

impl GameState for Warehouse {
    type Move = Action;

    fn legal_moves(&self, agent: AgentId) -> MoveList<Action> {
        Action::ALL
            .into_iter()
            .filter(|&action| self.is_legal(agent, action))
            .collect()
    }

    fn apply(&mut self, agent: AgentId, action: Action) -> Result<(), IllegalMoveError> {
        if !self.is_legal(agent, action) {
            return Err(IllegalMoveError { agent, action });
        }

        match action {
            Action::Park => {}
            Action::Move(direction) => {
                // legality guarantees the target exists
                if let Some(target) = self.move_target(agent, direction) {
                    let robot = &mut self.robots[agent.index()];
                    robot.position = target;
                    robot.battery -= 1;
                }
            }
            Action::PickUp => {
                let position = self.robots[agent.index()].position;
                if let Some(index) = self.package_at(position) {
                    let mut package = self.packages.remove(index);
                    package.on_board = false;
                    self.robots[agent.index()].package = Some(package);
                    self.spawn_packages();
                }
            }
            Action::DropOff => {
                let robot = &mut self.robots[agent.index()];
                if let Some(package) = robot.package.take() {
                    robot.credit += package.reward();
                }
            }
            Action::Charge => {
                let max_battery = self.max_battery;
                let robot = &mut self.robots[agent.index()];
                let converted = robot.credit.min(max_battery - robot.battery);
                robot.battery += converted;
                robot.credit -= converted;
            }
        }

        self.steps_left = self.steps_left.saturating_sub(1);
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.steps_left == 0 || self.robots.iter().all(|r| r.battery == 0)
    }
}

impl WarehouseView for Warehouse {
    fn robot(&self, agent: AgentId) -> &Robot {
        &self.robots[agent.index()]
    }

    fn packages_on_board(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter().filter(|p| p.on_board)
    }

    fn chargers(&self) -> &[Position] {
        &self.chargers
    }

    fn max_battery(&self) -> u32 {
        self.max_battery
    }

    fn steps_left(&self) -> u32 {
        self.steps_left
    }

    fn outcome(&self) -> Option<Outcome> {
        self.is_terminal().then(|| {
            Outcome::from_credits(
                self.robots[AgentId::First.index()].credit,
                self.robots[AgentId::Second.index()].credit,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WarehouseBuilder;

    fn corridor() -> Warehouse {
        // robot 0 at the west end, one package two cells east delivered back west
        WarehouseBuilder::new(5, 1)
            .robot(AgentId::First, Position::new(0, 0), 20, 0)
            .robot(AgentId::Second, Position::new(4, 0), 20, 0)
            .package(Position::new(2, 0), Position::new(0, 0))
            .charger(Position::new(1, 0))
            .step_limit(50)
            .build()
            .unwrap()
    }

    #[test]
    fn test_legal_moves_respect_bounds() {
        let warehouse = corridor();
        let moves = warehouse.legal_moves(AgentId::First);
        assert_eq!(
            moves.as_slice(),
            &[Action::Park, Action::Move(Direction::East)]
        );
    }

    #[test]
    fn test_move_costs_battery_and_step() {
        let mut warehouse = corridor();
        warehouse
            .apply(AgentId::First, Action::Move(Direction::East))
            .unwrap();
        let robot = warehouse.robot(AgentId::First);
        assert_eq!(robot.position, Position::new(1, 0));
        assert_eq!(robot.battery, 19);
        assert_eq!(warehouse.steps_left(), 49);
    }

    #[test]
    fn test_robots_block_each_other() {
        let mut warehouse = WarehouseBuilder::new(2, 1)
            .robot(AgentId::First, Position::new(0, 0), 5, 0)
            .robot(AgentId::Second, Position::new(1, 0), 5, 0)
            .build()
            .unwrap();
        assert_eq!(
            warehouse.legal_moves(AgentId::First).as_slice(),
            &[Action::Park]
        );
        let err = warehouse
            .apply(AgentId::First, Action::Move(Direction::East))
            .unwrap_err();
        assert_eq!(err.agent, AgentId::First);
        assert_eq!(warehouse.robot(AgentId::First).position, Position::new(0, 0));
    }

    #[test]
    fn test_pick_up_and_deliver_pays_twice_distance() {
        let mut warehouse = corridor();
        let east = Action::Move(Direction::East);
        let west = Action::Move(Direction::West);
        for action in [east, east, Action::PickUp, west, west, Action::DropOff] {
            warehouse.apply(AgentId::First, action).unwrap();
        }
        let robot = warehouse.robot(AgentId::First);
        assert_eq!(robot.credit, 4);
        assert!(robot.package.is_none());
        assert_eq!(warehouse.packages_on_board().count(), 0);
    }

    #[test]
    fn test_pick_up_spawns_next_package() {
        let mut warehouse = WarehouseBuilder::new(3, 3)
            .robot(AgentId::First, Position::new(0, 0), 20, 0)
            .robot(AgentId::Second, Position::new(2, 2), 20, 0)
            .package(Position::new(0, 0), Position::new(1, 1))
            .package(Position::new(2, 0), Position::new(0, 2))
            .package(Position::new(1, 0), Position::new(1, 2))
            .build()
            .unwrap();
        assert_eq!(warehouse.packages_on_board().count(), 2);
        assert_eq!(warehouse.queued_packages().count(), 1);

        warehouse.apply(AgentId::First, Action::PickUp).unwrap();
        let on_board: Vec<_> = warehouse.packages_on_board().map(|p| p.position).collect();
        assert_eq!(on_board, vec![Position::new(2, 0), Position::new(1, 0)]);
        assert_eq!(warehouse.queued_packages().count(), 0);
    }

    #[test]
    fn test_charge_is_capped_by_max_battery() {
        let mut warehouse = WarehouseBuilder::new(3, 1)
            .robot(AgentId::First, Position::new(0, 0), 15, 12)
            .robot(AgentId::Second, Position::new(2, 0), 20, 0)
            .charger(Position::new(0, 0))
            .max_battery(20)
            .build()
            .unwrap();
        warehouse.apply(AgentId::First, Action::Charge).unwrap();
        let robot = warehouse.robot(AgentId::First);
        assert_eq!(robot.battery, 20);
        assert_eq!(robot.credit, 7);
        assert!(!warehouse.legal_moves(AgentId::First).contains(&Action::Charge));
    }

    #[test]
    fn test_terminal_when_batteries_empty() {
        let warehouse = WarehouseBuilder::new(3, 1)
            .robot(AgentId::First, Position::new(0, 0), 0, 3)
            .robot(AgentId::Second, Position::new(2, 0), 0, 1)
            .build()
            .unwrap();
        assert!(warehouse.is_terminal());
        assert_eq!(
            warehouse.outcome(),
            Some(Outcome::Winner(AgentId::First))
        );
    }

    #[test]
    fn test_terminal_when_steps_exhausted() {
        let mut warehouse = corridor();
        for _ in 0..50 {
            assert!(!warehouse.is_terminal());
            warehouse.apply(AgentId::Second, Action::Park).unwrap();
        }
        assert!(warehouse.is_terminal());
        assert_eq!(warehouse.outcome(), Some(Outcome::Draw));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = corridor();
        let snapshot = original.clone();
        let mut branch = original.clone();
        branch
            .apply(AgentId::First, Action::Move(Direction::East))
            .unwrap();
        branch
            .apply(AgentId::First, Action::Move(Direction::East))
            .unwrap();
        branch.apply(AgentId::First, Action::PickUp).unwrap();
        drop(branch);
        assert_eq!(original, snapshot);
    }
}
