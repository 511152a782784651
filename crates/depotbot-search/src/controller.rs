//! Anytime iterative deepening under a deadline.
//!
//! [`IterativeDeepening::search`] runs complete searches at depth 1, 2, 3, ... until the
//! [`SearchControl`] stops it. A pass at depth `d` scores every root move by searching its
//! successor with a budget of `d` more plies, so depth 1 already weighs the opponent's reply
//! and depth 0 is a plain greedy look at the successors.
//!
//! After each pass that finishes, the best root move of that pass is committed to a
//! caller-owned [`BestMoveCell`]. A pass that is interrupted leaves the cell exactly as the
//! previous completed pass left it, so the caller always reads a move computed by a full search
//! of some depth.

use depotbot_engine::{AgentId, GameState};
use depotbot_evaluator::heuristic::StateEvaluator;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    control::{SearchAborted, SearchControl},
    propagator::{MoveKind, Propagator, TreeSearch, checked_moves, successor},
};

/// The result of the deepest completed search pass.
///
/// Owned by the caller and updated only between passes.
#[derive(Debug, Clone, PartialEq)]
pub struct BestMoveCell<M> {
    best: Option<M>,
    depth: u32,
    value: f32,
}

impl<M> Default for BestMoveCell<M> {
    fn default() -> Self {
        Self {
            best: None,
            depth: 0,
            value: f32::NEG_INFINITY,
        }
    }
}

impl<M> BestMoveCell<M>
where
    M: Copy,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Best move of the deepest completed pass, `None` before the first one completes.
    #[must_use]
    pub fn best(&self) -> Option<M> {
        self.best
    }

    /// Depth of the deepest completed pass.
    ///
    /// Also 0 before any pass completes; [`best`](Self::best) tells the two apart.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Root value of the committed move.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    fn commit(&mut self, best: M, depth: u32, value: f32) {
        self.best = Some(best);
        self.depth = depth;
        self.value = value;
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub propagator: Propagator,
    /// Stop deepening after this depth even if time remains. `Some(0)` runs a single
    /// greedy pass.
    pub max_depth: Option<u32>,
    /// Stop deepening once a pass reached no depth-0 cutoff, i.e. every line ended in a
    /// terminal state. When unset, only the control or `max_depth` ends the search.
    #[serde(default)]
    pub stop_when_exhausted: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes visited over all passes, including the interrupted one.
    pub nodes: u64,
    /// Depth of the deepest completed pass.
    pub completed_depth: u32,
}

#[derive(Debug, Clone)]
pub struct IterativeDeepening<E> {
    evaluator: E,
    config: SearchConfig,
}

impl<E> IterativeDeepening<E> {
    pub fn new(evaluator: E, config: SearchConfig) -> Self {
        Self { evaluator, config }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Deepens until `control` stops the search or the configured limits are reached.
    ///
    /// Returns immediately with an untouched `cell` when `agent` has no legal move or the
    /// state is already terminal.
    pub fn search<S>(
        &self,
        state: &S,
        agent: AgentId,
        control: &SearchControl,
        cell: &mut BestMoveCell<S::Move>,
    ) -> SearchStats
    where
        S: GameState,
        S::Move: MoveKind,
        E: StateEvaluator<S>,
    {
        let mut stats = SearchStats::default();
        if state.is_terminal() || state.legal_moves(agent).is_empty() {
            return stats;
        }

        let mut depth = self.config.max_depth.map_or(1, |max| max.min(1));
        loop {
            if self.config.max_depth.is_some_and(|max| depth > max) {
                break;
            }
            let mut search =
                TreeSearch::new(&self.evaluator, control, self.config.propagator, agent, stats.nodes);
            let result = Self::root_pass(&mut search, state, agent, depth);
            stats.nodes = search.nodes();
            let Ok(pass) = result else {
                trace!(depth, nodes = stats.nodes, "search pass interrupted");
                break;
            };

            cell.commit(pass.best, depth, pass.value);
            stats.completed_depth = depth;
            debug!(
                depth,
                nodes = stats.nodes,
                value = pass.value,
                best = %pass.best,
                "search pass completed"
            );

            if pass.exhausted && self.config.stop_when_exhausted {
                break;
            }
            depth += 1;
        }
        stats
    }

    /// Runs a single pass at a fixed depth with no deadline.
    ///
    /// Depth 0 scores each successor with the evaluator alone.
    ///
    /// Returns `None` if `agent` has no legal move or the state is terminal.
    pub fn search_depth<S>(&self, state: &S, agent: AgentId, depth: u32) -> Option<(S::Move, f32)>
    where
        S: GameState,
        S::Move: MoveKind,
        E: StateEvaluator<S>,
    {
        if state.is_terminal() || state.legal_moves(agent).is_empty() {
            return None;
        }
        let control = SearchControl::unbounded();
        let mut search = TreeSearch::new(&self.evaluator, &control, self.config.propagator, agent, 0);
        Self::root_pass(&mut search, state, agent, depth)
            .ok()
            .map(|pass| (pass.best, pass.value))
    }

    fn root_pass<S>(
        search: &mut TreeSearch<'_, E>,
        state: &S,
        agent: AgentId,
        depth: u32,
    ) -> Result<RootPass<S::Move>, SearchAborted>
    where
        S: GameState,
        S::Move: MoveKind,
        E: StateEvaluator<S>,
    {
        search.check()?;
        let mut best: Option<(S::Move, f32)> = None;
        for mv in checked_moves(state, agent) {
            let child = successor(state, agent, mv);
            let value = search.value(&child, agent.opponent(), depth)?;
            // strict comparison keeps the first maximum in enumeration order
            if best.is_none_or(|(_, best_value)| value > best_value) {
                best = Some((mv, value));
            }
        }
        let (best, value) = best.ok_or(SearchAborted)?;
        Ok(RootPass {
            best,
            value,
            exhausted: !search.horizon_reached(),
        })
    }
}

struct RootPass<M> {
    best: M,
    value: f32,
    exhausted: bool,
}

#[cfg(test)]
mod tests {
    use std::{
        thread,
        time::{Duration, Instant},
    };

    use depotbot_engine::{
        Action, Direction, Position, Warehouse, WarehouseBuilder, WarehouseConfig,
    };
    use depotbot_evaluator::{
        feature::{Feature, FeatureConfig, FeatureSet},
        heuristic::{HeuristicEvaluator, win_score},
        weights::Weights,
    };

    use super::*;
    use crate::propagator::OpponentModel;

    fn default_evaluator() -> HeuristicEvaluator {
        HeuristicEvaluator::new(FeatureConfig::default(), None).unwrap()
    }

    fn small_warehouse(seed: u64) -> Warehouse {
        let config = WarehouseConfig {
            width: 3,
            height: 3,
            package_count: 4,
            initial_battery: 8,
            max_battery: 8,
            step_limit: 30,
        };
        Warehouse::with_seed(&config, seed).unwrap()
    }

    fn bounded(propagator: Propagator, max_depth: u32) -> SearchConfig {
        SearchConfig {
            propagator,
            max_depth: Some(max_depth),
            stop_when_exhausted: false,
        }
    }

    fn successors(state: &Warehouse, agent: AgentId) -> Vec<Warehouse> {
        state
            .legal_moves(agent)
            .into_iter()
            .map(|mv| {
                let mut child = state.clone();
                child.apply(agent, mv).unwrap();
                child
            })
            .collect()
    }

    #[derive(Debug)]
    struct Flat;

    impl StateEvaluator<Warehouse> for Flat {
        fn evaluate(&self, _state: &Warehouse, _agent: AgentId) -> f32 {
            0.0
        }
    }

    #[test]
    fn test_fixed_depth_search_commits_each_pass() {
        let state = small_warehouse(0);
        let search = IterativeDeepening::new(default_evaluator(), bounded(Propagator::AlphaBeta, 3));
        let mut cell = BestMoveCell::new();
        let stats = search.search(&state, AgentId::First, &SearchControl::unbounded(), &mut cell);
        assert_eq!(stats.completed_depth, 3);
        assert_eq!(cell.depth(), 3);
        let (best, value) = search.search_depth(&state, AgentId::First, 3).unwrap();
        assert_eq!(cell.best(), Some(best));
        assert_eq!(cell.value(), value);
    }

    #[test]
    fn test_interrupted_pass_is_invisible() {
        for propagator in [
            Propagator::Minimax,
            Propagator::AlphaBeta,
            Propagator::Expectimax(OpponentModel::default()),
        ] {
            for seed in 0..4 {
                let state = small_warehouse(seed);
                let mut totals = vec![0];
                let mut cells = vec![BestMoveCell::new()];
                for depth in 1..=4 {
                    let search = IterativeDeepening::new(default_evaluator(), bounded(propagator, depth));
                    let mut cell = BestMoveCell::new();
                    let stats =
                        search.search(&state, AgentId::First, &SearchControl::unbounded(), &mut cell);
                    totals.push(stats.nodes);
                    cells.push(cell);
                }

                let search = IterativeDeepening::new(default_evaluator(), SearchConfig {
                    propagator,
                    ..SearchConfig::default()
                });
                for depth in 1..=3 {
                    // stop on the first node of pass depth+1, then on its last node
                    let first = totals[depth] + 1;
                    let last = totals[depth + 1];
                    for limit in [first, last] {
                        let control = SearchControl::unbounded().node_limit(limit);
                        let mut cell = BestMoveCell::new();
                        let stats = search.search(&state, AgentId::First, &control, &mut cell);
                        assert_eq!(stats.completed_depth, u32::try_from(depth).unwrap());
                        assert_eq!(cell, cells[depth], "{propagator}, seed {seed}, limit {limit}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_stop_before_first_pass_leaves_cell_empty() {
        let state = small_warehouse(1);
        let search = IterativeDeepening::new(default_evaluator(), SearchConfig::default());
        let control = SearchControl::unbounded();
        control.stop();
        let mut cell = BestMoveCell::new();
        let stats = search.search(&state, AgentId::First, &control, &mut cell);
        assert_eq!(stats.completed_depth, 0);
        assert_eq!(cell.best(), None);
        assert_eq!(cell.depth(), 0);
    }

    #[test]
    fn test_corridor_moves_toward_package_and_respects_deadline() {
        // robot 1 is stranded with no battery and can only park; delivering the package wins
        let state = WarehouseBuilder::new(4, 1)
            .robot(AgentId::First, Position::new(0, 0), 10, 0)
            .robot(AgentId::Second, Position::new(3, 0), 0, 0)
            .package(Position::new(2, 0), Position::new(0, 0))
            .max_battery(10)
            .step_limit(20)
            .build()
            .unwrap();
        let east = Action::Move(Direction::East);

        let mut weights = vec![0.0; FeatureSet::Baseline.len()];
        weights[Feature::DistanceToTarget.index()] = 1.0;
        let config = FeatureConfig {
            scale_target_by_battery: false,
            ..FeatureConfig::default()
        };
        let target_seeking = HeuristicEvaluator::new(config, Some(Weights::new(weights))).unwrap();
        let search = IterativeDeepening::new(&target_seeking, bounded(Propagator::AlphaBeta, 1));
        assert_eq!(search.search_depth(&state, AgentId::First, 1).map(|(mv, _)| mv), Some(east));

        for evaluator in [target_seeking, default_evaluator()] {
            let search = IterativeDeepening::new(&evaluator, SearchConfig::default());
            let limit = Duration::from_secs(2);
            let start = Instant::now();
            let control = SearchControl::with_time_limit(limit);
            let mut cell = BestMoveCell::new();
            let stats = search.search(&state, AgentId::First, &control, &mut cell);
            assert!(start.elapsed() < limit + Duration::from_millis(500));
            assert!(stats.completed_depth >= 10);
            // the quickest delivery: six actions of robot 0, five parks of robot 1
            assert_eq!(cell.best(), Some(east));
            assert_eq!(cell.value(), win_score(20 - 11));
        }
    }

    #[test]
    fn test_depth_one_includes_the_opponent_reply() {
        // robot 1 stands on a package and can pick it up in reply to any move
        let state = WarehouseBuilder::new(4, 1)
            .robot(AgentId::First, Position::new(0, 0), 5, 0)
            .robot(AgentId::Second, Position::new(3, 0), 5, 0)
            .package(Position::new(3, 0), Position::new(2, 0))
            .package(Position::new(1, 0), Position::new(2, 0))
            .max_battery(5)
            .build()
            .unwrap();
        let evaluator = default_evaluator();
        let me = AgentId::First;
        let score = |state: &Warehouse| evaluator.evaluate(state, me);
        let children = successors(&state, me);
        let greedy = children.iter().map(score).fold(f32::NEG_INFINITY, f32::max);
        let one_reply = children
            .iter()
            .map(|child| {
                successors(child, me.opponent())
                    .iter()
                    .map(score)
                    .fold(f32::INFINITY, f32::min)
            })
            .fold(f32::NEG_INFINITY, f32::max);
        assert!(one_reply < greedy);

        let search = IterativeDeepening::new(&evaluator, bounded(Propagator::Minimax, 1));
        assert_eq!(search.search_depth(&state, me, 0).map(|(_, v)| v), Some(greedy));
        assert_eq!(search.search_depth(&state, me, 1).map(|(_, v)| v), Some(one_reply));

        let mut cell = BestMoveCell::new();
        let stats = search.search(&state, me, &SearchControl::unbounded(), &mut cell);
        assert_eq!(stats.completed_depth, 1);
        assert_eq!(cell.value(), one_reply);
    }

    #[test]
    fn test_zero_depth_cap_runs_one_greedy_pass() {
        let state = small_warehouse(3);
        let search = IterativeDeepening::new(default_evaluator(), bounded(Propagator::AlphaBeta, 0));
        let mut cell = BestMoveCell::new();
        let stats = search.search(&state, AgentId::First, &SearchControl::unbounded(), &mut cell);
        assert_eq!(stats.completed_depth, 0);
        let (best, value) = search.search_depth(&state, AgentId::First, 0).unwrap();
        assert_eq!(cell.best(), Some(best));
        assert_eq!(cell.value(), value);
    }

    #[test]
    fn test_stop_from_another_thread() {
        let state = Warehouse::with_seed(&WarehouseConfig::default(), 11).unwrap();
        let search = IterativeDeepening::new(default_evaluator(), SearchConfig::default());
        let control = SearchControl::unbounded();
        let mut cell = BestMoveCell::new();
        let stats = thread::scope(|s| {
            let handle = s.spawn(|| search.search(&state, AgentId::Second, &control, &mut cell));
            thread::sleep(Duration::from_millis(100));
            control.stop();
            handle.join().unwrap()
        });
        assert!(stats.completed_depth >= 1);
        assert_eq!(cell.depth(), stats.completed_depth);
        assert!(state.legal_moves(AgentId::Second).contains(&cell.best().unwrap()));
    }

    #[test]
    fn test_ties_go_to_first_legal_move() {
        let state = small_warehouse(2);
        let search = IterativeDeepening::new(Flat, bounded(Propagator::Minimax, 2));
        let mut cell = BestMoveCell::new();
        search.search(&state, AgentId::First, &SearchControl::unbounded(), &mut cell);
        assert_eq!(cell.best(), Some(Action::Park));
        assert_eq!(cell.value(), 0.0);
    }

    #[test]
    fn test_exhausted_tree_stops_deepening() {
        let state = WarehouseBuilder::new(3, 1)
            .robot(AgentId::First, Position::new(0, 0), 3, 0)
            .robot(AgentId::Second, Position::new(2, 0), 3, 0)
            .step_limit(4)
            .build()
            .unwrap();
        let search = IterativeDeepening::new(default_evaluator(), SearchConfig {
            stop_when_exhausted: true,
            ..SearchConfig::default()
        });
        let mut cell = BestMoveCell::new();
        let stats = search.search(&state, AgentId::First, &SearchControl::unbounded(), &mut cell);
        // the root move plus three more plies use up the four steps
        assert_eq!(stats.completed_depth, 3);
    }

    #[test]
    fn test_terminal_root_is_not_searched() {
        let state = WarehouseBuilder::new(3, 1)
            .robot(AgentId::First, Position::new(0, 0), 0, 1)
            .robot(AgentId::Second, Position::new(2, 0), 0, 0)
            .build()
            .unwrap();
        let search = IterativeDeepening::new(default_evaluator(), SearchConfig::default());
        let mut cell = BestMoveCell::new();
        let stats = search.search(&state, AgentId::First, &SearchControl::unbounded(), &mut cell);
        assert_eq!(stats, SearchStats::default());
        assert_eq!(cell.best(), None);
        assert_eq!(search.search_depth(&state, AgentId::First, 3), None);
    }
}
