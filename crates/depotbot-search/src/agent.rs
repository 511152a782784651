use std::{any, fmt, time::Instant};

use depotbot_engine::{AgentId, GameState};
use depotbot_evaluator::heuristic::StateEvaluator;
use rand::{SeedableRng as _, seq::IndexedRandom as _};
use rand_pcg::Pcg64Mcg;
use tracing::debug;

use crate::{
    control::SearchControl,
    controller::{BestMoveCell, IterativeDeepening, SearchConfig},
    propagator::{MoveKind, OpponentModel, Propagator},
};

/// A strategy the turn loop can ask for moves.
///
/// [`choose_move`](Self::choose_move) returns `None` if no move could be chosen in time; the
/// caller then falls back to a legal move of its own choosing.
pub trait Agent<S>: fmt::Debug + Send
where
    S: GameState,
{
    /// Label used in logs and reports.
    fn name(&self) -> &str {
        any::type_name::<Self>()
    }

    fn choose_move(&mut self, state: &S, agent: AgentId, deadline: Instant) -> Option<S::Move>;
}

impl<S, A> Agent<S> for Box<A>
where
    S: GameState,
    A: Agent<S> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn choose_move(&mut self, state: &S, agent: AgentId, deadline: Instant) -> Option<S::Move> {
        (**self).choose_move(state, agent, deadline)
    }
}

/// Anytime game-tree search against the deadline.
#[derive(Debug, Clone)]
pub struct SearchAgent<E> {
    name: String,
    search: IterativeDeepening<E>,
}

impl<E> SearchAgent<E> {
    pub fn new(evaluator: E, config: SearchConfig) -> Self {
        Self {
            name: config.propagator.to_string(),
            search: IterativeDeepening::new(evaluator, config),
        }
    }

    pub fn minimax(evaluator: E) -> Self {
        Self::with_propagator(evaluator, Propagator::Minimax)
    }

    pub fn alpha_beta(evaluator: E) -> Self {
        Self::with_propagator(evaluator, Propagator::AlphaBeta)
    }

    pub fn expectimax(evaluator: E, model: OpponentModel) -> Self {
        Self::with_propagator(evaluator, Propagator::Expectimax(model))
    }

    fn with_propagator(evaluator: E, propagator: Propagator) -> Self {
        Self::new(evaluator, SearchConfig {
            propagator,
            ..SearchConfig::default()
        })
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn search(&self) -> &IterativeDeepening<E> {
        &self.search
    }
}

impl<S, E> Agent<S> for SearchAgent<E>
where
    S: GameState,
    S::Move: MoveKind,
    E: StateEvaluator<S>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_move(&mut self, state: &S, agent: AgentId, deadline: Instant) -> Option<S::Move> {
        let control = SearchControl::with_deadline(deadline);
        let mut cell = BestMoveCell::new();
        let stats = self.search.search(state, agent, &control, &mut cell);
        debug!(
            agent = %agent,
            strategy = %self.name,
            depth = stats.completed_depth,
            nodes = stats.nodes,
            "move chosen"
        );
        cell.best()
    }
}

/// Picks the move whose immediate successor evaluates best. Ignores the deadline.
#[derive(Debug, Clone)]
pub struct GreedyAgent<E> {
    search: IterativeDeepening<E>,
}

impl<E> GreedyAgent<E> {
    pub fn new(evaluator: E) -> Self {
        Self {
            search: IterativeDeepening::new(evaluator, SearchConfig {
                propagator: Propagator::Minimax,
                max_depth: Some(0),
                stop_when_exhausted: false,
            }),
        }
    }
}

impl<S, E> Agent<S> for GreedyAgent<E>
where
    S: GameState,
    S::Move: MoveKind,
    E: StateEvaluator<S>,
{
    fn name(&self) -> &str {
        "greedy"
    }

    fn choose_move(&mut self, state: &S, agent: AgentId, _deadline: Instant) -> Option<S::Move> {
        self.search.search_depth(state, agent, 0).map(|(mv, _)| mv)
    }
}

/// Uniformly random legal moves. Useful as a weak sparring partner.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    rng: Pcg64Mcg,
}

impl RandomAgent {
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Pcg64Mcg::seed_from_u64(seed),
        }
    }
}

impl<S> Agent<S> for RandomAgent
where
    S: GameState,
{
    fn name(&self) -> &str {
        "random"
    }

    fn choose_move(&mut self, state: &S, agent: AgentId, _deadline: Instant) -> Option<S::Move> {
        state.legal_moves(agent).choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use depotbot_engine::{Action, Warehouse, WarehouseConfig};
    use depotbot_evaluator::{feature::FeatureConfig, heuristic::HeuristicEvaluator};

    use super::*;

    fn evaluator() -> HeuristicEvaluator {
        HeuristicEvaluator::new(FeatureConfig::default(), None).unwrap()
    }

    fn deadline() -> Instant {
        Instant::now() + Duration::from_millis(200)
    }

    #[test]
    fn test_every_agent_returns_a_legal_move() {
        let state = Warehouse::with_seed(&WarehouseConfig::default(), 4).unwrap();
        let mut agents: Vec<Box<dyn Agent<Warehouse>>> = vec![
            Box::new(SearchAgent::minimax(evaluator())),
            Box::new(SearchAgent::alpha_beta(evaluator())),
            Box::new(SearchAgent::expectimax(evaluator(), OpponentModel::default())),
            Box::new(GreedyAgent::new(evaluator())),
            Box::new(RandomAgent::with_seed(1)),
        ];
        for agent in &mut agents {
            for id in AgentId::ALL {
                let mv = agent.choose_move(&state, id, deadline()).unwrap();
                assert!(state.legal_moves(id).contains(&mv), "{}", agent.name());
            }
        }
    }

    #[test]
    fn test_expired_deadline_yields_no_move() {
        let state = Warehouse::with_seed(&WarehouseConfig::default(), 4).unwrap();
        let mut agent = SearchAgent::alpha_beta(evaluator());
        let mv: Option<Action> = agent.choose_move(&state, AgentId::First, Instant::now());
        assert_eq!(mv, None);
    }

    #[test]
    fn test_greedy_takes_the_best_successor() {
        let evaluator = evaluator();
        for seed in 0..4 {
            let state = Warehouse::with_seed(&WarehouseConfig::default(), seed).unwrap();
            let mut best: Option<(Action, f32)> = None;
            for mv in state.legal_moves(AgentId::First) {
                let mut child = state.clone();
                child.apply(AgentId::First, mv).unwrap();
                let value = evaluator.evaluate(&child, AgentId::First);
                if best.is_none_or(|(_, best_value)| value > best_value) {
                    best = Some((mv, value));
                }
            }
            let mut agent = GreedyAgent::new(&evaluator);
            let mv = agent.choose_move(&state, AgentId::First, deadline());
            assert_eq!(mv, best.map(|(mv, _)| mv), "seed {seed}");
        }
    }

    #[derive(Debug)]
    struct Parker;

    impl Agent<Warehouse> for Parker {
        fn choose_move(
            &mut self,
            _state: &Warehouse,
            _agent: AgentId,
            _deadline: Instant,
        ) -> Option<Action> {
            Some(Action::Park)
        }
    }

    #[test]
    fn test_names() {
        assert!(Parker.name().ends_with("Parker"));

        let agent = SearchAgent::expectimax(evaluator(), OpponentModel::default());
        assert_eq!(Agent::<Warehouse>::name(&agent), "expectimax");
        let agent = agent.with_name("champion");
        assert_eq!(Agent::<Warehouse>::name(&agent), "champion");
    }
}
