//! Heuristic evaluation: one score for one robot in one state.
//!
//! [`HeuristicEvaluator::evaluate`] applies three rules in order:
//!
//! 1. **Terminal** - A finished game scores [`win_score`], [`loss_score`] or `0.0` by credit
//!    comparison, regardless of weights.
//! 2. **Stranded rival** - If the rival's battery is empty and the robot leads on credit, the
//!    game is treated as already won.
//! 3. **Weighted sum** - Otherwise `score = Σ(wᵢ × featureᵢ)` over the configured feature set.
//!    If there is no target left (see [`FeatureVector::extract`]) the raw credit differential
//!    is returned instead.
//!
//! Decisive scores carry the number of steps left in the game, so a win reached sooner scores
//! higher and a loss suffered later scores less badly. The first two rules also mark the state
//! as decided (see [`StateEvaluator::is_decided`]), which lets a search stop expanding it.
//!
//! The weight count is checked once, when the evaluator is built, so no search can start with
//! a misaligned weight vector.

use std::{fmt, iter};

use depotbot_engine::{AgentId, GameState, WarehouseView};

use crate::{
    feature::{FeatureConfig, FeatureVector},
    weights::Weights,
};

/// Lower bound of every won score. Finite so that expectation nodes can average it, and
/// small enough that adding a step count stays exact in `f32`.
pub const WIN_SCORE: f32 = 1.0e6;
/// Upper bound of every lost score.
pub const LOSS_SCORE: f32 = -WIN_SCORE;

/// Score of a game won with `steps_left` steps to spare.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn win_score(steps_left: u32) -> f32 {
    WIN_SCORE + steps_left as f32
}

/// Score of a game lost with `steps_left` steps to spare.
#[must_use]
pub fn loss_score(steps_left: u32) -> f32 {
    -win_score(steps_left)
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum EvaluatorError {
    #[display("expected {expected} weights for the configured features, got {actual}")]
    WeightCountMismatch { expected: usize, actual: usize },
}

/// Scores states from the point of view of one robot (higher is better for that robot).
pub trait StateEvaluator<S>: fmt::Debug + Send + Sync {
    fn evaluate(&self, state: &S, agent: AgentId) -> f32;

    /// `true` if the outcome of `state` is already settled for `agent`, so its score is final
    /// and expanding it further cannot change it.
    fn is_decided(&self, _state: &S, _agent: AgentId) -> bool {
        false
    }
}

impl<S, E> StateEvaluator<S> for &E
where
    E: StateEvaluator<S> + ?Sized,
{
    fn evaluate(&self, state: &S, agent: AgentId) -> f32 {
        (**self).evaluate(state, agent)
    }

    fn is_decided(&self, state: &S, agent: AgentId) -> bool {
        (**self).is_decided(state, agent)
    }
}

/// Feature-based evaluator with terminal short-circuits.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicEvaluator {
    config: FeatureConfig,
    weights: Weights,
}

impl HeuristicEvaluator {
    /// Creates an evaluator.
    ///
    /// `None` selects [`Weights::baseline`] for the configured feature set.
    pub fn new(config: FeatureConfig, weights: Option<Weights>) -> Result<Self, EvaluatorError> {
        let weights = weights.unwrap_or_else(|| Weights::baseline(config.set));
        if weights.len() != config.set.len() {
            return Err(EvaluatorError::WeightCountMismatch {
                expected: config.set.len(),
                actual: weights.len(),
            });
        }
        Ok(Self { config, weights })
    }

    #[must_use]
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    #[must_use]
    pub fn weights(&self) -> &Weights {
        &self.weights
    }
}

fn rival_stranded<S>(state: &S, agent: AgentId) -> bool
where
    S: WarehouseView,
{
    let me = state.robot(agent);
    let rival = state.robot(agent.opponent());
    rival.battery == 0 && me.credit > rival.credit
}

impl<S> StateEvaluator<S> for HeuristicEvaluator
where
    S: GameState + WarehouseView,
{
    #[expect(clippy::cast_precision_loss)]
    fn evaluate(&self, state: &S, agent: AgentId) -> f32 {
        let me = state.robot(agent);
        let rival = state.robot(agent.opponent());

        if state.is_terminal() {
            return match me.credit.cmp(&rival.credit) {
                std::cmp::Ordering::Greater => win_score(state.steps_left()),
                std::cmp::Ordering::Less => loss_score(state.steps_left()),
                std::cmp::Ordering::Equal => 0.0,
            };
        }

        if rival_stranded(state, agent) {
            return win_score(state.steps_left());
        }

        match FeatureVector::extract(state, agent, &self.config) {
            Some(features) => iter::zip(features.values(), self.weights.iter())
                .map(|(f, w)| f * w)
                .sum(),
            None => me.credit as f32 - rival.credit as f32,
        }
    }

    fn is_decided(&self, state: &S, agent: AgentId) -> bool {
        state.is_terminal() || rival_stranded(state, agent)
    }
}
