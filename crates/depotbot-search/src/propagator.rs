//! Value propagation: the recursive rules that back up leaf scores through the game tree.
//!
//! All three propagators share the same shape:
//!
//! ```text
//! value(state, to_move, depth):
//!     if depth == 0 or state is decided:  evaluate(state, root agent)
//!     if to_move is the root agent:       max over successors
//!     otherwise:                          propagator-specific reduction over successors
//! ```
//!
//! Every ply decrements `depth` by exactly one and hands the move to the other robot. A state
//! is decided when it is terminal or when the evaluator reports its outcome as settled (see
//! [`StateEvaluator::is_decided`]).
//!
//! - [`Propagator::Minimax`] - The opponent minimizes.
//! - [`Propagator::AlphaBeta`] - Minimax with fail-hard alpha-beta pruning. It returns the same
//!   root value as minimax and only skips work.
//! - [`Propagator::Expectimax`] - The opponent is a chance node: a weighted average over its
//!   legal moves, with weights from an [`OpponentModel`] normalized over the moves that are
//!   actually legal.
//!
//! Successors are produced by cloning the state and applying one enumerated legal move, so
//! sibling branches never share state.
//!
//! # Panics
//!
//! A non-terminal state without legal moves, or a rejected enumerated move, breaks the
//! [`GameState`] contract and panics.

use std::fmt;

use depotbot_engine::{Action, AgentId, GameState};
use depotbot_evaluator::heuristic::StateEvaluator;
use serde::{Deserialize, Serialize};

use crate::control::{SearchAborted, SearchControl};

/// Classifies moves for the opponent model used by expectimax.
pub trait MoveKind {
    /// `true` for moves that change the mover's position.
    fn is_movement(&self) -> bool;
}

impl MoveKind for Action {
    fn is_movement(&self) -> bool {
        self.is_move()
    }
}

/// Relative likelihood of each opponent move at expectimax chance nodes.
///
/// The opponent is assumed to move around more often than it performs stationary actions
/// (parking, picking up, dropping off, charging).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpponentModel {
    pub movement_weight: f32,
    pub stationary_weight: f32,
}

impl Default for OpponentModel {
    fn default() -> Self {
        Self {
            movement_weight: 2.0,
            stationary_weight: 1.0,
        }
    }
}

impl OpponentModel {
    /// Every legal move is equally likely.
    #[must_use]
    pub const fn uniform() -> Self {
        Self {
            movement_weight: 1.0,
            stationary_weight: 1.0,
        }
    }

    #[must_use]
    pub fn weight<M>(&self, mv: &M) -> f32
    where
        M: MoveKind,
    {
        if mv.is_movement() {
            self.movement_weight
        } else {
            self.stationary_weight
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagator {
    Minimax,
    #[default]
    AlphaBeta,
    Expectimax(OpponentModel),
}

impl fmt::Display for Propagator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minimax => f.write_str("minimax"),
            Self::AlphaBeta => f.write_str("alpha-beta"),
            Self::Expectimax(_) => f.write_str("expectimax"),
        }
    }
}

/// One search invocation: the evaluator, the root agent and the node counter.
///
/// Created fresh for every depth pass; nothing carries over between passes except the node
/// count reported to the caller.
#[derive(Debug)]
pub(crate) struct TreeSearch<'a, E> {
    evaluator: &'a E,
    control: &'a SearchControl,
    propagator: Propagator,
    root_agent: AgentId,
    nodes: u64,
    horizon_reached: bool,
}

impl<'a, E> TreeSearch<'a, E> {
    pub(crate) fn new(
        evaluator: &'a E,
        control: &'a SearchControl,
        propagator: Propagator,
        root_agent: AgentId,
        nodes: u64,
    ) -> Self {
        Self {
            evaluator,
            control,
            propagator,
            root_agent,
            nodes,
            horizon_reached: false,
        }
    }

    pub(crate) fn nodes(&self) -> u64 {
        self.nodes
    }

    /// `true` once an undecided state was cut off at depth 0.
    ///
    /// If a pass never reaches its horizon, every deeper pass sees the same tree.
    pub(crate) fn horizon_reached(&self) -> bool {
        self.horizon_reached
    }

    pub(crate) fn check(&self) -> Result<(), SearchAborted> {
        self.control.check(self.nodes)
    }

    /// Value of `state` for the root agent with `to_move` about to act.
    ///
    /// Alpha-beta bounds start at `(-∞, +∞)` on every call from here.
    pub(crate) fn value<S>(&mut self, state: &S, to_move: AgentId, depth: u32) -> Result<f32, SearchAborted>
    where
        S: GameState,
        S::Move: MoveKind,
        E: StateEvaluator<S>,
    {
        match self.propagator {
            Propagator::Minimax => self.minimax(state, to_move, depth),
            Propagator::AlphaBeta => {
                self.alpha_beta(state, to_move, depth, f32::NEG_INFINITY, f32::INFINITY)
            }
            Propagator::Expectimax(model) => self.expectimax(state, to_move, depth, &model),
        }
    }

    /// Counts a node, polls the control and evaluates leaves.
    ///
    /// Returns `Some(score)` for a leaf, `None` for an interior node.
    fn enter<S>(&mut self, state: &S, depth: u32) -> Result<Option<f32>, SearchAborted>
    where
        S: GameState,
        E: StateEvaluator<S>,
    {
        self.nodes += 1;
        self.control.check(self.nodes)?;
        if state.is_terminal() || self.evaluator.is_decided(state, self.root_agent) {
            return Ok(Some(self.evaluator.evaluate(state, self.root_agent)));
        }
        if depth == 0 {
            self.horizon_reached = true;
            return Ok(Some(self.evaluator.evaluate(state, self.root_agent)));
        }
        Ok(None)
    }

    fn minimax<S>(&mut self, state: &S, to_move: AgentId, depth: u32) -> Result<f32, SearchAborted>
    where
        S: GameState,
        S::Move: MoveKind,
        E: StateEvaluator<S>,
    {
        if let Some(score) = self.enter(state, depth)? {
            return Ok(score);
        }

        let maximizing = to_move == self.root_agent;
        let mut best = if maximizing {
            f32::NEG_INFINITY
        } else {
            f32::INFINITY
        };
        for mv in checked_moves(state, to_move) {
            let child = successor(state, to_move, mv);
            let value = self.minimax(&child, to_move.opponent(), depth - 1)?;
            best = if maximizing {
                best.max(value)
            } else {
                best.min(value)
            };
        }
        Ok(best)
    }

    fn alpha_beta<S>(
        &mut self,
        state: &S,
        to_move: AgentId,
        depth: u32,
        mut alpha: f32,
        mut beta: f32,
    ) -> Result<f32, SearchAborted>
    where
        S: GameState,
        S::Move: MoveKind,
        E: StateEvaluator<S>,
    {
        if let Some(score) = self.enter(state, depth)? {
            return Ok(score);
        }

        if to_move == self.root_agent {
            let mut best = f32::NEG_INFINITY;
            for mv in checked_moves(state, to_move) {
                let child = successor(state, to_move, mv);
                let value = self.alpha_beta(&child, to_move.opponent(), depth - 1, alpha, beta)?;
                best = best.max(value);
                if best >= beta {
                    return Ok(beta);
                }
                alpha = alpha.max(best);
            }
            Ok(best)
        } else {
            let mut best = f32::INFINITY;
            for mv in checked_moves(state, to_move) {
                let child = successor(state, to_move, mv);
                let value = self.alpha_beta(&child, to_move.opponent(), depth - 1, alpha, beta)?;
                best = best.min(value);
                if best <= alpha {
                    return Ok(alpha);
                }
                beta = beta.min(best);
            }
            Ok(best)
        }
    }

    fn expectimax<S>(
        &mut self,
        state: &S,
        to_move: AgentId,
        depth: u32,
        model: &OpponentModel,
    ) -> Result<f32, SearchAborted>
    where
        S: GameState,
        S::Move: MoveKind,
        E: StateEvaluator<S>,
    {
        if let Some(score) = self.enter(state, depth)? {
            return Ok(score);
        }

        if to_move == self.root_agent {
            let mut best = f32::NEG_INFINITY;
            for mv in checked_moves(state, to_move) {
                let child = successor(state, to_move, mv);
                best = best.max(self.expectimax(&child, to_move.opponent(), depth - 1, model)?);
            }
            Ok(best)
        } else {
            let mut weighted_sum = 0.0;
            let mut total_weight = 0.0;
            for mv in checked_moves(state, to_move) {
                let weight = model.weight(&mv);
                let child = successor(state, to_move, mv);
                weighted_sum += weight * self.expectimax(&child, to_move.opponent(), depth - 1, model)?;
                total_weight += weight;
            }
            assert!(
                total_weight > 0.0,
                "opponent model assigns no weight to any legal move"
            );
            Ok(weighted_sum / total_weight)
        }
    }
}

/// Legal moves of a non-terminal state, which must not be empty.
pub(crate) fn checked_moves<S>(state: &S, agent: AgentId) -> depotbot_engine::MoveList<S::Move>
where
    S: GameState,
{
    let moves = state.legal_moves(agent);
    assert!(
        !moves.is_empty(),
        "{agent} has no legal move in a non-terminal state"
    );
    moves
}

/// Clones `state` and applies `mv`, which must come from `state.legal_moves(agent)`.
pub(crate) fn successor<S>(state: &S, agent: AgentId, mv: S::Move) -> S
where
    S: GameState,
{
    let mut child = state.clone();
    if let Err(err) = child.apply(agent, mv) {
        panic!("enumerated legal move was rejected: {err}");
    }
    child
}
