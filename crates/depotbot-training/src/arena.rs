//! Plays complete games between two agents.

use std::time::{Duration, Instant};

use depotbot_engine::{AgentId, GameState, IllegalMoveError, Outcome, WarehouseView};
use depotbot_search::agent::Agent;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum MatchError {
    #[display("{_0} has no legal move in a running game")]
    NoLegalMove(#[error(not(source))] AgentId),
    #[display("agent chose an illegal move: {_0}")]
    #[from]
    IllegalMove(IllegalMoveError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub outcome: Outcome,
    /// Plies played by both robots together.
    pub plies: u32,
    /// Turns on which an agent failed to produce a move in time.
    pub fallbacks: [u32; 2],
}

/// Alternates turns until the game is over. `agents[i]` plays robot `i`.
///
/// Each turn gets `move_time` of wall-clock time. An agent that returns no move plays the first
/// legal move instead.
pub fn play_match<S>(
    mut state: S,
    mut agents: [&mut dyn Agent<S>; 2],
    first: AgentId,
    move_time: Duration,
) -> Result<MatchResult, MatchError>
where
    S: GameState + WarehouseView,
{
    let mut to_move = first;
    let mut plies = 0;
    let mut fallbacks = [0; 2];

    while !state.is_terminal() {
        let agent = &mut agents[to_move.index()];
        let deadline = Instant::now() + move_time;
        let mv = match agent.choose_move(&state, to_move, deadline) {
            Some(mv) => mv,
            None => {
                fallbacks[to_move.index()] += 1;
                let fallback = *state
                    .legal_moves(to_move)
                    .first()
                    .ok_or(MatchError::NoLegalMove(to_move))?;
                debug!(agent = %to_move, strategy = agent.name(), %fallback, "no move in time");
                fallback
            }
        };
        trace!(agent = %to_move, %mv, "ply");
        state.apply(to_move, mv)?;
        plies += 1;
        to_move = to_move.opponent();
    }

    let outcome = Outcome::from_credits(
        state.robot(AgentId::First).credit,
        state.robot(AgentId::Second).credit,
    );
    debug!(?outcome, plies, "match finished");
    Ok(MatchResult {
        outcome,
        plies,
        fallbacks,
    })
}
