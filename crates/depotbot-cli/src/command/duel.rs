use std::time::Duration;

use anyhow::Context as _;
use depotbot_engine::{AgentId, Warehouse};
use depotbot_search::agent::{Agent, GreedyAgent, RandomAgent, SearchAgent};
use depotbot_training::arena;
use tracing::info;

use crate::report::{self, DuelSummary};

use super::{GameOptions, Strategy};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DuelArg {
    /// Strategy of the first contender
    #[arg(long, value_enum, default_value_t = Strategy::AlphaBeta)]
    first: Strategy,
    /// Strategy of the second contender
    #[arg(long, value_enum, default_value_t = Strategy::Greedy)]
    second: Strategy,
    /// Comma-separated evaluator weights of the first contender
    #[arg(long, value_delimiter = ',')]
    first_weights: Option<Vec<f32>>,
    /// Comma-separated evaluator weights of the second contender
    #[arg(long, value_delimiter = ',')]
    second_weights: Option<Vec<f32>>,
    /// Number of games; each layout is played twice with the first move swapped
    #[arg(long, default_value_t = 4)]
    games: u32,
    /// Time per move for search strategies, in milliseconds
    #[arg(long, default_value_t = 200)]
    move_time_ms: u64,
    /// Depth cap for search strategies
    #[arg(long)]
    max_depth: Option<u32>,
    /// Seed of the first layout; later games use the following seeds
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[clap(flatten)]
    game: GameOptions,
}

fn build_agent(
    strategy: Strategy,
    weights: Option<Vec<f32>>,
    arg: &DuelArg,
    seed: u64,
) -> anyhow::Result<Box<dyn Agent<Warehouse>>> {
    let evaluator = arg
        .game
        .evaluator(weights)
        .with_context(|| format!("invalid weights for {strategy:?}"))?;
    let agent: Box<dyn Agent<Warehouse>> = match strategy {
        Strategy::Greedy => Box::new(GreedyAgent::new(evaluator)),
        Strategy::Random => Box::new(RandomAgent::with_seed(seed)),
        search => {
            let config = search
                .search_config(arg.max_depth)
                .context("not a search strategy")?;
            Box::new(SearchAgent::new(evaluator, config))
        }
    };
    Ok(agent)
}

pub(crate) fn run(arg: &DuelArg) -> anyhow::Result<()> {
    let warehouse_config = arg.game.warehouse();
    let move_time = Duration::from_millis(arg.move_time_ms);
    let mut summary = DuelSummary::new(
        format!("{:?}", arg.first),
        format!("{:?}", arg.second),
    );

    for game in 0..arg.games {
        let layout_seed = arg.seed + u64::from(game / 2);
        let warehouse = Warehouse::with_seed(&warehouse_config, layout_seed)
            .with_context(|| format!("cannot generate warehouse from seed {layout_seed}"))?;
        let mut first = build_agent(arg.first, arg.first_weights.clone(), arg, layout_seed)?;
        let mut second = build_agent(arg.second, arg.second_weights.clone(), arg, layout_seed)?;

        // the first contender plays robot 0; robot 0 moves first on even games
        let starts = if game % 2 == 0 {
            AgentId::First
        } else {
            AgentId::Second
        };
        let result = arena::play_match(warehouse, [&mut first, &mut second], starts, move_time)
            .with_context(|| format!("game {game} failed"))?;
        info!(
            game,
            layout_seed,
            %starts,
            outcome = ?result.outcome,
            plies = result.plies,
            "game finished"
        );
        summary.record(&result);
    }

    report::print_json(&summary)?;
    Ok(())
}
