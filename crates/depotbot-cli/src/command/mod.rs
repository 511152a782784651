use clap::{Parser, Subcommand};
use depotbot_engine::WarehouseConfig;
use depotbot_evaluator::{
    feature::{FeatureConfig, FeatureSet},
    heuristic::HeuristicEvaluator,
    weights::Weights,
};
use depotbot_search::{
    controller::SearchConfig,
    propagator::{OpponentModel, Propagator},
};

use self::{duel::DuelArg, train::TrainArg};

mod duel;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve evaluator weights and print the best genome as JSON
    Train(#[clap(flatten)] TrainArg),
    /// Play games between two strategies
    Duel(#[clap(flatten)] DuelArg),
}

pub fn run() -> anyhow::Result<()> {
    init_tracing();
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Duel(arg) => duel::run(&arg)?,
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Strategy {
    Minimax,
    #[default]
    AlphaBeta,
    Expectimax,
    Greedy,
    Random,
}

impl Strategy {
    fn search_config(self, max_depth: Option<u32>) -> Option<SearchConfig> {
        let propagator = match self {
            Self::Minimax => Propagator::Minimax,
            Self::AlphaBeta => Propagator::AlphaBeta,
            Self::Expectimax => Propagator::Expectimax(OpponentModel::default()),
            Self::Greedy | Self::Random => return None,
        };
        Some(SearchConfig {
            propagator,
            max_depth,
            stop_when_exhausted: true,
        })
    }
}

/// Options shared by every command that builds warehouses and evaluators.
#[derive(Debug, Clone, clap::Args)]
struct GameOptions {
    /// Grid width
    #[arg(long, default_value_t = 5)]
    width: u8,
    /// Grid height
    #[arg(long, default_value_t = 5)]
    height: u8,
    /// Packages spawned per game
    #[arg(long, default_value_t = 6)]
    packages: usize,
    /// Shared step budget per game
    #[arg(long, default_value_t = 100)]
    steps: u32,
    /// Starting and maximum battery
    #[arg(long, default_value_t = 20)]
    battery: u32,
    /// Use the eight-feature evaluator instead of the six-feature one
    #[arg(long)]
    extended: bool,
}

impl GameOptions {
    fn warehouse(&self) -> WarehouseConfig {
        WarehouseConfig {
            width: self.width,
            height: self.height,
            package_count: self.packages,
            initial_battery: self.battery,
            max_battery: self.battery,
            step_limit: self.steps,
        }
    }

    fn features(&self) -> FeatureConfig {
        FeatureConfig {
            set: if self.extended {
                FeatureSet::Extended
            } else {
                FeatureSet::Baseline
            },
            ..FeatureConfig::default()
        }
    }

    fn evaluator(&self, weights: Option<Vec<f32>>) -> anyhow::Result<HeuristicEvaluator> {
        Ok(HeuristicEvaluator::new(
            self.features(),
            weights.map(Weights::new),
        )?)
    }
}
