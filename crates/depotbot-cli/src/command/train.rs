use std::time::Duration;

use anyhow::Context as _;
use chrono::Utc;
use depotbot_training::genetic::{self, GeneticParams, TrainingAgent};
use rand::SeedableRng as _;
use rand_pcg::Pcg64Mcg;
use tracing::info;

use crate::report::{self, TrainedWeights};

use super::{GameOptions, Strategy};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Individuals per generation
    #[arg(long, default_value_t = 12)]
    population: usize,
    #[arg(long, default_value_t = 10)]
    generations: usize,
    /// Individuals copied unchanged into the next generation
    #[arg(long, default_value_t = 2)]
    elite: usize,
    #[arg(long, default_value_t = 2)]
    tournament: usize,
    /// Warehouses each ordered pair plays per generation
    #[arg(long, default_value_t = 1)]
    matches_per_pair: usize,
    #[arg(long, default_value_t = 0.0)]
    gene_min: f32,
    #[arg(long, default_value_t = 10.0)]
    gene_max: f32,
    /// Probability that a gene is replaced by a fresh random value
    #[arg(long, default_value_t = 0.1)]
    mutation_chance: f32,
    /// Strategy used in fitness matches (random is not allowed)
    #[arg(long, value_enum, default_value_t = Strategy::Greedy)]
    agent: Strategy,
    /// Time per move for search strategies, in milliseconds
    #[arg(long, default_value_t = 20)]
    move_time_ms: u64,
    /// Depth cap for search strategies
    #[arg(long)]
    max_depth: Option<u32>,
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    #[clap(flatten)]
    game: GameOptions,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let agent = match arg.agent {
        Strategy::Greedy => TrainingAgent::Greedy,
        Strategy::Random => anyhow::bail!("random agents ignore their weights and cannot be trained"),
        strategy => TrainingAgent::Search {
            config: strategy
                .search_config(arg.max_depth)
                .context("not a search strategy")?,
            move_time: Duration::from_millis(arg.move_time_ms),
        },
    };
    let params = GeneticParams {
        population: arg.population,
        generations: arg.generations,
        elite_count: arg.elite,
        tournament_size: arg.tournament,
        matches_per_pair: arg.matches_per_pair,
        gene_min: arg.gene_min,
        gene_max: arg.gene_max,
        mutation_chance: arg.mutation_chance,
        agent,
        features: arg.game.features(),
        warehouse: arg.game.warehouse(),
    };
    params.validate().context("invalid training parameters")?;

    let mut rng = match arg.seed {
        Some(seed) => Pcg64Mcg::seed_from_u64(seed),
        None => Pcg64Mcg::from_rng(&mut rand::rng()),
    };
    let outcome = genetic::train(&params, &mut rng, |summary| {
        info!(
            generation = summary.generation,
            best_genes = ?summary.best_genes,
            spread = ?summary.genes.iter().map(|s| s.std_dev).collect::<Vec<_>>(),
            "generation summary"
        );
    })
    .context("training failed")?;

    let report = TrainedWeights::new(
        Utc::now(),
        params.features.set,
        params.generations,
        outcome.best_fitness,
        outcome.best.genes(),
    );
    report::print_json(&report)?;

    info!(
        fitness = report.final_fitness,
        features = report.weights.len(),
        "training completed"
    );
    Ok(())
}
