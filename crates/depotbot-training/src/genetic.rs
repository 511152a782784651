//! Genetic algorithm evolving evaluator weights through competitive play.
//!
//! # Algorithm Overview
//!
//! 1. **Evaluate Fitness** - Every individual plays a round robin against every other
//!    individual. Fitness is the number of matches won.
//! 2. **Elite Selection** - The best individuals move to the next generation unchanged.
//! 3. **Tournament Selection** - Parents are the fittest of a few randomly drawn individuals.
//! 4. **Crossover and Mutation** - [`Genome::crossover`] blends two parents gene by gene and
//!    replaces a few genes with fresh random values.
//!
//! # Round Robin
//!
//! For every ordered pair `(a, b)` with `a ≠ b`, individual `a` plays robot 0 and moves first
//! against `b` on `matches_per_pair` warehouses. Each unordered pair therefore meets once with
//! each side moving first per warehouse. All individuals face the same warehouses in a
//! generation, drawn fresh from the trainer's random source. Draws score nothing.
//!
//! # Parallelization
//!
//! Matches are independent: each individual's home matches run on their own scoped thread.
//! A generation finishes completely before the next one is bred.

use std::{iter, thread, time::Duration};

use depotbot_engine::{AgentId, LayoutError, Warehouse, WarehouseConfig};
use depotbot_evaluator::{
    feature::FeatureConfig,
    heuristic::{EvaluatorError, HeuristicEvaluator},
};
use depotbot_search::{
    agent::{Agent, GreedyAgent, SearchAgent},
    controller::SearchConfig,
};
use rand::{Rng, seq::IndexedRandom as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    arena::{self, MatchError},
    genome::{DEFAULT_MUTATION_CHANCE, Genome},
    stats::GenerationSummary,
};

/// How individuals choose moves during fitness matches.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingAgent {
    /// One-ply lookahead. Fast enough for large populations.
    #[default]
    Greedy,
    /// Iterative deepening with `move_time` per move.
    Search {
        config: SearchConfig,
        move_time: Duration,
    },
}

impl TrainingAgent {
    fn build<'a>(&self, evaluator: &'a HeuristicEvaluator) -> Box<dyn Agent<Warehouse> + 'a> {
        match self {
            Self::Greedy => Box::new(GreedyAgent::new(evaluator)),
            Self::Search { config, .. } => Box::new(SearchAgent::new(evaluator, *config)),
        }
    }

    fn move_time(&self) -> Duration {
        match self {
            Self::Greedy => Duration::ZERO,
            Self::Search { move_time, .. } => *move_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticParams {
    pub population: usize,
    pub generations: usize,
    /// Individuals copied unchanged into the next generation.
    pub elite_count: usize,
    pub tournament_size: usize,
    /// Warehouses each ordered pair plays per generation.
    pub matches_per_pair: usize,
    pub gene_min: f32,
    pub gene_max: f32,
    pub mutation_chance: f32,
    pub agent: TrainingAgent,
    pub features: FeatureConfig,
    pub warehouse: WarehouseConfig,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            population: 12,
            generations: 10,
            elite_count: 2,
            tournament_size: 2,
            matches_per_pair: 1,
            gene_min: 0.0,
            gene_max: 10.0,
            mutation_chance: DEFAULT_MUTATION_CHANCE,
            agent: TrainingAgent::default(),
            features: FeatureConfig::default(),
            warehouse: WarehouseConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ParamsError {
    #[display("a round robin needs at least two individuals, got {_0}")]
    PopulationTooSmall(#[error(not(source))] usize),
    #[display("at least one generation is required")]
    NoGenerations,
    #[display("elite count {elite_count} must be smaller than the population {population}")]
    TooManyElites { elite_count: usize, population: usize },
    #[display("tournament size must be between 1 and the population size")]
    BadTournamentSize,
    #[display("gene range [{_0}, {_1}) is empty")]
    EmptyGeneRange(f32, f32),
    #[display("mutation chance {_0} is not a probability")]
    BadMutationChance(#[error(not(source))] f32),
}

impl GeneticParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.population < 2 {
            return Err(ParamsError::PopulationTooSmall(self.population));
        }
        if self.generations == 0 {
            return Err(ParamsError::NoGenerations);
        }
        if self.elite_count >= self.population {
            return Err(ParamsError::TooManyElites {
                elite_count: self.elite_count,
                population: self.population,
            });
        }
        if self.tournament_size == 0 || self.tournament_size > self.population {
            return Err(ParamsError::BadTournamentSize);
        }
        if self.gene_min.is_nan() || self.gene_max.is_nan() || self.gene_min >= self.gene_max {
            return Err(ParamsError::EmptyGeneRange(self.gene_min, self.gene_max));
        }
        if !(0.0..=1.0).contains(&self.mutation_chance) {
            return Err(ParamsError::BadMutationChance(self.mutation_chance));
        }
        Ok(())
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum TrainingError {
    #[display("invalid training parameters: {_0}")]
    Params(ParamsError),
    #[display("invalid genome: {_0}")]
    Evaluator(EvaluatorError),
    #[display("cannot generate warehouse: {_0}")]
    Layout(LayoutError),
    #[display("match failed: {_0}")]
    Match(MatchError),
}

#[derive(Debug, Clone)]
pub struct Individual {
    genome: Genome,
    wins: u32,
}

impl Individual {
    #[must_use]
    pub fn new(genome: Genome) -> Self {
        Self { genome, wins: 0 }
    }

    #[must_use]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Matches won in the last evaluation.
    #[must_use]
    pub fn fitness(&self) -> u32 {
        self.wins
    }
}

#[derive(Debug, Clone)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    pub fn random<R>(params: &GeneticParams, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let len = params.features.set.len();
        let individuals = (0..params.population)
            .map(|_| {
                let genome = Genome::random(len, params.gene_min, params.gene_max, rng)
                    .with_mutation_chance(params.mutation_chance);
                Individual::new(genome)
            })
            .collect();
        Self { individuals }
    }

    #[must_use]
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Plays the round robin on `warehouses` and sorts individuals by wins, best first.
    ///
    /// Ties keep their previous order.
    pub fn evaluate_fitness(
        &mut self,
        params: &GeneticParams,
        warehouses: &[Warehouse],
    ) -> Result<(), TrainingError> {
        let evaluators = self
            .individuals
            .iter()
            .map(|ind| HeuristicEvaluator::new(params.features, Some(ind.genome.to_weights())))
            .collect::<Result<Vec<_>, _>>()?;

        let winners = thread::scope(|s| {
            let handles = (0..evaluators.len())
                .map(|home| {
                    let evaluators = &evaluators;
                    s.spawn(move || home_matches(home, evaluators, &params.agent, warehouses))
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect::<Result<Vec<_>, MatchError>>()
        })?;

        for ind in &mut self.individuals {
            ind.wins = 0;
        }
        for winner in winners.into_iter().flatten() {
            self.individuals[winner].wins += 1;
        }

        // sort by fitness descending
        self.individuals.sort_by(|a, b| b.wins.cmp(&a.wins));
        Ok(())
    }
}

/// Plays every match in which individual `home` is robot 0. Returns the winners' indices.
fn home_matches(
    home: usize,
    evaluators: &[HeuristicEvaluator],
    agent: &TrainingAgent,
    warehouses: &[Warehouse],
) -> Result<Vec<usize>, MatchError> {
    let mut winners = vec![];
    for away in (0..evaluators.len()).filter(|&away| away != home) {
        for warehouse in warehouses {
            let mut first = agent.build(&evaluators[home]);
            let mut second = agent.build(&evaluators[away]);
            let result = arena::play_match(
                warehouse.clone(),
                [&mut first, &mut second],
                AgentId::First,
                agent.move_time(),
            )?;
            debug!(home, away, outcome = ?result.outcome, plies = result.plies, "fitness match");
            match result.outcome.winner() {
                Some(AgentId::First) => winners.push(home),
                Some(AgentId::Second) => winners.push(away),
                None => {}
            }
        }
    }
    Ok(winners)
}

/// Breeds the next generation.
#[derive(Debug, Clone)]
pub struct PopulationEvolver {
    pub elite_count: usize,
    /// Larger tournaments select more greedily.
    pub tournament_size: usize,
}

impl PopulationEvolver {
    /// `population` must be sorted by fitness, best first.
    #[must_use]
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        assert!(
            population
                .individuals
                .is_sorted_by(|a, b| a.wins >= b.wins)
        );

        let elites = population
            .individuals
            .iter()
            .take(self.elite_count)
            .map(|ind| Individual::new(ind.genome.clone()));
        let mut next_individuals = elites.collect::<Vec<_>>();

        while next_individuals.len() < population.individuals.len() {
            let p1 = tournament_select(&population.individuals, self.tournament_size, rng);
            let p2 = tournament_select(&population.individuals, self.tournament_size, rng);
            next_individuals.push(Individual::new(p1.genome.crossover(&p2.genome, rng)));
        }

        Population {
            individuals: next_individuals,
        }
    }
}

/// Returns the fittest of `tournament_size` distinct random individuals.
///
/// Ties go to the individual ranked higher in `population`.
fn tournament_select<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual
where
    R: Rng + ?Sized,
{
    assert!(tournament_size > 0 && !population.is_empty());
    let mut best: Option<(usize, &Individual)> = None;
    let indices = (0..population.len()).collect::<Vec<_>>();
    for &i in indices.choose_multiple(rng, tournament_size) {
        let candidate = &population[i];
        let better = best.is_none_or(|(best_index, best_ind)| {
            candidate.wins > best_ind.wins || (candidate.wins == best_ind.wins && i < best_index)
        });
        if better {
            best = Some((i, candidate));
        }
    }
    best.map_or(&population[0], |(_, ind)| ind)
}

/// Result of a complete training run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub best: Genome,
    /// Wins of `best` in the final generation.
    pub best_fitness: u32,
    pub history: Vec<GenerationSummary>,
}

/// Runs the genetic algorithm for `params.generations` generations.
///
/// `on_generation` is called after every evaluated generation.
pub fn train<R, F>(
    params: &GeneticParams,
    rng: &mut R,
    mut on_generation: F,
) -> Result<TrainingOutcome, TrainingError>
where
    R: Rng + ?Sized,
    F: FnMut(&GenerationSummary),
{
    params.validate()?;
    let evolver = PopulationEvolver {
        elite_count: params.elite_count,
        tournament_size: params.tournament_size,
    };

    let mut population = Population::random(params, rng);
    let mut history = vec![];
    for generation in 0..params.generations {
        let warehouses = iter::repeat_with(|| Warehouse::random(&params.warehouse, rng))
            .take(params.matches_per_pair)
            .collect::<Result<Vec<_>, _>>()?;
        population.evaluate_fitness(params, &warehouses)?;

        if let Some(summary) = GenerationSummary::new(generation, &population) {
            info!(
                generation,
                best = summary.fitness.max,
                mean = summary.fitness.mean,
                worst = summary.fitness.min,
                "generation evaluated"
            );
            on_generation(&summary);
            history.push(summary);
        }

        if generation + 1 < params.generations {
            population = evolver.evolve(&population, rng);
        }
    }

    let best = &population.individuals[0];
    Ok(TrainingOutcome {
        best: best.genome.clone(),
        best_fitness: best.wins,
        history,
    })
}
