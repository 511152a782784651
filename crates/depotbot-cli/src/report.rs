use std::{
    collections::BTreeMap,
    io::{self, Write as _},
};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use depotbot_engine::{AgentId, Outcome};
use depotbot_evaluator::feature::FeatureSet;
use depotbot_training::arena::MatchResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrainedWeights {
    pub trained_at: DateTime<Utc>,
    pub feature_set: FeatureSet,
    pub generations: usize,
    pub final_fitness: u32,
    /// Weights in evaluator order, ready for `duel --first-weights`.
    pub genes: Vec<f32>,
    pub weights: BTreeMap<String, f32>,
}

impl TrainedWeights {
    pub fn new(
        trained_at: DateTime<Utc>,
        feature_set: FeatureSet,
        generations: usize,
        final_fitness: u32,
        genes: &[f32],
    ) -> Self {
        Self {
            trained_at,
            feature_set,
            generations,
            final_fitness,
            genes: genes.to_vec(),
            weights: feature_set
                .features()
                .iter()
                .zip(genes)
                .map(|(feature, weight)| (feature.to_string(), *weight))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DuelSummary {
    pub first: String,
    pub second: String,
    pub first_wins: u32,
    pub second_wins: u32,
    pub draws: u32,
    /// Turns on which a contender produced no move in time.
    pub first_fallbacks: u32,
    pub second_fallbacks: u32,
}

impl DuelSummary {
    pub fn new(first: String, second: String) -> Self {
        Self {
            first,
            second,
            first_wins: 0,
            second_wins: 0,
            draws: 0,
            first_fallbacks: 0,
            second_fallbacks: 0,
        }
    }

    /// Adds a game in which the first contender played robot 0.
    pub fn record(&mut self, result: &MatchResult) {
        match result.outcome {
            Outcome::Winner(AgentId::First) => self.first_wins += 1,
            Outcome::Winner(AgentId::Second) => self.second_wins += 1,
            Outcome::Draw => self.draws += 1,
        }
        self.first_fallbacks += result.fallbacks[AgentId::First.index()];
        self.second_fallbacks += result.fallbacks[AgentId::Second.index()];
    }
}

pub fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: Serialize,
{
    let mut writer = io::stdout().lock();
    serde_json::to_writer_pretty(&mut writer, value).context("Failed to write JSON to stdout")?;
    writeln!(writer)?;
    Ok(())
}
