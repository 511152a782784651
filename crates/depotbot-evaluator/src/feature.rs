//! Feature extraction: named markers describing a state from one robot's point of view.
//!
//! Every feature is "higher is better" for the acting robot. Distances therefore enter as
//! negative values.
//!
//! # Features
//!
//! | feature | value |
//! |---|---|
//! | [`Feature::DeltaCredit`] | own credit − rival credit |
//! | [`Feature::DeltaBattery`] | own battery − rival battery |
//! | [`Feature::DeltaPack`] | own package held (0/1) − rival package held (0/1) |
//! | [`Feature::PackBonus`] | own package held (0/1) |
//! | [`Feature::DistanceToTarget`] | −distance to the nearest package, or to the held package's destination |
//! | [`Feature::DistanceToCharger`] | charger term, see [`ChargerTerm`] |
//! | [`Feature::Credit`] | own credit (extended set only) |
//! | [`Feature::Battery`] | own battery (extended set only) |
//!
//! # Battery Scaling
//!
//! With [`FeatureConfig::scale_target_by_battery`] enabled (the default), the target distance
//! is multiplied by `battery / max_battery`. A robot running out of battery cares less about
//! walking to a package it cannot reach anyway.
//!
//! # Charger Term
//!
//! Two formulas are supported; see [`ChargerTerm`]. Both use the nearest charger. The charger
//! gain is the fraction of a full battery the robot could buy with its current credit:
//!
//! ```text
//! charger_gain = (min(max_battery, battery + credit) - battery) / max_battery   ∈ [0, 1]
//! ```
//!
//! # Missing Target
//!
//! When the robot holds nothing and no package is left on the board, there is no target and
//! [`FeatureVector::extract`] returns `None`. The evaluator then falls back to the credit
//! differential.

use std::iter;

use depotbot_engine::{AgentId, Position, WarehouseView};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    #[display("delta_credit")]
    DeltaCredit,
    #[display("delta_battery")]
    DeltaBattery,
    #[display("delta_pack")]
    DeltaPack,
    #[display("pack_bonus")]
    PackBonus,
    #[display("distance_to_target")]
    DistanceToTarget,
    #[display("distance_to_charger")]
    DistanceToCharger,
    #[display("credit")]
    Credit,
    #[display("battery")]
    Battery,
}

impl Feature {
    pub const LEN: usize = 8;

    /// All features in weight-vector order.
    pub const ALL: [Self; Self::LEN] = [
        Self::DeltaCredit,
        Self::DeltaBattery,
        Self::DeltaPack,
        Self::PackBonus,
        Self::DistanceToTarget,
        Self::DistanceToCharger,
        Self::Credit,
        Self::Battery,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSet {
    /// The six relative features.
    #[default]
    Baseline,
    /// Baseline plus absolute credit and battery.
    Extended,
}

impl FeatureSet {
    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            Self::Baseline => 6,
            Self::Extended => 8,
        }
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        false
    }

    #[must_use]
    pub fn features(self) -> &'static [Feature] {
        &Feature::ALL[..self.len()]
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargerTerm {
    /// `-distance`: always pulls towards the nearest charger.
    Distance,
    /// `-(distance + 1) * charger_gain`: pulls only when credit could be turned into battery.
    #[default]
    ScaledByGain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub set: FeatureSet,
    pub scale_target_by_battery: bool,
    pub charger_term: ChargerTerm,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            set: FeatureSet::Baseline,
            scale_target_by_battery: true,
            charger_term: ChargerTerm::ScaledByGain,
        }
    }
}

/// Feature values for one `(state, robot)` pair.
///
/// Only the first `set.len()` entries are meaningful.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    set: FeatureSet,
    values: [f32; Feature::LEN],
}

impl FeatureVector {
    /// Extracts all features of `config.set` for `agent`.
    ///
    /// Returns `None` if `agent` holds no package and none is left on the board.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn extract<S>(state: &S, agent: AgentId, config: &FeatureConfig) -> Option<Self>
    where
        S: WarehouseView,
    {
        let me = state.robot(agent);
        let rival = state.robot(agent.opponent());
        let max_battery = state.max_battery();
        let battery_fraction = if max_battery == 0 {
            0.0
        } else {
            me.battery as f32 / max_battery as f32
        };

        let target_distance = match &me.package {
            Some(package) => me.position.manhattan(package.destination),
            None => nearest(
                me.position,
                state.packages_on_board().map(|p| p.position),
            )?,
        };
        let mut distance_to_target = -(target_distance as f32);
        if config.scale_target_by_battery {
            distance_to_target *= battery_fraction;
        }

        let distance_to_charger = match nearest(me.position, state.chargers().iter().copied()) {
            None => 0.0,
            Some(d) => match config.charger_term {
                ChargerTerm::Distance => -(d as f32),
                ChargerTerm::ScaledByGain => {
                    let gain = if max_battery == 0 {
                        0.0
                    } else {
                        let reachable = u32::min(max_battery, me.battery + me.credit);
                        reachable.saturating_sub(me.battery) as f32 / max_battery as f32
                    };
                    -(d as f32 + 1.0) * gain
                }
            },
        };

        let held = |holds: bool| if holds { 1.0 } else { 0.0 };
        let mut values = [0.0; Feature::LEN];
        values[Feature::DeltaCredit.index()] = me.credit as f32 - rival.credit as f32;
        values[Feature::DeltaBattery.index()] = me.battery as f32 - rival.battery as f32;
        values[Feature::DeltaPack.index()] =
            held(me.holds_package()) - held(rival.holds_package());
        values[Feature::PackBonus.index()] = held(me.holds_package());
        values[Feature::DistanceToTarget.index()] = distance_to_target;
        values[Feature::DistanceToCharger.index()] = distance_to_charger;
        values[Feature::Credit.index()] = me.credit as f32;
        values[Feature::Battery.index()] = me.battery as f32;

        Some(Self {
            set: config.set,
            values,
        })
    }

    #[must_use]
    pub fn set(&self) -> FeatureSet {
        self.set
    }

    #[must_use]
    pub fn get(&self, feature: Feature) -> Option<f32> {
        (feature.index() < self.set.len()).then(|| self.values[feature.index()])
    }

    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values[..self.set.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f32)> + '_ {
        iter::zip(self.set.features().iter().copied(), self.values().iter().copied())
    }
}

fn nearest<I>(from: Position, targets: I) -> Option<u32>
where
    I: IntoIterator<Item = Position>,
{
    targets.into_iter().map(|p| from.manhattan(p)).min()
}
