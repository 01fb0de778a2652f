//! Run configuration (spec §6's "Environment parameters"). Grounded on the
//! teacher's `radiate-engines/src/builder.rs` `EngineParams`: a flat struct
//! of validated knobs the fluent builder assembles, rather than a config
//! object every stage re-derives from scratch.

use vita_core::symbol::SymbolSet;
use vita_error::{VitaError, VitaResult};

/// `elitism` (spec §6): `Auto` keeps the current best only when no strategy
/// already guarantees it (e.g. `ParetoReplacement` does, `TournamentReplacement`
/// does not).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Elitism {
    Yes,
    No,
    Auto,
}

/// DE's mutation weight interval `[lo, hi]` (spec §6's `de.weight`); a fresh
/// weight is drawn uniformly from this range for every `de_crossover` call.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightRange {
    pub lo: f64,
    pub hi: f64,
}

impl WeightRange {
    pub fn new(lo: f64, hi: f64) -> Self {
        WeightRange { lo, hi }
    }
}

/// Every recognized environment parameter (spec §6), with the defaults the
/// builder seeds before the caller overrides any of them.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Environment {
    pub individuals: usize,
    pub layers: usize,
    pub generations: u64,
    pub max_stuck_time: u64,
    pub tournament_size: usize,
    pub mate_zone: Option<usize>,
    pub p_cross: f32,
    pub p_mutation: f32,
    pub brood_recombination: usize,
    pub elitism: Elitism,
    pub cache_size: u32,
    pub alps_age_gap: u32,
    /// Probability a parent draw crosses into a younger layer instead of
    /// staying within its own (spec §4.9's ALPS selection strategy). Not
    /// named in spec §6's parameter table, which lists only `alps_age_gap`;
    /// added here because `AlpsSelector` needs it and a hard-coded constant
    /// would make it silently untunable.
    pub alps_alpha: f64,
    pub de_weight: WeightRange,
    pub code_length: usize,
    pub validation_percentage: f64,
    pub dss_period: u32,
    pub threshold_fitness: Option<Vec<f64>>,
    pub threshold_accuracy: Option<f64>,
    pub team_individuals: usize,
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            individuals: 100,
            layers: 1,
            generations: 1_000,
            max_stuck_time: 100,
            tournament_size: 5,
            mate_zone: None,
            p_cross: 0.9,
            p_mutation: 0.05,
            brood_recombination: 0,
            elitism: Elitism::Auto,
            cache_size: 16,
            alps_age_gap: 20,
            alps_alpha: 0.2,
            de_weight: WeightRange::new(0.5, 1.0),
            code_length: 32,
            validation_percentage: 0.0,
            dss_period: 0,
            threshold_fitness: None,
            threshold_accuracy: None,
            team_individuals: 1,
        }
    }
}

impl Environment {
    /// Configuration-error checks (spec §7's "detected at `Problem::validate`;
    /// surfaced to caller, search does not start"). `symbols` is optional
    /// because GA/DE environments have no symbol set to check.
    pub fn validate(&self, symbols: Option<&SymbolSet>) -> VitaResult<()> {
        if self.individuals == 0 {
            return Err(VitaError::InvalidConfig { message: "individuals must be > 0".into() });
        }
        if self.layers == 0 {
            return Err(VitaError::InvalidConfig { message: "layers must be >= 1".into() });
        }
        if self.tournament_size == 0 {
            return Err(VitaError::InvalidConfig { message: "tournament_size must be >= 1".into() });
        }
        if !(0.0..=1.0).contains(&self.p_cross) {
            return Err(VitaError::InvalidConfig { message: "p_cross must be within [0, 1]".into() });
        }
        if !(0.0..=1.0).contains(&self.p_mutation) {
            return Err(VitaError::InvalidConfig { message: "p_mutation must be within [0, 1]".into() });
        }
        if !(0.0..=1.0).contains(&self.validation_percentage) {
            return Err(VitaError::InvalidConfig { message: "validation_percentage must be within [0, 1]".into() });
        }
        if !(0.0..=1.0).contains(&self.alps_alpha) {
            return Err(VitaError::InvalidConfig { message: "alps_alpha must be within [0, 1]".into() });
        }
        if self.de_weight.lo > self.de_weight.hi {
            return Err(VitaError::InvalidConfig { message: "de.weight lower bound exceeds upper bound".into() });
        }
        if self.code_length == 0 {
            return Err(VitaError::InvalidConfig { message: "code_length must be > 0".into() });
        }
        if self.team_individuals == 0 {
            return Err(VitaError::InvalidConfig { message: "team.individuals must be >= 1".into() });
        }
        if let Some(symbols) = symbols {
            if symbols.is_empty() {
                return Err(VitaError::InvalidConfig { message: "symbol set is empty".into() });
            }
            if !symbols.enough_terminals() {
                return Err(VitaError::InvalidConfig {
                    message: "symbol set has a function argument category with no terminal".into(),
                });
            }
        }
        Ok(())
    }

    /// `layers == 1` disables age layering (spec §8's boundary behavior:
    /// "ALPS becomes steady-state").
    pub fn alps_enabled(&self) -> bool {
        self.layers > 1
    }

    pub fn teams_enabled(&self) -> bool {
        self.team_individuals > 1
    }
}
