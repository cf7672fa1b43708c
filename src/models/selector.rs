//! Parent selection strategies.
//!
//! A selector turns a ranked population into a selection-probability column
//! and then draws parent indices from it with stochastic universal sampling
//! (SUS). Two probability models are supported:
//!
//! - **Rank-proportionate**: probability depends only on rank, tuned by the
//!   selective-pressure parameter `s` in `(1.0, 2.0]`. `s` close to 1 is
//!   near-uniform, `s = 2.0` biases maximally toward the best candidates.
//!   Robust to fitness scaling and outliers.
//! - **Fitness-proportionate**: probability is `fitness / total_fitness`.
//!   Requires every fitness to be non-negative with a positive sum; sign
//!   normalization is the objective function's concern, not the selector's.
//!
//! SUS draws all `k` parents in one sweep with evenly spaced pointers, so the
//! number of times a candidate is picked has minimal variance around its
//! expected value `k * probability`.

use crate::models::Population;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Tolerance for verifying that a probability column sums to one.
const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Assigns rank-proportionate selection probabilities to a ranked population.
///
/// For rank `r` (1 = best) out of `n`, with pressure `s`:
/// `p(r) = (2 - s)/n + 2(n - r)(s - 1) / (n(n - 1))`.
#[instrument(level = "debug", skip(population), fields(pressure = pressure, size = population.len()))]
fn probability_by_rank(population: &mut Population, pressure: f64) -> Result<(), SelectionError> {
    // The formula divides by n(n - 1); a single-member table trivially
    // selects that member with probability one.
    if population.len() == 1 {
        population.members[0].probability = 1.0;
        return Ok(());
    }

    let n = population.len() as f64;

    for member in population.members.iter_mut() {
        let rank_from_worst = n - member.rank as f64;
        member.probability =
            (2.0 - pressure) / n + 2.0 * rank_from_worst * (pressure - 1.0) / (n * (n - 1.0));
    }

    verify_probability_mass(population)
}

/// Assigns fitness-proportionate selection probabilities.
#[instrument(level = "debug", skip(population), fields(size = population.len()))]
fn probability_by_fitness(population: &mut Population) -> Result<(), SelectionError> {
    if let Some(member) = population
        .members
        .iter()
        .find(|member| member.fitness < 0.0)
    {
        return Err(SelectionError::NegativeFitness {
            fitness: member.fitness,
        });
    }

    let total: f64 = population.members.iter().map(|member| member.fitness).sum();

    if total <= 0.0 {
        return Err(SelectionError::NonPositiveFitnessSum { total });
    }

    for member in population.members.iter_mut() {
        member.probability = member.fitness / total;
    }

    verify_probability_mass(population)
}

fn verify_probability_mass(population: &Population) -> Result<(), SelectionError> {
    let total: f64 = population
        .members
        .iter()
        .map(|member| member.probability)
        .sum();

    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(SelectionError::MalformedDistribution { total });
    }

    Ok(())
}

/// Stochastic universal sampling over the population's probability column.
///
/// One random offset in `[0, 1/k)` places `k` evenly spaced pointers over the
/// cumulative distribution; a single forward sweep maps each pointer to the
/// first index whose cumulative probability reaches it. Duplicates are
/// expected for candidates whose probability exceeds `1/k`. The sweep index
/// never runs past the end of the table, so floating-point rounding in the
/// last cumulative value cannot panic.
#[instrument(level = "debug", skip(population, rng), fields(k = k, size = population.len()))]
fn sample_universal<R: Rng>(
    population: &Population,
    k: usize,
    rng: &mut R,
) -> Result<Vec<usize>, SelectionError> {
    let mut cumulative = Vec::with_capacity(population.len());
    let mut total = 0.0;
    for member in population.members.iter() {
        total += member.probability;
        cumulative.push(total);
    }

    if total < 1.0 - PROBABILITY_TOLERANCE {
        return Err(SelectionError::MalformedDistribution { total });
    }

    if k == 0 {
        return Ok(Vec::new());
    }

    let spacing = 1.0 / k as f64;
    let offset = rng.random_range(0.0..spacing);

    let mut selected = Vec::with_capacity(k);
    let mut index = 0;
    for pointer in 0..k {
        let position = offset + pointer as f64 * spacing;
        while index < cumulative.len() - 1 && cumulative[index] < position {
            index += 1;
        }
        selected.push(index);
    }

    Ok(selected)
}

/// Parent selection strategy, resolved once at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub enum Selector {
    /// Rank-proportionate selection with pressure `s` in `(1.0, 2.0]`.
    ProbabilityByRank { pressure: f64 },
    /// Fitness-proportionate (roulette) selection. Requires non-negative
    /// fitness values with a positive sum.
    ProbabilityByFitness,
}

#[derive(Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq))]
pub enum SelectionError {
    /// Selective pressure outside `(1.0, 2.0]`. Raised at construction.
    #[error("selective pressure must be in (1.0, 2.0], got {0}")]
    PressureOutOfRange(f64),

    /// Fitness-proportionate selection saw a negative fitness value.
    #[error("fitness-proportionate selection requires non-negative fitness, got {fitness}")]
    NegativeFitness { fitness: f64 },

    /// Fitness-proportionate selection over a zero or negative fitness mass.
    #[error("fitness-proportionate selection requires a positive fitness sum, got {total}")]
    NonPositiveFitnessSum { total: f64 },

    /// The probability column does not sum to one. Indicates a bug in the
    /// probability assignment, never a recoverable condition.
    #[error("selection probabilities sum to {total}, expected 1.0")]
    MalformedDistribution { total: f64 },

    /// Selection was attempted on a population that was never ranked.
    #[error("population must be ranked before selection")]
    UnrankedPopulation,
}

fn validate_pressure(pressure: f64) -> Result<(), SelectionError> {
    if !(pressure > 1.0 && pressure <= 2.0) {
        return Err(SelectionError::PressureOutOfRange(pressure));
    }

    Ok(())
}

impl Selector {
    /// Creates a rank-proportionate selector with the given pressure.
    pub fn by_rank(pressure: f64) -> Result<Self, SelectionError> {
        validate_pressure(pressure)?;

        Ok(Self::ProbabilityByRank { pressure })
    }

    /// Re-checks the pressure range. Selectors can be built as bare variants
    /// or arrive through deserialization, so the optimizer builder runs this
    /// before accepting the configuration.
    pub(crate) fn validate(&self) -> Result<(), SelectionError> {
        match self {
            Self::ProbabilityByRank { pressure } => validate_pressure(*pressure),
            Self::ProbabilityByFitness => Ok(()),
        }
    }

    /// Creates a fitness-proportionate (roulette) selector.
    pub fn by_fitness() -> Self {
        Self::ProbabilityByFitness
    }

    /// Writes the selection-probability column of a ranked population.
    pub(crate) fn assign_probabilities(
        &self,
        population: &mut Population,
    ) -> Result<(), SelectionError> {
        if population.members.iter().any(|member| member.rank == 0) {
            return Err(SelectionError::UnrankedPopulation);
        }

        match self {
            Self::ProbabilityByRank { pressure } => probability_by_rank(population, *pressure),
            Self::ProbabilityByFitness => probability_by_fitness(population),
        }
    }

    /// Selects exactly `k` parent indices from a ranked population.
    #[instrument(level = "debug", skip(self, population, rng), fields(method = ?self, k = k, size = population.len()))]
    pub(crate) fn select_parents<R: Rng>(
        &self,
        population: &mut Population,
        k: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>, SelectionError> {
        self.assign_probabilities(population)?;
        sample_universal(population, k, rng)
    }
}
