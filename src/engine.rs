//! Generational GA engine.
//!
//! The [`Optimizer`] owns the population and drives one generation at a time:
//! parent selection, pairing, recombination, mutation, batch measurement,
//! survivor replacement, history append. Construction goes through
//! [`OptimizerBuilder`], which validates every parameter eagerly; a failed
//! build never leaves a partially initialized optimizer behind.
//!
//! Control flow is synchronous and single-threaded except for one point: a
//! batch of candidates is measured concurrently, because an evaluation may be
//! a high-latency external measurement. The batch barrier holds regardless;
//! ranking never sees a half-measured table.

use crate::models::{
    AlphaOutOfRangeError, Candidate, Crossover, Evaluator, GenerationRecord, MeasurementError,
    Mutagen, ParameterError, ParameterSpace, Population, Replacement, ReplacementError,
    SelectionError, Selector,
};
use futures::future;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::instrument;

/// Invalid construction parameters. Always fatal, raised before any
/// optimizer state exists.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("population size must be at least 1")]
    PopulationSize,
    #[error("elite count {elite_count} exceeds population size {n_pop}")]
    EliteCount { elite_count: usize, n_pop: usize },
    #[error("parameter space must have at least one dimension")]
    EmptyParameterSpace,
    #[error("initial population has {got} members, expected {expected}")]
    InitialPopulationSize { expected: usize, got: usize },
    #[error("initial genome has {got} coordinates, expected {expected}")]
    GenomeLength { expected: usize, got: usize },
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error(transparent)]
    Alpha(#[from] AlphaOutOfRangeError),
    #[error(transparent)]
    Pressure(SelectionError),
}

/// Internal consistency violation. Indicates a bug in the engine, never a
/// recoverable condition.
#[derive(Debug, thiserror::Error)]
pub enum InvariantError {
    #[error("first_generation is only valid at generation 0, currently at {generation}")]
    AlreadyStarted { generation: u32 },
    #[error("next_generation requires first_generation to have run")]
    NotStarted,
    #[error("population size drifted to {got}, expected {expected}")]
    PopulationSizeDrift { expected: usize, got: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("selection: {0}")]
    Selection(#[from] SelectionError),
    #[error("replacement: {0}")]
    Replacement(#[from] ReplacementError),
    #[error(transparent)]
    Measurement(#[from] MeasurementError),
    #[error("invariant: {0}")]
    Invariant(#[from] InvariantError),
}

/// Builder for [`Optimizer`]. Defaults mirror a conservative beamline-tuning
/// setup: population of 10, rank selection with s = 1.5, single-point
/// crossover with alpha = 0.5, uniform mutation, age replacement without
/// elitism.
pub struct OptimizerBuilder {
    space: ParameterSpace,
    evaluator: Box<dyn Evaluator>,
    n_pop: usize,
    selector: Selector,
    crossover: Crossover,
    mutagen: Mutagen,
    replacement: Replacement,
    seed: Option<u64>,
    initial_genomes: Option<Vec<Vec<f64>>>,
}

impl OptimizerBuilder {
    pub fn population_size(mut self, n_pop: usize) -> Self {
        self.n_pop = n_pop;
        self
    }

    pub fn selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    pub fn crossover(mut self, crossover: Crossover) -> Self {
        self.crossover = crossover;
        self
    }

    pub fn mutagen(mut self, mutagen: Mutagen) -> Self {
        self.mutagen = mutagen;
        self
    }

    pub fn replacement(mut self, replacement: Replacement) -> Self {
        self.replacement = replacement;
        self
    }

    /// Seeds the engine's random generator. Runs with the same seed and
    /// configuration reproduce exactly.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Supplies the initial genomes instead of drawing them uniformly.
    pub fn initial_genomes(mut self, genomes: Vec<Vec<f64>>) -> Self {
        self.initial_genomes = Some(genomes);
        self
    }

    /// Validates the whole configuration and builds the optimizer.
    #[instrument(level = "debug", skip(self), fields(n_pop = self.n_pop, dimensions = self.space.dimensions()))]
    pub fn build(self) -> Result<Optimizer, Error> {
        if self.n_pop == 0 {
            return Err(ConfigError::PopulationSize.into());
        }

        if self.space.is_empty() {
            return Err(ConfigError::EmptyParameterSpace.into());
        }

        let elite_count = self.replacement.elite_count();
        if elite_count > self.n_pop {
            return Err(ConfigError::EliteCount {
                elite_count,
                n_pop: self.n_pop,
            }
            .into());
        }

        // Strategy payloads and parameters can bypass their validating
        // constructors (bare enum variants, deserialized configurations),
        // so every range check runs again here.
        for parameter in self.space.iter() {
            parameter.validate().map_err(ConfigError::Parameter)?;
        }
        self.selector.validate().map_err(ConfigError::Pressure)?;
        self.crossover.validate().map_err(ConfigError::Alpha)?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let population = match self.initial_genomes {
            Some(genomes) => {
                if genomes.len() != self.n_pop {
                    return Err(ConfigError::InitialPopulationSize {
                        expected: self.n_pop,
                        got: genomes.len(),
                    }
                    .into());
                }

                if let Some(genome) = genomes
                    .iter()
                    .find(|genome| genome.len() != self.space.dimensions())
                {
                    return Err(ConfigError::GenomeLength {
                        expected: self.space.dimensions(),
                        got: genome.len(),
                    }
                    .into());
                }

                Population::new(genomes.into_iter().map(Candidate::new).collect())
            }
            None => Population::random(&self.space, self.n_pop, &mut rng),
        };

        Ok(Optimizer {
            space: self.space,
            evaluator: self.evaluator,
            n_pop: self.n_pop,
            selector: self.selector,
            crossover: self.crossover,
            mutagen: self.mutagen,
            replacement: self.replacement,
            rng,
            population,
            generation: 0,
            history: Vec::new(),
        })
    }
}

/// The generational GA engine. See the module documentation for the shape
/// of one generation.
pub struct Optimizer {
    space: ParameterSpace,
    evaluator: Box<dyn Evaluator>,
    n_pop: usize,
    selector: Selector,
    crossover: Crossover,
    mutagen: Mutagen,
    replacement: Replacement,
    rng: StdRng,
    population: Population,
    generation: u32,
    history: Vec<GenerationRecord>,
}

/// Forms `ceil(k / 2)` breeding pairs by drawing parent indices uniformly
/// with replacement from the parent list. Self-pairing is permitted.
fn make_pairs<R: Rng>(parents: &[usize], rng: &mut R) -> Vec<(usize, usize)> {
    let n_pairs = parents.len().div_ceil(2);

    (0..n_pairs)
        .map(|_| {
            let first = parents[rng.random_range(0..parents.len())];
            let second = parents[rng.random_range(0..parents.len())];
            (first, second)
        })
        .collect()
}

impl Optimizer {
    pub fn builder(space: ParameterSpace, evaluator: Box<dyn Evaluator>) -> OptimizerBuilder {
        OptimizerBuilder {
            space,
            evaluator,
            n_pop: 10,
            selector: Selector::ProbabilityByRank { pressure: 1.5 },
            crossover: Crossover::SinglePoint { alpha: 0.5 },
            mutagen: Mutagen::Uniform,
            replacement: Replacement::Age { elite_count: 0 },
            seed: None,
            initial_genomes: None,
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Read-only view of the per-generation records appended so far.
    pub fn history(&self) -> &[GenerationRecord] {
        &self.history
    }

    /// Measures every candidate of a batch through the evaluator and writes
    /// fitness back in order. Evaluations run concurrently; the whole batch
    /// completes (or fails) before anything downstream sees it. Re-measuring
    /// overwrites fitness, it never accumulates.
    #[instrument(level = "debug", skip(self, batch), fields(batch_size = batch.len()))]
    async fn measure(&self, batch: &mut [Candidate]) -> Result<(), Error> {
        let measurements = future::try_join_all(
            batch
                .iter()
                .map(|candidate| self.evaluator.evaluate(&candidate.genome)),
        )
        .await?;

        for (candidate, fitness) in batch.iter_mut().zip(measurements) {
            candidate.fitness = fitness;
        }

        Ok(())
    }

    /// Breeds children from the current population: selection, pairing,
    /// recombination, mutation. Pairing rounds the child count up to an even
    /// number, so it may overshoot `k` by one; survivor replacement truncates
    /// positionally.
    fn breed(&mut self, k: usize) -> Result<Vec<Candidate>, Error> {
        self.population.rank();

        let parents = self
            .selector
            .select_parents(&mut self.population, k, &mut self.rng)?;

        let pairs = make_pairs(&parents, &mut self.rng);

        let mut children = Vec::with_capacity(pairs.len() * 2);
        for (first, second) in pairs {
            let (mut child_a, mut child_b) = self.crossover.apply(
                &mut self.rng,
                &self.population.members()[first],
                &self.population.members()[second],
            );

            self.mutagen.mutate(&mut self.rng, &mut child_a, &self.space);
            self.mutagen.mutate(&mut self.rng, &mut child_b, &self.space);

            children.push(child_a);
            children.push(child_b);
        }

        Ok(children)
    }

    fn append_record(&mut self) -> Result<&GenerationRecord, Error> {
        if self.population.len() != self.n_pop {
            return Err(InvariantError::PopulationSizeDrift {
                expected: self.n_pop,
                got: self.population.len(),
            }
            .into());
        }

        let record = GenerationRecord::from_population(self.generation, &self.population);
        tracing::info!(
            generation = record.generation,
            mean_fitness = record.mean_fitness,
            best_fitness = record.best_fitness,
            "generation complete"
        );

        self.history.push(record);
        Ok(self.history.last().expect("record was just appended"))
    }

    /// Measures the initial population and appends the first history record.
    /// Only valid once, at generation 0.
    #[instrument(level = "info", skip(self), fields(n_pop = self.n_pop))]
    pub async fn first_generation(&mut self) -> Result<&GenerationRecord, Error> {
        if self.generation != 0 {
            return Err(InvariantError::AlreadyStarted {
                generation: self.generation,
            }
            .into());
        }

        let mut population = std::mem::replace(&mut self.population, Population::new(Vec::new()));
        let measured = self.measure(&mut population.members).await;
        self.population = population;
        measured?;

        self.generation = 1;
        self.append_record()
    }

    /// Runs one full generation transition: parent selection, recombination,
    /// mutation, measurement of the children, survivor replacement, history
    /// append.
    #[instrument(level = "info", skip(self), fields(generation = self.generation, n_pop = self.n_pop))]
    pub async fn next_generation(&mut self) -> Result<&GenerationRecord, Error> {
        if self.generation == 0 {
            return Err(InvariantError::NotStarted.into());
        }

        let k = self.n_pop - self.replacement.elite_count();
        let mut children = self.breed(k)?;

        self.measure(&mut children).await?;

        self.replacement
            .apply(&mut self.population, children, self.n_pop)?;

        self.generation += 1;
        self.append_record()
    }
}
