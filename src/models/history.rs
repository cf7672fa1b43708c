use crate::models::Population;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Per-generation summary appended to the run history. Records are the sole
/// observable artifact of a run; they are never mutated after the append.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct GenerationRecord {
    pub generation: u32,
    pub mean_fitness: f64,
    pub best_fitness: f64,
    pub best_genome: Vec<f64>,
    pub recorded_at: DateTime<Utc>,
}

impl GenerationRecord {
    /// Summarizes a completed generation's population. The best candidate
    /// tie-breaks on first occurrence in table order.
    pub(crate) fn from_population(generation: u32, population: &Population) -> Self {
        let best = population.best();

        Self {
            generation,
            mean_fitness: population.mean_fitness(),
            best_fitness: best.map(|candidate| candidate.fitness()).unwrap_or(0.0),
            best_genome: best
                .map(|candidate| candidate.genome().to_vec())
                .unwrap_or_default(),
            recorded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candidate;

    #[test]
    fn it_summarizes_a_population() {
        let mut first = Candidate::new(vec![1.0, 2.0]);
        first.fitness = 2.0;
        let mut second = Candidate::new(vec![3.0, 4.0]);
        second.fitness = 6.0;

        let population = Population::new(vec![first, second]);
        let record = GenerationRecord::from_population(3, &population);

        assert_eq!(record.generation, 3);
        assert_eq!(record.mean_fitness, 4.0);
        assert_eq!(record.best_fitness, 6.0);
        assert_eq!(record.best_genome, vec![3.0, 4.0]);
    }
}
