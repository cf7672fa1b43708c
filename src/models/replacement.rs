use crate::models::{Candidate, Population};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Survivor selection strategy deciding which candidates carry into the
/// next generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub enum Replacement {
    /// Age-based replacement: the top `elite_count` ranked members of the
    /// current population survive, the rest of the next generation is
    /// filled with children in their insertion order. Children are never
    /// re-ranked before the positional truncation.
    Age { elite_count: usize },
    /// Genitor (steady-state) replacement: current population and children
    /// are merged, re-ranked, and truncated to the fittest `n_pop`.
    Genitor,
}

#[derive(Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq))]
pub enum ReplacementError {
    /// Fewer children than the slots age-based replacement has to fill.
    /// Indicates a bug in the breeding step, never a caller error.
    #[error("age-based replacement needs {required} children, got {available}")]
    InsufficientChildren { required: usize, available: usize },
}

impl Replacement {
    /// Creates an age-based replacement with the given elite count.
    /// `elite_count <= n_pop` is enforced at optimizer construction.
    pub fn age(elite_count: usize) -> Self {
        Self::Age { elite_count }
    }

    /// Creates a genitor (steady-state) replacement.
    pub fn genitor() -> Self {
        Self::Genitor
    }

    /// Number of top-ranked members guaranteed to survive unchanged.
    pub(crate) fn elite_count(&self) -> usize {
        match self {
            Self::Age { elite_count } => *elite_count,
            Self::Genitor => 0,
        }
    }

    /// Replaces the population in place with the next generation of exactly
    /// `n_pop` members. On failure the population is left untouched, so the
    /// engine stays consistent after the error propagates.
    #[instrument(level = "debug", skip(self, population, children), fields(replacement = ?self, n_pop = n_pop, children = children.len()))]
    pub(crate) fn apply(
        &self,
        population: &mut Population,
        children: Vec<Candidate>,
        n_pop: usize,
    ) -> Result<(), ReplacementError> {
        match self {
            Self::Age { elite_count } => {
                let required = n_pop - elite_count;
                if children.len() < required {
                    return Err(ReplacementError::InsufficientChildren {
                        required,
                        available: children.len(),
                    });
                }

                population.rank();
                population.members.truncate(*elite_count);
                population.members.extend(children.into_iter().take(required));

                Ok(())
            }
            Self::Genitor => {
                population.members.extend(children);
                population.rank();
                population.members.truncate(n_pop);

                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate_with_fitness(genome: Vec<f64>, fitness: f64) -> Candidate {
        let mut candidate = Candidate::new(genome);
        candidate.fitness = fitness;
        candidate
    }

    fn population_with_fitnesses(fitnesses: &[f64]) -> Population {
        Population::new(
            fitnesses
                .iter()
                .map(|&fitness| candidate_with_fitness(vec![fitness], fitness))
                .collect(),
        )
    }

    #[test]
    fn it_replaces_everyone_without_elites() {
        // Population [10, 8, 6, 4], children [1, 2, 3, 9]: with no elites
        // the next generation is the four children in insertion order,
        // even though three of them are worse than every current member.
        let mut population = population_with_fitnesses(&[10.0, 8.0, 6.0, 4.0]);
        let children: Vec<Candidate> = [1.0, 2.0, 3.0, 9.0]
            .iter()
            .map(|&fitness| candidate_with_fitness(vec![fitness], fitness))
            .collect();
        let child_ids: Vec<_> = children.iter().map(|child| child.id).collect();

        Replacement::age(0).apply(&mut population, children, 4).unwrap();

        assert_eq!(population.len(), 4);
        let fitnesses: Vec<f64> = population.members().iter().map(|m| m.fitness()).collect();
        assert_eq!(fitnesses, vec![1.0, 2.0, 3.0, 9.0]);

        let ids: Vec<_> = population.members().iter().map(|m| m.id).collect();
        assert_eq!(ids, child_ids);
    }

    #[test]
    fn it_keeps_elites_ahead_of_children() {
        let mut population = population_with_fitnesses(&[4.0, 10.0, 6.0]);
        let children: Vec<Candidate> = [2.0, 1.0, 7.0]
            .iter()
            .map(|&fitness| candidate_with_fitness(vec![fitness], fitness))
            .collect();

        Replacement::age(1).apply(&mut population, children, 3).unwrap();

        // The single elite is the fittest current member; the remaining two
        // slots take the first two children positionally, not the best ones.
        let fitnesses: Vec<f64> = population.members().iter().map(|m| m.fitness()).collect();
        assert_eq!(fitnesses, vec![10.0, 2.0, 1.0]);
    }

    #[test]
    fn it_fails_on_insufficient_children() {
        let mut population = population_with_fitnesses(&[4.0, 10.0, 6.0]);
        let children = vec![candidate_with_fitness(vec![1.0], 1.0)];

        let result = Replacement::age(0).apply(&mut population, children, 3);
        assert_eq!(
            result,
            Err(ReplacementError::InsufficientChildren {
                required: 3,
                available: 1
            })
        );
    }

    #[test]
    fn it_leaves_the_population_untouched_on_failure() {
        let mut population = population_with_fitnesses(&[4.0, 10.0, 6.0]);
        let before = population.clone();
        let children = vec![candidate_with_fitness(vec![1.0], 1.0)];

        let result = Replacement::age(0).apply(&mut population, children, 3);

        // The precondition fails before any mutation, so the caller still
        // holds a consistent population after the error.
        assert!(result.is_err());
        assert_eq!(population, before);
    }

    #[test]
    fn it_merges_and_keeps_the_fittest_under_genitor() {
        // Population [5, 3, 1], children [10, 2, 0.5]: top three of the
        // merged table survive.
        let mut population = population_with_fitnesses(&[5.0, 3.0, 1.0]);
        let children: Vec<Candidate> = [10.0, 2.0, 0.5]
            .iter()
            .map(|&fitness| candidate_with_fitness(vec![fitness], fitness))
            .collect();

        Replacement::genitor().apply(&mut population, children, 3).unwrap();

        assert_eq!(population.len(), 3);
        let fitnesses: Vec<f64> = population.members().iter().map(|m| m.fitness()).collect();
        assert_eq!(fitnesses, vec![10.0, 5.0, 3.0]);
    }

    #[test]
    fn it_reports_elite_counts() {
        assert_eq!(Replacement::age(3).elite_count(), 3);
        assert_eq!(Replacement::genitor().elite_count(), 0);
    }
}
