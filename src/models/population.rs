use crate::models::{Candidate, ParameterSpace};
use rand::Rng;
use tracing::instrument;

/// The ordered table of candidates the engine evolves. Replaced wholesale
/// at every generation boundary; never mutated by callers.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Population {
    pub(crate) members: Vec<Candidate>,
}

impl Population {
    pub(crate) fn new(members: Vec<Candidate>) -> Self {
        Self { members }
    }

    /// Draws `n_pop` candidates uniformly at random within the space.
    /// Size and bounds validation happen at optimizer construction.
    #[instrument(level = "debug", skip(space, rng), fields(n_pop = n_pop, dimensions = space.dimensions()))]
    pub(crate) fn random<R: Rng>(space: &ParameterSpace, n_pop: usize, rng: &mut R) -> Self {
        let members = (0..n_pop)
            .map(|_| Candidate::new(space.random_genome(rng)))
            .collect();

        Self { members }
    }

    pub fn members(&self) -> &[Candidate] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sorts candidates by descending fitness and assigns rank 1..N, rank 1
    /// being the fittest. The sort is stable: candidates with equal fitness
    /// keep their current relative order, so re-ranking without a fitness
    /// change is a no-op.
    #[instrument(level = "debug", skip(self), fields(size = self.members.len()))]
    pub(crate) fn rank(&mut self) {
        self.members
            .sort_by(|lhs, rhs| rhs.fitness.total_cmp(&lhs.fitness));

        for (index, member) in self.members.iter_mut().enumerate() {
            member.rank = index + 1;
        }
    }

    pub(crate) fn mean_fitness(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }

        let total: f64 = self.members.iter().map(|member| member.fitness).sum();
        total / self.members.len() as f64
    }

    /// The fittest member; ties break on the first occurrence in table order.
    pub(crate) fn best(&self) -> Option<&Candidate> {
        self.members.iter().reduce(|best, member| {
            if member.fitness > best.fitness {
                member
            } else {
                best
            }
        })
    }
}
