use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One point in parameter space. Fitness holds the 0.0 sentinel until a
/// measurement writes it; rank 0 means unranked, rank 1 is the best.
#[derive(Debug, Clone)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Candidate {
    pub(crate) id: Uuid,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) genome: Vec<f64>,
    pub(crate) fitness: f64,
    pub(crate) rank: usize,
    pub(crate) probability: f64,
}

impl Candidate {
    pub(crate) fn new(genome: Vec<f64>) -> Self {
        Self {
            id: Uuid::now_v7(),
            generated_at: Utc::now(),
            genome,
            fitness: 0.0,
            rank: 0,
            probability: 0.0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn genome(&self) -> &[f64] {
        &self.genome
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_starts_unmeasured_and_unranked() {
        let candidate = Candidate::new(vec![1.0, 2.0]);

        assert_eq!(candidate.genome(), &[1.0, 2.0]);
        assert_eq!(candidate.fitness(), 0.0);
        assert_eq!(candidate.rank(), 0);
        assert_eq!(candidate.probability(), 0.0);
    }
}
