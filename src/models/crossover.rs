use crate::models::Candidate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// The two directions of the arithmetic blend at one coordinate.
fn blend(lhs: f64, rhs: f64, alpha: f64) -> (f64, f64) {
    (
        (1.0 - alpha) * lhs + alpha * rhs,
        (1.0 - alpha) * rhs + alpha * lhs,
    )
}

/// Single-allele crossover: children equal the parents everywhere except
/// coordinate `point`, which is blended in both directions.
#[instrument(level = "debug", skip(lhs, rhs), fields(dimensions = lhs.len(), point = point, alpha = alpha))]
fn crossover_single_point(
    lhs: &[f64],
    rhs: &[f64],
    point: usize,
    alpha: f64,
) -> (Vec<f64>, Vec<f64>) {
    let mut first = lhs.to_vec();
    let mut second = rhs.to_vec();

    (first[point], second[point]) = blend(lhs[point], rhs[point], alpha);

    (first, second)
}

/// Simple arithmetic crossover: coordinates before `point` copied from the
/// respective parent, the tail blended element-wise in both directions.
#[instrument(level = "debug", skip(lhs, rhs), fields(dimensions = lhs.len(), point = point, alpha = alpha))]
fn crossover_simple(lhs: &[f64], rhs: &[f64], point: usize, alpha: f64) -> (Vec<f64>, Vec<f64>) {
    let mut first = lhs.to_vec();
    let mut second = rhs.to_vec();

    for index in point..lhs.len() {
        (first[index], second[index]) = blend(lhs[index], rhs[index], alpha);
    }

    (first, second)
}

/// Whole arithmetic crossover: every coordinate blended in both directions.
#[instrument(level = "debug", skip(lhs, rhs), fields(dimensions = lhs.len(), alpha = alpha))]
fn crossover_whole(lhs: &[f64], rhs: &[f64], alpha: f64) -> (Vec<f64>, Vec<f64>) {
    let mut first = Vec::with_capacity(lhs.len());
    let mut second = Vec::with_capacity(rhs.len());

    for (&left, &right) in lhs.iter().zip(rhs.iter()) {
        let (blended_left, blended_right) = blend(left, right, alpha);
        first.push(blended_left);
        second.push(blended_right);
    }

    (first, second)
}

/// Recombination strategy producing two children from a pair of parents.
///
/// All three modes are arithmetic: offspring coordinates are interpolations
/// `(1 - alpha) * p1 + alpha * p2` (and the mirrored blend for the second
/// child). They differ only in which coordinates the blend touches: a single
/// allele, the tail from a random cut point, or the whole genome. The cut
/// point is drawn once per pair and shared by both children.
///
/// Children are not bounds-clamped here; mutation owns domain enforcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub enum Crossover {
    /// Blends exactly one randomly chosen coordinate.
    SinglePoint { alpha: f64 },
    /// Copies `[0, k)` and blends `[k, end)` element-wise.
    Simple { alpha: f64 },
    /// Blends every coordinate; no cut point involved.
    WholeArithmetic { alpha: f64 },
}

#[derive(Debug, thiserror::Error)]
#[error("blend coefficient alpha must be between 0.0 and 1.0, got {0}")]
pub struct AlphaOutOfRangeError(f64);

fn validate_alpha(alpha: f64) -> Result<f64, AlphaOutOfRangeError> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(AlphaOutOfRangeError(alpha));
    }

    Ok(alpha)
}

impl Crossover {
    /// Creates a single-point crossover with the given blend coefficient.
    pub fn single_point(alpha: f64) -> Result<Self, AlphaOutOfRangeError> {
        Ok(Self::SinglePoint {
            alpha: validate_alpha(alpha)?,
        })
    }

    /// Creates a simple arithmetic crossover with the given blend coefficient.
    pub fn simple(alpha: f64) -> Result<Self, AlphaOutOfRangeError> {
        Ok(Self::Simple {
            alpha: validate_alpha(alpha)?,
        })
    }

    /// Creates a whole arithmetic crossover with the given blend coefficient.
    pub fn whole_arithmetic(alpha: f64) -> Result<Self, AlphaOutOfRangeError> {
        Ok(Self::WholeArithmetic {
            alpha: validate_alpha(alpha)?,
        })
    }

    /// Re-checks the alpha range. Crossovers can be built as bare variants
    /// or arrive through deserialization, so the optimizer builder runs this
    /// before accepting the configuration.
    pub(crate) fn validate(&self) -> Result<(), AlphaOutOfRangeError> {
        let (Self::SinglePoint { alpha } | Self::Simple { alpha } | Self::WholeArithmetic { alpha }) =
            self;
        validate_alpha(*alpha)?;

        Ok(())
    }

    /// Recombines two parents into two fresh, unmeasured candidates.
    #[instrument(level = "debug", skip(self, rng, lhs, rhs), fields(crossover = ?self, dimensions = lhs.genome().len()))]
    pub(crate) fn apply<R: Rng>(
        &self,
        rng: &mut R,
        lhs: &Candidate,
        rhs: &Candidate,
    ) -> (Candidate, Candidate) {
        let (first, second) = match self {
            Self::SinglePoint { alpha } => {
                let point = rng.random_range(0..lhs.genome().len());
                crossover_single_point(lhs.genome(), rhs.genome(), point, *alpha)
            }
            Self::Simple { alpha } => {
                let point = rng.random_range(0..lhs.genome().len());
                crossover_simple(lhs.genome(), rhs.genome(), point, *alpha)
            }
            Self::WholeArithmetic { alpha } => {
                crossover_whole(lhs.genome(), rhs.genome(), *alpha)
            }
        };

        (Candidate::new(first), Candidate::new(second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn it_blends_a_single_allele() {
        let lhs = [1.0, 2.0, 3.0, 4.0];
        let rhs = [5.0, 6.0, 7.0, 8.0];

        let (first, second) = crossover_single_point(&lhs, &rhs, 2, 0.5);

        assert_eq!(first, vec![1.0, 2.0, 5.0, 4.0]);
        assert_eq!(second, vec![5.0, 6.0, 5.0, 8.0]);
    }

    #[test]
    fn it_blends_the_tail_from_the_cut_point() {
        let lhs = [1.0, 2.0, 3.0, 4.0];
        let rhs = [5.0, 6.0, 7.0, 8.0];

        let (first, second) = crossover_simple(&lhs, &rhs, 2, 0.25);

        // Head copied from the respective parent.
        assert_eq!(&first[..2], &[1.0, 2.0]);
        assert_eq!(&second[..2], &[5.0, 6.0]);

        // Tail blended both ways: 0.75 * own + 0.25 * other.
        assert_eq!(&first[2..], &[4.0, 5.0]);
        assert_eq!(&second[2..], &[6.0, 7.0]);
    }

    #[test]
    fn it_blends_every_coordinate_in_whole_mode() {
        let lhs = [0.0, 10.0];
        let rhs = [10.0, 0.0];

        let (first, second) = crossover_whole(&lhs, &rhs, 0.5);

        // alpha = 0.5 collapses both children onto the midpoint.
        assert_eq!(first, vec![5.0, 5.0]);
        assert_eq!(second, vec![5.0, 5.0]);
    }

    #[test]
    fn it_is_symmetric_under_whole_arithmetic() {
        let lhs = [1.0, 4.0, -2.0];
        let rhs = [3.0, 0.0, 6.0];

        let (first_ab, second_ab) = crossover_whole(&lhs, &rhs, 0.25);
        let (first_ba, second_ba) = crossover_whole(&rhs, &lhs, 0.25);

        // Swapping the parents swaps the children.
        assert_eq!(first_ab, second_ba);
        assert_eq!(second_ab, first_ba);
    }

    #[test]
    fn it_copies_parents_when_alpha_is_zero() {
        let lhs = [1.0, 2.0];
        let rhs = [3.0, 4.0];

        let (first, second) = crossover_whole(&lhs, &rhs, 0.0);

        assert_eq!(first, vec![1.0, 2.0]);
        assert_eq!(second, vec![3.0, 4.0]);
    }

    #[test]
    fn it_validates_alpha() {
        assert!(Crossover::single_point(-0.1).is_err());
        assert!(Crossover::simple(1.5).is_err());
        assert!(Crossover::whole_arithmetic(f64::NAN).is_err());

        assert!(Crossover::single_point(0.0).is_ok());
        assert!(Crossover::simple(0.75).is_ok());
        assert!(Crossover::whole_arithmetic(1.0).is_ok());
    }

    #[test]
    fn it_revalidates_bare_variant_payloads() {
        assert!(Crossover::SinglePoint { alpha: -0.1 }.validate().is_err());
        assert!(Crossover::Simple { alpha: 1.5 }.validate().is_err());
        assert!(Crossover::WholeArithmetic { alpha: 3.0 }.validate().is_err());
        assert!(Crossover::simple(0.75).unwrap().validate().is_ok());
    }

    #[test]
    fn it_produces_unmeasured_children() {
        let mut rng = StdRng::seed_from_u64(42);
        let lhs = Candidate::new(vec![1.0, 2.0, 3.0]);
        let rhs = Candidate::new(vec![4.0, 5.0, 6.0]);

        let crossover = Crossover::simple(0.75).unwrap();
        let (first, second) = crossover.apply(&mut rng, &lhs, &rhs);

        assert_eq!(first.genome().len(), 3);
        assert_eq!(second.genome().len(), 3);
        assert_eq!(first.fitness(), 0.0);
        assert_eq!(first.rank(), 0);
        assert_eq!(first.probability(), 0.0);
    }
}
