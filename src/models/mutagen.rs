use crate::models::{Candidate, ParameterSpace};
use rand::Rng;
use rand_distr::{Cauchy, Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Mutation strategy, applied to every child on every dimension once per
/// generation. There is no per-gene mutation probability; the mode alone
/// decides the draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub enum Mutagen {
    /// Full reset: replaces the value with a fresh uniform draw over the
    /// parameter's bounds.
    Uniform,
    /// Gaussian perturbation around the current value with the parameter's
    /// sigma, clamped to the bounds so mutated candidates stay inside the
    /// domain the evaluator is contracted for.
    Gaussian,
    /// Heavy-tailed Cauchy perturbation with scale sigma, clamped likewise.
    /// Occasional large steps help escape local optima.
    Cauchy,
}

impl Mutagen {
    /// Mutates a child's genome in place, dimension by dimension.
    #[instrument(level = "debug", skip(self, rng, child, space), fields(mutagen = ?self, dimensions = space.dimensions()))]
    pub(crate) fn mutate<R: Rng>(
        &self,
        rng: &mut R,
        child: &mut Candidate,
        space: &ParameterSpace,
    ) {
        for (gene, parameter) in child.genome.iter_mut().zip(space.iter()) {
            match self {
                Mutagen::Uniform => {
                    *gene = parameter.random(rng);
                }
                Mutagen::Gaussian => {
                    let step: f64 = rng.sample::<f64, _>(StandardNormal) * parameter.sigma;
                    *gene = (*gene + step).clamp(parameter.lower, parameter.upper);
                }
                Mutagen::Cauchy => {
                    // Cauchy scale must be strictly positive; sigma = 0
                    // means the dimension does not mutate.
                    if parameter.sigma > 0.0 {
                        let cauchy = Cauchy::new(0.0, parameter.sigma)
                            .expect("sigma is validated positive");
                        *gene = (*gene + cauchy.sample(rng)).clamp(parameter.lower, parameter.upper);
                    }
                }
            }
        }
    }
}
