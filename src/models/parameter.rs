use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum ParameterError {
    #[error(
        "InvalidBounds: lower bound must be smaller than upper. name={name}, lower={lower}, upper={upper}"
    )]
    InvalidBounds {
        name: String,
        lower: f64,
        upper: f64,
    },
    #[error("NegativeSigma: mutation sigma must be non-negative. name={name}, sigma={sigma}")]
    NegativeSigma { name: String, sigma: f64 },
}

impl ParameterError {
    pub(crate) fn invalid_bounds(name: &str, lower: f64, upper: f64) -> Self {
        Self::InvalidBounds {
            name: name.to_string(),
            lower,
            upper,
        }
    }

    pub(crate) fn negative_sigma(name: &str, sigma: f64) -> Self {
        Self::NegativeSigma {
            name: name.to_string(),
            sigma,
        }
    }
}

/// One dimension of the search space: a named, bounded axis with a
/// mutation scale. Immutable once the optimizer is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Parameter {
    pub(crate) name: String,
    pub(crate) lower: f64,
    pub(crate) upper: f64,
    pub(crate) sigma: f64,
}

impl Parameter {
    #[instrument(level = "debug", fields(name = name, lower = lower, upper = upper, sigma = sigma))]
    pub fn new(name: &str, lower: f64, upper: f64, sigma: f64) -> Result<Self, ParameterError> {
        let parameter = Self {
            name: name.to_string(),
            lower,
            upper,
            sigma,
        };
        parameter.validate()?;

        Ok(parameter)
    }

    /// Re-checks the construction invariants. Parameters can arrive through
    /// deserialization instead of [`Parameter::new`], so the optimizer
    /// builder runs this on every dimension before accepting a space.
    pub(crate) fn validate(&self) -> Result<(), ParameterError> {
        if !(self.lower < self.upper) {
            return Err(ParameterError::invalid_bounds(
                &self.name, self.lower, self.upper,
            ));
        }

        if !(self.sigma >= 0.0) {
            return Err(ParameterError::negative_sigma(&self.name, self.sigma));
        }

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Draws a value uniformly within this parameter's bounds.
    pub(crate) fn random<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.random_range(self.lower..=self.upper)
    }
}

/// The ordered set of parameters spanning the search space. Genome
/// coordinates follow this order everywhere in the crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct ParameterSpace {
    parameters: Vec<Parameter>,
}

impl ParameterSpace {
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Self { parameters }
    }

    pub fn dimensions(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    /// Draws one genome, each coordinate uniform within its bounds.
    #[instrument(level = "debug", skip(self, rng), fields(dimensions = self.parameters.len()))]
    pub(crate) fn random_genome<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        self.parameters
            .iter()
            .map(|parameter| parameter.random(rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn it_validates_bounds() {
        assert!(Parameter::new("m1", 0.0, 1.0, 0.1).is_ok());
        assert!(Parameter::new("m1", 1.0, 1.0, 0.1).is_err());
        assert!(Parameter::new("m1", 2.0, 1.0, 0.1).is_err());
    }

    #[test]
    fn it_validates_sigma() {
        assert!(Parameter::new("m1", 0.0, 1.0, 0.0).is_ok());
        assert!(Parameter::new("m1", 0.0, 1.0, -0.5).is_err());
    }

    #[test]
    fn it_rejects_nan_bounds() {
        assert!(Parameter::new("m1", f64::NAN, 1.0, 0.1).is_err());
        assert!(Parameter::new("m1", 0.0, 1.0, f64::NAN).is_err());
    }

    #[test]
    fn it_revalidates_deserialized_parameters() {
        let parameter: Parameter = serde_json::from_value(serde_json::json!({
            "name": "m1",
            "lower": 5.0,
            "upper": 1.0,
            "sigma": 0.1,
        }))
        .unwrap();

        // Deserialization bypasses the constructor; validate catches it.
        assert!(parameter.validate().is_err());
        assert!(
            Parameter::new("m1", 0.0, 1.0, 0.1)
                .unwrap()
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn it_draws_within_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let space = ParameterSpace::new(vec![
            Parameter::new("m1", -2.5, 3.0, 0.1).unwrap(),
            Parameter::new("m2", 10.0, 20.0, 0.1).unwrap(),
        ]);

        for _ in 0..100 {
            let genome = space.random_genome(&mut rng);
            assert_eq!(genome.len(), 2);
            assert!((-2.5..=3.0).contains(&genome[0]));
            assert!((10.0..=20.0).contains(&genome[1]));
        }
    }
}
