use futures::future::BoxFuture;

/// Failure of an external measurement to reach or settle at the requested
/// coordinates. Fatal to the current generation; the engine propagates it
/// and never silently skips the candidate.
#[derive(Debug, thiserror::Error)]
#[error("measurement failed: {0}")]
pub struct MeasurementError(#[from] anyhow::Error);

impl MeasurementError {
    pub fn new(source: anyhow::Error) -> Self {
        Self(source)
    }
}

/// Objective function returning the fitness of a candidate's coordinates.
///
/// Two kinds of implementations share this contract: pure functions (see
/// [`FnEvaluator`]) and external measurements that drive a physical system
/// to the coordinates and read back a scalar. The engine treats every
/// evaluation as potentially high-latency and dispatches a whole batch
/// concurrently, so implementations must not share mutable state across
/// calls.
pub trait Evaluator: Send + Sync {
    fn evaluate<'a>(&'a self, genome: &'a [f64]) -> BoxFuture<'a, Result<f64, MeasurementError>>;
}

/// Wraps a pure, side-effect-free objective function. Never fails.
pub struct FnEvaluator<F> {
    objective: F,
}

impl<F> FnEvaluator<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    pub fn new(objective: F) -> Self {
        Self { objective }
    }
}

impl<F> Evaluator for FnEvaluator<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn evaluate<'a>(&'a self, genome: &'a [f64]) -> BoxFuture<'a, Result<f64, MeasurementError>> {
        Box::pin(std::future::ready(Ok((self.objective)(genome))))
    }
}
