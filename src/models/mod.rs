mod candidate;
mod crossover;
mod evaluator;
mod history;
mod mutagen;
mod parameter;
mod population;
mod replacement;
mod selector;

pub use candidate::Candidate;
pub use crossover::{AlphaOutOfRangeError, Crossover};
pub use evaluator::{Evaluator, FnEvaluator, MeasurementError};
pub use history::GenerationRecord;
pub use mutagen::Mutagen;
pub use parameter::{Parameter, ParameterError, ParameterSpace};
pub use population::Population;
pub use replacement::{Replacement, ReplacementError};
pub use selector::{SelectionError, Selector};
