pub mod engine;
pub mod models;

pub use engine::{ConfigError, Error, Optimizer, OptimizerBuilder};
