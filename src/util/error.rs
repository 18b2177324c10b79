//! Error types for gausstable.

use crate::builder::BuildState;
use thiserror::Error;

/// Result alias for gausstable operations.
pub type GaussResult<T> = std::result::Result<T, GaussError>;

/// Errors raised while validating a configuration or building a table.
///
/// All of these are configuration or programming errors. The computation is
/// deterministic, so retrying with the same inputs fails the same way.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GaussError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// An octave needs at least one level.
    #[error("invalid level count {levels}: an octave needs at least one level")]
    InvalidLevelCount { levels: usize },
    /// The level count needs more table rows than the fixed capacity.
    #[error("level count {levels} exceeds the table capacity (max {max})")]
    TooManyLevels { levels: usize, max: usize },
    /// A level index lies outside the table rows.
    #[error("level {level} is out of range (max {max})")]
    LevelOutOfRange { level: usize, max: usize },
    /// A sigma was zero, negative or not finite.
    #[error("sigma must be positive and finite, got {sigma}")]
    NonPositiveSigma { sigma: f32 },
    /// The assumed input blur already reaches or exceeds the base sigma.
    #[error("initial blur {initial_blur} must be below sigma0 {sigma0}")]
    InitialBlurTooLarge { initial_blur: f32, sigma0: f32 },
    /// A kernel radius does not fit into one table row.
    #[error("span {radius} at level {level} does not fit a row of {capacity} coefficients")]
    SpanTooWide {
        level: usize,
        radius: usize,
        capacity: usize,
    },
    /// Levels must be filled in strictly increasing order.
    #[error("levels must be filled in order: expected level {expected}, got {got}")]
    LevelOrder { expected: usize, got: usize },
    /// The builder is not in a state that allows the operation.
    #[error("cannot {op} while the builder is {state:?}")]
    InvalidState { state: BuildState, op: &'static str },
}
