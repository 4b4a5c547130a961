use thiserror::Error;

use crate::math::matrix::Shape;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Matrix dimensions must be positive, got {rows}x{cols}.")]
    EmptyMatrix { rows: usize, cols: usize },

    #[error("Ragged matrix data: row {row} has {actual} values, expected {expected}.")]
    RaggedData {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Incompatible shapes for '{op}': left operand {left:?}, right operand {right:?}.")]
    ShapeMismatch {
        op: &'static str,
        left: Shape,
        right: Shape,
    },

    #[error("Invalid axis {0}: expected 0 (along rows) or 1 (along columns).")]
    InvalidAxis(usize),

    #[error("Index {index} out of bounds for length {len}.")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Invalid permutation: {0}")]
    InvalidPermutation(String),

    #[error("Invalid slice [{start}..{stop}; step {step}] for length {len}.")]
    InvalidSlice {
        start: usize,
        stop: usize,
        step: usize,
        len: usize,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Gradient count mismatch: expected {expected} entries, got {actual}.")]
    GradientMismatch { expected: usize, actual: usize },

    #[error("Domain error: {0}")]
    Domain(String),
}

pub type Result<T> = std::result::Result<T, Error>;
