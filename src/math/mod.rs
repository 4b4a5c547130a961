pub mod matrix;

pub use matrix::{Axis, Matrix, Shape, DEFAULT_EPSILON};
