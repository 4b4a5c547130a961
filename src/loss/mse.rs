use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

pub struct MseLoss;

impl MseLoss {
    fn ensure_same_shape(predicted: &Matrix, expected: &Matrix) -> Result<()> {
        if predicted.shape() != expected.shape() {
            return Err(Error::ShapeMismatch {
                op: "mse",
                left: predicted.shape(),
                right: expected.shape(),
            });
        }
        Ok(())
    }

    /// Scalar MSE: sum((predicted - expected)²) / rows
    ///
    /// Normalized by the number of samples (rows), not by the element count.
    pub fn loss(predicted: &Matrix, expected: &Matrix) -> Result<f64> {
        MseLoss::ensure_same_shape(predicted, expected)?;
        let diff = predicted.sub(expected)?;
        Ok(diff.map(|x| x * x).sum_all() / predicted.rows() as f64)
    }

    /// Gradient w.r.t. `predicted`: 2·(predicted - expected) / rows
    pub fn derivative(predicted: &Matrix, expected: &Matrix) -> Result<Matrix> {
        MseLoss::ensure_same_shape(predicted, expected)?;
        let diff = predicted.sub(expected)?;
        Ok(diff.mul_scalar(2.0 / predicted.rows() as f64))
    }
}
