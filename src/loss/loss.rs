use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::loss::mse::MseLoss;
use crate::math::matrix::Matrix;

/// Selects which loss the network reduces its predictions with.
///
/// - `MeanSquaredError`: sum of squared differences divided by the row
///   count; pair with a Linear output layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    #[default]
    MeanSquaredError,
}

/// The `(prediction, target)` pair and scalar recorded by `Loss::forward`.
#[derive(Debug, Clone)]
pub struct LossTape {
    prediction: Matrix,
    target: Matrix,
    output: f64,
}

impl LossTape {
    pub fn prediction(&self) -> &Matrix {
        &self.prediction
    }

    pub fn target(&self) -> &Matrix {
        &self.target
    }

    pub fn output(&self) -> f64 {
        self.output
    }
}

impl Loss {
    pub fn forward(&self, prediction: &Matrix, target: &Matrix) -> Result<LossTape> {
        let output = match self {
            Loss::MeanSquaredError => MseLoss::loss(prediction, target)?,
        };
        Ok(LossTape {
            prediction: prediction.clone(),
            target: target.clone(),
            output,
        })
    }

    /// Gradient of the recorded scalar w.r.t. the recorded prediction.
    pub fn backward(&self, tape: &LossTape) -> Result<Matrix> {
        match self {
            Loss::MeanSquaredError => MseLoss::derivative(&tape.prediction, &tape.target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_squared_error_scalar() {
        let prediction = Matrix::column(vec![1.0, 2.0]).unwrap();
        let target = Matrix::zeros(2, 1).unwrap();
        let tape = Loss::MeanSquaredError.forward(&prediction, &target).unwrap();
        assert!((tape.output() - 2.5).abs() < 1e-12);

        let gradient = Loss::MeanSquaredError.backward(&tape).unwrap();
        assert!(gradient.approx_eq(&Matrix::column(vec![1.0, 2.0]).unwrap()));
        assert_eq!(gradient.shape(), tape.prediction().shape());
    }

    #[test]
    fn forward_requires_matching_shapes() {
        let prediction = Matrix::zeros(3, 1).unwrap();
        let target = Matrix::zeros(2, 1).unwrap();
        assert!(Loss::MeanSquaredError.forward(&prediction, &target).is_err());
    }
}
