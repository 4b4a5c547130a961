use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::error::Result;
use crate::math::matrix::{Axis, Matrix};

/// Which learnable matrix a parametrized operation carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterRole {
    Weights,
    Bias,
}

/// One step of a layer's forward/backward chain.
///
/// `Activation` is stateless; `WeightMultiply` and `BiasAdd` own a parameter
/// that the optimizer overwrites between batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    Activation { function: ActivationFunction },
    /// `input . weights`, with `weights` shaped `inputs x neurons`.
    WeightMultiply { weights: Matrix },
    /// `input + bias` per row, with `bias` shaped `1 x neurons`.
    BiasAdd { bias: Matrix },
}

/// Values recorded by `Operation::forward` and consumed by the matching
/// `Operation::backward`.
#[derive(Debug, Clone)]
pub struct OperationTape {
    input: Matrix,
    output: Matrix,
}

impl OperationTape {
    pub fn input(&self) -> &Matrix {
        &self.input
    }

    pub fn output(&self) -> &Matrix {
        &self.output
    }
}

/// Result of a backward step: the gradient w.r.t. the operation's input and,
/// for parametrized operations, w.r.t. its parameter.
#[derive(Debug, Clone)]
pub struct OperationGradients {
    pub input: Matrix,
    pub parameter: Option<Matrix>,
}

impl Operation {
    pub fn activation(function: ActivationFunction) -> Operation {
        Operation::Activation { function }
    }

    pub fn role(&self) -> Option<ParameterRole> {
        match self {
            Operation::Activation { .. } => None,
            Operation::WeightMultiply { .. } => Some(ParameterRole::Weights),
            Operation::BiasAdd { .. } => Some(ParameterRole::Bias),
        }
    }

    pub fn parameter(&self) -> Option<&Matrix> {
        match self {
            Operation::Activation { .. } => None,
            Operation::WeightMultiply { weights } => Some(weights),
            Operation::BiasAdd { bias } => Some(bias),
        }
    }

    pub(crate) fn parameter_mut(&mut self) -> Option<&mut Matrix> {
        match self {
            Operation::Activation { .. } => None,
            Operation::WeightMultiply { weights } => Some(weights),
            Operation::BiasAdd { bias } => Some(bias),
        }
    }

    pub fn forward(&self, input: &Matrix) -> Result<OperationTape> {
        let output = match self {
            Operation::Activation { function } => input.map(|x| function.function(x)),
            Operation::WeightMultiply { weights } => input.matmul(weights)?,
            Operation::BiasAdd { bias } => input.add_row(bias)?,
        };
        Ok(OperationTape {
            input: input.clone(),
            output,
        })
    }

    pub fn backward(
        &self,
        tape: &OperationTape,
        output_gradient: &Matrix,
    ) -> Result<OperationGradients> {
        output_gradient.ensure_shape(tape.output.shape(), "backward output gradient")?;

        let (input_gradient, parameter_gradient) = match self {
            Operation::Activation { function } => {
                // Chain rule: f'(x) is rebuilt from the recorded output.
                let local = tape.output.map(|fx| function.derivative(fx));
                (local.mul(output_gradient)?, None)
            }
            Operation::WeightMultiply { weights } => {
                let input_gradient = output_gradient.matmul(&weights.transpose())?;
                let weights_gradient = tape.input.transpose().matmul(output_gradient)?;
                (input_gradient, Some(weights_gradient))
            }
            Operation::BiasAdd { .. } => {
                let input_gradient = tape.input.ones_like().mul(output_gradient)?;
                let bias_gradient = output_gradient.sum(Axis::Col);
                (input_gradient, Some(bias_gradient))
            }
        };

        input_gradient.ensure_shape(tape.input.shape(), "backward input gradient")?;
        if let (Some(gradient), Some(parameter)) = (&parameter_gradient, self.parameter()) {
            gradient.ensure_shape(parameter.shape(), "backward parameter gradient")?;
        }

        Ok(OperationGradients {
            input: input_gradient,
            parameter: parameter_gradient,
        })
    }
}
