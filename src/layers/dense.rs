use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::operation::operation::{Operation, OperationTape, ParameterRole};

/// An ordered chain of operations producing `neurons` output columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawLayer")]
pub struct Layer {
    neurons: usize,
    operations: Vec<Operation>,
}

/// Unchecked wire form of `Layer`; always goes through `Layer::new`.
#[derive(Deserialize)]
struct RawLayer {
    neurons: usize,
    operations: Vec<Operation>,
}

impl TryFrom<RawLayer> for Layer {
    type Error = Error;

    fn try_from(raw: RawLayer) -> Result<Layer> {
        Layer::new(raw.neurons, raw.operations)
    }
}

/// Per-operation tapes of one `Layer::forward` call, in forward order.
#[derive(Debug, Clone)]
pub struct LayerTape {
    operations: Vec<OperationTape>,
}

impl LayerTape {
    pub fn operations(&self) -> &[OperationTape] {
        &self.operations
    }

    pub fn output(&self) -> Result<&Matrix> {
        self.operations
            .last()
            .map(OperationTape::output)
            .ok_or_else(|| Error::InvalidConfig("layer tape holds no operations".into()))
    }
}

/// Gradients of one `Layer::backward` call. `parameters[i]` belongs to the
/// layer's i-th operation and is `None` for stateless operations.
#[derive(Debug, Clone)]
pub struct LayerGradients {
    pub input: Matrix,
    pub parameters: Vec<Option<Matrix>>,
}

impl Layer {
    pub fn new(neurons: usize, operations: Vec<Operation>) -> Result<Layer> {
        if neurons == 0 {
            return Err(Error::InvalidConfig("layer must have at least one neuron".into()));
        }
        if operations.is_empty() {
            return Err(Error::InvalidConfig("layer must have at least one operation".into()));
        }
        Ok(Layer {
            neurons,
            operations,
        })
    }

    /// Dense layer: `WeightMultiply -> BiasAdd -> activation`, with weights and
    /// bias drawn from the Xavier distribution.
    pub fn dense<R: Rng + ?Sized>(
        inputs: usize,
        neurons: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Result<Layer> {
        if inputs == 0 || neurons == 0 {
            return Err(Error::InvalidConfig(format!(
                "dense layer needs positive sizes, got {inputs} inputs and {neurons} neurons"
            )));
        }
        let weights = Matrix::xavier(inputs, neurons, inputs, neurons, rng)?;
        let bias = Matrix::xavier(1, neurons, inputs, neurons, rng)?;
        Layer::new(
            neurons,
            vec![
                Operation::WeightMultiply { weights },
                Operation::BiasAdd { bias },
                Operation::activation(activation),
            ],
        )
    }

    pub fn neurons(&self) -> usize {
        self.neurons
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Input width expected by the first weight matrix, if the layer has one.
    pub fn input_size(&self) -> Option<usize> {
        self.parameter(ParameterRole::Weights).map(Matrix::rows)
    }

    pub fn parameter(&self, role: ParameterRole) -> Option<&Matrix> {
        self.operations
            .iter()
            .find(|op| op.role() == Some(role))
            .and_then(Operation::parameter)
    }

    pub fn forward(&self, input: &Matrix) -> Result<LayerTape> {
        let mut tapes: Vec<OperationTape> = Vec::with_capacity(self.operations.len());
        for op in &self.operations {
            let tape = match tapes.last() {
                Some(previous) => op.forward(previous.output())?,
                None => op.forward(input)?,
            };
            tapes.push(tape);
        }

        let tape = LayerTape { operations: tapes };
        let output = tape.output()?;
        if output.cols() != self.neurons {
            return Err(Error::ShapeMismatch {
                op: "layer output",
                left: output.shape(),
                right: (output.rows(), self.neurons),
            });
        }
        Ok(tape)
    }

    /// Runs the operations in reverse order, feeding each one the gradient
    /// produced by its successor.
    pub fn backward(&self, tape: &LayerTape, output_gradient: &Matrix) -> Result<LayerGradients> {
        if tape.operations.len() != self.operations.len() {
            return Err(Error::GradientMismatch {
                expected: self.operations.len(),
                actual: tape.operations.len(),
            });
        }

        let mut parameters = vec![None; self.operations.len()];
        let mut gradient = output_gradient.clone();
        for (i, (op, op_tape)) in self
            .operations
            .iter()
            .zip(&tape.operations)
            .enumerate()
            .rev()
        {
            let gradients = op.backward(op_tape, &gradient)?;
            parameters[i] = gradients.parameter;
            gradient = gradients.input;
        }

        Ok(LayerGradients {
            input: gradient,
            parameters,
        })
    }

    /// Replaces every parameter `p` that has a gradient `g` with `update(p, g)`.
    pub(crate) fn update_parameters<F>(&mut self, gradients: &LayerGradients, update: F) -> Result<()>
    where
        F: Fn(&Matrix, &Matrix) -> Result<Matrix>,
    {
        if gradients.parameters.len() != self.operations.len() {
            return Err(Error::GradientMismatch {
                expected: self.operations.len(),
                actual: gradients.parameters.len(),
            });
        }
        for (op, gradient) in self.operations.iter_mut().zip(&gradients.parameters) {
            if let (Some(parameter), Some(gradient)) = (op.parameter_mut(), gradient) {
                let updated = update(parameter, gradient)?;
                *parameter = updated;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    #[test]
    fn zero_neurons_is_rejected() {
        assert!(matches!(
            Layer::dense(3, 0, ActivationFunction::Tanh, &mut rng()),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Layer::new(0, vec![Operation::activation(ActivationFunction::Linear)]),
            Err(Error::InvalidConfig(_))
        ));
        assert!(Layer::new(2, vec![]).is_err());
    }

    #[test]
    fn deserialization_runs_constructor_checks() {
        let empty: std::result::Result<Layer, _> =
            serde_json::from_str(r#"{"neurons":1,"operations":[]}"#);
        assert!(empty.is_err());
        let no_neurons: std::result::Result<Layer, _> = serde_json::from_str(
            r#"{"neurons":0,"operations":[{"type":"activation","function":"tanh"}]}"#,
        );
        assert!(no_neurons.is_err());

        let layer = Layer::dense(2, 3, ActivationFunction::Tanh, &mut rng()).unwrap();
        let restored: Layer = serde_json::from_str(&serde_json::to_string(&layer).unwrap()).unwrap();
        assert_eq!(restored.neurons(), 3);
        assert_eq!(restored.operations().len(), 3);
    }

    #[test]
    fn dense_layer_shapes() {
        let layer = Layer::dense(3, 4, ActivationFunction::Sigmoid, &mut rng()).unwrap();
        assert_eq!(layer.neurons(), 4);
        assert_eq!(layer.input_size(), Some(3));
        assert_eq!(layer.parameter(ParameterRole::Weights).unwrap().shape(), (3, 4));
        assert_eq!(layer.parameter(ParameterRole::Bias).unwrap().shape(), (1, 4));

        let input = Matrix::ones(5, 3).unwrap();
        let tape = layer.forward(&input).unwrap();
        assert_eq!(tape.operations().len(), 3);
        assert_eq!(tape.output().unwrap().shape(), (5, 4));

        let gradients = layer.backward(&tape, &tape.output().unwrap().ones_like()).unwrap();
        assert_eq!(gradients.input.shape(), (5, 3));
        assert_eq!(gradients.parameters[0].as_ref().unwrap().shape(), (3, 4));
        assert_eq!(gradients.parameters[1].as_ref().unwrap().shape(), (1, 4));
        assert!(gradients.parameters[2].is_none());
    }

    #[test]
    fn forward_rejects_wrong_input_width() {
        let layer = Layer::dense(3, 2, ActivationFunction::Linear, &mut rng()).unwrap();
        assert!(matches!(
            layer.forward(&Matrix::ones(1, 4).unwrap()),
            Err(Error::ShapeMismatch { op: "matmul", .. })
        ));
    }

    #[test]
    fn forward_checks_declared_neuron_count() {
        let layer = Layer::new(3, vec![Operation::activation(ActivationFunction::Tanh)]).unwrap();
        assert!(matches!(
            layer.forward(&Matrix::ones(2, 2).unwrap()),
            Err(Error::ShapeMismatch { op: "layer output", .. })
        ));
    }

    #[test]
    fn weight_gradient_matches_finite_difference() {
        // Objective: sum of all layer outputs.
        let layer = Layer::dense(2, 3, ActivationFunction::Tanh, &mut rng()).unwrap();
        let input = Matrix::from_data(vec![vec![0.3, -0.8], vec![1.1, 0.2]]).unwrap();
        let tape = layer.forward(&input).unwrap();
        let gradients = layer.backward(&tape, &tape.output().unwrap().ones_like()).unwrap();
        let analytic = gradients.parameters[0].clone().unwrap();

        let h = 1e-6;
        let weights = layer.parameter(ParameterRole::Weights).unwrap().clone();
        for i in 0..weights.rows() {
            for j in 0..weights.cols() {
                let objective = |delta: f64| {
                    let mut shifted = layer.clone();
                    let mut bump = vec![0.0; weights.rows() * weights.cols()];
                    bump[i * weights.cols() + j] = delta;
                    let bump = Matrix::from_vec(weights.rows(), weights.cols(), bump).unwrap();
                    let step = LayerGradients {
                        input: input.clone(),
                        parameters: vec![Some(bump), None, None],
                    };
                    shifted
                        .update_parameters(&step, |p, g| p.add(g))
                        .unwrap();
                    shifted.forward(&input).unwrap().output().unwrap().sum_all()
                };
                let numeric = (objective(h) - objective(-h)) / (2.0 * h);
                let value = analytic.get(i, j).unwrap();
                assert!((numeric - value).abs() < 1e-5, "({i},{j}): {numeric} vs {value}");
            }
        }
    }

    #[test]
    fn update_parameters_requires_aligned_gradients() {
        let mut layer = Layer::dense(2, 2, ActivationFunction::Linear, &mut rng()).unwrap();
        let gradients = LayerGradients {
            input: Matrix::zeros(1, 2).unwrap(),
            parameters: vec![None],
        };
        assert_eq!(
            layer.update_parameters(&gradients, |p, _| Ok(p.clone())),
            Err(Error::GradientMismatch {
                expected: 3,
                actual: 1
            })
        );
    }
}
