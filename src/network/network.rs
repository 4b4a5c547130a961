use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layers::dense::{Layer, LayerGradients, LayerTape};
use crate::loss::loss::Loss;
use crate::math::matrix::Matrix;
use crate::persist;

/// Layers applied in order, reduced to a scalar by `loss`.
///
/// Cloning yields a fully independent copy; the trainer relies on this to
/// keep a best-so-far snapshot next to the live network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawNetwork")]
pub struct Network {
    layers: Vec<Layer>,
    loss: Loss,
}

#[derive(Deserialize)]
struct RawNetwork {
    layers: Vec<Layer>,
    #[serde(default)]
    loss: Loss,
}

impl TryFrom<RawNetwork> for Network {
    type Error = Error;

    fn try_from(raw: RawNetwork) -> Result<Network> {
        Network::new(raw.layers, raw.loss)
    }
}

/// Per-layer tapes of one forward pass.
#[derive(Debug, Clone)]
pub struct NetworkTape {
    layers: Vec<LayerTape>,
}

impl NetworkTape {
    pub fn layers(&self) -> &[LayerTape] {
        &self.layers
    }

    pub fn output(&self) -> Result<&Matrix> {
        self.layers
            .last()
            .ok_or_else(|| Error::InvalidConfig("network tape holds no layers".into()))?
            .output()
    }
}

/// Per-layer gradients of one backward pass, in layer order.
#[derive(Debug, Clone)]
pub struct NetworkGradients {
    pub layers: Vec<LayerGradients>,
}

impl NetworkGradients {
    /// Gradient w.r.t. the network input.
    pub fn input(&self) -> Option<&Matrix> {
        self.layers.first().map(|layer| &layer.input)
    }
}

/// Outcome of `Network::train_batch`: the batch loss and the gradients the
/// optimizer should apply.
#[derive(Debug, Clone)]
pub struct TrainedBatch {
    pub loss: f64,
    pub gradients: NetworkGradients,
}

impl Network {
    pub fn new(layers: Vec<Layer>, loss: Loss) -> Result<Network> {
        if layers.is_empty() {
            return Err(Error::InvalidConfig("network must have at least one layer".into()));
        }
        Ok(Network { layers, loss })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    pub fn loss(&self) -> Loss {
        self.loss
    }

    /// Forward pass; keeps every layer's tape for backprop.
    pub fn forward(&self, input: &Matrix) -> Result<NetworkTape> {
        let mut tapes: Vec<LayerTape> = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let tape = match tapes.last() {
                Some(previous) => layer.forward(previous.output()?)?,
                None => layer.forward(input)?,
            };
            tapes.push(tape);
        }
        Ok(NetworkTape { layers: tapes })
    }

    /// Forward pass without keeping intermediate tapes.
    pub fn predict(&self, input: &Matrix) -> Result<Matrix> {
        let mut current = input.clone();
        for layer in &self.layers {
            current = layer.forward(&current)?.output()?.clone();
        }
        Ok(current)
    }

    /// Backward pass from the gradient of the loss w.r.t. the network output.
    pub fn backward(&self, tape: &NetworkTape, loss_gradient: &Matrix) -> Result<NetworkGradients> {
        if tape.layers.len() != self.layers.len() {
            return Err(Error::GradientMismatch {
                expected: self.layers.len(),
                actual: tape.layers.len(),
            });
        }

        let mut gradients: Vec<LayerGradients> = Vec::with_capacity(self.layers.len());
        for (layer, layer_tape) in self.layers.iter().zip(&tape.layers).rev() {
            let layer_gradients = match gradients.last() {
                Some(next) => layer.backward(layer_tape, &next.input)?,
                None => layer.backward(layer_tape, loss_gradient)?,
            };
            gradients.push(layer_gradients);
        }
        gradients.reverse();

        Ok(NetworkGradients { layers: gradients })
    }

    /// Forward, loss, and backward for one batch. Parameters are left
    /// untouched; apply `TrainedBatch::gradients` with an optimizer.
    pub fn train_batch(&self, inputs: &Matrix, targets: &Matrix) -> Result<TrainedBatch> {
        let tape = self.forward(inputs)?;
        let loss_tape = self.loss.forward(tape.output()?, targets)?;
        let loss_gradient = self.loss.backward(&loss_tape)?;
        let gradients = self.backward(&tape, &loss_gradient)?;
        Ok(TrainedBatch {
            loss: loss_tape.output(),
            gradients,
        })
    }

    /// Loss on `(inputs, targets)` without computing gradients.
    pub fn calculate_loss(&self, inputs: &Matrix, targets: &Matrix) -> Result<f64> {
        let prediction = self.predict(inputs)?;
        Ok(self.loss.forward(&prediction, targets)?.output())
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        persist::save_json(self, path)
    }

    /// Deserializes a network from a JSON file previously written by
    /// `save_json`. Files describing an empty network are rejected.
    pub fn load_json(path: &str) -> std::io::Result<Network> {
        persist::load_json(path)
    }
}
