use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::layers::dense::Layer;
use crate::loss::loss::Loss;
use crate::network::network::Network;
use crate::persist;

/// A serializable description of a dense network architecture.
///
/// Fields:
/// - `input_size` : width of the samples fed to the first layer
/// - `sizes`      : neuron count per layer, input → output
/// - `activations`: activation per layer; must line up with `sizes`
/// - `loss`       : loss the network reduces its output with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub input_size: usize,
    pub sizes: Vec<usize>,
    pub activations: Vec<ActivationFunction>,
    #[serde(default)]
    pub loss: Loss,
}

impl NetworkSpec {
    pub fn new(
        input_size: usize,
        sizes: Vec<usize>,
        activations: Vec<ActivationFunction>,
        loss: Loss,
    ) -> NetworkSpec {
        NetworkSpec {
            input_size,
            sizes,
            activations,
            loss,
        }
    }

    pub fn output_size(&self) -> Option<usize> {
        self.sizes.last().copied()
    }

    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(Error::InvalidConfig("network input_size must be positive".into()));
        }
        if self.sizes.is_empty() {
            return Err(Error::InvalidConfig("network needs at least one layer size".into()));
        }
        if self.sizes.len() != self.activations.len() {
            return Err(Error::InvalidConfig(format!(
                "{} layer sizes but {} activations",
                self.sizes.len(),
                self.activations.len()
            )));
        }
        if let Some(index) = self.sizes.iter().position(|&size| size == 0) {
            return Err(Error::InvalidConfig(format!("layer {index} has zero neurons")));
        }
        Ok(())
    }

    /// Validates the spec and materializes a freshly initialized network.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Network> {
        self.validate()?;
        let mut inputs = self.input_size;
        let mut layers = Vec::with_capacity(self.sizes.len());
        for (&neurons, &activation) in self.sizes.iter().zip(&self.activations) {
            layers.push(Layer::dense(inputs, neurons, activation, rng)?);
            inputs = neurons;
        }
        Network::new(layers, self.loss)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        persist::save_json(self, path)
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> std::io::Result<NetworkSpec> {
        persist::load_json(path)
    }
}
