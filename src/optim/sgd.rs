use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::network::network::{Network, NetworkGradients};

/// Plain gradient descent with a linearly decaying learning rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sgd {
    pub learning_rate: f64,
    /// Amount subtracted from `learning_rate` by each `decay` call.
    pub decay_lr: f64,
}

/// Learning-rate range for a training run; `build` turns it into an `Sgd`
/// that reaches `stop_lr` exactly at the last epoch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SgdSpec {
    pub start_lr: f64,
    pub stop_lr: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd {
            learning_rate,
            decay_lr: 0.0,
        }
    }

    /// Linear schedule: `decay_lr = (start_lr - stop_lr) / (epochs - 1)`.
    /// A single-epoch run never decays.
    pub fn with_decay(start_lr: f64, stop_lr: f64, epochs: usize) -> Result<Sgd> {
        if epochs == 0 {
            return Err(Error::InvalidConfig("optimizer needs at least one epoch".into()));
        }
        let decay_lr = if epochs > 1 {
            (start_lr - stop_lr) / (epochs - 1) as f64
        } else {
            0.0
        };
        Ok(Sgd {
            learning_rate: start_lr,
            decay_lr,
        })
    }

    /// Applies one update, `p ← p − learning_rate · ∂L/∂p`, to every
    /// parametrized operation of every layer.
    pub fn step(&self, network: &mut Network, gradients: &NetworkGradients) -> Result<()> {
        let layers = network.layers_mut();
        if gradients.layers.len() != layers.len() {
            return Err(Error::GradientMismatch {
                expected: layers.len(),
                actual: gradients.layers.len(),
            });
        }
        let learning_rate = self.learning_rate;
        for (layer, layer_gradients) in layers.iter_mut().zip(&gradients.layers) {
            layer.update_parameters(layer_gradients, |parameter, gradient| {
                parameter.sub(&gradient.mul_scalar(learning_rate))
            })?;
        }
        Ok(())
    }

    /// Called once per epoch.
    pub fn decay(&mut self) {
        self.learning_rate -= self.decay_lr;
    }
}

impl SgdSpec {
    pub fn new(start_lr: f64, stop_lr: f64) -> SgdSpec {
        SgdSpec { start_lr, stop_lr }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.start_lr.is_finite() || !self.stop_lr.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "learning rates must be finite, got {} -> {}",
                self.start_lr, self.stop_lr
            )));
        }
        Ok(())
    }

    pub fn build(&self, epochs: usize) -> Result<Sgd> {
        self.validate()?;
        Sgd::with_decay(self.start_lr, self.stop_lr, epochs)
    }
}
