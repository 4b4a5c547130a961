use serde::{Deserialize, Serialize};

/// Elementwise activation applied as the last operation of a dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Linear,
    Sigmoid,
    Tanh,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Linear => x,
            ActivationFunction::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActivationFunction::Tanh => x.tanh(),
        }
    }

    /// Derivative expressed in terms of the activation's own output
    /// `fx = function(x)`, which is what the forward tape keeps.
    pub fn derivative(&self, fx: f64) -> f64 {
        match self {
            ActivationFunction::Linear => 1.0,
            ActivationFunction::Sigmoid => fx * (1.0 - fx),
            ActivationFunction::Tanh => 1.0 - fx * fx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_derivative(f: ActivationFunction, x: f64) -> f64 {
        let h = 1e-6;
        (f.function(x + h) - f.function(x - h)) / (2.0 * h)
    }

    #[test]
    fn derivative_matches_finite_difference() {
        for f in [
            ActivationFunction::Linear,
            ActivationFunction::Sigmoid,
            ActivationFunction::Tanh,
        ] {
            for x in [-2.5, -0.3, 0.0, 0.7, 3.1] {
                let analytic = f.derivative(f.function(x));
                let numeric = numeric_derivative(f, x);
                assert!(
                    (analytic - numeric).abs() < 1e-6,
                    "{f:?} at {x}: {analytic} vs {numeric}"
                );
            }
        }
    }

    #[test]
    fn sigmoid_is_centered_at_half() {
        assert!((ActivationFunction::Sigmoid.function(0.0) - 0.5).abs() < 1e-12);
        assert!((ActivationFunction::Tanh.function(0.0)).abs() < 1e-12);
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&ActivationFunction::Tanh).unwrap();
        assert_eq!(json, "\"tanh\"");
    }
}
