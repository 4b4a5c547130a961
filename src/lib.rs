pub mod error;
pub mod math;
pub mod activation;
pub mod operation;
pub mod layers;
pub mod loss;
pub mod network;
pub mod optim;
pub mod train;
pub mod data;
mod persist;

// Convenience re-exports
pub use error::{Error, Result};
pub use math::matrix::{Axis, Matrix};
pub use activation::activation::ActivationFunction;
pub use operation::operation::{Operation, ParameterRole};
pub use layers::dense::Layer;
pub use loss::loss::Loss;
pub use network::network::Network;
pub use network::spec::NetworkSpec;
pub use optim::sgd::{Sgd, SgdSpec};
pub use train::fit_parameters::{DataPair, Dataset, FitParameters};
pub use train::fit_results::{FitResults, StopReason};
pub use train::train_config::{LossMonitor, QueryMode, TrainConfig};
pub use train::trainer::{fit, Trainer};
pub use data::sampler::FunctionSampler;
