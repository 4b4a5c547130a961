pub mod network;
pub mod spec;

pub use network::{Network, NetworkGradients, NetworkTape, TrainedBatch};
pub use spec::NetworkSpec;
