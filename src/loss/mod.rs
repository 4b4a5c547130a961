pub mod loss;
pub mod mse;

pub use loss::{Loss, LossTape};
pub use mse::MseLoss;
