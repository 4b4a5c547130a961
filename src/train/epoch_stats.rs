use serde::{Deserialize, Serialize};

/// Statistics recorded by the trainer at every query epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Sum of the batch losses over this epoch's training pass.
    pub train_loss: f64,
    /// Sum of the batch losses over the test set.
    pub test_loss: f64,
    /// Learning rate the epoch was trained with (before its decay).
    pub learning_rate: f64,
    /// Wall-clock duration of the epoch, evaluation included, in milliseconds.
    pub elapsed_ms: u64,
}
