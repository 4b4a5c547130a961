use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::network::network::Network;
use crate::train::epoch_stats::EpochStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    EpochsExhausted,
    EarlyStopped { epoch: usize },
}

/// Outcome of a `Trainer` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitResults {
    /// Test loss keyed by query epoch.
    pub test_losses: BTreeMap<usize, f64>,
    /// Snapshot taken at the query epoch with the lowest test loss.
    pub best_network: Network,
    pub best_test_loss: f64,
    pub best_epoch: usize,
    /// Loss of `best_network` on the validation pair.
    pub valid_loss: f64,
    /// One entry per query epoch, in epoch order.
    pub history: Vec<EpochStats>,
    pub stop_reason: StopReason,
}

impl FitResults {
    pub fn stopped_early(&self) -> bool {
        matches!(self.stop_reason, StopReason::EarlyStopped { .. })
    }

    pub fn first_query(&self) -> Option<(usize, f64)> {
        self.test_losses.iter().next().map(|(&e, &l)| (e, l))
    }

    pub fn last_query(&self) -> Option<(usize, f64)> {
        self.test_losses.iter().next_back().map(|(&e, &l)| (e, l))
    }
}
