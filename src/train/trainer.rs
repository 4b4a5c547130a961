use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

use crate::error::Result;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::early_stopping::EarlyStopping;
use crate::train::epoch_stats::EpochStats;
use crate::train::fit_parameters::{Dataset, FitParameters};
use crate::train::fit_results::{FitResults, StopReason};
use crate::train::loop_fn::{evaluate, run_one_epoch, shuffle_pair};
use crate::train::moving_window::MovingWindow;
use crate::train::train_config::{LossMonitor, TrainConfig};

/// Drives one training run: epochs of shuffled mini-batch SGD, test-set
/// queries on the configured schedule, early stopping, and best-network
/// retention.
///
/// A trainer owns its network, optimizer, data and RNG outright, so
/// independent trainers can run on separate threads.
pub struct Trainer {
    config: TrainConfig,
    dataset: Dataset,
    network: Network,
    optimizer: Sgd,
    rng: StdRng,
}

struct BestSnapshot {
    network: Network,
    loss: f64,
    epoch: usize,
}

impl Trainer {
    /// Validates `params` and materializes the initial network and optimizer.
    pub fn new(params: FitParameters) -> Result<Trainer> {
        params.validate()?;
        let FitParameters {
            dataset,
            config,
            network,
            optimizer,
        } = params;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let network = network.build(&mut rng)?;
        let optimizer = optimizer.build(config.epochs)?;

        Ok(Trainer {
            config,
            dataset,
            network,
            optimizer,
            rng,
        })
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn optimizer(&self) -> &Sgd {
        &self.optimizer
    }

    /// Runs until the epochs are exhausted or early stopping fires.
    pub fn fit(mut self) -> Result<FitResults> {
        let epochs = self.config.epochs;
        let batch_size = self.config.batch_size;
        let schedule = self.config.schedule();
        let capacity = MovingWindow::capacity_for(self.config.queries);
        let mut train_window = MovingWindow::new(capacity)?;
        let mut test_window = MovingWindow::new(capacity)?;
        let mut stopper = EarlyStopping::new(self.config.early_stopping_threshold);

        let mut best: Option<BestSnapshot> = None;
        let mut test_losses = BTreeMap::new();
        let mut history = Vec::with_capacity(schedule.len());
        let mut stop_reason = StopReason::EpochsExhausted;

        info!(
            "Training for {epochs} epochs (batch size {batch_size}, {} train rows), querying at {schedule:?}",
            self.dataset.train.rows()
        );

        for epoch in 1..=epochs {
            let started = Instant::now();
            let learning_rate = self.optimizer.learning_rate;

            let train_loss = run_one_epoch(
                &mut self.network,
                &self.optimizer,
                &self.dataset.train,
                batch_size,
                &mut self.rng,
            )?;
            self.optimizer.decay();
            debug!(epoch, train_loss, learning_rate, "epoch complete");

            if schedule.binary_search(&epoch).is_err() {
                continue;
            }

            let test = shuffle_pair(&self.dataset.test, &mut self.rng)?;
            let test_loss = evaluate(&self.network, &test, batch_size)?;

            let improved = best.as_ref().map_or(true, |b| test_loss < b.loss);
            if improved {
                best = Some(BestSnapshot {
                    network: self.network.clone(),
                    loss: test_loss,
                    epoch,
                });
            }
            test_losses.insert(epoch, test_loss);
            history.push(EpochStats {
                epoch,
                total_epochs: epochs,
                train_loss,
                test_loss,
                learning_rate,
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
            info!(
                "Query at epoch {epoch}/{epochs}: train loss {train_loss:.6}, test loss {test_loss:.6}{}",
                if improved { " (best so far)" } else { "" }
            );

            let (monitored, window) = match self.config.monitor {
                LossMonitor::Test => (test_loss, &test_window),
                LossMonitor::Train => (train_loss, &train_window),
            };
            let stagnating = self.config.early_stopping && stopper.observe(monitored, window);
            train_window.push(train_loss);
            test_window.push(test_loss);

            if stagnating {
                info!(
                    "Early stopping at epoch {epoch}: {} consecutive queries without improvement",
                    stopper.strikes()
                );
                stop_reason = StopReason::EarlyStopped { epoch };
                break;
            }
        }

        let best = match best {
            Some(best) => best,
            None => {
                let test = shuffle_pair(&self.dataset.test, &mut self.rng)?;
                BestSnapshot {
                    loss: evaluate(&self.network, &test, batch_size)?,
                    network: self.network,
                    epoch: epochs,
                }
            }
        };
        let valid_loss = evaluate(&best.network, &self.dataset.valid, batch_size)?;
        info!(
            "Training finished ({stop_reason:?}): best test loss {:.6} at epoch {}, valid loss {valid_loss:.6}",
            best.loss, best.epoch
        );

        Ok(FitResults {
            test_losses,
            best_network: best.network,
            best_test_loss: best.loss,
            best_epoch: best.epoch,
            valid_loss,
            history,
            stop_reason,
        })
    }
}

/// Builds a `Trainer` from `params` and runs it to completion.
pub fn fit(params: FitParameters) -> Result<FitResults> {
    Trainer::new(params)?.fit()
}
