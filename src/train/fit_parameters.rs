use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::network::spec::NetworkSpec;
use crate::optim::sgd::SgdSpec;
use crate::train::train_config::TrainConfig;

/// Samples (`inputs`) and their targets (`outputs`), one sample per row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPair {
    pub inputs: Matrix,
    pub outputs: Matrix,
}

impl DataPair {
    pub fn new(inputs: Matrix, outputs: Matrix) -> Result<DataPair> {
        let pair = DataPair { inputs, outputs };
        pair.validate()?;
        Ok(pair)
    }

    pub fn rows(&self) -> usize {
        self.inputs.rows()
    }

    pub fn validate(&self) -> Result<()> {
        if self.inputs.rows() != self.outputs.rows() {
            return Err(Error::ShapeMismatch {
                op: "data pair",
                left: self.inputs.shape(),
                right: self.outputs.shape(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub train: DataPair,
    pub test: DataPair,
    pub valid: DataPair,
}

impl Dataset {
    pub fn new(train: DataPair, test: DataPair, valid: DataPair) -> Dataset {
        Dataset { train, test, valid }
    }

    fn pairs(&self) -> [(&'static str, &DataPair); 3] {
        [
            ("train", &self.train),
            ("test", &self.test),
            ("valid", &self.valid),
        ]
    }

    /// Checks every pair and that all pairs agree on input/output widths.
    pub fn validate(&self, input_size: usize, output_size: usize) -> Result<()> {
        for (name, pair) in self.pairs() {
            pair.validate()?;
            if pair.inputs.cols() != input_size || pair.outputs.cols() != output_size {
                return Err(Error::InvalidConfig(format!(
                    "{name} data is {}->{} wide, network expects {input_size}->{output_size}",
                    pair.inputs.cols(),
                    pair.outputs.cols()
                )));
            }
        }
        Ok(())
    }
}

/// Everything one training run consumes. Each `Trainer` owns its own copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitParameters {
    pub dataset: Dataset,
    pub config: TrainConfig,
    pub network: NetworkSpec,
    pub optimizer: SgdSpec,
}

impl FitParameters {
    pub fn new(
        dataset: Dataset,
        config: TrainConfig,
        network: NetworkSpec,
        optimizer: SgdSpec,
    ) -> FitParameters {
        FitParameters {
            dataset,
            config,
            network,
            optimizer,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;
        self.network.validate()?;
        self.optimizer.validate()?;
        let output_size = self
            .network
            .output_size()
            .ok_or_else(|| Error::InvalidConfig("network has no layers".into()))?;
        self.dataset.validate(self.network.input_size, output_size)
    }
}
