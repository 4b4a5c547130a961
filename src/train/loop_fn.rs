use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::Result;
use crate::math::matrix::Axis;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::fit_parameters::DataPair;

// ---------------------------------------------------------------------------
// Per-epoch building blocks used by `Trainer::fit`
// ---------------------------------------------------------------------------

/// Applies one random row permutation to both inputs and outputs.
pub(crate) fn shuffle_pair<R: Rng + ?Sized>(pair: &DataPair, rng: &mut R) -> Result<DataPair> {
    let mut indices: Vec<usize> = (0..pair.rows()).collect();
    indices.shuffle(rng);
    Ok(DataPair {
        inputs: pair.inputs.shuffle(&indices, Axis::Col)?,
        outputs: pair.outputs.shuffle(&indices, Axis::Col)?,
    })
}

/// Consecutive row blocks of `batch_size`; the last one may be shorter.
pub(crate) fn batches(pair: &DataPair, batch_size: usize) -> Result<Vec<DataPair>> {
    let n = pair.rows();
    (0..n)
        .step_by(batch_size)
        .map(|start| {
            let stop = (start + batch_size).min(n);
            Ok(DataPair {
                inputs: pair.inputs.row_slice(start, stop, 1)?,
                outputs: pair.outputs.row_slice(start, stop, 1)?,
            })
        })
        .collect()
}

/// One full pass of mini-batch SGD over shuffled training data.
/// Returns the sum of the batch losses.
pub(crate) fn run_one_epoch<R: Rng + ?Sized>(
    network: &mut Network,
    optimizer: &Sgd,
    train: &DataPair,
    batch_size: usize,
    rng: &mut R,
) -> Result<f64> {
    let shuffled = shuffle_pair(train, rng)?;
    let mut total_loss = 0.0;
    for batch in batches(&shuffled, batch_size)? {
        let trained = network.train_batch(&batch.inputs, &batch.outputs)?;
        optimizer.step(network, &trained.gradients)?;
        total_loss += trained.loss;
    }
    Ok(total_loss)
}

/// Sum of the batch losses over `pair`, without gradients.
pub(crate) fn evaluate(network: &Network, pair: &DataPair, batch_size: usize) -> Result<f64> {
    batches(pair, batch_size)?
        .iter()
        .map(|batch| network.calculate_loss(&batch.inputs, &batch.outputs))
        .sum()
}
