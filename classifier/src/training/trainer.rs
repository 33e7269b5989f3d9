use std::num::NonZeroUsize;

use log::{debug, info};
use rand::Rng;

use super::EpochStats;
use crate::{
    MlErr, Result,
    arch::{Sequential, loss::LossFn},
    dataset::{Batch, Dataset},
    optimization::Optimizer,
};

/// Runs the training loop of a network: for every batch it zeroes the gradient, makes a
/// training forward, computes the loss, backpropagates and steps the optimizer.
///
/// Epochs and batches are counted from 0 in logs and errors.
pub struct Trainer<O, L, R>
where
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    optimizer: O,
    loss_fn: L,
    batch_size: NonZeroUsize,
    epochs: NonZeroUsize,
    rng: R,
    epoch: usize,
}

impl<O, L, R> Trainer<O, L, R>
where
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    /// Returns a new `Trainer`.
    ///
    /// # Arguments
    /// * `optimizer` - The optimizer of the trained network's parameters.
    /// * `loss_fn` - The loss measuring how far the network's output is from the labels.
    /// * `batch_size` - The amount of samples per batch in `fit`.
    /// * `epochs` - The amount of epochs `fit` runs.
    /// * `rng` - A random number generator, used to reshuffle the dataset every epoch.
    pub fn new(
        optimizer: O,
        loss_fn: L,
        batch_size: NonZeroUsize,
        epochs: NonZeroUsize,
        rng: R,
    ) -> Self {
        Self {
            optimizer,
            loss_fn,
            batch_size,
            epochs,
            rng,
            epoch: 0,
        }
    }

    /// The amount of epochs trained so far.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn loss_fn(&self) -> &L {
        &self.loss_fn
    }

    /// Trains `network` for one epoch over the given batches, in the order they come.
    ///
    /// # Arguments
    /// * `network` - The network to train.
    /// * `batches` - The batches of the epoch.
    ///
    /// # Returns
    /// The statistics of the epoch, or an error if a batch is malformed, there are no batches
    /// or the training diverged.
    pub fn train_epoch<'a, I>(
        &mut self,
        network: &mut Sequential,
        batches: I,
    ) -> Result<EpochStats>
    where
        I: IntoIterator<Item = Batch<'a>>,
    {
        let epoch = self.epoch;
        let mut total_loss = 0.;
        let mut nbatches = 0;
        let mut samples = 0;

        for (batch_idx, batch) in batches.into_iter().enumerate() {
            let loss = self.step(network, batch, batch_idx)?;
            debug!(epoch = epoch, batch = batch_idx, loss = loss; "batch finished");

            total_loss += loss;
            nbatches += 1;
            samples += batch.len();
        }

        if nbatches == 0 {
            return Err(MlErr::InvalidConfig(format!(
                "epoch {epoch} had no batches to train with"
            )));
        }

        let stats = EpochStats::new(total_loss / nbatches as f32, nbatches, samples);
        info!(
            epoch = epoch,
            loss = stats.loss(),
            batches = nbatches,
            samples = samples;
            "epoch finished"
        );

        self.epoch += 1;
        Ok(stats)
    }

    /// Performs the configured amount of epochs over `dataset`, reshuffling it before each one.
    ///
    /// # Returns
    /// The statistics of every epoch, or the first error found.
    pub fn fit(
        &mut self,
        network: &mut Sequential,
        dataset: &mut Dataset,
    ) -> Result<Vec<EpochStats>> {
        let epochs = self.epochs.get();
        let mut stats = Vec::with_capacity(epochs);

        for _ in 0..epochs {
            dataset.shuffle(&mut self.rng);
            let epoch_stats = self.train_epoch(network, dataset.batches(self.batch_size))?;
            stats.push(epoch_stats);
        }

        Ok(stats)
    }

    fn step(
        &mut self,
        network: &mut Sequential,
        batch: Batch<'_>,
        batch_idx: usize,
    ) -> Result<f32> {
        let diverged = MlErr::NumericInstability {
            epoch: self.epoch,
            batch: batch_idx,
        };

        network.zero_grad();
        let y_pred = network.forward_train(batch.x)?;

        let loss = self.loss_fn.loss(y_pred.view(), batch.labels)?;
        if !loss.is_finite() {
            return Err(diverged);
        }

        let d = self.loss_fn.loss_prime(y_pred.view(), batch.labels)?;
        network.backward(d)?;
        network.optimize(&mut self.optimizer)?;

        if !network.is_finite() {
            return Err(diverged);
        }

        Ok(loss)
    }
}
