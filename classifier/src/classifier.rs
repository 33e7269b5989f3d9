use std::fmt;

use ndarray::{Array2, ArrayView2};
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    Result,
    arch::{
        Sequential, SequentialBuilder,
        loss::{LossFn, Nll},
    },
    config::ClassifierConfig,
    dataset::{Batch, Dataset},
    evaluation::{self, Evaluation},
    optimization::{Optimizer, OptimizerBuilder},
    training::{EpochStats, Trainer},
};

/// A feed-forward classifier: the network, its optimizer and its training loop, all built out
/// of a single `ClassifierConfig`.
pub struct Classifier {
    config: ClassifierConfig,
    network: Sequential,
    trainer: Trainer<Box<dyn Optimizer>, Nll, StdRng>,
}

impl Classifier {
    /// Creates a new `Classifier` with freshly initialized parameters.
    ///
    /// # Arguments
    /// * `config` - The classifier configuration, its seed drives both the initialization and
    ///   the per epoch shuffling.
    ///
    /// # Returns
    /// A new classifier or an error if the configuration is invalid.
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        let network = SequentialBuilder::new(&config).build()?;
        let optimizer = OptimizerBuilder::build(&config.optimizer, network.size());
        let trainer = Trainer::new(
            optimizer,
            Nll::new(),
            config.batch_size,
            config.epochs,
            StdRng::seed_from_u64(config.seed),
        );

        Ok(Self {
            config,
            network,
            trainer,
        })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn network(&self) -> &Sequential {
        &self.network
    }

    pub fn params(&self) -> &[f32] {
        self.network.params()
    }

    /// Returns the log-probabilities of every class for every row of `x`.
    pub fn forward(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.network.forward(x)
    }

    /// Returns the most likely class of every row of `x`.
    pub fn predict(&self, x: ArrayView2<f32>) -> Result<Vec<usize>> {
        evaluation::predict(&self.network, x)
    }

    /// Computes the loss of a batch without training on it.
    pub fn loss(&self, batch: Batch<'_>) -> Result<f32> {
        let y_pred = self.network.forward(batch.x)?;
        self.trainer.loss_fn().loss(y_pred.view(), batch.labels)
    }

    /// Trains for one epoch over the given batches.
    pub fn train_epoch<'a, I>(&mut self, batches: I) -> Result<EpochStats>
    where
        I: IntoIterator<Item = Batch<'a>>,
    {
        self.trainer.train_epoch(&mut self.network, batches)
    }

    /// Trains for the configured amount of epochs, reshuffling `dataset` before every one.
    pub fn fit(&mut self, dataset: &mut Dataset) -> Result<Vec<EpochStats>> {
        self.trainer.fit(&mut self.network, dataset)
    }

    /// Measures the accuracy over the given batches, leaving the parameters untouched.
    pub fn evaluate<'a, I>(&self, batches: I) -> Result<Evaluation>
    where
        I: IntoIterator<Item = Batch<'a>>,
    {
        evaluation::evaluate(&self.network, batches)
    }
}

impl fmt::Display for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.network, f)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::MlErr;

    fn small_config() -> ClassifierConfig {
        ClassifierConfig {
            input_size: 4,
            hidden: vec![6],
            classes: 3,
            ..Default::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ClassifierConfig {
            classes: 0,
            ..Default::default()
        };

        assert!(matches!(
            Classifier::new(config),
            Err(MlErr::InvalidConfig(_))
        ));
    }

    #[test]
    fn summary_is_the_network_summary() {
        let classifier = Classifier::new(small_config()).unwrap();
        assert_eq!(classifier.to_string(), classifier.network().to_string());
    }

    #[test]
    fn evaluation_leaves_params_untouched() {
        let classifier = Classifier::new(small_config()).unwrap();
        let before = classifier.params().to_vec();

        let ds = Dataset::new(Array2::ones((5, 4)), vec![0, 1, 2, 0, 1]).unwrap();
        let eval = classifier
            .evaluate(ds.batches(classifier.config().batch_size))
            .unwrap();

        assert_eq!(eval.total(), 5);
        assert_eq!(classifier.params(), before.as_slice());
    }

    #[test]
    fn fit_runs_every_configured_epoch() {
        let mut classifier = Classifier::new(ClassifierConfig {
            batch_size: std::num::NonZeroUsize::new(2).unwrap(),
            ..small_config()
        })
        .unwrap();
        let mut ds = Dataset::new(Array2::eye(4), vec![0, 1, 2, 0]).unwrap();

        let stats = classifier.fit(&mut ds).unwrap();

        assert_eq!(stats.len(), 3);
        assert!(stats.iter().all(|s| s.batches() == 2 && s.samples() == 4));
    }
}
