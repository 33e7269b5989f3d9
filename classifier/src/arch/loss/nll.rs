use ndarray::{Array2, ArrayView1, ArrayView2};

use super::LossFn;
use crate::{MlErr, Result};

/// Negative log-likelihood, mean reduced over the batch.
///
/// Expects log-probabilities, so that `Nll` after a `LogSoftmax` is the usual cross entropy.
#[derive(Debug, Default, Clone, Copy)]
pub struct Nll;

impl Nll {
    /// Returns a new `Nll`.
    pub fn new() -> Self {
        Self
    }

    fn validate(&self, y_pred: ArrayView2<f32>, labels: ArrayView1<usize>) -> Result<()> {
        if y_pred.nrows() == 0 {
            return Err(MlErr::InvalidConfig("can't compute the loss of an empty batch".into()));
        }

        if labels.len() != y_pred.nrows() {
            return Err(MlErr::ShapeMismatch {
                what: "labels",
                got: labels.len(),
                expected: y_pred.nrows(),
            });
        }

        let classes = y_pred.ncols();
        match labels.iter().find(|&&label| label >= classes) {
            Some(&label) => Err(MlErr::LabelOutOfRange { label, classes }),
            None => Ok(()),
        }
    }
}

impl LossFn for Nll {
    fn loss(&self, y_pred: ArrayView2<f32>, labels: ArrayView1<usize>) -> Result<f32> {
        self.validate(y_pred, labels)?;

        let total: f32 = labels
            .iter()
            .enumerate()
            .map(|(i, &label)| y_pred[[i, label]])
            .sum();

        Ok(-total / y_pred.nrows() as f32)
    }

    fn loss_prime(
        &self,
        y_pred: ArrayView2<f32>,
        labels: ArrayView1<usize>,
    ) -> Result<Array2<f32>> {
        self.validate(y_pred, labels)?;

        let scale = -1. / y_pred.nrows() as f32;
        let mut d = Array2::zeros(y_pred.raw_dim());
        for (i, &label) in labels.iter().enumerate() {
            d[[i, label]] = scale;
        }

        Ok(d)
    }
}
