use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::Result;

/// A loss over a batch of class predictions and their true labels.
pub trait LossFn {
    /// Computes the scalar loss of the batch.
    fn loss(&self, y_pred: ArrayView2<f32>, labels: ArrayView1<usize>) -> Result<f32>;

    /// Computes the derivative of the loss with respect to every entry of `y_pred`.
    fn loss_prime(&self, y_pred: ArrayView2<f32>, labels: ArrayView1<usize>)
    -> Result<Array2<f32>>;
}
