use ndarray::prelude::*;

use crate::{MlErr, Result};

/// Row-wise `log_softmax`, the output layer of the classifier.
///
/// Each row is normalized independently into log-probabilities. The row maximum is subtracted
/// before exponentiating so the result stays finite for any finite input.
#[derive(Debug, Clone)]
pub struct LogSoftmax {
    dim: usize,

    // Forward metadata
    y: Array2<f32>,
}

impl LogSoftmax {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            y: Array2::zeros((0, dim)),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn forward(&self, z: ArrayView2<f32>) -> Result<Array2<f32>> {
        if z.ncols() != self.dim {
            return Err(MlErr::ShapeMismatch {
                what: "log softmax width",
                got: z.ncols(),
                expected: self.dim,
            });
        }

        Ok(log_softmax(z))
    }

    /// Same as `forward` but keeps the output, its exponential is the softmax `backward` needs.
    pub fn forward_train(&mut self, z: ArrayView2<f32>) -> Result<Array2<f32>> {
        let y = self.forward(z)?;
        self.y = y.clone();
        Ok(y)
    }

    /// Maps `dL/dy` into `dL/dz` with `dz = d - softmax(z) * sum(d)`, row by row.
    pub fn backward(&mut self, mut d: Array2<f32>) -> Result<Array2<f32>> {
        if d.dim() != self.y.dim() {
            return Err(MlErr::ShapeMismatch {
                what: "log softmax delta",
                got: d.nrows(),
                expected: self.y.nrows(),
            });
        }

        for (mut d_row, y_row) in d.rows_mut().into_iter().zip(self.y.rows()) {
            let total = d_row.sum();
            d_row.zip_mut_with(&y_row, |d, &y| *d -= y.exp() * total);
        }

        Ok(d)
    }
}

/// Numerically stable `log_softmax` over the rows of `z`.
pub fn log_softmax(z: ArrayView2<f32>) -> Array2<f32> {
    let mut y = z.to_owned();

    for mut row in y.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        let log_sum = row.iter().map(|&v| (v - max).exp()).sum::<f32>().ln() + max;
        row.mapv_inplace(|v| v - log_sum);
    }

    y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_probability_distributions() {
        let z = array![[1., 2., 3.], [-5., 0., 5.], [0., 0., 0.]];

        let y = log_softmax(z.view());

        for row in y.rows() {
            let total: f32 = row.iter().map(|v| v.exp()).sum();
            assert!((total - 1.).abs() < 1e-6, "row sums to {total}");
        }
        assert!((y[[2, 0]] - (1f32 / 3.).ln()).abs() < 1e-6);
    }

    #[test]
    fn large_logits_stay_finite() {
        let z = array![[1000., 999., -1000.]];

        let y = log_softmax(z.view());

        assert!(y.iter().all(|v| v.is_finite()));
        assert!(y[[0, 0]] > y[[0, 1]]);
    }

    #[test]
    fn backward_of_uniform_output() {
        let mut layer = LogSoftmax::new(2);
        layer.forward_train(array![[0., 0.]].view()).unwrap();

        // softmax = [0.5, 0.5], sum(d) = -1
        let dz = layer.backward(array![[-1., 0.]]).unwrap();

        assert!((dz[[0, 0]] + 0.5).abs() < 1e-6);
        assert!((dz[[0, 1]] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rejects_wrong_width() {
        let layer = LogSoftmax::new(3);
        assert!(layer.forward(array![[0., 0.]].view()).is_err());
    }
}
