use super::{Optimizer, optimizer::check_len};
use crate::Result;

/// Gradient descent optimization algorithm.
#[derive(Debug)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `update_params`.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for GradientDescent {
    /// Makes a step in the opposite direction of the gradient, with a length of
    /// `learning_rate`.
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        check_len("grad", grad.len(), params.len())?;
        let lr = self.learning_rate;

        for (w, g) in params.iter_mut().zip(grad) {
            *w -= lr * g;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_against_the_gradient() {
        let mut optimizer = GradientDescent::new(0.5);
        let mut params = [1., -1.];

        optimizer.update_params(&mut params, &[2., -4.]).unwrap();

        assert_eq!(params, [0., 1.]);
    }

    #[test]
    fn mismatched_grad_is_rejected() {
        let mut optimizer = GradientDescent::new(0.5);
        let mut params = [1., -1.];

        let err = optimizer.update_params(&mut params, &[2.]).unwrap_err();

        assert!(matches!(
            err,
            crate::MlErr::ShapeMismatch {
                what: "grad",
                got: 1,
                expected: 2
            }
        ));
        assert_eq!(params, [1., -1.]);
    }
}
