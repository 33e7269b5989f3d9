use crate::{MlErr, Result};

/// Defines the strategy for updating the network's parameters based on calculated gradients.
///
/// The `Optimizer` trait is responsible for the mathematical transition of the parameters from
/// state `t` to `t+1`. Stateful optimizers keep one slot per parameter, so an instance belongs to
/// a single network.
pub trait Optimizer {
    /// Updates the parameters according to the algorithm's learning rule.
    ///
    /// # Arguments
    /// * `params` - The parameters that are going to be modified.
    /// * `grad` - The gradient of the loss with respect to `params`.
    ///
    /// # Returns
    /// An error if `params`, `grad` or the optimizer's own state differ in length.
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()>;
}

impl<T: Optimizer + ?Sized> Optimizer for Box<T> {
    fn update_params(&mut self, params: &mut [f32], grad: &[f32]) -> Result<()> {
        (**self).update_params(params, grad)
    }
}

/// Checks that a buffer has the length the update expects.
pub(super) fn check_len(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(MlErr::ShapeMismatch {
            what,
            got,
            expected,
        });
    }

    Ok(())
}
