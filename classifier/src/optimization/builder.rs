use super::{Adam, GradientDescent, GradientDescentWithMomentum, Optimizer};
use crate::config::OptimizerSpec;

/// Builds optimizers from their specification.
pub struct OptimizerBuilder;

impl OptimizerBuilder {
    /// Builds an optimizer for a network of `len` parameters.
    ///
    /// # Arguments
    /// * `spec` - The optimizer specification.
    /// * `len` - The amount of parameters the optimizer will update.
    ///
    /// # Returns
    /// A boxed optimizer implementation.
    pub fn build(spec: &OptimizerSpec, len: usize) -> Box<dyn Optimizer> {
        match *spec {
            OptimizerSpec::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => Box::new(Adam::new(len, learning_rate, beta1, beta2, epsilon)),
            OptimizerSpec::GradientDescent { learning_rate } => {
                Box::new(GradientDescent::new(learning_rate))
            }
            OptimizerSpec::GradientDescentWithMomentum {
                learning_rate,
                momentum,
            } => Box::new(GradientDescentWithMomentum::new(
                len,
                learning_rate,
                momentum,
            )),
        }
    }
}
