use std::fmt;

use ndarray::{Array2, ArrayView2};

use super::{Dense, LogSoftmax};
use crate::{Result, arch::activations::ActFn};

/// One step of a `Sequential` network.
#[derive(Debug, Clone)]
pub enum Layer {
    Dense(Dense),
    LogSoftmax(LogSoftmax),
}

impl Layer {
    pub fn dense(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self::Dense(Dense::new(dim, act_fn))
    }

    pub fn log_softmax(dim: usize) -> Self {
        Self::LogSoftmax(LogSoftmax::new(dim))
    }

    /// Returns the amount of parameters this layer reads from the flat buffer.
    pub fn size(&self) -> usize {
        match self {
            Self::Dense(l) => l.size(),
            Self::LogSoftmax(_) => 0,
        }
    }

    /// Returns the input and output widths of this layer.
    pub fn dim(&self) -> (usize, usize) {
        match self {
            Self::Dense(l) => l.dim(),
            Self::LogSoftmax(l) => (l.dim(), l.dim()),
        }
    }

    pub fn forward(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        match self {
            Self::Dense(l) => l.forward(params, x),
            Self::LogSoftmax(l) => l.forward(x),
        }
    }

    pub fn forward_train(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        match self {
            Self::Dense(l) => l.forward_train(params, x),
            Self::LogSoftmax(l) => l.forward_train(x),
        }
    }

    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        match self {
            Self::Dense(l) => l.backward(params, grad, d),
            Self::LogSoftmax(l) => l.backward(d),
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dense(l) => {
                let (dim_in, dim_out) = l.dim();
                write!(f, "Dense({dim_in} -> {dim_out}")?;
                if let Some(act_fn) = l.act_fn() {
                    write!(f, ", {act_fn}")?;
                }
                write!(f, ")")
            }
            Self::LogSoftmax(l) => write!(f, "LogSoftmax({})", l.dim()),
        }
    }
}
