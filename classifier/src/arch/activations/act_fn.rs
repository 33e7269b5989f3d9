use std::fmt;

use super::{Relu, Sigmoid};

/// The element-wise nonlinearity applied after a dense layer's affine transformation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActFn {
    Relu(Relu),
    Sigmoid(Sigmoid),
}

impl ActFn {
    pub fn relu() -> Self {
        Self::Relu(Relu)
    }

    pub fn sigmoid() -> Self {
        Self::Sigmoid(Sigmoid)
    }

    pub fn f(&self, x: f32) -> f32 {
        match self {
            Self::Relu(a) => a.f(x),
            Self::Sigmoid(a) => a.f(x),
        }
    }

    pub fn df(&self, x: f32) -> f32 {
        match self {
            Self::Relu(a) => a.df(x),
            Self::Sigmoid(a) => a.df(x),
        }
    }
}

impl fmt::Display for ActFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relu(_) => f.write_str("ReLU"),
            Self::Sigmoid(_) => f.write_str("Sigmoid"),
        }
    }
}
