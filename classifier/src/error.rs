use std::{
    error::Error,
    fmt::{self, Display},
};

use crate::initialization::RandErr;

/// The result type used in the entire classifier crate.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The classifier's error type.
#[derive(Debug)]
pub enum MlErr {
    /// A width or length disagrees with what a layer, the loss or the dataset expects.
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A label is not a valid class index.
    LabelOutOfRange { label: usize, classes: usize },
    /// The loss or a parameter stopped being finite while training.
    NumericInstability { epoch: usize, batch: usize },
    /// The configuration can't describe a working classifier.
    InvalidConfig(String),
    /// The parameter initialization distribution is invalid.
    Init(RandErr),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a shape mismatch for {what}, got {got} and expected {expected}"
            ),
            MlErr::LabelOutOfRange { label, classes } => write!(
                f,
                "Label {label} is out of range, there are only {classes} classes"
            ),
            MlErr::NumericInstability { epoch, batch } => write!(
                f,
                "The training diverged to a non finite value at epoch {epoch}, batch {batch}"
            ),
            MlErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            MlErr::Init(e) => write!(f, "failed to initialize parameters: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Init(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RandErr> for MlErr {
    fn from(value: RandErr) -> Self {
        Self::Init(value)
    }
}
