//! A feed-forward classifier trained with minibatch backpropagation.
//!
//! The network is a configurable stack of dense layers ending in a log-softmax, trained against
//! the negative log likelihood of the true labels.

pub mod arch;
mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod initialization;
pub mod optimization;
pub mod training;

pub use classifier::Classifier;
pub use config::ClassifierConfig;
pub use dataset::{Batch, Dataset, Sample};
pub use error::{MlErr, Result};
pub use evaluation::Evaluation;
pub use training::EpochStats;
