use std::fmt;

/// Counters and the mean loss of one training epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochStats {
    loss: f32,
    batches: usize,
    samples: usize,
}

impl EpochStats {
    /// Creates a new `EpochStats`.
    ///
    /// # Arguments
    /// * `loss` - The mean of the batch losses.
    /// * `batches` - Number of batches processed during the epoch.
    /// * `samples` - Total number of samples processed during the epoch.
    pub fn new(loss: f32, batches: usize, samples: usize) -> Self {
        Self {
            loss,
            batches,
            samples,
        }
    }

    /// Returns the mean of the batch losses of the epoch.
    pub fn loss(&self) -> f32 {
        self.loss
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn samples(&self) -> usize {
        self.samples
    }
}

impl fmt::Display for EpochStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loss {:.6} over {} batches ({} samples)",
            self.loss, self.batches, self.samples
        )
    }
}
