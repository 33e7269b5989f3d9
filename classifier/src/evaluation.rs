use std::fmt;

use ndarray::{ArrayView1, ArrayView2, Axis};

use crate::{MlErr, Result, arch::Sequential, dataset::Batch};

/// The outcome of classifying a set of labeled samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    correct: usize,
    total: usize,
}

impl Evaluation {
    /// Compares externally produced predictions against their labels.
    ///
    /// # Returns
    /// An error if the lengths disagree or there is nothing to compare.
    pub fn from_predictions(predictions: &[usize], labels: ArrayView1<usize>) -> Result<Self> {
        let correct = count_correct(predictions, labels, None)?;
        Self::new(correct, labels.len())
    }

    /// Same as `from_predictions`, but also checks every label is one of `classes` classes.
    ///
    /// # Returns
    /// A `LabelOutOfRange` error for the first label that isn't a class index.
    pub fn from_class_predictions(
        predictions: &[usize],
        labels: ArrayView1<usize>,
        classes: usize,
    ) -> Result<Self> {
        let correct = count_correct(predictions, labels, Some(classes))?;
        Self::new(correct, labels.len())
    }

    fn new(correct: usize, total: usize) -> Result<Self> {
        if total == 0 {
            return Err(MlErr::InvalidConfig("there are no samples to evaluate".into()));
        }

        Ok(Self { correct, total })
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// The fraction of correctly classified samples, in `[0, 1]`.
    pub fn accuracy(&self) -> f32 {
        self.correct as f32 / self.total as f32
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} correct ({:.2}%)",
            self.correct,
            self.total,
            self.accuracy() * 100.
        )
    }
}

/// Returns the index of the largest value of `row`, the first one on ties.
pub fn argmax(row: ArrayView1<f32>) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best, max), (i, &v)| {
            if v > max { (i, v) } else { (best, max) }
        })
        .0
}

/// Predicts the class of every row of `x`.
pub fn predict(network: &Sequential, x: ArrayView2<f32>) -> Result<Vec<usize>> {
    let y = network.forward(x)?;
    Ok(y.axis_iter(Axis(0)).map(argmax).collect())
}

/// Counts how many samples of the batches the network classifies correctly, only running the
/// inference forward.
pub fn evaluate<'a, I>(network: &Sequential, batches: I) -> Result<Evaluation>
where
    I: IntoIterator<Item = Batch<'a>>,
{
    let classes = network.output_size();
    let mut correct = 0;
    let mut total = 0;

    for batch in batches {
        let predictions = predict(network, batch.x)?;
        correct += count_correct(&predictions, batch.labels, Some(classes))?;
        total += batch.len();
    }

    Evaluation::new(correct, total)
}

fn count_correct(
    predictions: &[usize],
    labels: ArrayView1<usize>,
    classes: Option<usize>,
) -> Result<usize> {
    if predictions.len() != labels.len() {
        return Err(MlErr::ShapeMismatch {
            what: "predictions",
            got: predictions.len(),
            expected: labels.len(),
        });
    }

    if let Some(classes) = classes {
        if let Some(&label) = labels.iter().find(|&&label| label >= classes) {
            return Err(MlErr::LabelOutOfRange { label, classes });
        }
    }

    let correct = predictions
        .iter()
        .zip(labels)
        .filter(|(pred, label)| pred == label)
        .count();

    Ok(correct)
}
