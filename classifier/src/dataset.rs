use std::num::NonZeroUsize;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::{Rng, seq::SliceRandom};

use crate::{MlErr, Result};

/// A single labeled input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<'a> {
    pub x: ArrayView1<'a, f32>,
    pub label: usize,
}

/// Borrowed batch view, one input per row of `x` and its label at the same index of `labels`.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    pub x: ArrayView2<'a, f32>,
    pub labels: ArrayView1<'a, usize>,
}

impl<'a> Batch<'a> {
    /// Creates a new `Batch`.
    ///
    /// # Returns
    /// An error if the amount of rows and labels disagree.
    pub fn new(x: ArrayView2<'a, f32>, labels: ArrayView1<'a, usize>) -> Result<Self> {
        if x.nrows() != labels.len() {
            return Err(MlErr::ShapeMismatch {
                what: "labels",
                got: labels.len(),
                expected: x.nrows(),
            });
        }

        Ok(Self { x, labels })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// An in-memory labeled dataset: an `N x F` input matrix and its `N` labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    x: Array2<f32>,
    labels: Array1<usize>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `x` - The inputs, one per row.
    /// * `labels` - The class index of every row.
    ///
    /// # Returns
    /// An error if the dataset is empty or the amount of rows and labels disagree.
    pub fn new(x: Array2<f32>, labels: Vec<usize>) -> Result<Self> {
        if x.nrows() != labels.len() {
            return Err(MlErr::ShapeMismatch {
                what: "labels",
                got: labels.len(),
                expected: x.nrows(),
            });
        }

        if labels.is_empty() {
            return Err(MlErr::InvalidConfig("a dataset can't be empty".into()));
        }

        Ok(Self {
            x,
            labels: Array1::from(labels),
        })
    }

    /// Creates a new `Dataset` out of a flat row major buffer of `features` wide inputs.
    pub fn from_flat(data: Vec<f32>, features: usize, labels: Vec<usize>) -> Result<Self> {
        let expected = features * labels.len();
        let x = Array2::from_shape_vec((labels.len(), features), data).map_err(|e| {
            MlErr::InvalidConfig(format!("inputs don't fit {expected} values: {e}"))
        })?;

        Self::new(x, labels)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The width of every input.
    #[inline]
    pub fn features(&self) -> usize {
        self.x.ncols()
    }

    pub fn x(&self) -> ArrayView2<'_, f32> {
        self.x.view()
    }

    pub fn labels(&self) -> ArrayView1<'_, usize> {
        self.labels.view()
    }

    /// Returns the sample at `idx`, if any.
    pub fn get(&self, idx: usize) -> Option<Sample<'_>> {
        let label = *self.labels.get(idx)?;
        Some(Sample {
            x: self.x.row(idx),
            label,
        })
    }

    /// Permutes the rows of the dataset, every label follows its row.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut perm: Vec<_> = (0..self.len()).collect();
        perm.shuffle(rng);

        self.x = self.x.select(Axis(0), &perm);
        self.labels = self.labels.select(Axis(0), &perm);
    }

    /// Splits the dataset in order into batches of `batch_size` samples, the last one holding
    /// whatever is left.
    pub fn batches(&self, batch_size: NonZeroUsize) -> impl Iterator<Item = Batch<'_>> {
        let size = batch_size.get();

        self.x
            .axis_chunks_iter(Axis(0), size)
            .zip(self.labels.axis_chunks_iter(Axis(0), size))
            .map(|(x, labels)| Batch { x, labels })
    }
}
