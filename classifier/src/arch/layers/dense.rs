use ndarray::{Axis, linalg, prelude::*};

use crate::{MlErr, Result, arch::activations::ActFn};

/// A fully connected layer, `a = act_fn(x·W + b)`.
///
/// The layer doesn't own its parameters, it reads them from a slice of the network's flat
/// buffer laid out as `[W (dim_in x dim_out, row major), b (dim_out)]`, and writes its gradient
/// with the same layout.
#[derive(Debug, Clone)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,
    size: usize,

    // Forward metadata
    x: Array2<f32>,
    z: Array2<f32>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The input and output widths of the layer.
    /// * `act_fn` - The nonlinearity applied to the affine output, if any.
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self {
            dim,
            act_fn,
            size: (dim.0 + 1) * dim.1,
            x: Array2::zeros((0, dim.0)),
            z: Array2::zeros((0, dim.1)),
        }
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    pub fn act_fn(&self) -> Option<ActFn> {
        self.act_fn
    }

    /// Computes the layer's output without recording anything for a backward pass.
    ///
    /// # Arguments
    /// * `params` - This layer's slice of the parameters.
    /// * `x` - A batch of inputs, one per row.
    ///
    /// # Returns
    /// The activations of the batch, or an error if the input width is wrong.
    pub fn forward(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let z = self.affine(params, x)?;
        Ok(self.activate(z))
    }

    /// Same as `forward` but keeps the input and the pre-activations for `backward`.
    pub fn forward_train(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let z = self.affine(params, x)?;
        self.x = x.to_owned();
        self.z = z.clone();
        Ok(self.activate(z))
    }

    /// Propagates the loss derivative through the layer.
    ///
    /// # Arguments
    /// * `params` - This layer's slice of the parameters.
    /// * `grad` - This layer's slice of the gradient, it gets overwritten.
    /// * `d` - The derivative of the loss with respect to this layer's output.
    ///
    /// # Returns
    /// The derivative of the loss with respect to this layer's input.
    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        mut d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        if d.dim() != self.z.dim() {
            return Err(MlErr::ShapeMismatch {
                what: "dense delta",
                got: d.nrows(),
                expected: self.z.nrows(),
            });
        }

        if let Some(act_fn) = &self.act_fn {
            d.zip_mut_with(&self.z, |d, &z| *d *= act_fn.df(z));
        }

        let (mut dw, mut db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &self.x.t(), &d, 0.0, &mut dw);
        db.assign(&d.sum_axis(Axis(0)));

        let (w, _) = self.view_params(params)?;
        Ok(d.dot(&w.t()))
    }

    fn affine(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::ShapeMismatch {
                what: "dense input width",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        let (w, b) = self.view_params(params)?;
        let mut z = x.dot(&w);
        z += &b;
        Ok(z)
    }

    fn activate(&self, mut z: Array2<f32>) -> Array2<f32> {
        if let Some(act_fn) = &self.act_fn {
            z.mapv_inplace(|z| act_fn.f(z));
        }

        z
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    fn view_params<'a>(
        &self,
        params: &'a [f32],
    ) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        self.check_len("dense params", params.len())?;

        let (w_raw, b_raw) = params.split_at(self.size - self.dim.1);
        let weights =
            ArrayView2::from_shape(self.dim, w_raw).map_err(|_| self.mismatch(w_raw.len()))?;
        let biases = ArrayView1::from(b_raw);
        Ok((weights, biases))
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        self.check_len("dense grad", grad.len())?;

        let (dw_raw, db_raw) = grad.split_at_mut(self.size - self.dim.1);
        let len = dw_raw.len();
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw).map_err(|_| self.mismatch(len))?;
        let db = ArrayViewMut1::from(db_raw);
        Ok((dw, db))
    }

    fn check_len(&self, what: &'static str, got: usize) -> Result<()> {
        if got != self.size {
            return Err(MlErr::ShapeMismatch {
                what,
                got,
                expected: self.size,
            });
        }

        Ok(())
    }

    fn mismatch(&self, got: usize) -> MlErr {
        MlErr::ShapeMismatch {
            what: "dense weights",
            got,
            expected: self.dim.0 * self.dim.1,
        }
    }
}
