use std::fmt;

use ndarray::{Array2, ArrayView2};

use super::layers::Layer;
use crate::{MlErr, Result, initialization::ParamGen, optimization::Optimizer};

/// A sequential network: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
///
/// The network owns a single flat parameter buffer and a gradient buffer of the same length, each
/// layer reads its own contiguous slice of them in order.
#[derive(Debug, Clone)]
pub struct Sequential {
    layers: Vec<Layer>,
    params: Vec<f32>,
    grad: Vec<f32>,
}

impl Sequential {
    /// Creates a new `Sequential`, drawing its initial parameters from `param_gen`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    /// * `param_gen` - The generator of the initial parameters.
    ///
    /// # Returns
    /// A new `Sequential` or an error if the layers don't chain or the generator runs dry.
    pub fn new<I, G>(layers: I, param_gen: &mut G) -> Result<Self>
    where
        I: IntoIterator<Item = Layer>,
        G: ParamGen + ?Sized,
    {
        let layers: Vec<_> = layers.into_iter().collect();
        let size = validate_layers(&layers)?;

        let params = match size {
            0 => Vec::new(),
            _ => param_gen.sample(size).unwrap_or_default(),
        };

        Self::with_params(layers, params)
    }

    /// Creates a new `Sequential` from already known parameters.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    /// * `params` - The flat parameter buffer, one slice per layer in order.
    pub fn with_params<I>(layers: I, params: Vec<f32>) -> Result<Self>
    where
        I: IntoIterator<Item = Layer>,
    {
        let layers: Vec<_> = layers.into_iter().collect();
        let size = validate_layers(&layers)?;

        if params.len() != size {
            return Err(MlErr::ShapeMismatch {
                what: "params",
                got: params.len(),
                expected: size,
            });
        }

        Ok(Self {
            layers,
            grad: vec![0.; size],
            params,
        })
    }

    /// Returns the amount of parameters in the network.
    pub fn size(&self) -> usize {
        self.params.len()
    }

    /// Returns the expected width of every input row.
    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |layer| layer.dim().0)
    }

    /// Returns the width of every output row, the amount of classes.
    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.dim().1)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    pub fn grad(&self) -> &[f32] {
        &self.grad
    }

    /// Makes a forward pass through the network, without recording anything.
    ///
    /// # Arguments
    /// * `x` - A batch of inputs, one per row.
    ///
    /// # Returns
    /// The output for every row of the batch or an error if the input width is wrong.
    pub fn forward(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(x)?;

        let mut offset = 0;
        let mut out: Option<Array2<f32>> = None;

        for layer in &self.layers {
            let params = &self.params[offset..offset + layer.size()];
            offset += layer.size();

            out = Some(match &out {
                Some(a) => layer.forward(params, a.view())?,
                None => layer.forward(params, x)?,
            });
        }

        Ok(out.unwrap_or_else(|| x.to_owned()))
    }

    /// Makes a forward pass through the network, letting every layer keep what it needs for
    /// `backward`.
    pub fn forward_train(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(x)?;

        let Self { layers, params, .. } = self;
        let mut offset = 0;
        let mut out: Option<Array2<f32>> = None;

        for layer in layers.iter_mut() {
            let size = layer.size();
            let params = &params[offset..offset + size];
            offset += size;

            out = Some(match &out {
                Some(a) => layer.forward_train(params, a.view())?,
                None => layer.forward_train(params, x)?,
            });
        }

        Ok(out.unwrap_or_else(|| x.to_owned()))
    }

    /// Backpropagates the derivative of the loss with respect to the network's output, writing
    /// the gradient of every parameter.
    ///
    /// Must follow a `forward_train` over the same batch.
    pub fn backward(&mut self, d_out: Array2<f32>) -> Result<()> {
        let Self {
            layers,
            params,
            grad,
        } = self;

        let mut end = params.len();
        let mut d = d_out;

        for layer in layers.iter_mut().rev() {
            let start = end - layer.size();
            d = layer.backward(&params[start..end], &mut grad[start..end], d)?;
            end = start;
        }

        Ok(())
    }

    pub fn zero_grad(&mut self) {
        self.grad.fill(0.);
    }

    /// Applies one optimizer step with the current gradient.
    pub fn optimize<O: Optimizer + ?Sized>(&mut self, optimizer: &mut O) -> Result<()> {
        optimizer.update_params(&mut self.params, &self.grad)
    }

    /// Whether every parameter is still a finite number.
    pub fn is_finite(&self) -> bool {
        self.params.iter().all(|p| p.is_finite())
    }

    fn check_input(&self, x: ArrayView2<f32>) -> Result<()> {
        if x.ncols() != self.input_size() {
            return Err(MlErr::ShapeMismatch {
                what: "input",
                got: x.ncols(),
                expected: self.input_size(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for Sequential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sequential(")?;
        for (i, layer) in self.layers.iter().enumerate() {
            writeln!(f, "  ({i}): {layer}")?;
        }
        write!(f, ") with {} parameters", self.size())
    }
}

/// Checks that the layers chain, returning the amount of parameters they need.
fn validate_layers(layers: &[Layer]) -> Result<usize> {
    if layers.is_empty() {
        return Err(MlErr::InvalidConfig(
            "a network must have at least one layer".into(),
        ));
    }

    for (i, pair) in layers.windows(2).enumerate() {
        let (_, prev_out) = pair[0].dim();
        let (curr_in, _) = pair[1].dim();

        if prev_out != curr_in {
            return Err(MlErr::InvalidConfig(format!(
                "layer {}: input size ({curr_in}) does not match previous layer output size ({prev_out})",
                i + 1
            )));
        }
    }

    Ok(layers.iter().map(Layer::size).sum())
}
