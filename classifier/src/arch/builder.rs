use std::{cell::RefCell, rc::Rc};

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{Sequential, activations::ActFn, layers::Layer};
use crate::{
    Result,
    config::{ActFnSpec, ClassifierConfig, InitSpec},
    initialization::{ChainedParamGen, ConstParamGen, ParamGen, RandParamGen},
};

/// Builds a `Sequential` classifier network out of a `ClassifierConfig`.
///
/// Every pair of adjacent widths becomes a dense layer, hidden layers get the configured
/// activation, the last dense layer is left linear and a `LogSoftmax` closes the network.
pub struct SequentialBuilder<'a> {
    config: &'a ClassifierConfig,
}

impl<'a> SequentialBuilder<'a> {
    pub fn new(config: &'a ClassifierConfig) -> Self {
        Self { config }
    }

    /// Builds the network with a parameter generator seeded from the configuration.
    pub fn build(&self) -> Result<Sequential> {
        let rng = Rc::new(RefCell::new(StdRng::seed_from_u64(self.config.seed)));
        self.build_with_rng(rng)
    }

    /// Builds the network drawing the initial parameters from the given generator.
    ///
    /// # Arguments
    /// * `rng` - The random number generator shared by all the layers.
    ///
    /// # Returns
    /// The network or an error if the configuration or the initialization is invalid.
    pub fn build_with_rng<R: Rng + 'static>(
        &self,
        rng: Rc<RefCell<R>>,
    ) -> Result<Sequential> {
        self.config.validate()?;

        let widths = self.config.widths();
        let act_fn = match self.config.activation {
            ActFnSpec::Relu => ActFn::relu(),
            ActFnSpec::Sigmoid => ActFn::sigmoid(),
        };

        let ndense = widths.len() - 1;
        let mut layers = Vec::with_capacity(ndense + 1);
        let mut param_gens = Vec::with_capacity(ndense * 2);

        for (i, dim) in widths.windows(2).map(|w| (w[0], w[1])).enumerate() {
            let act_fn = (i + 1 < ndense).then_some(act_fn);
            layers.push(Layer::dense(dim, act_fn));

            let (weights, biases) = self.layer_param_gens(rng.clone(), dim)?;
            param_gens.push(weights);
            param_gens.push(biases);
        }

        layers.push(Layer::log_softmax(self.config.classes));
        Sequential::new(layers, &mut ChainedParamGen::new(param_gens))
    }

    fn layer_param_gens<R: Rng + 'static>(
        &self,
        rng: Rc<RefCell<R>>,
        (fan_in, fan_out): (usize, usize),
    ) -> Result<(Box<dyn ParamGen>, Box<dyn ParamGen>)> {
        let nweights = fan_in * fan_out;

        let gens: (Box<dyn ParamGen>, Box<dyn ParamGen>) = match self.config.init {
            InitSpec::FanInUniform => (
                Box::new(RandParamGen::fan_in_uniform(rng.clone(), nweights, fan_in)?),
                Box::new(RandParamGen::fan_in_uniform(rng, fan_out, fan_in)?),
            ),
            InitSpec::Const { value } => (
                Box::new(ConstParamGen::new(value, nweights)),
                Box::new(ConstParamGen::new(value, fan_out)),
            ),
            InitSpec::Uniform { low, high } => (
                Box::new(RandParamGen::uniform(rng.clone(), nweights, low, high)?),
                Box::new(RandParamGen::uniform(rng, fan_out, low, high)?),
            ),
            InitSpec::Normal { mean, std_dev } => (
                Box::new(RandParamGen::normal(rng.clone(), nweights, mean, std_dev)?),
                Box::new(RandParamGen::normal(rng, fan_out, mean, std_dev)?),
            ),
            InitSpec::XavierUniform => (
                Box::new(RandParamGen::xavier_uniform(rng, nweights, fan_in, fan_out)?),
                Box::new(ConstParamGen::new(0., fan_out)),
            ),
            InitSpec::Kaiming => (
                Box::new(RandParamGen::kaiming(rng, nweights, fan_in)?),
                Box::new(ConstParamGen::new(0., fan_out)),
            ),
        };

        Ok(gens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MlErr;

    fn config(hidden: Vec<usize>) -> ClassifierConfig {
        ClassifierConfig {
            input_size: 4,
            hidden,
            classes: 3,
            ..Default::default()
        }
    }

    #[test]
    fn reference_network_shape() {
        let net = SequentialBuilder::new(&ClassifierConfig::default())
            .build()
            .unwrap();

        assert_eq!(net.input_size(), 784);
        assert_eq!(net.output_size(), 10);
        assert_eq!(net.layers().len(), 5);
        assert_eq!(net.size(), 785 * 64 + 65 * 64 + 65 * 64 + 65 * 10);
    }

    #[test]
    fn hidden_layers_are_data() {
        for hidden in [vec![], vec![5], vec![5, 6, 7, 8]] {
            let nhidden = hidden.len();
            let net = SequentialBuilder::new(&config(hidden)).build().unwrap();

            // one dense per hidden layer, the output dense and the log softmax
            assert_eq!(net.layers().len(), nhidden + 2);
            assert_eq!(net.input_size(), 4);
            assert_eq!(net.output_size(), 3);
        }
    }

    #[test]
    fn only_hidden_layers_are_activated() {
        let net = SequentialBuilder::new(&config(vec![5, 6])).build().unwrap();

        let summary = net.to_string();
        assert!(summary.contains("(0): Dense(4 -> 5, ReLU)"));
        assert!(summary.contains("(1): Dense(5 -> 6, ReLU)"));
        assert!(summary.contains("(2): Dense(6 -> 3)\n"));
        assert!(summary.contains("(3): LogSoftmax(3)"));
    }

    #[test]
    fn same_seed_same_params() {
        let a = SequentialBuilder::new(&config(vec![5])).build().unwrap();
        let b = SequentialBuilder::new(&config(vec![5])).build().unwrap();
        let c = SequentialBuilder::new(&ClassifierConfig {
            seed: 1,
            ..config(vec![5])
        })
        .build()
        .unwrap();

        assert_eq!(a.params(), b.params());
        assert_ne!(a.params(), c.params());
    }

    #[test]
    fn const_init_fills_every_param() {
        let net = SequentialBuilder::new(&ClassifierConfig {
            init: InitSpec::Const { value: 0. },
            ..config(vec![5])
        })
        .build()
        .unwrap();

        assert!(net.params().iter().all(|&p| p == 0.));
    }

    #[test]
    fn kaiming_starts_biases_at_zero() {
        let net = SequentialBuilder::new(&ClassifierConfig {
            init: InitSpec::Kaiming,
            ..config(vec![])
        })
        .build()
        .unwrap();

        // a single 4 -> 3 layer: 12 weights then 3 biases
        assert_eq!(net.params()[12..], [0., 0., 0.]);
        assert!(net.params()[..12].iter().any(|&p| p != 0.));
    }

    #[test]
    fn invalid_distribution_is_an_init_error() {
        let err = SequentialBuilder::new(&ClassifierConfig {
            init: InitSpec::Uniform { low: 1., high: 0. },
            ..config(vec![5])
        })
        .build()
        .unwrap_err();

        assert!(matches!(err, MlErr::Init(_)));
    }
}
