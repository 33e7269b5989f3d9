use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{MlErr, Result};

/// The specification for the hidden layers' `ActFn`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFnSpec {
    #[default]
    Relu,
    Sigmoid,
}

/// The specification for the initial parameter distribution of every dense layer.
///
/// `FanInUniform` samples weights and biases from `U(-1/sqrt(fan_in), 1/sqrt(fan_in))`. The fan
/// based variants (`XavierUniform`, `Kaiming`) only shape the weights and start biases at zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitSpec {
    #[default]
    FanInUniform,
    Const {
        value: f32,
    },
    Uniform {
        low: f32,
        high: f32,
    },
    Normal {
        mean: f32,
        std_dev: f32,
    },
    XavierUniform,
    Kaiming,
}

/// The specification for the `Optimizer` trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    Adam {
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    },
    GradientDescent {
        learning_rate: f32,
    },
    GradientDescentWithMomentum {
        learning_rate: f32,
        momentum: f32,
    },
}

impl Default for OptimizerSpec {
    fn default() -> Self {
        Self::Adam {
            learning_rate: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

/// Everything needed to build and train a classifier.
///
/// Missing fields take the values of the reference digit classifier: 28x28 inputs, three
/// hidden layers of 64 units, 10 classes, batches of 10 and 3 epochs of Adam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub input_size: usize,
    pub hidden: Vec<usize>,
    pub classes: usize,
    pub activation: ActFnSpec,
    pub init: InitSpec,
    pub optimizer: OptimizerSpec,
    pub batch_size: NonZeroUsize,
    pub epochs: NonZeroUsize,
    pub seed: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            input_size: 28 * 28,
            hidden: vec![64, 64, 64],
            classes: 10,
            activation: ActFnSpec::default(),
            init: InitSpec::default(),
            optimizer: OptimizerSpec::default(),
            batch_size: NonZeroUsize::new(10).unwrap_or(NonZeroUsize::MIN),
            epochs: NonZeroUsize::new(3).unwrap_or(NonZeroUsize::MIN),
            seed: 0,
        }
    }
}

impl ClassifierConfig {
    /// Returns every layer boundary width, from the input to the classes.
    pub fn widths(&self) -> Vec<usize> {
        let mut widths = Vec::with_capacity(self.hidden.len() + 2);
        widths.push(self.input_size);
        widths.extend(&self.hidden);
        widths.push(self.classes);
        widths
    }

    /// Checks that the configuration describes a trainable classifier.
    ///
    /// # Returns
    /// An `InvalidConfig` error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(invalid("input_size must be greater than 0"));
        }

        if self.classes == 0 {
            return Err(invalid("classes must be greater than 0"));
        }

        if let Some(i) = self.hidden.iter().position(|&width| width == 0) {
            return Err(MlErr::InvalidConfig(format!(
                "hidden layer {i} must have at least one unit"
            )));
        }

        match self.optimizer {
            OptimizerSpec::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => {
                check_learning_rate(learning_rate)?;
                check_decay("beta1", beta1)?;
                check_decay("beta2", beta2)?;
                if !(epsilon.is_finite() && epsilon > 0.) {
                    return Err(invalid("epsilon must be a positive number"));
                }
            }
            OptimizerSpec::GradientDescent { learning_rate } => {
                check_learning_rate(learning_rate)?;
            }
            OptimizerSpec::GradientDescentWithMomentum {
                learning_rate,
                momentum,
            } => {
                check_learning_rate(learning_rate)?;
                check_decay("momentum", momentum)?;
            }
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> MlErr {
    MlErr::InvalidConfig(msg.into())
}

fn check_learning_rate(learning_rate: f32) -> Result<()> {
    if !(learning_rate.is_finite() && learning_rate > 0.) {
        return Err(MlErr::InvalidConfig(format!(
            "learning_rate must be a positive number, got {learning_rate}"
        )));
    }

    Ok(())
}

fn check_decay(name: &str, value: f32) -> Result<()> {
    if !(0.0..1.0).contains(&value) {
        return Err(MlErr::InvalidConfig(format!(
            "{name} must be in [0, 1), got {value}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_network() {
        let config = ClassifierConfig::default();

        assert_eq!(config.widths(), [784, 64, 64, 64, 10]);
        assert_eq!(config.batch_size.get(), 10);
        assert_eq!(config.epochs.get(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let json = r#"{ "hidden": [8, 8], "input_size": 4, "classes": 2 }"#;

        let config: ClassifierConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.widths(), [4, 8, 8, 2]);
        assert_eq!(config.optimizer, OptimizerSpec::default());
        assert_eq!(config.init, InitSpec::FanInUniform);
    }

    #[test]
    fn enums_are_snake_case() {
        let json = r#"{
            "activation": "sigmoid",
            "init": { "const": { "value": 0.0 } },
            "optimizer": { "gradient_descent_with_momentum": { "learning_rate": 0.1, "momentum": 0.9 } }
        }"#;

        let config: ClassifierConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.activation, ActFnSpec::Sigmoid);
        assert_eq!(config.init, InitSpec::Const { value: 0.0 });
        assert_eq!(
            config.optimizer,
            OptimizerSpec::GradientDescentWithMomentum {
                learning_rate: 0.1,
                momentum: 0.9
            }
        );
    }

    #[test]
    fn zero_batch_size_is_rejected_while_parsing() {
        let json = r#"{ "batch_size": 0 }"#;
        assert!(serde_json::from_str::<ClassifierConfig>(json).is_err());
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut config = ClassifierConfig {
            hidden: vec![64, 0],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(MlErr::InvalidConfig(_))));

        config.hidden = vec![64];
        config.optimizer = OptimizerSpec::Adam {
            learning_rate: 1e-3,
            beta1: 1.0,
            beta2: 0.999,
            epsilon: 1e-8,
        };
        assert!(matches!(config.validate(), Err(MlErr::InvalidConfig(_))));

        config.optimizer = OptimizerSpec::GradientDescent {
            learning_rate: f32::NAN,
        };
        assert!(matches!(config.validate(), Err(MlErr::InvalidConfig(_))));
    }
}
