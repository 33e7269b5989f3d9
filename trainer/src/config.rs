use std::{fs, path::Path};

use anyhow::{Context, Result};
use classifier::ClassifierConfig;
use serde::{Deserialize, Serialize};

use crate::dataset::DatasetSource;

/// Everything a training run needs, as read from its JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub model: ClassifierConfig,
    pub train: DatasetSource,
    #[serde(default)]
    pub test: Option<DatasetSource>,
    /// Push one random input through the untrained network before training.
    #[serde(default)]
    pub smoke_test: bool,
}

impl RunConfig {
    /// Loads a `RunConfig` from a JSON file, validating the model section.
    ///
    /// # Errors
    /// If the file can't be read or parsed, or the model configuration is invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read '{}'", path.display()))?;

        Self::from_json(&content)
            .with_context(|| format!("invalid run config '{}'", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.model.validate()?;
        Ok(config)
    }
}
