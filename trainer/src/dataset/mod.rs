mod csv;
mod idx;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail, ensure};
use classifier::Dataset;
use log::info;
use serde::{Deserialize, Serialize};

/// Where a dataset is read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum DatasetSource {
    /// A pair of MNIST style IDX files, pixels get scaled to `[0, 1]`.
    Idx { images: PathBuf, labels: PathBuf },
    /// One sample per line, the label first and the input values after it.
    Csv { path: PathBuf },
}

impl DatasetSource {
    /// Loads the dataset, checking it fits a classifier of `features` inputs and `classes`
    /// outputs.
    ///
    /// # Errors
    /// If the files can't be read or parsed, or the samples don't fit the classifier.
    pub fn load(&self, features: usize, classes: usize) -> Result<Dataset> {
        let dataset = match self {
            Self::Idx { images, labels } => {
                let images_raw = read(images)?;
                let labels_raw = read(labels)?;
                idx::parse(&images_raw, &labels_raw)
                    .with_context(|| format!("invalid IDX dataset '{}'", images.display()))?
            }
            Self::Csv { path } => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("cannot read '{}'", path.display()))?;
                csv::parse(&content)
                    .with_context(|| format!("invalid CSV dataset '{}'", path.display()))?
            }
        };

        check_fits(&dataset, features, classes)?;
        info!(
            samples = dataset.len(),
            features = dataset.features();
            "dataset loaded"
        );

        Ok(dataset)
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("cannot read '{}'", path.display()))
}

fn check_fits(dataset: &Dataset, features: usize, classes: usize) -> Result<()> {
    ensure!(
        dataset.features() == features,
        "samples have {} values but the classifier expects {features}",
        dataset.features()
    );

    if let Some(label) = dataset.labels().iter().find(|&&label| label >= classes) {
        bail!("label {label} is out of range, there are only {classes} classes");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;

    #[test]
    fn sources_are_tagged_by_format() {
        let json = r#"{ "format": "idx", "images": "a", "labels": "b" }"#;
        let source: DatasetSource = serde_json::from_str(json).unwrap();

        assert_eq!(
            source,
            DatasetSource::Idx {
                images: "a".into(),
                labels: "b".into()
            }
        );
    }

    #[test]
    fn dataset_must_fit_the_classifier() {
        let dataset = Dataset::new(Array2::zeros((2, 3)), vec![0, 4]).unwrap();

        assert!(check_fits(&dataset, 3, 5).is_ok());
        assert!(check_fits(&dataset, 4, 5).is_err());
        assert!(check_fits(&dataset, 3, 4).is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let source = DatasetSource::Csv {
            path: "/nonexistent/train.csv".into(),
        };

        let err = source.load(4, 2).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/train.csv"));
    }
}
