use anyhow::{Context, Result};
use classifier::{Classifier, Dataset, Evaluation};
use log::info;
use ndarray::Array2;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::RunConfig;

/// Builds the classifier, trains it on the train dataset and reports its accuracy on both
/// datasets.
pub fn run(config: RunConfig) -> Result<()> {
    let RunConfig {
        model,
        train,
        test,
        smoke_test,
    } = config;

    let (features, classes, seed) = (model.input_size, model.classes, model.seed);
    let mut classifier = Classifier::new(model).context("cannot build the classifier")?;
    info!("built classifier\n{classifier}");

    if smoke_test {
        let log_probs = smoke(&classifier, seed)?;
        info!("smoke test output: {log_probs:?}");
    }

    let mut train = train.load(features, classes).context("cannot load train dataset")?;
    let test = test
        .map(|source| source.load(features, classes))
        .transpose()
        .context("cannot load test dataset")?;

    let stats = classifier.fit(&mut train)?;
    for (epoch, stats) in stats.iter().enumerate() {
        info!("epoch {epoch}: {stats}");
    }

    let train_eval = evaluate(&classifier, &train)?;
    info!(accuracy = train_eval.accuracy(); "train: {train_eval}");

    if let Some(test) = test {
        let test_eval = evaluate(&classifier, &test)?;
        info!(accuracy = test_eval.accuracy(); "test: {test_eval}");
    }

    Ok(())
}

/// Pushes a single uniformly random input through the network.
pub fn smoke(classifier: &Classifier, seed: u64) -> Result<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let x = Array2::from_shape_simple_fn((1, classifier.network().input_size()), || {
        rng.random::<f32>()
    });

    let y = classifier.forward(x.view())?;
    Ok(y.row(0).to_vec())
}

fn evaluate(classifier: &Classifier, dataset: &Dataset) -> Result<Evaluation> {
    let batch_size = classifier.config().batch_size;
    Ok(classifier.evaluate(dataset.batches(batch_size))?)
}
