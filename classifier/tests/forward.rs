use classifier::{Batch, Classifier, ClassifierConfig, MlErr};
use ndarray::{Array2, array};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Uniform};

fn random_input(rows: usize, cols: usize, seed: u64) -> Array2<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::new(0., 1.).unwrap();
    Array2::from_shape_simple_fn((rows, cols), || dist.sample(&mut rng))
}

#[test]
fn rows_are_log_probabilities() {
    let classifier = Classifier::new(ClassifierConfig::default()).unwrap();
    let x = random_input(7, 28 * 28, 1);

    let y = classifier.forward(x.view()).unwrap();

    assert_eq!(y.dim(), (7, 10));
    for row in y.rows() {
        let total: f32 = row.iter().map(|logp| logp.exp()).sum();
        assert!((total - 1.).abs() < 1e-5, "row sums to {total}");
        assert!(row.iter().all(|&logp| logp <= 0.));
    }
}

#[test]
fn output_shape_follows_the_config() {
    let configs = [
        (4, vec![], 2),
        (4, vec![8, 8], 2),
        (16, vec![3], 5),
        (28 * 28, vec![64, 64, 64], 10),
    ];

    for (input_size, hidden, classes) in configs {
        let classifier = Classifier::new(ClassifierConfig {
            input_size,
            hidden,
            classes,
            ..Default::default()
        })
        .unwrap();

        for batch in [1, 3, 10] {
            let y = classifier
                .forward(random_input(batch, input_size, 2).view())
                .unwrap();
            assert_eq!(y.dim(), (batch, classes));
        }
    }
}

#[test]
fn inference_is_repeatable() {
    let classifier = Classifier::new(ClassifierConfig::default()).unwrap();
    let x = random_input(3, 28 * 28, 3);

    let a = classifier.forward(x.view()).unwrap();
    let b = classifier.forward(x.view()).unwrap();

    assert_eq!(a, b);
}

#[test]
fn wrong_input_width_is_reported() {
    let classifier = Classifier::new(ClassifierConfig::default()).unwrap();
    let x = random_input(1, 28 * 8, 4);

    let err = classifier.forward(x.view()).unwrap_err();

    assert!(matches!(
        err,
        MlErr::ShapeMismatch {
            what: "input",
            got: 224,
            expected: 784
        }
    ));
}

#[test]
fn out_of_range_label_is_reported() {
    let mut classifier = Classifier::new(ClassifierConfig {
        input_size: 2,
        hidden: vec![4],
        classes: 3,
        ..Default::default()
    })
    .unwrap();
    let before = classifier.params().to_vec();

    let x = array![[0.5, 0.5]];
    let labels = array![3];
    let batch = Batch::new(x.view(), labels.view()).unwrap();

    assert!(matches!(
        classifier.loss(batch),
        Err(MlErr::LabelOutOfRange {
            label: 3,
            classes: 3
        })
    ));
    assert!(classifier.train_epoch([batch]).is_err());
    assert_eq!(classifier.params(), before.as_slice());

    let x = array![[0.5, 0.5]];
    let labels = array![7];
    let batch = Batch::new(x.view(), labels.view()).unwrap();

    assert!(matches!(
        classifier.evaluate([batch]),
        Err(MlErr::LabelOutOfRange {
            label: 7,
            classes: 3
        })
    ));
}

#[test]
fn same_seed_same_network() {
    let config = ClassifierConfig {
        seed: 42,
        ..Default::default()
    };

    let a = Classifier::new(config.clone()).unwrap();
    let b = Classifier::new(config).unwrap();

    assert_eq!(a.params(), b.params());
}
