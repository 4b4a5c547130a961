use ferrite_fit::{
    fit, ActivationFunction, Error, FitParameters, FunctionSampler, Layer, Loss, Matrix, Network,
    NetworkSpec, SgdSpec, StopReason, TrainConfig, Trainer,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn linear_params(seed: u64) -> FitParameters {
    let mut rng = StdRng::seed_from_u64(seed);
    let dataset = FunctionSampler::new(|x: f64| 2.0 * x + 1.0, -1.0, 1.0)
        .unwrap()
        .dataset(256, 64, 64, &mut rng)
        .unwrap();
    FitParameters::new(
        dataset,
        TrainConfig {
            epochs: 100,
            batch_size: 32,
            queries: 5,
            seed: Some(seed),
            ..TrainConfig::default()
        },
        NetworkSpec::new(
            1,
            vec![8, 1],
            vec![ActivationFunction::Tanh, ActivationFunction::Linear],
            Loss::MeanSquaredError,
        ),
        SgdSpec::new(0.1, 0.0001),
    )
}

#[test_log::test]
fn fits_a_noiseless_linear_function() {
    let results = fit(linear_params(42)).unwrap();

    assert_eq!(results.test_losses.len(), 5);
    assert_eq!(
        results.test_losses.keys().copied().collect::<Vec<_>>(),
        vec![20, 40, 60, 80, 100]
    );
    let (_, first) = results.first_query().unwrap();
    let (_, last) = results.last_query().unwrap();
    assert!(last <= first, "first {first}, last {last}");
    assert_eq!(results.stop_reason, StopReason::EpochsExhausted);

    let x = Matrix::column(vec![-0.5, 0.0, 0.5]).unwrap();
    let prediction = results.best_network.predict(&x).unwrap();
    let expected = Matrix::column(vec![0.0, 1.0, 2.0]).unwrap();
    assert!(prediction.equal_values(&expected, 0.3), "{prediction:.3}");
}

#[test]
fn independent_trainers_run_concurrently() {
    let handles: Vec<_> = (0..3)
        .map(|seed| std::thread::spawn(move || fit(linear_params(seed))))
        .collect();
    for handle in handles {
        let results = handle.join().unwrap().unwrap();
        assert_eq!(results.test_losses.len(), 5);
        assert!(results.best_test_loss.is_finite());
    }
}

#[test]
fn trainer_parts_are_send() {
    fn assert_send<T: Send>() {}
    assert_send::<Trainer>();
    assert_send::<FitParameters>();
    assert_send::<Network>();
}

#[test]
fn shape_validation_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        Layer::dense(1, 0, ActivationFunction::Tanh, &mut rng),
        Err(Error::InvalidConfig(_))
    ));

    let network = Network::new(
        vec![
            Layer::dense(1, 8, ActivationFunction::Tanh, &mut rng).unwrap(),
            Layer::dense(4, 1, ActivationFunction::Linear, &mut rng).unwrap(),
        ],
        Loss::MeanSquaredError,
    )
    .unwrap();
    let x = Matrix::column(vec![0.1, 0.2]).unwrap();
    assert!(matches!(
        network.train_batch(&x, &x),
        Err(Error::ShapeMismatch { .. })
    ));
}

#[test]
fn mismatched_spec_arrays_fail_at_build_time() {
    let mut params = linear_params(1);
    params.network.activations.pop();
    assert!(matches!(Trainer::new(params), Err(Error::InvalidConfig(_))));
}
