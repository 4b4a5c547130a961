// Fits a small Tanh network to sin(x) and prints the query history.
// The library itself never installs a subscriber; set RUST_LOG=debug for
// per-epoch output.
use ferrite_fit::{
    fit, ActivationFunction, FitParameters, FunctionSampler, Loss, NetworkSpec, SgdSpec,
    TrainConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

fn main() -> ferrite_fit::Result<()> {
    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut rng = StdRng::seed_from_u64(2024);
    let dataset = FunctionSampler::new(f64::sin, -3.0, 3.0)?
        .with_extension(0.1)?
        .dataset(512, 128, 128, &mut rng)?;

    let params = FitParameters::new(
        dataset,
        TrainConfig {
            epochs: 300,
            batch_size: 32,
            queries: 15,
            seed: Some(7),
            ..TrainConfig::default()
        },
        NetworkSpec::new(
            1,
            vec![16, 1],
            vec![ActivationFunction::Tanh, ActivationFunction::Linear],
            Loss::MeanSquaredError,
        ),
        SgdSpec::new(0.05, 0.001),
    );

    let results = fit(params)?;
    for stats in &results.history {
        println!(
            "epoch {:>4}: train {:.5}  test {:.5}  lr {:.5}",
            stats.epoch, stats.train_loss, stats.test_loss, stats.learning_rate
        );
    }
    println!(
        "best test loss {:.5} at epoch {} ({:?}), valid loss {:.5}",
        results.best_test_loss, results.best_epoch, results.stop_reason, results.valid_loss
    );
    Ok(())
}
