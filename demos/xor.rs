use ferrite_fit::{
    ActivationFunction, Layer, Loss, Matrix, Network, ParameterRole, Sgd,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> ferrite_fit::Result<()> {
    let mut rng = StdRng::seed_from_u64(1);
    let mut network = Network::new(
        vec![
            Layer::dense(2, 4, ActivationFunction::Sigmoid, &mut rng)?,
            Layer::dense(4, 1, ActivationFunction::Sigmoid, &mut rng)?,
        ],
        Loss::MeanSquaredError,
    )?;

    let inputs = Matrix::from_data(vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ])?;
    let expected_outputs = Matrix::column(vec![1.0, 0.0, 1.0, 0.0])?;

    let optimizer = Sgd::new(2.0);
    let epochs = 10000;

    for epoch in 0..epochs {
        let trained = network.train_batch(&inputs, &expected_outputs)?;
        optimizer.step(&mut network, &trained.gradients)?;
        if epoch % 1000 == 0 {
            println!("Epoch {epoch}: loss = {:.6}", trained.loss);
        }
    }

    println!("{:.4}", network.predict(&inputs)?);
    if let Some(weights) = network.layers()[0].parameter(ParameterRole::Weights) {
        println!("hidden weights:\n{weights:.3}");
    }
    Ok(())
}
