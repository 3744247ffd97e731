//! End-to-end forward pass: raw batch -> layers -> activations -> losses.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tensor_nn::{
    ActivationFunction, Batch, CrossEntropyLoss, Dropout, Identity, Layer, Linear, LossType,
    Matrix, Module, MseLoss, Network, NnError, Step, Tensor,
};

fn column_tensor(columns: Vec<Vec<f32>>) -> Tensor {
    Tensor::from_matrices(columns.into_iter().map(Matrix::column).collect()).unwrap()
}

#[test]
fn linear_four_to_three_on_a_single_sample() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut layer = Linear::new(4, 3, &mut rng);
    assert_eq!((layer.input_size(), layer.output_size()), (4, 3));

    let x = column_tensor(vec![vec![1.0, 2.0, 3.0, 4.0]]);
    let y = layer.forward(x).unwrap();
    assert_eq!(y.shape(), [1, 3, 1]);

    // Bias starts at zero, so the output is exactly weight x input.
    let mut expected = Matrix::column(vec![1.0, 2.0, 3.0, 4.0]);
    expected.transform(layer.weight()).unwrap();
    assert_eq!(y.matrix(0).unwrap(), &expected);
}

#[test]
fn layers_compose_by_hand_like_a_model() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut input_to_hidden = Linear::new(4, 3, &mut rng);
    let mut dropout = Dropout::with_seed(3, 1.0, 5).unwrap();
    let mut hidden_to_output = Linear::new(3, 3, &mut rng);
    let mut identity = Identity::new(3);

    let x = column_tensor(vec![vec![5.1, 3.5, 1.4, 0.2], vec![6.2, 2.9, 4.3, 1.3]]);
    let x = input_to_hidden.forward(x).unwrap();
    let x = ActivationFunction::ReLU.apply(x);
    let x = dropout.forward(x).unwrap();
    let x = hidden_to_output.forward(x).unwrap();
    let x = identity.forward(x).unwrap();
    let prediction = ActivationFunction::Softmax.apply(x);

    assert_eq!(prediction.shape(), [2, 3, 1]);
    for m in prediction.iter() {
        assert!((m.sum() - 1.0).abs() < 1e-5);
        assert!(m.iter().all(|p| (0.0..=1.0).contains(&p)));
    }

    let target = column_tensor(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]);
    let batch = Batch::new(prediction, target).unwrap();
    let ce = CrossEntropyLoss::loss(&batch.input, &batch.output).unwrap();
    let mse = MseLoss::loss(&batch.input, &batch.output).unwrap();
    assert_eq!(ce.len(), batch.batch_size());
    assert_eq!(mse.len(), batch.batch_size());
    assert!(ce.iter().chain(mse.iter()).all(|l| l.is_finite()));
    assert!(ce.iter().all(|&l| l != 0.0));
}

#[test]
fn network_matches_manual_composition() {
    let mut rng = StdRng::seed_from_u64(8);
    let first = Linear::new(2, 4, &mut rng);
    let second = Linear::new(4, 2, &mut rng);

    let mut network = Network::new(vec![
        Step::Linear(first.clone()),
        Step::Activation { function: ActivationFunction::Tanh },
        Step::Linear(second.clone()),
        Step::Activation { function: ActivationFunction::Sigmoid },
    ])
    .unwrap();

    let x = column_tensor(vec![vec![0.5, -1.0], vec![2.0, 0.0], vec![0.0, 0.0]]);
    let by_network = network.forward(x.clone()).unwrap();

    let (mut first, mut second) = (first, second);
    let manual = ActivationFunction::Sigmoid.apply(
        second
            .forward(ActivationFunction::Tanh.apply(first.forward(x).unwrap()))
            .unwrap(),
    );
    assert_eq!(by_network, manual);
}

#[test]
fn losses_reject_mismatched_batches() {
    let x = Tensor::zeros(2, 3, 1);
    let y = Tensor::zeros(3, 3, 1);
    assert!(matches!(LossType::Mse.compute(&x, &y), Err(NnError::Shape { .. })));
    assert!(matches!(LossType::CrossEntropy.compute(&x, &y), Err(NnError::Shape { .. })));

    // A target with no class marked is reported, not silently treated as class 0.
    let x = column_tensor(vec![vec![1.0, 2.0]]);
    let y = column_tensor(vec![vec![0.0, 0.0]]);
    assert!(matches!(
        LossType::CrossEntropy.compute(&x, &y),
        Err(NnError::Value { param: "target", .. })
    ));
}

#[test]
fn dropout_extremes_across_a_batch() {
    let x = column_tensor(vec![vec![1.0, -2.0, 3.0]; 5]);

    let mut keep_all = Dropout::new(3, 1.0).unwrap();
    assert_eq!(keep_all.forward(x.clone()).unwrap(), x);

    let mut drop_all = Dropout::new(3, 0.0).unwrap();
    assert_eq!(drop_all.forward(x).unwrap(), Tensor::zeros(5, 3, 1));

    assert!(matches!(Dropout::new(3, 1.01), Err(NnError::Value { .. })));
}
