//! JSON round trips for network specs and initialised networks.

use std::path::PathBuf;

use tensor_nn::{
    ActivationFunction, LayerSpec, LossType, Matrix, Network, NetworkSpec, Step, Tensor,
};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("tensor_nn_{}_{name}.json", std::process::id()))
}

fn spec() -> NetworkSpec {
    NetworkSpec {
        name: "persisted".into(),
        layers: vec![
            LayerSpec::Linear { input_size: 3, output_size: 4 },
            LayerSpec::Activation { function: ActivationFunction::ReLU },
            LayerSpec::Dropout { size: 4, p: 1.0 },
            LayerSpec::Linear { input_size: 4, output_size: 2 },
            LayerSpec::Identity { size: 2 },
        ],
        loss: LossType::Mse,
        seed: Some(99),
    }
}

#[test]
fn spec_round_trips_through_json() {
    let path = temp_path("spec");
    let original = spec();
    original.save_json(path.to_str().unwrap()).unwrap();
    let loaded = NetworkSpec::load_json(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, original);
}

#[test]
fn network_parameters_survive_save_and_load() {
    let path = temp_path("network");
    let mut original = spec().build().unwrap();
    original.save_json(path.to_str().unwrap()).unwrap();
    let mut loaded = Network::load_json(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    let x = Tensor::from_matrices(vec![
        Matrix::column(vec![0.1, 0.2, 0.3]),
        Matrix::column(vec![-1.0, 0.0, 2.5]),
    ])
    .unwrap();
    // p = 1 keeps every cell, so the reseeded dropout cannot change the result.
    assert_eq!(original.forward(x.clone()).unwrap(), loaded.forward(x).unwrap());
}

#[test]
fn loading_rejects_inconsistent_networks() {
    let path = temp_path("broken");
    let broken = Network {
        steps: vec![
            Step::Identity(tensor_nn::Identity::new(3)),
            Step::Identity(tensor_nn::Identity::new(2)),
        ],
    };
    broken.save_json(path.to_str().unwrap()).unwrap();
    let err = Network::load_json(path.to_str().unwrap()).unwrap_err();
    std::fs::remove_file(&path).ok();

    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}

#[test]
fn loading_rejects_out_of_range_dropout() {
    let path = temp_path("dropout");
    std::fs::write(
        &path,
        r#"{"steps":[{"type":"dropout","size":2,"p":1.5}]}"#,
    )
    .unwrap();
    let result = Network::load_json(path.to_str().unwrap());
    std::fs::remove_file(&path).ok();

    assert!(result.is_err());
}
