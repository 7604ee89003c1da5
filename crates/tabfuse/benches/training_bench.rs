//! Benchmarks for preprocessing, inference and training.
//!
//! Run with: cargo bench --bench training_bench

use burn::prelude::*;
use burn_autodiff::Autodiff;
use burn_ndarray::NdArray;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array3;

use tabfuse::prelude::*;
use tabfuse_core::sequence_to_tensor;

type TrainBackend = Autodiff<NdArray>;

fn model_config(seq_len: usize, n_classes: usize) -> HybridSequenceModelConfig {
    HybridSequenceModelConfig::new(seq_len, n_classes)
        .with_lstm_units(32)
        .with_num_heads(4)
        .with_ff_dim(64)
        .with_attention_dim(16)
        .with_head_units(64)
        .with_dropout(0.0)
}

fn bench_preprocessing(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocessing");

    for n_samples in [200, 1000, 5000].iter() {
        let (x, _) = BlobsConfig::new(*n_samples, 30, 3).generate().unwrap();

        group.bench_with_input(BenchmarkId::new("scaler_fit", n_samples), n_samples, |b, _| {
            b.iter(|| black_box(StandardScaler::new().fit(&x).unwrap()))
        });

        let scaled = StandardScaler::new().fit(&x).unwrap().transform(&x).unwrap();
        group.bench_with_input(BenchmarkId::new("pca_fit", n_samples), n_samples, |b, _| {
            b.iter(|| black_box(Pca::new(20).fit(&scaled).unwrap()))
        });
    }

    group.finish();
}

fn bench_model_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_forward");

    let device = <NdArray as Backend>::Device::default();
    let model = model_config(20, 3).init::<NdArray>(&device).unwrap();

    for batch_size in [8, 32, 128].iter() {
        let x = Array3::<f32>::from_shape_fn((*batch_size, 20, 1), |(i, j, _)| {
            ((i + j) % 7) as f32 / 7.0
        });
        let tensor = sequence_to_tensor::<NdArray>(&x, &device);

        group.bench_with_input(
            BenchmarkId::new("HybridSequenceModel", batch_size),
            batch_size,
            |b, _| b.iter(|| black_box(model.forward(black_box(tensor.clone())))),
        );
    }

    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict");
    group.sample_size(20);

    let (x, y) = BlobsConfig::new(400, 30, 3).generate().unwrap();
    let config = HybridClassifierConfig::default()
        .with_lstm_units(32)
        .with_ff_dim(64)
        .with_verbose(false);
    let mut clf = HybridClassifier::new(config);
    clf.fit(&x, &y, &FitOptions::default().with_epochs(1)).unwrap();

    group.bench_function("predict_400", |b| b.iter(|| black_box(clf.predict(&x).unwrap())));

    group.finish();
}

fn bench_single_epoch(c: &mut Criterion) {
    let mut group = c.benchmark_group("training_step");
    group.sample_size(10); // Fewer samples due to expensive training

    let (x, y) = BlobsConfig::new(256, 30, 3).generate().unwrap();
    let config = HybridClassifierConfig::default()
        .with_lstm_units(32)
        .with_ff_dim(64)
        .with_verbose(false);
    let options = FitOptions::default().with_epochs(1);

    group.bench_function("single_epoch", |b| {
        b.iter(|| {
            let mut clf = HybridClassifier::new(config.clone());
            clf.fit(&x, &y, &options).unwrap();
            black_box(clf.history().len())
        })
    });

    // Raw model step for comparison, without preprocessing.
    let device = <TrainBackend as Backend>::Device::default();
    let model = model_config(20, 3).init::<TrainBackend>(&device).unwrap();
    let input = Array3::<f32>::zeros((32, 20, 1));
    let tensor = sequence_to_tensor::<TrainBackend>(&input, &device);
    group.bench_function("forward_backward", |b| {
        b.iter(|| {
            let logits = model.forward(tensor.clone());
            black_box(logits.sum().backward())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_preprocessing,
    bench_model_forward,
    bench_predict,
    bench_single_epoch,
);
criterion_main!(benches);
