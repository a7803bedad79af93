use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nested_cv::dataset::Dataset;
use nested_cv::folds::StratifiedShuffleSplit;
use nested_cv::metrics::roc_auc;
use nested_cv::model::{Estimator, ExtraTrees, ExtraTreesFamily, KernelKind, Svc};
use nested_cv::nested::{NestedCv, NestedCvConfig};

fn blobs(n: usize, n_features: usize) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = fastrand::Rng::with_seed(42);
    (0..n)
        .map(|i| {
            let label = i % 2;
            let shift = if label == 0 { -0.5 } else { 0.5 };
            let row = (0..n_features).map(|_| shift + rng.f64() - 0.5).collect();
            (row, label)
        })
        .unzip()
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.sample_size(10);

    for n in [100, 400] {
        let (features, labels) = blobs(n, 8);
        let rows: Vec<&[f64]> = features.iter().map(Vec::as_slice).collect();

        let svc = Svc::new(1.0, KernelKind::Rbf).unwrap().seed(1);
        group.bench_with_input(BenchmarkId::new("svc_rbf", n), &rows, |b, rows| {
            b.iter(|| svc.fit(rows, &labels).unwrap());
        });

        let trees = ExtraTrees::new().n_estimators(50).unwrap().seed(1);
        group.bench_with_input(BenchmarkId::new("extra_trees_50", n), &rows, |b, rows| {
            b.iter(|| trees.fit(rows, &labels).unwrap());
        });
    }
    group.finish();
}

fn bench_partition_and_score(c: &mut Criterion) {
    let (_, labels) = blobs(10_000, 1);
    let splitter = StratifiedShuffleSplit::new(100, 0.8).unwrap().seed(3);
    c.bench_function("stratified_split_100x10k", |b| {
        b.iter(|| splitter.split(&labels).unwrap());
    });

    let mut rng = fastrand::Rng::with_seed(5);
    let scores: Vec<f64> = labels.iter().map(|_| rng.f64()).collect();
    c.bench_function("roc_auc_10k", |b| {
        b.iter(|| roc_auc(&labels, &scores).unwrap());
    });
}

fn bench_nested(c: &mut Criterion) {
    let (features, labels) = blobs(120, 4);
    let names = (0..4).map(|i| format!("f{i}")).collect();
    let data = Arc::new(Dataset::new(names, features, labels).unwrap());
    let config = NestedCvConfig::builder()
        .outer_splits(3)
        .n_evaluations(10)
        .seed(9)
        .build()
        .unwrap();
    let family = ExtraTreesFamily::new();

    let mut group = c.benchmark_group("nested");
    group.sample_size(10);
    group.bench_function("extra_trees_3x10x5", |b| {
        b.iter(|| {
            NestedCv::new(Arc::clone(&data), config.clone())
                .unwrap()
                .run(&family)
                .unwrap()
        });
    });
    group.finish();
}

criterion_group!(benches, bench_fit, bench_partition_and_score, bench_nested);
criterion_main!(benches);
