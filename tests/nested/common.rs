use nested_cv::dataset::Dataset;
use nested_cv::model::ExtraTreesFamily;
use nested_cv::nested::NestedCvConfig;
use nested_cv::space::SearchSpace;

/// Two noisy Gaussian-ish blobs plus one pure-noise feature.
pub fn blobs(n_per_class: usize, seed: u64) -> Dataset {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut features = Vec::new();
    let mut labels = Vec::new();
    for class in 0..2_usize {
        let center = if class == 0 { -1.0 } else { 1.0 };
        for _ in 0..n_per_class {
            features.push(vec![
                center + 1.2 * (rng.f64() - 0.5),
                center + 1.2 * (rng.f64() - 0.5),
                rng.f64(),
            ]);
            labels.push(class);
        }
    }
    Dataset::new(
        vec!["a".into(), "b".into(), "noise".into()],
        features,
        labels,
    )
    .unwrap()
}

pub fn quick_config(seed: u64) -> NestedCvConfig {
    NestedCvConfig::builder()
        .outer_splits(3)
        .inner_splits(2)
        .n_evaluations(5)
        .n_startup_trials(3)
        .seed(seed)
        .build()
        .unwrap()
}

pub fn small_trees() -> ExtraTreesFamily {
    ExtraTreesFamily::with_space(
        SearchSpace::new()
            .choice("n_estimators", [5_i64, 10])
            .choice("max_depth", [None, Some(3_i64)])
            .choice("criterion", ["gini", "entropy"]),
    )
}
