//! Nested cross-validation of an SVC against an extra-trees ensemble.
//!
//! Both families are tuned with TPE and evaluated on the same outer folds.
//! With no arguments, a synthetic two-moons-like dataset is generated.
//! Pass a CSV path and a label column to use your own data:
//!
//! ```text
//! cargo run --example compare_families -- data.csv outcome patient_id
//! ```
//!
//! Trailing arguments name identifier columns to exclude from the features.
//! Set `NESTED_CV_FULL=1` to use the reference settings (100 outer folds,
//! 50 evaluations each), which takes a while.

use std::f64::consts::PI;

use nested_cv::prelude::*;

fn synthetic(n_per_class: usize, seed: u64) -> Result<Dataset> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut features = Vec::with_capacity(2 * n_per_class);
    let mut labels = Vec::with_capacity(2 * n_per_class);

    for class in 0..2_usize {
        for _ in 0..n_per_class {
            let t = rng.f64() * PI;
            let (x, y) = if class == 0 {
                (t.cos(), t.sin())
            } else {
                (1.0 - t.cos(), 0.5 - t.sin())
            };
            features.push(vec![
                x + 0.2 * (rng.f64() - 0.5),
                y + 0.2 * (rng.f64() - 0.5),
                rng.f64(),
            ]);
            labels.push(class);
        }
    }

    Dataset::new(
        vec!["x".into(), "y".into(), "noise".into()],
        features,
        labels,
    )
}

fn load() -> Result<Dataset> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [path, label, excluded @ ..] => {
            let excluded: Vec<&str> = excluded.iter().map(String::as_str).collect();
            Dataset::from_csv_path(path, label, &excluded)
        }
        _ => synthetic(60, 7),
    }
}

fn main() -> Result<()> {
    let data = load()?;
    println!(
        "Loaded {} samples, {} features, classes {:?}",
        data.n_samples(),
        data.n_features(),
        data.classes()
    );

    let config = if std::env::var_os("NESTED_CV_FULL").is_some() {
        NestedCvConfig::builder().seed(42).build()?
    } else {
        NestedCvConfig::builder()
            .outer_splits(10)
            .n_evaluations(20)
            .seed(42)
            .build()?
    };
    println!(
        "{} outer folds x {} evaluations x {} inner folds",
        config.outer_splits, config.n_evaluations, config.inner_splits
    );

    let cv = NestedCv::new(data, config)?;
    let svc = SvcFamily::new();
    let trees = ExtraTreesFamily::new();
    let report = cv.compare(&[&svc, &trees])?;

    for family in report.families() {
        let best = family.best()?;
        println!();
        println!("== {} ==", family.family());
        println!(
            "validation AUC: mean {:.3}, std {:.3}",
            family.mean_score().unwrap_or(f64::NAN),
            family.std_score().unwrap_or(f64::NAN)
        );
        for record in family.sorted().iter().take(3) {
            println!(
                "  fold {:>3}: AUC {:.3} (inner {:.3}) {}",
                record.fold, record.score, record.inner_score, record.configuration
            );
        }
        println!("recommended: {}", best.configuration);
    }

    Ok(())
}
