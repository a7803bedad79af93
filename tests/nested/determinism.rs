use std::sync::Arc;

use nested_cv::nested::{FamilyResult, NestedCv, TrialRecord, select};
use nested_cv::space::Configuration;

use crate::common::{blobs, quick_config, small_trees};

#[test]
fn fixed_seed_reproduces_records() {
    let data = Arc::new(blobs(20, 9));
    let family = small_trees();

    let first = NestedCv::new(Arc::clone(&data), quick_config(10)).unwrap().run(&family).unwrap();
    let second = NestedCv::new(data, quick_config(10)).unwrap().run(&family).unwrap();
    assert_eq!(first, second);
}

#[test]
fn fixed_seed_reproduces_outer_splits() {
    let data = Arc::new(blobs(30, 2));
    let a = NestedCv::new(Arc::clone(&data), quick_config(1)).unwrap();
    let b = NestedCv::new(data, quick_config(1)).unwrap();
    assert_eq!(a.outer_splits(), b.outer_splits());
}

#[test]
fn single_fold_matches_full_run() {
    let data = blobs(20, 12);
    let family = small_trees();
    let cv = NestedCv::new(data, quick_config(13)).unwrap();

    let full = cv.run(&family).unwrap();
    let fold_one = cv.run_fold(&family, 1).unwrap();
    assert_eq!(&full.records()[1], &fold_one);
}

#[test]
fn tied_best_score_selects_earliest_fold() {
    let record = |fold: usize, score: f64| TrialRecord {
        fold,
        score,
        inner_score: 0.5,
        configuration: Configuration::new().with("n_estimators", 10_i64),
    };
    let records = vec![
        record(0, 0.75),
        record(1, 1.0),
        record(2, 1.0),
        record(3, 0.5),
    ];
    assert_eq!(select(&records).unwrap().fold, 1);

    let result = FamilyResult::new("extra_trees", records);
    let sorted: Vec<usize> = result.sorted().iter().map(|r| r.fold).collect();
    assert_eq!(sorted, vec![1, 2, 0, 3]);
}
