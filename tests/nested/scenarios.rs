use nested_cv::dataset::Dataset;
use nested_cv::folds::StratifiedShuffleSplit;
use nested_cv::metrics::{Scoring, roc_auc};
use nested_cv::model::{Estimator, ExtraTrees, ModelFamily, Predictor, SvcFamily};
use nested_cv::nested::{CvObjective, InnerSearch, NestedCv};
use nested_cv::sampler::TpeSampler;
use nested_cv::space::{HyperValue, SearchSpace};
use nested_cv::{Error, FailurePolicy};

use crate::common::{blobs, quick_config, small_trees};

#[test]
fn balanced_200_splits_into_stratified_160_40() {
    let labels: Vec<usize> = (0..200).map(|i| i % 2).collect();
    let splits = StratifiedShuffleSplit::new(2, 0.8)
        .unwrap()
        .seed(11)
        .split(&labels)
        .unwrap();

    assert_eq!(splits.len(), 2);
    for split in &splits {
        assert_eq!(split.train.len(), 160);
        assert_eq!(split.test.len(), 40);
        let train_pos = split.train.iter().filter(|&&i| labels[i] == 1).count();
        let test_pos = split.test.iter().filter(|&&i| labels[i] == 1).count();
        assert_eq!(train_pos, 80);
        assert_eq!(test_pos, 20);
        assert!(split.train.iter().all(|i| !split.test.contains(i)));
    }
}

#[test]
fn outer_splits_of_a_run_are_stratified() {
    let data = blobs(100, 1);
    let config = nested_cv::nested::NestedCvConfig::builder()
        .outer_splits(2)
        .seed(3)
        .build()
        .unwrap();
    let cv = NestedCv::new(data, config).unwrap();
    for split in cv.outer_splits() {
        assert_eq!(split.train.len(), 160);
        assert_eq!(split.test.len(), 40);
        let test_pos = split.test.iter().filter(|&&i| cv.dataset().labels()[i] == 1).count();
        assert_eq!(test_pos, 20);
    }
}

#[test]
fn budget_of_ten_returns_one_decoded_configuration() {
    struct Threshold(SearchSpace);

    struct Fitted {
        threshold: f64,
        sign: f64,
    }

    impl Predictor for Fitted {
        fn decision_function(&self, row: &[f64]) -> f64 {
            self.sign * (row[0] - self.threshold)
        }
    }

    impl nested_cv::model::Estimator for Fitted {
        fn fit(
            &self,
            _rows: &[&[f64]],
            _labels: &[usize],
        ) -> nested_cv::Result<Box<dyn Predictor>> {
            Ok(Box::new(Fitted {
                threshold: self.threshold,
                sign: self.sign,
            }))
        }
    }

    impl ModelFamily for Threshold {
        fn name(&self) -> &str {
            "threshold"
        }

        fn space(&self) -> &SearchSpace {
            &self.0
        }

        fn build(
            &self,
            config: &nested_cv::space::Configuration,
            _seed: u64,
        ) -> nested_cv::Result<Box<dyn nested_cv::model::Estimator>> {
            let sign = match config.str("mode")? {
                "forward" => 1.0,
                "reverse" => -1.0,
                _ => 0.0,
            };
            Ok(Box::new(Fitted {
                threshold: config.f64("t")?,
                sign,
            }))
        }
    }

    let features = (0..80).map(|i| vec![f64::from(i) / 80.0]).collect();
    let labels = (0..80).map(|i| usize::from(i >= 40)).collect();
    let data = Dataset::new(vec!["x".into()], features, labels).unwrap();

    let choices = ["forward", "reverse", "constant"];
    let family = Threshold(
        SearchSpace::new()
            .continuous("t", 0.0, 1.0)
            .choice("mode", choices),
    );
    let splitter = StratifiedShuffleSplit::new(5, 0.8).unwrap().seed(2);
    let objective =
        CvObjective::new(&family, data.view_all(), &splitter, Scoring::DecisionScores, 0).unwrap();
    let sampler = TpeSampler::builder().seed(8).n_startup_trials(4).build().unwrap();

    let outcome = InnerSearch::new(sampler, 10, FailurePolicy::Propagate)
        .search(&objective)
        .unwrap();

    let config = outcome.configuration;
    assert_eq!(config.iter().count(), 2);
    let mode = config.get("mode").unwrap();
    assert!(matches!(mode, HyperValue::Str(_)), "mode left encoded: {mode:?}");
    assert!(choices.iter().any(|&c| *mode == HyperValue::from(c)));
    let t = config.f64("t").unwrap();
    assert!((0.0..=1.0).contains(&t));
}

#[test]
fn single_class_validation_is_metric_undefined() {
    let err = roc_auc(&[1, 1, 1, 1], &[1.0, 0.0, 1.0, 1.0]).unwrap_err();
    assert!(matches!(err, Error::MetricUndefined { class: 1 }));

    let err = roc_auc(&[0, 0], &[0.3, 0.7]).unwrap_err();
    assert!(matches!(err, Error::MetricUndefined { class: 0 }));
}

#[test]
fn single_class_validation_view_is_metric_undefined() {
    let data = blobs(10, 2);
    let predictor = ExtraTrees::new()
        .n_estimators(5)
        .unwrap()
        .seed(1)
        .fit(&data.view_all().rows(), data.labels())
        .unwrap();

    let negatives: Vec<usize> = (0..data.n_samples())
        .filter(|&i| data.labels()[i] == 0)
        .collect();
    let validation = data.view(negatives).unwrap();
    for scoring in [Scoring::HardLabels, Scoring::DecisionScores] {
        let err = scoring
            .score(predictor.as_ref(), &validation.rows(), &validation.labels())
            .unwrap_err();
        assert!(matches!(err, Error::MetricUndefined { class: 0 }));
    }
}

#[test]
fn rare_class_lands_in_every_validation_subset() {
    let features: Vec<Vec<f64>> = (0..40).map(|i| vec![f64::from(i) / 40.0]).collect();
    let labels: Vec<usize> = (0..40).map(|i| usize::from(i >= 35)).collect();
    let data = Dataset::new(vec!["x".into()], features, labels).unwrap();

    let cv = NestedCv::new(data, quick_config(9)).unwrap();
    for split in cv.outer_splits() {
        let positives = split.test.iter().filter(|&&i| cv.dataset().labels()[i] == 1).count();
        assert_eq!(positives, 1);
        assert_eq!(split.test.len(), 8);
    }

    let result = cv.run(&small_trees()).unwrap();
    assert_eq!(result.records().len(), 3);
    assert!(result.records().iter().all(|r| (0.0..=1.0).contains(&r.score)));
}

#[test]
fn null_gamma_choice_uses_data_scaled_default() {
    let data = blobs(20, 8);
    let cv = NestedCv::new(data, quick_config(3)).unwrap();
    let svc = SvcFamily::with_space(
        SearchSpace::new()
            .log_continuous("C", 0.5, 5.0)
            .choice("kernel", ["rbf"])
            .choice("gamma", [None, Some(0.1)]),
    );

    let result = cv.run(&svc).unwrap();
    assert_eq!(result.records().len(), 3);
    for record in result.records() {
        let gamma = record.configuration.get("gamma").unwrap();
        assert!(*gamma == HyperValue::Null || *gamma == HyperValue::from(0.1));
    }
}

#[test]
fn both_families_share_outer_folds() {
    let data = blobs(20, 4);
    let cv = NestedCv::new(data, quick_config(5)).unwrap();
    let trees = small_trees();
    let svc = SvcFamily::with_space(
        SearchSpace::new()
            .log_continuous("C", 0.1, 10.0)
            .choice("kernel", ["linear", "rbf"]),
    );

    let report = cv.compare(&[&svc, &trees]).unwrap();
    assert_eq!(report.families().len(), 2);
    for family in report.families() {
        assert_eq!(family.records().len(), 3);
        let best = family.best().unwrap();
        assert!(family.records().iter().all(|r| r.score <= best.score));
    }
    assert!(report.family("svc").is_some());
    assert!(report.family("extra_trees").is_some());
}

#[test]
fn separable_data_scores_well_with_svc() {
    let data = blobs(25, 6);
    let cv = NestedCv::new(data, quick_config(7)).unwrap();
    let svc = SvcFamily::with_space(
        SearchSpace::new()
            .log_continuous("C", 0.5, 10.0)
            .choice("kernel", ["linear"]),
    );
    let result = cv.run(&svc).unwrap();
    let mean = result.mean_score().unwrap();
    assert!(mean > 0.8, "mean validation AUC {mean}");
}
