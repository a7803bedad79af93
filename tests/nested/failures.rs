use nested_cv::dataset::Dataset;
use nested_cv::folds::StratifiedShuffleSplit;
use nested_cv::metrics::Scoring;
use nested_cv::model::{Estimator, ModelFamily};
use nested_cv::nested::{CvObjective, InnerSearch, NestedCv, NestedCvConfig};
use nested_cv::sampler::TpeSampler;
use nested_cv::space::{Configuration, SearchSpace};
use nested_cv::{Error, FailurePolicy};

use crate::common::{blobs, quick_config};

/// A family whose estimator rejects the "broken" choice.
struct Fragile(SearchSpace);

impl ModelFamily for Fragile {
    fn name(&self) -> &str {
        "fragile"
    }

    fn space(&self) -> &SearchSpace {
        &self.0
    }

    fn build(&self, config: &Configuration, seed: u64) -> nested_cv::Result<Box<dyn Estimator>> {
        if config.str("mode")? == "broken" {
            return Err(Error::InvalidParameter {
                name: "mode".to_string(),
                reason: "rejected".to_string(),
            });
        }
        Ok(Box::new(
            nested_cv::model::ExtraTrees::new().n_estimators(3)?.seed(seed),
        ))
    }
}

#[test]
fn propagate_aborts_the_run() {
    let data = blobs(15, 1);
    let family = Fragile(SearchSpace::new().choice("mode", ["broken"]));
    let cv = NestedCv::new(data, quick_config(2)).unwrap();
    assert!(matches!(
        cv.run(&family),
        Err(Error::SearchEvaluation { .. })
    ));
}

#[test]
fn skip_survives_failed_candidates() {
    let data = blobs(15, 3);
    let family = Fragile(SearchSpace::new().choice("mode", ["broken", "fine"]));
    let config = NestedCvConfig::builder()
        .outer_splits(2)
        .inner_splits(2)
        .n_evaluations(12)
        .n_startup_trials(12)
        .failure_policy(FailurePolicy::Skip)
        .seed(4)
        .build()
        .unwrap();
    let result = NestedCv::new(data, config).unwrap().run(&family).unwrap();
    for record in result.records() {
        assert_eq!(record.configuration.str("mode").unwrap(), "fine");
    }
}

#[test]
fn skipped_failures_keep_their_reasons() {
    let data = blobs(15, 7);
    let family = Fragile(SearchSpace::new().choice("mode", ["broken", "fine"]));
    let splitter = StratifiedShuffleSplit::new(2, 0.8).unwrap().seed(1);
    let objective = CvObjective::new(
        &family,
        data.view_all(),
        &splitter,
        Scoring::DecisionScores,
        2,
    )
    .unwrap();
    let sampler = TpeSampler::builder()
        .seed(3)
        .n_startup_trials(20)
        .build()
        .unwrap();

    let outcome = InnerSearch::new(sampler, 20, FailurePolicy::Skip)
        .search(&objective)
        .unwrap();

    assert!(!outcome.failures.is_empty());
    assert_eq!(outcome.failures.len() + outcome.history.len(), 20);
    for failure in &outcome.failures {
        assert!(failure.trial_id < 20);
        assert!(failure.reason.contains("rejected"), "{}", failure.reason);
    }
    let mut ids: Vec<u64> = outcome.failures.iter().map(|f| f.trial_id).collect();
    ids.dedup();
    assert_eq!(ids.len(), outcome.failures.len());
    assert_eq!(outcome.configuration.str("mode").unwrap(), "fine");
}

#[test]
fn skip_with_no_success_reports_no_completed_trials() {
    let data = blobs(15, 5);
    let family = Fragile(SearchSpace::new().choice("mode", ["broken"]));
    let config = NestedCvConfig::builder()
        .outer_splits(1)
        .inner_splits(2)
        .n_evaluations(3)
        .failure_policy(FailurePolicy::Skip)
        .seed(6)
        .build()
        .unwrap();
    let cv = NestedCv::new(data, config).unwrap();
    assert!(matches!(cv.run(&family), Err(Error::NoCompletedTrials)));
}

#[test]
fn too_few_samples_cannot_be_stratified() {
    let features = (0..6).map(|i| vec![f64::from(i)]).collect();
    let labels = vec![0, 0, 0, 0, 0, 1];
    let data = Dataset::new(vec!["x".into()], features, labels).unwrap();
    assert!(matches!(
        NestedCv::new(data, quick_config(0)),
        Err(Error::InsufficientSamples { .. })
    ));
}
