use crate::dataset::DataView;
use crate::error::{Error, Result};
use crate::folds::{Split, StratifiedShuffleSplit};
use crate::metrics::Scoring;
use crate::model::ModelFamily;
use crate::objective::Objective;
use crate::rng_util;
use crate::space::{Configuration, SpaceParams};
use crate::trial::Trial;

/// The search objective for one outer fold.
///
/// Binds a model family to the optimization subset of that fold and to the
/// inner splits drawn from it. Every evaluation decodes the suggested
/// candidate, fits a fresh model on each inner train subset and returns the
/// negated mean AUC over the inner test subsets.
///
/// The inner splits are drawn once, at construction, so every candidate is
/// scored on the same partitions.
pub struct CvObjective<'a> {
    family: &'a dyn ModelFamily,
    data: DataView<'a>,
    splits: Vec<Split>,
    params: SpaceParams,
    scoring: Scoring,
    seed: u64,
}

impl<'a> CvObjective<'a> {
    /// Binds `family` to `data`, drawing inner splits with `splitter`.
    ///
    /// `seed` drives model fitting; inner split `k` fits with a seed derived
    /// from it and `k`.
    ///
    /// # Errors
    ///
    /// Returns the family space's validation errors and
    /// `Error::InsufficientSamples` if `data` cannot be split.
    pub fn new(
        family: &'a dyn ModelFamily,
        data: DataView<'a>,
        splitter: &StratifiedShuffleSplit,
        scoring: Scoring,
        seed: u64,
    ) -> Result<Self> {
        let params = family.space().params()?;
        let splits = splitter.split(&data.labels())?;
        Ok(Self {
            family,
            data,
            splits,
            params,
            scoring,
            seed,
        })
    }

    /// Returns the bound model family.
    #[must_use]
    pub fn family(&self) -> &'a dyn ModelFamily {
        self.family
    }

    /// Returns the lowered search space used for suggestions.
    #[must_use]
    pub fn space_params(&self) -> &SpaceParams {
        &self.params
    }

    /// Returns the inner splits, as positions within the bound subset.
    #[must_use]
    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    /// Mean inner AUC of `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if the family rejects `config`,
    /// fitting errors, and `Error::MetricUndefined` for a single-class
    /// inner test subset.
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_score(&self, config: &Configuration) -> Result<f64> {
        if self.splits.is_empty() {
            return Err(Error::Internal("objective bound without inner splits"));
        }
        let mut total = 0.0;
        for (k, split) in self.splits.iter().enumerate() {
            let estimator = self
                .family
                .build(config, rng_util::derive_seed(self.seed, k as u64))?;
            let train = self.data.subset(&split.train)?;
            let test = self.data.subset(&split.test)?;

            let predictor = estimator.fit(&train.rows(), &train.labels())?;
            total += self
                .scoring
                .score(predictor.as_ref(), &test.rows(), &test.labels())?;
        }
        Ok(total / self.splits.len() as f64)
    }
}

impl Objective for CvObjective<'_> {
    type Error = Error;

    fn evaluate(&self, trial: &mut Trial) -> Result<f64> {
        let encoded = self.params.suggest(trial)?;
        let config = self.family.space().decode(&encoded)?;
        let loss = -self.mean_score(&config)?;
        trace_debug!(trial_id = trial.id(), %config, loss, "candidate scored");
        Ok(loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::model::{Estimator, Predictor};
    use crate::sampler::RandomSampler;
    use crate::space::SearchSpace;
    use crate::study::Study;
    use crate::types::FailurePolicy;

    /// Predicts class 1 when feature 0 exceeds `threshold`.
    struct Stump {
        threshold: f64,
    }

    impl Predictor for Stump {
        fn decision_function(&self, row: &[f64]) -> f64 {
            row[0] - self.threshold
        }
    }

    impl Estimator for Stump {
        fn fit(&self, _rows: &[&[f64]], _labels: &[usize]) -> Result<Box<dyn Predictor>> {
            Ok(Box::new(Stump {
                threshold: self.threshold,
            }))
        }
    }

    struct StumpFamily {
        space: SearchSpace,
    }

    impl ModelFamily for StumpFamily {
        fn name(&self) -> &str {
            "stump"
        }

        fn space(&self) -> &SearchSpace {
            &self.space
        }

        fn build(&self, config: &Configuration, _seed: u64) -> Result<Box<dyn Estimator>> {
            Ok(Box::new(Stump {
                threshold: config.f64("threshold")?,
            }))
        }
    }

    fn separable() -> Dataset {
        let features: Vec<Vec<f64>> = (0..40).map(|i| vec![f64::from(i) / 40.0]).collect();
        let labels = (0..40).map(|i| usize::from(i >= 20)).collect();
        Dataset::new(vec!["x".into()], features, labels).unwrap()
    }

    #[test]
    fn loss_is_negated_mean_auc() {
        let data = separable();
        let family = StumpFamily {
            space: SearchSpace::new().continuous("threshold", 0.0, 1.0),
        };
        let splitter = StratifiedShuffleSplit::new(3, 0.75).unwrap().seed(1);
        let objective = CvObjective::new(
            &family,
            data.view_all(),
            &splitter,
            Scoring::HardLabels,
            0,
        )
        .unwrap();
        assert_eq!(objective.splits().len(), 3);

        let perfect = Configuration::new().with("threshold", 0.49);
        assert!((objective.mean_score(&perfect).unwrap() - 1.0).abs() < 1e-12);

        // Everything predicted positive.
        let trivial = Configuration::new().with("threshold", -1.0);
        assert!((objective.mean_score(&trivial).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn rejected_configuration_surfaces_as_failed_evaluation() {
        let data = separable();
        let family = StumpFamily {
            space: SearchSpace::new().choice("threshold", ["high", "low"]),
        };
        let splitter = StratifiedShuffleSplit::new(2, 0.75).unwrap().seed(2);
        let objective =
            CvObjective::new(&family, data.view_all(), &splitter, Scoring::HardLabels, 0).unwrap();

        let study = Study::new(RandomSampler::with_seed(3));
        let result = study.optimize(3, FailurePolicy::Propagate, |trial: &mut Trial| {
            objective.evaluate(trial)
        });
        assert!(matches!(
            result,
            Err(Error::SearchEvaluation { trial_id: 0, .. })
        ));
    }
}
