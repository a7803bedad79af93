#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::folds::StratifiedShuffleSplit;
use crate::metrics::Scoring;
use crate::sampler::tpe::{FixedGamma, TpeSampler};
use crate::types::FailurePolicy;

/// Every knob of a nested cross-validation run.
///
/// Create one through [`NestedCvConfig::builder`]; `Default` gives the
/// reference settings: 100 outer splits and 5 inner splits, both at a 0.8
/// train fraction, and 50 search evaluations per outer fold.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NestedCvConfig {
    /// Number of outer optimization/validation splits.
    pub outer_splits: usize,
    /// Fraction of the dataset used for optimization in each outer split.
    pub outer_train_fraction: f64,
    /// Number of inner train/test splits per search evaluation.
    pub inner_splits: usize,
    /// Fraction of the optimization subset used for training in each inner split.
    pub inner_train_fraction: f64,
    /// Search evaluations per outer fold.
    pub n_evaluations: usize,
    /// Master seed. `None` draws fresh entropy.
    pub seed: Option<u64>,
    /// How inner test subsets are scored during the search.
    pub inner_scoring: Scoring,
    /// How outer validation subsets are scored after the refit.
    pub outer_scoring: Scoring,
    /// What the search does when one evaluation fails.
    pub failure_policy: FailurePolicy,
    /// Uniformly sampled evaluations before TPE takes over.
    pub n_startup_trials: usize,
    /// Candidates drawn from the good-trial density per suggestion.
    pub n_ei_candidates: usize,
    /// Quantile of trials treated as good by TPE.
    pub gamma: f64,
}

impl Default for NestedCvConfig {
    fn default() -> Self {
        Self {
            outer_splits: 100,
            outer_train_fraction: 0.8,
            inner_splits: 5,
            inner_train_fraction: 0.8,
            n_evaluations: 50,
            seed: None,
            inner_scoring: Scoring::DecisionScores,
            outer_scoring: Scoring::HardLabels,
            failure_policy: FailurePolicy::Propagate,
            n_startup_trials: 10,
            n_ei_candidates: 24,
            gamma: 0.25,
        }
    }
}

impl NestedCvConfig {
    /// Returns a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> NestedCvConfigBuilder {
        NestedCvConfigBuilder::default()
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCount`, `Error::InvalidTrainFraction` or
    /// `Error::InvalidGamma` for the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.outer_splitter(None)?;
        self.inner_splitter(None)?;
        if self.n_evaluations == 0 {
            return Err(Error::InvalidCount {
                what: "n_evaluations",
            });
        }
        if self.n_ei_candidates == 0 {
            return Err(Error::InvalidCount {
                what: "n_ei_candidates",
            });
        }
        FixedGamma::new(self.gamma)?;
        Ok(())
    }

    pub(crate) fn outer_splitter(&self, seed: Option<u64>) -> Result<StratifiedShuffleSplit> {
        Ok(StratifiedShuffleSplit::new(self.outer_splits, self.outer_train_fraction)?.maybe_seed(seed))
    }

    pub(crate) fn inner_splitter(&self, seed: Option<u64>) -> Result<StratifiedShuffleSplit> {
        Ok(StratifiedShuffleSplit::new(self.inner_splits, self.inner_train_fraction)?.maybe_seed(seed))
    }

    pub(crate) fn sampler(&self, seed: Option<u64>) -> Result<TpeSampler> {
        TpeSampler::builder()
            .gamma(self.gamma)
            .n_startup_trials(self.n_startup_trials)
            .n_ei_candidates(self.n_ei_candidates)
            .maybe_seed(seed)
            .build()
    }
}

/// Builder for [`NestedCvConfig`].
///
/// Validation is deferred to [`build`](Self::build).
///
/// # Examples
///
/// ```
/// use nested_cv::nested::NestedCvConfig;
///
/// let config = NestedCvConfig::builder()
///     .outer_splits(10)
///     .n_evaluations(20)
///     .seed(7)
///     .build()
///     .unwrap();
/// assert_eq!(config.inner_splits, 5);
/// ```
#[derive(Clone, Debug, Default)]
pub struct NestedCvConfigBuilder {
    config: NestedCvConfig,
}

impl NestedCvConfigBuilder {
    /// Sets the number of outer splits.
    #[must_use]
    pub fn outer_splits(mut self, n: usize) -> Self {
        self.config.outer_splits = n;
        self
    }

    /// Sets the outer optimization fraction.
    #[must_use]
    pub fn outer_train_fraction(mut self, fraction: f64) -> Self {
        self.config.outer_train_fraction = fraction;
        self
    }

    /// Sets the number of inner splits.
    #[must_use]
    pub fn inner_splits(mut self, n: usize) -> Self {
        self.config.inner_splits = n;
        self
    }

    /// Sets the inner train fraction.
    #[must_use]
    pub fn inner_train_fraction(mut self, fraction: f64) -> Self {
        self.config.inner_train_fraction = fraction;
        self
    }

    /// Sets the search budget per outer fold.
    #[must_use]
    pub fn n_evaluations(mut self, n: usize) -> Self {
        self.config.n_evaluations = n;
        self
    }

    /// Seeds fold generation, the search and model fitting.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Sets the scoring of inner test subsets.
    #[must_use]
    pub fn inner_scoring(mut self, scoring: Scoring) -> Self {
        self.config.inner_scoring = scoring;
        self
    }

    /// Sets the scoring of outer validation subsets.
    #[must_use]
    pub fn outer_scoring(mut self, scoring: Scoring) -> Self {
        self.config.outer_scoring = scoring;
        self
    }

    /// Sets the per-evaluation failure policy.
    #[must_use]
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    /// Sets the number of startup evaluations sampled uniformly.
    #[must_use]
    pub fn n_startup_trials(mut self, n: usize) -> Self {
        self.config.n_startup_trials = n;
        self
    }

    /// Sets the number of TPE candidates per suggestion.
    #[must_use]
    pub fn n_ei_candidates(mut self, n: usize) -> Self {
        self.config.n_ei_candidates = n;
        self
    }

    /// Sets the TPE good-trial quantile.
    #[must_use]
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.config.gamma = gamma;
        self
    }

    /// Validates and returns the configuration.
    ///
    /// # Errors
    ///
    /// See [`NestedCvConfig::validate`].
    pub fn build(self) -> Result<NestedCvConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
