//! Nested cross-validation.
//!
//! The outer loop draws [`NestedCvConfig::outer_splits`] stratified
//! optimization/validation splits once, up front, and reuses them for every
//! model family. Per outer fold it:
//!
//! 1. binds a [`CvObjective`] to the optimization subset,
//! 2. runs an [`InnerSearch`] of [`NestedCvConfig::n_evaluations`] TPE
//!    evaluations, each scored by mean AUC over the inner splits,
//! 3. decodes the best candidate into a [`Configuration`],
//! 4. refits that configuration on the whole optimization subset,
//! 5. scores it on the validation subset and records a [`TrialRecord`].
//!
//! Every fold derives its own seeds from the master seed and its index, so
//! sequential and parallel runs produce the same records.
//!
//! # Examples
//!
//! ```
//! use nested_cv::dataset::Dataset;
//! use nested_cv::model::SvcFamily;
//! use nested_cv::nested::{NestedCv, NestedCvConfig};
//!
//! let features: Vec<Vec<f64>> = (0..40)
//!     .map(|i| vec![f64::from(i % 20), f64::from(i / 20)])
//!     .collect();
//! let labels = (0..40).map(|i| i / 20).collect();
//! let data = Dataset::new(vec!["a".into(), "b".into()], features, labels).unwrap();
//!
//! let config = NestedCvConfig::builder()
//!     .outer_splits(2)
//!     .inner_splits(2)
//!     .n_evaluations(4)
//!     .seed(1)
//!     .build()
//!     .unwrap();
//! let cv = NestedCv::new(data, config).unwrap();
//! let result = cv.run(&SvcFamily::new()).unwrap();
//!
//! assert_eq!(result.records().len(), 2);
//! let best = result.best().unwrap();
//! assert!((0.0..=1.0).contains(&best.score));
//! ```

mod adapter;
mod aggregate;
mod config;
mod driver;
mod report;

pub use adapter::CvObjective;
pub use aggregate::{FamilyResult, TrialRecord, rank, select};
pub use config::{NestedCvConfig, NestedCvConfigBuilder};
pub use driver::{InnerSearch, SearchOutcome};
pub use report::NestedCvReport;

use std::sync::Arc;

use crate::dataset::{DataView, Dataset};
use crate::error::{Error, Result};
use crate::folds::Split;
use crate::model::ModelFamily;
use crate::rng_util;
use crate::space::Configuration;

// Streams derived from a fold seed.
const INNER_SPLIT_STREAM: u64 = 0;
const SAMPLER_STREAM: u64 = 1;
const MODEL_STREAM: u64 = 2;
const REFIT_STREAM: u64 = 3;

/// A nested cross-validation run over one dataset.
///
/// The dataset is held behind an [`Arc`]; pass an `Arc<Dataset>` to share it
/// with other runs without copying.
pub struct NestedCv {
    dataset: Arc<Dataset>,
    config: NestedCvConfig,
    outer: Vec<Split>,
    fold_seeds: Vec<u64>,
}

impl NestedCv {
    /// Validates `config` and draws the outer splits.
    ///
    /// # Errors
    ///
    /// Returns configuration errors, `Error::NotBinary` unless the dataset
    /// has exactly two classes, and `Error::InsufficientSamples` if the
    /// outer splits cannot be stratified.
    pub fn new(dataset: impl Into<Arc<Dataset>>, config: NestedCvConfig) -> Result<Self> {
        let dataset = dataset.into();
        config.validate()?;
        let n_classes = dataset.classes().len();
        if n_classes != 2 {
            return Err(Error::NotBinary { n_classes });
        }

        let outer = config.outer_splitter(config.seed)?.split(dataset.labels())?;
        let mut rng = rng_util::seeded(config.seed.map(|s| rng_util::derive_seed(s, u64::MAX)));
        let fold_seeds = (0..outer.len()).map(|_| rng.u64(..)).collect();

        trace_info!(
            n_samples = dataset.n_samples(),
            outer_splits = outer.len(),
            "outer splits drawn"
        );
        Ok(Self {
            dataset,
            config,
            outer,
            fold_seeds,
        })
    }

    /// Returns the dataset under evaluation.
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Returns the run configuration.
    #[must_use]
    pub fn config(&self) -> &NestedCvConfig {
        &self.config
    }

    /// Returns the outer splits shared by every family.
    #[must_use]
    pub fn outer_splits(&self) -> &[Split] {
        &self.outer
    }

    /// Runs outer fold `fold` for `family`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Internal` for an out-of-range fold, and any error
    /// raised by the inner search, the refit or the validation scoring.
    pub fn run_fold(&self, family: &dyn ModelFamily, fold: usize) -> Result<TrialRecord> {
        let (Some(split), Some(&seed)) = (self.outer.get(fold), self.fold_seeds.get(fold)) else {
            return Err(Error::Internal("outer fold index out of range"));
        };
        evaluate_fold(&self.dataset, &self.config, family, fold, split, seed)
    }

    /// Runs every outer fold for `family`, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing fold and returns its error; no partial
    /// result is produced.
    pub fn run(&self, family: &dyn ModelFamily) -> Result<FamilyResult> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("nested_cv", family = family.name()).entered();

        let records = (0..self.outer.len())
            .map(|fold| self.run_fold(family, fold))
            .collect::<Result<Vec<_>>>()?;
        let result = FamilyResult::new(family.name(), records);
        log_selection(&result);
        Ok(result)
    }

    /// Runs every family on the same outer splits.
    ///
    /// # Errors
    ///
    /// Returns the first error of any family.
    pub fn compare(&self, families: &[&dyn ModelFamily]) -> Result<NestedCvReport> {
        let results = families
            .iter()
            .map(|family| self.run(*family))
            .collect::<Result<Vec<_>>>()?;
        Ok(NestedCvReport::new(results))
    }
}

#[cfg(feature = "async")]
impl NestedCv {
    /// Runs the outer folds for `family` concurrently.
    ///
    /// Up to `concurrency` folds run at once on
    /// [`spawn_blocking`](tokio::task::spawn_blocking) threads. Records are
    /// re-sorted by fold, so the result equals [`run`](Self::run) for a
    /// seeded configuration. Once a fold fails no further fold is started,
    /// and folds not yet running are aborted.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCount` for zero concurrency, the first fold
    /// error observed, and `Error::TaskError` if a task panics or the
    /// semaphore is closed.
    pub async fn run_parallel(
        &self,
        family: Arc<dyn ModelFamily>,
        concurrency: usize,
    ) -> Result<FamilyResult> {
        use core::sync::atomic::{AtomicBool, Ordering};

        use tokio::sync::Semaphore;
        use tokio::task::JoinSet;

        if concurrency == 0 {
            return Err(Error::InvalidCount {
                what: "concurrency",
            });
        }

        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("nested_cv_parallel", family = family.name(), concurrency)
            .entered();

        let config = Arc::new(self.config.clone());
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let failed = Arc::new(AtomicBool::new(false));
        let mut join_set: JoinSet<Result<TrialRecord>> = JoinSet::new();
        let mut records = Vec::with_capacity(self.outer.len());

        for (fold, (split, &seed)) in self.outer.iter().zip(&self.fold_seeds).enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| Error::TaskError(e.to_string()))?;
            if failed.load(Ordering::Acquire) {
                break;
            }
            while let Some(joined) = join_set.try_join_next() {
                match joined_record(joined) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        join_set.abort_all();
                        return Err(e);
                    }
                }
            }

            let dataset = Arc::clone(&self.dataset);
            let config = Arc::clone(&config);
            let family = Arc::clone(&family);
            let failed = Arc::clone(&failed);
            let split = split.clone();

            join_set.spawn_blocking(move || {
                let record = evaluate_fold(&dataset, &config, family.as_ref(), fold, &split, seed);
                if record.is_err() {
                    failed.store(true, Ordering::Release);
                }
                drop(permit);
                record
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined_record(joined) {
                Ok(record) => records.push(record),
                Err(e) => {
                    trace_info!(error = %e, "fold failed, aborting remaining folds");
                    join_set.abort_all();
                    return Err(e);
                }
            }
        }

        let result = FamilyResult::new(family.name(), records);
        log_selection(&result);
        Ok(result)
    }
}

#[cfg(feature = "async")]
fn joined_record(
    joined: core::result::Result<Result<TrialRecord>, tokio::task::JoinError>,
) -> Result<TrialRecord> {
    match joined {
        Ok(record) => record,
        Err(e) => Err(Error::TaskError(e.to_string())),
    }
}

/// Search, refit and validate one outer fold.
fn evaluate_fold(
    dataset: &Dataset,
    config: &NestedCvConfig,
    family: &dyn ModelFamily,
    fold: usize,
    split: &Split,
    seed: u64,
) -> Result<TrialRecord> {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("outer_fold", fold).entered();

    let optimization = dataset.view(split.train.clone())?;
    let validation = dataset.view(split.test.clone())?;

    let inner_splitter =
        config.inner_splitter(Some(rng_util::derive_seed(seed, INNER_SPLIT_STREAM)))?;
    let objective = CvObjective::new(
        family,
        optimization.clone(),
        &inner_splitter,
        config.inner_scoring,
        rng_util::derive_seed(seed, MODEL_STREAM),
    )?;
    let sampler = config.sampler(Some(rng_util::derive_seed(seed, SAMPLER_STREAM)))?;
    let outcome =
        InnerSearch::new(sampler, config.n_evaluations, config.failure_policy).search(&objective)?;

    let score = refit_and_score(
        family,
        &outcome.configuration,
        &optimization,
        &validation,
        config,
        rng_util::derive_seed(seed, REFIT_STREAM),
    )?;

    trace_info!(
        fold,
        score,
        inner_score = -outcome.best_loss,
        n_failed = outcome.failures.len(),
        "fold recorded"
    );
    Ok(TrialRecord {
        fold,
        score,
        inner_score: -outcome.best_loss,
        configuration: outcome.configuration,
    })
}

fn refit_and_score(
    family: &dyn ModelFamily,
    configuration: &Configuration,
    optimization: &DataView<'_>,
    validation: &DataView<'_>,
    config: &NestedCvConfig,
    seed: u64,
) -> Result<f64> {
    let predictor = family
        .build(configuration, seed)?
        .fit(&optimization.rows(), &optimization.labels())?;
    config
        .outer_scoring
        .score(predictor.as_ref(), &validation.rows(), &validation.labels())
}

#[cfg(feature = "tracing")]
fn log_selection(result: &FamilyResult) {
    if let Ok(best) = result.best() {
        tracing::info!(
            family = result.family(),
            fold = best.fold,
            score = best.score,
            configuration = %best.configuration,
            "best configuration selected"
        );
    }
}

#[cfg(not(feature = "tracing"))]
fn log_selection(_result: &FamilyResult) {}
