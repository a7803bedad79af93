#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Nested cross-validation with tree-structured Parzen estimator (TPE)
//! hyperparameter search, for comparing binary classifier families without
//! optimistic bias.
//!
//! An outer loop of repeated stratified splits holds out validation data
//! that tuning never sees. Inside each outer fold, a TPE minimizer searches
//! the family's hyperparameter space, scoring every candidate by mean ROC
//! AUC over inner stratified splits of the optimization data. The winner is
//! refitted on the whole optimization subset and scored on the held-out
//! subset.
//!
//! # Getting Started
//!
//! ```
//! use nested_cv::prelude::*;
//!
//! let features: Vec<Vec<f64>> = (0..60)
//!     .map(|i| vec![f64::from(i % 30) / 30.0, f64::from(i / 30)])
//!     .collect();
//! let labels = (0..60).map(|i| i / 30).collect();
//! let data = Dataset::new(vec!["x".into(), "y".into()], features, labels).unwrap();
//!
//! let config = NestedCvConfig::builder()
//!     .outer_splits(3)
//!     .inner_splits(2)
//!     .n_evaluations(5)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! let cv = NestedCv::new(data, config).unwrap();
//!
//! let trees = ExtraTreesFamily::with_space(
//!     SearchSpace::new()
//!         .choice("n_estimators", [5_i64, 10])
//!         .choice("criterion", ["gini", "entropy"]),
//! );
//! let report = cv.compare(&[&trees]).unwrap();
//!
//! let best = report.family("extra_trees").unwrap().best().unwrap();
//! println!("fold {} scored {:.3} with {}", best.fold, best.score, best.configuration);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Dataset`](dataset::Dataset) | Feature matrix and binary labels, loadable from CSV. |
//! | [`StratifiedShuffleSplit`](folds::StratifiedShuffleSplit) | Repeated stratified train/test sampling. |
//! | [`SearchSpace`](space::SearchSpace) | Continuous ranges and categorical choices, decoded into a [`Configuration`](space::Configuration). |
//! | [`ModelFamily`](model::ModelFamily) | Builds an [`Estimator`](model::Estimator) from a configuration. Ships with [`SvcFamily`](model::SvcFamily) and [`ExtraTreesFamily`](model::ExtraTreesFamily). |
//! | [`Study`] | The minimizer: creates trials, records losses, tracks the best. |
//! | [`NestedCv`](nested::NestedCv) | The outer loop producing a [`FamilyResult`](nested::FamilyResult) per family. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `async` | Parallel outer folds via tokio ([`NestedCv::run_parallel`](nested::NestedCv::run_parallel)) | off |
//! | `serde` | `Serialize`/`Deserialize` on configs, spaces and results, JSON import/export | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) at key points of the search | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

pub mod dataset;
mod distribution;
mod error;
pub mod folds;
mod kde;
pub mod metrics;
pub mod model;
pub mod nested;
pub mod objective;
mod param;
pub mod parameter;
mod rng_util;
pub mod sampler;
pub mod space;
mod study;
mod trial;
mod types;

pub use distribution::{CategoricalDistribution, Distribution, FloatDistribution};
pub use error::{Error, Result};
pub use objective::Objective;
pub use param::ParamValue;
pub use study::Study;
pub use trial::Trial;
pub use types::{FailurePolicy, TrialFailure, TrialState};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use nested_cv::prelude::*;
/// ```
pub mod prelude {
    pub use crate::dataset::{DataView, Dataset};
    pub use crate::error::{Error, Result};
    pub use crate::folds::{Split, StratifiedShuffleSplit};
    pub use crate::metrics::{Scoring, roc_auc};
    pub use crate::model::{
        Estimator, ExtraTrees, ExtraTreesFamily, ModelFamily, Predictor, Svc, SvcFamily,
    };
    pub use crate::nested::{
        FamilyResult, NestedCv, NestedCvConfig, NestedCvReport, TrialRecord,
    };
    pub use crate::objective::Objective;
    pub use crate::param::ParamValue;
    pub use crate::parameter::{CategoricalParam, FloatParam, Parameter};
    pub use crate::sampler::{CompletedTrial, RandomSampler, TpeSampler};
    pub use crate::space::{Configuration, Domain, HyperValue, SearchSpace};
    pub use crate::study::Study;
    pub use crate::trial::Trial;
    pub use crate::types::{FailurePolicy, TrialFailure, TrialState};
}
