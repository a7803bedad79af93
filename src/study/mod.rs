//! Study implementation for managing minimization trials.

use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::{Error, Result};
use crate::sampler::tpe::TpeSampler;
use crate::sampler::{CompletedTrial, Sampler};
use crate::trial::Trial;
use crate::types::TrialFailure;

mod optimize;

/// A study drives one black-box minimization: it hands out trials wired to
/// its sampler, records their losses and tracks the best one.
///
/// Only completed trials enter the history the sampler learns from. Failed
/// trials are kept apart with their reasons, see [`failures`](Self::failures).
///
/// # Examples
///
/// ```
/// use nested_cv::Study;
/// use nested_cv::parameter::{FloatParam, Parameter};
/// use nested_cv::sampler::RandomSampler;
///
/// let study = Study::new(RandomSampler::with_seed(3));
/// let x = FloatParam::new(0.0, 1.0);
///
/// let mut trial = study.create_trial();
/// let v = x.suggest(&mut trial).unwrap();
/// study.complete_trial(trial, v * v);
///
/// assert_eq!(study.n_trials(), 1);
/// ```
pub struct Study {
    sampler: Arc<dyn Sampler>,
    trials: Arc<RwLock<Vec<CompletedTrial>>>,
    next_id: AtomicU64,
    failures: Mutex<Vec<TrialFailure>>,
}

impl Study {
    /// Creates a study that samples with `sampler`.
    #[must_use]
    pub fn new(sampler: impl Sampler + 'static) -> Self {
        Self {
            sampler: Arc::new(sampler),
            trials: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicU64::new(0),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Creates a new trial with a unique, increasing id.
    #[must_use]
    pub fn create_trial(&self) -> Trial {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Trial::with_sampler(id, Arc::clone(&self.sampler), Arc::clone(&self.trials))
    }

    /// Records a completed trial with its loss.
    pub fn complete_trial(&self, trial: Trial, value: f64) {
        let completed = trial.into_completed(value);
        self.trials.write().push(completed);
    }

    /// Records a trial as failed with `error` as its reason. Failed trials
    /// stay out of the history.
    #[allow(clippy::needless_pass_by_value)]
    pub fn fail_trial(&self, trial: Trial, error: impl ToString) {
        self.failures.lock().push(TrialFailure {
            trial_id: trial.id(),
            reason: error.to_string(),
        });
    }

    /// Returns a snapshot of all completed trials in completion order.
    #[must_use]
    pub fn trials(&self) -> Vec<CompletedTrial> {
        self.trials.read().clone()
    }

    /// Returns the number of completed trials.
    #[must_use]
    pub fn n_trials(&self) -> usize {
        self.trials.read().len()
    }

    /// Returns the number of failed trials.
    #[must_use]
    pub fn n_failed_trials(&self) -> usize {
        self.failures.lock().len()
    }

    /// Returns every failed trial with its reason, in failure order.
    #[must_use]
    pub fn failures(&self) -> Vec<TrialFailure> {
        self.failures.lock().clone()
    }

    /// Returns the completed trial with the lowest loss.
    ///
    /// Ties go to the trial that completed first.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCompletedTrials` if nothing has completed.
    pub fn best_trial(&self) -> Result<CompletedTrial> {
        let trials = self.trials.read();
        let mut best: Option<&CompletedTrial> = None;
        for trial in trials.iter() {
            if best.is_none_or(|b| trial.value < b.value) {
                best = Some(trial);
            }
        }
        best.cloned().ok_or(Error::NoCompletedTrials)
    }

    /// Returns the lowest loss seen so far.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCompletedTrials` if nothing has completed.
    pub fn best_value(&self) -> Result<f64> {
        self.best_trial().map(|t| t.value)
    }

    /// Returns the best-loss-so-far after each completed trial.
    ///
    /// The sequence is non-increasing.
    #[must_use]
    pub fn best_value_history(&self) -> Vec<f64> {
        let trials = self.trials.read();
        let mut best = f64::INFINITY;
        trials
            .iter()
            .map(|t| {
                best = best.min(t.value);
                best
            })
            .collect()
    }
}

impl Default for Study {
    fn default() -> Self {
        Self::new(TpeSampler::new())
    }
}
