use std::collections::BTreeMap;

use crate::error::Result;
use crate::objective::Objective;
use crate::param::ParamValue;
use crate::sampler::Sampler;
use crate::space::Configuration;
use crate::study::Study;
use crate::trial::Trial;
use crate::types::{FailurePolicy, TrialFailure};

use super::CvObjective;

/// What one inner search found.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    /// The best candidate as the minimizer saw it, categoricals index-encoded.
    pub encoded: BTreeMap<String, ParamValue>,
    /// The best candidate with every categorical resolved.
    pub configuration: Configuration,
    /// Lowest loss observed.
    pub best_loss: f64,
    /// Best loss after each completed evaluation; never increases.
    pub history: Vec<f64>,
    /// Evaluations that failed and were skipped, with their reasons.
    pub failures: Vec<TrialFailure>,
}

/// Runs the minimizer over one outer fold's objective for a fixed budget.
pub struct InnerSearch<S> {
    sampler: S,
    n_evaluations: usize,
    policy: FailurePolicy,
}

impl<S: Sampler + 'static> InnerSearch<S> {
    /// Creates a driver that spends exactly `n_evaluations` evaluations.
    pub fn new(sampler: S, n_evaluations: usize, policy: FailurePolicy) -> Self {
        Self {
            sampler,
            n_evaluations,
            policy,
        }
    }

    /// Minimizes `objective` and returns the best candidate, decoded.
    ///
    /// # Errors
    ///
    /// Returns `Error::SearchEvaluation` when an evaluation fails under
    /// [`FailurePolicy::Propagate`], and `Error::NoCompletedTrials` when no
    /// evaluation succeeded under [`FailurePolicy::Skip`].
    pub fn search(self, objective: &CvObjective<'_>) -> Result<SearchOutcome> {
        let study = Study::new(self.sampler);
        study.optimize(self.n_evaluations, self.policy, |trial: &mut Trial| {
            objective.evaluate(trial)
        })?;

        let best = study.best_trial()?;
        let encoded = objective.space_params().encoded(&best)?;
        let configuration = objective.family().space().decode(&encoded)?;
        trace_debug!(best_loss = best.value, %configuration, "inner search finished");

        Ok(SearchOutcome {
            encoded,
            configuration,
            best_loss: best.value,
            history: study.best_value_history(),
            failures: study.failures(),
        })
    }
}
