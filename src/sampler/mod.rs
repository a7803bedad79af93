//! Sampler trait and implementations for parameter sampling.

pub mod random;
pub mod tpe;

use std::collections::HashMap;

use crate::distribution::Distribution;
use crate::param::ParamValue;
use crate::parameter::{ParamId, Parameter};
use crate::types::TrialState;

pub use random::RandomSampler;
pub use tpe::TpeSampler;

/// A completed trial with its parameters, distributions, and objective value.
///
/// Completed trials form the history that model-based samplers learn from.
#[derive(Clone, Debug)]
pub struct CompletedTrial {
    /// The unique identifier for this trial.
    pub id: u64,
    /// The sampled parameter values, keyed by parameter id.
    pub params: HashMap<ParamId, ParamValue>,
    /// The parameter distributions used, keyed by parameter id.
    pub distributions: HashMap<ParamId, Distribution>,
    /// Human-readable labels for parameters, keyed by parameter id.
    pub param_labels: HashMap<ParamId, String>,
    /// The objective value returned by the objective function.
    pub value: f64,
    /// The state of the trial.
    pub state: TrialState,
}

impl CompletedTrial {
    /// Creates a new completed trial.
    #[must_use]
    pub fn new(
        id: u64,
        params: HashMap<ParamId, ParamValue>,
        distributions: HashMap<ParamId, Distribution>,
        param_labels: HashMap<ParamId, String>,
        value: f64,
    ) -> Self {
        Self {
            id,
            params,
            distributions,
            param_labels,
            value,
            state: TrialState::Complete,
        }
    }

    /// Returns the typed value for the given parameter.
    ///
    /// Returns `None` if the parameter was not used in this trial or the
    /// stored value does not fit the parameter.
    pub fn get<P: Parameter>(&self, param: &P) -> Option<P::Value> {
        self.params
            .get(&param.id())
            .and_then(|v| param.cast_param_value(v).ok())
    }
}

/// Trait for pluggable parameter sampling strategies.
///
/// Samplers generate parameter values based on the distribution and the
/// historical values of the same parameter. The trait requires
/// `Send + Sync` so a study can be shared across threads.
pub trait Sampler: Send + Sync {
    /// Samples a parameter value from the given distribution.
    ///
    /// # Arguments
    ///
    /// * `distribution` - The parameter distribution to sample from.
    /// * `param_id` - The parameter being sampled, used to look up its past values.
    /// * `trial_id` - The unique ID of the trial being sampled for.
    /// * `history` - Historical completed trials for informed sampling.
    fn sample(
        &self,
        distribution: &Distribution,
        param_id: ParamId,
        trial_id: u64,
        history: &[CompletedTrial],
    ) -> ParamValue;
}
