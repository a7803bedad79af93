//! Trial lifecycle and failure handling shared by the minimizer and the nested loop.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The state of a trial in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TrialState {
    /// The trial is currently running.
    Running,
    /// The trial completed successfully.
    Complete,
}

/// What the minimizer does when a single candidate evaluation fails.
///
/// The default, [`Propagate`](FailurePolicy::Propagate), aborts the search
/// with [`Error::SearchEvaluation`](crate::Error::SearchEvaluation).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FailurePolicy {
    /// Abort the search on the first failed evaluation.
    #[default]
    Propagate,
    /// Record the evaluation as failed, keep it out of the sampler history,
    /// and continue with the next candidate.
    Skip,
}

/// An evaluation that failed and was skipped under [`FailurePolicy::Skip`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrialFailure {
    /// The id of the failed trial within its search.
    pub trial_id: u64,
    /// The error reported by the objective.
    pub reason: String,
}
