use crate::error::{Error, Result};
use crate::objective::Objective;
use crate::types::FailurePolicy;

use super::Study;

impl Study {
    /// Runs exactly `n_trials` sequential evaluations of `objective`.
    ///
    /// A failed evaluation, including one returning a non-finite loss, is
    /// handled according to `policy`: [`FailurePolicy::Propagate`] aborts
    /// with `Error::SearchEvaluation`, [`FailurePolicy::Skip`] records the
    /// trial and its reason in [`failures`](Study::failures) and moves on.
    ///
    /// # Errors
    ///
    /// Returns `Error::SearchEvaluation` on the first failure under
    /// `Propagate`, and `Error::NoCompletedTrials` if no trial completed.
    ///
    /// # Examples
    ///
    /// ```
    /// use nested_cv::parameter::{FloatParam, Parameter};
    /// use nested_cv::sampler::RandomSampler;
    /// use nested_cv::{FailurePolicy, Study, Trial};
    ///
    /// let study = Study::new(RandomSampler::with_seed(42));
    /// let x = FloatParam::new(-10.0, 10.0);
    ///
    /// study
    ///     .optimize(10, FailurePolicy::Propagate, |trial: &mut Trial| {
    ///         let v = x.suggest(trial)?;
    ///         Ok::<_, nested_cv::Error>(v * v)
    ///     })
    ///     .unwrap();
    ///
    /// assert_eq!(study.n_trials(), 10);
    /// ```
    #[allow(clippy::needless_pass_by_value)]
    pub fn optimize(
        &self,
        n_trials: usize,
        policy: FailurePolicy,
        objective: impl Objective,
    ) -> Result<()> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("optimize", n_trials, ?policy).entered();

        for _ in 0..n_trials {
            let mut trial = self.create_trial();
            let trial_id = trial.id();

            let outcome = match objective.evaluate(&mut trial) {
                Ok(value) if value.is_finite() => Ok(value),
                Ok(value) => Err(format!("non-finite loss {value}")),
                Err(e) => Err(e.to_string()),
            };

            match outcome {
                Ok(value) => {
                    #[cfg(feature = "tracing")]
                    let improved = !self.best_value().is_ok_and(|best| value >= best);
                    self.complete_trial(trial, value);

                    trace_debug!(trial_id, value, "trial completed");
                    #[cfg(feature = "tracing")]
                    if improved {
                        tracing::info!(trial_id, value, "new best value found");
                    }
                }
                Err(reason) => match policy {
                    FailurePolicy::Propagate => {
                        trace_info!(trial_id, %reason, "trial failed, aborting search");
                        return Err(Error::SearchEvaluation { trial_id, reason });
                    }
                    FailurePolicy::Skip => {
                        trace_info!(trial_id, %reason, "trial failed, skipping");
                        self.fail_trial(trial, reason);
                    }
                },
            }
        }

        if self.n_trials() == 0 {
            return Err(Error::NoCompletedTrials);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{FloatParam, Parameter};
    use crate::sampler::tpe::TpeSampler;
    use crate::trial::Trial;

    #[test]
    fn propagate_aborts_on_first_failure() {
        let study = Study::default();
        let result = study.optimize(5, FailurePolicy::Propagate, |trial: &mut Trial| {
            if trial.id() == 2 {
                Err("degenerate split")
            } else {
                Ok(1.0)
            }
        });
        assert!(matches!(
            result,
            Err(Error::SearchEvaluation { trial_id: 2, .. })
        ));
        assert_eq!(study.n_trials(), 2);
    }

    #[test]
    fn skip_continues_past_failures() {
        let study = Study::default();
        study
            .optimize(6, FailurePolicy::Skip, |trial: &mut Trial| {
                if trial.id() % 2 == 0 {
                    Err("bad candidate")
                } else {
                    Ok(0.5)
                }
            })
            .unwrap();
        assert_eq!(study.n_trials(), 3);
        let failed: Vec<u64> = study.failures().iter().map(|f| f.trial_id).collect();
        assert_eq!(failed, vec![0, 2, 4]);
        assert!(study.failures().iter().all(|f| f.reason == "bad candidate"));
    }

    #[test]
    fn skip_with_no_successes_is_an_error() {
        let study = Study::default();
        let result = study.optimize(3, FailurePolicy::Skip, |_: &mut Trial| {
            Err::<f64, _>("always")
        });
        assert!(matches!(result, Err(Error::NoCompletedTrials)));
    }

    #[test]
    fn nan_loss_counts_as_failure() {
        let study = Study::default();
        let result = study.optimize(1, FailurePolicy::Propagate, |_: &mut Trial| {
            Ok::<_, Error>(f64::NAN)
        });
        assert!(matches!(result, Err(Error::SearchEvaluation { .. })));
    }

    #[test]
    fn optimal_loss_does_not_shorten_the_budget() {
        let study = Study::default();
        study
            .optimize(7, FailurePolicy::Propagate, |_: &mut Trial| Ok::<_, Error>(0.0))
            .unwrap();
        assert_eq!(study.n_trials(), 7);
        assert_eq!(study.best_value_history(), vec![0.0; 7]);
    }

    #[test]
    fn tpe_improves_on_quadratic() {
        let study = Study::new(TpeSampler::builder().seed(7).build().unwrap());
        let x = FloatParam::new(-5.0, 5.0);
        study
            .optimize(60, FailurePolicy::Propagate, |trial: &mut Trial| {
                let v = x.suggest(trial)?;
                Ok::<_, Error>((v - 1.0).powi(2))
            })
            .unwrap();

        let history = study.best_value_history();
        assert_eq!(history.len(), 60);
        assert!(history.windows(2).all(|w| w[1] <= w[0]));
        assert!(study.best_value().unwrap() < 0.1);
    }
}
