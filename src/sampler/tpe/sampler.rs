use std::sync::Arc;

use parking_lot::Mutex;

use super::common;
use super::gamma::{FixedGamma, GammaStrategy};
use crate::distribution::Distribution;
use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::parameter::ParamId;
use crate::rng_util;
use crate::sampler::random::sample_uniform;
use crate::sampler::{CompletedTrial, Sampler};

/// A Tree-Parzen Estimator sampler.
///
/// Completed trials are split at the gamma quantile of their loss into a
/// "good" and a "bad" group. For each parameter, a Parzen estimator is fit to
/// the good values, l(x), and one to the bad values, g(x); the next value is
/// the candidate drawn from l(x) that maximizes l(x)/g(x). The first
/// `n_startup_trials` are sampled uniformly.
///
/// # Examples
///
/// ```
/// use nested_cv::sampler::tpe::TpeSampler;
///
/// let sampler = TpeSampler::builder()
///     .gamma(0.2)
///     .n_startup_trials(5)
///     .seed(7)
///     .build()
///     .unwrap();
/// ```
pub struct TpeSampler {
    gamma_strategy: Arc<dyn GammaStrategy>,
    n_startup_trials: usize,
    n_ei_candidates: usize,
    /// Fixed KDE bandwidth; Scott's rule when `None`.
    kde_bandwidth: Option<f64>,
    rng: Mutex<fastrand::Rng>,
}

impl TpeSampler {
    /// Creates a TPE sampler with default settings.
    ///
    /// Defaults: [`FixedGamma`] of 0.25, 10 startup trials, 24 EI candidates,
    /// Scott's rule bandwidth and an unseeded RNG.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gamma_strategy: Arc::new(FixedGamma::default()),
            n_startup_trials: 10,
            n_ei_candidates: 24,
            kde_bandwidth: None,
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Creates a builder for configuring a TPE sampler.
    #[must_use]
    pub fn builder() -> TpeSamplerBuilder {
        TpeSamplerBuilder::new()
    }

    /// Returns the gamma strategy used by this sampler.
    #[must_use]
    pub fn gamma_strategy(&self) -> &dyn GammaStrategy {
        self.gamma_strategy.as_ref()
    }

    /// Returns the number of uniformly sampled startup trials.
    #[must_use]
    pub fn n_startup_trials(&self) -> usize {
        self.n_startup_trials
    }

    /// Splits the trials that sampled `param_id` into good and bad groups.
    ///
    /// Trials are ordered by loss ascending; ties keep history order.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn split_trials<'a>(
        &self,
        history: &'a [CompletedTrial],
        param_id: ParamId,
    ) -> (Vec<&'a CompletedTrial>, Vec<&'a CompletedTrial>) {
        let mut relevant: Vec<&CompletedTrial> = history
            .iter()
            .filter(|t| t.params.contains_key(&param_id))
            .collect();
        if relevant.len() < 2 {
            return (vec![], vec![]);
        }

        relevant.sort_by(|a, b| a.value.total_cmp(&b.value));

        let gamma = self
            .gamma_strategy
            .gamma(relevant.len())
            .clamp(f64::EPSILON, 1.0 - f64::EPSILON);

        // At least one trial in each group.
        let n_good = ((relevant.len() as f64 * gamma).ceil() as usize)
            .max(1)
            .min(relevant.len() - 1);

        let bad = relevant.split_off(n_good);
        (relevant, bad)
    }
}

impl Default for TpeSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for TpeSampler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TpeSampler")
            .field("gamma_strategy", &self.gamma_strategy)
            .field("n_startup_trials", &self.n_startup_trials)
            .field("n_ei_candidates", &self.n_ei_candidates)
            .field("kde_bandwidth", &self.kde_bandwidth)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TpeSampler`].
///
/// Validation is deferred to [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct TpeSamplerBuilder {
    gamma_strategy: Box<dyn GammaStrategy>,
    /// Raw gamma value, validated at `build()`.
    raw_gamma: Option<f64>,
    n_startup_trials: usize,
    n_ei_candidates: usize,
    kde_bandwidth: Option<f64>,
    seed: Option<u64>,
}

impl TpeSamplerBuilder {
    /// Creates a builder with the same defaults as [`TpeSampler::new`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            gamma_strategy: Box::new(FixedGamma::default()),
            raw_gamma: None,
            n_startup_trials: 10,
            n_ei_candidates: 24,
            kde_bandwidth: None,
            seed: None,
        }
    }

    /// Sets a fixed gamma quantile. Must be in (0.0, 1.0).
    #[must_use]
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.raw_gamma = Some(gamma);
        self
    }

    /// Sets a custom gamma strategy. Overridden by [`gamma`](Self::gamma).
    #[must_use]
    pub fn gamma_strategy<G: GammaStrategy + 'static>(mut self, strategy: G) -> Self {
        self.gamma_strategy = Box::new(strategy);
        self
    }

    /// Sets the number of uniformly sampled trials before TPE kicks in.
    #[must_use]
    pub fn n_startup_trials(mut self, n: usize) -> Self {
        self.n_startup_trials = n;
        self
    }

    /// Sets the number of candidates drawn from l(x) per sample.
    #[must_use]
    pub fn n_ei_candidates(mut self, n: usize) -> Self {
        self.n_ei_candidates = n;
        self
    }

    /// Fixes the KDE bandwidth instead of using Scott's rule.
    #[must_use]
    pub fn kde_bandwidth(mut self, bandwidth: f64) -> Self {
        self.kde_bandwidth = Some(bandwidth);
        self
    }

    /// Seeds the sampler's RNG.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets or clears the seed.
    #[must_use]
    pub fn maybe_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the sampler.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidGamma` if a raw gamma is outside (0.0, 1.0) and
    /// `Error::InvalidBandwidth` if the bandwidth is not positive.
    pub fn build(self) -> Result<TpeSampler> {
        let gamma_strategy: Arc<dyn GammaStrategy> = if let Some(raw) = self.raw_gamma {
            Arc::new(FixedGamma::new(raw)?)
        } else {
            Arc::from(self.gamma_strategy)
        };

        if let Some(bw) = self.kde_bandwidth
            && bw <= 0.0
        {
            return Err(Error::InvalidBandwidth(bw));
        }

        Ok(TpeSampler {
            gamma_strategy,
            n_startup_trials: self.n_startup_trials,
            n_ei_candidates: self.n_ei_candidates,
            kde_bandwidth: self.kde_bandwidth,
            rng: Mutex::new(rng_util::seeded(self.seed)),
        })
    }
}

impl Default for TpeSamplerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for TpeSampler {
    fn sample(
        &self,
        distribution: &Distribution,
        param_id: ParamId,
        _trial_id: u64,
        history: &[CompletedTrial],
    ) -> ParamValue {
        let mut rng = self.rng.lock();

        if history.len() < self.n_startup_trials {
            return sample_uniform(distribution, &mut rng);
        }

        let (good_trials, bad_trials) = self.split_trials(history, param_id);
        if good_trials.is_empty() || bad_trials.is_empty() {
            return sample_uniform(distribution, &mut rng);
        }

        let values_of = |trials: &[&CompletedTrial]| -> Vec<ParamValue> {
            trials
                .iter()
                .filter_map(|t| t.params.get(&param_id).cloned())
                .collect()
        };
        let good = values_of(&good_trials);
        let bad = values_of(&bad_trials);

        match distribution {
            Distribution::Float(d) => {
                let floats = |values: Vec<ParamValue>| -> Vec<f64> {
                    values
                        .into_iter()
                        .filter_map(|v| match v {
                            ParamValue::Float(f) if f >= d.low && f <= d.high => Some(f),
                            _ => None,
                        })
                        .collect()
                };
                let good_values = floats(good);
                let bad_values = floats(bad);
                if good_values.is_empty() || bad_values.is_empty() {
                    return sample_uniform(distribution, &mut rng);
                }

                ParamValue::Float(common::sample_tpe_float(
                    d.low,
                    d.high,
                    d.log_scale,
                    good_values,
                    bad_values,
                    self.n_ei_candidates,
                    self.kde_bandwidth,
                    &mut rng,
                ))
            }
            Distribution::Categorical(d) => {
                let indices = |values: Vec<ParamValue>| -> Vec<usize> {
                    values
                        .into_iter()
                        .filter_map(|v| match v {
                            ParamValue::Categorical(i) if i < d.n_choices => Some(i),
                            _ => None,
                        })
                        .collect()
                };
                let good_indices = indices(good);
                let bad_indices = indices(bad);
                if good_indices.is_empty() || bad_indices.is_empty() {
                    return sample_uniform(distribution, &mut rng);
                }

                ParamValue::Categorical(common::sample_tpe_categorical(
                    d.n_choices,
                    &good_indices,
                    &bad_indices,
                    &mut rng,
                ))
            }
        }
    }
}
