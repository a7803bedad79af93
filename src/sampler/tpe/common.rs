//! TPE sampling kernels for float and categorical distributions.

use crate::kde::KernelDensityEstimator;
use crate::rng_util;

/// Samples a float by drawing candidates from l(x) and keeping the best l(x)/g(x).
#[allow(clippy::too_many_arguments)]
pub(crate) fn sample_tpe_float(
    low: f64,
    high: f64,
    log_scale: bool,
    good_values: Vec<f64>,
    bad_values: Vec<f64>,
    n_ei_candidates: usize,
    kde_bandwidth: Option<f64>,
    rng: &mut fastrand::Rng,
) -> f64 {
    // Log-scale parameters are modelled in log space.
    let (internal_low, internal_high, good_internal, bad_internal) = if log_scale {
        let to_log = |mut v: Vec<f64>| {
            for x in &mut v {
                *x = x.ln();
            }
            v
        };
        (low.ln(), high.ln(), to_log(good_values), to_log(bad_values))
    } else {
        (low, high, good_values, bad_values)
    };

    let l_kde = match kde_bandwidth {
        Some(bw) => KernelDensityEstimator::with_bandwidth(good_internal, bw),
        None => KernelDensityEstimator::new(good_internal),
    };
    let g_kde = match kde_bandwidth {
        Some(bw) => KernelDensityEstimator::with_bandwidth(bad_internal, bw),
        None => KernelDensityEstimator::new(bad_internal),
    };

    let (Ok(l_kde), Ok(g_kde)) = (l_kde, g_kde) else {
        return rng_util::f64_range(rng, low, high);
    };

    let mut best_candidate = internal_low;
    let mut best_ratio = f64::NEG_INFINITY;

    for _ in 0..n_ei_candidates.max(1) {
        let candidate = l_kde.sample(rng).clamp(internal_low, internal_high);

        let l_density = l_kde.pdf(candidate);
        let g_density = g_kde.pdf(candidate);

        let ratio = if g_density < f64::EPSILON {
            if l_density > f64::EPSILON {
                f64::INFINITY
            } else {
                0.0
            }
        } else {
            l_density / g_density
        };

        if ratio > best_ratio {
            best_ratio = ratio;
            best_candidate = candidate;
        }
    }

    let value = if log_scale {
        best_candidate.exp()
    } else {
        best_candidate
    };

    value.clamp(low, high)
}

/// Samples a categorical index proportionally to smoothed l(x)/g(x) weights.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn sample_tpe_categorical(
    n_choices: usize,
    good_indices: &[usize],
    bad_indices: &[usize],
    rng: &mut fastrand::Rng,
) -> usize {
    let mut good_counts = vec![0usize; n_choices];
    let mut bad_counts = vec![0usize; n_choices];

    for &idx in good_indices {
        if idx < n_choices {
            good_counts[idx] += 1;
        }
    }
    for &idx in bad_indices {
        if idx < n_choices {
            bad_counts[idx] += 1;
        }
    }

    // Laplace smoothing
    let good_total = good_indices.len() as f64 + n_choices as f64;
    let bad_total = bad_indices.len() as f64 + n_choices as f64;

    let weights: Vec<f64> = good_counts
        .iter()
        .zip(&bad_counts)
        .map(|(&g, &b)| ((g as f64 + 1.0) / good_total) / ((b as f64 + 1.0) / bad_total))
        .collect();

    let total_weight: f64 = weights.iter().sum();
    let threshold = rng.f64() * total_weight;

    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w;
        if cumulative >= threshold {
            return i;
        }
    }

    n_choices - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_sample_respects_bounds() {
        let mut rng = fastrand::Rng::with_seed(1);
        for _ in 0..50 {
            let v = sample_tpe_float(
                0.0,
                1.0,
                false,
                vec![0.1, 0.15, 0.2],
                vec![0.7, 0.8, 0.9, 0.95],
                24,
                None,
                &mut rng,
            );
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn float_sample_prefers_good_region() {
        let mut rng = fastrand::Rng::with_seed(2);
        let draws: Vec<f64> = (0..200)
            .map(|_| {
                sample_tpe_float(
                    0.0,
                    10.0,
                    false,
                    vec![1.0, 1.2, 0.9, 1.1],
                    vec![7.0, 8.0, 9.0, 6.5, 8.5],
                    24,
                    None,
                    &mut rng,
                )
            })
            .collect();
        let near_good = draws.iter().filter(|&&v| v < 5.0).count();
        assert!(near_good > 150, "only {near_good} draws near the good region");
    }

    #[test]
    fn log_scale_sample_stays_positive() {
        let mut rng = fastrand::Rng::with_seed(3);
        let v = sample_tpe_float(
            1e-3,
            1e2,
            true,
            vec![0.01, 0.02],
            vec![10.0, 50.0],
            24,
            None,
            &mut rng,
        );
        assert!((1e-3..=1e2).contains(&v));
    }

    #[test]
    fn categorical_sample_favors_good_choice() {
        let mut rng = fastrand::Rng::with_seed(4);
        let good = [2, 2, 2, 2];
        let bad = [0, 1, 0, 1, 0, 1];
        let hits = (0..300)
            .filter(|_| sample_tpe_categorical(3, &good, &bad, &mut rng) == 2)
            .count();
        assert!(hits > 150, "choice 2 drawn only {hits} times");
    }
}
