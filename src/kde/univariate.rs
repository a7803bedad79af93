use crate::error::{Error, Result};
use crate::rng_util;

/// A Gaussian kernel density estimator for continuous distributions.
///
/// KDE estimates a probability density function from a set of samples by
/// placing Gaussian kernels centered at each sample point. TPE uses one
/// estimator for l(x) (good trials) and one for g(x) (bad trials).
#[derive(Clone, Debug)]
pub(crate) struct KernelDensityEstimator {
    /// The sample points used to construct the KDE.
    samples: Vec<f64>,
    /// The bandwidth (standard deviation) of the Gaussian kernels.
    bandwidth: f64,
}

impl KernelDensityEstimator {
    /// Creates a new KDE with automatic bandwidth selection using Scott's rule.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptySamples` if `samples` is empty.
    pub(crate) fn new(samples: Vec<f64>) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::EmptySamples);
        }

        let bandwidth = Self::scotts_rule(&samples);
        Ok(Self { samples, bandwidth })
    }

    /// Creates a new KDE with a specified bandwidth.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptySamples` if `samples` is empty.
    /// Returns `Error::InvalidBandwidth` if `bandwidth` is not positive.
    pub(crate) fn with_bandwidth(samples: Vec<f64>, bandwidth: f64) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::EmptySamples);
        }
        if bandwidth <= 0.0 {
            return Err(Error::InvalidBandwidth(bandwidth));
        }

        Ok(Self { samples, bandwidth })
    }

    /// Scott's rule: h = n^(-1/5) * sigma.
    #[allow(clippy::cast_precision_loss)]
    fn scotts_rule(samples: &[f64]) -> f64 {
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        // All samples identical
        if std_dev < f64::EPSILON {
            return 1.0;
        }

        n.powf(-0.2) * std_dev
    }

    /// Returns the probability density at point `x`.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn pdf(&self, x: f64) -> f64 {
        let n = self.samples.len() as f64;
        let inv_bandwidth = 1.0 / self.bandwidth;
        let normalization = inv_bandwidth / (2.0 * core::f64::consts::PI).sqrt();

        let density: f64 = self
            .samples
            .iter()
            .map(|&xi| {
                let z = (x - xi) * inv_bandwidth;
                normalization * (-0.5 * z * z).exp()
            })
            .sum();

        density / n
    }

    /// Samples a value: pick a kernel center uniformly, add Gaussian noise.
    pub(crate) fn sample(&self, rng: &mut fastrand::Rng) -> f64 {
        let center = self.samples[rng.usize(0..self.samples.len())];
        center + rng_util::standard_normal(rng) * self.bandwidth
    }

    #[cfg(test)]
    pub(crate) fn bandwidth(&self) -> f64 {
        self.bandwidth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kde_pdf_basic() {
        let kde = KernelDensityEstimator::new(vec![0.0, 1.0, 2.0]).unwrap();

        assert!(kde.pdf(0.0) > 0.0);
        assert!(kde.pdf(1.0) > kde.pdf(10.0));
    }

    #[test]
    fn test_kde_pdf_integrates_to_one() {
        let kde = KernelDensityEstimator::new(vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();

        let n_points = 10000;
        let low = -10.0;
        let high = 15.0;
        let dx = (high - low) / f64::from(n_points);

        let integral: f64 = (0..n_points)
            .map(|i| kde.pdf(low + (f64::from(i) + 0.5) * dx) * dx)
            .sum();

        assert!(
            (integral - 1.0).abs() < 0.01,
            "Integral = {integral}, expected ~1.0"
        );
    }

    #[test]
    fn test_kde_with_bandwidth() {
        let kde = KernelDensityEstimator::with_bandwidth(vec![0.0, 1.0, 2.0], 0.5).unwrap();
        assert!((kde.bandwidth() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_kde_sample_in_reasonable_range() {
        let kde = KernelDensityEstimator::new(vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut rng = fastrand::Rng::with_seed(3);

        for _ in 0..100 {
            let s = kde.sample(&mut rng);
            assert!(s > -10.0 && s < 15.0, "Sample {s} outside expected range");
        }
    }

    #[test]
    fn test_kde_identical_samples() {
        let kde = KernelDensityEstimator::new(vec![3.0, 3.0, 3.0, 3.0]).unwrap();
        assert!(kde.bandwidth() > 0.0);
        assert!(kde.pdf(3.0) > 0.0);
    }

    #[test]
    fn test_kde_empty_samples() {
        let result = KernelDensityEstimator::new(vec![]);
        assert!(matches!(result, Err(Error::EmptySamples)));
    }

    #[test]
    fn test_kde_zero_bandwidth() {
        let result = KernelDensityEstimator::with_bandwidth(vec![1.0, 2.0, 3.0], 0.0);
        assert!(matches!(result, Err(Error::InvalidBandwidth(_))));
    }
}
