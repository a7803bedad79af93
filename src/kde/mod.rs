//! Kernel density estimation for the TPE sampler's l(x) and g(x) models.

mod univariate;

pub(crate) use univariate::KernelDensityEstimator;
