//! Tree-Parzen Estimator (TPE) sampler.
//!
//! TPE models the objective with two densities: l(x) over parameter values of
//! the best trials and g(x) over the rest. New values are drawn where
//! l(x)/g(x) is largest. The split quantile comes from a [`GammaStrategy`]:
//!
//! - [`FixedGamma`]: constant quantile (default 0.25)
//! - [`HyperoptGamma`]: `min(gamma_max, (base + 1) / n)`
//!
//! ```
//! use nested_cv::sampler::tpe::{HyperoptGamma, TpeSampler};
//!
//! let sampler = TpeSampler::builder()
//!     .gamma_strategy(HyperoptGamma::default())
//!     .build()
//!     .unwrap();
//! ```

mod common;
mod gamma;
mod sampler;

pub use gamma::{FixedGamma, GammaStrategy, HyperoptGamma};
pub use sampler::{TpeSampler, TpeSamplerBuilder};
