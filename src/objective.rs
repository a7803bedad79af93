//! The [`Objective`] trait defines what the minimizer evaluates.
//!
//! Closures can be passed directly to [`Study::optimize`](crate::Study::optimize):
//!
//! ```
//! use nested_cv::prelude::*;
//!
//! let study = Study::new(TpeSampler::builder().seed(1).build().unwrap());
//! let x = FloatParam::new(-10.0, 10.0).name("x");
//!
//! study
//!     .optimize(30, FailurePolicy::Propagate, |trial: &mut Trial| {
//!         let v = x.suggest(trial)?;
//!         Ok::<_, Error>((v - 3.0).powi(2))
//!     })
//!     .unwrap();
//! assert!(study.best_value().unwrap() >= 0.0);
//! ```
//!
//! Implement the trait on a struct when the objective carries bound context,
//! like [`CvObjective`](crate::nested::CvObjective) does for one outer fold.

use crate::trial::Trial;

/// A loss function over sampled parameters, minimized by a [`Study`](crate::Study).
pub trait Objective {
    /// The error type returned by [`evaluate`](Objective::evaluate).
    type Error: ToString;

    /// Samples parameters from `trial` and returns the loss.
    ///
    /// # Errors
    ///
    /// Any error the evaluation produces. What happens next is decided by
    /// the study's [`FailurePolicy`](crate::FailurePolicy).
    fn evaluate(&self, trial: &mut Trial) -> Result<f64, Self::Error>;
}

impl<F, E> Objective for F
where
    F: Fn(&mut Trial) -> Result<f64, E>,
    E: ToString,
{
    type Error = E;

    fn evaluate(&self, trial: &mut Trial) -> Result<f64, E> {
        self(trial)
    }
}
