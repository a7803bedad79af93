//! Trainable binary classifiers and the families the nested loop tunes.
//!
//! An [`Estimator`] is an untrained, fully configured model; fitting it
//! yields a [`Predictor`]. A [`ModelFamily`] turns a decoded
//! [`Configuration`] into an estimator and owns the family's search space.

mod extra_trees;
mod svc;

pub use extra_trees::{Criterion, ExtraTrees, ExtraTreesFamily, MaxFeatures};
pub use svc::{KernelKind, Svc, SvcFamily};

use crate::error::{Error, Result};
use crate::space::{Configuration, SearchSpace};

/// A fitted binary classifier.
pub trait Predictor: Send + Sync {
    /// Returns a continuous score; larger means more likely class 1.
    fn decision_function(&self, row: &[f64]) -> f64;

    /// Returns the predicted class, 0 or 1.
    fn predict(&self, row: &[f64]) -> usize {
        usize::from(self.decision_function(row) > 0.0)
    }
}

/// An untrained classifier with its hyperparameters fixed.
pub trait Estimator: Send + Sync {
    /// Fits the model on `rows` with binary `labels`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is empty, not binary, or contains a
    /// single class.
    fn fit(&self, rows: &[&[f64]], labels: &[usize]) -> Result<Box<dyn Predictor>>;
}

/// A classifier family: a name, a search space and a constructor.
pub trait ModelFamily: Send + Sync {
    /// Returns a short name used in logs and reports.
    fn name(&self) -> &str;

    /// Returns the hyperparameter space searched for this family.
    fn space(&self) -> &SearchSpace;

    /// Builds an untrained estimator from a decoded configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if the configuration is rejected.
    fn build(&self, config: &Configuration, seed: u64) -> Result<Box<dyn Estimator>>;
}

/// Checks the shape of training data shared by every estimator.
pub(crate) fn check_training_data(rows: &[&[f64]], labels: &[usize]) -> Result<()> {
    if rows.is_empty() {
        return Err(Error::EmptyDataset);
    }
    if rows.len() != labels.len() {
        return Err(Error::LengthMismatch {
            expected: rows.len(),
            got: labels.len(),
        });
    }
    if let Some(&max) = labels.iter().max()
        && max > 1
    {
        return Err(Error::NotBinary { n_classes: max + 1 });
    }
    let n_pos = labels.iter().filter(|&&l| l == 1).count();
    if n_pos == 0 || n_pos == labels.len() {
        return Err(Error::FitFailed(
            "training data contains a single class".to_string(),
        ));
    }
    Ok(())
}

/// Reads an optional entry, falling back to `default` when it is absent.
pub(crate) fn or_default<'c, T>(
    config: &'c Configuration,
    name: &str,
    default: T,
    read: impl FnOnce(&'c Configuration, &str) -> Result<T>,
) -> Result<T> {
    if config.get(name).is_some() {
        read(config, name)
    } else {
        Ok(default)
    }
}
