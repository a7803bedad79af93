//! Repeated stratified random splitting.
//!
//! Each split is an independent stratified sample, not a partition of the
//! data across splits: a row can be tested in several splits or in none.
//!
//! ```
//! use nested_cv::folds::StratifiedShuffleSplit;
//!
//! let labels = [0, 0, 0, 0, 1, 1, 1, 1, 1, 1];
//! let splits = StratifiedShuffleSplit::new(3, 0.8)
//!     .unwrap()
//!     .seed(4)
//!     .split(&labels)
//!     .unwrap();
//! assert_eq!(splits.len(), 3);
//! assert_eq!(splits[0].train.len(), 8);
//! ```

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rng_util;

/// One train/test split, as sorted positions into the labels it was drawn from.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Split {
    /// Positions selected for training (or optimization, at the outer level).
    pub train: Vec<usize>,
    /// Positions held out for testing (or validation, at the outer level).
    pub test: Vec<usize>,
}

/// Draws `n_splits` stratified random train/test splits.
#[derive(Clone, Copy, Debug)]
pub struct StratifiedShuffleSplit {
    n_splits: usize,
    train_fraction: f64,
    seed: Option<u64>,
}

impl StratifiedShuffleSplit {
    /// Creates a splitter.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidCount` if `n_splits` is zero and
    /// `Error::InvalidTrainFraction` if the fraction is outside (0.0, 1.0).
    pub fn new(n_splits: usize, train_fraction: f64) -> Result<Self> {
        if n_splits == 0 {
            return Err(Error::InvalidCount { what: "n_splits" });
        }
        if !(train_fraction > 0.0 && train_fraction < 1.0) {
            return Err(Error::InvalidTrainFraction(train_fraction));
        }
        Ok(Self {
            n_splits,
            train_fraction,
            seed: None,
        })
    }

    /// Seeds the shuffle so repeated calls yield the same splits.
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

    /// Returns the number of splits produced per call.
    #[must_use]
    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Draws the splits for `labels`.
    ///
    /// The training size is `floor(train_fraction * n)`, apportioned across
    /// classes by largest remainder so each class keeps its share as closely
    /// as integer counts allow.
    ///
    /// # Errors
    ///
    /// Returns `Error::InsufficientSamples` if any class would end up with no
    /// sample in either subset.
    pub fn split(&self, labels: &[usize]) -> Result<Vec<Split>> {
        let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (pos, &label) in labels.iter().enumerate() {
            by_class.entry(label).or_default().push(pos);
        }
        let quotas = self.train_quotas(&by_class, labels.len())?;

        let mut rng = rng_util::seeded(self.seed);
        let mut splits = Vec::with_capacity(self.n_splits);
        for _ in 0..self.n_splits {
            let mut train = Vec::new();
            let mut test = Vec::new();
            for (positions, &quota) in by_class.values().zip(&quotas) {
                let mut shuffled = positions.clone();
                rng.shuffle(&mut shuffled);
                train.extend_from_slice(&shuffled[..quota]);
                test.extend_from_slice(&shuffled[quota..]);
            }
            train.sort_unstable();
            test.sort_unstable();
            splits.push(Split { train, test });
        }
        Ok(splits)
    }

    /// Per-class training counts, in class order.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn train_quotas(&self, by_class: &BTreeMap<usize, Vec<usize>>, n: usize) -> Result<Vec<usize>> {
        // Nudge before flooring so 0.8 * 200 cannot land on 159.999...
        let n_train = (self.train_fraction * n as f64 + 1e-9).floor() as usize;

        let exact: Vec<f64> = by_class
            .values()
            .map(|p| n_train as f64 * p.len() as f64 / n as f64)
            .collect();
        let mut quotas: Vec<usize> = exact.iter().map(|q| q.floor() as usize).collect();

        let mut order: Vec<usize> = (0..quotas.len()).collect();
        order.sort_by(|&a, &b| {
            let ra = exact[a] - exact[a].floor();
            let rb = exact[b] - exact[b].floor();
            rb.total_cmp(&ra).then(a.cmp(&b))
        });
        let assigned: usize = quotas.iter().sum();
        for &c in order.iter().take(n_train.saturating_sub(assigned)) {
            quotas[c] += 1;
        }

        for ((&class, positions), &quota) in by_class.iter().zip(&quotas) {
            if quota == 0 || quota >= positions.len() {
                return Err(Error::InsufficientSamples {
                    class,
                    available: positions.len(),
                });
            }
        }
        Ok(quotas)
    }
}
