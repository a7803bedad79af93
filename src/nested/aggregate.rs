#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::space::Configuration;

/// One outer fold's result.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrialRecord {
    /// Index of the outer fold that produced the record.
    pub fold: usize,
    /// Validation AUC of the refitted model.
    pub score: f64,
    /// Mean inner AUC of the selected configuration.
    pub inner_score: f64,
    /// The selected configuration, categoricals resolved.
    pub configuration: Configuration,
}

/// Sorts records by descending score. Ties keep their input order.
#[must_use]
pub fn rank(records: &[TrialRecord]) -> Vec<&TrialRecord> {
    let mut sorted: Vec<&TrialRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.score.total_cmp(&a.score));
    sorted
}

/// Returns the highest-scoring record, the earliest one on ties.
#[must_use]
pub fn select(records: &[TrialRecord]) -> Option<&TrialRecord> {
    rank(records).first().copied()
}

/// All outer-fold records of one model family.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FamilyResult {
    family: String,
    records: Vec<TrialRecord>,
}

impl FamilyResult {
    /// Collects `records`, ordering them by fold index.
    pub fn new(family: impl Into<String>, mut records: Vec<TrialRecord>) -> Self {
        records.sort_by_key(|r| r.fold);
        Self {
            family: family.into(),
            records,
        }
    }

    /// Returns the family name.
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Returns the records in fold order.
    #[must_use]
    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    /// Returns the records best first.
    #[must_use]
    pub fn sorted(&self) -> Vec<&TrialRecord> {
        rank(&self.records)
    }

    /// Returns the recommended record.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCompletedTrials` if there are no records.
    pub fn best(&self) -> Result<&TrialRecord> {
        select(&self.records).ok_or(Error::NoCompletedTrials)
    }

    /// Mean validation score across folds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_score(&self) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        Some(self.records.iter().map(|r| r.score).sum::<f64>() / self.records.len() as f64)
    }

    /// Sample standard deviation of the validation scores.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn std_score(&self) -> Option<f64> {
        let mean = self.mean_score()?;
        let n = self.records.len();
        if n < 2 {
            return None;
        }
        let ss: f64 = self.records.iter().map(|r| (r.score - mean).powi(2)).sum();
        Some((ss / (n - 1) as f64).sqrt())
    }
}
