//! Ranking metrics for binary classifiers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Predictor;

/// Area under the ROC curve for binary labels in {0, 1}.
///
/// Computed from the Mann-Whitney U statistic with average ranks for tied
/// scores, so hard 0/1 predictions yield the balanced accuracy-like value
/// `(TPR + TNR) / 2`.
///
/// # Errors
///
/// Returns `Error::LengthMismatch` if the slices differ in length,
/// `Error::EmptyDataset` if they are empty, `Error::NotBinary` for a label
/// above 1, and `Error::MetricUndefined` when only one class is present.
///
/// # Examples
///
/// ```
/// use nested_cv::metrics::roc_auc;
///
/// let auc = roc_auc(&[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8]).unwrap();
/// assert!((auc - 0.75).abs() < 1e-12);
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn roc_auc(labels: &[usize], scores: &[f64]) -> Result<f64> {
    if labels.len() != scores.len() {
        return Err(Error::LengthMismatch {
            expected: labels.len(),
            got: scores.len(),
        });
    }
    if labels.is_empty() {
        return Err(Error::EmptyDataset);
    }
    if labels.iter().any(|&l| l > 1) {
        let n_classes = labels.iter().max().map_or(0, |&m| m + 1);
        return Err(Error::NotBinary { n_classes });
    }

    let n_pos = labels.iter().filter(|&&l| l == 1).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 {
        return Err(Error::MetricUndefined { class: 0 });
    }
    if n_neg == 0 {
        return Err(Error::MetricUndefined { class: 1 });
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // Average 1-based ranks over runs of equal scores.
    let mut ranks = vec![0.0; scores.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]].total_cmp(&scores[order[start]]).is_eq() {
            end += 1;
        }
        let rank = (start + end + 1) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = rank;
        }
        start = end;
    }

    let pos_rank_sum: f64 = labels
        .iter()
        .zip(&ranks)
        .filter(|&(&l, _)| l == 1)
        .map(|(_, &r)| r)
        .sum();
    let n_pos = n_pos as f64;
    let u = pos_rank_sum - n_pos * (n_pos + 1.0) / 2.0;
    Ok(u / (n_pos * n_neg as f64))
}

/// What a fitted model contributes to an AUC computation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Scoring {
    /// Score the predicted class labels (0 or 1).
    #[default]
    HardLabels,
    /// Score the continuous decision function.
    DecisionScores,
}

impl Scoring {
    /// Scores `predictor` on `rows` against `labels`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`roc_auc`].
    pub fn score(self, predictor: &dyn Predictor, rows: &[&[f64]], labels: &[usize]) -> Result<f64> {
        let scores: Vec<f64> = match self {
            Self::HardLabels => rows
                .iter()
                .map(|r| if predictor.predict(r) == 1 { 1.0 } else { 0.0 })
                .collect(),
            Self::DecisionScores => rows.iter().map(|r| predictor.decision_function(r)).collect(),
        };
        roc_auc(labels, &scores)
    }
}
