#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::FamilyResult;

/// Results of every family evaluated on the same outer folds.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NestedCvReport {
    families: Vec<FamilyResult>,
}

impl NestedCvReport {
    /// Wraps per-family results in evaluation order.
    #[must_use]
    pub fn new(families: Vec<FamilyResult>) -> Self {
        Self { families }
    }

    /// Returns the per-family results.
    #[must_use]
    pub fn families(&self) -> &[FamilyResult] {
        &self.families
    }

    /// Looks up a family by name.
    #[must_use]
    pub fn family(&self, name: &str) -> Option<&FamilyResult> {
        self.families.iter().find(|f| f.family() == name)
    }

    /// Write every record to `writer` as CSV.
    ///
    /// Columns: `family`, `fold`, `score`, `inner_score`, `configuration`.
    /// Rows are grouped by family and ordered by fold.
    ///
    /// # Errors
    ///
    /// Returns `Error::Csv` if writing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use nested_cv::nested::{FamilyResult, NestedCvReport, TrialRecord};
    /// use nested_cv::space::Configuration;
    ///
    /// let record = TrialRecord {
    ///     fold: 0,
    ///     score: 0.75,
    ///     inner_score: 0.8,
    ///     configuration: Configuration::new().with("C", 1.0),
    /// };
    /// let report = NestedCvReport::new(vec![FamilyResult::new("svc", vec![record])]);
    ///
    /// let mut buf = Vec::new();
    /// report.to_csv(&mut buf).unwrap();
    /// let csv = String::from_utf8(buf).unwrap();
    /// assert!(csv.starts_with("family,fold,score,inner_score,configuration"));
    /// ```
    pub fn to_csv(&self, writer: impl std::io::Write) -> Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(["family", "fold", "score", "inner_score", "configuration"])?;
        for family in &self.families {
            for record in family.records() {
                out.write_record([
                    family.family().to_string(),
                    record.fold.to_string(),
                    record.score.to_string(),
                    record.inner_score.to_string(),
                    record.configuration.to_string(),
                ])?;
            }
        }
        out.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Serializes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a report written by [`to_json`](Self::to_json).
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the input is malformed.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
