//! Tabular classification data and index-selected views over it.

use std::io;
use std::path::Path;

use crate::error::{Error, Result};

/// A numeric feature matrix with one class label per row.
///
/// Labels are class indices into [`classes`](Self::classes). Rows are never
/// copied once loaded; subsets are expressed as [`DataView`]s.
#[derive(Clone, Debug)]
pub struct Dataset {
    feature_names: Vec<String>,
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
    classes: Vec<String>,
}

impl Dataset {
    /// Builds a dataset from in-memory rows and class indices.
    ///
    /// Class names default to the decimal form of each index.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyDataset` if there are no rows or no features,
    /// `Error::RaggedRow` if rows differ in width,
    /// `Error::LengthMismatch` if labels or names do not line up with the
    /// rows, and `Error::EmptyClass` if a class index below the largest label
    /// never occurs.
    pub fn new(
        feature_names: Vec<String>,
        features: Vec<Vec<f64>>,
        labels: Vec<usize>,
    ) -> Result<Self> {
        let n_classes = labels.iter().max().map_or(0, |&m| m + 1);
        let classes = (0..n_classes).map(|c| c.to_string()).collect();
        Self::with_classes(feature_names, features, labels, classes)
    }

    /// Builds a dataset with explicit class names.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new), plus `Error::LengthMismatch` when a label
    /// does not address `classes` and `Error::EmptyClass` when a class has
    /// no samples.
    pub fn with_classes(
        feature_names: Vec<String>,
        features: Vec<Vec<f64>>,
        labels: Vec<usize>,
        classes: Vec<String>,
    ) -> Result<Self> {
        let width = features.first().map_or(0, Vec::len);
        if features.is_empty() || width == 0 {
            return Err(Error::EmptyDataset);
        }
        if let Some((row, r)) = features.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(Error::RaggedRow {
                row,
                expected: width,
                got: r.len(),
            });
        }
        if labels.len() != features.len() {
            return Err(Error::LengthMismatch {
                expected: features.len(),
                got: labels.len(),
            });
        }
        if feature_names.len() != width {
            return Err(Error::LengthMismatch {
                expected: width,
                got: feature_names.len(),
            });
        }
        if let Some(&bad) = labels.iter().find(|&&l| l >= classes.len()) {
            return Err(Error::LengthMismatch {
                expected: classes.len(),
                got: bad + 1,
            });
        }
        let mut counts = vec![0_usize; classes.len()];
        for &label in &labels {
            counts[label] += 1;
        }
        if let Some(class) = counts.iter().position(|&n| n == 0) {
            return Err(Error::EmptyClass {
                class,
                name: classes[class].clone(),
            });
        }

        Ok(Self {
            feature_names,
            features,
            labels,
            classes,
        })
    }

    /// Reads a headed CSV.
    ///
    /// `label_column` becomes the label; it and every column in `excluded`
    /// are left out of the features. All remaining cells must parse as `f64`.
    /// Classes are the distinct label strings sorted numerically when they
    /// all parse as numbers and lexicographically otherwise, so the positive
    /// class is the larger one.
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingColumn` for an unknown label or excluded
    /// column, `Error::InvalidFeatureValue` for a non-numeric feature cell,
    /// `Error::Csv` for malformed input, and the shape errors of
    /// [`with_classes`](Self::with_classes).
    pub fn from_csv_reader<R: io::Read>(
        reader: R,
        label_column: &str,
        excluded: &[&str],
    ) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader.headers()?.clone();

        let label_idx = headers
            .iter()
            .position(|h| h == label_column)
            .ok_or_else(|| Error::MissingColumn(label_column.to_string()))?;
        for name in excluded {
            if !headers.iter().any(|h| h == *name) {
                return Err(Error::MissingColumn((*name).to_string()));
            }
        }

        let feature_cols: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|&(i, h)| i != label_idx && !excluded.contains(&h))
            .map(|(i, h)| (i, h.to_string()))
            .collect();

        let mut features = Vec::new();
        let mut raw_labels = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let mut values = Vec::with_capacity(feature_cols.len());
            for (col, name) in &feature_cols {
                let cell = record.get(*col).unwrap_or("").trim();
                let value = cell
                    .parse::<f64>()
                    .map_err(|_| Error::InvalidFeatureValue {
                        column: name.clone(),
                        row,
                        value: cell.to_string(),
                    })?;
                values.push(value);
            }
            features.push(values);
            raw_labels.push(record.get(label_idx).unwrap_or("").trim().to_string());
        }

        let classes = sorted_classes(&raw_labels);
        let labels = raw_labels
            .iter()
            .map(|l| classes.iter().position(|c| c == l).unwrap_or(0))
            .collect();
        let feature_names = feature_cols.into_iter().map(|(_, name)| name).collect();

        Self::with_classes(feature_names, features, labels, classes)
    }

    /// Reads a headed CSV file. See [`from_csv_reader`](Self::from_csv_reader).
    ///
    /// # Errors
    ///
    /// Returns `Error::Csv` if the file cannot be opened, plus every error of
    /// [`from_csv_reader`](Self::from_csv_reader).
    pub fn from_csv_path(
        path: impl AsRef<Path>,
        label_column: &str,
        excluded: &[&str],
    ) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref()).map_err(csv::Error::from)?;
        Self::from_csv_reader(io::BufReader::new(file), label_column, excluded)
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Returns the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Returns the feature column names in order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Returns the class names; a label is an index into this slice.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Returns all labels in row order.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Returns the feature row at `index`.
    #[must_use]
    pub fn row(&self, index: usize) -> &[f64] {
        &self.features[index]
    }

    /// Returns a view over every row.
    #[must_use]
    pub fn view_all(&self) -> DataView<'_> {
        DataView {
            dataset: self,
            indices: (0..self.n_samples()).collect(),
        }
    }

    /// Returns a view over the rows at `indices`.
    ///
    /// # Errors
    ///
    /// Returns `Error::LengthMismatch` if an index is out of range.
    pub fn view(&self, indices: Vec<usize>) -> Result<DataView<'_>> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.n_samples()) {
            return Err(Error::LengthMismatch {
                expected: self.n_samples(),
                got: bad + 1,
            });
        }
        Ok(DataView {
            dataset: self,
            indices,
        })
    }
}

fn sorted_classes(raw: &[String]) -> Vec<String> {
    let mut classes: Vec<String> = raw.to_vec();
    classes.sort();
    classes.dedup();
    let numeric: Option<Vec<f64>> = classes.iter().map(|c| c.parse::<f64>().ok()).collect();
    if let Some(values) = numeric {
        let mut paired: Vec<(f64, String)> = values.into_iter().zip(classes).collect();
        paired.sort_by(|a, b| a.0.total_cmp(&b.0));
        return paired.into_iter().map(|(_, c)| c).collect();
    }
    classes
}

/// A subset of a [`Dataset`] selected by absolute row indices.
///
/// Positions within a view (`0..len()`) are what fold partitioners see;
/// [`subset`](Self::subset) maps them back to dataset rows.
#[derive(Clone, Debug)]
pub struct DataView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> DataView<'a> {
    /// Returns the underlying dataset.
    #[must_use]
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Returns the absolute row indices of this view.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Returns the number of rows in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the view selects no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the feature rows of the view, in view order.
    #[must_use]
    pub fn rows(&self) -> Vec<&'a [f64]> {
        self.indices.iter().map(|&i| self.dataset.row(i)).collect()
    }

    /// Returns the labels of the view, in view order.
    #[must_use]
    pub fn labels(&self) -> Vec<usize> {
        self.indices.iter().map(|&i| self.dataset.labels[i]).collect()
    }

    /// Narrows the view to the given positions within it.
    ///
    /// # Errors
    ///
    /// Returns `Error::LengthMismatch` if a position is out of range.
    pub fn subset(&self, positions: &[usize]) -> Result<DataView<'a>> {
        let indices = positions
            .iter()
            .map(|&p| {
                self.indices.get(p).copied().ok_or(Error::LengthMismatch {
                    expected: self.indices.len(),
                    got: p + 1,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(DataView {
            dataset: self.dataset,
            indices,
        })
    }
}
