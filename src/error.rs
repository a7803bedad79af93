/// Errors produced while partitioning, searching, fitting or scoring.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the lower bound is greater than the upper bound.
    #[error("invalid bounds: low ({low}) must be less than or equal to high ({high})")]
    InvalidBounds {
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
    },

    /// Returned when log scale is used with non-positive bounds.
    #[error("invalid log bounds: low must be positive for log scale")]
    InvalidLogBounds,

    /// Returned when categorical choices are empty.
    #[error("categorical choices cannot be empty")]
    EmptyChoices,

    /// Returned when a categorical index does not address its choice list.
    #[error("choice index {index} out of range for '{name}' ({n_choices} choices)")]
    ChoiceOutOfRange {
        /// The name of the categorical parameter.
        name: String,
        /// The index produced by the minimizer.
        index: usize,
        /// The length of the backing choice list.
        n_choices: usize,
    },

    /// Returned when a parameter is suggested with a different configuration.
    #[error("parameter conflict for '{name}': {reason}")]
    ParameterConflict {
        /// The name of the conflicting parameter.
        name: String,
        /// The reason for the conflict.
        reason: String,
    },

    /// Returned when a configuration names a parameter the space does not define.
    #[error("unknown hyperparameter '{0}'")]
    UnknownParameter(String),

    /// Returned when a model constructor rejects a hyperparameter value.
    #[error("invalid value for hyperparameter '{name}': {reason}")]
    InvalidParameter {
        /// The name of the rejected parameter.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// Returned when requesting the best trial but no trials have completed.
    #[error("no completed trials available")]
    NoCompletedTrials,

    /// Returned when a single candidate evaluation fails and the failure
    /// policy is to abort the search.
    #[error("search evaluation {trial_id} failed: {reason}")]
    SearchEvaluation {
        /// The id of the failing trial within its search.
        trial_id: u64,
        /// The error reported by the objective.
        reason: String,
    },

    /// Returned when gamma is not in the valid range (0.0, 1.0).
    #[error("invalid gamma: {0} must be in (0.0, 1.0)")]
    InvalidGamma(f64),

    /// Returned when bandwidth is not positive.
    #[error("invalid bandwidth: {0} must be positive")]
    InvalidBandwidth(f64),

    /// Returned when KDE is created with empty samples.
    #[error("KDE requires at least one sample")]
    EmptySamples,

    /// Returned when a stratified split cannot keep every class in both subsets.
    #[error(
        "insufficient samples: class {class} has {available} samples, \
         needs at least one in both train and test"
    )]
    InsufficientSamples {
        /// The class index that cannot be stratified.
        class: usize,
        /// The number of samples of that class in the input.
        available: usize,
    },

    /// Returned when the train fraction is outside (0.0, 1.0).
    #[error("invalid train fraction: {0} must be in (0.0, 1.0)")]
    InvalidTrainFraction(f64),

    /// Returned when zero splits or zero evaluations are requested.
    #[error("invalid count for {what}: must be at least 1")]
    InvalidCount {
        /// Which knob was zero.
        what: &'static str,
    },

    /// Returned when AUC is requested on a set containing a single class.
    #[error("AUC is undefined: scoring set contains only class {class}")]
    MetricUndefined {
        /// The only class present.
        class: usize,
    },

    /// Returned when binary scoring meets a label outside {0, 1} or a dataset
    /// does not have exactly two classes.
    #[error("expected a binary problem, found {n_classes} classes")]
    NotBinary {
        /// The number of classes found.
        n_classes: usize,
    },

    /// Returned when paired slices differ in length.
    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        /// The expected length.
        expected: usize,
        /// The actual length.
        got: usize,
    },

    /// Returned when a dataset has no samples or no features.
    #[error("dataset is empty")]
    EmptyDataset,

    /// Returned when a declared class has no samples.
    #[error("class '{name}' (index {class}) has no samples")]
    EmptyClass {
        /// The class index.
        class: usize,
        /// The class name.
        name: String,
    },

    /// Returned when a row has a different number of features than the first row.
    #[error("row {row} has {got} features, expected {expected}")]
    RaggedRow {
        /// The index of the offending row.
        row: usize,
        /// The expected number of features.
        expected: usize,
        /// The actual number of features.
        got: usize,
    },

    /// Returned when a named column is missing from a CSV header.
    #[error("column '{0}' not found")]
    MissingColumn(String),

    /// Returned when a feature cell cannot be parsed as a number.
    #[error("invalid value '{value}' in column '{column}' at row {row}")]
    InvalidFeatureValue {
        /// The column name.
        column: String,
        /// The zero-based data row.
        row: usize,
        /// The raw cell content.
        value: String,
    },

    /// Returned when the CSV reader fails.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Returned when a model cannot be fitted to the given data.
    #[error("fit failed: {0}")]
    FitFailed(String),

    /// Returned when an internal invariant is violated.
    #[error("internal error: {0}")]
    Internal(&'static str),

    /// Returned when an async task fails.
    #[cfg(feature = "async")]
    #[error("async task error: {0}")]
    TaskError(String),

    /// Returned when JSON (de)serialization fails.
    #[cfg(feature = "serde")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A `Result` alias with [`Error`] as the error type.
pub type Result<T> = core::result::Result<T, Error>;
