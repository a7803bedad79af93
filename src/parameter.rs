//! Typed parameters suggested through a [`Trial`].
//!
//! A [`SearchSpace`](crate::space::SearchSpace) is lowered into one
//! [`FloatParam`] or [`CategoricalParam`] per entry before a search starts;
//! the minimizer only ever sees these.
//!
//! # Example
//!
//! ```
//! use nested_cv::Trial;
//! use nested_cv::parameter::{CategoricalParam, FloatParam, Parameter};
//!
//! let mut trial = Trial::new(0);
//!
//! let c = FloatParam::new(1e-3, 1e2).log_scale().name("C");
//! let kernel = CategoricalParam::new(vec!["linear", "rbf"]).name("kernel");
//!
//! let c_value = c.suggest(&mut trial).unwrap();
//! let kernel_value = kernel.suggest(&mut trial).unwrap();
//! assert!((1e-3..=1e2).contains(&c_value));
//! assert!(["linear", "rbf"].contains(&kernel_value));
//! ```

use core::fmt::Debug;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::distribution::{CategoricalDistribution, Distribution, FloatDistribution};
use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::trial::Trial;

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(0);

/// A unique identifier for a parameter instance.
///
/// Each parameter is assigned a unique `ParamId` at creation time. Cloning a parameter
/// copies its `ParamId`, so clones refer to the same logical parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(u64);

impl ParamId {
    /// Creates a new unique `ParamId`.
    pub fn new() -> Self {
        Self(NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ParamId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ParamId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "param_{}", self.0)
    }
}

/// A trait for defining parameter types that can be suggested by a [`Trial`].
///
/// Implementors specify the distribution to sample from and how to convert
/// the raw [`ParamValue`] back into a typed value.
pub trait Parameter: Debug {
    /// The typed value returned after sampling.
    type Value;

    /// Returns the unique identifier for this parameter.
    fn id(&self) -> ParamId;

    /// Returns the distribution that this parameter samples from.
    fn distribution(&self) -> Distribution;

    /// Converts a raw [`ParamValue`] into the typed value.
    ///
    /// # Errors
    ///
    /// Returns an error if the `ParamValue` variant doesn't match what this
    /// parameter expects, or a categorical index is out of range.
    fn cast_param_value(&self, param_value: &ParamValue) -> Result<Self::Value>;

    /// Validates the parameter configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter configuration is invalid.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Returns a human-readable label for this parameter.
    fn label(&self) -> String {
        format!("{self:?}")
    }

    /// Suggests a value for this parameter from the given trial.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the parameter conflicts with
    /// a previously suggested parameter of the same id, or sampling fails.
    fn suggest(&self, trial: &mut Trial) -> Result<Self::Value>
    where
        Self: Sized,
    {
        trial.suggest_param(self)
    }
}

/// A floating-point parameter with optional log-scale sampling.
#[derive(Clone, Debug)]
pub struct FloatParam {
    id: ParamId,
    name: Option<String>,
    low: f64,
    high: f64,
    log_scale: bool,
}

impl FloatParam {
    /// Creates a new float parameter with the given bounds.
    #[must_use]
    pub fn new(low: f64, high: f64) -> Self {
        Self {
            id: ParamId::new(),
            name: None,
            low,
            high,
            log_scale: false,
        }
    }

    /// Enables log-scale sampling.
    #[must_use]
    pub fn log_scale(mut self) -> Self {
        self.log_scale = true;
        self
    }

    /// Attaches a human-readable name used as the parameter label.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Parameter for FloatParam {
    type Value = f64;

    fn id(&self) -> ParamId {
        self.id
    }

    fn distribution(&self) -> Distribution {
        Distribution::Float(FloatDistribution {
            low: self.low,
            high: self.high,
            log_scale: self.log_scale,
        })
    }

    fn cast_param_value(&self, param_value: &ParamValue) -> Result<f64> {
        match param_value {
            ParamValue::Float(v) => Ok(*v),
            ParamValue::Categorical(_) => Err(Error::Internal(
                "Float distribution should return Float value",
            )),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.low > self.high {
            return Err(Error::InvalidBounds {
                low: self.low,
                high: self.high,
            });
        }
        if self.log_scale && self.low <= 0.0 {
            return Err(Error::InvalidLogBounds);
        }
        Ok(())
    }

    fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}", self.id))
    }
}

/// A categorical parameter that selects from a list of choices.
#[derive(Clone, Debug)]
pub struct CategoricalParam<T: Clone> {
    id: ParamId,
    name: Option<String>,
    choices: Vec<T>,
}

impl<T: Clone> CategoricalParam<T> {
    /// Creates a new categorical parameter with the given choices.
    #[must_use]
    pub fn new(choices: Vec<T>) -> Self {
        Self {
            id: ParamId::new(),
            name: None,
            choices,
        }
    }

    /// Attaches a human-readable name used as the parameter label.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the backing choice list.
    #[must_use]
    pub fn choices(&self) -> &[T] {
        &self.choices
    }
}

impl<T: Clone + Debug> Parameter for CategoricalParam<T> {
    type Value = T;

    fn id(&self) -> ParamId {
        self.id
    }

    fn distribution(&self) -> Distribution {
        Distribution::Categorical(CategoricalDistribution {
            n_choices: self.choices.len(),
        })
    }

    fn cast_param_value(&self, param_value: &ParamValue) -> Result<T> {
        match param_value {
            ParamValue::Categorical(index) => {
                self.choices
                    .get(*index)
                    .cloned()
                    .ok_or_else(|| Error::ChoiceOutOfRange {
                        name: self.label(),
                        index: *index,
                        n_choices: self.choices.len(),
                    })
            }
            ParamValue::Float(_) => Err(Error::Internal(
                "Categorical distribution should return Categorical value",
            )),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.choices.is_empty() {
            return Err(Error::EmptyChoices);
        }
        Ok(())
    }

    fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}", self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_param_distribution() {
        let param = FloatParam::new(0.0, 1.0);
        assert_eq!(
            param.distribution(),
            Distribution::Float(FloatDistribution {
                low: 0.0,
                high: 1.0,
                log_scale: false,
            })
        );
    }

    #[test]
    fn float_param_log_scale() {
        let param = FloatParam::new(1e-5, 1e-1).log_scale();
        assert_eq!(
            param.distribution(),
            Distribution::Float(FloatDistribution {
                low: 1e-5,
                high: 1e-1,
                log_scale: true,
            })
        );
    }

    #[test]
    fn float_param_validate_invalid_bounds() {
        let param = FloatParam::new(1.0, 0.0);
        assert!(param.validate().is_err());
    }

    #[test]
    fn float_param_validate_invalid_log() {
        let param = FloatParam::new(-1.0, 1.0).log_scale();
        assert!(matches!(param.validate(), Err(Error::InvalidLogBounds)));
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn float_param_cast_param_value() {
        let param = FloatParam::new(0.0, 1.0);
        assert_eq!(
            param.cast_param_value(&ParamValue::Float(0.5)).unwrap(),
            0.5
        );
        assert!(param.cast_param_value(&ParamValue::Categorical(1)).is_err());
    }

    #[test]
    fn categorical_param_distribution() {
        let param = CategoricalParam::new(vec!["a", "b", "c"]);
        assert_eq!(
            param.distribution(),
            Distribution::Categorical(CategoricalDistribution { n_choices: 3 })
        );
    }

    #[test]
    fn categorical_param_validate_empty() {
        let param = CategoricalParam::<&str>::new(vec![]);
        assert!(matches!(param.validate(), Err(Error::EmptyChoices)));
    }

    #[test]
    fn categorical_param_cast_param_value() {
        let param = CategoricalParam::new(vec!["linear", "rbf", "poly"]).name("kernel");
        assert_eq!(
            param.cast_param_value(&ParamValue::Categorical(1)).unwrap(),
            "rbf"
        );
        assert!(param.cast_param_value(&ParamValue::Float(1.0)).is_err());
        assert!(matches!(
            param.cast_param_value(&ParamValue::Categorical(3)),
            Err(Error::ChoiceOutOfRange { index: 3, n_choices: 3, .. })
        ));
    }

    #[test]
    fn float_param_suggest_via_trial() {
        let param = FloatParam::new(0.0, 1.0);
        let mut trial = Trial::new(0);
        let x = param.suggest(&mut trial).unwrap();
        assert!((0.0..=1.0).contains(&x));

        // Cached value (same param id)
        let x2 = param.suggest(&mut trial).unwrap();
        assert!((x - x2).abs() < f64::EPSILON);
    }

    #[test]
    fn categorical_param_suggest_via_trial() {
        let choices = vec!["gini", "entropy"];
        let param = CategoricalParam::new(choices.clone());
        let mut trial = Trial::new(0);
        let opt = param.suggest(&mut trial).unwrap();
        assert!(choices.contains(&opt));

        let opt2 = param.suggest(&mut trial).unwrap();
        assert_eq!(opt, opt2);
    }

    #[test]
    fn float_param_validation_prevents_suggest() {
        let param = FloatParam::new(1.0, 0.0);
        let mut trial = Trial::new(0);
        assert!(param.suggest(&mut trial).is_err());
    }

    #[test]
    fn label_prefers_name() {
        let named = FloatParam::new(0.0, 1.0).name("gamma");
        assert_eq!(named.label(), "gamma");
        let anonymous = FloatParam::new(0.0, 1.0);
        assert!(anonymous.label().starts_with("param_"));
    }

    #[test]
    fn param_clone_preserves_id() {
        let param = FloatParam::new(0.0, 1.0);
        let cloned = param.clone();
        assert_eq!(param.id(), cloned.id());
    }
}
