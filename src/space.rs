//! Hyperparameter spaces and their decoded configurations.
//!
//! A [`SearchSpace`] maps parameter names to [`Domain`]s. Before a search it
//! is lowered into a [`SpaceParams`], one minimizer parameter per entry;
//! categorical entries are sampled as positional indices. Every encoded
//! result goes through [`SearchSpace::decode`] before it is used, which
//! looks indices up in the backing choice lists.
//!
//! ```
//! use nested_cv::space::{HyperValue, SearchSpace};
//! use nested_cv::Trial;
//!
//! let space = SearchSpace::new()
//!     .continuous("x", 0.0, 1.0)
//!     .choice("kind", ["a", "b", "c"]);
//!
//! let params = space.params().unwrap();
//! let mut trial = Trial::new(0);
//! let encoded = params.suggest(&mut trial).unwrap();
//! let config = space.decode(&encoded).unwrap();
//!
//! assert!(matches!(config.get("kind"), Some(HyperValue::Str(_))));
//! ```

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::parameter::{CategoricalParam, FloatParam, Parameter};
use crate::sampler::CompletedTrial;
use crate::trial::Trial;

/// A resolved hyperparameter value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum HyperValue {
    /// An absent value, such as an unlimited tree depth.
    Null,
    /// A boolean flag.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A real number.
    Float(f64),
    /// A string tag.
    Str(String),
}

impl core::fmt::Display for HyperValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for HyperValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for HyperValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for HyperValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for HyperValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for HyperValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<T: Into<HyperValue>> From<Option<T>> for HyperValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// The domain of one hyperparameter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Domain {
    /// A real interval, optionally sampled in log space.
    Continuous {
        /// Lower bound (inclusive).
        low: f64,
        /// Upper bound (inclusive).
        high: f64,
        /// Sample in log space.
        #[cfg_attr(feature = "serde", serde(default))]
        log: bool,
    },
    /// An ordered list of candidate values.
    Choice {
        /// The candidates; the minimizer sees only their positions.
        values: Vec<HyperValue>,
    },
}

impl Domain {
    fn validate(&self, name: &str) -> Result<()> {
        match self {
            Self::Continuous { low, high, log } => {
                if !(low.is_finite() && high.is_finite()) || low > high {
                    return Err(Error::InvalidBounds {
                        low: *low,
                        high: *high,
                    });
                }
                if *log && *low <= 0.0 {
                    return Err(Error::InvalidLogBounds);
                }
                Ok(())
            }
            Self::Choice { values } if values.is_empty() => Err(Error::InvalidParameter {
                name: name.to_string(),
                reason: Error::EmptyChoices.to_string(),
            }),
            Self::Choice { .. } => Ok(()),
        }
    }
}

/// A named set of hyperparameter domains, ordered by name.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SearchSpace {
    entries: BTreeMap<String, Domain>,
}

impl SearchSpace {
    /// Creates an empty space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a continuous range sampled uniformly.
    #[must_use]
    pub fn continuous(mut self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.insert(name, Domain::Continuous {
            low,
            high,
            log: false,
        });
        self
    }

    /// Adds a continuous range sampled in log space.
    #[must_use]
    pub fn log_continuous(mut self, name: impl Into<String>, low: f64, high: f64) -> Self {
        self.insert(name, Domain::Continuous {
            low,
            high,
            log: true,
        });
        self
    }

    /// Adds a categorical choice.
    #[must_use]
    pub fn choice<V: Into<HyperValue>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(name, Domain::Choice { values });
        self
    }

    /// Inserts or replaces an entry.
    pub fn insert(&mut self, name: impl Into<String>, domain: Domain) {
        self.entries.insert(name.into(), domain);
    }

    /// Returns the domain of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Domain> {
        self.entries.get(name)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the space has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Domain)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Checks every domain.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBounds` or `Error::InvalidLogBounds` for a bad
    /// range and `Error::InvalidParameter` for an empty choice list.
    pub fn validate(&self) -> Result<()> {
        self.entries.iter().try_for_each(|(name, d)| d.validate(name))
    }

    /// Lowers the space into minimizer parameters.
    ///
    /// Each call creates fresh parameter ids, so every search gets its own.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`validate`](Self::validate).
    pub fn params(&self) -> Result<SpaceParams> {
        self.validate()?;
        let entries = self
            .entries
            .iter()
            .map(|(name, domain)| {
                let param = match domain {
                    Domain::Continuous { low, high, log } => {
                        let p = FloatParam::new(*low, *high).name(name.clone());
                        LoweredParam::Float(if *log { p.log_scale() } else { p })
                    }
                    Domain::Choice { values } => LoweredParam::Choice(
                        CategoricalParam::new((0..values.len()).collect()).name(name.clone()),
                    ),
                };
                (name.clone(), param)
            })
            .collect();
        Ok(SpaceParams { entries })
    }

    /// Resolves index-encoded values into a [`Configuration`].
    ///
    /// Continuous values pass through; categorical indices are looked up in
    /// their choice list.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownParameter` for a name outside the space,
    /// `Error::InvalidParameter` for a missing entry or a value of the wrong
    /// kind, and `Error::ChoiceOutOfRange` for an index past the list.
    pub fn decode(&self, encoded: &BTreeMap<String, ParamValue>) -> Result<Configuration> {
        if let Some(unknown) = encoded.keys().find(|k| !self.entries.contains_key(*k)) {
            return Err(Error::UnknownParameter(unknown.clone()));
        }

        let mut values = BTreeMap::new();
        for (name, domain) in &self.entries {
            let raw = encoded.get(name).ok_or_else(|| Error::InvalidParameter {
                name: name.clone(),
                reason: "no value was sampled".to_string(),
            })?;
            let value = match (domain, raw) {
                (Domain::Continuous { .. }, ParamValue::Float(x)) => HyperValue::Float(*x),
                (Domain::Choice { values }, ParamValue::Categorical(index)) => values
                    .get(*index)
                    .cloned()
                    .ok_or_else(|| Error::ChoiceOutOfRange {
                        name: name.clone(),
                        index: *index,
                        n_choices: values.len(),
                    })?,
                _ => {
                    return Err(Error::InvalidParameter {
                        name: name.clone(),
                        reason: format!("value {raw} does not match its domain"),
                    });
                }
            };
            values.insert(name.clone(), value);
        }
        Ok(Configuration { values })
    }

    /// Parses a space from JSON such as
    /// `{"C": {"type": "continuous", "low": 0.01, "high": 100, "log": true}}`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` for malformed input and the errors of
    /// [`validate`](Self::validate).
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let space: Self = serde_json::from_str(json)?;
        space.validate()?;
        Ok(space)
    }
}

#[derive(Clone, Debug)]
enum LoweredParam {
    Float(FloatParam),
    Choice(CategoricalParam<usize>),
}

/// A [`SearchSpace`] lowered into minimizer parameters.
#[derive(Clone, Debug)]
pub struct SpaceParams {
    entries: Vec<(String, LoweredParam)>,
}

impl SpaceParams {
    /// Suggests one encoded value per entry from `trial`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`Parameter::suggest`].
    pub fn suggest(&self, trial: &mut Trial) -> Result<BTreeMap<String, ParamValue>> {
        self.entries
            .iter()
            .map(|(name, param)| -> Result<(String, ParamValue)> {
                let value = match param {
                    LoweredParam::Float(p) => ParamValue::Float(p.suggest(trial)?),
                    LoweredParam::Choice(p) => ParamValue::Categorical(p.suggest(trial)?),
                };
                Ok((name.clone(), value))
            })
            .collect()
    }

    /// Reads the encoded values a completed trial sampled for these parameters.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if the trial lacks an entry.
    pub fn encoded(&self, trial: &CompletedTrial) -> Result<BTreeMap<String, ParamValue>> {
        self.entries
            .iter()
            .map(|(name, param)| -> Result<(String, ParamValue)> {
                let id = match param {
                    LoweredParam::Float(p) => p.id(),
                    LoweredParam::Choice(p) => p.id(),
                };
                let value = trial
                    .params
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| Error::InvalidParameter {
                        name: name.clone(),
                        reason: "not sampled by this trial".to_string(),
                    })?;
                Ok((name.clone(), value))
            })
            .collect()
    }
}

/// A decoded hyperparameter configuration, ordered by name.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Configuration {
    values: BTreeMap<String, HyperValue>,
}

impl Configuration {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, returning the configuration for chaining.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<HyperValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Returns the value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HyperValue> {
        self.values.get(name)
    }

    /// Iterates over values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HyperValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn require(&self, name: &str) -> Result<&HyperValue> {
        self.get(name).ok_or_else(|| Error::InvalidParameter {
            name: name.to_string(),
            reason: "not set".to_string(),
        })
    }

    fn mismatch(name: &str, expected: &str, got: &HyperValue) -> Error {
        Error::InvalidParameter {
            name: name.to_string(),
            reason: format!("expected {expected}, got {got}"),
        }
    }

    /// Reads a number; integers widen to `f64`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if missing or not numeric.
    #[allow(clippy::cast_precision_loss)]
    pub fn f64(&self, name: &str) -> Result<f64> {
        match self.require(name)? {
            HyperValue::Float(x) => Ok(*x),
            HyperValue::Int(i) => Ok(*i as f64),
            other => Err(Self::mismatch(name, "a number", other)),
        }
    }

    /// Reads a non-negative integer. Whole floats are accepted.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if missing, negative or fractional.
    pub fn usize(&self, name: &str) -> Result<usize> {
        self.opt_usize(name)?
            .ok_or_else(|| Self::mismatch(name, "an integer", &HyperValue::Null))
    }

    /// Reads a non-negative integer where `null` means "unset".
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if missing, negative or fractional.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn opt_usize(&self, name: &str) -> Result<Option<usize>> {
        match self.require(name)? {
            HyperValue::Null => Ok(None),
            HyperValue::Int(i) => usize::try_from(*i)
                .map(Some)
                .map_err(|_| Self::mismatch(name, "a non-negative integer", &HyperValue::Int(*i))),
            HyperValue::Float(x) if *x >= 0.0 && x.fract() == 0.0 => Ok(Some(*x as usize)),
            other => Err(Self::mismatch(name, "a non-negative integer", other)),
        }
    }

    /// Reads a string tag.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if missing or not a string.
    pub fn str(&self, name: &str) -> Result<&str> {
        match self.require(name)? {
            HyperValue::Str(s) => Ok(s),
            other => Err(Self::mismatch(name, "a string", other)),
        }
    }

    /// Reads a boolean flag.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if missing or not a boolean.
    pub fn bool(&self, name: &str) -> Result<bool> {
        match self.require(name)? {
            HyperValue::Bool(b) => Ok(*b),
            other => Err(Self::mismatch(name, "a boolean", other)),
        }
    }
}

impl core::fmt::Display for Configuration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}
