//! Parameter value storage types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents a sampled parameter value.
///
/// For categorical parameters, the `Categorical` variant stores the index
/// into the choices array; [`SearchSpace::decode`](crate::space::SearchSpace::decode)
/// turns it back into the choice itself.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParamValue {
    /// A floating-point parameter value.
    Float(f64),
    /// A categorical parameter value, stored as an index into the choices array.
    Categorical(usize),
}

impl core::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Categorical(i) => write!(f, "#{i}"),
        }
    }
}
