/*!
Value kinds of the dictionary layer.

Connection and synapse specifications carry loosely typed values: numeric
literals, flags, names, arrays and distribution descriptors. `SpecValue` is
the common representation handed to the builder; `AttrValue` is the narrow
numeric kind stored per edge attribute once the numeric type has been fixed
at build time.
*/

use serde::{Deserialize, Serialize};

/// A value from a connection or synapse specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecValue {
    Bool(bool),
    Long(i64),
    Double(f64),
    Str(String),
    LongArray(Vec<i64>),
    DoubleArray(Vec<f64>),
    Distribution(DistributionSpec),
}

impl SpecValue {
    /// Numeric value as a double, if this is a scalar.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            SpecValue::Double(v) => Some(*v),
            SpecValue::Long(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            SpecValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SpecValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for SpecValue {
    fn from(v: f64) -> Self {
        SpecValue::Double(v)
    }
}

impl From<i64> for SpecValue {
    fn from(v: i64) -> Self {
        SpecValue::Long(v)
    }
}

impl From<bool> for SpecValue {
    fn from(v: bool) -> Self {
        SpecValue::Bool(v)
    }
}

impl From<&str> for SpecValue {
    fn from(v: &str) -> Self {
        SpecValue::Str(v.to_string())
    }
}

impl From<Vec<f64>> for SpecValue {
    fn from(v: Vec<f64>) -> Self {
        SpecValue::DoubleArray(v)
    }
}

impl From<Vec<i64>> for SpecValue {
    fn from(v: Vec<i64>) -> Self {
        SpecValue::LongArray(v)
    }
}

impl From<DistributionSpec> for SpecValue {
    fn from(v: DistributionSpec) -> Self {
        SpecValue::Distribution(v)
    }
}

/// Descriptor of a random distribution used for per-edge parameter draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "distribution", rename_all = "snake_case")]
pub enum DistributionSpec {
    Uniform { low: f64, high: f64 },
    UniformInt { low: i64, high: i64 },
    Normal { mean: f64, std: f64 },
    Lognormal { mean: f64, std: f64 },
    Exponential { beta: f64 },
}

/// Numeric kind of a synapse attribute, fixed when the builder is set up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Long(i64),
    Double(f64),
}

impl AttrValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            AttrValue::Long(v) => *v as f64,
            AttrValue::Double(v) => *v,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Long(v) => Some(*v),
            AttrValue::Double(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_value_from_json() {
        let v: SpecValue = serde_json::from_str("2.5").unwrap();
        assert_eq!(v, SpecValue::Double(2.5));
        let v: SpecValue = serde_json::from_str("3").unwrap();
        assert_eq!(v, SpecValue::Long(3));
        let v: SpecValue = serde_json::from_str("[1.0, 2.0]").unwrap();
        assert_eq!(v, SpecValue::DoubleArray(vec![1.0, 2.0]));
    }

    #[test]
    fn test_distribution_from_json() {
        let v: SpecValue =
            serde_json::from_str(r#"{"distribution": "normal", "mean": 0.5, "std": 0.1}"#).unwrap();
        assert_eq!(
            v,
            SpecValue::Distribution(DistributionSpec::Normal {
                mean: 0.5,
                std: 0.1
            })
        );
    }
}
