//! Column identifiers and cell values for study tables

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A column of the unified study table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    MouseId,
    DrugRegimen,
    Sex,
    AgeMonths,
    WeightG,
    Timepoint,
    TumorVolume,
    MetastaticSites,
}

/// Whether a field holds labels or numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Categorical,
    Numeric,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Categorical => write!(f, "categorical"),
            FieldKind::Numeric => write!(f, "numeric"),
        }
    }
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::MouseId,
        Field::DrugRegimen,
        Field::Sex,
        Field::AgeMonths,
        Field::WeightG,
        Field::Timepoint,
        Field::TumorVolume,
        Field::MetastaticSites,
    ];

    pub fn kind(self) -> FieldKind {
        match self {
            Field::MouseId | Field::DrugRegimen | Field::Sex => FieldKind::Categorical,
            Field::AgeMonths
            | Field::WeightG
            | Field::Timepoint
            | Field::TumorVolume
            | Field::MetastaticSites => FieldKind::Numeric,
        }
    }

    pub fn is_numeric(self) -> bool {
        self.kind() == FieldKind::Numeric
    }

    /// Snake-case identifier used in configuration and reports
    pub fn name(self) -> &'static str {
        match self {
            Field::MouseId => "mouse_id",
            Field::DrugRegimen => "drug_regimen",
            Field::Sex => "sex",
            Field::AgeMonths => "age_months",
            Field::WeightG => "weight_g",
            Field::Timepoint => "timepoint",
            Field::TumorVolume => "tumor_volume",
            Field::MetastaticSites => "metastatic_sites",
        }
    }

    pub(crate) fn require_numeric(self) -> Result<()> {
        if self.is_numeric() {
            Ok(())
        } else {
            Err(Error::InvalidField {
                field: self.name().to_string(),
                expected: FieldKind::Numeric.to_string(),
            })
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| Error::Config(format!("unknown field '{}'", s)))
    }
}

/// A borrowed cell of a study row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Str(&'a str),
    Int(i64),
    Float(f64),
}

impl<'a> Value<'a> {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(v) => Some(v as f64),
            Value::Float(v) => Some(v),
            Value::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Exact comparison against a filter value.
    ///
    /// Strings compare case-sensitively; numbers compare by value, so
    /// `Int(5)` matches `Scalar::Float(5.0)`.
    pub fn matches(&self, scalar: &Scalar) -> bool {
        match (self, scalar) {
            (Value::Str(a), Scalar::Str(b)) => *a == b.as_str(),
            (Value::Int(a), Scalar::Int(b)) => a == b,
            (Value::Str(_), _) | (_, Scalar::Str(_)) => false,
            (lhs, rhs) => lhs.as_f64() == rhs.as_f64(),
        }
    }

    pub fn to_scalar(&self) -> Scalar {
        match *self {
            Value::Str(s) => Scalar::Str(s.to_string()),
            Value::Int(v) => Scalar::Int(v),
            Value::Float(v) => Scalar::Float(v),
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
        }
    }
}

/// An owned value used in filters and predicates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Scalar::Int(v) => Some(v as f64),
            Scalar::Float(v) => Some(v),
            Scalar::Str(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => f.write_str(s),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<&String> for Scalar {
    fn from(s: &String) -> Self {
        Scalar::Str(s.clone())
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<u32> for Scalar {
    fn from(v: u32) -> Self {
        Scalar::Int(i64::from(v))
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_round_trips_through_name() {
        for field in Field::ALL {
            assert_eq!(field.name().parse::<Field>().unwrap(), field);
        }
        assert!("tumour".parse::<Field>().is_err());
    }

    #[test]
    fn test_field_kinds() {
        assert!(Field::TumorVolume.is_numeric());
        assert!(!Field::DrugRegimen.is_numeric());
        assert!(Field::Sex.require_numeric().is_err());
    }

    #[test]
    fn test_value_matching() {
        assert!(Value::Str("Capomulin").matches(&"Capomulin".into()));
        assert!(!Value::Str("Capomulin").matches(&"capomulin".into()));
        assert!(Value::Int(5).matches(&Scalar::Float(5.0)));
        assert!(Value::Float(20.0).matches(&Scalar::Int(20)));
        assert!(!Value::Int(5).matches(&"5".into()));
    }
}
