//! Typed input records

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataframe::field::{Field, Value};
use crate::na::NA;

/// Sex of a study animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Sex::Male),
            "Female" => Ok(Sex::Female),
            other => Err(format!("expected 'Male' or 'Female', found '{}'", other)),
        }
    }
}

/// One row of the animal metadata table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimalRecord {
    pub mouse_id: String,
    /// Present when the metadata table carries the regimen column
    pub drug_regimen: Option<String>,
    pub sex: Sex,
    pub age_months: u32,
    pub weight_g: f64,
}

impl AnimalRecord {
    pub fn new(
        mouse_id: impl Into<String>,
        drug_regimen: Option<&str>,
        sex: Sex,
        age_months: u32,
        weight_g: f64,
    ) -> Self {
        AnimalRecord {
            mouse_id: mouse_id.into(),
            drug_regimen: drug_regimen.map(str::to_string),
            sex,
            age_months,
            weight_g,
        }
    }

    /// Cell lookup for animal-side fields; `None` for measurement-only fields
    pub fn get(&self, field: Field) -> Option<NA<Value<'_>>> {
        let value = match field {
            Field::MouseId => NA::Value(Value::Str(&self.mouse_id)),
            Field::DrugRegimen => self.drug_regimen.as_deref().map(Value::Str).into(),
            Field::Sex => NA::Value(Value::Str(self.sex.as_str())),
            Field::AgeMonths => NA::Value(Value::Int(i64::from(self.age_months))),
            Field::WeightG => NA::Value(Value::Float(self.weight_g)),
            Field::Timepoint | Field::TumorVolume | Field::MetastaticSites => return None,
        };
        Some(value)
    }
}

/// One row of the study results table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRecord {
    pub mouse_id: String,
    pub timepoint: u32,
    pub tumor_volume: f64,
    pub metastatic_sites: u32,
    /// Present when the results table carries the regimen column
    pub drug_regimen: Option<String>,
}

impl MeasurementRecord {
    pub fn new(
        mouse_id: impl Into<String>,
        timepoint: u32,
        tumor_volume: f64,
        metastatic_sites: u32,
        drug_regimen: Option<&str>,
    ) -> Self {
        MeasurementRecord {
            mouse_id: mouse_id.into(),
            timepoint,
            tumor_volume,
            metastatic_sites,
            drug_regimen: drug_regimen.map(str::to_string),
        }
    }
}
