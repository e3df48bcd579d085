//! The unified study table: measurements joined with animal metadata

use serde::{Deserialize, Serialize};

use crate::dataframe::field::{Field, Scalar, Value};
use crate::dataframe::record::{AnimalRecord, MeasurementRecord, Sex};
use crate::error::{Error, Result};
use crate::na::NA;

/// How aggregations treat rows whose target value is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    /// Skip the row and count it as excluded
    #[default]
    Exclude,
    /// Fail with `Error::MissingValues`
    Strict,
}

/// A measurement with the metadata of its animal attached.
///
/// Animal-side fields are `NA` when the measurement's identifier has no match
/// in the metadata table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedRow {
    pub mouse_id: String,
    pub timepoint: u32,
    pub tumor_volume: f64,
    pub metastatic_sites: u32,
    pub drug_regimen: NA<String>,
    pub sex: NA<Sex>,
    pub age_months: NA<u32>,
    pub weight_g: NA<f64>,
}

impl UnifiedRow {
    /// Combine a measurement with its (possibly missing) animal.
    ///
    /// The measurement's own regimen takes precedence over the animal's.
    pub fn from_parts(measurement: &MeasurementRecord, animal: Option<&AnimalRecord>) -> Self {
        let drug_regimen = measurement
            .drug_regimen
            .clone()
            .or_else(|| animal.and_then(|a| a.drug_regimen.clone()));

        UnifiedRow {
            mouse_id: measurement.mouse_id.clone(),
            timepoint: measurement.timepoint,
            tumor_volume: measurement.tumor_volume,
            metastatic_sites: measurement.metastatic_sites,
            drug_regimen: drug_regimen.into(),
            sex: animal.map(|a| a.sex).into(),
            age_months: animal.map(|a| a.age_months).into(),
            weight_g: animal.map(|a| a.weight_g).into(),
        }
    }

    /// Whether an animal record was found for this measurement
    pub fn is_matched(&self) -> bool {
        // sex is mandatory in the metadata, so it is present iff the join matched
        self.sex.is_value()
    }

    pub fn get(&self, field: Field) -> NA<Value<'_>> {
        match field {
            Field::MouseId => NA::Value(Value::Str(&self.mouse_id)),
            Field::DrugRegimen => self.drug_regimen.as_ref().map(|s| Value::Str(s.as_str())),
            Field::Sex => self.sex.map(|s| Value::Str(s.as_str())),
            Field::AgeMonths => self.age_months.map(|v| Value::Int(i64::from(v))),
            Field::WeightG => self.weight_g.map(Value::Float),
            Field::Timepoint => NA::Value(Value::Int(i64::from(self.timepoint))),
            Field::TumorVolume => NA::Value(Value::Float(self.tumor_volume)),
            Field::MetastaticSites => NA::Value(Value::Int(i64::from(self.metastatic_sites))),
        }
    }

    /// Numeric cell lookup; categorical fields are rejected
    pub fn numeric(&self, field: Field) -> Result<NA<f64>> {
        field.require_numeric()?;
        Ok(match self.get(field) {
            NA::Value(v) => v.as_f64().into(),
            NA::NA => NA::NA,
        })
    }

    /// `NA` never matches
    pub fn matches(&self, field: Field, expected: &Scalar) -> bool {
        match self.get(field) {
            NA::Value(v) => v.matches(expected),
            NA::NA => false,
        }
    }
}

/// An ordered, immutable collection of unified rows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudyFrame {
    rows: Vec<UnifiedRow>,
}

impl StudyFrame {
    pub fn new() -> Self {
        StudyFrame { rows: Vec::new() }
    }

    pub fn from_rows(rows: Vec<UnifiedRow>) -> Self {
        StudyFrame { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[UnifiedRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnifiedRow> {
        self.rows.iter()
    }

    /// Number of rows with no matching animal record
    pub fn unmatched_count(&self) -> usize {
        self.rows.iter().filter(|row| !row.is_matched()).count()
    }

    /// Distinct animal identifiers in first-seen order
    pub fn mouse_ids(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.rows
            .iter()
            .filter(|row| seen.insert(row.mouse_id.as_str()))
            .map(|row| row.mouse_id.as_str())
            .collect()
    }

    /// A numeric column with missing values kept in place
    pub fn column(&self, field: Field) -> Result<Vec<NA<f64>>> {
        self.rows.iter().map(|row| row.numeric(field)).collect()
    }

    /// The present values of a numeric column, plus the number of rows skipped.
    ///
    /// Under `NullPolicy::Strict` any missing value is an error.
    pub fn numeric_values(&self, field: Field, policy: NullPolicy) -> Result<(Vec<f64>, usize)> {
        collect_present(self.rows.iter(), field, policy)
    }
}

/// Gather present numeric values of `field` from `rows` under `policy`
pub(crate) fn collect_present<'a, I>(
    rows: I,
    field: Field,
    policy: NullPolicy,
) -> Result<(Vec<f64>, usize)>
where
    I: IntoIterator<Item = &'a UnifiedRow>,
{
    let mut values = Vec::new();
    let mut excluded = 0;
    for row in rows {
        match row.numeric(field)? {
            NA::Value(v) => values.push(v),
            NA::NA => excluded += 1,
        }
    }

    if excluded > 0 && policy == NullPolicy::Strict {
        return Err(Error::MissingValues {
            field: field.name().to_string(),
            count: excluded,
        });
    }
    Ok((values, excluded))
}

impl FromIterator<UnifiedRow> for StudyFrame {
    fn from_iter<I: IntoIterator<Item = UnifiedRow>>(iter: I) -> Self {
        StudyFrame {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a StudyFrame {
    type Item = &'a UnifiedRow;
    type IntoIter = std::slice::Iter<'a, UnifiedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
