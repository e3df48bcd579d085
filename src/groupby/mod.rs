//! Grouped aggregation over study tables
//!
//! Groups iterate in sorted key order, so every summary is reproducible for
//! the same input. Keys of numeric fields sort by value (timepoints run
//! 0, 5, 10, not 0, 10, 5); categorical keys sort lexically.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Serialize, Serializer};

use crate::dataframe::base::{collect_present, NullPolicy, StudyFrame, UnifiedRow};
use crate::dataframe::field::{Field, Value};
use crate::error::{Error, Result};
use crate::na::NA;
use crate::stats::descriptive::{mean, BoxStats, GroupSummary};

/// Label of one group, carrying the numeric value for numeric fields
#[derive(Debug, Clone)]
pub struct GroupKey {
    label: String,
    number: Option<f64>,
}

impl GroupKey {
    pub fn from_value(value: &Value<'_>) -> Self {
        GroupKey {
            label: value.to_string(),
            number: value.as_f64(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.label
    }

    /// The value of a numeric key
    pub fn number(&self) -> Option<f64> {
        self.number
    }
}

impl From<&str> for GroupKey {
    fn from(label: &str) -> Self {
        GroupKey {
            label: label.to_string(),
            number: None,
        }
    }
}

impl Ord for GroupKey {
    // numeric keys first, by value; the label breaks ties ("5" vs "5.0")
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.number, other.number) {
            (Some(a), Some(b)) => a.total_cmp(&b).then_with(|| self.label.cmp(&other.label)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.label.cmp(&other.label),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

// Serialized as its label, so keyed maps become JSON objects
impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

/// Row indices of a study table partitioned by one field
#[derive(Debug, Clone)]
pub struct FrameGroupBy<'a> {
    by: Field,
    groups: BTreeMap<GroupKey, Vec<usize>>,
    /// Rows whose grouping value is missing
    missing_key_rows: Vec<usize>,
    source: &'a StudyFrame,
}

impl StudyFrame {
    /// Partition the rows by the value of `by`
    pub fn groupby(&self, by: Field) -> FrameGroupBy<'_> {
        let mut groups: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
        let mut missing_key_rows = Vec::new();

        for (idx, row) in self.iter().enumerate() {
            match row.get(by) {
                NA::Value(key) => groups.entry(GroupKey::from_value(&key)).or_default().push(idx),
                NA::NA => missing_key_rows.push(idx),
            }
        }

        FrameGroupBy {
            by,
            groups,
            missing_key_rows,
            source: self,
        }
    }
}

impl<'a> FrameGroupBy<'a> {
    pub fn by(&self) -> Field {
        self.by
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Group keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(GroupKey::as_str)
    }

    /// Number of rows in each group, in key order
    pub fn size(&self) -> Vec<(&str, usize)> {
        self.groups
            .iter()
            .map(|(key, indices)| (key.as_str(), indices.len()))
            .collect()
    }

    pub fn missing_key_count(&self) -> usize {
        self.missing_key_rows.len()
    }

    /// Rows of one group, in frame order
    pub fn group_rows(&self, key: &str) -> Option<Vec<&'a UnifiedRow>> {
        let source = self.source;
        self.groups
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, indices)| indices.iter().map(|&i| &source.rows()[i]).collect())
    }

    fn check_keys(&self, policy: NullPolicy) -> Result<()> {
        if self.missing_key_rows.is_empty() {
            return Ok(());
        }
        if policy == NullPolicy::Strict {
            return Err(Error::MissingValues {
                field: self.by.name().to_string(),
                count: self.missing_key_rows.len(),
            });
        }
        warn!(
            "{} rows have no {} and are left out of the grouping",
            self.missing_key_rows.len(),
            self.by
        );
        Ok(())
    }

    fn summarize_group(&self, key: &str, indices: &[usize], value: Field, policy: NullPolicy) -> Result<GroupSummary> {
        let rows = indices.iter().map(|&i| &self.source.rows()[i]);
        let (values, excluded) = collect_present(rows, value, policy)?;
        if excluded > 0 {
            warn!("{} = {}: {} rows without {} excluded", self.by, key, excluded, value);
        }
        let summary = GroupSummary::from_values(&values, excluded);
        debug!("{} = {}: n = {}, mean = {}", self.by, key, summary.count, summary.mean);
        Ok(summary)
    }

    /// Descriptive statistics of `value` for every group
    pub fn summarize(&self, value: Field, policy: NullPolicy) -> Result<SummaryTable> {
        value.require_numeric()?;
        self.check_keys(policy)?;

        let mut groups = BTreeMap::new();
        for (key, indices) in &self.groups {
            let summary = self.summarize_group(key.as_str(), indices, value, policy)?;
            groups.insert(key.clone(), summary);
        }

        Ok(self.table(value, groups))
    }

    /// Same result as [`summarize`](Self::summarize), one group per rayon task
    pub fn par_summarize(&self, value: Field, policy: NullPolicy) -> Result<SummaryTable> {
        value.require_numeric()?;
        self.check_keys(policy)?;

        let entries: Vec<(&GroupKey, &Vec<usize>)> = self.groups.iter().collect();
        let summaries = entries
            .par_iter()
            .map(|(key, indices)| {
                self.summarize_group(key.as_str(), indices, value, policy)
                    .map(|summary| ((*key).clone(), summary))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.table(value, summaries.into_iter().collect()))
    }

    fn table(&self, value: Field, groups: BTreeMap<GroupKey, GroupSummary>) -> SummaryTable {
        SummaryTable {
            group_by: self.by,
            value,
            groups,
            missing_key_rows: self.missing_key_rows.len(),
        }
    }

    /// Quartiles and outliers of `value` per group.
    ///
    /// Groups left without any value after exclusion are omitted.
    pub fn box_stats(&self, value: Field, policy: NullPolicy) -> Result<BTreeMap<GroupKey, BoxStats>> {
        value.require_numeric()?;
        self.check_keys(policy)?;

        let mut result = BTreeMap::new();
        for (key, indices) in &self.groups {
            let rows = indices.iter().map(|&i| &self.source.rows()[i]);
            let (values, _) = collect_present(rows, value, policy)?;
            if values.is_empty() {
                warn!("{} = {}: no {} values, box statistics skipped", self.by, key, value);
                continue;
            }
            result.insert(key.clone(), BoxStats::from_values(&values)?);
        }
        Ok(result)
    }
}

/// Per-group summaries of one numeric field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub group_by: Field,
    pub value: Field,
    pub groups: BTreeMap<GroupKey, GroupSummary>,
    /// Rows not assigned to any group because the key was missing
    pub missing_key_rows: usize,
}

impl SummaryTable {
    pub fn get(&self, key: &str) -> Option<&GroupSummary> {
        self.iter().find(|(k, _)| *k == key).map(|(_, summary)| summary)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupSummary)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Rows excluded for a missing value, over all groups
    pub fn excluded_rows(&self) -> usize {
        self.groups.values().map(|s| s.excluded).sum()
    }
}

/// Group statistics of `value` by `group_by`, with groups in sorted key order
pub fn summarize(frame: &StudyFrame, group_by: Field, value: Field, policy: NullPolicy) -> Result<SummaryTable> {
    frame.groupby(group_by).summarize(value, policy)
}

/// Parallel variant of [`summarize`]
pub fn par_summarize(frame: &StudyFrame, group_by: Field, value: Field, policy: NullPolicy) -> Result<SummaryTable> {
    frame.groupby(group_by).par_summarize(value, policy)
}

/// Box statistics of `value` per group of `group_by`
pub fn box_stats_by(
    frame: &StudyFrame,
    group_by: Field,
    value: Field,
    policy: NullPolicy,
) -> Result<BTreeMap<GroupKey, BoxStats>> {
    frame.groupby(group_by).box_stats(value, policy)
}

/// Means of numeric fields over one animal's observations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerAnimalAverage {
    pub mouse_id: String,
    /// Rows of this animal in the input
    pub observations: usize,
    /// `NA` when the animal has no value for the field
    pub means: BTreeMap<Field, NA<f64>>,
}

impl PerAnimalAverage {
    pub fn mean_of(&self, field: Field) -> NA<f64> {
        self.means.get(&field).copied().unwrap_or(NA::NA)
    }

    pub fn weight_g(&self) -> NA<f64> {
        self.mean_of(Field::WeightG)
    }

    pub fn tumor_volume(&self) -> NA<f64> {
        self.mean_of(Field::TumorVolume)
    }
}

/// Average each of `fields` over every animal's rows.
///
/// The frame is expected to hold a single regimen already; mixing regimens is
/// not detected.
pub fn average_by_animal(
    frame: &StudyFrame,
    fields: &[Field],
    policy: NullPolicy,
) -> Result<BTreeMap<String, PerAnimalAverage>> {
    for field in fields {
        field.require_numeric()?;
    }

    let grouped = frame.groupby(Field::MouseId);
    let mut result = BTreeMap::new();

    for (mouse_id, indices) in &grouped.groups {
        let mut means = BTreeMap::new();
        for &field in fields {
            let rows = indices.iter().map(|&i| &frame.rows()[i]);
            let (values, _) = collect_present(rows, field, policy)?;
            let average = if values.is_empty() {
                NA::NA
            } else {
                NA::Value(mean(&values))
            };
            means.insert(field, average);
        }

        result.insert(
            mouse_id.as_str().to_string(),
            PerAnimalAverage {
                mouse_id: mouse_id.as_str().to_string(),
                observations: indices.len(),
                means,
            },
        );
    }

    debug!("averaged {} fields over {} animals", fields.len(), result.len());
    Ok(result)
}

/// Paired (x, y) means across animals, skipping animals missing either one
pub fn paired_means(averages: &BTreeMap<String, PerAnimalAverage>, x: Field, y: Field) -> (Vec<f64>, Vec<f64>) {
    averages
        .values()
        .filter_map(|avg| match (avg.mean_of(x), avg.mean_of(y)) {
            (NA::Value(a), NA::Value(b)) => Some((a, b)),
            _ => None,
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::join::join;
    use crate::dataframe::record::{AnimalRecord, MeasurementRecord, Sex};

    fn sample_frame() -> StudyFrame {
        let animals = vec![
            AnimalRecord::new("c1", Some("Capomulin"), Sex::Female, 9, 17.0),
            AnimalRecord::new("c2", Some("Capomulin"), Sex::Male, 3, 21.0),
            AnimalRecord::new("r1", Some("Ramicane"), Sex::Male, 12, 19.0),
        ];
        let measurements = vec![
            MeasurementRecord::new("c1", 0, 45.0, 0, None),
            MeasurementRecord::new("c1", 5, 43.0, 0, None),
            MeasurementRecord::new("c2", 0, 45.0, 0, None),
            MeasurementRecord::new("c2", 5, 47.0, 1, None),
            MeasurementRecord::new("r1", 0, 45.0, 0, None),
            MeasurementRecord::new("xx", 0, 50.0, 0, None),
        ];
        join(&measurements, &animals)
    }

    #[test]
    fn test_groupby_sorted_keys_and_missing() {
        let frame = sample_frame();
        let grouped = frame.groupby(Field::DrugRegimen);
        assert_eq!(grouped.keys().collect::<Vec<_>>(), vec!["Capomulin", "Ramicane"]);
        assert_eq!(grouped.size(), vec![("Capomulin", 4), ("Ramicane", 1)]);
        assert_eq!(grouped.missing_key_count(), 1);
        assert_eq!(grouped.group_rows("Ramicane").unwrap().len(), 1);
        assert!(grouped.group_rows("Placebo").is_none());
    }

    #[test]
    fn test_numeric_keys_sort_by_value() {
        let animals = vec![AnimalRecord::new("a1", Some("Capomulin"), Sex::Female, 3, 17.0)];
        let measurements: Vec<MeasurementRecord> = [10u32, 0, 45, 5, 15]
            .iter()
            .map(|&t| MeasurementRecord::new("a1", t, 45.0 - f64::from(t) / 5.0, 0, None))
            .collect();
        let frame = join(&measurements, &animals);

        let grouped = frame.groupby(Field::Timepoint);
        assert_eq!(grouped.keys().collect::<Vec<_>>(), vec!["0", "5", "10", "15", "45"]);

        let table = summarize(&frame, Field::Timepoint, Field::TumorVolume, NullPolicy::Exclude).unwrap();
        let numbers: Vec<Option<f64>> = table.groups.keys().map(GroupKey::number).collect();
        assert_eq!(numbers, vec![Some(0.0), Some(5.0), Some(10.0), Some(15.0), Some(45.0)]);
        assert_eq!(table.get("10").unwrap().mean, 43.0);
    }

    #[test]
    fn test_group_key_order() {
        let five = GroupKey::from_value(&Value::Int(5));
        let ten = GroupKey::from_value(&Value::Float(10.0));
        assert!(five < ten);
        assert!(ten < GroupKey::from("Capomulin"));
        assert!(GroupKey::from("Capomulin") < GroupKey::from("Ramicane"));
        assert_eq!(GroupKey::from("10").as_str(), ten.as_str());
        assert_eq!(serde_json::to_string(&ten).unwrap(), "\"10\"");
    }

    #[test]
    fn test_summarize_by_regimen() {
        let frame = sample_frame();
        let table = summarize(&frame, Field::DrugRegimen, Field::TumorVolume, NullPolicy::Exclude).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.missing_key_rows, 1);

        let capomulin = table.get("Capomulin").unwrap();
        assert_eq!(capomulin.count, 4);
        assert!((capomulin.mean - 45.0).abs() < 1e-10);
        assert!((capomulin.median - 45.0).abs() < 1e-10);
        // deviations -2, 0, 0, 2
        assert!((capomulin.variance - 8.0 / 3.0).abs() < 1e-10);

        let ramicane = table.get("Ramicane").unwrap();
        assert_eq!(ramicane.count, 1);
        assert!(ramicane.variance.is_nan());
        assert!(ramicane.sem.is_nan());
    }

    #[test]
    fn test_summarize_strict_rejects_missing_keys() {
        let frame = sample_frame();
        let err = summarize(&frame, Field::DrugRegimen, Field::TumorVolume, NullPolicy::Strict).unwrap_err();
        assert!(matches!(err, Error::MissingValues { count: 1, .. }));
    }

    #[test]
    fn test_summarize_excludes_missing_values() {
        let frame = sample_frame();
        let table = summarize(&frame, Field::MouseId, Field::WeightG, NullPolicy::Exclude).unwrap();
        let orphan = table.get("xx").unwrap();
        assert_eq!(orphan.count, 0);
        assert_eq!(orphan.excluded, 1);
        assert_eq!(table.excluded_rows(), 1);
    }

    #[test]
    fn test_summarize_rejects_categorical_value() {
        let frame = sample_frame();
        assert!(matches!(
            summarize(&frame, Field::DrugRegimen, Field::Sex, NullPolicy::Exclude),
            Err(Error::InvalidField { .. })
        ));
    }

    #[test]
    fn test_par_summarize_matches_sequential() {
        let frame = sample_frame();
        let seq = summarize(&frame, Field::MouseId, Field::TumorVolume, NullPolicy::Exclude).unwrap();
        let par = par_summarize(&frame, Field::MouseId, Field::TumorVolume, NullPolicy::Exclude).unwrap();
        assert_eq!(seq.len(), par.len());
        for ((k1, s1), (k2, s2)) in seq.iter().zip(par.iter()) {
            assert_eq!(k1, k2);
            assert_eq!(s1.count, s2.count);
            assert_eq!(s1.mean.to_bits(), s2.mean.to_bits());
        }
    }

    #[test]
    fn test_average_by_animal() {
        let frame = sample_frame().filter_by_category(Field::DrugRegimen, ["Capomulin"]);
        let averages = average_by_animal(&frame, &[Field::WeightG, Field::TumorVolume], NullPolicy::Exclude).unwrap();

        assert_eq!(averages.len(), 2);
        let c1 = &averages["c1"];
        assert_eq!(c1.observations, 2);
        assert_eq!(c1.weight_g(), NA::Value(17.0));
        assert_eq!(c1.tumor_volume(), NA::Value(44.0));
        assert_eq!(c1.mean_of(Field::AgeMonths), NA::NA);

        let (x, y) = paired_means(&averages, Field::WeightG, Field::TumorVolume);
        assert_eq!(x, vec![17.0, 21.0]);
        assert_eq!(y, vec![44.0, 46.0]);
    }

    #[test]
    fn test_average_by_animal_missing_metadata() {
        let frame = sample_frame();
        let averages = average_by_animal(&frame, &[Field::WeightG], NullPolicy::Exclude).unwrap();
        assert_eq!(averages["xx"].weight_g(), NA::NA);
        assert!(average_by_animal(&frame, &[Field::WeightG], NullPolicy::Strict).is_err());
        assert!(average_by_animal(&frame, &[Field::Sex], NullPolicy::Exclude).is_err());
    }

    #[test]
    fn test_box_stats_by_regimen() {
        let frame = sample_frame();
        let stats = box_stats_by(&frame, Field::DrugRegimen, Field::TumorVolume, NullPolicy::Exclude).unwrap();
        assert_eq!(stats.len(), 2);
        let capomulin = &stats[&GroupKey::from("Capomulin")];
        assert_eq!(capomulin.count, 4);
        assert_eq!(capomulin.min, 43.0);
        assert_eq!(capomulin.max, 47.0);
    }
}
