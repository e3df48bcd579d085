//! Row selection for study tables
//!
//! - Membership filters over one field (`filter_by_category`)
//! - Conjunctions of equality predicates (`filter_by_exact_match`)
//! - Last observation per animal (`final_timepoints`)
//! - Time course extraction for a single animal

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::dataframe::base::StudyFrame;
use crate::dataframe::field::{Field, Scalar};

/// Tumor volume over time for one animal under one regimen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeCourse {
    pub mouse_id: String,
    pub drug_regimen: String,
    pub timepoints: Vec<u32>,
    pub tumor_volumes: Vec<f64>,
}

impl TimeCourse {
    pub fn len(&self) -> usize {
        self.timepoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timepoints.is_empty()
    }
}

impl StudyFrame {
    /// Keep rows whose `field` value is one of `allowed`, preserving order.
    ///
    /// Matching is exact and case-sensitive; missing values never match.
    pub fn filter_by_category<I, S>(&self, field: Field, allowed: I) -> StudyFrame
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        let allowed: Vec<Scalar> = allowed.into_iter().map(Into::into).collect();
        self.iter()
            .filter(|row| allowed.iter().any(|value| row.matches(field, value)))
            .cloned()
            .collect()
    }

    /// Keep rows where every named field equals its value.
    ///
    /// Returns an empty frame when nothing matches. A later predicate on the
    /// same field replaces an earlier one.
    pub fn filter_by_exact_match<I, S>(&self, predicates: I) -> StudyFrame
    where
        I: IntoIterator<Item = (Field, S)>,
        S: Into<Scalar>,
    {
        let predicates: BTreeMap<Field, Scalar> = predicates
            .into_iter()
            .map(|(field, value)| (field, value.into()))
            .collect();

        self.iter()
            .filter(|row| {
                predicates
                    .iter()
                    .all(|(field, value)| row.matches(*field, value))
            })
            .cloned()
            .collect()
    }

    /// One row per animal: the observation at its largest timepoint.
    ///
    /// Output keeps input order. On a repeated final timepoint the later row wins.
    pub fn final_timepoints(&self) -> StudyFrame {
        let mut last: HashMap<&str, (u32, usize)> = HashMap::new();
        for (idx, row) in self.iter().enumerate() {
            let entry = last
                .entry(row.mouse_id.as_str())
                .or_insert((row.timepoint, idx));
            if row.timepoint >= entry.0 {
                *entry = (row.timepoint, idx);
            }
        }

        let mut keep: Vec<usize> = last.values().map(|&(_, idx)| idx).collect();
        keep.sort_unstable();
        keep.into_iter().map(|idx| self.rows()[idx].clone()).collect()
    }

    /// Timepoint/volume series for one animal under one regimen, sorted by timepoint
    pub fn time_course(&self, mouse_id: &str, drug_regimen: &str) -> TimeCourse {
        let subset = self.filter_by_exact_match([
            (Field::MouseId, mouse_id),
            (Field::DrugRegimen, drug_regimen),
        ]);

        let mut points: Vec<(u32, f64)> = subset
            .iter()
            .map(|row| (row.timepoint, row.tumor_volume))
            .collect();
        points.sort_by_key(|&(t, _)| t);

        TimeCourse {
            mouse_id: mouse_id.to_string(),
            drug_regimen: drug_regimen.to_string(),
            timepoints: points.iter().map(|&(t, _)| t).collect(),
            tumor_volumes: points.iter().map(|&(_, v)| v).collect(),
        }
    }
}
