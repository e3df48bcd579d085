use std::collections::HashMap;

use serde::Serialize;

use crate::dataframe::base::StudyFrame;
use crate::dataframe::field::{Field, FieldKind};
use crate::dataframe::record::AnimalRecord;
use crate::error::{Error, Result};
use crate::na::NA;

/// Number of occurrences of one category value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// `NA` collects rows whose value is missing
    pub category: NA<String>,
    pub count: usize,
}

impl CategoryCount {
    pub fn label(&self) -> String {
        self.category.to_string()
    }
}

/// Count values by descending frequency; ties keep first-seen order
pub(crate) fn count_values<I>(values: I) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = NA<String>>,
{
    let mut position: HashMap<NA<String>, usize> = HashMap::new();
    let mut counts: Vec<CategoryCount> = Vec::new();

    for value in values {
        match position.get(&value) {
            Some(&idx) => counts[idx].count += 1,
            None => {
                position.insert(value.clone(), counts.len());
                counts.push(CategoryCount {
                    category: value,
                    count: 1,
                });
            }
        }
    }

    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

impl StudyFrame {
    /// Frequency of each value of `field` over all rows.
    ///
    /// Every row is counted exactly once, so the counts sum to `self.len()`;
    /// rows with a missing value are counted under `NA`.
    pub fn count_by(&self, field: Field) -> Vec<CategoryCount> {
        count_values(self.iter().map(|row| row.get(field).map(|v| v.to_string())))
    }
}

/// Frequency of an animal-side field with one vote per animal.
///
/// Measurement-only fields (timepoint, tumor volume, metastatic sites) are
/// rejected.
pub fn count_animals_by(animals: &[AnimalRecord], field: Field) -> Result<Vec<CategoryCount>> {
    let mut values = Vec::with_capacity(animals.len());
    for animal in animals {
        let value = animal.get(field).ok_or_else(|| Error::InvalidField {
            field: field.name().to_string(),
            expected: format!("animal metadata ({})", FieldKind::Categorical),
        })?;
        values.push(value.map(|v| v.to_string()));
    }
    Ok(count_values(values))
}
