use std::collections::HashMap;

use crate::dataframe::base::{StudyFrame, UnifiedRow};
use crate::dataframe::record::{AnimalRecord, MeasurementRecord};

/// Left join of measurements onto animal metadata by animal identifier.
///
/// Every measurement appears exactly once and in input order. Animal fields
/// are attached when the identifier matches and left `NA` otherwise; an
/// unmatched identifier is not an error. Column presence of the join key is
/// checked when the tables are loaded (`Error::JoinKey`).
pub fn join(measurements: &[MeasurementRecord], animals: &[AnimalRecord]) -> StudyFrame {
    // Identifiers are unique in loaded metadata; on duplicates the first record wins
    let mut by_id: HashMap<&str, &AnimalRecord> = HashMap::with_capacity(animals.len());
    for animal in animals {
        by_id.entry(animal.mouse_id.as_str()).or_insert(animal);
    }

    let frame: StudyFrame = measurements
        .iter()
        .map(|m| UnifiedRow::from_parts(m, by_id.get(m.mouse_id.as_str()).copied()))
        .collect();

    let unmatched = frame.unmatched_count();
    if unmatched > 0 {
        log::warn!(
            "{} of {} measurement(s) have no matching animal record; their metadata fields are NA",
            unmatched,
            frame.len()
        );
    }
    log::info!(
        "joined {} measurement(s) onto {} animal record(s)",
        frame.len(),
        animals.len()
    );

    frame
}
