use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::dataframe::base::StudyFrame;
use crate::error::Result;
use crate::pipeline::StudyReport;

/// Write an analysis report as pretty-printed JSON.
///
/// Undefined statistics (NaN) appear as `null`.
pub fn write_report_json<P: AsRef<Path>>(report: &StudyReport, path: P) -> Result<()> {
    write_pretty(report, path.as_ref())?;
    info!("wrote report to {}", path.as_ref().display());
    Ok(())
}

/// Write the unified table as an array of row objects
pub fn write_frame_json<P: AsRef<Path>>(frame: &StudyFrame, path: P) -> Result<()> {
    write_pretty(frame.rows(), path.as_ref())?;
    info!("wrote {} rows to {}", frame.len(), path.as_ref().display());
    Ok(())
}

/// Serialize any report fragment to a JSON string
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn write_pretty<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::join::join;
    use crate::dataframe::record::{AnimalRecord, MeasurementRecord, Sex};
    use crate::stats::descriptive::GroupSummary;

    #[test]
    fn test_nan_serializes_as_null() {
        let summary = GroupSummary::from_values(&[42.0], 0);
        let json: serde_json::Value = serde_json::from_str(&to_json_string(&summary).unwrap()).unwrap();
        assert_eq!(json["mean"], 42.0);
        assert!(json["variance"].is_null());
        assert!(json["sem"].is_null());
    }

    #[test]
    fn test_unmatched_row_fields_are_null() {
        let animals = vec![AnimalRecord::new("a1", Some("Capomulin"), Sex::Male, 1, 20.0)];
        let measurements = vec![
            MeasurementRecord::new("a1", 0, 45.0, 0, None),
            MeasurementRecord::new("zz", 0, 41.0, 2, None),
        ];
        let frame = join(&measurements, &animals);
        let json: serde_json::Value = serde_json::from_str(&to_json_string(frame.rows()).unwrap()).unwrap();

        assert_eq!(json[0]["sex"], "Male");
        assert_eq!(json[1]["mouse_id"], "zz");
        assert!(json[1]["weight_g"].is_null());
        assert!(json[1]["drug_regimen"].is_null());
    }
}
