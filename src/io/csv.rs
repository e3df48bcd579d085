use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Writer};
use log::info;

use crate::config::ColumnMap;
use crate::dataframe::field::Field;
use crate::dataframe::record::{AnimalRecord, MeasurementRecord, Sex};
use crate::error::{Error, Result};
use crate::groupby::SummaryTable;

pub const ANIMAL_TABLE: &str = "animal metadata";
pub const MEASUREMENT_TABLE: &str = "study results";

/// Column positions of one input table, resolved from its header row
struct HeaderIndex<'a> {
    table: &'static str,
    headers: StringRecord,
    columns: &'a ColumnMap,
}

impl<'a> HeaderIndex<'a> {
    fn position(&self, field: Field) -> Option<usize> {
        let name = self.columns.header(field);
        self.headers.iter().position(|h| h == name)
    }

    /// The join key; its absence is a join error rather than malformed input
    fn key(&self) -> Result<usize> {
        self.position(Field::MouseId).ok_or_else(|| Error::JoinKey {
            table: self.table.to_string(),
            column: self.columns.mouse_id.clone(),
        })
    }

    fn required(&self, field: Field) -> Result<usize> {
        self.position(field).ok_or_else(|| {
            Error::malformed(self.table, None, self.columns.header(field), "required column is missing")
        })
    }
}

/// Typed access to the cells of one data row
struct Cells<'a> {
    table: &'static str,
    /// 1-based data row number
    row: usize,
    record: &'a StringRecord,
    headers: &'a StringRecord,
    columns: &'a ColumnMap,
}

impl<'a> Cells<'a> {
    fn new(index: &'a HeaderIndex<'a>, row: usize, record: &'a StringRecord) -> Result<Self> {
        let cells = Cells {
            table: index.table,
            row,
            record,
            headers: &index.headers,
            columns: index.columns,
        };
        cells.check_width()?;
        Ok(cells)
    }

    /// A row must have exactly one field per header
    fn check_width(&self) -> Result<()> {
        let (found, expected) = (self.record.len(), self.headers.len());
        if found == expected {
            return Ok(());
        }
        // name the first missing column, or the first surplus position
        let column = match self.headers.get(found) {
            Some(name) => name.to_string(),
            None => format!("field {}", expected + 1),
        };
        Err(Error::malformed(
            self.table,
            Some(self.row),
            &column,
            format!("expected {} fields, found {}", expected, found),
        ))
    }

    fn text(&self, idx: usize, field: Field) -> Result<&'a str> {
        let value = self.record.get(idx).unwrap_or("");
        if value.is_empty() {
            return Err(self.error(field, "value is empty"));
        }
        Ok(value)
    }

    fn optional_text(&self, idx: Option<usize>) -> Option<&'a str> {
        idx.and_then(|i| self.record.get(i)).filter(|v| !v.is_empty())
    }

    fn parse<T: FromStr>(&self, idx: usize, field: Field, expected: &str) -> Result<T> {
        let text = self.text(idx, field)?;
        text.parse()
            .map_err(|_| self.error(field, format!("cannot parse '{}' as {}", text, expected)))
    }

    fn positive(&self, idx: usize, field: Field) -> Result<f64> {
        let value: f64 = self.parse(idx, field, "a number")?;
        if !value.is_finite() || value <= 0.0 {
            return Err(self.error(field, format!("expected a positive number, found {}", value)));
        }
        Ok(value)
    }

    fn error(&self, field: Field, message: impl Into<String>) -> Error {
        Error::malformed(self.table, Some(self.row), self.columns.header(field), message)
    }
}

/// Invalid UTF-8 in a cell is malformed input; other reader failures stay CSV errors
fn record_error(table: &str, row: usize, err: csv::Error) -> Error {
    let bad_field = match err.kind() {
        csv::ErrorKind::Utf8 { err, .. } => Some(err.field()),
        _ => None,
    };
    match bad_field {
        Some(field) => Error::malformed(table, Some(row), &format!("field {}", field + 1), "invalid UTF-8"),
        None => Error::Csv(err),
    }
}

fn reader<R: Read>(source: R) -> csv::Reader<R> {
    // ragged rows are reported per row by `Cells::check_width`
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source)
}

/// Records of one input table and what its header row contained
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable<T> {
    pub records: Vec<T>,
    /// Whether the configured regimen column is present
    pub has_regimen: bool,
}

/// Read the animal metadata table from a CSV file
pub fn read_animals<P: AsRef<Path>>(path: P, columns: &ColumnMap) -> Result<Vec<AnimalRecord>> {
    Ok(animal_table(path, columns)?.records)
}

/// Read the animal metadata table from any CSV source
pub fn read_animals_from_reader<R: Read>(source: R, columns: &ColumnMap) -> Result<Vec<AnimalRecord>> {
    Ok(animal_table_from_reader(source, columns)?.records)
}

/// Read the animal metadata table from a CSV file, noting the regimen column
pub fn animal_table<P: AsRef<Path>>(path: P, columns: &ColumnMap) -> Result<CsvTable<AnimalRecord>> {
    let file = File::open(path.as_ref())?;
    let table = animal_table_from_reader(file, columns)?;
    info!("loaded {} animals from {}", table.records.len(), path.as_ref().display());
    Ok(table)
}

/// Parse animal metadata.
///
/// The regimen column is optional here. Identifiers must be unique.
pub fn animal_table_from_reader<R: Read>(source: R, columns: &ColumnMap) -> Result<CsvTable<AnimalRecord>> {
    let mut rdr = reader(source);
    let index = HeaderIndex {
        table: ANIMAL_TABLE,
        headers: rdr.headers()?.clone(),
        columns,
    };

    let id_col = index.key()?;
    let sex_col = index.required(Field::Sex)?;
    let age_col = index.required(Field::AgeMonths)?;
    let weight_col = index.required(Field::WeightG)?;
    let regimen_col = index.position(Field::DrugRegimen);

    let mut seen = HashSet::new();
    let mut animals = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| record_error(ANIMAL_TABLE, i + 1, e))?;
        let cells = Cells::new(&index, i + 1, &record)?;

        let mouse_id = cells.text(id_col, Field::MouseId)?;
        if !seen.insert(mouse_id.to_string()) {
            return Err(cells.error(Field::MouseId, format!("duplicate identifier '{}'", mouse_id)));
        }

        let sex_text = cells.text(sex_col, Field::Sex)?;
        let sex = Sex::from_str(sex_text).map_err(|e| cells.error(Field::Sex, e))?;

        animals.push(AnimalRecord {
            mouse_id: mouse_id.to_string(),
            drug_regimen: cells.optional_text(regimen_col).map(str::to_string),
            sex,
            age_months: cells.parse(age_col, Field::AgeMonths, "a non-negative integer")?,
            weight_g: cells.positive(weight_col, Field::WeightG)?,
        });
    }

    Ok(CsvTable {
        records: animals,
        has_regimen: regimen_col.is_some(),
    })
}

/// Read the study results table from a CSV file
pub fn read_measurements<P: AsRef<Path>>(path: P, columns: &ColumnMap) -> Result<Vec<MeasurementRecord>> {
    Ok(measurement_table(path, columns)?.records)
}

/// Read the study results table from any CSV source
pub fn read_measurements_from_reader<R: Read>(
    source: R,
    columns: &ColumnMap,
) -> Result<Vec<MeasurementRecord>> {
    Ok(measurement_table_from_reader(source, columns)?.records)
}

/// Read the study results table from a CSV file, noting the regimen column
pub fn measurement_table<P: AsRef<Path>>(path: P, columns: &ColumnMap) -> Result<CsvTable<MeasurementRecord>> {
    let file = File::open(path.as_ref())?;
    let table = measurement_table_from_reader(file, columns)?;
    info!("loaded {} measurements from {}", table.records.len(), path.as_ref().display());
    Ok(table)
}

/// Parse study results
pub fn measurement_table_from_reader<R: Read>(
    source: R,
    columns: &ColumnMap,
) -> Result<CsvTable<MeasurementRecord>> {
    let mut rdr = reader(source);
    let index = HeaderIndex {
        table: MEASUREMENT_TABLE,
        headers: rdr.headers()?.clone(),
        columns,
    };

    let id_col = index.key()?;
    let timepoint_col = index.required(Field::Timepoint)?;
    let volume_col = index.required(Field::TumorVolume)?;
    let sites_col = index.required(Field::MetastaticSites)?;
    let regimen_col = index.position(Field::DrugRegimen);

    let mut measurements = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| record_error(MEASUREMENT_TABLE, i + 1, e))?;
        let cells = Cells::new(&index, i + 1, &record)?;

        measurements.push(MeasurementRecord {
            mouse_id: cells.text(id_col, Field::MouseId)?.to_string(),
            timepoint: cells.parse(timepoint_col, Field::Timepoint, "a non-negative integer")?,
            tumor_volume: cells.positive(volume_col, Field::TumorVolume)?,
            metastatic_sites: cells.parse(sites_col, Field::MetastaticSites, "a non-negative integer")?,
            drug_regimen: cells.optional_text(regimen_col).map(str::to_string),
        });
    }

    Ok(CsvTable {
        records: measurements,
        has_regimen: regimen_col.is_some(),
    })
}

const SUMMARY_HEADER: [&str; 7] = [
    "Mean",
    "Median",
    "Variance",
    "Standard Deviation",
    "SEM",
    "Count",
    "Excluded",
];

fn format_stat(value: f64) -> String {
    // undefined statistics are written as empty cells
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Write a summary table as CSV, one line per group
pub fn write_summary_csv<P: AsRef<Path>>(table: &SummaryTable, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_summary(table, file)?;
    info!("wrote {} summary rows to {}", table.len(), path.as_ref().display());
    Ok(())
}

/// Write a summary table as CSV to any destination
pub fn write_summary<W: Write>(table: &SummaryTable, dest: W) -> Result<()> {
    let mut wtr = Writer::from_writer(dest);

    let mut header = vec![table.group_by.name()];
    header.extend(SUMMARY_HEADER);
    wtr.write_record(&header)?;

    for (key, s) in table.iter() {
        wtr.write_record([
            key.to_string(),
            format_stat(s.mean),
            format_stat(s.median),
            format_stat(s.variance),
            format_stat(s.std_dev),
            format_stat(s.sem),
            s.count.to_string(),
            s.excluded.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
