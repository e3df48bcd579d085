//! End-to-end analysis: load, join, aggregate, filter, average and fit
//!
//! Loader and join failures abort the run. Statistical failures that only
//! concern one computation (too few points, zero variance, missing values)
//! are reported as [`Computed::Undefined`] and the remaining results are
//! still produced.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::Serialize;

use crate::config::{AnalysisConfig, StudyConfig};
use crate::dataframe::base::{collect_present, StudyFrame};
use crate::dataframe::categorical::{count_animals_by, CategoryCount};
use crate::dataframe::field::Field;
use crate::dataframe::join::join;
use crate::dataframe::query::TimeCourse;
use crate::dataframe::record::{AnimalRecord, MeasurementRecord};
use crate::error::{Error, Result};
use crate::groupby::{average_by_animal, paired_means, summarize, PerAnimalAverage, SummaryTable};
use crate::io::csv::{self as csv_io, MEASUREMENT_TABLE};
use crate::io::json::write_report_json;
use crate::stats::descriptive::BoxStats;
use crate::stats::regression::{fit_line, linear_fit, pearson, FitLine, FitResult};

/// A result that may be undefined for the data at hand
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Computed<T> {
    Value(T),
    Undefined { reason: String },
}

impl<T> Computed<T> {
    /// Downgrade recoverable errors to `Undefined`; other errors are returned
    pub fn from_result(label: &str, result: Result<T>) -> Result<Self> {
        match result {
            Ok(value) => Ok(Computed::Value(value)),
            Err(err) if err.is_recoverable() => {
                warn!("{} is undefined: {}", label, err);
                Ok(Computed::Undefined {
                    reason: err.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }

    pub fn undefined(reason: impl Into<String>) -> Self {
        Computed::Undefined {
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Computed::Value(v) => Some(v),
            Computed::Undefined { .. } => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Computed::Value(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Computed::Value(_) => None,
            Computed::Undefined { reason } => Some(reason),
        }
    }
}

/// Input records and their joined table
#[derive(Debug, Clone)]
pub struct LoadedStudy {
    pub animals: Vec<AnimalRecord>,
    pub measurements: Vec<MeasurementRecord>,
    pub frame: StudyFrame,
}

impl LoadedStudy {
    /// Join already-parsed records
    pub fn new(animals: Vec<AnimalRecord>, measurements: Vec<MeasurementRecord>) -> Self {
        let frame = join(&measurements, &animals);
        LoadedStudy {
            animals,
            measurements,
            frame,
        }
    }
}

/// Read and join both input tables.
///
/// The regimen column may sit on either table but must be on at least one.
pub fn load(config: &StudyConfig) -> Result<LoadedStudy> {
    let data = &config.data;
    let columns = &config.columns;

    let animals = csv_io::animal_table(&data.animal_metadata, columns)?;
    let measurements = csv_io::measurement_table(&data.study_results, columns)?;

    if !animals.has_regimen && !measurements.has_regimen {
        return Err(Error::malformed(
            MEASUREMENT_TABLE,
            None,
            &columns.drug_regimen,
            "required column is missing from both tables",
        ));
    }

    let study = LoadedStudy::new(animals.records, measurements.records);
    info!(
        "study loaded: {} rows, {} animals, {} unmatched rows",
        study.frame.len(),
        study.animals.len(),
        study.frame.unmatched_count()
    );
    Ok(study)
}

/// Everything the analysis derives from one study
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyReport {
    pub row_count: usize,
    pub animal_count: usize,
    /// Measurement rows without animal metadata
    pub unmatched_rows: usize,
    /// Tumor volume statistics per regimen
    pub regimen_summary: SummaryTable,
    /// Measurement rows per regimen
    pub regimen_counts: Vec<CategoryCount>,
    /// Animals per sex
    pub sex_counts: Vec<CategoryCount>,
    /// Tumor volume distribution of each configured box-plot regimen
    pub box_stats: BTreeMap<String, Computed<BoxStats>>,
    pub time_course: TimeCourse,
    /// Mean weight and tumor volume per animal of the correlation regimen
    pub animal_averages: Computed<BTreeMap<String, PerAnimalAverage>>,
    /// Pearson r of mean weight against mean tumor volume
    pub correlation: Computed<f64>,
    pub fit: Computed<FitResult>,
    /// Least-squares line, defined from two animals on
    pub line: Computed<FitLine>,
}

impl StudyReport {
    /// (weight, volume) points behind the correlation, in animal id order
    pub fn correlation_points(&self) -> (Vec<f64>, Vec<f64>) {
        match self.animal_averages.value() {
            Some(averages) => paired_means(averages, Field::WeightG, Field::TumorVolume),
            None => (Vec::new(), Vec::new()),
        }
    }
}

fn box_stats_for(frame: &StudyFrame, analysis: &AnalysisConfig) -> Result<BTreeMap<String, Computed<BoxStats>>> {
    let mut subset = frame.filter_by_category(Field::DrugRegimen, &analysis.box_plot_regimens);
    if analysis.final_timepoint_only {
        subset = subset.final_timepoints();
    }

    let grouped = subset.groupby(Field::DrugRegimen);
    let mut result = BTreeMap::new();
    for regimen in &analysis.box_plot_regimens {
        let stats = match grouped.group_rows(regimen) {
            Some(rows) => collect_present(rows, Field::TumorVolume, analysis.null_policy)
                .and_then(|(values, _)| BoxStats::from_values(&values)),
            None => Err(Error::InsufficientData {
                required: 1,
                found: 0,
            }),
        };
        let label = format!("box statistics for {}", regimen);
        result.insert(regimen.clone(), Computed::from_result(&label, stats)?);
    }
    Ok(result)
}

fn regression_for(
    frame: &StudyFrame,
    analysis: &AnalysisConfig,
) -> Result<(
    Computed<BTreeMap<String, PerAnimalAverage>>,
    Computed<f64>,
    Computed<FitResult>,
    Computed<FitLine>,
)> {
    let subset = frame.filter_by_category(Field::DrugRegimen, [analysis.correlation_regimen.as_str()]);
    let averages = Computed::from_result(
        "per-animal averages",
        average_by_animal(&subset, &[Field::WeightG, Field::TumorVolume], analysis.null_policy),
    )?;

    let (x, y) = match averages.value() {
        Some(averages) => paired_means(averages, Field::WeightG, Field::TumorVolume),
        None => {
            let reason = averages.reason().unwrap_or_default().to_string();
            return Ok((
                averages,
                Computed::undefined(reason.clone()),
                Computed::undefined(reason.clone()),
                Computed::undefined(reason),
            ));
        }
    };
    info!(
        "regression of tumor volume on weight over {} animals of {}",
        x.len(),
        analysis.correlation_regimen
    );

    let correlation = Computed::from_result("correlation", pearson(&x, &y))?;
    let fit = Computed::from_result("linear fit", linear_fit(&x, &y))?;
    let line = Computed::from_result("fitted line", fit_line(&x, &y))?;
    Ok((averages, correlation, fit, line))
}

/// Compute every derived table of the study.
///
/// Fails only when the regimen summary violates `NullPolicy::Strict`.
pub fn analyze(study: &LoadedStudy, analysis: &AnalysisConfig) -> Result<StudyReport> {
    let frame = &study.frame;
    let policy = analysis.null_policy;

    let regimen_summary = summarize(frame, Field::DrugRegimen, Field::TumorVolume, policy)?;
    info!("summarized {} regimens", regimen_summary.len());

    let regimen_counts = frame.count_by(Field::DrugRegimen);
    let sex_counts = count_animals_by(&study.animals, Field::Sex)?;
    let box_stats = box_stats_for(frame, analysis)?;
    let time_course = frame.time_course(&analysis.focus_animal, &analysis.focus_regimen);
    if time_course.is_empty() {
        warn!(
            "no observations of {} under {}",
            analysis.focus_animal, analysis.focus_regimen
        );
    }
    let (animal_averages, correlation, fit, line) = regression_for(frame, analysis)?;

    Ok(StudyReport {
        row_count: frame.len(),
        animal_count: study.animals.len(),
        unmatched_rows: frame.unmatched_count(),
        regimen_summary,
        regimen_counts,
        sex_counts,
        box_stats,
        time_course,
        animal_averages,
        correlation,
        fit,
        line,
    })
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Load, analyze and write the configured outputs
pub fn run(config: &StudyConfig) -> Result<StudyReport> {
    config.validate()?;
    let study = load(config)?;
    let report = analyze(&study, &config.analysis)?;

    let output = &config.output;
    if let Some(path) = &output.summary_csv {
        ensure_parent(path)?;
        csv_io::write_summary_csv(&report.regimen_summary, path)?;
    }
    if let Some(path) = &output.report_json {
        ensure_parent(path)?;
        write_report_json(&report, path)?;
    }
    if let Some(dir) = &output.charts_dir {
        write_charts(&report, dir)?;
    }

    Ok(report)
}

#[cfg(feature = "visualization")]
fn write_charts(report: &StudyReport, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    crate::vis::svg::render_report(report, dir)
}

#[cfg(not(feature = "visualization"))]
fn write_charts(_report: &StudyReport, dir: &Path) -> Result<()> {
    warn!(
        "charts_dir {} ignored: built without the visualization feature",
        dir.display()
    );
    Ok(())
}
