//! Study configuration loaded from TOML
//!
//! ```toml
//! [data]
//! animal_metadata = "data/Mouse_metadata.csv"
//! study_results = "data/Study_results.csv"
//!
//! [analysis]
//! null_policy = "strict"
//! box_plot_regimens = ["Capomulin", "Ramicane"]
//! ```
//!
//! Every section and key is optional; omitted values take the defaults of
//! the corresponding `Default` impl.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataframe::base::NullPolicy;
use crate::dataframe::field::Field;
use crate::error::{Error, Result};

/// Complete configuration of one analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub data: DataConfig,
    pub columns: ColumnMap,
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
}

/// Locations of the two input tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub animal_metadata: PathBuf,
    pub study_results: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            animal_metadata: PathBuf::from("data/Mouse_metadata.csv"),
            study_results: PathBuf::from("data/Study_results.csv"),
        }
    }
}

/// Header names of the input columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub mouse_id: String,
    pub drug_regimen: String,
    pub sex: String,
    pub age_months: String,
    pub weight_g: String,
    pub timepoint: String,
    pub tumor_volume: String,
    pub metastatic_sites: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        ColumnMap {
            mouse_id: "Mouse ID".to_string(),
            drug_regimen: "Drug Regimen".to_string(),
            sex: "Sex".to_string(),
            age_months: "Age_months".to_string(),
            weight_g: "Weight (g)".to_string(),
            timepoint: "Timepoint".to_string(),
            tumor_volume: "Tumor Volume (mm3)".to_string(),
            metastatic_sites: "Metastatic Sites".to_string(),
        }
    }
}

impl ColumnMap {
    /// Header name of a field
    pub fn header(&self, field: Field) -> &str {
        match field {
            Field::MouseId => &self.mouse_id,
            Field::DrugRegimen => &self.drug_regimen,
            Field::Sex => &self.sex,
            Field::AgeMonths => &self.age_months,
            Field::WeightG => &self.weight_g,
            Field::Timepoint => &self.timepoint,
            Field::TumorVolume => &self.tumor_volume,
            Field::MetastaticSites => &self.metastatic_sites,
        }
    }

    fn validate(&self) -> Result<()> {
        for field in Field::ALL {
            if self.header(field).trim().is_empty() {
                return Err(Error::Config(format!("column name for '{}' is empty", field)));
            }
        }
        Ok(())
    }
}

/// Which subsets the analysis looks at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub null_policy: NullPolicy,
    /// Regimens compared in the box plot
    pub box_plot_regimens: Vec<String>,
    /// Use only each animal's last observation for the box statistics
    pub final_timepoint_only: bool,
    /// Animal whose time course is extracted
    pub focus_animal: String,
    pub focus_regimen: String,
    /// Regimen whose per-animal averages feed the weight/volume regression
    pub correlation_regimen: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            null_policy: NullPolicy::Exclude,
            box_plot_regimens: ["Capomulin", "Ramicane", "Infubinol", "Ceftamin"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            final_timepoint_only: false,
            focus_animal: "s185".to_string(),
            focus_regimen: "Capomulin".to_string(),
            correlation_regimen: "Capomulin".to_string(),
        }
    }
}

impl AnalysisConfig {
    fn validate(&self) -> Result<()> {
        if self.box_plot_regimens.is_empty() {
            return Err(Error::Config("box_plot_regimens must name at least one regimen".into()));
        }
        if self.box_plot_regimens.iter().any(|r| r.trim().is_empty()) {
            return Err(Error::Config("box_plot_regimens contains an empty name".into()));
        }
        if self.correlation_regimen.trim().is_empty() {
            return Err(Error::Config("correlation_regimen is empty".into()));
        }
        Ok(())
    }
}

/// Optional output files; nothing is written for `None`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub report_json: Option<PathBuf>,
    pub summary_csv: Option<PathBuf>,
    /// SVG charts, written only with the `visualization` feature
    pub charts_dir: Option<PathBuf>,
}

impl StudyConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: StudyConfig =
            toml::from_str(input).map_err(|e| Error::Config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let input = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&input)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(format!("cannot serialize: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        self.columns.validate()?;
        self.analysis.validate()
    }
}
