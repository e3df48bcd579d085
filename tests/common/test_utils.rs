//! Test utilities for temporary files and study fixtures
//!
//! Provides temporary file and directory management with automatic cleanup
//! (respecting TMPDIR, TEMP, TMP) and small study tables in the column layout
//! of the default `ColumnMap`.

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use oncostat::StudyConfig;

static TEST_FILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub const ANIMAL_HEADERS: [&str; 5] = ["Mouse ID", "Drug Regimen", "Sex", "Age_months", "Weight (g)"];
pub const RESULT_HEADERS: [&str; 4] = ["Mouse ID", "Timepoint", "Tumor Volume (mm3)", "Metastatic Sites"];

/// Get the temporary directory, respecting environment variables
pub fn get_temp_dir() -> PathBuf {
    env::var("TMPDIR")
        .or_else(|_| env::var("TEMP"))
        .or_else(|_| env::var("TMP"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir())
}

/// Generate a unique test file path
pub fn test_temp_path(test_name: &str, extension: &str) -> PathBuf {
    let counter = TEST_FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let filename = format!(
        "oncostat_test_{}_{}_{}.{}",
        test_name,
        std::process::id(),
        counter,
        extension
    );
    get_temp_dir().join(filename)
}

/// RAII wrapper for temporary test files with automatic cleanup
pub struct TempTestFile {
    path: PathBuf,
    keep: bool,
}

impl TempTestFile {
    pub fn new(test_name: &str, extension: &str) -> Self {
        TempTestFile {
            path: test_temp_path(test_name, extension),
            keep: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file after drop (for debugging)
    pub fn keep(&mut self) {
        self.keep = true;
    }
}

impl Drop for TempTestFile {
    fn drop(&mut self) {
        if !self.keep && self.path.exists() {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Helper to create a test CSV file with given data
pub fn create_test_csv(test_name: &str, headers: &[&str], rows: &[Vec<String>]) -> TempTestFile {
    let temp_file = TempTestFile::new(test_name, "csv");
    let mut file = File::create(temp_file.path()).expect("Failed to create test CSV");

    writeln!(file, "{}", headers.join(",")).expect("Failed to write headers");
    for row in rows {
        writeln!(file, "{}", row.join(",")).expect("Failed to write row");
    }

    temp_file
}

/// Turn string-literal rows into owned CSV rows
pub fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

/// The two input tables of a study, removed on drop
pub struct StudyFiles {
    pub animals: TempTestFile,
    pub results: TempTestFile,
}

impl StudyFiles {
    pub fn write(test_name: &str, animals: &[&[&str]], results: &[&[&str]]) -> Self {
        StudyFiles {
            animals: create_test_csv(&format!("{}_animals", test_name), &ANIMAL_HEADERS, &rows(animals)),
            results: create_test_csv(&format!("{}_results", test_name), &RESULT_HEADERS, &rows(results)),
        }
    }

    /// Default configuration pointing at these files
    pub fn config(&self) -> StudyConfig {
        let mut config = StudyConfig::default();
        config.data.animal_metadata = self.animals.path().to_path_buf();
        config.data.study_results = self.results.path().to_path_buf();
        config
    }
}

/// A small study: four Capomulin animals, two Ramicane, one Infubinol,
/// each measured at 0, 5 and 10 days.
pub fn sample_study(test_name: &str) -> StudyFiles {
    StudyFiles::write(
        test_name,
        &[
            &["s185", "Capomulin", "Female", "3", "17"],
            &["x401", "Capomulin", "Female", "16", "15"],
            &["m601", "Capomulin", "Male", "22", "17"],
            &["b128", "Capomulin", "Female", "9", "22"],
            &["k403", "Ramicane", "Male", "21", "16"],
            &["g791", "Ramicane", "Male", "11", "16"],
            &["a203", "Infubinol", "Female", "20", "23"],
        ],
        &[
            &["s185", "0", "45.0", "0"],
            &["s185", "5", "43.878496", "0"],
            &["s185", "10", "37.614948", "0"],
            &["x401", "0", "45.0", "0"],
            &["x401", "5", "45.473753", "0"],
            &["x401", "10", "39.113891", "0"],
            &["m601", "0", "45.0", "0"],
            &["m601", "5", "41.408591", "1"],
            &["m601", "10", "36.825367", "1"],
            &["b128", "0", "45.0", "0"],
            &["b128", "5", "45.651331", "0"],
            &["b128", "10", "43.270852", "0"],
            &["k403", "0", "45.0", "0"],
            &["k403", "5", "38.825898", "0"],
            &["k403", "10", "35.014271", "1"],
            &["g791", "0", "45.0", "0"],
            &["g791", "5", "45.851531", "0"],
            &["g791", "10", "46.759074", "0"],
            &["a203", "0", "45.0", "0"],
            &["a203", "5", "48.508468", "0"],
            &["a203", "10", "51.852437", "1"],
        ],
    )
}
