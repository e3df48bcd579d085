//! # oncostat
//!
//! Summary statistics and weight/volume regression for preclinical tumor
//! studies: animal metadata is left-joined with longitudinal tumor
//! measurements, then grouped, counted, filtered, averaged per animal and
//! fitted.
//!
//! ```rust
//! use oncostat::{join, AnimalRecord, Field, MeasurementRecord, NullPolicy, Sex};
//!
//! let animals = vec![AnimalRecord::new("s185", Some("Capomulin"), Sex::Female, 3, 17.0)];
//! let measurements = vec![
//!     MeasurementRecord::new("s185", 0, 45.0, 0, None),
//!     MeasurementRecord::new("s185", 5, 43.9, 0, None),
//! ];
//!
//! let frame = join(&measurements, &animals);
//! let summary = oncostat::summarize(&frame, Field::DrugRegimen, Field::TumorVolume, NullPolicy::Exclude)?;
//! assert_eq!(summary.get("Capomulin").map(|s| s.count), Some(2));
//! # Ok::<(), oncostat::Error>(())
//! ```

pub mod config;
pub mod dataframe;
pub mod error;
pub mod groupby;
pub mod io;
pub mod na;
pub mod pipeline;
pub mod stats;
pub mod vis;

// Re-export commonly used types
pub use config::{AnalysisConfig, ColumnMap, StudyConfig};
pub use dataframe::{
    count_animals_by, join, AnimalRecord, CategoryCount, Field, MeasurementRecord, NullPolicy, Scalar,
    Sex, StudyFrame, TimeCourse, UnifiedRow,
};
pub use error::{Error, Result};
pub use groupby::{
    average_by_animal, box_stats_by, par_summarize, summarize, FrameGroupBy, GroupKey, PerAnimalAverage,
    SummaryTable,
};
pub use na::NA;
pub use pipeline::{analyze, load, run, Computed, LoadedStudy, StudyReport};
pub use stats::{fit_line, linear_fit, pearson, BoxStats, FitLine, FitResult, GroupSummary};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
