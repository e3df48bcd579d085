// Study table module
pub mod base;
pub mod categorical;
pub mod field;
pub mod join;
pub mod query;
pub mod record;

// Re-exports for convenience
pub use base::{NullPolicy, StudyFrame, UnifiedRow};
pub use categorical::{count_animals_by, CategoryCount};
pub use field::{Field, FieldKind, Scalar, Value};
pub use join::join;
pub use query::TimeCourse;
pub use record::{AnimalRecord, MeasurementRecord, Sex};
