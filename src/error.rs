use thiserror::Error;

/// Error type for loading, joining and analysing study tables
#[derive(Error, Debug)]
pub enum Error {
    /// A required column is missing or a cell fails to parse to its declared type
    #[error("malformed input in {table}{}: column '{column}': {message}", fmt_row(.row))]
    MalformedInput {
        table: String,
        row: Option<usize>,
        column: String,
        message: String,
    },

    /// The join key column is absent from one of the input tables
    #[error("join key column '{column}' is missing from the {table} table")]
    JoinKey { table: String, column: String },

    /// Correlation or regression over a sequence with zero variance
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    #[error("insufficient data: at least {required} observations required, found {found}")]
    InsufficientData { required: usize, found: usize },

    #[error("length mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Raised instead of skipping rows when strict null handling is requested
    #[error("{count} row(s) have a missing value in '{field}'")]
    MissingValues { field: String, count: usize },

    #[error("field '{field}' cannot be used here: expected a {expected} field")]
    InvalidField { field: String, expected: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("visualization error: {0}")]
    Visualization(String),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("CSV error")]
    Csv(#[from] csv::Error),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

fn fmt_row(row: &Option<usize>) -> String {
    match row {
        Some(row) => format!(" (row {})", row),
        None => String::new(),
    }
}

impl Error {
    /// Statistical failures that are local to one computation.
    ///
    /// Loader and join errors are fatal for the whole run; these are not, and
    /// the pipeline reports them as undefined results instead.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::DegenerateInput(_) | Error::InsufficientData { .. } | Error::MissingValues { .. }
        )
    }

    pub(crate) fn malformed(
        table: &str,
        row: Option<usize>,
        column: &str,
        message: impl Into<String>,
    ) -> Self {
        Error::MalformedInput {
            table: table.to_string(),
            row,
            column: column.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(feature = "visualization")]
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for Error
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        Error::Visualization(format!("drawing error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_includes_row() {
        let err = Error::malformed("animals", Some(3), "Weight (g)", "not a number: 'abc'");
        let msg = err.to_string();
        assert!(msg.contains("animals"));
        assert!(msg.contains("row 3"));
        assert!(msg.contains("Weight (g)"));
    }

    #[test]
    fn test_malformed_header_has_no_row() {
        let err = Error::malformed("measurements", None, "Timepoint", "column not found");
        assert!(!err.to_string().contains("row"));
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(Error::DegenerateInput("x".into()).is_recoverable());
        assert!(Error::InsufficientData { required: 3, found: 2 }.is_recoverable());
        assert!(!Error::JoinKey {
            table: "animals".into(),
            column: "Mouse ID".into()
        }
        .is_recoverable());
        assert!(!Error::Config("bad".into()).is_recoverable());
    }
}
