use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::Field;

/// Boxed error raised by an I/O adapter and carried through unchanged.
pub type AdapterSource = Box<dyn std::error::Error + Send + Sync>;

/// All errors produced by the availability pipeline.
#[derive(Error, Debug)]
pub enum AvailabilityError {
    /// The merge step was handed no batches at all.
    #[error("No source batches to merge")]
    EmptyInput,

    /// A column required by the merge or the projection is absent.
    #[error("Required column missing: {column}")]
    MissingColumn { column: String },

    /// A cell could not be converted into its typed field.
    #[error("Invalid value {value:?} in column {column} at row {row}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    /// A pivot was asked to key on a field the aggregate was not grouped by.
    #[error("Field {0} is not part of the grouping")]
    FieldNotGrouped(Field),

    /// Two aggregate groups landed on the same pivot cell.
    #[error("Duplicate pivot cell for [{identity}] at {time}")]
    DuplicateCell { identity: String, time: NaiveDate },

    /// Discovery found no export files under the input directory.
    #[error("No report files found in {}", .0.display())]
    NoSourceFiles(PathBuf),

    /// Failure inside a source or emission adapter, passed through opaquely.
    #[error("Adapter error at {}", path.display())]
    Adapter {
        path: PathBuf,
        #[source]
        source: AdapterSource,
    },
}

impl AvailabilityError {
    /// Wrap any adapter-level error together with the path it concerns.
    pub fn adapter(path: impl Into<PathBuf>, source: impl Into<AdapterSource>) -> Self {
        AvailabilityError::Adapter {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Shorthand for [`AvailabilityError::MissingColumn`].
    pub fn missing_column(column: impl Into<String>) -> Self {
        AvailabilityError::MissingColumn {
            column: column.into(),
        }
    }
}

/// Convenience alias used throughout the availability crates.
pub type Result<T> = std::result::Result<T, AvailabilityError>;
