//! Error types for the grid engine.

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or driving a grid.
///
/// Every rejected operation leaves the grid exactly as it was; errors are
/// reported synchronously to the caller, never through signals.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A property path could not be parsed.
    #[error("Invalid property path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// A column index referenced a column that does not exist.
    #[error("Column index {index} out of range (have {count} columns)")]
    ColumnOutOfRange { index: usize, count: usize },

    /// Sorting was requested on a column with sorting disabled.
    #[error("Column {index} is not sortable")]
    ColumnNotSortable { index: usize },

    /// Sorting was requested on a column without a property path.
    #[error("Column {index} has no property path to sort by")]
    NoPropertyPath { index: usize },

    /// Sorting was requested while sorting is disabled grid-wide.
    #[error("Grid is not sortable")]
    SortingDisabled,

    /// Sorting was requested before any row source was materialized.
    #[error("No row source has been materialized")]
    NotMaterialized,

    /// A row was selected while selection is disabled.
    #[error("Selection must be enabled to select a row")]
    SelectionDisabled,

    /// An active-row color was configured while selection is disabled.
    #[error("Active row color requires selection to be enabled")]
    ActiveRowColorWithoutSelection,

    /// A palette was configured with no colors.
    #[error("Palette must contain at least one color")]
    EmptyPalette,

    /// The grid was mutated from inside one of its own signal handlers.
    #[error("Grid mutated from inside a signal handler")]
    ReentrantMutation,
}

impl Error {
    /// Create a path error.
    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an out-of-range column error.
    pub fn column_out_of_range(index: usize, count: usize) -> Self {
        Self::ColumnOutOfRange { index, count }
    }
}
