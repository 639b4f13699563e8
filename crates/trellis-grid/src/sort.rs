//! Row sorting.
//!
//! Sorting is a pure mapping: given a row set, a [`SortDescriptor`] and the
//! column schema, [`sort_rows`] produces a new ordered row set. State
//! bookkeeping (the active descriptor, the header indicator) lives with the
//! grid, not here.
//!
//! Comparison keys are extracted once per row through the column's property
//! path; a row the path does not resolve on contributes a
//! [`CellValue::Null`](crate::CellValue::Null) key and sorts first rather
//! than failing the operation.

use crate::column::ColumnSet;
use crate::error::Result;
use crate::row::RowData;
use crate::value::CellValue;

/// Direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Ascending,
    /// Descending order (Z-A, 9-0).
    Descending,
}

impl SortDirection {
    /// The opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// The active sort: which column, and in which direction.
///
/// The column index refers into the grid's [`ColumnSet`]; validity (range,
/// column sortability, presence of a property path) is checked when the
/// descriptor is applied, not when it is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortDescriptor {
    /// Index of the column to sort by.
    pub column: usize,
    /// Sort direction.
    pub direction: SortDirection,
}

impl SortDescriptor {
    /// Create a descriptor.
    pub fn new(column: usize, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Ascending sort on `column`.
    pub fn ascending(column: usize) -> Self {
        Self::new(column, SortDirection::Ascending)
    }

    /// Descending sort on `column`.
    pub fn descending(column: usize) -> Self {
        Self::new(column, SortDirection::Descending)
    }

    /// The descriptor a repeated header activation on the same column
    /// produces: same column, opposite direction.
    pub fn toggled(self) -> Self {
        Self::new(self.column, self.direction.toggled())
    }
}

/// Sort `rows` by `descriptor`, yielding a new ordered row set.
///
/// The sort is stable: rows with equal keys keep their relative order from
/// `rows`, under both directions (descending is realized by swapping
/// comparison operands, not by reversing the result).
///
/// Errors if the descriptor's column is out of range, has sorting
/// disabled, or has no property path. Key extraction itself cannot fail;
/// see [`crate::row::PropertyPath::resolve`].
pub fn sort_rows<T>(rows: &[T], descriptor: SortDescriptor, columns: &ColumnSet) -> Result<Vec<T>>
where
    T: RowData + Clone,
{
    let path = columns.sort_path(descriptor.column)?;

    // Decorate with the extracted key so each path resolves exactly once.
    let mut keyed: Vec<(CellValue, &T)> =
        rows.iter().map(|row| (path.resolve(row), row)).collect();

    match descriptor.direction {
        SortDirection::Ascending => keyed.sort_by(|a, b| a.0.compare(&b.0)),
        SortDirection::Descending => keyed.sort_by(|a, b| b.0.compare(&a.0)),
    }

    Ok(keyed.into_iter().map(|(_, row)| row.clone()).collect())
}
