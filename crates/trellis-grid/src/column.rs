//! Column schema and registry.
//!
//! A [`Column`] describes one displayable field of the rows: header title,
//! the property path cells resolve through, a display width hint, and
//! whether the column participates in sorting. The [`ColumnSet`] holds the
//! ordered schema and owns the sort-indicator bookkeeping: at any moment at
//! most one column carries a non-[`SortIndicator::None`] indicator.
//!
//! Columns are addressed by their position in the set; that index is the
//! identity used by [`crate::sort::SortDescriptor`].

use crate::error::{Error, Result};
use crate::row::PropertyPath;
use crate::sort::SortDirection;

/// Per-column sort indicator shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortIndicator {
    /// Column is not the active sort column.
    #[default]
    None,
    /// Column is sorted ascending (A-Z, 0-9).
    Ascending,
    /// Column is sorted descending (Z-A, 9-0).
    Descending,
}

impl From<SortDirection> for SortIndicator {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Ascending => SortIndicator::Ascending,
            SortDirection::Descending => SortIndicator::Descending,
        }
    }
}

/// Display width hint for a column.
///
/// The engine stores and hands this back to the render layer; it never
/// computes pixel layout itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// Size the column to fit its contents.
    Auto,
    /// Fixed width in logical pixels.
    Fixed(f32),
    /// Proportional share of the remaining space.
    Stretch(f32),
}

impl Default for ColumnWidth {
    fn default() -> Self {
        ColumnWidth::Stretch(1.0)
    }
}

/// Description of one grid column.
///
/// # Example
///
/// ```
/// use trellis_grid::{Column, ColumnWidth, PropertyPath};
///
/// let column = Column::new("Age")
///     .with_path(PropertyPath::parse("age").unwrap())
///     .with_width(ColumnWidth::Fixed(64.0));
/// assert!(column.is_sorting_enabled());
/// ```
#[derive(Debug, Clone)]
pub struct Column {
    title: String,
    path: Option<PropertyPath>,
    width: ColumnWidth,
    sorting_enabled: bool,
    indicator: SortIndicator,
}

impl Column {
    /// Create a column with the given header title.
    ///
    /// Sorting defaults to enabled, but sorting also requires a property
    /// path (see [`with_path`](Self::with_path)).
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: None,
            width: ColumnWidth::default(),
            sorting_enabled: true,
            indicator: SortIndicator::None,
        }
    }

    /// Set the property path cells of this column resolve through.
    pub fn with_path(mut self, path: PropertyPath) -> Self {
        self.path = Some(path);
        self
    }

    /// Set the display width hint.
    pub fn with_width(mut self, width: ColumnWidth) -> Self {
        self.width = width;
        self
    }

    /// Enable or disable sorting for this column.
    pub fn with_sorting(mut self, enabled: bool) -> Self {
        self.sorting_enabled = enabled;
        self
    }

    /// The header title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The property path, if one was configured.
    pub fn path(&self) -> Option<&PropertyPath> {
        self.path.as_ref()
    }

    /// The display width hint.
    pub fn width(&self) -> ColumnWidth {
        self.width
    }

    /// Whether this column participates in sorting.
    pub fn is_sorting_enabled(&self) -> bool {
        self.sorting_enabled
    }

    /// The current sort indicator for this column.
    pub fn sort_indicator(&self) -> SortIndicator {
        self.indicator
    }
}

/// The ordered column schema of a grid.
///
/// Replacing the schema resets all indicator bookkeeping; the single
/// non-`None` indicator is maintained through
/// [`set_active_indicator`](Self::set_active_indicator), which clears every
/// other column in the same call.
#[derive(Debug, Clone, Default)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl ColumnSet {
    /// Create a column set from an ordered schema.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the schema is empty.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The column at `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// All columns, in display order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Iterate over the columns in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Replace the entire schema.
    ///
    /// Indicator bookkeeping starts over: every incoming column begins at
    /// [`SortIndicator::None`].
    pub fn set_columns(&mut self, columns: Vec<Column>) {
        self.columns = columns;
        for column in &mut self.columns {
            column.indicator = SortIndicator::None;
        }
    }

    /// The active sort indicator, if any column carries one.
    pub fn active_indicator(&self) -> Option<(usize, SortIndicator)> {
        self.columns
            .iter()
            .position(|c| c.indicator != SortIndicator::None)
            .map(|i| (i, self.columns[i].indicator))
    }

    /// Point the indicator at one column (clearing all others), or clear
    /// it entirely with `None`.
    ///
    /// Returns `true` if any indicator actually changed.
    pub(crate) fn set_active_indicator(
        &mut self,
        active: Option<(usize, SortDirection)>,
    ) -> bool {
        let mut changed = false;
        for (i, column) in self.columns.iter_mut().enumerate() {
            let wanted = match active {
                Some((index, direction)) if index == i => direction.into(),
                _ => SortIndicator::None,
            };
            if column.indicator != wanted {
                column.indicator = wanted;
                changed = true;
            }
        }
        changed
    }

    /// The property path a sort on `index` would use.
    ///
    /// Errors if the index is out of range, the column has sorting
    /// disabled, or no property path is configured.
    pub fn sort_path(&self, index: usize) -> Result<&PropertyPath> {
        let column = self
            .get(index)
            .ok_or_else(|| Error::column_out_of_range(index, self.columns.len()))?;
        if !column.sorting_enabled {
            return Err(Error::ColumnNotSortable { index });
        }
        column.path.as_ref().ok_or(Error::NoPropertyPath { index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ColumnSet {
        ColumnSet::new(vec![
            Column::new("Name").with_path(PropertyPath::parse("name").unwrap()),
            Column::new("Age").with_path(PropertyPath::parse("age").unwrap()),
            Column::new("Notes").with_sorting(false),
        ])
    }

    #[test]
    fn test_column_defaults() {
        let column = Column::new("Name");
        assert_eq!(column.title(), "Name");
        assert!(column.path().is_none());
        assert_eq!(column.width(), ColumnWidth::Stretch(1.0));
        assert!(column.is_sorting_enabled());
        assert_eq!(column.sort_indicator(), SortIndicator::None);
    }

    #[test]
    fn test_indicator_is_exclusive() {
        let mut columns = schema();

        assert!(columns.set_active_indicator(Some((0, SortDirection::Ascending))));
        assert_eq!(
            columns.active_indicator(),
            Some((0, SortIndicator::Ascending))
        );

        assert!(columns.set_active_indicator(Some((1, SortDirection::Descending))));
        assert_eq!(
            columns.active_indicator(),
            Some((1, SortIndicator::Descending))
        );
        assert_eq!(columns.get(0).unwrap().sort_indicator(), SortIndicator::None);

        // Only one non-None indicator, ever.
        let lit = columns
            .iter()
            .filter(|c| c.sort_indicator() != SortIndicator::None)
            .count();
        assert_eq!(lit, 1);
    }

    #[test]
    fn test_indicator_clear() {
        let mut columns = schema();
        columns.set_active_indicator(Some((0, SortDirection::Ascending)));

        assert!(columns.set_active_indicator(None));
        assert_eq!(columns.active_indicator(), None);

        // Clearing an already-clear set reports no change.
        assert!(!columns.set_active_indicator(None));
    }

    #[test]
    fn test_set_columns_resets_indicators() {
        let mut columns = schema();
        columns.set_active_indicator(Some((1, SortDirection::Ascending)));

        columns.set_columns(vec![
            Column::new("Id").with_path(PropertyPath::parse("id").unwrap()),
        ]);
        assert_eq!(columns.len(), 1);
        assert_eq!(columns.active_indicator(), None);
    }

    #[test]
    fn test_sort_path_validation() {
        let columns = schema();

        assert!(columns.sort_path(0).is_ok());
        assert!(matches!(
            columns.sort_path(9),
            Err(Error::ColumnOutOfRange { index: 9, count: 3 })
        ));
        assert!(matches!(
            columns.sort_path(2),
            Err(Error::ColumnNotSortable { index: 2 })
        ));

        let no_path = ColumnSet::new(vec![Column::new("Anon")]);
        assert!(matches!(
            no_path.sort_path(0),
            Err(Error::NoPropertyPath { index: 0 })
        ));
    }
}
