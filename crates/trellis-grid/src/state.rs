//! Grid state machine.
//!
//! [`GridState`] holds everything a grid is: the column schema, the
//! materialized row cache, the active sort, the selection, and the style
//! block. Every mutation is an explicit transition function that updates
//! the state in place and returns the list of [`GridEvent`]s it caused.
//! Nothing in this module emits signals; the facade
//! ([`crate::grid::DataGrid`]) dispatches the returned events after it
//! releases its state lock. This keeps every transition's side effects
//! enumerable and testable with plain assertions.
//!
//! # Rebuild sequence
//!
//! Row data flows through one path, [`GridState::rebuild`]: materialize
//! the cache from a full snapshot, reapply the active sort, reconcile the
//! selection. Configuration errors are rejected before any state is
//! touched; consistency problems discovered mid-rebuild (a sort descriptor
//! gone stale under a schema change) are normalized in place and logged,
//! never raised.

use tracing::{debug, warn};

use crate::column::{Column, ColumnSet};
use crate::error::{Error, Result};
use crate::row::RowData;
use crate::selection::{SelectionChanged, SelectionTracker};
use crate::sort::{SortDescriptor, sort_rows};
use crate::style::GridStyle;
use crate::value::CellValue;

/// Materialization state of the internal row cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheState {
    /// No row source has been provided.
    #[default]
    Empty,
    /// The cache holds the source snapshot in source order.
    Materialized,
    /// The cache holds the source snapshot ordered by the active sort.
    Sorted,
}

/// One observable consequence of a state transition.
///
/// Events are returned by the transition functions in the order they
/// occurred and dispatched through the grid's signals afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent<T> {
    /// The column schema or header presentation changed.
    HeaderRebuilt,
    /// The row cache was replaced or reordered, or row presentation
    /// changed; views should rebind their rows.
    RowsRebuilt,
    /// The active sort descriptor changed.
    SortChanged(Option<SortDescriptor>),
    /// The selection changed.
    SelectionChanged(SelectionChanged<T>),
    /// The refresh flag was raised or lowered.
    RefreshingChanged(bool),
    /// A refresh gesture asked the host to reload its data.
    RefreshRequested,
}

/// The complete state of one grid, with transition functions.
pub(crate) struct GridState<T> {
    columns: ColumnSet,
    cache: Option<Vec<T>>,
    state: CacheState,
    sort: Option<SortDescriptor>,
    sortable: bool,
    selection: SelectionTracker<T>,
    style: GridStyle,
    refreshing: bool,
}

impl<T> GridState<T>
where
    T: RowData + Clone + PartialEq,
{
    pub(crate) fn new() -> Self {
        Self {
            columns: ColumnSet::default(),
            cache: None,
            state: CacheState::Empty,
            sort: None,
            sortable: true,
            selection: SelectionTracker::new(),
            style: GridStyle::default(),
            refreshing: false,
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub(crate) fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// The materialized rows, in display order. Empty when no source has
    /// been provided.
    pub(crate) fn rows(&self) -> &[T] {
        self.cache.as_deref().unwrap_or(&[])
    }

    pub(crate) fn cache_state(&self) -> CacheState {
        self.state
    }

    pub(crate) fn sort(&self) -> Option<SortDescriptor> {
        self.sort
    }

    pub(crate) fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub(crate) fn selection(&self) -> &SelectionTracker<T> {
        &self.selection
    }

    pub(crate) fn style(&self) -> &GridStyle {
        &self.style
    }

    pub(crate) fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// The cell value at (`row`, `column`), resolved through the column's
    /// property path. `None` if either index is out of range or the column
    /// has no path.
    pub(crate) fn cell_value(&self, row: usize, column: usize) -> Option<CellValue> {
        let row = self.rows().get(row)?;
        let path = self.columns.get(column)?.path()?;
        Some(path.resolve(row))
    }

    // ------------------------------------------------------------------
    // Schema
    // ------------------------------------------------------------------

    /// Replace the column schema.
    ///
    /// Indicator bookkeeping starts over at all-`None`. A stored sort
    /// descriptor is revalidated against the new schema: still valid, it
    /// is kept (and reapplied right away if rows are materialized, which
    /// relights its indicator); invalid, it is dropped. A descriptor is
    /// never invalidated by an *empty* schema, so a sort configured before
    /// the columns arrive survives until they do.
    pub(crate) fn set_columns(&mut self, columns: Vec<Column>) -> Vec<GridEvent<T>> {
        self.columns.set_columns(columns);
        let mut events = vec![GridEvent::HeaderRebuilt];

        if self.state == CacheState::Sorted {
            // The reapply below decides whether we get to keep this.
            self.state = CacheState::Materialized;
        }

        let Some(descriptor) = self.sort else {
            return events;
        };

        if self.columns.is_empty() {
            // Nothing to validate against; the descriptor stays pending.
            return events;
        }

        if self.columns.sort_path(descriptor.column).is_ok() {
            if self.cache.is_some() {
                events.extend(self.resort(descriptor));
            }
        } else {
            warn!(
                target: "trellis_grid::state",
                column = descriptor.column,
                "active sort dropped: column not sortable under new schema"
            );
            self.sort = None;
            events.push(GridEvent::SortChanged(None));
        }

        events
    }

    // ------------------------------------------------------------------
    // Rows
    // ------------------------------------------------------------------

    /// Materialize the cache from a full source snapshot (`None` means the
    /// source itself was removed), reapply the active sort, reconcile the
    /// selection.
    ///
    /// This is the single rebuild path behind source reassignment, change
    /// notifications, and reloads. It never fails: a descriptor the
    /// current schema can no longer satisfy is dropped and logged.
    pub(crate) fn rebuild(&mut self, snapshot: Option<Vec<T>>) -> Vec<GridEvent<T>> {
        let mut events = Vec::new();

        let Some(mut rows) = snapshot else {
            self.cache = None;
            self.state = CacheState::Empty;
            events.push(GridEvent::RowsRebuilt);
            events.extend(
                self.selection
                    .reconcile(&[])
                    .map(GridEvent::SelectionChanged),
            );
            return events;
        };

        self.state = CacheState::Materialized;

        match self.sort {
            // A descriptor parked before the schema arrived stays parked.
            Some(_) if self.columns.is_empty() => {}
            Some(descriptor) => match sort_rows(&rows, descriptor, &self.columns) {
                Ok(sorted) => {
                    rows = sorted;
                    self.columns
                        .set_active_indicator(Some((descriptor.column, descriptor.direction)));
                    self.state = CacheState::Sorted;
                }
                Err(error) => {
                    warn!(
                        target: "trellis_grid::state",
                        column = descriptor.column,
                        %error,
                        "active sort dropped during rebuild"
                    );
                    self.sort = None;
                    self.columns.set_active_indicator(None);
                    events.push(GridEvent::SortChanged(None));
                }
            },
            None => {}
        }

        let selection_change = self.selection.reconcile(&rows);
        self.cache = Some(rows);

        events.push(GridEvent::RowsRebuilt);
        events.extend(selection_change.map(GridEvent::SelectionChanged));
        events
    }

    // ------------------------------------------------------------------
    // Sorting
    // ------------------------------------------------------------------

    /// Sort the materialized rows by `descriptor`, immediately.
    ///
    /// Errors if sorting is disabled grid-wide, the descriptor does not
    /// name a sortable column, or no row source has been materialized; the
    /// grid is left untouched on every error path.
    pub(crate) fn apply_sort(
        &mut self,
        descriptor: SortDescriptor,
    ) -> Result<Vec<GridEvent<T>>> {
        if !self.sortable {
            return Err(Error::SortingDisabled);
        }
        self.columns.sort_path(descriptor.column)?;
        if self.cache.is_none() {
            return Err(Error::NotMaterialized);
        }

        let mut events = Vec::new();
        if self.sort != Some(descriptor) {
            self.sort = Some(descriptor);
            events.push(GridEvent::SortChanged(Some(descriptor)));
        }
        events.extend(self.resort(descriptor));
        Ok(events)
    }

    /// Sort the cache by `descriptor`, which the caller has already
    /// validated against the schema. Updates the indicator and cache
    /// state.
    fn resort(&mut self, descriptor: SortDescriptor) -> Vec<GridEvent<T>> {
        let Some(rows) = &self.cache else {
            return Vec::new();
        };
        let sorted = match sort_rows(rows, descriptor, &self.columns) {
            Ok(sorted) => sorted,
            Err(error) => {
                // Unreachable after validation, but never panic over it.
                warn!(
                    target: "trellis_grid::state",
                    column = descriptor.column,
                    %error,
                    "sort failed after validation"
                );
                return Vec::new();
            }
        };

        self.cache = Some(sorted);
        self.columns
            .set_active_indicator(Some((descriptor.column, descriptor.direction)));
        self.state = CacheState::Sorted;
        vec![GridEvent::RowsRebuilt]
    }

    /// Set or clear the active sort descriptor.
    ///
    /// Unlike [`apply_sort`](Self::apply_sort) this is a configuration
    /// path: a descriptor set before the schema or the rows exist is
    /// accepted and applied once they arrive. Clearing leaves the cache in
    /// its current order.
    pub(crate) fn set_sort(
        &mut self,
        descriptor: Option<SortDescriptor>,
    ) -> Result<Vec<GridEvent<T>>> {
        let Some(descriptor) = descriptor else {
            if self.sort.is_none() {
                return Ok(Vec::new());
            }
            self.sort = None;
            self.columns.set_active_indicator(None);
            if self.state == CacheState::Sorted {
                self.state = CacheState::Materialized;
            }
            return Ok(vec![GridEvent::SortChanged(None)]);
        };

        if !self.sortable {
            return Err(Error::SortingDisabled);
        }
        if !self.columns.is_empty() {
            self.columns.sort_path(descriptor.column)?;
        }

        let mut events = Vec::new();
        if self.sort != Some(descriptor) {
            self.sort = Some(descriptor);
            events.push(GridEvent::SortChanged(Some(descriptor)));
        }
        if self.cache.is_some() && !self.columns.is_empty() {
            events.extend(self.resort(descriptor));
        }
        Ok(events)
    }

    /// Translate a header activation on `index` into a sort.
    ///
    /// Repeated activation of the active column toggles its direction;
    /// any other column starts ascending. Activating a column that cannot
    /// be sorted is ignored (interaction, not configuration); only an
    /// out-of-range index is an error.
    pub(crate) fn header_activated(&mut self, index: usize) -> Result<Vec<GridEvent<T>>> {
        if self.columns.get(index).is_none() {
            return Err(Error::column_out_of_range(index, self.columns.len()));
        }
        if !self.sortable {
            debug!(
                target: "trellis_grid::state",
                column = index,
                "header activation ignored: grid not sortable"
            );
            return Ok(Vec::new());
        }
        if self.columns.sort_path(index).is_err() {
            debug!(
                target: "trellis_grid::state",
                column = index,
                "header activation ignored: column not sortable"
            );
            return Ok(Vec::new());
        }

        let descriptor = match self.sort {
            Some(current) if current.column == index => current.toggled(),
            _ => SortDescriptor::ascending(index),
        };

        self.sort = Some(descriptor);
        let mut events = vec![GridEvent::SortChanged(Some(descriptor))];
        events.extend(self.resort(descriptor));
        Ok(events)
    }

    /// Enable or disable sorting grid-wide.
    ///
    /// Disabling drops the active descriptor and clears its indicator;
    /// the cache keeps its current order.
    pub(crate) fn set_sortable(&mut self, sortable: bool) -> Vec<GridEvent<T>> {
        self.sortable = sortable;
        if sortable || self.sort.is_none() {
            return Vec::new();
        }

        debug!(target: "trellis_grid::state", "active sort dropped: sorting disabled");
        self.sort = None;
        self.columns.set_active_indicator(None);
        if self.state == CacheState::Sorted {
            self.state = CacheState::Materialized;
        }
        vec![GridEvent::SortChanged(None)]
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub(crate) fn set_selection_enabled(&mut self, enabled: bool) -> Vec<GridEvent<T>> {
        self.selection
            .set_enabled(enabled)
            .map(GridEvent::SelectionChanged)
            .into_iter()
            .collect()
    }

    pub(crate) fn set_selected(&mut self, item: Option<T>) -> Result<Vec<GridEvent<T>>> {
        let rows = self.cache.as_deref().unwrap_or(&[]);
        let change = self.selection.set_selected(item, rows)?;
        Ok(change.map(GridEvent::SelectionChanged).into_iter().collect())
    }

    // ------------------------------------------------------------------
    // Style
    // ------------------------------------------------------------------

    /// Replace the style block.
    ///
    /// Errors if the new style introduces an active-row color while
    /// selection is disabled. Emits header/row rebuild events for the
    /// parts of the presentation that actually changed.
    pub(crate) fn set_style(&mut self, style: GridStyle) -> Result<Vec<GridEvent<T>>> {
        if style.active_row_color != self.style.active_row_color
            && style.active_row_color.is_some()
            && !self.selection.is_enabled()
        {
            return Err(Error::ActiveRowColorWithoutSelection);
        }

        let header_changed = style.header_height != self.style.header_height
            || style.header_background != self.style.header_background
            || style.header_borders_visible != self.style.header_borders_visible
            || style.ascending_icon != self.style.ascending_icon
            || style.descending_icon != self.style.descending_icon
            || style.font != self.style.font
            || style.border_color != self.style.border_color
            || style.border_thickness != self.style.border_thickness;
        let rows_changed = style.background_palette != self.style.background_palette
            || style.text_palette != self.style.text_palette
            || style.row_height != self.style.row_height
            || style.active_row_color != self.style.active_row_color
            || style.font != self.style.font
            || style.border_color != self.style.border_color
            || style.border_thickness != self.style.border_thickness;

        self.style = style;

        let mut events = Vec::new();
        if header_changed {
            events.push(GridEvent::HeaderRebuilt);
        }
        if rows_changed {
            events.push(GridEvent::RowsRebuilt);
        }
        Ok(events)
    }

    // ------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------

    /// Raise the refresh flag and ask the host to reload. Ignored while a
    /// refresh is already in flight.
    pub(crate) fn request_refresh(&mut self) -> Vec<GridEvent<T>> {
        if self.refreshing {
            return Vec::new();
        }
        self.refreshing = true;
        vec![
            GridEvent::RefreshingChanged(true),
            GridEvent::RefreshRequested,
        ]
    }

    /// Lower the refresh flag once the host finished reloading.
    pub(crate) fn finish_refresh(&mut self) -> Vec<GridEvent<T>> {
        if !self.refreshing {
            return Vec::new();
        }
        self.refreshing = false;
        vec![GridEvent::RefreshingChanged(false)]
    }
}
