//! The grid facade.
//!
//! [`DataGrid`] wraps the state machine in a shared handle, binds it to an
//! optional [`RowSource`], and turns transition events into signal
//! emissions. It is the one type hosts talk to.
//!
//! # Concurrency contract
//!
//! Every mutation takes the state write lock, applies one transition, and
//! releases the lock *before* any signal fires. Slots therefore always
//! observe fully settled state and may freely read the grid. Mutating the
//! grid from inside one of its own slots is rejected with
//! [`Error::ReentrantMutation`]; mutations from other threads simply
//! serialize on the lock. Row-source change notifications that arrive
//! while the grid is mid-dispatch on the same thread are coalesced into a
//! single rebuild that runs immediately afterwards.

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use tracing::{debug, trace};

use trellis_core::Color;
use trellis_core::signal::{ConnectionId, Signal};

use crate::column::{Column, SortIndicator};
use crate::error::{Error, Result};
use crate::palette::Palette;
use crate::row::RowData;
use crate::selection::SelectionChanged;
use crate::sort::SortDescriptor;
use crate::source::RowSource;
use crate::state::{CacheState, GridEvent, GridState};
use crate::style::GridStyle;
use crate::value::CellValue;

/// The signals a grid emits, one per kind of state change.
///
/// Connect with [`Signal::connect`]; slots run synchronously on the
/// thread that performed the mutation, after the grid released its locks.
pub struct GridSignals<T> {
    /// The column schema or header presentation changed.
    pub header_rebuilt: Signal<()>,
    /// The row cache was replaced or reordered; rebind rows.
    pub rows_rebuilt: Signal<()>,
    /// The active sort descriptor changed. Carries the new descriptor,
    /// `None` when sorting was cleared.
    pub sort_changed: Signal<Option<SortDescriptor>>,
    /// The selected row changed. Carries the previous and current rows.
    pub selection_changed: Signal<SelectionChanged<T>>,
    /// The refresh flag was raised or lowered.
    pub refreshing_changed: Signal<bool>,
    /// A refresh was requested; the host should reload its data and call
    /// [`DataGrid::finish_refresh`] when done.
    pub refresh_requested: Signal<()>,
}

impl<T> GridSignals<T>
where
    T: Send + 'static,
{
    fn new() -> Self {
        Self {
            header_rebuilt: Signal::new(),
            rows_rebuilt: Signal::new(),
            sort_changed: Signal::new(),
            selection_changed: Signal::new(),
            refreshing_changed: Signal::new(),
            refresh_requested: Signal::new(),
        }
    }
}

struct SourceBinding<T> {
    source: Arc<RowSource<T>>,
    connection: ConnectionId,
}

struct GridInner<T> {
    state: RwLock<GridState<T>>,
    signals: GridSignals<T>,
    source: Mutex<Option<SourceBinding<T>>>,
    /// Raised when a source notification lands while this grid is
    /// dispatching; drained into one rebuild right after.
    pending_reload: AtomicBool,
}

thread_local! {
    /// Grids currently dispatching signals on this thread, by address.
    /// An entry lives exactly as long as its [`DispatchMark`], and the
    /// grid is kept alive for that whole window, so addresses are never
    /// stale.
    static DISPATCHING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a grid as dispatching on the current thread for the lifetime of
/// the value. Unwinds cleanly if a slot panics.
struct DispatchMark {
    key: usize,
}

impl DispatchMark {
    fn enter(key: usize) -> Self {
        DISPATCHING.with(|stack| stack.borrow_mut().push(key));
        Self { key }
    }
}

impl Drop for DispatchMark {
    fn drop(&mut self) {
        DISPATCHING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(index) = stack.iter().rposition(|&key| key == self.key) {
                stack.remove(index);
            }
        });
    }
}

impl<T> GridInner<T>
where
    T: RowData + Clone + PartialEq + Send + Sync + 'static,
{
    fn key(&self) -> usize {
        self as *const Self as usize
    }

    /// Whether this grid is dispatching signals on the current thread.
    fn is_dispatching(&self) -> bool {
        let key = self.key();
        DISPATCHING.with(|stack| stack.borrow().contains(&key))
    }

    fn dispatch(&self, events: Vec<GridEvent<T>>) {
        if events.is_empty() {
            return;
        }
        let _mark = DispatchMark::enter(self.key());
        for event in events {
            match event {
                GridEvent::HeaderRebuilt => self.signals.header_rebuilt.emit(()),
                GridEvent::RowsRebuilt => self.signals.rows_rebuilt.emit(()),
                GridEvent::SortChanged(descriptor) => self.signals.sort_changed.emit(descriptor),
                GridEvent::SelectionChanged(change) => self.signals.selection_changed.emit(change),
                GridEvent::RefreshingChanged(flag) => self.signals.refreshing_changed.emit(flag),
                GridEvent::RefreshRequested => self.signals.refresh_requested.emit(()),
            }
        }
    }

    /// Dispatch `events`, then fold any source notifications that arrived
    /// mid-dispatch into follow-up rebuilds. Each rebuild snapshots the
    /// bound source under the state write lock, so whichever rebuild runs
    /// last leaves the cache at the source's latest state.
    fn dispatch_and_drain(&self, events: Vec<GridEvent<T>>) {
        self.dispatch(events);
        while self.pending_reload.swap(false, Ordering::AcqRel) {
            let events = self.rebuild_from_source();
            self.dispatch(events);
        }
    }

    /// Rebuild from a source snapshot taken under the write lock.
    fn rebuild_from_source(&self) -> Vec<GridEvent<T>> {
        let mut state = self.state.write();
        let snapshot = self.source_snapshot();
        state.rebuild(snapshot)
    }

    /// Snapshot of the bound source's rows; `None` when no source is
    /// bound.
    fn source_snapshot(&self) -> Option<Vec<T>> {
        self.source
            .lock()
            .as_ref()
            .map(|binding| binding.source.snapshot())
    }

    fn on_source_changed(&self) {
        if self.is_dispatching() {
            // Mid-dispatch on this thread: coalesce into one rebuild
            // after the current transition settles.
            self.pending_reload.store(true, Ordering::Release);
            return;
        }
        trace!(target: "trellis_grid::grid", "row source changed, rebuilding");
        let events = self.rebuild_from_source();
        self.dispatch_and_drain(events);
    }

    fn unbind_source(&self) {
        if let Some(binding) = self.source.lock().take() {
            binding.source.changed().disconnect(binding.connection);
        }
    }
}

impl<T> Drop for GridInner<T> {
    fn drop(&mut self) {
        if let Some(binding) = self.source.get_mut().take() {
            binding.source.changed().disconnect(binding.connection);
        }
    }
}

/// A presentation-agnostic data grid: column schema, row cache, sorting,
/// selection, and style, exposed behind a cheaply clonable handle.
///
/// `DataGrid` owns no rendering. A view layer binds to the
/// [signals](Self::signals) and reads back rows, columns, and style
/// whenever one fires; any host logic does the same.
///
/// Rows are host types implementing [`RowData`]. The grid stores
/// clones of them in display order and compares with `PartialEq` when it
/// needs identity (selection, reconciliation).
///
/// # Example
///
/// ```
/// use trellis_grid::{Column, DataGrid, PropertyPath, RowData, FieldValue};
///
/// #[derive(Clone, PartialEq)]
/// struct Person { name: String, age: i64 }
///
/// impl RowData for Person {
///     fn field(&self, name: &str) -> FieldValue<'_> {
///         match name {
///             "name" => FieldValue::Value(self.name.clone().into()),
///             "age" => FieldValue::Value(self.age.into()),
///             _ => FieldValue::Absent,
///         }
///     }
/// }
///
/// let grid = DataGrid::new();
/// grid.set_columns(vec![
///     Column::new("Name").with_path(PropertyPath::parse("name")?),
///     Column::new("Age").with_path(PropertyPath::parse("age")?),
/// ])?;
/// grid.set_rows(vec![
///     Person { name: "Ada".into(), age: 36 },
///     Person { name: "Grace".into(), age: 45 },
/// ])?;
/// grid.activate_header(1)?;
/// assert_eq!(grid.rows()[0].name, "Ada");
/// # Ok::<(), trellis_grid::Error>(())
/// ```
pub struct DataGrid<T> {
    inner: Arc<GridInner<T>>,
}

impl<T> Clone for DataGrid<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for DataGrid<T>
where
    T: RowData + Clone + PartialEq + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DataGrid<T>
where
    T: RowData + Clone + PartialEq + Send + Sync + 'static,
{
    /// A grid with no columns, no rows, default style, selection and
    /// sorting enabled.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(GridInner {
                state: RwLock::new(GridState::new()),
                signals: GridSignals::new(),
                source: Mutex::new(None),
                pending_reload: AtomicBool::new(false),
            }),
        }
    }

    /// The grid's signals, for connecting slots.
    pub fn signals(&self) -> &GridSignals<T> {
        &self.inner.signals
    }

    /// Run one transition under the write lock, then dispatch its events.
    fn apply<F>(&self, transition: F) -> Result<()>
    where
        F: FnOnce(&mut GridState<T>) -> Result<Vec<GridEvent<T>>>,
    {
        if self.inner.is_dispatching() {
            return Err(Error::ReentrantMutation);
        }
        let events = {
            let mut state = self.inner.state.write();
            transition(&mut state)?
        };
        self.inner.dispatch_and_drain(events);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Schema
    // ------------------------------------------------------------------

    /// Replace the column schema. Sort indicators start over; a sort
    /// descriptor the new schema still satisfies is kept and reapplied.
    pub fn set_columns(&self, columns: Vec<Column>) -> Result<()> {
        self.apply(|state| Ok(state.set_columns(columns)))
    }

    /// A copy of the current column schema, in display order.
    pub fn columns(&self) -> Vec<Column> {
        self.inner.state.read().columns().columns().to_vec()
    }

    pub fn column_count(&self) -> usize {
        self.inner.state.read().columns().len()
    }

    /// The column currently showing a sort indicator, if any.
    pub fn active_indicator(&self) -> Option<(usize, SortIndicator)> {
        self.inner.state.read().columns().active_indicator()
    }

    // ------------------------------------------------------------------
    // Rows
    // ------------------------------------------------------------------

    /// Bind the grid to an observable row source, or unbind with `None`.
    ///
    /// The cache rebuilds from a snapshot immediately and again on every
    /// change the source announces. Any previously bound source is
    /// disconnected first.
    #[tracing::instrument(skip_all, target = "trellis_grid::grid", level = "trace")]
    pub fn set_row_source(&self, source: Option<Arc<RowSource<T>>>) -> Result<()> {
        if self.inner.is_dispatching() {
            return Err(Error::ReentrantMutation);
        }

        self.inner.unbind_source();
        if let Some(source) = source {
            let weak = Arc::downgrade(&self.inner);
            let connection = source.changed().connect(move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_source_changed();
                }
            });
            debug!(
                target: "trellis_grid::grid",
                rows = source.len(),
                "row source bound"
            );
            *self.inner.source.lock() = Some(SourceBinding { source, connection });
        } else {
            debug!(target: "trellis_grid::grid", "row source unbound");
        }

        let events = self.inner.rebuild_from_source();
        self.inner.dispatch_and_drain(events);
        Ok(())
    }

    /// Hand the grid a static snapshot of rows. Unbinds any observable
    /// source; later changes to the caller's data are invisible until the
    /// next `set_rows` or [`reload`](Self::reload).
    pub fn set_rows(&self, rows: Vec<T>) -> Result<()> {
        if self.inner.is_dispatching() {
            return Err(Error::ReentrantMutation);
        }
        self.inner.unbind_source();
        let events = self.inner.state.write().rebuild(Some(rows));
        self.inner.dispatch_and_drain(events);
        Ok(())
    }

    /// Remove all row data. The cache goes back to empty and the
    /// selection clears.
    pub fn clear_rows(&self) -> Result<()> {
        if self.inner.is_dispatching() {
            return Err(Error::ReentrantMutation);
        }
        self.inner.unbind_source();
        let events = self.inner.state.write().rebuild(None);
        self.inner.dispatch_and_drain(events);
        Ok(())
    }

    /// Re-run the rebuild pipeline: with a source bound, from a fresh
    /// snapshot; otherwise from a copy of the current cache. Useful after
    /// mutating row contents in place.
    #[tracing::instrument(skip_all, target = "trellis_grid::grid", level = "trace")]
    pub fn reload(&self) -> Result<()> {
        if self.inner.is_dispatching() {
            return Err(Error::ReentrantMutation);
        }
        let events = {
            let mut state = self.inner.state.write();
            let snapshot = match self.inner.source_snapshot() {
                Some(rows) => Some(rows),
                None if state.cache_state() == CacheState::Empty => None,
                None => Some(state.rows().to_vec()),
            };
            state.rebuild(snapshot)
        };
        self.inner.dispatch_and_drain(events);
        Ok(())
    }

    /// The currently bound row source, if any.
    pub fn row_source(&self) -> Option<Arc<RowSource<T>>> {
        self.inner
            .source
            .lock()
            .as_ref()
            .map(|binding| Arc::clone(&binding.source))
    }

    /// The materialized rows, in display order.
    ///
    /// Holding the guard blocks mutations; release it before mutating the
    /// grid or a bound row source from the same thread.
    pub fn rows(&self) -> impl std::ops::Deref<Target = [T]> + '_ {
        RwLockReadGuard::map(self.inner.state.read(), |state| state.rows())
    }

    /// A clone of the row at `index` in display order.
    pub fn row(&self, index: usize) -> Option<T> {
        self.inner.state.read().rows().get(index).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.inner.state.read().rows().len()
    }

    pub fn cache_state(&self) -> CacheState {
        self.inner.state.read().cache_state()
    }

    /// The cell value at (`row`, `column`), resolved through the column's
    /// property path. `None` if either index is out of range or the
    /// column has no path.
    pub fn cell_value(&self, row: usize, column: usize) -> Option<CellValue> {
        self.inner.state.read().cell_value(row, column)
    }

    // ------------------------------------------------------------------
    // Sorting
    // ------------------------------------------------------------------

    /// Sort the materialized rows by `descriptor`, immediately. Errors if
    /// sorting is disabled, the descriptor does not name a sortable
    /// column, or no rows have been materialized.
    pub fn sort_by(&self, descriptor: SortDescriptor) -> Result<()> {
        self.apply(|state| state.apply_sort(descriptor))
    }

    /// Set or clear the sort configuration. A descriptor set before the
    /// schema or the rows exist is kept and applied once they arrive;
    /// clearing leaves rows in their current order.
    pub fn set_sort(&self, descriptor: Option<SortDescriptor>) -> Result<()> {
        self.apply(|state| state.set_sort(descriptor))
    }

    /// The active sort descriptor, if any.
    pub fn sort(&self) -> Option<SortDescriptor> {
        self.inner.state.read().sort()
    }

    /// Report a header activation (tap, click, key press) on the column
    /// at `index`. Toggles the sort direction on the active column,
    /// starts ascending on any other. Ignored when that column or the
    /// whole grid is not sortable; out of range is an error.
    pub fn activate_header(&self, index: usize) -> Result<()> {
        self.apply(|state| state.header_activated(index))
    }

    /// Enable or disable sorting grid-wide. Disabling drops the active
    /// sort; rows keep their current order.
    pub fn set_sortable(&self, sortable: bool) -> Result<()> {
        self.apply(|state| Ok(state.set_sortable(sortable)))
    }

    pub fn is_sortable(&self) -> bool {
        self.inner.state.read().is_sortable()
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Select `item`, or clear with `None`. An item not present in the
    /// cache coerces to no selection. Errors while selection is disabled.
    pub fn set_selected(&self, item: Option<T>) -> Result<()> {
        self.apply(|state| state.set_selected(item))
    }

    /// A clone of the selected row, if any.
    pub fn selected(&self) -> Option<T> {
        self.inner.state.read().selection().selected().cloned()
    }

    /// Enable or disable selection. Disabling clears any current
    /// selection.
    pub fn set_selection_enabled(&self, enabled: bool) -> Result<()> {
        self.apply(|state| Ok(state.set_selection_enabled(enabled)))
    }

    pub fn is_selection_enabled(&self) -> bool {
        self.inner.state.read().selection().is_enabled()
    }

    // ------------------------------------------------------------------
    // Style
    // ------------------------------------------------------------------

    /// Replace the whole style block. Errors if the new style introduces
    /// an active-row color while selection is disabled.
    pub fn set_style(&self, style: GridStyle) -> Result<()> {
        self.apply(|state| state.set_style(style))
    }

    /// A copy of the current style block.
    pub fn style(&self) -> GridStyle {
        self.inner.state.read().style().clone()
    }

    pub fn set_row_height(&self, height: f32) -> Result<()> {
        self.update_style(|style| style.row_height = height)
    }

    pub fn set_header_height(&self, height: f32) -> Result<()> {
        self.update_style(|style| style.header_height = height)
    }

    /// Replace the palette rows cycle through for their backgrounds.
    pub fn set_background_palette(&self, palette: Palette) -> Result<()> {
        self.update_style(|style| style.background_palette = palette)
    }

    /// Replace the palette rows cycle through for their text.
    pub fn set_text_palette(&self, palette: Palette) -> Result<()> {
        self.update_style(|style| style.text_palette = palette)
    }

    /// Set or clear the highlight color for the selected row. Setting a
    /// color while selection is disabled is an error.
    pub fn set_active_row_color(&self, color: Option<Color>) -> Result<()> {
        self.update_style(|style| style.active_row_color = color)
    }

    fn update_style<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut GridStyle),
    {
        self.apply(|state| {
            let mut style = state.style().clone();
            change(&mut style);
            state.set_style(style)
        })
    }

    // ------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------

    /// Report a refresh gesture. Raises the refresh flag and asks the
    /// host, via [`GridSignals::refresh_requested`], to reload its data.
    /// Ignored while a refresh is already in flight.
    pub fn request_refresh(&self) -> Result<()> {
        self.apply(|state| Ok(state.request_refresh()))
    }

    /// Lower the refresh flag once new data has been delivered. Call this
    /// from outside the grid's own signal handlers.
    pub fn finish_refresh(&self) -> Result<()> {
        self.apply(|state| Ok(state.finish_refresh()))
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.state.read().is_refreshing()
    }
}
