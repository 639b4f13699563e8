//! Observable row source.
//!
//! A [`RowSource`] is the host-owned collection a grid displays. Every
//! mutation emits one generic `changed` notification after it completes;
//! there is no diff payload, because consumers (the grid's sync pipeline)
//! rebuild from a full [`snapshot`](RowSource::snapshot) by contract.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trellis_grid::RowSource;
//!
//! let source = Arc::new(RowSource::new(vec![1, 2, 3]));
//! source.changed().connect(|_| println!("rows changed"));
//! source.push(4); // prints "rows changed"
//! assert_eq!(source.snapshot(), vec![1, 2, 3, 4]);
//! ```

use parking_lot::RwLock;
use trellis_core::Signal;

/// A host-owned, observable row collection.
///
/// All methods take `&self`; share the source between the host and one or
/// more grids with `Arc`. Mutators emit [`changed`](Self::changed) after
/// the write lock is released, so slots may freely read the source.
pub struct RowSource<T> {
    rows: RwLock<Vec<T>>,
    changed: Signal<()>,
}

static_assertions::assert_impl_all!(RowSource<i32>: Send, Sync);

impl<T> RowSource<T> {
    /// Create a source over the given rows.
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: RwLock::new(rows),
            changed: Signal::new(),
        }
    }

    /// Create an empty source.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Notification emitted after every mutation.
    pub fn changed(&self) -> &Signal<()> {
        &self.changed
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns `true` if the source holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// A full copy of the current rows.
    pub fn snapshot(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.rows.read().clone()
    }

    /// Read-only access to the rows without copying.
    pub fn rows(&self) -> impl std::ops::Deref<Target = Vec<T>> + '_ {
        self.rows.read()
    }

    /// Append a row.
    pub fn push(&self, row: T) {
        self.rows.write().push(row);
        self.changed.emit(());
    }

    /// Insert a row at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert(&self, index: usize, row: T) {
        self.rows.write().insert(index, row);
        self.changed.emit(());
    }

    /// Remove and return the row at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn remove(&self, index: usize) -> T {
        let removed = self.rows.write().remove(index);
        self.changed.emit(());
        removed
    }

    /// Remove all rows.
    pub fn clear(&self) {
        self.rows.write().clear();
        self.changed.emit(());
    }

    /// Replace all rows.
    pub fn set_rows(&self, rows: Vec<T>) {
        *self.rows.write() = rows;
        self.changed.emit(());
    }

    /// Mutate the row at `index` via a closure.
    ///
    /// Returns `None` (and emits nothing) if `index` is out of range.
    pub fn update<F, R>(&self, index: usize, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut rows = self.rows.write();
        if index >= rows.len() {
            return None;
        }
        let result = f(&mut rows[index]);
        drop(rows);

        self.changed.emit(());
        Some(result)
    }
}

impl<T> Default for RowSource<T> {
    fn default() -> Self {
        Self::empty()
    }
}
