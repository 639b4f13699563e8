//! Selection tracking.
//!
//! At most one row is selected at a time. The [`SelectionTracker`]
//! mediates between what the host asks for and what the materialized row
//! set actually contains: selecting a row that is not present coerces to
//! no selection, and after every cache rebuild [`reconcile`] drops a
//! selection whose row disappeared. Rows are matched by `PartialEq`.
//!
//! [`reconcile`]: SelectionTracker::reconcile

use crate::error::{Error, Result};

/// Payload of a selection change: the value before and after.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionChanged<T> {
    /// Selection before the change.
    pub previous: Option<T>,
    /// Selection after the change.
    pub current: Option<T>,
}

/// Tracks the selected row and whether selection is enabled.
///
/// Every mutating method returns the [`SelectionChanged`] it caused, or
/// `None` when the effective selection did not change. The caller decides
/// how to deliver it; the tracker itself has no signal plumbing.
#[derive(Debug, Clone)]
pub struct SelectionTracker<T> {
    enabled: bool,
    selected: Option<T>,
}

impl<T: Clone + PartialEq> SelectionTracker<T> {
    /// Create a tracker with selection enabled and nothing selected.
    pub fn new() -> Self {
        Self {
            enabled: true,
            selected: None,
        }
    }

    /// Whether selection is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The selected row, if any.
    pub fn selected(&self) -> Option<&T> {
        self.selected.as_ref()
    }

    /// Enable or disable selection.
    ///
    /// Disabling clears any current selection; the change (if one
    /// happened) is returned.
    pub fn set_enabled(&mut self, enabled: bool) -> Option<SelectionChanged<T>> {
        self.enabled = enabled;
        if enabled { None } else { self.transition_to(None) }
    }

    /// Select `item`, or clear the selection with `None`.
    ///
    /// Errors if selection is disabled (the selection is left unchanged).
    /// An item that is not present in `rows` coerces to no selection.
    pub fn set_selected(
        &mut self,
        item: Option<T>,
        rows: &[T],
    ) -> Result<Option<SelectionChanged<T>>> {
        if !self.enabled {
            return Err(Error::SelectionDisabled);
        }
        let wanted = item.filter(|item| rows.contains(item));
        Ok(self.transition_to(wanted))
    }

    /// Drop the selection if its row is no longer present in `rows`.
    ///
    /// Called after every cache rebuild.
    pub fn reconcile(&mut self, rows: &[T]) -> Option<SelectionChanged<T>> {
        match &self.selected {
            Some(selected) if !rows.contains(selected) => self.transition_to(None),
            _ => None,
        }
    }

    fn transition_to(&mut self, target: Option<T>) -> Option<SelectionChanged<T>> {
        if self.selected == target {
            return None;
        }
        let previous = std::mem::replace(&mut self.selected, target);
        Some(SelectionChanged {
            previous,
            current: self.selected.clone(),
        })
    }
}

impl<T: Clone + PartialEq> Default for SelectionTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}
