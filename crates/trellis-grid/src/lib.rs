//! A presentation-agnostic data grid engine.
//!
//! This crate holds the data and state side of a tabular-data widget,
//! with no rendering attached:
//!
//! - **Rows**: host types implementing [`RowData`], read through
//!   dot-separated [`PropertyPath`]s into typed [`CellValue`]s
//! - **Columns**: an ordered [`Column`] schema with titles, widths,
//!   per-column sorting opt-outs, and sort indicators
//! - **Sorting**: stable single-column ordering over a total order on
//!   cell values, driven programmatically or by header activation
//! - **Selection**: a single selected row, validated against the cache
//!   and reconciled across every rebuild
//! - **Sources**: static row snapshots or an observable [`RowSource`]
//!   the grid follows
//! - **Style**: palettes, metrics, and colors a renderer reads back
//!
//! [`DataGrid`] ties these together behind a cheaply clonable handle and
//! reports every change through [`GridSignals`].
//!
//! # Example
//!
//! ```
//! use trellis_grid::{Column, DataGrid, FieldValue, PropertyPath, RowData, SortDescriptor};
//!
//! #[derive(Clone, PartialEq)]
//! struct Reading {
//!     station: String,
//!     celsius: f64,
//! }
//!
//! impl RowData for Reading {
//!     fn field(&self, name: &str) -> FieldValue<'_> {
//!         match name {
//!             "station" => FieldValue::Value(self.station.clone().into()),
//!             "celsius" => FieldValue::Value(self.celsius.into()),
//!             _ => FieldValue::Absent,
//!         }
//!     }
//! }
//!
//! let grid = DataGrid::new();
//! grid.signals().rows_rebuilt.connect(|_| {
//!     // A renderer would rebind its row views here.
//! });
//!
//! grid.set_columns(vec![
//!     Column::new("Station").with_path(PropertyPath::parse("station")?),
//!     Column::new("Temp").with_path(PropertyPath::parse("celsius")?),
//! ])?;
//! grid.set_rows(vec![
//!     Reading { station: "Oslo".into(), celsius: -3.5 },
//!     Reading { station: "Lisbon".into(), celsius: 17.0 },
//! ])?;
//!
//! grid.sort_by(SortDescriptor::ascending(1))?;
//! assert_eq!(grid.cell_value(0, 0).unwrap().to_string(), "Oslo");
//! # Ok::<(), trellis_grid::Error>(())
//! ```

mod column;
mod error;
mod grid;
mod palette;
mod row;
mod selection;
mod sort;
mod source;
mod state;
mod style;
mod value;

pub use column::{Column, ColumnSet, ColumnWidth, SortIndicator};
pub use error::{Error, Result};
pub use grid::{DataGrid, GridSignals};
pub use palette::Palette;
pub use row::{FieldValue, PropertyPath, RowData};
pub use selection::{SelectionChanged, SelectionTracker};
pub use sort::{SortDescriptor, SortDirection, sort_rows};
pub use source::RowSource;
pub use state::CacheState;
pub use style::{FontSpec, GridStyle};
pub use value::CellValue;
