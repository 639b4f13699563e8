//! Core primitives for Trellis.
//!
//! This crate provides the foundational components shared by the Trellis
//! data-grid engine:
//!
//! - **Signal/Slot System**: Type-safe change notification with RAII
//!   connection management
//! - **Color**: A plain RGBA color type used by palettes and styling
//!
//! # Signal/Slot Example
//!
//! ```
//! use trellis_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! value_changed.emit(42);
//!
//! // Disconnect when done
//! value_changed.disconnect(conn_id);
//! ```

mod color;
pub mod logging;
pub mod signal;

pub use color::Color;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
