//! Row field access.
//!
//! The grid treats rows as opaque host types. To display or sort a cell it
//! asks the row for a named field through the [`RowData`] trait, and walks
//! dotted paths like `"address.city"` with a [`PropertyPath`]. There is no
//! reflection: hosts state explicitly which names resolve to which values.
//!
//! # Example
//!
//! ```
//! use trellis_grid::{CellValue, FieldValue, PropertyPath, RowData};
//!
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl RowData for Person {
//!     fn field(&self, name: &str) -> FieldValue<'_> {
//!         match name {
//!             "name" => FieldValue::Value(self.name.as_str().into()),
//!             "age" => FieldValue::Value(self.age.into()),
//!             _ => FieldValue::Absent,
//!         }
//!     }
//! }
//!
//! let path = PropertyPath::parse("age").unwrap();
//! let person = Person { name: "Ada".into(), age: 36 };
//! assert_eq!(path.resolve(&person), CellValue::Int(36));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::value::CellValue;

/// One field of a row, as reported by [`RowData::field`].
pub enum FieldValue<'a> {
    /// The row has no field with the requested name.
    Absent,
    /// The field is a scalar cell value.
    Value(CellValue),
    /// The field is a nested object that can be descended into.
    Nested(&'a dyn RowData),
}

/// Named-field access for row types.
///
/// Implement this for every type displayed in a grid, and for any type
/// reachable through a dotted property path. Returning
/// [`FieldValue::Absent`] for unknown names is always safe: an absent field
/// renders as an empty cell and sorts as a [`CellValue::Null`] key.
pub trait RowData {
    /// Look up a field by name.
    fn field(&self, name: &str) -> FieldValue<'_>;
}

/// A parsed dotted field path, such as `"name"` or `"address.city"`.
///
/// Paths are validated once at parse time; resolution against a row can
/// then never fail, only degrade to [`CellValue::Null`].
///
/// # Resolution rules
///
/// Walking stops with `CellValue::Null` when:
/// - any segment is absent on the row it is looked up on,
/// - a scalar appears before the last segment (path deeper than the data),
/// - the last segment is a nested object (objects are not comparable keys).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    segments: Vec<String>,
}

impl PropertyPath {
    /// Parse a dotted path.
    ///
    /// Errors if the path is empty or contains an empty segment
    /// (`"a..b"`, `".a"`, `"a."`).
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::invalid_path(path, "path is empty"));
        }

        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(Error::invalid_path(path, "empty path segment"));
        }

        Ok(Self { segments })
    }

    /// The path segments, in walk order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Resolve this path against a row.
    ///
    /// Always yields a value; see the type-level docs for when that value
    /// degrades to [`CellValue::Null`].
    pub fn resolve(&self, row: &dyn RowData) -> CellValue {
        let mut current = row;
        let last = self.segments.len() - 1;

        for (i, segment) in self.segments.iter().enumerate() {
            match current.field(segment) {
                FieldValue::Absent => return CellValue::Null,
                FieldValue::Value(value) => {
                    // A scalar before the last segment means the path runs
                    // deeper than the data.
                    return if i == last { value } else { CellValue::Null };
                }
                FieldValue::Nested(inner) => {
                    if i == last {
                        // A bare object is not a comparable key.
                        return CellValue::Null;
                    }
                    current = inner;
                }
            }
        }

        CellValue::Null
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for PropertyPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
