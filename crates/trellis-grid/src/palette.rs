//! Row color palettes.
//!
//! A [`Palette`] is a non-empty list of colors applied to rows by cycling:
//! row `i` gets `colors[i % len]`. Lookup is stateless and deterministic,
//! so a render layer may resolve colors in any order, once per row render.

use trellis_core::Color;

use crate::error::{Error, Result};

/// A non-empty, cycling list of row colors.
///
/// # Example
///
/// ```
/// use trellis_core::Color;
/// use trellis_grid::Palette;
///
/// let stripes = Palette::new(vec![Color::WHITE, Color::LIGHT_GRAY]).unwrap();
/// assert_eq!(stripes.color_for(0), Color::WHITE);
/// assert_eq!(stripes.color_for(1), Color::LIGHT_GRAY);
/// assert_eq!(stripes.color_for(2), Color::WHITE);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Create a palette from a list of colors.
    ///
    /// Errors if `colors` is empty; a palette must always be able to
    /// answer [`color_for`](Self::color_for).
    pub fn new(colors: Vec<Color>) -> Result<Self> {
        if colors.is_empty() {
            return Err(Error::EmptyPalette);
        }
        Ok(Self { colors })
    }

    /// Create a single-color palette.
    pub fn solid(color: Color) -> Self {
        Self {
            colors: vec![color],
        }
    }

    /// The color for a given row index, cycling through the palette.
    pub fn color_for(&self, row_index: usize) -> Color {
        self.colors[row_index % self.colors.len()]
    }

    /// The palette colors, in cycle order.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Number of colors in one cycle.
    pub fn len(&self) -> usize {
        self.colors.len()
    }
}

impl TryFrom<Vec<Color>> for Palette {
    type Error = Error;

    fn try_from(colors: Vec<Color>) -> Result<Self> {
        Self::new(colors)
    }
}
