//! Declarative grid styling.
//!
//! [`GridStyle`] is a plain bag of presentation settings the engine stores
//! and hands back to the render layer: row palettes, heights, fonts,
//! borders, header styling, and the sort-icon asset names. The engine
//! never rasterizes any of it.
//!
//! Validation that depends on other grid state (the active-row color
//! requires selection to be enabled) happens in the grid's setters, not
//! here.

use trellis_core::Color;

use crate::palette::Palette;

/// Font request for cell and header text.
///
/// The family is an opaque name resolved by the render layer; `None`
/// means the renderer's default family.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Font family name, if overridden.
    pub family: Option<String>,
    /// Point size.
    pub size: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: None,
            size: 13.0,
        }
    }
}

/// Presentation settings for a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridStyle {
    /// Cycled per-row background colors.
    pub background_palette: Palette,
    /// Cycled per-row text colors.
    pub text_palette: Palette,
    /// Height of one data row, in logical pixels.
    pub row_height: f32,
    /// Height of the header row, in logical pixels.
    pub header_height: f32,
    /// Font for cell and header text.
    pub font: FontSpec,
    /// Header row background color.
    pub header_background: Color,
    /// Grid border color.
    pub border_color: Color,
    /// Grid border thickness, in logical pixels.
    pub border_thickness: f32,
    /// Whether the header row draws cell borders.
    pub header_borders_visible: bool,
    /// Background for the selected row, when selection is enabled.
    pub active_row_color: Option<Color>,
    /// Asset name for the ascending sort icon; `None` uses the renderer's
    /// built-in glyph.
    pub ascending_icon: Option<String>,
    /// Asset name for the descending sort icon.
    pub descending_icon: Option<String>,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            background_palette: Palette::solid(Color::WHITE),
            text_palette: Palette::solid(Color::BLACK),
            row_height: 40.0,
            header_height: 40.0,
            font: FontSpec::default(),
            header_background: Color::WHITE,
            border_color: Color::BLACK,
            border_thickness: 1.0,
            header_borders_visible: true,
            active_row_color: Some(Color::from_rgb8(128, 144, 160)),
            ascending_icon: None,
            descending_icon: None,
        }
    }
}

impl GridStyle {
    /// Background color for the row at `row_index`.
    pub fn row_background(&self, row_index: usize) -> Color {
        self.background_palette.color_for(row_index)
    }

    /// Text color for the row at `row_index`.
    pub fn row_text(&self, row_index: usize) -> Color {
        self.text_palette.color_for(row_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let style = GridStyle::default();
        assert_eq!(style.row_height, 40.0);
        assert_eq!(style.header_height, 40.0);
        assert_eq!(style.font.size, 13.0);
        assert!(style.font.family.is_none());
        assert_eq!(style.border_thickness, 1.0);
        assert!(style.header_borders_visible);
        assert!(style.active_row_color.is_some());
    }

    #[test]
    fn test_row_colors_cycle() {
        let style = GridStyle {
            background_palette: Palette::new(vec![Color::WHITE, Color::LIGHT_GRAY])
                .unwrap(),
            ..GridStyle::default()
        };
        assert_eq!(style.row_background(0), Color::WHITE);
        assert_eq!(style.row_background(1), Color::LIGHT_GRAY);
        assert_eq!(style.row_background(2), Color::WHITE);
        assert_eq!(style.row_text(5), Color::BLACK);
    }
}
