//! Light/dark theme and per-list color resolution.
//!
//! List colors are stored in their light-palette ("canonical") form and
//! mapped to the dark palette on display. Colors outside the fixed palettes
//! are kept as the user chose them.

mod controller;
mod palette;

pub use controller::{ThemeController, ThemeMode};
pub use palette::{
  canonical, is_light, normalize, palette, resolve_for_theme, to_rgb, PaletteEntry, DARK_PALETTE,
  LIGHT_PALETTE,
};
