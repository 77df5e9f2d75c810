use ratatui::prelude::Color;

use crate::theme;

/// Truncate a string to `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Terminal color for a CSS color string. Unparseable colors fall back to `Reset`.
pub fn css_color(color: &str) -> Color {
  match theme::to_rgb(color) {
    Some((r, g, b)) => Color::Rgb(r, g, b),
    None => Color::Reset,
  }
}

/// Readable text color on top of `background`
pub fn text_on(background: &str) -> Color {
  if theme::is_light(background) {
    Color::Black
  } else {
    Color::White
  }
}
