/// A named palette color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
  pub name: &'static str,
  pub value: &'static str,
}

const fn entry(name: &'static str, value: &'static str) -> PaletteEntry {
  PaletteEntry { name, value }
}

/// Canonical palette. Index-aligned with [`DARK_PALETTE`].
pub const LIGHT_PALETTE: [PaletteEntry; 8] = [
  entry("white", "#ffffff"),
  entry("blue", "#2b6ff7"),
  entry("green", "#22c55e"),
  entry("yellow", "#f59e0b"),
  entry("orange", "#fb923c"),
  entry("red", "#ef4444"),
  entry("purple", "#a855f7"),
  entry("gray", "#9ca3af"),
];

pub const DARK_PALETTE: [PaletteEntry; 8] = [
  entry("white", "#1f2937"),
  entry("blue", "#1e40af"),
  entry("green", "#166534"),
  entry("yellow", "#92400e"),
  entry("orange", "#9a3412"),
  entry("red", "#991b1b"),
  entry("purple", "#6b21a8"),
  entry("gray", "#374151"),
];

pub fn palette(dark: bool) -> &'static [PaletteEntry; 8] {
  if dark {
    &DARK_PALETTE
  } else {
    &LIGHT_PALETTE
  }
}

/// Lowercase a color and rewrite `rgb()`/`rgba()` as `#rrggbb`.
///
/// Channels are rounded and clamped; alpha is dropped. Anything else is
/// returned trimmed and lowercased.
pub fn normalize(color: &str) -> String {
  let lower = color.trim().to_lowercase();

  let inner = lower
    .strip_prefix("rgba(")
    .or_else(|| lower.strip_prefix("rgb("))
    .and_then(|rest| rest.strip_suffix(')'));

  match inner.and_then(rgb_channels) {
    Some([r, g, b]) => format!("#{:02x}{:02x}{:02x}", r, g, b),
    None => lower,
  }
}

fn rgb_channels(inner: &str) -> Option<[u8; 3]> {
  // Accept both "r, g, b, a" and "r g b / a"
  let color_part = inner.split('/').next()?;
  let parts: Vec<&str> = color_part
    .split(|c: char| c == ',' || c.is_whitespace())
    .filter(|p| !p.is_empty())
    .collect();
  if parts.len() < 3 {
    return None;
  }

  let mut channels = [0u8; 3];
  for (slot, part) in channels.iter_mut().zip(&parts[..3]) {
    let value: f64 = part.parse().ok()?;
    *slot = value.round().clamp(0.0, 255.0) as u8;
  }
  Some(channels)
}

fn find_index(normalized: &str, entries: &[PaletteEntry]) -> Option<usize> {
  entries
    .iter()
    .position(|e| e.value == normalized || e.name == normalized)
}

/// Map a stored color onto the palette of the requested theme.
///
/// Looks the color up by value or name in the light palette, then in the
/// dark one, and returns the same-index entry of the target palette.
/// Colors in neither palette are returned unchanged.
pub fn resolve_for_theme(stored: &str, dark: bool) -> String {
  let normalized = normalize(stored);
  let index =
    find_index(&normalized, &LIGHT_PALETTE).or_else(|| find_index(&normalized, &DARK_PALETTE));

  match index {
    Some(i) => palette(dark)[i].value.to_string(),
    None => stored.to_string(),
  }
}

/// The stored form of a color: its light-palette value, or the normalized input.
pub fn canonical(color: &str) -> String {
  normalize(&resolve_for_theme(color, false))
}

/// Parse a color into RGB channels. Accepts palette names, `rgb()` and
/// `#rgb`/`#rrggbb` hex.
pub fn to_rgb(color: &str) -> Option<(u8, u8, u8)> {
  let normalized = normalize(color);
  let hex = match find_index(&normalized, &LIGHT_PALETTE) {
    Some(i) if LIGHT_PALETTE[i].name == normalized => LIGHT_PALETTE[i].value,
    _ => normalized.as_str(),
  };

  let digits = hex.strip_prefix('#')?;
  let channel = |s: &str| u8::from_str_radix(s, 16).ok();
  match digits.len() {
    6 => Some((
      channel(&digits[0..2])?,
      channel(&digits[2..4])?,
      channel(&digits[4..6])?,
    )),
    3 => {
      let expand = |i: usize| channel(digits[i..i + 1].repeat(2).as_str());
      Some((expand(0)?, expand(1)?, expand(2)?))
    }
    _ => None,
  }
}

/// Whether a background color needs dark text on top of it.
pub fn is_light(color: &str) -> bool {
  match to_rgb(color) {
    Some((r, g, b)) => {
      let luminance = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
      luminance > 150.0
    }
    None => true,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_normalize_rgb_matches_hex() {
    assert_eq!(normalize("RGB(43, 111, 247)"), normalize("#2b6ff7"));
    assert_eq!(normalize("#2B6FF7"), "#2b6ff7");
  }

  #[test]
  fn test_normalize_rgba_rounds_and_drops_alpha() {
    assert_eq!(normalize("rgba(42.6, 110.5, 300, 0.4)"), "#2b6fff");
    assert_eq!(normalize("rgb(43 111 247 / 50%)"), "#2b6ff7");
  }

  #[test]
  fn test_normalize_passes_through_names_and_garbage() {
    assert_eq!(normalize(" White "), "white");
    assert_eq!(normalize("rgb(1, 2)"), "rgb(1, 2)");
    assert_eq!(normalize("hsl(10, 20%, 30%)"), "hsl(10, 20%, 30%)");
  }

  #[test]
  fn test_resolve_light_to_dark_and_back() {
    assert_eq!(resolve_for_theme("#2b6ff7", true), "#1e40af");
    assert_eq!(resolve_for_theme("#1e40af", false), "#2b6ff7");
    assert_eq!(resolve_for_theme("#1e40af", true), "#1e40af");
  }

  #[test]
  fn test_resolve_by_name_and_rgb() {
    assert_eq!(resolve_for_theme("white", true), "#1f2937");
    assert_eq!(resolve_for_theme("rgb(239, 68, 68)", true), "#991b1b");
  }

  #[test]
  fn test_resolve_unknown_color_unchanged() {
    assert_eq!(resolve_for_theme("#123456", true), "#123456");
    assert_eq!(resolve_for_theme("Teal", false), "Teal");
  }

  #[test]
  fn test_canonical() {
    assert_eq!(canonical("#9A3412"), "#fb923c");
    assert_eq!(canonical("RGB(18, 52, 86)"), "#123456");
    assert_eq!(canonical("white"), "#ffffff");
  }

  #[test]
  fn test_palettes_are_aligned() {
    for (light, dark) in LIGHT_PALETTE.iter().zip(DARK_PALETTE.iter()) {
      assert_eq!(light.name, dark.name);
    }
  }

  #[test]
  fn test_to_rgb() {
    assert_eq!(to_rgb("#2b6ff7"), Some((43, 111, 247)));
    assert_eq!(to_rgb("#fff"), Some((255, 255, 255)));
    assert_eq!(to_rgb("green"), Some((34, 197, 94)));
    assert_eq!(to_rgb("teal"), None);
  }

  #[test]
  fn test_is_light() {
    assert!(is_light("#ffffff"));
    assert!(is_light("#f59e0b"));
    assert!(!is_light("#1e40af"));
    assert!(!is_light("#1f2937"));
  }
}
