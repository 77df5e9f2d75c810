use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear};

/// Where an overlay sits inside its parent area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
  /// One cell in from the top-left corner
  TopLeft,
  Center,
}

/// Rect of at most `width` x `height`, clamped to `area`
pub fn overlay_rect(area: Rect, width: u16, height: u16, anchor: Anchor) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);

  let (x, y) = match anchor {
    Anchor::TopLeft => (
      area.x + 1.min(area.width - width),
      area.y + 1.min(area.height - height),
    ),
    Anchor::Center => (
      area.x + (area.width - width) / 2,
      area.y + (area.height - height) / 2,
    ),
  };

  Rect::new(x, y, width, height)
}

/// Clear `rect`, draw a bordered block titled `title`, and return its inner area
pub fn draw_overlay_frame(frame: &mut Frame, rect: Rect, title: &str, accent: Color) -> Rect {
  frame.render_widget(Clear, rect);

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(accent))
    .title(format!(" {} ", title));

  let inner = block.inner(rect);
  frame.render_widget(block, rect);
  inner
}

/// Input line with a prefix and a block cursor at the cursor position
pub fn input_line<'a>(prefix: &'a str, before: &'a str, after: &'a str, accent: Color) -> Line<'a> {
  let mut after_chars = after.chars();
  let under_cursor = after_chars
    .next()
    .map(|c| c.to_string())
    .unwrap_or_else(|| " ".to_string());

  Line::from(vec![
    Span::styled(prefix, Style::default().fg(accent)),
    Span::raw(before),
    Span::styled(under_cursor, Style::default().add_modifier(Modifier::REVERSED)),
    Span::raw(after_chars.as_str()),
  ])
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_top_left_overlay() {
    let area = Rect::new(0, 2, 100, 30);
    assert_eq!(
      overlay_rect(area, 40, 3, Anchor::TopLeft),
      Rect::new(1, 3, 40, 3)
    );
  }

  #[test]
  fn test_centered_overlay() {
    let area = Rect::new(0, 0, 80, 24);
    assert_eq!(
      overlay_rect(area, 20, 10, Anchor::Center),
      Rect::new(30, 7, 20, 10)
    );
  }

  #[test]
  fn test_overlay_clamped_to_area() {
    let area = Rect::new(5, 5, 10, 4);
    let rect = overlay_rect(area, 40, 12, Anchor::TopLeft);
    assert_eq!(rect, Rect::new(5, 5, 10, 4));
    let rect = overlay_rect(area, 40, 12, Anchor::Center);
    assert_eq!(rect, Rect::new(5, 5, 10, 4));
  }

  #[test]
  fn test_input_line_cursor() {
    let line = input_line(":", "ad", "d", Color::Yellow);
    let text: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
    assert_eq!(text, vec![":", "ad", "d", ""]);

    let line = input_line("/", "milk", "", Color::Yellow);
    assert_eq!(line.spans[2].content, " ");
  }
}
