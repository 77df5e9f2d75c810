use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::theme::ThemeMode;
use crate::ui::view::ShortcutInfo;

/// Draw the header bar with app name, theme, list count and shortcuts
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  theme: ThemeMode,
  list_count: usize,
  shortcuts: &[ShortcutInfo],
) {
  let mut spans = vec![
    Span::styled(" todolists ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", theme_label(theme)),
      Style::default().fg(Color::White),
    ),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", list_count_label(list_count)),
      Style::default().fg(Color::Yellow).bold(),
    ),
    Span::raw(" "),
  ];

  let mut sorted: Vec<&ShortcutInfo> = shortcuts.iter().collect();
  sorted.sort_by_key(|s| s.priority);

  for shortcut in sorted {
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

fn theme_label(theme: ThemeMode) -> &'static str {
  if theme.is_dark() {
    "dark"
  } else {
    "light"
  }
}

fn list_count_label(count: usize) -> String {
  match count {
    1 => "1 list".to_string(),
    n => format!("{} lists", n),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_list_count_label() {
    assert_eq!(list_count_label(0), "0 lists");
    assert_eq!(list_count_label(1), "1 list");
    assert_eq!(list_count_label(12), "12 lists");
  }
}
