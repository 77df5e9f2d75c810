use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{StatusLevel, StatusMessage};

/// Draw the footer bar: current location on the left, status message after it
pub fn draw_footer(
  frame: &mut Frame,
  area: Rect,
  location: &[String],
  status: Option<&StatusMessage>,
) {
  let mut spans = vec![Span::raw(" ")];

  for (i, part) in location.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }
    let style = if i == location.len() - 1 {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };
    spans.push(Span::styled(part.clone(), style));
  }

  if let Some(status) = status {
    spans.push(Span::styled("  │  ", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(status.text.clone(), status_style(status.level)));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

fn status_style(level: StatusLevel) -> Style {
  match level {
    StatusLevel::Info => Style::default().fg(Color::Green),
    StatusLevel::Error => Style::default().fg(Color::Red).bold(),
  }
}
